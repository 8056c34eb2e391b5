pub mod error;
pub mod types;
pub mod value;

pub use error::{CommandError, Result};
pub use types::{CommandFlags, Message, ParamSpec, TargetId};
pub use value::{ArgValue, ValueKind};
