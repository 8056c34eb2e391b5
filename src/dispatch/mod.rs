pub mod config;
pub mod context;
pub mod engine;
pub mod outcome;
pub mod sender;

pub use config::{DispatchConfig, DispatchConfigFile};
pub use context::InvocationContext;
pub use engine::Dispatcher;
pub use outcome::Outcome;
pub use sender::{CallbackSender, MessageSender};
