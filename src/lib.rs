// ============================================================================
// TextCommand Library
// ============================================================================

pub mod core;
pub mod binder;
pub mod registry;
pub mod dispatch;

// Re-export main types for convenience
pub use crate::core::{
    ArgValue, CommandError, CommandFlags, Message, ParamSpec, Result, TargetId, ValueKind,
};
pub use binder::Args;
pub use registry::{
    CommandRegistry, CommandResult, CommandSummary, CommandTable, HandlerSet, Matcher,
    OperationBuilder, OperationDescriptor, PostProcessor, PreProcessor, Resolution,
};
pub use dispatch::{
    CallbackSender, DispatchConfig, Dispatcher, InvocationContext, MessageSender, Outcome,
};

/// Re-exported so handlers can name argument types without a direct dependency.
pub use num_bigint::BigInt;
