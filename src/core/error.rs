use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    /// The message is not addressed to any registered command.
    #[error("No command matched")]
    NoMatch,

    #[error("Too few arguments")]
    TooFewArguments,

    #[error("Too many arguments")]
    TooManyArguments,

    #[error("'{token}' is not a number ({kind})")]
    NotANumber { token: String, kind: &'static str },

    /// A user-facing problem reported by the handler itself.
    #[error("{0}")]
    User(String),

    /// The handler set is misconfigured. Never caused by user input.
    #[error("Definition error: {0}")]
    Definition(String),

    #[error("Command timed out after {0:?}")]
    TimedOut(std::time::Duration),

    #[error(transparent)]
    Handler(#[from] anyhow::Error),

    #[error("Handler panicked: {0}")]
    Panicked(String),

    #[error("Lock error: {0}")]
    LockError(String),

    #[error("Config error: {0}")]
    ConfigError(String),
}

impl CommandError {
    pub fn user(message: impl Into<String>) -> Self {
        Self::User(message.into())
    }

    pub fn definition(message: impl Into<String>) -> Self {
        Self::Definition(message.into())
    }

    /// Errors the sender caused and can fix by retyping the command.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::TooFewArguments
                | Self::TooManyArguments
                | Self::NotANumber { .. }
                | Self::User(_)
                | Self::TimedOut(_)
        )
    }

    pub fn is_definition_error(&self) -> bool {
        matches!(self, Self::Definition(_))
    }
}

pub type Result<T> = std::result::Result<T, CommandError>;

impl<T> From<std::sync::PoisonError<T>> for CommandError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}
