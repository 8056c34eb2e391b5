use crate::core::Result;

/// Rewrites the message text before arguments are bound.
pub trait PreProcessor: Send + Sync {
    fn process(&self, command: &str, message: &str) -> Result<String>;
}

/// Rewrites the handler's reply before it is sent.
pub trait PostProcessor: Send + Sync {
    fn process(&self, command: &str, message: &str, result: Option<String>)
    -> Result<Option<String>>;
}

impl<F> PreProcessor for F
where
    F: Fn(&str, &str) -> Result<String> + Send + Sync,
{
    fn process(&self, command: &str, message: &str) -> Result<String> {
        self(command, message)
    }
}

impl<F> PostProcessor for F
where
    F: Fn(&str, &str, Option<String>) -> Result<Option<String>> + Send + Sync,
{
    fn process(
        &self,
        command: &str,
        message: &str,
        result: Option<String>,
    ) -> Result<Option<String>> {
        self(command, message, result)
    }
}
