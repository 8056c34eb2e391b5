use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::TargetId;

/// State of one dispatch call. Never shared across calls.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    id: Uuid,
    sender: TargetId,
    raw_message: String,
    message: String,
    command: Option<String>,
    started_at: DateTime<Utc>,
}

impl InvocationContext {
    pub fn new(sender: TargetId, raw_message: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            raw_message: raw_message.to_string(),
            message: raw_message.to_string(),
            command: None,
            started_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn sender(&self) -> &TargetId {
        &self.sender
    }

    /// The trimmed message as received.
    pub fn raw_message(&self) -> &str {
        &self.raw_message
    }

    /// The message after pre-processing.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Name of the resolved operation, once resolved.
    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub(crate) fn set_message(&mut self, message: String) {
        self.message = message;
    }

    pub(crate) fn set_command(&mut self, command: &str) {
        self.command = Some(command.to_string());
    }
}
