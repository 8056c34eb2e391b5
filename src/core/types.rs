use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{ArgValue, Result, ValueKind};

/// Declared shape of one positional parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ValueKind,
    pub default: Option<ArgValue>,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
        }
    }

    pub fn with_default(name: impl Into<String>, default: impl Into<ArgValue>) -> Self {
        let default = default.into();
        Self {
            name: name.into(),
            kind: default.kind(),
            default: Some(default),
        }
    }

    /// Declares a parameter by kind name, e.g. `"bigint"`.
    pub fn declared(name: impl Into<String>, kind_name: &str) -> Result<Self> {
        Ok(Self::new(name, kind_name.parse()?))
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Describes a default whose kind differs from the declared kind.
    pub(crate) fn default_mismatch(&self) -> Option<String> {
        match &self.default {
            Some(default) if default.kind() != self.kind => Some(format!(
                "default for parameter '{}' is {} but the parameter is declared {}",
                self.name,
                default.kind(),
                self.kind
            )),
            _ => None,
        }
    }
}

/// Behaviour flags attached to an operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandFlags {
    pub combine_params: bool,
    pub combine_start: bool,
    pub combine_end: bool,
    pub skip_timing: bool,
}

/// Opaque identifier of a message target (a user, a group, a channel).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(pub String);

impl TargetId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TargetId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<TargetId> for String {
    fn from(id: TargetId) -> Self {
        id.0
    }
}

/// Outbound message content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Message(pub String);

impl Message {
    pub fn content(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Message {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Message {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<Message> for String {
    fn from(message: Message) -> Self {
        message.0
    }
}
