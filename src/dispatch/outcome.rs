/// Classified result of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Not a command: blank input, no matcher accepted it, or the handler declined.
    Unmatched,
    Success(Option<String>),
    /// A user input problem, explained to the sender.
    HandledError(String),
    /// An unexpected failure; also reported on the error channel.
    Fatal(String),
}

impl Outcome {
    pub fn matched(&self) -> bool {
        !matches!(self, Self::Unmatched)
    }

    pub fn output(&self) -> Option<&str> {
        match self {
            Self::Unmatched => None,
            Self::Success(result) => result.as_deref(),
            Self::HandledError(text) | Self::Fatal(text) => Some(text),
        }
    }

    /// Text that should reach the sender, if any.
    pub(crate) fn reply(&self) -> Option<&str> {
        self.output().filter(|text| !text.trim().is_empty())
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }

    /// `(matched, output)`
    pub fn into_parts(self) -> (bool, Option<String>) {
        match self {
            Self::Unmatched => (false, None),
            Self::Success(result) => (true, result),
            Self::HandledError(text) | Self::Fatal(text) => (true, Some(text)),
        }
    }
}
