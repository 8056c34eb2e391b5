use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::core::{CommandError, Result};

pub type MatchPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Decides whether a message is addressed to an operation.
///
/// All variants except [`Matcher::Exact`] look only at the first
/// whitespace-delimited token. Comparisons are case-sensitive.
#[derive(Clone)]
pub enum Matcher {
    /// First token equals one of the names.
    Names(Vec<String>),
    /// The whole trimmed message equals one of the names (no arguments).
    Exact(Vec<String>),
    /// First token fully matches the pattern.
    Pattern(Regex),
    Predicate(MatchPredicate),
}

impl Matcher {
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Names(names.into_iter().map(Into::into).collect())
    }

    pub fn exact<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Exact(names.into_iter().map(Into::into).collect())
    }

    /// The pattern is anchored on both ends.
    pub fn pattern(pattern: &str) -> Result<Self> {
        Regex::new(&format!("^(?:{})$", pattern))
            .map(Self::Pattern)
            .map_err(|err| CommandError::definition(format!("invalid matcher pattern: {}", err)))
    }

    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(predicate))
    }

    pub fn matches(&self, message: &str) -> bool {
        let message = message.trim();
        let first_token = message.split_whitespace().next().unwrap_or("");

        match self {
            Self::Names(names) => names.iter().any(|name| name == first_token),
            Self::Exact(names) => names.iter().any(|name| name == message),
            Self::Pattern(regex) => regex.is_match(first_token),
            Self::Predicate(predicate) => predicate(first_token),
        }
    }

    /// Literal names this matcher answers to, for help output.
    pub fn aliases(&self) -> Vec<String> {
        match self {
            Self::Names(names) | Self::Exact(names) => names.clone(),
            Self::Pattern(regex) => vec![regex.as_str().to_string()],
            Self::Predicate(_) => Vec::new(),
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Names(names) => f.debug_tuple("Names").field(names).finish(),
            Self::Exact(names) => f.debug_tuple("Exact").field(names).finish(),
            Self::Pattern(regex) => f.debug_tuple("Pattern").field(&regex.as_str()).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}
