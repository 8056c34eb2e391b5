use std::fmt;
use std::str::FromStr;

use num_bigint::BigInt;

use crate::core::{CommandError, Result};

/// The closed set of parameter kinds a token can be coerced into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Text,
    BigInteger,
    Int32,
    Int64,
    Float,
}

impl ValueKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::BigInteger => "bigint",
            Self::Int32 => "i32",
            Self::Int64 => "i64",
            Self::Float => "f64",
        }
    }

    /// Converts a single token into a value of this kind.
    ///
    /// Numeric kinds use Rust's locale-independent `FromStr` parsers. A token
    /// that does not parse is a user input error, not a defect.
    pub fn coerce(&self, token: &str) -> Result<ArgValue> {
        let not_a_number = || CommandError::NotANumber {
            token: token.to_string(),
            kind: self.type_name(),
        };

        match self {
            Self::Text => Ok(ArgValue::Text(token.to_string())),
            // BigInt's parser also takes `_` separators, which the
            // fixed-width kinds reject.
            Self::BigInteger if !is_plain_integer(token) => Err(not_a_number()),
            Self::BigInteger => token
                .parse::<BigInt>()
                .map(ArgValue::BigInteger)
                .map_err(|_| not_a_number()),
            Self::Int32 => token
                .parse::<i32>()
                .map(ArgValue::Int32)
                .map_err(|_| not_a_number()),
            Self::Int64 => token
                .parse::<i64>()
                .map(ArgValue::Int64)
                .map_err(|_| not_a_number()),
            Self::Float => token
                .parse::<f64>()
                .map(ArgValue::Float)
                .map_err(|_| not_a_number()),
        }
    }
}

impl FromStr for ValueKind {
    type Err = CommandError;

    /// Parses a declared kind name. Unknown names are definition errors.
    fn from_str(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "text" | "string" | "str" => Ok(Self::Text),
            "bigint" | "biginteger" | "integer" => Ok(Self::BigInteger),
            "i32" | "int" | "int32" => Ok(Self::Int32),
            "i64" | "long" | "int64" => Ok(Self::Int64),
            "f64" | "double" | "float" => Ok(Self::Float),
            _ => Err(CommandError::definition(format!(
                "unsupported parameter kind '{}'",
                name
            ))),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A bound, typed argument.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Text(String),
    BigInteger(BigInt),
    Int32(i32),
    Int64(i64),
    Float(f64),
}

impl ArgValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Text(_) => ValueKind::Text,
            Self::BigInteger(_) => ValueKind::BigInteger,
            Self::Int32(_) => ValueKind::Int32,
            Self::Int64(_) => ValueKind::Int64,
            Self::Float(_) => ValueKind::Float,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_big_int(&self) -> Option<&BigInt> {
        match self {
            Self::BigInteger(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int32(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int64(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{}", s),
            Self::BigInteger(n) => write!(f, "{}", n),
            Self::Int32(n) => write!(f, "{}", n),
            Self::Int64(n) => write!(f, "{}", n),
            Self::Float(x) => write!(f, "{}", x),
        }
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<BigInt> for ArgValue {
    fn from(n: BigInt) -> Self {
        Self::BigInteger(n)
    }
}

impl From<i32> for ArgValue {
    fn from(n: i32) -> Self {
        Self::Int32(n)
    }
}

impl From<i64> for ArgValue {
    fn from(n: i64) -> Self {
        Self::Int64(n)
    }
}

impl From<f64> for ArgValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

fn is_plain_integer(token: &str) -> bool {
    let digits = token.strip_prefix(['+', '-']).unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
