mod combine;

use num_bigint::BigInt;
use tokio_util::sync::CancellationToken;

use crate::core::{ArgValue, CommandError, CommandFlags, ParamSpec, Result, ValueKind};
use crate::registry::OperationDescriptor;

/// Bound arguments of one invocation.
#[derive(Debug, Clone, Default)]
pub struct Args {
    values: Vec<ArgValue>,
    cancellation: CancellationToken,
}

impl Args {
    pub fn new(values: Vec<ArgValue>) -> Self {
        Self {
            values,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[ArgValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<ArgValue> {
        self.values
    }

    pub fn get(&self, index: usize) -> Result<&ArgValue> {
        self.values.get(index).ok_or_else(|| {
            CommandError::definition(format!(
                "argument {} requested but only {} bound",
                index,
                self.values.len()
            ))
        })
    }

    pub fn text(&self, index: usize) -> Result<&str> {
        let value = self.get(index)?;
        value.as_str().ok_or_else(|| wrong_kind(index, ValueKind::Text, value))
    }

    pub fn big_int(&self, index: usize) -> Result<&BigInt> {
        let value = self.get(index)?;
        value
            .as_big_int()
            .ok_or_else(|| wrong_kind(index, ValueKind::BigInteger, value))
    }

    pub fn int32(&self, index: usize) -> Result<i32> {
        let value = self.get(index)?;
        value.as_i32().ok_or_else(|| wrong_kind(index, ValueKind::Int32, value))
    }

    pub fn int64(&self, index: usize) -> Result<i64> {
        let value = self.get(index)?;
        value.as_i64().ok_or_else(|| wrong_kind(index, ValueKind::Int64, value))
    }

    pub fn float(&self, index: usize) -> Result<f64> {
        let value = self.get(index)?;
        value.as_f64().ok_or_else(|| wrong_kind(index, ValueKind::Float, value))
    }

    /// Cancelled when the dispatcher gives up on this invocation.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

fn wrong_kind(index: usize, expected: ValueKind, actual: &ArgValue) -> CommandError {
    CommandError::definition(format!(
        "argument {} is {} but was read as {}",
        index,
        actual.kind(),
        expected
    ))
}

/// Tokens after the command word.
pub fn arguments_of(message: &str) -> Vec<String> {
    message
        .split_whitespace()
        .skip(1)
        .map(String::from)
        .collect()
}

/// Binds a message (command word included) to an operation's parameters.
pub fn bind_operation<H>(message: &str, operation: &OperationDescriptor<H>) -> Result<Args> {
    operation.check_definition()?;
    let values = bind(&arguments_of(message), operation.params(), operation.flags())?;
    Ok(Args::new(values))
}

/// Builds the typed argument list from positional tokens.
pub fn bind(tokens: &[String], params: &[ParamSpec], flags: CommandFlags) -> Result<Vec<ArgValue>> {
    if flags.combine_params {
        let param = match params {
            [param] => param,
            _ => {
                return Err(CommandError::definition(
                    "combine-params requires exactly one parameter",
                ));
            }
        };
        let joined = combine::combine_params(tokens);
        if !joined.is_empty() {
            return Ok(vec![param.kind.coerce(&joined)?]);
        }
        return match &param.default {
            Some(default) => Ok(vec![default.clone()]),
            None => Err(CommandError::TooFewArguments),
        };
    }

    let min_required = params.iter().filter(|p| !p.has_default()).count();
    let max_required = params.len();

    if tokens.len() < min_required {
        return Err(CommandError::TooFewArguments);
    }

    let mut provided = tokens.to_vec();
    if flags.combine_start {
        provided = combine::combine_start(&provided, max_required);
    }
    if flags.combine_end {
        if params.iter().any(ParamSpec::has_default) {
            return Err(CommandError::definition(
                "combine-end cannot be used with optional parameters",
            ));
        }
        provided = combine::combine_end(&provided, max_required);
    }

    if provided.len() > max_required {
        return Err(CommandError::TooManyArguments);
    }

    params
        .iter()
        .enumerate()
        .map(|(index, param)| match provided.get(index) {
            Some(token) => param.kind.coerce(token),
            None => param.default.clone().ok_or_else(|| {
                CommandError::definition(format!(
                    "parameter '{}' has no value and no default",
                    param.name
                ))
            }),
        })
        .collect()
}
