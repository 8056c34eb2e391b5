use std::sync::Arc;

use crate::binder::Args;
use crate::core::{ArgValue, CommandError, CommandFlags, ParamSpec, Result, ValueKind};
use crate::registry::hooks::{PostProcessor, PreProcessor};
use crate::registry::matcher::Matcher;

/// What a handler returns: an optional reply for the sender.
pub type CommandResult = Result<Option<String>>;

pub type CommandInvoker<H> = Arc<dyn Fn(&H, Args) -> CommandResult + Send + Sync>;

/// One invocable command of a handler set. Immutable once built.
pub struct OperationDescriptor<H> {
    name: String,
    matcher: Matcher,
    params: Vec<ParamSpec>,
    flags: CommandFlags,
    pre_processors: Vec<Arc<dyn PreProcessor>>,
    post_processors: Vec<Arc<dyn PostProcessor>>,
    defects: Vec<String>,
    invoker: CommandInvoker<H>,
}

impl<H> OperationDescriptor<H> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    pub fn flags(&self) -> CommandFlags {
        self.flags
    }

    pub fn matches(&self, message: &str) -> bool {
        self.matcher.matches(message)
    }

    /// Checks the registration for defects that no user input can fix.
    pub fn check_definition(&self) -> Result<()> {
        if let Some(defect) = self.defects.first() {
            return Err(self.defect(defect));
        }

        if let Some(mismatch) = self.params.iter().find_map(ParamSpec::default_mismatch) {
            return Err(self.defect(&mismatch));
        }

        if let Some(pos) = self.params.iter().position(ParamSpec::has_default) {
            if let Some(required) = self.params[pos..].iter().find(|p| !p.has_default()) {
                return Err(self.defect(&format!(
                    "required parameter '{}' follows an optional parameter",
                    required.name
                )));
            }
        }

        let flags = self.flags;
        if flags.combine_params {
            if flags.combine_start || flags.combine_end {
                return Err(self.defect("combine-params cannot be mixed with other combine policies"));
            }
            match self.params.as_slice() {
                [param] if param.kind == ValueKind::Text => {}
                [_] => return Err(self.defect("combine-params requires a text parameter")),
                _ => return Err(self.defect("combine-params requires exactly one parameter")),
            }
        }

        if flags.combine_start && flags.combine_end {
            return Err(self.defect("combine-start cannot be mixed with combine-end"));
        }

        if flags.combine_end {
            if self.params.is_empty() {
                return Err(self.defect("combine-end requires at least one parameter"));
            }
            if self.params.iter().any(ParamSpec::has_default) {
                return Err(self.defect("combine-end cannot be used with optional parameters"));
            }
        }

        Ok(())
    }

    pub fn pre_process(&self, message: &str) -> Result<String> {
        self.pre_processors
            .iter()
            .try_fold(message.to_string(), |current, processor| {
                processor.process(&self.name, &current)
            })
    }

    pub fn post_process(&self, message: &str, result: Option<String>) -> Result<Option<String>> {
        self.post_processors
            .iter()
            .try_fold(result, |current, processor| {
                processor.process(&self.name, message, current)
            })
    }

    pub fn invoke(&self, handlers: &H, args: Args) -> CommandResult {
        (self.invoker)(handlers, args)
    }

    fn defect(&self, detail: &str) -> CommandError {
        CommandError::definition(format!("command '{}': {}", self.name, detail))
    }
}

impl<H> std::fmt::Debug for OperationDescriptor<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationDescriptor")
            .field("name", &self.name)
            .field("matcher", &self.matcher)
            .field("params", &self.params)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

/// Registration entry under construction. See [`CommandTable::command`].
pub struct OperationBuilder<H> {
    name: String,
    matcher: Matcher,
    params: Vec<ParamSpec>,
    flags: CommandFlags,
    pre_processors: Vec<Arc<dyn PreProcessor>>,
    post_processors: Vec<Arc<dyn PostProcessor>>,
    defects: Vec<String>,
    invoker: CommandInvoker<H>,
}

impl<H> OperationBuilder<H> {
    /// Informational name used in logs, hooks and help output.
    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn param(&mut self, spec: ParamSpec) -> &mut Self {
        self.params.push(spec);
        self
    }

    pub fn text(&mut self, name: impl Into<String>) -> &mut Self {
        self.param(ParamSpec::new(name, ValueKind::Text))
    }

    pub fn big_int(&mut self, name: impl Into<String>) -> &mut Self {
        self.param(ParamSpec::new(name, ValueKind::BigInteger))
    }

    pub fn int32(&mut self, name: impl Into<String>) -> &mut Self {
        self.param(ParamSpec::new(name, ValueKind::Int32))
    }

    pub fn int64(&mut self, name: impl Into<String>) -> &mut Self {
        self.param(ParamSpec::new(name, ValueKind::Int64))
    }

    pub fn float(&mut self, name: impl Into<String>) -> &mut Self {
        self.param(ParamSpec::new(name, ValueKind::Float))
    }

    /// Optional parameter; the kind is taken from the default.
    pub fn optional(&mut self, name: impl Into<String>, default: impl Into<ArgValue>) -> &mut Self {
        self.param(ParamSpec::with_default(name, default))
    }

    /// Parameter declared by kind name. An unknown kind is kept as a defect
    /// and reported when the command is validated or dispatched.
    pub fn declared(&mut self, name: impl Into<String>, kind_name: &str) -> &mut Self {
        match ParamSpec::declared(name, kind_name) {
            Ok(spec) => self.param(spec),
            Err(CommandError::Definition(defect)) => {
                self.defects.push(defect);
                self
            }
            Err(err) => {
                self.defects.push(err.to_string());
                self
            }
        }
    }

    pub fn combine_params(&mut self) -> &mut Self {
        self.flags.combine_params = true;
        self
    }

    pub fn combine_start(&mut self) -> &mut Self {
        self.flags.combine_start = true;
        self
    }

    pub fn combine_end(&mut self) -> &mut Self {
        self.flags.combine_end = true;
        self
    }

    /// Run inline without the time budget.
    pub fn skip_timing(&mut self) -> &mut Self {
        self.flags.skip_timing = true;
        self
    }

    pub fn pre_process<F>(&mut self, processor: F) -> &mut Self
    where
        F: Fn(&str, &str) -> Result<String> + Send + Sync + 'static,
    {
        self.pre_processors.push(Arc::new(processor));
        self
    }

    pub fn post_process<F>(&mut self, processor: F) -> &mut Self
    where
        F: Fn(&str, &str, Option<String>) -> Result<Option<String>> + Send + Sync + 'static,
    {
        self.post_processors.push(Arc::new(processor));
        self
    }

    pub fn pre_processor(&mut self, processor: Arc<dyn PreProcessor>) -> &mut Self {
        self.pre_processors.push(processor);
        self
    }

    pub fn post_processor(&mut self, processor: Arc<dyn PostProcessor>) -> &mut Self {
        self.post_processors.push(processor);
        self
    }

    fn build(self) -> OperationDescriptor<H> {
        OperationDescriptor {
            name: self.name,
            matcher: self.matcher,
            params: self.params,
            flags: self.flags,
            pre_processors: self.pre_processors,
            post_processors: self.post_processors,
            defects: self.defects,
            invoker: self.invoker,
        }
    }
}

/// Ordered registration table filled by [`crate::HandlerSet::register`].
///
/// Order matters: resolution picks the first entry whose matcher accepts
/// the message.
pub struct CommandTable<H> {
    operations: Vec<OperationBuilder<H>>,
}

impl<H> CommandTable<H> {
    pub fn new() -> Self {
        Self {
            operations: Vec::new(),
        }
    }

    pub fn command<F>(&mut self, matcher: Matcher, handler: F) -> &mut OperationBuilder<H>
    where
        F: Fn(&H, Args) -> CommandResult + Send + Sync + 'static,
    {
        let index = self.operations.len();
        let name = matcher
            .aliases()
            .into_iter()
            .next()
            .unwrap_or_else(|| format!("command#{}", index));

        self.operations.push(OperationBuilder {
            name,
            matcher,
            params: Vec::new(),
            flags: CommandFlags::default(),
            pre_processors: Vec::new(),
            post_processors: Vec::new(),
            defects: Vec::new(),
            invoker: Arc::new(handler),
        });
        &mut self.operations[index]
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub(crate) fn into_descriptors(self) -> Vec<OperationDescriptor<H>> {
        self.operations
            .into_iter()
            .map(OperationBuilder::build)
            .collect()
    }
}

impl<H> Default for CommandTable<H> {
    fn default() -> Self {
        Self::new()
    }
}
