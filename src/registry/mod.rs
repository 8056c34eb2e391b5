pub mod hooks;
pub mod matcher;
pub mod operation;

pub use hooks::{PostProcessor, PreProcessor};
pub use matcher::{MatchPredicate, Matcher};
pub use operation::{
    CommandInvoker, CommandResult, CommandTable, OperationBuilder, OperationDescriptor,
};

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use lazy_static::lazy_static;
use log::{debug, error};

use crate::core::{CommandError, ParamSpec, Result};
use crate::dispatch::{InvocationContext, Outcome};

/// A collection of commands exposed to the dispatcher.
///
/// `register` is called once per type and registry; the resulting table is
/// cached. The lifecycle callbacks are invoked around every matched dispatch.
pub trait HandlerSet: Send + Sync + Sized + 'static {
    fn register(table: &mut CommandTable<Self>);

    /// Called after pre-processing, before arguments are bound.
    fn on_processing(&self, _ctx: &InvocationContext) {}

    /// Called with the classified outcome, before anything is sent.
    fn on_finishing(&self, _ctx: &InvocationContext, _outcome: &Outcome) {}
}

/// Cached, ordered operations of one handler-set type.
pub struct CommandSet<H> {
    operations: Vec<Arc<OperationDescriptor<H>>>,
}

impl<H: HandlerSet> CommandSet<H> {
    fn build() -> Self {
        let mut table = CommandTable::new();
        H::register(&mut table);

        let operations: Vec<_> = table.into_descriptors().into_iter().map(Arc::new).collect();
        for operation in &operations {
            if let Err(err) = operation.check_definition() {
                error!("{} in handler set {}", err, std::any::type_name::<H>());
            }
        }
        debug!(
            "Registered {} commands for {}",
            operations.len(),
            std::any::type_name::<H>()
        );

        Self { operations }
    }
}

impl<H> CommandSet<H> {
    pub fn operations(&self) -> &[Arc<OperationDescriptor<H>>] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// First operation whose matcher accepts the message.
    pub fn find(&self, message: &str) -> Option<&Arc<OperationDescriptor<H>>> {
        self.operations.iter().find(|operation| operation.matches(message))
    }
}

pub enum Resolution<H> {
    Matched(Arc<OperationDescriptor<H>>),
    NotFound,
}

impl<H> Resolution<H> {
    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}

/// Help entry for one registered command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSummary {
    pub name: String,
    pub aliases: Vec<String>,
    pub params: Vec<ParamSpec>,
}

impl CommandSummary {
    /// e.g. `Echo [content=fork]` or `Fork <num:bigint>`
    pub fn usage(&self) -> String {
        let mut usage = self.aliases.first().unwrap_or(&self.name).clone();
        for param in &self.params {
            match &param.default {
                Some(default) => usage.push_str(&format!(" [{}={}]", param.name, default)),
                None => usage.push_str(&format!(" <{}:{}>", param.name, param.kind)),
            }
        }
        usage
    }
}

type ErasedCommandSet = Arc<dyn Any + Send + Sync>;

/// Per-type cache of command tables.
pub struct CommandRegistry {
    sets: RwLock<HashMap<TypeId, ErasedCommandSet>>,
}

lazy_static! {
    static ref GLOBAL_REGISTRY: Arc<CommandRegistry> = Arc::new(CommandRegistry::new());
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            sets: RwLock::new(HashMap::new()),
        }
    }

    /// Process-wide registry shared by dispatchers that do not bring their own.
    pub fn global() -> &'static Arc<CommandRegistry> {
        &GLOBAL_REGISTRY
    }

    /// Returns the cached table for `H`, building it on first use.
    ///
    /// The table is built outside the lock. If two callers race on first
    /// use, both build an equivalent table and the first insert is kept.
    pub fn operations<H: HandlerSet>(&self) -> Result<Arc<CommandSet<H>>> {
        let key = TypeId::of::<H>();
        {
            let sets = self.sets.read()?;
            if let Some(entry) = sets.get(&key) {
                return Self::downcast(Arc::clone(entry));
            }
        }

        let built: ErasedCommandSet = Arc::new(CommandSet::<H>::build());
        let entry = {
            let mut sets = self.sets.write()?;
            Arc::clone(sets.entry(key).or_insert(built))
        };
        Self::downcast(entry)
    }

    pub fn resolve<H: HandlerSet>(&self, message: &str) -> Result<Resolution<H>> {
        let set = self.operations::<H>()?;
        Ok(match set.find(message) {
            Some(operation) => Resolution::Matched(Arc::clone(operation)),
            None => Resolution::NotFound,
        })
    }

    /// Fails on the first misconfigured command of `H`.
    pub fn validate<H: HandlerSet>(&self) -> Result<()> {
        self.operations::<H>()?
            .operations()
            .iter()
            .try_for_each(|operation| operation.check_definition())
    }

    pub fn commands<H: HandlerSet>(&self) -> Result<Vec<CommandSummary>> {
        Ok(self
            .operations::<H>()?
            .operations()
            .iter()
            .map(|operation| CommandSummary {
                name: operation.name().to_string(),
                aliases: operation.matcher().aliases(),
                params: operation.params().to_vec(),
            })
            .collect())
    }

    pub fn is_initialized<H: HandlerSet>(&self) -> Result<bool> {
        Ok(self.sets.read()?.contains_key(&TypeId::of::<H>()))
    }

    /// Number of handler-set types cached so far.
    pub fn len(&self) -> Result<usize> {
        Ok(self.sets.read()?.len())
    }

    fn downcast<H: HandlerSet>(entry: ErasedCommandSet) -> Result<Arc<CommandSet<H>>> {
        entry.downcast::<CommandSet<H>>().map_err(|_| {
            CommandError::definition(format!(
                "registry entry for {} has an unexpected type",
                std::any::type_name::<H>()
            ))
        })
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
