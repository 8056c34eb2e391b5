use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Level, Span, event, field, info_span};

use super::{DispatchConfig, InvocationContext, MessageSender, Outcome};
use crate::binder::{self, Args};
use crate::core::{CommandError, Message, TargetId};
use crate::registry::{
    CommandRegistry, CommandResult, HandlerSet, OperationDescriptor, Resolution,
};

/// Routes text messages to the commands of a handler set.
///
/// One dispatcher can serve any number of handler-set types; their command
/// tables are cached in the dispatcher's [`CommandRegistry`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use textcommand::{CallbackSender, CommandTable, Dispatcher, HandlerSet, Matcher};
///
/// struct Greeter;
///
/// impl HandlerSet for Greeter {
///     fn register(table: &mut CommandTable<Self>) {
///         table
///             .command(Matcher::names(["hi"]), |_, args| {
///                 Ok(Some(format!("hello, {}", args.text(0)?)))
///             })
///             .optional("name", "stranger");
///     }
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let sender = CallbackSender::new(|to, msg| println!("{}: {}", to, msg), |_| {});
/// let dispatcher = Dispatcher::new(Arc::new(sender));
///
/// let outcome = dispatcher.process_input(&Arc::new(Greeter), "alice", "hi").await;
/// assert_eq!(outcome.output(), Some("hello, stranger"));
/// # }
/// ```
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
    config: DispatchConfig,
    sender: Arc<dyn MessageSender>,
}

impl Dispatcher {
    /// Dispatcher with its own registry and default configuration.
    pub fn new(sender: Arc<dyn MessageSender>) -> Self {
        Self::with_registry(Arc::new(CommandRegistry::new()), sender)
    }

    pub fn with_registry(registry: Arc<CommandRegistry>, sender: Arc<dyn MessageSender>) -> Self {
        Self {
            registry,
            config: DispatchConfig::default(),
            sender,
        }
    }

    /// Dispatcher backed by [`CommandRegistry::global`].
    pub fn global(sender: Arc<dyn MessageSender>) -> Self {
        Self::with_registry(Arc::clone(CommandRegistry::global()), sender)
    }

    pub fn with_config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Handles one message from `sender`.
    ///
    /// Never fails: every error is classified into an [`Outcome`]. A
    /// non-blank reply is sent to `sender`; fatal failures are additionally
    /// reported through [`MessageSender::send_error`].
    pub async fn process_input<H: HandlerSet>(
        &self,
        handlers: &Arc<H>,
        sender: impl Into<TargetId>,
        message: &str,
    ) -> Outcome {
        let message = message.trim();
        if message.is_empty() {
            return Outcome::Unmatched;
        }

        let mut ctx = InvocationContext::new(sender.into(), message);
        let span = info_span!(
            "command.dispatch",
            invocation_id = %ctx.id(),
            sender = %ctx.sender(),
            command = field::Empty
        );

        let dispatched = AssertUnwindSafe(self.dispatch(handlers, &mut ctx))
            .catch_unwind()
            .instrument(span.clone())
            .await;
        let outcome = match dispatched {
            Ok(outcome) => outcome,
            Err(payload) => {
                let err = CommandError::Panicked(panic_message(payload));
                span.in_scope(|| self.fatal(&ctx, &err))
            }
        };

        if let Some(reply) = outcome.reply() {
            self.sender.send(ctx.sender(), &Message::from(reply));
        }
        outcome
    }

    async fn dispatch<H: HandlerSet>(
        &self,
        handlers: &Arc<H>,
        ctx: &mut InvocationContext,
    ) -> Outcome {
        let operation = match self.registry.resolve::<H>(ctx.raw_message()) {
            Ok(Resolution::Matched(operation)) => operation,
            Ok(Resolution::NotFound) => {
                event!(Level::TRACE, "no command matched");
                return Outcome::Unmatched;
            }
            Err(err) => return self.fatal(ctx, &err),
        };
        ctx.set_command(operation.name());
        Span::current().record("command", operation.name());

        // Panics in hooks are contained here so `on_finishing` still runs.
        let executed = AssertUnwindSafe(self.execute(handlers, &operation, ctx))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(CommandError::Panicked(panic_message(payload))));
        let outcome = match executed {
            Ok(result) => {
                event!(Level::DEBUG, "command completed");
                Outcome::Success(result)
            }
            Err(err) => self.classify(ctx, err),
        };

        handlers.on_finishing(ctx, &outcome);
        outcome
    }

    async fn execute<H: HandlerSet>(
        &self,
        handlers: &Arc<H>,
        operation: &Arc<OperationDescriptor<H>>,
        ctx: &mut InvocationContext,
    ) -> CommandResult {
        let message = operation.pre_process(ctx.message())?;
        ctx.set_message(message);
        handlers.on_processing(ctx);

        let args = binder::bind_operation(ctx.message(), operation)?;
        let result = self.invoke(handlers, operation, args, ctx.sender()).await?;

        operation.post_process(ctx.message(), result)
    }

    async fn invoke<H: HandlerSet>(
        &self,
        handlers: &Arc<H>,
        operation: &Arc<OperationDescriptor<H>>,
        args: Args,
        sender: &TargetId,
    ) -> CommandResult {
        if operation.flags().skip_timing {
            return std::panic::catch_unwind(AssertUnwindSafe(|| operation.invoke(handlers, args)))
                .unwrap_or_else(|payload| Err(CommandError::Panicked(panic_message(payload))));
        }

        let cancellation = args.cancellation().clone();
        let worker_handlers = Arc::clone(handlers);
        let worker_operation = Arc::clone(operation);
        let mut worker =
            tokio::task::spawn_blocking(move || worker_operation.invoke(&worker_handlers, args));

        // Past the budget the sender is warned once and the worker keeps
        // running. Only a hard deadline stops the wait.
        let budget = self.config.time_budget;
        let joined = match self.config.hard_deadline {
            Some(deadline) if deadline <= budget => match timeout(deadline, &mut worker).await {
                Ok(joined) => joined,
                Err(_) => return Err(self.abandon(&cancellation, deadline)),
            },
            hard_deadline => match timeout(budget, &mut worker).await {
                Ok(joined) => joined,
                Err(_) => {
                    event!(
                        Level::WARN,
                        budget_ms = budget.as_millis() as u64,
                        "command exceeded its time budget"
                    );
                    if !self.config.wait_notice.is_empty() {
                        self.sender
                            .send(sender, &Message::from(self.config.wait_notice.as_str()));
                    }
                    match hard_deadline {
                        None => worker.await,
                        Some(deadline) => match timeout(deadline - budget, &mut worker).await {
                            Ok(joined) => joined,
                            Err(_) => return Err(self.abandon(&cancellation, deadline)),
                        },
                    }
                }
            },
        };

        joined.map_err(|err| {
            if err.is_panic() {
                CommandError::Panicked(panic_message(err.into_panic()))
            } else {
                CommandError::Handler(anyhow::anyhow!("command worker failed: {}", err))
            }
        })?
    }

    fn abandon(&self, cancellation: &CancellationToken, deadline: Duration) -> CommandError {
        cancellation.cancel();
        event!(
            Level::WARN,
            deadline_ms = deadline.as_millis() as u64,
            "command abandoned after hard deadline"
        );
        CommandError::TimedOut(deadline)
    }

    fn classify(&self, ctx: &InvocationContext, err: CommandError) -> Outcome {
        match err {
            CommandError::NoMatch => {
                event!(Level::DEBUG, "command declined by handler");
                Outcome::Unmatched
            }
            err if err.is_user_error() => {
                event!(Level::INFO, error = %err, "command rejected");
                Outcome::HandledError(err.to_string())
            }
            err => self.fatal(ctx, &err),
        }
    }

    fn fatal(&self, ctx: &InvocationContext, err: &CommandError) -> Outcome {
        event!(Level::ERROR, error = %err, "command failed");

        let report = format!(
            "Failed to process command from [{}] at {}.\r\n\
             Invocation: {}\r\n\
             Command: [{}]\r\n\
             Error:\r\n{:?}",
            ctx.sender(),
            ctx.started_at().to_rfc3339(),
            ctx.id(),
            ctx.raw_message(),
            err
        );
        self.sender.send_error(&Message::from(report));

        Outcome::Fatal(format!("Sorry, something went wrong: {}.", err))
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
