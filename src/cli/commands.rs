use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use textcommand::{
    CommandError, CommandRegistry, CommandTable, HandlerSet, InvocationContext, Matcher, Outcome,
};
use tracing::debug;

/// Commands available in the interactive console.
pub struct ConsoleCommands {
    registry: Arc<CommandRegistry>,
    exit: AtomicBool,
    handled: AtomicU64,
    failed: AtomicU64,
}

impl ConsoleCommands {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self {
            registry,
            exit: AtomicBool::new(false),
            handled: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    pub fn should_exit(&self) -> bool {
        self.exit.load(Ordering::SeqCst)
    }

    fn help(&self) -> textcommand::CommandResult {
        let lines: Vec<String> = self
            .registry
            .commands::<Self>()?
            .iter()
            .map(|command| {
                let aliases = command.aliases.join(", ");
                format!("  {:<32} {}", command.usage(), aliases)
            })
            .collect();
        Ok(Some(format!("Commands:\n{}", lines.join("\n"))))
    }
}

impl HandlerSet for ConsoleCommands {
    fn register(table: &mut CommandTable<Self>) {
        table.command(Matcher::exact(["help", "?"]), |commands, _| commands.help());

        table
            .command(Matcher::names(["echo", "e"]), |_, args| {
                Ok(Some(args.text(0)?.to_string()))
            })
            .combine_params()
            .optional("text", "fork");

        table
            .command(Matcher::names(["shout"]), |_, args| {
                Ok(Some(args.text(0)?.to_string()))
            })
            .combine_params()
            .text("text")
            .post_process(|_, _, result| Ok(result.map(|text| format!("{}!", text.to_uppercase()))));

        table
            .command(Matcher::names(["add", "+"]), |_, args| {
                Ok(Some((args.big_int(0)? + args.big_int(1)?).to_string()))
            })
            .big_int("a")
            .big_int("b");

        table
            .command(Matcher::names(["sum"]), |_, args| {
                let mut total = 0.0;
                for token in args.text(0)?.split_whitespace() {
                    total += token.parse::<f64>().map_err(|_| CommandError::NotANumber {
                        token: token.to_string(),
                        kind: "f64",
                    })?;
                }
                Ok(Some(total.to_string()))
            })
            .combine_params()
            .text("numbers");

        table
            .command(Matcher::names(["say"]), |_, args| {
                let times = args.int32(1)?;
                if !(1..=10).contains(&times) {
                    return Err(CommandError::user("times must be between 1 and 10"));
                }
                let text = args.text(0)?;
                Ok(Some(vec![text; times as usize].join("\n")))
            })
            .combine_start()
            .text("text")
            .optional("times", 1);

        table
            .command(Matcher::names(["tell"]), |_, args| {
                Ok(Some(format!("to {}: {}", args.text(0)?, args.text(1)?)))
            })
            .combine_end()
            .text("target")
            .text("message");

        table
            .command(Matcher::names(["sleep"]), |_, args| {
                let millis = args.int64(0)?;
                if millis < 0 {
                    return Err(CommandError::user("cannot sleep a negative duration"));
                }
                let deadline = std::time::Instant::now() + Duration::from_millis(millis as u64);
                while std::time::Instant::now() < deadline {
                    if args.is_cancelled() {
                        return Ok(None);
                    }
                    std::thread::sleep(Duration::from_millis(10));
                }
                Ok(Some(format!("slept {}ms", millis)))
            })
            .int64("millis");

        table
            .command(Matcher::exact(["stats"]), |commands, _| {
                Ok(Some(format!(
                    "handled: {}, failed: {}",
                    commands.handled.load(Ordering::SeqCst),
                    commands.failed.load(Ordering::SeqCst)
                )))
            })
            .skip_timing();

        table
            .command(Matcher::exact(["quit", "exit"]), |commands, _| {
                commands.exit.store(true, Ordering::SeqCst);
                Ok(Some("bye".to_string()))
            })
            .skip_timing();
    }

    fn on_finishing(&self, ctx: &InvocationContext, outcome: &Outcome) {
        debug!(command = ?ctx.command(), matched = outcome.matched(), "console command finished");
        match outcome {
            Outcome::Unmatched => {}
            Outcome::Success(_) => {
                self.handled.fetch_add(1, Ordering::SeqCst);
            }
            Outcome::HandledError(_) | Outcome::Fatal(_) => {
                self.failed.fetch_add(1, Ordering::SeqCst);
            }
        }
    }
}
