use super::commands::ConsoleCommands;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use textcommand::{
    CommandRegistry, DispatchConfig, Dispatcher, Message, MessageSender, Outcome, TargetId,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "textcommand", version, about = "Dispatch text commands typed on stdin")]
pub struct ConsoleArgs {
    /// Sender identifier used for every line
    #[arg(long, default_value = "console")]
    pub sender: String,

    /// JSON file with dispatcher settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the time budget before the wait notice
    #[arg(long)]
    pub time_budget_ms: Option<u64>,

    /// Abandon commands that run longer than this
    #[arg(long)]
    pub hard_deadline_ms: Option<u64>,
}

impl ConsoleArgs {
    pub fn dispatch_config(&self) -> Result<DispatchConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                DispatchConfig::from_json(&json)?
            }
            None => DispatchConfig::default(),
        };

        if let Some(ms) = self.time_budget_ms {
            config = config.time_budget(Duration::from_millis(ms));
        }
        if let Some(ms) = self.hard_deadline_ms {
            config = config.hard_deadline(Duration::from_millis(ms));
        }
        Ok(config)
    }
}

/// Writes replies to stdout and fatal reports to stderr.
pub struct ConsoleSender;

impl MessageSender for ConsoleSender {
    fn send(&self, target: &TargetId, message: &Message) {
        println!("[{}] {}", target, message);
    }

    fn send_error(&self, message: &Message) {
        eprintln!("{}", message);
    }
}

pub struct App {
    sender: String,
    dispatcher: Dispatcher,
    commands: Arc<ConsoleCommands>,
}

impl App {
    pub fn new(args: ConsoleArgs) -> Result<Self> {
        let config = args.dispatch_config()?;
        let registry = Arc::new(CommandRegistry::new());
        registry.validate::<ConsoleCommands>()?;

        let dispatcher =
            Dispatcher::with_registry(Arc::clone(&registry), Arc::new(ConsoleSender)).with_config(config);

        Ok(Self {
            sender: args.sender,
            dispatcher,
            commands: Arc::new(ConsoleCommands::new(registry)),
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        info!(sender = %self.sender, "console ready, type 'help' for commands");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let outcome = self
                .dispatcher
                .process_input(&self.commands, self.sender.as_str(), &line)
                .await;
            if outcome == Outcome::Unmatched && !line.trim().is_empty() {
                debug!(line = %line, "not a command");
            }
            if self.commands.should_exit() {
                break;
            }
        }

        Ok(())
    }
}
