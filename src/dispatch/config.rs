use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{CommandError, Result};

/// Dispatcher configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchConfig {
    /// How long an invocation may run before the sender is told to wait
    pub time_budget: Duration,

    /// Text of the one-time "please wait" notice. Empty disables it.
    pub wait_notice: String,

    /// Give up on the invocation after this long (None waits forever)
    pub hard_deadline: Option<Duration>,
}

impl DispatchConfig {
    pub const DEFAULT_TIME_BUDGET: Duration = Duration::from_secs(7);
    pub const DEFAULT_WAIT_NOTICE: &'static str = "This may take a while, please wait...";

    pub fn new() -> Self {
        Self {
            time_budget: Self::DEFAULT_TIME_BUDGET,
            wait_notice: Self::DEFAULT_WAIT_NOTICE.to_string(),
            hard_deadline: None,
        }
    }

    /// Set the invocation time budget
    pub fn time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }

    /// Set the wait notice text
    pub fn wait_notice(mut self, notice: &str) -> Self {
        self.wait_notice = notice.to_string();
        self
    }

    /// Cancel invocations that run longer than `deadline`
    pub fn hard_deadline(mut self, deadline: Duration) -> Self {
        self.hard_deadline = Some(deadline);
        self
    }

    /// Parse from JSON
    ///
    /// Format: `{"time_budget_ms": 7000, "wait_notice": "...", "hard_deadline_ms": 60000}`.
    /// Missing fields keep their defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use textcommand::DispatchConfig;
    ///
    /// let config = DispatchConfig::from_json(r#"{"time_budget_ms": 1500}"#).unwrap();
    /// assert_eq!(config.time_budget, Duration::from_millis(1500));
    /// assert_eq!(config.hard_deadline, None);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let file: DispatchConfigFile = serde_json::from_str(json)
            .map_err(|err| CommandError::ConfigError(err.to_string()))?;
        Ok(file.into())
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// On-disk form of [`DispatchConfig`] with durations in milliseconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchConfigFile {
    pub time_budget_ms: Option<u64>,
    pub wait_notice: Option<String>,
    pub hard_deadline_ms: Option<u64>,
}

impl From<DispatchConfigFile> for DispatchConfig {
    fn from(file: DispatchConfigFile) -> Self {
        let mut config = DispatchConfig::new();
        if let Some(ms) = file.time_budget_ms {
            config.time_budget = Duration::from_millis(ms);
        }
        if let Some(notice) = file.wait_notice {
            config.wait_notice = notice;
        }
        config.hard_deadline = file.hard_deadline_ms.map(Duration::from_millis);
        config
    }
}
