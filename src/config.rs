use std::time::Duration;

/// Runtime settings shared by every transfer a `Bank` starts.
#[derive(Debug, Clone, Default)]
pub struct BankConfig {
    /// How long a coordinator waits for an account reply before reporting
    /// `Failed`. `None` (the default) waits indefinitely.
    pub reply_timeout: Option<Duration>,
}

impl BankConfig {
    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = Some(timeout);
        self
    }
}

/// Subscriber settings; `RUST_LOG` takes precedence over `level` when set.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}
