use clap::Parser;
use std::time::Duration;

use crate::error::ConfigError;

/// Command line / environment configuration for the server.
#[derive(Parser, Debug, Clone)]
#[command(name = "chess_table_server")]
#[command(about = "Authoritative two-player chess server with clocks and spectators")]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "CHESS_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind
    #[arg(short, long, env = "CHESS_PORT", default_value_t = 5555)]
    pub port: u16,

    /// Starting time on each player's clock, in seconds
    #[arg(long, env = "CHESS_CLOCK_SECONDS", default_value_t = 300.0)]
    pub clock_seconds: f64,

    /// Maximum number of spectators; unlimited when omitted
    #[arg(long, env = "CHESS_MAX_SPECTATORS")]
    pub max_spectators: Option<usize>,

    /// Interval for ending games whose clock ran out without a move; off when omitted
    #[arg(long, env = "CHESS_FLAG_SWEEP_MS")]
    pub flag_sweep_ms: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5555,
            clock_seconds: 300.0,
            max_spectators: None,
            flag_sweep_ms: None,
        }
    }
}

impl ServerConfig {
    /// Parse from the process arguments and environment, then validate.
    pub fn load() -> Result<Self, ConfigError> {
        Self::parse().validated()
    }

    pub fn validated(self) -> Result<Self, ConfigError> {
        if !self.clock_seconds.is_finite() || self.clock_seconds <= 0.0 {
            return Err(ConfigError::InvalidClock(self.clock_seconds));
        }
        if self.flag_sweep_ms == Some(0) {
            return Err(ConfigError::InvalidSweepInterval);
        }
        Ok(self)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn flag_sweep(&self) -> Option<Duration> {
        self.flag_sweep_ms.map(Duration::from_millis)
    }
}
