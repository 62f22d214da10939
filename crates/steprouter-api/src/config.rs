// Server configuration from environment variables

use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_LOG_DIR: &str = "./docs";
pub const DEFAULT_MAX_STEPS: u32 = 10;
pub const DEFAULT_PORT: u16 = 8085;

/// Runtime configuration for the step router
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory receiving the JSONL, narrative, and changelog files
    pub log_dir: PathBuf,
    /// Reject plans declaring more steps than this
    pub max_steps: u32,
    /// TCP port to listen on
    pub port: u16,
    /// Require each completion report to acknowledge the step's rule/policy
    pub require_rule_ack: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            max_steps: DEFAULT_MAX_STEPS,
            port: DEFAULT_PORT,
            require_rule_ack: false,
        }
    }
}

impl Config {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(dir) = std::env::var("STEPROUTER_LOG_DIR") {
            if !dir.is_empty() {
                config.log_dir = PathBuf::from(dir);
            }
        }
        if let Ok(raw) = std::env::var("STEPROUTER_MAX_STEPS") {
            config.max_steps = raw
                .parse()
                .with_context(|| format!("STEPROUTER_MAX_STEPS must be an integer, got '{raw}'"))?;
        }
        if let Ok(raw) = std::env::var("STEPROUTER_PORT") {
            config.port = raw
                .parse()
                .with_context(|| format!("STEPROUTER_PORT must be a port number, got '{raw}'"))?;
        }
        if let Ok(raw) = std::env::var("STEPROUTER_REQUIRE_RULE_ACK") {
            config.require_rule_ack = parse_bool(&raw)
                .with_context(|| format!("STEPROUTER_REQUIRE_RULE_ACK must be a boolean, got '{raw}'"))?;
        }

        Ok(config)
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("unrecognized boolean value '{other}'"),
    }
}
