//! Configuration for turnstile
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Turnstile - credential and access-token gate
#[derive(Parser, Debug, Clone)]
#[command(name = "turnstile")]
#[command(about = "Credential and access-token gate for the event service")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Secret used to sign and verify access tokens (HS256)
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// SQLite database file
    #[arg(long, env = "DATABASE_PATH", default_value = "turnstile.db")]
    pub database_path: PathBuf,

    /// Keep everything in memory instead of SQLite (nothing survives a restart)
    #[arg(long, env = "MEMORY_STORE", default_value = "false")]
    pub memory_store: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit log lines as JSON
    #[arg(long, env = "LOG_JSON", default_value = "false")]
    pub log_json: bool,
}

impl Args {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        match self.jwt_secret.as_deref() {
            None => return Err("JWT_SECRET is required".to_string()),
            Some(s) if s.trim().is_empty() => {
                return Err("JWT_SECRET must not be empty".to_string())
            }
            Some(_) => {}
        }

        if !self.memory_store && self.database_path.as_os_str().is_empty() {
            return Err("DATABASE_PATH must not be empty".to_string());
        }

        Ok(())
    }

    /// Human-readable description of the configured store
    pub fn store_description(&self) -> String {
        if self.memory_store {
            "in-memory".to_string()
        } else {
            format!("sqlite ({})", self.database_path.display())
        }
    }
}
