use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, net::SocketAddr, path::Path};

/// Runtime settings. Every field has a default so a config file may set any subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,

    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Load config from a TOML file. The file must exist.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply command-line overrides on top of file/default values.
    pub fn with_overrides(mut self, bind_addr: Option<SocketAddr>, log_filter: Option<String>) -> Self {
        if let Some(addr) = bind_addr {
            self.bind_addr = addr;
        }
        if let Some(filter) = log_filter {
            self.log_filter = filter;
        }
        self
    }
}
