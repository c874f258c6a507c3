use crate::report::OutputMode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub probe: Probe,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).with_context(|| "encoding config as TOML")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Probe {
    /// URL fetched through every proxy.
    pub url: String,
    pub timeout_ms: u64,
    pub user_agent: String,
}
impl Default for Probe {
    fn default() -> Self {
        Self {
            url: "https://www.google.com".into(),
            timeout_ms: 10_000,
            user_agent: concat!("proxy-probe/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    pub mode: OutputMode,
    pub progress: bool,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            mode: OutputMode::Plaintext,
            progress: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            json: false,
            write_to_file: false,
            file_path: "proxy-probe.log".into(),
        }
    }
}
