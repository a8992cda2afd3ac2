//! Config module.
//! Reads `panel_dash.json` (server URL, poll periods, viewport, output file).
//! Every field is optional; a missing default file just means defaults.
//! CLI flags and `PANEL_DASH_SERVER` are layered on top in `main`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::controller::Periods;

pub const CONFIG_FILE: &str = "panel_dash.json";
pub const SERVER_ENV: &str = "PANEL_DASH_SERVER";

/// One poll period shared by every role.
pub const POLL_INTERVAL_MS: u64 = 3000;
pub const TIMER_INTERVAL_MS: u64 = 1000;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server_url: String,
    pub poll_interval_ms: u64,
    pub timer_interval_ms: u64,
    pub request_timeout_secs: u64,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// HTML file to render into; terminal when unset.
    pub output: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_url: "http://127.0.0.1:5000".to_string(),
            poll_interval_ms: POLL_INTERVAL_MS,
            timer_interval_ms: TIMER_INTERVAL_MS,
            request_timeout_secs: 10,
            viewport_width: 1920,
            viewport_height: 1080,
            output: None,
        }
    }
}

impl Config {
    pub fn periods(&self) -> Periods {
        Periods {
            poll: Duration::from_millis(self.poll_interval_ms.max(1)),
            timer: Duration::from_millis(self.timer_interval_ms.max(1)),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Loads an explicit config file (must exist), or the default one if present.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => read_config(path),
        None => {
            let default = Path::new(CONFIG_FILE);
            if default.exists() {
                read_config(default)
            } else {
                Ok(Config::default())
            }
        }
    }
}

fn read_config(path: &Path) -> Result<Config> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}
