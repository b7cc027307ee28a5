//! Process-level settings, persisted as TOML. None of this is per-game
//! identity or roster state — that stays in-memory only, owned by each
//! [`crate::session::GameSession`].

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub port: u16,
    pub keepalive_interval_secs: u64,
    pub invite_delay_secs: u64,
    pub bot_eject_recheck_secs: u64,
    pub reconnect_delay_secs: u64,
    pub gc_bootstrap_wait_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            keepalive_interval_secs: 55,
            invite_delay_secs: 2,
            bot_eject_recheck_secs: 2,
            reconnect_delay_secs: 2,
            gc_bootstrap_wait_secs: 10,
        }
    }
}

impl Config {
    /// Load configuration from `path`. If the file does not exist, create it
    /// with defaults and return those defaults.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let s = fs::read_to_string(path)
                .with_context(|| format!("reading config file '{}'", path.display()))?;
            let cfg: Config = toml::from_str(&s)
                .with_context(|| format!("parsing TOML config '{}'", path.display()))?;
            Ok(cfg)
        } else {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("creating config directory '{}'", parent.display()))?;
                }
            }
            let cfg = Config::default();
            let toml_text = toml::to_string_pretty(&cfg)
                .with_context(|| "serializing default config to TOML")?;
            fs::write(path, toml_text)
                .with_context(|| format!("writing default config to '{}'", path.display()))?;
            Ok(cfg)
        }
    }

    /// `PORT` env var overrides the config file's port, matching the
    /// documented environment dependency.
    pub fn port_with_env_override(&self) -> u16 {
        std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.keepalive_interval_secs, 55);
        assert_eq!(cfg.invite_delay_secs, 2);
        assert_eq!(cfg.bot_eject_recheck_secs, 2);
        assert_eq!(cfg.reconnect_delay_secs, 2);
        assert_eq!(cfg.gc_bootstrap_wait_secs, 10);
    }

    #[test]
    fn load_or_create_round_trips() {
        let dir = std::env::temp_dir().join(format!(
            "gargamel-test-{}-{}",
            std::process::id(),
            "config-round-trip"
        ));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("gargamel.toml");
        let created = Config::load_or_create(&path).unwrap();
        let reloaded = Config::load_or_create(&path).unwrap();
        assert_eq!(created.port, reloaded.port);
        let _ = fs::remove_dir_all(&dir);
    }
}
