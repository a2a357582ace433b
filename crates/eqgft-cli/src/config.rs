//! Optional TOML configuration.
//!
//! Looked up from `--config`, then the `EQGFT_CONFIG` environment variable.
//! Every field has a default, so an absent file and an empty file behave
//! the same. Command-line flags override whatever is loaded here.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use eqgft_core::ExperimentConfig;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub experiment: ExperimentConfig,
    pub server: ServerConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
    /// Event count of each simulation triggered from the dashboard.
    pub events: u64,
    /// Fixed RNG seed for every connection; OS entropy when unset.
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5007,
            static_dir: PathBuf::from("static"),
            events: 10_000,
            seed: None,
        }
    }
}

fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var("EQGFT_CONFIG").ok().map(PathBuf::from))
}

pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let Some(path) = resolve_path(explicit) else {
        return Ok(Config::default());
    };
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    tracing::debug!("loaded config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.experiment, ExperimentConfig::default());
        assert_eq!(config.server.port, 5007);
        assert_eq!(config.server.events, 10_000);
        assert!(config.server.seed.is_none());
    }

    #[test]
    fn test_partial_sections() {
        let config: Config = toml::from_str(
            r#"
            [experiment]
            kappa = 0.5

            [server]
            port = 8080
            seed = 11
            "#,
        )
        .unwrap();
        assert_eq!(config.experiment.kappa, 0.5);
        assert_eq!(config.experiment.n_events, 50_000);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.seed, Some(11));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = toml::from_str::<Config>("[server]\nprot = 1\n").unwrap_err();
        assert!(err.to_string().contains("prot"));
        let err = toml::from_str::<Config>("[experiment]\nn_event = 10\n").unwrap_err();
        assert!(err.to_string().contains("n_event"));
    }

    #[test]
    fn test_load_reports_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = load(Some(&missing)).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read config"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("eqgft.toml");
        std::fs::write(&path, "[experiment]\nn_events = 1000\n").unwrap();
        let config = load(Some(&path)).unwrap();
        assert_eq!(config.experiment.n_events, 1000);
    }
}
