//! Layered runtime configuration for the `lre` binary.
//!
//! Precedence, highest first: CLI flags > project file (`./lre.toml`) >
//! user config directory (`~/.config/lre/config.toml`) > built-in default.
//! Three knobs this engine's thin demo binary actually needs: which
//! distribution scope to analyze under by default, where to find a
//! knowledge-base overlay, and which report format to render.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;

use lre::models::DistributionScope;

#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "default_distribution_scope")]
    pub distribution_scope: DistributionScope,
    #[serde(default)]
    pub knowledge_base_overlay: Option<PathBuf>,
    #[serde(default = "default_report_format")]
    pub report_format: String,
}

fn default_distribution_scope() -> DistributionScope {
    DistributionScope::Binary
}

fn default_report_format() -> String {
    "terminal".to_string()
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            distribution_scope: default_distribution_scope(),
            knowledge_base_overlay: None,
            report_format: default_report_format(),
        }
    }
}

/// Load the layered config: an explicit `--config` override wins outright;
/// otherwise look for `./lre.toml`, then `~/.config/lre/config.toml`, then
/// fall back to [`RuntimeConfig::default`].
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<RuntimeConfig> {
    if let Some(path) = config_override {
        let content = std::fs::read_to_string(path)?;
        return Ok(toml::from_str(&content)?);
    }

    let project_config = project_path.join("lre.toml");
    if project_config.exists() {
        let content = std::fs::read_to_string(&project_config)?;
        return Ok(toml::from_str(&content)?);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".config").join("lre").join("config.toml");
        if home_config.exists() {
            let content = std::fs::read_to_string(&home_config)?;
            return Ok(toml::from_str(&content)?);
        }
    }

    Ok(RuntimeConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_binary_scope_and_terminal_report() {
        let config = RuntimeConfig::default();
        assert_eq!(config.distribution_scope, DistributionScope::Binary);
        assert_eq!(config.report_format, "terminal");
        assert!(config.knowledge_base_overlay.is_none());
    }

    #[test]
    fn load_config_falls_back_to_default_when_nothing_present() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path(), None).unwrap();
        assert_eq!(config.distribution_scope, DistributionScope::Binary);
    }

    #[test]
    fn project_file_overrides_default() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("lre.toml"),
            "distribution_scope = \"saas\"\nreport_format = \"json\"\n",
        )
        .unwrap();
        let config = load_config(dir.path(), None).unwrap();
        assert_eq!(config.distribution_scope, DistributionScope::SaaS);
        assert_eq!(config.report_format, "json");
    }
}
