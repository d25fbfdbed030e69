use std::path::Path;

use anyhow::{Context, Result};
use lineage_graph::Orientation;
use serde::{Deserialize, Serialize};

use crate::error::HistoryError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_orientation")]
    pub orientation: Orientation,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub loading: LoadingConfig,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            orientation: default_orientation(),
            display: DisplayConfig::default(),
            loading: LoadingConfig::default(),
        }
    }
}

/// Steps of `prepare_for_display`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_true")]
    pub reduce_edges: bool,
    #[serde(default = "default_true")]
    pub drop_unresolved: bool,
    #[serde(default = "default_true")]
    pub sort_for_info: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            reduce_edges: default_true(),
            drop_unresolved: default_true(),
            sort_for_info: default_true(),
        }
    }
}

/// What `ImageHistoryGraph::from_record` pulls from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadingConfig {
    #[serde(default = "default_true")]
    pub relation_cloud: bool,
    #[serde(default = "default_true")]
    pub subject_history: bool,
    #[serde(default = "default_true")]
    pub leaves_history: bool,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            relation_cloud: default_true(),
            subject_history: default_true(),
            leaves_history: default_true(),
        }
    }
}

/// Read `path`, or return defaults if it does not exist.
///
/// # Errors
///
/// [`HistoryError::Config`] if the file cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<HistoryConfig, HistoryError> {
    read_config(path).map_err(HistoryError::Config)
}

/// Read `<config_dir>/lineage/config.toml`, or return defaults.
///
/// # Errors
///
/// [`HistoryError::Config`] if the file exists but is malformed.
pub fn load_user_config() -> Result<HistoryConfig, HistoryError> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(HistoryConfig::default());
    };
    load_config(&config_dir.join("lineage/config.toml"))
}

fn read_config(path: &Path) -> Result<HistoryConfig> {
    if !path.exists() {
        return Ok(HistoryConfig::default());
    }

    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<HistoryConfig>(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

const fn default_true() -> bool {
    true
}

const fn default_orientation() -> Orientation {
    Orientation::ChildToParent
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_uses_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let cfg = load_config(&dir.path().join("config.toml")).expect("load should succeed");
        assert_eq!(cfg, HistoryConfig::default());
        assert_eq!(cfg.orientation, Orientation::ChildToParent);
        assert!(cfg.display.reduce_edges);
        assert!(cfg.loading.leaves_history);
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
orientation = "parent-to-child"

[display]
drop_unresolved = false

[loading]
relation_cloud = false
"#,
        )
        .expect("write config");

        let cfg = load_config(&path).expect("load should succeed");
        assert_eq!(cfg.orientation, Orientation::ParentToChild);
        assert!(cfg.display.reduce_edges);
        assert!(!cfg.display.drop_unresolved);
        assert!(cfg.display.sort_for_info);
        assert!(!cfg.loading.relation_cloud);
        assert!(cfg.loading.subject_history);
    }

    #[test]
    fn malformed_config_reports_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "orientation = sideways").expect("write config");

        let err = load_config(&path).expect_err("parse should fail");
        assert_eq!(err.code(), "E1002");
        assert!(err.to_string().contains("Failed to parse"));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn round_trips_through_toml() {
        let cfg = HistoryConfig::default();
        let text = toml::to_string(&cfg).expect("serialize");
        assert!(text.contains("orientation = \"child-to-parent\""));
        let back: HistoryConfig = toml::from_str(&text).expect("parse");
        assert_eq!(back, cfg);
    }
}
