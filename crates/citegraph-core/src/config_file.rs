use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub oracle: Option<OracleConfig>,
    pub storage: Option<StorageConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OracleConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    pub root: Option<String>,
}

/// Platform config directory path: `<config_dir>/citegraph/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("citegraph").join("config.toml"))
}

/// Load config by cascading CWD `.citegraph.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(&PathBuf::from(".citegraph.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &PathBuf) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        oracle: Some(OracleConfig {
            api_key: overlay
                .oracle
                .as_ref()
                .and_then(|o| o.api_key.clone())
                .or_else(|| base.oracle.as_ref().and_then(|o| o.api_key.clone())),
            model: overlay
                .oracle
                .as_ref()
                .and_then(|o| o.model.clone())
                .or_else(|| base.oracle.as_ref().and_then(|o| o.model.clone())),
            timeout_secs: overlay
                .oracle
                .as_ref()
                .and_then(|o| o.timeout_secs)
                .or_else(|| base.oracle.as_ref().and_then(|o| o.timeout_secs)),
        }),
        storage: Some(StorageConfig {
            root: overlay
                .storage
                .as_ref()
                .and_then(|s| s.root.clone())
                .or_else(|| base.storage.as_ref().and_then(|s| s.root.clone())),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overlay_wins() {
        let base = ConfigFile {
            oracle: Some(OracleConfig {
                api_key: Some("base-key".into()),
                model: Some("base-model".into()),
                timeout_secs: Some(30),
            }),
            storage: None,
        };
        let overlay = ConfigFile {
            oracle: Some(OracleConfig {
                api_key: Some("overlay-key".into()),
                model: None,
                timeout_secs: None,
            }),
            storage: Some(StorageConfig {
                root: Some("papers".into()),
            }),
        };

        let merged = merge(base, overlay);
        let oracle = merged.oracle.unwrap();
        assert_eq!(oracle.api_key.as_deref(), Some("overlay-key"));
        assert_eq!(oracle.model.as_deref(), Some("base-model"));
        assert_eq!(oracle.timeout_secs, Some(30));
        assert_eq!(merged.storage.unwrap().root.as_deref(), Some("papers"));
    }

    #[test]
    fn test_parse_partial_toml() {
        let parsed: ConfigFile = toml::from_str("[oracle]\nmodel = \"gpt-4o-mini\"\n").unwrap();
        assert_eq!(
            parsed.oracle.unwrap().model.as_deref(),
            Some("gpt-4o-mini")
        );
        assert!(parsed.storage.is_none());
    }

    #[test]
    fn test_load_from_missing_path() {
        assert!(load_from_path(&PathBuf::from("/nonexistent/.citegraph.toml")).is_none());
    }
}
