use anyhow::Result;
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

use super::ShellConfig;

const APP_NAME: &str = "MonkeySSH";
const CONFIG_FILE: &str = "config.json";

/// Returns the platform-specific configuration directory for the shell.
pub fn get_config_directory() -> Option<PathBuf> {
    ProjectDirs::from("xyz", "depollsoft", APP_NAME)
        .map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
}

fn resolve_directory(dir_override: Option<&Path>) -> Result<PathBuf> {
    match dir_override {
        Some(dir) => Ok(dir.to_path_buf()),
        None => get_config_directory()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory")),
    }
}

/// Loads the shell configuration.
///
/// A missing file is created with defaults. A file that cannot be parsed is
/// logged and replaced by defaults in memory, leaving the file on disk as-is.
pub fn load_config(dir_override: Option<&Path>) -> Result<ShellConfig> {
    let config_path = resolve_directory(dir_override)?.join(CONFIG_FILE);

    if !config_path.exists() {
        tracing::info!(
            "Config file not found, creating default config at {:?}",
            config_path
        );
        let default_config = ShellConfig::default();
        save_config(&default_config, dir_override)?;
        return Ok(default_config);
    }

    let config_content = fs::read_to_string(&config_path)?;
    match serde_json::from_str::<ShellConfig>(&config_content) {
        Ok(config) => {
            tracing::info!("Loaded config from {:?}", config_path);
            Ok(config)
        }
        Err(e) => {
            tracing::warn!(
                "Failed to parse config file at {:?}: {}. Falling back to default config.",
                config_path,
                e
            );
            Ok(ShellConfig::default())
        }
    }
}

/// Saves the provided configuration, creating the directory if needed.
pub fn save_config(config: &ShellConfig, dir_override: Option<&Path>) -> Result<()> {
    let config_dir = resolve_directory(dir_override)?;

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
        tracing::info!("Created config directory: {:?}", config_dir);
    }

    let config_path = config_dir.join(CONFIG_FILE);
    let config_json = serde_json::to_string_pretty(config)?;

    fs::write(&config_path, config_json)?;
    tracing::debug!("Saved config to {:?}", config_path);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tracing_test::traced_test;

    #[test]
    fn test_missing_config_is_created_with_defaults() {
        let dir = tempdir().unwrap();
        let config = load_config(Some(dir.path())).unwrap();

        assert_eq!(config, ShellConfig::default());
        assert!(dir.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_round_trip_through_disk() {
        let dir = tempdir().unwrap();
        let config = ShellConfig {
            runtime_url: "http://127.0.0.1:9000".to_string(),
            background_grace_secs: 5,
            ..Default::default()
        };

        save_config(&config, Some(dir.path())).unwrap();
        assert_eq!(load_config(Some(dir.path())).unwrap(), config);
    }

    #[test]
    fn test_partial_config_fills_missing_fields() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{ "default_host_name": "bastion" }"#,
        )
        .unwrap();

        let config = load_config(Some(dir.path())).unwrap();
        assert_eq!(config.default_host_name, "bastion");
        assert_eq!(config.background_grace_secs, 30);
        assert_eq!(config.session_wake_limit_secs, 24 * 60 * 60);
    }

    #[test]
    #[traced_test]
    fn test_corrupt_config_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "{ not json").unwrap();

        let config = load_config(Some(dir.path())).unwrap();
        assert_eq!(config, ShellConfig::default());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
        assert!(logs_contain("Falling back to default config"));
    }

    #[test]
    fn test_save_creates_nested_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a/b");
        save_config(&ShellConfig::default(), Some(&nested)).unwrap();
        assert!(nested.join(CONFIG_FILE).exists());
    }
}
