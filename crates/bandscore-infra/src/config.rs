//! Configuration loader for Bandscore.
//!
//! Reads `bandscore.toml` from the data directory (or an explicit path) and
//! deserializes it into [`AppConfig`]. Falls back to defaults when the file
//! is missing or malformed.

use std::path::{Path, PathBuf};

use bandscore_types::config::AppConfig;

/// Configuration file name inside the data directory.
pub const CONFIG_FILE: &str = "bandscore.toml";

/// `{data_dir}/bandscore.toml`.
pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

/// Load configuration from `path`.
///
/// - If the file does not exist, returns [`AppConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
///
/// In every case a relative `criteria_dir` is resolved against the file's
/// directory, so the default `tasks` means `<config dir>/tasks` whether or
/// not the file exists.
pub async fn load_app_config(path: &Path) -> AppConfig {
    let mut config = read_app_config(path).await;
    if config.criteria_dir.is_relative() {
        if let Some(parent) = path.parent() {
            config.criteria_dir = parent.join(&config.criteria_dir);
        }
    }
    config
}

async fn read_app_config(path: &Path) -> AppConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config found at {}, using defaults", path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return AppConfig::default();
        }
    };

    toml::from_str::<AppConfig>(&content).unwrap_or_else(|err| {
        tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
        AppConfig::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bandscore_types::task::WordCountPolicy;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_app_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_app_config(&config_path(tmp.path())).await;
        assert_eq!(config.model.name, "gemini-1.5-flash");
        assert_eq!(config.word_count_policy, WordCountPolicy::Advisory);
        assert_eq!(config.criteria_dir, tmp.path().join("tasks"));
    }

    #[tokio::test]
    async fn default_criteria_dir_same_with_or_without_file() {
        let tmp = TempDir::new().unwrap();
        let path = config_path(tmp.path());
        let without_file = load_app_config(&path).await;

        tokio::fs::write(&path, "word_count_policy = \"blocking\"\n")
            .await
            .unwrap();
        let with_file = load_app_config(&path).await;

        assert_eq!(with_file.word_count_policy, WordCountPolicy::Blocking);
        assert_eq!(without_file.criteria_dir, with_file.criteria_dir);
        assert_eq!(with_file.criteria_dir, tmp.path().join("tasks"));
    }

    #[tokio::test]
    async fn load_app_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        let path = config_path(tmp.path());
        tokio::fs::write(
            &path,
            r#"
criteria_dir = "descriptors"
word_count_policy = "blocking"

[model]
name = "gemini-1.5-pro"
max_output_tokens = 2048

[server]
port = 9000
"#,
        )
        .await
        .unwrap();

        let config = load_app_config(&path).await;
        assert_eq!(config.criteria_dir, tmp.path().join("descriptors"));
        assert_eq!(config.word_count_policy, WordCountPolicy::Blocking);
        assert_eq!(config.model.name, "gemini-1.5-pro");
        assert_eq!(config.model.max_output_tokens, 2048);
        assert_eq!(config.model.temperature, 0.0);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[tokio::test]
    async fn load_app_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        let path = config_path(tmp.path());
        tokio::fs::write(&path, "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_app_config(&path).await;
        assert_eq!(config.server.port, 8501);
        assert_eq!(config.criteria_dir, tmp.path().join("tasks"));
    }

    #[tokio::test]
    async fn absolute_criteria_dir_kept() {
        let tmp = TempDir::new().unwrap();
        let path = config_path(tmp.path());
        let abs = tmp.path().join("abs");
        tokio::fs::write(&path, format!("criteria_dir = {:?}\n", abs.display().to_string()))
            .await
            .unwrap();

        let config = load_app_config(&path).await;
        assert_eq!(config.criteria_dir, abs);
    }
}
