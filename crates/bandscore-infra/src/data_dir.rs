//! Data directory resolution.

use std::path::PathBuf;

/// Environment override for the data directory.
pub const DATA_DIR_ENV: &str = "BANDSCORE_DATA_DIR";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `BANDSCORE_DATA_DIR` environment variable
/// 2. `~/.bandscore`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".bandscore");
    }

    // Last resort: current directory
    PathBuf::from(".bandscore")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ends_with_bandscore() {
        if std::env::var(DATA_DIR_ENV).is_err() {
            assert!(resolve_data_dir().ends_with(".bandscore"));
        }
    }
}
