use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Application configuration, loaded from a TOML file. Every key is
/// optional; missing sections fall back to the defaults below.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub leaderboard: LeaderboardConfig,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct LeaderboardConfig {
    /// Where the best-score database lives.
    #[serde(default = "defaults::leaderboard_path")]
    pub path: PathBuf,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            path: defaults::leaderboard_path(),
        }
    }
}

impl Config {
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let cfg = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(cfg)
    }
}

mod defaults {
    use std::path::PathBuf;

    pub(super) fn leaderboard_path() -> PathBuf {
        PathBuf::from("leaderboard.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_config_uses_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.leaderboard.path, PathBuf::from("leaderboard.db"));
    }

    #[test]
    fn leaderboard_path_is_overridable() {
        let cfg: Config = toml::from_str(
            r#"
            [leaderboard]
            path = "scores/best.db"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.leaderboard.path, PathBuf::from("scores/best.db"));
    }

    #[test]
    fn from_toml_reads_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("twenty48.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[leaderboard]\npath = \"best.db\"").unwrap();
        let cfg = Config::from_toml(&path).unwrap();
        assert_eq!(cfg.leaderboard.path, PathBuf::from("best.db"));
    }

    #[test]
    fn from_toml_reports_missing_files() {
        let err = Config::from_toml("/nonexistent/twenty48.toml").unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
