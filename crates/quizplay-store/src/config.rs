//! quizplay configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Top-level quizplay configuration.
///
/// The time budget and the notice lifetime are fixed by the engine and
/// have no setting here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizplayConfig {
    /// Directory searched for quiz files.
    #[serde(default = "default_quiz_dir")]
    pub quiz_dir: PathBuf,
    /// Where the last session result is written.
    #[serde(default = "default_results_path")]
    pub results_path: PathBuf,
    /// Where `:save` writes the session snapshot.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,
    /// Milliseconds between timer ticks. Each tick is one second of quiz
    /// time, so anything other than 1000 speeds up or slows down the clock.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

fn default_quiz_dir() -> PathBuf {
    PathBuf::from("./quizzes")
}
fn default_results_path() -> PathBuf {
    PathBuf::from("./quizplay-results/last-result.json")
}
fn default_snapshot_path() -> PathBuf {
    PathBuf::from("./quizplay-results/session.json")
}
fn default_tick_interval_ms() -> u64 {
    1000
}

impl Default for QuizplayConfig {
    fn default() -> Self {
        Self {
            quiz_dir: default_quiz_dir(),
            results_path: default_results_path(),
            snapshot_path: default_snapshot_path(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizplay.toml` in the current directory
/// 2. `~/.config/quizplay/config.toml`
///
/// Environment variable override: `QUIZPLAY_RESULTS_PATH`.
pub fn load_config() -> Result<QuizplayConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizplayConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            return Err(StoreError::ConfigNotFound(p.to_path_buf()).into());
        }
    } else {
        let local = PathBuf::from("quizplay.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizplayConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizplayConfig::default(),
    };

    if let Ok(results) = std::env::var("QUIZPLAY_RESULTS_PATH") {
        config.results_path = PathBuf::from(results);
    }

    config.quiz_dir = resolve_path(&config.quiz_dir);
    config.results_path = resolve_path(&config.results_path);
    config.snapshot_path = resolve_path(&config.snapshot_path);

    anyhow::ensure!(
        config.tick_interval_ms >= 1,
        "tick_interval_ms must be at least 1"
    );

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizplay"))
}
