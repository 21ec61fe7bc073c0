//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use voc_analyzer::AnalyzerConfig;
use voc_collector::CollectorConfig;
use voc_domain::GameConfig;
use voc_llm::GroqConfig;
use voc_reporter::TelegramConfig;

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding `reviews.csv` and derived reports
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory of review dumps used by `run` when `--source` is not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_dir: Option<PathBuf>,

    /// Default look-back window in days
    #[serde(default = "default_days")]
    pub days: u32,

    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Tracked games
    #[serde(default)]
    pub games: Vec<GameConfig>,

    /// Batch analysis settings
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// LLM provider settings
    #[serde(default)]
    pub provider: GroqConfig,

    /// Collection pacing
    #[serde(default)]
    pub collector: CollectorConfig,

    /// Briefing delivery
    #[serde(default)]
    pub telegram: TelegramConfig,
}

impl Config {
    /// Get the default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".voc").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. The default path falls back to built-in
    /// defaults when there is no file yet.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = Self::default_path()?;
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        self.analyzer.validate().map_err(CliError::Config)?;

        let mut keys = HashSet::new();
        for game in &self.games {
            if game.key.trim().is_empty() || game.app_id.trim().is_empty() {
                return Err(CliError::Config(
                    "Every game needs a key and an app_id".to_string(),
                ));
            }
            if !keys.insert(game.key.as_str()) {
                return Err(CliError::Config(format!("Duplicate game key '{}'", game.key)));
            }
        }
        Ok(())
    }

    /// Look up a game by key.
    pub fn game(&self, key: &str) -> Result<&GameConfig> {
        self.games.iter().find(|g| g.key == key).ok_or_else(|| {
            let known: Vec<&str> = self.games.iter().map(|g| g.key.as_str()).collect();
            CliError::InvalidInput(format!(
                "Unknown game '{}' (configured: {})",
                key,
                known.join(", ")
            ))
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            source_dir: None,
            days: default_days(),
            color: true,
            games: Vec::new(),
            analyzer: AnalyzerConfig::default(),
            provider: GroqConfig::default(),
            collector: CollectorConfig::default(),
            telegram: TelegramConfig::default(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_days() -> u32 {
    30
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
data_dir = "/var/lib/voc"
days = 14

[[games]]
key = "lineage_m"
app_id = "com.ncsoft.lineagem19"
genre = "MMORPG"
label = "리니지M"

[[games]]
key = "odin"
app_id = "com.kakaogames.odin"
genre = "MMORPG"

[analyzer]
batch_size = 5

[analyzer.taxonomy]
categories = ["BM", "서버"]
sentiments = ["부정", "긍정"]

[provider]
model = "llama-3.1-8b-instant"

[telegram]
chat_id_env = "VOC_CHAT"
"#;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.days, 30);
        assert!(config.games.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_sample() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.days, 14);
        assert_eq!(config.games.len(), 2);
        assert_eq!(config.games[0].display_name(), "리니지M");
        assert_eq!(config.analyzer.batch_size, 5);
        assert_eq!(config.analyzer.requests_per_minute, 30);
        assert_eq!(config.analyzer.taxonomy.categories, vec!["BM", "서버"]);
        assert_eq!(config.provider.model, "llama-3.1-8b-instant");
        assert_eq!(config.provider.api_key_env, "GROQ_API_KEY");
        assert_eq!(config.telegram.chat_id_env, "VOC_CHAT");
        assert_eq!(config.telegram.token_env, "TELEGRAM_BOT_TOKEN");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_duplicate_game_keys_rejected() {
        let mut config: Config = toml::from_str(SAMPLE).unwrap();
        config.games[1].key = "lineage_m".to_string();
        assert!(matches!(config.validate(), Err(CliError::Config(_))));
    }

    #[test]
    fn test_game_lookup() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.game("odin").unwrap().app_id, "com.kakaogames.odin");
        assert!(matches!(config.game("maple"), Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.toml");
        let result = Config::load(Some(missing.as_path()));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, SAMPLE).unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config, toml::from_str::<Config>(SAMPLE).unwrap());
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/voc"));
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[analyzer]\nbatch_size = 0\n").unwrap();

        assert!(matches!(
            Config::load(Some(path.as_path())),
            Err(CliError::Config(_))
        ));
    }
}
