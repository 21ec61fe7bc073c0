//! Tracked game configuration

use serde::{Deserialize, Serialize};

/// One game whose store reviews are collected and analyzed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Short key used in records and on the command line
    pub key: String,

    /// Store application id (e.g. "com.ncsoft.lineagem19")
    pub app_id: String,

    /// Genre written into every collected record
    pub genre: String,

    /// Display name for reports; falls back to `key`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl GameConfig {
    /// Name to show in reports
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_falls_back_to_key() {
        let mut game = GameConfig {
            key: "odin".to_string(),
            app_id: "com.kakaogames.odin".to_string(),
            genre: "MMORPG".to_string(),
            label: None,
        };
        assert_eq!(game.display_name(), "odin");

        game.label = Some("오딘".to_string());
        assert_eq!(game.display_name(), "오딘");
    }
}
