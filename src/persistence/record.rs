//! Stored per-player, per-game progress

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerRecord {
    pub high_score: u64,
    /// Highest level reached
    pub level: u32,
    pub games_played: u64,
    /// Whole seconds played across all runs
    pub total_time: u64,
    /// Unix timestamp (ms) of the last save
    pub last_played: Option<f64>,
    pub achievements: Vec<String>,
}

impl Default for PlayerRecord {
    fn default() -> Self {
        Self {
            high_score: 0,
            level: 1,
            games_played: 0,
            total_time: 0,
            last_played: None,
            achievements: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let record: PlayerRecord = serde_json::from_str(r#"{"highScore": 420}"#).unwrap();
        assert_eq!(record.high_score, 420);
        assert_eq!(record.level, 1);
        assert_eq!(record.games_played, 0);
        assert!(record.achievements.is_empty());
    }

    #[test]
    fn test_camel_case_keys() {
        let record = PlayerRecord {
            games_played: 3,
            total_time: 75,
            ..Default::default()
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"gamesPlayed\":3"));
        assert!(json.contains("\"totalTime\":75"));
    }
}
