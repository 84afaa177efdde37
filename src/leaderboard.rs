//! Per-game leaderboard
//!
//! Entries are appended whenever a player sets a new personal record and
//! are never removed; readers ask for the top N.

use serde::{Deserialize, Serialize};

/// A single leaderboard row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub user_name: String,
    pub score: u64,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Append-only leaderboard for one game
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: LeaderboardEntry) {
        self.entries.push(entry);
    }

    /// Best `limit` entries, highest score first; ties go to the earlier entry
    pub fn top(&self, limit: usize) -> Vec<LeaderboardEntry> {
        let mut rows = self.entries.clone();
        rows.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.timestamp.total_cmp(&b.timestamp))
        });
        rows.truncate(limit);
        rows
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Format a timestamp as a relative date string
#[cfg(target_arch = "wasm32")]
pub fn format_date(timestamp: f64) -> String {
    let now = js_sys::Date::now();
    let diff_ms = now - timestamp;
    let diff_mins = diff_ms / 60_000.0;
    let diff_hours = diff_mins / 60.0;
    let diff_days = diff_hours / 24.0;

    if diff_days >= 1.0 {
        let days = diff_days.floor() as i32;
        if days == 1 {
            "Yesterday".to_string()
        } else if days < 7 {
            format!("{} days ago", days)
        } else {
            let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(timestamp));
            format!(
                "{}/{}/{}",
                date.get_month() + 1,
                date.get_date(),
                date.get_full_year() % 100
            )
        }
    } else if diff_hours >= 1.0 {
        let hours = diff_hours.floor() as i32;
        if hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", hours)
        }
    } else if diff_mins >= 1.0 {
        let mins = diff_mins.floor() as i32;
        if mins == 1 {
            "1 min ago".to_string()
        } else {
            format!("{} mins ago", mins)
        }
    } else {
        "Just now".to_string()
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn format_date(_timestamp: f64) -> String {
    "N/A".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(user: &str, score: u64, timestamp: f64) -> LeaderboardEntry {
        LeaderboardEntry {
            user_id: user.to_string(),
            user_name: user.to_uppercase(),
            score,
            timestamp,
        }
    }

    #[test]
    fn test_top_orders_by_score_then_time() {
        let mut board = Leaderboard::new();
        board.push(entry("a", 100, 3.0));
        board.push(entry("b", 300, 2.0));
        board.push(entry("c", 100, 1.0));
        board.push(entry("d", 200, 4.0));

        let top = board.top(3);
        let users: Vec<_> = top.iter().map(|e| e.user_id.as_str()).collect();
        assert_eq!(users, ["b", "d", "c"]);
        assert_eq!(board.len(), 4);
    }

    #[test]
    fn test_entries_are_kept() {
        let mut board = Leaderboard::new();
        for i in 0..25 {
            board.push(entry("p", i, i as f64));
        }
        assert_eq!(board.len(), 25);
        assert_eq!(board.top(10).len(), 10);
        assert_eq!(board.top(1)[0].score, 24);
    }

    #[test]
    fn test_camel_case_json() {
        let json = serde_json::to_string(&entry("u1", 42, 1.5)).unwrap();
        assert!(json.contains("\"userId\":\"u1\""));
        assert!(json.contains("\"userName\":\"U1\""));
    }
}
