//! Signed-in player identity, passed in explicitly

/// Shown on the leaderboard when the player has neither a name nor an email
pub const ANONYMOUS_NAME: &str = "Anonymous Player";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlayerContext {
    pub user_id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

impl PlayerContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Leaderboard name: display name, then email, then a placeholder
    pub fn leaderboard_name(&self) -> &str {
        [&self.display_name, &self.email]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.trim().is_empty())
            .unwrap_or(ANONYMOUS_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_fallbacks() {
        let ctx = PlayerContext::new("u1");
        assert_eq!(ctx.leaderboard_name(), ANONYMOUS_NAME);

        let ctx = ctx.with_email("ada@example.com");
        assert_eq!(ctx.leaderboard_name(), "ada@example.com");

        let ctx = ctx.with_display_name("Ada");
        assert_eq!(ctx.leaderboard_name(), "Ada");

        let blank = PlayerContext::new("u2").with_display_name("  ");
        assert_eq!(blank.leaderboard_name(), ANONYMOUS_NAME);
    }
}
