use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Env {
    #[serde(default = "default_leaderboard_limit")]
    pub default_leaderboard_limit: usize,
    #[serde(default = "max_leaderboard_limit")]
    pub max_leaderboard_limit: usize,
    /// Weekly and monthly boards scan the event stream; they can be switched off.
    #[serde(default = "enabled")]
    pub enable_event_leaderboards: bool,
}

const fn default_leaderboard_limit() -> usize {
    50
}

const fn max_leaderboard_limit() -> usize {
    500
}

const fn enabled() -> bool {
    true
}

impl Env {
    pub fn load() -> anyhow::Result<Self> {
        Ok(envy::from_env::<Env>()?)
    }

    /// Requested limit clamped to the configured maximum.
    pub fn leaderboard_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_leaderboard_limit)
            .clamp(1, self.max_leaderboard_limit.max(1))
    }
}

impl Default for Env {
    fn default() -> Self {
        Self {
            default_leaderboard_limit: default_leaderboard_limit(),
            max_leaderboard_limit: max_leaderboard_limit(),
            enable_event_leaderboards: enabled(),
        }
    }
}
