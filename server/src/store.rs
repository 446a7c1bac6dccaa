//! Collaborators the engine reads from. Every method is a plain data access with no
//! logic of its own; adapters report failures as `anyhow` errors and the engine
//! decides what they mean.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::{
    CategoryBreakdown, DailyActivity, EventTypeBreakdown, LearningEvent, NewLearningEvent, UserId,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EventTotals {
    pub points: i64,
    pub events: i64,
    /// Number of `challenge_completed` events.
    pub completions: i64,
    pub last_activity: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GradedStats {
    pub graded_count: i64,
    pub average_score: Option<f64>,
    /// Graded submissions scoring at least [`PASSING_SCORE`].
    pub completed_count: i64,
}

pub const PASSING_SCORE: f64 = 60.0;

/// Per-user points and completions over a leaderboard window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowTotals {
    pub user_id: UserId,
    pub points: i64,
    pub completions: i64,
}

/// Maintained aggregate cache. May lag behind the event stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStatisticsSnapshot {
    pub user_id: UserId,
    pub total_points: Option<i64>,
    pub total_challenges_completed: Option<i64>,
    pub average_score: Option<f64>,
    pub join_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub user_id: UserId,
    pub display_name: String,
    pub join_date: Option<DateTime<Utc>>,
}

#[async_trait::async_trait]
pub trait EventStore: Send + Sync {
    async fn insert(&self, event: NewLearningEvent) -> anyhow::Result<LearningEvent>;

    async fn totals(&self, user_id: UserId) -> anyhow::Result<EventTotals>;

    /// Distinct UTC dates with at least one event.
    async fn activity_days(&self, user_id: UserId) -> anyhow::Result<Vec<NaiveDate>>;

    async fn windowed_series(
        &self,
        user_id: UserId,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> anyhow::Result<Vec<DailyActivity>>;

    async fn windowed_by_type(
        &self,
        user_id: UserId,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> anyhow::Result<Vec<EventTypeBreakdown>>;

    /// Joins through the challenge catalogue; events without a categorised challenge are skipped.
    async fn windowed_by_category(
        &self,
        user_id: UserId,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> anyhow::Result<Vec<CategoryBreakdown>>;

    async fn window_totals(
        &self,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> anyhow::Result<Vec<WindowTotals>>;
}

#[async_trait::async_trait]
pub trait GradingSummary: Send + Sync {
    async fn graded_stats(&self, user_id: UserId) -> anyhow::Result<GradedStats>;
}

#[async_trait::async_trait]
pub trait StatisticsStore: Send + Sync {
    async fn snapshots(&self) -> anyhow::Result<Vec<UserStatisticsSnapshot>>;
}

#[async_trait::async_trait]
pub trait IdentityDirectory: Send + Sync {
    async fn identity(&self, user_id: UserId) -> anyhow::Result<Option<UserIdentity>>;

    async fn identities(&self, user_ids: &[UserId]) -> anyhow::Result<Vec<UserIdentity>>;
}
