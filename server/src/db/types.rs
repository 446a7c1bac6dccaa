use chrono::{DateTime, NaiveDate, Utc};
use shared::{
    CategoryBreakdown, DailyActivity, EventTypeBreakdown, LearningEvent, Metadata, UserId,
};
use sqlx::types::Json;

use crate::store::{
    EventTotals, GradedStats, UserIdentity, UserStatisticsSnapshot, WindowTotals,
};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LearningEventRecord {
    pub id: i64,
    pub user_id: i32,
    pub event_type: String,
    pub points_earned: i32,
    pub occurred_at: DateTime<Utc>,
    pub related_goal_id: Option<i32>,
    pub related_challenge_id: Option<i32>,
    pub related_submission_id: Option<i32>,
    pub session_id: Option<String>,
    pub metadata: Json<Metadata>,
}

impl From<LearningEventRecord> for LearningEvent {
    fn from(record: LearningEventRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            event_type: record.event_type,
            points_earned: record.points_earned,
            occurred_at: record.occurred_at,
            related_goal_id: record.related_goal_id,
            related_challenge_id: record.related_challenge_id,
            related_submission_id: record.related_submission_id,
            session_id: record.session_id,
            metadata: record.metadata.0,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventTotalsRecord {
    pub points: i64,
    pub events: i64,
    pub completions: i64,
    pub last_activity: Option<DateTime<Utc>>,
}

impl From<EventTotalsRecord> for EventTotals {
    fn from(record: EventTotalsRecord) -> Self {
        Self {
            points: record.points,
            events: record.events,
            completions: record.completions,
            last_activity: record.last_activity,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DailyActivityRecord {
    pub day: NaiveDate,
    pub points: i64,
    pub events: i64,
}

impl From<DailyActivityRecord> for DailyActivity {
    fn from(record: DailyActivityRecord) -> Self {
        Self {
            day: record.day,
            points: record.points,
            events: record.events,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventTypeRecord {
    pub event_type: String,
    pub events: i64,
    pub points: i64,
}

impl From<EventTypeRecord> for EventTypeBreakdown {
    fn from(record: EventTypeRecord) -> Self {
        Self {
            event_type: record.event_type,
            events: record.events,
            points: record.points,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryRecord {
    pub category: String,
    pub events: i64,
    pub points: i64,
}

impl From<CategoryRecord> for CategoryBreakdown {
    fn from(record: CategoryRecord) -> Self {
        Self {
            category: record.category,
            events: record.events,
            points: record.points,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WindowTotalsRecord {
    pub user_id: i32,
    pub points: i64,
    pub completions: i64,
}

impl From<WindowTotalsRecord> for WindowTotals {
    fn from(record: WindowTotalsRecord) -> Self {
        Self {
            user_id: record.user_id,
            points: record.points,
            completions: record.completions,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GradedStatsRecord {
    pub graded_count: i64,
    pub average_score: Option<f64>,
    pub completed_count: i64,
}

impl From<GradedStatsRecord> for GradedStats {
    fn from(record: GradedStatsRecord) -> Self {
        Self {
            graded_count: record.graded_count,
            average_score: record.average_score,
            completed_count: record.completed_count,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StatisticsRecord {
    pub user_id: i32,
    pub total_points: Option<i64>,
    pub total_challenges_completed: Option<i64>,
    pub average_score: Option<f64>,
    pub join_date: Option<DateTime<Utc>>,
}

impl From<StatisticsRecord> for UserStatisticsSnapshot {
    fn from(record: StatisticsRecord) -> Self {
        Self {
            user_id: record.user_id,
            total_points: record.total_points,
            total_challenges_completed: record.total_challenges_completed,
            average_score: record.average_score,
            join_date: record.join_date,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub user_id: UserId,
    pub display_name: String,
    pub join_date: Option<DateTime<Utc>>,
}

impl From<UserRecord> for UserIdentity {
    fn from(record: UserRecord) -> Self {
        Self {
            user_id: record.user_id,
            display_name: record.display_name,
            join_date: record.join_date,
        }
    }
}
