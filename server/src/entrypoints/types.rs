use chrono::{DateTime, NaiveDate, Utc};
use progress_server::{
    analytics::AnalyticsReport,
    error::EngineError,
    leaderboard::LeaderboardPage,
    progress::{MilestoneReport, ProgressOverview},
};
use rocket::{
    http::Status,
    response::{self, Responder},
    serde::json::Json,
    Request,
};
use serde::{Deserialize, Serialize};
use shared::{LearningEvent, Metadata, MilestoneRecord, RankEntry};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Maps engine errors onto HTTP statuses.
#[derive(Debug)]
pub struct ApiError(pub EngineError);

impl From<EngineError> for ApiError {
    fn from(error: EngineError) -> Self {
        Self(error)
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let (status, error) = match &self.0 {
            EngineError::InvalidInput(_) => (Status::BadRequest, "invalid_input"),
            EngineError::NotAvailable(_) => (Status::ServiceUnavailable, "not_available"),
            EngineError::Aggregation(e) => {
                tracing::error!("Aggregation failed: {e:#}");
                (Status::InternalServerError, "aggregation_error")
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            message: self.0.to_string(),
        };
        (status, Json(body)).respond_to(req)
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverviewResponse {
    pub user_id: i32,
    pub total_events: i64,
    pub total_points: i64,
    pub last_activity: Option<DateTime<Utc>>,
    pub challenge_completion_events: i64,
    pub graded_submissions: i64,
    pub average_score: Option<f64>,
    pub completed_challenges: i64,
    pub current_streak_days: u32,
    pub longest_streak_days: u32,
    pub active_days: u32,
}

impl From<ProgressOverview> for OverviewResponse {
    fn from(overview: ProgressOverview) -> Self {
        Self {
            user_id: overview.user_id,
            total_events: overview.total_events,
            total_points: overview.total_points,
            last_activity: overview.last_activity,
            challenge_completion_events: overview.challenge_completion_events,
            graded_submissions: overview.graded_submissions,
            average_score: overview.average_score,
            completed_challenges: overview.completed_challenges,
            current_streak_days: overview.current_streak_days,
            longest_streak_days: overview.longest_streak_days,
            active_days: overview.active_days,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct MilestoneResponse {
    pub key: String,
    pub name: String,
    pub description: String,
}

impl From<MilestoneRecord> for MilestoneResponse {
    fn from(record: MilestoneRecord) -> Self {
        Self {
            key: record.key.to_string(),
            name: record.name.to_string(),
            description: record.description.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MilestonesResponse {
    pub stats: OverviewResponse,
    pub catalogue_version: u32,
    pub earned: Vec<MilestoneResponse>,
}

impl From<MilestoneReport> for MilestonesResponse {
    fn from(report: MilestoneReport) -> Self {
        Self {
            stats: report.stats.into(),
            catalogue_version: report.catalogue_version,
            earned: report.earned.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DailyActivityResponse {
    pub day: NaiveDate,
    pub points: i64,
    pub events: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownResponse {
    pub key: String,
    pub events: i64,
    pub points: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub user_id: i32,
    pub timeframe: String,
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
    pub total_points: i64,
    pub total_events: i64,
    pub daily_series: Vec<DailyActivityResponse>,
    pub by_event_type: Vec<BreakdownResponse>,
    pub by_category: Vec<BreakdownResponse>,
}

impl From<AnalyticsReport> for AnalyticsResponse {
    fn from(report: AnalyticsReport) -> Self {
        Self {
            user_id: report.user_id,
            timeframe: report.timeframe.to_string(),
            since: report.since,
            until: report.until,
            total_points: report.total_points,
            total_events: report.total_events,
            daily_series: report
                .daily_series
                .into_iter()
                .map(|row| DailyActivityResponse {
                    day: row.day,
                    points: row.points,
                    events: row.events,
                })
                .collect(),
            by_event_type: report
                .by_event_type
                .into_iter()
                .map(|row| BreakdownResponse {
                    key: row.event_type,
                    events: row.events,
                    points: row.points,
                })
                .collect(),
            by_category: report
                .by_category
                .into_iter()
                .map(|row| BreakdownResponse {
                    key: row.category,
                    events: row.events,
                    points: row.points,
                })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackEventRequest {
    pub event_type: Option<String>,
    /// Recognised fields (`pointsEarned`, `related*Id`, `sessionId`) plus free-form metadata.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub data: Metadata,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LearningEventResponse {
    pub id: i64,
    pub user_id: i32,
    pub event_type: String,
    pub points_earned: i32,
    pub occurred_at: DateTime<Utc>,
    pub related_goal_id: Option<i32>,
    pub related_challenge_id: Option<i32>,
    pub related_submission_id: Option<i32>,
    pub session_id: Option<String>,
    #[schema(value_type = Object)]
    pub metadata: Metadata,
}

impl From<LearningEvent> for LearningEventResponse {
    fn from(event: LearningEvent) -> Self {
        Self {
            id: event.id,
            user_id: event.user_id,
            event_type: event.event_type,
            points_earned: event.points_earned,
            occurred_at: event.occurred_at,
            related_goal_id: event.related_goal_id,
            related_challenge_id: event.related_challenge_id,
            related_submission_id: event.related_submission_id,
            session_id: event.session_id,
            metadata: event.metadata,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankResponse {
    pub rank: u32,
    pub user_id: i32,
    pub display_name: String,
    pub total_points: i64,
    pub challenges_completed: i64,
    pub average_score: Option<f64>,
}

impl From<RankEntry> for RankResponse {
    fn from(entry: RankEntry) -> Self {
        Self {
            rank: entry.rank,
            user_id: entry.user_id,
            display_name: entry.display_name,
            total_points: entry.total_points,
            challenges_completed: entry.challenges_completed,
            average_score: entry.average_score,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardResponse {
    pub timeframe: String,
    pub total_records: u64,
    pub limit: u64,
    pub records: Vec<RankResponse>,
}

impl LeaderboardResponse {
    pub fn new(page: LeaderboardPage, limit: usize) -> Self {
        Self {
            timeframe: page.timeframe.to_string(),
            total_records: page.total_records,
            limit: limit as u64,
            records: page.records.into_iter().map(Into::into).collect(),
        }
    }
}
