use chrono::{DateTime, NaiveDate, Utc};
use rocket::{
    fairing::{self, AdHoc},
    Build, Rocket,
};
use rocket_db_pools::Database;
use shared::{
    CategoryBreakdown, DailyActivity, EventTypeBreakdown, LearningEvent, NewLearningEvent, UserId,
    CATEGORY_LIMIT, CHALLENGE_COMPLETED,
};
use sqlx::{types::Json, PgPool};
use tracing::instrument;

use crate::store::{
    EventStore, EventTotals, GradedStats, GradingSummary, IdentityDirectory, StatisticsStore,
    UserIdentity, UserStatisticsSnapshot, WindowTotals, PASSING_SCORE,
};

#[derive(Database, Clone, Debug)]
#[database("progress")]
pub struct DB(PgPool);

pub mod types;

use self::types::{
    CategoryRecord, DailyActivityRecord, EventTotalsRecord, EventTypeRecord, GradedStatsRecord,
    LearningEventRecord, StatisticsRecord, UserRecord, WindowTotalsRecord,
};

#[async_trait::async_trait]
impl EventStore for DB {
    #[instrument(skip(self, event), fields(user_id = event.user_id, event_type = %event.event_type))]
    async fn insert(&self, event: NewLearningEvent) -> anyhow::Result<LearningEvent> {
        let rec = sqlx::query_as::<_, LearningEventRecord>(
            r#"
            INSERT INTO learning_events (user_id, event_type, points_earned, related_goal_id, related_challenge_id, related_submission_id, session_id, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, event_type, points_earned, occurred_at, related_goal_id, related_challenge_id, related_submission_id, session_id, metadata
            "#,
        )
        .bind(event.user_id)
        .bind(&event.event_type)
        .bind(event.points_earned)
        .bind(event.related_goal_id)
        .bind(event.related_challenge_id)
        .bind(event.related_submission_id)
        .bind(&event.session_id)
        .bind(Json(&event.metadata))
        .fetch_one(&self.0)
        .await?;

        Ok(rec.into())
    }

    #[instrument(skip(self))]
    async fn totals(&self, user_id: UserId) -> anyhow::Result<EventTotals> {
        let rec = sqlx::query_as::<_, EventTotalsRecord>(
            r#"
            SELECT COALESCE(SUM(points_earned), 0)::BIGINT AS points,
                   COUNT(*) AS events,
                   COUNT(*) FILTER (WHERE event_type = $2) AS completions,
                   MAX(occurred_at) AS last_activity
            FROM learning_events
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(CHALLENGE_COMPLETED)
        .fetch_one(&self.0)
        .await?;

        Ok(rec.into())
    }

    #[instrument(skip(self))]
    async fn activity_days(&self, user_id: UserId) -> anyhow::Result<Vec<NaiveDate>> {
        Ok(sqlx::query_scalar::<_, NaiveDate>(
            r#"
            SELECT DISTINCT (occurred_at AT TIME ZONE 'UTC')::DATE AS day
            FROM learning_events
            WHERE user_id = $1
            ORDER BY day
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.0)
        .await?)
    }

    #[instrument(skip(self))]
    async fn windowed_series(
        &self,
        user_id: UserId,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> anyhow::Result<Vec<DailyActivity>> {
        let records = sqlx::query_as::<_, DailyActivityRecord>(
            r#"
            SELECT (occurred_at AT TIME ZONE 'UTC')::DATE AS day,
                   COALESCE(SUM(points_earned), 0)::BIGINT AS points,
                   COUNT(*) AS events
            FROM learning_events
            WHERE user_id = $1 AND occurred_at >= $2 AND occurred_at <= $3
            GROUP BY day
            ORDER BY day ASC
            "#,
        )
        .bind(user_id)
        .bind(since)
        .bind(until)
        .fetch_all(&self.0)
        .await?;

        Ok(records.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn windowed_by_type(
        &self,
        user_id: UserId,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> anyhow::Result<Vec<EventTypeBreakdown>> {
        let records = sqlx::query_as::<_, EventTypeRecord>(
            r#"
            SELECT event_type,
                   COUNT(*) AS events,
                   COALESCE(SUM(points_earned), 0)::BIGINT AS points
            FROM learning_events
            WHERE user_id = $1 AND occurred_at >= $2 AND occurred_at <= $3
            GROUP BY event_type
            ORDER BY points DESC, events DESC, event_type ASC
            "#,
        )
        .bind(user_id)
        .bind(since)
        .bind(until)
        .fetch_all(&self.0)
        .await?;

        Ok(records.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn windowed_by_category(
        &self,
        user_id: UserId,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> anyhow::Result<Vec<CategoryBreakdown>> {
        let records = sqlx::query_as::<_, CategoryRecord>(
            r#"
            SELECT c.category,
                   COUNT(*) AS events,
                   COALESCE(SUM(e.points_earned), 0)::BIGINT AS points
            FROM learning_events e
            JOIN challenges c ON c.id = e.related_challenge_id
            WHERE e.user_id = $1 AND e.occurred_at >= $2 AND e.occurred_at <= $3
              AND c.category IS NOT NULL
            GROUP BY c.category
            ORDER BY points DESC, events DESC, c.category ASC
            LIMIT $4
            "#,
        )
        .bind(user_id)
        .bind(since)
        .bind(until)
        .bind(CATEGORY_LIMIT as i64)
        .fetch_all(&self.0)
        .await?;

        Ok(records.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn window_totals(
        &self,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> anyhow::Result<Vec<WindowTotals>> {
        let records = sqlx::query_as::<_, WindowTotalsRecord>(
            r#"
            SELECT user_id,
                   COALESCE(SUM(points_earned), 0)::BIGINT AS points,
                   COUNT(*) FILTER (WHERE event_type = $3) AS completions
            FROM learning_events
            WHERE occurred_at >= $1 AND occurred_at <= $2
            GROUP BY user_id
            "#,
        )
        .bind(since)
        .bind(until)
        .bind(CHALLENGE_COMPLETED)
        .fetch_all(&self.0)
        .await?;

        Ok(records.into_iter().map(Into::into).collect())
    }
}

#[async_trait::async_trait]
impl GradingSummary for DB {
    #[instrument(skip(self))]
    async fn graded_stats(&self, user_id: UserId) -> anyhow::Result<GradedStats> {
        let rec = sqlx::query_as::<_, GradedStatsRecord>(
            r#"
            SELECT COUNT(score) AS graded_count,
                   AVG(score)::FLOAT8 AS average_score,
                   COUNT(*) FILTER (WHERE score >= $2) AS completed_count
            FROM submissions
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(PASSING_SCORE)
        .fetch_one(&self.0)
        .await?;

        Ok(rec.into())
    }
}

#[async_trait::async_trait]
impl StatisticsStore for DB {
    #[instrument(skip(self))]
    async fn snapshots(&self) -> anyhow::Result<Vec<UserStatisticsSnapshot>> {
        let records = sqlx::query_as::<_, StatisticsRecord>(
            r#"
            SELECT s.user_id,
                   s.total_points::BIGINT AS total_points,
                   s.total_challenges_completed::BIGINT AS total_challenges_completed,
                   s.average_score::FLOAT8 AS average_score,
                   u.created_at AS join_date
            FROM user_statistics s
            JOIN users u ON u.id = s.user_id
            "#,
        )
        .fetch_all(&self.0)
        .await?;

        Ok(records.into_iter().map(Into::into).collect())
    }
}

#[async_trait::async_trait]
impl IdentityDirectory for DB {
    #[instrument(skip(self))]
    async fn identity(&self, user_id: UserId) -> anyhow::Result<Option<UserIdentity>> {
        let rec = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id AS user_id, COALESCE(full_name, login) AS display_name, created_at AS join_date
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.0)
        .await?;

        Ok(rec.map(Into::into))
    }

    #[instrument(skip(self, user_ids), fields(count = user_ids.len()))]
    async fn identities(&self, user_ids: &[UserId]) -> anyhow::Result<Vec<UserIdentity>> {
        let records = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id AS user_id, COALESCE(full_name, login) AS display_name, created_at AS join_date
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.0)
        .await?;

        Ok(records.into_iter().map(Into::into).collect())
    }
}

async fn run_migrations(rocket: Rocket<Build>) -> fairing::Result {
    match DB::fetch(&rocket) {
        Some(db) => match sqlx::migrate!("./migrations").run(&**db).await {
            Ok(_) => Ok(rocket),
            Err(e) => {
                rocket::error!("Failed to initialize SQLx database: {}", e);
                Err(rocket)
            }
        },
        None => Err(rocket),
    }
}

pub fn stage() -> AdHoc {
    AdHoc::on_ignite("SQLx Stage", |rocket| async {
        rocket
            .attach(DB::init())
            .attach(AdHoc::try_on_ignite("SQLx Migrations", run_migrations))
    })
}
