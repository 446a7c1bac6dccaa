use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{
    order_breakdown, order_categories, order_series, AnalyticsTimeframe, CategoryBreakdown,
    DailyActivity, EventTypeBreakdown, UserId,
};
use tracing::instrument;

use crate::{
    error::{EngineError, EngineResult},
    store::{EventStore, IdentityDirectory},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub user_id: UserId,
    pub timeframe: AnalyticsTimeframe,
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
    pub total_points: i64,
    pub total_events: i64,
    pub daily_series: Vec<DailyActivity>,
    pub by_event_type: Vec<EventTypeBreakdown>,
    pub by_category: Vec<CategoryBreakdown>,
}

/// Resolves a timeframe token into a lookback window and groups the user's
/// events inside it.
#[derive(Clone)]
pub struct WindowAggregator {
    events: Arc<dyn EventStore>,
    identities: Arc<dyn IdentityDirectory>,
}

impl WindowAggregator {
    pub fn new(events: Arc<dyn EventStore>, identities: Arc<dyn IdentityDirectory>) -> Self {
        Self { events, identities }
    }

    #[instrument(skip(self))]
    pub async fn aggregate(
        &self,
        user_id: Option<UserId>,
        token: &str,
        now: DateTime<Utc>,
    ) -> EngineResult<AnalyticsReport> {
        let user_id = user_id.ok_or_else(|| {
            EngineError::Aggregation(anyhow::anyhow!("user id is required for analytics"))
        })?;

        let known = self
            .identities
            .identity(user_id)
            .await
            .map_err(|e| EngineError::aggregation("failed to resolve user", e))?;
        if known.is_none() {
            return Err(EngineError::Aggregation(anyhow::anyhow!(
                "unknown user {user_id}"
            )));
        }

        let timeframe = AnalyticsTimeframe::from_token(token);
        let since = timeframe.start_period(now);

        let (mut daily_series, mut by_event_type, by_category) = futures::try_join!(
            self.events.windowed_series(user_id, since, now),
            self.events.windowed_by_type(user_id, since, now),
            self.events.windowed_by_category(user_id, since, now),
        )
        .map_err(|e| EngineError::aggregation("failed to aggregate events", e))?;

        order_series(&mut daily_series);
        order_breakdown(&mut by_event_type);
        let by_category = order_categories(by_category);

        let total_points = daily_series.iter().map(|row| row.points).sum();
        let total_events = daily_series.iter().map(|row| row.events).sum();
        tracing::debug!(
            user_id,
            %timeframe,
            days = daily_series.len(),
            total_points,
            "aggregated analytics window"
        );

        Ok(AnalyticsReport {
            user_id,
            timeframe,
            since,
            until: now,
            total_points,
            total_events,
            daily_series,
            by_event_type,
            by_category,
        })
    }
}
