use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{
    CatalogueVersion, LearningEvent, Metadata, MilestoneCatalogue, MilestoneRecord,
    MilestoneTotals, NewLearningEvent, StreakSummary, UserId,
};
use tracing::instrument;

use crate::{
    analytics::{AnalyticsReport, WindowAggregator},
    error::{EngineError, EngineResult},
    store::{EventStore, GradingSummary, IdentityDirectory},
    Clock,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressOverview {
    pub user_id: UserId,
    pub total_events: i64,
    pub total_points: i64,
    pub last_activity: Option<DateTime<Utc>>,
    pub challenge_completion_events: i64,
    pub graded_submissions: i64,
    pub average_score: Option<f64>,
    pub completed_challenges: i64,
    pub current_streak_days: u32,
    pub longest_streak_days: u32,
    /// Distinct UTC days with at least one event.
    pub active_days: u32,
}

impl ProgressOverview {
    /// Completions can be recorded either through grading or as events;
    /// the larger count wins so that neither path is under-credited.
    pub fn milestone_totals(&self) -> MilestoneTotals {
        MilestoneTotals {
            total_points: self.total_points,
            total_events: self.total_events,
            challenges_completed: self
                .completed_challenges
                .max(self.challenge_completion_events),
            current_streak_days: self.current_streak_days,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneReport {
    pub stats: ProgressOverview,
    pub catalogue_version: CatalogueVersion,
    pub earned: Vec<MilestoneRecord>,
}

/// User-facing progress operations: overview, event tracking, analytics and milestones.
#[derive(Clone)]
pub struct ProgressService {
    events: Arc<dyn EventStore>,
    grading: Arc<dyn GradingSummary>,
    aggregator: WindowAggregator,
    catalogue: Arc<MilestoneCatalogue>,
    clock: Clock,
}

impl ProgressService {
    pub fn new(
        events: Arc<dyn EventStore>,
        grading: Arc<dyn GradingSummary>,
        identities: Arc<dyn IdentityDirectory>,
        catalogue: Arc<MilestoneCatalogue>,
    ) -> Self {
        Self {
            aggregator: WindowAggregator::new(events.clone(), identities),
            events,
            grading,
            catalogue,
            clock: Utc::now,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// All-or-nothing: a failure in any underlying read fails the whole overview.
    #[instrument(skip(self))]
    pub async fn calculate_overall_progress(
        &self,
        user_id: UserId,
    ) -> EngineResult<ProgressOverview> {
        let today = (self.clock)().date_naive();

        let (totals, days, graded) = futures::try_join!(
            async {
                self.events
                    .totals(user_id)
                    .await
                    .map_err(|e| EngineError::aggregation("failed to load event totals", e))
            },
            async {
                self.events
                    .activity_days(user_id)
                    .await
                    .map_err(|e| EngineError::aggregation("failed to load activity days", e))
            },
            async {
                self.grading
                    .graded_stats(user_id)
                    .await
                    .map_err(|e| EngineError::aggregation("failed to load grading summary", e))
            },
        )?;

        let streak = StreakSummary::from_days(&days, today);

        Ok(ProgressOverview {
            user_id,
            total_events: totals.events,
            total_points: totals.points,
            last_activity: totals.last_activity,
            challenge_completion_events: totals.completions,
            graded_submissions: graded.graded_count,
            average_score: graded.average_score,
            completed_challenges: graded.completed_count,
            current_streak_days: streak.current,
            longest_streak_days: streak.longest,
            active_days: streak.active_days,
        })
    }

    /// Validates and appends one event. Nothing is written when validation fails.
    #[instrument(skip(self, event_data))]
    pub async fn track_event(
        &self,
        user_id: Option<UserId>,
        event_type: Option<&str>,
        event_data: Metadata,
    ) -> EngineResult<LearningEvent> {
        let event = NewLearningEvent::from_payload(user_id, event_type, event_data)?;

        let stored = self
            .events
            .insert(event)
            .await
            .map_err(|e| EngineError::aggregation("failed to record event", e))?;

        tracing::debug!(
            event_id = stored.id,
            user_id = stored.user_id,
            event_type = %stored.event_type,
            points = stored.points_earned,
            "tracked learning event"
        );
        Ok(stored)
    }

    pub async fn generate_analytics(
        &self,
        user_id: Option<UserId>,
        timeframe: &str,
    ) -> EngineResult<AnalyticsReport> {
        self.aggregator
            .aggregate(user_id, timeframe, (self.clock)())
            .await
    }

    #[instrument(skip(self))]
    pub async fn check_milestones(&self, user_id: UserId) -> EngineResult<MilestoneReport> {
        let stats = self.calculate_overall_progress(user_id).await?;
        let earned = self.catalogue.evaluate(&stats.milestone_totals());

        Ok(MilestoneReport {
            stats,
            catalogue_version: self.catalogue.version(),
            earned,
        })
    }
}
