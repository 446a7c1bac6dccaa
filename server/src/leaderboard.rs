use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{rank_candidates, LeaderboardTimeframe, RankEntry, RankingCandidate, UserId};
use tracing::instrument;

use crate::{
    error::{EngineError, EngineResult},
    store::{EventStore, IdentityDirectory, StatisticsStore, UserIdentity},
    Clock,
};

/// Produces unordered ranking candidates for one kind of timeframe.
#[async_trait::async_trait]
pub trait RankingSource: Send + Sync {
    async fn candidates(
        &self,
        timeframe: LeaderboardTimeframe,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Vec<RankingCandidate>>;
}

/// All-time board, read from the maintained statistics table.
pub struct SnapshotSource {
    statistics: Arc<dyn StatisticsStore>,
    identities: Arc<dyn IdentityDirectory>,
}

impl SnapshotSource {
    pub fn new(
        statistics: Arc<dyn StatisticsStore>,
        identities: Arc<dyn IdentityDirectory>,
    ) -> Self {
        Self {
            statistics,
            identities,
        }
    }
}

#[async_trait::async_trait]
impl RankingSource for SnapshotSource {
    async fn candidates(
        &self,
        _timeframe: LeaderboardTimeframe,
        _now: DateTime<Utc>,
    ) -> anyhow::Result<Vec<RankingCandidate>> {
        let snapshots = self.statistics.snapshots().await?;
        let user_ids: Vec<UserId> = snapshots.iter().map(|snapshot| snapshot.user_id).collect();
        let mut identities = identities_by_id(self.identities.as_ref(), &user_ids).await?;

        Ok(snapshots
            .into_iter()
            .map(|snapshot| {
                let identity = identities.remove(&snapshot.user_id);
                RankingCandidate {
                    user_id: snapshot.user_id,
                    join_date: snapshot
                        .join_date
                        .or_else(|| identity.as_ref().and_then(|identity| identity.join_date)),
                    display_name: display_name(snapshot.user_id, identity),
                    total_points: snapshot.total_points,
                    challenges_completed: snapshot.total_challenges_completed,
                    average_score: snapshot.average_score,
                }
            })
            .collect())
    }
}

/// Weekly and monthly boards, rolled up from the event stream.
pub struct EventWindowSource {
    events: Arc<dyn EventStore>,
    identities: Arc<dyn IdentityDirectory>,
}

impl EventWindowSource {
    pub fn new(events: Arc<dyn EventStore>, identities: Arc<dyn IdentityDirectory>) -> Self {
        Self { events, identities }
    }
}

#[async_trait::async_trait]
impl RankingSource for EventWindowSource {
    async fn candidates(
        &self,
        timeframe: LeaderboardTimeframe,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Vec<RankingCandidate>> {
        let since = timeframe
            .start_period(now)
            .ok_or_else(|| anyhow::anyhow!("{timeframe} leaderboard has no event window"))?;

        let totals = self.events.window_totals(since, now).await?;
        let user_ids: Vec<UserId> = totals.iter().map(|row| row.user_id).collect();
        let mut identities = identities_by_id(self.identities.as_ref(), &user_ids).await?;

        Ok(totals
            .into_iter()
            .map(|row| {
                let identity = identities.remove(&row.user_id);
                RankingCandidate {
                    user_id: row.user_id,
                    join_date: identity.as_ref().and_then(|identity| identity.join_date),
                    display_name: display_name(row.user_id, identity),
                    total_points: Some(row.points),
                    challenges_completed: Some(row.completions),
                    average_score: None,
                }
            })
            .collect())
    }
}

async fn identities_by_id(
    directory: &dyn IdentityDirectory,
    user_ids: &[UserId],
) -> anyhow::Result<HashMap<UserId, UserIdentity>> {
    Ok(directory
        .identities(user_ids)
        .await?
        .into_iter()
        .map(|identity| (identity.user_id, identity))
        .collect())
}

fn display_name(user_id: UserId, identity: Option<UserIdentity>) -> String {
    identity
        .map(|identity| identity.display_name)
        .unwrap_or_else(|| format!("user-{user_id}"))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardPage {
    pub timeframe: LeaderboardTimeframe,
    pub total_records: u64,
    pub records: Vec<RankEntry>,
}

/// Orders users by timeframe. The all-time board reads the snapshot source,
/// weekly and monthly boards read the event-window source.
#[derive(Clone)]
pub struct LeaderboardRanker {
    snapshot: Option<Arc<dyn RankingSource>>,
    event_window: Option<Arc<dyn RankingSource>>,
    clock: Clock,
}

impl Default for LeaderboardRanker {
    fn default() -> Self {
        Self {
            snapshot: None,
            event_window: None,
            clock: Utc::now,
        }
    }
}

impl LeaderboardRanker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot_source(mut self, source: Arc<dyn RankingSource>) -> Self {
        self.snapshot = Some(source);
        self
    }

    pub fn with_event_window_source(mut self, source: Arc<dyn RankingSource>) -> Self {
        self.event_window = Some(source);
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn source(&self, timeframe: LeaderboardTimeframe) -> EngineResult<&Arc<dyn RankingSource>> {
        let (source, name) = if timeframe.is_windowed() {
            (&self.event_window, "event window ranking source")
        } else {
            (&self.snapshot, "statistics snapshot ranking source")
        };
        source.as_ref().ok_or(EngineError::NotAvailable(name))
    }

    async fn full_ranking(&self, timeframe: LeaderboardTimeframe) -> EngineResult<Vec<RankEntry>> {
        let candidates = self
            .source(timeframe)?
            .candidates(timeframe, (self.clock)())
            .await
            .map_err(|e| EngineError::aggregation("failed to load ranking candidates", e))?;

        Ok(rank_candidates(candidates, timeframe.tie_break()))
    }

    /// Full ordering first, then truncation, so a limited ranking is always a prefix.
    #[instrument(skip(self))]
    pub async fn calculate_rankings(
        &self,
        timeframe: &str,
        limit: Option<usize>,
    ) -> EngineResult<Vec<RankEntry>> {
        Ok(self.leaderboard(timeframe, limit).await?.records)
    }

    #[instrument(skip(self))]
    pub async fn leaderboard(
        &self,
        timeframe: &str,
        limit: Option<usize>,
    ) -> EngineResult<LeaderboardPage> {
        let timeframe = LeaderboardTimeframe::from_token(timeframe);
        let mut records = self.full_ranking(timeframe).await?;
        let total_records = records.len() as u64;
        if let Some(limit) = limit {
            records.truncate(limit);
        }

        Ok(LeaderboardPage {
            timeframe,
            total_records,
            records,
        })
    }

    /// Same position the user holds in the full ranking, or `None` when absent.
    #[instrument(skip(self))]
    pub async fn get_user_rank(
        &self,
        user_id: UserId,
        timeframe: &str,
    ) -> EngineResult<Option<RankEntry>> {
        let timeframe = LeaderboardTimeframe::from_token(timeframe);
        let entry = self
            .full_ranking(timeframe)
            .await?
            .into_iter()
            .find(|entry| entry.user_id == user_id);

        if entry.is_none() {
            tracing::debug!(user_id, %timeframe, "user is not on the leaderboard");
        }
        Ok(entry)
    }
}
