use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock, RwLockReadGuard},
};

use chrono::{DateTime, NaiveDate, Utc};
use itertools::Itertools;
use shared::{
    by_category, by_event_type, daily_series, CategoryBreakdown, ChallengeId, DailyActivity,
    EventTypeBreakdown, LearningEvent, NewLearningEvent, UserId,
};

use crate::store::{
    EventStore, EventTotals, GradedStats, GradingSummary, IdentityDirectory, StatisticsStore,
    UserIdentity, UserStatisticsSnapshot, WindowTotals, PASSING_SCORE,
};

#[derive(Debug, Default)]
struct Inner {
    events: Vec<LearningEvent>,
    grades: HashMap<UserId, Vec<Option<f64>>>,
    snapshots: Vec<UserStatisticsSnapshot>,
    users: HashMap<UserId, UserIdentity>,
    categories: HashMap<ChallengeId, String>,
}

/// Process-local implementation of every collaborator.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(
        mut self,
        user_id: UserId,
        display_name: &str,
        join_date: Option<DateTime<Utc>>,
    ) -> Self {
        self.inner_mut().users.insert(
            user_id,
            UserIdentity {
                user_id,
                display_name: display_name.to_string(),
                join_date,
            },
        );
        self
    }

    pub fn with_challenge(mut self, challenge_id: ChallengeId, category: &str) -> Self {
        self.inner_mut()
            .categories
            .insert(challenge_id, category.to_string());
        self
    }

    /// Seeds an event with an explicit timestamp instead of the insert time.
    pub fn with_event(mut self, event: NewLearningEvent, occurred_at: DateTime<Utc>) -> Self {
        let inner = self.inner_mut();
        let id = inner.events.len() as i64 + 1;
        inner.events.push(event.into_event(id, occurred_at));
        self
    }

    /// `None` records an ungraded submission.
    pub fn with_submission(mut self, user_id: UserId, score: Option<f64>) -> Self {
        self.inner_mut()
            .grades
            .entry(user_id)
            .or_default()
            .push(score);
        self
    }

    pub fn with_snapshot(mut self, snapshot: UserStatisticsSnapshot) -> Self {
        self.inner_mut().snapshots.push(snapshot);
        self
    }

    pub fn event_count(&self) -> usize {
        self.read().events.len()
    }

    fn inner_mut(&mut self) -> &mut Inner {
        self.inner.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Inner {
    fn window<'a>(
        &'a self,
        user_id: UserId,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> impl Iterator<Item = &'a LearningEvent> + 'a {
        self.events.iter().filter(move |event| {
            event.user_id == user_id && event.occurred_at >= since && event.occurred_at <= until
        })
    }
}

#[async_trait::async_trait]
impl EventStore for InMemoryStore {
    async fn insert(&self, event: NewLearningEvent) -> anyhow::Result<LearningEvent> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let id = inner.events.len() as i64 + 1;
        let event = event.into_event(id, Utc::now());
        inner.events.push(event.clone());
        Ok(event)
    }

    async fn totals(&self, user_id: UserId) -> anyhow::Result<EventTotals> {
        let inner = self.read();
        Ok(inner
            .events
            .iter()
            .filter(|event| event.user_id == user_id)
            .fold(EventTotals::default(), |mut totals, event| {
                totals.points += event.points_earned as i64;
                totals.events += 1;
                if event.is_challenge_completion() {
                    totals.completions += 1;
                }
                totals.last_activity = totals.last_activity.max(Some(event.occurred_at));
                totals
            }))
    }

    async fn activity_days(&self, user_id: UserId) -> anyhow::Result<Vec<NaiveDate>> {
        let inner = self.read();
        Ok(inner
            .events
            .iter()
            .filter(|event| event.user_id == user_id)
            .map(LearningEvent::activity_day)
            .unique()
            .sorted()
            .collect())
    }

    async fn windowed_series(
        &self,
        user_id: UserId,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> anyhow::Result<Vec<DailyActivity>> {
        let inner = self.read();
        Ok(daily_series(inner.window(user_id, since, until)))
    }

    async fn windowed_by_type(
        &self,
        user_id: UserId,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> anyhow::Result<Vec<EventTypeBreakdown>> {
        let inner = self.read();
        Ok(by_event_type(inner.window(user_id, since, until)))
    }

    async fn windowed_by_category(
        &self,
        user_id: UserId,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> anyhow::Result<Vec<CategoryBreakdown>> {
        let inner = self.read();
        Ok(by_category(inner.window(user_id, since, until), |challenge| {
            inner.categories.get(&challenge).cloned()
        }))
    }

    async fn window_totals(
        &self,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> anyhow::Result<Vec<WindowTotals>> {
        let inner = self.read();
        let mut totals: HashMap<UserId, WindowTotals> = HashMap::new();
        for event in inner
            .events
            .iter()
            .filter(|event| event.occurred_at >= since && event.occurred_at <= until)
        {
            let entry = totals.entry(event.user_id).or_insert(WindowTotals {
                user_id: event.user_id,
                points: 0,
                completions: 0,
            });
            entry.points += event.points_earned as i64;
            if event.is_challenge_completion() {
                entry.completions += 1;
            }
        }

        Ok(totals.into_values().collect())
    }
}

#[async_trait::async_trait]
impl GradingSummary for InMemoryStore {
    async fn graded_stats(&self, user_id: UserId) -> anyhow::Result<GradedStats> {
        let inner = self.read();
        let scores: Vec<f64> = inner
            .grades
            .get(&user_id)
            .map(|grades| grades.iter().flatten().copied().collect())
            .unwrap_or_default();

        let graded_count = scores.len() as i64;
        let average_score =
            (graded_count > 0).then(|| scores.iter().sum::<f64>() / graded_count as f64);
        let completed_count = scores
            .iter()
            .filter(|score| **score >= PASSING_SCORE)
            .count() as i64;

        Ok(GradedStats {
            graded_count,
            average_score,
            completed_count,
        })
    }
}

#[async_trait::async_trait]
impl StatisticsStore for InMemoryStore {
    async fn snapshots(&self) -> anyhow::Result<Vec<UserStatisticsSnapshot>> {
        Ok(self.read().snapshots.clone())
    }
}

#[async_trait::async_trait]
impl IdentityDirectory for InMemoryStore {
    async fn identity(&self, user_id: UserId) -> anyhow::Result<Option<UserIdentity>> {
        Ok(self.read().users.get(&user_id).cloned())
    }

    async fn identities(&self, user_ids: &[UserId]) -> anyhow::Result<Vec<UserIdentity>> {
        let inner = self.read();
        Ok(user_ids
            .iter()
            .filter_map(|user_id| inner.users.get(user_id).cloned())
            .collect())
    }
}
