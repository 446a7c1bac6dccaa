use std::{cmp::Ordering, collections::HashMap, hash::Hash};

use itertools::Itertools;

use super::*;

pub const CATEGORY_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyActivity {
    pub day: NaiveDate,
    pub points: i64,
    pub events: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTypeBreakdown {
    pub event_type: EventType,
    pub events: i64,
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub category: String,
    pub events: i64,
    pub points: i64,
}

/// Row of a grouped view that can be ordered by its totals.
pub trait Breakdown {
    fn key(&self) -> &str;
    fn points(&self) -> i64;
    fn events(&self) -> i64;

    /// Points descending, then events descending. The key makes the order total.
    fn compare(&self, other: &Self) -> Ordering {
        other
            .points()
            .cmp(&self.points())
            .then_with(|| other.events().cmp(&self.events()))
            .then_with(|| self.key().cmp(other.key()))
    }
}

impl Breakdown for EventTypeBreakdown {
    fn key(&self) -> &str {
        &self.event_type
    }

    fn points(&self) -> i64 {
        self.points
    }

    fn events(&self) -> i64 {
        self.events
    }
}

impl Breakdown for CategoryBreakdown {
    fn key(&self) -> &str {
        &self.category
    }

    fn points(&self) -> i64 {
        self.points
    }

    fn events(&self) -> i64 {
        self.events
    }
}

pub fn order_breakdown<T: Breakdown>(rows: &mut [T]) {
    rows.sort_by(|a, b| a.compare(b));
}

pub fn order_categories(mut rows: Vec<CategoryBreakdown>) -> Vec<CategoryBreakdown> {
    order_breakdown(&mut rows);
    rows.truncate(CATEGORY_LIMIT);
    rows
}

pub fn order_series(rows: &mut [DailyActivity]) {
    rows.sort_by_key(|row| row.day);
}

pub fn daily_series<'a, I>(events: I) -> Vec<DailyActivity>
where
    I: IntoIterator<Item = &'a LearningEvent>,
{
    totals_by(events.into_iter().map(|event| (event.activity_day(), event)))
        .into_iter()
        .map(|(day, (points, events))| DailyActivity {
            day,
            points,
            events,
        })
        .sorted_by_key(|row| row.day)
        .collect()
}

pub fn by_event_type<'a, I>(events: I) -> Vec<EventTypeBreakdown>
where
    I: IntoIterator<Item = &'a LearningEvent>,
{
    let mut rows: Vec<EventTypeBreakdown> =
        totals_by(events.into_iter().map(|event| (event.event_type.clone(), event)))
            .into_iter()
            .map(|(event_type, (points, events))| EventTypeBreakdown {
                event_type,
                events,
                points,
            })
            .collect();
    order_breakdown(&mut rows);
    rows
}

/// Events without a related challenge, or whose challenge has no category,
/// do not take part in this view.
pub fn by_category<'a, I, F>(events: I, category_of: F) -> Vec<CategoryBreakdown>
where
    I: IntoIterator<Item = &'a LearningEvent>,
    F: Fn(ChallengeId) -> Option<String>,
{
    let categorised = events.into_iter().filter_map(|event| {
        let category = event.related_challenge_id.and_then(&category_of)?;
        Some((category, event))
    });
    let rows = totals_by(categorised)
        .into_iter()
        .map(|(category, (points, events))| CategoryBreakdown {
            category,
            events,
            points,
        })
        .collect();
    order_categories(rows)
}

/// `(points, events)` per key.
fn totals_by<'a, K, I>(keyed: I) -> HashMap<K, (i64, i64)>
where
    K: Hash + Eq,
    I: Iterator<Item = (K, &'a LearningEvent)>,
{
    keyed
        .into_grouping_map()
        .fold((0, 0), |(points, events), _key, event| {
            (points + event.points_earned as i64, events + 1)
        })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn event(
        id: EventId,
        day: u32,
        event_type: &str,
        points: i32,
        challenge: Option<i32>,
    ) -> LearningEvent {
        LearningEvent {
            id,
            user_id: 1,
            event_type: event_type.to_string(),
            points_earned: points,
            occurred_at: Utc.with_ymd_and_hms(2024, 4, day, 10, 0, 0).unwrap(),
            related_goal_id: None,
            related_challenge_id: challenge,
            related_submission_id: None,
            session_id: None,
            metadata: Default::default(),
        }
    }

    fn category_of(challenge: ChallengeId) -> Option<String> {
        match challenge {
            1 => Some("rust".to_string()),
            2 => Some("sql".to_string()),
            _ => None,
        }
    }

    fn sample() -> Vec<LearningEvent> {
        vec![
            event(1, 3, CHALLENGE_COMPLETED, 50, Some(1)),
            event(2, 1, GOAL_PROGRESS, 5, None),
            event(3, 3, CHALLENGE_COMPLETED, 30, Some(2)),
            event(4, 2, "challenge_started", 0, Some(1)),
            event(5, 1, GOAL_PROGRESS, 5, None),
            event(6, 2, CHALLENGE_COMPLETED, 10, Some(9)),
        ]
    }

    #[test]
    fn series_is_ascending_by_day() {
        let series = daily_series(&sample());
        let days: Vec<u32> = series.iter().map(|row| chrono::Datelike::day(&row.day)).collect();
        assert_eq!(days, vec![1, 2, 3]);
        assert_eq!(series[0].points, 10);
        assert_eq!(series[0].events, 2);
        assert_eq!(series[2].points, 80);
    }

    #[test]
    fn event_types_ordered_by_points_then_events() {
        let rows = by_event_type(&sample());
        let keys: Vec<&str> = rows.iter().map(|row| row.event_type.as_str()).collect();
        assert_eq!(keys, vec![CHALLENGE_COMPLETED, GOAL_PROGRESS, "challenge_started"]);
        assert_eq!(rows[0].points, 90);
        assert_eq!(rows[0].events, 3);
    }

    #[test]
    fn type_breakdown_and_series_partition_the_same_points() {
        let events = sample();
        let by_type: i64 = by_event_type(&events).iter().map(|row| row.points).sum();
        let by_day: i64 = daily_series(&events).iter().map(|row| row.points).sum();
        assert_eq!(by_type, by_day);
    }

    #[test]
    fn uncategorised_events_are_left_out_of_categories() {
        let rows = by_category(&sample(), category_of);
        assert_eq!(
            rows,
            vec![
                CategoryBreakdown {
                    category: "rust".to_string(),
                    events: 2,
                    points: 50,
                },
                CategoryBreakdown {
                    category: "sql".to_string(),
                    events: 1,
                    points: 30,
                },
            ]
        );
    }

    #[test]
    fn categories_are_capped() {
        let rows = (0..15)
            .map(|i| CategoryBreakdown {
                category: format!("category-{i:02}"),
                events: 1,
                points: i,
            })
            .collect();
        let rows = order_categories(rows);
        assert_eq!(rows.len(), CATEGORY_LIMIT);
        assert_eq!(rows[0].category, "category-14");
        assert_eq!(rows[9].category, "category-05");
    }

    #[test]
    fn equal_points_fall_back_to_events() {
        let mut rows = vec![
            EventTypeBreakdown {
                event_type: "a".to_string(),
                events: 1,
                points: 10,
            },
            EventTypeBreakdown {
                event_type: "b".to_string(),
                events: 4,
                points: 10,
            },
        ];
        order_breakdown(&mut rows);
        assert_eq!(rows[0].event_type, "b");
    }
}
