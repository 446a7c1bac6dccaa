use std::collections::{BTreeSet, HashSet};

use super::*;

/// Consecutive activity days counted backward from `today`.
///
/// The run is anchored on today, or on yesterday when today has no activity yet.
/// If neither day has activity the streak is broken and the result is 0.
pub fn current_streak<I>(days: I, today: NaiveDate) -> u32
where
    I: IntoIterator<Item = NaiveDate>,
{
    let days: HashSet<NaiveDate> = days.into_iter().collect();

    let anchor = if days.contains(&today) {
        today
    } else {
        match today.pred_opt() {
            Some(yesterday) if days.contains(&yesterday) => yesterday,
            _ => return 0,
        }
    };

    let mut streak = 0;
    let mut day = Some(anchor);
    while let Some(current) = day.filter(|day| days.contains(day)) {
        streak += 1;
        day = current.pred_opt();
    }

    streak
}

/// Longest run of consecutive activity days anywhere in the history.
pub fn longest_streak<I>(days: I) -> u32
where
    I: IntoIterator<Item = NaiveDate>,
{
    let days: BTreeSet<NaiveDate> = days.into_iter().collect();

    let mut best = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;
    for day in days {
        run = match previous.and_then(|previous| previous.succ_opt()) {
            Some(expected) if expected == day => run + 1,
            _ => 1,
        };
        best = best.max(run);
        previous = Some(day);
    }

    best
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakSummary {
    pub current: u32,
    pub longest: u32,
    pub active_days: u32,
}

impl StreakSummary {
    pub fn from_days(days: &[NaiveDate], today: NaiveDate) -> Self {
        let active_days = days.iter().collect::<HashSet<_>>().len() as u32;
        Self {
            current: current_streak(days.iter().copied(), today),
            longest: longest_streak(days.iter().copied()),
            active_days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
    }

    fn days_ago(offsets: &[u64]) -> Vec<NaiveDate> {
        offsets
            .iter()
            .map(|offset| today() - chrono::Days::new(*offset))
            .collect()
    }

    #[test]
    fn empty_history_has_no_streak() {
        assert_eq!(current_streak(Vec::new(), today()), 0);
        assert_eq!(longest_streak(Vec::new()), 0);
    }

    #[test]
    fn single_day_today_or_yesterday() {
        assert_eq!(current_streak(days_ago(&[0]), today()), 1);
        assert_eq!(current_streak(days_ago(&[1]), today()), 1);
    }

    #[test]
    fn gap_at_today_and_yesterday_breaks_streak() {
        assert_eq!(current_streak(days_ago(&[2, 3, 4, 5]), today()), 0);
    }

    #[test]
    fn streak_anchored_on_yesterday() {
        assert_eq!(current_streak(days_ago(&[1, 2, 3]), today()), 3);
    }

    #[test]
    fn walk_stops_at_first_gap() {
        // 0,1,2 then a gap at 3, then a long run further back
        let days = days_ago(&[0, 1, 2, 4, 5, 6, 7, 8, 9]);
        assert_eq!(current_streak(days.clone(), today()), 3);
        assert_eq!(longest_streak(days), 6);
    }

    #[test]
    fn duplicates_and_order_do_not_matter() {
        let days = days_ago(&[2, 0, 1, 0, 1]);
        assert_eq!(current_streak(days, today()), 3);
    }

    #[test]
    fn streak_matches_suffix_run_for_every_gap_position() {
        for gap in 1..10u64 {
            let offsets: Vec<u64> = (0..12).filter(|offset| *offset != gap).collect();
            assert_eq!(current_streak(days_ago(&offsets), today()), gap as u32);
        }
    }

    #[test]
    fn future_days_are_ignored() {
        let tomorrow = today().succ_opt().unwrap();
        assert_eq!(current_streak(vec![tomorrow], today()), 0);
    }

    #[test]
    fn summary() {
        let days = days_ago(&[0, 1, 5, 6, 7, 7]);
        let summary = StreakSummary::from_days(&days, today());
        assert_eq!(
            summary,
            StreakSummary {
                current: 2,
                longest: 3,
                active_days: 5,
            }
        );
    }
}
