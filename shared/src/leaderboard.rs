use std::cmp::Ordering;

use super::*;

/// Per-user figures a ranking source hands to the ranker.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RankingCandidate {
    pub user_id: UserId,
    pub display_name: String,
    pub total_points: Option<i64>,
    pub challenges_completed: Option<i64>,
    pub average_score: Option<f64>,
    pub join_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankEntry {
    pub rank: u32,
    pub user_id: UserId,
    pub display_name: String,
    pub total_points: i64,
    pub challenges_completed: i64,
    pub average_score: Option<f64>,
}

/// Comparator chain shared by every ranking source.
///
/// Both chains start with points then completions (descending, missing values last).
/// `JoinDate` continues with average score and the earliest join date, `DisplayName`
/// with the name compared case-insensitively, then byte-wise. The user id closes
/// both chains so the order is total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreak {
    JoinDate,
    DisplayName,
}

impl TieBreak {
    pub fn compare(&self, a: &RankingCandidate, b: &RankingCandidate) -> Ordering {
        let measured = desc_nulls_last(a.total_points, b.total_points, Ord::cmp).then_with(|| {
            desc_nulls_last(a.challenges_completed, b.challenges_completed, Ord::cmp)
        });

        let tie_break = match self {
            TieBreak::JoinDate => measured
                .then_with(|| desc_nulls_last(a.average_score, b.average_score, f64::total_cmp))
                .then_with(|| asc_nulls_last(a.join_date, b.join_date)),
            TieBreak::DisplayName => measured
                .then_with(|| {
                    let a = a.display_name.to_lowercase();
                    let b = b.display_name.to_lowercase();
                    a.cmp(&b)
                })
                .then_with(|| a.display_name.cmp(&b.display_name)),
        };

        tie_break.then_with(|| a.user_id.cmp(&b.user_id))
    }
}

fn desc_nulls_last<T>(
    a: Option<T>,
    b: Option<T>,
    cmp: impl Fn(&T, &T) -> Ordering,
) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp(&b, &a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn asc_nulls_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sorts candidates and assigns strict sequential 1-based ranks: equal rows never share a rank.
pub fn rank_candidates(
    mut candidates: Vec<RankingCandidate>,
    tie_break: TieBreak,
) -> Vec<RankEntry> {
    candidates.sort_by(|a, b| tie_break.compare(a, b));

    candidates
        .into_iter()
        .zip(1..)
        .map(|(candidate, rank)| RankEntry {
            rank,
            user_id: candidate.user_id,
            display_name: candidate.display_name,
            total_points: candidate.total_points.unwrap_or_default(),
            challenges_completed: candidate.challenges_completed.unwrap_or_default(),
            average_score: candidate.average_score,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn joined(year: i32) -> Option<DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap())
    }

    fn candidate(
        user_id: UserId,
        points: Option<i64>,
        join_date: Option<DateTime<Utc>>,
    ) -> RankingCandidate {
        RankingCandidate {
            user_id,
            display_name: format!("user-{user_id}"),
            total_points: points,
            challenges_completed: Some(0),
            average_score: None,
            join_date,
        }
    }

    fn order(entries: &[RankEntry]) -> Vec<UserId> {
        entries.iter().map(|entry| entry.user_id).collect()
    }

    #[test]
    fn earlier_join_date_wins_a_points_tie() {
        let ranked = rank_candidates(
            vec![
                candidate(1, Some(100), joined(2021)),
                candidate(2, Some(100), joined(2020)),
                candidate(3, Some(50), joined(2019)),
            ],
            TieBreak::JoinDate,
        );

        assert_eq!(order(&ranked), vec![2, 1, 3]);
        assert_eq!(
            ranked.iter().map(|entry| entry.rank).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn missing_values_sort_last() {
        let mut no_points = candidate(1, None, joined(2000));
        no_points.challenges_completed = None;
        let ranked = rank_candidates(
            vec![no_points, candidate(2, Some(0), joined(2022))],
            TieBreak::JoinDate,
        );

        assert_eq!(order(&ranked), vec![2, 1]);
        assert_eq!(ranked[1].total_points, 0);
        assert_eq!(ranked[1].challenges_completed, 0);
    }

    #[test]
    fn completions_then_average_score_break_ties() {
        let mut a = candidate(1, Some(10), joined(2020));
        let mut b = candidate(2, Some(10), joined(2020));
        let mut c = candidate(3, Some(10), joined(2020));
        a.challenges_completed = Some(1);
        b.challenges_completed = Some(2);
        c.challenges_completed = Some(1);
        a.average_score = Some(71.5);
        c.average_score = Some(90.0);

        let ranked = rank_candidates(vec![a, b, c], TieBreak::JoinDate);
        assert_eq!(order(&ranked), vec![2, 3, 1]);
    }

    #[test]
    fn display_name_breaks_window_ties() {
        let mut zed = candidate(1, Some(40), None);
        zed.display_name = "zed".to_string();
        let mut amy = candidate(2, Some(40), None);
        amy.display_name = "amy".to_string();

        let ranked = rank_candidates(vec![zed, amy], TieBreak::DisplayName);
        assert_eq!(order(&ranked), vec![2, 1]);
    }

    #[test]
    fn display_name_ignores_case() {
        let names = ["Zoe", "amy", "Amy", "bob"];
        let candidates = names
            .iter()
            .zip(1..)
            .map(|(name, user_id)| {
                let mut candidate = candidate(user_id, Some(10), None);
                candidate.display_name = name.to_string();
                candidate
            })
            .collect();

        let ranked = rank_candidates(candidates, TieBreak::DisplayName);
        let names: Vec<&str> = ranked.iter().map(|entry| entry.display_name.as_str()).collect();
        assert_eq!(names, vec!["Amy", "amy", "bob", "Zoe"]);
    }

    #[test]
    fn identical_rows_still_get_sequential_ranks() {
        let ranked = rank_candidates(
            vec![
                candidate(9, Some(5), None),
                candidate(4, Some(5), None),
                candidate(7, Some(5), None),
            ],
            TieBreak::JoinDate,
        );

        assert_eq!(order(&ranked), vec![4, 7, 9]);
        assert_eq!(
            ranked.iter().map(|entry| entry.rank).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn ranking_ignores_input_order() {
        let candidates = vec![
            candidate(1, Some(3), joined(2020)),
            candidate(2, Some(8), joined(2021)),
            candidate(3, Some(3), joined(2019)),
            candidate(4, None, None),
        ];
        let mut reversed = candidates.clone();
        reversed.reverse();

        assert_eq!(
            rank_candidates(candidates, TieBreak::JoinDate),
            rank_candidates(reversed, TieBreak::JoinDate)
        );
    }
}
