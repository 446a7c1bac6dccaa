use super::*;

pub type CatalogueVersion = u32;

/// Aggregates a milestone rule is evaluated against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneTotals {
    pub total_points: i64,
    pub total_events: i64,
    pub challenges_completed: i64,
    pub current_streak_days: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MilestoneRecord {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MilestoneCriteria {
    TotalEvents(i64),
    ChallengesCompleted(i64),
    TotalPoints(i64),
    StreakDays(u32),
}

impl MilestoneCriteria {
    pub const fn is_achieved(&self, totals: &MilestoneTotals) -> bool {
        match self {
            Self::TotalEvents(value) => totals.total_events >= *value,
            Self::ChallengesCompleted(value) => totals.challenges_completed >= *value,
            Self::TotalPoints(value) => totals.total_points >= *value,
            Self::StreakDays(value) => totals.current_streak_days >= *value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MilestoneRule {
    pub record: MilestoneRecord,
    pub criteria: MilestoneCriteria,
}

impl MilestoneRule {
    pub const fn new(
        key: &'static str,
        name: &'static str,
        description: &'static str,
        criteria: MilestoneCriteria,
    ) -> Self {
        Self {
            record: MilestoneRecord {
                key,
                name,
                description,
            },
            criteria,
        }
    }
}

const STANDARD_RULES: [MilestoneRule; 6] = [
    MilestoneRule::new(
        "first_steps",
        "First Steps",
        "Logged your first learning activity",
        MilestoneCriteria::TotalEvents(1),
    ),
    MilestoneRule::new(
        "first_win",
        "First Win",
        "Completed your first challenge",
        MilestoneCriteria::ChallengesCompleted(1),
    ),
    MilestoneRule::new(
        "century",
        "Century",
        "Earned 100 points",
        MilestoneCriteria::TotalPoints(100),
    ),
    MilestoneRule::new(
        "high_roller",
        "High Roller",
        "Earned 500 points",
        MilestoneCriteria::TotalPoints(500),
    ),
    MilestoneRule::new(
        "hot_streak",
        "Hot Streak",
        "Stayed active 3 days in a row",
        MilestoneCriteria::StreakDays(3),
    ),
    MilestoneRule::new(
        "weekly_warrior",
        "Weekly Warrior",
        "Stayed active 7 days in a row",
        MilestoneCriteria::StreakDays(7),
    ),
];

/// Immutable rule table. Build it once and share it by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestoneCatalogue {
    version: CatalogueVersion,
    rules: Vec<MilestoneRule>,
}

impl MilestoneCatalogue {
    pub fn new(version: CatalogueVersion, rules: Vec<MilestoneRule>) -> Self {
        Self { version, rules }
    }

    pub fn standard() -> Self {
        Self::new(1, STANDARD_RULES.to_vec())
    }

    pub const fn version(&self) -> CatalogueVersion {
        self.version
    }

    /// Every rule is checked; earned records keep the catalogue order.
    pub fn evaluate(&self, totals: &MilestoneTotals) -> Vec<MilestoneRecord> {
        self.rules
            .iter()
            .filter(|rule| rule.criteria.is_achieved(totals))
            .map(|rule| rule.record)
            .collect()
    }
}

impl Default for MilestoneCatalogue {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(records: &[MilestoneRecord]) -> Vec<&'static str> {
        records.iter().map(|record| record.key).collect()
    }

    #[test]
    fn nothing_earned_without_activity() {
        let catalogue = MilestoneCatalogue::standard();
        assert!(catalogue.evaluate(&MilestoneTotals::default()).is_empty());
    }

    #[test]
    fn rules_are_independent_and_ordered() {
        let catalogue = MilestoneCatalogue::standard();
        let totals = MilestoneTotals {
            total_points: 600,
            total_events: 0,
            challenges_completed: 0,
            current_streak_days: 7,
        };
        assert_eq!(
            keys(&catalogue.evaluate(&totals)),
            vec!["century", "high_roller", "hot_streak", "weekly_warrior"]
        );
    }

    #[test]
    fn two_completions_without_a_century() {
        let catalogue = MilestoneCatalogue::standard();
        let totals = MilestoneTotals {
            total_points: 80,
            total_events: 2,
            challenges_completed: 2,
            current_streak_days: 2,
        };
        assert_eq!(
            keys(&catalogue.evaluate(&totals)),
            vec!["first_steps", "first_win"]
        );
    }

    #[test]
    fn earned_set_is_monotonic_in_every_metric() {
        let catalogue = MilestoneCatalogue::standard();
        let bump: [fn(&mut MilestoneTotals, i64); 4] = [
            |totals, by| totals.total_points += by,
            |totals, by| totals.total_events += by,
            |totals, by| totals.challenges_completed += by,
            |totals, by| totals.current_streak_days += by as u32,
        ];

        for base in [0, 1, 2, 3, 6, 99, 100, 499, 500] {
            let lower = MilestoneTotals {
                total_points: base,
                total_events: base,
                challenges_completed: base,
                current_streak_days: base as u32,
            };
            let earned = catalogue.evaluate(&lower);
            for apply in bump {
                for by in [1, 5, 400] {
                    let mut higher = lower;
                    apply(&mut higher, by);
                    let higher_earned = catalogue.evaluate(&higher);
                    assert!(earned.iter().all(|record| higher_earned.contains(record)));
                }
            }
        }
    }

    #[test]
    fn custom_catalogue_keeps_version() {
        let catalogue = MilestoneCatalogue::new(
            2,
            vec![MilestoneRule::new(
                "marathon",
                "Marathon",
                "Stayed active 30 days in a row",
                MilestoneCriteria::StreakDays(30),
            )],
        );
        assert_eq!(catalogue.version(), 2);

        let totals = MilestoneTotals {
            total_points: 1_000,
            total_events: 100,
            challenges_completed: 10,
            current_streak_days: 30,
        };
        let keys: Vec<&str> = catalogue.evaluate(&totals).iter().map(|r| r.key).collect();
        assert_eq!(keys, vec!["marathon"]);
    }
}
