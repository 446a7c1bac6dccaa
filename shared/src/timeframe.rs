use chrono::{Datelike, Duration, NaiveTime};
use strum::{Display, EnumIter};

use super::*;

/// Rolling lookback used by analytics.
#[derive(
    Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default, EnumIter, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AnalyticsTimeframe {
    Week,
    #[default]
    Month,
    Quarter,
}

impl AnalyticsTimeframe {
    /// Unknown tokens resolve to the 30 day window.
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "7d" | "week" => AnalyticsTimeframe::Week,
            "30d" | "month" => AnalyticsTimeframe::Month,
            "90d" | "quarter" => AnalyticsTimeframe::Quarter,
            _ => AnalyticsTimeframe::default(),
        }
    }

    pub const fn lookback_days(&self) -> i64 {
        match self {
            AnalyticsTimeframe::Week => 7,
            AnalyticsTimeframe::Month => 30,
            AnalyticsTimeframe::Quarter => 90,
        }
    }

    pub fn start_period(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.lookback_days())
    }
}

/// Calendar-aligned period used by leaderboards.
#[derive(
    Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default, EnumIter, Display,
)]
#[serde(rename_all = "lowercase")]
pub enum LeaderboardTimeframe {
    #[default]
    #[serde(rename = "all")]
    #[strum(serialize = "all")]
    AllTime,
    #[strum(serialize = "weekly")]
    Weekly,
    #[strum(serialize = "monthly")]
    Monthly,
}

impl LeaderboardTimeframe {
    /// Unknown tokens fall back to the all-time board.
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "weekly" => LeaderboardTimeframe::Weekly,
            "monthly" => LeaderboardTimeframe::Monthly,
            _ => LeaderboardTimeframe::AllTime,
        }
    }

    pub const fn is_windowed(&self) -> bool {
        !matches!(self, LeaderboardTimeframe::AllTime)
    }

    /// Start of the current period: Monday 00:00 UTC for the ISO week,
    /// the first of the month for monthly. The all-time board has no start.
    pub fn start_period(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let today = now.date_naive();
        let start = match self {
            LeaderboardTimeframe::AllTime => return None,
            LeaderboardTimeframe::Weekly => {
                today - Duration::days(today.weekday().num_days_from_monday() as i64)
            }
            LeaderboardTimeframe::Monthly => today.with_day(1)?,
        };

        Some(start.and_time(NaiveTime::MIN).and_utc())
    }

    pub const fn tie_break(&self) -> TieBreak {
        match self {
            LeaderboardTimeframe::AllTime => TieBreak::JoinDate,
            LeaderboardTimeframe::Weekly | LeaderboardTimeframe::Monthly => TieBreak::DisplayName,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn analytics_tokens() {
        assert_eq!(AnalyticsTimeframe::from_token("7d"), AnalyticsTimeframe::Week);
        assert_eq!(AnalyticsTimeframe::from_token("week"), AnalyticsTimeframe::Week);
        assert_eq!(AnalyticsTimeframe::from_token("30d"), AnalyticsTimeframe::Month);
        assert_eq!(AnalyticsTimeframe::from_token("QUARTER"), AnalyticsTimeframe::Quarter);
        assert_eq!(AnalyticsTimeframe::from_token("90d"), AnalyticsTimeframe::Quarter);
        assert_eq!(AnalyticsTimeframe::from_token("year"), AnalyticsTimeframe::Month);
        assert_eq!(AnalyticsTimeframe::from_token(""), AnalyticsTimeframe::Month);
    }

    #[test]
    fn analytics_window_is_a_fixed_lookback() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 15, 30, 0).unwrap();
        assert_eq!(
            AnalyticsTimeframe::Week.start_period(now),
            Utc.with_ymd_and_hms(2024, 3, 3, 15, 30, 0).unwrap()
        );
        assert_eq!(
            AnalyticsTimeframe::Quarter.start_period(now),
            Utc.with_ymd_and_hms(2023, 12, 11, 15, 30, 0).unwrap()
        );
    }

    #[test]
    fn leaderboard_tokens() {
        assert_eq!(
            LeaderboardTimeframe::from_token("weekly"),
            LeaderboardTimeframe::Weekly
        );
        assert_eq!(
            LeaderboardTimeframe::from_token("monthly"),
            LeaderboardTimeframe::Monthly
        );
        assert_eq!(
            LeaderboardTimeframe::from_token("all"),
            LeaderboardTimeframe::AllTime
        );
        assert_eq!(
            LeaderboardTimeframe::from_token("yearly"),
            LeaderboardTimeframe::AllTime
        );
        assert_eq!(LeaderboardTimeframe::AllTime.to_string(), "all");
        assert_eq!(LeaderboardTimeframe::Weekly.to_string(), "weekly");
    }

    #[test]
    fn analytics_tokens_are_not_leaderboard_tokens() {
        assert_eq!(
            LeaderboardTimeframe::from_token("week"),
            LeaderboardTimeframe::AllTime
        );
        assert_eq!(
            LeaderboardTimeframe::from_token("month"),
            LeaderboardTimeframe::AllTime
        );
    }

    #[test]
    fn weekly_period_starts_on_iso_monday() {
        // 2024-03-10 is a Sunday
        let sunday = Utc.with_ymd_and_hms(2024, 3, 10, 23, 59, 0).unwrap();
        assert_eq!(
            LeaderboardTimeframe::Weekly.start_period(sunday),
            Some(Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap())
        );

        let monday = Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap();
        assert_eq!(
            LeaderboardTimeframe::Weekly.start_period(monday),
            Some(Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn monthly_period_is_month_to_date() {
        let now = Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap();
        assert_eq!(
            LeaderboardTimeframe::Monthly.start_period(now),
            Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(LeaderboardTimeframe::AllTime.start_period(now), None);
    }
}
