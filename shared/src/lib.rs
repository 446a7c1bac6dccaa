use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

mod analytics;
mod event;
mod leaderboard;
mod milestone;
mod streak;
mod timeframe;

pub use analytics::*;
pub use event::*;
pub use leaderboard::*;
pub use milestone::*;
pub use streak::*;
pub use timeframe::*;

pub use strum::IntoEnumIterator;

pub type UserId = i32;
pub type EventId = i64;
pub type ChallengeId = i32;
