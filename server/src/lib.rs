use std::sync::Arc;

use chrono::{DateTime, Utc};
use rocket::fairing::AdHoc;
use rocket_db_pools::Database;
use shared::MilestoneCatalogue;

pub mod analytics;
pub mod config;
pub mod db;
pub mod error;
pub mod leaderboard;
pub mod memory;
pub mod progress;
pub mod store;


use config::Env;
use db::DB;
use leaderboard::{EventWindowSource, LeaderboardRanker, SnapshotSource};
use progress::ProgressService;

/// Source of "now" for streaks and timeframe windows.
pub type Clock = fn() -> DateTime<Utc>;

/// Wires the engine onto the database pool once it has been initialized.
pub fn stage(env: Env) -> AdHoc {
    AdHoc::on_ignite("Progress engine", move |rocket| async move {
        rocket.attach(AdHoc::try_on_ignite(
            "Progress engine services",
            move |rocket| async move {
                let Some(db) = DB::fetch(&rocket).cloned() else {
                    rocket::error!("Database pool is not initialized");
                    return Err(rocket);
                };
                let db = Arc::new(db);

                let progress = ProgressService::new(
                    db.clone(),
                    db.clone(),
                    db.clone(),
                    Arc::new(MilestoneCatalogue::standard()),
                );

                let snapshots = SnapshotSource::new(db.clone(), db.clone());
                let mut ranker = LeaderboardRanker::new().with_snapshot_source(Arc::new(snapshots));
                if env.enable_event_leaderboards {
                    let window = EventWindowSource::new(db.clone(), db);
                    ranker = ranker.with_event_window_source(Arc::new(window));
                } else {
                    tracing::warn!("Event leaderboards are disabled");
                }

                Ok(rocket.manage(progress).manage(ranker).manage(env))
            },
        ))
    })
}
