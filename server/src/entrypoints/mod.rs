use rocket::{fairing::AdHoc, serde::json::Json};
use utoipa::OpenApi;

pub mod leaderboards;
pub mod progress;
pub mod types;

#[derive(OpenApi)]
#[openapi(
    paths(
        progress::get_overview,
        progress::get_analytics,
        progress::get_milestones,
        progress::track_event,
        leaderboards::get_leaderboard,
        leaderboards::get_user_rank,
    ),
    components(schemas(
        types::ErrorResponse,
        types::OverviewResponse,
        types::MilestoneResponse,
        types::MilestonesResponse,
        types::DailyActivityResponse,
        types::BreakdownResponse,
        types::AnalyticsResponse,
        types::TrackEventRequest,
        types::LearningEventResponse,
        types::RankResponse,
        types::LeaderboardResponse,
    ))
)]
pub struct ApiDoc;

#[get("/openapi.json")]
fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn stage() -> AdHoc {
    AdHoc::on_ignite("Installing entrypoints", |rocket| async {
        rocket
            .mount("/api", routes![openapi])
            .attach(progress::stage())
            .attach(leaderboards::stage())
    })
}
