use progress_server::{config::Env, leaderboard::LeaderboardRanker};
use rocket::{serde::json::Json, State};

use super::types::{ApiResult, LeaderboardResponse, RankResponse};

#[utoipa::path(context_path = "/api/leaderboard", responses(
    (status = 200, description = "Ranked users for a timeframe", body = LeaderboardResponse)
))]
#[get("/<timeframe>?<limit>")]
pub async fn get_leaderboard(
    timeframe: &str,
    limit: Option<usize>,
    ranker: &State<LeaderboardRanker>,
    env: &State<Env>,
) -> ApiResult<LeaderboardResponse> {
    let limit = env.leaderboard_limit(limit);
    let page = ranker.leaderboard(timeframe, Some(limit)).await?;
    Ok(Json(LeaderboardResponse::new(page, limit)))
}

#[utoipa::path(context_path = "/api/leaderboard", responses(
    (status = 200, description = "Rank of a single user", body = RankResponse)
))]
#[get("/<timeframe>/users/<user_id>")]
pub async fn get_user_rank(
    timeframe: &str,
    user_id: i32,
    ranker: &State<LeaderboardRanker>,
) -> ApiResult<Option<RankResponse>> {
    let entry = ranker.get_user_rank(user_id, timeframe).await?;
    Ok(Json(entry.map(Into::into)))
}

pub fn stage() -> rocket::fairing::AdHoc {
    rocket::fairing::AdHoc::on_ignite("Installing leaderboard entrypoints", |rocket| async {
        rocket.mount(
            "/api/leaderboard",
            rocket::routes![get_leaderboard, get_user_rank],
        )
    })
}
