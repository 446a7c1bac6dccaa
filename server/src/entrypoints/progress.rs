use progress_server::progress::ProgressService;
use rocket::{serde::json::Json, State};

use super::types::{
    AnalyticsResponse, ApiResult, LearningEventResponse, MilestonesResponse, OverviewResponse,
    TrackEventRequest,
};

#[utoipa::path(context_path = "/api/progress", responses(
    (status = 200, description = "Overall progress of a user", body = OverviewResponse)
))]
#[get("/<user_id>/overview")]
pub async fn get_overview(
    user_id: i32,
    progress: &State<ProgressService>,
) -> ApiResult<OverviewResponse> {
    let overview = progress.calculate_overall_progress(user_id).await?;
    Ok(Json(overview.into()))
}

#[utoipa::path(context_path = "/api/progress", responses(
    (status = 200, description = "Windowed analytics of a user", body = AnalyticsResponse)
))]
#[get("/<user_id>/analytics?<timeframe>")]
pub async fn get_analytics(
    user_id: i32,
    timeframe: Option<String>,
    progress: &State<ProgressService>,
) -> ApiResult<AnalyticsResponse> {
    let timeframe = timeframe.unwrap_or_else(|| "30d".to_string());
    let report = progress
        .generate_analytics(Some(user_id), &timeframe)
        .await?;
    Ok(Json(report.into()))
}

#[utoipa::path(context_path = "/api/progress", responses(
    (status = 200, description = "Milestones currently earned by a user", body = MilestonesResponse)
))]
#[get("/<user_id>/milestones")]
pub async fn get_milestones(
    user_id: i32,
    progress: &State<ProgressService>,
) -> ApiResult<MilestonesResponse> {
    let report = progress.check_milestones(user_id).await?;
    Ok(Json(report.into()))
}

#[utoipa::path(context_path = "/api/progress", request_body = TrackEventRequest, responses(
    (status = 200, description = "Recorded learning event", body = LearningEventResponse)
))]
#[post("/<user_id>/events", format = "json", data = "<request>")]
pub async fn track_event(
    user_id: i32,
    request: Json<TrackEventRequest>,
    progress: &State<ProgressService>,
) -> ApiResult<LearningEventResponse> {
    let TrackEventRequest { event_type, data } = request.into_inner();
    let event = progress
        .track_event(Some(user_id), event_type.as_deref(), data)
        .await?;
    Ok(Json(event.into()))
}

pub fn stage() -> rocket::fairing::AdHoc {
    rocket::fairing::AdHoc::on_ignite("Installing progress entrypoints", |rocket| async {
        rocket.mount(
            "/api/progress",
            rocket::routes![get_overview, get_analytics, get_milestones, track_event],
        )
    })
}
