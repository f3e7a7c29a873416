use axum::{Json, extract::State};
use tracing::instrument;

use nanapatha_core::AppError;
use nanapatha_models::dashboard::DashboardStats;

use crate::modules::dashboard::service::DashboardService;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Headline counts and the newest pending registrations", body = DashboardStats)
    ),
    tag = "Dashboard"
)]
#[instrument(skip(state))]
pub async fn get_dashboard(State(state): State<AppState>) -> Result<Json<DashboardStats>, AppError> {
    let stats = DashboardService::get_stats(&state.db).await?;
    Ok(Json(stats))
}
