//! Dashboard API endpoint.

use axum::extract::State;

use super::{success, ApiResult};
use crate::models::DashboardSnapshot;
use crate::stats::compute_stats;
use crate::AppState;

/// GET /api/dashboard - Fresh statistics snapshot.
pub async fn get_dashboard(State(state): State<AppState>) -> ApiResult<DashboardSnapshot> {
    let (members, experiences) = state.repo.load_all().await?;
    success(compute_stats(&members, &experiences))
}
