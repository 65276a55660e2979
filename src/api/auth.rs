//! Login API endpoints.

use axum::{extract::State, Json};

use super::{success, ApiResult};
use crate::auth::{LockoutStatus, LoginOutcome, LoginRequest};
use crate::AppState;

/// POST /api/auth/login - Check credentials, subject to lockout.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> LoginOutcome {
    state.auth.login(&request.email, &request.password).await
}

/// GET /api/auth/lockout - Current lockout status.
pub async fn get_lockout(State(state): State<AppState>) -> ApiResult<LockoutStatus> {
    success(state.auth.guard().check_lockout().await)
}
