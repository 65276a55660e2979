//! Member API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{
    CreateMemberRequest, ExperienceFilter, LeadershipScore, Member, UpdateMemberRequest,
};
use crate::AppState;

/// GET /api/members - List all members.
pub async fn list_members(State(state): State<AppState>) -> ApiResult<Vec<Member>> {
    success(state.repo.list_members().await?)
}

/// GET /api/members/:id - Get a single member.
pub async fn get_member(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Member> {
    match state.repo.get_member(id).await? {
        Some(member) => success(member),
        None => Err(AppError::NotFound(format!("Member {} not found", id))),
    }
}

/// POST /api/members - Create a new member.
pub async fn create_member(
    State(state): State<AppState>,
    Json(request): Json<CreateMemberRequest>,
) -> ApiResult<Member> {
    success(state.repo.create_member(&request).await?)
}

/// PUT /api/members/:id - Update a member.
pub async fn update_member(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateMemberRequest>,
) -> ApiResult<Member> {
    success(state.repo.update_member(id, &request).await?)
}

/// DELETE /api/members/:id - Delete a member and their experiences.
pub async fn delete_member(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    state.repo.delete_member(id).await?;
    success(())
}

/// GET /api/members/:id/score - Leadership score over one member's experiences.
pub async fn get_member_score(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<LeadershipScore> {
    if state.repo.get_member(id).await?.is_none() {
        return Err(AppError::NotFound(format!("Member {} not found", id)));
    }

    let filter = ExperienceFilter {
        member_id: Some(id),
        ..Default::default()
    };
    let experiences = state
        .repo
        .list_experiences(&filter, chrono::Utc::now())
        .await?;

    success(LeadershipScore::compute(&experiences))
}
