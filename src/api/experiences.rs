//! Experience API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{
    CreateExperienceRequest, Experience, ExperienceFilter, UpdateExperienceRequest,
};
use crate::AppState;

/// GET /api/experiences - List experiences, optionally by `memberId` and `status`.
pub async fn list_experiences(
    State(state): State<AppState>,
    Query(filter): Query<ExperienceFilter>,
) -> ApiResult<Vec<Experience>> {
    success(state.repo.list_experiences(&filter, Utc::now()).await?)
}

/// GET /api/experiences/active - Experiences running today.
pub async fn list_active_experiences(
    State(state): State<AppState>,
) -> ApiResult<Vec<Experience>> {
    success(state.repo.get_active_experiences(Utc::now()).await?)
}

/// GET /api/experiences/completed - Experiences that have ended.
pub async fn list_completed_experiences(
    State(state): State<AppState>,
) -> ApiResult<Vec<Experience>> {
    success(state.repo.get_completed_experiences(Utc::now()).await?)
}

/// GET /api/experiences/:id - Get a single experience.
pub async fn get_experience(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Experience> {
    match state.repo.get_experience(id).await? {
        Some(experience) => success(experience),
        None => Err(AppError::NotFound(format!("Experience {} not found", id))),
    }
}

/// POST /api/experiences - Create a new experience.
pub async fn create_experience(
    State(state): State<AppState>,
    Json(request): Json<CreateExperienceRequest>,
) -> ApiResult<Experience> {
    success(state.repo.create_experience(&request).await?)
}

/// PUT /api/experiences/:id - Update an experience.
pub async fn update_experience(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateExperienceRequest>,
) -> ApiResult<Experience> {
    success(state.repo.update_experience(id, &request).await?)
}

/// DELETE /api/experiences/:id - Delete an experience.
pub async fn delete_experience(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    state.repo.delete_experience(id).await?;
    success(())
}
