//! Repository for member and experience records.
//!
//! Both collections are stored as JSON arrays in the key-value store. Every write
//! reloads, modifies, and saves the whole collection under a single write lock.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use super::{keys, KeyValueStore};
use crate::errors::AppError;
use crate::models::{
    clean_skills, decode_records, dedupe_skills, CreateExperienceRequest, CreateMemberRequest,
    Experience, ExperienceFilter, ExperienceStatus, Member, UpdateExperienceRequest,
    UpdateMemberRequest, MAX_DESCRIPTION_LANGUAGES,
};

/// Repository for all record operations.
pub struct Repository<S> {
    store: Arc<S>,
    write_lock: Mutex<()>,
}

impl<S: KeyValueStore> Repository<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    // ==================== MEMBER OPERATIONS ====================

    /// List all members in stored order.
    pub async fn list_members(&self) -> Result<Vec<Member>, AppError> {
        self.load_members().await
    }

    /// Get a member by ID.
    pub async fn get_member(&self, id: i64) -> Result<Option<Member>, AppError> {
        Ok(self.load_members().await?.into_iter().find(|m| m.id == id))
    }

    /// Create a new member.
    pub async fn create_member(&self, request: &CreateMemberRequest) -> Result<Member, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut members = self.load_members().await?;

        let now = Utc::now();
        let member = Member {
            id: next_id(members.iter().map(|m| m.id)),
            full_name: request.full_name.trim().to_string(),
            email: request.email.trim().to_string(),
            department: request.department.trim().to_string(),
            age: request.age,
            skills: dedupe_skills(request.skills.clone()),
            created_at: now,
            updated_at: now,
        };
        validate_member(&member)?;
        ensure_unique_email(&members, &member)?;

        members.push(member.clone());
        self.save(keys::MEMBER_RECORDS, &members).await?;

        tracing::info!("Created member {} ({})", member.id, member.email);
        Ok(member)
    }

    /// Update a member. Omitted fields keep their current value.
    pub async fn update_member(
        &self,
        id: i64,
        request: &UpdateMemberRequest,
    ) -> Result<Member, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut members = self.load_members().await?;

        let index = members
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Member {} not found", id)))?;

        let existing = &members[index];
        let updated = Member {
            id,
            full_name: trimmed_or(&request.full_name, &existing.full_name),
            email: trimmed_or(&request.email, &existing.email),
            department: trimmed_or(&request.department, &existing.department),
            age: request.age.unwrap_or(existing.age),
            skills: request
                .skills
                .clone()
                .map(dedupe_skills)
                .unwrap_or_else(|| existing.skills.clone()),
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };
        validate_member(&updated)?;
        ensure_unique_email(&members, &updated)?;

        members[index] = updated.clone();
        self.save(keys::MEMBER_RECORDS, &members).await?;

        Ok(updated)
    }

    /// Delete a member together with their experiences.
    pub async fn delete_member(&self, id: i64) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        let mut members = self.load_members().await?;

        let before = members.len();
        members.retain(|m| m.id != id);
        if members.len() == before {
            return Err(AppError::NotFound(format!("Member {} not found", id)));
        }

        let mut experiences = self.load_experiences().await?;
        let experiences_before = experiences.len();
        experiences.retain(|e| e.member_id != id);

        // Members first: a failed second write leaves orphans, never lost records.
        self.save(keys::MEMBER_RECORDS, &members).await?;
        if experiences.len() != experiences_before {
            self.save(keys::EXPERIENCE_RECORDS, &experiences).await?;
        }

        tracing::info!(
            "Deleted member {} and {} experiences",
            id,
            experiences_before - experiences.len()
        );
        Ok(())
    }

    // ==================== EXPERIENCE OPERATIONS ====================

    /// List experiences matching `filter`, with status evaluated at `now`.
    pub async fn list_experiences(
        &self,
        filter: &ExperienceFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<Experience>, AppError> {
        let experiences = self.load_experiences().await?;

        Ok(experiences
            .into_iter()
            .filter(|e| filter.member_id.map_or(true, |id| e.member_id == id))
            .filter(|e| filter.status.map_or(true, |s| e.status_at(now) == s))
            .collect())
    }

    /// Experiences running at `now`.
    pub async fn get_active_experiences(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Experience>, AppError> {
        let filter = ExperienceFilter {
            status: Some(ExperienceStatus::Active),
            ..Default::default()
        };
        self.list_experiences(&filter, now).await
    }

    /// Experiences whose end date has passed at `now`.
    pub async fn get_completed_experiences(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Experience>, AppError> {
        let filter = ExperienceFilter {
            status: Some(ExperienceStatus::Completed),
            ..Default::default()
        };
        self.list_experiences(&filter, now).await
    }

    /// Get an experience by ID.
    pub async fn get_experience(&self, id: i64) -> Result<Option<Experience>, AppError> {
        Ok(self
            .load_experiences()
            .await?
            .into_iter()
            .find(|e| e.id == id))
    }

    /// Create a new experience for an existing member.
    pub async fn create_experience(
        &self,
        request: &CreateExperienceRequest,
    ) -> Result<Experience, AppError> {
        let _guard = self.write_lock.lock().await;
        let members = self.load_members().await?;
        let mut experiences = self.load_experiences().await?;

        let now = Utc::now();
        let experience = Experience {
            id: next_id(experiences.iter().map(|e| e.id)),
            member_id: request.member_id,
            role: request.role.trim().to_string(),
            department: request.department.trim().to_string(),
            description: request.description.clone(),
            start_date: request.start_date,
            end_date: request.end_date,
            skills_gained: clean_skills(request.skills_gained.clone()),
            created_at: now,
            updated_at: now,
        };
        validate_experience(&experience, &members)?;

        experiences.push(experience.clone());
        self.save(keys::EXPERIENCE_RECORDS, &experiences).await?;

        tracing::info!(
            "Created experience {} for member {}",
            experience.id,
            experience.member_id
        );
        Ok(experience)
    }

    /// Update an experience. Omitted fields keep their current value.
    pub async fn update_experience(
        &self,
        id: i64,
        request: &UpdateExperienceRequest,
    ) -> Result<Experience, AppError> {
        let _guard = self.write_lock.lock().await;
        let members = self.load_members().await?;
        let mut experiences = self.load_experiences().await?;

        let index = experiences
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Experience {} not found", id)))?;

        let existing = &experiences[index];
        let updated = Experience {
            id,
            member_id: request.member_id.unwrap_or(existing.member_id),
            role: trimmed_or(&request.role, &existing.role),
            department: trimmed_or(&request.department, &existing.department),
            description: request
                .description
                .clone()
                .or_else(|| existing.description.clone()),
            start_date: request.start_date.unwrap_or(existing.start_date),
            end_date: request.end_date.unwrap_or(existing.end_date),
            skills_gained: request
                .skills_gained
                .clone()
                .map(clean_skills)
                .unwrap_or_else(|| existing.skills_gained.clone()),
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };
        validate_experience(&updated, &members)?;

        experiences[index] = updated.clone();
        self.save(keys::EXPERIENCE_RECORDS, &experiences).await?;

        Ok(updated)
    }

    /// Delete an experience.
    pub async fn delete_experience(&self, id: i64) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        let mut experiences = self.load_experiences().await?;

        let before = experiences.len();
        experiences.retain(|e| e.id != id);
        if experiences.len() == before {
            return Err(AppError::NotFound(format!("Experience {} not found", id)));
        }

        self.save(keys::EXPERIENCE_RECORDS, &experiences).await
    }

    /// Both collections, for computing a dashboard snapshot.
    pub async fn load_all(&self) -> Result<(Vec<Member>, Vec<Experience>), AppError> {
        Ok((self.load_members().await?, self.load_experiences().await?))
    }

    async fn load_members(&self) -> Result<Vec<Member>, AppError> {
        let raw = self.store.get(keys::MEMBER_RECORDS).await?;
        Ok(decode_records(keys::MEMBER_RECORDS, raw.as_deref()))
    }

    async fn load_experiences(&self) -> Result<Vec<Experience>, AppError> {
        let raw = self.store.get(keys::EXPERIENCE_RECORDS).await?;
        Ok(decode_records(keys::EXPERIENCE_RECORDS, raw.as_deref()))
    }

    async fn save<T: Serialize>(&self, key: &str, records: &[T]) -> Result<(), AppError> {
        let json = serde_json::to_string(records)
            .map_err(|e| AppError::Internal(format!("Failed to encode {}: {}", key, e)))?;
        self.store.set(key, &json).await
    }
}

fn next_id(ids: impl Iterator<Item = i64>) -> i64 {
    ids.max().map_or(1, |max| max + 1)
}

fn trimmed_or(value: &Option<String>, current: &str) -> String {
    value
        .as_deref()
        .map(str::trim)
        .unwrap_or(current)
        .to_string()
}

fn validate_member(member: &Member) -> Result<(), AppError> {
    if member.full_name.is_empty() {
        return Err(AppError::Validation("Full name is required".to_string()));
    }
    if !member.email.contains('@') {
        return Err(AppError::Validation(format!(
            "Invalid email address: {}",
            member.email
        )));
    }
    if member.department.is_empty() {
        return Err(AppError::Validation("Department is required".to_string()));
    }
    Ok(())
}

fn ensure_unique_email(members: &[Member], candidate: &Member) -> Result<(), AppError> {
    let clash = members
        .iter()
        .any(|m| m.id != candidate.id && m.email.eq_ignore_ascii_case(&candidate.email));
    if clash {
        return Err(AppError::Conflict {
            message: format!("Email {} is already in use", candidate.email),
            field: "email".to_string(),
        });
    }
    Ok(())
}

fn validate_experience(experience: &Experience, members: &[Member]) -> Result<(), AppError> {
    if !members.iter().any(|m| m.id == experience.member_id) {
        return Err(AppError::Validation(format!(
            "Member {} does not exist",
            experience.member_id
        )));
    }
    if experience.role.is_empty() {
        return Err(AppError::Validation("Role is required".to_string()));
    }
    if experience.department.is_empty() {
        return Err(AppError::Validation("Department is required".to_string()));
    }
    if let Some(end) = experience.end_date {
        if end < experience.start_date {
            return Err(AppError::Validation(
                "End date must not be before start date".to_string(),
            ));
        }
    }
    if let Some(description) = &experience.description {
        if description.language_count() > MAX_DESCRIPTION_LANGUAGES {
            return Err(AppError::Validation(format!(
                "Description supports at most {} languages",
                MAX_DESCRIPTION_LANGUAGES
            )));
        }
    }
    Ok(())
}
