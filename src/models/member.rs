//! Committee member model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::experience::double_option;

/// A committee member who can hold leadership experiences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub department: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a new member.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemberRequest {
    pub full_name: String,
    pub email: String,
    pub department: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// Request body for updating an existing member.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    /// `null` clears the age; omitting the field leaves it unchanged.
    #[serde(default, deserialize_with = "double_option")]
    pub age: Option<Option<u32>>,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
}

/// Collapse a skill list into a set, keeping first occurrences in order.
pub fn dedupe_skills(skills: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(skills.len());
    for skill in skills {
        let skill = skill.trim().to_string();
        if !skill.is_empty() && !out.contains(&skill) {
            out.push(skill);
        }
    }
    out
}
