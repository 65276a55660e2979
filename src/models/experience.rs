//! Leadership experience model.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Maximum number of languages a description may be written in.
pub const MAX_DESCRIPTION_LANGUAGES: usize = 3;

/// A leadership role held by a member over a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub id: i64,
    pub member_id: i64,
    pub role: String,
    pub department: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Description>,
    pub start_date: NaiveDate,
    /// `None` means the role is ongoing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub skills_gained: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Free-text description, either a single string or keyed by language code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Description {
    Plain(String),
    Localized(BTreeMap<String, String>),
}

impl Description {
    pub fn language_count(&self) -> usize {
        match self {
            Description::Plain(_) => 1,
            Description::Localized(texts) => texts.len(),
        }
    }
}

/// Where an experience sits relative to a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceStatus {
    Upcoming,
    Active,
    Completed,
}

/// Dates are interpreted as midnight UTC.
pub fn date_to_instant(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

impl Experience {
    /// Classify against `now`: upcoming before the start date, active until the end
    /// date has passed (or forever when ongoing), completed afterwards.
    pub fn status_at(&self, now: DateTime<Utc>) -> ExperienceStatus {
        if date_to_instant(self.start_date) > now {
            return ExperienceStatus::Upcoming;
        }
        match self.end_date {
            Some(end) if date_to_instant(end) < now => ExperienceStatus::Completed,
            _ => ExperienceStatus::Active,
        }
    }

    /// Whole days between start and end, `None` while ongoing.
    pub fn duration_days(&self) -> Option<i64> {
        self.end_date
            .map(|end| (end - self.start_date).num_days().abs())
    }
}

/// Query filter for listing experiences.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceFilter {
    #[serde(default)]
    pub member_id: Option<i64>,
    #[serde(default)]
    pub status: Option<ExperienceStatus>,
}

/// Request body for creating a new experience.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExperienceRequest {
    pub member_id: i64,
    pub role: String,
    pub department: String,
    #[serde(default)]
    pub description: Option<Description>,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub skills_gained: Vec<String>,
}

/// Request body for updating an existing experience.
///
/// `endDate: null` marks the experience as ongoing again; omitting the field
/// leaves it unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExperienceRequest {
    #[serde(default)]
    pub member_id: Option<i64>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub description: Option<Description>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "double_option")]
    pub end_date: Option<Option<NaiveDate>>,
    #[serde(default)]
    pub skills_gained: Option<Vec<String>>,
}

/// Trim skill names and drop blanks. Repeats are kept: each one counts.
pub fn clean_skills(skills: Vec<String>) -> Vec<String> {
    skills
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Distinguish an explicit `null` (`Some(None)`) from an omitted field (`None`).
pub(crate) fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
