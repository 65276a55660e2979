//! Dashboard snapshot types.
//!
//! A snapshot is computed on demand from the current members and experiences and is
//! never persisted.

use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::ExperienceStatus;

/// Sentinel reported when a histogram has no entries.
pub const NOT_AVAILABLE: &str = "N/A";

/// Label counts in first-seen order. Serializes as a JSON object in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Histogram {
    entries: Vec<(String, usize)>,
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count `labels`, preserving the order in which each label first appears.
    pub fn from_labels<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let mut histogram = Self::new();
        for label in labels {
            histogram.add(label);
        }
        histogram
    }

    pub fn add(&mut self, label: &str) {
        match self.entries.iter_mut().find(|(l, _)| l == label) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((label.to_string(), 1)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(l, c)| (l.as_str(), *c))
    }

    /// Label with the highest count. Ties go to the label seen first.
    pub fn most_common(&self) -> Option<&str> {
        let mut best: Option<(&str, usize)> = None;
        for (label, count) in self.iter() {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((label, count));
            }
        }
        best.map(|(label, _)| label)
    }

    /// Entries sorted by descending count. Stable, so ties keep first-seen order.
    pub fn ranked(&self) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }
}

#[cfg(test)]
impl Histogram {
    pub fn get(&self, label: &str) -> usize {
        self.iter()
            .find(|(l, _)| *l == label)
            .map_or(0, |(_, c)| c)
    }
}

impl Serialize for Histogram {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, count) in &self.entries {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }
}

/// One skill and how often it was gained across experiences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillCount {
    pub skill: String,
    pub count: usize,
}

/// One bar or slice of a chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub count: usize,
    pub color: String,
}

/// Chart series derived from the histograms.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub members_by_department: Vec<ChartPoint>,
    pub experiences_by_role: Vec<ChartPoint>,
    pub experiences_by_department: Vec<ChartPoint>,
}

/// One experience placed on the activity timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub experience_id: i64,
    pub member_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_name: Option<String>,
    pub role: String,
    pub department: String,
    pub start_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub status: ExperienceStatus,
    pub icon: String,
    pub color: String,
}

/// Qualitative band of a leadership score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LeadershipLevel {
    #[serde(rename = "Emerging Leader")]
    Emerging,
    #[serde(rename = "Developing Leader")]
    Developing,
    #[serde(rename = "Established Leader")]
    Established,
    #[serde(rename = "Senior Leader")]
    Senior,
}

/// Composite 0-100 score over a set of experiences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadershipScore {
    pub score: u32,
    pub experience_points: u32,
    pub role_points: u32,
    pub skill_points: u32,
    pub level: LeadershipLevel,
    pub message: String,
}

/// Aggregate dashboard view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub total_members: usize,
    pub total_experiences: usize,
    pub active_experiences: usize,
    pub completed_experiences: usize,
    pub upcoming_experiences: usize,
    pub members_by_department: Histogram,
    pub experiences_by_role: Histogram,
    pub experiences_by_department: Histogram,
    pub top_skills: Vec<SkillCount>,
    /// Mean length in days of experiences that have an end date.
    pub average_experience_duration: u64,
    pub most_common_role: String,
    pub most_represented_department: String,
    pub charts: ChartData,
    pub timeline: Vec<TimelineEntry>,
    pub leadership_score: LeadershipScore,
}
