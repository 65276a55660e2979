//! Dashboard statistics.
//!
//! Pure aggregation over member and experience collections. Given the same inputs
//! and the same `now`, the snapshot is identical except for chart colours of labels
//! missing from the fixed tables, which come from the injectable fallback.

mod palette;
mod score;

pub use palette::*;

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::{
    ChartData, ChartPoint, DashboardSnapshot, Experience, ExperienceStatus, Histogram,
    LeadershipScore, Member, SkillCount, TimelineEntry, NOT_AVAILABLE,
};

/// Number of skills reported in the ranking.
pub const TOP_SKILL_LIMIT: usize = 5;

/// Computes dashboard snapshots at a fixed point in time.
#[derive(Clone)]
pub struct Aggregator {
    now: DateTime<Utc>,
    fallback_color: FallbackColor,
}

impl Aggregator {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            fallback_color: random_palette_color,
        }
    }

    /// Replace the random colour fallback, e.g. with a constant in tests.
    pub fn with_fallback_color(mut self, fallback_color: FallbackColor) -> Self {
        self.fallback_color = fallback_color;
        self
    }

    pub fn compute(&self, members: &[Member], experiences: &[Experience]) -> DashboardSnapshot {
        let mut active = 0;
        let mut completed = 0;
        let mut upcoming = 0;
        for experience in experiences {
            match experience.status_at(self.now) {
                ExperienceStatus::Active => active += 1,
                ExperienceStatus::Completed => completed += 1,
                ExperienceStatus::Upcoming => upcoming += 1,
            }
        }

        let members_by_department =
            Histogram::from_labels(members.iter().map(|m| m.department.as_str()));
        let experiences_by_role =
            Histogram::from_labels(experiences.iter().map(|e| e.role.as_str()));
        let experiences_by_department =
            Histogram::from_labels(experiences.iter().map(|e| e.department.as_str()));

        let most_common_role = experiences_by_role
            .most_common()
            .unwrap_or(NOT_AVAILABLE)
            .to_string();
        let most_represented_department = members_by_department
            .most_common()
            .unwrap_or(NOT_AVAILABLE)
            .to_string();

        let charts = ChartData {
            members_by_department: self.chart(&members_by_department),
            experiences_by_role: self.chart(&experiences_by_role),
            experiences_by_department: self.chart(&experiences_by_department),
        };

        tracing::debug!(
            members = members.len(),
            experiences = experiences.len(),
            active,
            completed,
            upcoming,
            "Computed dashboard snapshot"
        );

        DashboardSnapshot {
            total_members: members.len(),
            total_experiences: experiences.len(),
            active_experiences: active,
            completed_experiences: completed,
            upcoming_experiences: upcoming,
            top_skills: top_skills(experiences, TOP_SKILL_LIMIT),
            average_experience_duration: average_duration_days(experiences),
            most_common_role,
            most_represented_department,
            charts,
            timeline: self.timeline(members, experiences),
            leadership_score: LeadershipScore::compute(experiences),
            members_by_department,
            experiences_by_role,
            experiences_by_department,
        }
    }

    /// Histogram as chart points, highest count first.
    fn chart(&self, histogram: &Histogram) -> Vec<ChartPoint> {
        histogram
            .ranked()
            .into_iter()
            .map(|(label, count)| ChartPoint {
                label: label.to_string(),
                count,
                color: known_color(label)
                    .unwrap_or_else(|| (self.fallback_color)(label))
                    .to_string(),
            })
            .collect()
    }

    /// Every experience, most recent start date first.
    fn timeline(&self, members: &[Member], experiences: &[Experience]) -> Vec<TimelineEntry> {
        let names: HashMap<i64, &str> = members
            .iter()
            .map(|m| (m.id, m.full_name.as_str()))
            .collect();

        let mut entries: Vec<TimelineEntry> = experiences
            .iter()
            .map(|e| {
                let (icon, color) = role_style(&e.role);
                TimelineEntry {
                    experience_id: e.id,
                    member_id: e.member_id,
                    member_name: names.get(&e.member_id).map(|n| n.to_string()),
                    role: e.role.clone(),
                    department: e.department.clone(),
                    start_date: e.start_date,
                    end_date: e.end_date,
                    status: e.status_at(self.now),
                    icon: icon.to_string(),
                    color: color.to_string(),
                }
            })
            .collect();

        entries.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        entries
    }
}

/// Snapshot at the current wall-clock time with the random colour fallback.
pub fn compute_stats(members: &[Member], experiences: &[Experience]) -> DashboardSnapshot {
    Aggregator::new(Utc::now()).compute(members, experiences)
}

/// Most frequently gained skills, at most `limit`. Ties keep first-seen order.
pub fn top_skills(experiences: &[Experience], limit: usize) -> Vec<SkillCount> {
    let histogram = Histogram::from_labels(
        experiences
            .iter()
            .flat_map(|e| e.skills_gained.iter().map(String::as_str)),
    );

    histogram
        .ranked()
        .into_iter()
        .take(limit)
        .map(|(skill, count)| SkillCount {
            skill: skill.to_string(),
            count,
        })
        .collect()
}

/// Mean duration in whole days over experiences that have ended, rounded to the
/// nearest day. 0 when none have an end date.
pub fn average_duration_days(experiences: &[Experience]) -> u64 {
    let durations: Vec<i64> = experiences
        .iter()
        .filter_map(Experience::duration_days)
        .collect();

    if durations.is_empty() {
        return 0;
    }

    let total: i64 = durations.iter().sum();
    (total as f64 / durations.len() as f64).round() as u64
}
