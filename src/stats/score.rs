//! Leadership score.
//!
//! Three capped components summed into a 0-100 score:
//! experiences (4 points each, max 40), distinct roles (5 each, max 30) and skill
//! occurrences among the top five skills (2 each, max 30).

use std::collections::HashSet;

use super::{top_skills, TOP_SKILL_LIMIT};
use crate::models::{Experience, LeadershipLevel, LeadershipScore};

const EXPERIENCE_WEIGHT: usize = 4;
const EXPERIENCE_CAP: usize = 40;
const ROLE_WEIGHT: usize = 5;
const ROLE_CAP: usize = 30;
const SKILL_WEIGHT: usize = 2;
const SKILL_CAP: usize = 30;

impl LeadershipScore {
    /// Score a set of experiences, e.g. the whole committee or one member.
    pub fn compute(experiences: &[Experience]) -> Self {
        let distinct_roles = experiences
            .iter()
            .map(|e| e.role.as_str())
            .collect::<HashSet<_>>()
            .len();
        let top_skill_total: usize = top_skills(experiences, TOP_SKILL_LIMIT)
            .iter()
            .map(|s| s.count)
            .sum();

        Self::from_counts(experiences.len(), distinct_roles, top_skill_total)
    }

    fn from_counts(experiences: usize, distinct_roles: usize, skill_occurrences: usize) -> Self {
        let experience_points = capped(experiences, EXPERIENCE_WEIGHT, EXPERIENCE_CAP);
        let role_points = capped(distinct_roles, ROLE_WEIGHT, ROLE_CAP);
        let skill_points = capped(skill_occurrences, SKILL_WEIGHT, SKILL_CAP);
        let score = experience_points + role_points + skill_points;
        let level = LeadershipLevel::for_score(score);

        Self {
            score,
            experience_points,
            role_points,
            skill_points,
            level,
            message: level.message().to_string(),
        }
    }
}

fn capped(count: usize, weight: usize, cap: usize) -> u32 {
    count.saturating_mul(weight).min(cap) as u32
}

impl LeadershipLevel {
    pub fn for_score(score: u32) -> Self {
        match score {
            s if s < 25 => LeadershipLevel::Emerging,
            s if s < 50 => LeadershipLevel::Developing,
            s if s < 75 => LeadershipLevel::Established,
            _ => LeadershipLevel::Senior,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            LeadershipLevel::Emerging => {
                "Leadership experience is just getting started. Taking on a first role builds momentum."
            }
            LeadershipLevel::Developing => {
                "Leadership is growing through a widening mix of roles and new skills."
            }
            LeadershipLevel::Established => {
                "A solid record of leadership across several roles and skill areas."
            }
            LeadershipLevel::Senior => {
                "An outstanding record of sustained and varied leadership."
            }
        }
    }
}
