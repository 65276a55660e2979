//! Colour and icon tables for charts and the timeline.

use rand::seq::SliceRandom;

/// Picks a colour for a chart label missing from the fixed tables.
pub type FallbackColor = fn(&str) -> &'static str;

const DEPARTMENT_COLORS: &[(&str, &str)] = &[
    ("Executive", "#4F46E5"),
    ("Events", "#F59E0B"),
    ("Marketing", "#EC4899"),
    ("Finance", "#10B981"),
    ("Outreach", "#3B82F6"),
    ("Education", "#8B5CF6"),
    ("Operations", "#64748B"),
];

/// (role, icon, colour)
const ROLE_STYLES: &[(&str, &str, &str)] = &[
    ("President", "crown", "#7C3AED"),
    ("Vice President", "star", "#2563EB"),
    ("Secretary", "clipboard", "#0891B2"),
    ("Treasurer", "coins", "#059669"),
    ("Coordinator", "calendar", "#D97706"),
    ("Committee Member", "users", "#475569"),
    ("Volunteer", "heart", "#DB2777"),
];

const DEFAULT_ROLE_ICON: &str = "briefcase";
const DEFAULT_ROLE_COLOR: &str = "#6B7280";

const FALLBACK_PALETTE: &[&str] = &[
    "#F87171", "#FBBF24", "#34D399", "#60A5FA", "#A78BFA", "#F472B6",
];

/// Fixed colour for a department or role label.
pub fn known_color(label: &str) -> Option<&'static str> {
    DEPARTMENT_COLORS
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, color)| *color)
        .or_else(|| {
            ROLE_STYLES
                .iter()
                .find(|(name, _, _)| *name == label)
                .map(|(_, _, color)| *color)
        })
}

/// Icon and colour for a timeline role, with defaults for unknown roles.
pub fn role_style(role: &str) -> (&'static str, &'static str) {
    ROLE_STYLES
        .iter()
        .find(|(name, _, _)| *name == role)
        .map(|(_, icon, color)| (*icon, *color))
        .unwrap_or((DEFAULT_ROLE_ICON, DEFAULT_ROLE_COLOR))
}

/// Random pick from the fallback palette. Not deterministic.
pub fn random_palette_color(_label: &str) -> &'static str {
    FALLBACK_PALETTE
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(DEFAULT_ROLE_COLOR)
}
