//! Data models for the Youth Leadership Tracker.
//!
//! JSON field names are camelCase to stay compatible with previously stored records.

mod dashboard;
mod experience;
mod member;
mod records;

pub use dashboard::*;
pub use experience::*;
pub use member::*;
pub use records::*;
