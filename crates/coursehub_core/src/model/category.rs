//! Course categories.

use super::CategoryId;
use serde::Serialize;

/// Category names seeded into every fresh catalog.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "programming",
    "data_science",
    "design",
    "marketing",
    "business",
    "cybersecurity",
    "cloud_computing",
    "artificial_intelligence",
    "machine_learning",
    "web_development",
    "mobile_app_development",
    "game_development",
    "devops",
    "big_data",
    "iot",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}
