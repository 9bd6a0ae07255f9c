//! Menu items and daily specials served by `/menu/*`.

use serde::{Deserialize, Serialize};

/// A regular menu entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    #[serde(deserialize_with = "crate::deserialize_i64_from_number")]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Decimal price serialized as a string.
    pub price: String,
    /// Image URL, if one was uploaded.
    pub image: Option<String>,
    pub is_vegetarian: Option<bool>,
    pub is_available: Option<bool>,
    pub category: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// A menu entry flagged for a specific date, visible to guests only while active.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailySpecial {
    #[serde(deserialize_with = "crate::deserialize_i64_from_number")]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: String,
    pub image: Option<String>,
    /// Date the special applies to (`YYYY-MM-DD`).
    pub date: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl DailySpecial {
    /// Action endpoint segment that flips the current visibility.
    #[must_use]
    pub fn toggle_action(&self) -> &'static str {
        if self.is_active { "deactivate" } else { "activate" }
    }
}
