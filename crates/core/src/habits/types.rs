use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A habit template: either a built-in starting point or a user-authored plan.
///
/// Serialized with camelCase field names because these records cross the
/// bridge to a JavaScript state container unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitTemplate {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: String,
    pub tags: Vec<String>,
    /// Template kind (e.g. "custom", "guided").
    pub kind: String,
    pub difficulty: String,
    /// Human-readable duration label (e.g. "21 days").
    pub duration: String,
    pub benefits: Vec<String>,
    pub outcomes: Vec<String>,
    pub timeline: Vec<String>,
    pub emoji: String,
    pub color: String,
    /// The habit names this template seeds when applied.
    pub habits: Vec<String>,
    /// True for templates that ship with the app; these never migrate.
    pub is_default: bool,
    /// Soft-delete flag. Archived templates are hidden from pickers but kept
    /// for the state container, which may still reference them.
    pub archived: bool,
    pub created_at: DateTime<Utc>,
}

impl HabitTemplate {
    /// Creates a user-authored template with the given identity and sensible
    /// empty values everywhere else.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: "1.0".to_string(),
            description: String::new(),
            tags: Vec::new(),
            kind: "custom".to_string(),
            difficulty: "medium".to_string(),
            duration: String::new(),
            benefits: Vec::new(),
            outcomes: Vec::new(),
            timeline: Vec::new(),
            emoji: String::new(),
            color: String::new(),
            habits: Vec::new(),
            is_default: false,
            archived: false,
            created_at: Utc::now(),
        }
    }

    /// Sets the tags for this template.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Sets a specific creation timestamp (useful for testing).
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

/// A vacation-mode interval during which streaks are paused.
///
/// An open interval (`end_date: None`) means vacation mode is still active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VacationPeriod {
    pub id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

impl VacationPeriod {
    /// Creates an ongoing vacation period starting at the given instant.
    pub fn started_at(id: impl Into<String>, start_date: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            start_date,
            end_date: None,
        }
    }

    /// Closes this period at the given instant.
    pub fn ended_at(mut self, end_date: DateTime<Utc>) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Returns true if this period has not been closed yet.
    pub fn is_ongoing(&self) -> bool {
        self.end_date.is_none()
    }
}

/// The user's profile. Both fields are optional: the app never forces the
/// user to fill them in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// A partial profile update. `None` means "leave the stored value unchanged",
/// not "clear it".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl ProfileUpdate {
    /// Returns true if this update carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}
