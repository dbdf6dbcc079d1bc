//! Legacy record shapes and normalization.
//!
//! Records in the legacy key-value store were written by several app
//! versions, so any field may be missing. Every field here is therefore
//! optional and defaulted at the serde level; [`normalize_template`] then
//! fills concrete values so the durable store never sees a hole. Only the
//! identity fields (id, name) are allowed to fail a record.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use habitsync_core::habits::{HabitTemplate, VacationPeriod};

const DEFAULT_VERSION: &str = "1.0";
const DEFAULT_KIND: &str = "custom";
const DEFAULT_DIFFICULTY: &str = "medium";
const DEFAULT_DURATION: &str = "21 days";
const DEFAULT_EMOJI: &str = "✨";
const DEFAULT_COLOR: &str = "#4f8a8b";

/// A habit template as the legacy store serialized it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegacyTemplate {
    pub id: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    /// Old single-category field, superseded by `tags`.
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub difficulty: Option<String>,
    pub duration: Option<String>,
    pub benefits: Option<Vec<String>>,
    pub outcomes: Option<Vec<String>>,
    pub timeline: Option<Vec<String>>,
    pub emoji: Option<String>,
    pub color: Option<String>,
    pub habits: Option<Vec<String>>,
    pub created_at: Option<DateTime<Utc>>,
    pub is_default: bool,
}

/// A vacation interval as the legacy store serialized it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegacyVacationPeriod {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Normalizes a legacy template into the current schema.
///
/// Returns `None` only when an identity field is missing; every other
/// absent field gets a concrete default. Legacy records carried a single
/// `category` string before `tags` existed, so a missing tag list is
/// derived from it.
pub fn normalize_template(legacy: LegacyTemplate) -> Option<HabitTemplate> {
    let id = legacy.id?;
    let name = legacy.name?;
    let tags = match legacy.tags {
        Some(tags) => tags,
        None => legacy.category.into_iter().collect(),
    };

    Some(HabitTemplate {
        id,
        name,
        version: legacy.version.unwrap_or_else(|| DEFAULT_VERSION.to_string()),
        description: legacy.description.unwrap_or_default(),
        tags,
        kind: legacy.kind.unwrap_or_else(|| DEFAULT_KIND.to_string()),
        difficulty: legacy
            .difficulty
            .unwrap_or_else(|| DEFAULT_DIFFICULTY.to_string()),
        duration: legacy
            .duration
            .unwrap_or_else(|| DEFAULT_DURATION.to_string()),
        benefits: legacy.benefits.unwrap_or_default(),
        outcomes: legacy.outcomes.unwrap_or_default(),
        timeline: legacy.timeline.unwrap_or_default(),
        emoji: legacy.emoji.unwrap_or_else(|| DEFAULT_EMOJI.to_string()),
        color: legacy.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
        habits: legacy.habits.unwrap_or_default(),
        is_default: legacy.is_default,
        archived: false,
        created_at: legacy.created_at.unwrap_or_else(Utc::now),
    })
}

/// Normalizes a legacy vacation interval, minting the durable row id.
///
/// Returns `None` when the start date is missing; an absent end date is a
/// valid, still-ongoing interval and is preserved as `None`.
pub fn normalize_vacation_period(
    legacy: LegacyVacationPeriod,
    id: impl Into<String>,
) -> Option<VacationPeriod> {
    Some(VacationPeriod {
        id: id.into(),
        start_date: legacy.start_date?,
        end_date: legacy.end_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sparse_template_gets_defaults() {
        let legacy: LegacyTemplate =
            serde_json::from_str(r#"{"id":"tpl-1","name":"Morning run"}"#).unwrap();
        let template = normalize_template(legacy).unwrap();

        assert_eq!(template.id, "tpl-1");
        assert_eq!(template.name, "Morning run");
        assert_eq!(template.version, DEFAULT_VERSION);
        assert_eq!(template.kind, DEFAULT_KIND);
        assert_eq!(template.difficulty, DEFAULT_DIFFICULTY);
        assert_eq!(template.duration, DEFAULT_DURATION);
        assert_eq!(template.emoji, DEFAULT_EMOJI);
        assert_eq!(template.color, DEFAULT_COLOR);
        assert!(template.tags.is_empty());
        assert!(template.benefits.is_empty());
        assert!(!template.archived);
    }

    #[test]
    fn test_tags_derived_from_legacy_category() {
        let legacy: LegacyTemplate =
            serde_json::from_str(r#"{"id":"tpl-1","name":"Run","category":"fitness"}"#).unwrap();
        let template = normalize_template(legacy).unwrap();

        assert_eq!(template.tags, vec!["fitness".to_string()]);
    }

    #[test]
    fn test_explicit_tags_win_over_category() {
        let raw = r#"{"id":"tpl-1","name":"Run","category":"fitness","tags":["health"]}"#;
        let legacy: LegacyTemplate = serde_json::from_str(raw).unwrap();
        let template = normalize_template(legacy).unwrap();

        assert_eq!(template.tags, vec!["health".to_string()]);
    }

    #[test]
    fn test_template_without_id_is_rejected() {
        let legacy: LegacyTemplate = serde_json::from_str(r#"{"name":"Run"}"#).unwrap();
        assert!(normalize_template(legacy).is_none());
    }

    #[test]
    fn test_template_without_name_is_rejected() {
        let legacy: LegacyTemplate = serde_json::from_str(r#"{"id":"tpl-1"}"#).unwrap();
        assert!(normalize_template(legacy).is_none());
    }

    #[test]
    fn test_legacy_type_field_maps_to_kind() {
        let legacy: LegacyTemplate =
            serde_json::from_str(r#"{"id":"tpl-1","name":"Run","type":"guided"}"#).unwrap();
        let template = normalize_template(legacy).unwrap();

        assert_eq!(template.kind, "guided");
    }

    #[test]
    fn test_vacation_period_preserves_open_end() {
        let legacy: LegacyVacationPeriod =
            serde_json::from_str(r#"{"startDate":"2024-07-01T00:00:00Z","endDate":null}"#).unwrap();
        let period = normalize_vacation_period(legacy, "vac-1").unwrap();

        assert_eq!(
            period.start_date,
            Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap()
        );
        assert!(period.is_ongoing());
    }

    #[test]
    fn test_vacation_period_without_start_is_rejected() {
        let legacy: LegacyVacationPeriod = serde_json::from_str("{}").unwrap();
        assert!(normalize_vacation_period(legacy, "vac-1").is_none());
    }
}
