//! SQLite row conversion functions.
//!
//! Pure functions for converting between SQLite rows and domain types.
//! These are testable in isolation without database access. List-valued
//! template fields are stored as JSON text columns.

use chrono::{DateTime, Utc};
use habitsync_core::habits::{HabitTemplate, UserProfile, VacationPeriod};
use rusqlite::types::Type;
use rusqlite::Row;

/// Convert a SQLite row to a HabitTemplate.
///
/// Expected columns: id, name, version, description, tags, kind, difficulty,
/// duration, benefits, outcomes, timeline, emoji, color, habits, is_default,
/// archived, created_at
pub fn row_to_template(row: &Row) -> rusqlite::Result<HabitTemplate> {
    let tags: String = row.get(4)?;
    let benefits: String = row.get(8)?;
    let outcomes: String = row.get(9)?;
    let timeline: String = row.get(10)?;
    let habits: String = row.get(13)?;
    let created_at: String = row.get(16)?;

    Ok(HabitTemplate {
        id: row.get(0)?,
        name: row.get(1)?,
        version: row.get(2)?,
        description: row.get(3)?,
        tags: parse_string_list(&tags, 4)?,
        kind: row.get(5)?,
        difficulty: row.get(6)?,
        duration: row.get(7)?,
        benefits: parse_string_list(&benefits, 8)?,
        outcomes: parse_string_list(&outcomes, 9)?,
        timeline: parse_string_list(&timeline, 10)?,
        emoji: row.get(11)?,
        color: row.get(12)?,
        habits: parse_string_list(&habits, 13)?,
        is_default: row.get(14)?,
        archived: row.get(15)?,
        created_at: parse_datetime(&created_at, 16)?,
    })
}

/// Convert a SQLite row to a VacationPeriod.
///
/// Expected columns: id, start_date, end_date
pub fn row_to_vacation_period(row: &Row) -> rusqlite::Result<VacationPeriod> {
    let start_date: String = row.get(1)?;
    let end_date: Option<String> = row.get(2)?;

    Ok(VacationPeriod {
        id: row.get(0)?,
        start_date: parse_datetime(&start_date, 1)?,
        end_date: end_date.map(|s| parse_datetime(&s, 2)).transpose()?,
    })
}

/// Convert a SQLite row to a UserProfile.
///
/// Expected columns: name, email
pub fn row_to_profile(row: &Row) -> rusqlite::Result<UserProfile> {
    Ok(UserProfile {
        name: row.get(0)?,
        email: row.get(1)?,
    })
}

/// Serialize a string list to its JSON column representation.
pub fn list_to_json(list: &[String]) -> serde_json::Result<String> {
    serde_json::to_string(list)
}

/// Format a timestamp for storage (RFC 3339).
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn parse_string_list(raw: &str, column: usize) -> rusqlite::Result<Vec<String>> {
    serde_json::from_str(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

fn parse_datetime(raw: &str, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_list_to_json_round_trip() {
        let list = vec!["health".to_string(), "morning".to_string()];
        let json = list_to_json(&list).unwrap();
        let parsed = parse_string_list(&json, 0).unwrap();
        assert_eq!(parsed, list);
    }

    #[test]
    fn test_format_and_parse_datetime() {
        let dt = Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap();
        let formatted = format_datetime(&dt);
        let parsed = parse_datetime(&formatted, 0).unwrap();
        assert_eq!(parsed, dt);
    }

    #[test]
    fn test_parse_string_list_rejects_non_array() {
        let result = parse_string_list("\"oops\"", 3);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_datetime_rejects_garbage() {
        let result = parse_datetime("yesterday", 0);
        assert!(result.is_err());
    }
}
