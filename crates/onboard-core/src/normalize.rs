//! Projection of raw survey submissions onto the canonical models.
//!
//! Survey payloads carry dozens of bookkeeping fields (`_id`, `_uuid`,
//! `_attachments`, …) and their schema drifts between rotations. Everything
//! outside the canonical columns is dropped here; everything inside them is
//! parsed leniently so that one malformed value degrades a single field
//! rather than the whole submission.

use tracing::{debug, warn};

use crate::models::{
    AgeBracket, Companion, DisembarkEvent, Gender, Identity, MedevacEvent, RawRecord,
    RescueRecord, YesNo, MEDEVAC_COMPANION_SLOTS,
};
use crate::utils::{field_str, parse_timestamp, parse_whole_number};

/// Rescue-number answer meaning "more than seven rescues, see the free-text field"
pub const MORE_THAN_SEVEN_RESCUES: &str = ">7";

/// Rescue assumed when a submission carries no rescue number
pub const IMPLICIT_RESCUE: u32 = 1;

/// Country answer meaning "see the free-text field"
const OTHER_COUNTRY: &str = "other";

/// Project raw intake submissions onto `RescueRecord`s, preserving order.
pub fn normalize(raw_records: &[RawRecord]) -> Vec<RescueRecord> {
    let records: Vec<RescueRecord> = raw_records.iter().map(normalize_record).collect();
    debug!(count = records.len(), "Normalized intake submissions");
    records
}

fn normalize_record(raw: &RawRecord) -> RescueRecord {
    RescueRecord {
        rescue_number: resolve_rescue_number(raw),
        age: field_str(raw, "age").and_then(|v| parse_or_log(&v, "age", AgeBracket::from_code)),
        gender: field_str(raw, "gender")
            .and_then(|v| parse_or_log(&v, "gender", Gender::from_code)),
        pregnant: yes_no(raw, "pregnant"),
        accompanied: yes_no(raw, "accompanied"),
        accompanied_by: field_str(raw, "accompanied_by_who").map(Companion::from),
        accompanied_by_adult: yes_no(raw, "accompanied_by_who_adult"),
        country: resolve_country(raw),
        bracelet_number: field_str(raw, "bracelet_number"),
        disabled: yes_no(raw, "disabled"),
        submission_time: timestamp(raw, "_submission_time"),
        started_at: timestamp(raw, "start"),
        rotation_no: None,
    }
}

/// Resolve the rescue number, following the `>7` override to the free-text field.
fn resolve_rescue_number(raw: &RawRecord) -> u32 {
    let Some(value) = field_str(raw, "rescue_number") else {
        return IMPLICIT_RESCUE;
    };

    let value = if value == MORE_THAN_SEVEN_RESCUES {
        match field_str(raw, "specify_rescue_number") {
            Some(specified) => specified,
            None => {
                warn!("Rescue number '>7' without a specified number, using implicit rescue");
                return IMPLICIT_RESCUE;
            }
        }
    } else {
        value
    };

    match parse_whole_number(&value).and_then(|n| u32::try_from(n).ok()) {
        Some(n) if n > 0 => n,
        _ => {
            warn!(value = %value, "Unreadable rescue number, using implicit rescue");
            IMPLICIT_RESCUE
        }
    }
}

/// `other` is replaced by the lower-cased free-text answer.
fn resolve_country(raw: &RawRecord) -> Option<String> {
    let country = field_str(raw, "country")?;
    if country == OTHER_COUNTRY {
        field_str(raw, "country_other").map(|c| c.to_lowercase())
    } else {
        Some(country)
    }
}

fn yes_no(raw: &RawRecord, key: &str) -> Option<YesNo> {
    field_str(raw, key).and_then(|v| parse_or_log(&v, key, YesNo::from_code))
}

fn timestamp(raw: &RawRecord, key: &str) -> Option<chrono::NaiveDateTime> {
    field_str(raw, key).and_then(|v| parse_or_log(&v, key, parse_timestamp))
}

fn parse_or_log<T>(value: &str, field: &str, parse: impl FnOnce(&str) -> Option<T>) -> Option<T> {
    let parsed = parse(value);
    if parsed.is_none() {
        debug!(field = field, value = value, "Unrecognized value, treating as absent");
    }
    parsed
}

// ============================================================================
// Medevac forms
// ============================================================================

/// Parse medevac submissions, preserving arrival order.
pub fn normalize_medevacs(raw_events: &[RawRecord]) -> Vec<MedevacEvent> {
    raw_events
        .iter()
        .map(|raw| MedevacEvent {
            evacuee: identity(raw, "bracelet_evacuee", "age_evacuee", "gender_evacuee"),
            companions: (1..=MEDEVAC_COMPANION_SLOTS)
                .filter_map(|slot| {
                    identity(
                        raw,
                        &format!("bracelet_company_{}", slot),
                        &format!("age_company_{}", slot),
                        &format!("gender_company_{}", slot),
                    )
                })
                .collect(),
            submitted_at: timestamp(raw, "_submission_time"),
        })
        .collect()
}

/// Bracelet identity wins; otherwise an age marks the slot as filled.
/// Age and gender must both be readable to match anyone on the roster.
fn identity(raw: &RawRecord, bracelet_key: &str, age_key: &str, gender_key: &str) -> Option<Identity> {
    if let Some(bracelet) = field_str(raw, bracelet_key) {
        return Some(Identity::Bracelet(bracelet));
    }

    let age_text = field_str(raw, age_key)?;
    let age = parse_or_log(&age_text, age_key, AgeBracket::from_code);
    let gender = field_str(raw, gender_key)
        .and_then(|g| parse_or_log(&g, gender_key, Gender::from_code));
    match (age, gender) {
        (Some(age), Some(gender)) => Some(Identity::AgeGender { age, gender }),
        _ => {
            debug!(field = age_key, value = %age_text, "Age given without a readable age/gender pair");
            Some(Identity::Unresolved(age_text))
        }
    }
}

// ============================================================================
// Disembarkation forms
// ============================================================================

/// Parse disembarkation submissions. Forms that cannot be interpreted are
/// skipped with a warning.
pub fn normalize_disembarkations(raw_events: &[RawRecord]) -> Vec<DisembarkEvent> {
    raw_events
        .iter()
        .enumerate()
        .filter_map(|(ix, raw)| {
            let event = disembark_event(raw);
            if event.is_none() {
                warn!(index = ix, "Skipping unreadable disembarkation form");
            }
            event
        })
        .collect()
}

fn disembark_event(raw: &RawRecord) -> Option<DisembarkEvent> {
    match field_str(raw, "type")?.as_str() {
        "rescue" => {
            let rescues: Vec<u32> = field_str(raw, "rescue_number")?
                .split_whitespace()
                .filter_map(|s| parse_whole_number(s).and_then(|n| u32::try_from(n).ok()))
                .collect();
            if rescues.is_empty() {
                None
            } else {
                Some(DisembarkEvent::ByRescue { rescues })
            }
        }
        "bracelet" => match field_str(raw, "bracelet_range_or_numbers")?.as_str() {
            "range" => {
                let start = parse_whole_number(&field_str(raw, "range_start")?)?;
                let end = parse_whole_number(&field_str(raw, "range_end")?)?;
                Some(DisembarkEvent::ByBraceletRange { start, end })
            }
            "numbers" => {
                let bracelets: Vec<String> = field_str(raw, "numbers")?
                    .split(',')
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .map(|s| s.to_string())
                    .collect();
                if bracelets.is_empty() {
                    None
                } else {
                    Some(DisembarkEvent::ByBraceletList { bracelets })
                }
            }
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn raw(value: Value) -> RawRecord {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_normalize_projects_canonical_fields() {
        let records = normalize(&[raw(json!({
            "_id": 991,
            "_uuid": "abc",
            "rescue_number": "2",
            "age": "5_13",
            "gender": "female",
            "accompanied": "yes",
            "accompanied_by_who": "parent",
            "accompanied_by_who_adult": "yes",
            "bracelet_number": 104,
            "_submission_time": "2024-01-05T09:00:00",
            "start": "2024-01-05T10:15:00.000+01:00"
        }))]);

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.rescue_number, 2);
        assert_eq!(r.age, Some(AgeBracket::FiveToThirteen));
        assert_eq!(r.gender, Some(Gender::Female));
        assert_eq!(r.accompanied_by, Some(Companion::Parent));
        assert_eq!(r.bracelet_number.as_deref(), Some("104"));
        assert_eq!(r.pregnant, None);
        assert_eq!(r.disabled, None);
        assert_eq!(r.started_at.map(|t| t.to_string()), Some("2024-01-05 09:15:00".to_string()));
    }

    #[test]
    fn test_more_than_seven_rescues_override() {
        let records = normalize(&[
            raw(json!({"rescue_number": ">7", "specify_rescue_number": "9"})),
            raw(json!({"rescue_number": "3", "specify_rescue_number": "9"})),
            raw(json!({"rescue_number": ">7"})),
        ]);
        assert_eq!(records[0].rescue_number, 9);
        assert_eq!(records[1].rescue_number, 3);
        assert_eq!(records[2].rescue_number, IMPLICIT_RESCUE);
    }

    #[test]
    fn test_missing_rescue_number_defaults_to_implicit() {
        let records = normalize(&[raw(json!({"age": "18_50"}))]);
        assert_eq!(records[0].rescue_number, IMPLICIT_RESCUE);
    }

    #[test]
    fn test_other_country_uses_free_text() {
        let records = normalize(&[
            raw(json!({"country": "other", "country_other": "Burkina FASO"})),
            raw(json!({"country": "south_sudan", "country_other": "ignored"})),
            raw(json!({"country": "other"})),
        ]);
        assert_eq!(records[0].country.as_deref(), Some("burkina faso"));
        assert_eq!(records[1].country.as_deref(), Some("south_sudan"));
        assert_eq!(records[2].country, None);
    }

    #[test]
    fn test_unknown_codes_become_absent() {
        let records = normalize(&[raw(json!({"age": "adult", "gender": "x", "pregnant": "maybe"}))]);
        assert_eq!(records[0].age, None);
        assert_eq!(records[0].gender, None);
        assert_eq!(records[0].pregnant, None);
    }

    #[test]
    fn test_normalize_preserves_order() {
        let records = normalize(&[
            raw(json!({"bracelet_number": "3"})),
            raw(json!({"bracelet_number": "1"})),
            raw(json!({"bracelet_number": "2"})),
        ]);
        let order: Vec<_> = records.iter().filter_map(|r| r.bracelet_number.clone()).collect();
        assert_eq!(order, vec!["3", "1", "2"]);
    }

    #[test]
    fn test_normalize_medevacs() {
        let events = normalize_medevacs(&[
            raw(json!({
                "bracelet_evacuee": "12",
                "age_evacuee": "18_50",
                "gender_evacuee": "male",
                "bracelet_company_1": "13",
                "age_company_2": "u1",
                "gender_company_2": "female",
                "age_company_3": "1_4",
                "_submission_time": "2024-01-07T08:00:00"
            })),
            raw(json!({"age_evacuee": "50p", "gender_evacuee": "female"})),
            raw(json!({"age_evacuee": "50p"})),
        ]);

        assert_eq!(events[0].evacuee, Some(Identity::Bracelet("12".to_string())));
        assert_eq!(
            events[0].companions,
            vec![
                Identity::Bracelet("13".to_string()),
                Identity::AgeGender { age: AgeBracket::UnderOne, gender: Gender::Female },
                Identity::Unresolved("1_4".to_string()),
            ]
        );
        assert!(events[0].submitted_at.is_some());
        assert_eq!(
            events[1].evacuee,
            Some(Identity::AgeGender { age: AgeBracket::OverFifty, gender: Gender::Female })
        );
        assert_eq!(events[2].evacuee, Some(Identity::Unresolved("50p".to_string())));
        assert_eq!(events[2].submitted_at, None);
    }

    #[test]
    fn test_companion_slots_with_age_are_kept() {
        let events = normalize_medevacs(&[raw(json!({
            "bracelet_evacuee": "12",
            "age_company_1": "18_50",
            "gender_company_1": "unknown",
            "age_company_2": "teen",
            "gender_company_2": "male",
            "gender_company_3": "female",
        }))]);

        assert_eq!(
            events[0].companions,
            vec![
                Identity::Unresolved("18_50".to_string()),
                Identity::Unresolved("teen".to_string()),
            ]
        );
    }

    #[test]
    fn test_normalize_disembarkations() {
        let events = normalize_disembarkations(&[
            raw(json!({"type": "rescue", "rescue_number": "2 3"})),
            raw(json!({"type": "bracelet", "bracelet_range_or_numbers": "range", "range_start": "100", "range_end": 105})),
            raw(json!({"type": "bracelet", "bracelet_range_or_numbers": "numbers", "numbers": "7, 9,11"})),
            raw(json!({"type": "bracelet", "bracelet_range_or_numbers": "range", "range_start": "x"})),
            raw(json!({"type": "helicopter"})),
        ]);

        assert_eq!(
            events,
            vec![
                DisembarkEvent::ByRescue { rescues: vec![2, 3] },
                DisembarkEvent::ByBraceletRange { start: 100, end: 105 },
                DisembarkEvent::ByBraceletList {
                    bracelets: vec!["7".to_string(), "9".to_string(), "11".to_string()]
                },
            ]
        );
    }
}
