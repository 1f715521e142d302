//! Selection of the active rotation and filtering of submissions to it.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info};

use crate::models::{RawRecord, RescueRecord, RotationWindow};
use crate::utils::{field_str, parse_timestamp};

/// The rotation whose dates contain `today`. When several overlap, the last
/// one in calendar order wins.
pub fn active_rotation(rotations: &[RotationWindow], today: NaiveDate) -> Option<&RotationWindow> {
    rotations.iter().rev().find(|r| r.contains(today))
}

/// Highest rotation number in the calendar
pub fn latest_rotation_no(rotations: &[RotationWindow]) -> Option<u32> {
    rotations.iter().map(|r| r.rotation_no).max()
}

/// Keep the submissions made during the rotation active on `today` and tag
/// them with its number.
///
/// When no rotation covers `today` the latest known rotation number is
/// reported and no submission passes: out-of-window data is never shown as
/// current. Submissions without any timestamp never pass either.
pub fn select_window(
    records: &[RescueRecord],
    rotations: &[RotationWindow],
    today: NaiveDate,
) -> (Vec<RescueRecord>, Option<u32>) {
    let Some(window) = active_rotation(rotations, today) else {
        let rotation_no = latest_rotation_no(rotations);
        info!(
            today = %today,
            rotation = ?rotation_no,
            "No rotation covers today, nothing is in window"
        );
        return (Vec::new(), rotation_no);
    };

    let selected: Vec<RescueRecord> = records
        .iter()
        .filter(|r| {
            r.window_time()
                .map(|t| window.contains(t.date()))
                .unwrap_or(false)
        })
        .map(|r| RescueRecord {
            rotation_no: Some(window.rotation_no),
            ..r.clone()
        })
        .collect();

    debug!(
        rotation = window.rotation_no,
        start = %window.start,
        end = %window.end,
        kept = selected.len(),
        dropped = records.len() - selected.len(),
        "Filtered submissions to active rotation"
    );

    (selected, Some(window.rotation_no))
}

/// Keep the raw medevac or disembarkation forms filed during the rotation
/// active on `today`. Same rules as `select_window`: `start` wins over
/// `_submission_time`, and nothing passes when no rotation is active.
pub fn select_raw_window(
    raw_events: &[RawRecord],
    rotations: &[RotationWindow],
    today: NaiveDate,
) -> Vec<RawRecord> {
    let Some(window) = active_rotation(rotations, today) else {
        return Vec::new();
    };

    raw_events
        .iter()
        .filter(|raw| {
            raw_window_time(raw)
                .map(|t| window.contains(t.date()))
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

fn raw_window_time(raw: &RawRecord) -> Option<NaiveDateTime> {
    ["start", "_submission_time"]
        .iter()
        .find_map(|key| field_str(raw, key).and_then(|v| parse_timestamp(&v)))
}
