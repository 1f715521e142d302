//! End-to-end composition of the engine.
//!
//! Normalizer -> Window Selector -> Event Reconciler -> Demographic
//! Aggregator -> Report Assembler. Each call works on its own copy of the
//! data; nothing is cached between requests.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::export::RosterTable;
use crate::models::{RawRecord, RescueRecord, RescueSelection, RotationWindow};
use crate::normalize::{normalize, normalize_disembarkations, normalize_medevacs};
use crate::reconcile::{reconcile, Reconciliation};
use crate::report::{assemble, ReportModel, RosterView};
use crate::stats::aggregate;
use crate::window::{select_raw_window, select_window};

/// Already-fetched upstream inputs for one report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceData {
    /// Intake form submissions
    pub submissions: Vec<RawRecord>,
    pub rotations: Vec<RotationWindow>,
    /// Medevac form submissions
    pub medevacs: Vec<RawRecord>,
    /// Disembarkation form submissions
    pub disembarkations: Vec<RawRecord>,
}

/// Intermediate state shared by `build_report` and `export_roster`
struct Prepared {
    rotation_no: Option<u32>,
    known_rescues: Vec<u32>,
    selection: RescueSelection,
    rescued: Vec<RescueRecord>,
    reconciliation: Reconciliation,
}

fn prepare(source: &SourceData, selected_rescue: Option<&str>, as_of: NaiveDate) -> Prepared {
    let records = normalize(&source.submissions);
    let (in_window, rotation_no) = select_window(&records, &source.rotations, as_of);

    let mut known_rescues: Vec<u32> = in_window.iter().map(|r| r.rescue_number).collect();
    known_rescues.sort_unstable();
    known_rescues.dedup();

    let selection = RescueSelection::resolve(selected_rescue, &known_rescues);
    let rescued: Vec<RescueRecord> = in_window
        .into_iter()
        .filter(|r| selection.includes(r.rescue_number))
        .collect();

    let medevacs = normalize_medevacs(&select_raw_window(&source.medevacs, &source.rotations, as_of));
    let disembarkations = normalize_disembarkations(&select_raw_window(
        &source.disembarkations,
        &source.rotations,
        as_of,
    ));
    let reconciliation = reconcile(&rescued, &medevacs, &disembarkations);

    info!(
        rotation = ?rotation_no,
        selection = %selection.label(),
        rescued = rescued.len(),
        onboard = reconciliation.roster.len(),
        medevacs = reconciliation.medevac_total,
        "Prepared report inputs"
    );

    Prepared {
        rotation_no,
        known_rescues,
        selection,
        rescued,
        reconciliation,
    }
}

/// Build the people-on-board report for `selected_rescue` (`"total"`, a
/// rescue number, or `None` for the latest rescue) as of the given day.
pub fn build_report(
    source: &SourceData,
    selected_rescue: Option<&str>,
    as_of: NaiveDate,
) -> ReportModel {
    let prepared = prepare(source, selected_rescue, as_of);
    let stats = aggregate(&prepared.reconciliation.roster);

    let echoed = match selected_rescue {
        Some(text) => text.to_string(),
        None => prepared.selection.label(),
    };

    assemble(
        stats,
        &prepared.reconciliation,
        RosterView {
            known_rescues: prepared.known_rescues,
            selection: prepared.selection,
            selected_rescue: echoed,
            rescued: &prepared.rescued,
        },
        prepared.rotation_no,
        as_of,
    )
}

/// The reconciled roster as a table, for spreadsheet export.
pub fn export_roster(
    source: &SourceData,
    selected_rescue: Option<&str>,
    as_of: NaiveDate,
) -> RosterTable {
    let prepared = prepare(source, selected_rescue, as_of);
    RosterTable::from_records(&prepared.reconciliation.roster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn source() -> SourceData {
        SourceData {
            submissions: vec![
                raw(json!({"rescue_number": "1", "gender": "male", "age": "18_50", "bracelet_number": "10", "_submission_time": "2024-05-02T08:00:00"})),
                raw(json!({"rescue_number": "1", "gender": "female", "age": "5_17", "bracelet_number": "11", "_submission_time": "2024-05-02T08:05:00"})),
                raw(json!({"rescue_number": "2", "gender": "male", "age": "18_50", "bracelet_number": "20", "_submission_time": "2024-05-04T09:00:00"})),
                raw(json!({"rescue_number": "3", "gender": "male", "age": "18_50", "bracelet_number": "30", "_submission_time": "2024-04-20T09:00:00"})),
            ],
            rotations: vec![RotationWindow::new(7, day(1), day(31))],
            medevacs: vec![raw(json!({"bracelet_evacuee": "11", "_submission_time": "2024-05-03T10:00:00"}))],
            disembarkations: Vec::new(),
        }
    }

    #[test]
    fn test_build_report_defaults_to_latest_rescue() {
        let report = build_report(&source(), None, day(10));
        assert_eq!(report.rotation_no, Some(7));
        assert_eq!(report.selected_rescue, "2");
        assert_eq!(report.rescues, vec!["total", "1", "2"]);
        assert_eq!(report.total_rescued, 1);
        assert_eq!(report.total(), 1);
        assert_eq!(report.medevacs, 1);
    }

    #[test]
    fn test_build_report_total() {
        let report = build_report(&source(), Some("total"), day(10));
        assert_eq!(report.total_rescued, 3);
        assert_eq!(report.total(), 2);
        assert_eq!(report.total_by_rescue.get(&1), Some(&1));
        assert_eq!(report.stats.minors, 0);
        assert_eq!(report.date, "10-05-2024");
    }

    #[test]
    fn test_unrecognized_selector_is_echoed() {
        let report = build_report(&source(), Some("seven"), day(10));
        assert_eq!(report.selected_rescue, "seven");
        assert_eq!(report.total(), 0);
        assert_eq!(report.rescues, vec!["total", "1", "2"]);
    }

    #[test]
    fn test_export_roster() {
        let table = export_roster(&source(), Some("1"), day(10));
        assert_eq!(table.len(), 1);
        assert!(table.columns.contains(&"bracelet_number"));
        assert!(table.columns.contains(&"rotation_no"));
        assert!(!table.columns.contains(&"pregnant"));
    }
}
