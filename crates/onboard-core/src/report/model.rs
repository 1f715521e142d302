use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::models::{RescueRecord, RescueSelection, TOTAL_SELECTOR};
use crate::reconcile::{MedevacSummary, Reconciliation};
use crate::stats::{count_by_rescue, Stats};
use crate::utils::format_report_date;

/// The roster as it looked before reconciliation, plus what the caller asked for.
#[derive(Debug, Clone)]
pub struct RosterView<'a> {
    /// Distinct rescue numbers in the active rotation
    pub known_rescues: Vec<u32>,
    pub selection: RescueSelection,
    /// Selector text exactly as the caller supplied it
    pub selected_rescue: String,
    /// Records of the selected rescue(s), before any removals
    pub rescued: &'a [RescueRecord],
}

/// Everything the dashboard needs to render the people-on-board page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct ReportModel {
    pub rotation_no: Option<u32>,
    /// Report date, `dd-mm-yyyy`
    pub date: String,
    /// People picked up in the selected rescue(s)
    pub total_rescued: usize,
    /// Only filled for the "total" view
    pub total_rescued_by_rescue: BTreeMap<u32, usize>,
    /// Only filled for the "total" view; rescues with nobody left read 0
    pub total_by_rescue: BTreeMap<u32, usize>,
    /// Statistics over the people still aboard
    pub stats: Stats,
    pub medevacs: usize,
    pub medevac_summary: Vec<MedevacSummary>,
    /// Selector options: `total` followed by every rescue number
    pub rescues: Vec<String>,
    pub selected_rescue: String,
    /// Earliest submission per rescue, for the rescue summary table
    #[cfg_attr(feature = "ts", ts(type = "Record<number, string>"))]
    pub rescue_dates: BTreeMap<u32, NaiveDateTime>,
    #[serde(skip)]
    #[cfg_attr(feature = "ts", ts(skip))]
    pub selection: Option<RescueSelection>,
}

impl ReportModel {
    /// People still aboard
    pub fn total(&self) -> usize {
        self.stats.total
    }
}

/// Package the aggregate outputs into the report model. Performs no
/// rendering, storage or transport.
pub fn assemble(
    stats: Stats,
    reconciliation: &Reconciliation,
    view: RosterView<'_>,
    rotation_no: Option<u32>,
    as_of: NaiveDate,
) -> ReportModel {
    let mut known = view.known_rescues.clone();
    known.sort_unstable();
    known.dedup();
    if known.is_empty() {
        known.push(1);
    }

    let rescues = std::iter::once(TOTAL_SELECTOR.to_string())
        .chain(known.iter().map(|n| n.to_string()))
        .collect();

    let (total_rescued_by_rescue, total_by_rescue) = if view.selection.is_total() {
        let rescued = count_by_rescue(view.rescued);
        let onboard = count_by_rescue(&reconciliation.roster);
        let remaining = rescued
            .keys()
            .map(|rn| (*rn, onboard.get(rn).copied().unwrap_or(0)))
            .collect();
        (rescued, remaining)
    } else {
        (BTreeMap::new(), BTreeMap::new())
    };

    ReportModel {
        rotation_no,
        date: format_report_date(as_of),
        total_rescued: view.rescued.len(),
        total_rescued_by_rescue,
        total_by_rescue,
        stats,
        medevacs: reconciliation.medevac_total,
        medevac_summary: reconciliation.medevac_summary.clone(),
        rescues,
        selected_rescue: view.selected_rescue,
        rescue_dates: first_submissions(view.rescued),
        selection: Some(view.selection),
    }
}

/// Earliest submission time per rescue
fn first_submissions(records: &[RescueRecord]) -> BTreeMap<u32, NaiveDateTime> {
    let mut dates: BTreeMap<u32, NaiveDateTime> = BTreeMap::new();
    for record in records {
        if let Some(t) = record.submission_time {
            dates
                .entry(record.rescue_number)
                .and_modify(|d| *d = (*d).min(t))
                .or_insert(t);
        }
    }
    dates
}
