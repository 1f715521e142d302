//! Removal of medevaced and disembarked people from the working roster.
//!
//! Identity matching is imperfect by nature. Bracelet numbers match exactly.
//! Age bracket plus gender is all older medevac forms collect, and several
//! people usually share a pair; the first one in roster order is removed.
//! That can take the wrong individual off the roster, but it is the behavior
//! every historical report was produced with, so it is kept deterministic
//! rather than "improved".

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use tracing::{debug, info};

use crate::models::{DisembarkEvent, Identity, MedevacEvent, RescueRecord};

/// Label used when a medevac form carries no submission time
pub const UNKNOWN_EVENT_DATE: &str = "unknown";

/// Per-event medevac bookkeeping for the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct MedevacSummary {
    /// Position of the form in arrival order, starting at 0
    pub event_index: usize,
    /// Primary evacuee plus every companion named on the form
    pub evacuee_count: usize,
    #[serde(serialize_with = "serialize_event_date")]
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub event_date: Option<NaiveDateTime>,
}

impl MedevacSummary {
    pub fn date_label(&self) -> String {
        self.event_date
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| UNKNOWN_EVENT_DATE.to_string())
    }
}

fn serialize_event_date<S: Serializer>(
    date: &Option<NaiveDateTime>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match date {
        Some(d) => serializer.serialize_str(&d.format("%Y-%m-%dT%H:%M:%S").to_string()),
        None => serializer.serialize_str(UNKNOWN_EVENT_DATE),
    }
}

/// Result of applying every removal event to a roster.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// People still aboard, in roster order
    pub roster: Vec<RescueRecord>,
    pub medevac_summary: Vec<MedevacSummary>,
    /// Medevac forms plus every companion named on them, whether or not the
    /// people could be found on the roster
    pub medevac_total: usize,
    /// Records actually taken off the roster by medevac forms
    pub removed_by_medevac: usize,
    /// Records actually taken off the roster by disembarkation forms
    pub removed_by_disembarkation: usize,
}

/// Apply medevac forms (in arrival order) and then disembarkation forms.
///
/// Never fails: identities that match nobody are no-ops.
pub fn reconcile(
    roster: &[RescueRecord],
    medevacs: &[MedevacEvent],
    disembarkations: &[DisembarkEvent],
) -> Reconciliation {
    let mut working = roster.to_vec();
    let mut medevac_summary = Vec::with_capacity(medevacs.len());
    let mut medevac_total = 0;

    for (event_index, event) in medevacs.iter().enumerate() {
        if let Some(evacuee) = &event.evacuee {
            remove_identity(&mut working, evacuee);
        } else {
            debug!(event = event_index, "Medevac form without a usable evacuee identity");
        }

        let mut evacuee_count = 1;
        for companion in &event.companions {
            evacuee_count += 1;
            remove_identity(&mut working, companion);
        }

        medevac_total += evacuee_count;
        medevac_summary.push(MedevacSummary {
            event_index,
            evacuee_count,
            event_date: event.submitted_at,
        });
    }
    let removed_by_medevac = roster.len() - working.len();

    let before_disembark = working.len();
    for event in disembarkations {
        let before = working.len();
        apply_disembarkation(&mut working, event);
        debug!(event = %event, removed = before - working.len(), "Applied disembarkation");
    }
    let removed_by_disembarkation = before_disembark - working.len();

    info!(
        rescued = roster.len(),
        onboard = working.len(),
        medevac_forms = medevacs.len(),
        removed_by_medevac,
        removed_by_disembarkation,
        "Reconciled roster"
    );

    Reconciliation {
        roster: working,
        medevac_summary,
        medevac_total,
        removed_by_medevac,
        removed_by_disembarkation,
    }
}

/// Take one identity off the roster. Returns whether anyone was removed.
fn remove_identity(roster: &mut Vec<RescueRecord>, identity: &Identity) -> bool {
    let removed = match identity {
        Identity::Bracelet(bracelet) => {
            // Bracelets are unique; a repeated one is a double submission of
            // the same person, so every copy leaves.
            let before = roster.len();
            roster.retain(|r| !r.matches_bracelet(bracelet));
            before != roster.len()
        }
        Identity::AgeGender { age, gender } => {
            match roster.iter().position(|r| r.matches_age_gender(*age, *gender)) {
                Some(ix) => {
                    roster.remove(ix);
                    true
                }
                None => false,
            }
        }
        Identity::Unresolved(_) => false,
    };

    if !removed {
        debug!(identity = %identity, "Medevac identity not found on roster");
    }
    removed
}

fn apply_disembarkation(roster: &mut Vec<RescueRecord>, event: &DisembarkEvent) {
    match event {
        DisembarkEvent::ByRescue { rescues } => {
            roster.retain(|r| !rescues.contains(&r.rescue_number));
        }
        DisembarkEvent::ByBraceletRange { start, end } => {
            roster.retain(|r| !(*start..=*end).contains(&r.bracelet_as_int()));
        }
        DisembarkEvent::ByBraceletList { bracelets } => {
            roster.retain(|r| {
                r.bracelet_number
                    .as_ref()
                    .map(|b| !bracelets.contains(b))
                    .unwrap_or(true)
            });
        }
    }
}
