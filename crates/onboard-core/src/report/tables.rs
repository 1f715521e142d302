//! Summary tables shared with the coordination team after each rescue.
//!
//! These are derived views of a `ReportModel`; turning them into files or
//! emails is left to the dashboard.

use chrono::NaiveDateTime;
use serde::Serialize;

use super::model::ReportModel;
use crate::models::RescueSelection;
use crate::stats::percent;

/// Row of the people-on-board table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeopleOnboardRow {
    pub group: &'static str,
    pub males: usize,
    pub females: usize,
    pub total: usize,
    /// Share of everyone aboard, 0–100; not given for the TOTAL row
    pub percent: Option<f64>,
}

/// Row of the pregnant / single women table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VulnerabilityRow {
    pub group: &'static str,
    pub adults: usize,
    pub minors: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisabilityRow {
    pub males: usize,
    pub females: usize,
    pub total: usize,
}

/// One line per rescue for the operations log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RescueSummary {
    pub rescue_number: u32,
    pub people_rescued: usize,
    pub people_onboard: usize,
    pub first_submission: Option<NaiveDateTime>,
    /// Medevac total for the whole report
    pub medevacs: usize,
}

impl ReportModel {
    /// Adults, accompanied and unaccompanied minors, split by gender
    pub fn people_onboard_table(&self) -> Vec<PeopleOnboardRow> {
        let s = &self.stats;
        let row = |group: &'static str, males: usize, females: usize, total: usize| PeopleOnboardRow {
            group,
            males,
            females,
            total,
            percent: Some(percent(total, s.total)),
        };

        vec![
            row(
                "Adults",
                s.males.saturating_sub(s.minors_male),
                s.females.saturating_sub(s.minors_female),
                s.total.saturating_sub(s.minors),
            ),
            row(
                "Accompanied minors",
                s.minors_male.saturating_sub(s.unaccompanied_minors_male),
                s.minors_female.saturating_sub(s.unaccompanied_minors_female),
                s.minors.saturating_sub(s.unaccompanied_minors),
            ),
            row(
                "Unaccompanied minors",
                s.unaccompanied_minors_male,
                s.unaccompanied_minors_female,
                s.unaccompanied_minors,
            ),
            PeopleOnboardRow {
                group: "TOTAL",
                males: s.males,
                females: s.females,
                total: s.total,
                percent: None,
            },
        ]
    }

    /// Pregnant and single women, adults versus minors
    pub fn vulnerability_table(&self) -> Vec<VulnerabilityRow> {
        let s = &self.stats;
        vec![
            VulnerabilityRow {
                group: "Pregnant",
                adults: s.pregnant_women,
                minors: s.pregnant_minors,
                total: s.pregnant,
            },
            VulnerabilityRow {
                group: "Single females",
                adults: s.unaccompanied_women,
                minors: s.unaccompanied_minors_female,
                total: s.unaccompanied_women + s.unaccompanied_minors_female,
            },
            VulnerabilityRow {
                group: "TOTAL",
                adults: s.pregnant_women + s.unaccompanied_women,
                minors: s.pregnant_minors + s.unaccompanied_minors_female,
                total: s.pregnant + s.unaccompanied_women + s.unaccompanied_minors_female,
            },
        ]
    }

    pub fn disability_table(&self) -> DisabilityRow {
        DisabilityRow {
            males: self.stats.disabled_male,
            females: self.stats.disabled_female,
            total: self.stats.disabled,
        }
    }

    /// Per-rescue rescued/onboard counts. The "total" view lists every
    /// rescue; a single-rescue view lists just that one.
    pub fn rescue_summaries(&self) -> Vec<RescueSummary> {
        let first = |rn: u32| self.rescue_dates.get(&rn).copied();
        match &self.selection {
            Some(RescueSelection::Total) => self
                .total_rescued_by_rescue
                .iter()
                .map(|(&rn, &rescued)| RescueSummary {
                    rescue_number: rn,
                    people_rescued: rescued,
                    people_onboard: self.total_by_rescue.get(&rn).copied().unwrap_or(0),
                    first_submission: first(rn),
                    medevacs: self.medevacs,
                })
                .collect(),
            Some(RescueSelection::Rescue(rn)) => vec![RescueSummary {
                rescue_number: *rn,
                people_rescued: self.total_rescued,
                people_onboard: self.total(),
                first_submission: first(*rn),
                medevacs: self.medevacs,
            }],
            _ => Vec::new(),
        }
    }
}
