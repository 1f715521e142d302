//! Field-presence detection across survey versions.
//!
//! The intake form has changed between rotations: pregnancy, disability and
//! the companion-refinement questions were added over time. Rather than
//! branching on column existence wherever a statistic is computed, the roster
//! is scanned once and the resulting `Capabilities` are carried alongside the
//! statistics and used to decide which export columns exist.

use serde::{Deserialize, Serialize};

use super::record::RescueRecord;
use crate::utils::format::REPORT_DATE_FORMAT;

/// Canonical roster columns, in export order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordColumn {
    RescueNumber,
    Age,
    Gender,
    Pregnant,
    Accompanied,
    AccompaniedBy,
    AccompaniedByAdult,
    Country,
    BraceletNumber,
    Disabled,
    SubmissionTime,
    RotationNo,
}

impl RecordColumn {
    pub const ALL: [RecordColumn; 12] = [
        RecordColumn::RescueNumber,
        RecordColumn::Age,
        RecordColumn::Gender,
        RecordColumn::Pregnant,
        RecordColumn::Accompanied,
        RecordColumn::AccompaniedBy,
        RecordColumn::AccompaniedByAdult,
        RecordColumn::Country,
        RecordColumn::BraceletNumber,
        RecordColumn::Disabled,
        RecordColumn::SubmissionTime,
        RecordColumn::RotationNo,
    ];

    /// Column name as it appears in the survey export
    pub fn name(&self) -> &'static str {
        match self {
            RecordColumn::RescueNumber => "rescue_number",
            RecordColumn::Age => "age",
            RecordColumn::Gender => "gender",
            RecordColumn::Pregnant => "pregnant",
            RecordColumn::Accompanied => "accompanied",
            RecordColumn::AccompaniedBy => "accompanied_by_who",
            RecordColumn::AccompaniedByAdult => "accompanied_by_who_adult",
            RecordColumn::Country => "country",
            RecordColumn::BraceletNumber => "bracelet_number",
            RecordColumn::Disabled => "disabled",
            RecordColumn::SubmissionTime => "_submission_time",
            RecordColumn::RotationNo => "rotation_no",
        }
    }

    /// Cell text for a record; empty when the value is absent
    pub fn value(&self, record: &RescueRecord) -> String {
        match self {
            RecordColumn::RescueNumber => record.rescue_number.to_string(),
            RecordColumn::Age => code_or_empty(record.age.map(|a| a.code())),
            RecordColumn::Gender => code_or_empty(record.gender.map(|g| g.code())),
            RecordColumn::Pregnant => code_or_empty(record.pregnant.map(|v| v.code())),
            RecordColumn::Accompanied => code_or_empty(record.accompanied.map(|v| v.code())),
            RecordColumn::AccompaniedBy => {
                code_or_empty(record.accompanied_by.as_ref().map(|c| c.code()))
            }
            RecordColumn::AccompaniedByAdult => {
                code_or_empty(record.accompanied_by_adult.map(|v| v.code()))
            }
            RecordColumn::Country => record.country.clone().unwrap_or_default(),
            RecordColumn::BraceletNumber => record.bracelet_number.clone().unwrap_or_default(),
            RecordColumn::Disabled => code_or_empty(record.disabled.map(|v| v.code())),
            RecordColumn::SubmissionTime => record
                .submission_time
                .map(|t| format!("{} {}", t.format(REPORT_DATE_FORMAT), t.format("%H:%M:%S")))
                .unwrap_or_default(),
            RecordColumn::RotationNo => record
                .rotation_no
                .map(|n| n.to_string())
                .unwrap_or_default(),
        }
    }
}

fn code_or_empty(code: Option<&str>) -> String {
    code.unwrap_or("").to_string()
}

/// Which optional columns carry at least one value in a roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct Capabilities {
    pub age: bool,
    pub gender: bool,
    pub pregnant: bool,
    pub accompanied: bool,
    pub accompanied_by: bool,
    pub accompanied_by_adult: bool,
    pub country: bool,
    pub bracelet_number: bool,
    pub disabled: bool,
    pub submission_time: bool,
    pub rotation_no: bool,
}

impl Capabilities {
    pub fn detect(records: &[RescueRecord]) -> Self {
        records.iter().fold(Self::default(), |caps, r| Self {
            age: caps.age || r.age.is_some(),
            gender: caps.gender || r.gender.is_some(),
            pregnant: caps.pregnant || r.pregnant.is_some(),
            accompanied: caps.accompanied || r.accompanied.is_some(),
            accompanied_by: caps.accompanied_by || r.accompanied_by.is_some(),
            accompanied_by_adult: caps.accompanied_by_adult || r.accompanied_by_adult.is_some(),
            country: caps.country || r.country.is_some(),
            bracelet_number: caps.bracelet_number || r.bracelet_number.is_some(),
            disabled: caps.disabled || r.disabled.is_some(),
            submission_time: caps.submission_time || r.submission_time.is_some(),
            rotation_no: caps.rotation_no || r.rotation_no.is_some(),
        })
    }

    pub fn has(&self, column: RecordColumn) -> bool {
        match column {
            RecordColumn::RescueNumber => true,
            RecordColumn::Age => self.age,
            RecordColumn::Gender => self.gender,
            RecordColumn::Pregnant => self.pregnant,
            RecordColumn::Accompanied => self.accompanied,
            RecordColumn::AccompaniedBy => self.accompanied_by,
            RecordColumn::AccompaniedByAdult => self.accompanied_by_adult,
            RecordColumn::Country => self.country,
            RecordColumn::BraceletNumber => self.bracelet_number,
            RecordColumn::Disabled => self.disabled,
            RecordColumn::SubmissionTime => self.submission_time,
            RecordColumn::RotationNo => self.rotation_no,
        }
    }

    /// Present columns in export order
    pub fn columns(&self) -> Vec<RecordColumn> {
        RecordColumn::ALL
            .into_iter()
            .filter(|c| self.has(*c))
            .collect()
    }
}
