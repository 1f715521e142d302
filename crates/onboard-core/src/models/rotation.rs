use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::utils::{parse_day_first_date, parse_whole_number};

/// Header names in the operations calendar
const ROTATION_NO_HEADER: &str = "Rotation No";
const START_DATE_HEADER: &str = "Start date";
const END_DATE_HEADER: &str = "End date";

/// One deployment period of the vessel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationWindow {
    pub rotation_no: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl RotationWindow {
    pub fn new(rotation_no: u32, start: NaiveDate, end: NaiveDate) -> Self {
        Self { rotation_no, start, end }
    }

    /// Inclusive on both ends
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Parse the operations calendar from a spreadsheet-style values grid.
    ///
    /// The first row is the header and must name `Rotation No`, `Start date`
    /// and `End date` (in any column order). Dates are day-first. Rows that
    /// cannot be read are skipped with a warning.
    pub fn from_value_grid(rows: &[Vec<String>]) -> Vec<RotationWindow> {
        let Some((header, body)) = rows.split_first() else {
            return Vec::new();
        };

        let column = |name: &str| header.iter().position(|h| h.trim().eq_ignore_ascii_case(name));
        let (Some(no_col), Some(start_col), Some(end_col)) = (
            column(ROTATION_NO_HEADER),
            column(START_DATE_HEADER),
            column(END_DATE_HEADER),
        ) else {
            warn!(header = ?header, "Rotation calendar is missing required columns");
            return Vec::new();
        };

        body.iter()
            .enumerate()
            .filter_map(|(ix, row)| {
                let cell = |col: usize| row.get(col).map(|s| s.as_str()).unwrap_or("");
                let rotation_no = parse_whole_number(cell(no_col))
                    .and_then(|n| u32::try_from(n).ok());
                let start = parse_day_first_date(cell(start_col));
                let end = parse_day_first_date(cell(end_col));
                match (rotation_no, start, end) {
                    (Some(rotation_no), Some(start), Some(end)) => {
                        Some(RotationWindow::new(rotation_no, start, end))
                    }
                    _ => {
                        warn!(row = ix + 1, cells = ?row, "Skipping unreadable rotation row");
                        None
                    }
                }
            })
            .collect()
    }
}
