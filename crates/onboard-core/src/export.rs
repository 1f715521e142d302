//! Tabular roster export for spreadsheet downloads.

use serde::Serialize;

use crate::models::{Capabilities, RescueRecord};

/// Rows of text cells under a header of survey column names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterTable {
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl RosterTable {
    /// Build a table with only the canonical columns this roster actually
    /// carries, in export order.
    pub fn from_records(records: &[RescueRecord]) -> Self {
        let columns = Capabilities::detect(records).columns();
        let rows = records
            .iter()
            .map(|r| columns.iter().map(|c| c.value(r)).collect())
            .collect();

        Self {
            columns: columns.iter().map(|c| c.name()).collect(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Widest cell per column, header included; used to size spreadsheet columns
    pub fn column_widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(ix, name)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(ix))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(name.len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AgeBracket, Gender};

    #[test]
    fn test_from_records_keeps_present_columns_only() {
        let mut a = RescueRecord::new(1);
        a.age = Some(AgeBracket::EighteenToFifty);
        a.gender = Some(Gender::Male);
        let mut b = RescueRecord::new(2);
        b.bracelet_number = Some("1234".to_string());

        let table = RosterTable::from_records(&[a, b]);
        assert_eq!(table.columns, vec!["rescue_number", "age", "gender", "bracelet_number"]);
        assert_eq!(table.rows[0], vec!["1", "18_50", "male", ""]);
        assert_eq!(table.rows[1], vec!["2", "", "", "1234"]);
        assert_eq!(table.column_widths(), vec![13, 5, 6, 15]);
    }

    #[test]
    fn test_empty_roster() {
        let table = RosterTable::from_records(&[]);
        assert!(table.is_empty());
        assert_eq!(table.columns, vec!["rescue_number"]);
    }
}
