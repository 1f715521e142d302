//! Utility functions for payload coercion and date formatting.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{
    field_str, format_report_date, parse_day_first_date, parse_timestamp, parse_whole_number,
};
