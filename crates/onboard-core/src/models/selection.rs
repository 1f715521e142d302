use serde::{Deserialize, Serialize};

use crate::utils::parse_whole_number;

/// Selector value meaning "every rescue of the rotation"
pub const TOTAL_SELECTOR: &str = "total";

/// Which part of the roster a report covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RescueSelection {
    Total,
    Rescue(u32),
    /// A selector that names no rescue; selects nobody
    Unrecognized(String),
}

impl RescueSelection {
    /// Interpret a selector. No selector means the most recent rescue among
    /// `known` (or the implicit first rescue when nothing is known).
    pub fn resolve(selector: Option<&str>, known: &[u32]) -> Self {
        let Some(selector) = selector.map(str::trim).filter(|s| !s.is_empty()) else {
            return RescueSelection::Rescue(known.iter().copied().max().unwrap_or(1));
        };

        if selector.eq_ignore_ascii_case(TOTAL_SELECTOR) {
            return RescueSelection::Total;
        }
        // Rescue numbers come back from the survey as "2" or "2.0"
        match parse_whole_number(selector).and_then(|n| u32::try_from(n).ok()) {
            Some(n) => RescueSelection::Rescue(n),
            None => RescueSelection::Unrecognized(selector.to_string()),
        }
    }

    pub fn includes(&self, rescue_number: u32) -> bool {
        match self {
            RescueSelection::Total => true,
            RescueSelection::Rescue(n) => *n == rescue_number,
            RescueSelection::Unrecognized(_) => false,
        }
    }

    pub fn is_total(&self) -> bool {
        matches!(self, RescueSelection::Total)
    }

    /// Text for the selector widget
    pub fn label(&self) -> String {
        match self {
            RescueSelection::Total => TOTAL_SELECTOR.to_string(),
            RescueSelection::Rescue(n) => n.to_string(),
            RescueSelection::Unrecognized(s) => s.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults_to_latest_rescue() {
        assert_eq!(RescueSelection::resolve(None, &[1, 3, 2]), RescueSelection::Rescue(3));
        assert_eq!(RescueSelection::resolve(Some(""), &[1, 2]), RescueSelection::Rescue(2));
        assert_eq!(RescueSelection::resolve(None, &[]), RescueSelection::Rescue(1));
    }

    #[test]
    fn test_resolve_explicit_selectors() {
        assert_eq!(RescueSelection::resolve(Some("total"), &[1]), RescueSelection::Total);
        assert_eq!(RescueSelection::resolve(Some("TOTAL"), &[1]), RescueSelection::Total);
        assert_eq!(RescueSelection::resolve(Some("5"), &[1]), RescueSelection::Rescue(5));
        assert_eq!(RescueSelection::resolve(Some("2.0"), &[1]), RescueSelection::Rescue(2));
        assert_eq!(
            RescueSelection::resolve(Some("-1"), &[1]),
            RescueSelection::Unrecognized("-1".to_string())
        );
        assert_eq!(
            RescueSelection::resolve(Some("<script>"), &[1]),
            RescueSelection::Unrecognized("<script>".to_string())
        );
    }

    #[test]
    fn test_includes() {
        assert!(RescueSelection::Total.includes(7));
        assert!(RescueSelection::Rescue(2).includes(2));
        assert!(!RescueSelection::Rescue(2).includes(3));
        assert!(!RescueSelection::Unrecognized("x".to_string()).includes(1));
    }
}
