//! Data models for the people-on-board engine.
//!
//! - `RescueRecord`: one rescued person, projected onto the canonical columns
//! - `MedevacEvent`, `DisembarkEvent`, `Identity`: removals from the roster
//! - `RotationWindow`: the vessel's operational calendar
//! - `Capabilities`, `RecordColumn`: which columns a survey version collected
//! - `RescueSelection`: which rescue a report covers

pub mod capabilities;
pub mod event;
pub mod record;
pub mod rotation;
pub mod selection;

pub use capabilities::{Capabilities, RecordColumn};
pub use event::{DisembarkEvent, Identity, MedevacEvent, MEDEVAC_COMPANION_SLOTS};
pub use record::{AgeBracket, Companion, Gender, RescueRecord, YesNo};
pub use rotation::RotationWindow;
pub use selection::{RescueSelection, TOTAL_SELECTOR};

/// A survey submission exactly as the platform returns it
pub type RawRecord = serde_json::Map<String, serde_json::Value>;
