//! Report assembly for the people-on-board dashboard.
//!
//! `assemble` packages the statistics, medevac bookkeeping and rescue
//! selector state into a single `ReportModel`. The model also offers the
//! summary tables sent to the coordination team; rendering, storage and
//! transport all happen outside this crate.

pub mod model;
pub mod tables;

pub use model::{assemble, ReportModel, RosterView};
pub use tables::{DisabilityRow, PeopleOnboardRow, RescueSummary, VulnerabilityRow};
