//! Core library for onboard.
//!
//! Turns raw survey submissions from a rescue vessel into a people-on-board
//! report: submissions are normalized, filtered to the active rotation,
//! reconciled against medevac and disembarkation forms, and aggregated into
//! nested demographic statistics.
//!
//! The engine (`normalize`, `window`, `reconcile`, `stats`, `report`) is
//! pure and synchronous. Only `api` performs I/O.
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! use onboard_core::{api, build_report, Config, SurveyClient};
//!
//! let config = Config::load()?;
//! let rotations = api::load_rotations(config.require_rotations_path()?)?;
//! let client = SurveyClient::from_config(&config)?;
//! let source = client.fetch_source_data(&config, rotations).await?;
//!
//! let today = chrono::Utc::now().date_naive();
//! let report = build_report(&source, Some("total"), today);
//! println!("{} people on board", report.total());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod export;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod reconcile;
pub mod report;
pub mod stats;
pub mod utils;
pub mod window;

pub use api::{SurveyClient, SurveyError};
pub use config::Config;
pub use export::RosterTable;
pub use models::{
    Capabilities, DisembarkEvent, Identity, MedevacEvent, RawRecord, RescueRecord,
    RescueSelection, RotationWindow,
};
pub use normalize::{normalize, normalize_disembarkations, normalize_medevacs};
pub use pipeline::{build_report, export_roster, SourceData};
pub use reconcile::{reconcile, MedevacSummary, Reconciliation};
pub use report::{assemble, ReportModel, RosterView};
pub use stats::{aggregate, count_by_rescue, BreakdownRow, Stats};
pub use window::{select_raw_window, select_window};
