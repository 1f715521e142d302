//! Client for the humanitarian survey platform.
//!
//! Intake, medevac and disembarkation forms are separate survey assets;
//! each is downloaded as `{"results": [...]}` from
//! `{base_url}/assets/{asset}/data.json` with token authentication. The
//! rotation calendar is read from a local values-grid file.

pub mod client;
pub mod error;

pub use client::{load_rotations, parse_rotation_grid, parse_submissions, SurveyClient};
pub use error::SurveyError;
