//! Offline route-curvature analysis and real-time narration engine for
//! a co-driver app.
//!
//! [`analyzer::analyze`] turns a recorded or planned route into a
//! sequence of classified curves and straights. [`map_match`] then
//! tracks a live GPS fix against that route, and [`narration`] turns
//! route progress into a timed, prioritized stream of spoken phrases.

pub mod analyzer;
pub mod config;
pub mod curvature;
pub mod error;
pub mod geo;
pub mod map_match;
pub mod narration;
pub mod segment;

pub use analyzer::{analyze, AnalysisOutput};
pub use config::{AnalysisConfig, Mode, NarrationConfig, Units, Verbosity};
pub use error::AnalyzeError;
pub use geo::GeoPoint;
