//! Weight Plan Shared Library
//!
//! The calculation core: caloric plan, weight projection and trend
//! smoothing, plus the types shared by the backend and WASM modules.
//! Nothing in this crate performs I/O.

pub mod errors;
pub mod health_metrics;
pub mod models;
pub mod plan;
pub mod profile;
pub mod trend;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use health_metrics::*;
pub use models::{Identity, Measurement, MeasurementLog, UpsertOutcome};
pub use plan::{
    calculate_plan, project_weight_loss, Plan, Projection, ProjectionInput, ProjectionOutcome,
    ProjectionPoint, UnavailableReason,
};
pub use profile::{Profile, ProfileFields};
pub use trend::{
    build_tracking_series, rolling_average, week_offsets, Indicators, TrackedPoint,
    TrackingSeries, TREND_WINDOW,
};
