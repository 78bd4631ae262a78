//! Business logic services
//!
//! Services validate input, coordinate the stores with the calculation core
//! and keep the read caches coherent with writes.

pub mod locks;
pub mod plan;
pub mod profile;
pub mod weight;

pub use plan::PlanService;
pub use profile::ProfileService;
pub use weight::WeightService;
