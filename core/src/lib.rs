//! Core correlation and modeling for cellular walk traces.
//!
//! Measurement samples are matched against a reference table of known towers,
//! tower-to-sample geometry and random-walk propagation curves are derived
//! from the matches, and noisy position fixes are repaired with a
//! dead-reckoning check. Parsing and rendering live outside this crate.

pub mod math;
pub mod model;
pub mod prelude;
pub mod processing;
pub mod telemetry;

pub use prelude::{CoreError, CoreResult, Projection};
