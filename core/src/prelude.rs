use serde::{Deserialize, Serialize};

use crate::model::CellIdentifier;

/// Common error type for the correlation and modeling stages.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error("no reference row for cell {0}")]
    UnresolvedCell(CellIdentifier),
    #[error("duplicate reference rows for cell {0}")]
    DuplicateReference(CellIdentifier),
    #[error("projection failure: {0}")]
    Projection(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// A position on a local planar grid, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanarPoint {
    pub easting: f64,
    pub northing: f64,
    pub zone: u8,
    pub northern: bool,
}

impl PlanarPoint {
    /// Moves the point within its own zone so the inverse stays exact.
    pub fn displaced(&self, east: f64, north: f64) -> Self {
        Self {
            easting: self.easting + east,
            northing: self.northing + north,
            ..*self
        }
    }
}

/// Round-trippable mapping between geographic and planar coordinates.
pub trait Projection {
    fn forward(&self, latitude: f64, longitude: f64) -> CoreResult<PlanarPoint>;
    fn inverse(&self, point: &PlanarPoint) -> CoreResult<(f64, f64)>;
}
