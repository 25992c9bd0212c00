use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::identifier::CellIdentifier;
use crate::prelude::{CoreError, CoreResult};

/// Radio access technology reported alongside a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessTechnology {
    #[serde(rename = "GSM")]
    Gsm,
    #[serde(rename = "UMTS")]
    Umts,
    #[serde(rename = "HSPA+")]
    HspaPlus,
    #[serde(rename = "LTE")]
    Lte,
    #[serde(rename = "LTE+")]
    LtePlus,
    #[serde(other)]
    Other,
}

impl fmt::Display for AccessTechnology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AccessTechnology::Gsm => "GSM",
            AccessTechnology::Umts => "UMTS",
            AccessTechnology::HspaPlus => "HSPA+",
            AccessTechnology::Lte => "LTE",
            AccessTechnology::LtePlus => "LTE+",
            AccessTechnology::Other => "other",
        };
        f.write_str(label)
    }
}

/// One geotagged measurement from a walk trace.
///
/// Samples are immutable once read and their position in the trace is their
/// time order. `direction` is in radians, 0 = north, clockwise-positive;
/// dead reckoning applies it through a formula that moves heading 0 east
/// (see `PositionCorrector::project_next`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub identifier: CellIdentifier,
    pub latitude: f64,
    pub longitude: f64,
    /// Received signal power in dBm.
    pub signal: f64,
    /// Milliseconds since the Unix epoch.
    pub measured_at: i64,
    /// GPS accuracy in meters.
    pub rating: f64,
    /// Meters per second.
    pub speed: f64,
    pub direction: f64,
    pub access_type: AccessTechnology,
    pub timing_advance: Option<u32>,
    pub tac: Option<u32>,
    pub pci: Option<u16>,
}

impl Sample {
    pub fn position(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }

    /// Rejects values the core cannot reason about. Nothing is clamped.
    pub fn validate(&self) -> CoreResult<()> {
        validate_coordinates(self.latitude, self.longitude).map_err(|reason| {
            CoreError::MalformedInput(format!("sample {}: {}", self.identifier, reason))
        })?;

        for (name, value) in [
            ("signal", self.signal),
            ("rating", self.rating),
            ("speed", self.speed),
            ("direction", self.direction),
        ] {
            if !value.is_finite() {
                return Err(CoreError::MalformedInput(format!(
                    "sample {}: {} is not finite",
                    self.identifier, name
                )));
            }
        }

        if self.speed < 0.0 {
            return Err(CoreError::MalformedInput(format!(
                "sample {}: negative speed {}",
                self.identifier, self.speed
            )));
        }

        Ok(())
    }
}

pub(crate) fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), String> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(format!("latitude {} out of range", latitude));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(format!("longitude {} out of range", longitude));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn sample_at(identifier: CellIdentifier, latitude: f64, longitude: f64) -> Sample {
    Sample {
        identifier,
        latitude,
        longitude,
        signal: -85.0,
        measured_at: 1_600_000_000_000,
        rating: 5.0,
        speed: 0.0,
        direction: 0.0,
        access_type: AccessTechnology::Lte,
        timing_advance: None,
        tac: None,
        pci: None,
    }
}
