use serde::{Deserialize, Serialize};

use crate::math::stats::StatsHelper;
use crate::model::identifier::CellIdentifier;
use crate::model::sample::{validate_coordinates, Sample};
use crate::prelude::{CoreError, CoreResult};

/// Radio generation listed for a tower in the reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RadioType {
    Gsm,
    Umts,
    Cdma,
    Lte,
    Nr,
}

/// One row of the reference tower table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceCell {
    pub radio: RadioType,
    pub identifier: CellIdentifier,
    pub longitude: f64,
    pub latitude: f64,
    /// Declared coverage range in meters.
    pub range: f64,
    /// Number of measurements the reference table was built from.
    pub samples: u64,
}

impl ReferenceCell {
    pub fn validate(&self) -> CoreResult<()> {
        validate_coordinates(self.latitude, self.longitude).map_err(|reason| {
            CoreError::MalformedInput(format!("reference cell {}: {}", self.identifier, reason))
        })?;
        if !self.range.is_finite() || self.range < 0.0 {
            return Err(CoreError::MalformedInput(format!(
                "reference cell {}: range {} is invalid",
                self.identifier, self.range
            )));
        }
        Ok(())
    }
}

/// Location and declared properties of a resolved tower.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TowerSite {
    pub identifier: CellIdentifier,
    pub technology: RadioType,
    pub longitude: f64,
    pub latitude: f64,
    pub range: f64,
    pub declared_samples: u64,
}

impl From<&ReferenceCell> for TowerSite {
    fn from(row: &ReferenceCell) -> Self {
        Self {
            identifier: row.identifier,
            technology: row.radio,
            longitude: row.longitude,
            latitude: row.latitude,
            range: row.range,
            declared_samples: row.samples,
        }
    }
}

/// A tower together with the samples it served.
///
/// The three per-sample sequences are fixed once the tower is assembled and
/// always share index correspondence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tower {
    site: TowerSite,
    samples: Box<[Sample]>,
    distances: Box<[f64]>,
    powers: Box<[f64]>,
}

impl Tower {
    pub(crate) fn assemble(
        site: TowerSite,
        samples: Vec<Sample>,
        distances: Vec<f64>,
        powers: Vec<f64>,
    ) -> CoreResult<Self> {
        if samples.len() != distances.len() || samples.len() != powers.len() {
            return Err(CoreError::Internal(format!(
                "tower {} sequences disagree: {} samples, {} distances, {} powers",
                site.identifier,
                samples.len(),
                distances.len(),
                powers.len()
            )));
        }
        if let Some(stray) = samples.iter().find(|s| s.identifier != site.identifier) {
            return Err(CoreError::Internal(format!(
                "sample for {} bound to tower {}",
                stray.identifier, site.identifier
            )));
        }

        Ok(Self {
            site,
            samples: samples.into_boxed_slice(),
            distances: distances.into_boxed_slice(),
            powers: powers.into_boxed_slice(),
        })
    }

    pub fn identifier(&self) -> CellIdentifier {
        self.site.identifier
    }

    pub fn site(&self) -> &TowerSite {
        &self.site
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Tower-to-sample distances in meters.
    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    /// Signal power readings in dBm.
    pub fn powers(&self) -> &[f64] {
        &self.powers
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// (distance, power) pairs in trace order.
    pub fn power_vs_distance(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.distances.iter().copied().zip(self.powers.iter().copied())
    }

    pub fn mean_power(&self) -> Option<f64> {
        StatsHelper::mean(&self.powers)
    }
}
