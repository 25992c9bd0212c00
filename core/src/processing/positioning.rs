use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use std::sync::Arc;

use crate::math::utm::UtmProjection;
use crate::model::Sample;
use crate::prelude::{CoreError, CoreResult, Projection};
use crate::telemetry::{LogManager, MetricsRecorder};

pub const DEFAULT_CORRECTION_FACTOR: f64 = 1.01;

/// Which coordinates of a fix were replaced by the dead-reckoning estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Correction {
    None,
    Latitude,
    Longitude,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrectedPosition {
    pub latitude: f64,
    pub longitude: f64,
    pub correction: Correction,
}

/// Dead-reckoning check over consecutive fixes of a track.
pub struct PositionCorrector<P = UtmProjection> {
    projection: P,
    factor: f64,
    metrics: Option<Arc<MetricsRecorder>>,
    logger: LogManager,
}

impl PositionCorrector<UtmProjection> {
    pub fn new(factor: f64) -> CoreResult<Self> {
        Self::with_projection(UtmProjection::wgs84(), factor)
    }
}

impl<P: Projection> PositionCorrector<P> {
    pub fn with_projection(projection: P, factor: f64) -> CoreResult<Self> {
        if !factor.is_finite() || factor <= 1.0 {
            return Err(CoreError::InvalidParameter(format!(
                "correction factor must exceed 1, got {}",
                factor
            )));
        }
        Ok(Self {
            projection,
            factor,
            metrics: None,
            logger: LogManager::new("positioning"),
        })
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRecorder>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Position one time step ahead at the sample's speed and heading.
    ///
    /// The displacement is `east = v·sin(h + π/2)`, `north = −v·cos(h + π/2)`,
    /// so a heading of 0 moves the fix due east.
    pub fn project_next(&self, sample: &Sample) -> CoreResult<(f64, f64)> {
        let planar = self.projection.forward(sample.latitude, sample.longitude)?;
        let angle = sample.direction + FRAC_PI_2;
        let east = sample.speed * angle.sin();
        let north = -sample.speed * angle.cos();
        self.projection.inverse(&planar.displaced(east, north))
    }

    /// One output per sample except the last.
    ///
    /// The projection made from fix `i` replaces fix `i` itself when the
    /// observed step from `i` to `i + 1` outruns it by more than the factor.
    pub fn correct(&self, samples: &[Sample]) -> CoreResult<Vec<CorrectedPosition>> {
        if samples.len() < 2 {
            return Ok(Vec::new());
        }

        let mut corrected = Vec::with_capacity(samples.len() - 1);
        for pair in samples.windows(2) {
            let (current, next) = (&pair[0], &pair[1]);
            current.validate()?;
            next.validate()?;

            let (projected_lat, projected_lon) = self.project_next(current)?;
            let projected_dlat = (current.latitude - projected_lat).abs();
            let projected_dlon = (current.longitude - projected_lon).abs();
            let observed_dlat = (current.latitude - next.latitude).abs();
            let observed_dlon = (current.longitude - next.longitude).abs();

            // A stationary fix projects onto itself and is never corrected.
            let moving = current.speed > 0.0;
            let lat_jump = moving && observed_dlat > projected_dlat * self.factor;
            let lon_jump = moving && observed_dlon > projected_dlon * self.factor;

            let position = match (lat_jump, lon_jump) {
                (true, true) => CorrectedPosition {
                    latitude: projected_lat,
                    longitude: projected_lon,
                    correction: Correction::Both,
                },
                (true, false) => CorrectedPosition {
                    latitude: projected_lat,
                    longitude: current.longitude,
                    correction: Correction::Latitude,
                },
                (false, true) => CorrectedPosition {
                    latitude: current.latitude,
                    longitude: projected_lon,
                    correction: Correction::Longitude,
                },
                (false, false) => CorrectedPosition {
                    latitude: current.latitude,
                    longitude: current.longitude,
                    correction: Correction::None,
                },
            };
            if let Some(metrics) = &self.metrics {
                metrics.record_correction(lat_jump, lon_jump);
            }
            corrected.push(position);
        }

        let touched = corrected
            .iter()
            .filter(|p| p.correction != Correction::None)
            .count();
        self.logger.record(&format!(
            "corrected {} of {} fixes (factor {:.3})",
            touched,
            corrected.len(),
            self.factor
        ));
        Ok(corrected)
    }
}
