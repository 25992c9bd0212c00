//! Random-walk model of wave propagation, free-path-distance solution.
//!
//! Received power is modeled as
//! `10·log10(g(r) / (α·δ)) + 30` where `g` depends on the obstacle density
//! `δ`, the absorption coefficient `α` and whether waves spread in a plane
//! or in space.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::math::bessel::bessel_k0;
use crate::prelude::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    #[serde(rename = "2d")]
    Planar,
    #[serde(rename = "3d")]
    Spatial,
}

impl Dimension {
    fn spreading(self) -> f64 {
        match self {
            Dimension::Planar => 2.0 * PI,
            Dimension::Spatial => 4.0 * PI,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    pub obstacle_density: f64,
    pub absorption: f64,
    pub dimension: Dimension,
}

impl ModelParameters {
    pub fn new(obstacle_density: f64, absorption: f64, dimension: Dimension) -> Self {
        Self {
            obstacle_density,
            absorption,
            dimension,
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        if !self.obstacle_density.is_finite() || self.obstacle_density <= 0.0 {
            return Err(CoreError::InvalidParameter(format!(
                "obstacle density must be positive, got {}",
                self.obstacle_density
            )));
        }
        if !(self.absorption > 0.0 && self.absorption < 1.0) {
            return Err(CoreError::InvalidParameter(format!(
                "absorption must lie in (0, 1), got {}",
                self.absorption
            )));
        }
        Ok(())
    }

    /// The four density/absorption pairs overlaid on power-vs-distance plots,
    /// each in both regimes.
    pub fn standard_overlays() -> Vec<Self> {
        let pairs = [(0.2, 0.5), (0.5, 0.5), (0.5, 0.2), (0.2, 0.2)];
        [Dimension::Planar, Dimension::Spatial]
            .into_iter()
            .flat_map(|dimension| {
                pairs
                    .iter()
                    .map(move |&(density, absorption)| Self::new(density, absorption, dimension))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub distance: f64,
    /// Modeled power in dBm; `-inf` where the model is undefined (r = 0).
    pub power: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagationCurve {
    pub parameters: ModelParameters,
    pub points: Vec<CurvePoint>,
}

impl PropagationCurve {
    /// Points that can be drawn or compared against observations.
    pub fn finite_points(&self) -> impl Iterator<Item = &CurvePoint> + '_ {
        self.points.iter().filter(|point| point.power.is_finite())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Evaluator for one (δ, α, dimension) configuration.
#[derive(Debug, Clone)]
pub struct RandomWalkModel {
    parameters: ModelParameters,
    k1: f64,
    k2: f64,
    external: f64,
    internal: f64,
}

impl RandomWalkModel {
    pub fn new(parameters: ModelParameters) -> CoreResult<Self> {
        parameters.validate()?;
        let delta = parameters.obstacle_density;
        let alpha = parameters.absorption;
        let survival = 1.0 - (1.0 - alpha).powi(2);

        Ok(Self {
            parameters,
            k1: delta * survival.sqrt(),
            k2: -delta * survival,
            external: delta * alpha / parameters.dimension.spreading(),
            internal: (1.0 - alpha) * delta,
        })
    }

    pub fn parameters(&self) -> &ModelParameters {
        &self.parameters
    }

    /// g(r) for r > 0.
    fn gain(&self, r: f64) -> f64 {
        let scattered = match self.parameters.dimension {
            Dimension::Planar => self.internal * r * bessel_k0(self.k1 * r),
            Dimension::Spatial => self.internal * r * (-self.k1 * r).exp(),
        };
        let direct = (self.k2 * r).exp();
        self.external * r * (scattered + direct)
    }

    /// Modeled power in dBm at distance `r` meters.
    pub fn power(&self, r: f64) -> CoreResult<f64> {
        if !r.is_finite() || r < 0.0 {
            return Err(CoreError::InvalidParameter(format!(
                "distance must be finite and non-negative, got {}",
                r
            )));
        }
        if r == 0.0 {
            return Ok(f64::NEG_INFINITY);
        }

        let scale = self.parameters.absorption * self.parameters.obstacle_density;
        let normalized = self.gain(r) / scale;
        if normalized <= 0.0 {
            // Underflow far from the source.
            return Ok(f64::NEG_INFINITY);
        }
        Ok(10.0 * normalized.log10() + 30.0)
    }

    pub fn evaluate(&self, distances: &[f64]) -> CoreResult<PropagationCurve> {
        let points = distances
            .iter()
            .map(|&distance| {
                self.power(distance)
                    .map(|power| CurvePoint { distance, power })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(PropagationCurve {
            parameters: self.parameters,
            points,
        })
    }

    /// Powers for a distance grid, index-aligned with the grid.
    pub fn evaluate_grid(&self, grid: &Array1<f64>) -> CoreResult<Array1<f64>> {
        if let Some(bad) = grid.iter().find(|r| !r.is_finite() || **r < 0.0) {
            return Err(CoreError::InvalidParameter(format!(
                "distance must be finite and non-negative, got {}",
                bad
            )));
        }
        Ok(grid.mapv(|r| self.power(r).unwrap_or(f64::NEG_INFINITY)))
    }
}

/// Evenly spaced distances from `start` to `end` inclusive.
pub fn distance_grid(start: f64, end: f64, count: usize) -> CoreResult<Array1<f64>> {
    if !start.is_finite() || !end.is_finite() || start < 0.0 || end < start {
        return Err(CoreError::InvalidParameter(format!(
            "distance grid [{}, {}] is not a non-negative range",
            start, end
        )));
    }
    if count == 0 {
        return Err(CoreError::InvalidParameter("distance grid needs at least one point".into()));
    }
    Ok(Array1::linspace(start, end, count))
}

/// Evaluates every configuration over the same grid.
pub fn evaluate_overlays(
    parameters: &[ModelParameters],
    grid: &Array1<f64>,
) -> CoreResult<Vec<PropagationCurve>> {
    let distances = grid.to_vec();
    parameters
        .iter()
        .map(|&p| RandomWalkModel::new(p)?.evaluate(&distances))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(density: f64, absorption: f64, dimension: Dimension) -> RandomWalkModel {
        RandomWalkModel::new(ModelParameters::new(density, absorption, dimension)).unwrap()
    }

    #[test]
    fn planar_power_at_one_meter_matches_closed_form() {
        let power = model(0.2, 0.5, Dimension::Planar).power(1.0).unwrap();
        assert!((power - 22.229_207_730_591_69).abs() < 1e-6, "got {}", power);
    }

    #[test]
    fn spatial_power_at_one_meter_matches_closed_form() {
        let power = model(0.2, 0.5, Dimension::Spatial).power(1.0).unwrap();
        assert!((power - 18.761_320_842_882_69).abs() < 1e-9, "got {}", power);
    }

    #[test]
    fn zero_distance_yields_sentinel_not_panic() {
        let curve = model(0.2, 0.5, Dimension::Planar)
            .evaluate(&[0.0, 1.0, 2.0])
            .unwrap();
        assert_eq!(curve.points[0].power, f64::NEG_INFINITY);
        assert_eq!(curve.finite_points().count(), 2);
    }

    #[test]
    fn far_field_underflow_yields_sentinel() {
        let spatial = model(0.5, 0.5, Dimension::Spatial);
        assert_eq!(spatial.power(1e5).unwrap(), f64::NEG_INFINITY);

        let curve = spatial.evaluate(&[10.0, 1e5]).unwrap();
        let drawable: Vec<f64> = curve.finite_points().map(|p| p.distance).collect();
        assert_eq!(drawable, vec![10.0]);
    }

    #[test]
    fn parameters_outside_their_domain_are_rejected() {
        let invalid = [(0.0, 0.5), (-0.2, 0.5), (0.2, 0.0), (0.2, 1.0), (0.2, f64::NAN)];
        for (density, absorption) in invalid {
            let parameters = ModelParameters::new(density, absorption, Dimension::Planar);
            let result = RandomWalkModel::new(parameters);
            assert!(matches!(result, Err(CoreError::InvalidParameter(_))));
        }
        let negative = model(0.2, 0.5, Dimension::Spatial).power(-1.0);
        assert!(matches!(negative, Err(CoreError::InvalidParameter(_))));
    }

    #[test]
    fn curves_decay_beyond_the_near_field() {
        let grid = distance_grid(20.0, 350.0, 331).unwrap();
        for parameters in ModelParameters::standard_overlays() {
            let model = RandomWalkModel::new(parameters).unwrap();
            let powers = model.evaluate_grid(&grid).unwrap().to_vec();
            for pair in powers.windows(2) {
                assert!(pair[1] < pair[0], "{:?} not decreasing", parameters);
            }
        }
    }

    #[test]
    fn planar_and_spatial_regimes_differ() {
        let planar = model(0.2, 0.5, Dimension::Planar);
        let spatial = model(0.2, 0.5, Dimension::Spatial);
        for r in [1.0, 10.0, 100.0] {
            assert!((planar.power(r).unwrap() - spatial.power(r).unwrap()).abs() > 1e-3);
        }
    }

    #[test]
    fn overlays_cover_the_default_grid() {
        let grid = distance_grid(1.0, 350.0, 250).unwrap();
        assert_eq!(grid[0], 1.0);
        assert!((grid[249] - 350.0).abs() < 1e-9);

        let curves = evaluate_overlays(&ModelParameters::standard_overlays(), &grid).unwrap();
        assert_eq!(curves.len(), 8);
        assert!(curves.iter().all(|curve| curve.len() == 250));
        assert!(curves.iter().all(|curve| curve.finite_points().count() == 250));
    }

    #[test]
    fn grid_rejects_reversed_or_empty_ranges() {
        assert!(distance_grid(10.0, 1.0, 5).is_err());
        assert!(distance_grid(1.0, 10.0, 0).is_err());
        assert!(distance_grid(-1.0, 10.0, 5).is_err());
    }
}
