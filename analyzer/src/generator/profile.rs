use anyhow::ensure;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use walkcore::math::geodesic_distance;
use walkcore::model::{AccessTechnology, CellIdentifier, RadioType, ReferenceCell, Sample};

const METERS_PER_DEGREE: f64 = 111_320.0;
const START_MS: i64 = 1_589_000_000_000;

/// Configuration for generating a synthetic walk past two towers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub samples: usize,
    pub seed: u64,
    pub origin_lat: f64,
    pub origin_lon: f64,
    /// Meters per step.
    pub speed: f64,
    /// Radians, displaced like `PositionCorrector::project_next`: 0 walks east.
    pub heading: f64,
    pub gps_noise_m: f64,
    pub signal_noise_db: f64,
    /// Every tenth fix reports a cell absent from the reference table.
    pub include_unlisted_cell: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            samples: 120,
            seed: 0,
            origin_lat: 45.4140,
            origin_lon: -75.7000,
            speed: 1.4,
            heading: 0.0,
            gps_noise_m: 3.0,
            signal_noise_db: 2.0,
            include_unlisted_cell: true,
        }
    }
}

pub struct SyntheticTrace {
    pub samples: Vec<Sample>,
    pub reference: Vec<ReferenceCell>,
}

pub fn near_cell() -> CellIdentifier {
    CellIdentifier::new(302, 720, 1001, 55)
}

pub fn far_cell() -> CellIdentifier {
    CellIdentifier::new(302, 720, 1001, 56)
}

pub fn unlisted_cell() -> CellIdentifier {
    CellIdentifier::new(302, 720, 1001, 99)
}

fn offset(lat: f64, lon: f64, east: f64, north: f64) -> (f64, f64) {
    let dlat = north / METERS_PER_DEGREE;
    let dlon = east / (METERS_PER_DEGREE * lat.to_radians().cos());
    (lat + dlat, lon + dlon)
}

fn reference_table(config: &GeneratorConfig) -> Vec<ReferenceCell> {
    let row = |identifier, (latitude, longitude): (f64, f64), range, samples| ReferenceCell {
        radio: RadioType::Lte,
        identifier,
        longitude,
        latitude,
        range,
        samples,
    };
    let near = offset(config.origin_lat, config.origin_lon, 30.0, 40.0);
    let far = offset(config.origin_lat, config.origin_lon, 120.0, 300.0);
    let stale = offset(config.origin_lat, config.origin_lon, -500.0, -500.0);

    vec![
        row(near_cell(), near, 1200.0, 35),
        row(far_cell(), far, 900.0, 18),
        // A later duplicate the default policy ignores.
        row(near_cell(), stale, 2000.0, 2),
    ]
}

fn build_samples(config: &GeneratorConfig, reference: &[ReferenceCell]) -> Vec<Sample> {
    let count = config.samples.max(1);
    let mut rng = StdRng::seed_from_u64(config.seed);
    let towers = [&reference[0], &reference[1]];
    let angle = config.heading + FRAC_PI_2;

    let mut samples = Vec::with_capacity(count);
    for step in 0..count {
        let travelled = config.speed * step as f64;
        let east = travelled * angle.sin();
        let north = -travelled * angle.cos();
        let mut noise = || {
            if config.gps_noise_m > 0.0 {
                rng.gen_range(-config.gps_noise_m..config.gps_noise_m)
            } else {
                0.0
            }
        };
        let (jitter_e, jitter_n) = (noise(), noise());
        let (latitude, longitude) = offset(
            config.origin_lat,
            config.origin_lon,
            east + jitter_e,
            north + jitter_n,
        );

        let (serving, distance) = towers
            .iter()
            .map(|tower| {
                let d = geodesic_distance((tower.latitude, tower.longitude), (latitude, longitude));
                (tower.identifier, d)
            })
            .fold((near_cell(), f64::INFINITY), |best, candidate| {
                if candidate.1 < best.1 {
                    candidate
                } else {
                    best
                }
            });
        let identifier = if config.include_unlisted_cell && step % 10 == 9 {
            unlisted_cell()
        } else {
            serving
        };

        let fading = if config.signal_noise_db > 0.0 {
            rng.gen_range(-config.signal_noise_db..config.signal_noise_db)
        } else {
            0.0
        };
        let signal = (-45.0 - 25.0 * distance.max(1.0).log10() + fading).round();

        samples.push(Sample {
            identifier,
            latitude,
            longitude,
            signal,
            measured_at: START_MS + step as i64 * 1000,
            rating: config.gps_noise_m.max(1.0),
            speed: config.speed,
            direction: config.heading,
            access_type: AccessTechnology::Lte,
            timing_advance: None,
            tac: Some(1001),
            pci: Some((identifier.cellid % 504) as u16),
        });
    }
    samples
}

pub fn build_trace_from_config(config: &GeneratorConfig) -> anyhow::Result<SyntheticTrace> {
    ensure!(
        config.speed.is_finite() && config.speed >= 0.0,
        "generator speed must be non-negative, got {}",
        config.speed
    );
    ensure!(
        config.gps_noise_m.is_finite() && config.signal_noise_db.is_finite(),
        "generator noise levels must be finite"
    );

    let reference = reference_table(config);
    let samples = build_samples(config, &reference);
    Ok(SyntheticTrace { samples, reference })
}

pub fn build_trace(samples: usize, seed: u64) -> anyhow::Result<SyntheticTrace> {
    let config = GeneratorConfig {
        samples,
        seed,
        ..Default::default()
    };
    build_trace_from_config(&config)
}
