//! Universal Transverse Mercator on the WGS-84 ellipsoid.
//!
//! Uses the sixth-order Krüger series (Karney 2011), which keeps the
//! forward/inverse round trip well below a millimetre inside a zone.

use crate::prelude::{CoreError, CoreResult, PlanarPoint, Projection};

const SEMI_MAJOR_AXIS: f64 = 6_378_137.0;
const FLATTENING: f64 = 1.0 / 298.257_223_563;
const SCALE_FACTOR: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// UTM projection with the standard zone rules, including the Norway and
/// Svalbard exceptions.
#[derive(Debug, Clone)]
pub struct UtmProjection {
    eccentricity: f64,
    rectifying_radius: f64,
    alpha: [f64; 6],
    beta: [f64; 6],
}

impl UtmProjection {
    pub fn wgs84() -> Self {
        let f = FLATTENING;
        let n = f / (2.0 - f);
        let n2 = n * n;
        let n3 = n2 * n;
        let n4 = n3 * n;
        let n5 = n4 * n;
        let n6 = n5 * n;

        let rectifying_radius =
            SEMI_MAJOR_AXIS / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0 + n6 / 256.0);

        let alpha = [
            n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0 + 41.0 * n4 / 180.0 - 127.0 * n5 / 288.0
                + 7891.0 * n6 / 37800.0,
            13.0 * n2 / 48.0 - 3.0 * n3 / 5.0 + 557.0 * n4 / 1440.0 + 281.0 * n5 / 630.0
                - 1_983_433.0 * n6 / 1_935_360.0,
            61.0 * n3 / 240.0 - 103.0 * n4 / 140.0 + 15061.0 * n5 / 26880.0
                + 167_603.0 * n6 / 181_440.0,
            49561.0 * n4 / 161_280.0 - 179.0 * n5 / 168.0 + 6_601_661.0 * n6 / 7_257_600.0,
            34729.0 * n5 / 80640.0 - 3_418_889.0 * n6 / 1_995_840.0,
            212_378_941.0 * n6 / 319_334_400.0,
        ];

        let beta = [
            n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0 - n4 / 360.0 - 81.0 * n5 / 512.0
                + 96199.0 * n6 / 604_800.0,
            n2 / 48.0 + n3 / 15.0 - 437.0 * n4 / 1440.0 + 46.0 * n5 / 105.0
                - 1_118_711.0 * n6 / 3_870_720.0,
            17.0 * n3 / 480.0 - 37.0 * n4 / 840.0 - 209.0 * n5 / 4480.0 + 5569.0 * n6 / 90720.0,
            4397.0 * n4 / 161_280.0 - 11.0 * n5 / 504.0 - 830_251.0 * n6 / 7_257_600.0,
            4583.0 * n5 / 161_280.0 - 108_847.0 * n6 / 3_991_680.0,
            20_648_693.0 * n6 / 638_668_800.0,
        ];

        Self {
            eccentricity: (f * (2.0 - f)).sqrt(),
            rectifying_radius,
            alpha,
            beta,
        }
    }

    /// Zone number for a position, honouring the Norway/Svalbard exceptions.
    pub fn zone_for(latitude: f64, longitude: f64) -> u8 {
        let mut zone = (((longitude + 180.0) / 6.0).floor() as i32 + 1).clamp(1, 60);

        if (56.0..64.0).contains(&latitude) && (3.0..12.0).contains(&longitude) {
            zone = 32;
        }
        if (72.0..=84.0).contains(&latitude) && longitude >= 0.0 {
            zone = match longitude {
                lon if lon < 9.0 => 31,
                lon if lon < 21.0 => 33,
                lon if lon < 33.0 => 35,
                lon if lon < 42.0 => 37,
                _ => zone,
            };
        }

        zone as u8
    }

    fn central_meridian(zone: u8) -> f64 {
        ((zone as f64 - 1.0) * 6.0 - 180.0 + 3.0).to_radians()
    }

    /// Conformal latitude tangent from geodetic latitude tangent.
    fn conformal_tangent(&self, tau: f64) -> f64 {
        let e = self.eccentricity;
        let sigma = (e * (e * tau / (1.0 + tau * tau).sqrt()).atanh()).sinh();
        tau * (1.0 + sigma * sigma).sqrt() - sigma * (1.0 + tau * tau).sqrt()
    }
}

impl Default for UtmProjection {
    fn default() -> Self {
        Self::wgs84()
    }
}

impl Projection for UtmProjection {
    fn forward(&self, latitude: f64, longitude: f64) -> CoreResult<PlanarPoint> {
        if !latitude.is_finite() || !(-80.0..=84.0).contains(&latitude) {
            return Err(CoreError::Projection(format!(
                "latitude {} outside UTM coverage",
                latitude
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoreError::Projection(format!(
                "longitude {} outside [-180, 180]",
                longitude
            )));
        }

        let zone = Self::zone_for(latitude, longitude);
        let phi = latitude.to_radians();
        let lambda = longitude.to_radians() - Self::central_meridian(zone);

        let tau_prime = self.conformal_tangent(phi.tan());
        let (sin_l, cos_l) = lambda.sin_cos();
        let xi_prime = tau_prime.atan2(cos_l);
        let eta_prime = (sin_l / (tau_prime * tau_prime + cos_l * cos_l).sqrt()).asinh();

        let mut xi = xi_prime;
        let mut eta = eta_prime;
        for (j, a) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi += a * (k * xi_prime).sin() * (k * eta_prime).cosh();
            eta += a * (k * xi_prime).cos() * (k * eta_prime).sinh();
        }

        let northern = latitude >= 0.0;
        let easting = SCALE_FACTOR * self.rectifying_radius * eta + FALSE_EASTING;
        let mut northing = SCALE_FACTOR * self.rectifying_radius * xi;
        if !northern {
            northing += FALSE_NORTHING_SOUTH;
        }

        Ok(PlanarPoint {
            easting,
            northing,
            zone,
            northern,
        })
    }

    fn inverse(&self, point: &PlanarPoint) -> CoreResult<(f64, f64)> {
        if !(1..=60).contains(&point.zone) {
            return Err(CoreError::Projection(format!("zone {} is not a UTM zone", point.zone)));
        }
        if !point.easting.is_finite() || !point.northing.is_finite() {
            return Err(CoreError::Projection("non-finite grid coordinate".into()));
        }

        let northing = if point.northern {
            point.northing
        } else {
            point.northing - FALSE_NORTHING_SOUTH
        };
        let scale = SCALE_FACTOR * self.rectifying_radius;
        let eta = (point.easting - FALSE_EASTING) / scale;
        let xi = northing / scale;

        let mut xi_prime = xi;
        let mut eta_prime = eta;
        for (j, b) in self.beta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi_prime -= b * (k * xi).sin() * (k * eta).cosh();
            eta_prime -= b * (k * xi).cos() * (k * eta).sinh();
        }

        let sinh_eta = eta_prime.sinh();
        let (sin_xi, cos_xi) = xi_prime.sin_cos();
        let tau_prime = sin_xi / (sinh_eta * sinh_eta + cos_xi * cos_xi).sqrt();

        // Newton iteration for the geodetic tangent.
        let e2 = self.eccentricity * self.eccentricity;
        let mut tau = tau_prime;
        for _ in 0..16 {
            let tau_i = self.conformal_tangent(tau);
            let delta = (tau_prime - tau_i) / (1.0 + tau_i * tau_i).sqrt()
                * (1.0 + (1.0 - e2) * tau * tau)
                / ((1.0 - e2) * (1.0 + tau * tau).sqrt());
            tau += delta;
            if delta.abs() < 1e-12 {
                break;
            }
        }

        let latitude = tau.atan().to_degrees();
        let longitude =
            (sinh_eta.atan2(cos_xi) + Self::central_meridian(point.zone)).to_degrees();
        let longitude = if longitude > 180.0 {
            longitude - 360.0
        } else if longitude < -180.0 {
            longitude + 360.0
        } else {
            longitude
        };

        Ok((latitude, longitude))
    }
}
