pub mod bessel;
pub mod geodesy;
pub mod stats;
pub mod utm;

pub use bessel::bessel_k0;
pub use geodesy::{geodesic_distance, haversine_distance};
pub use stats::StatsHelper;
pub use utm::UtmProjection;
