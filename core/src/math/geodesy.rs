use geo::{Distance, Geodesic, Haversine, Point};

/// WGS-84 ellipsoidal distance in meters between two (lat, lon) fixes.
pub fn geodesic_distance(from: (f64, f64), to: (f64, f64)) -> f64 {
    if from == to {
        return 0.0;
    }
    Geodesic::distance(to_point(from), to_point(to))
}

/// Spherical great-circle distance in meters.
pub fn haversine_distance(from: (f64, f64), to: (f64, f64)) -> f64 {
    if from == to {
        return 0.0;
    }
    Haversine::distance(to_point(from), to_point(to))
}

fn to_point((latitude, longitude): (f64, f64)) -> Point<f64> {
    Point::new(longitude, latitude)
}
