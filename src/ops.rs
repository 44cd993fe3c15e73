//! Free-function entry points over the geometry and transform types

use crate::error::Result;
use crate::geometry::{Path, SphericalPoint};
use crate::transform::{self, Coord, CorrespondencePair, EulerPoleSolution, TransformOutput};

/// Great-circle distance in km
pub fn distance(p1: &SphericalPoint, p2: &SphericalPoint) -> f64 {
    p1.distance_to(p2)
}

/// Initial bearing from `p1` to `p2` in degrees [0, 360)
pub fn bearing(p1: &SphericalPoint, p2: &SphericalPoint) -> Result<f64> {
    p1.bearing_to(p2)
}

/// Fails for antipodal points
pub fn midpoint(p1: &SphericalPoint, p2: &SphericalPoint) -> Result<SphericalPoint> {
    p1.midpoint_to(p2)
}

pub fn destination(p: &SphericalPoint, bearing: f64, distance: f64) -> SphericalPoint {
    p.destination_point(bearing, distance)
}

pub fn intersect(path1: &Path, path2: &Path) -> Option<SphericalPoint> {
    SphericalPoint::intersection(path1, path2)
}

/// Signed km from `p` to `path`, positive to the right
pub fn cross_track(p: &SphericalPoint, path: &Path) -> f64 {
    p.cross_track_distance_to(path)
}

pub fn enclosed(p: &SphericalPoint, polygon: &[SphericalPoint]) -> Result<bool> {
    p.enclosed_by(polygon)
}

pub fn centroid(points: &[SphericalPoint]) -> Option<SphericalPoint> {
    SphericalPoint::mean_of(points)
}

pub fn solve_euler_pole(
    pair1: &CorrespondencePair,
    pair2: &CorrespondencePair,
) -> Result<EulerPoleSolution> {
    transform::solve_euler_pole(pair1, pair2)
}

pub fn apply_rotation(
    coords: &[Coord],
    pole: &SphericalPoint,
    azimuth: f64,
    steps: usize,
) -> Result<TransformOutput> {
    transform::apply_rotation(coords, pole, azimuth, steps)
}

pub fn apply_translation(
    coords: &[Coord],
    bearing: f64,
    distance: f64,
    steps: usize,
) -> Result<TransformOutput> {
    transform::apply_translation(coords, bearing, distance, steps)
}

/// Douglas-Peucker with a kink threshold in meters
pub fn simplify(coords: &[Coord], kink_m: f64) -> Result<Vec<Coord>> {
    transform::simplify::simplify(coords, kink_m)
}
