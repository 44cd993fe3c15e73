//! Douglas–Peucker simplification for lat/lon polylines
//!
//! Works in a local equirectangular approximation: longitude differences are
//! scaled by the cosine of the mean latitude of the two points compared, and
//! the kink threshold is converted from meters to degrees of arc on the
//! WGS84 equator. The "split at the most deviant point" step runs off an
//! explicit work-list, so input length never translates into call depth.

use crate::error::{GeoError, Result, ensure_finite};
use crate::geometry::SphericalPoint;

/// Coordinate as (lat, lon) in degrees
pub type Coord = (f64, f64);

/// Threshold used when none is configured, in meters
pub const DEFAULT_KINK_M: f64 = 1000.0;

const WGS84_SEMI_MAJOR_M: f64 = 6_378_137.0;

/// Removes vertices that deviate less than `kink` meters from the simplified line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodesicSimplifier {
    kink_m: f64,
    band_sqr: f64,
}

impl GeodesicSimplifier {
    /// Create a simplifier keeping kinks deeper than `kink_m` meters
    pub fn new(kink_m: f64) -> Result<Self> {
        let kink_m = ensure_finite(kink_m, "kink")?;
        if kink_m < 0.0 {
            return Err(GeoError::InvalidInput(format!(
                "kink must not be negative, got {}",
                kink_m
            )));
        }
        Ok(Self::from_validated(kink_m))
    }

    pub(crate) fn from_validated(kink_m: f64) -> Self {
        let band = kink_m * 360.0 / (2.0 * std::f64::consts::PI * WGS84_SEMI_MAJOR_M);
        Self {
            kink_m,
            band_sqr: band * band,
        }
    }

    pub fn kink_m(&self) -> f64 {
        self.kink_m
    }

    /// Simplify a polyline, returning the surviving coordinates
    pub fn simplify(&self, points: &[Coord]) -> Vec<Coord> {
        self.simplify_indices(points)
            .into_iter()
            .map(|i| points[i])
            .collect()
    }

    /// Indices of the vertices that survive simplification, ascending
    ///
    /// The first and last indices are always present.
    pub fn simplify_indices(&self, points: &[Coord]) -> Vec<usize> {
        let n = points.len();
        if n < 3 {
            return (0..n).collect();
        }

        let mut kept = Vec::new();
        let mut work = vec![(0usize, n - 1)];

        while let Some((start, end)) = work.pop() {
            if end - start <= 1 {
                kept.push(start);
                continue;
            }

            let (sig, max_dev_sqr) = most_deviant(points, start, end);

            if max_dev_sqr < self.band_sqr {
                kept.push(start);
            } else {
                // lower half goes on top so output stays in index order
                work.push((sig, end));
                work.push((start, sig));
            }
        }

        kept.push(n - 1);
        tracing::debug!(
            input = n,
            output = kept.len(),
            kink_m = self.kink_m,
            "simplified polyline"
        );
        kept
    }
}

/// Simplify `points` with a kink threshold in meters
///
/// Fails with [`GeoError::InvalidInput`] on a non-finite coordinate or a
/// latitude outside [-90, 90].
pub fn simplify(points: &[Coord], kink_m: f64) -> Result<Vec<Coord>> {
    let simplifier = GeodesicSimplifier::new(kink_m)?;
    for &(lat, lon) in points {
        SphericalPoint::new(lat, lon)?;
    }
    Ok(simplifier.simplify(points))
}

/// Planar offset from `from` to `to` in degrees, longitude scaled for latitude
fn scaled_delta(from: Coord, to: Coord) -> (f64, f64) {
    let mut dx = to.1 - from.1;
    if dx > 180.0 {
        dx -= 360.0;
    } else if dx < -180.0 {
        dx += 360.0;
    }
    let mean_lat = 0.5 * (from.0 + to.0);
    (dx * mean_lat.to_radians().cos(), to.0 - from.0)
}

/// Index and squared deviation of the intermediate point farthest from start-end
fn most_deviant(points: &[Coord], start: usize, end: usize) -> (usize, f64) {
    let (x12, y12) = scaled_delta(points[start], points[end]);
    let d12 = x12 * x12 + y12 * y12;

    let mut sig = start;
    let mut max_dev_sqr = -1.0;

    for i in start + 1..end {
        let (x13, y13) = scaled_delta(points[start], points[i]);
        let d13 = x13 * x13 + y13 * y13;
        let (x23, y23) = scaled_delta(points[end], points[i]);
        let d23 = x23 * x23 + y23 * y23;

        let dev_sqr = if d13 >= d12 + d23 {
            d23
        } else if d23 >= d12 + d13 {
            d13
        } else {
            let area = x13 * y12 - y13 * x12;
            area * area / d12
        };

        if dev_sqr > max_dev_sqr {
            sig = i;
            max_dev_sqr = dev_sqr;
        }
    }

    (sig, max_dev_sqr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_input_unchanged() {
        let simplifier = GeodesicSimplifier::new(DEFAULT_KINK_M).unwrap();
        assert!(simplifier.simplify(&[]).is_empty());

        let two = vec![(0.0, 0.0), (1.0, 1.0)];
        assert_eq!(simplifier.simplify(&two), two);
    }

    #[test]
    fn test_rejects_bad_kink() {
        assert!(GeodesicSimplifier::new(-1.0).is_err());
        assert!(GeodesicSimplifier::new(f64::NAN).is_err());
        assert!(simplify(&[(0.0, 0.0)], f64::INFINITY).is_err());
    }

    #[test]
    fn test_rejects_bad_coordinates() {
        let with_nan = [(f64::NAN, 0.0), (0.0, 0.5), (1.0, 1.0), (2.0, 2.0)];
        assert!(matches!(
            simplify(&with_nan, 10.0),
            Err(GeoError::InvalidInput(_))
        ));

        let past_pole = [(0.0, 0.0), (0.0, 0.5), (1.0, 1.0), (120.0, 2.0)];
        assert!(simplify(&past_pole, 10.0).is_err());
        assert!(simplify(&[(0.0, f64::INFINITY), (1.0, 1.0)], 10.0).is_err());
    }

    #[test]
    fn test_straight_line_collapses_to_endpoints() {
        let points: Vec<Coord> = (0..=20)
            .map(|i| {
                let jitter = if i % 2 == 0 { 0.0 } else { 0.00005 };
                (jitter, i as f64 * 0.01)
            })
            .collect();

        let result = simplify(&points, 100.0).unwrap();
        assert_eq!(result, vec![points[0], points[20]]);
    }

    #[test]
    fn test_zigzag_threshold() {
        let zigzag = vec![(0.0, 0.0), (0.1, 0.5), (0.0, 1.0), (0.1, 1.5), (0.0, 2.0)];

        // 0.1 degrees of latitude is about 11 km
        assert_eq!(simplify(&zigzag, 1000.0).unwrap(), zigzag);
        assert_eq!(
            simplify(&zigzag, 20_000.0).unwrap(),
            vec![(0.0, 0.0), (0.0, 2.0)]
        );
    }

    #[test]
    fn test_keeps_single_peak() {
        let points = vec![(0.0, 0.0), (0.0, 0.5), (0.5, 1.0), (0.0, 1.5), (0.0, 2.0)];
        let indices = GeodesicSimplifier::new(30_000.0)
            .unwrap()
            .simplify_indices(&points);
        assert_eq!(indices, vec![0, 2, 4]);
    }

    #[test]
    fn test_across_antimeridian() {
        let flat = vec![(0.0, 179.9), (0.0001, -179.95), (0.0, -179.8)];
        assert_eq!(
            simplify(&flat, 1000.0).unwrap(),
            vec![(0.0, 179.9), (0.0, -179.8)]
        );

        let bent = vec![(0.0, 179.9), (0.05, -179.95), (0.0, -179.8)];
        assert_eq!(simplify(&bent, 1000.0).unwrap(), bent);
    }

    #[test]
    fn test_latitude_scaling() {
        // a 0.01 degree eastward bump is ~1.1 km at the equator but ~0.56 km at 60N
        let equator = vec![(0.0, 0.0), (0.05, 0.01), (0.1, 0.0)];
        let north = vec![(60.0, 0.0), (60.05, 0.01), (60.1, 0.0)];

        assert_eq!(simplify(&equator, 800.0).unwrap().len(), 3);
        assert_eq!(simplify(&north, 800.0).unwrap().len(), 2);
    }

    #[test]
    fn test_idempotent() {
        let points: Vec<Coord> = (0..200)
            .map(|i| {
                let t = i as f64 * 0.1;
                (0.05 * t.sin() + 0.001 * (7.0 * t).cos(), t * 0.02)
            })
            .collect();

        let simplifier = GeodesicSimplifier::new(300.0).unwrap();
        let once = simplifier.simplify(&points);
        let twice = simplifier.simplify(&once);

        assert!(once.len() < points.len());
        assert_eq!(once, twice);
        assert_eq!(once.first(), points.first());
        assert_eq!(once.last(), points.last());
    }

    #[test]
    fn test_long_input_uses_work_list() {
        let points: Vec<Coord> = (0..200_000)
            .map(|i| (if i % 2 == 0 { 0.0 } else { 1e-6 }, i as f64 * 1e-4))
            .collect();

        let result = simplify(&points, 10.0).unwrap();
        assert_eq!(result.len(), 2);
    }
}
