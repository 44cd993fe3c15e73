//! Rigid rotation and translation of coordinate sequences
//!
//! Every transform is a rotation of the sphere about some pole. A point is
//! rotated by walking out from the pole on its bearing plus the azimuth,
//! for the same distance it had from the pole. Translation picks the pole a
//! quarter circle to the side of the first coordinate, so that rotating by
//! the arc length moves that coordinate along the requested bearing.

use std::f64::consts::FRAC_PI_2;

use super::simplify::{Coord, GeodesicSimplifier};
use crate::error::{GeoError, Result, ensure_finite};
use crate::geometry::{EARTH_RADIUS_KM, SphericalPoint};

/// Upper bound on interpolation steps
pub const MAX_STEPS: usize = 50;

/// What a [`TransformRequest`] does to its coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operation {
    /// Rotate `azimuth` degrees clockwise about `pole`, seen from above the pole
    ///
    /// Clockwise, unlike [`Vector3d::rotate_around`](crate::geometry::Vector3d::rotate_around):
    /// the same motion there takes `-azimuth` in radians.
    Rotate { pole: SphericalPoint, azimuth: f64 },
    /// Rotate about the geographic mean of the coordinates
    RotateAboutCentroid { azimuth: f64 },
    /// Move `distance` km, the first coordinate heading along `bearing`
    Translate { bearing: f64, distance: f64 },
    /// Drop vertices deviating less than `kink` meters
    Simplify { kink: f64 },
}

impl Operation {
    fn validate(&self) -> Result<()> {
        match *self {
            Operation::Rotate { azimuth, .. } | Operation::RotateAboutCentroid { azimuth } => {
                ensure_finite(azimuth, "azimuth")?;
            }
            Operation::Translate { bearing, distance } => {
                ensure_finite(bearing, "bearing")?;
                ensure_finite(distance, "distance")?;
            }
            Operation::Simplify { kink } => {
                GeodesicSimplifier::new(kink)?;
            }
        }
        Ok(())
    }

    fn is_interpolable(&self) -> bool {
        !matches!(self, Operation::Simplify { .. })
    }
}

/// A validated transform of one coordinate sequence
#[derive(Debug, Clone, PartialEq)]
pub struct TransformRequest {
    operation: Operation,
    points: Vec<SphericalPoint>,
    steps: usize,
}

impl TransformRequest {
    /// Build a request on a sphere of mean earth radius
    pub fn new(operation: Operation, coords: &[Coord], steps: usize) -> Result<Self> {
        Self::on_sphere(operation, coords, steps, EARTH_RADIUS_KM)
    }

    /// Build a request on a sphere of `radius` km
    ///
    /// Fails with [`GeoError::InvalidInput`] on non-finite numbers, latitudes
    /// outside [-90, 90], steps outside 1..=50, or a stepped simplify.
    pub fn on_sphere(
        operation: Operation,
        coords: &[Coord],
        steps: usize,
        radius: f64,
    ) -> Result<Self> {
        operation.validate()?;

        if !(1..=MAX_STEPS).contains(&steps) {
            return Err(GeoError::InvalidInput(format!(
                "steps must be between 1 and {}, got {}",
                MAX_STEPS, steps
            )));
        }
        if steps > 1 && !operation.is_interpolable() {
            return Err(GeoError::InvalidInput(
                "simplify cannot be split into steps".to_string(),
            ));
        }

        let points = coords
            .iter()
            .map(|&(lat, lon)| SphericalPoint::with_height_radius(lat, lon, 0.0, radius))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            operation,
            points,
            steps,
        })
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn coords(&self) -> Vec<Coord> {
        self.points.iter().map(SphericalPoint::coords).collect()
    }

    /// Pole and full azimuth in degrees of the rotation this request performs
    ///
    /// `None` for simplify, and for centroid or translation requests without
    /// coordinates to place the pole.
    pub fn rotation(&self) -> Option<(SphericalPoint, f64)> {
        match self.operation {
            Operation::Rotate { pole, azimuth } => Some((pole, azimuth)),
            Operation::RotateAboutCentroid { azimuth } => {
                SphericalPoint::mean_of(&self.points).map(|centroid| (centroid, azimuth))
            }
            Operation::Translate { bearing, distance } => {
                let first = self.points.first()?;
                Some(translation_rotation(first, bearing, distance))
            }
            Operation::Simplify { .. } => None,
        }
    }

    /// The operation that moves this request's output back where it came from
    ///
    /// Always an explicit [`Operation::Rotate`], since the centroid and the
    /// translation pole are taken from coordinates the transform moves.
    pub fn inverse(&self) -> Option<Operation> {
        self.rotation().map(|(pole, azimuth)| Operation::Rotate {
            pole,
            azimuth: -azimuth,
        })
    }
}

/// Result of a transform: one sequence, or every interpolated frame
#[derive(Debug, Clone, PartialEq)]
pub enum TransformOutput {
    Single(Vec<Coord>),
    /// `steps + 1` frames, from the untouched input to the full transform
    Frames(Vec<Vec<Coord>>),
}

impl TransformOutput {
    /// The fully transformed coordinates
    pub fn last(&self) -> &[Coord] {
        match self {
            TransformOutput::Single(coords) => coords,
            TransformOutput::Frames(frames) => frames.last().map(Vec::as_slice).unwrap_or(&[]),
        }
    }

    pub fn into_frames(self) -> Vec<Vec<Coord>> {
        match self {
            TransformOutput::Single(coords) => vec![coords],
            TransformOutput::Frames(frames) => frames,
        }
    }
}

/// Carry out a validated request
pub fn apply(request: &TransformRequest) -> TransformOutput {
    if let Operation::Simplify { kink } = request.operation {
        let simplifier = GeodesicSimplifier::from_validated(kink);
        return TransformOutput::Single(simplifier.simplify(&request.coords()));
    }

    let Some((pole, azimuth)) = request.rotation() else {
        // nothing to place a derived pole with, and so nothing to move
        return TransformOutput::Single(Vec::new());
    };

    tracing::debug!(
        pole_lat = pole.lat(),
        pole_lon = pole.lon(),
        azimuth,
        points = request.points.len(),
        steps = request.steps,
        "applying rotation"
    );

    if request.steps == 1 {
        return TransformOutput::Single(rotate_all(&request.points, &pole, azimuth));
    }

    let frames = (0..=request.steps)
        .map(|i| {
            if i == 0 {
                request.coords()
            } else {
                let fraction = i as f64 / request.steps as f64;
                rotate_all(&request.points, &pole, azimuth * fraction)
            }
        })
        .collect();
    TransformOutput::Frames(frames)
}

/// Rotate `coords` by `azimuth` degrees about `pole`
pub fn apply_rotation(
    coords: &[Coord],
    pole: &SphericalPoint,
    azimuth: f64,
    steps: usize,
) -> Result<TransformOutput> {
    let operation = Operation::Rotate {
        pole: *pole,
        azimuth,
    };
    Ok(apply(&TransformRequest::new(operation, coords, steps)?))
}

/// Move `coords` `distance` km along `bearing`
pub fn apply_translation(
    coords: &[Coord],
    bearing: f64,
    distance: f64,
    steps: usize,
) -> Result<TransformOutput> {
    let operation = Operation::Translate { bearing, distance };
    Ok(apply(&TransformRequest::new(operation, coords, steps)?))
}

/// Rotate a single point about `pole`
///
/// Points on the pole or its antipode have no bearing from it and are
/// returned unchanged.
pub fn rotate_point(point: &SphericalPoint, pole: &SphericalPoint, azimuth: f64) -> SphericalPoint {
    match pole.bearing_to(point) {
        Ok(bearing) => pole.destination_point(bearing + azimuth, pole.distance_to(point)),
        Err(_) => {
            tracing::debug!(
                lat = point.lat(),
                lon = point.lon(),
                "point lies on the rotation axis, left in place"
            );
            *point
        }
    }
}

fn rotate_all(points: &[SphericalPoint], pole: &SphericalPoint, azimuth: f64) -> Vec<Coord> {
    points
        .iter()
        .map(|p| rotate_point(p, pole, azimuth).coords())
        .collect()
}

/// Pole and azimuth moving `first` `distance` km along `bearing`
fn translation_rotation(first: &SphericalPoint, bearing: f64, distance: f64) -> (SphericalPoint, f64) {
    let quarter = first.radius() * FRAC_PI_2;
    let pole = first.destination_point(bearing + 90.0, quarter);
    let azimuth = (distance / first.radius()).to_degrees();
    (pole, azimuth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::euler::{CorrespondencePair, solve_euler_pole};
    use approx::assert_abs_diff_eq;

    fn pt(lat: f64, lon: f64) -> SphericalPoint {
        SphericalPoint::new(lat, lon).unwrap()
    }

    fn assert_coords_eq(a: &[Coord], b: &[Coord], epsilon: f64) {
        assert_eq!(a.len(), b.len());
        for (p, q) in a.iter().zip(b) {
            assert_abs_diff_eq!(p.0, q.0, epsilon = epsilon);
            assert_abs_diff_eq!(p.1, q.1, epsilon = epsilon);
        }
    }

    #[test]
    fn test_rotate_about_north_pole() {
        let output = apply_rotation(&[(0.0, 10.0)], &pt(90.0, 0.0), 30.0, 1).unwrap();
        // clockwise seen from above the north pole is westward
        assert_coords_eq(output.last(), &[(0.0, -20.0)], 1e-9);
    }

    #[test]
    fn test_rotation_matches_right_handed_rotation() {
        let pole = pt(35.0, -70.0);
        let coords = [(10.0, 20.0), (-45.0, 170.0), (80.0, -100.0)];
        let output = apply_rotation(&coords, &pole, 42.0, 1).unwrap();

        let expected: Vec<Coord> = coords
            .iter()
            .map(|&(lat, lon)| {
                pt(lat, lon)
                    .rotated_around(&pole, -42f64.to_radians())
                    .coords()
            })
            .collect();
        assert_coords_eq(output.last(), &expected, 1e-9);
    }

    #[test]
    fn test_points_on_axis_stay_put() {
        let pole = pt(20.0, 30.0);
        let coords = [(20.0, 30.0), (-20.0, -150.0)];
        let output = apply_rotation(&coords, &pole, 90.0, 1).unwrap();
        assert_eq!(output.last(), &coords);
    }

    #[test]
    fn test_interpolated_frames() {
        let coords = [(10.0, 10.0), (12.0, 11.0)];
        let pole = pt(0.0, 0.0);

        let stepped = apply_rotation(&coords, &pole, 60.0, 3).unwrap();
        let single = apply_rotation(&coords, &pole, 60.0, 1).unwrap();
        let third = apply_rotation(&coords, &pole, 20.0, 1).unwrap();

        let frames = stepped.clone().into_frames();
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0], coords.to_vec());
        assert_coords_eq(&frames[1], third.last(), 1e-9);
        assert_coords_eq(stepped.last(), single.last(), 1e-9);
    }

    #[test]
    fn test_translate_north_one_degree() {
        let one_degree = EARTH_RADIUS_KM * 1f64.to_radians();
        let output = apply_translation(&[(0.0, 0.0)], 0.0, one_degree, 1).unwrap();
        assert_coords_eq(output.last(), &[(1.0, 0.0)], 1e-9);
    }

    #[test]
    fn test_translate_first_point_follows_destination() {
        let coords = [(10.0, 20.0), (10.5, 21.0), (9.0, 22.0)];
        let output = apply_translation(&coords, 90.0, 500.0, 1).unwrap();

        let expected = pt(10.0, 20.0).destination_point(90.0, 500.0);
        assert_abs_diff_eq!(output.last()[0].0, expected.lat(), epsilon = 1e-9);
        assert_abs_diff_eq!(output.last()[0].1, expected.lon(), epsilon = 1e-9);

        // rigid: pairwise distances survive
        let before = pt(10.0, 20.0).distance_to(&pt(9.0, 22.0));
        let (a, b) = (output.last()[0], output.last()[2]);
        let after = pt(a.0, a.1).distance_to(&pt(b.0, b.1));
        assert_abs_diff_eq!(before, after, epsilon = 1e-9);
    }

    #[test]
    fn test_translate_empty_sequence() {
        let output = apply_translation(&[], 45.0, 100.0, 1).unwrap();
        assert_eq!(output, TransformOutput::Single(Vec::new()));

        let request = TransformRequest::new(
            Operation::Translate {
                bearing: 45.0,
                distance: 100.0,
            },
            &[],
            1,
        )
        .unwrap();
        assert!(request.inverse().is_none());
    }

    #[test]
    fn test_rotate_about_centroid_keeps_centroid() {
        let coords = [(10.0, 10.0), (10.0, 12.0), (12.0, 12.0), (12.0, 10.0)];
        let request =
            TransformRequest::new(Operation::RotateAboutCentroid { azimuth: 90.0 }, &coords, 1)
                .unwrap();
        let output = apply(&request);

        let to_points = |coords: &[Coord]| -> Vec<SphericalPoint> {
            coords.iter().map(|&(lat, lon)| pt(lat, lon)).collect()
        };
        let before = SphericalPoint::mean_of(&to_points(&coords)).unwrap();
        let after = SphericalPoint::mean_of(&to_points(output.last())).unwrap();
        assert!(before.angular_distance_to(&after) < 1e-9);
    }

    #[test]
    fn test_inverse_undoes_transform() {
        let coords = vec![(51.5, -0.1), (48.9, 2.35), (52.5, 13.4)];
        for operation in [
            Operation::Translate {
                bearing: 130.0,
                distance: 750.0,
            },
            Operation::RotateAboutCentroid { azimuth: -35.0 },
            Operation::Rotate {
                pole: pt(-10.0, 60.0),
                azimuth: 15.0,
            },
        ] {
            let request = TransformRequest::new(operation, &coords, 1).unwrap();
            let moved = apply(&request);
            let undo = TransformRequest::new(request.inverse().unwrap(), moved.last(), 1).unwrap();
            assert_coords_eq(apply(&undo).last(), &coords, 1e-9);
        }
    }

    #[test]
    fn test_solved_pole_reproduces_correspondences() {
        let starts = [pt(10.0, 10.0), pt(20.0, 40.0)];
        let moved = apply_rotation(
            &[starts[0].coords(), starts[1].coords()],
            &pt(40.0, -30.0),
            25.0,
            1,
        )
        .unwrap();
        let ends: Vec<SphericalPoint> = moved.last().iter().map(|&(a, b)| pt(a, b)).collect();

        let solution = solve_euler_pole(
            &CorrespondencePair::new(starts[0], ends[0]),
            &CorrespondencePair::new(starts[1], ends[1]),
        )
        .unwrap();

        for rotation in solution.solutions() {
            let output = apply_rotation(
                &[starts[0].coords(), starts[1].coords()],
                &rotation.pole,
                rotation.angle,
                1,
            )
            .unwrap();
            assert_coords_eq(output.last(), moved.last(), 1e-7);
        }
    }

    #[test]
    fn test_simplify_request() {
        let zigzag = [(0.0, 0.0), (0.1, 0.5), (0.0, 1.0), (0.1, 1.5), (0.0, 2.0)];
        let request =
            TransformRequest::new(Operation::Simplify { kink: 20_000.0 }, &zigzag, 1).unwrap();
        assert_eq!(
            apply(&request),
            TransformOutput::Single(vec![(0.0, 0.0), (0.0, 2.0)])
        );
        assert!(request.inverse().is_none());
    }

    #[test]
    fn test_request_validation() {
        let rotate = Operation::Rotate {
            pole: pt(0.0, 0.0),
            azimuth: 10.0,
        };
        let coords = [(1.0, 1.0)];

        assert!(TransformRequest::new(rotate, &coords, 0).is_err());
        assert!(TransformRequest::new(rotate, &coords, MAX_STEPS + 1).is_err());
        assert!(TransformRequest::new(rotate, &coords, MAX_STEPS).is_ok());
        assert!(TransformRequest::new(rotate, &[(f64::NAN, 1.0)], 1).is_err());
        assert!(TransformRequest::new(rotate, &[(95.0, 1.0)], 1).is_err());

        let nan_azimuth = Operation::RotateAboutCentroid { azimuth: f64::NAN };
        assert!(TransformRequest::new(nan_azimuth, &coords, 1).is_err());

        let simplify = Operation::Simplify { kink: 100.0 };
        assert!(matches!(
            TransformRequest::new(simplify, &coords, 2),
            Err(GeoError::InvalidInput(_))
        ));
        assert!(TransformRequest::new(Operation::Simplify { kink: -1.0 }, &coords, 1).is_err());
    }
}
