//! Recovering a rotation pole from two before/after correspondences
//!
//! A point rotated about a pole stays the same angular distance from it, so
//! the pole lies on the perpendicular bisector of every (start, end) pair.
//! Two pairs give two bisectors whose crossing is the pole.

use crate::error::{GeoError, Result};
use crate::geometry::{Path, SphericalPoint, normalize_lon};

/// The same point observed before and after a rotation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrespondencePair {
    pub start: SphericalPoint,
    pub end: SphericalPoint,
}

impl CorrespondencePair {
    pub fn new(start: SphericalPoint, end: SphericalPoint) -> Self {
        Self { start, end }
    }

    /// Great circle of points equidistant from start and end
    fn bisector(&self) -> Result<Path> {
        let mid = self.start.midpoint_to(&self.end).map_err(|_| {
            GeoError::IndeterminatePole(format!(
                "start and end of pair are antipodal: ({:.6}, {:.6}) and ({:.6}, {:.6})",
                self.start.lat(),
                self.start.lon(),
                self.end.lat(),
                self.end.lon()
            ))
        })?;
        let bearing = mid.bearing_to(&self.end).map_err(|_| {
            GeoError::IndeterminatePole(format!(
                "start and end of pair coincide at ({:.6}, {:.6})",
                self.start.lat(),
                self.start.lon()
            ))
        })?;
        Ok(Path::Heading(mid, bearing + 90.0))
    }
}

/// A rotation: pole and signed angle in degrees, clockwise seen from above the pole
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EulerPole {
    pub pole: SphericalPoint,
    pub angle: f64,
}

impl EulerPole {
    /// The same rotation expressed about the opposite pole
    pub fn antipodal(&self) -> EulerPole {
        EulerPole {
            pole: self.pole.antipode(),
            angle: -self.angle,
        }
    }
}

/// Both representations of one rotation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EulerPoleSolution {
    pub primary: EulerPole,
    pub antipodal: EulerPole,
}

impl EulerPoleSolution {
    pub fn solutions(&self) -> [EulerPole; 2] {
        [self.primary, self.antipodal]
    }
}

/// Solve for the rotation taking each pair's start to its end
///
/// Fails with [`GeoError::IndeterminatePole`] when a pair has not moved or
/// when both pairs share a bisector.
pub fn solve_euler_pole(
    pair1: &CorrespondencePair,
    pair2: &CorrespondencePair,
) -> Result<EulerPoleSolution> {
    let bisector1 = pair1.bisector()?;
    let bisector2 = pair2.bisector()?;

    let pole = SphericalPoint::intersection(&bisector1, &bisector2).ok_or_else(|| {
        GeoError::IndeterminatePole("perpendicular bisectors coincide".to_string())
    })?;

    // pole is equidistant from start1 and end1, which differ, so neither sits on it
    let to_start = pole
        .bearing_to(&pair1.start)
        .map_err(|e| GeoError::IndeterminatePole(e.to_string()))?;
    let to_end = pole
        .bearing_to(&pair1.end)
        .map_err(|e| GeoError::IndeterminatePole(e.to_string()))?;
    let angle = normalize_lon(to_end - to_start);

    let primary = EulerPole { pole, angle };
    tracing::debug!(
        pole_lat = pole.lat(),
        pole_lon = pole.lon(),
        angle,
        "solved Euler pole"
    );

    Ok(EulerPoleSolution {
        primary,
        antipodal: primary.antipodal(),
    })
}

/// Build correspondence pairs from two placements of the same shape
///
/// `first` and `second` index vertices shared by both placements.
pub fn correspondences_from_shapes(
    before: &[SphericalPoint],
    after: &[SphericalPoint],
    first: usize,
    second: usize,
) -> Result<(CorrespondencePair, CorrespondencePair)> {
    if before.len() != after.len() {
        return Err(GeoError::InvalidInput(format!(
            "shapes differ in length: {} vs {} vertices",
            before.len(),
            after.len()
        )));
    }
    if before.len() < 3 {
        return Err(GeoError::InvalidInput(format!(
            "shapes need at least 3 vertices, got {}",
            before.len()
        )));
    }
    if first == second {
        return Err(GeoError::InvalidInput(format!(
            "correspondence indices must differ, both are {}",
            first
        )));
    }
    for index in [first, second] {
        if index >= before.len() {
            return Err(GeoError::InvalidInput(format!(
                "vertex index {} out of range for {} vertices",
                index,
                before.len()
            )));
        }
    }

    Ok((
        CorrespondencePair::new(before[first], after[first]),
        CorrespondencePair::new(before[second], after[second]),
    ))
}
