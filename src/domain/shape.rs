use serde::{Deserialize, Serialize};

use crate::error::{GeoError, Result};
use crate::geometry::SphericalPoint;

/// How a shape's points are connected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Point,
    Path,
    Polygon,
}

/// A named coordinate sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub name: String,
    pub kind: ShapeKind,
    /// Points as (lat, lon) pairs in degrees
    pub points: Vec<(f64, f64)>,
}

impl Shape {
    pub fn new(name: impl Into<String>, kind: ShapeKind, points: Vec<(f64, f64)>) -> Self {
        Self {
            name: name.into(),
            kind,
            points,
        }
    }

    /// Same shape and kind with moved points, renamed
    pub fn with_points(&self, name: impl Into<String>, points: Vec<(f64, f64)>) -> Self {
        Self::new(name, self.kind, points)
    }

    /// Check the point count against the kind
    pub fn validate(&self) -> Result<()> {
        let needed = match self.kind {
            ShapeKind::Point => 1,
            ShapeKind::Path => 2,
            ShapeKind::Polygon => 3,
        };
        if self.points.len() < needed {
            return Err(GeoError::InvalidInput(format!(
                "shape '{}' needs at least {} points, has {}",
                self.name,
                needed,
                self.points.len()
            )));
        }
        if self.kind == ShapeKind::Point && self.points.len() > 1 {
            return Err(GeoError::InvalidInput(format!(
                "point shape '{}' has {} points",
                self.name,
                self.points.len()
            )));
        }
        Ok(())
    }

    /// Validated spherical points at mean earth radius
    pub fn spherical_points(&self) -> Result<Vec<SphericalPoint>> {
        self.points
            .iter()
            .map(|&(lat, lon)| SphericalPoint::new(lat, lon))
            .collect()
    }
}

/// Parse a JSON array of shapes
pub fn shapes_from_json(text: &str) -> Result<Vec<Shape>> {
    let shapes: Vec<Shape> = serde_json::from_str(text)
        .map_err(|e| GeoError::InvalidInput(format!("malformed shape list: {}", e)))?;
    for shape in &shapes {
        shape.validate()?;
    }
    Ok(shapes)
}

pub fn shapes_to_json(shapes: &[Shape]) -> Result<String> {
    serde_json::to_string_pretty(shapes)
        .map_err(|e| GeoError::InvalidInput(format!("cannot serialize shapes: {}", e)))
}
