//! Latitude/longitude points on a spherical earth
//!
//! Every operation goes through n-vector algebra rather than spherical
//! trigonometry, so nothing needs special-casing at the poles or across the
//! antimeridian except where the geometry itself is undefined (a bearing
//! between coincident or antipodal points).

use std::f64::consts::FRAC_PI_2;
use std::fmt;

use super::dms::{DmsFormat, to_lat, to_lon};
use super::vector::Vector3d;
use crate::error::{GeoError, Result, ensure_finite};

/// Mean earth radius in km
pub const EARTH_RADIUS_KM: f64 = 6371.0;
/// Radius clamp range in km (polar to equatorial, rounded outward)
pub const MIN_RADIUS_KM: f64 = 6353.0;
pub const MAX_RADIUS_KM: f64 = 6384.0;

/// Cross products shorter than this are treated as vanishing
const DEGENERATE_EPSILON: f64 = 1e-12;

/// Normalize a longitude into (-180, 180]
pub fn normalize_lon(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 { 180.0 } else { wrapped }
}

/// A geodetic point: latitude and longitude in degrees, height and radius in km
///
/// Points are immutable values. Equality compares all four fields exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalPoint {
    lat: f64,
    lon: f64,
    height: f64,
    radius: f64,
}

/// A great-circle path, given by two points or by a start point and bearing
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Path {
    Between(SphericalPoint, SphericalPoint),
    Heading(SphericalPoint, f64),
}

impl Path {
    pub fn start(&self) -> &SphericalPoint {
        match self {
            Path::Between(start, _) | Path::Heading(start, _) => start,
        }
    }

    /// Normal vector of the great circle the path lies on
    pub fn great_circle(&self) -> Vector3d {
        match self {
            Path::Between(start, end) => start.to_vector().cross(&end.to_vector()),
            Path::Heading(start, bearing) => start.great_circle(*bearing),
        }
    }
}

impl SphericalPoint {
    /// Create a point at mean earth radius
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        Self::with_height_radius(lat, lon, 0.0, EARTH_RADIUS_KM)
    }

    /// Create a point with explicit height and radius (both km)
    ///
    /// The radius is clamped to [6353, 6384] km.
    pub fn with_height_radius(lat: f64, lon: f64, height: f64, radius: f64) -> Result<Self> {
        let lat = ensure_finite(lat, "latitude")?;
        let lon = ensure_finite(lon, "longitude")?;
        let height = ensure_finite(height, "height")?;
        let radius = ensure_finite(radius, "radius")?;

        if !(-90.0..=90.0).contains(&lat) {
            return Err(GeoError::InvalidInput(format!(
                "latitude {} is outside [-90, 90]",
                lat
            )));
        }

        Ok(Self {
            lat,
            lon,
            height,
            radius: radius.clamp(MIN_RADIUS_KM, MAX_RADIUS_KM),
        })
    }

    /// Convert an n-vector back to a point at mean earth radius
    pub fn from_vector(v: &Vector3d) -> Self {
        Self::from_vector_on(v, 0.0, EARTH_RADIUS_KM)
    }

    fn from_vector_on(v: &Vector3d, height: f64, radius: f64) -> Self {
        let lat = v.z.atan2((v.x * v.x + v.y * v.y).sqrt());
        let lon = v.y.atan2(v.x);
        Self {
            lat: lat.to_degrees(),
            lon: lon.to_degrees(),
            height,
            radius,
        }
    }

    /// Point derived from `v` on the same sphere as `self`
    fn sibling(&self, v: &Vector3d) -> Self {
        Self::from_vector_on(v, self.height, self.radius)
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// (lat, lon) tuple in degrees
    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lon)
    }

    /// Unit n-vector normal to the earth's surface at this point
    pub fn to_vector(&self) -> Vector3d {
        let phi = self.lat.to_radians();
        let lambda = self.lon.to_radians();
        Vector3d::new(
            phi.cos() * lambda.cos(),
            phi.cos() * lambda.sin(),
            phi.sin(),
        )
    }

    /// Normal of the great circle leaving this point on `bearing` degrees
    pub fn great_circle(&self, bearing: f64) -> Vector3d {
        let phi = self.lat.to_radians();
        let lambda = self.lon.to_radians();
        let theta = bearing.to_radians();

        Vector3d::new(
            lambda.sin() * theta.cos() - phi.sin() * lambda.cos() * theta.sin(),
            -lambda.cos() * theta.cos() - phi.sin() * lambda.sin() * theta.sin(),
            phi.cos() * theta.sin(),
        )
    }

    /// Great-circle distance in km
    pub fn distance_to(&self, other: &SphericalPoint) -> f64 {
        let delta = self.to_vector().angle_to(&other.to_vector(), None);
        delta * self.radius
    }

    /// Initial compass bearing toward `other`, in degrees [0, 360)
    ///
    /// Fails with [`GeoError::DegenerateBearing`] when the points coincide or
    /// are antipodal, since every direction then leads to `other`.
    pub fn bearing_to(&self, other: &SphericalPoint) -> Result<f64> {
        let p1 = self.to_vector();
        let p2 = other.to_vector();

        let toward = p1.cross(&p2);
        if toward.length() < DEGENERATE_EPSILON {
            return Err(GeoError::DegenerateBearing);
        }
        // Same direction as p1 × north off the poles, but still defined on them,
        // where it follows the meridian of this point's longitude.
        let north = self.great_circle(0.0);

        let bearing = toward.angle_to(&north, Some(&p1)).to_degrees();
        Ok((bearing + 360.0) % 360.0)
    }

    /// Point halfway along the great circle to `other`
    ///
    /// Antipodal points have no single midpoint and fail with
    /// [`GeoError::InvalidInput`].
    pub fn midpoint_to(&self, other: &SphericalPoint) -> Result<SphericalPoint> {
        let sum = self.to_vector().plus(&other.to_vector());
        if sum.length() < DEGENERATE_EPSILON {
            return Err(GeoError::InvalidInput(format!(
                "midpoint of antipodal points ({:.6}, {:.6}) and ({:.6}, {:.6}) is undefined",
                self.lat, self.lon, other.lat, other.lon
            )));
        }
        Ok(self.sibling(&sum.unit()))
    }

    /// Point reached after travelling `distance` km on initial `bearing`
    pub fn destination_point(&self, bearing: f64, distance: f64) -> SphericalPoint {
        let delta = distance / self.radius;
        let gc = self.great_circle(bearing);
        let p1 = self.to_vector();

        let along = p1.times(delta.cos());
        let across = gc.cross(&p1).times(delta.sin());

        self.sibling(&along.plus(&across).unit())
    }

    /// Intersection of two great-circle paths
    ///
    /// Two great circles cross at a pair of antipodal points; the one along
    /// `c1 × c2` is returned. Negate its n-vector for the other. Returns `None`
    /// when the great circles coincide.
    pub fn intersection(path1: &Path, path2: &Path) -> Option<SphericalPoint> {
        let c1 = path1.great_circle().unit();
        let c2 = path2.great_circle().unit();

        let crossing = c1.cross(&c2);
        if crossing.length() < DEGENERATE_EPSILON {
            return None;
        }

        Some(path1.start().sibling(&crossing.unit()))
    }

    /// Signed distance in km from this point to the great circle of `path`
    ///
    /// Positive to the right of the path, negative to the left.
    pub fn cross_track_distance_to(&self, path: &Path) -> f64 {
        let p = self.to_vector();
        let gc = path.great_circle();

        let alpha = gc.angle_to(&p, Some(&p.cross(&gc)));
        let alpha = if alpha < 0.0 {
            -FRAC_PI_2 - alpha
        } else {
            FRAC_PI_2 - alpha
        };

        alpha * self.radius
    }

    /// Whether this point lies inside the convex polygon with vertices `points`
    ///
    /// A closing vertex equal to the first is ignored. Points on an edge
    /// count as enclosed. Either winding is accepted; a polygon whose turns
    /// change direction fails with [`GeoError::NonConvexPolygon`].
    ///
    /// Turns are signed against the vertex they happen at, not against the
    /// query point, and a consistently negative (clockwise) winding is not an
    /// error. So the convexity verdict is the same for every query point.
    pub fn enclosed_by(&self, points: &[SphericalPoint]) -> Result<bool> {
        let vertices = match points {
            [first, .., last] if first == last => &points[..points.len() - 1],
            _ => points,
        };
        if vertices.len() < 3 {
            return Err(GeoError::InvalidInput(format!(
                "polygon needs at least 3 distinct vertices, got {}",
                vertices.len()
            )));
        }

        let v = self.to_vector();
        let n = vertices.len();

        let edges: Vec<Vector3d> = (0..n)
            .map(|i| {
                let p1 = vertices[i].to_vector();
                let p2 = vertices[(i + 1) % n].to_vector();
                p1.cross(&p2)
            })
            .collect();

        // each turn is signed against the vertex it happens at
        let mut turns_left = false;
        let mut turns_right = false;
        for i in 0..n {
            let corner = vertices[(i + 1) % n].to_vector();
            let turn = edges[i].angle_to(&edges[(i + 1) % n], Some(&corner));
            if turn > 0.0 {
                turns_left = true;
            } else if turn < 0.0 {
                turns_right = true;
            }
        }
        if turns_left && turns_right {
            return Err(GeoError::NonConvexPolygon);
        }

        // Same side of every edge; points on an edge agree with both sides.
        let mut side: Option<bool> = None;
        for edge in &edges {
            let offset = edge.unit().dot(&v);
            if offset.abs() <= DEGENERATE_EPSILON {
                continue;
            }
            let to_left = offset > 0.0;
            match side {
                None => side = Some(to_left),
                Some(s) if s != to_left => return Ok(false),
                Some(_) => {}
            }
        }

        Ok(true)
    }

    /// Geographic mean of `points`, or `None` when there are none
    ///
    /// Unstable for clusters spanning nearly antipodal points.
    pub fn mean_of(points: &[SphericalPoint]) -> Option<SphericalPoint> {
        let first = points.first()?;
        let sum = points
            .iter()
            .fold(Vector3d::zero(), |acc, p| acc.plus(&p.to_vector()));
        Some(first.sibling(&sum.unit()))
    }

    /// The diametrically opposite point, longitude normalized to (-180, 180]
    pub fn antipode(&self) -> SphericalPoint {
        Self {
            lat: -self.lat,
            lon: normalize_lon(self.lon + 180.0),
            height: self.height,
            radius: self.radius,
        }
    }

    /// Angular distance to `other` in radians
    pub fn angular_distance_to(&self, other: &SphericalPoint) -> f64 {
        self.to_vector().angle_to(&other.to_vector(), None)
    }

    /// Same point with its longitude normalized to (-180, 180]
    pub fn normalized(&self) -> SphericalPoint {
        Self {
            lon: normalize_lon(self.lon),
            ..*self
        }
    }

    /// Comma-separated latitude and longitude in the given DMS layout
    pub fn to_dms_string(&self, format: DmsFormat, dp: Option<usize>) -> String {
        format!(
            "{}, {}",
            to_lat(self.lat, format, dp),
            to_lon(self.lon, format, dp)
        )
    }

    /// Rotate this point about `axis` by `theta` radians, right-handed
    pub fn rotated_around(&self, axis: &SphericalPoint, theta: f64) -> SphericalPoint {
        let rotated = self.to_vector().rotate_around(&axis.to_vector(), theta);
        self.sibling(&rotated)
    }
}

impl fmt::Display for SphericalPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_dms_string(DmsFormat::Dms, None))
    }
}
