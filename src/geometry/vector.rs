use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Cartesian 3D vector
///
/// Used both as an n-vector (a unit vector normal to the earth's surface,
/// standing in for a lat/lon point) and as the normal of a great circle.
/// No unit-length invariant is kept: callers normalize with [`Vector3d::unit`].
///
/// Axes are right-handed: x -> 0°N 0°E, y -> 0°N 90°E, z -> 90°N.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector3d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3d {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Unit vector toward the north pole
    pub const fn north_pole() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    pub fn plus(&self, v: &Vector3d) -> Vector3d {
        Vector3d::new(self.x + v.x, self.y + v.y, self.z + v.z)
    }

    pub fn minus(&self, v: &Vector3d) -> Vector3d {
        Vector3d::new(self.x - v.x, self.y - v.y, self.z - v.z)
    }

    pub fn times(&self, k: f64) -> Vector3d {
        Vector3d::new(self.x * k, self.y * k, self.z * k)
    }

    pub fn divided_by(&self, k: f64) -> Vector3d {
        Vector3d::new(self.x / k, self.y / k, self.z / k)
    }

    pub fn dot(&self, v: &Vector3d) -> f64 {
        self.x * v.x + self.y * v.y + self.z * v.z
    }

    pub fn cross(&self, v: &Vector3d) -> Vector3d {
        Vector3d::new(
            self.y * v.z - self.z * v.y,
            self.z * v.x - self.x * v.z,
            self.x * v.y - self.y * v.x,
        )
    }

    pub fn negate(&self) -> Vector3d {
        Vector3d::new(-self.x, -self.y, -self.z)
    }

    /// Euclidean norm
    pub fn length(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Normalize to unit length
    ///
    /// Zero-length and already-unit vectors are returned unchanged.
    pub fn unit(&self) -> Vector3d {
        let norm = self.length();
        if norm == 0.0 || norm == 1.0 {
            return *self;
        }
        self.divided_by(norm)
    }

    /// Angle in radians between this vector and `v`
    ///
    /// Without `sign_ref` the result is in [0, π]. With it, the angle is
    /// negated when `(self × v) · sign_ref` is negative, giving (-π, π].
    pub fn angle_to(&self, v: &Vector3d, sign_ref: Option<&Vector3d>) -> f64 {
        let cross = self.cross(v);
        let mut sin_theta = cross.length();
        let cos_theta = self.dot(v);

        if let Some(reference) = sign_ref
            && cross.dot(reference) < 0.0
        {
            sin_theta = -sin_theta;
        }

        sin_theta.atan2(cos_theta)
    }

    /// Rotate this vector by `theta` radians around `axis`
    ///
    /// Uses the quaternion-derived rotation matrix. Both `self` and `axis` are
    /// normalized first, so the result is a unit vector. Positive `theta` is
    /// counter-clockwise looking from the axis tip toward the origin. That is
    /// the opposite sense to [`crate::transform::Operation::Rotate`], so a
    /// rotation by `azimuth` degrees there equals `-azimuth` here.
    pub fn rotate_around(&self, axis: &Vector3d, theta: f64) -> Vector3d {
        let p = self.unit();
        let a = axis.unit();
        let (s, c) = theta.sin_cos();
        let t = 1.0 - c;

        let q = [
            [
                a.x * a.x * t + c,
                a.x * a.y * t - a.z * s,
                a.x * a.z * t + a.y * s,
            ],
            [
                a.y * a.x * t + a.z * s,
                a.y * a.y * t + c,
                a.y * a.z * t - a.x * s,
            ],
            [
                a.z * a.x * t - a.y * s,
                a.z * a.y * t + a.x * s,
                a.z * a.z * t + c,
            ],
        ];

        let row = |r: [f64; 3]| r[0] * p.x + r[1] * p.y + r[2] * p.z;
        Vector3d::new(row(q[0]), row(q[1]), row(q[2]))
    }
}

impl Add for Vector3d {
    type Output = Vector3d;

    fn add(self, rhs: Vector3d) -> Vector3d {
        self.plus(&rhs)
    }
}

impl Sub for Vector3d {
    type Output = Vector3d;

    fn sub(self, rhs: Vector3d) -> Vector3d {
        self.minus(&rhs)
    }
}

impl Mul<f64> for Vector3d {
    type Output = Vector3d;

    fn mul(self, rhs: f64) -> Vector3d {
        self.times(rhs)
    }
}

impl Div<f64> for Vector3d {
    type Output = Vector3d;

    fn div(self, rhs: f64) -> Vector3d {
        self.divided_by(rhs)
    }
}

impl Neg for Vector3d {
    type Output = Vector3d;

    fn neg(self) -> Vector3d {
        self.negate()
    }
}

impl fmt::Display for Vector3d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.3},{:.3},{:.3}]", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn assert_vec_eq(a: Vector3d, b: Vector3d) {
        assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-12);
        assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-12);
        assert_abs_diff_eq!(a.z, b.z, epsilon = 1e-12);
    }

    #[test]
    fn test_arithmetic() {
        let a = Vector3d::new(1.0, 2.0, 3.0);
        let b = Vector3d::new(-2.0, 0.5, 4.0);

        assert_eq!(a + b, Vector3d::new(-1.0, 2.5, 7.0));
        assert_eq!(a - b, Vector3d::new(3.0, 1.5, -1.0));
        assert_eq!(a * 2.0, Vector3d::new(2.0, 4.0, 6.0));
        assert_eq!(a / 2.0, Vector3d::new(0.5, 1.0, 1.5));
        assert_eq!(-a, Vector3d::new(-1.0, -2.0, -3.0));
        assert_eq!(a.dot(&b), 11.0);
    }

    #[test]
    fn test_cross_is_right_handed() {
        let x = Vector3d::new(1.0, 0.0, 0.0);
        let y = Vector3d::new(0.0, 1.0, 0.0);
        assert_eq!(x.cross(&y), Vector3d::north_pole());
        assert_eq!(y.cross(&x), Vector3d::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_unit() {
        let v = Vector3d::new(3.0, 4.0, 0.0).unit();
        assert_abs_diff_eq!(v.length(), 1.0, epsilon = 1e-15);
        assert_eq!(v, Vector3d::new(0.6, 0.8, 0.0));

        // zero vector is a no-op rather than a NaN
        assert_eq!(Vector3d::zero().unit(), Vector3d::zero());
    }

    #[test]
    fn test_angle_to_unsigned_and_signed() {
        let x = Vector3d::new(1.0, 0.0, 0.0);
        let y = Vector3d::new(0.0, 1.0, 0.0);
        let up = Vector3d::north_pole();

        assert_abs_diff_eq!(x.angle_to(&y, None), FRAC_PI_2, epsilon = 1e-15);
        assert_abs_diff_eq!(y.angle_to(&x, None), FRAC_PI_2, epsilon = 1e-15);
        assert_abs_diff_eq!(x.angle_to(&y, Some(&up)), FRAC_PI_2, epsilon = 1e-15);
        assert_abs_diff_eq!(y.angle_to(&x, Some(&up)), -FRAC_PI_2, epsilon = 1e-15);
        assert_abs_diff_eq!(x.angle_to(&-up, Some(&-up)), FRAC_PI_2, epsilon = 1e-15);
        assert_abs_diff_eq!(x.angle_to(&-x, None), PI, epsilon = 1e-15);
    }

    #[test]
    fn test_rotate_around_z() {
        let x = Vector3d::new(1.0, 0.0, 0.0);
        let rotated = x.rotate_around(&Vector3d::new(0.0, 0.0, 5.0), FRAC_PI_2);
        assert_vec_eq(rotated, Vector3d::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_rotate_around_inverse() {
        let v = Vector3d::new(0.3, -0.4, 0.866).unit();
        let axis = Vector3d::new(1.0, 2.0, -0.5);
        let there = v.rotate_around(&axis, 1.234);
        let back = there.rotate_around(&axis, -1.234);
        assert_vec_eq(back, v);
    }

    #[test]
    fn test_display() {
        let v = Vector3d::new(-0.7943, 0.12876, 0.5941);
        assert_eq!(v.to_string(), "[-0.794,0.129,0.594]");
    }
}
