pub mod dms;
pub mod point;
pub mod vector;

pub use dms::{DmsFormat, parse_dms, to_bearing, to_dms, to_lat, to_lon};
pub use point::{EARTH_RADIUS_KM, Path, SphericalPoint, normalize_lon};
pub use vector::Vector3d;
