//! geoshift - Rotate, translate and simplify shapes on a spherical earth

pub mod batch;
pub mod config;
pub mod domain;
pub mod error;
pub mod geometry;
pub mod ops;
pub mod transform;

pub use error::{GeoError, Result};
pub use geometry::{Path, SphericalPoint, Vector3d};
pub use transform::{
    CorrespondencePair, EulerPole, EulerPoleSolution, GeodesicSimplifier, Operation,
    TransformOutput, TransformRequest,
};
