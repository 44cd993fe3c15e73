pub mod euler;
pub mod rigid;
pub mod simplify;

pub use euler::{
    CorrespondencePair, EulerPole, EulerPoleSolution, correspondences_from_shapes,
    solve_euler_pole,
};
pub use rigid::{
    MAX_STEPS, Operation, TransformOutput, TransformRequest, apply, apply_rotation,
    apply_translation, rotate_point,
};
pub use simplify::{Coord, DEFAULT_KINK_M, GeodesicSimplifier};
