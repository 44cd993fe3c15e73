pub mod shape;

pub use shape::{Shape, ShapeKind, shapes_from_json, shapes_to_json};
