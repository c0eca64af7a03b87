pub mod eps;
pub mod error;
pub mod extrusion;
pub mod generator;
pub mod tools;
pub mod triangulation;
pub mod validation;

pub use eps::{EpsFlags, write_eps, write_eps_file};
pub use error::{MeshError, MeshResult};
pub use extrusion::extrude_triangulation;
pub use generator::{
    hyper_cube_with_cylindrical_hole, merge_triangulations, subdivided_hyper_rectangle,
};
pub use tools::{PointMap, distort_random, transform};
pub use triangulation::{BoundaryId, Cell, FaceKey, Triangulation};
pub use validation::{ValidationResult, validate_mesh};
