//! meshtour - Generate, transform and draw hexahedral meshes

pub mod config;
pub mod geometry;
pub mod gmsh;
pub mod mesh;
pub mod report;
pub mod tour;
