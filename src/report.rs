use crate::mesh::{BoundaryId, EpsFlags, Triangulation, write_eps_file};
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Summary of a mesh as printed after each tour step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeshInfo {
    pub dimension: usize,
    pub n_active_cells: usize,
    /// Number of boundary faces per boundary indicator, ascending
    pub boundary_counts: BTreeMap<BoundaryId, usize>,
    /// Where the picture was written
    pub output: PathBuf,
}

impl MeshInfo {
    /// Gather the summary without writing anything
    pub fn collect<const D: usize>(tria: &Triangulation<D>, output: &Path) -> Self {
        let mut boundary_counts = BTreeMap::new();
        for (_, _, id) in tria.boundary_faces() {
            *boundary_counts.entry(id).or_insert(0) += 1;
        }

        Self {
            dimension: tria.dimension(),
            n_active_cells: tria.n_active_cells(),
            boundary_counts,
            output: output.to_path_buf(),
        }
    }

    /// Total number of boundary faces
    pub fn n_boundary_faces(&self) -> usize {
        self.boundary_counts.values().sum()
    }
}

impl fmt::Display for MeshInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mesh info:")?;
        writeln!(f, " dimension: {}", self.dimension)?;
        writeln!(f, " no. of cells: {}", self.n_active_cells)?;
        write!(f, " boundary indicators: ")?;
        for (id, count) in &self.boundary_counts {
            write!(f, "{}({} times) ", id, count)?;
        }
        writeln!(f)?;
        write!(f, " written to {}", self.output.display())
    }
}

/// Summarize a mesh and write its EPS picture to `output`
pub fn mesh_info<const D: usize>(
    tria: &Triangulation<D>,
    output: &Path,
    flags: &EpsFlags,
) -> Result<MeshInfo> {
    let info = MeshInfo::collect(tria, output);
    write_eps_file(output, tria, flags)?;
    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::mesh::{hyper_cube_with_cylindrical_hole, subdivided_hyper_rectangle};
    use tempfile::tempdir;

    #[test]
    fn test_collect_rectangle() {
        let tria =
            subdivided_hyper_rectangle([14, 2], Point::xy(0.0, 0.0), Point::xy(10.0, 1.0), false)
                .unwrap();
        let info = MeshInfo::collect(&tria, Path::new("grid.eps"));

        assert_eq!(info.dimension, 2);
        assert_eq!(info.n_active_cells, 28);
        assert_eq!(info.n_boundary_faces(), tria.n_boundary_faces());
        assert_eq!(info.boundary_counts, BTreeMap::from([(0, 32)]));
    }

    #[test]
    fn test_display() {
        let tria = hyper_cube_with_cylindrical_hole(0.25, 1.0).unwrap();
        let info = MeshInfo::collect(&tria, Path::new("grid-2.eps"));

        let text = info.to_string();
        assert_eq!(
            text,
            "Mesh info:\n dimension: 2\n no. of cells: 8\n boundary indicators: 0(8 times) 1(8 times) \n written to grid-2.eps"
        );
    }

    #[test]
    fn test_mesh_info_writes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hole.eps");
        let tria = hyper_cube_with_cylindrical_hole(0.25, 1.0).unwrap();

        let info = mesh_info(&tria, &path, &EpsFlags::default()).unwrap();

        assert!(path.exists());
        assert_eq!(info.output, path);
    }

    #[test]
    fn test_mesh_info_unwritable_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("hole.eps");
        let tria = hyper_cube_with_cylindrical_hole(0.25, 1.0).unwrap();

        assert!(mesh_info(&tria, &path, &EpsFlags::default()).is_err());
    }

    #[test]
    fn test_serializes_to_json() {
        let tria = hyper_cube_with_cylindrical_hole(0.25, 1.0).unwrap();
        let info = MeshInfo::collect(&tria, Path::new("grid.eps"));

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["n_active_cells"], 8);
        assert_eq!(json["boundary_counts"]["1"], 8);
    }
}
