use super::triangulation::{Triangulation, cell_edges};
use crate::geometry::{Bounds, Point, Scaler, SizeType, ViewProjector};
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

fn default_size() -> f64 {
    300.0
}
fn default_line_width() -> f64 {
    0.5
}
fn default_azimuth() -> f64 {
    60.0
}
fn default_turn() -> f64 {
    30.0
}

/// Appearance of EPS output
#[derive(Debug, Clone, Deserialize)]
pub struct EpsFlags {
    /// Picture width or height in points, see `size_type`
    #[serde(default = "default_size")]
    pub size: f64,
    #[serde(default)]
    pub size_type: SizeType,
    #[serde(default = "default_line_width")]
    pub line_width: f64,
    /// Draw boundary edges of 2D meshes in red
    #[serde(default)]
    pub color_boundary: bool,
    /// 3D view: angle between viewing direction and the z axis, degrees
    #[serde(default = "default_azimuth")]
    pub azimuth: f64,
    /// 3D view: rotation of the viewer around the z axis, degrees
    #[serde(default = "default_turn")]
    pub turn: f64,
}

impl Default for EpsFlags {
    fn default() -> Self {
        Self {
            size: default_size(),
            size_type: SizeType::default(),
            line_width: default_line_width(),
            color_boundary: false,
            azimuth: default_azimuth(),
            turn: default_turn(),
        }
    }
}

/// Write a line drawing of the mesh to an encapsulated PostScript file
pub fn write_eps_file<const D: usize>(
    path: &Path,
    tria: &Triangulation<D>,
    flags: &EpsFlags,
) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create EPS file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_eps(&mut writer, tria, flags)?;
    writer.flush()?;
    Ok(())
}

/// Write a line drawing of the mesh in EPS format
///
/// Every distinct cell edge becomes one stroked line. 2D meshes are drawn in
/// their own plane, 3D meshes through a parallel projection. Coordinates are
/// scaled so the picture's width (or height) equals `flags.size` points with
/// its lower-left corner at the origin.
pub fn write_eps<const D: usize, W: Write>(
    out: &mut W,
    tria: &Triangulation<D>,
    flags: &EpsFlags,
) -> Result<()> {
    if tria.n_cells() == 0 {
        bail!("Cannot draw a mesh without cells");
    }

    let projector = ViewProjector::new(flags.azimuth, flags.turn);
    let points: Vec<(f64, f64)> = tria
        .vertices()
        .iter()
        .map(|p| drawing_coords(p, &projector))
        .collect();

    let edges = collect_edges(tria);
    let boundary: HashSet<(usize, usize)> = if flags.color_boundary && D == 2 {
        tria.boundary_faces()
            .into_iter()
            .map(|(cell, face, _)| {
                let key = tria.face_key(cell, face);
                (key[0], key[1])
            })
            .collect()
    } else {
        HashSet::new()
    };

    let used: Vec<(f64, f64)> = edges
        .iter()
        .flat_map(|&(a, b)| [points[a], points[b]])
        .collect();
    let bounds = Bounds::from_points(&used).context("Mesh has no edges to draw")?;
    let scaler = Scaler::fit(&bounds, flags.size, flags.size_type);
    let (width, height) = scaler.picture_size();

    writeln!(out, "%!PS-Adobe-2.0 EPSF-1.2")?;
    writeln!(out, "%%Title: meshtour output")?;
    writeln!(out, "%%Creator: meshtour")?;
    writeln!(
        out,
        "%%BoundingBox: 0 0 {} {}",
        width.ceil() as i64,
        height.ceil() as i64
    )?;
    writeln!(out, "/m {{moveto}} bind def")?;
    writeln!(out, "/x {{lineto stroke}} bind def")?;
    writeln!(out, "/b {{0 0 0 setrgbcolor}} def")?;
    writeln!(out, "/r {{1 0 0 setrgbcolor}} def")?;
    writeln!(out, "%%EndProlog")?;
    writeln!(out)?;
    writeln!(out, "{} setlinewidth", flags.line_width)?;

    for &(a, b) in &edges {
        let colour = if boundary.contains(&(a, b)) { 'r' } else { 'b' };
        let (x1, y1) = scaler.scale(points[a].0, points[a].1);
        let (x2, y2) = scaler.scale(points[b].0, points[b].1);
        writeln!(
            out,
            "{} {:.3} {:.3} m {:.3} {:.3} x",
            colour, x1, y1, x2, y2
        )?;
    }

    writeln!(out, "showpage")?;
    writeln!(out, "%%EOF")?;

    Ok(())
}

/// Distinct edges of all cells as sorted vertex pairs
fn collect_edges<const D: usize>(tria: &Triangulation<D>) -> BTreeSet<(usize, usize)> {
    let local = cell_edges(D);
    let mut edges = BTreeSet::new();
    for cell in tria.cells() {
        for &(a, b) in &local {
            let (va, vb) = (cell.vertex(a), cell.vertex(b));
            edges.insert((va.min(vb), va.max(vb)));
        }
    }
    edges
}

fn drawing_coords<const D: usize>(p: &Point<D>, projector: &ViewProjector) -> (f64, f64) {
    match D {
        1 => (p[0], 0.0),
        2 => (p[0], p[1]),
        _ => projector.project(&Point::xyz(
            p[0],
            p[1],
            p.coords().get(2).copied().unwrap_or(0.0),
        )),
    }
}
