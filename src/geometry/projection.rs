use super::Point;

/// Oblique parallel projection of 3D points onto a drawing plane
///
/// The view is described by two angles in degrees:
/// - `azimuth`: angle between the viewing direction and the vertical axis
/// - `turn`: rotation of the viewer around the vertical axis
#[derive(Debug, Clone)]
pub struct ViewProjector {
    right: Point<3>,
    up: Point<3>,
}

impl ViewProjector {
    pub fn new(azimuth_deg: f64, turn_deg: f64) -> Self {
        let (sin_z, cos_z) = azimuth_deg.to_radians().sin_cos();
        let (sin_t, cos_t) = turn_deg.to_radians().sin_cos();

        Self {
            right: Point::xyz(cos_t, sin_t, 0.0),
            up: Point::xyz(sin_t * cos_z, -cos_t * cos_z, sin_z),
        }
    }

    /// Project a 3D point to drawing-plane coordinates
    pub fn project(&self, p: &Point<3>) -> (f64, f64) {
        (dot(p, &self.right), dot(p, &self.up))
    }
}

impl Default for ViewProjector {
    fn default() -> Self {
        Self::new(60.0, 30.0)
    }
}

fn dot(a: &Point<3>, b: &Point<3>) -> f64 {
    a.0.iter().zip(b.0.iter()).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projector_origin() {
        let proj = ViewProjector::default();
        let (x, y) = proj.project(&Point::xyz(0.0, 0.0, 0.0));
        assert!(x.abs() < 1e-12);
        assert!(y.abs() < 1e-12);
    }

    #[test]
    fn test_top_view_keeps_plane() {
        // Looking straight down (azimuth 0) with no turn shows x to the right
        let proj = ViewProjector::new(0.0, 0.0);
        let (x, y) = proj.project(&Point::xyz(2.0, 3.0, 5.0));
        assert!((x - 2.0).abs() < 1e-12);
        assert!((y + 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_vertical_axis_points_up() {
        let proj = ViewProjector::default();
        let (_, y) = proj.project(&Point::xyz(0.0, 0.0, 1.0));
        assert!(y > 0.0);
    }
}
