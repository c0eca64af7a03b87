use super::Point;
use std::fmt::Debug;

/// Description of a (possibly curved) boundary
///
/// During refinement, every new vertex that lies on a boundary face is placed by
/// the description attached to that face's boundary indicator. `parents` are the
/// vertices spanning the sub-entity the new vertex is created for: two for an
/// edge midpoint, four for a face center.
pub trait Boundary<const D: usize>: Debug + Send + Sync {
    fn new_point(&self, parents: &[Point<D>]) -> Point<D>;
}

/// Flat boundary: new points are the average of their parents
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightBoundary;

impl<const D: usize> Boundary<D> for StraightBoundary {
    fn new_point(&self, parents: &[Point<D>]) -> Point<D> {
        Point::average(parents)
    }
}

/// Circle (2D) or sphere (3D) boundary
///
/// New points are the parent average pushed radially out to `radius`.
#[derive(Debug, Clone, Copy)]
pub struct HyperBallBoundary<const D: usize> {
    pub center: Point<D>,
    pub radius: f64,
}

impl<const D: usize> HyperBallBoundary<D> {
    pub fn new(center: Point<D>, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Project a point radially onto the ball surface
    pub fn project(&self, p: Point<D>) -> Point<D> {
        let offset = p - self.center;
        let len = offset.norm();
        if len > 1e-12 {
            self.center + offset * (self.radius / len)
        } else {
            p
        }
    }
}

impl<const D: usize> Boundary<D> for HyperBallBoundary<D> {
    fn new_point(&self, parents: &[Point<D>]) -> Point<D> {
        self.project(Point::average(parents))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_straight_midpoint() {
        let b = StraightBoundary;
        let p = b.new_point(&[Point::xy(0.0, 0.0), Point::xy(2.0, 0.0)]);
        assert_eq!(p, Point::xy(1.0, 0.0));
    }

    #[test]
    fn test_hyper_ball_midpoint_on_circle() {
        let b = HyperBallBoundary::new(Point::xy(0.0, 0.0), 0.25);
        let p = b.new_point(&[Point::xy(0.25, 0.0), Point::xy(0.0, 0.25)]);

        assert!((p.norm() - 0.25).abs() < 1e-12);
        assert!((p[0] - p[1]).abs() < 1e-12);
    }

    #[test]
    fn test_hyper_ball_off_center() {
        let b = HyperBallBoundary::new(Point::xy(1.0, 1.0), 2.0);
        let p = b.project(Point::xy(1.0, 2.0));
        assert!((p[1] - 3.0).abs() < 1e-12);
    }
}
