use serde::Deserialize;

/// Axis-aligned bounding box of projected drawing coordinates
#[derive(Debug, Clone)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Create bounds from a set of points
    pub fn from_points(points: &[(f64, f64)]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }

        let mut bounds = Self {
            min_x: f64::MAX,
            max_x: f64::MIN,
            min_y: f64::MAX,
            max_y: f64::MIN,
        };
        bounds.expand(points);
        Some(bounds)
    }

    /// Expand bounds to include another set of points
    pub fn expand(&mut self, points: &[(f64, f64)]) {
        for &(x, y) in points {
            self.min_x = self.min_x.min(x);
            self.max_x = self.max_x.max(x);
            self.min_y = self.min_y.min(y);
            self.max_y = self.max_y.max(y);
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// How the picture size is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeType {
    /// `size` is the picture width
    #[default]
    Width,
    /// `size` is the picture height
    Height,
}

/// Maps drawing coordinates to PostScript points
///
/// The lower-left corner of the bounds lands on the origin and the chosen
/// dimension is stretched to the target size. Aspect ratio is preserved.
#[derive(Debug, Clone)]
pub struct Scaler {
    /// Points per drawing unit
    scale: f64,
    offset_x: f64,
    offset_y: f64,
    width: f64,
    height: f64,
}

impl Scaler {
    pub fn fit(bounds: &Bounds, size: f64, size_type: SizeType) -> Self {
        let extent = match size_type {
            SizeType::Width => bounds.width(),
            SizeType::Height => bounds.height(),
        };

        let scale = if extent > 0.0 { size / extent } else { 1.0 };

        Self {
            scale,
            offset_x: -bounds.min_x * scale,
            offset_y: -bounds.min_y * scale,
            width: bounds.width() * scale,
            height: bounds.height() * scale,
        }
    }

    /// Scale a point to picture coordinates
    pub fn scale(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.scale + self.offset_x, y * self.scale + self.offset_y)
    }

    /// Picture extent in points
    pub fn picture_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_from_points() {
        let mut bounds = Bounds::from_points(&[(-1.0, 0.5), (4.0, -1.0)]).unwrap();
        assert_eq!((bounds.width(), bounds.height()), (5.0, 1.5));

        bounds.expand(&[(0.0, 2.5)]);
        assert_eq!(bounds.max_y, 2.5);
        assert_eq!(bounds.min_x, -1.0);
    }

    #[test]
    fn test_bounds_empty() {
        assert!(Bounds::from_points(&[]).is_none());
    }

    #[test]
    fn test_scaler_width() {
        let bounds = Bounds {
            min_x: 0.0,
            max_x: 10.0,
            min_y: 0.0,
            max_y: 1.0,
        };

        let scaler = Scaler::fit(&bounds, 300.0, SizeType::Width);

        assert_eq!(scaler.scale(10.0, 1.0), (300.0, 30.0));
        let (w, h) = scaler.picture_size();
        assert!((w - 300.0).abs() < 1e-9);
        assert!((h - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_scaler_offset() {
        let bounds = Bounds {
            min_x: -1.0,
            max_x: 1.0,
            min_y: -1.0,
            max_y: 1.0,
        };

        let scaler = Scaler::fit(&bounds, 100.0, SizeType::Height);
        let (x, y) = scaler.scale(-1.0, -1.0);
        assert!(x.abs() < 1e-12);
        assert!(y.abs() < 1e-12);
        let (x, y) = scaler.scale(1.0, 1.0);
        assert!((x - 100.0).abs() < 1e-9);
        assert!((y - 100.0).abs() < 1e-9);
    }
}
