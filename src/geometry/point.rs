use std::ops::{Add, AddAssign, Index, IndexMut, Mul, Sub};

/// A point (or vector) in `D`-dimensional space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point<const D: usize>(pub [f64; D]);

impl<const D: usize> Point<D> {
    pub fn new(coords: [f64; D]) -> Self {
        Self(coords)
    }

    pub fn origin() -> Self {
        Self([0.0; D])
    }

    pub fn coords(&self) -> &[f64; D] {
        &self.0
    }

    pub fn norm_square(&self) -> f64 {
        self.0.iter().map(|c| c * c).sum()
    }

    pub fn norm(&self) -> f64 {
        self.norm_square().sqrt()
    }

    pub fn distance(&self, other: &Self) -> f64 {
        (*self - *other).norm()
    }

    /// Arithmetic mean of a non-empty set of points
    pub fn average<'a>(points: impl IntoIterator<Item = &'a Point<D>>) -> Self {
        let mut sum = Self::origin();
        let mut count = 0usize;
        for p in points {
            sum += *p;
            count += 1;
        }
        if count == 0 { sum } else { sum * (1.0 / count as f64) }
    }
}

impl Point<2> {
    pub fn xy(x: f64, y: f64) -> Self {
        Self([x, y])
    }
}

impl Point<3> {
    pub fn xyz(x: f64, y: f64, z: f64) -> Self {
        Self([x, y, z])
    }
}

impl<const D: usize> Default for Point<D> {
    fn default() -> Self {
        Self::origin()
    }
}

impl<const D: usize> Index<usize> for Point<D> {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.0[i]
    }
}

impl<const D: usize> IndexMut<usize> for Point<D> {
    fn index_mut(&mut self, i: usize) -> &mut f64 {
        &mut self.0[i]
    }
}

impl<const D: usize> Add for Point<D> {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl<const D: usize> AddAssign for Point<D> {
    fn add_assign(&mut self, rhs: Self) {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a += b;
        }
    }
}

impl<const D: usize> Sub for Point<D> {
    type Output = Self;

    fn sub(mut self, rhs: Self) -> Self {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a -= b;
        }
        self
    }
}

impl<const D: usize> Mul<f64> for Point<D> {
    type Output = Self;

    fn mul(mut self, factor: f64) -> Self {
        for a in self.0.iter_mut() {
            *a *= factor;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic() {
        let a = Point::xy(1.0, 2.0);
        let b = Point::xy(3.0, -1.0);

        assert_eq!(a + b, Point::xy(4.0, 1.0));
        assert_eq!(b - a, Point::xy(2.0, -3.0));
        assert_eq!(a * 2.0, Point::xy(2.0, 4.0));
    }

    #[test]
    fn test_distance() {
        let a = Point::xyz(0.0, 0.0, 0.0);
        let b = Point::xyz(1.0, 2.0, 2.0);
        assert!((a.distance(&b) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_index_mut() {
        let mut p = Point::xy(0.0, 1.0);
        p[1] += 0.5;
        assert_eq!(p[1], 1.5);
    }

    #[test]
    fn test_average() {
        let pts = [Point::xy(0.0, 0.0), Point::xy(2.0, 0.0), Point::xy(2.0, 2.0), Point::xy(0.0, 2.0)];
        assert_eq!(Point::average(&pts), Point::xy(1.0, 1.0));
    }
}
