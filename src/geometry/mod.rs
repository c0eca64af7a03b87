pub mod boundary;
pub mod point;
pub mod projection;
pub mod scaling;

pub use boundary::{Boundary, HyperBallBoundary, StraightBoundary};
pub use point::Point;
pub use projection::ViewProjector;
pub use scaling::{Bounds, Scaler, SizeType};
