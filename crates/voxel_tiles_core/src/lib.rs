//! The core data types for tiling a voxel volume into texture-sized cells:
//! - `PointN`: an N-dimensional point, most importantly `Point3i` (voxel space) and `Point3f` (object space)
//! - `ExtentN`: an N-dimensional extent, most importantly `Extent3i` and `Extent3f`
//! - `CellGrid`: the grid of boundary-cropped cells that covers a volume

pub mod axis;
pub mod extent;
pub mod extent3;
pub mod int_math;
pub mod point;
pub mod point2;
pub mod point3;
pub mod sphere;
pub mod subdivide;

pub use axis::Axis3;
pub use extent::ExtentN;
pub use extent3::{Extent3, Extent3f, Extent3i};
pub use point::{DotProduct, IntegerPoint, Norm, NormSquared, Ones, Point, PointN, SmallZero};
pub use point2::{Point2, Point2i};
pub use point3::{Point3, Point3f, Point3i};
pub use sphere::Sphere3;
pub use subdivide::{CellGrid, CellIndex};

pub use num;

pub mod prelude {
    pub use super::{
        Axis3, CellGrid, CellIndex, DotProduct, Extent3, Extent3f, Extent3i, ExtentN,
        IntegerPoint, Norm, NormSquared, Ones, Point, Point2, Point2i, Point3, Point3f,
        Point3i, PointN, SmallZero, Sphere3,
    };
}
