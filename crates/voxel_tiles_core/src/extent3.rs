use crate::{ExtentN, Norm, Point3f, Point3i, PointN, Sphere3};

use itertools::iproduct;

pub type Extent3<T> = ExtentN<[T; 3]>;
/// A box of voxels.
pub type Extent3i = ExtentN<[i32; 3]>;
/// A box in object space.
pub type Extent3f = ExtentN<[f32; 3]>;

impl Extent3i {
    /// Every voxel in the extent, X varying fastest and Z slowest. This matches the layout of a `VolumeSource` buffer and
    /// of a chunk's texels.
    ///
    /// ```
    /// # use voxel_tiles_core::prelude::*;
    /// #
    /// let extent = Extent3i::from_min_and_shape(PointN([0, 0, 0]), PointN([2, 2, 1]));
    /// let points = extent.iter_points().collect::<Vec<_>>();
    /// assert_eq!(points, vec![
    ///     PointN([0, 0, 0]), PointN([1, 0, 0]), PointN([0, 1, 0]), PointN([1, 1, 0])
    /// ]);
    /// ```
    #[inline]
    pub fn iter_points(&self) -> impl Iterator<Item = Point3i> {
        let min = self.minimum;
        let lub = self.least_upper_bound();

        iproduct!(min.z()..lub.z(), min.y()..lub.y(), min.x()..lub.x()).map(|(z, y, x)| PointN([x, y, z]))
    }
}

impl From<Extent3i> for Extent3f {
    fn from(e: Extent3i) -> Self {
        Self::from_min_and_shape(Point3f::from(e.minimum), Point3f::from(e.shape))
    }
}

impl Extent3f {
    #[inline]
    pub fn center(&self) -> Point3f {
        self.minimum + self.shape * 0.5
    }

    /// The sphere centered on the box that passes through all 8 corners.
    #[inline]
    pub fn bounding_sphere(&self) -> Sphere3 {
        Sphere3 {
            center: self.center(),
            radius: 0.5 * self.shape.norm(),
        }
    }
}

// ████████╗███████╗███████╗████████╗███████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝
//    ██║   █████╗  ███████╗   ██║   ███████╗
//    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║
//    ██║   ███████╗███████║   ██║   ███████║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_are_visited_x_fastest() {
        let extent = Extent3i::from_min_and_shape(PointN([5, 0, -1]), PointN([2, 1, 2]));

        let points: Vec<_> = extent.iter_points().collect();

        assert_eq!(
            points,
            vec![
                PointN([5, 0, -1]),
                PointN([6, 0, -1]),
                PointN([5, 0, 0]),
                PointN([6, 0, 0]),
            ]
        );
    }

    #[test]
    fn empty_extent_has_no_points() {
        let extent = Extent3i::from_min_and_shape(PointN([0, 0, 0]), PointN([3, 0, 3]));

        assert_eq!(extent.iter_points().count(), 0);
    }

    #[test]
    fn bounding_sphere_reaches_corners() {
        let extent = Extent3f::from_min_and_shape(PointN([1.0, 1.0, 1.0]), PointN([2.0, 2.0, 2.0]));
        let sphere = extent.bounding_sphere();

        assert_eq!(sphere.center, PointN([2.0, 2.0, 2.0]));
        assert!((sphere.radius - 3.0f32.sqrt()).abs() < 1e-6);
        let corner = extent.least_upper_bound();
        assert!(((corner - sphere.center).norm() - sphere.radius).abs() < 1e-5);
    }
}
