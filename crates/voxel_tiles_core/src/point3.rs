use crate::{Axis3, Point, Point2, PointN};

use core::ops::Div;

/// A 3-dimensional point with scalar type `T`.
pub type Point3<T> = PointN<[T; 3]>;
/// A voxel coordinate or a voxel-space shape.
pub type Point3i = PointN<[i32; 3]>;
/// An object-space position or direction.
pub type Point3f = PointN<[f32; 3]>;

impl<T> Point3<T>
where
    T: Copy,
{
    #[inline]
    pub fn x(&self) -> T {
        self.0[0]
    }

    #[inline]
    pub fn y(&self) -> T {
        self.0[1]
    }

    #[inline]
    pub fn z(&self) -> T {
        self.0[2]
    }

    #[inline]
    pub fn on_axis(&self, axis: Axis3) -> T {
        self.0[axis.index()]
    }

    #[inline]
    pub fn at_mut(&mut self, axis: Axis3) -> &mut T {
        &mut self.0[axis.index()]
    }

    /// Projects the point onto the page plane of `normal`, as `(horizontal, vertical)` components.
    #[inline]
    pub fn in_plane(&self, normal: Axis3) -> Point2<T> {
        let (h, v) = normal.plane_axes();

        PointN([self.on_axis(h), self.on_axis(v)])
    }

    /// Returns a copy of `self` with the component on `axis` replaced by `value`.
    #[inline]
    pub fn with_axis(&self, axis: Axis3, value: T) -> Self {
        let mut p = *self;
        *p.at_mut(axis) = value;

        p
    }
}

impl Point3f {
    pub fn cross(&self, other: &Self) -> Self {
        PointN([
            self.y() * other.z() - self.z() * other.y(),
            self.z() * other.x() - self.x() * other.z(),
            self.x() * other.y() - self.y() * other.x(),
        ])
    }

    /// Returns the unit vector in the same direction, or `self` if the norm is zero.
    pub fn normalized(&self) -> Self {
        let norm = crate::Norm::norm(self);
        if norm > 0.0 {
            *self / norm
        } else {
            *self
        }
    }

    /// Component-wise linear interpolation. `t = 0` gives `self`, `t = 1` gives `other`.
    #[inline]
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        *self + (*other - *self) * t
    }

    /// Returns the axis along which the magnitude of `self` is greatest. Ties prefer X, then Y.
    pub fn dominant_axis(&self) -> Axis3 {
        let a = self.abs();
        if a.x() >= a.y() && a.x() >= a.z() {
            Axis3::X
        } else if a.y() >= a.z() {
            Axis3::Y
        } else {
            Axis3::Z
        }
    }
}

impl Div<f32> for Point3f {
    type Output = Self;

    #[inline]
    fn div(self, rhs: f32) -> Self {
        self.map_components(|c| c / rhs)
    }
}

/// Component-wise quotient.
impl Div for Point3f {
    type Output = Self;

    #[inline]
    fn div(self, rhs: Self) -> Self {
        self.zip_with(&rhs, |a, b| a / b)
    }
}

impl From<Point3i> for Point3f {
    #[inline]
    fn from(p: Point3i) -> Self {
        PointN([p.x() as f32, p.y() as f32, p.z() as f32])
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
    fn dominant_axis_picks_largest_magnitude() {
        assert_eq!(Point3f::dominant_axis(&PointN([0.1, -0.9, 0.3])), Axis3::Y);
        assert_eq!(Point3f::dominant_axis(&PointN([0.0, 0.2, -0.7])), Axis3::Z);
        assert_eq!(Point3f::dominant_axis(&PointN([-1.0, 1.0, 0.0])), Axis3::X);
    }

    #[test]
    fn in_plane_uses_page_axes() {
        let p = PointN([1, 2, 3]);

        assert_eq!(p.in_plane(Axis3::X), PointN([3, 2]));
        assert_eq!(p.in_plane(Axis3::Y), PointN([1, 3]));
        assert_eq!(p.in_plane(Axis3::Z), PointN([1, 2]));
        assert_eq!(p.with_axis(Axis3::Y, 7), PointN([1, 7, 3]));
    }

    #[test]
    fn cross_follows_right_hand_rule() {
        let x: Point3f = PointN([1.0, 0.0, 0.0]);
        let y: Point3f = PointN([0.0, 1.0, 0.0]);

        assert_eq!(x.cross(&y), PointN([0.0, 0.0, 1.0]));
        assert_eq!(y.cross(&x), PointN([0.0, 0.0, -1.0]));
    }

    #[test]
    fn lerp_midpoint() {
        let a: Point3f = PointN([0.0, 2.0, 4.0]);
        let b = PointN([2.0, 2.0, 0.0]);

        assert_eq!(a.lerp(&b, 0.5), PointN([1.0, 2.0, 2.0]));
    }
}
