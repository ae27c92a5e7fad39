use crate::{IntegerPoint, Ones, Point, PointN, SmallZero};

use core::ops::Add;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An axis-aligned box in N dimensions: the product of one half-open interval `[minimum, minimum + shape)` per axis. The
/// volume, each cell of a `CellGrid` and each texture page are all extents.
///
/// ```
/// use voxel_tiles_core::prelude::*;
///
/// let cell = Extent3i::from_min_and_shape(PointN([4, 0, 0]), PointN([4, 4, 4]));
///
/// assert!(cell.contains(PointN([7, 3, 0])));
/// assert!(!cell.contains(PointN([8, 3, 0])));
/// assert_eq!(cell.least_upper_bound(), PointN([8, 4, 4]));
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct ExtentN<N> {
    pub minimum: PointN<N>,
    /// Length along each axis. Never negative when built through the integer constructors.
    pub shape: PointN<N>,
}

impl<N> ExtentN<N> {
    #[inline]
    pub fn from_min_and_shape(minimum: PointN<N>, shape: PointN<N>) -> Self {
        Self { minimum, shape }
    }
}

impl<N> ExtentN<N>
where
    PointN<N>: Point,
{
    #[inline]
    pub fn volume(&self) -> <PointN<N> as Point>::Scalar {
        self.shape.volume()
    }

    /// One past the greatest point on every axis.
    #[inline]
    pub fn least_upper_bound(&self) -> PointN<N> {
        self.minimum + self.shape
    }

    #[inline]
    pub fn contains(&self, p: PointN<N>) -> bool {
        self.minimum <= p && p < self.least_upper_bound()
    }
}

impl<N> ExtentN<N>
where
    PointN<N>: IntegerPoint,
{
    #[inline]
    pub fn num_points(&self) -> usize {
        self.volume() as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_points() == 0
    }

    /// Builds the extent spanning `[minimum, least_upper_bound)`. Axes where the bound is below the minimum get a zero
    /// length.
    #[inline]
    pub fn from_min_and_lub(minimum: PointN<N>, least_upper_bound: PointN<N>) -> Self {
        let shape = (least_upper_bound - minimum).join(&PointN::ZERO);

        Self { minimum, shape }
    }

    /// Builds the extent spanning `[minimum, max]`, both ends included.
    #[inline]
    pub fn from_min_and_max(minimum: PointN<N>, max: PointN<N>) -> Self {
        Self::from_min_and_lub(minimum, max + PointN::ONES)
    }

    /// The points in both `self` and `other`. Disjoint extents give an empty extent at the larger minimum.
    #[inline]
    pub fn intersection(&self, other: &Self) -> Self {
        Self::from_min_and_lub(
            self.minimum.join(&other.minimum),
            self.least_upper_bound().meet(&other.least_upper_bound()),
        )
    }

    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        !self.intersection(other).is_empty()
    }

    #[inline]
    pub fn is_subset_of(&self, other: &Self) -> bool {
        let i = self.intersection(other);

        i.minimum == self.minimum && i.shape == self.shape
    }
}

/// Translates the extent.
impl<N> Add<PointN<N>> for ExtentN<N>
where
    PointN<N>: Add<Output = PointN<N>>,
{
    type Output = Self;

    #[inline]
    fn add(self, offset: PointN<N>) -> Self {
        Self {
            minimum: self.minimum + offset,
            shape: self.shape,
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
    use crate::{Extent3i, Point2i};

    use super::*;

    #[test]
    fn disjoint_extents_have_empty_intersection() {
        let a = Extent3i::from_min_and_max(PointN([0; 3]), PointN([1; 3]));
        let b = Extent3i::from_min_and_max(PointN([3; 3]), PointN([4; 3]));

        assert_eq!(a.intersection(&b).shape, PointN([0; 3]));
        assert!(!a.intersects(&b));
    }

    #[test]
    fn partial_overlap() {
        let a = Extent3i::from_min_and_shape(PointN([0, 0, 0]), PointN([4, 4, 4]));
        let b = Extent3i::from_min_and_shape(PointN([2, -1, 3]), PointN([4, 2, 4]));

        assert_eq!(
            a.intersection(&b),
            Extent3i::from_min_and_shape(PointN([2, 0, 3]), PointN([2, 1, 1]))
        );
        assert!(!b.is_subset_of(&a));
        assert!(a.intersection(&b).is_subset_of(&a));
    }

    #[test]
    fn translated_extent_is_not_subset() {
        let e = ExtentN::from_min_and_shape(Point2i::fill(-2), Point2i::fill(5));

        assert!(e.is_subset_of(&e));
        assert!(!(e + PointN([1, 0])).is_subset_of(&e));
    }
}
