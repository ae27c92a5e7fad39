use crate::int_math::{is_pow2, next_pow2};

use core::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use num::Integer;
use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An N-dimensional point, wrapping a primitive array `[T; N]`. Voxel coordinates are `Point3i`, object-space coordinates
/// are `Point3f`, and positions within a 2D texture page are `Point2i`.
///
/// ```
/// use voxel_tiles_core::PointN;
///
/// let p1 = PointN([1, 2, 3]);
/// let p2 = PointN([3, 4, 5]);
///
/// assert_eq!(p1 + p2, PointN([4, 6, 8]));
/// assert_eq!(p1 - p2, PointN([-2, -2, -2]));
/// assert_eq!(p1 * 2, PointN([2, 4, 6]));
/// ```
///
/// Points are partially ordered: `a < b` iff every component of `a` is less than the same component of `b`. So a voxel `p`
/// is in a cell iff `min <= p && p < least_upper_bound`:
///
/// ```
/// use voxel_tiles_core::PointN;
///
/// let min = PointN([0, 0, 0]);
/// let least_upper_bound = PointN([4, 4, 4]);
///
/// assert!(min <= PointN([0, 1, 3]) && PointN([0, 1, 3]) < least_upper_bound);
/// assert!(!(PointN([0, 4, 3]) < least_upper_bound));
/// ```
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct PointN<N>(pub N);

impl<T, const N: usize> PointN<[T; N]>
where
    T: Copy,
{
    /// Combines matching components of `self` and `other` with `f`.
    #[inline]
    pub fn zip_with(&self, other: &Self, f: impl Fn(T, T) -> T) -> Self {
        let mut out = self.0;
        for (c, &o) in out.iter_mut().zip(other.0.iter()) {
            *c = f(*c, o);
        }

        PointN(out)
    }

    #[inline]
    fn all_pairs(&self, other: &Self, f: impl Fn(T, T) -> bool) -> bool {
        self.0.iter().zip(other.0.iter()).all(|(&a, &b)| f(a, b))
    }
}

/// The operations shared by points of every dimension and scalar type.
pub trait Point:
    Add<Output = Self>
    + Copy
    + Mul<<Self as Point>::Scalar, Output = Self>
    + Mul<Self, Output = Self>
    + Ones
    + PartialOrd
    + Sized
    + SmallZero
    + Sub<Output = Self>
{
    type Scalar: Copy;

    /// A point with every component set to `value`.
    fn fill(value: Self::Scalar) -> Self;

    fn abs(&self) -> Self;

    /// The component at `component_index`, where X = 0, Y = 1, Z = 2.
    fn at(&self, component_index: usize) -> Self::Scalar;

    fn map_components(&self, f: impl Fn(Self::Scalar) -> Self::Scalar) -> Self;

    /// The product of all components.
    fn volume(&self) -> Self::Scalar;
}

macro_rules! impl_point_for_scalar {
    ($scalar:ty) => {
        impl<const N: usize> Point for PointN<[$scalar; N]> {
            type Scalar = $scalar;

            #[inline]
            fn fill(value: $scalar) -> Self {
                PointN([value; N])
            }

            #[inline]
            fn abs(&self) -> Self {
                self.map_components(|c| c.abs())
            }

            #[inline]
            fn at(&self, component_index: usize) -> $scalar {
                self.0[component_index]
            }

            #[inline]
            fn map_components(&self, f: impl Fn($scalar) -> $scalar) -> Self {
                let mut out = self.0;
                for c in out.iter_mut() {
                    *c = f(*c);
                }

                PointN(out)
            }

            #[inline]
            fn volume(&self) -> $scalar {
                self.0.iter().product()
            }
        }

        impl<const N: usize> NormSquared for PointN<[$scalar; N]> {
            #[inline]
            fn norm_squared(&self) -> f32 {
                self.dot(self) as f32
            }
        }
    };
}

impl_point_for_scalar!(i32);
impl_point_for_scalar!(f32);

impl<T, const N: usize> Add for PointN<[T; N]>
where
    T: Copy + Add<Output = T>,
{
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        self.zip_with(&rhs, |a, b| a + b)
    }
}

impl<T, const N: usize> Sub for PointN<[T; N]>
where
    T: Copy + Sub<Output = T>,
{
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self.zip_with(&rhs, |a, b| a - b)
    }
}

/// Scales every component.
impl<T, const N: usize> Mul<T> for PointN<[T; N]>
where
    T: Copy + Mul<Output = T>,
{
    type Output = Self;

    #[inline]
    fn mul(self, rhs: T) -> Self {
        let mut out = self.0;
        for c in out.iter_mut() {
            *c = *c * rhs;
        }

        PointN(out)
    }
}

/// Component-wise product.
impl<T, const N: usize> Mul for PointN<[T; N]>
where
    T: Copy + Mul<Output = T>,
{
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        self.zip_with(&rhs, |a, b| a * b)
    }
}

impl<T, const N: usize> Neg for PointN<[T; N]>
where
    T: Copy + Neg<Output = T>,
{
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        let mut out = self.0;
        for c in out.iter_mut() {
            *c = -*c;
        }

        PointN(out)
    }
}

impl<T, const N: usize> AddAssign for PointN<[T; N]>
where
    T: Copy + Add<Output = T>,
{
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<T, const N: usize> SubAssign for PointN<[T; N]>
where
    T: Copy + Sub<Output = T>,
{
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

// Only `<`, `<=`, `>` and `>=` are meaningful, and they hold only when they hold for every component.
impl<T, const N: usize> PartialOrd for PointN<[T; N]>
where
    T: Copy + PartialOrd,
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            Some(Ordering::Equal)
        } else if self.all_pairs(other, |a, b| a <= b) {
            Some(Ordering::Less)
        } else if self.all_pairs(other, |a, b| a >= b) {
            Some(Ordering::Greater)
        } else {
            None
        }
    }

    #[inline]
    fn lt(&self, other: &Self) -> bool {
        self.all_pairs(other, |a, b| a < b)
    }

    #[inline]
    fn gt(&self, other: &Self) -> bool {
        self.all_pairs(other, |a, b| a > b)
    }

    #[inline]
    fn le(&self, other: &Self) -> bool {
        self.all_pairs(other, |a, b| a <= b)
    }

    #[inline]
    fn ge(&self, other: &Self) -> bool {
        self.all_pairs(other, |a, b| a >= b)
    }
}

pub trait Ones: Copy {
    const ONES: Self;
}

impl<T, const N: usize> Ones for PointN<[T; N]>
where
    T: SmallOne,
{
    const ONES: Self = PointN([T::ONE; N]);
}

pub trait NormSquared {
    fn norm_squared(&self) -> f32;
}

pub trait Norm {
    fn norm(&self) -> f32;
}

impl<T> Norm for T
where
    T: NormSquared,
{
    #[inline]
    fn norm(&self) -> f32 {
        self.norm_squared().sqrt()
    }
}

pub trait DotProduct {
    type Scalar: Copy;

    fn dot(&self, other: &Self) -> Self::Scalar;
}

impl<T, const N: usize> DotProduct for PointN<[T; N]>
where
    T: Copy + SmallZero + Add<Output = T> + Mul<Output = T>,
{
    type Scalar = T;

    #[inline]
    fn dot(&self, other: &Self) -> T {
        self.0
            .iter()
            .zip(other.0.iter())
            .fold(T::ZERO, |sum, (&a, &b)| sum + a * b)
    }
}

pub trait IntegerPoint: Point<Scalar = i32> + Eq {
    /// Component-wise maximum.
    fn join(&self, other: &Self) -> Self;

    /// Component-wise minimum.
    fn meet(&self, other: &Self) -> Self;

    /// Component-wise division, rounding up. This is the number of cells of shape `rhs` needed to cover `self`.
    fn div_ceil(&self, rhs: &Self) -> Self;

    fn dimensions_are_powers_of_2(&self) -> bool;

    /// Rounds each dimension up to a power of 2, the shape of the texture that holds a cell.
    fn next_powers_of_2(&self) -> Self;
}

impl<const N: usize> IntegerPoint for PointN<[i32; N]> {
    #[inline]
    fn join(&self, other: &Self) -> Self {
        self.zip_with(other, std::cmp::max)
    }

    #[inline]
    fn meet(&self, other: &Self) -> Self {
        self.zip_with(other, std::cmp::min)
    }

    #[inline]
    fn div_ceil(&self, rhs: &Self) -> Self {
        self.zip_with(rhs, |a, b| Integer::div_ceil(&a, &b))
    }

    #[inline]
    fn dimensions_are_powers_of_2(&self) -> bool {
        self.0.iter().all(|&c| is_pow2(c))
    }

    #[inline]
    fn next_powers_of_2(&self) -> Self {
        self.map_components(next_pow2)
    }
}

// Usable in const contexts, unlike `num::Zero`.
pub trait SmallZero: Copy {
    const ZERO: Self;
}

pub trait SmallOne: Copy {
    const ONE: Self;
}

impl SmallZero for i32 {
    const ZERO: i32 = 0;
}
impl SmallOne for i32 {
    const ONE: i32 = 1;
}

impl SmallZero for f32 {
    const ZERO: f32 = 0.0;
}
impl SmallOne for f32 {
    const ONE: f32 = 1.0;
}

impl<T, const N: usize> SmallZero for PointN<[T; N]>
where
    T: SmallZero,
{
    const ZERO: Self = PointN([T::ZERO; N]);
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
    fn partial_order_needs_every_component() {
        let a = PointN([1, 2]);

        assert!(a < PointN([2, 3]));
        assert!(!(a < PointN([2, 2])));
        assert!(a <= PointN([2, 2]));
        assert_eq!(a.partial_cmp(&PointN([0, 3])), None);
        assert_eq!(a.partial_cmp(&a), Some(Ordering::Equal));
    }

    #[test]
    fn integer_point_ops() {
        let shape = PointN([5, 4, 1]);

        assert_eq!(shape.div_ceil(&PointN([2, 2, 2])), PointN([3, 2, 1]));
        assert_eq!(shape.next_powers_of_2(), PointN([8, 4, 1]));
        assert!(!shape.dimensions_are_powers_of_2());
        assert_eq!(shape.join(&PointN([6, 0, 0])), PointN([6, 4, 1]));
        assert_eq!(shape.meet(&PointN([6, 0, 0])), PointN([5, 0, 0]));
        assert_eq!(shape.volume(), 20);
    }

    #[test]
    fn dot_and_norm() {
        let p: PointN<[f32; 3]> = PointN([3.0, 4.0, 0.0]);

        assert_eq!(p.dot(&PointN([1.0, 1.0, 1.0])), 7.0);
        assert_eq!(p.norm(), 5.0);
        assert_eq!(PointN([3, 4]).norm(), 5.0);
    }
}
