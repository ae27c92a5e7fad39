use crate::PointN;

/// A 2-dimensional point with scalar type `T`. Within a texture page, `x` is the horizontal and `y` the vertical axis.
pub type Point2<T> = PointN<[T; 2]>;
pub type Point2i = PointN<[i32; 2]>;

impl<T> Point2<T>
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
}
