use crate::{DotProduct, Point3f};

/// A sphere in object space, usually the bounding sphere of a cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere3 {
    pub center: Point3f,
    pub radius: f32,
}

impl Sphere3 {
    /// The signed distance from the plane through `origin` with unit `normal` to the center of the sphere.
    #[inline]
    pub fn center_distance_along(&self, origin: Point3f, normal: Point3f) -> f32 {
        (self.center - origin).dot(&normal)
    }
}
