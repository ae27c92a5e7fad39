//! Clipping convex polygons against the six faces of a cell.
//!
//! Polygons are clipped in voxel space, one plane at a time (Sutherland-Hodgman). Every vertex carries a 3D texture
//! coordinate, and a vertex introduced on a plane gets its texture coordinate from the same interpolation parameter as its
//! position.
//!
//! ```
//! use voxel_tiles_core::prelude::*;
//! use voxel_tiles_render::prelude::*;
//!
//! let cell = Extent3i::from_min_and_shape(PointN([0, 0, 0]), PointN([2, 2, 2]));
//! let clipper = SliceClipper::new(&cell, PointN([2.0, 2.0, 2.0]));
//!
//! // A quad through the middle of the cell, much bigger than the cell.
//! let quad = [
//!     PointN([-5.0, -5.0, 1.0]),
//!     PointN([5.0, -5.0, 1.0]),
//!     PointN([5.0, 5.0, 1.0]),
//!     PointN([-5.0, 5.0, 1.0]),
//! ];
//! let clipped = clipper.clip(&quad).unwrap();
//!
//! assert_eq!(clipped.len(), 4);
//! for v in clipped.vertices.iter() {
//!     assert_eq!(v.tex_coord.z(), 0.5);
//! }
//! ```

use voxel_tiles_core::prelude::*;

/// Points this close to the outside of a plane still count as inside.
const PLANE_EPSILON: f32 = 1e-5;

/// A polygon vertex with its texture coordinate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipVertex {
    pub position: Point3f,
    pub tex_coord: Point3f,
}

impl ClipVertex {
    #[inline]
    pub fn new(position: Point3f, tex_coord: Point3f) -> Self {
        Self {
            position,
            tex_coord,
        }
    }

    #[inline]
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            position: self.position.lerp(&other.position, t),
            tex_coord: self.tex_coord.lerp(&other.tex_coord, t),
        }
    }
}

/// A half-space: the points `p` with `normal · p >= distance` are inside.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub normal: Point3f,
    pub distance: f32,
}

impl Plane {
    pub fn from_normal_and_point(normal: Point3f, point: Point3f) -> Self {
        Self {
            normal,
            distance: normal.dot(&point),
        }
    }

    /// Positive inside, negative outside.
    #[inline]
    pub fn signed_distance(&self, p: Point3f) -> f32 {
        self.normal.dot(&p) - self.distance
    }

    #[inline]
    pub fn contains(&self, p: Point3f) -> bool {
        self.signed_distance(p) >= -PLANE_EPSILON
    }
}

/// The six inward-facing planes bounding `extent`.
pub fn box_planes(extent: &Extent3f) -> [Plane; 6] {
    let min = extent.minimum;
    let lub = extent.least_upper_bound();
    let mut planes = [Plane {
        normal: Point3f::ZERO,
        distance: 0.0,
    }; 6];
    for axis in Axis3::ALL.iter().cloned() {
        let n = Point3f::from(axis.get_unit_vector());
        planes[2 * axis.index()] = Plane::from_normal_and_point(n, min);
        planes[2 * axis.index() + 1] = Plane::from_normal_and_point(n * -1.0, lub);
    }

    planes
}

/// The part of a polygon that survived clipping. Always has at least 3 vertices.
#[derive(Clone, Debug, PartialEq)]
pub struct ClippedPolygon {
    pub vertices: Vec<ClipVertex>,
}

impl ClippedPolygon {
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Applies `f` to every vertex position, leaving texture coordinates alone.
    pub fn map_positions(mut self, f: impl Fn(Point3f) -> Point3f) -> Self {
        for v in self.vertices.iter_mut() {
            v.position = f(v.position);
        }

        self
    }

    /// Applies `f` to every texture coordinate.
    pub fn map_tex_coords(mut self, f: impl Fn(Point3f) -> Point3f) -> Self {
        for v in self.vertices.iter_mut() {
            v.tex_coord = f(v.tex_coord);
        }

        self
    }
}

/// Clips the convex polygon `vertices` against every plane in turn. Returns `None` if fewer than 3 vertices remain.
pub fn clip_polygon(vertices: &[ClipVertex], planes: &[Plane]) -> Option<ClippedPolygon> {
    if vertices.len() < 3 {
        return None;
    }

    let mut input: Vec<ClipVertex> = vertices.to_vec();
    let mut output = Vec::with_capacity(vertices.len() + planes.len());
    for plane in planes.iter() {
        output.clear();
        let n = input.len();
        for i in 0..n {
            let prev = input[(i + n - 1) % n];
            let cur = input[i];
            let d_prev = plane.signed_distance(prev.position);
            let d_cur = plane.signed_distance(cur.position);
            let prev_in = d_prev >= -PLANE_EPSILON;
            let cur_in = d_cur >= -PLANE_EPSILON;

            if cur_in != prev_in {
                let t = d_prev / (d_prev - d_cur);
                output.push(prev.lerp(&cur, t));
            }
            if cur_in {
                output.push(cur);
            }
        }
        core::mem::swap(&mut input, &mut output);
        if input.len() < 3 {
            return None;
        }
    }

    Some(ClippedPolygon { vertices: input })
}

/// Clips polygons against one cell and assigns them texture coordinates for that cell's chunk.
#[derive(Clone, Debug)]
pub struct SliceClipper {
    origin: Point3f,
    texture_dims_modded: Point3f,
    planes: [Plane; 6],
}

impl SliceClipper {
    /// `texture_dims_modded` is the chunk's texture shape, plus one on every padded axis (see
    /// `TextureChunk::texture_dims_modded`). Coordinates are in voxel space.
    pub fn new(cell: &Extent3i, texture_dims_modded: Point3f) -> Self {
        assert!(!cell.is_empty(), "cannot clip against empty cell {:?}", cell);

        let bounds = Extent3f::from(*cell);

        Self {
            origin: bounds.minimum,
            texture_dims_modded,
            planes: box_planes(&bounds),
        }
    }

    #[inline]
    pub fn planes(&self) -> &[Plane; 6] {
        &self.planes
    }

    #[inline]
    pub fn tex_coord(&self, p: Point3f) -> Point3f {
        (p - self.origin) / self.texture_dims_modded
    }

    /// Clips the convex polygon with voxel-space corners `polygon`.
    pub fn clip(&self, polygon: &[Point3f]) -> Option<ClippedPolygon> {
        let vertices: Vec<ClipVertex> = polygon
            .iter()
            .map(|&p| ClipVertex::new(p, self.tex_coord(p)))
            .collect();

        clip_polygon(&vertices, &self.planes)
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

    use pretty_assertions::assert_eq;

    fn unit_cell_planes() -> [Plane; 6] {
        box_planes(&Extent3f::from_min_and_shape(Point3f::ZERO, Point3f::fill(1.0)))
    }

    fn vertex(p: [f32; 3], t: [f32; 3]) -> ClipVertex {
        ClipVertex::new(PointN(p), PointN(t))
    }

    #[test]
    fn polygon_inside_is_unchanged() {
        let triangle = vec![
            vertex([0.2, 0.2, 0.5], [0.0, 0.0, 0.0]),
            vertex([0.8, 0.2, 0.5], [1.0, 0.0, 0.0]),
            vertex([0.5, 0.8, 0.5], [0.0, 1.0, 0.0]),
        ];

        let clipped = clip_polygon(&triangle, &unit_cell_planes()).unwrap();

        assert_eq!(clipped.len(), 3);
        for v in triangle.iter() {
            assert!(clipped.vertices.contains(v));
        }
    }

    #[test]
    fn polygon_outside_is_none() {
        let triangle = vec![
            vertex([2.0, 2.0, 2.0], [0.0; 3]),
            vertex([3.0, 2.0, 2.0], [0.0; 3]),
            vertex([2.0, 3.0, 2.0], [0.0; 3]),
        ];

        assert_eq!(clip_polygon(&triangle, &unit_cell_planes()), None);
    }

    #[test]
    fn straddling_one_face_adds_one_vertex() {
        // One corner sticks out through x = 1. The plane cuts both of its edges halfway.
        let triangle = vec![
            vertex([0.5, 0.2, 0.5], [0.0, 0.0, 0.0]),
            vertex([1.5, 0.5, 0.5], [1.0, 0.0, 0.0]),
            vertex([0.5, 0.8, 0.5], [0.0, 1.0, 0.0]),
        ];

        let clipped = clip_polygon(&triangle, &unit_cell_planes()).unwrap();

        assert_eq!(clipped.len(), 4);
        let on_plane: Vec<_> = clipped
            .vertices
            .iter()
            .filter(|v| (v.position.x() - 1.0).abs() < 1e-6)
            .cloned()
            .collect();
        assert_eq!(on_plane.len(), 2);
        for v in on_plane.iter() {
            // The midpoint of each cut edge gets the mean of its endpoints' texture coordinates.
            assert!((v.tex_coord.x() - 0.5).abs() < 1e-6);
        }
        assert!(on_plane
            .iter()
            .any(|v| (v.position.y() - 0.35).abs() < 1e-6 && v.tex_coord.y() == 0.0));
        assert!(on_plane
            .iter()
            .any(|v| (v.position.y() - 0.65).abs() < 1e-6 && (v.tex_coord.y() - 0.5).abs() < 1e-6));
    }

    #[test]
    fn degenerate_input_is_none() {
        let segment = vec![vertex([0.5; 3], [0.0; 3]), vertex([0.6; 3], [0.0; 3])];

        assert_eq!(clip_polygon(&segment, &unit_cell_planes()), None);
    }

    #[test]
    fn big_quad_is_cut_to_cell_cross_section() {
        let cell = Extent3i::from_min_and_shape(PointN([2, 2, 2]), PointN([2, 2, 2]));
        let clipper = SliceClipper::new(&cell, PointN([2.0, 2.0, 2.0]));
        let quad = [
            PointN([-10.0, 3.0, -10.0]),
            PointN([10.0, 3.0, -10.0]),
            PointN([10.0, 3.0, 10.0]),
            PointN([-10.0, 3.0, 10.0]),
        ];

        let clipped = clipper.clip(&quad).unwrap();

        assert_eq!(clipped.len(), 4);
        for v in clipped.vertices.iter() {
            assert!(cell_contains(&cell, v.position));
            assert_eq!(v.tex_coord.y(), 0.5);
            let tx = v.tex_coord.x();
            assert!(tx.abs() < 1e-5 || (tx - 1.0).abs() < 1e-5, "tex x {}", tx);
        }
    }

    #[test]
    fn padded_axes_shrink_tex_coords() {
        let cell = Extent3i::from_min_and_shape(Point3i::ZERO, PointN([3, 4, 4]));
        // 3 voxels padded to a 4 texel texture, plus one on the padded axis.
        let clipper = SliceClipper::new(&cell, PointN([5.0, 4.0, 4.0]));

        assert_eq!(clipper.tex_coord(PointN([3.0, 4.0, 2.0])), PointN([0.6, 1.0, 0.5]));
    }

    fn cell_contains(cell: &Extent3i, p: Point3f) -> bool {
        let e = Extent3f::from(*cell);
        let lub = e.least_upper_bound();

        (0..3).all(|i| e.minimum.at(i) - 1e-4 <= p.at(i) && p.at(i) <= lub.at(i) + 1e-4)
    }
}
