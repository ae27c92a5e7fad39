//! Ordering clipped cell fragments for compositing.
//!
//! Cells are drawn farthest first, so "over" blending accumulates correctly. The same order is used for every other
//! composition mode.
//!
//! ```
//! use voxel_tiles_core::prelude::*;
//! use voxel_tiles_render::prelude::*;
//!
//! let camera = Camera::orthographic(Point3f::ZERO, PointN([0.0, 0.0, 1.0]));
//! let candidates = [1.0, 5.0, 3.0]
//!     .iter()
//!     .enumerate()
//!     .map(|(i, &z)| RenderCandidate::new(PointN([i as i32, 0, 0]), PointN([0.0, 0.0, z]), Vec::new()))
//!     .collect();
//!
//! let ordered = order(candidates, &camera);
//!
//! let distances: Vec<f32> = ordered.iter().map(|c| c.distance).collect();
//! assert_eq!(distances, vec![5.0, 3.0, 1.0]);
//! ```

use crate::ClippedPolygon;

use float_ord::FloatOrd;
use voxel_tiles_core::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum Projection {
    Orthographic,
    /// Distances are measured from `projection_point`.
    Perspective { projection_point: Point3f },
}

/// The viewer, in the object space of the volume.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct Camera {
    pub eye: Point3f,
    /// Unit vector pointing from the eye into the scene.
    pub view_direction: Point3f,
    pub projection: Projection,
}

impl Camera {
    pub fn orthographic(eye: Point3f, view_direction: Point3f) -> Self {
        Self {
            eye,
            view_direction: view_direction.normalized(),
            projection: Projection::Orthographic,
        }
    }

    /// A perspective camera projecting from `eye`.
    pub fn perspective(eye: Point3f, view_direction: Point3f) -> Self {
        Self {
            eye,
            view_direction: view_direction.normalized(),
            projection: Projection::Perspective { projection_point: eye },
        }
    }

    /// Signed depth of `p` along the view direction, measured from the eye's plane.
    #[inline]
    pub fn depth_of(&self, p: Point3f) -> f32 {
        (p - self.eye).dot(&self.view_direction)
    }

    /// The distance used to order cells: depth for orthographic views, Euclidean distance from the projection point for
    /// perspective views.
    pub fn distance_to(&self, p: Point3f) -> f32 {
        match self.projection {
            Projection::Orthographic => self.depth_of(p),
            Projection::Perspective { projection_point } => (p - projection_point).norm(),
        }
    }
}

/// A cell that the current cutting geometry reaches, with the fragments clipped to it.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderCandidate {
    pub cell: CellIndex,
    pub center: Point3f,
    /// Filled in by `order`.
    pub distance: f32,
    pub polygons: Vec<ClippedPolygon>,
}

impl RenderCandidate {
    pub fn new(cell: CellIndex, center: Point3f, polygons: Vec<ClippedPolygon>) -> Self {
        Self {
            cell,
            center,
            distance: 0.0,
            polygons,
        }
    }
}

/// Measures every candidate's distance from `camera` and sorts them farthest first. Ties are left in arbitrary order.
pub fn order(mut candidates: Vec<RenderCandidate>, camera: &Camera) -> Vec<RenderCandidate> {
    for candidate in candidates.iter_mut() {
        candidate.distance = camera.distance_to(candidate.center);
    }
    candidates.sort_unstable_by_key(|c| std::cmp::Reverse(FloatOrd(c.distance)));

    candidates
}

/// What a per-slice callback wants the slicing loop to do next.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AbortCode {
    Continue,
    /// Skip this slice, but keep going.
    Skip,
    /// Stop the whole pass.
    Abort,
}

/// Where a slice lies relative to a cell's bounding sphere.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Band {
    /// The slice is farther than the sphere.
    NotReached,
    Intersects,
    /// The slice is nearer than the sphere.
    Passed,
}

/// Classifies the slice at `depth` against `sphere`. A slice reaches the sphere iff `|depth - center_depth| <= radius`.
pub fn band(camera: &Camera, sphere: &Sphere3, depth: f32) -> Band {
    let center_depth = sphere.center_distance_along(camera.eye, camera.view_direction);
    if depth < center_depth - sphere.radius {
        Band::Passed
    } else if depth > center_depth + sphere.radius {
        Band::NotReached
    } else {
        Band::Intersects
    }
}

/// The depths of `num_slices` view-aligned slices through `volume`, farthest first.
pub fn slice_depths(camera: &Camera, volume: &Sphere3, num_slices: u32) -> impl Iterator<Item = f32> {
    let center_depth = volume.center_distance_along(camera.eye, camera.view_direction);
    let far = center_depth + volume.radius;
    let near = center_depth - volume.radius;
    let step = (far - near) / num_slices.max(1) as f32;

    (0..num_slices).map(move |i| far - i as f32 * step)
}

/// The view-aligned quad at `depth` that covers all of `volume`.
pub fn slice_quad(camera: &Camera, volume: &Sphere3, depth: f32) -> [Point3f; 4] {
    let center_depth = volume.center_distance_along(camera.eye, camera.view_direction);
    let center = volume.center + camera.view_direction * (depth - center_depth);

    crate::square_on_plane(center, camera.view_direction, volume.radius)
}

/// How fragments are blended into the frame.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum CompositionMode {
    Over,
    Additive,
    MaxIntensity,
    MinIntensity,
}

impl Default for CompositionMode {
    fn default() -> Self {
        CompositionMode::Over
    }
}

impl CompositionMode {
    /// Returns `true` iff the mode needs a blend equation other than addition.
    #[inline]
    pub fn needs_blend_equation(&self) -> bool {
        matches!(self, CompositionMode::MaxIntensity | CompositionMode::MinIntensity)
    }

    /// The mode to actually use, given whether the hardware supports blend equations.
    pub fn effective(&self, blend_equation: bool) -> CompositionMode {
        if self.needs_blend_equation() && !blend_equation {
            CompositionMode::Over
        } else {
            *self
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

    use pretty_assertions::assert_eq;
    use rand::prelude::*;

    fn candidate(i: i32, center: [f32; 3]) -> RenderCandidate {
        RenderCandidate::new(PointN([i, 0, 0]), PointN(center), Vec::new())
    }

    #[test]
    fn orthographic_order_is_farthest_first() {
        let camera = Camera::orthographic(Point3f::ZERO, PointN([0.0, 0.0, 1.0]));
        let candidates = vec![
            candidate(0, [0.0, 0.0, 1.0]),
            candidate(1, [0.0, 0.0, 5.0]),
            candidate(2, [0.0, 0.0, 3.0]),
        ];

        let ordered = order(candidates, &camera);

        let cells: Vec<i32> = ordered.iter().map(|c| c.cell.x()).collect();
        assert_eq!(cells, vec![1, 2, 0]);
        let distances: Vec<f32> = ordered.iter().map(|c| c.distance).collect();
        assert_eq!(distances, vec![5.0, 3.0, 1.0]);
    }

    #[test]
    fn orthographic_distance_ignores_lateral_offset() {
        let camera = Camera::orthographic(Point3f::ZERO, PointN([0.0, 0.0, 2.0]));

        assert_eq!(camera.distance_to(PointN([100.0, -7.0, 4.0])), 4.0);
    }

    #[test]
    fn perspective_order_uses_euclidean_distance() {
        let camera = Camera::perspective(Point3f::ZERO, PointN([0.0, 0.0, 1.0]));
        // Shallower along the view direction, but farther from the eye.
        let candidates = vec![candidate(0, [0.0, 0.0, 4.0]), candidate(1, [10.0, 0.0, 1.0])];

        let ordered = order(candidates, &camera);

        assert_eq!(ordered[0].cell.x(), 1);
        assert_eq!(ordered[1].distance, 4.0);
    }

    #[test]
    fn random_candidates_are_sorted_descending() {
        let mut rng = StdRng::seed_from_u64(7);
        let camera = Camera::perspective(PointN([-3.0, 2.0, 1.0]), PointN([1.0, 0.0, 0.0]));
        let candidates = (0..100)
            .map(|i| candidate(i, [rng.gen_range(-50.0..50.0), rng.gen_range(-50.0..50.0), rng.gen_range(-50.0..50.0)]))
            .collect();

        let ordered = order(candidates, &camera);

        assert_eq!(ordered.len(), 100);
        for pair in ordered.windows(2) {
            assert!(pair[0].distance >= pair[1].distance);
        }
    }

    #[test]
    fn band_classifies_slices() {
        let camera = Camera::orthographic(Point3f::ZERO, PointN([0.0, 0.0, 1.0]));
        let sphere = Sphere3 {
            center: PointN([0.0, 0.0, 10.0]),
            radius: 2.0,
        };

        assert_eq!(band(&camera, &sphere, 13.0), Band::NotReached);
        assert_eq!(band(&camera, &sphere, 12.0), Band::Intersects);
        assert_eq!(band(&camera, &sphere, 8.0), Band::Intersects);
        assert_eq!(band(&camera, &sphere, 7.9), Band::Passed);
    }

    #[test]
    fn slices_run_far_to_near() {
        let camera = Camera::orthographic(Point3f::ZERO, PointN([0.0, 0.0, 1.0]));
        let sphere = Sphere3 {
            center: PointN([0.0, 0.0, 10.0]),
            radius: 2.0,
        };

        let depths: Vec<f32> = slice_depths(&camera, &sphere, 4).collect();

        assert_eq!(depths, vec![12.0, 11.0, 10.0, 9.0]);
    }

    #[test]
    fn slice_quad_is_perpendicular_to_view() {
        let camera = Camera::orthographic(Point3f::ZERO, PointN([0.0, 1.0, 0.0]));
        let sphere = Sphere3 {
            center: PointN([1.0, 5.0, 1.0]),
            radius: 3.0,
        };

        let quad = slice_quad(&camera, &sphere, 4.0);

        for corner in quad.iter() {
            assert!((corner.y() - 4.0).abs() < 1e-5);
        }
    }

    #[test]
    fn intensity_modes_fall_back_without_blend_equation() {
        assert_eq!(CompositionMode::MaxIntensity.effective(false), CompositionMode::Over);
        assert_eq!(CompositionMode::MinIntensity.effective(true), CompositionMode::MinIntensity);
        assert_eq!(CompositionMode::Additive.effective(false), CompositionMode::Additive);
    }
}
