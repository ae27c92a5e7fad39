//! Choosing the axis-aligned 2D texture pages to draw for a view.
//!
//! Pages are taken perpendicular to the axis along which the viewer looks most directly, and drawn from the far end of the
//! volume to the near end.

use crate::ClipVertex;

use either::Either;
use voxel_tiles_core::prelude::*;

/// The axis perpendicular to the pages drawn for `view_direction`. Ties prefer X, then Y.
#[inline]
pub fn page_axis(view_direction: Point3f) -> Axis3 {
    view_direction.dominant_axis()
}

/// The slice index of the `i`-th of `num_slices` evenly spaced slices through `dim` voxels.
#[inline]
pub fn slice_index(i: u32, num_slices: u32, dim: i32) -> i32 {
    let slice = ((i as f32 / num_slices as f32) * dim as f32 + 0.5) as i32;

    slice.min(dim - 1)
}

/// The slices to draw for a volume with `dims`, farthest from the viewer first, along with the page axis.
pub fn plan_page_slices(
    view_direction: Point3f,
    dims: Point3i,
    num_slices: u32,
) -> (Axis3, impl Iterator<Item = i32>) {
    assert!(dims > Point3i::ZERO, "volume must be non-empty, got {:?}", dims);

    let axis = page_axis(view_direction);
    let dim = dims.on_axis(axis);
    let steps = if view_direction.on_axis(axis) > 0.0 {
        // Looking toward +axis, so the far end has the largest slice index.
        Either::Left((0..num_slices).rev())
    } else {
        Either::Right(0..num_slices)
    };

    (axis, steps.map(move |i| slice_index(i, num_slices, dim)))
}

/// The quad through the middle of the voxels of a page cell, in voxel space, with texture coordinates for a chunk whose
/// `texture_dims_modded` is given.
pub fn page_quad(axis: Axis3, cell: &Extent3i, texture_dims_modded: Point3f) -> [ClipVertex; 4] {
    let (h_axis, v_axis) = axis.plane_axes();
    let min = Point3f::from(cell.minimum);
    let shape = cell.shape.in_plane(axis);
    let depth = min.on_axis(axis) + 0.5;
    let corner = |h: i32, v: i32| {
        let position = min
            .with_axis(axis, depth)
            .with_axis(h_axis, min.on_axis(h_axis) + h as f32)
            .with_axis(v_axis, min.on_axis(v_axis) + v as f32);
        let tex_coord = PointN([
            h as f32 / texture_dims_modded.x(),
            v as f32 / texture_dims_modded.y(),
            0.5 / texture_dims_modded.z(),
        ]);

        ClipVertex::new(position, tex_coord)
    };

    [
        corner(0, 0),
        corner(shape.x(), 0),
        corner(shape.x(), shape.y()),
        corner(0, shape.y()),
    ]
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

    #[test]
    fn axis_follows_largest_view_component() {
        assert_eq!(page_axis(PointN([0.1, -0.9, 0.3])), Axis3::Y);
        assert_eq!(page_axis(PointN([0.5, 0.5, 0.5])), Axis3::X);
        assert_eq!(page_axis(PointN([0.0, 0.5, -0.5])), Axis3::Y);
    }

    #[test]
    fn looking_down_positive_axis_starts_at_far_end() {
        let (axis, slices) = plan_page_slices(PointN([0.0, 0.0, 1.0]), PointN([4, 4, 8]), 4);

        assert_eq!(axis, Axis3::Z);
        assert_eq!(slices.collect::<Vec<_>>(), vec![6, 4, 2, 0]);
    }

    #[test]
    fn looking_down_negative_axis_starts_at_zero() {
        let (axis, slices) = plan_page_slices(PointN([-1.0, 0.2, 0.0]), PointN([4, 4, 8]), 4);

        assert_eq!(axis, Axis3::X);
        assert_eq!(slices.collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn more_slices_than_voxels_stay_in_bounds() {
        let (_, slices) = plan_page_slices(PointN([0.0, 1.0, 0.0]), PointN([2, 2, 2]), 8);

        for slice in slices {
            assert!((0..2).contains(&slice));
        }
    }

    #[test]
    fn quad_spans_page_cell() {
        let cell = Extent3i::from_min_and_shape(PointN([2, 4, 3]), PointN([1, 3, 2]));

        let quad = page_quad(Axis3::X, &cell, PointN([2.0, 5.0, 1.0]));

        // X pages are laid out with Z horizontal and Y vertical.
        assert_eq!(quad[0].position, PointN([2.5, 4.0, 3.0]));
        assert_eq!(quad[2].position, PointN([2.5, 7.0, 5.0]));
        assert_eq!(quad[2].tex_coord, PointN([1.0, 0.6, 0.5]));
    }
}
