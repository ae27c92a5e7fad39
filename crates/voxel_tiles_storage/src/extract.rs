//! Copying one cell's voxels out of a source.
//!
//! Both functions return a newly allocated, tightly packed buffer with the same voxel encoding as the source. Nothing else is
//! touched, so extracting the same cell twice from an unchanged source gives identical bytes.
//!
//! ```
//! use voxel_tiles_core::prelude::*;
//! use voxel_tiles_storage::prelude::*;
//!
//! let source = VoxelBuffer::from_u8(PointN([4, 4, 4]), (0..64).collect());
//! let cell = Extent3i::from_min_and_shape(Point3i::ZERO, PointN([2, 2, 2]));
//!
//! assert_eq!(extract_block(&source, &cell), vec![0, 1, 4, 5, 16, 17, 20, 21]);
//! ```

use crate::VoxelSource;

use voxel_tiles_core::prelude::*;

/// Offset of voxel `p` in a buffer with `dimensions`, in voxels.
#[inline]
pub fn voxel_offset(dimensions: Point3i, p: Point3i) -> usize {
    (p.x() + p.y() * dimensions.x() + p.z() * dimensions.x() * dimensions.y()) as usize
}

/// Copies the voxels in `cell` into a new buffer with X fastest, then Y, then Z. `cell` must be nonempty and inside the
/// source.
pub fn extract_block<S>(source: &S, cell: &Extent3i) -> Vec<u8>
where
    S: VoxelSource + ?Sized,
{
    assert_cell_in_source(source, cell);

    let dims = source.dimensions();
    let bytes_per_voxel = source.bytes_per_voxel();
    let raw = source.raw_bytes();
    let row_len = cell.shape.x() as usize * bytes_per_voxel;

    let mut block = Vec::with_capacity(cell.num_points() * bytes_per_voxel);
    let lub = cell.least_upper_bound();
    for z in cell.minimum.z()..lub.z() {
        for y in cell.minimum.y()..lub.y() {
            let start = voxel_offset(dims, PointN([cell.minimum.x(), y, z])) * bytes_per_voxel;
            block.extend_from_slice(&raw[start..start + row_len]);
        }
    }

    block
}

/// Copies a single-voxel-thick `page` perpendicular to `axis` into a new 2D buffer. Rows run along the page's horizontal
/// axis (see `Axis3::plane_axes`), so the result is `page.shape.in_plane(axis)` voxels, horizontal fastest.
pub fn extract_page<S>(source: &S, axis: Axis3, page: &Extent3i) -> Vec<u8>
where
    S: VoxelSource + ?Sized,
{
    assert_eq!(
        page.shape.on_axis(axis),
        1,
        "a page must be one voxel thick along {:?}",
        axis
    );
    assert_cell_in_source(source, page);

    let dims = source.dimensions();
    let bytes_per_voxel = source.bytes_per_voxel();
    let raw = source.raw_bytes();
    let (h_axis, v_axis) = axis.plane_axes();
    let h_range = page.minimum.on_axis(h_axis)..page.least_upper_bound().on_axis(h_axis);
    let v_range = page.minimum.on_axis(v_axis)..page.least_upper_bound().on_axis(v_axis);

    let mut out = Vec::with_capacity(page.num_points() * bytes_per_voxel);
    for v in v_range {
        let row_start = page.minimum.with_axis(v_axis, v);
        if h_axis == Axis3::X {
            // Rows are contiguous in the source.
            let start = voxel_offset(dims, row_start) * bytes_per_voxel;
            let len = page.shape.x() as usize * bytes_per_voxel;
            out.extend_from_slice(&raw[start..start + len]);
        } else {
            for h in h_range.clone() {
                let p = row_start.with_axis(h_axis, h);
                let start = voxel_offset(dims, p) * bytes_per_voxel;
                out.extend_from_slice(&raw[start..start + bytes_per_voxel]);
            }
        }
    }

    out
}

/// The page of `source` perpendicular to `axis` at `slice`, restricted to `rect` in page coordinates (horizontal, vertical).
pub fn page_extent(axis: Axis3, slice: i32, rect_min: Point2i, rect_shape: Point2i) -> Extent3i {
    let (h_axis, v_axis) = axis.plane_axes();
    let minimum = Point3i::ZERO
        .with_axis(axis, slice)
        .with_axis(h_axis, rect_min.x())
        .with_axis(v_axis, rect_min.y());
    let shape = Point3i::ONES
        .with_axis(h_axis, rect_shape.x())
        .with_axis(v_axis, rect_shape.y());

    Extent3i::from_min_and_shape(minimum, shape)
}

fn assert_cell_in_source<S>(source: &S, cell: &Extent3i)
where
    S: VoxelSource + ?Sized,
{
    assert!(!cell.is_empty(), "cannot extract empty cell {:?}", cell);
    assert!(
        cell.is_subset_of(&source.extent()),
        "cell {:?} is outside of source {:?}",
        cell,
        source.extent()
    );
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
    use crate::{VoxelBuffer, VoxelFormat};

    use pretty_assertions::assert_eq;
    use rand::Rng;

    fn counting_source() -> VoxelBuffer {
        // Each voxel stores its own offset, so extracted bytes identify where they came from.
        VoxelBuffer::from_u8(PointN([4, 4, 4]), (0..64).collect())
    }

    #[test]
    fn first_cell_of_four_cubed_volume_is_eight_bytes() {
        let source = counting_source();
        let cell = Extent3i::from_min_and_shape(Point3i::ZERO, PointN([2, 2, 2]));

        let block = extract_block(&source, &cell);

        assert_eq!(block.len(), 8);
        let expected: Vec<u8> = cell
            .iter_points()
            .map(|p| voxel_offset(source.dimensions(), p) as u8)
            .collect();
        assert_eq!(block, expected);
    }

    #[test]
    fn extraction_is_idempotent() {
        let mut rng = rand::thread_rng();
        let dims = PointN([9, 7, 5]);
        let bytes: Vec<u8> = (0..dims.volume() * 2).map(|_| rng.gen()).collect();
        let source = VoxelBuffer::new(dims, VoxelFormat::U16, bytes);

        for _ in 0..20 {
            let min = PointN([rng.gen_range(0..9), rng.gen_range(0..7), rng.gen_range(0..5)]);
            let max = PointN([rng.gen_range(min.x()..9), rng.gen_range(min.y()..7), rng.gen_range(min.z()..5)]);
            let cell = Extent3i::from_min_and_max(min, max);

            let first = extract_block(&source, &cell);
            let second = extract_block(&source, &cell);

            assert_eq!(first.len(), cell.num_points() * 2);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn rgba_voxels_are_copied_verbatim() {
        let texels: Vec<[u8; 4]> = (0..8u8).map(|i| [i, i, i, 255]).collect();
        let source = VoxelBuffer::from_rgba8(PointN([2, 2, 2]), &texels);
        let cell = Extent3i::from_min_and_shape(PointN([1, 0, 0]), PointN([1, 2, 2]));

        let block = extract_block(&source, &cell);

        assert_eq!(
            block,
            vec![1, 1, 1, 255, 3, 3, 3, 255, 5, 5, 5, 255, 7, 7, 7, 255]
        );
    }

    #[test]
    #[should_panic]
    fn cell_outside_source_is_rejected() {
        let source = counting_source();
        let cell = Extent3i::from_min_and_shape(PointN([3, 3, 3]), PointN([2, 2, 2]));

        extract_block(&source, &cell);
    }

    #[test]
    fn pages_follow_plane_axes() {
        let source = counting_source();
        let dims = source.dimensions();

        for axis in Axis3::ALL.iter().cloned() {
            let page = page_extent(axis, 1, PointN([1, 0]), PointN([2, 3]));
            let bytes = extract_page(&source, axis, &page);
            let (h, v) = axis.plane_axes();

            let mut expected = Vec::new();
            for j in 0..3 {
                for i in 1..3 {
                    let p = Point3i::ZERO.with_axis(axis, 1).with_axis(h, i).with_axis(v, j);
                    expected.push(voxel_offset(dims, p) as u8);
                }
            }
            assert_eq!(bytes, expected, "axis {:?}", axis);
        }
    }

    #[test]
    fn x_page_of_two_byte_voxels() {
        let voxels: Vec<u16> = (0..8).collect();
        let source = VoxelBuffer::from_u16(PointN([2, 2, 2]), &voxels);
        let page = page_extent(Axis3::X, 1, Point2i::ZERO, PointN([2, 2]));

        let bytes = extract_page(&source, Axis3::X, &page);

        // Horizontal is Z, vertical is Y.
        let expected: Vec<u16> = vec![1, 5, 3, 7];
        assert_eq!(bytes, bytemuck::cast_slice::<u16, u8>(&expected).to_vec());
    }
}
