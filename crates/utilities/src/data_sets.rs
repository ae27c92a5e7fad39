use voxel_tiles_core::prelude::*;
use voxel_tiles_storage::{ColorMap, VoxelBuffer};

/// A cube volume holding `inner_value` inside a centered sphere and `outer_value` everywhere else. Also returns the radius.
pub fn sphere_volume(edge_length: i32, inner_value: u8, outer_value: u8) -> (VoxelBuffer, i32) {
    let radius = edge_length / 2 - 1;
    let center = Point3f::fill(edge_length as f32 / 2.0);

    let volume = VoxelBuffer::fill_with_u8(Point3i::fill(edge_length), |p| {
        let voxel_center = Point3f::from(p) + Point3f::fill(0.5);
        if (voxel_center - center).norm() < radius as f32 {
            inner_value
        } else {
            outer_value
        }
    });

    (volume, radius)
}

/// A volume where each voxel holds the low byte of its own linear offset.
pub fn counting_volume(dimensions: Point3i) -> VoxelBuffer {
    let n = dimensions.volume() as usize;

    VoxelBuffer::from_u8(dimensions, (0..n).map(|i| i as u8).collect())
}

/// A 256-entry map from transparent black to opaque white.
pub fn gray_ramp() -> ColorMap {
    ColorMap::from_rgba8((0..=255u8).map(|i| [i, i, i, i]).collect())
}
