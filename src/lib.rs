//! Rendering large voxel volumes as textured geometry.
//!
//! Graphics hardware limits the size of a texture, so a volume is tiled into cells, each cell is turned into a texture chunk
//! on demand, and cutting geometry is clipped against every cell it passes through. The crates are:
//! - **core**: points, extents and the `CellGrid` that tiles a volume
//! - **storage**: extraction of cell voxels, color mapping, and the 2D page and 3D cube caches
//! - **render**: cutting geometry, clipping, back-to-front ordering, and the `RenderContext` that ties them together
//!
//! ```
//! use voxel_tiles::prelude::*;
//!
//! let source = VoxelBuffer::from_u8(PointN([4, 4, 4]), (0..64).collect());
//! let grid = CellGrid::new(source.extent(), PointN([2, 2, 2]));
//! assert_eq!(grid.num_cells(), 8);
//!
//! let block = extract_block(&source, &grid.cell_extent(Point3i::ZERO));
//! assert_eq!(block, vec![0, 1, 4, 5, 16, 17, 20, 21]);
//! ```

pub use voxel_tiles_core as core;
pub use voxel_tiles_render as render;
pub use voxel_tiles_storage as storage;

pub mod prelude {
    pub use super::core::prelude::*;
    pub use super::render::prelude::*;
    pub use super::storage::prelude::*;
}
