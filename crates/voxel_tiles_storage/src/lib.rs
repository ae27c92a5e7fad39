#![allow(clippy::too_many_arguments, clippy::len_without_is_empty)]

//! Turning a voxel volume into cached, color-mapped texture chunks.
//!
//! The pipeline for one chunk is:
//!   - `extract_block` / `extract_page`: copy one cell's voxels out of a `VoxelSource`
//!   - `ColorMapper`: map the voxels through a `ColorMap` into RGBA or paletted texels, padded to power-of-two dimensions
//!   - `ChunkCache`: keep the resulting `TextureChunk` until its source or color map changes
//!
//! There are two caches:
//!   - `PageCache`: 2D pages for slicing along the principal axes, bounded by a memory budget with LRU eviction
//!   - `CubeCache`: 3D cubes, one per cell of a `CellGrid`, never evicted
//!
//! Color maps come from raw tables, from a GIMP `.ggr` gradient, or from one of the `PredefinedGradient` palettes.

pub mod chunk;
pub mod chunk_cache;
pub mod color_map;
pub mod cube_cache;
pub mod extract;
pub mod gradient;
pub mod mapper;
pub mod page_cache;
pub mod source;

pub use chunk::*;
pub use chunk_cache::*;
pub use color_map::*;
pub use cube_cache::*;
pub use extract::*;
pub use gradient::*;
pub use mapper::*;
pub use page_cache::*;
pub use source::*;

// Hash types to use for small keys like `(Axis3, i32)`.
pub type SmallKeyHashMap<K, V> = ahash::AHashMap<K, V>;
pub type SmallKeyHashSet<K> = ahash::AHashSet<K>;

pub mod prelude {
    pub use super::{
        extract_block, extract_page, page_extent, AlphaPolicy, ChunkCache, ColorLookup, ColorMap,
        ColorMapper, CubeCache, CubeCacheConfig, FloatComponents, GimpGradient, GradientError,
        PageCache, PageCacheConfig, PageKey, Palette, PredefinedGradient, Rgba8, TexelData,
        TextureChunk, VersionId, VoxelBuffer, VoxelFormat, VoxelSource,
    };
}
