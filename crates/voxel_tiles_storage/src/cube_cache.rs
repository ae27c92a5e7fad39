//! A cache of 3D texture cubes, one per cell of a `CellGrid` over the source volume.
//!
//! Unlike the page cache, every cell holds at most one chunk and nothing is ever evicted for memory pressure. Each chunk
//! remembers the source version it was extracted from; looking it up with any other version tears it down.
//!
//! ```
//! use voxel_tiles_core::prelude::*;
//! use voxel_tiles_storage::prelude::*;
//!
//! let mut source = VoxelBuffer::from_u8(PointN([4, 4, 4]), (0..64).collect());
//! let map = ColorMap::from_rgba8((0..64u8).map(|i| [i, i, i, 255]).collect());
//! let mut cache = CubeCache::new(CubeCacheConfig { cube_shape: PointN([2, 2, 2]) });
//!
//! let chunk = cache.build(Point3i::ZERO, &source, &map, &ColorMapper::default());
//! assert_eq!(chunk.num_texels(), 8);
//!
//! source.bytes_mut()[0] = 1;
//! assert!(cache.get(Point3i::ZERO, source.version()).is_none());
//! ```

use crate::{extract_block, ChunkCache, ColorLookup, ColorMapper, TextureChunk, VersionId, VoxelSource};

use voxel_tiles_core::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct CubeCacheConfig {
    /// The shape of every cube, except where cropped by the volume boundary.
    pub cube_shape: Point3i,
}

impl Default for CubeCacheConfig {
    fn default() -> Self {
        Self {
            cube_shape: PointN([128; 3]),
        }
    }
}

/// See the module docs.
#[derive(Clone, Debug)]
pub struct CubeCache {
    config: CubeCacheConfig,
    grid: Option<CellGrid>,
    cells: Vec<Option<TextureChunk>>,
    num_bytes: usize,
}

impl CubeCache {
    pub fn new(config: CubeCacheConfig) -> Self {
        assert!(
            config.cube_shape > Point3i::ZERO,
            "cube shape must be positive, got {:?}",
            config.cube_shape
        );

        Self {
            config,
            grid: None,
            cells: Vec::new(),
            num_bytes: 0,
        }
    }

    #[inline]
    pub fn config(&self) -> &CubeCacheConfig {
        &self.config
    }

    /// The grid over the most recently seen source.
    #[inline]
    pub fn grid(&self) -> Option<&CellGrid> {
        self.grid.as_ref()
    }

    /// Lays the grid over a volume with `extent`. Any existing cubes are released if the grid changes.
    pub fn set_volume(&mut self, extent: Extent3i) -> CellGrid {
        let grid = CellGrid::new(extent, self.config.cube_shape);
        if self.grid == Some(grid) {
            return grid;
        }

        self.release_all();
        tracing::debug!(
            "Laying {:?} grid of {:?} cubes over {:?}",
            grid.grid_shape(),
            grid.cell_shape(),
            extent
        );
        self.cells = (0..grid.num_cells()).map(|_| None).collect();
        self.grid = Some(grid);

        grid
    }

    /// Changes the cube shape, releasing every cube.
    pub fn set_cube_shape(&mut self, cube_shape: Point3i) {
        assert!(cube_shape > Point3i::ZERO, "cube shape must be positive, got {:?}", cube_shape);

        if cube_shape == self.config.cube_shape {
            return;
        }
        self.config.cube_shape = cube_shape;
        if let Some(grid) = self.grid.take() {
            self.set_volume(*grid.volume());
        }
    }

    /// The cube at `index`, if it was built from `source_version`. A cube built from any other version is torn down.
    ///
    /// Panics if `index` is outside the current grid.
    pub fn get(&mut self, index: CellIndex, source_version: VersionId) -> Option<&TextureChunk> {
        let linear = self.linear_index(index)?;

        let stale = match &self.cells[linear] {
            Some(chunk) => chunk.source_version() != source_version,
            None => return None,
        };
        if stale {
            self.release_cell(linear);
            tracing::debug!("Tore down stale cube {:?}", index);
            return None;
        }

        self.cells[linear].as_ref()
    }

    /// The cube at `index`, whatever it was built from.
    pub fn peek(&self, index: CellIndex) -> Option<&TextureChunk> {
        let linear = self.linear_index(index)?;

        self.cells[linear].as_ref()
    }

    /// Extracts and maps the cube at `index`, replacing whatever was there.
    pub fn build<S, C>(&mut self, index: CellIndex, source: &S, color_map: &C, mapper: &ColorMapper) -> &TextureChunk
    where
        S: VoxelSource + ?Sized,
        C: ColorLookup + ?Sized,
    {
        self.get_or_build(index, source, color_map, mapper, false)
    }

    fn get_or_build<S, C>(
        &mut self,
        index: CellIndex,
        source: &S,
        color_map: &C,
        mapper: &ColorMapper,
        reuse: bool,
    ) -> &TextureChunk
    where
        S: VoxelSource + ?Sized,
        C: ColorLookup + ?Sized,
    {
        let grid = self.set_volume(source.extent());
        let extent = grid.cell_extent(index);
        let linear = grid.linear_index(index);
        let fresh = reuse
            && self.cells[linear].as_ref().map_or(false, |chunk| {
                chunk.source_version() == source.version() && chunk.color_map_version() == color_map.version()
            });

        if !fresh {
            self.release_cell(linear);
        }
        let num_bytes = &mut self.num_bytes;

        self.cells[linear].get_or_insert_with(|| {
            let raw = extract_block(source, &extent);
            let chunk = mapper.map(&raw, source.format(), extent.shape, color_map, source.version());
            tracing::debug!("Built cube {:?} ({} bytes)", index, chunk.num_bytes());
            *num_bytes += chunk.num_bytes();

            chunk
        })
    }

    /// Switches every cube to `color_map`. Paletted cubes only get a new palette, RGBA cubes are released.
    pub fn set_palette<C>(&mut self, color_map: &C)
    where
        C: ColorLookup + ?Sized,
    {
        for linear in 0..self.cells.len() {
            let recolored = match &mut self.cells[linear] {
                Some(chunk) => chunk.recolor(color_map),
                None => continue,
            };
            if !recolored {
                self.release_cell(linear);
            }
        }
    }

    pub fn release_all(&mut self) {
        for cell in self.cells.iter_mut() {
            *cell = None;
        }
        self.num_bytes = 0;
    }

    #[inline]
    pub fn num_bytes(&self) -> usize {
        self.num_bytes
    }

    pub fn num_chunks(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    fn linear_index(&self, index: CellIndex) -> Option<usize> {
        let grid = self.grid.as_ref()?;
        assert!(
            grid.contains_index(index),
            "{:?} outside of grid {:?}",
            index,
            grid.grid_shape()
        );

        Some(grid.linear_index(index))
    }

    fn release_cell(&mut self, linear: usize) {
        if let Some(old) = self.cells[linear].take() {
            self.num_bytes -= old.num_bytes();
        }
    }
}

impl ChunkCache for CubeCache {
    type Key = CellIndex;

    fn get_chunk(
        &mut self,
        key: CellIndex,
        color_map_version: VersionId,
        source_version: VersionId,
    ) -> Option<&TextureChunk> {
        self.get(key, source_version)
            .filter(|chunk| chunk.color_map_version() == color_map_version)
    }

    fn get_or_build_chunk<S, C>(
        &mut self,
        key: CellIndex,
        source: &S,
        color_map: &C,
        mapper: &ColorMapper,
    ) -> &TextureChunk
    where
        S: VoxelSource + ?Sized,
        C: ColorLookup + ?Sized,
    {
        self.get_or_build(key, source, color_map, mapper, true)
    }

    fn invalidate(&mut self, source_version: VersionId) {
        for linear in 0..self.cells.len() {
            let stale = self.cells[linear]
                .as_ref()
                .map_or(false, |chunk| chunk.source_version() != source_version);
            if stale {
                self.release_cell(linear);
            }
        }
    }

    fn release_all(&mut self) {
        CubeCache::release_all(self)
    }

    fn num_bytes(&self) -> usize {
        self.num_bytes
    }

    fn num_chunks(&self) -> usize {
        CubeCache::num_chunks(self)
    }
}

// ████████╗███████╗███████╗████████╗███████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝
//    ██║   █████╗  ███████╗   ██║   ███████╗
//    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║
//    ██║   ███████╗███████║   ██║   ███████║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝
