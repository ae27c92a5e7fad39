//! A cache of 2D texture pages for slicing a volume along the three principal axes.
//!
//! Each axis has one slice page per voxel layer. A slice page is split into a grid of page cells, and each cell holds a short
//! list of `TextureChunk`s, one per color map version. The cell array of a slice page is only allocated when the first chunk
//! in it is built, so a volume that is only ever viewed along Z never pays for X or Y pages.
//!
//! Memory is bounded by a byte budget and a texel budget. When `enforce_budget` finds either one exceeded, it evicts the
//! least recently used chunk until both hold again.
//!
//! ```
//! use voxel_tiles_core::prelude::*;
//! use voxel_tiles_storage::prelude::*;
//!
//! let source = VoxelBuffer::from_u8(PointN([8, 8, 8]), vec![1; 512]);
//! let map = ColorMap::from_rgba8(vec![[0; 4], [255; 4]]);
//! let mut cache = PageCache::new(PageCacheConfig::default());
//!
//! let key = PageKey::new(Axis3::Z, 3, Point2i::ZERO);
//! let chunk = cache.build_or_replace(key, &source, &map, &ColorMapper::default());
//! assert_eq!(chunk.shape(), PointN([8, 8, 1]));
//!
//! assert!(cache.get(key, map.version()).is_some());
//! ```

use crate::{
    extract_page, page_extent, ChunkCache, ColorLookup, ColorMapper, SmallKeyHashMap, TextureChunk, VersionId,
    VoxelSource,
};

use voxel_tiles_core::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Limits and layout for a `PageCache`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct PageCacheConfig {
    /// The page cell shape. A page perpendicular to axis A uses the two components on the plane axes of A.
    pub page_shape: Point3i,
    pub max_bytes: usize,
    pub max_texels: usize,
    /// How many color map versions of one page cell are kept at once.
    pub versions_per_cell: usize,
}

impl Default for PageCacheConfig {
    fn default() -> Self {
        Self {
            page_shape: PointN([64; 3]),
            max_bytes: 16 * 1024 * 1024,
            max_texels: 64 * 1024 * 1024,
            versions_per_cell: 4,
        }
    }
}

/// Identifies one page cell: the slice normal, the slice position along it, and the cell's `(column, row)` within the slice.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct PageKey {
    pub axis: Axis3,
    pub slice: i32,
    pub cell: Point2i,
}

impl PageKey {
    pub fn new(axis: Axis3, slice: i32, cell: Point2i) -> Self {
        Self { axis, slice, cell }
    }
}

#[derive(Clone, Debug)]
struct PageItem {
    chunk: TextureChunk,
    last_used: u64,
}

/// All page cells of one slice.
#[derive(Clone, Debug)]
struct SlicePage {
    grid_shape: Point2i,
    cells: Option<Vec<Vec<PageItem>>>,
}

impl SlicePage {
    fn items(&self) -> impl Iterator<Item = &PageItem> {
        self.cells.iter().flatten().flatten()
    }

    fn totals(&self) -> (usize, usize) {
        self.items().fold((0, 0), |(bytes, texels), item| {
            (bytes + item.chunk.num_bytes(), texels + item.chunk.num_texels())
        })
    }
}

/// See the module docs.
#[derive(Clone, Debug)]
pub struct PageCache {
    config: PageCacheConfig,
    pages: SmallKeyHashMap<(Axis3, i32), SlicePage>,
    source_dims: Option<Point3i>,
    source_version: Option<VersionId>,
    num_bytes: usize,
    num_texels: usize,
    clock: u64,
}

impl PageCache {
    pub fn new(config: PageCacheConfig) -> Self {
        assert!(
            config.page_shape > Point3i::ZERO,
            "page shape must be positive, got {:?}",
            config.page_shape
        );
        assert!(config.versions_per_cell > 0);

        Self {
            config,
            pages: SmallKeyHashMap::default(),
            source_dims: None,
            source_version: None,
            num_bytes: 0,
            num_texels: 0,
            clock: 0,
        }
    }

    #[inline]
    pub fn config(&self) -> &PageCacheConfig {
        &self.config
    }

    /// The 2D shape of the page cells perpendicular to `axis`.
    #[inline]
    pub fn page_cell_shape(&self, axis: Axis3) -> Point2i {
        self.config.page_shape.in_plane(axis)
    }

    /// The number of page cells `(columns, rows)` in every slice perpendicular to `axis` of a volume with `dims`.
    #[inline]
    pub fn page_grid_shape(&self, axis: Axis3, dims: Point3i) -> Point2i {
        dims.in_plane(axis).div_ceil(&self.page_cell_shape(axis))
    }

    /// The voxel-space extent of the page cell at `key` in a volume with `dims`, cropped to the volume.
    pub fn page_cell_extent(&self, key: PageKey, dims: Point3i) -> Extent3i {
        let cell_shape = self.page_cell_shape(key.axis);
        let rect_min = key.cell * cell_shape;
        let rect_shape = cell_shape.meet(&(dims.in_plane(key.axis) - rect_min));

        page_extent(key.axis, key.slice, rect_min, rect_shape)
    }

    /// The chunk at `key` built with `color_map_version`, if there is one. Chunks built with other versions are kept.
    ///
    /// Panics if `key` lies outside the page grid of the last source this cache built from.
    pub fn get(&self, key: PageKey, color_map_version: VersionId) -> Option<&TextureChunk> {
        if let Some(dims) = self.source_dims {
            self.assert_in_grid(key, dims);
        }
        let page = self.pages.get(&(key.axis, key.slice))?;
        let cells = page.cells.as_ref()?;

        cells[linear_page_index(page.grid_shape, key.cell)]
            .iter()
            .find(|item| item.chunk.color_map_version() == color_map_version)
            .map(|item| &item.chunk)
    }

    /// Extracts and maps the page cell at `key`, replacing any chunk in that cell with the same color map version.
    pub fn build_or_replace<S, C>(
        &mut self,
        key: PageKey,
        source: &S,
        color_map: &C,
        mapper: &ColorMapper,
    ) -> &TextureChunk
    where
        S: VoxelSource + ?Sized,
        C: ColorLookup + ?Sized,
    {
        self.get_or_build(key, source, color_map, mapper, false)
    }

    fn get_or_build<S, C>(
        &mut self,
        key: PageKey,
        source: &S,
        color_map: &C,
        mapper: &ColorMapper,
        reuse: bool,
    ) -> &TextureChunk
    where
        S: VoxelSource + ?Sized,
        C: ColorLookup + ?Sized,
    {
        self.track_source(source);

        let dims = source.dimensions();
        let grid_shape = self.page_grid_shape(key.axis, dims);
        self.assert_in_grid(key, dims);
        let linear = linear_page_index(grid_shape, key.cell);
        let extent = self.page_cell_extent(key, dims);
        let versions_per_cell = self.config.versions_per_cell;
        let version = color_map.version();
        let clock = self.clock;

        let page = self
            .pages
            .entry((key.axis, key.slice))
            .or_insert_with(|| SlicePage {
                grid_shape,
                cells: None,
            });
        let cells = page
            .cells
            .get_or_insert_with(|| (0..grid_shape.volume()).map(|_| Vec::new()).collect());
        let items = &mut cells[linear];

        let existing = items.iter().position(|item| item.chunk.color_map_version() == version);
        if let (true, Some(i)) = (reuse, existing) {
            items[i].last_used = clock;
            return &items[i].chunk;
        }

        if let Some(i) = existing {
            let old = items.swap_remove(i);
            self.num_bytes -= old.chunk.num_bytes();
            self.num_texels -= old.chunk.num_texels();
        } else if items.len() >= versions_per_cell {
            if let Some((i, _)) = items.iter().enumerate().min_by_key(|(_, item)| item.last_used) {
                let old = items.swap_remove(i);
                self.num_bytes -= old.chunk.num_bytes();
                self.num_texels -= old.chunk.num_texels();
            }
        }

        let raw = extract_page(source, key.axis, &extent);
        let shape = extent.shape.in_plane(key.axis);
        let chunk = mapper.map(
            &raw,
            source.format(),
            PointN([shape.x(), shape.y(), 1]),
            color_map,
            source.version(),
        );
        tracing::debug!(
            "Built page {:?} ({} bytes) for color map {:?}",
            key,
            chunk.num_bytes(),
            version
        );

        self.num_bytes += chunk.num_bytes();
        self.num_texels += chunk.num_texels();
        items.push(PageItem {
            chunk,
            last_used: clock,
        });
        let last = items.len() - 1;

        &items[last].chunk
    }

    /// Marks the chunk at `key` with `color_map_version` as used at `tick`.
    pub fn touch(&mut self, key: PageKey, color_map_version: VersionId, tick: u64) {
        if let Some(item) = self.item_mut(key, color_map_version) {
            item.last_used = tick;
        }
    }

    fn item_mut(&mut self, key: PageKey, color_map_version: VersionId) -> Option<&mut PageItem> {
        let page = self.pages.get_mut(&(key.axis, key.slice))?;
        let linear = linear_page_index(page.grid_shape, key.cell);
        let cells = page.cells.as_mut()?;

        cells[linear]
            .iter_mut()
            .find(|item| item.chunk.color_map_version() == color_map_version)
    }

    /// Advances the clock used to stamp chunks returned by `ChunkCache::get_or_build_chunk`, and returns the new tick.
    pub fn advance_clock(&mut self) -> u64 {
        self.clock += 1;

        self.clock
    }

    /// Removes the least recently used chunk in the whole cache. Returns its key, or `None` if the cache is empty.
    pub fn evict_lru(&mut self) -> Option<PageKey> {
        let (page_key, linear, item_index) = self
            .pages
            .iter()
            .filter_map(|(&page_key, page)| page.cells.as_ref().map(|cells| (page_key, cells)))
            .flat_map(|(page_key, cells)| {
                cells.iter().enumerate().flat_map(move |(linear, items)| {
                    items
                        .iter()
                        .enumerate()
                        .map(move |(i, item)| (page_key, linear, i, item.last_used))
                })
            })
            .min_by_key(|&(_, _, _, last_used)| last_used)
            .map(|(page_key, linear, i, _)| (page_key, linear, i))?;

        let page = self.pages.get_mut(&page_key)?;
        let cols = page.grid_shape.x() as usize;
        let cells = page.cells.as_mut()?;
        let evicted = cells[linear].swap_remove(item_index);
        self.num_bytes -= evicted.chunk.num_bytes();
        self.num_texels -= evicted.chunk.num_texels();

        let (axis, slice) = page_key;
        let key = PageKey::new(axis, slice, PointN([(linear % cols) as i32, (linear / cols) as i32]));
        tracing::debug!("Evicted page {:?} ({} bytes)", key, evicted.chunk.num_bytes());

        Some(key)
    }

    /// Evicts least recently used chunks until both the byte and texel budgets hold. Returns the number of evictions.
    pub fn enforce_budget(&mut self) -> usize {
        let mut num_evicted = 0;
        while self.num_bytes > self.config.max_bytes || self.num_texels > self.config.max_texels {
            if self.evict_lru().is_none() {
                break;
            }
            num_evicted += 1;
        }

        num_evicted
    }

    /// Drops every page.
    pub fn release_all(&mut self) {
        if !self.pages.is_empty() {
            tracing::debug!("Releasing all {} slice pages", self.pages.len());
        }
        self.pages.clear();
        self.num_bytes = 0;
        self.num_texels = 0;
    }

    /// Drops every page perpendicular to `axis`.
    pub fn release_axis(&mut self, axis: Axis3) {
        let mut freed = (0, 0);
        self.pages.retain(|&(page_axis, _), page| {
            if page_axis != axis {
                return true;
            }
            let (bytes, texels) = page.totals();
            freed.0 += bytes;
            freed.1 += texels;

            false
        });
        tracing::debug!("Released {:?} pages ({} bytes)", axis, freed.0);
        self.num_bytes -= freed.0;
        self.num_texels -= freed.1;
    }

    /// Drops the page perpendicular to `axis` at `slice`.
    pub fn release_page(&mut self, axis: Axis3, slice: i32) {
        if let Some(page) = self.pages.remove(&(axis, slice)) {
            let (bytes, texels) = page.totals();
            self.num_bytes -= bytes;
            self.num_texels -= texels;
        }
    }

    /// Changes the page cell shape. Only pages whose plane contains a changed axis are released.
    pub fn set_page_shape(&mut self, page_shape: Point3i) {
        assert!(page_shape > Point3i::ZERO, "page shape must be positive, got {:?}", page_shape);

        let old_shape = self.config.page_shape;
        for changed in Axis3::ALL.iter().cloned() {
            if old_shape.on_axis(changed) == page_shape.on_axis(changed) {
                continue;
            }
            for axis in Axis3::ALL.iter().cloned() {
                if axis.spans(changed) {
                    self.release_axis(axis);
                }
            }
        }
        self.config.page_shape = page_shape;
    }

    /// Returns `true` iff the slice page at `(axis, slice)` has allocated its cell array.
    pub fn page_is_allocated(&self, axis: Axis3, slice: i32) -> bool {
        self.pages
            .get(&(axis, slice))
            .map(|page| page.cells.is_some())
            .unwrap_or(false)
    }

    #[inline]
    pub fn num_bytes(&self) -> usize {
        self.num_bytes
    }

    #[inline]
    pub fn num_texels(&self) -> usize {
        self.num_texels
    }

    pub fn num_chunks(&self) -> usize {
        self.pages.values().map(|page| page.items().count()).sum()
    }

    fn assert_in_grid(&self, key: PageKey, dims: Point3i) {
        assert!(
            0 <= key.slice && key.slice < dims.on_axis(key.axis),
            "slice {} outside of {:?}",
            key.slice,
            dims
        );
        let grid_shape = self.page_grid_shape(key.axis, dims);
        assert!(
            Point2i::ZERO <= key.cell && key.cell < grid_shape,
            "page cell {:?} outside of grid {:?}",
            key.cell,
            grid_shape
        );
    }

    fn track_source<S>(&mut self, source: &S)
    where
        S: VoxelSource + ?Sized,
    {
        let dims = source.dimensions();
        let version = source.version();
        if self.source_dims != Some(dims) || self.source_version != Some(version) {
            self.release_all();
            self.source_dims = Some(dims);
            self.source_version = Some(version);
        }
    }
}

impl ChunkCache for PageCache {
    type Key = PageKey;

    fn get_chunk(
        &mut self,
        key: PageKey,
        color_map_version: VersionId,
        source_version: VersionId,
    ) -> Option<&TextureChunk> {
        if self.source_version != Some(source_version) {
            return None;
        }

        self.get(key, color_map_version)
    }

    fn get_or_build_chunk<S, C>(
        &mut self,
        key: PageKey,
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
        if self.source_version != Some(source_version) {
            self.release_all();
            self.source_version = Some(source_version);
        }
    }

    fn release_all(&mut self) {
        PageCache::release_all(self)
    }

    fn num_bytes(&self) -> usize {
        self.num_bytes
    }

    fn num_chunks(&self) -> usize {
        PageCache::num_chunks(self)
    }
}

fn linear_page_index(grid_shape: Point2i, cell: Point2i) -> usize {
    debug_assert!(Point2i::ZERO <= cell && cell < grid_shape);

    (cell.x() + cell.y() * grid_shape.x()) as usize
}

// ████████╗███████╗███████╗████████╗███████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝
//    ██║   █████╗  ███████╗   ██║   ███████╗
//    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║
//    ██║   ███████╗███████║   ██║   ███████║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝
