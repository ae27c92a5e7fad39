//! The rendering context that owns the caches for one volume.
//!
//! A `RenderContext` is created with the capabilities of the graphics hardware and a `RenderConfig`. It settles every
//! capability question once, up front: page and cube sizes are clamped to the hardware texture limits, paletted textures
//! are used only when supported, and intensity composition falls back to "over" without blend equations. Each fallback is
//! reported once.
//!
//! After that, every pass produces a list of draw items that borrow chunks from the context's caches. Nothing here talks to
//! a graphics API.
//!
//! ```
//! use voxel_tiles_core::prelude::*;
//! use voxel_tiles_render::prelude::*;
//! use voxel_tiles_storage::prelude::*;
//!
//! let source = VoxelBuffer::from_u8(PointN([4, 4, 4]), vec![200; 64]);
//! let map = ColorMap::from_rgba8((0..=255u8).map(|i| [i, i, i, 255]).collect());
//!
//! let mut config = RenderConfig::default();
//! config.cube_cache.cube_shape = PointN([2, 2, 2]);
//! let mut context = RenderContext::new(config, HardwareLimits::default());
//!
//! let camera = Camera::orthographic(PointN([0.0, 0.0, -10.0]), PointN([0.0, 0.0, 1.0]));
//! let plane = CuttingGeometry::Plane { normal: PointN([0.0, 0.0, 1.0]), distance: 0.5 };
//! let items = context.clip_and_composite(&plane, &source, &map, &camera);
//!
//! // The plane z = 0.5 passes through the 4 cubes in the upper half.
//! assert_eq!(items.len(), 4);
//! ```

use crate::{
    band, order, page_quad, plan_page_slices, slice_depths, slice_quad, AbortCode, Band, Camera, ClipVertex,
    ClippedPolygon, CompositionMode, CuttingGeometry, Diagnostics, RenderCandidate, Shortfall, SliceClipper,
};

use voxel_tiles_core::int_math::{is_pow2, prev_pow2};
use voxel_tiles_core::prelude::*;
use voxel_tiles_storage::{
    ChunkCache, ColorLookup, ColorMapper, CubeCache, CubeCacheConfig, PageCache, PageCacheConfig, PageKey, TextureChunk,
    VersionId, VoxelSource,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Forces the cube edge length. Must be a power of 2 no larger than the maximum 3D texture size.
pub const FORCE_CUBE_SIZE_VAR: &str = "VOXEL_TILES_FORCE_CUBE_SIZE";
/// When set, textures are always expanded to RGBA.
pub const DISABLE_PALETTED_VAR: &str = "VOXEL_TILES_DISABLE_PALETTED";

/// What the graphics hardware can do.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct HardwareLimits {
    pub max_texture_2d: i32,
    pub max_texture_3d: i32,
    pub paletted_textures: bool,
    pub blend_equation: bool,
}

impl Default for HardwareLimits {
    fn default() -> Self {
        Self {
            max_texture_2d: 4096,
            max_texture_3d: 256,
            paletted_textures: true,
            blend_equation: true,
        }
    }
}

/// What the caller asks for. `RenderContext::new` may scale this back to fit the `HardwareLimits`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct RenderConfig {
    pub page_cache: PageCacheConfig,
    pub cube_cache: CubeCacheConfig,
    pub composition: CompositionMode,
    /// Prefer paletted textures when the hardware supports them.
    pub paletted: bool,
    /// Overrides `cube_cache.cube_shape` with a cube of this edge length.
    pub forced_cube_size: Option<i32>,
    pub index_shift: u32,
    pub index_offset: i32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            page_cache: PageCacheConfig::default(),
            cube_cache: CubeCacheConfig::default(),
            composition: CompositionMode::default(),
            paletted: true,
            forced_cube_size: None,
            index_shift: 0,
            index_offset: 0,
        }
    }
}

impl RenderConfig {
    /// Applies `VOXEL_TILES_FORCE_CUBE_SIZE` and `VOXEL_TILES_DISABLE_PALETTED` from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Applies overrides from any variable lookup. Unparseable values are ignored.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(value) = lookup(FORCE_CUBE_SIZE_VAR) {
            match value.trim().parse::<i32>() {
                Ok(size) => self.forced_cube_size = Some(size),
                Err(_) => tracing::warn!("Ignoring {}={:?}, not an integer", FORCE_CUBE_SIZE_VAR, value),
            }
        }
        if lookup(DISABLE_PALETTED_VAR).is_some() {
            self.paletted = false;
        }

        self
    }
}

/// One cube's worth of clipped fragments, ready to draw with the cube's chunk.
#[derive(Clone, Debug)]
pub struct DrawItem<'a> {
    pub cell: CellIndex,
    pub chunk: &'a TextureChunk,
    pub distance: f32,
    /// Object-space polygons with 3D texture coordinates into `chunk`.
    pub polygons: Vec<ClippedPolygon>,
}

/// One textured page quad.
#[derive(Clone, Debug)]
pub struct PageDrawItem<'a> {
    pub key: PageKey,
    pub chunk: &'a TextureChunk,
    /// Object-space corners with texture coordinates into `chunk`.
    pub quad: [ClipVertex; 4],
}

/// See the module docs.
#[derive(Debug)]
pub struct RenderContext {
    limits: HardwareLimits,
    config: RenderConfig,
    mapper: ColorMapper,
    composition: CompositionMode,
    page_cache: PageCache,
    cube_cache: CubeCache,
    diagnostics: Diagnostics,
}

impl RenderContext {
    pub fn new(config: RenderConfig, limits: HardwareLimits) -> Self {
        assert!(limits.max_texture_2d > 0 && limits.max_texture_3d > 0);

        let mut diagnostics = Diagnostics::default();
        let mut config = config;

        config.page_cache.page_shape =
            clamp_texture_shape(config.page_cache.page_shape, limits.max_texture_2d, &mut diagnostics);

        if let Some(size) = config.forced_cube_size {
            if is_pow2(size) && size <= limits.max_texture_3d {
                tracing::info!("Forcing cube size {}", size);
                config.cube_cache.cube_shape = Point3i::fill(size);
            } else {
                diagnostics.warn_once(Shortfall::InvalidOverride {
                    name: FORCE_CUBE_SIZE_VAR,
                });
                config.forced_cube_size = None;
            }
        }
        config.cube_cache.cube_shape =
            clamp_texture_shape(config.cube_cache.cube_shape, limits.max_texture_3d, &mut diagnostics);

        let paletted = config.paletted && limits.paletted_textures;
        if config.paletted && !limits.paletted_textures {
            diagnostics.warn_once(Shortfall::PalettedUnsupported);
        }
        tracing::info!("Using {} textures", if paletted { "paletted" } else { "RGBA" });

        let composition = config.composition.effective(limits.blend_equation);
        if composition != config.composition {
            diagnostics.warn_once(Shortfall::BlendEquationUnsupported);
        }

        let mapper = ColorMapper {
            shift: config.index_shift,
            offset: config.index_offset,
            paletted,
        };

        Self {
            limits,
            config,
            mapper,
            composition,
            page_cache: PageCache::new(config.page_cache),
            cube_cache: CubeCache::new(config.cube_cache),
            diagnostics,
        }
    }

    #[inline]
    pub fn limits(&self) -> &HardwareLimits {
        &self.limits
    }

    /// The configuration after clamping to the hardware limits.
    #[inline]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    #[inline]
    pub fn mapper(&self) -> &ColorMapper {
        &self.mapper
    }

    /// The composition mode in effect.
    #[inline]
    pub fn composition(&self) -> CompositionMode {
        self.composition
    }

    #[inline]
    pub fn page_cache(&self) -> &PageCache {
        &self.page_cache
    }

    #[inline]
    pub fn cube_cache(&self) -> &CubeCache {
        &self.cube_cache
    }

    #[inline]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// The 3D chunk for cube `cell` of `source`, built if it is missing or stale.
    pub fn request_chunk<S, C>(&mut self, cell: CellIndex, source: &S, color_map: &C) -> &TextureChunk
    where
        S: VoxelSource + ?Sized,
        C: ColorLookup + ?Sized,
    {
        self.cube_cache
            .get_or_build_chunk(cell, source, color_map, &self.mapper)
    }

    /// The 2D chunk for page cell `key` of `source`, built if it is missing.
    pub fn request_page<S, C>(&mut self, key: PageKey, source: &S, color_map: &C) -> &TextureChunk
    where
        S: VoxelSource + ?Sized,
        C: ColorLookup + ?Sized,
    {
        self.page_cache
            .get_or_build_chunk(key, source, color_map, &self.mapper)
    }

    /// Clips `geometry` against every visible cube of `source` and returns the fragments farthest first.
    ///
    /// `geometry` and `camera` are in the object space of `source`'s bounding box.
    pub fn clip_and_composite<S, C>(
        &mut self,
        geometry: &CuttingGeometry<'_>,
        source: &S,
        color_map: &C,
        camera: &Camera,
    ) -> Vec<DrawItem<'_>>
    where
        S: VoxelSource + ?Sized,
        C: ColorLookup + ?Sized,
    {
        let grid = self.cube_cache.set_volume(source.extent());
        let space = ObjectSpace::of(source);

        let mut polygons: Vec<Vec<Point3f>> = Vec::new();
        geometry.for_each_polygon(&space.bounds, |polygon| {
            polygons.push(polygon.iter().map(|&p| space.to_voxel(p)).collect())
        });

        let mut candidates = Vec::new();
        for (cell, extent) in grid.iter_cells() {
            let clipper = SliceClipper::new(&extent, Point3f::ONES);
            let clipped: Vec<ClippedPolygon> = polygons.iter().filter_map(|p| clipper.clip(p)).collect();
            if clipped.is_empty() {
                continue;
            }
            if let Some(candidate) = self.textured_candidate(cell, &extent, clipped, &space, source, color_map) {
                candidates.push(candidate);
            }
        }

        self.draw_items(order(candidates, camera))
    }

    /// Slices the volume with `num_slices` view-aligned planes and returns, for every cube farthest first, the slices that cut
    /// it, also farthest first.
    ///
    /// `abort` is called before each slice of each cube with `(num_slices, num_slices - i)`. `AbortCode::Skip` skips that
    /// slice in that cube, `AbortCode::Abort` ends the pass and returns what was gathered so far.
    pub fn render_view_aligned<S, C>(
        &mut self,
        source: &S,
        color_map: &C,
        camera: &Camera,
        num_slices: u32,
        mut abort: impl FnMut(u32, u32) -> AbortCode,
    ) -> Vec<DrawItem<'_>>
    where
        S: VoxelSource + ?Sized,
        C: ColorLookup + ?Sized,
    {
        let grid = self.cube_cache.set_volume(source.extent());
        let space = ObjectSpace::of(source);
        let volume_sphere = space.bounds.bounding_sphere();

        let cubes = grid
            .iter_cells()
            .map(|(cell, extent)| RenderCandidate::new(cell, space.cell_bounds(&extent).center(), Vec::new()))
            .collect();

        let mut candidates = Vec::new();
        'cubes: for cube in order(cubes, camera) {
            let extent = grid.cell_extent(cube.cell);
            let cube_sphere = space.cell_bounds(&extent).bounding_sphere();
            let clipper = SliceClipper::new(&extent, Point3f::ONES);

            let mut clipped = Vec::new();
            for (i, depth) in slice_depths(camera, &volume_sphere, num_slices).enumerate() {
                match abort(num_slices, num_slices - i as u32) {
                    AbortCode::Abort => break 'cubes,
                    AbortCode::Skip => continue,
                    AbortCode::Continue => (),
                }
                match band(camera, &cube_sphere, depth) {
                    Band::Passed => break,
                    Band::NotReached => continue,
                    Band::Intersects => (),
                }

                let quad = slice_quad(camera, &volume_sphere, depth);
                let quad = [
                    space.to_voxel(quad[0]),
                    space.to_voxel(quad[1]),
                    space.to_voxel(quad[2]),
                    space.to_voxel(quad[3]),
                ];
                clipped.extend(clipper.clip(&quad));
            }
            if clipped.is_empty() {
                continue;
            }

            if let Some(mut candidate) = self.textured_candidate(cube.cell, &extent, clipped, &space, source, color_map) {
                candidate.distance = cube.distance;
                candidates.push(candidate);
            }
        }

        self.draw_items(candidates)
    }

    /// Draws `num_slices` axis-aligned pages for the current view, farthest first.
    ///
    /// Chunks left over budget by the previous pass are evicted before anything is built, so every chunk returned here stays
    /// resident until the next pass.
    pub fn render_pages<S, C>(
        &mut self,
        source: &S,
        color_map: &C,
        camera: &Camera,
        num_slices: u32,
    ) -> Vec<PageDrawItem<'_>>
    where
        S: VoxelSource + ?Sized,
        C: ColorLookup + ?Sized,
    {
        let num_evicted = self.page_cache.enforce_budget();
        if num_evicted > 0 {
            tracing::debug!("Evicted {} pages to fit the budget", num_evicted);
        }
        let tick = self.page_cache.advance_clock();

        let dims = source.dimensions();
        let version = color_map.version();
        let (axis, slices) = plan_page_slices(camera.view_direction, dims, num_slices);
        let grid_shape = self.page_cache.page_grid_shape(axis, dims);

        let mut keys = Vec::new();
        for slice in slices {
            for row in 0..grid_shape.y() {
                for col in 0..grid_shape.x() {
                    let key = PageKey::new(axis, slice, PointN([col, row]));
                    let chunk = self
                        .page_cache
                        .get_or_build_chunk(key, source, color_map, &self.mapper);
                    if chunk.is_invisible() {
                        continue;
                    }
                    self.page_cache.touch(key, version, tick);
                    keys.push(key);
                }
            }
        }

        let space = ObjectSpace::of(source);
        let page_cache = &self.page_cache;

        keys.into_iter()
            .filter_map(|key| {
                let chunk = page_cache.get(key, version)?;
                let extent = page_cache.page_cell_extent(key, dims);
                let mut quad = page_quad(axis, &extent, chunk.texture_dims_modded());
                for v in quad.iter_mut() {
                    v.position = space.to_object(v.position);
                }

                Some(PageDrawItem { key, chunk, quad })
            })
            .collect()
    }

    /// Switches cached cubes to `color_map`. Paletted cubes keep their texels, everything else is rebuilt on next use.
    pub fn apply_color_map<C>(&mut self, color_map: &C)
    where
        C: ColorLookup + ?Sized,
    {
        self.cube_cache.set_palette(color_map);
    }

    /// Drops every chunk that was not built from `source_version`.
    pub fn invalidate(&mut self, source_version: VersionId) {
        ChunkCache::invalidate(&mut self.page_cache, source_version);
        ChunkCache::invalidate(&mut self.cube_cache, source_version);
    }

    pub fn release_all(&mut self) {
        self.page_cache.release_all();
        self.cube_cache.release_all();
    }

    /// Changes the page cell shape, clamped to the hardware limit. Only pages with a changed in-plane axis are released.
    pub fn set_page_shape(&mut self, page_shape: Point3i) {
        let page_shape = clamp_texture_shape(page_shape, self.limits.max_texture_2d, &mut self.diagnostics);
        self.page_cache.set_page_shape(page_shape);
        self.config.page_cache.page_shape = page_shape;
    }

    /// Changes the cube shape, clamped to the hardware limit. Releases every cube.
    pub fn set_cube_shape(&mut self, cube_shape: Point3i) {
        let cube_shape = clamp_texture_shape(cube_shape, self.limits.max_texture_3d, &mut self.diagnostics);
        self.cube_cache.set_cube_shape(cube_shape);
        self.config.cube_cache.cube_shape = cube_shape;
    }

    /// Builds (or reuses) the chunk for `cell` and turns voxel-space fragments into object-space fragments with texture
    /// coordinates for that chunk. `None` if the chunk is invisible.
    fn textured_candidate<S, C>(
        &mut self,
        cell: CellIndex,
        extent: &Extent3i,
        clipped: Vec<ClippedPolygon>,
        space: &ObjectSpace,
        source: &S,
        color_map: &C,
    ) -> Option<RenderCandidate>
    where
        S: VoxelSource + ?Sized,
        C: ColorLookup + ?Sized,
    {
        let chunk = self
            .cube_cache
            .get_or_build_chunk(cell, source, color_map, &self.mapper);
        if chunk.is_invisible() {
            return None;
        }
        let dims_modded = chunk.texture_dims_modded();

        let polygons = clipped
            .into_iter()
            .map(|polygon| {
                polygon
                    .map_tex_coords(|offset| offset / dims_modded)
                    .map_positions(|p| space.to_object(p))
            })
            .collect();

        Some(RenderCandidate::new(
            cell,
            space.cell_bounds(extent).center(),
            polygons,
        ))
    }

    fn draw_items(&self, candidates: Vec<RenderCandidate>) -> Vec<DrawItem<'_>> {
        candidates
            .into_iter()
            .filter_map(|candidate| {
                let chunk = self.cube_cache.peek(candidate.cell)?;

                Some(DrawItem {
                    cell: candidate.cell,
                    chunk,
                    distance: candidate.distance,
                    polygons: candidate.polygons,
                })
            })
            .collect()
    }
}

/// Maps between the voxel space of a source and the object space of its bounding box.
struct ObjectSpace {
    bounds: Extent3f,
    voxel_size: Point3f,
}

impl ObjectSpace {
    fn of<S>(source: &S) -> Self
    where
        S: VoxelSource + ?Sized,
    {
        Self {
            bounds: source.bounding_box(),
            voxel_size: source.voxel_size(),
        }
    }

    #[inline]
    fn to_voxel(&self, p: Point3f) -> Point3f {
        (p - self.bounds.minimum) / self.voxel_size
    }

    #[inline]
    fn to_object(&self, p: Point3f) -> Point3f {
        self.bounds.minimum + p * self.voxel_size
    }

    fn cell_bounds(&self, extent: &Extent3i) -> Extent3f {
        Extent3f::from_min_and_shape(
            self.to_object(Point3f::from(extent.minimum)),
            Point3f::from(extent.shape) * self.voxel_size,
        )
    }
}

fn clamp_texture_shape(shape: Point3i, max: i32, diagnostics: &mut Diagnostics) -> Point3i {
    let limit = prev_pow2(max);
    let mut clamped = shape;
    for axis in Axis3::ALL.iter().cloned() {
        let requested = shape.on_axis(axis);
        if requested > limit {
            diagnostics.warn_once(Shortfall::TextureSizeClamped { requested, max: limit });
            *clamped.at_mut(axis) = limit;
        }
    }

    clamped
}

// ████████╗███████╗███████╗████████╗███████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝
//    ██║   █████╗  ███████╗   ██║   ███████╗
//    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║
//    ██║   ███████╗███████║   ██║   ███████║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝
