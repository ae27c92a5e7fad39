use crate::{ColorLookup, ColorMapper, TextureChunk, VersionId, VoxelSource};

/// The interface shared by the 2D page cache and the 3D cube cache.
///
/// A cache owns every `TextureChunk` it builds. Chunks are looked up by a cache-specific key plus the versions of the color map
/// and source they were built from.
pub trait ChunkCache {
    type Key: Copy;

    /// The chunk at `key`, if one was built from these versions.
    fn get_chunk(
        &mut self,
        key: Self::Key,
        color_map_version: VersionId,
        source_version: VersionId,
    ) -> Option<&TextureChunk>;

    /// The chunk at `key` for the current versions of `source` and `color_map`, building it first if necessary.
    fn get_or_build_chunk<S, C>(
        &mut self,
        key: Self::Key,
        source: &S,
        color_map: &C,
        mapper: &ColorMapper,
    ) -> &TextureChunk
    where
        S: VoxelSource + ?Sized,
        C: ColorLookup + ?Sized;

    /// Drops every chunk that was not built from `source_version`.
    fn invalidate(&mut self, source_version: VersionId);

    fn release_all(&mut self);

    /// Bytes of texel and palette data held.
    fn num_bytes(&self) -> usize;

    fn num_chunks(&self) -> usize;
}
