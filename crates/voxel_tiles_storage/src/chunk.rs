use crate::{ColorLookup, Rgba8, VersionId};

use voxel_tiles_core::prelude::*;

/// Texels of a `TextureChunk`, either full colors or indices into the chunk's palette.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TexelData {
    Rgba(Vec<Rgba8>),
    Indexed8(Vec<u8>),
    Indexed16(Vec<u16>),
}

impl TexelData {
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            TexelData::Rgba(t) => t.len(),
            TexelData::Indexed8(t) => t.len(),
            TexelData::Indexed16(t) => t.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_paletted(&self) -> bool {
        !matches!(self, TexelData::Rgba(_))
    }

    /// The texels as they would be uploaded.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            TexelData::Rgba(t) => bytemuck::cast_slice(t),
            TexelData::Indexed8(t) => t,
            TexelData::Indexed16(t) => bytemuck::cast_slice(t),
        }
    }
}

/// The colors referenced by a paletted chunk.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Palette {
    /// Length is a power of two, at least 2. Unused slots are transparent.
    pub entries: Vec<Rgba8>,
    /// For each used slot, the color map index it was taken from.
    pub source_indices: Vec<usize>,
}

impl Palette {
    #[inline]
    pub fn num_bytes(&self) -> usize {
        self.entries.len() * core::mem::size_of::<Rgba8>()
    }
}

/// A color-mapped block of voxels, padded to power-of-two dimensions, ready to become a texture.
///
/// For 2D pages the depth of `shape` is 1.
#[derive(Clone, Debug)]
pub struct TextureChunk {
    shape: Point3i,
    texture_shape: Point3i,
    texels: TexelData,
    palette: Option<Palette>,
    color_map_version: VersionId,
    source_version: VersionId,
    invisible: bool,
}

impl TextureChunk {
    pub(crate) fn new(
        shape: Point3i,
        texture_shape: Point3i,
        texels: TexelData,
        palette: Option<Palette>,
        color_map_version: VersionId,
        source_version: VersionId,
        invisible: bool,
    ) -> Self {
        debug_assert_eq!(texels.len(), texture_shape.volume() as usize);
        debug_assert!(texture_shape.dimensions_are_powers_of_2());

        Self {
            shape,
            texture_shape,
            texels,
            palette,
            color_map_version,
            source_version,
            invisible,
        }
    }

    /// The number of voxels along each axis that carry data.
    #[inline]
    pub fn shape(&self) -> Point3i {
        self.shape
    }

    /// The padded, power-of-two texture dimensions. The row stride is `texture_shape.x()`.
    #[inline]
    pub fn texture_shape(&self) -> Point3i {
        self.texture_shape
    }

    #[inline]
    pub fn texels(&self) -> &TexelData {
        &self.texels
    }

    #[inline]
    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    #[inline]
    pub fn is_paletted(&self) -> bool {
        self.palette.is_some()
    }

    #[inline]
    pub fn color_map_version(&self) -> VersionId {
        self.color_map_version
    }

    #[inline]
    pub fn source_version(&self) -> VersionId {
        self.source_version
    }

    /// `true` iff every texel is fully transparent. Never set for paletted or passthrough chunks.
    #[inline]
    pub fn is_invisible(&self) -> bool {
        self.invisible
    }

    /// Bytes of texel and palette data.
    #[inline]
    pub fn num_bytes(&self) -> usize {
        self.texels.as_bytes().len() + self.palette.as_ref().map(Palette::num_bytes).unwrap_or(0)
    }

    #[inline]
    pub fn num_texels(&self) -> usize {
        self.texels.len()
    }

    /// The texture coordinate scale for this chunk: each axis is `texture_shape` in texels, plus one on any padded axis.
    pub fn texture_dims_modded(&self) -> Point3f {
        let mut dims = Point3f::from(self.texture_shape);
        for axis in Axis3::ALL.iter().cloned() {
            if self.texture_shape.on_axis(axis) != self.shape.on_axis(axis) {
                *dims.at_mut(axis) += 1.0;
            }
        }

        dims
    }

    /// Rebuilds the palette from `color_map` without touching the texels. Returns `false` if this chunk cannot be recolored,
    /// either because it holds RGBA texels or because the new map is too short.
    pub fn recolor<C>(&mut self, color_map: &C) -> bool
    where
        C: ColorLookup + ?Sized,
    {
        let palette = match self.palette.as_mut() {
            Some(p) => p,
            None => return false,
        };
        if palette.source_indices.iter().any(|&i| i >= color_map.len()) {
            return false;
        }

        for (slot, &index) in palette.source_indices.iter().enumerate() {
            palette.entries[slot] = color_map.lookup(index);
        }
        self.color_map_version = color_map.version();

        true
    }
}
