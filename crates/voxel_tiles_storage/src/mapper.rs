//! Turning raw voxels into texels.
//!
//! Indexed voxels (`U8` and `U16`) become color map indices as `(voxel << shift) + offset`, clamped to the map. The mapper
//! then either looks every index up into RGBA texels, or keeps the indices and builds a compact palette of just the entries
//! the block uses. RGBA voxels are passed through unchanged. In every case the texels are padded out to power-of-two
//! dimensions with transparent texels.
//!
//! ```
//! use voxel_tiles_core::prelude::*;
//! use voxel_tiles_storage::prelude::*;
//!
//! let map = ColorMap::from_rgba8((0..=255u8).map(|i| [i, 0, 0, 255]).collect());
//! let mapper = ColorMapper::default();
//!
//! let voxels = [1u8, 2, 3];
//! let chunk = mapper.map(&voxels, VoxelFormat::U8, PointN([3, 1, 1]), &map, VersionId::next());
//!
//! assert_eq!(chunk.texture_shape(), PointN([4, 1, 1]));
//! assert_eq!(
//!     chunk.texels(),
//!     &TexelData::Rgba(vec![[1, 0, 0, 255], [2, 0, 0, 255], [3, 0, 0, 255], [0, 0, 0, 0]])
//! );
//! ```

use crate::{ColorLookup, Palette, Rgba8, TexelData, TextureChunk, VersionId, VoxelFormat};

use voxel_tiles_core::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The largest palette that 16-bit indices can address.
pub const MAX_PALETTE_LEN: usize = 1 << 16;

/// Converts voxel blocks into `TextureChunk`s.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct ColorMapper {
    /// Voxel values are shifted left by this many bits before `offset` is added.
    pub shift: u32,
    pub offset: i32,
    /// Keep indices and build a compact palette instead of expanding to RGBA.
    pub paletted: bool,
}

impl ColorMapper {
    pub fn paletted() -> Self {
        Self {
            paletted: true,
            ..Default::default()
        }
    }

    /// The color map index for one voxel value.
    #[inline]
    pub fn index_of(&self, voxel: u32, map_len: usize) -> usize {
        // Saturates when the shifted value no longer fits in an i64.
        let shifted = match voxel {
            0 => 0,
            v if self.shift <= v.leading_zeros() + 31 => (v as i64) << self.shift,
            _ => i64::MAX,
        };
        let index = shifted.saturating_add(self.offset as i64);

        index.max(0).min(map_len as i64 - 1) as usize
    }

    /// Maps `raw`, a tightly packed block of `shape` voxels in `format`, into a chunk of padded texture data.
    pub fn map<C>(
        &self,
        raw: &[u8],
        format: VoxelFormat,
        shape: Point3i,
        color_map: &C,
        source_version: VersionId,
    ) -> TextureChunk
    where
        C: ColorLookup + ?Sized,
    {
        assert!(shape > Point3i::ZERO, "cannot map empty block {:?}", shape);
        assert_eq!(
            raw.len(),
            shape.volume() as usize * format.bytes_per_voxel(),
            "block of {:?} voxels has wrong length",
            shape
        );
        assert!(!color_map.is_empty(), "cannot map through an empty color map");

        let texture_shape = shape.next_powers_of_2();

        if format.is_rgba() {
            let texels: &[Rgba8] = bytemuck::cast_slice(raw);
            let padded = pad_texels(texels, shape, texture_shape, [0; 4]);

            return TextureChunk::new(
                shape,
                texture_shape,
                TexelData::Rgba(padded),
                None,
                color_map.version(),
                source_version,
                false,
            );
        }

        let indices = self.indices(raw, format, color_map.len());

        if self.paletted {
            if let Some(chunk) =
                self.map_paletted(&indices, shape, texture_shape, color_map, source_version)
            {
                return chunk;
            }
        }

        let colors: Vec<Rgba8> = indices.iter().map(|&i| color_map.lookup(i)).collect();
        let invisible = colors.iter().all(|c| c[3] == 0);
        let padded = pad_texels(&colors, shape, texture_shape, [0; 4]);

        TextureChunk::new(
            shape,
            texture_shape,
            TexelData::Rgba(padded),
            None,
            color_map.version(),
            source_version,
            invisible,
        )
    }

    fn indices(&self, raw: &[u8], format: VoxelFormat, map_len: usize) -> Vec<usize> {
        match format {
            VoxelFormat::U8 => raw
                .iter()
                .map(|&v| self.index_of(v as u32, map_len))
                .collect(),
            VoxelFormat::U16 => raw
                .chunks_exact(2)
                .map(|b| self.index_of(u16::from_ne_bytes([b[0], b[1]]) as u32, map_len))
                .collect(),
            VoxelFormat::Rgba8 => unreachable!("RGBA voxels are not indexed"),
        }
    }

    /// Returns `None` if the used entries do not fit in a 16-bit palette.
    fn map_paletted<C>(
        &self,
        indices: &[usize],
        shape: Point3i,
        texture_shape: Point3i,
        color_map: &C,
        source_version: VersionId,
    ) -> Option<TextureChunk>
    where
        C: ColorLookup + ?Sized,
    {
        let mut used = vec![false; color_map.len()];
        for &i in indices.iter() {
            used[i] = true;
        }
        let source_indices: Vec<usize> = used
            .iter()
            .enumerate()
            .filter_map(|(i, &u)| if u { Some(i) } else { None })
            .collect();

        // Padding texels need a transparent slot of their own.
        let needs_padding = texture_shape != shape;
        let min_len = source_indices.len() + needs_padding as usize;
        let palette_len = compact_palette_len(min_len);
        if palette_len > MAX_PALETTE_LEN {
            return None;
        }

        let mut compact = vec![0usize; color_map.len()];
        let mut entries = vec![[0; 4]; palette_len];
        for (slot, &index) in source_indices.iter().enumerate() {
            compact[index] = slot;
            entries[slot] = color_map.lookup(index);
        }
        let pad_slot = source_indices.len();

        let texels = if palette_len <= 256 {
            let slots: Vec<u8> = indices.iter().map(|&i| compact[i] as u8).collect();
            TexelData::Indexed8(pad_texels(&slots, shape, texture_shape, pad_slot as u8))
        } else {
            let slots: Vec<u16> = indices.iter().map(|&i| compact[i] as u16).collect();
            TexelData::Indexed16(pad_texels(&slots, shape, texture_shape, pad_slot as u16))
        };

        Some(TextureChunk::new(
            shape,
            texture_shape,
            texels,
            Some(Palette {
                entries,
                source_indices,
            }),
            color_map.version(),
            source_version,
            false,
        ))
    }
}

/// The palette length for `num_used` entries: the smallest power of two that is at least 2 and holds them all.
#[inline]
pub fn compact_palette_len(num_used: usize) -> usize {
    let mut len = 2;
    while len < num_used {
        len *= 2;
    }

    len
}

/// Copies `texels` with `shape` into a buffer with `texture_shape`, filling the rest with `fill`. The row stride of the
/// output is `texture_shape.x()`.
pub fn pad_texels<T: Copy>(texels: &[T], shape: Point3i, texture_shape: Point3i, fill: T) -> Vec<T> {
    debug_assert_eq!(texels.len(), shape.volume() as usize);
    debug_assert!(shape <= texture_shape);

    if shape == texture_shape {
        return texels.to_vec();
    }

    let mut out = vec![fill; texture_shape.volume() as usize];
    let row_len = shape.x() as usize;
    let mut src = texels.chunks_exact(row_len);
    for z in 0..shape.z() {
        for y in 0..shape.y() {
            let dst = ((y + z * texture_shape.y()) * texture_shape.x()) as usize;
            if let Some(row) = src.next() {
                out[dst..dst + row_len].copy_from_slice(row);
            }
        }
    }

    out
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
    use crate::ColorMap;

    use pretty_assertions::assert_eq;

    fn gray_map(n: usize) -> ColorMap {
        ColorMap::from_rgba8((0..n).map(|i| [i as u8, i as u8, i as u8, 255]).collect())
    }

    #[test]
    fn index_transform_clamps_to_map() {
        let mapper = ColorMapper {
            shift: 1,
            offset: -3,
            paletted: false,
        };

        assert_eq!(mapper.index_of(0, 10), 0);
        assert_eq!(mapper.index_of(2, 10), 1);
        assert_eq!(mapper.index_of(100, 10), 9);
    }

    #[test]
    fn oversized_shift_clamps_to_last_entry() {
        for &shift in &[33, 63, 64, 200] {
            let mapper = ColorMapper {
                shift,
                offset: 0,
                paletted: false,
            };

            assert_eq!(mapper.index_of(1, 256), 255, "shift {}", shift);
            assert_eq!(mapper.index_of(u32::MAX, 256), 255, "shift {}", shift);
            assert_eq!(mapper.index_of(0, 256), 0, "shift {}", shift);
        }
    }

    #[test]
    fn rgba_mapping_applies_thresholds() {
        let map = gray_map(8).with_transparency_thresholds(2, 5);
        let voxels: Vec<u8> = (0..8).collect();

        let chunk = ColorMapper::default().map(
            &voxels,
            VoxelFormat::U8,
            PointN([2, 2, 2]),
            &map,
            VersionId::next(),
        );

        let alphas: Vec<u8> = match chunk.texels() {
            TexelData::Rgba(t) => t.iter().map(|c| c[3]).collect(),
            other => panic!("expected RGBA texels, got {:?}", other),
        };
        assert_eq!(alphas, vec![0, 0, 255, 255, 255, 255, 0, 0]);
        assert_eq!(chunk.color_map_version(), map.version());
        assert!(!chunk.is_invisible());
    }

    #[test]
    fn fully_transparent_block_is_invisible() {
        let map = gray_map(8).with_transparency_thresholds(4, 7);
        let voxels = vec![0u8, 1, 2, 3];

        let chunk = ColorMapper::default().map(
            &voxels,
            VoxelFormat::U8,
            PointN([2, 2, 1]),
            &map,
            VersionId::next(),
        );

        assert!(chunk.is_invisible());
    }

    #[test]
    fn palette_holds_only_used_entries() {
        let map = gray_map(256);
        let voxels = vec![7u8, 7, 9, 200, 9, 7, 7, 200];

        let chunk = ColorMapper::paletted().map(
            &voxels,
            VoxelFormat::U8,
            PointN([2, 2, 2]),
            &map,
            VersionId::next(),
        );

        let palette = chunk.palette().unwrap();
        assert_eq!(palette.source_indices, vec![7, 9, 200]);
        assert_eq!(palette.entries.len(), 4);
        assert_eq!(palette.entries[2], [200, 200, 200, 255]);
        assert_eq!(palette.entries[3], [0, 0, 0, 0]);
        assert_eq!(
            chunk.texels(),
            &TexelData::Indexed8(vec![0, 0, 1, 2, 1, 0, 0, 2])
        );
        assert!(!chunk.is_invisible());
    }

    #[test]
    fn large_palettes_use_sixteen_bit_indices() {
        let map = gray_map(1000);
        let voxels: Vec<u16> = (0..512).collect();

        let chunk = ColorMapper::paletted().map(
            bytemuck::cast_slice(&voxels),
            VoxelFormat::U16,
            PointN([8, 8, 8]),
            &map,
            VersionId::next(),
        );

        assert_eq!(chunk.palette().unwrap().entries.len(), 512);
        assert!(matches!(chunk.texels(), TexelData::Indexed16(_)));
    }

    #[test]
    fn palette_length_doubles_from_two() {
        assert_eq!(compact_palette_len(0), 2);
        assert_eq!(compact_palette_len(2), 2);
        assert_eq!(compact_palette_len(3), 4);
        assert_eq!(compact_palette_len(257), 512);
    }

    #[test]
    fn padding_keeps_row_stride_of_texture() {
        let texels = vec![1, 2, 3, 4, 5, 6];

        let padded = pad_texels(&texels, PointN([3, 2, 1]), PointN([4, 2, 1]), 0);

        assert_eq!(padded, vec![1, 2, 3, 0, 4, 5, 6, 0]);
    }

    #[test]
    fn padded_palette_reserves_transparent_slot() {
        let map = gray_map(4);
        let voxels = vec![0u8, 1, 2];

        let chunk = ColorMapper::paletted().map(
            &voxels,
            VoxelFormat::U8,
            PointN([3, 1, 1]),
            &map,
            VersionId::next(),
        );

        assert_eq!(chunk.texels(), &TexelData::Indexed8(vec![0, 1, 2, 3]));
        assert_eq!(chunk.palette().unwrap().entries[3], [0, 0, 0, 0]);
    }

    #[test]
    fn rgba_voxels_pass_through() {
        let voxels: Vec<Rgba8> = vec![[1, 2, 3, 0], [4, 5, 6, 0]];
        let map = gray_map(2);

        let chunk = ColorMapper::paletted().map(
            bytemuck::cast_slice(&voxels),
            VoxelFormat::Rgba8,
            PointN([2, 1, 1]),
            &map,
            VersionId::next(),
        );

        assert_eq!(chunk.texels(), &TexelData::Rgba(voxels));
        assert!(!chunk.is_paletted());
        assert!(!chunk.is_invisible());
    }

    #[test]
    fn recolor_swaps_palette_entries() {
        let voxels = vec![1u8, 3];
        let mut chunk = ColorMapper::paletted().map(
            &voxels,
            VoxelFormat::U8,
            PointN([2, 1, 1]),
            &gray_map(4),
            VersionId::next(),
        );
        let red = ColorMap::from_rgba8((0..4).map(|i| [i as u8 * 10, 0, 0, 255]).collect());

        assert!(chunk.recolor(&red));

        assert_eq!(chunk.color_map_version(), red.version());
        assert_eq!(chunk.palette().unwrap().entries, vec![[10, 0, 0, 255], [30, 0, 0, 255]]);
        assert!(!chunk.recolor(&gray_map(2)));
    }
}
