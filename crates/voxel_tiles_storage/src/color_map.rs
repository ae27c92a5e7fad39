//! Color lookup tables (CLUTs).
//!
//! A `ColorMap` turns a voxel index into an RGBA color. It is immutable once built: changing the thresholds or alpha policy
//! produces a new map with a new `VersionId`, so textures built against the old map are never mistaken for current ones.
//!
//! ```
//! use voxel_tiles_storage::prelude::*;
//!
//! let gray: Vec<[u8; 4]> = (0..=255u8).map(|i| [i, i, i, i]).collect();
//! let map = ColorMap::from_rgba8(gray);
//! let windowed = map.clone().with_transparency_thresholds(10, 20);
//!
//! assert_ne!(map.version(), windowed.version());
//! assert_eq!(windowed.lookup(9), [0, 0, 0, 0]);
//! assert_eq!(windowed.lookup(15), [15, 15, 15, 15]);
//! ```

use crate::VersionId;

use auto_impl::auto_impl;
use core::hash::{BuildHasher, Hash, Hasher};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One texel or palette entry.
pub type Rgba8 = [u8; 4];

/// What a color map does with the alpha channel of its entries.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum AlphaPolicy {
    AsIs,
    /// Every alpha is 255.
    Opaque,
    /// Alpha 0 stays 0, anything else becomes 255.
    Binary,
}

impl Default for AlphaPolicy {
    fn default() -> Self {
        AlphaPolicy::AsIs
    }
}

impl AlphaPolicy {
    #[inline]
    fn apply(&self, alpha: u8) -> u8 {
        match self {
            AlphaPolicy::AsIs => alpha,
            AlphaPolicy::Opaque => 255,
            AlphaPolicy::Binary => {
                if alpha == 0 {
                    0
                } else {
                    255
                }
            }
        }
    }
}

/// The layout of a floating point transfer function.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FloatComponents {
    /// One value per entry, used for all four channels.
    Alpha,
    /// Luminance (used for red, green and blue) followed by alpha.
    LuminanceAlpha,
    Rgba,
}

impl FloatComponents {
    #[inline]
    pub fn count(&self) -> usize {
        match self {
            FloatComponents::Alpha => 1,
            FloatComponents::LuminanceAlpha => 2,
            FloatComponents::Rgba => 4,
        }
    }

    fn to_rgba8(&self, values: &[f32]) -> Rgba8 {
        let c = |v: f32| (v.max(0.0).min(1.0) * 255.0) as u8;
        match self {
            FloatComponents::Alpha => [c(values[0]); 4],
            FloatComponents::LuminanceAlpha => {
                let l = c(values[0]);
                [l, l, l, c(values[1])]
            }
            FloatComponents::Rgba => [c(values[0]), c(values[1]), c(values[2]), c(values[3])],
        }
    }
}

/// Anything the color mapper can read colors from.
#[auto_impl(&, Box, Arc)]
pub trait ColorLookup {
    /// Changes whenever any `lookup` result would change.
    fn version(&self) -> VersionId;

    /// The number of entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The color for `index`, with thresholds and alpha policy applied. `index` must be less than `len()`.
    fn lookup(&self, index: usize) -> Rgba8;

    /// Entries outside of the inclusive `[low, high]` range are fully transparent.
    fn transparency_thresholds(&self) -> (usize, usize);
}

/// A color lookup table with transparency thresholds.
#[derive(Clone, Debug)]
pub struct ColorMap {
    source_entries: Arc<[Rgba8]>,
    entries: Arc<[Rgba8]>,
    thresholds: (usize, usize),
    alpha_policy: AlphaPolicy,
    version: VersionId,
    fingerprint: u64,
}

impl ColorMap {
    /// A map with the given entries, no thresholding and `AlphaPolicy::AsIs`.
    pub fn from_rgba8(entries: Vec<Rgba8>) -> Self {
        assert!(!entries.is_empty(), "a color map needs at least one entry");

        let high = entries.len() - 1;

        Self::build(entries.into(), (0, high), AlphaPolicy::AsIs)
    }

    /// Converts floating point entries in `[0, 1]` to bytes. `values.len()` must be a multiple of the component count.
    pub fn from_floats(components: FloatComponents, values: &[f32]) -> Self {
        let n = components.count();
        assert!(
            !values.is_empty() && values.len() % n == 0,
            "{} values do not form whole {:?} entries",
            values.len(),
            components
        );

        Self::from_rgba8(
            values
                .chunks_exact(n)
                .map(|entry| components.to_rgba8(entry))
                .collect(),
        )
    }

    /// Returns a new map where entries outside of `[low, high]` are fully transparent.
    pub fn with_transparency_thresholds(self, low: usize, high: usize) -> Self {
        assert!(low <= high, "low threshold {} above high {}", low, high);
        assert!(
            high < self.source_entries.len(),
            "high threshold {} beyond {} entries",
            high,
            self.source_entries.len()
        );

        Self::build(self.source_entries, (low, high), self.alpha_policy)
    }

    pub fn with_alpha_policy(self, alpha_policy: AlphaPolicy) -> Self {
        Self::build(self.source_entries, self.thresholds, alpha_policy)
    }

    fn build(source_entries: Arc<[Rgba8]>, thresholds: (usize, usize), alpha_policy: AlphaPolicy) -> Self {
        let (low, high) = thresholds;
        let entries: Arc<[Rgba8]> = source_entries
            .iter()
            .enumerate()
            .map(|(i, &[r, g, b, a])| {
                if i < low || i > high {
                    [0; 4]
                } else {
                    [r, g, b, alpha_policy.apply(a)]
                }
            })
            .collect();

        let mut hasher = ahash::RandomState::with_seeds(0x5eed, 0xc1a7, 0x7ab1, 0xe5).build_hasher();
        entries.hash(&mut hasher);
        thresholds.hash(&mut hasher);
        alpha_policy.hash(&mut hasher);

        Self {
            source_entries,
            entries,
            thresholds,
            alpha_policy,
            version: VersionId::next(),
            fingerprint: hasher.finish(),
        }
    }

    #[inline]
    pub fn version(&self) -> VersionId {
        self.version
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn lookup(&self, index: usize) -> Rgba8 {
        self.entries[index]
    }

    /// All entries, with thresholds and alpha policy applied.
    #[inline]
    pub fn entries(&self) -> &Arc<[Rgba8]> {
        &self.entries
    }

    #[inline]
    pub fn alpha_policy(&self) -> AlphaPolicy {
        self.alpha_policy
    }

    /// A hash of the effective entries. Two maps with the same content have the same fingerprint regardless of version.
    #[inline]
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Returns `true` iff both maps produce the same colors, even if they have different versions.
    pub fn same_content(&self, other: &Self) -> bool {
        self.fingerprint == other.fingerprint && self.entries == other.entries
    }
}

impl ColorLookup for ColorMap {
    #[inline]
    fn version(&self) -> VersionId {
        self.version
    }

    #[inline]
    fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    fn lookup(&self, index: usize) -> Rgba8 {
        self.entries[index]
    }

    #[inline]
    fn transparency_thresholds(&self) -> (usize, usize) {
        self.thresholds
    }
}

// ████████╗███████╗███████╗████████╗███████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝
//    ██║   █████╗  ███████╗   ██║   ███████╗
//    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║
//    ██║   ███████╗███████║   ██║   ███████║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝
