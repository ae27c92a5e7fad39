//! The voxel data a volume is rendered from.
//!
//! A `VoxelSource` is a read-only view of one contiguous voxel buffer, laid out with X varying fastest, then Y, then Z. The
//! renderer never owns voxel data; it borrows a source for each request and uses the source's `VersionId` to decide whether
//! cached textures are still valid.
//!
//! ```
//! use voxel_tiles_core::prelude::*;
//! use voxel_tiles_storage::prelude::*;
//!
//! let mut buffer = VoxelBuffer::from_u8(PointN([2, 2, 2]), (0..8).collect());
//! let before = buffer.version();
//!
//! buffer.bytes_mut()[0] = 255;
//! assert!(buffer.version() > before);
//! ```

use voxel_tiles_core::prelude::*;

use auto_impl::auto_impl;
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An id that changes whenever the data it is attached to changes. Ids come from one process-wide counter, so two different
/// pieces of data never share an id and newer ids compare greater.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct VersionId(u64);

impl VersionId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);

        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// How each voxel is encoded in the source buffer.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum VoxelFormat {
    /// One byte per voxel, mapped through a color map.
    U8,
    /// Two native-endian bytes per voxel, mapped through a color map.
    U16,
    /// Four bytes per voxel, already RGBA. These bypass color mapping.
    Rgba8,
}

impl VoxelFormat {
    #[inline]
    pub fn bytes_per_voxel(&self) -> usize {
        match self {
            VoxelFormat::U8 => 1,
            VoxelFormat::U16 => 2,
            VoxelFormat::Rgba8 => 4,
        }
    }

    #[inline]
    pub fn is_rgba(&self) -> bool {
        matches!(self, VoxelFormat::Rgba8)
    }
}

/// A read-only view of a voxel buffer.
#[auto_impl(&, &mut, Box, Rc, Arc)]
pub trait VoxelSource {
    /// The number of voxels along each axis.
    fn dimensions(&self) -> Point3i;

    fn format(&self) -> VoxelFormat;

    /// Must change whenever the contents of `raw_bytes` change.
    fn version(&self) -> VersionId;

    /// The voxels, X fastest, then Y, then Z. The length is `dimensions().volume() * format().bytes_per_voxel()`.
    fn raw_bytes(&self) -> &[u8];

    /// The box the volume occupies in object space.
    fn bounding_box(&self) -> Extent3f;

    #[inline]
    fn bytes_per_voxel(&self) -> usize {
        self.format().bytes_per_voxel()
    }

    /// The voxel-space extent, with minimum at the origin.
    #[inline]
    fn extent(&self) -> Extent3i {
        Extent3i::from_min_and_shape(Point3i::ZERO, self.dimensions())
    }

    /// The object-space size of one voxel.
    #[inline]
    fn voxel_size(&self) -> Point3f {
        self.bounding_box().shape / Point3f::from(self.dimensions())
    }
}

/// A `VoxelSource` that owns its voxels.
#[derive(Clone, Debug)]
pub struct VoxelBuffer {
    dimensions: Point3i,
    format: VoxelFormat,
    bytes: Vec<u8>,
    bounding_box: Extent3f,
    version: VersionId,
}

impl VoxelBuffer {
    /// The bounding box defaults to one unit per voxel, centered on the origin.
    pub fn new(dimensions: Point3i, format: VoxelFormat, bytes: Vec<u8>) -> Self {
        assert!(
            dimensions > Point3i::ZERO,
            "voxel dimensions must be positive, got {:?}",
            dimensions
        );
        assert_eq!(
            bytes.len(),
            dimensions.volume() as usize * format.bytes_per_voxel(),
            "buffer length does not match {:?} voxels of {:?}",
            dimensions,
            format
        );

        let shape = Point3f::from(dimensions);
        let bounding_box = Extent3f::from_min_and_shape(shape * -0.5, shape);

        Self {
            dimensions,
            format,
            bytes,
            bounding_box,
            version: VersionId::next(),
        }
    }

    pub fn from_u8(dimensions: Point3i, voxels: Vec<u8>) -> Self {
        Self::new(dimensions, VoxelFormat::U8, voxels)
    }

    pub fn from_u16(dimensions: Point3i, voxels: &[u16]) -> Self {
        Self::new(
            dimensions,
            VoxelFormat::U16,
            bytemuck::cast_slice(voxels).to_vec(),
        )
    }

    pub fn from_rgba8(dimensions: Point3i, voxels: &[[u8; 4]]) -> Self {
        Self::new(
            dimensions,
            VoxelFormat::Rgba8,
            bytemuck::cast_slice(voxels).to_vec(),
        )
    }

    /// A buffer where every voxel has the value `f(p)`.
    pub fn fill_with_u8(dimensions: Point3i, f: impl Fn(Point3i) -> u8) -> Self {
        let extent = Extent3i::from_min_and_shape(Point3i::ZERO, dimensions);

        Self::from_u8(dimensions, extent.iter_points().map(f).collect())
    }

    pub fn with_bounding_box(mut self, bounding_box: Extent3f) -> Self {
        self.bounding_box = bounding_box;

        self
    }

    /// Mutably borrow the voxels. This counts as a modification, so the version changes.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        self.version = VersionId::next();

        &mut self.bytes
    }

    /// Replaces all voxels, keeping the dimensions and format.
    pub fn set_bytes(&mut self, bytes: Vec<u8>) {
        assert_eq!(bytes.len(), self.bytes.len());
        self.bytes = bytes;
        self.version = VersionId::next();
    }
}

impl VoxelSource for VoxelBuffer {
    #[inline]
    fn dimensions(&self) -> Point3i {
        self.dimensions
    }

    #[inline]
    fn format(&self) -> VoxelFormat {
        self.format
    }

    #[inline]
    fn version(&self) -> VersionId {
        self.version
    }

    #[inline]
    fn raw_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    fn bounding_box(&self) -> Extent3f {
        self.bounding_box
    }
}

// ████████╗███████╗███████╗████████╗███████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝
//    ██║   █████╗  ███████╗   ██║   ███████╗
//    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║
//    ██║   ███████╗███████║   ██║   ███████║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝
