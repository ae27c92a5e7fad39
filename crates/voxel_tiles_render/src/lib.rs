#![allow(clippy::too_many_arguments)]

//! Cutting a tiled volume with geometry and ordering the fragments for compositing.
//!
//! - `CuttingGeometry`: quads, face sets, triangle strips and planes, all reduced to convex polygons
//! - `SliceClipper`: clips those polygons against one cell, assigning 3D texture coordinates
//! - `order`: sorts the cells a pass reaches farthest first
//! - `RenderContext`: owns the page and cube caches for one volume and drives whole passes over them

pub mod clip;
pub mod composite;
pub mod context;
pub mod diagnostics;
pub mod geometry;
pub mod slicing;

pub use clip::*;
pub use composite::*;
pub use context::*;
pub use diagnostics::*;
pub use geometry::*;
pub use slicing::*;

pub mod prelude {
    pub use super::{
        box_planes, clip_polygon, order, plan_page_slices, AbortCode, Camera, ClipVertex,
        ClippedPolygon, CompositionMode, CuttingGeometry, DrawItem, HardwareLimits, PageDrawItem,
        Plane, Projection, RenderCandidate, RenderConfig, RenderContext, SliceClipper,
    };
}
