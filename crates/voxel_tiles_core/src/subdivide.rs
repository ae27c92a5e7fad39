//! Tiling of a bounding volume into fixed-size cells.
//!
//! A volume is rendered as a grid of cells (3D sub-cubes or 2D pages), each small enough to fit in one texture. The grid is
//! built by stepping one cell-sized box across the volume along each axis. Cells on the far boundary are cropped to the
//! volume, so the union of all cells is exactly the volume and no cell reaches outside of it.
//!
//! ```
//! use voxel_tiles_core::prelude::*;
//! use voxel_tiles_core::subdivide::tile;
//!
//! let volume = Extent3i::from_min_and_shape(Point3i::ZERO, PointN([5, 4, 1]));
//! let cell = Extent3i::from_min_and_shape(Point3i::ZERO, PointN([2, 2, 1]));
//!
//! let cells = tile(&volume, &cell);
//! assert_eq!(cells.len(), 6);
//!
//! // The last cell in each row is cropped.
//! assert_eq!(cells[2], Extent3i::from_min_and_shape(PointN([4, 0, 0]), PointN([1, 2, 1])));
//! ```

use crate::{Axis3, Extent3i, Point, Point3i, PointN, SmallZero};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Collects the translations of `cell_box` along `axis`, stepping by its own shape while it still intersects `main_box`. A
/// translated box that is not fully inside `main_box` is cropped to it.
pub fn tile_in_direction(main_box: &Extent3i, cell_box: &Extent3i, axis: Axis3) -> Vec<Extent3i> {
    assert_valid_cell(main_box, cell_box);

    let mut boxes = Vec::new();
    step_in_direction(main_box, cell_box, axis, |b| boxes.push(b));

    boxes
}

/// The number of cells along `axis` needed to cover `main_box`.
pub fn count_in_direction(main_box: &Extent3i, cell_box: &Extent3i, axis: Axis3) -> i32 {
    assert_valid_cell(main_box, cell_box);

    let mut count = 0;
    step_in_direction(main_box, cell_box, axis, |_| count += 1);

    count
}

/// The number of cells along each axis needed to cover `main_box`.
pub fn grid_shape(main_box: &Extent3i, cell_box: &Extent3i) -> Point3i {
    PointN([
        count_in_direction(main_box, cell_box, Axis3::X),
        count_in_direction(main_box, cell_box, Axis3::Y),
        count_in_direction(main_box, cell_box, Axis3::Z),
    ])
}

/// Tiles `main_box` with translations of `cell_box`, which must intersect `main_box` and is normally placed at its minimum
/// corner. Cells are returned with X varying fastest, then Y, then Z. Empty crops are skipped.
pub fn tile(main_box: &Extent3i, cell_box: &Extent3i) -> Vec<Extent3i> {
    assert_valid_cell(main_box, cell_box);

    let shape = grid_shape(main_box, cell_box);
    let mut cells = Vec::with_capacity(shape.volume() as usize);
    for depth in 0..shape.z() {
        for row in 0..shape.y() {
            for col in 0..shape.x() {
                let offset = PointN([col, row, depth]) * cell_box.shape;
                let cell = (*cell_box + offset).intersection(main_box);
                if !cell.is_empty() {
                    cells.push(cell);
                }
            }
        }
    }

    cells
}

fn assert_valid_cell(main_box: &Extent3i, cell_box: &Extent3i) {
    assert!(
        cell_box.shape > Point3i::ZERO,
        "cell shape must be positive, got {:?}",
        cell_box.shape
    );
    assert!(
        cell_box.intersects(main_box),
        "cell {:?} does not intersect {:?}",
        cell_box,
        main_box
    );
}

fn step_in_direction(
    main_box: &Extent3i,
    cell_box: &Extent3i,
    axis: Axis3,
    mut visitor: impl FnMut(Extent3i),
) {
    let step = axis.get_unit_vector() * cell_box.shape.on_axis(axis);
    let mut b = *cell_box;
    while b.intersects(main_box) {
        if b.is_subset_of(main_box) {
            visitor(b);
        } else {
            let cropped = b.intersection(main_box);
            if !cropped.is_empty() {
                visitor(cropped);
            }
        }
        b = b + step;
    }
}

/// A cell's position in the grid, as `(column, row, depth)`.
pub type CellIndex = Point3i;

/// The grid of cells covering one volume with one cell shape. This must be rebuilt whenever either one changes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct CellGrid {
    volume: Extent3i,
    cell_shape: Point3i,
    grid_shape: Point3i,
}

impl CellGrid {
    pub fn new(volume: Extent3i, cell_shape: Point3i) -> Self {
        assert!(!volume.is_empty(), "cannot subdivide an empty volume");

        let first_cell = Extent3i::from_min_and_shape(volume.minimum, cell_shape);
        let grid_shape = grid_shape(&volume, &first_cell);

        Self {
            volume,
            cell_shape,
            grid_shape,
        }
    }

    #[inline]
    pub fn volume(&self) -> &Extent3i {
        &self.volume
    }

    #[inline]
    pub fn cell_shape(&self) -> Point3i {
        self.cell_shape
    }

    /// The number of cells along each axis.
    #[inline]
    pub fn grid_shape(&self) -> Point3i {
        self.grid_shape
    }

    #[inline]
    pub fn num_cells(&self) -> usize {
        self.grid_shape.volume() as usize
    }

    #[inline]
    pub fn contains_index(&self, index: CellIndex) -> bool {
        Point3i::ZERO <= index && index < self.grid_shape
    }

    /// The flat array offset of `index`, as `col + row * ncols + depth * ncols * nrows`.
    #[inline]
    pub fn linear_index(&self, index: CellIndex) -> usize {
        debug_assert!(self.contains_index(index), "{:?} outside of grid", index);

        let cols = self.grid_shape.x();
        let rows = self.grid_shape.y();

        (index.x() + index.y() * cols + index.z() * cols * rows) as usize
    }

    /// Inverse of `linear_index`.
    #[inline]
    pub fn cell_index(&self, linear: usize) -> CellIndex {
        let linear = linear as i32;
        let layer = self.grid_shape.x() * self.grid_shape.y();

        PointN([
            linear % self.grid_shape.x(),
            (linear % layer) / self.grid_shape.x(),
            linear / layer,
        ])
    }

    /// The voxel-space extent of the cell at `index`, cropped to the volume.
    #[inline]
    pub fn cell_extent(&self, index: CellIndex) -> Extent3i {
        assert!(self.contains_index(index), "{:?} outside of grid", index);

        let min = self.volume.minimum + index * self.cell_shape;

        Extent3i::from_min_and_shape(min, self.cell_shape).intersection(&self.volume)
    }

    /// The index of the cell containing voxel `p`, if it's in the volume.
    #[inline]
    pub fn cell_containing(&self, p: Point3i) -> Option<CellIndex> {
        if !self.volume.contains(p) {
            return None;
        }
        let local = p - self.volume.minimum;

        Some(PointN([
            local.x() / self.cell_shape.x(),
            local.y() / self.cell_shape.y(),
            local.z() / self.cell_shape.z(),
        ]))
    }

    /// All cell indices, in the same order as `linear_index`.
    #[inline]
    pub fn iter_indices(&self) -> impl Iterator<Item = CellIndex> {
        Extent3i::from_min_and_shape(Point3i::ZERO, self.grid_shape).iter_points()
    }

    /// All `(index, extent)` pairs, in the same order as `linear_index`.
    pub fn iter_cells(&self) -> impl Iterator<Item = (CellIndex, Extent3i)> + '_ {
        self.iter_indices().map(move |i| (i, self.cell_extent(i)))
    }
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
    use crate::IntegerPoint;

    use pretty_assertions::assert_eq;
    use rand::Rng;

    fn extent(min: [i32; 3], shape: [i32; 3]) -> Extent3i {
        Extent3i::from_min_and_shape(PointN(min), PointN(shape))
    }

    fn assert_exact_cover(main_box: &Extent3i, cells: &[Extent3i]) {
        let mut hits = vec![0u8; main_box.num_points()];
        for cell in cells.iter() {
            assert!(!cell.is_empty());
            assert!(cell.is_subset_of(main_box), "{:?} escapes {:?}", cell, main_box);
            for p in cell.iter_points() {
                let local = p - main_box.minimum;
                let i = local.x()
                    + local.y() * main_box.shape.x()
                    + local.z() * main_box.shape.x() * main_box.shape.y();
                hits[i as usize] += 1;
            }
        }
        assert!(hits.iter().all(|h| *h == 1), "cells have gaps or overlaps");
    }

    #[test]
    fn four_cubed_volume_has_eight_two_cubed_cells() {
        let volume = extent([0, 0, 0], [4, 4, 4]);
        let cell = extent([0, 0, 0], [2, 2, 2]);

        let cells = tile(&volume, &cell);

        assert_eq!(cells.len(), 8);
        assert_eq!(cells[0], extent([0, 0, 0], [2, 2, 2]));
        assert_eq!(cells[7], extent([2, 2, 2], [2, 2, 2]));
        assert_exact_cover(&volume, &cells);
    }

    #[test]
    fn boundary_cells_are_cropped() {
        let volume = extent([0, 0, 0], [5, 3, 1]);
        let cell = extent([0, 0, 0], [2, 2, 2]);

        assert_eq!(grid_shape(&volume, &cell), PointN([3, 2, 1]));
        assert_eq!(
            tile_in_direction(&volume, &cell, Axis3::X),
            vec![
                extent([0, 0, 0], [2, 2, 1]),
                extent([2, 0, 0], [2, 2, 1]),
                extent([4, 0, 0], [1, 2, 1]),
            ]
        );
        assert_exact_cover(&volume, &tile(&volume, &cell));
    }

    #[test]
    fn random_volumes_are_covered_exactly() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let min = PointN([
                rng.gen_range(-8..8),
                rng.gen_range(-8..8),
                rng.gen_range(-8..8),
            ]);
            let shape = PointN([
                rng.gen_range(1..12),
                rng.gen_range(1..12),
                rng.gen_range(1..12),
            ]);
            let cell_shape = PointN([
                rng.gen_range(1..6),
                rng.gen_range(1..6),
                rng.gen_range(1..6),
            ]);
            let volume = Extent3i::from_min_and_shape(min, shape);
            let cell = Extent3i::from_min_and_shape(min, cell_shape);

            let cells = tile(&volume, &cell);

            assert_eq!(cells.len(), shape.div_ceil(&cell_shape).volume() as usize);
            assert_exact_cover(&volume, &cells);
        }
    }

    #[test]
    fn count_matches_ceil_division() {
        let volume = extent([0, 0, 0], [100, 33, 64]);
        let cell = extent([0, 0, 0], [32, 32, 32]);

        assert_eq!(count_in_direction(&volume, &cell, Axis3::X), 4);
        assert_eq!(count_in_direction(&volume, &cell, Axis3::Y), 2);
        assert_eq!(count_in_direction(&volume, &cell, Axis3::Z), 2);
    }

    #[test]
    #[should_panic]
    fn disjoint_cell_is_a_contract_violation() {
        let volume = extent([0, 0, 0], [4, 4, 4]);
        let cell = extent([10, 10, 10], [2, 2, 2]);

        tile(&volume, &cell);
    }

    #[test]
    fn grid_indexing_round_trips() {
        let grid = CellGrid::new(extent([0, 0, 0], [5, 4, 3]), PointN([2, 2, 2]));

        assert_eq!(grid.grid_shape(), PointN([3, 2, 2]));
        for (linear, index) in grid.iter_indices().enumerate() {
            assert_eq!(grid.linear_index(index), linear);
            assert_eq!(grid.cell_index(linear), index);
        }
    }

    #[test]
    fn grid_cells_match_tiling() {
        let volume = extent([1, 2, 3], [7, 5, 3]);
        let grid = CellGrid::new(volume, PointN([4, 4, 4]));

        let from_grid: Vec<_> = grid.iter_cells().map(|(_, e)| e).collect();
        let from_tile = tile(&volume, &Extent3i::from_min_and_shape(volume.minimum, PointN([4, 4, 4])));

        assert_eq!(from_grid, from_tile);
    }

    #[test]
    fn cell_containing_voxel() {
        let grid = CellGrid::new(extent([0, 0, 0], [8, 8, 8]), PointN([4, 4, 4]));

        assert_eq!(grid.cell_containing(PointN([5, 1, 7])), Some(PointN([1, 0, 1])));
        assert_eq!(grid.cell_containing(PointN([8, 0, 0])), None);
    }
}
