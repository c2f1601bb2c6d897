//! Grid coordinates, cells and whole-grid snapshots.
//!
//! The grid is a square of `size * size` cells stored row-major. On the
//! wire it is a list of rows, so a cell at `(x, y)` lives at
//! `data[y][x]`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::color::Color;

/// Largest supported grid dimension.
pub const MAX_GRID_SIZE: u32 = 1024;

/// A cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coord {
    /// Column, `0..size`.
    pub x: u32,
    /// Row, `0..size`.
    pub y: u32,
}

impl Coord {
    /// Resolve raw signed coordinates against a grid of dimension `size`.
    ///
    /// Returns `None` unless both `x` and `y` lie in `[0, size)`.
    pub fn within(x: i64, y: i64, size: u32) -> Option<Self> {
        let x = u32::try_from(x).ok()?;
        let y = u32::try_from(y).ok()?;
        (x < size && y < size).then_some(Self { x, y })
    }
}

/// A single committed cell as reported back to a writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CellView {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
    /// The stored color.
    #[ts(type = "string")]
    pub color: Color,
}

impl CellView {
    /// Pair a coordinate with its color.
    pub const fn new(coord: Coord, color: Color) -> Self {
        Self {
            x: coord.x,
            y: coord.y,
            color,
        }
    }
}

/// A square grid of colors with no holes.
///
/// Dimensions are fixed at construction. Every cell always holds a valid
/// [`Color`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasGrid {
    size: u32,
    cells: Vec<Color>,
}

impl CanvasGrid {
    /// Create a `size * size` grid with every cell set to `fill`.
    ///
    /// Returns `None` when `size` is zero or larger than
    /// [`MAX_GRID_SIZE`].
    pub fn new(size: u32, fill: Color) -> Option<Self> {
        if size == 0 || size > MAX_GRID_SIZE {
            return None;
        }
        let side = usize::try_from(size).ok()?;
        let len = side.checked_mul(side)?;
        Some(Self {
            size,
            cells: vec![fill; len],
        })
    }

    /// The grid dimension `N`.
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// The color at `coord`, or `None` if it lies outside this grid.
    pub fn get(&self, coord: Coord) -> Option<Color> {
        self.index(coord).and_then(|i| self.cells.get(i)).copied()
    }

    /// Overwrite the cell at `coord`, returning the stored color.
    ///
    /// Returns `None` and leaves the grid untouched if `coord` lies outside
    /// this grid.
    pub fn set(&mut self, coord: Coord, color: Color) -> Option<Color> {
        let i = self.index(coord)?;
        let cell = self.cells.get_mut(i)?;
        *cell = color;
        Some(color)
    }

    /// Copy the grid out as a list of rows (`rows[y][x]`).
    pub fn rows(&self) -> Vec<Vec<Color>> {
        let Ok(side) = usize::try_from(self.size) else {
            return Vec::new();
        };
        self.cells.chunks(side).map(<[Color]>::to_vec).collect()
    }

    /// Iterate over every coordinate together with its color, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (Coord, Color)> + '_ {
        let size = self.size;
        (0..size)
            .flat_map(move |y| (0..size).map(move |x| Coord { x, y }))
            .zip(self.cells.iter().copied())
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        if coord.x >= self.size || coord.y >= self.size {
            return None;
        }
        let side = usize::try_from(self.size).ok()?;
        let x = usize::try_from(coord.x).ok()?;
        let y = usize::try_from(coord.y).ok()?;
        y.checked_mul(side)?.checked_add(x)
    }
}
