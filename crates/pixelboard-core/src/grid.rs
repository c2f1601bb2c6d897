//! The authoritative grid of cell colors.
//!
//! [`GridStore`] wraps a [`CanvasGrid`] in a [`RwLock`]. Writes take the
//! write lock for a single cell assignment; snapshots clone the whole grid
//! under the read lock, so a reader can never observe a torn grid. No cell
//! history is kept: every write is last-write-wins for its coordinate.

use pixelboard_types::{CanvasGrid, Color, Coord};
use tokio::sync::RwLock;
use tracing::trace;

use crate::error::GridError;

/// Owner of the shared grid.
#[derive(Debug)]
pub struct GridStore {
    size: u32,
    grid: RwLock<CanvasGrid>,
}

impl GridStore {
    /// Create a `size * size` grid filled with `fill`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidSize`] for a zero or unsupported size.
    pub fn new(size: u32, fill: Color) -> Result<Self, GridError> {
        let grid = CanvasGrid::new(size, fill).ok_or(GridError::InvalidSize { size })?;
        Ok(Self {
            size,
            grid: RwLock::new(grid),
        })
    }

    /// The grid dimension `N`. Fixed for the lifetime of the store.
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// A consistent copy of the whole grid.
    pub async fn snapshot(&self) -> CanvasGrid {
        self.grid.read().await.clone()
    }

    /// Check raw coordinates against the grid dimension.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] unless both lie in `[0, N)`.
    pub fn resolve(&self, x: i64, y: i64) -> Result<Coord, GridError> {
        Coord::within(x, y, self.size).ok_or(GridError::OutOfBounds {
            x,
            y,
            size: self.size,
        })
    }

    /// The current color at `coord`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] if `coord` lies outside the grid.
    pub async fn get(&self, coord: Coord) -> Result<Color, GridError> {
        self.grid
            .read()
            .await
            .get(coord)
            .ok_or_else(|| self.out_of_bounds(coord))
    }

    /// Store `color` at `coord` and return the stored value.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] if `coord` lies outside the grid;
    /// the grid is unchanged.
    pub async fn apply(&self, coord: Coord, color: Color) -> Result<Color, GridError> {
        let stored = self
            .grid
            .write()
            .await
            .set(coord, color)
            .ok_or_else(|| self.out_of_bounds(coord))?;
        trace!(x = coord.x, y = coord.y, %stored, "cell written");
        Ok(stored)
    }

    /// Parse and store a raw write.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] for coordinates outside `[0, N)`
    /// and [`GridError::InvalidColor`] for a malformed color. The grid is
    /// unchanged on error.
    pub async fn set(&self, x: i64, y: i64, color: &str) -> Result<Color, GridError> {
        let coord = self.resolve(x, y)?;
        let color = Color::parse(color)?;
        self.apply(coord, color).await
    }

    fn out_of_bounds(&self, coord: Coord) -> GridError {
        GridError::OutOfBounds {
            x: i64::from(coord.x),
            y: i64::from(coord.y),
            size: self.size,
        }
    }
}
