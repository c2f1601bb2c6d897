//! Events pushed to observers over the subscribe stream.
//!
//! Every stream starts with exactly one [`CanvasStateEvent`] followed by
//! zero or more [`MutationEvent`]s in commit order. Both are wrapped in
//! [`StreamEvent`], whose JSON form carries a `"type"` tag of
//! `"canvas-state"` or `"pixel-update"`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::canvas::{CanvasGrid, CellView, Coord};
use crate::color::Color;

/// One accepted write, stamped with its commit sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MutationEvent {
    /// Column of the written cell.
    pub x: u32,
    /// Row of the written cell.
    pub y: u32,
    /// Color now stored in the cell.
    #[ts(type = "string")]
    pub color: Color,
    /// Position in the total commit order, starting at 1 with no gaps.
    pub sequence: u64,
}

impl MutationEvent {
    /// Build the event for a committed write.
    pub const fn new(coord: Coord, color: Color, sequence: u64) -> Self {
        Self {
            x: coord.x,
            y: coord.y,
            color,
            sequence,
        }
    }

    /// The written cell.
    pub const fn cell(&self) -> CellView {
        CellView {
            x: self.x,
            y: self.y,
            color: self.color,
        }
    }
}

/// A full, consistent copy of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CanvasStateEvent {
    /// Grid dimension.
    pub size: u32,
    /// Rows of cells, indexed `data[y][x]`.
    #[ts(type = "Array<Array<string>>")]
    pub data: Vec<Vec<Color>>,
    /// Sequence number of the last write included in this copy, `0` when
    /// nothing has been written yet. The next mutation an observer sees is
    /// `sequence + 1`.
    pub sequence: u64,
}

impl CanvasStateEvent {
    /// Capture `grid` as of commit `sequence`.
    pub fn from_grid(grid: &CanvasGrid, sequence: u64) -> Self {
        Self {
            size: grid.size(),
            data: grid.rows(),
            sequence,
        }
    }
}

/// An element of the subscribe stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "kebab-case")]
#[ts(export, export_to = "bindings/")]
pub enum StreamEvent {
    /// Baseline snapshot, always the first element.
    CanvasState(CanvasStateEvent),
    /// A committed write.
    PixelUpdate(MutationEvent),
}

impl StreamEvent {
    /// The sequence number this element carries.
    pub const fn sequence(&self) -> u64 {
        match self {
            Self::CanvasState(state) => state.sequence,
            Self::PixelUpdate(event) => event.sequence,
        }
    }
}
