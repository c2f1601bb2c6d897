//! Shared type definitions for the Pixelboard shared canvas.
//!
//! This crate is the single source of truth for the values that cross a
//! component or process boundary: cell colors, coordinates, grid snapshots
//! and the events pushed to observers. Wire types flow downstream to
//! `TypeScript` via `ts-rs` for browser clients.
//!
//! # Modules
//!
//! - [`color`] -- Canonical `#RRGGBB` cell color
//! - [`canvas`] -- Coordinates, cells and full grid snapshots
//! - [`events`] -- Events delivered over the subscribe stream
//! - [`ids`] -- Actor and subscriber identifiers

pub mod canvas;
pub mod color;
pub mod events;
pub mod ids;

// Re-export all public types at crate root for convenience.
pub use canvas::{CanvasGrid, CellView, Coord, MAX_GRID_SIZE};
pub use color::{Color, ColorError};
pub use events::{CanvasStateEvent, MutationEvent, StreamEvent};
pub use ids::{ActorId, ActorIdError, MAX_ACTOR_ID_LEN, SubscriberId};

#[cfg(test)]
mod tests {
    //! Binding generation for wire types.

    #[test]
    fn export_bindings() {
        // Exporting writes the `.ts` files to `bindings/` relative to the
        // crate root.
        use ts_rs::TS;

        let _ = crate::ids::SubscriberId::export_all();
        let _ = crate::canvas::CellView::export_all();
        let _ = crate::events::MutationEvent::export_all();
        let _ = crate::events::CanvasStateEvent::export_all();
        let _ = crate::events::StreamEvent::export_all();
    }
}
