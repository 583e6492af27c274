//! Error type for tile graph construction and mutation.
//!
//! Queries never fail: they answer `None`, `false` or "impassable" for bad
//! input. Only building and editing the graph goes through [`GraphError`].

use crate::tile::{LayerId, TileRef};

/// Errors raised while building or editing a [`TileGraph`](crate::TileGraph).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// No layer with this id is registered.
    #[error("unknown layer {0}")]
    UnknownLayer(LayerId),

    /// A layer with this id is already registered.
    #[error("duplicate layer {0}")]
    DuplicateLayer(LayerId),

    /// The tile index is negative or past the end of its layer.
    #[error("tile {0} is out of range")]
    TileOutOfRange(TileRef),

    /// Grid layers need a positive width and height.
    #[error("invalid layer dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: i32,
        /// Requested height.
        height: i32,
    },

    /// Explicit adjacency lists must be in range, loop-free and symmetric.
    #[error("invalid adjacency at tile {tile}: {reason}")]
    InvalidAdjacency {
        /// Tile whose neighbour list is wrong.
        tile: u32,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// Road overlays can only join adjacent tiles on one layer.
    #[error("tiles {from} and {to} are not adjacent")]
    NotAdjacent {
        /// One end of the edge.
        from: TileRef,
        /// The other end.
        to: TileRef,
    },

    /// Tile base costs must be positive.
    #[error("invalid base cost {0}")]
    InvalidCost(i32),
}
