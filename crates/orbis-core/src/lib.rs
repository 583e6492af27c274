//! **orbis-core**: the tile graph of a layered planet.
//!
//! This crate holds the data model shared by the orbis crates: tile
//! identity ([`TileRef`], [`LayerId`]), per-layer adjacency and terrain
//! ([`Layer`], [`TileData`]), and the [`TileGraph`] that owns every layer and
//! records a [`GraphEvent`] for each edit.

pub mod error;
pub mod geom;
pub mod graph;
pub mod layer;
pub mod tile;

pub use error::GraphError;
pub use geom::Point;
pub use graph::{GraphEvent, TileGraph};
pub use layer::{Adjacency, Layer, Road, Roughness, TileData};
pub use tile::{LayerId, TileRef};
