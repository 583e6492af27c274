//! World generation helpers for orbis: seeded terrain and road layout.

pub mod roads;
pub mod terrain;

pub use roads::{RoadPlanner, RoadReport};
pub use terrain::{CellularAutomataRule, TerrainGen, TerrainParams};
