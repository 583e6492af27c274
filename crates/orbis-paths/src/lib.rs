//! Pathfinding and reachability over layered tile graphs.
//!
//! - **Flood fill** from one or many seeds ([`FloodFiller`]), plus the
//!   tile-set helpers in [`morphology`] built on it
//! - **Dijkstra** and **A\*** cheapest routes ([`PathFinder`])
//! - **Path pooling** with leak detection ([`PathPool`])
//! - **Reachability** fields, lazily labelled ([`ReachabilityCache`])
//!
//! [`Navigator`] bundles all of them for a world. Every engine owns and
//! reuses its buffers, so repeated queries allocate nothing once warm.
//!
//! # Trait hierarchy
//!
//! | Trait | Required for |
//! |---|---|
//! | [`Pather`] | flood fill, morphology |
//! | [`BlockingPather`] : [`Pather`] | reachability |
//! | [`WeightedPather`] : [`BlockingPather`] | Dijkstra |
//! | [`AstarPather`] : [`WeightedPather`] | A* |
//!
//! [`TileGraph`](orbis_core::TileGraph) implements all four.

mod config;
mod floodfill;
mod graph;
pub mod morphology;
mod navigator;
mod path;
mod pathfinder;
mod pool;
mod reachability;
mod traits;

pub use config::{NavConfig, PoolConfig, ReachabilityConfig};
pub use floodfill::{FloodFiller, FloodOutcome, FloodStats, PathNode};
pub use navigator::Navigator;
pub use path::{Path, Route};
pub use pathfinder::{FindPathParams, PathFinder};
pub use pool::PathPool;
pub use reachability::ReachabilityCache;
pub use traits::{AstarPather, BlockingPather, Pather, WeightedPather};
