use orbis_core::{LayerId, TileRef};

/// Minimal search interface: layer sizes and neighbour enumeration.
pub trait Pather {
    /// Number of tiles in `layer`, or `None` if there is no such layer.
    fn layer_len(&self, layer: LayerId) -> Option<usize>;

    /// Append neighbours of `tile` into `buf`. The caller clears `buf`.
    /// Neighbours are always on `tile`'s own layer.
    fn neighbors(&self, tile: TileRef, buf: &mut Vec<TileRef>);
}

/// Pather that knows which tiles can never be entered.
pub trait BlockingPather: Pather {
    /// Whether `tile` is impassable. Invalid tiles are.
    fn impassable(&self, tile: TileRef) -> bool;
}

/// Pather with weighted (non-negative cost) edges.
pub trait WeightedPather: BlockingPather {
    /// Cost of stepping from `from` to adjacent `to`.
    fn cost(&self, from: TileRef, to: TileRef) -> i32;
}

/// Full A* pather with an admissible heuristic.
pub trait AstarPather: WeightedPather {
    /// Estimate of the cost from `from` to `to`.
    /// Must never overestimate the true cost (admissible).
    fn estimate(&self, from: TileRef, to: TileRef) -> i32;
}
