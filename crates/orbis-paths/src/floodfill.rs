//! Breadth-first flood fill over one layer of a tile graph.

use std::collections::VecDeque;

use orbis_core::TileRef;

use crate::traits::Pather;

/// A tile with an associated cost or hop distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathNode {
    pub tile: TileRef,
    pub cost: i32,
}

/// Why a flood fill ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloodOutcome {
    /// The frontier ran dry.
    Exhausted,
    /// The visitor asked to stop.
    Stopped,
    /// `max_tiles` tiles were visited.
    LimitReached,
}

/// Summary of one flood fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloodStats {
    /// Number of `visit` calls made.
    pub visited: usize,
    pub outcome: FloodOutcome,
}

/// Reusable breadth-first flood fill engine.
///
/// The filler owns its visited marks and queue, so repeated fills allocate
/// nothing once warmed up. Fills take `&mut self`, which means a visitor can
/// never start another fill on the same filler.
///
/// Conventions:
/// - seeds are visited at distance 0 and count toward `max_tiles`;
/// - a seed that fails `can_traverse` is skipped;
/// - `visit` runs once per tile, in non-decreasing hop distance, with
///   neighbours taken in the layer's adjacency order.
#[derive(Debug, Default)]
pub struct FloodFiller {
    stamps: Vec<u32>,
    dist: Vec<i32>,
    generation: u32,
    queue: VecDeque<usize>,
    nbuf: Vec<TileRef>,
}

impl FloodFiller {
    /// Create an empty filler. Buffers grow on first use.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flood fill from a single tile.
    ///
    /// `start` may be [`TileRef::INVALID`], in which case nothing is visited.
    pub fn flood_fill<P, T, V>(
        &mut self,
        pather: &P,
        start: TileRef,
        can_traverse: T,
        visit: V,
        max_tiles: usize,
    ) -> FloodStats
    where
        P: Pather + ?Sized,
        T: FnMut(TileRef) -> bool,
        V: FnMut(TileRef, i32) -> bool,
    {
        self.flood_fill_from(pather, &[start], can_traverse, visit, max_tiles)
    }

    /// Flood fill from several seed tiles at once.
    ///
    /// The first valid seed fixes the layer; seeds on other layers and
    /// invalid seeds are skipped. `visit` returns `true` to stop the fill.
    pub fn flood_fill_from<P, T, V>(
        &mut self,
        pather: &P,
        seeds: &[TileRef],
        mut can_traverse: T,
        mut visit: V,
        max_tiles: usize,
    ) -> FloodStats
    where
        P: Pather + ?Sized,
        T: FnMut(TileRef) -> bool,
        V: FnMut(TileRef, i32) -> bool,
    {
        let mut stats = FloodStats {
            visited: 0,
            outcome: FloodOutcome::Exhausted,
        };
        if max_tiles == 0 {
            stats.outcome = FloodOutcome::LimitReached;
            return stats;
        }
        let Some(layer) = seeds.iter().find(|s| s.is_valid()).map(|s| s.layer()) else {
            return stats;
        };
        let Some(len) = pather.layer_len(layer) else {
            return stats;
        };

        self.begin(len);
        let cur_gen = self.generation;

        for &seed in seeds {
            if seed.layer() != layer {
                continue;
            }
            let Some(si) = seed.slot(len) else {
                continue;
            };
            if self.stamps[si] == cur_gen {
                continue;
            }
            self.stamps[si] = cur_gen;
            if !can_traverse(seed) {
                continue;
            }
            self.dist[si] = 0;
            self.queue.push_back(si);
        }

        let mut nbuf = std::mem::take(&mut self.nbuf);

        while let Some(ci) = self.queue.pop_front() {
            let d = self.dist[ci];
            let tile = TileRef::new(ci as i32, layer);

            stats.visited += 1;
            if visit(tile, d) {
                stats.outcome = FloodOutcome::Stopped;
                break;
            }
            if stats.visited >= max_tiles {
                stats.outcome = FloodOutcome::LimitReached;
                break;
            }

            nbuf.clear();
            pather.neighbors(tile, &mut nbuf);

            for &n in nbuf.iter() {
                if n.layer() != layer {
                    continue;
                }
                let Some(ni) = n.slot(len) else {
                    continue;
                };
                if self.stamps[ni] == cur_gen {
                    continue;
                }
                self.stamps[ni] = cur_gen;
                if !can_traverse(n) {
                    continue;
                }
                self.dist[ni] = d + 1;
                self.queue.push_back(ni);
            }
        }

        self.queue.clear();
        self.nbuf = nbuf;
        stats
    }

    /// Write every tile within `max_dist` hops of `seeds` into `out`,
    /// in visiting order, with its hop distance as the cost.
    pub fn collect_within<P, T>(
        &mut self,
        pather: &P,
        seeds: &[TileRef],
        can_traverse: T,
        max_dist: i32,
        out: &mut Vec<PathNode>,
    ) where
        P: Pather + ?Sized,
        T: FnMut(TileRef) -> bool,
    {
        out.clear();
        self.flood_fill_from(
            pather,
            seeds,
            can_traverse,
            |tile, cost| {
                if cost > max_dist {
                    return true;
                }
                out.push(PathNode { tile, cost });
                false
            },
            usize::MAX,
        );
    }

    // Start a new fill over a layer of `len` tiles.
    fn begin(&mut self, len: usize) {
        if self.stamps.len() < len {
            self.stamps.resize(len, 0);
            self.dist.resize(len, 0);
        }
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            self.stamps.fill(0);
            self.generation = 1;
        }
        self.queue.clear();
    }
}
