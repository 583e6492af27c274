//! One-stop pathfinding service for a world.
//!
//! A [`Navigator`] owns the search engines and caches; the graph is passed
//! in on every call. Callers mutate the graph freely and call
//! [`Navigator::sync`] before the next batch of queries.

use orbis_core::{GraphEvent, TileGraph, TileRef};

use crate::config::NavConfig;
use crate::floodfill::{FloodFiller, FloodStats, PathNode};
use crate::morphology;
use crate::path::{Path, Route};
use crate::pathfinder::{FindPathParams, PathFinder};
use crate::pool::PathPool;
use crate::reachability::ReachabilityCache;
use crate::traits::{AstarPather, BlockingPather, Pather};

#[derive(Debug)]
pub struct Navigator {
    finder: PathFinder,
    pool: PathPool,
    reach: ReachabilityCache,
    filler: FloodFiller,
    use_heuristic: bool,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(&NavConfig::default())
    }
}

impl Navigator {
    pub fn new(config: &NavConfig) -> Self {
        Self {
            finder: PathFinder::new(),
            pool: PathPool::new(&config.pool),
            reach: ReachabilityCache::new(&config.reachability),
            filler: FloodFiller::new(),
            use_heuristic: config.use_heuristic,
        }
    }

    /// Drain the graph's pending events. Reachability is invalidated at
    /// most once per batch. Returns the number of events handled.
    pub fn sync(&mut self, graph: &mut TileGraph) -> usize {
        let events = graph.take_events();
        let mut dirty = false;
        for event in &events {
            if let GraphEvent::LayerRemoved(id) = event {
                self.reach.forget_layer(*id);
            }
            dirty |= event.affects_reachability();
        }
        if dirty {
            self.reach.invalidate(&*graph);
        }
        if !events.is_empty() {
            log::debug!("navigator synced {} graph events (reachability dirty: {dirty})", events.len());
        }
        events.len()
    }

    /// Cheapest route from `origin` to `destination`.
    ///
    /// Unreachable destinations are rejected through the reachability
    /// cache before any search runs.
    pub fn find_path<P: AstarPather + ?Sized>(
        &mut self,
        graph: &P,
        origin: TileRef,
        destination: TileRef,
        params: &FindPathParams<'_>,
    ) -> Route {
        if !self.reach.can_reach(graph, origin, destination) {
            return Route::NotFound;
        }
        if self.use_heuristic {
            self.finder
                .find_path_astar(graph, &mut self.pool, origin, destination, params)
        } else {
            self.finder
                .find_path(graph, &mut self.pool, origin, destination, params)
        }
    }

    #[inline]
    pub fn can_reach<P: BlockingPather + ?Sized>(&mut self, graph: &P, a: TileRef, b: TileRef) -> bool {
        self.reach.can_reach(graph, a, b)
    }

    /// See [`FloodFiller::flood_fill_from`].
    pub fn flood_fill<P, T, V>(
        &mut self,
        graph: &P,
        seeds: &[TileRef],
        can_traverse: T,
        visit: V,
        max_tiles: usize,
    ) -> FloodStats
    where
        P: Pather + ?Sized,
        T: FnMut(TileRef) -> bool,
        V: FnMut(TileRef, i32) -> bool,
    {
        self.filler
            .flood_fill_from(graph, seeds, can_traverse, visit, max_tiles)
    }

    /// See [`morphology::closest_tile`].
    pub fn closest_tile<P, T, F>(
        &mut self,
        graph: &P,
        start: TileRef,
        can_traverse: T,
        predicate: F,
        max_dist: i32,
    ) -> Option<PathNode>
    where
        P: Pather + ?Sized,
        T: FnMut(TileRef) -> bool,
        F: FnMut(TileRef) -> bool,
    {
        morphology::closest_tile(&mut self.filler, graph, start, can_traverse, predicate, max_dist)
    }

    /// Give a route's path back to the pool.
    #[inline]
    pub fn release(&mut self, route: Route) {
        self.pool.recycle(route);
    }

    #[inline]
    pub fn release_path(&mut self, path: Path) {
        self.pool.release(path);
    }

    /// Report the number of route holders, for leak detection.
    #[inline]
    pub fn set_active_consumers(&mut self, n: usize) {
        self.pool.set_active_consumers(n);
    }

    #[inline]
    pub fn pool(&self) -> &PathPool {
        &self.pool
    }

    #[inline]
    pub fn reachability(&self) -> &ReachabilityCache {
        &self.reach
    }

    #[inline]
    pub fn finder(&self) -> &PathFinder {
        &self.finder
    }

    /// Direct access to the engines, for callers running their own searches.
    pub fn parts_mut(&mut self) -> (&mut PathFinder, &mut PathPool, &mut FloodFiller) {
        (&mut self.finder, &mut self.pool, &mut self.filler)
    }
}
