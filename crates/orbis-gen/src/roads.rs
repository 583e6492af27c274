//! Road layout between settlements.
//!
//! Settlements are linked greedily, nearest pair first, growing one road
//! network from the first settlement. Each candidate link is a Dijkstra
//! query with a cost cutoff, so links that would wind far beyond the
//! straight-line estimate are abandoned early instead of searched out.

use std::collections::HashSet;

use orbis_core::{Road, TileGraph, TileRef};
use orbis_paths::{AstarPather, FindPathParams, PathFinder, PathPool, ReachabilityCache};

/// What [`RoadPlanner::lay_roads`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoadReport {
    /// Settlements joined to the network.
    pub linked: usize,
    /// Candidate links dropped by the detour limit.
    pub rejected: usize,
    /// Settlements left unconnected.
    pub isolated: usize,
    /// Edges that received or upgraded a road.
    pub road_edges: usize,
}

/// Lays roads between settlements over a [`TileGraph`].
#[derive(Debug, Default)]
pub struct RoadPlanner {
    reach: ReachabilityCache,
}

impl RoadPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect `settlements` with roads of kind `road`.
    ///
    /// A link is only built if its route costs at most `max_detour` times
    /// the graph's admissible estimate between the two ends. Impassable,
    /// invalid and duplicate settlements are skipped. Existing roads are
    /// only ever upgraded. Every path used goes back to `pool`.
    pub fn lay_roads(
        &mut self,
        graph: &mut TileGraph,
        finder: &mut PathFinder,
        pool: &mut PathPool,
        settlements: &[TileRef],
        road: Road,
        max_detour: f64,
    ) -> RoadReport {
        let mut report = RoadReport::default();
        self.reach.invalidate(&*graph);

        let mut remaining: Vec<TileRef> = Vec::with_capacity(settlements.len());
        for &s in settlements {
            if graph.is_impassable(s) || remaining.contains(&s) {
                continue;
            }
            remaining.push(s);
        }
        if remaining.is_empty() {
            return report;
        }
        let mut network = vec![remaining.remove(0)];
        let mut tried: HashSet<(TileRef, TileRef)> = HashSet::new();

        loop {
            let Some((from, to, estimate)) = self.nearest_candidate(graph, &network, &remaining, &tried) else {
                break;
            };
            tried.insert((from, to));

            let limit = (f64::from(estimate.max(1)) * max_detour).ceil();
            let limit = if limit >= f64::from(i32::MAX) {
                i32::MAX
            } else {
                limit as i32
            };
            let cutoff = move |g: i32| g > limit;
            let params = FindPathParams {
                cost_cutoff: Some(&cutoff),
                ..FindPathParams::default()
            };
            let route = finder.find_path(&*graph, pool, from, to, &params);
            let Some(path) = route.path() else {
                log::trace!("road {from} -> {to} rejected: longer than {limit}");
                report.rejected += 1;
                continue;
            };

            for pair in path.nodes().windows(2) {
                let (a, b) = (pair[0], pair[1]);
                let better = graph
                    .road_between(a, b)
                    .is_none_or(|old| old.cost_percent() > road.cost_percent());
                if !better {
                    continue;
                }
                // Consecutive path nodes are always adjacent on one layer.
                let laid = graph.set_road(a, b, Some(road));
                debug_assert!(laid.is_ok(), "road {a} -> {b}: {laid:?}");
                report.road_edges += 1;
            }
            log::debug!("road {from} -> {to}: {} tiles, cost {}", path.len(), path.total_cost());
            pool.recycle(route);

            report.linked += 1;
            remaining.retain(|&s| s != to);
            network.push(to);
        }

        report.isolated = remaining.len();
        report
    }

    // Closest untried (network, remaining) pair that can reach each other.
    fn nearest_candidate(
        &mut self,
        graph: &TileGraph,
        network: &[TileRef],
        remaining: &[TileRef],
        tried: &HashSet<(TileRef, TileRef)>,
    ) -> Option<(TileRef, TileRef, i32)> {
        let mut best: Option<(TileRef, TileRef, i32)> = None;
        for &to in remaining {
            for &from in network {
                if tried.contains(&(from, to)) || !self.reach.can_reach(graph, from, to) {
                    continue;
                }
                let estimate = graph.estimate(from, to);
                if best.is_none_or(|(_, _, e)| estimate < e) {
                    best = Some((from, to, estimate));
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbis_core::{Layer, LayerId, Point};

    fn grid(w: i32, h: i32) -> TileGraph {
        let mut g = TileGraph::new();
        g.add_layer(Layer::grid(LayerId::PRIMARY, "surface", w, h, false).unwrap())
            .unwrap();
        g
    }

    fn at(g: &TileGraph, x: i32, y: i32) -> TileRef {
        let layer = g.layer(LayerId::PRIMARY).unwrap();
        layer.tile_ref(layer.index_of(Point::new(x, y)).unwrap())
    }

    fn lay(g: &mut TileGraph, settlements: &[TileRef], max_detour: f64) -> (RoadReport, PathPool) {
        let mut finder = PathFinder::new();
        let mut pool = PathPool::default();
        let report = RoadPlanner::new().lay_roads(g, &mut finder, &mut pool, settlements, Road::Dirt, max_detour);
        (report, pool)
    }

    #[test]
    fn links_every_settlement_on_open_ground() {
        let mut g = grid(7, 7);
        let towns = [at(&g, 0, 0), at(&g, 6, 0), at(&g, 6, 6)];
        let (report, pool) = lay(&mut g, &towns, 1.5);
        assert_eq!(report.linked, 2);
        assert_eq!(report.rejected, 0);
        assert_eq!(report.isolated, 0);
        // Two straight six-step links.
        assert_eq!(report.road_edges, 12);
        assert_eq!(pool.outstanding(), 0);
        assert_eq!(g.road_between(at(&g, 0, 0), at(&g, 1, 0)), Some(Road::Dirt));
    }

    // A wall down column 2 with a single gap at the bottom row.
    fn walled() -> TileGraph {
        let mut g = grid(5, 5);
        for y in 0..4 {
            let t = at(&g, 2, y);
            g.set_impassable(t, true).unwrap();
        }
        g
    }

    #[test]
    fn curvy_links_are_rejected() {
        let mut g = walled();
        let towns = [at(&g, 0, 0), at(&g, 4, 0)];
        // Estimate 4, real route 12.
        let (report, _) = lay(&mut g, &towns, 2.0);
        assert_eq!(report.linked, 0);
        assert_eq!(report.rejected, 1);
        assert_eq!(report.isolated, 1);
        assert_eq!(report.road_edges, 0);

        let (report, _) = lay(&mut g, &towns, 3.0);
        assert_eq!(report.linked, 1);
        assert_eq!(report.road_edges, 12);
    }

    #[test]
    fn unreachable_settlements_stay_isolated() {
        let mut g = walled();
        let gap = at(&g, 2, 4);
        g.set_impassable(gap, true).unwrap();
        let towns = [at(&g, 0, 0), at(&g, 4, 0), at(&g, 1, 1), gap];
        let (report, _) = lay(&mut g, &towns, 10.0);
        assert_eq!(report.linked, 1);
        assert_eq!(report.rejected, 0);
        assert_eq!(report.isolated, 1);
    }

    #[test]
    fn existing_better_roads_are_kept() {
        let mut g = grid(3, 1);
        let (a, b, c) = (at(&g, 0, 0), at(&g, 1, 0), at(&g, 2, 0));
        g.set_road(a, b, Some(Road::Asphalt)).unwrap();
        let (report, _) = lay(&mut g, &[a, c], 2.0);
        assert_eq!(report.linked, 1);
        assert_eq!(report.road_edges, 1);
        assert_eq!(g.road_between(a, b), Some(Road::Asphalt));
        assert_eq!(g.road_between(b, c), Some(Road::Dirt));
    }

    #[test]
    fn every_counted_edge_carries_the_road() {
        let mut g = walled();
        let towns = [at(&g, 0, 0), at(&g, 4, 0)];
        let (report, _) = lay(&mut g, &towns, 3.0);
        let layer = g.layer(LayerId::PRIMARY).unwrap();
        let mut nbuf = Vec::new();
        let mut on_road = 0;
        for i in 0..layer.len() {
            let a = layer.tile_ref(i);
            nbuf.clear();
            g.neighbors(a, &mut nbuf);
            on_road += nbuf
                .iter()
                .filter(|&&b| a.index() < b.index() && g.road_between(a, b) == Some(Road::Dirt))
                .count();
        }
        assert_eq!(report.road_edges, on_road);
        assert_eq!(on_road, 12);
    }
}
