//! Minimum-cost routes within one layer (Dijkstra and A*).

use std::collections::BinaryHeap;

use orbis_core::TileRef;

use crate::path::Route;
use crate::pool::PathPool;
use crate::traits::{AstarPather, WeightedPather};

/// Optional hooks for a single path query.
#[derive(Clone, Copy, Default)]
pub struct FindPathParams<'a> {
    /// Extra cost added to every step `from -> to`. Negative values count as
    /// 0, so the A* estimate stays a lower bound.
    pub extra_cost: Option<&'a dyn Fn(TileRef, TileRef) -> i32>,
    /// Called with the accumulated cost of each node taken off the frontier.
    /// Returning `true` abandons the search with [`Route::NotFound`].
    pub cost_cutoff: Option<&'a dyn Fn(i32) -> bool>,
}

// ---------------------------------------------------------------------------
// Internal search nodes
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
struct Node {
    g: i32,
    parent: usize,
    generation: u32,
    open: bool,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            g: 0,
            parent: usize::MAX,
            generation: 0,
            open: false,
        }
    }
}

/// Frontier entry, ordered by `f` then by discovery sequence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct NodeRef {
    idx: usize,
    f: i32,
    seq: u64,
}

impl Ord for NodeRef {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reverse so BinaryHeap (max-heap) pops smallest f first, and the
        // earliest discovered among equal f.
        other.f.cmp(&self.f).then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for NodeRef {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

// ---------------------------------------------------------------------------
// PathFinder
// ---------------------------------------------------------------------------

/// Weighted shortest-path search over a single layer.
///
/// The finder keeps its node array and open heap between queries; nodes are
/// invalidated lazily by bumping a generation counter. Equal-cost frontier
/// entries are expanded in discovery order, so a fixed graph always yields
/// the same route.
#[derive(Debug, Default)]
pub struct PathFinder {
    nodes: Vec<Node>,
    generation: u32,
    open: BinaryHeap<NodeRef>,
    seq: u64,
    nbuf: Vec<TileRef>,
    expanded: usize,
}

impl PathFinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes expanded by the last query.
    #[inline]
    pub fn last_expanded(&self) -> usize {
        self.expanded
    }

    /// Find the cheapest route from `origin` to `destination` with Dijkstra.
    ///
    /// Returns [`Route::NotFound`] if the tiles are on different layers,
    /// either one is invalid, out of range or impassable, no route exists,
    /// or `params.cost_cutoff` gave up. A found route is leased from `pool`.
    pub fn find_path<P: WeightedPather + ?Sized>(
        &mut self,
        pather: &P,
        pool: &mut PathPool,
        origin: TileRef,
        destination: TileRef,
        params: &FindPathParams<'_>,
    ) -> Route {
        self.search(pather, pool, origin, destination, params, |_, _| 0)
    }

    /// Same as [`find_path`](Self::find_path), guided by the pather's
    /// admissible estimate.
    pub fn find_path_astar<P: AstarPather + ?Sized>(
        &mut self,
        pather: &P,
        pool: &mut PathPool,
        origin: TileRef,
        destination: TileRef,
        params: &FindPathParams<'_>,
    ) -> Route {
        self.search(pather, pool, origin, destination, params, |from, to| {
            pather.estimate(from, to)
        })
    }

    fn search<P, H>(
        &mut self,
        pather: &P,
        pool: &mut PathPool,
        origin: TileRef,
        destination: TileRef,
        params: &FindPathParams<'_>,
        estimate: H,
    ) -> Route
    where
        P: WeightedPather + ?Sized,
        H: Fn(TileRef, TileRef) -> i32,
    {
        self.expanded = 0;
        if !origin.is_valid() || !destination.is_valid() || !origin.same_layer(destination) {
            return Route::NotFound;
        }
        let layer = origin.layer();
        let Some(len) = pather.layer_len(layer) else {
            return Route::NotFound;
        };
        let (Some(start_idx), Some(goal_idx)) = (origin.slot(len), destination.slot(len)) else {
            return Route::NotFound;
        };
        if pather.impassable(origin) || pather.impassable(destination) {
            return Route::NotFound;
        }
        let goal = TileRef::new(goal_idx as i32, layer);

        if start_idx == goal_idx {
            let mut path = pool.lease();
            path.push_node(goal, 0);
            path.finish();
            return Route::Found(path);
        }

        self.begin(len);
        let cur_gen = self.generation;

        // Initialise the start node.
        {
            let node = &mut self.nodes[start_idx];
            node.g = 0;
            node.parent = usize::MAX;
            node.generation = cur_gen;
            node.open = true;
        }
        self.push_open(start_idx, estimate(origin, goal));

        let mut nbuf = std::mem::take(&mut self.nbuf);

        let found = 'search: loop {
            let Some(current) = self.open.pop() else {
                break 'search false;
            };
            let ci = current.idx;

            // Skip stale entries.
            if self.nodes[ci].generation != cur_gen || !self.nodes[ci].open {
                continue;
            }

            let current_g = self.nodes[ci].g;
            if params.cost_cutoff.is_some_and(|cut| cut(current_g)) {
                log::trace!("path search {origin} -> {destination} cut off at cost {current_g}");
                break 'search false;
            }
            if ci == goal_idx {
                break 'search true;
            }

            self.nodes[ci].open = false;
            self.expanded += 1;
            let current = TileRef::new(ci as i32, layer);

            nbuf.clear();
            pather.neighbors(current, &mut nbuf);

            for &np in nbuf.iter() {
                if np.layer() != layer {
                    continue;
                }
                let Some(ni) = np.slot(len) else {
                    continue;
                };
                if pather.impassable(np) {
                    continue;
                }
                let extra = params.extra_cost.map_or(0, |f| f(current, np).max(0));
                let step = pather.cost(current, np).saturating_add(extra);
                let tentative_g = current_g.saturating_add(step);

                let n = &mut self.nodes[ni];
                if n.generation == cur_gen {
                    if tentative_g >= n.g {
                        continue;
                    }
                } else {
                    n.generation = cur_gen;
                }

                n.g = tentative_g;
                n.parent = ci;
                n.open = true;
                let f = tentative_g.saturating_add(estimate(np, goal));
                self.push_open(ni, f);
            }
        };

        self.open.clear();
        self.nbuf = nbuf;

        if !found {
            return Route::NotFound;
        }

        // Walk parents from the goal; that is already destination-first order.
        let mut path = pool.lease();
        let mut ci = goal_idx;
        while ci != usize::MAX {
            path.push_node(TileRef::new(ci as i32, layer), self.nodes[ci].g);
            ci = self.nodes[ci].parent;
        }
        path.finish();
        Route::Found(path)
    }

    fn begin(&mut self, len: usize) {
        if self.nodes.len() < len {
            self.nodes.resize(len, Node::default());
        }
        // Bump generation to lazily invalidate all nodes.
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            for n in self.nodes.iter_mut() {
                n.generation = 0;
            }
            self.generation = 1;
        }
        self.open.clear();
        self.seq = 0;
    }

    fn push_open(&mut self, idx: usize, f: i32) {
        let seq = self.seq;
        self.seq += 1;
        self.open.push(NodeRef { idx, f, seq });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbis_core::{Layer, LayerId, Road, TileData, TileGraph};

    fn line(len: u32) -> TileGraph {
        let mut g = TileGraph::new();
        g.add_layer(Layer::line(LayerId::PRIMARY, "line", len).unwrap())
            .unwrap();
        g
    }

    fn grid(w: i32, h: i32) -> TileGraph {
        let mut g = TileGraph::new();
        g.add_layer(Layer::grid(LayerId::PRIMARY, "surface", w, h, false).unwrap())
            .unwrap();
        g
    }

    fn t(i: i32) -> TileRef {
        TileRef::on_primary(i)
    }

    fn indices(route: &Route) -> Vec<i32> {
        route
            .path()
            .map(|p| p.nodes().iter().map(|t| t.index()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn line_path_is_stored_destination_first() {
        let g = line(5);
        let mut pool = PathPool::default();
        let mut pf = PathFinder::new();
        let route = pf.find_path(&g, &mut pool, t(0), t(4), &FindPathParams::default());
        assert_eq!(indices(&route), vec![4, 3, 2, 1, 0]);
        assert_eq!(route.total_cost(), Some(4));
        let path = route.path().unwrap();
        for i in 1..path.len() {
            assert!(path.cost_at(i - 1) >= path.cost_at(i));
        }
        pool.recycle(route);
        assert_eq!(pool.outstanding(), 0);
    }

    #[test]
    fn impassable_gap_means_no_path() {
        let mut g = line(5);
        g.set_impassable(t(2), true).unwrap();
        let mut pool = PathPool::default();
        let mut pf = PathFinder::new();
        let route = pf.find_path(&g, &mut pool, t(0), t(4), &FindPathParams::default());
        assert!(!route.is_found());
        assert_eq!(pool.outstanding(), 0);
    }

    #[test]
    fn bad_endpoints_are_rejected() {
        let mut g = line(5);
        g.add_layer(Layer::line(LayerId(1), "orbit", 5).unwrap())
            .unwrap();
        g.set_impassable(t(4), true).unwrap();
        let mut pool = PathPool::default();
        let mut pf = PathFinder::new();
        let p = FindPathParams::default();
        assert!(!pf.find_path(&g, &mut pool, t(0), TileRef::new(3, LayerId(1)), &p).is_found());
        assert!(!pf.find_path(&g, &mut pool, TileRef::INVALID, t(3), &p).is_found());
        assert!(!pf.find_path(&g, &mut pool, t(0), t(5), &p).is_found());
        assert!(!pf.find_path(&g, &mut pool, t(0), t(4), &p).is_found());
        assert!(!pf.find_path(&g, &mut pool, t(4), t(0), &p).is_found());
        assert!(
            !pf.find_path(&g, &mut pool, TileRef::new(0, LayerId(8)), TileRef::new(1, LayerId(8)), &p)
                .is_found()
        );
        assert_eq!(pool.outstanding(), 0);
    }

    #[test]
    fn same_tile_is_a_single_node() {
        let g = line(3);
        let mut pool = PathPool::default();
        let mut pf = PathFinder::new();
        let route = pf.find_path(&g, &mut pool, t(1), TileRef::new(1, LayerId::PRIMARY), &FindPathParams::default());
        assert_eq!(indices(&route), vec![1]);
        assert_eq!(route.total_cost(), Some(0));
        pool.recycle(route);
    }

    #[test]
    fn cost_cutoff_abandons_search() {
        let g = line(5);
        let mut pool = PathPool::default();
        let mut pf = PathFinder::new();
        let tight = |g: i32| g > 2;
        let route = pf.find_path(
            &g,
            &mut pool,
            t(0),
            t(4),
            &FindPathParams {
                cost_cutoff: Some(&tight),
                ..Default::default()
            },
        );
        assert!(!route.is_found());
        let loose = |g: i32| g > 10;
        let route = pf.find_path(
            &g,
            &mut pool,
            t(0),
            t(4),
            &FindPathParams {
                cost_cutoff: Some(&loose),
                ..Default::default()
            },
        );
        assert_eq!(route.total_cost(), Some(4));
        pool.recycle(route);
    }

    #[test]
    fn extra_cost_steers_around_a_tile() {
        let g = grid(3, 3);
        let mut pool = PathPool::default();
        let mut pf = PathFinder::new();
        let avoid_center = |_: TileRef, to: TileRef| if to.index() == 4 { 10 } else { 0 };
        let route = pf.find_path(
            &g,
            &mut pool,
            t(3),
            t(5),
            &FindPathParams {
                extra_cost: Some(&avoid_center),
                ..Default::default()
            },
        );
        assert_eq!(route.total_cost(), Some(4));
        assert!(!indices(&route).contains(&4));
        pool.recycle(route);
    }

    // Three columns of cost-10 tiles; the middle column is walled off except
    // for the top and bottom rows.
    fn long_way_round() -> TileGraph {
        let mut layer = Layer::grid(LayerId::PRIMARY, "surface", 3, 8, false).unwrap();
        for i in 0..layer.len() {
            layer.set_tile(i, TileData::with_cost(10)).unwrap();
        }
        for y in 1..=6 {
            layer.set_tile(y * 3 + 1, TileData::impassable()).unwrap();
        }
        let mut g = TileGraph::new();
        g.add_layer(layer).unwrap();
        g
    }

    #[test]
    fn negative_extra_cost_is_ignored() {
        let g = long_way_round();
        let mut pool = PathPool::default();
        let mut pf = PathFinder::new();
        let discount = |a: TileRef, b: TileRef| {
            if a.index() == 1 || b.index() == 1 { 0 } else { -10 }
        };
        let params = FindPathParams {
            extra_cost: Some(&discount),
            ..Default::default()
        };
        let dijkstra = pf.find_path(&g, &mut pool, t(0), t(2), &params);
        let astar = pf.find_path_astar(&g, &mut pool, t(0), t(2), &params);
        let plain = pf.find_path(&g, &mut pool, t(0), t(2), &FindPathParams::default());
        assert_eq!(dijkstra.total_cost(), Some(20));
        assert_eq!(astar.total_cost(), dijkstra.total_cost());
        assert_eq!(plain.total_cost(), dijkstra.total_cost());
        assert_eq!(indices(&astar), vec![2, 1, 0]);
        pool.recycle(dijkstra);
        pool.recycle(astar);
        pool.recycle(plain);
        assert_eq!(pool.outstanding(), 0);
    }

    #[test]
    fn roads_make_routes_cheaper() {
        let mut layer = Layer::grid(LayerId::PRIMARY, "surface", 3, 1, false).unwrap();
        for i in 0..3 {
            layer.set_tile(i, TileData::with_cost(10)).unwrap();
        }
        let mut g = TileGraph::new();
        g.add_layer(layer).unwrap();
        let mut pool = PathPool::default();
        let mut pf = PathFinder::new();
        let p = FindPathParams::default();
        let before = pf.find_path(&g, &mut pool, t(0), t(2), &p);
        assert_eq!(before.total_cost(), Some(20));
        pool.recycle(before);
        g.set_road(t(0), t(1), Some(Road::Stone)).unwrap();
        g.set_road(t(1), t(2), Some(Road::Stone)).unwrap();
        let after = pf.find_path_astar(&g, &mut pool, t(0), t(2), &p);
        assert_eq!(after.total_cost(), Some(10));
        pool.recycle(after);
    }

    #[test]
    fn equal_cost_ties_break_in_discovery_order() {
        let g = grid(3, 3);
        let mut pool = PathPool::default();
        let p = FindPathParams::default();
        let mut pf = PathFinder::new();
        let dijkstra = pf.find_path(&g, &mut pool, t(0), t(8), &p);
        assert_eq!(indices(&dijkstra), vec![8, 5, 2, 1, 0]);
        let astar = PathFinder::new().find_path_astar(&g, &mut pool, t(0), t(8), &p);
        assert_eq!(indices(&astar), vec![8, 5, 2, 1, 0]);
        let again = pf.find_path(&g, &mut pool, t(0), t(8), &p);
        assert_eq!(indices(&again), indices(&dijkstra));
        for r in [dijkstra, astar, again] {
            pool.recycle(r);
        }
    }

    #[test]
    fn heuristic_expands_fewer_nodes() {
        let g = grid(11, 1);
        let mut pool = PathPool::default();
        let p = FindPathParams::default();
        let mut pf = PathFinder::new();
        let d = pf.find_path(&g, &mut pool, t(5), t(10), &p);
        let dijkstra_expanded = pf.last_expanded();
        let a = pf.find_path_astar(&g, &mut pool, t(5), t(10), &p);
        assert_eq!(pf.last_expanded(), 5);
        assert!(pf.last_expanded() < dijkstra_expanded);
        assert_eq!(d.total_cost(), a.total_cost());
        pool.recycle(d);
        pool.recycle(a);
    }
}
