//! Computed routes: the pooled [`Path`] and the [`Route`] search result.

use orbis_core::TileRef;

/// A route between two tiles, leased from a [`PathPool`](crate::PathPool).
///
/// Nodes are stored from destination back to origin, so walking the path
/// pops from the end. Each node also records the accumulated cost from the
/// origin. Paths are not `Clone`: each one is owned by exactly one consumer
/// until it goes back to the pool.
#[derive(Debug, Default)]
pub struct Path {
    nodes: Vec<TileRef>,
    costs: Vec<i32>,
    total_cost: i32,
    remaining: usize,
    pub(crate) epoch: u32,
}

impl Path {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    // Append the next node toward the origin.
    pub(crate) fn push_node(&mut self, tile: TileRef, cost: i32) {
        self.nodes.push(tile);
        self.costs.push(cost);
    }

    // Seal a path built with `push_node`.
    pub(crate) fn finish(&mut self) {
        debug_assert!(!self.nodes.is_empty(), "found paths have nodes");
        self.total_cost = self.costs.first().copied().unwrap_or(0);
        self.remaining = self.nodes.len();
        debug_assert!(self.total_cost >= 0);
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.costs.clear();
        self.total_cost = 0;
        self.remaining = 0;
    }

    /// All nodes, destination first.
    #[inline]
    pub fn nodes(&self) -> &[TileRef] {
        &self.nodes
    }

    /// Number of nodes, consumed or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Cost of the whole route.
    #[inline]
    pub fn total_cost(&self) -> i32 {
        self.total_cost
    }

    /// Accumulated cost from the origin to `nodes()[i]`.
    #[inline]
    pub fn cost_at(&self, i: usize) -> Option<i32> {
        self.costs.get(i).copied()
    }

    /// The origin.
    #[inline]
    pub fn first_node(&self) -> Option<TileRef> {
        self.nodes.last().copied()
    }

    /// The destination.
    #[inline]
    pub fn last_node(&self) -> Option<TileRef> {
        self.nodes.first().copied()
    }

    /// Nodes not yet consumed.
    #[inline]
    pub fn nodes_left(&self) -> usize {
        self.remaining
    }

    /// The node `n` steps ahead of the next one to be consumed.
    pub fn peek(&self, n: usize) -> Option<TileRef> {
        let i = self.remaining.checked_sub(n + 1)?;
        self.nodes.get(i).copied()
    }

    /// Take the next node, starting from the origin.
    pub fn consume_next_node(&mut self) -> Option<TileRef> {
        let i = self.remaining.checked_sub(1)?;
        self.remaining = i;
        self.nodes.get(i).copied()
    }

    /// Unconsumed nodes in travel order.
    pub fn remaining_nodes(&self) -> impl Iterator<Item = TileRef> + '_ {
        self.nodes[..self.remaining].iter().rev().copied()
    }
}

/// Outcome of a path query.
///
/// `NotFound` carries nothing and is never pooled, so one failed query can
/// not alias or disturb any other route.
#[derive(Debug)]
#[must_use = "a found route holds a pooled path that should be released"]
pub enum Route {
    Found(Path),
    NotFound,
}

impl Route {
    #[inline]
    pub fn is_found(&self) -> bool {
        matches!(self, Route::Found(_))
    }

    #[inline]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Route::Found(p) => Some(p),
            Route::NotFound => None,
        }
    }

    #[inline]
    pub fn path_mut(&mut self) -> Option<&mut Path> {
        match self {
            Route::Found(p) => Some(p),
            Route::NotFound => None,
        }
    }

    #[inline]
    pub fn into_path(self) -> Option<Path> {
        match self {
            Route::Found(p) => Some(p),
            Route::NotFound => None,
        }
    }

    /// Total cost of a found route.
    #[inline]
    pub fn total_cost(&self) -> Option<i32> {
        self.path().map(Path::total_cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Path {
        // Destination 4 back to origin 0, one cost unit per step.
        let mut p = Path::new();
        for i in (0..5).rev() {
            p.push_node(TileRef::on_primary(i), i);
        }
        p.finish();
        p
    }

    #[test]
    fn endpoints_and_cost() {
        let p = sample();
        assert_eq!(p.first_node(), Some(TileRef::on_primary(0)));
        assert_eq!(p.last_node(), Some(TileRef::on_primary(4)));
        assert_eq!(p.total_cost(), 4);
        assert_eq!(p.cost_at(0), Some(4));
        assert_eq!(p.cost_at(4), Some(0));
        assert_eq!(p.nodes_left(), 5);
    }

    #[test]
    fn consumes_from_origin() {
        let mut p = sample();
        assert_eq!(p.peek(1), Some(TileRef::on_primary(1)));
        assert_eq!(p.consume_next_node(), Some(TileRef::on_primary(0)));
        assert_eq!(p.consume_next_node(), Some(TileRef::on_primary(1)));
        assert_eq!(p.nodes_left(), 3);
        let rest: Vec<_> = p.remaining_nodes().map(|t| t.index()).collect();
        assert_eq!(rest, vec![2, 3, 4]);
        assert_eq!(p.peek(3), None);
        while p.consume_next_node().is_some() {}
        assert_eq!(p.nodes_left(), 0);
        assert_eq!(p.consume_next_node(), None);
        // Consumption keeps the node list.
        assert_eq!(p.len(), 5);
    }

    #[test]
    fn not_found_has_no_path() {
        let mut r = Route::NotFound;
        assert!(!r.is_found());
        assert!(r.path().is_none());
        assert!(r.path_mut().is_none());
        assert_eq!(r.total_cost(), None);
        assert!(r.into_path().is_none());
    }
}
