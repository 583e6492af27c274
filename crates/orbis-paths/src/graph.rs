//! Pather implementations for [`TileGraph`].

use orbis_core::{LayerId, TileGraph, TileRef};

use crate::traits::{AstarPather, BlockingPather, Pather, WeightedPather};

impl Pather for TileGraph {
    #[inline]
    fn layer_len(&self, layer: LayerId) -> Option<usize> {
        self.layer(layer).map(|l| l.len())
    }

    #[inline]
    fn neighbors(&self, tile: TileRef, buf: &mut Vec<TileRef>) {
        TileGraph::neighbors(self, tile, buf);
    }
}

impl BlockingPather for TileGraph {
    #[inline]
    fn impassable(&self, tile: TileRef) -> bool {
        self.is_impassable(tile)
    }
}

impl WeightedPather for TileGraph {
    fn cost(&self, from: TileRef, to: TileRef) -> i32 {
        // Search only ever asks about neighbours, so skip the adjacency check.
        let Some(layer) = self.layer(to.layer()) else {
            return i32::MAX;
        };
        match (from.slot(layer.len()), to.slot(layer.len())) {
            (Some(a), Some(b)) => layer.edge_cost(a, b),
            _ => i32::MAX,
        }
    }
}

impl AstarPather for TileGraph {
    fn estimate(&self, from: TileRef, to: TileRef) -> i32 {
        let Some(layer) = self.layer(to.layer()) else {
            return 0;
        };
        match (from.slot(layer.len()), to.slot(layer.len())) {
            (Some(a), Some(b)) => layer
                .hop_lower_bound(a, b)
                .saturating_mul(layer.min_step_cost()),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbis_core::{Layer, Point, Road, TileData};

    #[test]
    fn estimate_never_exceeds_cheapest_route() {
        let mut layer = Layer::grid(LayerId::PRIMARY, "surface", 4, 1, false).unwrap();
        for i in 0..4 {
            layer.set_tile(i, TileData::with_cost(10)).unwrap();
        }
        let mut g = TileGraph::new();
        g.add_layer(layer).unwrap();
        let a = TileRef::on_primary(0);
        let d = TileRef::on_primary(3);
        // Three steps, each at least 10 * 40% = 4.
        assert_eq!(g.estimate(a, d), 12);
        g.set_road(a, TileRef::on_primary(1), Some(Road::Asphalt))
            .unwrap();
        assert_eq!(g.cost(a, TileRef::on_primary(1)), 4);
        assert_eq!(g.layer(LayerId::PRIMARY).unwrap().index_of(Point::new(3, 0)), Some(3));
    }

    #[test]
    fn pather_view_matches_graph() {
        let mut g = TileGraph::new();
        g.add_layer(Layer::line(LayerId(2), "line", 3).unwrap())
            .unwrap();
        assert_eq!(g.layer_len(LayerId(2)), Some(3));
        assert_eq!(g.layer_len(LayerId(5)), None);
        assert!(g.impassable(TileRef::INVALID));
        assert_eq!(g.estimate(TileRef::new(0, LayerId(2)), TileRef::new(2, LayerId(2))), 0);
    }
}
