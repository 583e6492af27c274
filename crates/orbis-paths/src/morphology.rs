//! Tile-set utilities built on the flood filler: nearest-tile search,
//! dilation, erosion and distance-from-edge queries.
//!
//! Regions are slices of tiles on one layer. Tiles on a different layer
//! from the region's first valid tile are ignored. Results are returned in
//! ascending [`TileRef`] order without duplicates.

use orbis_core::{LayerId, TileRef};

use crate::floodfill::{FloodFiller, PathNode};
use crate::traits::Pather;

/// Find the nearest tile (by hop count) satisfying `predicate`.
///
/// Only tiles passing `can_traverse` are explored, and nothing farther than
/// `max_dist` hops is considered. Ties go to the first tile in visiting
/// order. `start` itself is a candidate at distance 0.
pub fn closest_tile<P, T, F>(
    filler: &mut FloodFiller,
    pather: &P,
    start: TileRef,
    can_traverse: T,
    mut predicate: F,
    max_dist: i32,
) -> Option<PathNode>
where
    P: Pather + ?Sized,
    T: FnMut(TileRef) -> bool,
    F: FnMut(TileRef) -> bool,
{
    let mut found = None;
    filler.flood_fill(
        pather,
        start,
        can_traverse,
        |tile, cost| {
            if cost > max_dist {
                return true;
            }
            if predicate(tile) {
                found = Some(PathNode { tile, cost });
                return true;
            }
            false
        },
        usize::MAX,
    );
    found
}

/// Grow `region` by `hops` steps through tiles passing `can_traverse`.
///
/// The region itself is always part of the result.
pub fn dilate<P, T>(
    filler: &mut FloodFiller,
    pather: &P,
    region: &[TileRef],
    hops: i32,
    mut can_traverse: T,
) -> Vec<TileRef>
where
    P: Pather + ?Sized,
    T: FnMut(TileRef) -> bool,
{
    let Some(mut mask) = RegionMask::new(pather, region) else {
        return Vec::new();
    };
    let mut reached = Vec::new();
    {
        let inside = &mask;
        filler.flood_fill_from(
            pather,
            region,
            |t| inside.contains(t) || can_traverse(t),
            |t, d| {
                if d > hops {
                    return true;
                }
                reached.push(t);
                false
            },
            usize::MAX,
        );
    }
    for t in reached {
        mask.insert(t);
    }
    mask.tiles()
}

/// Region tiles more than `n` hops from the region's edge.
///
/// Edge tiles are region tiles with at least one neighbour outside the
/// region; they are at distance 0. Distances are measured inside the
/// region. A region without edge tiles (one covering a whole layer) is
/// returned whole.
pub fn tiles_beyond<P>(
    filler: &mut FloodFiller,
    pather: &P,
    region: &[TileRef],
    n: i32,
) -> Vec<TileRef>
where
    P: Pather + ?Sized,
{
    let Some(mut mask) = RegionMask::new(pather, region) else {
        return Vec::new();
    };
    if n < 0 {
        return mask.tiles();
    }

    let mut edge = Vec::new();
    let mut nbuf = Vec::new();
    for tile in mask.tiles() {
        nbuf.clear();
        pather.neighbors(tile, &mut nbuf);
        if nbuf.iter().any(|&nb| !mask.contains(nb)) {
            edge.push(tile);
        }
    }

    let mut near = Vec::new();
    {
        let inside = &mask;
        filler.flood_fill_from(
            pather,
            &edge,
            |t| inside.contains(t),
            |t, d| {
                if d > n {
                    return true;
                }
                near.push(t);
                false
            },
            usize::MAX,
        );
    }
    for t in near {
        mask.remove(t);
    }
    mask.tiles()
}

/// Shrink `region` by `hops` steps: drop every tile within `hops - 1` of
/// its edge. `hops <= 0` returns the region unchanged.
pub fn erode<P>(filler: &mut FloodFiller, pather: &P, region: &[TileRef], hops: i32) -> Vec<TileRef>
where
    P: Pather + ?Sized,
{
    tiles_beyond(filler, pather, region, hops.saturating_sub(1).max(-1))
}

// Membership bitmap of a region on one layer.
struct RegionMask {
    layer: LayerId,
    bits: Vec<bool>,
}

impl RegionMask {
    fn new<P: Pather + ?Sized>(pather: &P, region: &[TileRef]) -> Option<Self> {
        let layer = region.iter().find(|t| t.is_valid())?.layer();
        let len = pather.layer_len(layer)?;
        let mut mask = Self {
            layer,
            bits: vec![false; len],
        };
        for &t in region {
            mask.insert(t);
        }
        Some(mask)
    }

    fn slot(&self, t: TileRef) -> Option<usize> {
        if t.layer() != self.layer {
            return None;
        }
        t.slot(self.bits.len())
    }

    fn contains(&self, t: TileRef) -> bool {
        self.slot(t).is_some_and(|i| self.bits[i])
    }

    fn insert(&mut self, t: TileRef) {
        if let Some(i) = self.slot(t) {
            self.bits[i] = true;
        }
    }

    fn remove(&mut self, t: TileRef) {
        if let Some(i) = self.slot(t) {
            self.bits[i] = false;
        }
    }

    fn tiles(&self) -> Vec<TileRef> {
        self.bits
            .iter()
            .enumerate()
            .filter(|&(_, &b)| b)
            .map(|(i, _)| TileRef::new(i as i32, self.layer))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbis_core::{Layer, TileGraph};

    fn grid5() -> TileGraph {
        let mut g = TileGraph::new();
        g.add_layer(Layer::grid(LayerId::PRIMARY, "surface", 5, 5, false).unwrap())
            .unwrap();
        g
    }

    fn tiles(ix: &[i32]) -> Vec<TileRef> {
        ix.iter().map(|&i| TileRef::on_primary(i)).collect()
    }

    fn indices(ts: &[TileRef]) -> Vec<i32> {
        ts.iter().map(|t| t.index()).collect()
    }

    // Rows 1..=3, columns 1..=3 of the 5x5 grid.
    fn center_square() -> Vec<TileRef> {
        tiles(&[6, 7, 8, 11, 12, 13, 16, 17, 18])
    }

    #[test]
    fn closest_tile_by_hops() {
        let g = grid5();
        let mut f = FloodFiller::new();
        let hit = closest_tile(&mut f, &g, TileRef::on_primary(0), |_| true, |t| t.index() == 24, 10);
        assert_eq!(
            hit,
            Some(PathNode {
                tile: TileRef::on_primary(24),
                cost: 8
            })
        );
        let miss = closest_tile(&mut f, &g, TileRef::on_primary(0), |_| true, |t| t.index() == 24, 3);
        assert_eq!(miss, None);
        let here = closest_tile(&mut f, &g, TileRef::on_primary(3), |_| true, |_| true, 0);
        assert_eq!(here.map(|n| n.cost), Some(0));
    }

    #[test]
    fn dilate_grows_through_traversable_tiles() {
        let g = grid5();
        let mut f = FloodFiller::new();
        let grown = dilate(&mut f, &g, &tiles(&[12]), 1, |_| true);
        assert_eq!(indices(&grown), vec![7, 11, 12, 13, 17]);
        let blocked = dilate(&mut f, &g, &tiles(&[12]), 1, |t| t.index() != 13);
        assert_eq!(indices(&blocked), vec![7, 11, 12, 17]);
        assert_eq!(indices(&dilate(&mut f, &g, &tiles(&[12]), 0, |_| true)), vec![12]);
    }

    #[test]
    fn erode_peels_the_edge() {
        let g = grid5();
        let mut f = FloodFiller::new();
        let region = center_square();
        assert_eq!(indices(&erode(&mut f, &g, &region, 1)), vec![12]);
        assert!(erode(&mut f, &g, &region, 2).is_empty());
        assert_eq!(erode(&mut f, &g, &region, 0).len(), 9);
    }

    #[test]
    fn tiles_beyond_edge_distance() {
        let mut g = TileGraph::new();
        g.add_layer(Layer::line(LayerId::PRIMARY, "line", 10).unwrap())
            .unwrap();
        let mut f = FloodFiller::new();
        let region = tiles(&[2, 3, 4, 5, 6, 7]);
        assert_eq!(indices(&tiles_beyond(&mut f, &g, &region, 1)), vec![4, 5]);
        assert_eq!(indices(&tiles_beyond(&mut f, &g, &region, 0)), vec![3, 4, 5, 6]);
        assert!(tiles_beyond(&mut f, &g, &region, 2).is_empty());
    }

    #[test]
    fn whole_layer_region_has_no_edge() {
        let g = grid5();
        let mut f = FloodFiller::new();
        let all: Vec<_> = (0..25).map(TileRef::on_primary).collect();
        assert_eq!(tiles_beyond(&mut f, &g, &all, 3).len(), 25);
    }

    #[test]
    fn empty_or_foreign_regions() {
        let g = grid5();
        let mut f = FloodFiller::new();
        assert!(dilate(&mut f, &g, &[], 2, |_| true).is_empty());
        assert!(erode(&mut f, &g, &[TileRef::new(0, LayerId(7))], 1).is_empty());
        let mixed = [TileRef::on_primary(12), TileRef::new(3, LayerId(7))];
        assert_eq!(indices(&erode(&mut f, &g, &mixed, 0)), vec![12]);
    }
}
