//! A [`Layer`]: one independent graph of tiles with terrain and road overlays.

use std::collections::HashMap;

use crate::error::GraphError;
use crate::geom::Point;
use crate::tile::{LayerId, TileRef};

// ---------------------------------------------------------------------------
// Tile attributes
// ---------------------------------------------------------------------------

/// Terrain roughness, scaling the cost of entering a tile.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Roughness {
    #[default]
    Flat,
    SmallHills,
    LargeHills,
    Mountainous,
}

impl Roughness {
    /// Cost multiplier in percent.
    #[inline]
    pub const fn cost_percent(self) -> i32 {
        match self {
            Roughness::Flat => 100,
            Roughness::SmallHills => 150,
            Roughness::LargeHills => 200,
            Roughness::Mountainous => 300,
        }
    }
}

/// Road overlay on an edge between two adjacent tiles.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Road {
    Path,
    Dirt,
    Stone,
    Asphalt,
}

impl Road {
    /// Cost multiplier in percent.
    #[inline]
    pub const fn cost_percent(self) -> i32 {
        match self {
            Road::Path => 75,
            Road::Dirt => 60,
            Road::Stone => 50,
            Road::Asphalt => 40,
        }
    }

    /// The cheapest road multiplier, used for admissible cost bounds.
    pub const BEST_PERCENT: i32 = Road::Asphalt.cost_percent();
}

/// Per-tile terrain attributes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TileData {
    /// Cost of entering this tile on flat ground without a road. Must be > 0.
    pub base_cost: i32,
    pub roughness: Roughness,
    /// Impassable tiles are never entered and never reachable.
    pub impassable: bool,
}

impl Default for TileData {
    fn default() -> Self {
        Self {
            base_cost: 1,
            roughness: Roughness::Flat,
            impassable: false,
        }
    }
}

impl TileData {
    /// A passable tile with the given base cost.
    pub const fn with_cost(base_cost: i32) -> Self {
        Self {
            base_cost,
            roughness: Roughness::Flat,
            impassable: false,
        }
    }

    /// An impassable tile.
    pub const fn impassable() -> Self {
        Self {
            base_cost: 1,
            roughness: Roughness::Flat,
            impassable: true,
        }
    }

    /// Cost of entering this tile over an edge with the given road multiplier.
    /// Never less than 1.
    #[inline]
    pub fn entry_cost(&self, road_percent: i32) -> i32 {
        let raw = i64::from(self.base_cost)
            * i64::from(self.roughness.cost_percent())
            * i64::from(road_percent)
            / 10_000;
        i32::try_from(raw.max(1)).unwrap_or(i32::MAX)
    }
}

// ---------------------------------------------------------------------------
// Adjacency
// ---------------------------------------------------------------------------

/// How the tiles of a layer connect to each other.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Adjacency {
    /// 4-neighbour grid in row-major order. With `wrap_x` the west and east
    /// edges join, like a band around a planet.
    Grid { width: i32, height: i32, wrap_x: bool },
    /// Arbitrary undirected adjacency lists, one per tile.
    Explicit(Vec<Vec<u32>>),
}

// ---------------------------------------------------------------------------
// Layer
// ---------------------------------------------------------------------------

/// A fixed-size set of tiles plus their adjacency.
///
/// Layers are built and edited freely before they are added to a
/// [`TileGraph`](crate::TileGraph). Afterwards the graph only hands out
/// shared references and all edits go through it, so change events are
/// never missed.
#[derive(Clone, Debug)]
pub struct Layer {
    id: LayerId,
    name: String,
    adjacency: Adjacency,
    tiles: Vec<TileData>,
    roads: HashMap<(u32, u32), Road>,
    // Lower bound on any edge cost in this layer. Edits only lower it.
    min_step_cost: i32,
}

impl Layer {
    /// Create a grid layer of `width` × `height` default tiles.
    pub fn grid(
        id: LayerId,
        name: impl Into<String>,
        width: i32,
        height: i32,
        wrap_x: bool,
    ) -> Result<Self, GraphError> {
        let len = if width > 0 && height > 0 {
            width.checked_mul(height)
        } else {
            None
        };
        let Some(len) = len else {
            return Err(GraphError::InvalidDimensions { width, height });
        };
        Ok(Self::with_adjacency(
            id,
            name.into(),
            Adjacency::Grid {
                width,
                height,
                wrap_x,
            },
            len as usize,
        ))
    }

    /// Create a layer from explicit adjacency lists.
    ///
    /// Every list entry must name another tile of the layer, appear once,
    /// and be mirrored in the neighbour's own list.
    pub fn from_adjacency(
        id: LayerId,
        name: impl Into<String>,
        lists: Vec<Vec<u32>>,
    ) -> Result<Self, GraphError> {
        if i32::try_from(lists.len()).is_err() {
            return Err(GraphError::InvalidAdjacency {
                tile: u32::MAX,
                reason: "too many tiles",
            });
        }
        for (i, list) in lists.iter().enumerate() {
            let tile = i as u32;
            for (k, &n) in list.iter().enumerate() {
                let Some(back) = lists.get(n as usize) else {
                    return Err(GraphError::InvalidAdjacency {
                        tile,
                        reason: "neighbour out of range",
                    });
                };
                if n == tile {
                    return Err(GraphError::InvalidAdjacency {
                        tile,
                        reason: "self loop",
                    });
                }
                if list[..k].contains(&n) {
                    return Err(GraphError::InvalidAdjacency {
                        tile,
                        reason: "duplicate neighbour",
                    });
                }
                if !back.contains(&tile) {
                    return Err(GraphError::InvalidAdjacency {
                        tile,
                        reason: "asymmetric neighbour",
                    });
                }
            }
        }
        let len = lists.len();
        Ok(Self::with_adjacency(
            id,
            name.into(),
            Adjacency::Explicit(lists),
            len,
        ))
    }

    /// A chain `0 - 1 - ... - (len-1)`.
    pub fn line(id: LayerId, name: impl Into<String>, len: u32) -> Result<Self, GraphError> {
        let lists = (0..len)
            .map(|i| {
                let mut l = Vec::with_capacity(2);
                if i > 0 {
                    l.push(i - 1);
                }
                if i + 1 < len {
                    l.push(i + 1);
                }
                l
            })
            .collect();
        Self::from_adjacency(id, name, lists)
    }

    /// A closed ring of `len` tiles, e.g. an orbital band. Needs `len >= 3`.
    pub fn ring(id: LayerId, name: impl Into<String>, len: u32) -> Result<Self, GraphError> {
        if len < 3 {
            return Err(GraphError::InvalidDimensions {
                width: len as i32,
                height: 1,
            });
        }
        let lists = (0..len)
            .map(|i| vec![(i + len - 1) % len, (i + 1) % len])
            .collect();
        Self::from_adjacency(id, name, lists)
    }

    fn with_adjacency(id: LayerId, name: String, adjacency: Adjacency, len: usize) -> Self {
        Self {
            id,
            name,
            adjacency,
            tiles: vec![TileData::default(); len],
            roads: HashMap::new(),
            min_step_cost: 1,
        }
    }

    #[inline]
    pub fn id(&self) -> LayerId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn adjacency(&self) -> &Adjacency {
        &self.adjacency
    }

    /// Number of tiles.
    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// A [`TileRef`] for `index` on this layer. Does not range-check.
    #[inline]
    pub fn tile_ref(&self, index: usize) -> TileRef {
        TileRef::new(index as i32, self.id)
    }

    /// Attributes of tile `index`.
    #[inline]
    pub fn tile(&self, index: usize) -> Option<&TileData> {
        self.tiles.get(index)
    }

    /// Whether tile `index` is impassable. Out-of-range tiles are.
    #[inline]
    pub fn is_impassable(&self, index: usize) -> bool {
        self.tiles.get(index).is_none_or(|t| t.impassable)
    }

    /// Lower bound on the cost of any single step in this layer.
    #[inline]
    pub fn min_step_cost(&self) -> i32 {
        self.min_step_cost
    }

    /// Recompute the tightest step-cost bound from the current tiles.
    ///
    /// Edits only ever lower the bound, so it drifts loose over time;
    /// [`TileGraph::add_layer`](crate::TileGraph::add_layer) calls this once.
    pub fn refresh_cost_bound(&mut self) {
        self.min_step_cost = self
            .tiles
            .iter()
            .filter(|t| !t.impassable)
            .map(|t| t.entry_cost(Road::BEST_PERCENT))
            .min()
            .unwrap_or(1);
    }

    // -----------------------------------------------------------------------
    // Adjacency
    // -----------------------------------------------------------------------

    /// Call `f` for every neighbour of `index` in deterministic order.
    ///
    /// Grid order is north, east, south, west. Out-of-range `index` has no
    /// neighbours.
    pub fn for_each_neighbor(&self, index: usize, mut f: impl FnMut(usize)) {
        if index >= self.tiles.len() {
            return;
        }
        match &self.adjacency {
            Adjacency::Grid {
                width,
                height,
                wrap_x,
            } => {
                let (w, h) = (*width as usize, *height as usize);
                let (x, y) = (index % w, index / w);
                if y > 0 {
                    f(index - w);
                }
                let east = if x + 1 < w {
                    Some(x + 1)
                } else if *wrap_x && w > 1 {
                    Some(0)
                } else {
                    None
                };
                if let Some(ex) = east {
                    f(y * w + ex);
                }
                if y + 1 < h {
                    f(index + w);
                }
                let west = if x > 0 {
                    Some(x - 1)
                } else if *wrap_x && w > 1 {
                    Some(w - 1)
                } else {
                    None
                };
                // On a two-wide wrapped band east and west are the same tile.
                if let Some(wx) = west.filter(|&wx| Some(wx) != east) {
                    f(y * w + wx);
                }
            }
            Adjacency::Explicit(lists) => {
                for &n in &lists[index] {
                    f(n as usize);
                }
            }
        }
    }

    /// Append the neighbours of `index` into `buf`. The caller clears `buf`.
    pub fn neighbors(&self, index: usize, buf: &mut Vec<usize>) {
        self.for_each_neighbor(index, |n| buf.push(n));
    }

    /// Whether `a` and `b` share an edge.
    pub fn is_adjacent(&self, a: usize, b: usize) -> bool {
        let mut found = false;
        self.for_each_neighbor(a, |n| found |= n == b);
        found
    }

    // -----------------------------------------------------------------------
    // Costs and roads
    // -----------------------------------------------------------------------

    /// Road on the edge between `a` and `b`, if any.
    #[inline]
    pub fn road_between(&self, a: usize, b: usize) -> Option<Road> {
        self.roads.get(&edge_key(a, b)).copied()
    }

    /// Cost of stepping from `from` to its neighbour `to`.
    ///
    /// Adjacency is not checked here; callers walk neighbour lists.
    pub fn edge_cost(&self, from: usize, to: usize) -> i32 {
        let Some(dest) = self.tiles.get(to) else {
            return i32::MAX;
        };
        let pct = self.road_between(from, to).map_or(100, Road::cost_percent);
        dest.entry_cost(pct)
    }

    /// Number of road edges on this layer.
    pub fn road_count(&self) -> usize {
        self.roads.len()
    }

    // -----------------------------------------------------------------------
    // Editing
    // -----------------------------------------------------------------------

    /// Replace the attributes of tile `index`, returning the old ones.
    pub fn set_tile(&mut self, index: usize, data: TileData) -> Result<TileData, GraphError> {
        if data.base_cost <= 0 {
            return Err(GraphError::InvalidCost(data.base_cost));
        }
        let id = self.id;
        let Some(slot) = self.tiles.get_mut(index) else {
            return Err(GraphError::TileOutOfRange(TileRef::new(index as i32, id)));
        };
        let old = std::mem::replace(slot, data);
        // Impassable tiles are never entered. Reopening one comes back here.
        if !data.impassable {
            self.min_step_cost = self.min_step_cost.min(data.entry_cost(Road::BEST_PERCENT));
        }
        Ok(old)
    }

    /// Set or clear the road between two adjacent tiles, returning the old one.
    pub fn set_road(
        &mut self,
        a: usize,
        b: usize,
        road: Option<Road>,
    ) -> Result<Option<Road>, GraphError> {
        if !self.is_adjacent(a, b) {
            return Err(GraphError::NotAdjacent {
                from: self.tile_ref(a),
                to: self.tile_ref(b),
            });
        }
        let key = edge_key(a, b);
        Ok(match road {
            Some(r) => self.roads.insert(key, r),
            None => self.roads.remove(&key),
        })
    }

    // -----------------------------------------------------------------------
    // Grid coordinates
    // -----------------------------------------------------------------------

    /// Grid coordinates of tile `index`, for grid layers.
    pub fn point_of(&self, index: usize) -> Option<Point> {
        match self.adjacency {
            Adjacency::Grid { width, .. } if index < self.tiles.len() => {
                let w = width as usize;
                Some(Point::new((index % w) as i32, (index / w) as i32))
            }
            _ => None,
        }
    }

    /// Tile index at `p`, for grid layers. Wrapped layers accept any `x`.
    pub fn index_of(&self, p: Point) -> Option<usize> {
        let Adjacency::Grid {
            width,
            height,
            wrap_x,
        } = self.adjacency
        else {
            return None;
        };
        let x = if wrap_x { p.x.rem_euclid(width) } else { p.x };
        if x < 0 || x >= width || p.y < 0 || p.y >= height {
            return None;
        }
        Some(p.y as usize * width as usize + x as usize)
    }

    /// Lower bound on the number of steps between `a` and `b`.
    ///
    /// Exact Manhattan distance on grids (minding the wrap), 0 otherwise.
    pub fn hop_lower_bound(&self, a: usize, b: usize) -> i32 {
        let (Some(pa), Some(pb)) = (self.point_of(a), self.point_of(b)) else {
            return 0;
        };
        let Adjacency::Grid { width, wrap_x, .. } = self.adjacency else {
            return 0;
        };
        let mut dx = (pa.x - pb.x).abs();
        if wrap_x {
            dx = dx.min(width - dx);
        }
        dx + (pa.y - pb.y).abs()
    }
}

#[inline]
fn edge_key(a: usize, b: usize) -> (u32, u32) {
    let (a, b) = (a as u32, b as u32);
    (a.min(b), a.max(b))
}
