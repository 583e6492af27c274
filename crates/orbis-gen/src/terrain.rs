//! Seeded terrain for grid layers.
//!
//! Mountain ranges come from a cellular-automata cave pass: cells start as
//! mountain with some probability and are then smoothed by neighbour-count
//! rules. Mountains become impassable tiles. Passable tiles get a roughness
//! that rises with the number of mountains around them.

use orbis_core::{GraphError, Layer, LayerId, Point, Roughness, TileData};
use rand::{Rng, RngExt};

/// A rule for one iteration of cellular automata smoothing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CellularAutomataRule {
    /// If a cell has >= this many mountain neighbours in the 1-ring
    /// (8 neighbours), it becomes a mountain.
    pub w_cutoff1: i32,
    /// If a cell has <= this many mountain neighbours in the 2-ring
    /// (24 neighbours), it becomes a mountain.
    pub w_cutoff2: i32,
    /// Whether cells beyond the top and bottom rows count as mountains.
    pub walls_out_of_range: bool,
    /// How many times to apply this rule.
    pub reps: usize,
}

impl Default for CellularAutomataRule {
    fn default() -> Self {
        Self {
            w_cutoff1: 5,
            w_cutoff2: 2,
            walls_out_of_range: true,
            reps: 4,
        }
    }
}

/// Parameters for [`TerrainGen::grid_layer`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TerrainParams {
    /// Chance (0.0-1.0) that a cell starts as mountain.
    pub mountain_init_pct: f64,
    /// Smoothing rules, applied in order.
    pub rules: Vec<CellularAutomataRule>,
    /// Chance that an open tile far from mountains still gets small hills.
    pub hills_pct: f64,
    /// Lowest base cost of a passable tile. Must be > 0.
    pub base_cost: i32,
    /// Base costs are drawn from `base_cost..=base_cost + cost_jitter`.
    pub cost_jitter: i32,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            mountain_init_pct: 0.42,
            rules: vec![CellularAutomataRule::default()],
            hills_pct: 0.15,
            base_cost: 10,
            cost_jitter: 4,
        }
    }
}

/// Terrain generator driven by a caller-supplied RNG.
///
/// The same seed and parameters always produce the same layer.
pub struct TerrainGen<R: Rng> {
    pub rng: R,
}

impl<R: Rng> TerrainGen<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Generate a `width` × `height` grid layer.
    pub fn grid_layer(
        &mut self,
        id: LayerId,
        name: impl Into<String>,
        width: i32,
        height: i32,
        wrap_x: bool,
        params: &TerrainParams,
    ) -> Result<Layer, GraphError> {
        if params.base_cost <= 0 {
            return Err(GraphError::InvalidCost(params.base_cost));
        }
        let mut layer = Layer::grid(id, name, width, height, wrap_x)?;
        let map = self.mountains(width, height, wrap_x, params);

        let jitter = params.cost_jitter.max(0);
        let mut impassable = 0usize;
        for (i, &mountain) in map.cells.iter().enumerate() {
            let data = if mountain {
                impassable += 1;
                TileData::impassable()
            } else {
                let p = map.point(i);
                let roughness = match map.count_ring(p, 1, false) {
                    0 => {
                        let r: f64 = self.rng.random();
                        if r < params.hills_pct {
                            Roughness::SmallHills
                        } else {
                            Roughness::Flat
                        }
                    }
                    1..=2 => Roughness::SmallHills,
                    3..=4 => Roughness::LargeHills,
                    _ => Roughness::Mountainous,
                };
                TileData {
                    base_cost: params.base_cost + self.rng.random_range(0..=jitter),
                    roughness,
                    impassable: false,
                }
            };
            layer.set_tile(i, data)?;
        }
        log::debug!(
            "generated layer {id}: {width}x{height}, {impassable} of {} tiles impassable",
            map.cells.len()
        );
        Ok(layer)
    }

    // Random initialisation then smoothing, as a mountain bitmap.
    fn mountains(&mut self, width: i32, height: i32, wrap_x: bool, params: &TerrainParams) -> MountainMap {
        let mut map = MountainMap {
            width,
            height,
            wrap_x,
            cells: vec![false; (width * height) as usize],
        };
        for c in map.cells.iter_mut() {
            let r: f64 = self.rng.random();
            *c = r < params.mountain_init_pct;
        }

        let mut scratch = vec![false; map.cells.len()];
        for rule in &params.rules {
            for _ in 0..rule.reps {
                for (i, next) in scratch.iter_mut().enumerate() {
                    let p = map.point(i);
                    let walls1 = map.count_ring(p, 1, rule.walls_out_of_range);
                    let walls2 = map.count_ring(p, 2, rule.walls_out_of_range);
                    *next = walls1 >= rule.w_cutoff1 || walls2 <= rule.w_cutoff2;
                }
                std::mem::swap(&mut map.cells, &mut scratch);
            }
        }
        map
    }
}

struct MountainMap {
    width: i32,
    height: i32,
    wrap_x: bool,
    cells: Vec<bool>,
}

impl MountainMap {
    fn point(&self, i: usize) -> Point {
        let w = self.width as usize;
        Point::new((i % w) as i32, (i / w) as i32)
    }

    fn at(&self, p: Point) -> Option<bool> {
        let x = if self.wrap_x { p.x.rem_euclid(self.width) } else { p.x };
        if x < 0 || x >= self.width || p.y < 0 || p.y >= self.height {
            return None;
        }
        Some(self.cells[(p.y * self.width + x) as usize])
    }

    /// Count mountain cells within Chebyshev distance `radius` of `center`.
    fn count_ring(&self, center: Point, radius: i32, walls_out_of_range: bool) -> i32 {
        let mut count = 0;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx == 0 && dy == 0 {
                    continue;
                }
                match self.at(center.shift(dx, dy)) {
                    Some(true) => count += 1,
                    Some(false) => {}
                    None => {
                        if walls_out_of_range {
                            count += 1;
                        }
                    }
                }
            }
        }
        count
    }
}
