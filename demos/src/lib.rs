//! Caravan simulation shared by the demo binaries.
//!
//! Demonstrates: seeded terrain, settlement placement with closest-tile
//! searches, road layout, pooled routes, reachability checks and replanning
//! while mountains open and close under the caravans' feet.

use orbis_core::{GraphError, LayerId, Road, TileGraph, TileRef};
use orbis_gen::{RoadPlanner, RoadReport, TerrainGen, TerrainParams};
use orbis_paths::{FindPathParams, NavConfig, Navigator, Path, Route};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub width: i32,
    pub height: i32,
    pub seed: u64,
    pub settlements: usize,
    pub caravans: usize,
    /// Chance per tick that one tile flips between passable and impassable.
    pub toggle_pct: f64,
    /// Road links may cost at most this many times the straight estimate.
    pub max_detour: f64,
    pub terrain: TerrainParams,
    pub nav: NavConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: 48,
            height: 24,
            seed: 42,
            settlements: 6,
            caravans: 10,
            toggle_pct: 0.3,
            max_detour: 2.5,
            terrain: TerrainParams::default(),
            nav: NavConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Caravans
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Caravan {
    pub pos: TileRef,
    pub target: Option<TileRef>,
    pub trips: u32,
    route: Option<Path>,
}

impl Caravan {
    /// The route being followed, if any.
    pub fn route(&self) -> Option<&Path> {
        self.route.as_ref()
    }
}

/// Counters accumulated over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimStats {
    pub ticks: u64,
    pub steps: u64,
    pub arrivals: u64,
    /// Routes dropped because the next tile turned impassable.
    pub replans: u64,
    /// Targets rejected as unreachable.
    pub unreachable: u64,
    pub toggles: u64,
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

pub struct Simulation {
    graph: TileGraph,
    nav: Navigator,
    rng: StdRng,
    settlements: Vec<TileRef>,
    caravans: Vec<Caravan>,
    toggle_pct: f64,
    roads: RoadReport,
    stats: SimStats,
}

impl Simulation {
    /// Generate a world and place settlements, roads and caravans.
    pub fn new(config: &SimConfig) -> Result<Self, GraphError> {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut tg = TerrainGen::new(StdRng::seed_from_u64(rng.random()));
        let layer = tg.grid_layer(
            LayerId::PRIMARY,
            "surface",
            config.width,
            config.height,
            true,
            &config.terrain,
        )?;
        let mut graph = TileGraph::new();
        graph.add_layer(layer)?;

        let mut nav = Navigator::new(&config.nav);
        nav.sync(&mut graph);

        let len = config.width * config.height;
        let mut settlements: Vec<TileRef> = Vec::new();
        for _ in 0..config.settlements {
            let guess = TileRef::on_primary(rng.random_range(0..len));
            let hit = nav.closest_tile(
                &graph,
                guess,
                |_| true,
                |t| !graph.is_impassable(t) && !settlements.contains(&t),
                config.width + config.height,
            );
            if let Some(node) = hit {
                settlements.push(node.tile);
            }
        }

        let roads = {
            let (finder, pool, _) = nav.parts_mut();
            RoadPlanner::new().lay_roads(
                &mut graph,
                finder,
                pool,
                &settlements,
                Road::Stone,
                config.max_detour,
            )
        };
        nav.sync(&mut graph);
        log::info!(
            "world {}x{}: {} settlements, {} linked by road, {} road edges",
            config.width,
            config.height,
            settlements.len(),
            roads.linked,
            roads.road_edges
        );

        let caravans: Vec<Caravan> = if settlements.is_empty() {
            Vec::new()
        } else {
            (0..config.caravans)
                .map(|i| Caravan {
                    pos: settlements[i % settlements.len()],
                    target: None,
                    trips: 0,
                    route: None,
                })
                .collect()
        };
        nav.set_active_consumers(caravans.len());

        Ok(Self {
            graph,
            nav,
            rng,
            settlements,
            caravans,
            toggle_pct: config.toggle_pct,
            roads,
            stats: SimStats::default(),
        })
    }

    /// Advance one tick: maybe flip a tile, then move every caravan.
    pub fn step(&mut self) {
        self.stats.ticks += 1;
        self.maybe_toggle();
        self.nav.sync(&mut self.graph);

        let Self {
            graph,
            nav,
            rng,
            settlements,
            caravans,
            stats,
            ..
        } = self;
        for caravan in caravans.iter_mut() {
            if caravan.route.is_none() {
                plan(caravan, graph, nav, rng, settlements, stats);
                continue;
            }
            let Some(route) = caravan.route.as_mut() else {
                continue;
            };
            let Some(next) = route.peek(0) else {
                continue;
            };
            if graph.is_impassable(next) {
                log::debug!("caravan at {} blocked at {next}, replanning", caravan.pos);
                stats.replans += 1;
                if let Some(path) = caravan.route.take() {
                    nav.release_path(path);
                }
                continue;
            }
            route.consume_next_node();
            caravan.pos = next;
            stats.steps += 1;
            if route.nodes_left() == 0 {
                caravan.trips += 1;
                stats.arrivals += 1;
                caravan.target = None;
                if let Some(path) = caravan.route.take() {
                    nav.release_path(path);
                }
            }
        }
    }

    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.step();
        }
    }

    /// Number of passable tiles connected to any settlement.
    pub fn settled_area(&mut self) -> usize {
        let graph = &self.graph;
        let mut area = 0;
        self.nav.flood_fill(
            graph,
            &self.settlements,
            |t| !graph.is_impassable(t),
            |_, _| {
                area += 1;
                false
            },
            usize::MAX,
        );
        area
    }

    pub fn graph(&self) -> &TileGraph {
        &self.graph
    }

    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    pub fn settlements(&self) -> &[TileRef] {
        &self.settlements
    }

    pub fn caravans(&self) -> &[Caravan] {
        &self.caravans
    }

    pub fn roads(&self) -> RoadReport {
        self.roads
    }

    pub fn stats(&self) -> SimStats {
        self.stats
    }

    // Flip one tile that is neither a settlement nor under a caravan.
    fn maybe_toggle(&mut self) {
        let r: f64 = self.rng.random();
        if r >= self.toggle_pct {
            return;
        }
        let Some(len) = self.graph.layer(LayerId::PRIMARY).map(|l| l.len()) else {
            return;
        };
        let t = TileRef::on_primary(self.rng.random_range(0..len as i32));
        if self.settlements.contains(&t) || self.caravans.iter().any(|c| c.pos == t) {
            return;
        }
        let blocked = self.graph.is_impassable(t);
        if self.graph.set_impassable(t, !blocked).is_ok() {
            self.stats.toggles += 1;
        }
    }
}

// Pick a new destination and lease a route to it.
fn plan(
    caravan: &mut Caravan,
    graph: &TileGraph,
    nav: &mut Navigator,
    rng: &mut StdRng,
    settlements: &[TileRef],
    stats: &mut SimStats,
) {
    if settlements.len() < 2 {
        return;
    }
    let target = match caravan.target {
        Some(t) => t,
        None => loop {
            let t = settlements[rng.random_range(0..settlements.len())];
            if t != caravan.pos {
                break t;
            }
        },
    };
    // Prefer roads: every step off-road pays a little extra.
    let off_road = |a: TileRef, b: TileRef| if graph.road_between(a, b).is_some() { 0 } else { 1 };
    let params = FindPathParams {
        extra_cost: Some(&off_road),
        ..FindPathParams::default()
    };
    match nav.find_path(graph, caravan.pos, target, &params) {
        Route::Found(mut path) => {
            // The first node is where the caravan already stands.
            path.consume_next_node();
            caravan.target = Some(target);
            caravan.route = Some(path);
        }
        Route::NotFound => {
            stats.unreachable += 1;
            caravan.target = None;
        }
    }
}
