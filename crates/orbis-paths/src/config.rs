//! Tunables for the pathfinding services.

/// Configuration for a [`PathPool`](crate::PathPool).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PoolConfig {
    /// How many leased paths beyond the reported consumer count are
    /// tolerated before the pool assumes a leak and resets.
    pub leak_margin: usize,
    /// Paths allocated up front.
    pub initial_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            leak_margin: 2,
            initial_capacity: 0,
        }
    }
}

/// Configuration for a [`ReachabilityCache`](crate::ReachabilityCache).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReachabilityConfig {
    /// Once the next field id passes this value, the next invalidation
    /// restarts numbering from 1 and recomputes every cached layer.
    pub field_id_limit: u32,
}

impl Default for ReachabilityConfig {
    fn default() -> Self {
        Self {
            field_id_limit: u32::MAX - 1,
        }
    }
}

/// Configuration for a [`Navigator`](crate::Navigator).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NavConfig {
    pub pool: PoolConfig,
    pub reachability: ReachabilityConfig,
    /// Use A* with the graph's admissible estimate instead of plain Dijkstra.
    pub use_heuristic: bool,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            pool: PoolConfig::default(),
            reachability: ReachabilityConfig::default(),
            use_heuristic: true,
        }
    }
}
