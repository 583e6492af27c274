//! Reusable [`Path`] storage.

use crate::config::PoolConfig;
use crate::path::{Path, Route};

/// Free list of [`Path`] objects, so route queries don't allocate.
///
/// The pool counts leased paths against the number of route holders the
/// caller reports. If leases pile up far beyond that, some consumer is not
/// releasing its paths: the pool logs it, forgets every outstanding lease
/// and starts a new epoch. Paths from an old epoch are dropped on release
/// rather than reused.
#[derive(Debug)]
pub struct PathPool {
    free: Vec<Path>,
    outstanding: usize,
    active_consumers: usize,
    leak_margin: usize,
    epoch: u32,
    leak_reported: bool,
}

impl Default for PathPool {
    fn default() -> Self {
        Self::new(&PoolConfig::default())
    }
}

impl PathPool {
    /// Create a pool with `config.initial_capacity` ready paths.
    pub fn new(config: &PoolConfig) -> Self {
        Self {
            free: (0..config.initial_capacity).map(|_| Path::new()).collect(),
            outstanding: 0,
            active_consumers: 0,
            leak_margin: config.leak_margin,
            epoch: 0,
            leak_reported: false,
        }
    }

    /// Report how many route holders (caravans, planners...) exist right now.
    pub fn set_active_consumers(&mut self, n: usize) {
        self.active_consumers = n;
    }

    #[inline]
    pub fn active_consumers(&self) -> usize {
        self.active_consumers
    }

    /// Hand out an empty path.
    pub fn lease(&mut self) -> Path {
        let mut path = match self.free.pop() {
            Some(p) => p,
            None => {
                self.check_leaks();
                Path::new()
            }
        };
        path.epoch = self.epoch;
        self.outstanding += 1;
        path
    }

    /// Take a path back. It is cleared and kept for the next lease.
    pub fn release(&mut self, mut path: Path) {
        if path.epoch != self.epoch {
            log::debug!("dropping path leased before pool reset");
            return;
        }
        path.clear();
        self.outstanding = self.outstanding.saturating_sub(1);
        self.free.push(path);
    }

    /// Release the path of a found route. `NotFound` is never pooled.
    pub fn recycle(&mut self, route: Route) {
        if let Route::Found(path) = route {
            self.release(path);
        }
    }

    /// Paths currently leased.
    #[inline]
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Paths ready for reuse.
    #[inline]
    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    /// Number of forced resets so far.
    #[inline]
    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    fn check_leaks(&mut self) {
        let limit = self.active_consumers.saturating_add(self.leak_margin);
        if self.outstanding <= limit {
            return;
        }
        if !self.leak_reported {
            log::error!(
                "path pool leak: {} paths leased for {} consumers, resetting pool",
                self.outstanding,
                self.active_consumers
            );
            self.leak_reported = true;
        } else {
            log::debug!("path pool reset again ({} leased)", self.outstanding);
        }
        self.free.clear();
        self.outstanding = 0;
        self.epoch = self.epoch.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbis_core::TileRef;

    fn pool(margin: usize) -> PathPool {
        PathPool::new(&PoolConfig {
            leak_margin: margin,
            initial_capacity: 0,
        })
    }

    #[test]
    fn released_paths_come_back_empty() {
        let mut pool = pool(2);
        let mut p = pool.lease();
        for i in 0..3 {
            p.push_node(TileRef::on_primary(i), i);
        }
        p.finish();
        assert_eq!(pool.outstanding(), 1);
        pool.release(p);
        assert_eq!(pool.outstanding(), 0);
        assert_eq!(pool.free_len(), 1);

        let again = pool.lease();
        assert!(again.is_empty());
        assert_eq!(again.total_cost(), 0);
        assert_eq!(again.nodes_left(), 0);
        // Same allocation: the node buffer kept its capacity.
        assert!(again.capacity() >= 3);
        assert_eq!(pool.free_len(), 0);
    }

    #[test]
    fn initial_capacity_prefills() {
        let mut pool = PathPool::new(&PoolConfig {
            leak_margin: 2,
            initial_capacity: 4,
        });
        assert_eq!(pool.free_len(), 4);
        let _p = pool.lease();
        assert_eq!(pool.free_len(), 3);
    }

    #[test]
    fn leak_triggers_reset() {
        let mut pool = pool(2);
        pool.set_active_consumers(1);
        let leaked: Vec<_> = (0..4).map(|_| pool.lease()).collect();
        assert_eq!(pool.outstanding(), 4);
        assert_eq!(pool.epoch(), 0);

        let fresh = pool.lease();
        assert_eq!(pool.epoch(), 1);
        assert_eq!(pool.outstanding(), 1);

        // Stale paths are dropped, not reused or counted.
        for p in leaked {
            pool.release(p);
        }
        assert_eq!(pool.outstanding(), 1);
        assert_eq!(pool.free_len(), 0);

        pool.release(fresh);
        assert_eq!(pool.outstanding(), 0);
        assert_eq!(pool.free_len(), 1);
    }

    #[test]
    fn recycle_ignores_not_found() {
        let mut pool = pool(2);
        pool.recycle(Route::NotFound);
        assert_eq!(pool.free_len(), 0);
        let p = pool.lease();
        pool.recycle(Route::Found(p));
        assert_eq!(pool.free_len(), 1);
        assert_eq!(pool.outstanding(), 0);
    }
}
