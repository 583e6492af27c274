//! Lazily labelled connectivity fields.
//!
//! Every passable tile belongs to a *field*: the connected component of
//! passable tiles around it. Two tiles can reach each other exactly when
//! they share a field. Labels are computed on demand by flood fill and
//! stay valid until the next invalidation, which bumps the lowest valid
//! field id instead of clearing anything.

use std::collections::BTreeMap;

use orbis_core::{GraphEvent, LayerId, TileRef};

use crate::config::ReachabilityConfig;
use crate::floodfill::FloodFiller;
use crate::traits::BlockingPather;

/// Cache answering "is there any path from `a` to `b`?".
///
/// A label of `0` means never resolved. A label is current when it is at
/// least `min_valid_field_id`. The first id of each generation is reserved
/// for impassable tiles, which never reach anything.
#[derive(Debug)]
pub struct ReachabilityCache {
    layers: BTreeMap<LayerId, Vec<u32>>,
    next_field_id: u32,
    min_valid_field_id: u32,
    impassable_field_id: u32,
    generation: u32,
    field_id_limit: u32,
    filler: FloodFiller,
}

impl Default for ReachabilityCache {
    fn default() -> Self {
        Self::new(&ReachabilityConfig::default())
    }
}

impl ReachabilityCache {
    pub fn new(config: &ReachabilityConfig) -> Self {
        let mut cache = Self {
            layers: BTreeMap::new(),
            next_field_id: 1,
            min_valid_field_id: 1,
            impassable_field_id: 1,
            generation: 0,
            field_id_limit: config.field_id_limit.max(2),
            filler: FloodFiller::new(),
        };
        cache.start_generation();
        cache
    }

    // A cache whose first generation starts at field id `first`.
    #[cfg(test)]
    fn starting_at(config: &ReachabilityConfig, first: u32) -> Self {
        let mut cache = Self::new(config);
        cache.generation = 0;
        cache.next_field_id = first;
        cache.start_generation();
        cache
    }

    /// Current generation, starting at 1. Reset to 1 when field ids run out.
    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Whether a path exists between `a` and `b`.
    ///
    /// Tiles on different layers, invalid tiles and impassable tiles never
    /// reach anything, not even themselves.
    pub fn can_reach<P: BlockingPather + ?Sized>(&mut self, pather: &P, a: TileRef, b: TileRef) -> bool {
        if !a.is_valid() || !b.is_valid() || !a.same_layer(b) {
            return false;
        }
        let layer = a.layer();
        let Some(len) = pather.layer_len(layer) else {
            return false;
        };
        let (Some(ai), Some(bi)) = (a.slot(len), b.slot(len)) else {
            return false;
        };
        self.ensure_layer(layer, len);

        match (self.label(layer, ai), self.label(layer, bi)) {
            (Some(fa), Some(fb)) => fa == fb && fa != self.impassable_field_id,
            // A current label covers its whole field, so the other tile is
            // elsewhere.
            (Some(_), None) | (None, Some(_)) => false,
            (None, None) => {
                if !self.resolve(pather, layer, ai) {
                    // Field ids ran out mid-query; everything was relabelled.
                    self.reset(pather);
                }
                match (self.label(layer, ai), self.label(layer, bi)) {
                    (Some(fa), Some(fb)) => fa == fb && fa != self.impassable_field_id,
                    _ => false,
                }
            }
        }
    }

    /// Forget every label. Nothing is recomputed until the next query,
    /// unless field ids are exhausted, in which case numbering restarts and
    /// all cached layers are relabelled right away.
    pub fn invalidate<P: BlockingPather + ?Sized>(&mut self, pather: &P) {
        if self.next_field_id > self.field_id_limit || self.next_field_id == u32::MAX {
            self.reset(pather);
            return;
        }
        self.start_generation();
        log::trace!("reachability generation {}", self.generation);
    }

    /// React to a graph change.
    pub fn handle_event<P: BlockingPather + ?Sized>(&mut self, pather: &P, event: &GraphEvent) {
        if let GraphEvent::LayerRemoved(id) = event {
            self.forget_layer(*id);
        }
        if event.affects_reachability() {
            self.invalidate(pather);
        }
    }

    /// Drop the labels of a layer that no longer exists.
    pub fn forget_layer(&mut self, layer: LayerId) {
        self.layers.remove(&layer);
    }

    /// Current field label of `tile`, if it has been resolved since the
    /// last invalidation.
    pub fn field_of(&self, tile: TileRef) -> Option<u32> {
        if !tile.is_valid() {
            return None;
        }
        let labels = self.layers.get(&tile.layer())?;
        let i = tile.slot(labels.len())?;
        let f = labels[i];
        (f >= self.min_valid_field_id).then_some(f)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn start_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.impassable_field_id = self.next_field_id;
        self.min_valid_field_id = self.next_field_id;
        self.next_field_id += 1;
    }

    fn alloc_field(&mut self) -> Option<u32> {
        if self.next_field_id == u32::MAX {
            return None;
        }
        let id = self.next_field_id;
        self.next_field_id += 1;
        Some(id)
    }

    fn ensure_layer(&mut self, layer: LayerId, len: usize) {
        let labels = self.layers.entry(layer).or_default();
        if labels.len() != len {
            labels.clear();
            labels.resize(len, 0);
        }
    }

    fn label(&self, layer: LayerId, idx: usize) -> Option<u32> {
        let f = *self.layers.get(&layer)?.get(idx)?;
        (f >= self.min_valid_field_id).then_some(f)
    }

    // Label the field containing `idx`. Returns false if no id was left.
    fn resolve<P: BlockingPather + ?Sized>(&mut self, pather: &P, layer: LayerId, idx: usize) -> bool {
        let tile = TileRef::new(idx as i32, layer);
        let field = if pather.impassable(tile) {
            self.impassable_field_id
        } else {
            match self.alloc_field() {
                Some(id) => id,
                None => return false,
            }
        };
        let Some(labels) = self.layers.get_mut(&layer) else {
            return true;
        };
        if field == self.impassable_field_id {
            labels[idx] = field;
            return true;
        }
        self.filler.flood_fill(
            pather,
            tile,
            |t| !pather.impassable(t),
            |t, _| {
                if let Some(i) = t.slot(labels.len()) {
                    labels[i] = field;
                }
                false
            },
            usize::MAX,
        );
        true
    }

    // Restart numbering at generation 1 and relabel every cached layer.
    fn reset<P: BlockingPather + ?Sized>(&mut self, pather: &P) {
        self.generation = 0;
        self.next_field_id = 1;
        self.start_generation();

        let ids: Vec<LayerId> = self.layers.keys().copied().collect();
        for id in ids {
            let Some(len) = pather.layer_len(id) else {
                self.layers.remove(&id);
                continue;
            };
            if let Some(labels) = self.layers.get_mut(&id) {
                labels.clear();
                labels.resize(len, 0);
            }
            for idx in 0..len {
                if self.label(id, idx).is_some() {
                    continue;
                }
                if !self.resolve(pather, id, idx) {
                    log::error!("reachability: more fields than ids on layer {id}");
                    return;
                }
            }
        }
        log::info!(
            "reachability field ids exhausted, relabelled {} layers ({} fields)",
            self.layers.len(),
            self.next_field_id - 1
        );
    }
}
