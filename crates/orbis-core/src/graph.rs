//! The [`TileGraph`]: every layer of a world plus a change-event queue.
//!
//! Layers are independent graphs; no edge crosses from one layer to another.
//! Every edit that changes the graph records a [`GraphEvent`], which
//! dependent caches drain with [`TileGraph::take_events`].

use std::collections::BTreeMap;

use crate::error::GraphError;
use crate::layer::{Layer, Road, Roughness, TileData};
use crate::tile::{LayerId, TileRef};

/// A change to the tile graph.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GraphEvent {
    LayerAdded(LayerId),
    LayerRemoved(LayerId),
    /// A tile became passable or impassable.
    PassabilityChanged(TileRef),
    /// A tile's cost, roughness or one of its roads changed.
    CostChanged(TileRef),
}

impl GraphEvent {
    /// Whether this event can change which tiles reach which.
    #[inline]
    pub fn affects_reachability(&self) -> bool {
        !matches!(self, GraphEvent::CostChanged(_))
    }
}

/// All layers of a world.
#[derive(Clone, Debug, Default)]
pub struct TileGraph {
    layers: BTreeMap<LayerId, Layer>,
    events: Vec<GraphEvent>,
}

impl TileGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Layers
    // -----------------------------------------------------------------------

    /// Register a layer under its own id.
    pub fn add_layer(&mut self, mut layer: Layer) -> Result<(), GraphError> {
        let id = layer.id();
        if self.layers.contains_key(&id) {
            return Err(GraphError::DuplicateLayer(id));
        }
        layer.refresh_cost_bound();
        log::debug!("adding layer {id} ({}, {} tiles)", layer.name(), layer.len());
        self.layers.insert(id, layer);
        self.events.push(GraphEvent::LayerAdded(id));
        Ok(())
    }

    /// Unregister a layer and hand it back.
    pub fn remove_layer(&mut self, id: LayerId) -> Result<Layer, GraphError> {
        let layer = self
            .layers
            .remove(&id)
            .ok_or(GraphError::UnknownLayer(id))?;
        log::debug!("removed layer {id} ({})", layer.name());
        self.events.push(GraphEvent::LayerRemoved(id));
        Ok(layer)
    }

    #[inline]
    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(&id)
    }

    /// The layer owning `tile`, if the tile is valid and in range.
    pub fn layer_of(&self, tile: TileRef) -> Option<&Layer> {
        let layer = self.layers.get(&tile.layer())?;
        tile.slot(layer.len()).map(|_| layer)
    }

    /// Ids of all layers in ascending order.
    pub fn layer_ids(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.layers.keys().copied()
    }

    /// All layers in ascending id order.
    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.values()
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Whether `tile` names an existing tile.
    #[inline]
    pub fn contains(&self, tile: TileRef) -> bool {
        self.layer_of(tile).is_some()
    }

    /// Attributes of `tile`.
    pub fn tile_data(&self, tile: TileRef) -> Option<&TileData> {
        let layer = self.layers.get(&tile.layer())?;
        layer.tile(tile.slot(layer.len())?)
    }

    /// Whether `tile` is impassable. Invalid and unknown tiles are.
    #[inline]
    pub fn is_impassable(&self, tile: TileRef) -> bool {
        self.tile_data(tile).is_none_or(|t| t.impassable)
    }

    /// Append the neighbours of `tile` into `buf`. The caller clears `buf`.
    pub fn neighbors(&self, tile: TileRef, buf: &mut Vec<TileRef>) {
        let Some(layer) = self.layers.get(&tile.layer()) else {
            return;
        };
        let Some(i) = tile.slot(layer.len()) else {
            return;
        };
        let id = layer.id();
        layer.for_each_neighbor(i, |n| buf.push(TileRef::new(n as i32, id)));
    }

    /// Cost of stepping between two adjacent tiles of one layer.
    pub fn edge_cost(&self, from: TileRef, to: TileRef) -> Option<i32> {
        let (layer, a, b) = self.edge(from, to)?;
        layer.is_adjacent(a, b).then(|| layer.edge_cost(a, b))
    }

    /// Road on the edge between two tiles, if any.
    pub fn road_between(&self, from: TileRef, to: TileRef) -> Option<Road> {
        let (layer, a, b) = self.edge(from, to)?;
        layer.road_between(a, b)
    }

    fn edge(&self, from: TileRef, to: TileRef) -> Option<(&Layer, usize, usize)> {
        if !from.same_layer(to) {
            return None;
        }
        let layer = self.layers.get(&from.layer())?;
        Some((layer, from.slot(layer.len())?, to.slot(layer.len())?))
    }

    // -----------------------------------------------------------------------
    // Edits
    // -----------------------------------------------------------------------

    /// Replace all attributes of `tile`.
    pub fn set_tile(&mut self, tile: TileRef, data: TileData) -> Result<(), GraphError> {
        let (layer, i) = self.layer_slot_mut(tile)?;
        let old = layer.set_tile(i, data)?;
        if old.impassable != data.impassable {
            self.events.push(GraphEvent::PassabilityChanged(tile));
        }
        if old.base_cost != data.base_cost || old.roughness != data.roughness {
            self.events.push(GraphEvent::CostChanged(tile));
        }
        Ok(())
    }

    /// Mark `tile` impassable or passable.
    pub fn set_impassable(&mut self, tile: TileRef, impassable: bool) -> Result<(), GraphError> {
        let data = self.data_for_edit(tile)?;
        self.set_tile(tile, TileData { impassable, ..data })
    }

    /// Change the base cost of `tile`.
    pub fn set_base_cost(&mut self, tile: TileRef, base_cost: i32) -> Result<(), GraphError> {
        let data = self.data_for_edit(tile)?;
        self.set_tile(tile, TileData { base_cost, ..data })
    }

    /// Change the roughness of `tile`.
    pub fn set_roughness(&mut self, tile: TileRef, roughness: Roughness) -> Result<(), GraphError> {
        let data = self.data_for_edit(tile)?;
        self.set_tile(tile, TileData { roughness, ..data })
    }

    /// Set or clear the road on the edge between two adjacent tiles.
    pub fn set_road(
        &mut self,
        from: TileRef,
        to: TileRef,
        road: Option<Road>,
    ) -> Result<(), GraphError> {
        if !from.same_layer(to) {
            return Err(GraphError::NotAdjacent { from, to });
        }
        let (layer, a) = self.layer_slot_mut(from)?;
        let b = to
            .slot(layer.len())
            .ok_or(GraphError::TileOutOfRange(to))?;
        let old = layer.set_road(a, b, road)?;
        if old != road {
            self.events.push(GraphEvent::CostChanged(from));
            self.events.push(GraphEvent::CostChanged(to));
        }
        Ok(())
    }

    fn data_for_edit(&self, tile: TileRef) -> Result<TileData, GraphError> {
        if !self.layers.contains_key(&tile.layer()) {
            return Err(GraphError::UnknownLayer(tile.layer()));
        }
        self.tile_data(tile)
            .copied()
            .ok_or(GraphError::TileOutOfRange(tile))
    }

    fn layer_slot_mut(&mut self, tile: TileRef) -> Result<(&mut Layer, usize), GraphError> {
        let layer = self
            .layers
            .get_mut(&tile.layer())
            .ok_or(GraphError::UnknownLayer(tile.layer()))?;
        let i = tile
            .slot(layer.len())
            .ok_or(GraphError::TileOutOfRange(tile))?;
        Ok((layer, i))
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Drain the events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<GraphEvent> {
        std::mem::take(&mut self.events)
    }

    /// Events recorded since the last [`take_events`](Self::take_events).
    #[inline]
    pub fn pending_events(&self) -> &[GraphEvent] {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_graph(len: u32) -> TileGraph {
        let mut g = TileGraph::new();
        g.add_layer(Layer::line(LayerId::PRIMARY, "surface", len).unwrap())
            .unwrap();
        g.take_events();
        g
    }

    #[test]
    fn add_and_remove_layers_record_events() {
        let mut g = TileGraph::new();
        g.add_layer(Layer::ring(LayerId(1), "orbit", 6).unwrap())
            .unwrap();
        assert_eq!(
            g.add_layer(Layer::ring(LayerId(1), "again", 6).unwrap()),
            Err(GraphError::DuplicateLayer(LayerId(1)))
        );
        let removed = g.remove_layer(LayerId(1)).unwrap();
        assert_eq!(removed.name(), "orbit");
        assert_eq!(
            g.remove_layer(LayerId(1)).unwrap_err(),
            GraphError::UnknownLayer(LayerId(1))
        );
        assert_eq!(
            g.take_events(),
            vec![
                GraphEvent::LayerAdded(LayerId(1)),
                GraphEvent::LayerRemoved(LayerId(1)),
            ]
        );
        assert!(g.take_events().is_empty());
    }

    #[test]
    fn queries_reject_bad_tiles_quietly() {
        let g = line_graph(3);
        assert!(g.contains(TileRef::on_primary(2)));
        assert!(!g.contains(TileRef::on_primary(3)));
        assert!(!g.contains(TileRef::INVALID));
        assert!(!g.contains(TileRef::new(0, LayerId(9))));
        assert!(g.is_impassable(TileRef::new(0, LayerId(9))));
        assert_eq!(g.edge_cost(TileRef::on_primary(0), TileRef::on_primary(2)), None);
        assert_eq!(
            g.edge_cost(TileRef::on_primary(0), TileRef::on_primary(1)),
            Some(1)
        );
    }

    #[test]
    fn neighbors_carry_explicit_layer() {
        let g = line_graph(3);
        let mut buf = Vec::new();
        g.neighbors(TileRef::on_primary(1), &mut buf);
        assert_eq!(
            buf,
            vec![
                TileRef::new(0, LayerId::PRIMARY),
                TileRef::new(2, LayerId::PRIMARY)
            ]
        );
        assert!(buf.iter().all(|t| t.has_explicit_layer()));
    }

    #[test]
    fn passability_edits_emit_only_when_changed() {
        let mut g = line_graph(3);
        let t = TileRef::on_primary(1);
        g.set_impassable(t, false).unwrap();
        assert!(g.pending_events().is_empty());
        g.set_impassable(t, true).unwrap();
        assert!(g.is_impassable(t));
        assert_eq!(g.take_events(), vec![GraphEvent::PassabilityChanged(t)]);
    }

    #[test]
    fn cost_edits_do_not_affect_reachability() {
        let mut g = line_graph(3);
        let a = TileRef::on_primary(0);
        let b = TileRef::on_primary(1);
        g.set_base_cost(b, 5).unwrap();
        g.set_roughness(b, Roughness::SmallHills).unwrap();
        g.set_road(a, b, Some(Road::Dirt)).unwrap();
        let events = g.take_events();
        assert_eq!(events.len(), 4);
        assert!(events.iter().all(|e| !e.affects_reachability()));
        assert_eq!(g.road_between(b, a), Some(Road::Dirt));
    }

    #[test]
    fn edits_report_errors() {
        let mut g = line_graph(3);
        assert_eq!(
            g.set_impassable(TileRef::new(0, LayerId(4)), true),
            Err(GraphError::UnknownLayer(LayerId(4)))
        );
        assert_eq!(
            g.set_impassable(TileRef::on_primary(5), true),
            Err(GraphError::TileOutOfRange(TileRef::on_primary(5)))
        );
        assert_eq!(
            g.set_base_cost(TileRef::on_primary(0), -2),
            Err(GraphError::InvalidCost(-2))
        );
        assert!(matches!(
            g.set_road(TileRef::on_primary(0), TileRef::new(1, LayerId(3)), None),
            Err(GraphError::NotAdjacent { .. })
        ));
        assert!(g.pending_events().is_empty());
    }
}
