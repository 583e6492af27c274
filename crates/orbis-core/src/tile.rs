//! Tile identity: [`LayerId`] and the composite [`TileRef`].

use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifier of an independent tile layer (surface, orbit, ...).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct LayerId(pub u32);

impl LayerId {
    /// The primary (surface) layer. Tiles without an explicit layer belong here.
    pub const PRIMARY: Self = Self(0);
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// A reference to one tile: an index scoped to its owning layer.
///
/// The layer may be left implicit, in which case it means
/// [`LayerId::PRIMARY`]. Equality and hashing resolve the implicit layer, so
/// `TileRef::on_primary(7) == TileRef::new(7, LayerId::PRIMARY)`.
///
/// Any tile with a negative index is invalid. All invalid tiles are equal.
#[derive(Copy, Clone, Debug)]
pub struct TileRef {
    index: i32,
    layer: Option<LayerId>,
}

impl TileRef {
    /// The invalid tile.
    pub const INVALID: Self = Self {
        index: -1,
        layer: None,
    };

    /// A tile on an explicit layer.
    #[inline]
    pub const fn new(index: i32, layer: LayerId) -> Self {
        Self {
            index,
            layer: Some(layer),
        }
    }

    /// A tile with an implicit reference to the primary layer.
    #[inline]
    pub const fn on_primary(index: i32) -> Self {
        Self { index, layer: None }
    }

    /// Raw tile index within its layer.
    #[inline]
    pub const fn index(self) -> i32 {
        self.index
    }

    /// The owning layer, with the implicit layer resolved to the primary one.
    #[inline]
    pub fn layer(self) -> LayerId {
        self.layer.unwrap_or(LayerId::PRIMARY)
    }

    /// Whether the layer was given explicitly.
    #[inline]
    pub const fn has_explicit_layer(self) -> bool {
        self.layer.is_some()
    }

    /// Whether the index is non-negative. Range checks need the owning layer.
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.index >= 0
    }

    /// The index as a slot into per-layer storage of length `len`.
    #[inline]
    pub fn slot(self, len: usize) -> Option<usize> {
        let i = usize::try_from(self.index).ok()?;
        (i < len).then_some(i)
    }

    /// Whether both tiles belong to the same layer.
    #[inline]
    pub fn same_layer(self, other: TileRef) -> bool {
        self.layer() == other.layer()
    }
}

impl Default for TileRef {
    fn default() -> Self {
        Self::INVALID
    }
}

impl PartialEq for TileRef {
    fn eq(&self, other: &Self) -> bool {
        if !self.is_valid() || !other.is_valid() {
            return !self.is_valid() && !other.is_valid();
        }
        self.index == other.index && self.layer() == other.layer()
    }
}

impl Eq for TileRef {}

impl Hash for TileRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        if self.is_valid() {
            self.index.hash(state);
            self.layer().hash(state);
        } else {
            (-1i32).hash(state);
        }
    }
}

impl PartialOrd for TileRef {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TileRef {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        let key = |t: &TileRef| {
            if t.is_valid() {
                (t.layer(), t.index)
            } else {
                (LayerId::PRIMARY, -1)
            }
        };
        key(self).cmp(&key(other))
    }
}

impl fmt::Display for TileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}:{}", self.layer(), self.index)
        } else {
            f.write_str("invalid")
        }
    }
}

// Tiles saved before layers existed are bare integers.
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
enum TileRepr {
    Legacy(i32),
    Layered { tile: i32, layer: LayerId },
}

#[cfg(feature = "serde")]
impl serde::Serialize for TileRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let repr = match self.layer {
            None => TileRepr::Legacy(self.index),
            Some(layer) => TileRepr::Layered {
                tile: self.index,
                layer,
            },
        };
        repr.serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for TileRef {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match TileRepr::deserialize(deserializer)? {
            TileRepr::Legacy(index) => TileRef::on_primary(index),
            TileRepr::Layered { tile, layer } => TileRef::new(tile, layer),
        })
    }
}
