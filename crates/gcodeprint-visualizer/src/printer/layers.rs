//! Per-z layer paths
//!
//! Each distinct z height owns one accumulating path. Layers are created
//! lazily on first use and put on the render surface at most once, so the
//! draw order of layers is the order in which they were first attached.

use crate::geometry::Point;
use crate::render::{NodeId, RenderSurface};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Stable handle of a layer within one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerId(usize);

impl LayerId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Hashable z key; `-0.0` and `0.0` are the same layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct LayerKey(u64);

impl LayerKey {
    fn new(z: f64) -> Self {
        let z = if z == 0.0 { 0.0 } else { z };
        Self(z.to_bits())
    }
}

/// The accumulated path for one z height
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    z: f64,
    d: String,
    token_count: usize,
    node: Option<NodeId>,
}

impl Layer {
    fn new(z: f64) -> Self {
        Self {
            z,
            d: String::new(),
            token_count: 0,
            node: None,
        }
    }

    pub fn z(&self) -> f64 {
        self.z
    }

    /// Full path data, tokens separated by a single space
    pub fn path_data(&self) -> &str {
        &self.d
    }

    pub fn token_count(&self) -> usize {
        self.token_count
    }

    pub fn is_empty(&self) -> bool {
        self.token_count == 0
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn is_attached(&self) -> bool {
        self.node.is_some()
    }

    /// Append a point and return the token written.
    ///
    /// The first token of a path moves the pen (`M x,y`), every following
    /// token draws (`L x,y`).
    pub fn push_point(&mut self, point: Point) -> String {
        let prefix = if self.is_empty() { "M" } else { "L" };
        let token = format!("{} {}", prefix, point.to_path_token());
        if !self.d.is_empty() {
            self.d.push(' ');
        }
        self.d.push_str(&token);
        self.token_count += 1;
        token
    }

    fn clear_path(&mut self) {
        self.d.clear();
        self.token_count = 0;
    }
}

/// Mapping from z height to layer
#[derive(Debug, Clone, Default)]
pub struct LayerRegistry {
    layers: Vec<Layer>,
    index: HashMap<LayerKey, LayerId>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing layer for `z`, or a new empty unattached one
    pub fn resolve(&mut self, z: f64) -> LayerId {
        let key = LayerKey::new(z);
        if let Some(id) = self.index.get(&key) {
            return *id;
        }
        let id = LayerId(self.layers.len());
        self.layers.push(Layer::new(z));
        self.index.insert(key, id);
        debug!("Created layer {} for z={}", id.0, z);
        id
    }

    /// Layer for `z` without creating one
    pub fn find(&self, z: f64) -> Option<LayerId> {
        self.index.get(&LayerKey::new(z)).copied()
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(id.0)
    }

    pub fn get_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.get_mut(id.0)
    }

    /// Put the layer's path on the surface if it is not there yet.
    ///
    /// Returns true only for the call that actually attached it.
    pub fn attach<S: RenderSurface + ?Sized>(&mut self, id: LayerId, surface: &mut S) -> bool {
        let Some(layer) = self.layers.get_mut(id.0) else {
            return false;
        };
        if layer.node.is_some() {
            return false;
        }
        let node = surface.append_path(layer.z);
        if !layer.d.is_empty() {
            surface.set_path_data(node, &layer.d);
        }
        layer.node = Some(node);
        true
    }

    pub fn is_attached(&self, id: LayerId) -> bool {
        self.get(id).is_some_and(Layer::is_attached)
    }

    /// Drop a layer's path and take it off the surface; the layer itself
    /// stays registered and will be re-attached on next use.
    pub fn discard_path<S: RenderSurface + ?Sized>(&mut self, id: LayerId, surface: &mut S) {
        if let Some(layer) = self.layers.get_mut(id.0) {
            layer.clear_path();
            if let Some(node) = layer.node.take() {
                surface.remove(node);
            }
        }
    }

    /// Remove every layer, detaching each from the surface
    pub fn clear<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) {
        for layer in self.layers.drain(..) {
            if let Some(node) = layer.node {
                surface.remove(node);
            }
        }
        self.index.clear();
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// z heights in creation order
    pub fn keys(&self) -> Vec<f64> {
        self.layers.iter().map(Layer::z).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LayerId, &Layer)> {
        self.layers.iter().enumerate().map(|(i, l)| (LayerId(i), l))
    }
}
