use std::collections::HashMap;

use crate::config::LayerConfig;

/// One named grid of tile indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    /// Unique key of the layer.
    pub name: String,
    /// Tile indices in row-major order, `0` for empty cells.
    pub data: Vec<u32>,
    /// Whether the combined surface draws this layer.
    pub visible: bool,
    /// Alpha of the whole layer, in `[0, 1]`.
    pub opacity: f32,
    /// Set by every mutation, consumed by the layer's own cached surface.
    pub(crate) dirty: bool,
}

impl Layer {
    /// Layer from its configuration, opacity clamped to `[0, 1]`.
    pub fn from_config(cfg: LayerConfig) -> Self {
        Layer {
            name: cfg.name,
            data: cfg.data,
            visible: cfg.visible,
            opacity: cfg.opacity.clamp(0.0, 1.0),
            dirty: false,
        }
    }

    /// Stored value at `index`, `0` past the end of the buffer.
    #[inline]
    pub fn get(&self, index: usize) -> u32 {
        self.data.get(index).copied().unwrap_or(0)
    }

    /// Whether the layer changed since its own surface was last drawn.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the pre-render pass draws this layer.
    pub fn is_drawable(&self) -> bool {
        self.visible && !self.data.is_empty()
    }
}

/// Layers in draw order, with lookup by name.
///
/// Names are expected to be unique; when they are not, every layer is still
/// drawn and name lookups resolve to the last one.
#[derive(Debug, Default)]
pub struct LayerStore {
    layers: Vec<Layer>,
    by_name: HashMap<String, usize>,
}

impl LayerStore {
    /// Index `layers` by name, keeping their order.
    pub fn new(layers: Vec<Layer>) -> Self {
        let by_name = layers
            .iter()
            .enumerate()
            .map(|(i, l)| (l.name.clone(), i))
            .collect();
        LayerStore { layers, by_name }
    }

    /// Layer called `name`.
    pub fn get(&self, name: &str) -> Option<&Layer> {
        self.by_name.get(name).map(|&i| &self.layers[i])
    }

    /// Mutable layer called `name`.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Layer> {
        match self.by_name.get(name) {
            Some(&i) => Some(&mut self.layers[i]),
            None => None,
        }
    }

    /// Layers in draw order.
    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(name: &str, data: Vec<u32>) -> Layer {
        Layer::from_config(LayerConfig {
            name: name.into(),
            data,
            visible: true,
            opacity: 1.0,
        })
    }

    #[test]
    fn reads_past_end_are_empty() {
        let l = layer("ground", vec![3, 4]);
        assert_eq!(l.get(1), 4);
        assert_eq!(l.get(2), 0);
    }

    #[test]
    fn lookup_by_name_keeps_draw_order() {
        let store = LayerStore::new(vec![layer("bg", vec![1]), layer("fg", vec![2])]);
        let names: Vec<_> = store.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["bg", "fg"]);
        assert_eq!(store.get("fg").map(|l| l.data.clone()), Some(vec![2]));
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn duplicate_names_resolve_to_last() {
        let store = LayerStore::new(vec![layer("dup", vec![1]), layer("dup", vec![2])]);
        assert_eq!(store.iter().count(), 2);
        assert_eq!(store.get("dup").map(|l| l.get(0)), Some(2));
    }

    #[test]
    fn empty_or_hidden_layers_are_not_drawn() {
        let mut l = layer("empty", vec![]);
        assert!(!l.is_drawable());
        l.data = vec![1];
        assert!(l.is_drawable());
        l.visible = false;
        assert!(!l.is_drawable());
    }
}
