use crate::domain::{DomainError, DomainResult, MapQuery, SavefileSource};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

/// Layers provided by the basemap style, present as soon as a map loads.
pub const BASEMAP_LAYERS: &[&str] = &["Background", "Ferry line", "road_label"];

/// Shared handle to the live map.
pub type MapHandle = Rc<RefCell<LayerStack>>;

/// The layers attached to a map, bottom to top.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerStack {
    layers: Vec<String>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// A freshly loaded map: just the basemap style layers.
    pub fn with_basemap() -> Self {
        Self {
            layers: BASEMAP_LAYERS.iter().map(|id| id.to_string()).collect(),
        }
    }

    pub fn into_handle(self) -> MapHandle {
        Rc::new(RefCell::new(self))
    }

    /// Attaches `id` directly below `before_id`, or on top when `None`.
    ///
    /// # Errors
    ///
    /// [`DomainError::LayerAlreadyAttached`] if `id` is already on the map and
    /// [`DomainError::MissingAnchor`] if `before_id` isn't.
    pub fn add_layer(&mut self, id: &str, before_id: Option<&str>) -> DomainResult<()> {
        if self.has_layer(id) {
            return Err(DomainError::LayerAlreadyAttached(id.to_string()));
        }
        let idx = match before_id {
            Some(before) => self
                .index_of(before)
                .ok_or_else(|| DomainError::MissingAnchor(before.to_string()))?,
            None => self.layers.len(),
        };
        debug!(layer = id, before = ?before_id, "adding layer");
        self.layers.insert(idx, id.to_string());
        Ok(())
    }

    /// Detaches `id`. Returns whether it was attached.
    pub fn remove_layer(&mut self, id: &str) -> bool {
        match self.index_of(id) {
            Some(idx) => {
                debug!(layer = id, "removing layer");
                self.layers.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn layers(&self) -> &[String] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.layers.iter().position(|layer| layer == id)
    }
}

impl MapQuery for LayerStack {
    fn has_layer(&self, id: &str) -> bool {
        self.index_of(id).is_some()
    }
}

impl SavefileSource for RefCell<LayerStack> {
    fn to_savefile(&self) -> DomainResult<String> {
        serde_json::to_string_pretty(&*self.borrow()).map_err(|e| DomainError::Savefile(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_layer_on_top_and_before() {
        let mut stack = LayerStack::new();
        stack.add_layer("a", None).unwrap();
        stack.add_layer("c", None).unwrap();
        stack.add_layer("b", Some("c")).unwrap();
        assert_eq!(stack.layers(), ["a", "b", "c"]);
    }

    #[test]
    fn test_add_layer_errors() {
        let mut stack = LayerStack::with_basemap();
        assert_eq!(
            stack.add_layer("Background", None),
            Err(DomainError::LayerAlreadyAttached("Background".to_string()))
        );
        assert_eq!(
            stack.add_layer("cn", Some("schools")),
            Err(DomainError::MissingAnchor("schools".to_string()))
        );
        assert_eq!(stack.len(), BASEMAP_LAYERS.len());
    }

    #[test]
    fn test_remove_layer() {
        let mut stack = LayerStack::with_basemap();
        assert!(stack.remove_layer("Ferry line"));
        assert!(!stack.remove_layer("Ferry line"));
        assert!(!stack.has_layer("Ferry line"));
        assert_eq!(stack.layers(), ["Background", "road_label"]);
    }

    #[test]
    fn test_savefile_lists_layers() {
        let handle = LayerStack::with_basemap().into_handle();
        let saved = handle.to_savefile().unwrap();
        let restored: LayerStack = serde_json::from_str(&saved).unwrap();
        assert_eq!(restored, *handle.borrow());
    }
}
