//! Editor state shared by every view.
//!
//! Views get an [`EditorState`] by reference and read or subscribe to the
//! cells they need. Layer insertion always goes through the order table so
//! the map ends up stacked the same way no matter which view adds first.

use super::observable::{Observable, Subscription};
use crate::domain::{
    DomainError, DomainResult, FeatureCollection, LayerOrderTable, LayerProps, LngLat, MapQuery,
    Mode, OdPair, RouteGJ, SavefileSource, parse_od,
};
use crate::infrastructure::{EditorConfig, FileRepository, LayerStack, MapHandle};
use std::path::PathBuf;
use std::rc::Rc;
use tracing::{debug, error};

/// Storage key the session is autosaved under.
pub const AUTOSAVE_KEY: &str = "mapstack-autosave";

/// Flags for reference layers that can be switched on from outside the
/// layer's own view.
#[derive(Debug, Clone)]
pub struct LayerToggles {
    pub current_network: Observable<bool>,
    pub schools: Observable<bool>,
    pub gp_hospitals: Observable<bool>,
    pub town_centres: Observable<bool>,
    pub imd_zones: Observable<bool>,
    pub high_route_coverage: Observable<bool>,
}

impl Default for LayerToggles {
    fn default() -> Self {
        Self {
            current_network: Observable::new(true),
            schools: Observable::new(false),
            gp_hospitals: Observable::new(false),
            town_centres: Observable::new(false),
            imd_zones: Observable::new(false),
            high_route_coverage: Observable::new(false),
        }
    }
}

/// A toggle together with the layer it shows and a human readable name.
#[derive(Debug, Clone)]
pub struct ToggleBinding {
    pub layer: &'static str,
    pub label: &'static str,
    pub flag: Observable<bool>,
}

impl LayerToggles {
    pub fn bindings(&self) -> [ToggleBinding; 6] {
        let bind = |layer, label, flag: &Observable<bool>| ToggleBinding {
            layer,
            label,
            flag: flag.clone(),
        };
        [
            bind("cn", "Coherent network", &self.current_network),
            bind("schools", "Schools", &self.schools),
            bind("gp-hospitals", "GPs and hospitals", &self.gp_hospitals),
            bind("town-centres", "Town centres", &self.town_centres),
            bind("simd", "SIMD zones", &self.imd_zones),
            bind("npt-coverage", "High route coverage", &self.high_route_coverage),
        ]
    }
}

/// Every piece of observable state the editor's views share.
#[derive(Debug)]
pub struct EditorState {
    pub table: LayerOrderTable,
    pub mode: Observable<Mode>,
    /// The live map, `None` until it has loaded.
    pub map: Observable<Option<MapHandle>>,
    /// Whatever holds the session to autosave, `None` until it is set up.
    pub backend: Observable<Option<Rc<dyn SavefileSource>>>,
    /// The routed path between `route_a` and `route_b`, once there is one.
    pub route: Observable<Option<RouteGJ>>,
    pub route_a: Observable<Option<LngLat>>,
    pub route_b: Observable<Option<LngLat>>,
    pub coherent_network: Observable<FeatureCollection>,
    pub od_zones: Observable<FeatureCollection>,
    pub od_pairs: Observable<Vec<OdPair>>,
    pub remote_storage: Observable<bool>,
    pub toggles: LayerToggles,
    asset_base_url: String,
}

impl EditorState {
    pub fn new(table: LayerOrderTable, asset_base_url: impl Into<String>) -> Self {
        Self {
            table,
            mode: Observable::new(Mode::Main),
            map: Observable::new(None),
            backend: Observable::new(None),
            route: Observable::new(None),
            route_a: Observable::new(None),
            route_b: Observable::new(None),
            coherent_network: Observable::new(FeatureCollection::default()),
            od_zones: Observable::new(FeatureCollection::default()),
            od_pairs: Observable::new(Vec::new()),
            remote_storage: Observable::new(true),
            toggles: LayerToggles::default(),
            asset_base_url: asset_base_url.into(),
        }
    }

    /// State for the standard layer order, configured from `config`.
    pub fn from_config(config: &EditorConfig) -> DomainResult<Self> {
        let state = Self::new(LayerOrderTable::standard()?, config.asset_base_url.clone());
        state.remote_storage.set(config.remote_storage);
        Ok(state)
    }

    /// ID and anchor a view should use to add layer `id` right now.
    ///
    /// # Errors
    ///
    /// [`DomainError::UnregisteredLayer`] if `id` isn't in the order table.
    pub fn layer_props(&self, id: &str) -> DomainResult<LayerProps> {
        let map = self.map.get();
        let stack = map.as_ref().map(|handle| handle.borrow());
        let anchor = self
            .table
            .resolve_anchor(id, stack.as_deref().map(|s| s as &dyn MapQuery))?;
        Ok(LayerProps::new(id, anchor))
    }

    /// Adds `id` to the live map at its place in the order.
    pub fn attach_layer(&self, id: &str) -> DomainResult<LayerProps> {
        let Some(map) = self.map.get() else {
            return Err(DomainError::MapNotReady);
        };
        let mut stack = map.borrow_mut();
        insert_ordered(&self.table, &mut stack, id)
    }

    /// Removes `id` from the live map. Returns whether it was attached.
    pub fn detach_layer(&self, id: &str) -> bool {
        match self.map.get() {
            Some(map) => map.borrow_mut().remove_layer(id),
            None => false,
        }
    }

    /// Keeps toggled layers in sync with their flags.
    ///
    /// Flipping a toggle attaches or detaches its layer, and installing a new
    /// map re-adds every layer whose toggle is on. Bindings last as long as
    /// the returned subscriptions.
    pub fn bind_layers(&self) -> Vec<Subscription> {
        let mut subscriptions = Vec::new();

        for binding in self.toggles.bindings() {
            let table = self.table.clone();
            let map = self.map.clone();
            let layer = binding.layer;
            subscriptions.push(binding.flag.subscribe(move |visible| {
                let Some(handle) = map.get() else {
                    debug!(layer, "map not ready; layer will be synced once it loads");
                    return;
                };
                if let Err(e) = sync_layer(&table, &mut handle.borrow_mut(), layer, *visible) {
                    error!(layer, "failed to sync toggled layer: {}", e);
                }
            }));
        }

        let table = self.table.clone();
        let bindings = self.toggles.bindings();
        subscriptions.push(self.map.subscribe(move |map| {
            let Some(handle) = map else {
                return;
            };
            let mut stack = handle.borrow_mut();
            for binding in &bindings {
                if let Err(e) = sync_layer(&table, &mut stack, binding.layer, binding.flag.get()) {
                    error!(layer = binding.layer, "failed to re-add layer to new map: {}", e);
                }
            }
        }));

        subscriptions
    }

    /// Parses OD text and stores the pairs. Returns how many were loaded.
    pub fn load_od(&self, raw: &str) -> DomainResult<usize> {
        let pairs = parse_od(raw)?;
        let count = pairs.len();
        self.od_pairs.set(pairs);
        Ok(count)
    }

    /// Parses a routing response, stores it and moves the route endpoints
    /// to its first and last points.
    pub fn load_route(&self, raw: &str) -> DomainResult<RouteGJ> {
        let route: RouteGJ =
            serde_json::from_str(raw).map_err(|e| DomainError::InvalidRoute(e.to_string()))?;
        let (a, b) = match route.endpoints() {
            Some((a, b)) => (Some(a), Some(b)),
            None => (None, None),
        };
        self.route_a.set(a);
        self.route_b.set(b);
        self.route.set(Some(route.clone()));
        Ok(route)
    }

    /// Resolves an asset path against remote storage when it's enabled.
    pub fn asset_url(&self, path: &str) -> String {
        if self.remote_storage.get() {
            format!("{}{}", self.asset_base_url, path)
        } else {
            path.to_string()
        }
    }

    /// Writes the backend's savefile. `Ok(None)` when there's no backend yet.
    pub fn autosave(&self, repository: &FileRepository) -> Result<Option<PathBuf>, String> {
        let Some(backend) = self.backend.get() else {
            return Ok(None);
        };
        let state = backend.to_savefile().map_err(|e| e.to_string())?;
        repository.set_item(AUTOSAVE_KEY, &state).map(Some)
    }
}

fn insert_ordered(table: &LayerOrderTable, stack: &mut LayerStack, id: &str) -> DomainResult<LayerProps> {
    let anchor = table.resolve_anchor(id, Some(&*stack as &dyn MapQuery))?;
    let props = LayerProps::new(id, anchor);
    stack.add_layer(&props.id, props.before_id.as_deref())?;
    Ok(props)
}

fn sync_layer(table: &LayerOrderTable, stack: &mut LayerStack, id: &str, visible: bool) -> DomainResult<()> {
    match (visible, stack.has_layer(id)) {
        (true, false) => {
            insert_ordered(table, stack, id)?;
        }
        (false, true) => {
            stack.remove_layer(id);
        }
        _ => {}
    }
    Ok(())
}
