//! Terminal inspector state.
//!
//! Wraps an [`EditorState`] with the bits of UI state the inspector needs:
//! which row of the layer table is selected, the status line and a short
//! activity log fed by subscriptions.

use super::observable::Subscription;
use super::state::EditorState;
use crate::domain::{DomainError, SavefileSource};
use crate::infrastructure::{AssetClient, FileRepository, LayerStack};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

const MAX_ACTIVITY: usize = 50;

/// Represents the current mode of the inspector UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Browsing the layer table
    Normal,
    /// Help screen is displayed
    Help,
}

#[derive(Debug)]
pub struct App {
    pub editor: EditorState,
    pub repository: FileRepository,
    /// Selected row, counted from the top of the layer table.
    pub selected: usize,
    pub mode: AppMode,
    pub help_scroll: usize,
    pub status_message: Option<String>,
    activity: Rc<RefCell<VecDeque<String>>>,
    _subscriptions: Vec<Subscription>,
}

impl App {
    /// Wires the editor's layer bindings and activity log.
    pub fn new(editor: EditorState, repository: FileRepository) -> Self {
        let activity = Rc::new(RefCell::new(VecDeque::new()));
        let mut subscriptions = editor.bind_layers();

        let log = activity.clone();
        subscriptions.push(editor.mode.subscribe(move |mode| {
            push_activity(&log, format!("mode: {}", mode));
        }));
        let log = activity.clone();
        subscriptions.push(editor.od_pairs.subscribe(move |pairs| {
            if !pairs.is_empty() {
                let trips: u64 = pairs.iter().map(|p| u64::from(p.count)).sum();
                push_activity(&log, format!("OD: {} pairs, {} trips", pairs.len(), trips));
            }
        }));
        let log = activity.clone();
        subscriptions.push(editor.map.subscribe(move |map| {
            push_activity(&log, if map.is_some() { "map ready" } else { "map unloaded" }.to_string());
        }));
        let log = activity.clone();
        subscriptions.push(editor.route.subscribe(move |route| {
            if let Some(route) = route {
                push_activity(&log, format!("route: {} steps", route.directions.len()));
            }
        }));

        Self {
            editor,
            repository,
            selected: 0,
            mode: AppMode::Normal,
            help_scroll: 0,
            status_message: None,
            activity,
            _subscriptions: subscriptions,
        }
    }

    /// Most recent activity first.
    pub fn activity(&self) -> Vec<String> {
        self.activity.borrow().iter().rev().cloned().collect()
    }

    /// Layer ID of the selected row.
    pub fn selected_layer(&self) -> Option<&str> {
        self.editor.table.iter().rev().nth(self.selected)
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.editor.table.len() {
            self.selected += 1;
        }
    }

    /// Attaches the selected layer, or detaches it if it's already on the map.
    ///
    /// Reference layers go through their toggle so the flag and the map agree.
    pub fn toggle_selected_layer(&mut self) {
        let Some(id) = self.selected_layer().map(str::to_string) else {
            return;
        };
        let bindings = self.editor.toggles.bindings();
        if let Some(idx) = bindings.iter().position(|binding| binding.layer == id) {
            self.toggle_reference(idx);
            return;
        }
        if self.editor.detach_layer(&id) {
            self.status_message = Some(format!("Removed {}", id));
            return;
        }
        self.status_message = Some(match self.editor.attach_layer(&id) {
            Ok(props) => match props.before_id {
                Some(before) => format!("Added {} below {}", id, before),
                None => format!("Added {} on top", id),
            },
            Err(DomainError::MapNotReady) => "Map is not ready (r to load it)".to_string(),
            Err(e) => format!("Add failed: {}", e),
        });
    }

    /// Where the selected layer would go if it were added now.
    ///
    /// Doesn't consult the resolver while the map is missing, since that
    /// would log a warning on every redraw.
    pub fn anchor_preview(&self) -> String {
        let Some(id) = self.selected_layer() else {
            return String::new();
        };
        if self.editor.map.with(|map| map.is_none()) {
            return "map not ready".to_string();
        }
        match self.editor.layer_props(id) {
            Ok(props) => match props.before_id {
                Some(before) => format!("below {}", before),
                None => "on top".to_string(),
            },
            Err(e) => e.to_string(),
        }
    }

    pub fn cycle_mode(&mut self) {
        let next = self.editor.mode.with(|mode| mode.next());
        self.editor.mode.set(next);
    }

    /// Flips the `idx`th reference layer toggle.
    pub fn toggle_reference(&mut self, idx: usize) {
        let bindings = self.editor.toggles.bindings();
        if let Some(binding) = bindings.get(idx) {
            let visible = !binding.flag.get();
            binding.flag.set(visible);
            self.status_message = Some(format!(
                "{} {}",
                binding.label,
                if visible { "shown" } else { "hidden" }
            ));
        }
    }

    /// Unloads the map, or loads a fresh one with just the basemap layers.
    pub fn toggle_map(&mut self) {
        if self.editor.map.with(|map| map.is_some()) {
            self.editor.backend.set(None);
            self.editor.map.set(None);
            self.status_message = Some("Map unloaded".to_string());
        } else {
            let handle = LayerStack::with_basemap().into_handle();
            self.editor.map.set(Some(handle.clone()));
            self.editor.backend.set(Some(handle as Rc<dyn SavefileSource>));
            self.status_message = Some("Map loaded".to_string());
        }
    }

    pub fn toggle_remote_storage(&mut self) {
        let remote = !self.editor.remote_storage.get();
        self.editor.remote_storage.set(remote);
        self.status_message = Some(format!(
            "Remote storage {}",
            if remote { "on" } else { "off" }
        ));
    }

    pub fn autosave(&mut self) {
        self.status_message = Some(match self.editor.autosave(&self.repository) {
            Ok(Some(path)) => format!("Saved to {}", path.display()),
            Ok(None) => "Nothing to save yet".to_string(),
            Err(e) => format!("Save failed: {}", e),
        });
    }

    /// Fetches an OD CSV asset and loads it.
    pub fn load_od(&mut self, path: &str) {
        let location = self.editor.asset_url(path);
        let result = AssetClient::fetch_text(&location)
            .and_then(|raw| self.editor.load_od(&raw).map_err(|e| e.to_string()));
        self.status_message = Some(match result {
            Ok(count) => format!("Loaded {} OD pairs from {}", count, location),
            Err(e) => format!("OD load failed: {}", e),
        });
    }

    /// Fetches a routing response asset and loads it.
    pub fn load_route(&mut self, path: &str) {
        let location = self.editor.asset_url(path);
        let result = AssetClient::fetch_text(&location)
            .and_then(|raw| self.editor.load_route(&raw).map_err(|e| e.to_string()));
        self.status_message = Some(match result {
            Ok(route) => format!(
                "Loaded route from {}: {:.0} m, directness {:.2}",
                location,
                route.route_length,
                route.directness()
            ),
            Err(e) => format!("Route load failed: {}", e),
        });
    }

    pub fn show_help(&mut self) {
        self.mode = AppMode::Help;
        self.help_scroll = 0;
    }

    pub fn close_help(&mut self) {
        self.mode = AppMode::Normal;
    }
}

fn push_activity(log: &RefCell<VecDeque<String>>, entry: String) {
    let mut log = log.borrow_mut();
    log.push_back(entry);
    if log.len() > MAX_ACTIVITY {
        log.pop_front();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LayerOrderTable, Mode};
    use crate::infrastructure::DEFAULT_ASSET_BASE_URL;

    fn app() -> App {
        let editor = EditorState::new(LayerOrderTable::standard().unwrap(), DEFAULT_ASSET_BASE_URL);
        App::new(editor, FileRepository::new(std::env::temp_dir()))
    }

    fn attached(app: &App) -> Vec<String> {
        app.editor.map.get().unwrap().borrow().layers().to_vec()
    }

    #[test]
    fn test_selection_starts_at_top_of_table() {
        let mut app = app();
        assert_eq!(app.selected_layer(), Some("road_label"));

        app.select_previous();
        assert_eq!(app.selected, 0);

        app.select_next();
        assert_eq!(app.selected_layer(), Some("eval-car-route"));
    }

    #[test]
    fn test_selection_stops_at_bottom() {
        let mut app = app();
        for _ in 0..100 {
            app.select_next();
        }
        assert_eq!(app.selected_layer(), Some("Background"));
    }

    #[test]
    fn test_toggle_selected_layer_needs_map() {
        let mut app = app();
        app.select_next();
        app.toggle_selected_layer();
        assert_eq!(app.status_message.as_deref(), Some("Map is not ready (r to load it)"));
        assert_eq!(app.anchor_preview(), "map not ready");
    }

    #[test]
    fn test_toggle_selected_layer_attaches_then_detaches() {
        let mut app = app();
        app.toggle_map();
        app.select_next(); // eval-car-route

        assert_eq!(app.anchor_preview(), "below road_label");
        app.toggle_selected_layer();
        assert_eq!(
            app.status_message.as_deref(),
            Some("Added eval-car-route below road_label")
        );
        assert!(attached(&app).contains(&"eval-car-route".to_string()));

        app.toggle_selected_layer();
        assert_eq!(app.status_message.as_deref(), Some("Removed eval-car-route"));
        assert!(!attached(&app).contains(&"eval-car-route".to_string()));
    }

    fn select(app: &mut App, id: &str) {
        app.selected = 0;
        while app.selected_layer() != Some(id) {
            app.select_next();
        }
    }

    #[test]
    fn test_toggle_selected_reference_layer_flips_its_toggle() {
        let mut app = app();
        app.toggle_map();
        select(&mut app, "cn");

        app.toggle_selected_layer();
        assert!(!app.editor.toggles.current_network.get());
        assert!(!attached(&app).contains(&"cn".to_string()));
        assert_eq!(app.status_message.as_deref(), Some("Coherent network hidden"));

        // Reloading the map keeps it off.
        app.toggle_map();
        app.toggle_map();
        assert!(!attached(&app).contains(&"cn".to_string()));

        app.toggle_selected_layer();
        assert!(app.editor.toggles.current_network.get());
        assert!(attached(&app).contains(&"cn".to_string()));
    }

    #[test]
    fn test_toggle_selected_reference_layer_without_map() {
        let mut app = app();
        select(&mut app, "schools");

        app.toggle_selected_layer();
        assert!(app.editor.toggles.schools.get());

        app.toggle_map();
        assert!(attached(&app).contains(&"schools".to_string()));
    }

    #[test]
    fn test_toggle_map_reloads_toggled_layers() {
        let mut app = app();
        app.toggle_map();
        assert!(attached(&app).contains(&"cn".to_string()));

        app.toggle_map();
        assert!(app.editor.map.get().is_none());
        assert!(app.editor.backend.get().is_none());

        app.toggle_map();
        assert!(attached(&app).contains(&"cn".to_string()));
        assert_eq!(app.activity()[0], "map ready");
    }

    #[test]
    fn test_toggle_reference() {
        let mut app = app();
        app.toggle_map();
        app.toggle_reference(1);

        assert!(app.editor.toggles.schools.get());
        assert_eq!(app.status_message.as_deref(), Some("Schools shown"));
        assert!(attached(&app).contains(&"schools".to_string()));

        app.toggle_reference(42);
        assert_eq!(app.status_message.as_deref(), Some("Schools shown"));
    }

    #[test]
    fn test_cycle_mode_logs_activity() {
        let mut app = app();
        app.cycle_mode();
        assert_eq!(app.editor.mode.get(), Mode::ImportRoute);
        assert_eq!(app.activity()[0], "mode: import-route");
    }

    #[test]
    fn test_autosave_status() {
        let dir = tempfile::tempdir().unwrap();
        let editor = EditorState::new(LayerOrderTable::standard().unwrap(), DEFAULT_ASSET_BASE_URL);
        let mut app = App::new(editor, FileRepository::new(dir.path()));

        app.autosave();
        assert_eq!(app.status_message.as_deref(), Some("Nothing to save yet"));

        app.toggle_map();
        app.autosave();
        assert!(app.status_message.as_deref().unwrap().starts_with("Saved to"));
        assert!(app.repository.get_item(crate::application::AUTOSAVE_KEY).unwrap().is_some());
    }

    #[test]
    fn test_load_od_from_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("od.csv");
        std::fs::write(&path, "from,to,count\nA,B,4\nB,C,6\n").unwrap();

        let mut app = app();
        app.toggle_remote_storage();
        app.load_od(path.to_str().unwrap());

        assert_eq!(app.editor.od_pairs.get().len(), 2);
        assert_eq!(app.activity()[0], "OD: 2 pairs, 10 trips");
    }

    #[test]
    fn test_load_route_from_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("route.geojson");
        std::fs::write(
            &path,
            r#"{"type": "FeatureCollection",
                "features": [{"type": "Feature", "properties": {},
                    "geometry": {"type": "LineString", "coordinates": [[1.0, 2.0], [3.0, 4.0]]}}],
                "direct_length": 1000.0, "route_length": 1500.0,
                "directions": [{"length": 1500.0, "way": "w", "infra_type": "CycleLane"}]}"#,
        )
        .unwrap();

        let mut app = app();
        app.toggle_remote_storage();
        let location = path.to_str().unwrap().to_string();
        app.load_route(&location);

        assert_eq!(
            app.status_message,
            Some(format!("Loaded route from {}: 1500 m, directness 1.50", location))
        );
        assert_eq!(app.activity()[0], "route: 1 steps");
        assert!(app.editor.route_b.get().is_some());

        app.load_route("missing.geojson");
        assert!(app.status_message.as_deref().unwrap().starts_with("Route load failed"));
    }

    #[test]
    fn test_activity_is_bounded() {
        let mut app = app();
        for _ in 0..(MAX_ACTIVITY * 2) {
            app.cycle_mode();
        }
        assert_eq!(app.activity().len(), MAX_ACTIVITY);
    }
}
