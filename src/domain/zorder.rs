//! Z-ordering of map layers.
//!
//! Views add their layers to the map in whatever order they happen to
//! initialize, and may re-add them after a reload. To keep the stacking
//! deterministic, every layer ID is listed once in a [`LayerOrderTable`]
//! (later entries draw on top), and each insertion is anchored below the
//! nearest layer above it that is actually attached right now.

use super::errors::{DomainError, DomainResult};
use std::borrow::Borrow;
use std::collections::HashSet;
use std::hash::Hash;
use std::rc::Rc;
use tracing::warn;

/// Every layer ID the editor uses, bottom to top.
///
/// Entries named after basemap style layers (`Background`, `Ferry line`,
/// `road_label`) come from the vector tile style and are never added by the
/// editor itself; they only serve as anchors.
pub const STANDARD_LAYER_ORDER: &[&str] = &[
    "Background",
    "fade-study-area",
    "Ferry line",
    // Reference layers (areas)
    "all-population",
    "all-population-outline",
    "simd",
    "simd-outline",
    "urban-areas",
    "main-mode",
    // Reference layers (lines)
    "cn-debug",
    "cn",
    "existing-infra-debug",
    "existing-infra",
    "traffic-debug",
    "traffic",
    "gradients",
    "npt-coverage",
    "los",
    "rnet",
    "reachability",
    "debug-reachability",
    // Reference layers (points or small polygons)
    "gp-hospitals",
    "schools",
    "town-centres",
    "major-junctions",
    // Edit mode
    "snapper-lines",
    "snapper-preview",
    "edit-existing-routes",
    "edit-route-sections",
    // Special modes
    "eval-od-mode",
    "debug-mode",
    "mesh-density",
    "mesh-density-outline",
    "eval-existing-routes",
    "eval-route-breakdown",
    "eval-car-route",
    "road_label",
];

/// Answers whether a layer is currently attached to the map.
pub trait MapQuery {
    fn has_layer(&self, id: &str) -> bool;
}

impl<S: Borrow<str> + Eq + Hash> MapQuery for HashSet<S> {
    fn has_layer(&self, id: &str) -> bool {
        self.contains(id)
    }
}

/// Where a new layer goes relative to the layers already on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionAnchor<'a> {
    /// Insert directly below this attached layer.
    Before(&'a str),
    /// Nothing attached belongs above; insert on top of everything.
    Top,
}

impl<'a> InsertionAnchor<'a> {
    pub fn before_id(&self) -> Option<&'a str> {
        match *self {
            InsertionAnchor::Before(id) => Some(id),
            InsertionAnchor::Top => None,
        }
    }
}

/// The properties a view hands to the map when adding a layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerProps {
    pub id: String,
    pub before_id: Option<String>,
}

impl LayerProps {
    pub fn new(id: &str, anchor: InsertionAnchor<'_>) -> Self {
        Self {
            id: id.to_string(),
            before_id: anchor.before_id().map(str::to_string),
        }
    }
}

/// A total, bottom-to-top order over layer IDs.
///
/// Cloning is cheap; clones share the same entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerOrderTable {
    ids: Rc<[String]>,
}

impl LayerOrderTable {
    /// Builds a table from IDs listed bottom to top.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::DuplicateLayer`] if an ID is listed twice and
    /// [`DomainError::EmptyLayerId`] for an empty ID.
    ///
    /// # Examples
    ///
    /// ```
    /// use mapstack::domain::LayerOrderTable;
    ///
    /// let table = LayerOrderTable::new(["water", "roads", "labels"]).unwrap();
    /// assert_eq!(table.position("roads"), Some(1));
    /// assert!(LayerOrderTable::new(["roads", "roads"]).is_err());
    /// ```
    pub fn new<I, S>(ids: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        let mut seen = HashSet::with_capacity(ids.len());
        for id in &ids {
            if id.is_empty() {
                return Err(DomainError::EmptyLayerId);
            }
            if !seen.insert(id.as_str()) {
                return Err(DomainError::DuplicateLayer(id.clone()));
            }
        }
        Ok(Self { ids: ids.into() })
    }

    /// The editor's hand-authored order, see [`STANDARD_LAYER_ORDER`].
    pub fn standard() -> DomainResult<Self> {
        Self::new(STANDARD_LAYER_ORDER.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Index of `id`, counted from the bottom.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.ids.iter().position(|entry| entry == id)
    }

    /// Iterates bottom to top.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator {
        self.ids.iter().map(String::as_str)
    }

    /// Computes where a layer must be inserted to respect this order.
    ///
    /// Walks the table from the top down to `requested`, remembering the last
    /// attached layer seen; that is the nearest attached layer above it. The
    /// walk stops at `requested`, so layers below it are never candidates.
    ///
    /// When `map` is `None` (the map isn't ready yet) a warning is logged and
    /// [`InsertionAnchor::Top`] is returned; the ordering sorts itself out once
    /// the map is ready and layers are re-added.
    ///
    /// # Errors
    ///
    /// [`DomainError::UnregisteredLayer`] if `requested` is not in the table.
    /// Every layer must be given a place in the order before it can be used.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::HashSet;
    /// use mapstack::domain::{InsertionAnchor, LayerOrderTable};
    ///
    /// let table = LayerOrderTable::new(["A", "B", "C", "D"]).unwrap();
    /// let attached: HashSet<&str> = ["A", "C"].into_iter().collect();
    ///
    /// assert_eq!(table.resolve_anchor("B", Some(&attached)).unwrap(), InsertionAnchor::Before("C"));
    /// assert_eq!(table.resolve_anchor("D", Some(&attached)).unwrap(), InsertionAnchor::Top);
    /// ```
    pub fn resolve_anchor<'t>(
        &'t self,
        requested: &str,
        map: Option<&dyn MapQuery>,
    ) -> DomainResult<InsertionAnchor<'t>> {
        let Some(map) = map else {
            warn!(
                layer = requested,
                "layer anchor requested before map is ready; z-ordering may be incorrect"
            );
            return Ok(InsertionAnchor::Top);
        };

        let mut anchor = InsertionAnchor::Top;
        for id in self.ids.iter().rev() {
            if id == requested {
                return Ok(anchor);
            }
            if map.has_layer(id) {
                anchor = InsertionAnchor::Before(id.as_str());
            }
        }
        Err(DomainError::UnregisteredLayer(requested.to_string()))
    }
}

/// Free-standing form of [`LayerOrderTable::resolve_anchor`].
pub fn resolve_anchor<'t>(
    requested: &str,
    table: &'t LayerOrderTable,
    map: Option<&dyn MapQuery>,
) -> DomainResult<InsertionAnchor<'t>> {
    table.resolve_anchor(requested, map)
}
