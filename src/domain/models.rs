use super::errors::DomainResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What the editor is currently doing. Each mode mounts its own set of layers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Mode {
    #[default]
    Main,
    ImportRoute,
    /// Editing an existing route, or drawing a new one when `id` is `None`.
    EditRoute { id: Option<usize> },
    EvaluateRoute,
    EvaluateOd,
    DebugNetwork,
    DebugOd,
    DebugMeshDensity,
}

impl Mode {
    pub const CYCLE: [Mode; 8] = [
        Mode::Main,
        Mode::ImportRoute,
        Mode::EditRoute { id: None },
        Mode::EvaluateRoute,
        Mode::EvaluateOd,
        Mode::DebugNetwork,
        Mode::DebugOd,
        Mode::DebugMeshDensity,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Mode::Main => "main",
            Mode::ImportRoute => "import-route",
            Mode::EditRoute { .. } => "edit-route",
            Mode::EvaluateRoute => "evaluate-route",
            Mode::EvaluateOd => "evaluate-od",
            Mode::DebugNetwork => "debug-network",
            Mode::DebugOd => "debug-od",
            Mode::DebugMeshDensity => "debug-mesh-density",
        }
    }

    /// The mode after this one in [`Mode::CYCLE`], wrapping around.
    pub fn next(&self) -> Mode {
        let idx = Self::CYCLE
            .iter()
            .position(|m| m.label() == self.label())
            .unwrap_or(0);
        Self::CYCLE[(idx + 1) % Self::CYCLE.len()].clone()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::EditRoute { id: Some(id) } => write!(f, "edit-route #{}", id),
            other => f.write_str(other.label()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

/// A GeoJSON feature collection. Features are kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<serde_json::Value>,
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features: Vec::new(),
        }
    }
}

/// Number of trips between two zones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OdPair {
    pub from: String,
    pub to: String,
    pub count: u32,
}

/// Kind of cycling infrastructure a route is built as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InfraType {
    SegregatedWide,
    OffRoad,
    SegregatedNarrow,
    SharedFootway,
    CycleLane,
    MixedTraffic,
    Unknown,
}

impl InfraType {
    pub const ALL: [InfraType; 7] = [
        InfraType::SegregatedWide,
        InfraType::OffRoad,
        InfraType::SegregatedNarrow,
        InfraType::SharedFootway,
        InfraType::CycleLane,
        InfraType::MixedTraffic,
        InfraType::Unknown,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            InfraType::SegregatedWide => "SegregatedWide",
            InfraType::OffRoad => "OffRoad",
            InfraType::SegregatedNarrow => "SegregatedNarrow",
            InfraType::SharedFootway => "SharedFootway",
            InfraType::CycleLane => "CycleLane",
            InfraType::MixedTraffic => "MixedTraffic",
            InfraType::Unknown => "Unknown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InfraType::SegregatedWide => "Segregated Track (wide)",
            InfraType::OffRoad => "Off Road Cycleway",
            InfraType::SegregatedNarrow => "Segregated Track (narrow)",
            InfraType::SharedFootway => "Shared Footway",
            InfraType::CycleLane => "Painted Cycle Lane",
            InfraType::MixedTraffic => "Mixed traffic",
            InfraType::Unknown => "Unknown",
        }
    }

    /// Legend colour, as a CSS colour string.
    pub fn color(&self) -> &'static str {
        match self {
            InfraType::SegregatedWide => "#054d05",
            InfraType::OffRoad => "#3a9120",
            InfraType::SegregatedNarrow => "#87d668",
            InfraType::SharedFootway => "#ffbf00",
            InfraType::CycleLane => "#FF0000",
            InfraType::MixedTraffic => "#EFD1C5",
            InfraType::Unknown => "blue",
        }
    }
}

impl FromStr for InfraType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|infra| infra.name() == s)
            .ok_or_else(|| format!("Unknown infrastructure type: {}", s))
    }
}

/// One step of turn-by-turn directions along a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub length: f64,
    pub way: String,
    pub infra_type: InfraType,
}

/// A routed path as returned by the backend, with summary lengths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteGJ {
    #[serde(flatten)]
    pub collection: FeatureCollection,
    pub direct_length: f64,
    pub route_length: f64,
    pub directions: Vec<Step>,
}

impl RouteGJ {
    /// Route length over straight-line length; 0 for a zero-length route.
    pub fn directness(&self) -> f64 {
        if self.direct_length == 0.0 {
            0.0
        } else {
            self.route_length / self.direct_length
        }
    }

    /// First and last points of the route's line geometry, if it has any.
    pub fn endpoints(&self) -> Option<(LngLat, LngLat)> {
        let mut points = self
            .collection
            .features
            .iter()
            .filter(|feature| feature["geometry"]["type"] == "LineString")
            .filter_map(|feature| feature["geometry"]["coordinates"].as_array())
            .flatten()
            .filter_map(|coord| {
                Some(LngLat {
                    lng: coord.get(0)?.as_f64()?,
                    lat: coord.get(1)?.as_f64()?,
                })
            });
        let first = points.next()?;
        Some((first, points.last().unwrap_or(first)))
    }
}

impl fmt::Display for LngLat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lng, self.lat)
    }
}

/// Anything that can serialise the editor session for autosave.
pub trait SavefileSource: fmt::Debug {
    fn to_savefile(&self) -> DomainResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_serializes_with_kind_tag() {
        let json = serde_json::to_string(&Mode::EditRoute { id: Some(3) }).unwrap();
        assert_eq!(json, r#"{"kind":"edit-route","id":3}"#);

        let mode: Mode = serde_json::from_str(r#"{"kind":"debug-mesh-density"}"#).unwrap();
        assert_eq!(mode, Mode::DebugMeshDensity);
    }

    #[test]
    fn test_mode_cycle_wraps() {
        assert_eq!(Mode::Main.next(), Mode::ImportRoute);
        assert_eq!(Mode::EditRoute { id: Some(7) }.next(), Mode::EvaluateRoute);
        assert_eq!(Mode::DebugMeshDensity.next(), Mode::Main);
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(Mode::EditRoute { id: Some(2) }.to_string(), "edit-route #2");
        assert_eq!(Mode::EditRoute { id: None }.to_string(), "edit-route");
        assert_eq!(Mode::EvaluateOd.to_string(), "evaluate-od");
    }

    #[test]
    fn test_infra_type_table() {
        assert_eq!(InfraType::CycleLane.label(), "Painted Cycle Lane");
        assert_eq!(InfraType::SegregatedWide.color(), "#054d05");
        assert_eq!("OffRoad".parse::<InfraType>(), Ok(InfraType::OffRoad));
        assert!("Motorway".parse::<InfraType>().is_err());
    }

    #[test]
    fn test_route_gj_from_backend_json() {
        let raw = r#"{
            "type": "FeatureCollection",
            "features": [{"type": "Feature", "geometry": null, "properties": {}}],
            "direct_length": 1000.0,
            "route_length": 1250.0,
            "directions": [
                {"name": "High Street", "length": 800.0, "way": "w1", "infra_type": "CycleLane"},
                {"length": 450.0, "way": "w2", "infra_type": "MixedTraffic"}
            ]
        }"#;
        let route: RouteGJ = serde_json::from_str(raw).unwrap();

        assert_eq!(route.collection.features.len(), 1);
        assert_eq!(route.directions[0].name.as_deref(), Some("High Street"));
        assert_eq!(route.directions[1].name, None);
        assert_eq!(route.directions[1].infra_type, InfraType::MixedTraffic);
        assert!((route.directness() - 1.25).abs() < 1e-9);
    }

    #[test]
    fn test_route_endpoints() {
        let raw = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [0.0, 0.0]}},
                {"type": "Feature", "geometry": {"type": "LineString",
                    "coordinates": [[-3.19, 55.95], [-3.18, 55.96], [-3.17, 55.97]]}}
            ],
            "direct_length": 0.0,
            "route_length": 0.0,
            "directions": []
        }"#;
        let route: RouteGJ = serde_json::from_str(raw).unwrap();

        let (a, b) = route.endpoints().unwrap();
        assert_eq!(a, LngLat { lng: -3.19, lat: 55.95 });
        assert_eq!(b, LngLat { lng: -3.17, lat: 55.97 });
        assert_eq!(a.to_string(), "-3.19000, 55.95000");
        assert_eq!(route.directness(), 0.0);

        let empty = RouteGJ {
            collection: FeatureCollection::default(),
            direct_length: 1.0,
            route_length: 1.0,
            directions: Vec::new(),
        };
        assert_eq!(empty.endpoints(), None);
    }

    #[test]
    fn test_empty_feature_collection() {
        let json = serde_json::to_string(&FeatureCollection::default()).unwrap();
        assert_eq!(json, r#"{"type":"FeatureCollection","features":[]}"#);
    }
}
