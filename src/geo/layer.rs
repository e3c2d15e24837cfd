//! Geographic layer data structures.

use geo_types::Coord;
use geojson::{Feature, GeoJson, Geometry, Value};

use crate::error::OverlayError;

/// Polygon rings: exterior first, holes after.
pub type Rings = (Vec<Coord<f64>>, Vec<Vec<Coord<f64>>>);

/// A geographic feature that can be drawn into the overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoFeature {
    /// A single point (city, landmark) with optional label
    Point(Coord<f64>, Option<String>),
    /// Several points sharing one label
    MultiPoint(Vec<Coord<f64>>, Option<String>),
    /// A series of connected line segments (boundary, river, route)
    LineString(Vec<Coord<f64>>),
    /// Multiple line strings
    MultiLineString(Vec<Vec<Coord<f64>>>),
    /// A closed polygon with optional label
    Polygon {
        exterior: Vec<Coord<f64>>,
        holes: Vec<Vec<Coord<f64>>>,
        label: Option<String>,
    },
    /// Multiple polygons with optional label
    MultiPolygon {
        polygons: Vec<Rings>,
        label: Option<String>,
    },
}

impl GeoFeature {
    pub fn label(&self) -> Option<&str> {
        match self {
            GeoFeature::Point(_, label)
            | GeoFeature::MultiPoint(_, label)
            | GeoFeature::Polygon { label, .. }
            | GeoFeature::MultiPolygon { label, .. } => label.as_deref(),
            GeoFeature::LineString(_) | GeoFeature::MultiLineString(_) => None,
        }
    }
}

/// A named group of features drawn together.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoLayer {
    /// Layer name, also used as the CSS class of its group
    pub name: String,
    pub features: Vec<GeoFeature>,
    pub visible: bool,
}

impl GeoLayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            features: Vec::new(),
            visible: true,
        }
    }

    /// Parses a GeoJSON document into a new layer.
    pub fn from_geojson(name: impl Into<String>, geojson_str: &str) -> Result<Self, OverlayError> {
        let mut layer = Self::new(name);
        layer.load_from_geojson(geojson_str)?;
        Ok(layer)
    }

    /// Appends features from GeoJSON data.
    ///
    /// Accepts a FeatureCollection, a single Feature or a bare Geometry.
    /// Features without geometry are skipped.
    pub fn load_from_geojson(&mut self, geojson_str: &str) -> Result<(), OverlayError> {
        let geojson: GeoJson = geojson_str
            .parse()
            .map_err(|e: geojson::Error| OverlayError::GeoJson(e.to_string()))?;

        let before = self.features.len();
        match geojson {
            GeoJson::FeatureCollection(fc) => {
                for feature in &fc.features {
                    self.push_feature(feature);
                }
            }
            GeoJson::Feature(feature) => self.push_feature(&feature),
            GeoJson::Geometry(geometry) => self.push_geometry(&geometry, None),
        }

        log::debug!(
            "Layer '{}': loaded {} features",
            self.name,
            self.features.len() - before
        );
        Ok(())
    }

    fn push_feature(&mut self, feature: &Feature) {
        let label = feature
            .properties
            .as_ref()
            .and_then(|p| p.get("name").or_else(|| p.get("NAME")))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        if let Some(geometry) = &feature.geometry {
            self.push_geometry(geometry, label);
        }
    }

    fn push_geometry(&mut self, geometry: &Geometry, label: Option<String>) {
        let feature = match &geometry.value {
            Value::Point(position) => match coord(position) {
                Some(c) => GeoFeature::Point(c, label),
                None => return,
            },
            Value::MultiPoint(positions) => GeoFeature::MultiPoint(line(positions), label),
            Value::LineString(positions) => GeoFeature::LineString(line(positions)),
            Value::MultiLineString(lines) => {
                GeoFeature::MultiLineString(lines.iter().map(|l| line(l)).collect())
            }
            Value::Polygon(rings) => match polygon(rings) {
                Some((exterior, holes)) => GeoFeature::Polygon {
                    exterior,
                    holes,
                    label,
                },
                None => return,
            },
            Value::MultiPolygon(polygons) => GeoFeature::MultiPolygon {
                polygons: polygons.iter().filter_map(|rings| polygon(rings)).collect(),
                label,
            },
            Value::GeometryCollection(geometries) => {
                for g in geometries {
                    self.push_geometry(g, label.clone());
                }
                return;
            }
        };
        self.features.push(feature);
    }
}

fn coord(position: &[f64]) -> Option<Coord<f64>> {
    match position {
        [x, y, ..] => Some(Coord { x: *x, y: *y }),
        _ => None,
    }
}

fn line(positions: &[Vec<f64>]) -> Vec<Coord<f64>> {
    positions.iter().filter_map(|p| coord(p)).collect()
}

fn polygon(rings: &[Vec<Vec<f64>>]) -> Option<Rings> {
    let (exterior, holes) = rings.split_first()?;
    Some((line(exterior), holes.iter().map(|r| line(r)).collect()))
}

/// Ordered collection of layers; later layers draw on top.
#[derive(Debug, Clone, Default)]
pub struct GeoLayerSet {
    layers: Vec<GeoLayer>,
}

impl GeoLayerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a layer, replacing any existing layer with the same name in place.
    pub fn insert(&mut self, layer: GeoLayer) {
        match self.layers.iter_mut().find(|l| l.name == layer.name) {
            Some(existing) => *existing = layer,
            None => self.layers.push(layer),
        }
    }

    /// Loads a layer from a GeoJSON string.
    pub fn load_layer(&mut self, name: &str, geojson_str: &str) -> Result<(), OverlayError> {
        self.insert(GeoLayer::from_geojson(name, geojson_str)?);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&GeoLayer> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeoLayer> {
        self.layers.iter()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
