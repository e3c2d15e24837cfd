//! Coordinate reference systems and extent transforms.
//!
//! The host map reports its view extent in its own projected CRS; the
//! overlay works in geographic degrees. Only the two CRSs a slippy map
//! actually uses are modelled here.

use geo_types::Coord;
use serde::{Deserialize, Serialize};

use super::projection::MAX_MERCATOR_LAT;

/// Sphere radius used by EPSG:3857 (meters).
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Half the EPSG:3857 world extent (meters).
pub const HALF_WORLD_METERS: f64 = std::f64::consts::PI * EARTH_RADIUS;

/// A coordinate reference system known to the overlay, (de)serialized by
/// EPSG code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Crs {
    /// Spherical (web) Mercator, meters.
    #[default]
    WebMercator,
    /// WGS84 longitude/latitude, degrees.
    Geographic,
}

impl Crs {
    pub fn code(&self) -> &'static str {
        match self {
            Crs::WebMercator => "EPSG:3857",
            Crs::Geographic => "EPSG:4326",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "EPSG:3857" | "EPSG:900913" => Some(Crs::WebMercator),
            "EPSG:4326" => Some(Crs::Geographic),
            _ => None,
        }
    }
}

impl TryFrom<String> for Crs {
    type Error = String;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        Crs::from_code(&code).ok_or_else(|| format!("unsupported CRS '{}'", code))
    }
}

impl From<Crs> for String {
    fn from(crs: Crs) -> Self {
        crs.code().to_string()
    }
}

/// An axis-aligned extent `[min_x, min_y, max_x, max_y]` in some CRS.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn from_array(values: [f64; 4]) -> Self {
        Self::new(values[0], values[1], values[2], values[3])
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// True when the extent encloses no area.
    pub fn is_empty(&self) -> bool {
        !(self.width().abs() > 0.0 && self.height().abs() > 0.0)
    }
}

/// Converts extents between coordinate reference systems.
pub trait ExtentTransform {
    fn transform_extent(&self, extent: Extent, source: Crs, target: Crs) -> Extent;
}

/// Closed-form EPSG:3857 <-> EPSG:4326 transform.
///
/// Longitude is never wrapped, so a view panned past the antimeridian keeps
/// producing continuous values beyond +-180.
#[derive(Debug, Clone, Copy, Default)]
pub struct SphericalMercator;

impl SphericalMercator {
    /// Mercator meters to lon/lat degrees.
    pub fn to_lon_lat(x: f64, y: f64) -> Coord<f64> {
        let lon = (x / EARTH_RADIUS).to_degrees();
        let lat = (y / EARTH_RADIUS).sinh().atan().to_degrees();
        Coord { x: lon, y: lat }
    }

    /// Lon/lat degrees to Mercator meters. Latitude is clamped to the
    /// projection's limit.
    pub fn from_lon_lat(coord: Coord<f64>) -> (f64, f64) {
        let lat = coord.y.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
        let x = coord.x.to_radians() * EARTH_RADIUS;
        let y = lat.to_radians().tan().asinh() * EARTH_RADIUS;
        (x, y)
    }
}

impl ExtentTransform for SphericalMercator {
    fn transform_extent(&self, extent: Extent, source: Crs, target: Crs) -> Extent {
        // Both directions are monotonic per axis, so corners map to corners.
        match (source, target) {
            (Crs::WebMercator, Crs::Geographic) => {
                let min = Self::to_lon_lat(extent.min_x, extent.min_y);
                let max = Self::to_lon_lat(extent.max_x, extent.max_y);
                Extent::new(min.x, min.y, max.x, max.y)
            }
            (Crs::Geographic, Crs::WebMercator) => {
                let (min_x, min_y) = Self::from_lon_lat(Coord {
                    x: extent.min_x,
                    y: extent.min_y,
                });
                let (max_x, max_y) = Self::from_lon_lat(Coord {
                    x: extent.max_x,
                    y: extent.max_y,
                });
                Extent::new(min_x, min_y, max_x, max_y)
            }
            _ => extent,
        }
    }
}
