//! Overlay projection and coordinate transformation.
//!
//! Converts between geographic coordinates (lon/lat in degrees) and
//! overlay-local pixels. The overlay anchor `(0, 0)` is geographic `(0, 0)`;
//! x grows eastward and y grows southward, matching SVG user space.

use geo_types::Coord;
use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Degrees of longitude in one full world.
pub const WORLD_DEGREES: f64 = 360.0;

/// Default latitude span covered by the overlay's pixel height.
pub const DEFAULT_DEGREES_PER_HEIGHT: f64 = 180.0;

/// Latitude limit of the spherical Mercator projection.
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

/// How latitude is scaled onto the vertical pixel axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatitudeScale {
    /// Spherical Mercator, consistent with an EPSG:3857 host map.
    #[default]
    Mercator,
    /// Equirectangular: latitude maps linearly to pixels.
    Linear,
}

impl LatitudeScale {
    /// Maps latitude (degrees) onto "vertical degrees" before pixel scaling.
    fn forward(self, lat: f64) -> f64 {
        match self {
            LatitudeScale::Linear => lat,
            LatitudeScale::Mercator => {
                let lat_rad = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
                lat_rad.tan().asinh().to_degrees()
            }
        }
    }

    fn inverse(self, units: f64) -> f64 {
        match self {
            LatitudeScale::Linear => units,
            LatitudeScale::Mercator => units.to_radians().sinh().atan().to_degrees(),
        }
    }
}

/// Fixed scale parameters for one overlay session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionParams {
    /// Overlay pixels per degree of longitude (and of linear latitude).
    pub pixels_per_degree: f64,
    /// Pixel position of the anchor on both axes.
    pub origin_offset: f64,
    /// Vertical scale model.
    pub latitude_scale: LatitudeScale,
}

impl ProjectionParams {
    /// Derives parameters so that `height_px` spans `degrees_per_height`
    /// degrees, with a zero origin offset.
    pub fn from_overlay_height(
        height_px: f64,
        degrees_per_height: f64,
        latitude_scale: LatitudeScale,
    ) -> Self {
        let pixels_per_degree = if degrees_per_height > 0.0 && height_px.is_finite() {
            height_px.max(0.0) / degrees_per_height
        } else {
            0.0
        };

        Self {
            pixels_per_degree,
            origin_offset: 0.0,
            latitude_scale,
        }
    }
}

/// Pure lon/lat <-> overlay pixel conversions.
///
/// Parameters are fixed at construction, so there is no unconfigured state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayProjection {
    params: ProjectionParams,
}

impl OverlayProjection {
    pub fn new(params: ProjectionParams) -> Self {
        Self { params }
    }

    /// Projection for an overlay of the given height using the default
    /// 180 degree vertical span and Mercator latitudes.
    pub fn for_overlay_height(height_px: f64) -> Self {
        Self::new(ProjectionParams::from_overlay_height(
            height_px,
            DEFAULT_DEGREES_PER_HEIGHT,
            LatitudeScale::default(),
        ))
    }

    pub fn params(&self) -> ProjectionParams {
        self.params
    }

    /// Longitude to overlay x. Not clamped: 360 yields one world-width.
    pub fn lon_to_x(&self, lon: f64) -> f64 {
        lon * self.params.pixels_per_degree + self.params.origin_offset
    }

    /// Latitude to overlay y. North is negative.
    pub fn lat_to_y(&self, lat: f64) -> f64 {
        -self.params.latitude_scale.forward(lat) * self.params.pixels_per_degree
            + self.params.origin_offset
    }

    /// Overlay x back to longitude. A zero scale maps everything to the anchor.
    pub fn x_to_lon(&self, x: f64) -> f64 {
        if self.params.pixels_per_degree == 0.0 {
            return 0.0;
        }
        (x - self.params.origin_offset) / self.params.pixels_per_degree
    }

    /// Overlay y back to latitude.
    pub fn y_to_lat(&self, y: f64) -> f64 {
        if self.params.pixels_per_degree == 0.0 {
            return 0.0;
        }
        let units = -(y - self.params.origin_offset) / self.params.pixels_per_degree;
        self.params.latitude_scale.inverse(units)
    }

    /// Horizontal pixel distance covering 360 degrees of longitude.
    pub fn world_width(&self) -> f64 {
        self.lon_to_x(WORLD_DEGREES) - self.lon_to_x(0.0)
    }

    /// Converts a geographic coordinate (x = lon, y = lat) to overlay pixels.
    pub fn project(&self, coord: Coord<f64>) -> DVec2 {
        DVec2::new(self.lon_to_x(coord.x), self.lat_to_y(coord.y))
    }

    /// Converts overlay pixels back to a geographic coordinate.
    pub fn unproject(&self, pos: DVec2) -> Coord<f64> {
        Coord {
            x: self.x_to_lon(pos.x),
            y: self.y_to_lat(pos.y),
        }
    }
}
