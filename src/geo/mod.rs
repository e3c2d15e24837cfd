//! Geographic side of the overlay.
//!
//! Projection between lon/lat and overlay pixels, extent transforms from the
//! host map's CRS, and feature layers drawn into the overlay.

mod crs;
mod layer;
mod projection;
mod renderer;

pub use crs::{Crs, Extent, ExtentTransform, SphericalMercator, EARTH_RADIUS, HALF_WORLD_METERS};
pub use layer::{GeoFeature, GeoLayer, GeoLayerSet, Rings};
pub use projection::{
    LatitudeScale, OverlayProjection, ProjectionParams, DEFAULT_DEGREES_PER_HEIGHT,
    MAX_MERCATOR_LAT, WORLD_DEGREES,
};
pub use renderer::{path_data, render_geo_layers, render_layer};
