//! Overlay configuration.
//!
//! Every field has a default, so hosts only need to pass what they change.

use serde::{Deserialize, Serialize};

use crate::error::OverlayError;
use crate::geo::{Crs, LatitudeScale, DEFAULT_DEGREES_PER_HEIGHT};

/// Session-wide overlay settings, fixed at mount time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Latitude span covered by the overlay's pixel height.
    pub degrees_per_height: f64,
    /// Vertical scale model used for latitudes.
    pub latitude_scale: LatitudeScale,
    /// CRS of the extents the host map reports each frame.
    pub source_crs: Crs,
    /// `id` of the authoritative content group; copies reference it.
    pub content_id: String,
    /// Class name given to the host layer.
    pub class_name: String,
    /// Z-index of the host layer.
    pub z_index: i32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            degrees_per_height: DEFAULT_DEGREES_PER_HEIGHT,
            latitude_scale: LatitudeScale::Mercator,
            source_crs: Crs::WebMercator,
            content_id: "geoGroup".to_string(),
            class_name: "ol-layer".to_string(),
            z_index: 100,
        }
    }
}

impl OverlayConfig {
    /// Parses and validates a JSON config.
    pub fn from_json(json: &str) -> Result<Self, OverlayError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| OverlayError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a JSON config, falling back to defaults on any problem.
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Using default overlay config: {}", e);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), OverlayError> {
        if !(self.degrees_per_height.is_finite() && self.degrees_per_height > 0.0) {
            return Err(OverlayError::Config(format!(
                "degrees_per_height must be positive, got {}",
                self.degrees_per_height
            )));
        }

        if self.content_id.is_empty() || self.content_id.contains(char::is_whitespace) {
            return Err(OverlayError::Config(format!(
                "content_id must be a non-empty token, got '{}'",
                self.content_id
            )));
        }

        Ok(())
    }
}
