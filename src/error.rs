//! Crate-level error type.

use crate::scene::SceneError;

/// Errors that can occur while mounting or driving the overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayError {
    /// The scene backend rejected an operation.
    Scene(SceneError),
    /// The overlay configuration is malformed or out of range.
    Config(String),
    /// GeoJSON input could not be parsed.
    GeoJson(String),
    /// The host map refused the layer registration.
    Host(String),
}

impl std::fmt::Display for OverlayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverlayError::Scene(err) => write!(f, "Scene error: {}", err),
            OverlayError::Config(msg) => write!(f, "Invalid overlay config: {}", msg),
            OverlayError::GeoJson(msg) => write!(f, "Failed to parse GeoJSON: {}", msg),
            OverlayError::Host(msg) => write!(f, "Host map error: {}", msg),
        }
    }
}

impl std::error::Error for OverlayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OverlayError::Scene(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SceneError> for OverlayError {
    fn from(err: SceneError) -> Self {
        OverlayError::Scene(err)
    }
}
