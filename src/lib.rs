//! A horizontally wrapping SVG overlay kept in sync with a slippy map.
//!
//! The overlay draws geographic content once and shows it three times, one
//! world-width apart, inside a movable container. Each map frame the viewBox
//! follows the map view and the container jumps by a world-width whenever the
//! view pans past it, so the content never runs out in either direction.

pub mod config;
pub mod error;
pub mod geo;
pub mod host;
pub mod overlay;
pub mod scene;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::OverlayConfig;
pub use error::OverlayError;
pub use host::{mount, HostMap, MountedOverlay, RenderLayer};
pub use overlay::{FrameState, ViewportSynchronizer};
pub use scene::{ElementId, MemoryScene, Scene};
