//! Session context shared by the composer and the synchronizer.

use glam::DVec2;

use crate::geo::{Crs, OverlayProjection};
use crate::scene::{ElementId, Scene, SceneError};

/// Handles to the elements the composer builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayHandles {
    /// Detached block element handed to the host map every frame.
    pub element: ElementId,
    /// Outermost `<svg>`; its viewBox follows the map view.
    pub root: ElementId,
    /// Movable `<svg>` holding the content group and its copies.
    pub container: ElementId,
    /// Authoritative content group; draw features here.
    pub content: ElementId,
    /// `<use>` references to `content`, east then west.
    pub copies: [ElementId; 2],
}

/// Geometry fixed at mount time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayLayout {
    /// Surface size measured at mount.
    pub size: DVec2,
    /// Position of geographic (0, 0) in root viewBox coordinates.
    pub anchor: DVec2,
    /// Pixels covering 360 degrees of longitude.
    pub world_width: f64,
    /// Width given to the movable container.
    pub inner_width: f64,
}

/// Everything one mounted overlay needs at frame time.
///
/// Owned by the synchronizer; it is the only writer of the container position.
/// The position is kept as a whole number of world-widths and the container
/// attribute is always written from it, never read back.
#[derive(Debug, Clone)]
pub struct OverlaySession<S> {
    pub scene: S,
    pub handles: OverlayHandles,
    pub layout: OverlayLayout,
    pub projection: OverlayProjection,
    pub source_crs: Crs,
    pub(super) wraps: i64,
}

impl<S: Scene> OverlaySession<S> {
    /// Net number of world-widths the container has moved east.
    pub fn wraps(&self) -> i64 {
        self.wraps
    }

    /// Container offset from the anchor.
    pub fn inner_x(&self) -> f64 {
        self.wraps as f64 * self.layout.world_width
    }

    /// Container x in root viewBox coordinates.
    pub fn container_x(&self) -> f64 {
        self.layout.anchor.x + self.inner_x()
    }

    /// Container width, as currently stored in the scene.
    pub fn inner_width(&self) -> Result<f64, SceneError> {
        self.scene
            .numeric_attribute(self.handles.container, "width")
    }

    /// Moves the container by `step` world-widths.
    pub fn shift_wraps(&mut self, step: i64) -> Result<(), SceneError> {
        self.wraps += step;
        self.scene.set_attribute(
            self.handles.container,
            "x",
            &self.container_x().to_string(),
        )
    }
}
