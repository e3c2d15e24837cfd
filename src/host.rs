//! Host map integration.
//!
//! The host map owns the frame loop. It receives one [`RenderLayer`] whose
//! callback it invokes with the current [`FrameState`]; the callback hands
//! back the overlay's host element.

use crate::config::OverlayConfig;
use crate::error::OverlayError;
use crate::geo::{render_geo_layers, GeoLayerSet, OverlayProjection};
use crate::overlay::{compose, FrameState, OverlayHandles, OverlayLayout, ViewportSynchronizer};
use crate::scene::{ElementId, Scene};

/// Per-frame render callback.
pub type RenderFn = Box<dyn FnMut(&FrameState) -> ElementId>;

/// A custom layer registered with the host map.
pub struct RenderLayer {
    pub class_name: String,
    pub z_index: i32,
    /// Host element; returned whenever a frame cannot be rendered.
    pub element: ElementId,
    pub render: RenderFn,
}

impl RenderLayer {
    /// Runs the render callback for a frame the host managed to read, or
    /// hands back the host element untouched for one it could not.
    pub fn render_frame(&mut self, frame: Result<FrameState, OverlayError>) -> ElementId {
        match frame {
            Ok(frame) => (self.render)(&frame),
            Err(e) => {
                log::warn!("Skipping overlay frame: {}", e);
                self.element
            }
        }
    }
}

impl std::fmt::Debug for RenderLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderLayer")
            .field("class_name", &self.class_name)
            .field("z_index", &self.z_index)
            .field("element", &self.element)
            .finish_non_exhaustive()
    }
}

/// The slippy map the overlay is synced to.
pub trait HostMap {
    /// Registers a layer; its render callback runs once per map frame.
    fn add_layer(&mut self, layer: RenderLayer) -> Result<(), OverlayError>;

    /// Requests a frame. Hosts that render continuously can ignore this.
    fn render(&mut self) {}
}

/// What the caller keeps after mounting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MountedOverlay {
    pub handles: OverlayHandles,
    pub layout: OverlayLayout,
    pub projection: OverlayProjection,
}

impl MountedOverlay {
    /// The authoritative content group. Anything drawn here repeats east and west.
    pub fn content(&self) -> ElementId {
        self.handles.content
    }

    /// Draws visible geographic layers into the content group.
    pub fn draw_layers<S: Scene>(
        &self,
        scene: &S,
        layers: &GeoLayerSet,
    ) -> Result<usize, OverlayError> {
        let created = render_geo_layers(scene, self.handles.content, layers, &self.projection)?;
        log::debug!("Drew {} overlay elements from {} layers", created, layers.len());
        Ok(created)
    }
}

/// Composes the overlay on `surface` and registers it with `map`.
///
/// Registration happens only after the structure is complete, so the first
/// frame always finds a configured session.
pub fn mount<S, M>(
    scene: S,
    surface: ElementId,
    map: &mut M,
    config: &OverlayConfig,
) -> Result<MountedOverlay, OverlayError>
where
    S: Scene + 'static,
    M: HostMap + ?Sized,
{
    let session = compose(scene, surface, config)?;
    let mounted = MountedOverlay {
        handles: session.handles,
        layout: session.layout,
        projection: session.projection,
    };

    let element = session.handles.element;
    let mut synchronizer = ViewportSynchronizer::new(session);
    let render = move |frame: &FrameState| match synchronizer.render(frame) {
        Ok(element) => element,
        Err(e) => {
            log::error!("Overlay frame failed: {}", e);
            element
        }
    };

    map.add_layer(RenderLayer {
        class_name: config.class_name.clone(),
        z_index: config.z_index,
        element,
        render: Box::new(render),
    })?;
    map.render();

    log::info!(
        "Mounted overlay layer '{}' at z-index {}",
        config.class_name,
        config.z_index
    );

    Ok(mounted)
}
