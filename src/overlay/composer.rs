//! Builds the three-copy repeating overlay structure.
//!
//! ```text
//! div                         host element, resized every frame
//! └─ svg.svg-viewport         root; viewBox follows the map view
//!    └─ svg.inner-svg         movable container at anchor + inner_x
//!       ├─ svg#geoGroup       authoritative content at (0, 0)
//!       ├─ use → #geoGroup    x = +world_width
//!       └─ use → #geoGroup    x = -world_width
//! ```

use super::session::{OverlayHandles, OverlayLayout, OverlaySession};
use crate::config::OverlayConfig;
use crate::error::OverlayError;
use crate::geo::{OverlayProjection, ProjectionParams};
use crate::scene::{ElementId, ElementKind, Scene};

/// Class that makes the root fill its surface.
pub const ROOT_CLASS: &str = "svg-viewport";

/// Class shared by the container and the content group.
pub const INNER_CLASS: &str = "inner-svg";

/// Measures `surface` and builds the overlay structure in `scene`.
///
/// The returned session is ready for the first frame; nothing is registered
/// with the host map here.
pub fn compose<S: Scene>(
    scene: S,
    surface: ElementId,
    config: &OverlayConfig,
) -> Result<OverlaySession<S>, OverlayError> {
    config.validate()?;

    let size = scene.measure(surface)?;
    if size.x <= 0.0 || size.y <= 0.0 {
        log::warn!(
            "Overlay surface measured {}x{}; the overlay will not be visible",
            size.x,
            size.y
        );
    }

    let projection = OverlayProjection::new(ProjectionParams::from_overlay_height(
        size.y,
        config.degrees_per_height,
        config.latitude_scale,
    ));
    let world_width = projection.world_width();
    let layout = OverlayLayout {
        size,
        anchor: size / 2.0,
        world_width,
        // A west wrap then lands exactly on the east threshold, so one
        // wrap per frame is enough to settle.
        inner_width: 2.0 * world_width,
    };

    let handles = build(&scene, config, &layout)?;

    log::info!(
        "Composed overlay {}x{} ({} px/degree, world width {} px, {:?} latitudes)",
        size.x,
        size.y,
        projection.params().pixels_per_degree,
        world_width,
        config.latitude_scale
    );

    Ok(OverlaySession {
        scene,
        handles,
        layout,
        projection,
        source_crs: config.source_crs,
        wraps: 0,
    })
}

fn build<S: Scene>(
    scene: &S,
    config: &OverlayConfig,
    layout: &OverlayLayout,
) -> Result<OverlayHandles, OverlayError> {
    let element = scene.create_element(ElementKind::Container, None)?;
    scene.add_class(element, &config.class_name)?;

    let root = scene.create_element(ElementKind::Svg, Some(element))?;
    scene.set_attributes(
        root,
        &[
            ("width", "100%".to_string()),
            ("height", "100%".to_string()),
            ("overflow", "visible".to_string()),
        ],
    )?;
    scene.add_class(root, ROOT_CLASS)?;

    let container = scene.create_element(ElementKind::Svg, Some(root))?;
    scene.set_attributes(
        container,
        &[
            ("x", layout.anchor.x.to_string()),
            ("y", layout.anchor.y.to_string()),
            ("width", layout.inner_width.to_string()),
            ("height", layout.size.y.to_string()),
            ("overflow", "visible".to_string()),
        ],
    )?;
    scene.add_class(container, INNER_CLASS)?;

    let content = scene.create_element(ElementKind::Svg, Some(container))?;
    scene.set_attributes(
        content,
        &[
            ("id", config.content_id.clone()),
            ("x", "0".to_string()),
            ("y", "0".to_string()),
            ("width", layout.size.x.to_string()),
            ("height", layout.size.y.to_string()),
            ("overflow", "visible".to_string()),
        ],
    )?;
    scene.add_class(content, INNER_CLASS)?;

    let east = place_copy(scene, content, container, layout.world_width)?;
    let west = place_copy(scene, content, container, -layout.world_width)?;

    Ok(OverlayHandles {
        element,
        root,
        container,
        content,
        copies: [east, west],
    })
}

fn place_copy<S: Scene>(
    scene: &S,
    content: ElementId,
    container: ElementId,
    x: f64,
) -> Result<ElementId, OverlayError> {
    let copy = scene.link(content, container)?;
    scene.set_attributes(copy, &[("x", x.to_string()), ("y", "0".to_string())])?;
    Ok(copy)
}
