//! Geographic layer rendering.
//!
//! Draws features into the overlay's authoritative content group. The group's
//! linked copies pick the new elements up without any extra work.

use std::fmt::Write as _;

use geo_types::Coord;

use super::{GeoFeature, GeoLayer, GeoLayerSet, OverlayProjection};
use crate::scene::{ElementId, ElementKind, Scene, SceneError};

/// Radius of point markers, in overlay pixels.
const POINT_RADIUS: f64 = 3.0;

/// Offset of a point label from its marker.
const LABEL_OFFSET: f64 = 5.0;

/// Renders all visible layers into `content`, back to front.
///
/// Returns the number of elements created.
pub fn render_geo_layers<S: Scene>(
    scene: &S,
    content: ElementId,
    layers: &GeoLayerSet,
    projection: &OverlayProjection,
) -> Result<usize, SceneError> {
    let mut created = 0;
    for layer in layers.iter().filter(|l| l.visible) {
        created += render_layer(scene, content, layer, projection)?;
    }
    Ok(created)
}

/// Renders one layer as a `<g>` named after it.
pub fn render_layer<S: Scene>(
    scene: &S,
    content: ElementId,
    layer: &GeoLayer,
    projection: &OverlayProjection,
) -> Result<usize, SceneError> {
    let group = scene.create_element(ElementKind::Group, Some(content))?;
    scene.add_class(group, &layer.name)?;

    let mut created = 1;
    for feature in &layer.features {
        created += render_feature(scene, group, feature, projection)?;
    }
    Ok(created)
}

fn render_feature<S: Scene>(
    scene: &S,
    group: ElementId,
    feature: &GeoFeature,
    projection: &OverlayProjection,
) -> Result<usize, SceneError> {
    match feature {
        GeoFeature::Point(coord, label) => {
            render_point(scene, group, *coord, label.as_deref(), projection)
        }
        GeoFeature::MultiPoint(coords, label) => {
            let mut created = 0;
            for coord in coords {
                created += render_point(scene, group, *coord, label.as_deref(), projection)?;
            }
            Ok(created)
        }
        GeoFeature::LineString(coords) => {
            render_path(scene, group, &path_data(&[coords], projection, false))
        }
        GeoFeature::MultiLineString(lines) => {
            let parts: Vec<&Vec<Coord<f64>>> = lines.iter().collect();
            render_path(scene, group, &path_data(&parts, projection, false))
        }
        GeoFeature::Polygon {
            exterior, holes, ..
        } => {
            let rings: Vec<&Vec<Coord<f64>>> = std::iter::once(exterior).chain(holes).collect();
            render_path(scene, group, &path_data(&rings, projection, true))
        }
        GeoFeature::MultiPolygon { polygons, .. } => {
            let rings: Vec<&Vec<Coord<f64>>> = polygons
                .iter()
                .flat_map(|(exterior, holes)| std::iter::once(exterior).chain(holes))
                .collect();
            render_path(scene, group, &path_data(&rings, projection, true))
        }
    }
}

fn render_point<S: Scene>(
    scene: &S,
    group: ElementId,
    coord: Coord<f64>,
    label: Option<&str>,
    projection: &OverlayProjection,
) -> Result<usize, SceneError> {
    let pos = projection.project(coord);

    let circle = scene.create_element(ElementKind::Circle, Some(group))?;
    scene.set_attributes(
        circle,
        &[
            ("cx", pos.x.to_string()),
            ("cy", pos.y.to_string()),
            ("r", POINT_RADIUS.to_string()),
        ],
    )?;

    let Some(text) = label else {
        return Ok(1);
    };

    let label_el = scene.create_element(ElementKind::Text, Some(group))?;
    scene.set_attributes(
        label_el,
        &[
            ("x", (pos.x + LABEL_OFFSET).to_string()),
            ("y", (pos.y - LABEL_OFFSET).to_string()),
        ],
    )?;
    scene.set_text(label_el, text)?;
    Ok(2)
}

fn render_path<S: Scene>(
    scene: &S,
    group: ElementId,
    data: &str,
) -> Result<usize, SceneError> {
    if data.is_empty() {
        return Ok(0);
    }

    let path = scene.create_element(ElementKind::Path, Some(group))?;
    scene.set_attributes(
        path,
        &[("d", data.to_string()), ("fill-rule", "evenodd".to_string())],
    )?;
    Ok(1)
}

/// Builds SVG path data for a set of parts. Parts with fewer than two
/// points are skipped; `close` appends `Z` to each part (polygon rings).
pub fn path_data(
    parts: &[&Vec<Coord<f64>>],
    projection: &OverlayProjection,
    close: bool,
) -> String {
    let mut data = String::new();

    for part in parts.iter().filter(|p| p.len() >= 2) {
        for (i, coord) in part.iter().enumerate() {
            let pos = projection.project(*coord);
            let command = if i == 0 { 'M' } else { 'L' };
            if !data.is_empty() {
                data.push(' ');
            }
            let _ = write!(data, "{}{} {}", command, pos.x, pos.y);
        }
        if close {
            data.push_str(" Z");
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{LatitudeScale, ProjectionParams};
    use crate::scene::MemoryScene;

    fn projection() -> OverlayProjection {
        // 5 px per degree, latitudes linear.
        OverlayProjection::new(ProjectionParams::from_overlay_height(
            900.0,
            180.0,
            LatitudeScale::Linear,
        ))
    }

    #[test]
    fn test_path_data() {
        let line = vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 10.0, y: 10.0 }];
        let stub = vec![Coord { x: 1.0, y: 1.0 }];

        assert_eq!(
            path_data(&[&line, &stub], &projection(), false),
            "M0 0 L50 -50"
        );
        assert_eq!(
            path_data(&[&line, &line], &projection(), true),
            "M0 0 L50 -50 Z M0 0 L50 -50 Z"
        );
        assert_eq!(path_data(&[&stub], &projection(), true), "");
    }

    #[test]
    fn test_render_layers_into_content() {
        let scene = MemoryScene::new();
        let content = scene.create_element(ElementKind::Svg, None).unwrap();

        let mut layers = GeoLayerSet::new();
        let mut places = GeoLayer::new("places");
        places.features.push(GeoFeature::Point(
            Coord { x: -10.0, y: 20.0 },
            Some("Somewhere".to_string()),
        ));
        places.features.push(GeoFeature::LineString(vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 1.0, y: 1.0 },
        ]));
        layers.insert(places);

        let mut hidden = GeoLayer::new("hidden");
        hidden.visible = false;
        hidden.features.push(GeoFeature::Point(Coord { x: 0.0, y: 0.0 }, None));
        layers.insert(hidden);

        let created = render_geo_layers(&scene, content, &layers, &projection()).unwrap();
        assert_eq!(created, 4);

        let groups = scene.children(content);
        assert_eq!(groups.len(), 1);
        assert_eq!(
            scene.attribute(groups[0], "class").unwrap().as_deref(),
            Some("places")
        );

        let items = scene.children(groups[0]);
        assert_eq!(scene.kind(items[0]), Some(ElementKind::Circle));
        assert_eq!(scene.numeric_attribute(items[0], "cx").unwrap(), -50.0);
        assert_eq!(scene.numeric_attribute(items[0], "cy").unwrap(), -100.0);
        assert_eq!(scene.text(items[1]).as_deref(), Some("Somewhere"));
        assert_eq!(
            scene.attribute(items[2], "d").unwrap().as_deref(),
            Some("M0 0 L5 -5")
        );
    }
}
