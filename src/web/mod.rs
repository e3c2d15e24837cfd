//! Browser backend and JavaScript entry point.

mod map;
mod scene;

pub use map::JsHostMap;
pub use scene::WebScene;

use js_sys::Function;
use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::config::OverlayConfig;
use crate::error::OverlayError;
use crate::geo::GeoLayerSet;
use crate::host::{mount, MountedOverlay};

fn to_js(e: OverlayError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// A mounted overlay, as seen from JavaScript.
#[wasm_bindgen]
pub struct SvgOverlay {
    scene: WebScene,
    mounted: MountedOverlay,
}

#[wasm_bindgen]
impl SvgOverlay {
    /// The content group; anything appended to it repeats east and west.
    #[wasm_bindgen(getter)]
    pub fn content(&self) -> Result<Element, JsValue> {
        self.scene
            .element(self.mounted.content())
            .map_err(|e| to_js(e.into()))
    }

    /// Pixels per 360 degrees of longitude.
    #[wasm_bindgen(getter, js_name = worldWidth)]
    pub fn world_width(&self) -> f64 {
        self.mounted.layout.world_width
    }

    /// Loads a GeoJSON layer and draws it into the content group.
    #[wasm_bindgen(js_name = addGeoJson)]
    pub fn add_geojson(&self, name: &str, geojson: &str) -> Result<usize, JsValue> {
        let mut layers = GeoLayerSet::new();
        layers.load_layer(name, geojson).map_err(to_js)?;

        self.mounted
            .draw_layers(&self.scene, &layers)
            .map_err(to_js)
    }
}

/// Mounts an overlay on `surface` and registers it with `map`.
///
/// `layer_ctor` is the host library's custom layer constructor; `config` is
/// an optional partial [`OverlayConfig`] object.
#[wasm_bindgen(js_name = attachSvgLayer)]
pub fn attach_svg_layer(
    surface: Element,
    map: JsValue,
    layer_ctor: Function,
    config: JsValue,
) -> Result<SvgOverlay, JsValue> {
    let config: OverlayConfig = if config.is_undefined() || config.is_null() {
        OverlayConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config)?
    };

    let scene = WebScene::new().map_err(to_js)?;
    let surface = scene.adopt(surface);
    let mut host = JsHostMap::new(map, layer_ctor, scene.clone());

    let mounted = mount(scene.clone(), surface, &mut host, &config).map_err(to_js)?;

    Ok(SvgOverlay { scene, mounted })
}
