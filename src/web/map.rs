//! [`HostMap`] over an OpenLayers-style map object.
//!
//! The layer is created with `new LayerCtor({ className, zIndex, render })`
//! and registered with `map.addLayer(layer)`. The render function receives
//! the map's frame state and must return the element to place.

use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use super::scene::WebScene;
use crate::error::OverlayError;
use crate::host::{HostMap, RenderLayer};
use crate::overlay::FrameState;

fn host_error(e: JsValue) -> OverlayError {
    OverlayError::Host(format!("{:?}", e))
}

/// Reads `extent` and `size` from a host frame state.
fn read_frame(frame_state: &JsValue) -> Result<FrameState, OverlayError> {
    let extent = Reflect::get(frame_state, &JsValue::from_str("extent")).map_err(host_error)?;
    let size = Reflect::get(frame_state, &JsValue::from_str("size")).map_err(host_error)?;

    let extent: [f64; 4] = serde_wasm_bindgen::from_value(extent)
        .map_err(|e| OverlayError::Host(format!("Bad frame extent: {}", e)))?;
    let size: [f64; 2] = serde_wasm_bindgen::from_value(size)
        .map_err(|e| OverlayError::Host(format!("Bad frame size: {}", e)))?;

    Ok(FrameState::new(extent, size))
}

fn method(target: &JsValue, name: &str) -> Result<Function, OverlayError> {
    Reflect::get(target, &JsValue::from_str(name))
        .map_err(host_error)?
        .dyn_into::<Function>()
        .map_err(|_| OverlayError::Host(format!("Host map has no '{}' method", name)))
}

pub struct JsHostMap {
    map: JsValue,
    layer_ctor: Function,
    scene: WebScene,
}

impl JsHostMap {
    pub fn new(map: JsValue, layer_ctor: Function, scene: WebScene) -> Self {
        Self {
            map,
            layer_ctor,
            scene,
        }
    }
}

impl HostMap for JsHostMap {
    fn add_layer(&mut self, mut layer: RenderLayer) -> Result<(), OverlayError> {
        let class_name = layer.class_name.clone();
        let z_index = layer.z_index;

        let scene = self.scene.clone();
        let callback = Closure::wrap(Box::new(move |frame_state: JsValue| -> JsValue {
            let id = layer.render_frame(read_frame(&frame_state));
            match scene.element(id) {
                Ok(element) => element.into(),
                Err(e) => {
                    log::error!("Overlay element missing: {}", e);
                    JsValue::UNDEFINED
                }
            }
        }) as Box<dyn FnMut(JsValue) -> JsValue>);

        let options = Object::new();
        Reflect::set(&options, &"className".into(), &class_name.into()).map_err(host_error)?;
        Reflect::set(&options, &"zIndex".into(), &z_index.into()).map_err(host_error)?;
        Reflect::set(&options, &"render".into(), callback.as_ref()).map_err(host_error)?;

        let js_layer =
            Reflect::construct(&self.layer_ctor, &Array::of1(&options)).map_err(host_error)?;
        method(&self.map, "addLayer")?
            .call1(&self.map, &js_layer)
            .map_err(host_error)?;

        // The host map keeps calling the render function for its lifetime.
        callback.forget();
        Ok(())
    }

    fn render(&mut self) {
        match method(&self.map, "render") {
            Ok(render) => {
                if let Err(e) = render.call0(&self.map) {
                    log::warn!("Host map render request failed: {:?}", e);
                }
            }
            Err(e) => log::debug!("{}", e),
        }
    }
}
