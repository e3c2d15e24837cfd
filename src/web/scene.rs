//! [`Scene`] over real DOM and SVG elements.

use std::cell::RefCell;
use std::rc::Rc;

use glam::DVec2;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use crate::error::OverlayError;
use crate::scene::{ElementId, ElementKind, Scene, SceneError, SVG_NS};

fn backend(e: JsValue) -> SceneError {
    SceneError::Backend(format!("{:?}", e))
}

/// DOM-backed scene. Element ids index into a shared element table, so clones
/// see the same elements.
#[derive(Clone)]
pub struct WebScene {
    document: Document,
    elements: Rc<RefCell<Vec<Element>>>,
}

impl WebScene {
    pub fn new() -> Result<Self, OverlayError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| OverlayError::Host("No document available".to_string()))?;

        Ok(Self {
            document,
            elements: Rc::new(RefCell::new(Vec::new())),
        })
    }

    /// Makes an existing element (such as the mount surface) addressable.
    pub fn adopt(&self, element: Element) -> ElementId {
        let mut elements = self.elements.borrow_mut();
        elements.push(element);
        ElementId(elements.len() - 1)
    }

    pub fn element(&self, id: ElementId) -> Result<Element, SceneError> {
        self.elements
            .borrow()
            .get(id.0)
            .cloned()
            .ok_or(SceneError::UnknownElement(id))
    }
}

impl Scene for WebScene {
    fn create_element(
        &self,
        kind: ElementKind,
        parent: Option<ElementId>,
    ) -> Result<ElementId, SceneError> {
        let element = if kind.is_svg() {
            self.document
                .create_element_ns(Some(SVG_NS), kind.tag_name())
                .map_err(backend)?
        } else {
            self.document
                .create_element(kind.tag_name())
                .map_err(backend)?
        };

        if let Some(parent) = parent {
            self.element(parent)?
                .append_child(&element)
                .map_err(backend)?;
        }

        Ok(self.adopt(element))
    }

    fn link(&self, source: ElementId, parent: ElementId) -> Result<ElementId, SceneError> {
        let id = self
            .element(source)?
            .get_attribute("id")
            .ok_or(SceneError::MissingAttribute {
                element: source,
                name: "id".to_string(),
            })?;

        let copy = self.create_element(ElementKind::Use, Some(parent))?;
        self.set_attribute(copy, "href", &format!("#{}", id))?;
        Ok(copy)
    }

    fn set_attribute(&self, element: ElementId, name: &str, value: &str) -> Result<(), SceneError> {
        self.element(element)?
            .set_attribute(name, value)
            .map_err(backend)
    }

    fn attribute(&self, element: ElementId, name: &str) -> Result<Option<String>, SceneError> {
        Ok(self.element(element)?.get_attribute(name))
    }

    fn set_text(&self, element: ElementId, text: &str) -> Result<(), SceneError> {
        self.element(element)?.set_text_content(Some(text));
        Ok(())
    }

    fn set_pixel_size(&self, element: ElementId, size: DVec2) -> Result<(), SceneError> {
        let element = self.element(element)?;
        match element.dyn_ref::<HtmlElement>() {
            Some(html) => {
                let style = html.style();
                style
                    .set_property("width", &format!("{}px", size.x))
                    .map_err(backend)?;
                style
                    .set_property("height", &format!("{}px", size.y))
                    .map_err(backend)
            }
            None => {
                element
                    .set_attribute("width", &size.x.to_string())
                    .map_err(backend)?;
                element
                    .set_attribute("height", &size.y.to_string())
                    .map_err(backend)
            }
        }
    }

    fn measure(&self, element: ElementId) -> Result<DVec2, SceneError> {
        let rect = self.element(element)?.get_bounding_client_rect();
        Ok(DVec2::new(rect.width(), rect.height()))
    }
}
