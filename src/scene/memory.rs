//! In-memory scene backend.
//!
//! Keeps a small element tree with attributes and `<use>` links. Used on
//! native targets and by the test suite; clones share one document.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use glam::DVec2;

use super::{ElementId, ElementKind, Scene, SceneError};

#[derive(Debug, Clone)]
struct Node {
    kind: ElementKind,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    attributes: BTreeMap<String, String>,
    text: Option<String>,
    link: Option<ElementId>,
    pixel_size: Option<DVec2>,
}

impl Node {
    fn new(kind: ElementKind, parent: Option<ElementId>) -> Self {
        Self {
            kind,
            parent,
            children: Vec::new(),
            attributes: BTreeMap::new(),
            text: None,
            link: None,
            pixel_size: None,
        }
    }
}

#[derive(Debug, Default)]
struct Document {
    nodes: Vec<Node>,
}

impl Document {
    fn node(&self, id: ElementId) -> Result<&Node, SceneError> {
        self.nodes.get(id.0).ok_or(SceneError::UnknownElement(id))
    }

    fn node_mut(&mut self, id: ElementId) -> Result<&mut Node, SceneError> {
        self.nodes.get_mut(id.0).ok_or(SceneError::UnknownElement(id))
    }

    fn insert(&mut self, node: Node) -> Result<ElementId, SceneError> {
        let id = ElementId(self.nodes.len());
        if let Some(parent) = node.parent {
            self.node_mut(parent)?.children.push(id);
        }
        self.nodes.push(node);
        Ok(id)
    }
}

/// Shared, in-memory element tree implementing [`Scene`].
#[derive(Debug, Clone, Default)]
pub struct MemoryScene {
    document: Rc<RefCell<Document>>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scene with one sized container acting as the drawing surface.
    pub fn with_surface(size: DVec2) -> (Self, ElementId) {
        let scene = Self::new();
        let surface = {
            let mut document = scene.document.borrow_mut();
            let mut node = Node::new(ElementKind::Container, None);
            node.pixel_size = Some(size);
            let id = ElementId(document.nodes.len());
            document.nodes.push(node);
            id
        };
        (scene, surface)
    }

    /// Number of elements created so far.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.document.borrow().nodes.len()
    }

    pub fn kind(&self, element: ElementId) -> Option<ElementKind> {
        self.document.borrow().node(element).ok().map(|n| n.kind)
    }

    pub fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.document.borrow().node(element).ok().and_then(|n| n.parent)
    }

    pub fn children(&self, element: ElementId) -> Vec<ElementId> {
        self.document
            .borrow()
            .node(element)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    pub fn text(&self, element: ElementId) -> Option<String> {
        self.document
            .borrow()
            .node(element)
            .ok()
            .and_then(|n| n.text.clone())
    }

    pub fn pixel_size(&self, element: ElementId) -> Option<DVec2> {
        self.document
            .borrow()
            .node(element)
            .ok()
            .and_then(|n| n.pixel_size)
    }

    /// The element a `<use>` points at, or the element itself.
    pub fn resolve(&self, element: ElementId) -> ElementId {
        self.document
            .borrow()
            .node(element)
            .ok()
            .and_then(|n| n.link)
            .unwrap_or(element)
    }

    /// Children as they render: `<use>` elements show their source's children.
    pub fn rendered_children(&self, element: ElementId) -> Vec<ElementId> {
        self.children(self.resolve(element))
    }

    /// Finds an element by its `id` attribute.
    pub fn element_by_id(&self, id: &str) -> Option<ElementId> {
        self.document
            .borrow()
            .nodes
            .iter()
            .position(|n| n.attributes.get("id").map(String::as_str) == Some(id))
            .map(ElementId)
    }
}

impl Scene for MemoryScene {
    fn create_element(
        &self,
        kind: ElementKind,
        parent: Option<ElementId>,
    ) -> Result<ElementId, SceneError> {
        self.document.borrow_mut().insert(Node::new(kind, parent))
    }

    fn link(&self, source: ElementId, parent: ElementId) -> Result<ElementId, SceneError> {
        let mut document = self.document.borrow_mut();
        let target_id = document
            .node(source)?
            .attributes
            .get("id")
            .cloned()
            .ok_or_else(|| SceneError::MissingAttribute {
                element: source,
                name: "id".to_string(),
            })?;

        let mut node = Node::new(ElementKind::Use, Some(parent));
        node.link = Some(source);
        node.attributes
            .insert("href".to_string(), format!("#{}", target_id));
        document.insert(node)
    }

    fn set_attribute(&self, element: ElementId, name: &str, value: &str) -> Result<(), SceneError> {
        self.document
            .borrow_mut()
            .node_mut(element)?
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn attribute(&self, element: ElementId, name: &str) -> Result<Option<String>, SceneError> {
        Ok(self
            .document
            .borrow()
            .node(element)?
            .attributes
            .get(name)
            .cloned())
    }

    fn set_text(&self, element: ElementId, text: &str) -> Result<(), SceneError> {
        self.document.borrow_mut().node_mut(element)?.text = Some(text.to_string());
        Ok(())
    }

    fn set_pixel_size(&self, element: ElementId, size: DVec2) -> Result<(), SceneError> {
        self.document.borrow_mut().node_mut(element)?.pixel_size = Some(size);
        Ok(())
    }

    /// Explicit pixel size if set; otherwise the element fills its parent.
    fn measure(&self, element: ElementId) -> Result<DVec2, SceneError> {
        let document = self.document.borrow();
        let mut current = Some(element);
        while let Some(id) = current {
            let node = document.node(id)?;
            if let Some(size) = node.pixel_size {
                return Ok(size);
            }
            current = node.parent;
        }
        Ok(DVec2::ZERO)
    }
}
