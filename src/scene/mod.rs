//! Vector-graphics scene abstraction.
//!
//! The overlay never touches a DOM directly. It creates elements and reads
//! and writes attributes through [`Scene`], addressed by opaque
//! [`ElementId`] handles. Implementations share their underlying document
//! between clones, like DOM handles do, so the render callback and the
//! mounting code can both hold one.

mod memory;

pub use memory::MemoryScene;

use glam::DVec2;

/// SVG namespace URI.
pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Handle to an element created through a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

/// Kinds of element the overlay creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Plain HTML block element handed to the host map.
    Container,
    /// Nested `<svg>` viewport.
    Svg,
    /// `<g>` grouping.
    Group,
    /// `<use>` reference to another element.
    Use,
    Path,
    Circle,
    Text,
}

impl ElementKind {
    pub fn tag_name(&self) -> &'static str {
        match self {
            ElementKind::Container => "div",
            ElementKind::Svg => "svg",
            ElementKind::Group => "g",
            ElementKind::Use => "use",
            ElementKind::Path => "path",
            ElementKind::Circle => "circle",
            ElementKind::Text => "text",
        }
    }

    /// Whether the element lives in the SVG namespace.
    pub fn is_svg(&self) -> bool {
        !matches!(self, ElementKind::Container)
    }
}

/// An SVG `viewBox`: top-left corner plus size, in user units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewBox {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewBox {
    pub fn new(min_x: f64, min_y: f64, width: f64, height: f64) -> Self {
        Self {
            min_x,
            min_y,
            width,
            height,
        }
    }

    /// Value for the `viewBox` attribute.
    pub fn to_attribute(&self) -> String {
        format!(
            "{} {} {} {}",
            self.min_x, self.min_y, self.width, self.height
        )
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }
}

/// Errors raised by a scene backend.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneError {
    /// The handle does not belong to this scene.
    UnknownElement(ElementId),
    /// A required attribute was absent.
    MissingAttribute { element: ElementId, name: String },
    /// An attribute held a value that could not be interpreted.
    InvalidAttribute {
        element: ElementId,
        name: String,
        value: String,
    },
    /// The backing document failed.
    Backend(String),
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneError::UnknownElement(id) => write!(f, "Unknown element #{}", id.0),
            SceneError::MissingAttribute { element, name } => {
                write!(f, "Element #{} has no '{}' attribute", element.0, name)
            }
            SceneError::InvalidAttribute {
                element,
                name,
                value,
            } => write!(
                f,
                "Element #{} attribute '{}' has invalid value '{}'",
                element.0, name, value
            ),
            SceneError::Backend(msg) => write!(f, "Scene backend failed: {}", msg),
        }
    }
}

impl std::error::Error for SceneError {}

/// Element creation and attribute access for the overlay's drawing surface.
///
/// Methods take `&self`; implementations use interior mutability, as DOM
/// bindings do. Not `Send`: the scene is only touched from the render thread.
pub trait Scene {
    /// Creates an element, appended to `parent` when given, detached otherwise.
    fn create_element(
        &self,
        kind: ElementKind,
        parent: Option<ElementId>,
    ) -> Result<ElementId, SceneError>;

    /// Creates a `<use>` reference to `source` under `parent`.
    ///
    /// `source` must carry an `id` attribute. The reference renders the
    /// source's current children, so later edits to the source show up in
    /// every reference.
    fn link(&self, source: ElementId, parent: ElementId) -> Result<ElementId, SceneError>;

    fn set_attribute(&self, element: ElementId, name: &str, value: &str) -> Result<(), SceneError>;

    fn attribute(&self, element: ElementId, name: &str) -> Result<Option<String>, SceneError>;

    fn set_text(&self, element: ElementId, text: &str) -> Result<(), SceneError>;

    /// Sets the element's CSS pixel size.
    fn set_pixel_size(&self, element: ElementId, size: DVec2) -> Result<(), SceneError>;

    /// Rendered size of the element in CSS pixels.
    fn measure(&self, element: ElementId) -> Result<DVec2, SceneError>;

    fn set_attributes(&self, element: ElementId, attrs: &[(&str, String)]) -> Result<(), SceneError> {
        for (name, value) in attrs {
            self.set_attribute(element, name, value)?;
        }
        Ok(())
    }

    /// Reads an attribute as a number.
    fn numeric_attribute(&self, element: ElementId, name: &str) -> Result<f64, SceneError> {
        let value = self
            .attribute(element, name)?
            .ok_or_else(|| SceneError::MissingAttribute {
                element,
                name: name.to_string(),
            })?;

        value
            .trim()
            .parse::<f64>()
            .map_err(|_| SceneError::InvalidAttribute {
                element,
                name: name.to_string(),
                value,
            })
    }

    fn set_viewbox(&self, element: ElementId, viewbox: ViewBox) -> Result<(), SceneError> {
        self.set_attribute(element, "viewBox", &viewbox.to_attribute())
    }

    /// Appends a class to the element's `class` attribute.
    fn add_class(&self, element: ElementId, class: &str) -> Result<(), SceneError> {
        let classes = match self.attribute(element, "class")? {
            Some(existing) if existing.split_whitespace().any(|c| c == class) => return Ok(()),
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), class),
            _ => class.to_string(),
        };
        self.set_attribute(element, "class", &classes)
    }
}
