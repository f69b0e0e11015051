use crate::{ComputedStyle, Position, Rect, Visibility};
use serde::{Deserialize, Serialize};

/// Stable handle of a node inside one [`crate::Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) kind: NodeKind,
    /// Index into the live page's handle table, for nodes captured from a browser.
    pub(crate) handle: Option<u32>,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    /// The top document or a frame's content document.
    Document(DocumentData),
    Element(ElementData),
    Text(String),
    ShadowRoot { host: NodeId },
}

#[derive(Debug, Clone, Default)]
pub struct DocumentData {
    pub url: String,
    pub title: String,
    /// Frame element owning this document; `None` for the top document.
    pub owner: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct ElementData {
    /// Lowercase tag name.
    pub tag: String,
    /// Attributes in source order; names are lowercase.
    pub attrs: Vec<(String, String)>,
    /// Border box relative to the owning document's viewport.
    pub rect: Rect,
    pub style: ComputedStyle,
    /// Current value of a form control.
    pub value: Option<String>,
    pub shadow_root: Option<NodeId>,
    pub frame: Option<FrameContent>,
}

impl ElementData {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Attribute value if present and non-blank.
    pub fn non_empty_attr(&self, name: &str) -> Option<&str> {
        self.attr(name).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }

    pub fn is_frame(&self) -> bool {
        matches!(self.tag.as_str(), "iframe" | "frame")
    }
}

/// What a frame element exposes to the traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameContent {
    /// Same-origin content document.
    Loaded(NodeId),
    /// Access throws; the subtree is invisible to us.
    CrossOrigin,
}

/// Element description used to build documents by hand.
///
/// `cursor` and `visibility` inherit from the parent element when not set,
/// the same way computed values do in a browser.
#[derive(Debug, Clone)]
pub struct ElementSpec {
    pub(crate) tag: String,
    pub(crate) attrs: Vec<(String, String)>,
    pub(crate) rect: Rect,
    pub(crate) display: Option<String>,
    pub(crate) visibility: Option<Visibility>,
    pub(crate) position: Position,
    pub(crate) z_index: Option<i32>,
    pub(crate) cursor: Option<String>,
    pub(crate) overflow: Option<String>,
    pub(crate) value: Option<String>,
}

impl ElementSpec {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            rect: Rect::default(),
            display: None,
            visibility: None,
            position: Position::Static,
            z_index: None,
            cursor: None,
            overflow: None,
            value: None,
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        let name = name.to_ascii_lowercase();
        match self.attrs.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => self.attrs.push((name, value.to_string())),
        }
        self
    }

    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    pub fn class(self, class: &str) -> Self {
        self.attr("class", class)
    }

    pub fn rect(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.rect = Rect::new(x, y, width, height);
        self
    }

    pub fn display(mut self, display: &str) -> Self {
        self.display = Some(display.to_string());
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn z_index(mut self, z: i32) -> Self {
        self.z_index = Some(z);
        self
    }

    pub fn cursor(mut self, cursor: &str) -> Self {
        self.cursor = Some(cursor.to_string());
        self
    }

    pub fn overflow(mut self, overflow: &str) -> Self {
        self.overflow = Some(overflow.to_string());
        self
    }

    pub fn value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }

    pub(crate) fn into_element(self, inherited: Option<&ComputedStyle>) -> ElementData {
        let defaults = ComputedStyle::default();
        let display = self
            .display
            .unwrap_or_else(|| default_display(&self.tag).to_string());
        let style = ComputedStyle {
            display,
            visibility: self
                .visibility
                .or(inherited.map(|s| s.visibility))
                .unwrap_or(defaults.visibility),
            position: self.position,
            z_index: self.z_index,
            cursor: self
                .cursor
                .or_else(|| inherited.map(|s| s.cursor.clone()))
                .unwrap_or(defaults.cursor),
            overflow: self.overflow.unwrap_or(defaults.overflow),
        };
        ElementData {
            tag: self.tag,
            attrs: self.attrs,
            rect: self.rect,
            style,
            value: self.value,
            shadow_root: None,
            frame: None,
        }
    }
}

fn default_display(tag: &str) -> &'static str {
    match tag {
        "head" | "script" | "style" | "template" | "title" | "meta" | "link" | "noscript" => "none",
        "input" | "button" | "select" | "textarea" | "img" | "iframe" => "inline-block",
        "li" => "list-item",
        t if crate::text::is_block_tag(t) => "block",
        _ => "inline",
    }
}
