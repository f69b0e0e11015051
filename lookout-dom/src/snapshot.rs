//! Serialized page state produced by the in-page snapshot script.
//!
//! Element rects are viewport-relative to the document that owns them, the
//! way `getBoundingClientRect` reports them inside a frame. `handle` indexes
//! the page-side table of live element references so removals computed
//! against the [`Document`] can be replayed in the browser.
use crate::{ComputedStyle, Document, ElementData, NodeId, Rect, Viewport};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    pub url: String,
    #[serde(default)]
    pub title: String,
    pub viewport: Viewport,
    /// Children of the document node (normally a single `html` element).
    pub children: Vec<SnapshotNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SnapshotNode {
    Element(SnapshotElement),
    Text { text: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotElement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<u32>,
    pub tag: String,
    #[serde(default)]
    pub attrs: Vec<(String, String)>,
    pub rect: Rect,
    #[serde(default)]
    pub style: ComputedStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default)]
    pub children: Vec<SnapshotNode>,
    /// Children of an open shadow root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Vec<SnapshotNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<SnapshotFrame>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SnapshotFrame {
    Loaded {
        url: String,
        #[serde(default)]
        title: String,
        children: Vec<SnapshotNode>,
    },
    /// Reading `contentDocument` threw or returned null.
    Blocked,
}

impl PageSnapshot {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Number of element nodes, frames and shadow trees included.
    pub fn element_count(&self) -> usize {
        fn count(nodes: &[SnapshotNode]) -> usize {
            nodes
                .iter()
                .map(|n| match n {
                    SnapshotNode::Text { .. } => 0,
                    SnapshotNode::Element(e) => {
                        let frame = match &e.frame {
                            Some(SnapshotFrame::Loaded { children, .. }) => count(children),
                            _ => 0,
                        };
                        1 + count(&e.children) + e.shadow.as_deref().map_or(0, count) + frame
                    }
                })
                .sum()
        }
        count(&self.children)
    }
}

impl Document {
    /// Rebuild a document from a browser snapshot.
    pub fn from_snapshot(snapshot: &PageSnapshot) -> Self {
        let mut doc = Document::empty(&snapshot.url, snapshot.viewport);
        let root = doc.root();
        doc.set_title(root, &snapshot.title);
        doc.ingest(root, &snapshot.children);
        doc
    }

    fn ingest(&mut self, parent: NodeId, nodes: &[SnapshotNode]) {
        for node in nodes {
            match node {
                SnapshotNode::Text { text } => {
                    self.append_text(parent, text);
                }
                SnapshotNode::Element(el) => self.ingest_element(parent, el),
            }
        }
    }

    fn ingest_element(&mut self, parent: NodeId, el: &SnapshotElement) {
        let data = ElementData {
            tag: el.tag.to_ascii_lowercase(),
            attrs: el
                .attrs
                .iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), v.clone()))
                .collect(),
            rect: el.rect,
            style: el.style.clone(),
            value: el.value.clone(),
            shadow_root: None,
            frame: None,
        };
        let id = self.insert_element(parent, data, el.handle);
        self.ingest(id, &el.children);

        if let Some(shadow_children) = &el.shadow {
            if let Ok(shadow) = self.attach_shadow_root(id) {
                self.ingest(shadow, shadow_children);
            }
        }
        match &el.frame {
            Some(SnapshotFrame::Loaded {
                url,
                title,
                children,
            }) => {
                if let Ok(content) = self.attach_frame_document(id, url, title, None) {
                    self.ingest(content, children);
                }
            }
            Some(SnapshotFrame::Blocked) => {
                let _ = self.block_frame(id);
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DomError, Position};

    const SNAPSHOT: &str = r#"{
        "url": "https://example.com/",
        "title": "Example",
        "viewport": { "width": 1024, "height": 768, "scrollY": 120 },
        "children": [
            { "kind": "element", "tag": "HTML", "rect": { "x": 0, "y": 0, "width": 1024, "height": 768 },
              "style": { "display": "block" },
              "children": [
                { "kind": "element", "tag": "body", "handle": 1,
                  "rect": { "x": 0, "y": 0, "width": 1024, "height": 768 },
                  "style": { "display": "block" },
                  "children": [
                    { "kind": "element", "tag": "div", "handle": 2,
                      "attrs": [["ID", "banner"], ["class", "cookie"]],
                      "rect": { "x": 0, "y": 700, "width": 1024, "height": 68 },
                      "style": { "display": "block", "position": "fixed", "zIndex": 999 },
                      "children": [ { "kind": "text", "text": "We use cookies" } ] },
                    { "kind": "element", "tag": "iframe", "handle": 3,
                      "rect": { "x": 10, "y": 10, "width": 300, "height": 200 },
                      "frame": { "status": "blocked" } },
                    { "kind": "element", "tag": "x-card", "handle": 4,
                      "rect": { "x": 10, "y": 300, "width": 300, "height": 100 },
                      "shadow": [
                        { "kind": "element", "tag": "button", "handle": 5,
                          "rect": { "x": 20, "y": 310, "width": 80, "height": 30 },
                          "style": { "display": "inline-block", "cursor": "pointer" },
                          "children": [ { "kind": "text", "text": "Buy" } ] }
                      ] }
                  ] }
              ] }
        ]
    }"#;

    #[test]
    fn rebuilds_document_from_snapshot() {
        let snapshot = PageSnapshot::from_json(SNAPSHOT).unwrap();
        assert_eq!(snapshot.element_count(), 6);
        assert_eq!(snapshot.viewport.scroll_y, 120.0);

        let doc = Document::from_snapshot(&snapshot);
        assert_eq!(doc.title(), "Example");
        let body = doc.body();
        assert_eq!(doc.handle(body), Some(1));

        let banner = doc.select(body, "#banner").unwrap()[0];
        let style = &doc.element(banner).unwrap().style;
        assert_eq!(style.position, Position::Fixed);
        assert_eq!(style.z_index, Some(999));
        assert_eq!(doc.inner_text(banner), "We use cookies");

        let frame = doc.select(body, "iframe").unwrap()[0];
        assert!(matches!(doc.frame_document(frame), Err(DomError::CrossOriginFrame(_))));

        let host = doc.select(body, "x-card").unwrap()[0];
        let shadow = doc.shadow_root(host).unwrap();
        let button = doc.select(shadow, "button").unwrap()[0];
        assert_eq!(doc.handle(button), Some(5));
        assert!(doc.element(button).unwrap().style.has_pointer_cursor());
    }
}
