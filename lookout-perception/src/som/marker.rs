use lookout_dom::{Document, ElementSpec, NodeId, Position, Rect};
use serde::{Deserialize, Serialize};

/// Id of the single overlay container holding every marker.
pub const MARKER_CONTAINER_ID: &str = "agent-som-container";
pub const MARKER_CLASS: &str = "agent-som-marker";
/// Size of the numbered badge drawn at the center of each item.
pub const BADGE_WIDTH: f64 = 24.0;
pub const BADGE_HEIGHT: f64 = 18.0;

/// A numbered overlay for one accepted item, in page coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub id: usize,
    /// Outline around the item.
    pub outline: Rect,
    /// Label box sharing the outline's center.
    pub badge: Rect,
}

impl Marker {
    pub fn for_item(id: usize, rect: Rect) -> Self {
        Self {
            id,
            outline: rect,
            badge: rect.centered(BADGE_WIDTH, BADGE_HEIGHT),
        }
    }
}

/// The marker container of the top document, if one is attached.
pub fn find_container(doc: &Document) -> Option<NodeId> {
    let body = doc.body_of(doc.root())?;
    doc.children(body)
        .iter()
        .copied()
        .find(|c| doc.attr(*c, "id") == Some(MARKER_CONTAINER_ID))
}

/// Whether `node` belongs to the marker overlay.
pub fn is_marker_node(doc: &Document, node: NodeId) -> bool {
    std::iter::once(node)
        .chain(doc.ancestors(node))
        .any(|a| doc.attr(a, "id") == Some(MARKER_CONTAINER_ID))
}

/// Remove a previous scan's overlay. Returns whether one was present.
pub fn clear(doc: &mut Document) -> bool {
    match find_container(doc) {
        Some(container) => doc.remove(container),
        None => false,
    }
}

/// Insert `markers` under a fresh container in the top body.
pub fn draw(doc: &mut Document, markers: &[Marker]) -> Option<NodeId> {
    let body = doc.body_of(doc.root())?;
    let viewport = doc.viewport();
    let container = doc.append_element(
        body,
        ElementSpec::new("div")
            .id(MARKER_CONTAINER_ID)
            .position(Position::Absolute)
            .z_index(i32::MAX)
            .display("block")
            .rect(-viewport.scroll_x, -viewport.scroll_y, 0.0, 0.0),
    );
    for marker in markers {
        // document rects are viewport-relative
        let badge = &marker.badge;
        let node = doc.append_element(
            container,
            ElementSpec::new("div")
                .class(MARKER_CLASS)
                .attr("data-som-id", &marker.id.to_string())
                .position(Position::Absolute)
                .rect(
                    badge.x - viewport.scroll_x,
                    badge.y - viewport.scroll_y,
                    badge.width,
                    badge.height,
                ),
        );
        doc.append_text(node, &marker.id.to_string());
    }
    Some(container)
}
