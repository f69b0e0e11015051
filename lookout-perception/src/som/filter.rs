use super::traversal::Candidate;
use crate::truncate_chars;
use lookout_config::ScanSettings;
use lookout_dom::{Document, ElementData, NodeId, Rect, Viewport};

/// Tags that are kept without any text or label.
const SELF_DESCRIBING_TAGS: &[&str] = &["button", "input", "a", "textarea", "select", "svg"];

/// Why a candidate did not become an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rejection {
    OverCap,
    Hidden,
    TooSmall,
    NoContent,
    OffViewport,
}

/// A candidate that passed every filter.
#[derive(Debug, Clone)]
pub(crate) struct Accepted {
    /// Top-viewport coordinates.
    pub rect: Rect,
    pub text: String,
    pub href: Option<String>,
}

/// Inputs the page treats as search boxes: `type=search`, `name=q`, or an
/// id or class mentioning "search".
pub(crate) fn is_search_input(el: &ElementData) -> bool {
    if el.tag != "input" {
        return false;
    }
    let mentions_search = |name: &str| {
        el.attr(name)
            .is_some_and(|v| v.to_ascii_lowercase().contains("search"))
    };
    el.attr("type").is_some_and(|t| t.eq_ignore_ascii_case("search"))
        || el.attr("name") == Some("q")
        || mentions_search("id")
        || mentions_search("class")
}

pub(crate) struct Filter<'a> {
    doc: &'a Document,
    settings: &'a ScanSettings,
    viewport: Viewport,
}

impl<'a> Filter<'a> {
    pub(crate) fn new(doc: &'a Document, settings: &'a ScanSettings) -> Self {
        Self {
            doc,
            settings,
            viewport: doc.viewport(),
        }
    }

    pub(crate) fn evaluate(&self, candidate: &Candidate, accepted_so_far: usize) -> Result<Accepted, Rejection> {
        if accepted_so_far >= self.settings.max_items {
            return Err(Rejection::OverCap);
        }
        let doc = self.doc;
        let el = doc.element(candidate.node).ok_or(Rejection::Hidden)?;
        let search = is_search_input(el);
        let style = &el.style;

        if style.is_display_none() {
            return Err(Rejection::Hidden);
        }
        if !search {
            if style.is_hidden() {
                return Err(Rejection::Hidden);
            }
            let min = self.settings.min_item_size;
            if !el.rect.at_least(min, min) {
                return Err(Rejection::TooSmall);
            }
        }

        if !SELF_DESCRIBING_TAGS.contains(&el.tag.as_str())
            && el.tag != "img"
            && doc.inner_text(candidate.node).trim().is_empty()
            && el.non_empty_attr("aria-label").is_none()
            && el.non_empty_attr("title").is_none()
        {
            return Err(Rejection::NoContent);
        }

        let local = if search {
            let borrowed = self.search_geometry(candidate.node, el);
            if borrowed.is_empty() {
                return Err(Rejection::TooSmall);
            }
            borrowed
        } else {
            el.rect
        };
        let rect = local.translate(candidate.offset);
        if self.off_viewport(&rect) {
            return Err(Rejection::OffViewport);
        }

        let href = match el.tag.as_str() {
            "a" | "area" => doc.absolute_href(candidate.node),
            _ => None,
        };
        Ok(Accepted {
            rect,
            text: self.display_text(candidate.node, el),
            href,
        })
    }

    /// Tiny search boxes borrow the nearest sizeable ancestor below `body`.
    fn search_geometry(&self, node: NodeId, el: &ElementData) -> Rect {
        let below = self.settings.search_borrow_below;
        if el.rect.width >= below && el.rect.height >= below {
            return el.rect;
        }
        let min = self.settings.search_ancestor_min;
        self.doc
            .ancestors(node)
            .take_while(|a| self.doc.tag(*a) != Some("body"))
            .filter_map(|a| self.doc.element(a))
            .find(|a| a.rect.at_least(min, min) && !a.style.is_display_none())
            .map_or(el.rect, |a| a.rect)
    }

    fn off_viewport(&self, rect: &Rect) -> bool {
        rect.top() > self.viewport.height
            || rect.left() > self.viewport.width
            || rect.bottom() < -self.settings.top_tolerance
            || rect.right() < 0.0
    }

    /// First non-blank of rendered text, raw text, form value, aria-label,
    /// title and alt.
    pub(crate) fn display_text(&self, node: NodeId, el: &ElementData) -> String {
        let doc = self.doc;
        let text = [
            Some(doc.inner_text(node)),
            Some(doc.text_content(node)),
            el.value.clone().or_else(|| el.attr("value").map(str::to_string)),
            el.attr("aria-label").map(str::to_string),
            el.attr("title").map(str::to_string),
            el.attr("alt").map(str::to_string),
        ]
        .into_iter()
        .flatten()
        .map(|t| t.trim().to_string())
        .find(|t| !t.is_empty())
        .unwrap_or_default();
        truncate_chars(&text, self.settings.max_text_chars)
    }
}
