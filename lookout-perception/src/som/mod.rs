//! Set-of-Marks builder.
//!
//! A scan walks the page (frames and open shadow roots included), offers
//! semantic and pointer-styled elements as candidates, filters them, and
//! numbers the survivors in discovery order. Numbers are only meaningful
//! for the markers drawn by the same scan.
use lookout_config::ScanSettings;
use lookout_dom::{Document, NodeId, Offset, Path, Rect};
use serde::{Deserialize, Serialize};

mod filter;
pub mod marker;
mod traversal;

pub use marker::Marker;

use filter::{Filter, Rejection};
use traversal::Traversal;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// One numbered, actionable element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SomItem {
    pub id: usize,
    /// Uppercase tag name.
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// Page coordinates.
    pub rect: Rect,
    /// Page coordinates.
    pub center: Point,
    /// Relative to the top viewport.
    pub viewport_center: Point,
    pub text: String,
    pub path: Path,
    /// Live-page handle, for snapshots taken from a browser.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<u32>,
    #[serde(skip)]
    pub node: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanDebug {
    /// Accepted items.
    pub total: usize,
    /// Top viewport as `WIDTHxHEIGHT`.
    pub viewport: String,
    /// Raw candidate offers across all frames and shadow roots.
    pub total_candidates: usize,
    /// Candidates left after de-duplication.
    pub processed: usize,
    /// Processed candidates dropped by any filter or the item cap.
    pub filtered: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScanResult {
    pub items: Vec<SomItem>,
    pub debug: ScanDebug,
    #[serde(skip)]
    pub markers: Vec<Marker>,
}

impl ScanResult {
    pub fn item(&self, id: usize) -> Option<&SomItem> {
        self.items.get(id)
    }
}

pub struct SomBuilder<'s> {
    settings: &'s ScanSettings,
}

impl<'s> SomBuilder<'s> {
    pub fn new(settings: &'s ScanSettings) -> Self {
        Self { settings }
    }

    /// Scan the page, replacing any previous marker overlay.
    pub fn scan(&self, doc: &mut Document) -> ScanResult {
        if marker::clear(doc) {
            tracing::debug!(target: "lookout.som", "som.markers.cleared");
        }

        let discovery = Traversal::new(doc, self.settings).run();
        let filter = Filter::new(doc, self.settings);
        let viewport = doc.viewport();
        let scroll = Offset::new(viewport.scroll_x, viewport.scroll_y);

        let mut items: Vec<SomItem> = Vec::new();
        let mut rejected = [0usize; 5];
        for candidate in &discovery.candidates {
            match filter.evaluate(candidate, items.len()) {
                Ok(accepted) => {
                    let id = items.len();
                    let page_rect = accepted.rect.translate(scroll);
                    let selector = doc.selector_for(candidate.node);
                    items.push(SomItem {
                        id,
                        tag: doc
                            .tag(candidate.node)
                            .unwrap_or_default()
                            .to_ascii_uppercase(),
                        href: accepted.href,
                        rect: page_rect,
                        center: page_rect.center().into(),
                        viewport_center: accepted.rect.center().into(),
                        text: accepted.text,
                        path: candidate.prefix.element(selector),
                        handle: doc.handle(candidate.node),
                        node: Some(candidate.node),
                    });
                }
                Err(reason) => rejected[reason as usize] += 1,
            }
        }

        let processed = discovery.candidates.len();
        let stats = ScanDebug {
            total: items.len(),
            viewport: viewport.label(),
            total_candidates: discovery.offered,
            processed,
            filtered: processed - items.len(),
        };
        tracing::info!(
            target: "lookout.som",
            items = stats.total,
            viewport = %stats.viewport,
            candidates = stats.total_candidates,
            processed = stats.processed,
            filtered = stats.filtered,
            frames = discovery.frames_entered,
            frames_skipped = discovery.frames_skipped,
            shadow_roots = discovery.shadow_roots,
            "som.scan"
        );
        tracing::debug!(
            target: "lookout.som",
            over_cap = rejected[Rejection::OverCap as usize],
            hidden = rejected[Rejection::Hidden as usize],
            too_small = rejected[Rejection::TooSmall as usize],
            no_content = rejected[Rejection::NoContent as usize],
            off_viewport = rejected[Rejection::OffViewport as usize],
            "som.scan.rejections"
        );

        let markers: Vec<Marker> = items
            .iter()
            .map(|item| Marker::for_item(item.id, item.rect))
            .collect();
        if self.settings.draw_markers {
            marker::draw(doc, &markers);
        }

        ScanResult {
            items,
            debug: stats,
            markers,
        }
    }
}
