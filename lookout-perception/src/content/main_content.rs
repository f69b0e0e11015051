use super::select;
use crate::truncate_chars;
use lookout_config::ContentSettings;
use lookout_dom::{Document, NodeId};

const MAIN_SELECTORS: &[&str] = &[
    "main",
    "article",
    "[role=\"main\"]",
    "#content",
    "#main",
    ".content",
    ".main-content",
    ".post-content",
    ".article-body",
    ".entry-content",
    "#main-content",
    ".post",
    ".article",
];

const FALLBACK_SELECTOR: &str = "div, section";

const OUTLINE_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6", "p", "li", "blockquote"];

/// Rendered text characters per character of markup.
pub fn text_density(text_chars: usize, html_chars: usize) -> f64 {
    text_chars as f64 / (html_chars as f64 + 1.0)
}

/// Highest-scoring node; equal scores go to the earlier entry.
pub fn pick_best(scored: &[(NodeId, f64)]) -> Option<NodeId> {
    let mut ranked: Vec<&(NodeId, f64)> = scored.iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.first().map(|(node, _)| *node)
}

pub(crate) struct MainContent<'a> {
    doc: &'a Document,
    settings: &'a ContentSettings,
}

impl<'a> MainContent<'a> {
    pub(crate) fn new(doc: &'a Document, settings: &'a ContentSettings) -> Self {
        Self { doc, settings }
    }

    /// Visible elements from the likely-main selectors with enough text,
    /// or generic blocks with more text when none qualify.
    pub(crate) fn candidates(&self) -> Vec<NodeId> {
        let primary = self.collect(MAIN_SELECTORS, self.settings.main_min_chars);
        if !primary.is_empty() {
            return primary;
        }
        self.collect(&[FALLBACK_SELECTOR], self.settings.fallback_min_chars)
    }

    fn collect(&self, selectors: &[&str], min_chars: usize) -> Vec<NodeId> {
        let doc = self.doc;
        let mut out: Vec<NodeId> = Vec::new();
        for selector in selectors {
            for node in select(doc, doc.root(), selector) {
                if out.contains(&node) || !doc.is_rendered(node) {
                    continue;
                }
                if doc.inner_text(node).trim().chars().count() > min_chars {
                    out.push(node);
                }
            }
        }
        out
    }

    /// Trimmed text length times text density.
    pub(crate) fn score(&self, node: NodeId) -> f64 {
        let text = self.doc.inner_text(node);
        let trimmed = text.trim().chars().count();
        let html = self.doc.inner_html(node).chars().count();
        trimmed as f64 * text_density(text.chars().count(), html)
    }

    pub(crate) fn best_candidate(&self) -> Option<NodeId> {
        let scored: Vec<(NodeId, f64)> = self
            .candidates()
            .into_iter()
            .map(|node| (node, self.score(node)))
            .collect();
        tracing::debug!(target: "lookout.content", candidates = scored.len(), "content.main.candidates");
        pick_best(&scored)
    }

    /// Headings, paragraphs, list items and quotes under `best`, or the
    /// body text when there is no candidate.
    pub(crate) fn outline(&self, best: Option<NodeId>) -> String {
        let doc = self.doc;
        let max = self.settings.outline_max_chars;
        let Some(best) = best else {
            let body_text = doc
                .body_of(doc.root())
                .map(|b| doc.inner_text(b))
                .unwrap_or_default();
            return truncate_chars(body_text.trim(), max);
        };

        let lines: Vec<String> = doc
            .descendant_elements(best)
            .into_iter()
            .filter_map(|node| {
                let tag = doc.tag(node)?;
                if !OUTLINE_TAGS.contains(&tag) {
                    return None;
                }
                let text = doc.inner_text(node);
                let text = text.trim();
                if text.chars().count() <= self.settings.outline_min_chars {
                    return None;
                }
                Some(match tag {
                    "li" => format!("• {text}"),
                    "p" | "blockquote" => text.to_string(),
                    _ => format!("# {text}"),
                })
            })
            .collect();

        if lines.is_empty() {
            return truncate_chars(doc.inner_text(best).trim(), max);
        }
        truncate_chars(&lines.join("\n"), max)
    }
}
