use lookout_config::ScanSettings;
use lookout_dom::{Document, ElementData, NodeId, Offset, Path};
use std::collections::HashSet;

/// An element offered to the filter, with the context it was reached in.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub node: NodeId,
    /// Origin of the owning frame in top-viewport coordinates.
    pub offset: Offset,
    /// Boundaries crossed to reach the element's tree.
    pub prefix: Path,
}

#[derive(Debug, Default)]
pub(crate) struct Discovery {
    /// Unique candidates in discovery order.
    pub candidates: Vec<Candidate>,
    /// Raw offers, duplicates included.
    pub offered: usize,
    pub frames_entered: usize,
    pub frames_skipped: usize,
    pub shadow_roots: usize,
}

const STRUCTURAL_TAGS: &[&str] = &[
    "div", "span", "section", "article", "img", "li", "p", "h1", "h2", "h3", "h4", "h5", "h6",
    "svg", "i",
];

/// Links, buttons, form controls, editable regions, button/link/search
/// roles, test ids, explicit tab stops and inline click handlers.
pub(crate) fn is_semantic(el: &ElementData) -> bool {
    if matches!(el.tag.as_str(), "a" | "button" | "input" | "select" | "textarea") {
        return true;
    }
    if el
        .attr("contenteditable")
        .is_some_and(|v| !v.trim().eq_ignore_ascii_case("false"))
    {
        return true;
    }
    if el.attr("role").is_some_and(|r| {
        let r = r.trim();
        r.eq_ignore_ascii_case("button") || r.eq_ignore_ascii_case("link") || r.eq_ignore_ascii_case("search")
    }) {
        return true;
    }
    el.has_attr("data-testid")
        || el.has_attr("onclick")
        || el
            .attr("tabindex")
            .and_then(|t| t.trim().parse::<i32>().ok())
            .is_some_and(|t| t >= 0)
}

/// Structural elements styled to look clickable.
pub(crate) fn is_pointer_target(el: &ElementData) -> bool {
    STRUCTURAL_TAGS.contains(&el.tag.as_str()) && el.style.has_pointer_cursor()
}

pub(crate) struct Traversal<'a> {
    doc: &'a Document,
    min_frame_size: f64,
    visited: HashSet<NodeId>,
    out: Discovery,
}

impl<'a> Traversal<'a> {
    pub(crate) fn new(doc: &'a Document, settings: &ScanSettings) -> Self {
        Self {
            doc,
            min_frame_size: settings.min_frame_size,
            visited: HashSet::new(),
            out: Discovery::default(),
        }
    }

    /// Walk the whole page starting at the top document.
    pub(crate) fn run(mut self) -> Discovery {
        let root = self.doc.root();
        self.walk(root, Offset::ZERO, &Path::new());
        self.out
    }

    fn walk(&mut self, scope: NodeId, offset: Offset, prefix: &Path) {
        let doc = self.doc;
        let elements = doc.descendant_elements(scope);

        for &node in &elements {
            let Some(el) = doc.element(node) else { continue };
            if el.is_frame() {
                self.enter_frame(node, el, offset, prefix);
            }
            if let Some(shadow) = el.shadow_root {
                self.out.shadow_roots += 1;
                let next = prefix.enter_shadow(doc.selector_for(node));
                self.walk(shadow, offset, &next);
            }
        }

        for &node in &elements {
            let Some(el) = doc.element(node) else { continue };
            if is_semantic(el) {
                self.offer(node, offset, prefix);
            }
            if is_pointer_target(el) {
                self.offer(node, offset, prefix);
            }
        }
    }

    fn enter_frame(&mut self, node: NodeId, el: &ElementData, offset: Offset, prefix: &Path) {
        if !el.rect.at_least(self.min_frame_size, self.min_frame_size) {
            self.out.frames_skipped += 1;
            return;
        }
        match self.doc.frame_document(node) {
            Ok(Some(content)) => {
                self.out.frames_entered += 1;
                let next = prefix.enter_frame(self.doc.selector_for(node));
                self.walk(content, offset.shifted_by(&el.rect), &next);
            }
            Ok(None) => {}
            Err(err) => {
                self.out.frames_skipped += 1;
                tracing::debug!(target: "lookout.som", frame = ?node, error = %err, "som.frame.skip");
            }
        }
    }

    fn offer(&mut self, node: NodeId, offset: Offset, prefix: &Path) {
        self.out.offered += 1;
        if self.visited.insert(node) {
            self.out.candidates.push(Candidate {
                node,
                offset,
                prefix: prefix.clone(),
            });
        }
    }
}
