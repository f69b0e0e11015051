use crate::mutation::Journal;
use crate::selector::escape_ident;
use crate::node::Node;
use crate::{
    ComputedStyle, DocumentData, DomError, ElementData, ElementSpec, FrameContent,
    MutationKind, MutationRecord, NodeId, NodeKind, Rect, Selector, SelectorError,
    StyleProperty, Viewport,
};
use url::Url;

/// Arena of nodes making up one page state.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    viewport: Viewport,
    journal: Journal,
}

impl Document {
    /// A top document with `html`, `head` and a viewport-sized `body`.
    pub fn new(url: &str, viewport: Viewport) -> Self {
        let mut doc = Self::empty(url, viewport);
        let root = doc.root;
        doc.scaffold(root, Rect::new(0.0, 0.0, viewport.width, viewport.height));
        doc
    }

    /// A top document node with no children.
    pub fn empty(url: &str, viewport: Viewport) -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            viewport,
            journal: Journal::default(),
        };
        doc.root = doc.push(
            None,
            NodeKind::Document(DocumentData {
                url: url.to_string(),
                ..DocumentData::default()
            }),
            None,
        );
        doc
    }

    fn scaffold(&mut self, doc_node: NodeId, rect: Rect) {
        let html = self.append_element(
            doc_node,
            ElementSpec::new("html").rect(rect.x, rect.y, rect.width, rect.height),
        );
        self.append_element(html, ElementSpec::new("head"));
        self.append_element(
            html,
            ElementSpec::new("body").rect(rect.x, rect.y, rect.width, rect.height),
        );
    }

    pub(crate) fn push(&mut self, parent: Option<NodeId>, kind: NodeKind, handle: Option<u32>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            kind,
            handle,
        });
        if let Some(p) = parent {
            self.nodes[p.0].children.push(id);
        }
        id
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    // ---------------------------------------------------------------------
    // construction
    // ---------------------------------------------------------------------

    /// Append an element under `parent` (an element, shadow root or document).
    pub fn append_element(&mut self, parent: NodeId, spec: ElementSpec) -> NodeId {
        let inherited = self.inherited_style(parent).cloned();
        let data = spec.into_element(inherited.as_ref());
        self.insert_element(parent, data, None)
    }

    /// Append an element whose style is already fully computed.
    pub(crate) fn insert_element(&mut self, parent: NodeId, data: ElementData, handle: Option<u32>) -> NodeId {
        let id = self.push(Some(parent), NodeKind::Element(data), handle);
        self.journal.push(MutationRecord {
            target: parent,
            kind: MutationKind::ChildList {
                added: vec![id],
                removed: Vec::new(),
            },
        });
        id
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push(Some(parent), NodeKind::Text(text.to_string()), None)
    }

    /// Attach an (open) shadow root to `host` and return it.
    pub fn attach_shadow_root(&mut self, host: NodeId) -> Result<NodeId, DomError> {
        if self.element(host).is_none() {
            return Err(DomError::NotAnElement(host));
        }
        let shadow = self.push(None, NodeKind::ShadowRoot { host }, None);
        if let Some(el) = self.element_mut(host) {
            el.shadow_root = Some(shadow);
        }
        Ok(shadow)
    }

    /// Give `frame` a same-origin content document (with `html`/`head`/`body`)
    /// sized to the frame and return the document node.
    pub fn attach_frame(&mut self, frame: NodeId, url: &str) -> Result<NodeId, DomError> {
        let rect = self.element(frame).ok_or(DomError::NotAnElement(frame))?.rect;
        let content = self.attach_frame_document(frame, url, "", None)?;
        self.scaffold(content, Rect::new(0.0, 0.0, rect.width, rect.height));
        Ok(content)
    }

    pub(crate) fn attach_frame_document(
        &mut self,
        frame: NodeId,
        url: &str,
        title: &str,
        handle: Option<u32>,
    ) -> Result<NodeId, DomError> {
        if self.element(frame).is_none() {
            return Err(DomError::NotAnElement(frame));
        }
        let content = self.push(
            None,
            NodeKind::Document(DocumentData {
                url: url.to_string(),
                title: title.to_string(),
                owner: Some(frame),
            }),
            handle,
        );
        if let Some(el) = self.element_mut(frame) {
            el.frame = Some(FrameContent::Loaded(content));
        }
        Ok(content)
    }

    /// Mark `frame` as cross-origin: its content can never be read.
    pub fn block_frame(&mut self, frame: NodeId) -> Result<(), DomError> {
        let el = self.element_mut(frame).ok_or(DomError::NotAnElement(frame))?;
        el.frame = Some(FrameContent::CrossOrigin);
        Ok(())
    }

    pub(crate) fn set_title(&mut self, doc_node: NodeId, title: &str) {
        if let NodeKind::Document(data) = &mut self.nodes[doc_node.0].kind {
            data.title = title.to_string();
        }
    }

    fn inherited_style(&self, parent: NodeId) -> Option<&ComputedStyle> {
        match &self.node(parent).kind {
            NodeKind::Element(el) => Some(&el.style),
            NodeKind::ShadowRoot { host } => self.element(*host).map(|el| &el.style),
            _ => None,
        }
    }

    // ---------------------------------------------------------------------
    // accessors
    // ---------------------------------------------------------------------

    /// The top document node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes.get(id.0)?.kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub(crate) fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes.get_mut(id.0)?.kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.attr(name))
    }

    pub fn handle(&self, id: NodeId) -> Option<u32> {
        self.node(id).handle
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Parent if it is an element (stops at shadow roots and documents).
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|p| self.is_element(*p))
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Element ancestors within the same tree, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent_element(id), move |p| self.parent_element(*p))
    }

    /// Descendant elements of `scope` in document order, not crossing shadow
    /// or frame boundaries. `scope` itself is excluded.
    pub fn descendant_elements(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if self.is_element(id) {
                out.push(id);
                stack.extend(self.children(id).iter().rev().copied());
            }
        }
        out
    }

    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        self.element(host).and_then(|el| el.shadow_root)
    }

    /// Content document of a frame element.
    ///
    /// `Ok(None)` for non-frames, an error for cross-origin frames.
    pub fn frame_document(&self, frame: NodeId) -> Result<Option<NodeId>, DomError> {
        match self.element(frame).and_then(|el| el.frame) {
            Some(FrameContent::Loaded(doc)) => Ok(Some(doc)),
            Some(FrameContent::CrossOrigin) => Err(DomError::CrossOriginFrame(frame)),
            None => Ok(None),
        }
    }

    pub fn document_data(&self, doc_node: NodeId) -> Option<&DocumentData> {
        match &self.node(doc_node).kind {
            NodeKind::Document(data) => Some(data),
            _ => None,
        }
    }

    /// The document (top or frame) a node belongs to.
    pub fn owner_document(&self, id: NodeId) -> NodeId {
        let mut cur = id;
        loop {
            match &self.node(cur).kind {
                NodeKind::Document(_) => return cur,
                NodeKind::ShadowRoot { host } => cur = *host,
                _ => match self.parent(cur) {
                    Some(p) => cur = p,
                    // detached subtree; attribute it to the top document
                    None => return self.root,
                },
            }
        }
    }

    /// The `html` element of a document node.
    pub fn document_element(&self, doc_node: NodeId) -> Option<NodeId> {
        self.children(doc_node)
            .iter()
            .copied()
            .find(|c| self.tag(*c) == Some("html"))
    }

    /// The `body` element of a document node.
    pub fn body_of(&self, doc_node: NodeId) -> Option<NodeId> {
        let html = self.document_element(doc_node)?;
        self.children(html)
            .iter()
            .copied()
            .find(|c| self.tag(*c) == Some("body"))
    }

    /// The top document's `body`.
    ///
    /// # Panics
    /// If the document was built with [`Document::empty`] and never given a body.
    pub fn body(&self) -> NodeId {
        self.body_of(self.root)
            .expect("document has no body element")
    }

    pub fn url(&self) -> &str {
        self.document_data(self.root)
            .map(|d| d.url.as_str())
            .unwrap_or_default()
    }

    /// Document title, falling back to the `<title>` element.
    pub fn title(&self) -> String {
        if let Some(data) = self.document_data(self.root) {
            if !data.title.trim().is_empty() {
                return data.title.trim().to_string();
            }
        }
        self.descendant_elements(self.root)
            .into_iter()
            .find(|id| self.tag(*id) == Some("title"))
            .map(|id| self.text_content(id).trim().to_string())
            .unwrap_or_default()
    }

    /// Still reachable from the top document.
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut cur = id;
        loop {
            if cur == self.root {
                return true;
            }
            let next = match &self.node(cur).kind {
                NodeKind::ShadowRoot { host } => Some(*host),
                NodeKind::Document(data) => data.owner,
                _ => self.parent(cur),
            };
            match next {
                Some(n) => cur = n,
                None => return false,
            }
        }
    }

    /// Display is not `none`, visibility is `visible`, and the box has area.
    pub fn is_rendered(&self, id: NodeId) -> bool {
        self.element(id).is_some_and(|el| {
            !el.style.is_display_none() && !el.style.is_hidden() && !el.rect.is_empty()
        })
    }

    /// `href` resolved against the owning document's URL.
    pub fn absolute_href(&self, id: NodeId) -> Option<String> {
        let raw = self.attr(id, "href")?.trim();
        if raw.is_empty() {
            return None;
        }
        let base = self
            .document_data(self.owner_document(id))
            .map(|d| d.url.as_str())
            .unwrap_or_default();
        match Url::parse(base).and_then(|b| b.join(raw)) {
            Ok(url) => Some(url.to_string()),
            Err(_) => Some(raw.to_string()),
        }
    }

    /// Best-effort readable locator: tag plus `#id`, else up to two classes.
    pub fn selector_for(&self, id: NodeId) -> String {
        let Some(el) = self.element(id) else {
            return String::new();
        };
        let mut selector = el.tag.clone();
        if let Some(dom_id) = el.non_empty_attr("id") {
            selector.push('#');
            selector.push_str(&escape_ident(dom_id));
        } else {
            // utility variants like `md:flex` are too unstable to locate by
            for class in el.classes().filter(|c| !c.contains(':')).take(2) {
                selector.push('.');
                selector.push_str(&escape_ident(class));
            }
        }
        selector
    }

    // ---------------------------------------------------------------------
    // queries
    // ---------------------------------------------------------------------

    pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        selector.matches(self, id)
    }

    /// Matching descendants of `scope` in document order.
    pub fn query_selector_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendant_elements(scope)
            .into_iter()
            .filter(|id| selector.matches(self, *id))
            .collect()
    }

    pub fn query_selector(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendant_elements(scope)
            .into_iter()
            .find(|id| selector.matches(self, *id))
    }

    /// Parse `selector` and run [`Document::query_selector_all`].
    pub fn select(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        let selector: Selector = selector.parse()?;
        Ok(self.query_selector_all(scope, &selector))
    }

    /// Nearest inclusive ancestor matching `selector`.
    pub fn closest(&self, id: NodeId, selector: &Selector) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|a| selector.matches(self, *a))
    }

    // ---------------------------------------------------------------------
    // mutation
    // ---------------------------------------------------------------------

    /// Start recording mutations into the journal.
    pub fn observe(&mut self) {
        self.journal.observing = true;
    }

    pub fn is_observing(&self) -> bool {
        self.journal.observing
    }

    /// Drain recorded mutations.
    pub fn take_mutations(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.journal.records)
    }

    pub fn has_pending_mutations(&self) -> bool {
        !self.journal.records.is_empty()
    }

    /// Detach `id` from its parent. Returns `false` if it was already detached.
    pub fn remove(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.node(id).parent else {
            return false;
        };
        self.nodes[parent.0].children.retain(|c| *c != id);
        self.nodes[id.0].parent = None;
        self.journal.push(MutationRecord {
            target: parent,
            kind: MutationKind::ChildList {
                added: Vec::new(),
                removed: vec![id],
            },
        });
        true
    }

    /// Write a style property; only an actual change is journaled.
    pub fn set_style(&mut self, id: NodeId, property: StyleProperty, value: &str) -> bool {
        let Some(el) = self.element_mut(id) else {
            return false;
        };
        let slot = match property {
            StyleProperty::Overflow => &mut el.style.overflow,
            StyleProperty::Display => &mut el.style.display,
        };
        if slot == value {
            return false;
        }
        *slot = value.to_string();
        self.journal.push(MutationRecord {
            target: id,
            kind: MutationKind::Attribute {
                name: format!("style.{}", property.css_name()),
            },
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Position, Visibility};

    fn doc() -> Document {
        Document::new("https://example.com/a/b.html", Viewport::new(800.0, 600.0))
    }

    #[test]
    fn scaffold_has_body_sized_to_viewport() {
        let d = doc();
        let body = d.body();
        assert_eq!(d.tag(body), Some("body"));
        assert_eq!(d.element(body).unwrap().rect, Rect::new(0.0, 0.0, 800.0, 600.0));
    }

    #[test]
    fn cursor_and_visibility_inherit() {
        let mut d = doc();
        let body = d.body();
        let outer = d.append_element(
            body,
            ElementSpec::new("div").cursor("pointer").visibility(Visibility::Hidden),
        );
        let inner = d.append_element(outer, ElementSpec::new("span"));
        let style = &d.element(inner).unwrap().style;
        assert_eq!(style.cursor, "pointer");
        assert_eq!(style.visibility, Visibility::Hidden);
        assert_eq!(style.position, Position::Static);
    }

    #[test]
    fn descendants_do_not_cross_shadow_or_frames() {
        let mut d = doc();
        let body = d.body();
        let host = d.append_element(body, ElementSpec::new("x-card"));
        let shadow = d.attach_shadow_root(host).unwrap();
        d.append_element(shadow, ElementSpec::new("button"));
        let frame = d.append_element(body, ElementSpec::new("iframe").rect(0.0, 0.0, 100.0, 100.0));
        let inner = d.attach_frame(frame, "https://example.com/f").unwrap();
        d.append_element(d.body_of(inner).unwrap(), ElementSpec::new("a"));

        let tags: Vec<_> = d
            .descendant_elements(body)
            .into_iter()
            .filter_map(|id| d.tag(id))
            .collect();
        assert_eq!(tags, vec!["x-card", "iframe"]);
    }

    #[test]
    fn owner_document_walks_through_shadow_hosts() {
        let mut d = doc();
        let frame = d.append_element(d.body(), ElementSpec::new("iframe"));
        let inner = d.attach_frame(frame, "https://other.example/").unwrap();
        let host = d.append_element(d.body_of(inner).unwrap(), ElementSpec::new("x-widget"));
        let shadow = d.attach_shadow_root(host).unwrap();
        let link = d.append_element(shadow, ElementSpec::new("a").attr("href", "/next"));

        assert_eq!(d.owner_document(link), inner);
        assert_eq!(d.absolute_href(link).as_deref(), Some("https://other.example/next"));
        assert!(d.is_connected(link));
    }

    #[test]
    fn cross_origin_frame_access_fails() {
        let mut d = doc();
        let frame = d.append_element(d.body(), ElementSpec::new("iframe"));
        d.block_frame(frame).unwrap();
        assert!(matches!(d.frame_document(frame), Err(DomError::CrossOriginFrame(f)) if f == frame));
    }

    #[test]
    fn selector_for_prefers_id_then_two_classes() {
        let mut d = doc();
        let body = d.body();
        let a = d.append_element(body, ElementSpec::new("div").id("main").class("x y"));
        let b = d.append_element(body, ElementSpec::new("div").class("md:flex card big wide"));
        let c = d.append_element(body, ElementSpec::new("SPAN"));
        assert_eq!(d.selector_for(a), "div#main");
        assert_eq!(d.selector_for(b), "div.card.big");
        assert_eq!(d.selector_for(c), "span");
    }

    #[test]
    fn journal_records_only_while_observing() {
        let mut d = doc();
        let body = d.body();
        let early = d.append_element(body, ElementSpec::new("div"));
        assert!(!d.has_pending_mutations());

        d.observe();
        let late = d.append_element(body, ElementSpec::new("div"));
        assert!(d.remove(early));
        assert!(!d.remove(early));
        let records = d.take_mutations();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.is_child_list() && r.target == body));
        assert!(d.is_connected(late));
        assert!(!d.is_connected(early));
    }

    #[test]
    fn style_writes_are_journaled_only_on_change() {
        let mut d = doc();
        let body = d.body();
        d.observe();
        assert!(d.set_style(body, StyleProperty::Overflow, "auto"));
        assert!(!d.set_style(body, StyleProperty::Overflow, "auto"));
        let records = d.take_mutations();
        assert_eq!(records.len(), 1);
        assert!(!records[0].is_child_list());
    }

    #[test]
    fn title_falls_back_to_title_element() {
        let mut d = doc();
        let head = d.children(d.document_element(d.root()).unwrap())[0];
        let title = d.append_element(head, ElementSpec::new("title"));
        d.append_text(title, "  Hello  ");
        assert_eq!(d.title(), "Hello");
    }

    #[test]
    fn clones_keep_separate_journals() {
        let mut d = doc();
        let body = d.body();
        d.observe();
        d.append_element(body, ElementSpec::new("div"));

        let mut copy = d.clone();
        assert!(copy.is_observing());
        assert_eq!(copy.take_mutations().len(), 1);
        assert!(d.has_pending_mutations());

        copy.append_element(body, ElementSpec::new("span"));
        assert_eq!(d.take_mutations().len(), 1);
        assert_eq!(copy.take_mutations().len(), 1);
    }

    #[test]
    fn selector_for_escapes_generated_ids() {
        let mut d = doc();
        let body = d.body();
        let button = d.append_element(body, ElementSpec::new("button").id(":r1:"));
        let chip = d.append_element(body, ElementSpec::new("span").class("w-1/2 md:flex"));

        let selector = d.selector_for(button);
        assert_eq!(selector, "button#\\:r1\\:");
        assert_eq!(d.query_selector(d.root(), &selector.parse().unwrap()), Some(button));
        assert_eq!(d.selector_for(chip), "span.w-1\\/2");
    }
}
