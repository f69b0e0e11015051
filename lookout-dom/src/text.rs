use crate::{Document, NodeId, NodeKind};

const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

pub(crate) fn is_block_tag(tag: &str) -> bool {
    matches!(
        tag,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "body"
            | "dd"
            | "details"
            | "dialog"
            | "div"
            | "dl"
            | "dt"
            | "fieldset"
            | "figcaption"
            | "figure"
            | "footer"
            | "form"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "header"
            | "hr"
            | "html"
            | "main"
            | "nav"
            | "ol"
            | "p"
            | "pre"
            | "section"
            | "summary"
            | "table"
            | "tr"
            | "ul"
    )
}

fn breaks_line(display: &str) -> bool {
    !(display.starts_with("inline") || display == "contents" || display == "none")
}

impl Document {
    /// Rendered text of an element, approximating `HTMLElement.innerText`.
    ///
    /// Hidden subtrees contribute nothing, block boxes start new lines and
    /// runs of whitespace collapse. For an element that is not being
    /// rendered at all, this is its `textContent`.
    pub fn inner_text(&self, id: NodeId) -> String {
        if self.in_display_none(id) {
            return self.text_content(id);
        }
        let mut raw = String::new();
        self.collect_rendered(id, &mut raw);
        raw.split('\n')
            .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn in_display_none(&self, id: NodeId) -> bool {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .any(|a| self.element(a).is_some_and(|el| el.style.is_display_none()))
    }

    fn collect_rendered(&self, id: NodeId, out: &mut String) {
        for &child in self.children(id) {
            match self.kind(child) {
                NodeKind::Text(text) => {
                    let visible = self
                        .element(id)
                        .map_or(true, |el| !el.style.is_hidden());
                    if visible {
                        out.extend(text.chars().map(|c| if c.is_whitespace() { ' ' } else { c }));
                    }
                }
                NodeKind::Element(el) => {
                    if el.style.is_display_none() || SKIPPED_TAGS.contains(&el.tag.as_str()) {
                        continue;
                    }
                    if el.tag == "br" {
                        out.push('\n');
                        continue;
                    }
                    let block = breaks_line(&el.style.display);
                    if block {
                        out.push('\n');
                    } else if matches!(el.tag.as_str(), "td" | "th") {
                        out.push(' ');
                    }
                    self.collect_rendered(child, out);
                    if block {
                        out.push('\n');
                    }
                }
                _ => {}
            }
        }
    }

    /// Concatenated text of every descendant text node.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        for &child in self.children(id) {
            match self.kind(child) {
                NodeKind::Text(text) => out.push_str(text),
                NodeKind::Element(_) => self.collect_text(child, out),
                _ => {}
            }
        }
    }

    /// Serialized markup of the element's children.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.serialize(child, &mut out);
        }
        out
    }

    /// Serialized markup of the element itself.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.serialize(id, &mut out);
        out
    }

    fn serialize(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            NodeKind::Text(text) => escape_into(text, false, out),
            NodeKind::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for (name, value) in &el.attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_into(value, true, out);
                    out.push('"');
                }
                out.push('>');
                if VOID_TAGS.contains(&el.tag.as_str()) {
                    return;
                }
                for &child in self.children(id) {
                    self.serialize(child, out);
                }
                out.push_str("</");
                out.push_str(&el.tag);
                out.push('>');
            }
            _ => {}
        }
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Document, ElementSpec, Viewport, Visibility};

    fn doc() -> Document {
        Document::new("https://example.com/", Viewport::default())
    }

    #[test]
    fn inner_text_breaks_blocks_and_collapses_space() {
        let mut d = doc();
        let body = d.body();
        let article = d.append_element(body, ElementSpec::new("article"));
        let h = d.append_element(article, ElementSpec::new("h1"));
        d.append_text(h, "  Title \n here ");
        let p = d.append_element(article, ElementSpec::new("p"));
        d.append_text(p, "one ");
        let b = d.append_element(p, ElementSpec::new("b"));
        d.append_text(b, "two");
        d.append_text(p, " three");

        assert_eq!(d.inner_text(article), "Title here\none two three");
    }

    #[test]
    fn inner_text_skips_hidden_and_scripts() {
        let mut d = doc();
        let body = d.body();
        let div = d.append_element(body, ElementSpec::new("div"));
        d.append_text(div, "shown");
        let hidden = d.append_element(div, ElementSpec::new("span").visibility(Visibility::Hidden));
        d.append_text(hidden, "ghost");
        let gone = d.append_element(div, ElementSpec::new("p").display("none"));
        d.append_text(gone, "gone");
        let script = d.append_element(div, ElementSpec::new("script"));
        d.append_text(script, "var x = 1;");

        assert_eq!(d.inner_text(div), "shown");
        assert!(d.text_content(div).contains("ghost"));
        assert!(d.text_content(div).contains("var x"));
    }

    #[test]
    fn display_none_root_falls_back_to_text_content() {
        let mut d = doc();
        let body = d.body();
        let div = d.append_element(body, ElementSpec::new("div").display("none"));
        d.append_text(div, " raw  text ");
        assert_eq!(d.inner_text(div), " raw  text ");
    }

    #[test]
    fn html_serialization_escapes_and_closes() {
        let mut d = doc();
        let body = d.body();
        let p = d.append_element(body, ElementSpec::new("p").attr("title", "a \"b\""));
        d.append_text(p, "1 < 2 & 3");
        d.append_element(p, ElementSpec::new("br"));

        assert_eq!(
            d.outer_html(p),
            "<p title=\"a &quot;b&quot;\">1 &lt; 2 &amp; 3<br></p>"
        );
        assert_eq!(d.inner_html(p), "1 &lt; 2 &amp; 3<br>");
    }
}
