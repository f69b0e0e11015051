use super::{select, ButtonSummary, ContentLink, FormSummary, InputSummary, Links};
use crate::truncate_chars;
use lookout_config::ContentSettings;
use lookout_dom::{Document, ElementData, NodeId, Selector};

const FIELD_SELECTOR: &str = "input, textarea, select";
const SUBMIT_SELECTOR: &str = "button[type=\"submit\"], input[type=\"submit\"], button:not([type])";
const BUTTON_SELECTOR: &str = "button, [role=\"button\"], input[type=\"button\"], input[type=\"submit\"]";
const NAV_SELECTOR: &str =
    "nav, [role=\"navigation\"], header, .nav, .navbar, .menu, .navigation, #nav, #navigation";
const BREADCRUMB_SELECTORS: &[&str] = &[
    "[aria-label*=\"breadcrumb\" i]",
    ".breadcrumb",
    ".breadcrumbs",
    "[class*=\"breadcrumb\"]",
    "nav ol",
    "nav ul",
];

pub(crate) struct Interactions<'a> {
    doc: &'a Document,
    settings: &'a ContentSettings,
}

impl<'a> Interactions<'a> {
    pub(crate) fn new(doc: &'a Document, settings: &'a ContentSettings) -> Self {
        Self { doc, settings }
    }

    fn visible(&self, selector: &str) -> Vec<NodeId> {
        select(self.doc, self.doc.root(), selector)
            .into_iter()
            .filter(|n| self.doc.is_rendered(*n))
            .collect()
    }

    fn trimmed_text(&self, node: NodeId) -> String {
        self.doc.inner_text(node).trim().to_string()
    }

    fn value(el: &ElementData) -> Option<String> {
        el.value
            .clone()
            .or_else(|| el.attr("value").map(str::to_string))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    pub(crate) fn forms(&self) -> Vec<FormSummary> {
        let doc = self.doc;
        self.visible("form")
            .into_iter()
            .filter_map(|form| {
                let fields: Vec<String> = select(doc, form, FIELD_SELECTOR)
                    .into_iter()
                    .filter_map(|f| doc.element(f).map(field_name))
                    .collect();
                if fields.is_empty() {
                    return None;
                }
                let action = select(doc, form, SUBMIT_SELECTOR)
                    .into_iter()
                    .next()
                    .and_then(|submit| {
                        let text = self.trimmed_text(submit);
                        if !text.is_empty() {
                            return Some(text);
                        }
                        doc.element(submit).and_then(Self::value)
                    })
                    .unwrap_or_else(|| "Submit".to_string());
                Some(FormSummary {
                    action,
                    fields: fields.join(", "),
                })
            })
            .collect()
    }

    pub(crate) fn buttons(&self) -> Vec<ButtonSummary> {
        let doc = self.doc;
        self.visible(BUTTON_SELECTOR)
            .into_iter()
            .filter_map(|node| {
                let el = doc.element(node)?;
                let text = Some(self.trimmed_text(node))
                    .filter(|t| !t.is_empty())
                    .or_else(|| Self::value(el))
                    .or_else(|| el.non_empty_attr("aria-label").map(str::to_string))?;
                Some(ButtonSummary {
                    text: truncate_chars(&text, self.settings.label_max_chars),
                    selector: doc.selector_for(node),
                })
            })
            .collect()
    }

    /// Form controls outside any form.
    pub(crate) fn inputs(&self) -> Vec<InputSummary> {
        let doc = self.doc;
        let form: Option<Selector> = "form".parse().ok();
        self.visible(FIELD_SELECTOR)
            .into_iter()
            .filter_map(|node| {
                let el = doc.element(node)?;
                let kind = control_type(el);
                if kind == "hidden" {
                    return None;
                }
                if form.as_ref().is_some_and(|f| doc.closest(node, f).is_some()) {
                    return None;
                }
                let label = ["placeholder", "aria-label", "name", "id"]
                    .into_iter()
                    .find_map(|a| el.non_empty_attr(a))?;
                Some(InputSummary {
                    label: truncate_chars(label, self.settings.label_max_chars),
                    kind,
                    selector: doc.selector_for(node),
                })
            })
            .collect()
    }

    /// Navigation-landmark links and content links, first found first.
    pub(crate) fn links(&self) -> Links {
        let doc = self.doc;
        let cap = self.settings.link_bucket_cap;
        let nav: Option<Selector> = NAV_SELECTOR.parse().ok();
        let mut links = Links::default();

        for node in self.visible("a[href]") {
            if links.navigation.len() >= cap && links.content.len() >= cap {
                break;
            }
            let text = self.trimmed_text(node);
            if text.is_empty() || text.chars().count() > self.settings.link_max_chars {
                continue;
            }
            let in_nav = nav
                .as_ref()
                .is_some_and(|n| doc.ancestors(node).any(|a| n.matches(doc, a)));
            if in_nav {
                if links.navigation.len() < cap {
                    links.navigation.push(text);
                }
            } else if links.content.len() < cap {
                let href = doc.absolute_href(node).unwrap_or_default();
                links.content.push(ContentLink { text, href });
            }
        }
        links
    }

    /// Items of the first visible breadcrumb container that has any.
    pub(crate) fn breadcrumbs(&self) -> Vec<String> {
        let doc = self.doc;
        for selector in BREADCRUMB_SELECTORS {
            for container in self.visible(selector) {
                let mut items = self.texts(select(doc, container, "li"));
                if items.is_empty() {
                    items = self.texts(select(doc, container, "a"));
                }
                if !items.is_empty() {
                    return items;
                }
            }
        }
        Vec::new()
    }

    fn texts(&self, nodes: Vec<NodeId>) -> Vec<String> {
        nodes
            .into_iter()
            .map(|n| self.trimmed_text(n))
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// `type` of an input (lowercase, `text` when absent), or the tag name.
fn control_type(el: &ElementData) -> String {
    if el.tag == "input" {
        el.non_empty_attr("type")
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| "text".to_string())
    } else {
        el.tag.clone()
    }
}

/// Best available field name: name, id, placeholder, then type.
fn field_name(el: &ElementData) -> String {
    ["name", "id", "placeholder"]
        .into_iter()
        .find_map(|a| el.non_empty_attr(a))
        .map(str::to_string)
        .unwrap_or_else(|| control_type(el))
}
