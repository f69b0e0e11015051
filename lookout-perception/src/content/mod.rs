//! Readability-style extraction of a page's main content and affordances.
use lookout_config::ContentSettings;
use lookout_dom::{Document, NodeId};
use serde::{Deserialize, Serialize};

mod interactive;
mod main_content;

pub use main_content::{pick_best, text_density};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    pub page_info: PageInfo,
    /// Outline of the main content region, or the body text as a fallback.
    pub main_content: String,
    pub interactive: Interactive,
    pub navigation: Navigation,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interactive {
    pub forms: Vec<FormSummary>,
    pub buttons: Vec<ButtonSummary>,
    pub inputs: Vec<InputSummary>,
    pub links: Links,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSummary {
    /// Submit control label, `Submit` when there is none.
    pub action: String,
    /// Comma-separated field names.
    pub fields: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonSummary {
    pub text: String,
    pub selector: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSummary {
    pub label: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub selector: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Links {
    pub navigation: Vec<String>,
    pub content: Vec<ContentLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentLink {
    pub text: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Navigation {
    pub breadcrumbs: Vec<String>,
}

pub struct ContentExtractor<'s> {
    settings: &'s ContentSettings,
}

impl<'s> ContentExtractor<'s> {
    pub fn new(settings: &'s ContentSettings) -> Self {
        Self { settings }
    }

    pub fn extract(&self, doc: &Document) -> ContentRecord {
        let main = main_content::MainContent::new(doc, self.settings);
        let best = main.best_candidate();
        let main_content = main.outline(best);
        let scan = interactive::Interactions::new(doc, self.settings);

        let record = ContentRecord {
            page_info: PageInfo {
                title: doc.title(),
                url: doc.url().to_string(),
                main_topic: main_topic(doc),
                description: meta_description(doc),
            },
            main_content,
            interactive: Interactive {
                forms: scan.forms(),
                buttons: scan.buttons(),
                inputs: scan.inputs(),
                links: scan.links(),
            },
            navigation: Navigation {
                breadcrumbs: scan.breadcrumbs(),
            },
        };
        tracing::info!(
            target: "lookout.content",
            url = %record.page_info.url,
            main = ?best.map(|n| doc.selector_for(n)),
            chars = record.main_content.chars().count(),
            forms = record.interactive.forms.len(),
            buttons = record.interactive.buttons.len(),
            inputs = record.interactive.inputs.len(),
            nav_links = record.interactive.links.navigation.len(),
            content_links = record.interactive.links.content.len(),
            breadcrumbs = record.navigation.breadcrumbs.len(),
            "content.extract"
        );
        record
    }
}

/// Matches of `selector` under `scope`; a selector that fails to parse is
/// logged and matches nothing.
pub(crate) fn select(doc: &Document, scope: NodeId, selector: &str) -> Vec<NodeId> {
    doc.select(scope, selector).unwrap_or_else(|err| {
        tracing::warn!(target: "lookout.content", %selector, error = %err, "content.selector.invalid");
        Vec::new()
    })
}

fn main_topic(doc: &Document) -> Option<String> {
    ["h1", "h2"].into_iter().find_map(|tag| {
        select(doc, doc.root(), tag)
            .into_iter()
            .next()
            .map(|h| doc.inner_text(h).trim().to_string())
            .filter(|t| !t.is_empty())
    })
}

fn meta_description(doc: &Document) -> Option<String> {
    select(doc, doc.root(), "meta[name=\"description\" i]")
        .into_iter()
        .find_map(|m| doc.element(m)?.non_empty_attr("content").map(str::to_string))
}
