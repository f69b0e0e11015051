//! Plain-text renderings handed to the agent alongside the structured records.
use crate::content::ContentRecord;
use crate::som::ScanResult;
use crate::truncate_chars;
use std::fmt::Write;

const MAX_FORMS: usize = 5;
const MAX_BUTTONS: usize = 10;
const MAX_INPUTS: usize = 10;
const MAX_NAV_LINKS: usize = 8;
const MAX_CONTENT_LINKS: usize = 5;
const MAX_BREADCRUMBS: usize = 6;
const MAX_DESCRIPTION: usize = 200;

const MAX_LISTED_ITEMS: usize = 30;
const PREVIEW_CHARS: usize = 50;

/// Sectioned page summary: page info, main content, interactive elements,
/// links and breadcrumbs.
pub fn render_content(record: &ContentRecord) -> String {
    let mut out: Vec<String> = Vec::new();
    let info = &record.page_info;

    out.push("=== PAGE INFO ===".into());
    out.push(format!("Title: {}", or_na(&info.title)));
    out.push(format!("URL: {}", or_na(&info.url)));
    if let Some(topic) = &info.main_topic {
        out.push(format!("Main Topic: {topic}"));
    }
    if let Some(description) = &info.description {
        out.push(format!("Description: {}", truncate_chars(description, MAX_DESCRIPTION)));
    }

    out.push("\n=== MAIN CONTENT ===".into());
    if record.main_content.is_empty() {
        out.push("(No main content detected)".into());
    } else {
        out.push(record.main_content.clone());
    }

    let interactive = &record.interactive;
    if !interactive.forms.is_empty() || !interactive.buttons.is_empty() || !interactive.inputs.is_empty() {
        out.push("\n=== INTERACTIVE ELEMENTS ===".into());
        if !interactive.forms.is_empty() {
            out.push("\nForms:".into());
            for form in interactive.forms.iter().take(MAX_FORMS) {
                out.push(format!("  • {}: {}", form.action, form.fields));
            }
        }
        if !interactive.buttons.is_empty() {
            out.push("\nButtons:".into());
            for button in interactive.buttons.iter().take(MAX_BUTTONS) {
                out.push(format!("  • \"{}\" → {}", button.text, button.selector));
            }
        }
        if !interactive.inputs.is_empty() {
            out.push("\nInputs:".into());
            for input in interactive.inputs.iter().take(MAX_INPUTS) {
                out.push(format!("  • {} ({}) → {}", input.label, input.kind, input.selector));
            }
        }
    }

    let links = &interactive.links;
    if !links.navigation.is_empty() || !links.content.is_empty() {
        out.push("\nLinks:".into());
        if !links.navigation.is_empty() {
            let nav: Vec<&str> = links
                .navigation
                .iter()
                .take(MAX_NAV_LINKS)
                .map(String::as_str)
                .collect();
            out.push(format!("  Navigation: {}", nav.join(", ")));
        }
        if !links.content.is_empty() {
            out.push("  Content Links:".into());
            for link in links.content.iter().take(MAX_CONTENT_LINKS) {
                out.push(format!("    - {} ({})", link.text, link.href));
            }
        }
    }

    let crumbs = &record.navigation.breadcrumbs;
    if !crumbs.is_empty() {
        out.push("\n=== NAVIGATION ===".into());
        let crumbs: Vec<&str> = crumbs.iter().take(MAX_BREADCRUMBS).map(String::as_str).collect();
        out.push(format!("Breadcrumbs: {}", crumbs.join(" > ")));
    }

    out.join("\n")
}

fn or_na(value: &str) -> &str {
    if value.is_empty() {
        "N/A"
    } else {
        value
    }
}

/// Numbered list of the first scan items with their link targets.
pub fn render_scan(result: &ScanResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Interactive Elements (Total: {}):", result.items.len());
    for item in result.items.iter().take(MAX_LISTED_ITEMS) {
        let mut preview = truncate_chars(&item.text, PREVIEW_CHARS);
        if item.text.chars().count() > PREVIEW_CHARS {
            preview.push_str("...");
        }
        let _ = writeln!(out, "  [{}] {}: {}", item.id, item.tag, preview);
        if let Some(href) = &item.href {
            let _ = writeln!(out, "      → {href}");
        }
    }
    if result.items.len() > MAX_LISTED_ITEMS {
        let _ = writeln!(
            out,
            "  ... and {} more elements",
            result.items.len() - MAX_LISTED_ITEMS
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ButtonSummary, ContentLink, PageInfo};
    use crate::som::{Point, SomItem};
    use lookout_dom::{Path, Rect};

    #[test]
    fn content_summary_sections() {
        let mut record = ContentRecord {
            page_info: PageInfo {
                title: "Docs".into(),
                url: "https://example.com/".into(),
                main_topic: Some("Install".into()),
                description: None,
            },
            ..ContentRecord::default()
        };
        record.interactive.buttons.push(ButtonSummary {
            text: "Go".into(),
            selector: "button#go".into(),
        });
        record.interactive.links.navigation = (0..9).map(|i| format!("N{i}")).collect();
        record.interactive.links.content.push(ContentLink {
            text: "Guide".into(),
            href: "https://example.com/guide".into(),
        });
        record.navigation.breadcrumbs = vec!["Home".into(), "Docs".into()];

        let text = render_content(&record);
        assert!(text.starts_with("=== PAGE INFO ===\nTitle: Docs\nURL: https://example.com/\nMain Topic: Install"));
        assert!(text.contains("(No main content detected)"));
        assert!(text.contains("Buttons:\n  • \"Go\" → button#go"));
        assert!(!text.contains("Forms:"));
        assert!(text.contains("  Navigation: N0, N1, N2, N3, N4, N5, N6, N7\n"));
        assert!(text.contains("    - Guide (https://example.com/guide)"));
        assert!(text.ends_with("Breadcrumbs: Home > Docs"));
    }

    #[test]
    fn scan_summary_lists_first_thirty() {
        let items = (0..32)
            .map(|id| SomItem {
                id,
                tag: "A".into(),
                href: (id == 0).then(|| "https://example.com/x".to_string()),
                rect: Rect::default(),
                center: Point::default(),
                viewport_center: Point::default(),
                text: if id == 1 { "y".repeat(60) } else { format!("link {id}") },
                path: Path::new().element("a"),
                handle: None,
                node: None,
            })
            .collect();
        let result = ScanResult {
            items,
            ..ScanResult::default()
        };
        let text = render_scan(&result);
        assert!(text.starts_with("Interactive Elements (Total: 32):\n  [0] A: link 0\n      → https://example.com/x\n"));
        assert!(text.contains(&format!("  [1] A: {}...\n", "y".repeat(50))));
        assert!(!text.contains("[30]"));
        assert!(text.ends_with("  ... and 2 more elements\n"));
    }
}
