//! Removal of cookie banners, consent walls and modal overlays.
//!
//! A rule is a selector; a match is only removed when it is out of normal
//! flow (absolute, fixed, sticky) or stacked above `min_z_index`, so in-flow
//! content that happens to carry a class like `cookie-info` survives.
//! After every pass scrolling is re-enabled on `html` and `body`.
use crate::som::marker;
use lookout_config::SuppressionSettings;
use lookout_dom::{ComputedStyle, Document, MutationRecord, NodeId, Selector, SelectorError, StyleProperty};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuppressorState {
    #[default]
    Idle,
    Scanning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedElement {
    /// The rule that matched.
    pub rule: String,
    pub selector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<u32>,
    #[serde(skip)]
    pub node: Option<NodeId>,
}

/// What a pass changed, so a live page can be brought in line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuppressionReport {
    pub removed: Vec<RemovedElement>,
    /// Whether any `overflow` style had to be reset.
    pub scroll_changed: bool,
}

impl SuppressionReport {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && !self.scroll_changed
    }

    pub fn handles(&self) -> Vec<u32> {
        self.removed.iter().filter_map(|r| r.handle).collect()
    }

    fn absorb(&mut self, other: SuppressionReport) {
        self.removed.extend(other.removed);
        self.scroll_changed |= other.scroll_changed;
    }
}

#[derive(Debug, Clone)]
struct Rule {
    source: String,
    selector: Selector,
}

#[derive(Debug, Clone)]
pub struct AnnoyanceSuppressor {
    rules: Vec<Rule>,
    invalid: Vec<(String, SelectorError)>,
    min_z_index: i32,
    max_passes: usize,
    state: SuppressorState,
    passes: u64,
}

impl AnnoyanceSuppressor {
    /// Compile the configured rules. Malformed selectors are logged and
    /// left out; the remaining rules still apply.
    pub fn new(settings: &SuppressionSettings) -> Self {
        let mut rules = Vec::with_capacity(settings.rules.len());
        let mut invalid = Vec::new();
        for source in &settings.rules {
            match source.parse::<Selector>() {
                Ok(selector) => rules.push(Rule {
                    source: source.clone(),
                    selector,
                }),
                Err(err) => {
                    tracing::warn!(target: "lookout.suppress", rule = %source, error = %err, "suppress.rule.invalid");
                    invalid.push((source.clone(), err));
                }
            }
        }
        Self {
            rules,
            invalid,
            min_z_index: settings.min_z_index,
            max_passes: settings.max_passes.max(1),
            state: SuppressorState::Idle,
            passes: 0,
        }
    }

    pub fn state(&self) -> SuppressorState {
        self.state
    }

    /// Passes run so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn invalid_rules(&self) -> &[(String, SelectorError)] {
        &self.invalid
    }

    /// Out of normal flow, or stacked above the page.
    pub fn is_overlay(&self, style: &ComputedStyle) -> bool {
        style.position.is_out_of_flow() || style.z_index.is_some_and(|z| z > self.min_z_index)
    }

    /// Start observing the document and run the initial pass.
    ///
    /// Mutations caused by the pass itself are drained so they do not
    /// re-trigger it.
    pub fn attach(&mut self, doc: &mut Document) -> SuppressionReport {
        doc.observe();
        let report = self.run_pass(doc);
        doc.take_mutations();
        tracing::info!(
            target: "lookout.suppress",
            removed = report.removed.len(),
            scroll_changed = report.scroll_changed,
            "suppress.attach"
        );
        report
    }

    /// React to a batch of mutation records: any child-list change under
    /// the top body triggers a full pass.
    pub fn on_mutations(&mut self, doc: &mut Document, records: &[MutationRecord]) -> Option<SuppressionReport> {
        let body = doc.body_of(doc.root())?;
        let relevant = records.iter().any(|r| {
            r.is_child_list()
                && std::iter::once(r.target)
                    .chain(doc.ancestors(r.target))
                    .any(|a| a == body)
        });
        if !relevant {
            return None;
        }
        let report = self.run_pass(doc);
        tracing::debug!(
            target: "lookout.suppress",
            records = records.len(),
            removed = report.removed.len(),
            "suppress.mutations"
        );
        Some(report)
    }

    /// Drain the journal until no pass has anything left to react to, or
    /// `max_passes` passes have run.
    pub fn settle(&mut self, doc: &mut Document) -> SuppressionReport {
        let mut total = SuppressionReport::default();
        for _ in 0..self.max_passes {
            let records = doc.take_mutations();
            if records.is_empty() {
                return total;
            }
            if let Some(report) = self.on_mutations(doc, &records) {
                total.absorb(report);
            }
        }
        if doc.has_pending_mutations() {
            tracing::warn!(
                target: "lookout.suppress",
                max_passes = self.max_passes,
                "suppress.settle.pass_cap"
            );
        }
        total
    }

    /// One synchronous pass over every rule.
    pub fn run_pass(&mut self, doc: &mut Document) -> SuppressionReport {
        self.state = SuppressorState::Scanning;
        self.passes += 1;
        let mut report = SuppressionReport::default();

        let root = doc.root();
        let html = doc.document_element(root);
        let body = doc.body_of(root);

        for rule in &self.rules {
            for node in doc.query_selector_all(root, &rule.selector) {
                if Some(node) == html || Some(node) == body || !doc.is_connected(node) {
                    continue;
                }
                if marker::is_marker_node(doc, node) {
                    continue;
                }
                let Some(style) = doc.element(node).map(|el| &el.style) else {
                    continue;
                };
                if !self.is_overlay(style) {
                    tracing::trace!(target: "lookout.suppress", rule = %rule.source, node = ?node, "suppress.skip.in_flow");
                    continue;
                }
                let selector = doc.selector_for(node);
                let handle = doc.handle(node);
                doc.remove(node);
                tracing::debug!(target: "lookout.suppress", rule = %rule.source, %selector, "suppress.removed");
                report.removed.push(RemovedElement {
                    rule: rule.source.clone(),
                    selector,
                    handle,
                    node: Some(node),
                });
            }
        }

        for target in [html, body].into_iter().flatten() {
            report.scroll_changed |= doc.set_style(target, StyleProperty::Overflow, "auto");
        }

        self.state = SuppressorState::Idle;
        report
    }
}
