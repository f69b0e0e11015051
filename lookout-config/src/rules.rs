/// Selector patterns for cookie banners, consent walls, newsletter prompts
/// and generic modal overlays.
///
/// These are deliberately loose (`[class*="modal" i]`); the suppression
/// engine only removes matches that are positioned or stacked above the page.
pub fn default_annoyance_rules() -> Vec<String> {
    [
        // consent managers
        "#onetrust-consent-sdk",
        "#onetrust-banner-sdk",
        "#CybotCookiebotDialog",
        "#usercentrics-root",
        ".fc-consent-root",
        ".qc-cmp2-container",
        "#sp_message_container",
        // cookie / consent / gdpr
        "[id*=\"cookie\" i]",
        "[class*=\"cookie\" i]",
        "[id*=\"consent\" i]",
        "[class*=\"consent\" i]",
        "[class*=\"gdpr\" i]",
        "[id*=\"gdpr\" i]",
        // newsletter / subscribe prompts
        "[class*=\"newsletter\" i]",
        "[class*=\"subscribe\" i]",
        "[id*=\"subscribe\" i]",
        // generic overlays
        "[class*=\"modal\" i]",
        "[id*=\"modal\" i]",
        "[class*=\"popup\" i]",
        "[id*=\"popup\" i]",
        "[class*=\"overlay\" i]",
        "[class*=\"backdrop\" i]",
        "[aria-modal=\"true\"]",
        "[role=\"dialog\"]",
        "[role=\"alertdialog\"]",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_are_unique() {
        let rules = default_annoyance_rules();
        let mut sorted = rules.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), rules.len());
    }
}
