//! The perception engines: the SoM builder, annoyance suppression and
//! content extraction, all running against a [`lookout_dom::Document`].
//!
//! None of the engines fail. Anything they cannot read (cross-origin frames,
//! malformed rule selectors, detached nodes) is skipped and logged.
pub mod content;
pub mod som;
pub mod summary;
pub mod suppress;

pub use content::{ContentExtractor, ContentRecord};
pub use som::{Marker, ScanDebug, ScanResult, SomBuilder, SomItem};
pub use suppress::{AnnoyanceSuppressor, RemovedElement, SuppressionReport, SuppressorState};

pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::truncate_chars;

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 0), "");
    }
}
