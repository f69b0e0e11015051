use anyhow::Result;
use lookout_common::OutputFormat;
use lookout_perception::{ContentRecord, ScanResult, SuppressionReport, summary};
use serde::Serialize;

/// Anything the CLI prints. Text rendering is per type; json and yaml go
/// through serde.
pub(crate) trait Render: Serialize {
    fn to_text(&self) -> String;
}

impl Render for ScanResult {
    fn to_text(&self) -> String {
        summary::render_scan(self)
    }
}

impl Render for ContentRecord {
    fn to_text(&self) -> String {
        summary::render_content(self)
    }
}

impl Render for SuppressionReport {
    fn to_text(&self) -> String {
        let mut out = format!("Removed {} element(s)", self.removed.len());
        if self.scroll_changed {
            out.push_str(", scrolling re-enabled");
        }
        out.push_str(":\n");
        for removed in &self.removed {
            out.push_str(&format!("  {} ({})\n", removed.selector, removed.rule));
        }
        out
    }
}

impl Render for serde_json::Value {
    fn to_text(&self) -> String {
        match self.as_object() {
            Some(map) => map
                .iter()
                .map(|(k, v)| format!("{k}: {v}\n"))
                .collect(),
            None => self.to_string(),
        }
    }
}

pub(crate) fn render<T: Render>(value: &T, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
        OutputFormat::Text => value.to_text(),
    })
}

pub(crate) fn print<T: Render>(value: &T, format: OutputFormat) -> Result<()> {
    let rendered = render(value, format)?;
    println!("{}", rendered.trim_end());
    Ok(())
}
