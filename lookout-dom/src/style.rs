use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Collapse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

impl Position {
    /// Taken out of normal flow or pinned to the viewport.
    pub fn is_out_of_flow(self) -> bool {
        matches!(self, Position::Absolute | Position::Fixed | Position::Sticky)
    }
}

/// The resolved style values the engines read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComputedStyle {
    pub display: String,
    pub visibility: Visibility,
    pub position: Position,
    /// `None` for `auto`.
    pub z_index: Option<i32>,
    pub cursor: String,
    pub overflow: String,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: "inline".into(),
            visibility: Visibility::Visible,
            position: Position::Static,
            z_index: None,
            cursor: "auto".into(),
            overflow: "visible".into(),
        }
    }
}

impl ComputedStyle {
    pub fn is_display_none(&self) -> bool {
        self.display == "none"
    }

    pub fn is_hidden(&self) -> bool {
        self.visibility != Visibility::Visible
    }

    pub fn has_pointer_cursor(&self) -> bool {
        self.cursor == "pointer"
    }
}

/// Style properties writable through [`crate::Document::set_style`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleProperty {
    Overflow,
    Display,
}

impl StyleProperty {
    pub fn css_name(self) -> &'static str {
        match self {
            StyleProperty::Overflow => "overflow",
            StyleProperty::Display => "display",
        }
    }
}
