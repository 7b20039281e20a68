//! Text-run types.

use serde::{Deserialize, Serialize};

use super::FontId;

/// A run of text with consistent styling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextRun {
    /// Identifier, unique within the document
    pub id: String,

    /// The source text
    pub text: String,

    /// Translated text (`None` means untranslated)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated: Option<String>,

    /// Font reference into the catalog
    pub font: FontId,

    /// Font size in points
    pub font_size: f32,

    /// Text styling
    #[serde(default)]
    pub style: TextStyle,
}

impl TextRun {
    /// Create a new untranslated text run.
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        font: impl Into<FontId>,
        font_size: f32,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            translated: None,
            font: font.into(),
            font_size,
            style: TextStyle::default(),
        }
    }

    /// Attach a translation.
    pub fn with_translation(mut self, translated: impl Into<String>) -> Self {
        self.translated = Some(translated.into());
        self
    }

    /// Set the style.
    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    /// Text that will be laid out: the translation if any, else the source.
    pub fn effective_text(&self) -> &str {
        self.translated.as_deref().unwrap_or(&self.text)
    }

    /// Check if the translation differs from the source text.
    pub fn is_changed(&self) -> bool {
        self.translated.as_deref().is_some_and(|t| t != self.text)
    }

    /// Check if this run is empty.
    pub fn is_empty(&self) -> bool {
        self.effective_text().is_empty()
    }
}

/// Text styling properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    /// Bold text
    pub bold: bool,

    /// Italic text
    pub italic: bool,

    /// Underlined text
    pub underline: bool,

    /// Text color (hex format, e.g., "#FF0000")
    pub color: Option<String>,
}

impl TextStyle {
    /// Check if any styling is applied.
    pub fn has_styling(&self) -> bool {
        self.bold || self.italic || self.underline
    }
}
