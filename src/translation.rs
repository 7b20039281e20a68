//! Translated text keyed by run id, and expansion analysis.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{Document, TextRun};

/// Expansion factors above this are flagged.
pub const MAX_EXPANSION_FACTOR: f32 = 3.0;

/// Expansion factors below this are flagged.
pub const MIN_EXPANSION_FACTOR: f32 = 0.2;

/// Translated text for some of a document's runs.
///
/// An entry takes precedence over `TextRun::translated`; a run with neither
/// is laid out with its source text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Translations {
    entries: BTreeMap<String, String>,
}

impl Translations {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the translations already attached to a document's runs.
    pub fn from_document(document: &Document) -> Self {
        document
            .runs()
            .filter_map(|r| r.translated.as_ref().map(|t| (r.id.clone(), t.clone())))
            .collect()
    }

    /// Add or replace a translation.
    pub fn insert(&mut self, run_id: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(run_id.into(), text.into());
    }

    /// Add a translation, builder style.
    pub fn with(mut self, run_id: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(run_id, text);
        self
    }

    /// Get the translation for a run id.
    pub fn get(&self, run_id: &str) -> Option<&str> {
        self.entries.get(run_id).map(String::as_str)
    }

    /// Check if a run id has a translation.
    pub fn contains(&self, run_id: &str) -> bool {
        self.entries.contains_key(run_id)
    }

    /// Iterate over (run id, text) pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Text to lay out for a run.
    pub fn text_for<'a>(&'a self, run: &'a TextRun) -> &'a str {
        self.get(&run.id).unwrap_or_else(|| run.effective_text())
    }

    /// Check if a run will be laid out with text other than its source.
    pub fn changes(&self, run: &TextRun) -> bool {
        self.text_for(run) != run.text
    }

    /// Compare translated and source lengths for every run.
    pub fn expansion_report(&self, document: &Document) -> ExpansionReport {
        let mut report = ExpansionReport::default();

        for run in document.runs() {
            let translated = self.get(&run.id).or(run.translated.as_deref());
            let Some(translated) = translated.filter(|t| !t.trim().is_empty()) else {
                if !run.text.trim().is_empty() {
                    report.untranslated.push(run.id.clone());
                }
                continue;
            };

            let source_chars = run.text.chars().count();
            let translated_chars = translated.chars().count();
            let factor = translated_chars as f32 / source_chars.max(1) as f32;
            report.runs.push(RunExpansion {
                run_id: run.id.clone(),
                source_chars,
                translated_chars,
                factor,
                extreme: !(MIN_EXPANSION_FACTOR..=MAX_EXPANSION_FACTOR).contains(&factor),
            });
        }

        report.average_factor = if report.runs.is_empty() {
            1.0
        } else {
            report.runs.iter().map(|r| r.factor).sum::<f32>() / report.runs.len() as f32
        };

        report
    }
}

impl FromIterator<(String, String)> for Translations {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Expansion of one translated run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunExpansion {
    pub run_id: String,
    pub source_chars: usize,
    pub translated_chars: usize,
    /// Translated length over source length
    pub factor: f32,
    /// Factor outside the expected range
    pub extreme: bool,
}

/// Length comparison between translations and their sources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpansionReport {
    /// Translated runs, in document order
    pub runs: Vec<RunExpansion>,
    /// Runs with source text but no translation
    pub untranslated: Vec<String>,
    /// Mean factor over translated runs (1.0 when there are none)
    pub average_factor: f32,
}

impl ExpansionReport {
    /// Runs whose factor is out of range.
    pub fn extreme(&self) -> impl Iterator<Item = &RunExpansion> {
        self.runs.iter().filter(|r| r.extreme)
    }

    /// Check if every run is translated with a plausible length.
    pub fn is_clean(&self) -> bool {
        self.untranslated.is_empty() && self.extreme().next().is_none()
    }
}
