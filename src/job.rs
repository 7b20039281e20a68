//! Job files: everything one reconciliation needs, in one JSON document.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::layout::{Engine, LayoutOptions};
use crate::model::{Document, FontCatalog, LayoutPlan};
use crate::translation::{ExpansionReport, Translations};

/// Inputs of one reconciliation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Job {
    /// The extracted document
    pub document: Document,

    /// Fonts referenced by the document
    pub catalog: FontCatalog,

    /// Translated text keyed by run id
    #[serde(default)]
    pub translations: Translations,

    /// Layout options
    #[serde(default)]
    pub options: LayoutOptions,
}

impl Job {
    /// Create a job with default options and no translations.
    pub fn new(document: Document, catalog: FontCatalog) -> Self {
        Self {
            document,
            catalog,
            ..Self::default()
        }
    }

    /// Parse a job from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let job: Self = serde_json::from_str(json)?;
        job.options.validate()?;
        Ok(job)
    }

    /// Read a job from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading job from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Set the translations.
    pub fn with_translations(mut self, translations: Translations) -> Self {
        self.translations = translations;
        self
    }

    /// Set the options.
    pub fn with_options(mut self, options: LayoutOptions) -> Self {
        self.options = options;
        self
    }

    /// Serialize the job back to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Run the job with its own options.
    pub fn run(&self) -> Result<LayoutPlan> {
        self.run_with(&Engine::new(self.options.clone()))
    }

    /// Run the job on a configured engine (progress, cancellation). The
    /// engine's options are used instead of the job's.
    pub fn run_with(&self, engine: &Engine) -> Result<LayoutPlan> {
        engine.run(&self.document, &self.catalog, &self.translations)
    }

    /// Expansion analysis of the job's translations.
    pub fn expansion_report(&self) -> ExpansionReport {
        self.translations.expansion_report(&self.document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOB: &str = r#"{
        "document": {
            "pages": [{
                "number": 1, "width": 200.0, "height": 200.0,
                "blocks": [{
                    "id": "b1",
                    "bbox": {"x": 10.0, "y": 10.0, "width": 100.0, "height": 20.0},
                    "kind": "paragraph",
                    "runs": [{"id": "r1", "text": "Hello", "font": "Body", "font_size": 10.0}]
                }]
            }]
        },
        "catalog": [{
            "id": "Body", "family": "Body", "weight": 400, "style": "normal",
            "available": true,
            "metrics": {"units_per_em": 1000.0, "ascent": 800.0, "descent": 200.0,
                        "default_advance": 500.0}
        }],
        "translations": {"r1": "Bonjour"},
        "options": {"min_scale": 0.7}
    }"#;

    #[test]
    fn test_parse_and_run() {
        let job = Job::from_json_str(JOB).unwrap();
        assert_eq!(job.options.min_scale, 0.7);
        assert_eq!(job.translations.get("r1"), Some("Bonjour"));

        let plan = job.run().unwrap();
        assert_eq!(plan.pages.len(), 1);
        assert!(plan.is_fully_resolved());
        assert!((job.expansion_report().average_factor - 1.4).abs() < 1e-4);
    }

    #[test]
    fn test_defaults_when_omitted() {
        let job = Job::new(Document::new(), FontCatalog::new());
        let json = job.to_json().unwrap();
        let minimal = r#"{"document": {"pages": []}, "catalog": []}"#;
        let parsed = Job::from_json_str(minimal).unwrap();
        assert!(parsed.translations.is_empty());
        assert_eq!(parsed.options, LayoutOptions::default());
        assert!(Job::from_json_str(&json).is_ok());
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.json");
        std::fs::write(&path, JOB).unwrap();
        assert!(Job::from_path(&path).is_ok());
        assert!(Job::from_path(dir.path().join("absent.json")).is_err());
    }
}
