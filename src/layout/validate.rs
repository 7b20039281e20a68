//! Structural checks run before any page is processed.

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::model::{Document, FontCatalog};
use crate::translation::Translations;

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

/// Check that a job's inputs are well formed.
///
/// Fails with `InvalidDocumentStructure` on malformed pages, blocks, runs or
/// orphan translations, and with `FontNotFound` when a run names a font the
/// catalog has never heard of, or names a missing font while no font at all
/// is available to stand in for it.
pub fn validate(
    document: &Document,
    catalog: &FontCatalog,
    translations: &Translations,
) -> Result<()> {
    let mut run_ids = HashSet::new();
    let mut page_numbers = HashSet::new();
    let mut needs_substitute = None;

    for page in &document.pages {
        if page.number == 0 {
            return Err(Error::structure("page numbers start at 1"));
        }
        if !page_numbers.insert(page.number) {
            return Err(Error::structure(format!(
                "duplicate page number {}",
                page.number
            )));
        }
        if !positive(page.width) || !positive(page.height) {
            return Err(Error::structure(format!(
                "page {} has invalid size {}x{}",
                page.number, page.width, page.height
            )));
        }

        let mut block_ids = HashSet::new();
        for block in &page.blocks {
            if !block_ids.insert(block.id.as_str()) {
                return Err(Error::structure(format!(
                    "duplicate block id '{}' on page {}",
                    block.id, page.number
                )));
            }
            if !block.bbox.is_valid() {
                return Err(Error::structure(format!(
                    "block '{}' on page {} has an invalid bounding box",
                    block.id, page.number
                )));
            }

            for run in &block.runs {
                if !run_ids.insert(run.id.as_str()) {
                    return Err(Error::structure(format!("duplicate run id '{}'", run.id)));
                }
                if !positive(run.font_size) {
                    return Err(Error::structure(format!(
                        "run '{}' has invalid font size {}",
                        run.id, run.font_size
                    )));
                }
                match catalog.get(&run.font) {
                    None => return Err(Error::FontNotFound(run.font.to_string())),
                    Some(font) if !font.is_usable() => {
                        needs_substitute.get_or_insert_with(|| font.id.clone());
                    }
                    Some(_) => {}
                }
            }
        }
    }

    for font in catalog.iter().filter(|f| f.available) {
        match &font.metrics {
            None => {
                return Err(Error::structure(format!(
                    "available font '{}' has no metrics",
                    font.id
                )))
            }
            Some(metrics) if !metrics.is_valid() => {
                return Err(Error::structure(format!(
                    "available font '{}' has invalid metrics",
                    font.id
                )))
            }
            Some(_) => {}
        }
    }

    if let Some(missing) = needs_substitute {
        if !catalog.has_usable() {
            return Err(Error::FontNotFound(format!(
                "{} (no available font to substitute)",
                missing
            )));
        }
    }

    if let Some((orphan, _)) = translations.iter().find(|(id, _)| !run_ids.contains(id)) {
        return Err(Error::structure(format!(
            "translation for unknown run '{}'",
            orphan
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, BoundingBox, Font, FontMetrics, Page, TextRun};

    fn catalog() -> FontCatalog {
        FontCatalog::new()
            .with_font(Font::available("Body", FontMetrics::estimated()))
            .with_font(Font::missing("Arial-Bold"))
    }

    fn document(blocks: Vec<Block>) -> Document {
        let mut page = Page::letter(1);
        for block in blocks {
            page.add_block(block);
        }
        let mut doc = Document::new();
        doc.add_page(page);
        doc
    }

    fn block(id: &str, run: &str) -> Block {
        Block::paragraph(id, BoundingBox::new(0.0, 0.0, 100.0, 20.0))
            .with_run(TextRun::new(run, "Hello", "Body", 10.0))
    }

    fn is_structure(result: Result<()>) -> bool {
        matches!(result, Err(Error::InvalidDocumentStructure(_)))
    }

    #[test]
    fn test_valid_document() {
        let doc = document(vec![block("b1", "r1"), block("b2", "r2")]);
        assert!(validate(&doc, &catalog(), &Translations::new().with("r1", "Bonjour")).is_ok());
    }

    #[test]
    fn test_duplicate_ids() {
        let doc = document(vec![block("b1", "r1"), block("b1", "r2")]);
        assert!(is_structure(validate(&doc, &catalog(), &Translations::new())));

        let doc = document(vec![block("b1", "r1"), block("b2", "r1")]);
        assert!(is_structure(validate(&doc, &catalog(), &Translations::new())));
    }

    #[test]
    fn test_invalid_geometry() {
        let bad = Block::paragraph("b1", BoundingBox::new(0.0, 0.0, 0.0, 20.0));
        assert!(is_structure(validate(&document(vec![bad]), &catalog(), &Translations::new())));

        let mut doc = document(vec![]);
        doc.pages[0].width = f32::NAN;
        assert!(is_structure(validate(&doc, &catalog(), &Translations::new())));
    }

    #[test]
    fn test_invalid_font_size() {
        let bad = Block::paragraph("b1", BoundingBox::new(0.0, 0.0, 100.0, 20.0))
            .with_run(TextRun::new("r1", "Hello", "Body", 0.0));
        assert!(is_structure(validate(&document(vec![bad]), &catalog(), &Translations::new())));
    }

    #[test]
    fn test_unknown_font() {
        let bad = Block::paragraph("b1", BoundingBox::new(0.0, 0.0, 100.0, 20.0))
            .with_run(TextRun::new("r1", "Hello", "Nowhere", 10.0));
        assert!(matches!(
            validate(&document(vec![bad]), &catalog(), &Translations::new()),
            Err(Error::FontNotFound(_))
        ));
    }

    #[test]
    fn test_missing_font_without_candidates() {
        let doc = document(vec![Block::paragraph("b1", BoundingBox::new(0.0, 0.0, 100.0, 20.0))
            .with_run(TextRun::new("r1", "Hello", "Arial-Bold", 10.0))]);
        let catalog = FontCatalog::new().with_font(Font::missing("Arial-Bold"));
        assert!(matches!(
            validate(&doc, &catalog, &Translations::new()),
            Err(Error::FontNotFound(_))
        ));
    }

    #[test]
    fn test_invalid_font_metrics() {
        let doc = document(vec![block("b1", "r1")]);
        let bad = [
            FontMetrics::new(0.0, 800.0, 200.0, 0.0, 500.0),
            FontMetrics::new(1000.0, 0.0, 0.0, 0.0, 500.0),
            FontMetrics::new(1000.0, 800.0, 200.0, 0.0, -1.0),
            FontMetrics::new(f32::INFINITY, 800.0, 200.0, 0.0, 500.0),
        ];
        for metrics in bad {
            let catalog = catalog().with_font(Font::available("Broken", metrics));
            assert!(is_structure(validate(&doc, &catalog, &Translations::new())));
        }

        // Unavailable fonts never size text.
        let mut unused = Font::missing("Unused");
        unused.metrics = Some(FontMetrics::new(0.0, 0.0, 0.0, 0.0, 0.0));
        let catalog = catalog().with_font(unused);
        assert!(validate(&doc, &catalog, &Translations::new()).is_ok());
    }

    #[test]
    fn test_page_numbers() {
        let mut doc = document(vec![block("b1", "r1")]);
        doc.add_page(Page::letter(1));
        assert!(is_structure(validate(&doc, &catalog(), &Translations::new())));

        let mut doc = document(vec![block("b1", "r1")]);
        doc.pages[0].number = 0;
        assert!(is_structure(validate(&doc, &catalog(), &Translations::new())));

        let mut doc = document(vec![block("b1", "r1")]);
        doc.pages[0].number = 7;
        doc.add_page(Page::letter(3));
        assert!(validate(&doc, &catalog(), &Translations::new()).is_ok());
    }

    #[test]
    fn test_orphan_translation() {
        let doc = document(vec![block("b1", "r1")]);
        let translations = Translations::new().with("r9", "Orphelin");
        assert!(is_structure(validate(&doc, &catalog(), &translations)));
    }
}
