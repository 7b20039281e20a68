//! Integration tests for text measurement and wrapping.

use relayout::measure::PreparedText;
use relayout::model::LineBreak;
use relayout::{measure, measure_segments, Error, Font, FontCatalog, FontId, FontMetrics, Segment};
use unicode_segmentation::UnicodeSegmentation;

/// 5pt per glyph and a 10pt line at size 10.
fn metrics() -> FontMetrics {
    FontMetrics::new(1000.0, 800.0, 200.0, 0.0, 500.0)
}

#[test]
fn test_closing_punctuation_never_starts_a_line() {
    let m = metrics();
    let text = "漢字漢字。";
    let result = measure_segments(&[Segment::new(text, &m, 10.0)], 20.0);

    // "。" drags the preceding ideograph onto the next line.
    assert_eq!(result.line_count, 2);
    assert_eq!(result.line_breaks, vec![LineBreak::new(0, 9)]);
    assert_eq!(result.width, 15.0);
}

#[test]
fn test_emoji_sequences_never_split() {
    let m = metrics();
    let text = "👩\u{200D}👩\u{200D}👧 family 👨\u{200D}👩\u{200D}👧\u{200D}👦";
    let boundaries: Vec<usize> = text.grapheme_indices(true).map(|(i, _)| i).collect();

    for max_width in [4.0, 6.0, 12.0, 30.0] {
        let result = measure_segments(&[Segment::new(text, &m, 10.0)], max_width);
        for br in &result.line_breaks {
            assert!(
                boundaries.contains(&br.offset),
                "break at {} splits a grapheme (width {})",
                br.offset,
                max_width
            );
        }
    }
}

#[test]
fn test_paragraph_separator_is_hard_break() {
    let m = metrics();
    let result = measure_segments(&[Segment::new("one\u{2029}two", &m, 10.0)], 500.0);
    assert_eq!(result.line_count, 2);
    assert_eq!(result.line_breaks, vec![LineBreak::new(0, 6)]);
    assert_eq!(result.height, 20.0);
}

#[test]
fn test_mixed_scripts() {
    let m = metrics();
    let text = "Hello 世界 مرحبا";

    let single = measure_segments(&[Segment::new(text, &m, 10.0)], 500.0);
    assert_eq!(single.line_count, 1);
    assert_eq!(single.width, 70.0);
    assert!(!single.degraded);

    let wrapped = measure_segments(&[Segment::new(text, &m, 10.0)], 30.0);
    assert_eq!(wrapped.line_count, 3);
    assert_eq!(
        wrapped.line_breaks,
        vec![LineBreak::new(0, 6), LineBreak::new(0, 13)]
    );
}

#[test]
fn test_no_break_space_keeps_words_together() {
    let m = metrics();
    let result = measure_segments(&[Segment::new("xx aaaa\u{a0}bbbb", &m, 10.0)], 50.0);
    assert_eq!(result.line_count, 2);
    assert_eq!(result.line_breaks, vec![LineBreak::new(0, 3)]);
    assert_eq!(result.width, 45.0);

    // A narrow no-break space between a number and its unit.
    let result = measure_segments(&[Segment::new("xx 12\u{202f}km", &m, 10.0)], 30.0);
    assert_eq!(result.line_breaks, vec![LineBreak::new(0, 3)]);
}

#[test]
fn test_word_continues_across_runs() {
    let m = metrics();
    let segments = [Segment::new("Hel", &m, 10.0), Segment::new("lo world", &m, 10.0)];
    let result = measure_segments(&segments, 30.0);
    assert_eq!(result.line_count, 2);
    assert_eq!(result.line_breaks, vec![LineBreak::new(1, 3)]);
}

#[test]
fn test_tallest_run_sets_line_height() {
    let m = metrics();
    let segments = [Segment::new("Big ", &m, 20.0), Segment::new("small", &m, 10.0)];
    let result = measure_segments(&segments, 500.0);
    assert_eq!(result.line_count, 1);
    assert_eq!(result.height, 20.0);
    assert_eq!(result.width, 65.0);
}

#[test]
fn test_width_linear_in_scale() {
    let m = metrics();
    let prepared = PreparedText::new(&[Segment::new("Linear scaling of widths", &m, 12.0)]);
    let full = prepared.natural_width(1.0);
    let half = prepared.natural_width(0.5);
    assert!((full - 2.0 * half).abs() < 1e-3);

    let a = prepared.wrap(0.5, 40.0);
    let b = prepared.wrap(1.0, 80.0);
    assert_eq!(a.line_breaks, b.line_breaks);
    assert!((b.height - 2.0 * a.height).abs() < 1e-3);
}

#[test]
fn test_empty_text() {
    let m = metrics();
    let result = measure_segments(&[Segment::new("", &m, 10.0)], 100.0);
    assert_eq!(result.line_count, 0);
    assert_eq!(result.height, 0.0);
    assert!(result.line_breaks.is_empty());
}

#[test]
fn test_measure_with_provider() {
    let catalog = FontCatalog::new()
        .with_font(Font::available("Body", metrics()))
        .with_font(Font::missing("Gone"));

    let result = measure("two words", &FontId::from("Body"), 10.0, 30.0, &catalog).unwrap();
    assert_eq!(result.line_count, 2);

    assert!(matches!(
        measure("text", &FontId::from("Gone"), 10.0, 30.0, &catalog),
        Err(Error::FontNotFound(_))
    ));
}
