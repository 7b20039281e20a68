//! Text measurement and line wrapping.
//!
//! A block's runs are flattened into [`Segment`]s, prepared once into break
//! units, and then wrapped at any scale and width. Widths and line heights are
//! linear in font size, so the fit solver can search over scales without
//! re-segmenting the text.

mod breaking;

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::Result;
use crate::fonts::MetricsProvider;
use crate::model::{FontId, FontMetrics, LineBreak, EPSILON};

use breaking::TokenKind;

/// A span of text set in one font at one size.
#[derive(Debug, Clone, Copy)]
pub struct Segment<'a> {
    /// The text to set
    pub text: &'a str,
    /// Metrics of the font used
    pub metrics: &'a FontMetrics,
    /// Font size in points
    pub size: f32,
}

impl<'a> Segment<'a> {
    /// Create a new segment.
    pub fn new(text: &'a str, metrics: &'a FontMetrics, size: f32) -> Self {
        Self {
            text,
            metrics,
            size,
        }
    }
}

/// Result of laying out text in a given width.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Width of the widest line, trailing spaces excluded
    pub width: f32,
    /// Sum of line heights
    pub height: f32,
    /// Where each line after the first begins
    pub line_breaks: Vec<LineBreak>,
    /// Number of lines
    pub line_count: usize,
    /// Some text had no known script and was broken per grapheme
    pub degraded: bool,
}

impl Measurement {
    /// Check if the text fits a box, allowing `tolerance` (fraction of the
    /// height) extra vertically.
    pub fn fits(&self, width: f32, height: f32, tolerance: f32) -> bool {
        self.width <= width + EPSILON && self.height <= height + tolerance * height + EPSILON
    }
}

/// A grapheme with its width at unit scale.
#[derive(Debug, Clone)]
struct Piece {
    start: LineBreak,
    width: f32,
    line_height: f32,
}

#[derive(Debug, Clone)]
enum Unit {
    /// Text that is kept on one line when it fits
    Content {
        start: LineBreak,
        width: f32,
        line_height: f32,
        pieces: Vec<Piece>,
        last: TokenKind,
    },
    /// Whitespace; hangs at the end of a line
    Space { width: f32, line_height: f32 },
    /// Forced break; the next line starts at `next`
    HardBreak { next: LineBreak, line_height: f32 },
}

/// Text split into break units, ready to be wrapped repeatedly.
#[derive(Debug, Clone, Default)]
pub struct PreparedText {
    units: Vec<Unit>,
    degraded: bool,
}

fn grapheme_width(grapheme: &str, metrics: &FontMetrics, size: f32) -> f32 {
    let mut chars = grapheme.chars();
    let Some(base) = chars.next() else {
        return 0.0;
    };
    metrics.advance(base, size)
        + chars
            .filter_map(|c| metrics.mapped_advance(c, size))
            .sum::<f32>()
}

impl PreparedText {
    /// Segment and measure the given spans.
    ///
    /// Segment indices become the `run` field of reported line breaks.
    pub fn new(segments: &[Segment<'_>]) -> Self {
        let mut prepared = Self::default();

        for (run, segment) in segments.iter().enumerate() {
            let tokens = breaking::tokenize(segment.text);
            prepared.degraded |= tokens.degraded;
            let line_height = segment.metrics.line_height(segment.size);

            for token in tokens.tokens {
                let slice = &segment.text[token.start..token.end];
                match token.kind {
                    TokenKind::HardBreak => prepared.units.push(Unit::HardBreak {
                        next: LineBreak::new(run, token.end),
                        line_height,
                    }),
                    TokenKind::Space => {
                        let width: f32 = slice
                            .graphemes(true)
                            .map(|g| grapheme_width(g, segment.metrics, segment.size))
                            .sum();
                        prepared.push_space(width, line_height);
                    }
                    TokenKind::Word | TokenKind::Cluster => {
                        let pieces: Vec<Piece> = slice
                            .grapheme_indices(true)
                            .map(|(offset, g)| Piece {
                                start: LineBreak::new(run, token.start + offset),
                                width: grapheme_width(g, segment.metrics, segment.size),
                                line_height,
                            })
                            .collect();
                        prepared.push_content(token.kind, token.no_break_before, pieces);
                    }
                }
            }
        }

        prepared
    }

    fn push_space(&mut self, width: f32, height: f32) {
        if let Some(Unit::Space {
            width: w,
            line_height,
        }) = self.units.last_mut()
        {
            *w += width;
            *line_height = line_height.max(height);
            return;
        }
        self.units.push(Unit::Space {
            width,
            line_height: height,
        });
    }

    fn push_content(&mut self, kind: TokenKind, no_break_before: bool, pieces: Vec<Piece>) {
        let Some(first) = pieces.first() else {
            return;
        };
        let start = first.start;
        let added_width: f32 = pieces.iter().map(|p| p.width).sum();
        let added_height = pieces.iter().map(|p| p.line_height).fold(0.0, f32::max);

        if let Some(Unit::Content {
            width,
            line_height,
            pieces: existing,
            last,
            ..
        }) = self.units.last_mut()
        {
            // A word continuing across a run boundary, or punctuation that
            // may not start a line, stays with the previous unit.
            let glued = no_break_before || (kind == TokenKind::Word && *last == TokenKind::Word);
            if glued {
                *width += added_width;
                *line_height = line_height.max(added_height);
                existing.extend(pieces);
                *last = kind;
                return;
            }
        }

        self.units.push(Unit::Content {
            start,
            width: added_width,
            line_height: added_height,
            pieces,
            last: kind,
        });
    }

    /// Check if there is nothing to lay out.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Check if any text fell back to grapheme breaking.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Width of the text set on a single line at `scale`.
    pub fn natural_width(&self, scale: f32) -> f32 {
        self.wrap(scale, f32::INFINITY).width
    }

    /// Wrap the text into lines no wider than `max_width`, with every font
    /// size multiplied by `scale`.
    ///
    /// Lines break at the last opportunity that fits. A unit wider than the
    /// whole line is split at grapheme boundaries; a single grapheme that is
    /// still too wide is placed anyway.
    pub fn wrap(&self, scale: f32, max_width: f32) -> Measurement {
        let mut lines = LineBuilder::new(max_width);

        for unit in &self.units {
            match unit {
                Unit::HardBreak { next, line_height } => {
                    lines.touch(line_height * scale);
                    lines.finish(Some(*next));
                }
                Unit::Space { width, line_height } => {
                    lines.pending += width * scale;
                    lines.touch(line_height * scale);
                }
                Unit::Content {
                    start,
                    width,
                    line_height,
                    pieces,
                    ..
                } => {
                    if width * scale <= max_width + EPSILON {
                        lines.place(*start, width * scale, line_height * scale);
                    } else {
                        for piece in pieces {
                            lines.place(piece.start, piece.width * scale, piece.line_height * scale);
                        }
                    }
                }
            }
        }

        if lines.has_tokens {
            lines.finish(None);
        }

        Measurement {
            width: lines.widest,
            height: lines.total_height,
            line_breaks: lines.breaks,
            line_count: lines.count,
            degraded: self.degraded,
        }
    }
}

/// Greedy line filler.
struct LineBuilder {
    max_width: f32,
    widest: f32,
    total_height: f32,
    count: usize,
    breaks: Vec<LineBreak>,
    width: f32,
    pending: f32,
    height: f32,
    has_tokens: bool,
    has_content: bool,
}

impl LineBuilder {
    fn new(max_width: f32) -> Self {
        Self {
            max_width,
            widest: 0.0,
            total_height: 0.0,
            count: 0,
            breaks: Vec::new(),
            width: 0.0,
            pending: 0.0,
            height: 0.0,
            has_tokens: false,
            has_content: false,
        }
    }

    fn touch(&mut self, line_height: f32) {
        self.height = self.height.max(line_height);
        self.has_tokens = true;
    }

    fn place(&mut self, start: LineBreak, width: f32, line_height: f32) {
        if self.has_content && self.width + self.pending + width > self.max_width + EPSILON {
            self.finish(Some(start));
        }
        self.width += self.pending + width;
        self.pending = 0.0;
        self.has_content = true;
        self.touch(line_height);
    }

    fn finish(&mut self, next: Option<LineBreak>) {
        self.widest = self.widest.max(self.width);
        self.total_height += self.height;
        self.count += 1;
        if let Some(next) = next {
            self.breaks.push(next);
        }
        self.width = 0.0;
        self.pending = 0.0;
        self.height = 0.0;
        self.has_tokens = false;
        self.has_content = false;
    }
}

/// Lay out spans of text in `max_width`.
pub fn measure_segments(segments: &[Segment<'_>], max_width: f32) -> Measurement {
    PreparedText::new(segments).wrap(1.0, max_width)
}

/// Lay out a string set in one font.
///
/// Fails with `FontNotFound` when the provider has no metrics for `font`.
pub fn measure(
    text: &str,
    font: &FontId,
    size: f32,
    max_width: f32,
    provider: &dyn MetricsProvider,
) -> Result<Measurement> {
    let metrics = provider.metrics(font)?;
    Ok(measure_segments(
        &[Segment::new(text, metrics, size)],
        max_width,
    ))
}
