//! Page-level types.

use serde::{Deserialize, Serialize};

use super::{BoundingBox, TextRun};

/// A single page in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub number: u32,

    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Positioned content blocks on the page
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl Page {
    /// Create a new page with the given dimensions.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            blocks: Vec::new(),
        }
    }

    /// Create a new page with standard Letter size (8.5 x 11 inches).
    pub fn letter(number: u32) -> Self {
        Self::new(number, 612.0, 792.0) // 8.5 * 72, 11 * 72
    }

    /// Create a new page with standard A4 size (210 x 297 mm).
    pub fn a4(number: u32) -> Self {
        Self::new(number, 595.0, 842.0) // 210mm * 2.834, 297mm * 2.834
    }

    /// Add a block to the page.
    pub fn add_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Get a block by id.
    pub fn get_block(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    /// The page as a box anchored at the origin.
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(0.0, 0.0, self.width, self.height)
    }

    /// Check if the page is empty (no content blocks).
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Get the number of blocks on the page.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }
}

/// A positioned structural unit of content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    /// Identifier, unique within the page
    pub id: String,

    /// Original bounding box
    pub bbox: BoundingBox,

    /// Semantic kind
    pub kind: BlockKind,

    /// Text runs in reading order
    #[serde(default)]
    pub runs: Vec<TextRun>,

    /// Stacking order (higher is drawn later)
    #[serde(default)]
    pub z_order: i32,
}

impl Block {
    /// Create a new empty block.
    pub fn new(id: impl Into<String>, kind: BlockKind, bbox: BoundingBox) -> Self {
        Self {
            id: id.into(),
            bbox,
            kind,
            runs: Vec::new(),
            z_order: 0,
        }
    }

    /// Create a paragraph block.
    pub fn paragraph(id: impl Into<String>, bbox: BoundingBox) -> Self {
        Self::new(id, BlockKind::Paragraph, bbox)
    }

    /// Add a run, builder style.
    pub fn with_run(mut self, run: TextRun) -> Self {
        self.runs.push(run);
        self
    }

    /// Add a run.
    pub fn add_run(&mut self, run: TextRun) {
        self.runs.push(run);
    }

    /// Concatenated source text of all runs.
    pub fn source_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Concatenated text that will be laid out.
    pub fn effective_text(&self) -> String {
        self.runs.iter().map(|r| r.effective_text()).collect()
    }
}

/// Semantic kind of a block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    /// A heading
    Heading,
    /// A body paragraph (default)
    #[default]
    Paragraph,
    /// A list item
    ListItem,
    /// A table cell
    TableCell,
    /// A figure or table caption
    Caption,
}

impl BlockKind {
    /// Kebab-case name, as used in JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Heading => "heading",
            BlockKind::Paragraph => "paragraph",
            BlockKind::ListItem => "list-item",
            BlockKind::TableCell => "table-cell",
            BlockKind::Caption => "caption",
        }
    }
}
