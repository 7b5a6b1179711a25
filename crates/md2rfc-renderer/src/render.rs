//! Walker-facing render contract.
//!
//! An external walker traverses a parsed document and calls one method per
//! structural element, in document order. Implementations write markup into
//! the buffer they are handed and keep whatever bookkeeping the output format
//! needs across calls; the walker never inspects a buffer it passed in.
//!
//! Block content arrives either pre-rendered (`&str`) or as a lazy [`Content`]
//! callback. The callback form lets a renderer open a container, ask for the
//! body, and drop the container again when the body turns out to be empty.

use crate::attrs::BlockAttrs;
use crate::citations::CitationKind;
use crate::title::TitleBlock;

/// Document matter phase, in document order.
///
/// A document moves through phases monotonically. Main matter may be skipped
/// entirely (front straight to back) but nothing ever moves backward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Matter {
    /// Title metadata, abstract and notes.
    #[default]
    Front,
    /// Body sections.
    Main,
    /// References and appendices.
    Back,
}

impl Matter {
    /// Lowercase phase name as used in log output and stream markers.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Main => "main",
            Self::Back => "back",
        }
    }
}

/// List flavor as detected by the walker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListKind {
    /// Numbered list, with an optional explicit start.
    Ordered,
    /// Term/definition pairs.
    Definition,
    #[default]
    Unordered,
}

/// Table column alignment. Columns without an explicit alignment render as
/// [`Alignment::Center`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

impl Alignment {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// Position flags for a single list item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ItemFlags {
    /// Kind of the enclosing list.
    pub kind: ListKind,
    /// Definition-list term (the hanging label) rather than a definition body.
    pub term: bool,
    /// First item of its list.
    pub first: bool,
}

/// Lazy block content: render into the sink and report whether anything was
/// written. Renderers that wrap content in a container use the report to
/// drop the container entirely instead of emitting an empty one.
pub type Content<'a> = &'a mut dyn FnMut(&mut String) -> bool;

/// One render call per structural element, in document order.
///
/// A renderer serves exactly one document and is not reused; all state is
/// per-document. Methods are infallible by contract: malformed input degrades
/// to best-effort output, never to an error.
pub trait Render {
    /// Emitted once before any other call.
    fn document_header(&mut self, out: &mut String);

    /// Emitted once after every other call. Closes any containers still open.
    fn document_footer(&mut self, out: &mut String);

    /// Document metadata, rendered at most once and before any body block.
    fn title_block(&mut self, out: &mut String, block: &TitleBlock);

    /// Explicit matter transition. Same-phase and backward requests emit no
    /// phase markup but still close any open sections.
    fn document_matter(&mut self, out: &mut String, matter: Matter);

    /// Queue attributes for the next block-level element. Each block renderer
    /// consumes the whole queue exactly once, even when it emits nothing.
    fn queue_attrs(&mut self, attrs: BlockAttrs);

    /// Section heading. `content` supplies the heading text as plain text;
    /// `id` is the walker's anchor for the section, used unless a queued
    /// attribute set overrides it.
    fn heading(&mut self, out: &mut String, content: Content<'_>, level: u8, id: &str);

    /// Paragraph body, pre-rendered inline markup. Inside a definition-list
    /// body the paragraph wrapper is suppressed (`in_definition`).
    fn paragraph(&mut self, out: &mut String, content: Content<'_>, in_definition: bool);

    /// A complete list. `content` supplies the concatenated item output;
    /// `nested` marks a list that sits inside another list item and `start`
    /// carries an ordered list's first number.
    fn list(
        &mut self,
        out: &mut String,
        content: Content<'_>,
        kind: ListKind,
        nested: bool,
        start: u64,
    );

    /// One list item, already rendered. Definition terms arrive as plain
    /// text, every other item as rendered markup.
    fn list_item(&mut self, out: &mut String, text: &str, flags: ItemFlags);

    /// Fenced or indented code block, raw text.
    fn block_code(&mut self, out: &mut String, code: &str, lang: Option<&str>);

    /// Block quote, pre-rendered body.
    fn block_quote(&mut self, out: &mut String, text: &str);

    /// Abstract region, pre-rendered body.
    fn abstract_block(&mut self, out: &mut String, text: &str);

    /// Aside region, pre-rendered body.
    fn aside(&mut self, out: &mut String, text: &str);

    /// Note region, pre-rendered body.
    fn note(&mut self, out: &mut String, text: &str);

    /// Stray comment payload, delimiters already stripped.
    fn comment(&mut self, out: &mut String, text: &str);

    /// A complete table from pre-rendered header and body row output.
    fn table(&mut self, out: &mut String, header: &str, body: &str);

    /// One table row from pre-rendered cell output.
    fn table_row(&mut self, out: &mut String, cells: &str);

    /// Header cell with its column alignment.
    fn table_header_cell(&mut self, out: &mut String, text: &str, align: Alignment);

    /// Body cell.
    fn table_cell(&mut self, out: &mut String, text: &str, align: Alignment);

    /// Thematic break. No counterpart in every output format.
    fn horizontal_rule(&mut self, _out: &mut String) {}

    /// Raw block-level markup from the source document.
    fn html_block(&mut self, _out: &mut String, _html: &str) {}

    // Inline elements. These write exactly once and keep no state between
    // calls, except where noted.

    fn emphasis(&mut self, out: &mut String, text: &str);

    fn strong(&mut self, out: &mut String, text: &str);

    fn strong_emphasis(&mut self, out: &mut String, text: &str);

    fn code_span(&mut self, out: &mut String, code: &str);

    fn strikethrough(&mut self, out: &mut String, text: &str) {
        out.push_str(text);
    }

    /// Inline link; `content` is the rendered link text.
    fn link(&mut self, out: &mut String, dest: &str, content: &str);

    /// Bare URL or email autolink.
    fn auto_link(&mut self, out: &mut String, dest: &str, is_email: bool);

    /// Image reference with plain-text alternative.
    fn image(&mut self, out: &mut String, dest: &str, alt: &str);

    /// Hard line break.
    fn line_break(&mut self, out: &mut String);

    /// Index entry marker.
    fn index(&mut self, out: &mut String, primary: &str, secondary: Option<&str>);

    /// Citation reference. Records the target for the reference sections and
    /// emits an inline marker at the call site.
    fn citation(
        &mut self,
        out: &mut String,
        target: &str,
        kind: CitationKind,
        filename: Option<&str>,
    );

    /// Record a citation without emitting an inline marker.
    fn record_citation(&mut self, target: &str, kind: CitationKind, filename: Option<&str>);

    /// Emit the collected reference sections, forcing back matter first.
    fn references(&mut self, out: &mut String);

    /// Plain text run.
    fn text(&mut self, out: &mut String, text: &str);

    /// Pre-escaped entity reference, passed through untouched.
    fn entity(&mut self, out: &mut String, entity: &str) {
        out.push_str(entity);
    }

    /// Footnote marker. No footnote construct exists in RFC 2629 output.
    fn footnote_reference(&mut self, _out: &mut String, _label: &str) {}

    /// Footnote body. See [`Render::footnote_reference`].
    fn footnote_definition(&mut self, _out: &mut String, _label: &str, _text: &str) {}
}
