//! Markdown event walker.
//!
//! pulldown-cmark streams tags while the render contract wants whole
//! elements, so the walker keeps a stack of frames with one output buffer
//! per open element. Content renders into the innermost buffer; when an
//! element closes, its frame pops and the rendered piece is handed to the
//! [`Render`] backend together with the context the backend needs (list
//! kind, column alignment, section anchor).
//!
//! Heading titles, definition terms and image labels are captured as plain
//! text rather than rendered markup, since the backend embeds them in
//! attribute values. Consecutive text events are batched before inline
//! scanning so citation and index marks survive the parser's text splits.

use std::collections::HashMap;

use md2rfc_renderer::{Alignment, BlockAttrs, CitationKind, ItemFlags, ListKind, Matter, Render};
use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, LinkType, Tag, TagEnd};

use crate::inline::scan_text;
use crate::preprocess::DIRECTIVE_PREFIX;

/// One open element with its output buffer.
enum Frame {
    Paragraph {
        buf: String,
    },
    Heading {
        level: u8,
        explicit_id: Option<String>,
        text: String,
    },
    Quote {
        buf: String,
    },
    CodeBlock {
        lang: Option<String>,
        buf: String,
    },
    List(ListFrame),
    Item {
        buf: String,
    },
    Term {
        text: String,
    },
    Definition {
        buf: String,
    },
    Table(TableFrame),
    Cell {
        buf: String,
    },
    Inline {
        kind: InlineKind,
        buf: String,
    },
    Link {
        auto: bool,
        email: bool,
        dest: String,
        buf: String,
    },
    Image {
        dest: String,
        alt: String,
    },
    Region {
        region: Region,
        buf: String,
    },
    HtmlBlock {
        buf: String,
    },
}

impl Frame {
    fn buffer(&mut self) -> &mut String {
        match self {
            Self::Paragraph { buf }
            | Self::Quote { buf }
            | Self::CodeBlock { buf, .. }
            | Self::Item { buf }
            | Self::Definition { buf }
            | Self::Cell { buf }
            | Self::Inline { buf, .. }
            | Self::Link { buf, .. }
            | Self::Region { buf, .. }
            | Self::HtmlBlock { buf }
            | Self::Heading { text: buf, .. }
            | Self::Term { text: buf }
            | Self::Image { alt: buf, .. } => buf,
            Self::List(list) => &mut list.items,
            Self::Table(table) => &mut table.row,
        }
    }
}

struct ListFrame {
    kind: ListKind,
    start: u64,
    nested: bool,
    items: String,
    saw_item: bool,
}

struct TableFrame {
    aligns: Vec<Alignment>,
    head: String,
    rows: String,
    row: String,
    cell: usize,
    in_head: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum InlineKind {
    Emphasis,
    Strong,
    Strikethrough,
}

/// Directive region bracketed by `begin`/`end` markers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Region {
    Abstract,
    Note,
    Aside,
}

impl Region {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "abstract" => Some(Self::Abstract),
            "note" => Some(Self::Note),
            "aside" => Some(Self::Aside),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Abstract => "abstract",
            Self::Note => "note",
            Self::Aside => "aside",
        }
    }
}

/// Drives a [`Render`] backend from a pulldown-cmark event stream.
///
/// The walker owns the output buffer so container frames can capture nested
/// output; [`Walker::finish`] hands buffer and backend back for the caller
/// to append the reference sections and the footer.
pub struct Walker<R> {
    renderer: R,
    out: String,
    frames: Vec<Frame>,
    pending_text: String,
    id_counts: HashMap<String, usize>,
    warnings: Vec<String>,
}

impl<R: Render> Walker<R> {
    #[must_use]
    pub fn new(renderer: R, out: String) -> Self {
        Self {
            renderer,
            out,
            frames: Vec::new(),
            pending_text: String::new(),
            id_counts: HashMap::new(),
            warnings: Vec::new(),
        }
    }

    /// Consume an event stream in document order.
    pub fn walk<'a>(&mut self, events: impl IntoIterator<Item = Event<'a>>) {
        for event in events {
            self.event(event);
        }
    }

    /// Close out the walk and return the backend, the output written so far
    /// and any warnings.
    pub fn finish(mut self) -> (R, String, Vec<String>) {
        self.flush_text();
        while let Some(frame) = self.frames.pop() {
            if let Frame::Region { region, buf } = frame {
                self.warnings
                    .push(format!("unterminated {} region", region.name()));
                let Self {
                    renderer,
                    frames,
                    out,
                    ..
                } = &mut self;
                emit_region(renderer, current_sink(frames, out), region, &buf);
            } else {
                self.warnings
                    .push("document ended inside an unclosed block".to_owned());
            }
        }
        (self.renderer, self.out, self.warnings)
    }

    fn event(&mut self, event: Event<'_>) {
        if !matches!(&event, Event::Text(_) | Event::SoftBreak) {
            self.flush_text();
        }
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => {
                if let Some(buf) = self.raw_capture() {
                    buf.push_str(&text);
                } else {
                    self.pending_text.push_str(&text);
                }
            }
            Event::Code(code) => {
                if let Some(buf) = self.raw_capture() {
                    buf.push_str(&code);
                } else {
                    let Self {
                        renderer,
                        frames,
                        out,
                        ..
                    } = self;
                    renderer.code_span(current_sink(frames, out), &code);
                }
            }
            Event::Html(html) => {
                if let Some(Frame::HtmlBlock { buf }) = self.frames.last_mut() {
                    buf.push_str(&html);
                } else {
                    self.block_html(&html);
                }
            }
            Event::SoftBreak => {
                if let Some(buf) = self.raw_capture() {
                    buf.push(' ');
                } else {
                    self.pending_text.push('\n');
                }
            }
            Event::HardBreak => {
                if let Some(buf) = self.raw_capture() {
                    buf.push(' ');
                } else {
                    let Self {
                        renderer,
                        frames,
                        out,
                        ..
                    } = self;
                    renderer.line_break(current_sink(frames, out));
                }
            }
            Event::Rule => {
                let Self {
                    renderer,
                    frames,
                    out,
                    ..
                } = self;
                renderer.horizontal_rule(current_sink(frames, out));
            }
            Event::InlineHtml(_)
            | Event::FootnoteReference(_)
            | Event::TaskListMarker(_)
            | Event::InlineMath(_)
            | Event::DisplayMath(_) => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.frames.push(Frame::Paragraph { buf: String::new() }),
            Tag::Heading {
                level,
                id,
                classes,
                attrs,
            } => {
                if !classes.is_empty() || !attrs.is_empty() {
                    self.renderer.queue_attrs(BlockAttrs {
                        id: None,
                        classes: classes.into_iter().map(CowStr::into_string).collect(),
                        attrs: attrs
                            .into_iter()
                            .map(|(key, value)| {
                                (
                                    key.into_string(),
                                    value.map_or_else(String::new, CowStr::into_string),
                                )
                            })
                            .collect(),
                    });
                }
                self.frames.push(Frame::Heading {
                    level: heading_level(level),
                    explicit_id: id.map(CowStr::into_string),
                    text: String::new(),
                });
            }
            Tag::BlockQuote(_) => self.frames.push(Frame::Quote { buf: String::new() }),
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.trim().split_whitespace().next().map(str::to_owned)
                    }
                    CodeBlockKind::Indented => None,
                };
                self.frames.push(Frame::CodeBlock {
                    lang,
                    buf: String::new(),
                });
            }
            Tag::List(start) => {
                let nested = self.in_list();
                self.frames.push(Frame::List(ListFrame {
                    kind: if start.is_some() {
                        ListKind::Ordered
                    } else {
                        ListKind::Unordered
                    },
                    start: start.unwrap_or(1),
                    nested,
                    items: String::new(),
                    saw_item: false,
                }));
            }
            Tag::Item => self.frames.push(Frame::Item { buf: String::new() }),
            Tag::DefinitionList => {
                let nested = self.in_list();
                self.frames.push(Frame::List(ListFrame {
                    kind: ListKind::Definition,
                    start: 1,
                    nested,
                    items: String::new(),
                    saw_item: false,
                }));
            }
            Tag::DefinitionListTitle => self.frames.push(Frame::Term {
                text: String::new(),
            }),
            Tag::DefinitionListDefinition => self.frames.push(Frame::Definition {
                buf: String::new(),
            }),
            Tag::Table(alignments) => {
                let aligns = alignments
                    .iter()
                    .map(|align| match align {
                        pulldown_cmark::Alignment::Left => Alignment::Left,
                        pulldown_cmark::Alignment::Right => Alignment::Right,
                        pulldown_cmark::Alignment::None | pulldown_cmark::Alignment::Center => {
                            Alignment::Center
                        }
                    })
                    .collect();
                self.frames.push(Frame::Table(TableFrame {
                    aligns,
                    head: String::new(),
                    rows: String::new(),
                    row: String::new(),
                    cell: 0,
                    in_head: false,
                }));
            }
            Tag::TableHead => {
                if let Some(Frame::Table(table)) = self.frames.last_mut() {
                    table.in_head = true;
                    table.cell = 0;
                }
            }
            Tag::TableRow => {
                if let Some(Frame::Table(table)) = self.frames.last_mut() {
                    table.cell = 0;
                }
            }
            Tag::TableCell => self.frames.push(Frame::Cell { buf: String::new() }),
            Tag::Emphasis => self.start_inline(InlineKind::Emphasis),
            Tag::Strong => self.start_inline(InlineKind::Strong),
            Tag::Strikethrough => self.start_inline(InlineKind::Strikethrough),
            Tag::Link {
                link_type,
                dest_url,
                ..
            } => {
                if self.in_raw_capture() {
                    return;
                }
                self.frames.push(Frame::Link {
                    auto: matches!(link_type, LinkType::Autolink | LinkType::Email),
                    email: matches!(link_type, LinkType::Email),
                    dest: dest_url.into_string(),
                    buf: String::new(),
                });
            }
            Tag::Image { dest_url, .. } => {
                if self.in_raw_capture() {
                    return;
                }
                self.frames.push(Frame::Image {
                    dest: dest_url.into_string(),
                    alt: String::new(),
                });
            }
            Tag::HtmlBlock => self.frames.push(Frame::HtmlBlock { buf: String::new() }),
            Tag::FootnoteDefinition(_)
            | Tag::MetadataBlock(_)
            | Tag::Superscript
            | Tag::Subscript => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.end_paragraph(),
            TagEnd::Heading(_) => self.end_heading(),
            TagEnd::BlockQuote(_) => self.end_quote(),
            TagEnd::CodeBlock => self.end_code_block(),
            TagEnd::List(_) | TagEnd::DefinitionList => self.end_list(),
            TagEnd::Item => self.end_item(),
            TagEnd::DefinitionListTitle => self.end_term(),
            TagEnd::DefinitionListDefinition => self.end_definition(),
            TagEnd::Table => self.end_table(),
            TagEnd::TableHead => self.end_table_head(),
            TagEnd::TableRow => self.end_table_row(),
            TagEnd::TableCell => self.end_table_cell(),
            TagEnd::Emphasis => self.end_inline(InlineKind::Emphasis),
            TagEnd::Strong => self.end_inline(InlineKind::Strong),
            TagEnd::Strikethrough => self.end_inline(InlineKind::Strikethrough),
            TagEnd::Link => self.end_link(),
            TagEnd::Image => self.end_image(),
            TagEnd::HtmlBlock => self.end_html_block(),
            TagEnd::FootnoteDefinition
            | TagEnd::MetadataBlock(_)
            | TagEnd::Superscript
            | TagEnd::Subscript => {}
        }
    }

    fn end_paragraph(&mut self) {
        let Some(Frame::Paragraph { buf }) = self.frames.pop() else {
            return;
        };
        let in_definition = matches!(self.frames.last(), Some(Frame::Definition { .. }));
        let Self {
            renderer,
            frames,
            out,
            ..
        } = self;
        let mut content = |sink: &mut String| {
            sink.push_str(&buf);
            !buf.is_empty()
        };
        renderer.paragraph(current_sink(frames, out), &mut content, in_definition);
    }

    fn end_heading(&mut self) {
        let Some(Frame::Heading {
            level,
            explicit_id,
            text,
        }) = self.frames.pop()
        else {
            return;
        };
        let id = explicit_id.unwrap_or_else(|| self.unique_id(&text));
        let Self {
            renderer,
            frames,
            out,
            ..
        } = self;
        let mut content = |sink: &mut String| {
            sink.push_str(&text);
            !text.is_empty()
        };
        renderer.heading(current_sink(frames, out), &mut content, level, &id);
    }

    fn end_quote(&mut self) {
        let Some(Frame::Quote { buf }) = self.frames.pop() else {
            return;
        };
        let Self {
            renderer,
            frames,
            out,
            ..
        } = self;
        renderer.block_quote(current_sink(frames, out), &buf);
    }

    fn end_code_block(&mut self) {
        let Some(Frame::CodeBlock { lang, buf }) = self.frames.pop() else {
            return;
        };
        let Self {
            renderer,
            frames,
            out,
            ..
        } = self;
        renderer.block_code(current_sink(frames, out), &buf, lang.as_deref());
    }

    fn end_list(&mut self) {
        let Some(Frame::List(list)) = self.frames.pop() else {
            return;
        };
        let Self {
            renderer,
            frames,
            out,
            ..
        } = self;
        let mut content = |sink: &mut String| {
            sink.push_str(&list.items);
            !list.items.is_empty()
        };
        renderer.list(
            current_sink(frames, out),
            &mut content,
            list.kind,
            list.nested,
            list.start,
        );
    }

    fn end_item(&mut self) {
        let Some(Frame::Item { buf }) = self.frames.pop() else {
            return;
        };
        self.push_list_item(&buf, false);
    }

    fn end_term(&mut self) {
        let Some(Frame::Term { text }) = self.frames.pop() else {
            return;
        };
        self.push_list_item(&text, true);
    }

    fn end_definition(&mut self) {
        let Some(Frame::Definition { buf }) = self.frames.pop() else {
            return;
        };
        self.push_list_item(&buf, false);
    }

    fn push_list_item(&mut self, content: &str, term: bool) {
        let Some(Frame::List(list)) = self.frames.last_mut() else {
            return;
        };
        let flags = ItemFlags {
            kind: list.kind,
            term,
            first: !list.saw_item,
        };
        list.saw_item = true;
        self.renderer.list_item(&mut list.items, content, flags);
    }

    fn end_table(&mut self) {
        let Some(Frame::Table(table)) = self.frames.pop() else {
            return;
        };
        let Self {
            renderer,
            frames,
            out,
            ..
        } = self;
        renderer.table(current_sink(frames, out), &table.head, &table.rows);
    }

    fn end_table_head(&mut self) {
        if let Some(Frame::Table(table)) = self.frames.last_mut() {
            let row = std::mem::take(&mut table.row);
            self.renderer.table_row(&mut table.head, &row);
            table.in_head = false;
        }
    }

    fn end_table_row(&mut self) {
        if let Some(Frame::Table(table)) = self.frames.last_mut() {
            let row = std::mem::take(&mut table.row);
            self.renderer.table_row(&mut table.rows, &row);
        }
    }

    fn end_table_cell(&mut self) {
        let Some(Frame::Cell { buf }) = self.frames.pop() else {
            return;
        };
        let Some(Frame::Table(table)) = self.frames.last_mut() else {
            return;
        };
        let align = table.aligns.get(table.cell).copied().unwrap_or_default();
        if table.in_head {
            self.renderer.table_header_cell(&mut table.row, &buf, align);
        } else {
            self.renderer.table_cell(&mut table.row, &buf, align);
        }
        table.cell += 1;
    }

    fn start_inline(&mut self, kind: InlineKind) {
        if self.in_raw_capture() {
            return;
        }
        self.frames.push(Frame::Inline {
            kind,
            buf: String::new(),
        });
    }

    fn end_inline(&mut self, kind: InlineKind) {
        let matched = matches!(
            self.frames.last(),
            Some(Frame::Inline { kind: open, .. }) if *open == kind
        );
        if !matched {
            return;
        }
        let Some(Frame::Inline { kind, buf }) = self.frames.pop() else {
            return;
        };
        let Self {
            renderer,
            frames,
            out,
            ..
        } = self;
        let sink = current_sink(frames, out);
        match kind {
            InlineKind::Emphasis => renderer.emphasis(sink, &buf),
            InlineKind::Strong => renderer.strong(sink, &buf),
            InlineKind::Strikethrough => renderer.strikethrough(sink, &buf),
        }
    }

    fn end_link(&mut self) {
        if !matches!(self.frames.last(), Some(Frame::Link { .. })) {
            return;
        }
        let Some(Frame::Link {
            auto,
            email,
            dest,
            buf,
        }) = self.frames.pop()
        else {
            return;
        };
        let Self {
            renderer,
            frames,
            out,
            ..
        } = self;
        let sink = current_sink(frames, out);
        if auto {
            renderer.auto_link(sink, &dest, email);
        } else if let Some((suppress, kind, target)) = citation_link(&buf) {
            if suppress {
                renderer.record_citation(target, kind, Some(&dest));
            } else {
                renderer.citation(sink, target, kind, Some(&dest));
            }
        } else {
            renderer.link(sink, &dest, &buf);
        }
    }

    fn end_image(&mut self) {
        if !matches!(self.frames.last(), Some(Frame::Image { .. })) {
            return;
        }
        let Some(Frame::Image { dest, alt }) = self.frames.pop() else {
            return;
        };
        let Self {
            renderer,
            frames,
            out,
            ..
        } = self;
        renderer.image(current_sink(frames, out), &dest, alt.trim());
    }

    fn end_html_block(&mut self) {
        let Some(Frame::HtmlBlock { buf }) = self.frames.pop() else {
            return;
        };
        self.block_html(&buf);
    }

    /// Route raw block HTML: directive markers to their handlers, plain
    /// comments to the renderer's comment hook, anything else untouched.
    fn block_html(&mut self, html: &str) {
        let trimmed = html.trim();
        if trimmed.is_empty() {
            return;
        }
        if let Some(rest) = trimmed.strip_prefix(DIRECTIVE_PREFIX) {
            match rest.strip_suffix("-->") {
                Some(payload) => self.directive(payload.trim()),
                None => self.warn("malformed directive marker".to_owned()),
            }
            return;
        }
        if let Some(body) = trimmed.strip_prefix("<!--").and_then(|r| r.strip_suffix("-->")) {
            let Self {
                renderer,
                frames,
                out,
                ..
            } = self;
            renderer.comment(current_sink(frames, out), body);
            return;
        }
        let Self {
            renderer,
            frames,
            out,
            ..
        } = self;
        renderer.html_block(current_sink(frames, out), trimmed);
    }

    fn directive(&mut self, payload: &str) {
        let (word, rest) = payload
            .split_once(' ')
            .map_or((payload, ""), |(word, rest)| (word, rest.trim()));
        match word {
            "matter" => match rest {
                "front" => self.matter(Matter::Front),
                "main" => self.matter(Matter::Main),
                "back" => self.matter(Matter::Back),
                _ => self.warn(format!("unknown matter phase '{rest}'")),
            },
            "attrs" => self.renderer.queue_attrs(BlockAttrs::parse(rest)),
            "begin" => match Region::parse(rest) {
                Some(region) => self.frames.push(Frame::Region {
                    region,
                    buf: String::new(),
                }),
                None => self.warn(format!("unknown region '{rest}'")),
            },
            "end" => self.end_region(rest),
            _ => self.warn(format!("unknown directive '{word}'")),
        }
    }

    fn matter(&mut self, matter: Matter) {
        let Self {
            renderer,
            frames,
            out,
            ..
        } = self;
        renderer.document_matter(current_sink(frames, out), matter);
    }

    fn end_region(&mut self, name: &str) {
        let expected = Region::parse(name);
        let matched = matches!(
            (self.frames.last(), expected),
            (Some(Frame::Region { region, .. }), Some(want)) if *region == want
        );
        if !matched {
            self.warn(format!("unmatched region end '{name}'"));
            return;
        }
        let Some(Frame::Region { region, buf }) = self.frames.pop() else {
            return;
        };
        let Self {
            renderer,
            frames,
            out,
            ..
        } = self;
        emit_region(renderer, current_sink(frames, out), region, &buf);
    }

    fn flush_text(&mut self) {
        if self.pending_text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.pending_text);
        let Self {
            renderer,
            frames,
            out,
            ..
        } = self;
        scan_text(renderer, current_sink(frames, out), &text);
    }

    /// Buffer of the innermost frame that captures plain text, if that frame
    /// is on top of the stack.
    fn raw_capture(&mut self) -> Option<&mut String> {
        match self.frames.last_mut() {
            Some(
                Frame::CodeBlock { buf, .. }
                | Frame::Heading { text: buf, .. }
                | Frame::Term { text: buf }
                | Frame::Image { alt: buf, .. },
            ) => Some(buf),
            _ => None,
        }
    }

    fn in_raw_capture(&self) -> bool {
        matches!(
            self.frames.last(),
            Some(
                Frame::CodeBlock { .. }
                    | Frame::Heading { .. }
                    | Frame::Term { .. }
                    | Frame::Image { .. }
            )
        )
    }

    fn in_list(&self) -> bool {
        self.frames
            .iter()
            .any(|frame| matches!(frame, Frame::List(_)))
    }

    /// Anchor for a heading without an explicit id, deduplicated across the
    /// document.
    fn unique_id(&mut self, text: &str) -> String {
        let mut base = slug(text);
        if base.is_empty() {
            base.push_str("section");
        }
        let count = self.id_counts.entry(base.clone()).or_insert(0);
        let id = if *count == 0 {
            base.clone()
        } else {
            format!("{base}-{count}")
        };
        *count += 1;
        id
    }

    fn warn(&mut self, message: String) {
        tracing::warn!("{message}");
        self.warnings.push(message);
    }
}

fn current_sink<'a>(frames: &'a mut [Frame], out: &'a mut String) -> &'a mut String {
    match frames.last_mut() {
        Some(frame) => frame.buffer(),
        None => out,
    }
}

fn emit_region<R: Render>(renderer: &mut R, out: &mut String, region: Region, text: &str) {
    match region {
        Region::Abstract => renderer.abstract_block(out, text),
        Region::Note => renderer.note(out, text),
        Region::Aside => renderer.aside(out, text),
    }
}

/// Recognize link text of the form `@target`, `@!target`, `@?target` or
/// `-@target` as a citation with an explicit reference file.
fn citation_link(text: &str) -> Option<(bool, CitationKind, &str)> {
    let (suppress, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let rest = rest.strip_prefix('@')?;
    let (kind, target) = if let Some(target) = rest.strip_prefix('!') {
        (CitationKind::Normative, target)
    } else if let Some(target) = rest.strip_prefix('?') {
        (CitationKind::Informative, target)
    } else {
        (CitationKind::Informative, rest)
    };
    (!target.is_empty() && !target.contains(char::is_whitespace))
        .then_some((suppress, kind, target))
}

const fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Lowercased ascii anchor text, word runs joined with single dashes.
fn slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.trim().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(c.to_ascii_lowercase());
            pending_dash = false;
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_dash = true;
        }
    }
    slug
}
