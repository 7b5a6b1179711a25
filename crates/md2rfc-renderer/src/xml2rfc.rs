//! The xml2rfc v2 (RFC 2629) output backend.
//!
//! [`RfcRenderer`] implements [`Render`] for the vocabulary xml2rfc v2
//! accepts: `<section>`, `<t>`, `<list>`, `<texttable>`, `<spanx>` and
//! friends. Body blocks render in any mode; the document envelope (the XML
//! preamble, `<rfc>`, front/middle/back containers and reference sections)
//! is emitted only for standalone documents.

use crate::attrs::{AttrQueue, BlockAttrs, MergedAttrs};
use crate::citations::{Citation, CitationKind, CitationSet, reference_file};
use crate::render::{Alignment, Content, ItemFlags, ListKind, Matter, Render};
use crate::state::{MatterState, SectionState};
use crate::title::{TitleBlock, month_name};

/// How far into a comment payload a `source:` label may sit.
const SOURCE_WINDOW: usize = 20;

/// Renderer for one document. Create a fresh one per conversion.
#[derive(Debug, Default)]
pub struct RfcRenderer {
    standalone: bool,
    sections: SectionState,
    matter: MatterState,
    attrs: AttrQueue,
    citations: CitationSet,
    title: Option<TitleBlock>,
}

impl RfcRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a complete document rather than a body fragment.
    #[must_use]
    pub fn standalone(mut self, standalone: bool) -> Self {
        self.standalone = standalone;
        self
    }

    #[must_use]
    pub fn title(&self) -> Option<&TitleBlock> {
        self.title.as_ref()
    }

    #[must_use]
    pub fn citations(&self) -> &CitationSet {
        &self.citations
    }

    /// Whether the `<rfc>` envelope was opened and must be balanced.
    fn in_envelope(&self) -> bool {
        self.standalone && self.title.is_some()
    }

    fn drained_attrs(&mut self) -> MergedAttrs {
        MergedAttrs::from_sets(self.attrs.drain())
    }
}

impl Render for RfcRenderer {
    fn document_header(&mut self, out: &mut String) {
        if !self.standalone {
            return;
        }
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push_str("<!DOCTYPE rfc SYSTEM 'rfc2629.dtd' [ ]>\n");
    }

    fn document_footer(&mut self, out: &mut String) {
        self.sections.flush(out);
        if !self.in_envelope() {
            return;
        }
        out.push_str(match self.matter.current() {
            Matter::Front => "\n</front>\n",
            Matter::Main => "\n</middle>\n",
            Matter::Back => "\n</back>\n",
        });
        out.push_str("</rfc>\n");
    }

    fn title_block(&mut self, out: &mut String, block: &TitleBlock) {
        if !self.standalone {
            return;
        }
        self.title = Some(block.clone());
        out.push_str(&format!(
            "<rfc ipr=\"{}\" category=\"{}\" docName=\"{}\">\n",
            escape(&block.ipr),
            escape(&block.category),
            escape(&block.doc_name)
        ));
        out.push_str("<front>\n");
        out.push_str(&format!(
            "<title abbrev=\"{}\">{}</title>\n\n",
            escape(&block.abbrev),
            escape(&block.title)
        ));
        for author in &block.author {
            out.push_str(&format!(
                "<author initials=\"{}\" surname=\"{}\" fullname=\"{}\">\n",
                escape(&author.initials),
                escape(&author.surname),
                escape(&author.fullname)
            ));
            out.push_str(&format!(
                "<organization>{}</organization>\n",
                escape(&author.organization)
            ));
            out.push_str("<address>\n");
            out.push_str(&format!("<email>{}</email>\n", escape(&author.address.email)));
            out.push_str("</address>\n");
            out.push_str("</author>\n");
        }
        out.push_str(&date_markup(block.date));
        out.push_str(&format!("<area>{}</area>\n", escape(&block.area)));
        out.push_str(&format!("<workgroup>{}</workgroup>\n", escape(&block.workgroup)));
        for keyword in &block.keyword {
            out.push_str(&format!("<keyword>{}</keyword>\n", escape(keyword)));
        }
        out.push('\n');
    }

    fn document_matter(&mut self, out: &mut String, matter: Matter) {
        self.sections.flush(out);
        if let Some((from, to)) = self.matter.advance(matter)
            && self.in_envelope()
        {
            out.push_str(matter_markup(from, to));
        }
    }

    fn queue_attrs(&mut self, attrs: BlockAttrs) {
        self.attrs.enqueue(attrs);
    }

    fn heading(&mut self, out: &mut String, content: Content<'_>, level: u8, id: &str) {
        self.sections.open(level, out);
        let merged = self.drained_attrs();
        let anchor = merged.id.as_deref().unwrap_or(id);
        let mut title = String::new();
        content(&mut title);
        out.push_str(&format!(
            "\n<section anchor=\"{}\"{}",
            escape(anchor),
            pairs_markup(&merged.pairs)
        ));
        out.push_str(&format!(" title=\"{}\">\n", escape(title.trim())));
    }

    fn paragraph(&mut self, out: &mut String, content: Content<'_>, in_definition: bool) {
        let merged = self.drained_attrs();
        let mut body = String::new();
        if !content(&mut body) {
            return;
        }
        if in_definition {
            out.push_str(&body);
        } else {
            out.push_str(&format!("<t{}>", attrs_markup(&merged)));
            out.push_str(&body);
            out.push_str("</t>\n");
        }
    }

    fn list(
        &mut self,
        out: &mut String,
        content: Content<'_>,
        kind: ListKind,
        nested: bool,
        start: u64,
    ) {
        let attrs = attrs_markup(&self.drained_attrs());
        let mut body = String::new();
        if !content(&mut body) {
            return;
        }
        // Top-level lists sit inside a paragraph of their own.
        if !nested {
            out.push_str("<t>\n");
        }
        match kind {
            ListKind::Ordered if start > 1 => {
                out.push_str(&format!("<list style=\"numbers\"{attrs} start=\"{start}\">\n"));
            }
            ListKind::Ordered => out.push_str(&format!("<list style=\"numbers\"{attrs}>\n")),
            ListKind::Definition => out.push_str(&format!("<list style=\"hanging\"{attrs}>\n")),
            ListKind::Unordered => out.push_str(&format!("<list style=\"symbols\"{attrs}>\n")),
        }
        out.push_str(&body);
        match kind {
            // The last hanging item is still open.
            ListKind::Definition => out.push_str("</t>\n</list>\n"),
            _ => out.push_str("</list>\n"),
        }
        if !nested {
            out.push_str("</t>\n");
        }
    }

    fn list_item(&mut self, out: &mut String, text: &str, flags: ItemFlags) {
        if flags.kind == ListKind::Definition && !flags.term {
            out.push_str(text);
            return;
        }
        if flags.term {
            if !flags.first {
                out.push_str("</t>\n");
            }
            out.push_str(&format!("<t hangText=\"{}\">\n", escape(text.trim())));
            return;
        }
        out.push_str("<t>");
        out.push_str(text);
        out.push_str("</t>\n");
    }

    fn block_code(&mut self, out: &mut String, code: &str, _lang: Option<&str>) {
        let attrs = attrs_markup(&self.drained_attrs());
        out.push_str(&format!("\n<figure{attrs}><artwork>\n"));
        out.push_str(&escape(code));
        out.push_str("</artwork></figure>\n");
    }

    fn block_quote(&mut self, out: &mut String, text: &str) {
        let attrs = attrs_markup(&self.drained_attrs());
        out.push_str(&format!("<t><list style=\"empty\"{attrs}>\n"));
        out.push_str(text);
        out.push_str("</list></t>\n");
    }

    fn abstract_block(&mut self, out: &mut String, text: &str) {
        let attrs = attrs_markup(&self.drained_attrs());
        out.push_str(&format!("<abstract{attrs}>\n"));
        out.push_str(text);
        out.push_str("</abstract>\n");
    }

    fn aside(&mut self, out: &mut String, text: &str) {
        self.block_quote(out, text);
    }

    fn note(&mut self, out: &mut String, text: &str) {
        self.block_quote(out, text);
    }

    fn comment(&mut self, out: &mut String, text: &str) {
        match text.bytes().take(SOURCE_WINDOW).position(|b| b == b':') {
            Some(at) if at > 0 => {
                let source = &text[..at];
                let source = source.strip_prefix(' ').unwrap_or(source);
                out.push_str(&format!("<t><cref source=\"{}\">", escape(source)));
                out.push_str(&escape(&text[at + 1..]));
                out.push_str("</cref></t>\n");
            }
            Some(_) => {
                // Leading colon: unlabeled, colon consumed.
                out.push_str("<t><cref>\n");
                out.push_str(&escape(&text[1..]));
                out.push_str("</cref></t>\n");
            }
            None => {
                out.push_str("<t><cref>\n");
                out.push_str(&escape(text));
                out.push_str("</cref></t>\n");
            }
        }
    }

    fn table(&mut self, out: &mut String, header: &str, body: &str) {
        let attrs = attrs_markup(&self.drained_attrs());
        out.push_str(&format!("<texttable{attrs}>\n"));
        out.push_str(header);
        out.push_str(body);
        out.push_str("</texttable>\n");
    }

    fn table_row(&mut self, out: &mut String, cells: &str) {
        out.push_str(cells);
        out.push('\n');
    }

    fn table_header_cell(&mut self, out: &mut String, text: &str, align: Alignment) {
        out.push_str(&format!("<ttcol align=\"{}\">", align.name()));
        out.push_str(text);
        out.push_str("</ttcol>\n");
    }

    fn table_cell(&mut self, out: &mut String, text: &str, _align: Alignment) {
        out.push_str("<c>");
        out.push_str(text);
        out.push_str("</c>");
    }

    fn emphasis(&mut self, out: &mut String, text: &str) {
        out.push_str("<spanx style=\"emph\">");
        out.push_str(text);
        out.push_str("</spanx>");
    }

    fn strong(&mut self, out: &mut String, text: &str) {
        out.push_str("<spanx style=\"strong\">");
        out.push_str(text);
        out.push_str("</spanx>");
    }

    fn strong_emphasis(&mut self, out: &mut String, text: &str) {
        out.push_str("<spanx style=\"strong\"><spanx style=\"emph\">");
        out.push_str(text);
        out.push_str("</spanx></spanx>");
    }

    fn code_span(&mut self, out: &mut String, code: &str) {
        out.push_str("<spanx style=\"verb\">");
        out.push_str(&escape(code));
        out.push_str("</spanx>");
    }

    fn link(&mut self, out: &mut String, dest: &str, _content: &str) {
        // Fragment links become internal cross-references; the reference
        // text is regenerated by xml2rfc, so the link content is dropped.
        let target = dest.strip_prefix('#').unwrap_or(dest);
        out.push_str(&format!("<xref target=\"{}\"/>", escape(target)));
    }

    fn auto_link(&mut self, out: &mut String, dest: &str, is_email: bool) {
        if is_email && !dest.starts_with("mailto:") {
            out.push_str(&format!("<eref target=\"mailto:{}\"/>", escape(dest)));
        } else {
            out.push_str(&format!("<eref target=\"{}\"/>", escape(dest)));
        }
    }

    fn image(&mut self, out: &mut String, dest: &str, alt: &str) {
        // No image construct in the v2 vocabulary; keep the target as an
        // external reference with the alternative text as its label.
        if alt.is_empty() {
            out.push_str(&format!("<eref target=\"{}\"/>", escape(dest)));
        } else {
            out.push_str(&format!("<eref target=\"{}\">{}</eref>", escape(dest), escape(alt)));
        }
    }

    fn line_break(&mut self, out: &mut String) {
        out.push_str("\n<vspace/>\n");
    }

    fn index(&mut self, out: &mut String, primary: &str, secondary: Option<&str>) {
        match secondary {
            Some(sub) => out.push_str(&format!(
                "<iref item=\"{}\" subitem=\"{}\"/>",
                escape(primary),
                escape(sub)
            )),
            None => out.push_str(&format!("<iref item=\"{}\"/>", escape(primary))),
        }
    }

    fn citation(
        &mut self,
        out: &mut String,
        target: &str,
        kind: CitationKind,
        filename: Option<&str>,
    ) {
        self.citations.record(target, kind, filename);
        out.push_str(&format!("<xref target=\"{}\"/>", escape(target)));
    }

    fn record_citation(&mut self, target: &str, kind: CitationKind, filename: Option<&str>) {
        self.citations.record(target, kind, filename);
    }

    fn references(&mut self, out: &mut String) {
        if !self.standalone {
            return;
        }
        self.sections.flush(out);
        if let Some((from, to)) = self.matter.advance(Matter::Back)
            && self.in_envelope()
        {
            out.push_str(matter_markup(from, to));
        }
        tracing::debug!(count = self.citations.entries().len(), "emitting reference sections");
        for (kind, title) in [
            (CitationKind::Informative, "Informative References"),
            (CitationKind::Normative, "Normative References"),
        ] {
            let group: Vec<&Citation> = self.citations.of_kind(kind).collect();
            if group.is_empty() {
                continue;
            }
            out.push_str(&format!("<references title=\"{title}\">\n"));
            for citation in group {
                let file = citation
                    .filename
                    .clone()
                    .unwrap_or_else(|| reference_file(&citation.target));
                out.push_str(&format!("\t<?rfc include=\"{}\"?>\n", escape(&file)));
            }
            out.push_str("</references>\n");
        }
    }

    fn text(&mut self, out: &mut String, text: &str) {
        out.push_str(&escape(text));
    }
}

/// Escape text for element content and double-quoted attribute values.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn matter_markup(from: Matter, to: Matter) -> &'static str {
    match (from, to) {
        (Matter::Front, Matter::Main) => "</front>\n\n<middle>\n",
        (Matter::Main, Matter::Back) => "\n</middle>\n<back>\n",
        (Matter::Front, Matter::Back) => "</front>\n<back>\n",
        _ => "",
    }
}

fn attrs_markup(merged: &MergedAttrs) -> String {
    let mut markup = String::new();
    if let Some(id) = &merged.id {
        markup.push_str(&format!(" anchor=\"{}\"", escape(id)));
    }
    markup.push_str(&pairs_markup(&merged.pairs));
    markup
}

fn pairs_markup(pairs: &[(String, String)]) -> String {
    let mut markup = String::new();
    for (key, value) in pairs {
        markup.push_str(&format!(" {key}=\"{}\"", escape(value)));
    }
    markup
}

fn date_markup(date: Option<toml::value::Datetime>) -> String {
    let mut attrs = String::new();
    if let Some(date) = date.and_then(|d| d.date) {
        attrs.push_str(&format!(" year=\"{}\"", date.year));
        if let Some(month) = month_name(date.month) {
            attrs.push_str(&format!(" month=\"{month}\""));
        }
        if date.day > 0 {
            attrs.push_str(&format!(" day=\"{}\"", date.day));
        }
    }
    format!("<date{attrs}/>\n\n")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn content(text: &str) -> impl FnMut(&mut String) -> bool + '_ {
        move |out: &mut String| {
            out.push_str(text);
            !text.is_empty()
        }
    }

    fn item(kind: ListKind, term: bool, first: bool) -> ItemFlags {
        ItemFlags { kind, term, first }
    }

    /// Standalone renderer with its envelope already opened and the title
    /// output discarded.
    fn opened() -> (RfcRenderer, String) {
        let mut renderer = RfcRenderer::new().standalone(true);
        let mut out = String::new();
        renderer.title_block(&mut out, &TitleBlock::default());
        out.clear();
        (renderer, out)
    }

    #[test]
    fn test_paragraph_wraps_rendered_body() {
        let mut renderer = RfcRenderer::new();
        let mut out = String::new();
        renderer.paragraph(&mut out, &mut content("some text"), false);
        assert_eq!(out, "<t>some text</t>\n");
    }

    #[test]
    fn test_empty_paragraph_emits_nothing_and_consumes_attrs() {
        let mut renderer = RfcRenderer::new();
        let mut out = String::new();
        renderer.queue_attrs(BlockAttrs::parse("#gone"));
        renderer.paragraph(&mut out, &mut content(""), false);
        assert_eq!(out, "");

        renderer.paragraph(&mut out, &mut content("next"), false);
        assert_eq!(out, "<t>next</t>\n");
    }

    #[test]
    fn test_definition_paragraph_drops_the_wrapper() {
        let mut renderer = RfcRenderer::new();
        let mut out = String::new();
        renderer.paragraph(&mut out, &mut content("bare"), true);
        assert_eq!(out, "bare");
    }

    #[test]
    fn test_queued_attrs_attach_to_the_next_block_only() {
        let mut renderer = RfcRenderer::new();
        let mut out = String::new();
        renderer.queue_attrs(BlockAttrs::parse("#p1"));
        renderer.paragraph(&mut out, &mut content("first"), false);
        renderer.paragraph(&mut out, &mut content("second"), false);
        assert_eq!(out, "<t anchor=\"p1\">first</t>\n<t>second</t>\n");
    }

    #[test]
    fn test_heading_opens_a_section() {
        let mut renderer = RfcRenderer::new();
        let mut out = String::new();
        renderer.heading(&mut out, &mut content("Introduction"), 1, "intro");
        assert_eq!(out, "\n<section anchor=\"intro\" title=\"Introduction\">\n");
    }

    #[test]
    fn test_sibling_heading_closes_the_previous_section() {
        let mut renderer = RfcRenderer::new();
        let mut out = String::new();
        renderer.heading(&mut out, &mut content("One"), 1, "one");
        out.clear();
        renderer.heading(&mut out, &mut content("Two"), 1, "two");
        assert_eq!(out, "</section>\n\n<section anchor=\"two\" title=\"Two\">\n");
    }

    #[test]
    fn test_shallower_heading_closes_nested_sections() {
        let mut renderer = RfcRenderer::new();
        let mut out = String::new();
        renderer.heading(&mut out, &mut content("A"), 1, "a");
        renderer.heading(&mut out, &mut content("B"), 2, "b");
        renderer.heading(&mut out, &mut content("C"), 3, "c");
        out.clear();
        renderer.heading(&mut out, &mut content("D"), 2, "d");
        assert_eq!(out, "</section>\n</section>\n\n<section anchor=\"d\" title=\"D\">\n");
    }

    #[test]
    fn test_heading_attrs_override_the_walker_anchor() {
        let mut renderer = RfcRenderer::new();
        let mut out = String::new();
        renderer.queue_attrs(BlockAttrs::parse("#custom toc=include"));
        renderer.heading(&mut out, &mut content("T"), 1, "auto");
        assert_eq!(out, "\n<section anchor=\"custom\" toc=\"include\" title=\"T\">\n");
    }

    #[test]
    fn test_heading_title_text_is_escaped() {
        let mut renderer = RfcRenderer::new();
        let mut out = String::new();
        renderer.heading(&mut out, &mut content("a < b & \"c\""), 1, "cmp");
        assert_eq!(
            out,
            "\n<section anchor=\"cmp\" title=\"a &lt; b &amp; &quot;c&quot;\">\n"
        );
    }

    #[test]
    fn test_unordered_list_renders_symbols() {
        let mut renderer = RfcRenderer::new();
        let mut items = String::new();
        renderer.list_item(&mut items, "one", item(ListKind::Unordered, false, true));
        renderer.list_item(&mut items, "two", item(ListKind::Unordered, false, false));

        let mut out = String::new();
        renderer.list(&mut out, &mut content(&items), ListKind::Unordered, false, 0);
        assert_eq!(
            out,
            "<t>\n<list style=\"symbols\">\n<t>one</t>\n<t>two</t>\n</list>\n</t>\n"
        );
    }

    #[test]
    fn test_ordered_list_keeps_attrs_before_start() {
        let mut renderer = RfcRenderer::new();
        renderer.queue_attrs(BlockAttrs::parse("counter=reqs"));
        let mut out = String::new();
        renderer.list(&mut out, &mut content("<t>third</t>\n"), ListKind::Ordered, false, 3);
        assert_eq!(
            out,
            "<t>\n<list style=\"numbers\" counter=\"reqs\" start=\"3\">\n<t>third</t>\n\
             </list>\n</t>\n"
        );
    }

    #[test]
    fn test_ordered_list_starting_at_one_has_no_start_attr() {
        let mut renderer = RfcRenderer::new();
        let mut out = String::new();
        renderer.list(&mut out, &mut content("<t>x</t>\n"), ListKind::Ordered, false, 1);
        assert_eq!(out, "<t>\n<list style=\"numbers\">\n<t>x</t>\n</list>\n</t>\n");
    }

    #[test]
    fn test_nested_list_skips_the_paragraph_wrapper() {
        let mut renderer = RfcRenderer::new();
        let mut out = String::new();
        renderer.list(&mut out, &mut content("<t>inner</t>\n"), ListKind::Unordered, true, 0);
        assert_eq!(out, "<list style=\"symbols\">\n<t>inner</t>\n</list>\n");
    }

    #[test]
    fn test_empty_list_rolls_back_entirely() {
        let mut renderer = RfcRenderer::new();
        let mut out = String::new();
        renderer.queue_attrs(BlockAttrs::parse("#lost"));
        renderer.list(&mut out, &mut content(""), ListKind::Ordered, false, 0);
        assert_eq!(out, "");

        renderer.paragraph(&mut out, &mut content("after"), false);
        assert_eq!(out, "<t>after</t>\n");
    }

    #[test]
    fn test_definition_list_hangs_terms() {
        let mut renderer = RfcRenderer::new();
        let mut items = String::new();
        renderer.list_item(&mut items, "Term1", item(ListKind::Definition, true, true));
        renderer.list_item(&mut items, "first body", item(ListKind::Definition, false, false));
        renderer.list_item(&mut items, "Term2", item(ListKind::Definition, true, false));
        renderer.list_item(&mut items, "second body", item(ListKind::Definition, false, false));

        let mut out = String::new();
        renderer.list(&mut out, &mut content(&items), ListKind::Definition, false, 0);
        assert_eq!(
            out,
            "<t>\n<list style=\"hanging\">\n\
             <t hangText=\"Term1\">\nfirst body</t>\n\
             <t hangText=\"Term2\">\nsecond body</t>\n\
             </list>\n</t>\n"
        );
    }

    #[test]
    fn test_code_block_is_escaped_inside_artwork() {
        let mut renderer = RfcRenderer::new();
        let mut out = String::new();
        renderer.block_code(&mut out, "if a < b && c > d {}\n", Some("rust"));
        assert_eq!(
            out,
            "\n<figure><artwork>\nif a &lt; b &amp;&amp; c &gt; d {}\n</artwork></figure>\n"
        );
    }

    #[test]
    fn test_block_quote_fakes_an_empty_list() {
        let mut renderer = RfcRenderer::new();
        let mut out = String::new();
        renderer.block_quote(&mut out, "<t>quoted</t>\n");
        assert_eq!(out, "<t><list style=\"empty\">\n<t>quoted</t>\n</list></t>\n");
    }

    #[test]
    fn test_asides_and_notes_render_as_quotes() {
        let mut renderer = RfcRenderer::new();
        let mut quote = String::new();
        renderer.block_quote(&mut quote, "<t>x</t>\n");

        let mut aside = String::new();
        renderer.aside(&mut aside, "<t>x</t>\n");
        assert_eq!(aside, quote);

        let mut note = String::new();
        renderer.note(&mut note, "<t>x</t>\n");
        assert_eq!(note, quote);
    }

    #[test]
    fn test_abstract_block_carries_queued_attrs() {
        let mut renderer = RfcRenderer::new();
        let mut out = String::new();
        renderer.queue_attrs(BlockAttrs::parse("#overview"));
        renderer.abstract_block(&mut out, "<t>summary</t>\n");
        assert_eq!(out, "<abstract anchor=\"overview\">\n<t>summary</t>\n</abstract>\n");
    }

    #[test]
    fn test_comment_label_before_colon_becomes_the_source() {
        let mut renderer = RfcRenderer::new();
        let mut out = String::new();
        renderer.comment(&mut out, " rfc1234: some note text");
        assert_eq!(out, "<t><cref source=\"rfc1234\"> some note text</cref></t>\n");
    }

    #[test]
    fn test_comment_without_nearby_colon_is_unlabeled() {
        let mut renderer = RfcRenderer::new();
        let mut out = String::new();
        renderer.comment(&mut out, "a remark whose colon arrives: far too late");
        assert_eq!(
            out,
            "<t><cref>\na remark whose colon arrives: far too late</cref></t>\n"
        );
    }

    #[test]
    fn test_comment_with_leading_colon_consumes_it() {
        let mut renderer = RfcRenderer::new();
        let mut out = String::new();
        renderer.comment(&mut out, ": just a note");
        assert_eq!(out, "<t><cref>\n just a note</cref></t>\n");
    }

    #[test]
    fn test_table_assembles_header_and_body() {
        let mut renderer = RfcRenderer::new();

        let mut cells = String::new();
        renderer.table_header_cell(&mut cells, "Name", Alignment::Left);
        renderer.table_header_cell(&mut cells, "Value", Alignment::Center);
        let mut header = String::new();
        renderer.table_row(&mut header, &cells);

        cells.clear();
        renderer.table_cell(&mut cells, "a", Alignment::Left);
        renderer.table_cell(&mut cells, "1", Alignment::Center);
        let mut rows = String::new();
        renderer.table_row(&mut rows, &cells);

        let mut out = String::new();
        renderer.table(&mut out, &header, &rows);
        assert_eq!(
            out,
            "<texttable>\n\
             <ttcol align=\"left\">Name</ttcol>\n\
             <ttcol align=\"center\">Value</ttcol>\n\n\
             <c>a</c><c>1</c>\n\
             </texttable>\n"
        );
    }

    #[test]
    fn test_inline_spans_use_spanx_styles() {
        let mut renderer = RfcRenderer::new();
        let mut out = String::new();
        renderer.emphasis(&mut out, "em");
        renderer.strong(&mut out, "st");
        renderer.strong_emphasis(&mut out, "both");
        renderer.code_span(&mut out, "a < b");
        assert_eq!(
            out,
            "<spanx style=\"emph\">em</spanx>\
             <spanx style=\"strong\">st</spanx>\
             <spanx style=\"strong\"><spanx style=\"emph\">both</spanx></spanx>\
             <spanx style=\"verb\">a &lt; b</spanx>"
        );
    }

    #[test]
    fn test_fragment_links_become_cross_references() {
        let mut renderer = RfcRenderer::new();
        let mut out = String::new();
        renderer.link(&mut out, "#sec-1", "ignored text");
        assert_eq!(out, "<xref target=\"sec-1\"/>");
    }

    #[test]
    fn test_auto_links_become_external_references() {
        let mut renderer = RfcRenderer::new();
        let mut out = String::new();
        renderer.auto_link(&mut out, "https://example.org/x", false);
        renderer.auto_link(&mut out, "user@example.org", true);
        assert_eq!(
            out,
            "<eref target=\"https://example.org/x\"/><eref target=\"mailto:user@example.org\"/>"
        );
    }

    #[test]
    fn test_images_degrade_to_external_references() {
        let mut renderer = RfcRenderer::new();
        let mut out = String::new();
        renderer.image(&mut out, "https://example.org/fig.png", "a figure");
        assert_eq!(out, "<eref target=\"https://example.org/fig.png\">a figure</eref>");

        out.clear();
        renderer.image(&mut out, "local.png", "");
        assert_eq!(out, "<eref target=\"local.png\"/>");
    }

    #[test]
    fn test_index_entries_emit_iref_markers() {
        let mut renderer = RfcRenderer::new();
        let mut out = String::new();
        renderer.index(&mut out, "dns", Some("cookies"));
        renderer.index(&mut out, "udp", None);
        assert_eq!(out, "<iref item=\"dns\" subitem=\"cookies\"/><iref item=\"udp\"/>");
    }

    #[test]
    fn test_default_inline_fallbacks_pass_text_through() {
        let mut renderer = RfcRenderer::new();
        let mut out = String::new();
        renderer.strikethrough(&mut out, "kept");
        renderer.entity(&mut out, "&nbsp;");
        renderer.line_break(&mut out);
        assert_eq!(out, "kept&nbsp;\n<vspace/>\n");
    }

    #[test]
    fn test_embedded_mode_suppresses_the_envelope() {
        let mut renderer = RfcRenderer::new();
        let mut out = String::new();
        renderer.document_header(&mut out);
        renderer.title_block(&mut out, &TitleBlock::default());
        renderer.document_matter(&mut out, Matter::Main);
        assert_eq!(out, "");

        renderer.paragraph(&mut out, &mut content("body"), false);
        assert_eq!(out, "<t>body</t>\n");
    }

    #[test]
    fn test_embedded_footer_still_closes_sections() {
        let mut renderer = RfcRenderer::new();
        let mut out = String::new();
        renderer.heading(&mut out, &mut content("A"), 1, "a");
        renderer.heading(&mut out, &mut content("B"), 2, "b");
        out.clear();
        renderer.document_footer(&mut out);
        assert_eq!(out, "</section>\n</section>\n");
    }

    #[test]
    fn test_matter_transitions_emit_phase_markup() {
        let (mut renderer, mut out) = opened();
        renderer.document_matter(&mut out, Matter::Main);
        assert_eq!(out, "</front>\n\n<middle>\n");

        out.clear();
        renderer.document_matter(&mut out, Matter::Back);
        assert_eq!(out, "\n</middle>\n<back>\n");
    }

    #[test]
    fn test_same_phase_matter_still_flushes_sections() {
        let (mut renderer, mut out) = opened();
        renderer.document_matter(&mut out, Matter::Main);
        renderer.heading(&mut out, &mut content("A"), 1, "a");
        out.clear();
        renderer.document_matter(&mut out, Matter::Main);
        assert_eq!(out, "</section>\n");
    }

    #[test]
    fn test_backward_matter_request_is_refused() {
        let (mut renderer, mut out) = opened();
        renderer.document_matter(&mut out, Matter::Back);
        out.clear();
        renderer.document_matter(&mut out, Matter::Front);
        assert_eq!(out, "");

        renderer.document_footer(&mut out);
        assert_eq!(out, "\n</back>\n</rfc>\n");
    }

    #[test]
    fn test_matter_may_jump_straight_to_back() {
        let (mut renderer, mut out) = opened();
        renderer.document_matter(&mut out, Matter::Back);
        assert_eq!(out, "</front>\n<back>\n");
    }

    #[test]
    fn test_citation_emits_marker_and_records() {
        let mut renderer = RfcRenderer::new();
        let mut out = String::new();
        renderer.citation(&mut out, "RFC2119", CitationKind::Normative, None);
        assert_eq!(out, "<xref target=\"RFC2119\"/>");
        assert_eq!(renderer.citations().entries().len(), 1);
    }

    #[test]
    fn test_suppressed_citation_records_without_marker() {
        let mut renderer = RfcRenderer::new();
        renderer.record_citation("RFC7873", CitationKind::Informative, None);
        assert_eq!(renderer.citations().entries().len(), 1);
        assert_eq!(renderer.citations().entries()[0].kind, CitationKind::Informative);
    }

    #[test]
    fn test_references_group_informative_before_normative() {
        let (mut renderer, mut out) = opened();
        renderer.document_matter(&mut out, Matter::Main);
        out.clear();

        renderer.citation(&mut out, "RFC2119", CitationKind::Normative, None);
        renderer.record_citation("RFC1034", CitationKind::Informative, None);
        renderer.record_citation("I-D.ietf-dnsop-cookies", CitationKind::Informative, None);
        out.clear();

        renderer.references(&mut out);
        assert_eq!(
            out,
            "\n</middle>\n<back>\n\
             <references title=\"Informative References\">\n\
             \t<?rfc include=\"reference.RFC.1034.xml\"?>\n\
             \t<?rfc include=\"reference.I-D.ietf-dnsop-cookies.xml\"?>\n\
             </references>\n\
             <references title=\"Normative References\">\n\
             \t<?rfc include=\"reference.RFC.2119.xml\"?>\n\
             </references>\n"
        );
    }

    #[test]
    fn test_explicit_reference_files_are_kept() {
        let (mut renderer, mut out) = opened();
        renderer.record_citation(
            "XML",
            CitationKind::Informative,
            Some("reference.W3C.REC-xml.xml"),
        );
        renderer.references(&mut out);
        assert!(out.contains("\t<?rfc include=\"reference.W3C.REC-xml.xml\"?>\n"));
    }

    #[test]
    fn test_references_without_citations_only_force_back_matter() {
        let (mut renderer, mut out) = opened();
        renderer.references(&mut out);
        assert_eq!(out, "</front>\n<back>\n");
    }

    #[test]
    fn test_references_in_embedded_mode_emit_nothing() {
        let mut renderer = RfcRenderer::new();
        let mut out = String::new();
        renderer.record_citation("RFC2119", CitationKind::Normative, None);
        renderer.references(&mut out);
        assert_eq!(out, "");
    }

    #[test]
    fn test_references_close_open_sections_first() {
        let (mut renderer, mut out) = opened();
        renderer.document_matter(&mut out, Matter::Main);
        renderer.heading(&mut out, &mut content("Body"), 1, "body");
        renderer.record_citation("RFC2119", CitationKind::Normative, None);
        out.clear();

        renderer.references(&mut out);
        assert!(out.starts_with("</section>\n\n</middle>\n<back>\n"));
    }

    #[test]
    fn test_title_block_renders_complete_front_matter() {
        let block = TitleBlock::from_toml(
            r#"
title = "Example"
abbrev = "ex"
docName = "draft-example-00"
ipr = "trust200902"
category = "info"
area = "Internet"
workgroup = "Example WG"
keyword = ["example"]
date = 2015-03-09

[[author]]
initials = "A."
surname = "Author"
fullname = "Ann Author"
organization = "Example Org"
  [author.address]
  email = "ann@example.org"
"#,
        )
        .unwrap();

        let mut renderer = RfcRenderer::new().standalone(true);
        let mut out = String::new();
        renderer.title_block(&mut out, &block);
        assert_eq!(
            out,
            "<rfc ipr=\"trust200902\" category=\"info\" docName=\"draft-example-00\">\n\
             <front>\n\
             <title abbrev=\"ex\">Example</title>\n\n\
             <author initials=\"A.\" surname=\"Author\" fullname=\"Ann Author\">\n\
             <organization>Example Org</organization>\n\
             <address>\n\
             <email>ann@example.org</email>\n\
             </address>\n\
             </author>\n\
             <date year=\"2015\" month=\"March\" day=\"9\"/>\n\n\
             <area>Internet</area>\n\
             <workgroup>Example WG</workgroup>\n\
             <keyword>example</keyword>\n\n"
        );
    }

    #[test]
    fn test_standalone_document_closes_cleanly() {
        let mut renderer = RfcRenderer::new().standalone(true);
        let mut out = String::new();
        renderer.document_header(&mut out);
        renderer.title_block(&mut out, &TitleBlock::default());
        renderer.document_matter(&mut out, Matter::Main);
        renderer.heading(&mut out, &mut content("Intro"), 1, "intro");
        renderer.citation(&mut out, "RFC2119", CitationKind::Normative, None);
        renderer.references(&mut out);
        renderer.document_footer(&mut out);

        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
        assert!(out.contains("</front>\n\n<middle>\n"));
        assert!(out.contains("</section>\n\n</middle>\n<back>\n"));
        assert!(out.ends_with("</references>\n\n</back>\n</rfc>\n"));
    }
}
