//! Inline scanning for citation and index marks.
//!
//! CommonMark has no syntax for `[@RFC2119]` citations or `(((item)))` index
//! entries, so they arrive as plain text. The scanner splits text runs
//! around the marks and forwards the pieces to the renderer in order.

use std::sync::LazyLock;

use md2rfc_renderer::{CitationKind, Render};
use regex::Regex;

static INLINE_MARKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\(\(\((?P<item>[^(),]+)(?:,(?P<subitem>[^()]+))?\)\)\)",
        "|",
        r"\[(?P<suppress>-)?@(?P<kind>[!?])?(?P<target>[^\]\s]+)\]",
    ))
    .expect("inline mark pattern is valid")
});

/// Scan a text run, emitting plain segments and any embedded marks.
pub(crate) fn scan_text<R: Render>(renderer: &mut R, out: &mut String, text: &str) {
    let mut last = 0;
    for caps in INLINE_MARKS.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            renderer.text(out, &text[last..whole.start()]);
        }
        if let Some(item) = caps.name("item") {
            let subitem = caps
                .name("subitem")
                .map(|m| m.as_str().trim())
                .filter(|s| !s.is_empty());
            renderer.index(out, item.as_str().trim(), subitem);
        } else if let Some(target) = caps.name("target") {
            let kind = match caps.name("kind").map(|m| m.as_str()) {
                Some("!") => CitationKind::Normative,
                _ => CitationKind::Informative,
            };
            if caps.name("suppress").is_some() {
                renderer.record_citation(target.as_str(), kind, None);
            } else {
                renderer.citation(out, target.as_str(), kind, None);
            }
        }
        last = whole.end();
    }
    if last < text.len() {
        renderer.text(out, &text[last..]);
    }
}

#[cfg(test)]
mod tests {
    use md2rfc_renderer::RfcRenderer;
    use pretty_assertions::assert_eq;

    use super::*;

    fn scan(text: &str) -> (String, RfcRenderer) {
        let mut renderer = RfcRenderer::new();
        let mut out = String::new();
        scan_text(&mut renderer, &mut out, text);
        (out, renderer)
    }

    #[test]
    fn test_plain_text_is_escaped_and_forwarded() {
        let (out, _) = scan("a < b & c");
        assert_eq!(out, "a &lt; b &amp; c");
    }

    #[test]
    fn test_citations_become_xref_targets() {
        let (out, renderer) = scan("MUST per [@!RFC2119], see also [@?RFC1035].");
        assert_eq!(
            out,
            "MUST per <xref target=\"RFC2119\"/>, see also <xref target=\"RFC1035\"/>."
        );
        let targets: Vec<&str> = renderer
            .citations()
            .entries()
            .iter()
            .map(|c| c.target.as_str())
            .collect();
        assert_eq!(targets, ["RFC2119", "RFC1035"]);
    }

    #[test]
    fn test_bare_citation_defaults_to_informative() {
        let (out, renderer) = scan("[@RFC7873]");
        assert_eq!(out, "<xref target=\"RFC7873\"/>");
        assert_eq!(
            renderer.citations().entries()[0].kind,
            CitationKind::Informative
        );
    }

    #[test]
    fn test_suppressed_citation_leaves_no_marker() {
        let (out, renderer) = scan("Recorded silently[-@RFC7873].");
        assert_eq!(out, "Recorded silently.");
        assert_eq!(renderer.citations().entries().len(), 1);
    }

    #[test]
    fn test_index_entries_take_an_optional_subitem() {
        let (out, _) = scan("cookies(((cookies, DNS))) and servers(((server)))");
        assert_eq!(
            out,
            "cookies<iref item=\"cookies\" subitem=\"DNS\"/> and servers<iref item=\"server\"/>"
        );
    }

    #[test]
    fn test_unmarked_brackets_stay_literal() {
        let (out, _) = scan("an [array] and (parens)");
        assert_eq!(out, "an [array] and (parens)");
    }
}
