//! Citation collation for the reference sections.
//!
//! Citations are recorded as they appear in the body and replayed, grouped
//! by kind, when the reference sections are emitted. The first mention of a
//! target fixes both its position and its kind; later mentions may only fill
//! in a missing reference filename.

use std::collections::HashMap;

/// Whether a reference is required reading for the document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CitationKind {
    #[default]
    Informative,
    Normative,
}

/// One collected citation target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Citation {
    pub target: String,
    pub kind: CitationKind,
    /// Explicit reference file, when the document supplied one.
    pub filename: Option<String>,
}

/// Citations collected over one document, in first-seen order.
#[derive(Debug, Default)]
pub struct CitationSet {
    entries: Vec<Citation>,
    index: HashMap<String, usize>,
}

impl CitationSet {
    /// Record a mention of `target`. New targets append; known targets keep
    /// their original kind and position. A later mention may supply a
    /// filename the first one lacked.
    pub fn record(&mut self, target: &str, kind: CitationKind, filename: Option<&str>) {
        if let Some(&at) = self.index.get(target) {
            let known = &mut self.entries[at];
            if known.kind != kind {
                tracing::warn!(target, "citation kind conflicts with an earlier mention");
            }
            if known.filename.is_none() {
                known.filename = filename.map(str::to_owned);
            }
            return;
        }
        self.index.insert(target.to_owned(), self.entries.len());
        self.entries.push(Citation {
            target: target.to_owned(),
            kind,
            filename: filename.map(str::to_owned),
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[Citation] {
        &self.entries
    }

    /// Entries of one kind, still in first-seen order.
    pub fn of_kind(&self, kind: CitationKind) -> impl Iterator<Item = &Citation> {
        self.entries.iter().filter(move |c| c.kind == kind)
    }
}

/// Derive the bibliography include file for a citation target.
///
/// `RFC2119` and `I-D.ietf-some-draft` map onto the bibxml library naming
/// scheme; anything else keeps the target verbatim. Alternate spellings of
/// the same series entry (`RFC2119` and `RFC.2119`) intentionally share a
/// file.
#[must_use]
pub fn reference_file(target: &str) -> String {
    if let Some(digits) = target.strip_prefix("RFC")
        && !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
    {
        return format!("reference.RFC.{digits}.xml");
    }
    if let Some(name) = target.strip_prefix("I-D.")
        && !name.is_empty()
    {
        return format!("reference.I-D.{name}.xml");
    }
    format!("reference.{target}.xml")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_records_in_first_seen_order() {
        let mut set = CitationSet::default();
        set.record("RFC2119", CitationKind::Normative, None);
        set.record("RFC7322", CitationKind::Informative, None);
        set.record("RFC2119", CitationKind::Normative, None);

        let targets: Vec<_> = set.entries().iter().map(|c| c.target.as_str()).collect();
        assert_eq!(targets, vec!["RFC2119", "RFC7322"]);
    }

    #[test]
    fn test_first_kind_wins_on_conflict() {
        let mut set = CitationSet::default();
        set.record("RFC2119", CitationKind::Normative, None);
        set.record("RFC2119", CitationKind::Informative, None);
        assert_eq!(set.entries()[0].kind, CitationKind::Normative);
    }

    #[test]
    fn test_later_mention_fills_missing_filename() {
        let mut set = CitationSet::default();
        set.record("XML", CitationKind::Informative, None);
        set.record("XML", CitationKind::Informative, Some("reference.XML.xml"));
        set.record("XML", CitationKind::Informative, Some("other.xml"));
        assert_eq!(set.entries()[0].filename.as_deref(), Some("reference.XML.xml"));
    }

    #[test]
    fn test_groups_preserve_document_order() {
        let mut set = CitationSet::default();
        set.record("RFC1034", CitationKind::Informative, None);
        set.record("RFC2119", CitationKind::Normative, None);
        set.record("RFC1035", CitationKind::Informative, None);

        let informative: Vec<_> = set
            .of_kind(CitationKind::Informative)
            .map(|c| c.target.as_str())
            .collect();
        assert_eq!(informative, vec!["RFC1034", "RFC1035"]);

        let normative: Vec<_> = set
            .of_kind(CitationKind::Normative)
            .map(|c| c.target.as_str())
            .collect();
        assert_eq!(normative, vec!["RFC2119"]);
    }

    #[test]
    fn test_reference_files_follow_the_bibxml_scheme() {
        assert_eq!(reference_file("RFC2119"), "reference.RFC.2119.xml");
        assert_eq!(
            reference_file("I-D.ietf-dnsop-cookies"),
            "reference.I-D.ietf-dnsop-cookies.xml"
        );
        assert_eq!(reference_file("W3C.REC-xml"), "reference.W3C.REC-xml.xml");
        // Not an RFC number, so the target passes through verbatim.
        assert_eq!(reference_file("RFCED"), "reference.RFCED.xml");
    }
}
