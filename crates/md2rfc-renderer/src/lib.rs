//! Rendering backend for RFC 2629 (xml2rfc v2) document output.
//!
//! The crate defines the [`Render`] contract a document walker drives and
//! [`RfcRenderer`], the xml2rfc v2 implementation of it. Rendering is
//! push-based: the walker calls one method per structural element in
//! document order and the renderer keeps the document-wide state between
//! calls: open sections, the matter phase, queued block attributes and the
//! citations collected for the reference sections.

mod attrs;
mod citations;
mod render;
mod state;
mod title;
mod xml2rfc;

pub use attrs::BlockAttrs;
pub use citations::{Citation, CitationKind, CitationSet, reference_file};
pub use render::{Alignment, Content, ItemFlags, ListKind, Matter, Render};
pub use title::{Address, Author, TitleBlock};
pub use xml2rfc::RfcRenderer;
