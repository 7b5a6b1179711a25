//! Markdown to RFC 2629 XML conversion.
//!
//! The pipeline has three stages: [`preprocess`](crate::preprocess) splits
//! the `%%%` title block off and rewrites dialect lines into comment
//! markers, pulldown-cmark parses the prepared source, and a [`Walker`]
//! drives the [`md2rfc_renderer`] backend over the event stream. The
//! [`Converter`] ties the stages together and appends the collected
//! reference sections and the document footer.

mod inline;
mod preprocess;
mod walker;

pub use md2rfc_renderer::{Citation, CitationKind};
pub use walker::Walker;

use md2rfc_renderer::{Render, RfcRenderer, TitleBlock};
use pulldown_cmark::{Options, Parser};

use crate::preprocess::{Preprocessor, split_title_block};

/// Conversion pipeline error.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("title block is not closed by a '%%%' fence")]
    UnterminatedTitleBlock,
    #[error("title block: {0}")]
    TitleBlock(#[from] toml::de::Error),
}

/// Result of one conversion.
#[derive(Clone, Debug)]
pub struct Conversion {
    /// The rendered XML document or fragment.
    pub xml: String,
    /// Document title from the title block, when one carried a title.
    pub title: Option<String>,
    /// Output file stem from the title block's `docName`.
    pub doc_name: Option<String>,
    /// Citations collected while rendering, in first-use order.
    pub citations: Vec<Citation>,
    /// Non-fatal problems found along the way.
    pub warnings: Vec<String>,
}

/// Converter with document-level options.
///
/// # Example
///
/// ```
/// use md2rfc_core::Converter;
///
/// let conversion = Converter::new()
///     .standalone(false)
///     .convert("Some *markdown*.\n")?;
/// assert_eq!(
///     conversion.xml,
///     "<t>Some <spanx style=\"emph\">markdown</spanx>.</t>\n"
/// );
/// # Ok::<(), md2rfc_core::ConvertError>(())
/// ```
#[derive(Clone, Debug)]
pub struct Converter {
    standalone: bool,
    default_ipr: Option<String>,
    default_category: Option<String>,
}

impl Converter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            standalone: true,
            default_ipr: None,
            default_category: None,
        }
    }

    /// Emit a complete document with XML preamble and `<rfc>` envelope, or
    /// a bare body fragment for embedding.
    #[must_use]
    pub fn standalone(mut self, standalone: bool) -> Self {
        self.standalone = standalone;
        self
    }

    /// Fallback `ipr` value for title blocks that leave it empty.
    #[must_use]
    pub fn default_ipr(mut self, ipr: impl Into<String>) -> Self {
        self.default_ipr = Some(ipr.into());
        self
    }

    /// Fallback `category` value for title blocks that leave it empty.
    #[must_use]
    pub fn default_category(mut self, category: impl Into<String>) -> Self {
        self.default_category = Some(category.into());
        self
    }

    /// Convert one markdown document.
    pub fn convert(&self, source: &str) -> Result<Conversion, ConvertError> {
        let (title_toml, body) = split_title_block(source)?;
        let title = match title_toml {
            Some(toml) => Some(self.apply_defaults(TitleBlock::from_toml(toml)?)),
            None => None,
        };
        let prepared = Preprocessor::new().process(body);
        tracing::debug!(
            bytes = prepared.len(),
            standalone = self.standalone,
            "converting document"
        );

        let mut renderer = RfcRenderer::new().standalone(self.standalone);
        let mut out = String::with_capacity(source.len() * 2);
        renderer.document_header(&mut out);
        if let Some(block) = &title {
            renderer.title_block(&mut out, block);
        }
        let mut walker = Walker::new(renderer, out);
        walker.walk(Parser::new_ext(&prepared, parser_options()));
        let (mut renderer, mut xml, warnings) = walker.finish();
        if !renderer.citations().is_empty() {
            renderer.references(&mut xml);
        }
        renderer.document_footer(&mut xml);

        Ok(Conversion {
            xml,
            title: title
                .as_ref()
                .map(|block| block.title.clone())
                .filter(|t| !t.is_empty()),
            doc_name: title
                .as_ref()
                .map(|block| block.doc_name.clone())
                .filter(|name| !name.is_empty()),
            citations: renderer.citations().entries().to_vec(),
            warnings,
        })
    }

    fn apply_defaults(&self, mut block: TitleBlock) -> TitleBlock {
        if block.ipr.is_empty()
            && let Some(ipr) = &self.default_ipr
        {
            block.ipr = ipr.clone();
        }
        if block.category.is_empty()
            && let Some(category) = &self.default_category
        {
            block.category = category.clone();
        }
        block
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

/// Extensions the dialect relies on; everything else stays CommonMark.
pub(crate) fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_DEFINITION_LIST
        | Options::ENABLE_HEADING_ATTRIBUTES
}
