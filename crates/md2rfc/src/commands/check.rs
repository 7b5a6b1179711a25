//! `md2rfc check` command implementation.

use std::path::PathBuf;

use clap::Args;
use md2rfc_config::{CliSettings, Config};
use md2rfc_core::{CitationKind, Converter};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Path to the markdown file.
    markdown_file: PathBuf,

    /// Path to configuration file (default: auto-discover md2rfc.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// Renders the document in memory and reports what the conversion
    /// found without writing any output.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or conversion fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), Some(&CliSettings::default()))?;
        let markdown_text = std::fs::read_to_string(&self.markdown_file)?;

        output.highlight(&format!("Checking {}...", self.markdown_file.display()));

        let converter = Converter::new()
            .standalone(config.output.standalone)
            .default_ipr(&config.document.ipr)
            .default_category(&config.document.category);
        let conversion = converter.convert(&markdown_text)?;

        if let Some(title) = &conversion.title {
            output.info(&format!("Title: {title}"));
        }
        if let Some(doc_name) = &conversion.doc_name {
            output.info(&format!("Document: {doc_name}"));
        }

        let normative = conversion
            .citations
            .iter()
            .filter(|c| c.kind == CitationKind::Normative)
            .count();
        let informative = conversion.citations.len() - normative;
        output.info(&format!(
            "References: {normative} normative, {informative} informative"
        ));

        if conversion.warnings.is_empty() {
            output.success("No warnings.");
        } else {
            for warning in &conversion.warnings {
                output.warning(&format!("Warning: {warning}"));
            }
            output.warning(&format!("{} warning(s) found", conversion.warnings.len()));
        }

        Ok(())
    }
}
