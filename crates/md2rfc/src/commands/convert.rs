//! `md2rfc convert` command implementation.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use md2rfc_config::{CliSettings, Config};
use md2rfc_core::Converter;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the convert command.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Path to the markdown file.
    markdown_file: PathBuf,

    /// Output file path, "-" for stdout (default: input with .xml extension).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover md2rfc.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit a complete document with XML preamble and rfc envelope
    /// (default: enabled).
    #[arg(long)]
    standalone: Option<bool>,

    /// Emit inner block markup only, without the document envelope.
    #[arg(long, conflicts_with = "standalone")]
    fragment: bool,

    /// Default IPR declaration for title blocks that omit one (overrides config).
    #[arg(long)]
    ipr: Option<String>,

    /// Default document category (overrides config).
    #[arg(long)]
    category: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl ConvertArgs {
    /// Execute the convert command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, conversion, or writing fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            standalone: self.resolve_standalone(),
            ipr: self.ipr.clone(),
            category: self.category.clone(),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        tracing::debug!(config = ?config.config_path, "configuration loaded");

        let markdown_text = std::fs::read_to_string(&self.markdown_file)?;
        output.info(&format!("Converting {}...", self.markdown_file.display()));

        let converter = Converter::new()
            .standalone(config.output.standalone)
            .default_ipr(&config.document.ipr)
            .default_category(&config.document.category);
        let conversion = converter.convert(&markdown_text)?;

        for warning in &conversion.warnings {
            output.warning(&format!("Warning: {warning}"));
        }

        let destination = self.resolve_destination();
        write_xml(&destination, &conversion.xml)?;

        if let Destination::File(path) = &destination {
            output.success(&format!("Wrote {}", path.display()));
        }

        Ok(())
    }

    /// Resolve `standalone` from --standalone/--fragment flags.
    fn resolve_standalone(&self) -> Option<bool> {
        self.fragment.then_some(false).or(self.standalone)
    }

    /// Resolve where the converted document goes.
    fn resolve_destination(&self) -> Destination {
        match &self.output {
            Some(path) if path.as_os_str() == "-" => Destination::Stdout,
            Some(path) => Destination::File(path.clone()),
            None => Destination::File(self.markdown_file.with_extension("xml")),
        }
    }
}

/// Output target for the converted document.
#[derive(Debug, PartialEq, Eq)]
enum Destination {
    Stdout,
    File(PathBuf),
}

fn write_xml(destination: &Destination, xml: &str) -> Result<(), CliError> {
    match destination {
        Destination::Stdout => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(xml.as_bytes())?;
        }
        Destination::File(path) => {
            std::fs::write(path, xml)?;
        }
    }
    Ok(())
}
