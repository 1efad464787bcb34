//! Report generation module.
//!
//! This module renders analyzed documents in multiple formats:
//! - Text: Human-readable CLI output
//! - JSON: Machine-readable report with metadata and summary
//! - YAML: The document itself
//!
//! # Example
//!
//! ```rust
//! use infraexplain::reporter::Reporter;
//! use infraexplain::types::ReportFormat;
//! use infraexplain::Config;
//!
//! let doc = infraexplain::parse_and_analyze("variable \"region\" {}\n").unwrap();
//! let reporter = Reporter::new(&Config::default());
//!
//! let json = reporter.generate(&doc, ReportFormat::Json).unwrap();
//! assert!(json.contains("\"region\""));
//! ```

mod json;
mod text;
mod yaml;

use crate::config::Config;
use crate::error::Result;
use crate::types::{ConfigurationDocument, ReportFormat};

pub use json::{JsonReport, JsonReporter, ReportMetadata};
pub use text::TextReporter;
pub use yaml::YamlReporter;

/// Report generator that supports multiple output formats.
pub struct Reporter {
    config: Config,
}

impl Reporter {
    /// Create a new reporter with the given configuration.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Generate a report in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if report generation fails.
    pub fn generate(&self, doc: &ConfigurationDocument, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Json => JsonReporter::new(&self.config).generate(doc),
            ReportFormat::Text => TextReporter::new(&self.config).generate(doc),
            ReportFormat::Yaml => YamlReporter.generate(doc),
        }
    }
}

/// Trait for report generators.
pub trait ReportGenerator {
    /// Generate a report from an analyzed document.
    ///
    /// # Errors
    ///
    /// Returns an error if generation fails.
    fn generate(&self, doc: &ConfigurationDocument) -> Result<String>;
}
