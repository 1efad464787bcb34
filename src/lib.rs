//! # InfraExplain
//!
//! A Terraform configuration analyzer and explainer.
//!
//! InfraExplain reads Terraform HCL text, extracts the declared resources,
//! variables and outputs, flags common security and configuration issues,
//! and describes the result in plain language.
//!
//! ## Features
//!
//! - **Extraction**: top-level `resource`, `variable` and `output` blocks,
//!   with every resource attribute rendered to a string
//! - **Analysis**: built-in rules for open security groups, wildcard IAM
//!   policies and empty resources, plus custom rules from configuration
//! - **Explanation**: prompts for an OpenAI-compatible completion API, with
//!   an offline fallback
//! - **HTTP service**: `/health`, `/explain` and `/parse`
//! - **Multiple output formats**: plain text, JSON and YAML reports
//!
//! ## Example
//!
//! ```rust
//! use infraexplain::parse_and_analyze;
//!
//! let doc = parse_and_analyze(r#"
//! resource "aws_security_group" "web" {
//!   cidr_blocks = ["0.0.0.0/0"]
//! }
//! "#).unwrap();
//!
//! assert_eq!(doc.resources.len(), 1);
//! assert!(doc.has_security_findings());
//! ```

#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod explainer;
pub mod parser;
pub mod reporter;
pub mod server;
pub mod types;

// Re-export commonly used types at crate root
pub use config::Config;
pub use error::{InfraExplainError, Result};
pub use types::{ConfigurationDocument, Finding, FindingCategory, ReportFormat, ResourceDeclaration};

use analyzer::Analyzer;
use parser::{HclParser, Parser};

/// Parse configuration text and analyze it with the built-in rules.
///
/// # Errors
///
/// Returns a `Lexical` error if the text cannot be tokenized.
pub fn parse_and_analyze(text: &str) -> Result<ConfigurationDocument> {
    Inspector::default().inspect(text)
}

/// Extractor and analyzer bundled behind one call.
///
/// The `Inspector` is the primary entry point for using InfraExplain as a
/// library when the rule set comes from configuration.
///
/// # Example
///
/// ```rust
/// use infraexplain::{Config, Inspector};
///
/// let mut config = Config::default();
/// config.analysis.disabled_rules.push("IE003".to_string());
///
/// let inspector = Inspector::new(&config).unwrap();
/// let doc = inspector.inspect("resource \"aws_s3_bucket\" \"logs\" {}\n").unwrap();
/// assert!(doc.findings.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct Inspector {
    parser: HclParser,
    analyzer: Analyzer,
}

impl Inspector {
    /// Create an inspector whose rules come from the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured rule is invalid.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_analyzer(Analyzer::from_config(config)?))
    }

    /// Create an inspector around an existing analyzer.
    #[must_use]
    pub fn with_analyzer(analyzer: Analyzer) -> Self {
        Self {
            parser: HclParser::new(),
            analyzer,
        }
    }

    /// The analyzer in use.
    #[must_use]
    pub const fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// Extract and analyze configuration text.
    ///
    /// # Errors
    ///
    /// Returns a `Lexical` error if the text cannot be tokenized.
    pub fn inspect(&self, text: &str) -> Result<ConfigurationDocument> {
        let document = self.parser.parse_content(text)?;
        let document = self.analyzer.annotate(document);

        tracing::debug!(
            resources = document.resources.len(),
            variables = document.variables.len(),
            outputs = document.outputs.len(),
            findings = document.findings.len(),
            "Inspection complete"
        );

        Ok(document)
    }
}
