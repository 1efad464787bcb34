//! Extraction of declarations from Terraform configuration text.
//!
//! This module turns raw HCL text into a [`ConfigurationDocument`] holding
//! the resources, variables and outputs declared at top level.
//!
//! # Supported Constructs
//!
//! - `resource "<kind>" "<name>" { ... }` with string-rendered attributes
//! - `variable "<name>" { ... }`
//! - `output "<name>" { ... }`
//!
//! Other blocks are skipped. Only text that cannot be tokenized is an error;
//! malformed declarations are dropped and unevaluable values render as
//! [`UNKNOWN_VALUE`].
//!
//! # Example
//!
//! ```rust
//! use infraexplain::parser;
//!
//! let doc = parser::parse(r#"
//! resource "aws_s3_bucket" "logs" {
//!   bucket = "my-logs"
//! }
//! "#).unwrap();
//!
//! assert_eq!(doc.resources[0].name, "logs");
//! ```

mod hcl;
mod lexer;
mod value;

pub use hcl::HclParser;
pub use lexer::{tokenize, Token, TokenKind};
pub use value::{Value, UNKNOWN_VALUE};

use crate::types::ConfigurationDocument;

/// Trait for extracting a document from configuration text.
///
/// This trait allows for different parsing implementations
/// (e.g., for testing with mock parsers).
pub trait Parser: Send + Sync {
    /// Parse the contents of one configuration text.
    ///
    /// # Errors
    ///
    /// Returns a `Lexical` error if the text cannot be tokenized.
    fn parse_content(&self, content: &str) -> crate::Result<ConfigurationDocument>;
}

/// Parse configuration text with the default extractor.
///
/// The returned document has no findings; see [`crate::analyzer`].
///
/// # Errors
///
/// Returns a `Lexical` error if the text cannot be tokenized.
pub fn parse(content: &str) -> crate::Result<ConfigurationDocument> {
    HclParser::new().parse_content(content)
}
