//! Core data types used throughout InfraExplain.
//!
//! This module defines the structured model extracted from Terraform text:
//! - Resource declarations with string-rendered properties
//! - Variable and output names
//! - Advisory findings produced by the analyzer
//! - Report formats

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A `resource "<kind>" "<name>" { ... }` block.
///
/// Properties map every top-level attribute of the block body to a string
/// rendering of its value. Values that cannot be evaluated without context
/// render as [`crate::parser::UNKNOWN_VALUE`].
///
/// # Example HCL
///
/// ```hcl
/// resource "aws_s3_bucket" "logs" {
///   bucket = "my-logs"
///   acl    = "private"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDeclaration {
    /// The resource kind, the first label (e.g. "aws_s3_bucket")
    #[serde(rename = "type", alias = "kind")]
    pub kind: String,

    /// The resource name, the second label (e.g. "logs")
    pub name: String,

    /// Attribute name to rendered value
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl ResourceDeclaration {
    /// Creates a declaration with no properties.
    #[must_use]
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Adds a property, replacing any previous value for the same key.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// The Terraform address of the resource, `kind.name`.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}.{}", self.kind, self.name)
    }

    /// Returns the rendered value of a property, if declared.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

/// Category of findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingCategory {
    /// Security risk
    Security,
    /// Missing or incomplete configuration
    Improvement,
}

impl std::fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Security => write!(f, "security"),
            Self::Improvement => write!(f, "improvement"),
        }
    }
}

/// A single advisory finding from the analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Stable identifier of the rule that produced this finding
    pub code: String,

    /// Category of the finding
    #[serde(alias = "type")]
    pub category: FindingCategory,

    /// Human-readable message
    pub message: String,

    /// Address (`kind.name`) of the resource the finding is about
    pub resource: String,
}

impl Finding {
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        category: FindingCategory,
        message: impl Into<String>,
        resource: &ResourceDeclaration,
    ) -> Self {
        Self {
            code: code.into(),
            category,
            message: message.into(),
            resource: resource.address(),
        }
    }

    #[must_use]
    pub fn is_security(&self) -> bool {
        self.category == FindingCategory::Security
    }
}

/// The structured model of one configuration text.
///
/// All sequences keep declaration order. The extractor returns a document
/// with empty `findings`; the analyzer fills them in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationDocument {
    /// Recognized resource blocks
    #[serde(default)]
    pub resources: Vec<ResourceDeclaration>,

    /// Names of `variable` blocks
    #[serde(default)]
    pub variables: Vec<String>,

    /// Names of `output` blocks
    #[serde(default)]
    pub outputs: Vec<String>,

    /// Advisory findings
    #[serde(default, alias = "issues")]
    pub findings: Vec<Finding>,
}

impl ConfigurationDocument {
    /// True when nothing at all was declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty() && self.variables.is_empty() && self.outputs.is_empty()
    }

    /// Check if any finding is a security risk.
    #[must_use]
    pub fn has_security_findings(&self) -> bool {
        self.findings.iter().any(Finding::is_security)
    }

    /// Get findings filtered by category.
    #[must_use]
    pub fn findings_by_category(&self, category: FindingCategory) -> Vec<&Finding> {
        self.findings
            .iter()
            .filter(|f| f.category == category)
            .collect()
    }

    /// Summary counts used by the reporters.
    #[must_use]
    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            resources: self.resources.len(),
            variables: self.variables.len(),
            outputs: self.outputs.len(),
            security_findings: self.findings_by_category(FindingCategory::Security).len(),
            improvement_findings: self.findings_by_category(FindingCategory::Improvement).len(),
        }
    }
}

/// Summary statistics for a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    /// Number of resources
    pub resources: usize,
    /// Number of variables
    pub variables: usize,
    /// Number of outputs
    pub outputs: usize,
    /// Number of security findings
    pub security_findings: usize,
    /// Number of improvement findings
    pub improvement_findings: usize,
}

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum ReportFormat {
    /// Plain text format
    #[default]
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> ConfigurationDocument {
        let web = ResourceDeclaration::new("aws_security_group", "web")
            .with_property("cidr_blocks", "[0.0.0.0/0]");
        let finding = Finding::new(
            "IE001",
            FindingCategory::Security,
            "Security group 'web' allows 0.0.0.0/0 ingress",
            &web,
        );
        ConfigurationDocument {
            resources: vec![web],
            variables: vec!["region".to_string()],
            outputs: vec!["sg_id".to_string()],
            findings: vec![finding],
        }
    }

    #[test]
    fn test_resource_address() {
        let r = ResourceDeclaration::new("aws_s3_bucket", "logs");
        assert_eq!(r.address(), "aws_s3_bucket.logs");
        assert_eq!(r.property("bucket"), None);
    }

    #[test]
    fn test_resource_serializes_kind_as_type() {
        let r = ResourceDeclaration::new("aws_s3_bucket", "logs").with_property("acl", "private");
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["type"], "aws_s3_bucket");
        assert_eq!(json["properties"]["acl"], "private");
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn test_document_accepts_original_field_names() {
        let json = r#"{
            "resources": [{"kind": "aws_instance", "name": "web", "properties": {}}],
            "variables": [],
            "outputs": [],
            "issues": [{"code": "IE003", "type": "improvement",
                        "message": "Resource 'web' has no properties defined",
                        "resource": "aws_instance.web"}]
        }"#;
        let doc: ConfigurationDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.resources[0].kind, "aws_instance");
        assert_eq!(doc.findings[0].category, FindingCategory::Improvement);
    }

    #[test]
    fn test_document_json_round_trip() {
        let doc = sample();
        let json = serde_json::to_string(&doc).unwrap();
        let back: ConfigurationDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_summary_counts() {
        let doc = sample();
        let summary = doc.summary();
        assert_eq!(summary.resources, 1);
        assert_eq!(summary.security_findings, 1);
        assert_eq!(summary.improvement_findings, 0);
        assert!(doc.has_security_findings());
        assert!(!doc.is_empty());
    }

    #[test]
    fn test_category_display() {
        assert_eq!(FindingCategory::Security.to_string(), "security");
        assert_eq!(FindingCategory::Improvement.to_string(), "improvement");
    }
}
