//! JSON report generator.

use crate::config::Config;
use crate::error::Result;
use crate::reporter::ReportGenerator;
use crate::types::{ConfigurationDocument, DocumentSummary};
use serde::{Deserialize, Serialize};

/// JSON report generator.
pub struct JsonReporter {
    /// Whether to pretty-print the output
    pretty: bool,
}

impl JsonReporter {
    /// Create a new JSON reporter.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            pretty: config.output.pretty,
        }
    }
}

impl ReportGenerator for JsonReporter {
    fn generate(&self, doc: &ConfigurationDocument) -> Result<String> {
        let report = JsonReport::from(doc);

        let json = if self.pretty {
            serde_json::to_string_pretty(&report)
        } else {
            serde_json::to_string(&report)
        };

        json.map_err(|e| crate::err!(ReportGeneration {
            message: format!("Failed to serialize JSON report: {e}"),
        }))
    }
}

/// JSON report structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReport {
    /// Report metadata
    pub metadata: ReportMetadata,
    /// Summary counts
    pub summary: DocumentSummary,
    /// The analyzed document
    pub document: ConfigurationDocument,
}

impl From<&ConfigurationDocument> for JsonReport {
    fn from(doc: &ConfigurationDocument) -> Self {
        Self {
            metadata: ReportMetadata {
                version: env!("CARGO_PKG_VERSION").to_string(),
                timestamp: chrono::Utc::now().to_rfc3339(),
            },
            summary: doc.summary(),
            document: doc.clone(),
        }
    }
}

/// Report metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// InfraExplain version
    pub version: String,
    /// Report generation timestamp
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Finding, FindingCategory, ResourceDeclaration};
    use pretty_assertions::assert_eq;

    fn create_test_document() -> ConfigurationDocument {
        let sg = ResourceDeclaration::new("aws_security_group", "web")
            .with_property("cidr_blocks", "[0.0.0.0/0]");
        let finding = Finding::new("IE001", FindingCategory::Security, "open", &sg);
        ConfigurationDocument {
            resources: vec![sg],
            variables: vec!["region".to_string()],
            outputs: vec![],
            findings: vec![finding],
        }
    }

    #[test]
    fn test_json_report_generation() {
        let doc = create_test_document();
        let reporter = JsonReporter::new(&Config::default());

        let json = reporter.generate(&doc).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(parsed["metadata"]["version"].is_string());
        assert!(parsed["metadata"]["timestamp"].is_string());
        assert_eq!(parsed["summary"]["resources"], 1);
        assert_eq!(parsed["summary"]["security_findings"], 1);
        assert_eq!(parsed["summary"]["improvement_findings"], 0);
        assert_eq!(parsed["document"]["resources"][0]["type"], "aws_security_group");
    }

    #[test]
    fn test_json_report_document_round_trip() {
        let doc = create_test_document();
        let json = JsonReporter::new(&Config::default()).generate(&doc).unwrap();

        let report: JsonReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report.document, doc);
        assert_eq!(report.summary, doc.summary());
    }

    #[test]
    fn test_json_report_compact() {
        let mut config = Config::default();
        config.output.pretty = false;

        let json = JsonReporter::new(&config).generate(&create_test_document()).unwrap();
        assert!(!json.contains('\n'));
    }
}
