//! YAML report generator.

use crate::error::Result;
use crate::reporter::ReportGenerator;
use crate::types::ConfigurationDocument;

/// Writes the document itself as YAML.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlReporter;

impl ReportGenerator for YamlReporter {
    fn generate(&self, doc: &ConfigurationDocument) -> Result<String> {
        Ok(serde_yaml::to_string(doc)?)
    }
}
