//! Prompt construction and the offline explanation.

use crate::types::{ConfigurationDocument, FindingCategory};
use std::fmt::Write;

/// System message sent with every completion request.
pub const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that explains Terraform configurations in simple, beginner-friendly terms.";

/// Build the user prompt describing a document.
#[must_use]
pub fn build_prompt(doc: &ConfigurationDocument) -> String {
    let mut prompt = String::from("Explain this Terraform configuration in simple, beginner-friendly terms:\n\n");

    if !doc.resources.is_empty() {
        prompt.push_str("Resources:\n");
        for resource in &doc.resources {
            let _ = write!(prompt, "- {}", resource.address());
            if !resource.properties.is_empty() {
                let keys: Vec<&str> = resource.properties.keys().map(String::as_str).collect();
                let _ = write!(prompt, " with properties: {}", keys.join(", "));
            }
            prompt.push('\n');
        }
    }

    if !doc.variables.is_empty() {
        let _ = writeln!(prompt, "\nVariables: {}", doc.variables.join(", "));
    }

    if !doc.outputs.is_empty() {
        let _ = writeln!(prompt, "\nOutputs: {}", doc.outputs.join(", "));
    }

    if !doc.findings.is_empty() {
        prompt.push_str("\nPotential issues found by static analysis:\n");
        for finding in &doc.findings {
            let _ = writeln!(prompt, "- [{}] {}", finding.category, finding.message);
        }
    }

    prompt.push_str("\nProvide a clear, concise explanation suitable for someone new to infrastructure as code.");
    prompt
}

/// Explanation generated without a completion API.
#[must_use]
pub fn simple_explanation(doc: &ConfigurationDocument) -> String {
    let mut text = String::from("This Terraform configuration defines the following:\n\n");

    if !doc.resources.is_empty() {
        text.push_str("**Resources:**\n");
        for resource in &doc.resources {
            let _ = write!(text, "- A {} resource named '{}'", resource.kind, resource.name);
            if !resource.properties.is_empty() {
                text.push_str(" with configured properties");
            }
            text.push_str(".\n");
        }
        text.push('\n');
    }

    if !doc.variables.is_empty() {
        let _ = write!(
            text,
            "**Variables:** {} input variable(s) that can be customized.\n\n",
            doc.variables.len()
        );
    }

    if !doc.outputs.is_empty() {
        let _ = writeln!(
            text,
            "**Outputs:** {} output value(s) that provide information about the infrastructure.",
            doc.outputs.len()
        );
    }

    let security = doc.findings_by_category(FindingCategory::Security);
    let improvement = doc.findings_by_category(FindingCategory::Improvement);
    if !security.is_empty() {
        text.push_str("\n**Security concerns:**\n");
        for finding in security {
            let _ = writeln!(text, "- {}", finding.message);
        }
    }
    if !improvement.is_empty() {
        text.push_str("\n**Suggestions:**\n");
        for finding in improvement {
            let _ = writeln!(text, "- {}", finding.message);
        }
    }

    text
}
