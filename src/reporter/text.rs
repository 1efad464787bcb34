//! Plain text report generator.

use crate::config::Config;
use crate::error::Result;
use crate::reporter::ReportGenerator;
use crate::types::{ConfigurationDocument, Finding, FindingCategory, ResourceDeclaration};
use colored::Colorize;
use comfy_table::{Cell, Color, ContentArrangement, Table};

/// Text report generator for CLI output.
pub struct TextReporter {
    /// Whether to use colors
    use_colors: bool,
    /// Whether to show property values
    verbose: bool,
}

impl TextReporter {
    /// Create a new text reporter.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            use_colors: config.output.colored,
            verbose: config.output.verbose,
        }
    }
}

impl ReportGenerator for TextReporter {
    fn generate(&self, doc: &ConfigurationDocument) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header());
        output.push('\n');

        output.push_str(&self.format_summary(doc));
        output.push('\n');

        if !doc.findings.is_empty() {
            output.push_str(&self.format_findings(doc));
            output.push('\n');
        }

        if !doc.resources.is_empty() {
            output.push_str(&self.format_resources(doc));
            output.push('\n');
        }

        if !doc.variables.is_empty() {
            output.push_str(&self.format_names("Variables", &doc.variables));
            output.push('\n');
        }

        if !doc.outputs.is_empty() {
            output.push_str(&self.format_names("Outputs", &doc.outputs));
            output.push('\n');
        }

        output.push_str(&self.format_footer(doc));

        Ok(output)
    }
}

impl TextReporter {
    fn format_header(&self) -> String {
        let title = "InfraExplain Report";
        let version = format!("v{}", env!("CARGO_PKG_VERSION"));
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");

        if self.use_colors {
            format!(
                "\n{} {} {}\n{}\n",
                title.bright_white().bold(),
                version.dimmed(),
                format!("({timestamp})").dimmed(),
                "=".repeat(80).bright_blue(),
            )
        } else {
            format!("\n{title} {version} ({timestamp})\n{}\n", "=".repeat(80))
        }
    }

    fn section_title(&self, title: &str) -> String {
        let title = if self.use_colors {
            title.bright_cyan().bold().to_string()
        } else {
            title.to_string()
        };
        format!("\n{title}\n{}\n", "-".repeat(80))
    }

    fn format_summary(&self, doc: &ConfigurationDocument) -> String {
        let summary = doc.summary();
        let mut output = self.section_title("Summary");

        let security = plural(summary.security_findings, "Security risk", "Security risks");
        let improvements = plural(summary.improvement_findings, "Suggestion", "Suggestions");

        if self.use_colors {
            output.push_str(&format!(
                "  {} {security} | {} {improvements}\n",
                summary.security_findings.to_string().red().bold(),
                summary.improvement_findings.to_string().yellow().bold(),
            ));
        } else {
            output.push_str(&format!(
                "  {} {security} | {} {improvements}\n",
                summary.security_findings, summary.improvement_findings,
            ));
        }

        output.push_str(&format!(
            "  {} resources | {} variables | {} outputs\n",
            summary.resources, summary.variables, summary.outputs
        ));

        output
    }

    fn format_findings(&self, doc: &ConfigurationDocument) -> String {
        let mut output = self.section_title("Findings");

        // security first, declaration order within a category
        let mut findings: Vec<&Finding> = doc.findings.iter().collect();
        findings.sort_by_key(|f| f.category);

        for finding in findings {
            output.push_str(&self.format_finding(finding));
        }

        output
    }

    fn format_finding(&self, finding: &Finding) -> String {
        let label = match finding.category {
            FindingCategory::Security if self.use_colors => "SECURITY".red().bold().to_string(),
            FindingCategory::Security => "SECURITY".to_string(),
            FindingCategory::Improvement if self.use_colors => "IMPROVEMENT".yellow().to_string(),
            FindingCategory::Improvement => "IMPROVEMENT".to_string(),
        };

        let location = format!("    -> {}", finding.resource);
        let location = if self.use_colors {
            location.dimmed().to_string()
        } else {
            location
        };

        format!(
            "\n  [{label}] {} ({})\n{location}\n",
            finding.message, finding.code
        )
    }

    fn format_resources(&self, doc: &ConfigurationDocument) -> String {
        let mut output = self.section_title("Resources");

        let mut table = Table::new();
        table
            .load_preset(comfy_table::presets::UTF8_BORDERS_ONLY)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Type", "Name", "Properties"]);

        for resource in &doc.resources {
            self.add_resource_row(&mut table, resource, doc);
        }

        output.push_str(&table.to_string());
        output.push('\n');

        output
    }

    fn add_resource_row(
        &self,
        table: &mut Table,
        resource: &ResourceDeclaration,
        doc: &ConfigurationDocument,
    ) {
        let properties = if resource.properties.is_empty() {
            "(none)".to_string()
        } else if self.verbose {
            resource
                .properties
                .iter()
                .map(|(k, v)| format!("{k} = {}", truncate(v, 60)))
                .collect::<Vec<_>>()
                .join("\n")
        } else {
            resource.properties.keys().cloned().collect::<Vec<_>>().join(", ")
        };

        let address = resource.address();
        let flagged = doc
            .findings
            .iter()
            .filter(|f| f.resource == address)
            .map(|f| f.category)
            .min();

        let name_cell = match flagged {
            Some(FindingCategory::Security) if self.use_colors => {
                Cell::new(&resource.name).fg(Color::Red)
            }
            Some(FindingCategory::Improvement) if self.use_colors => {
                Cell::new(&resource.name).fg(Color::Yellow)
            }
            _ => Cell::new(&resource.name),
        };

        table.add_row(vec![Cell::new(&resource.kind), name_cell, Cell::new(properties)]);
    }

    fn format_names(&self, title: &str, names: &[String]) -> String {
        let mut output = self.section_title(title);
        for name in names {
            output.push_str(&format!("  - {name}\n"));
        }
        output
    }

    fn format_footer(&self, doc: &ConfigurationDocument) -> String {
        let summary = doc.summary();
        let status = if summary.security_findings > 0 {
            if self.use_colors {
                "FAILED - Security risks found".red().bold().to_string()
            } else {
                "FAILED - Security risks found".to_string()
            }
        } else if summary.improvement_findings > 0 {
            if self.use_colors {
                "PASSED with suggestions".yellow().to_string()
            } else {
                "PASSED with suggestions".to_string()
            }
        } else if self.use_colors {
            "PASSED - No issues found".green().to_string()
        } else {
            "PASSED - No issues found".to_string()
        };

        format!("\n{status}\n\n")
    }
}

const fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}

/// Truncate a string to a maximum number of characters.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{head}...")
    }
}
