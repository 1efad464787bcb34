//! Static analysis of extracted resources.
//!
//! The analyzer walks the resources of a document and produces advisory
//! findings. Analysis never fails and never changes the resources.
//!
//! # Built-in Rules
//!
//! | Code    | Kind                 | Fires when                                   |
//! |---------|----------------------|----------------------------------------------|
//! | `IE001` | `aws_security_group` | `cidr_blocks` contains `0.0.0.0/0`           |
//! | `IE002` | `aws_iam_role`       | `assume_role_policy` contains `*`            |
//! | `IE003` | any other kind       | the resource has no properties               |
//!
//! Rules are selected by resource kind. Every rule that claims a kind is
//! evaluated; fallback rules such as `IE003` only run for kinds that no
//! other rule claims. Additional rules come from the `analysis.rules`
//! section of the configuration (see [`crate::config::CustomRuleConfig`]).
//!
//! # Example
//!
//! ```rust
//! use infraexplain::analyzer::Analyzer;
//! use infraexplain::types::ResourceDeclaration;
//!
//! let analyzer = Analyzer::new();
//! let findings = analyzer.analyze(&[ResourceDeclaration::new("aws_s3_bucket", "logs")]);
//! assert_eq!(findings[0].code, "IE003");
//! ```

mod custom;
mod rules;

pub use custom::CustomRule;
pub use rules::{builtin_rules, EmptyResource, OpenSecurityGroup, WildcardIamRole};

use crate::config::{AnalysisOptions, Config};
use crate::error::Result;
use crate::types::{ConfigurationDocument, Finding, ResourceDeclaration};
use std::collections::HashSet;

/// A single analysis rule.
pub trait Rule: Send + Sync + std::fmt::Debug {
    /// Stable identifier reported in findings.
    fn code(&self) -> &str;

    /// One-line description.
    fn description(&self) -> &str;

    /// Whether this rule applies to resources of `kind`.
    fn claims(&self, kind: &str) -> bool;

    /// Fallback rules apply to every kind no other rule claims.
    fn is_fallback(&self) -> bool {
        false
    }

    /// Inspect one resource.
    fn check(&self, resource: &ResourceDeclaration) -> Option<Finding>;
}

/// An ordered collection of rules.
#[derive(Debug)]
pub struct RuleSet {
    rules: Vec<Box<dyn Rule>>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RuleSet {
    /// The built-in rules only.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            rules: builtin_rules(),
        }
    }

    /// Built-in rules plus configured custom rules, minus disabled ones.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigValue` error if a custom rule is invalid or reuses
    /// an existing code.
    pub fn from_options(options: &AnalysisOptions) -> Result<Self> {
        let mut rules = builtin_rules();
        let mut codes: HashSet<String> = rules.iter().map(|r| r.code().to_string()).collect();

        for rule_config in &options.rules {
            if !codes.insert(rule_config.code.clone()) {
                return Err(crate::err!(ConfigValue {
                    key: format!("analysis.rules[{}]", rule_config.code),
                    message: format!("duplicate rule code '{}'", rule_config.code),
                }));
            }
            rules.push(Box::new(CustomRule::compile(rule_config)?));
        }

        for code in &options.disabled_rules {
            if !codes.contains(code) {
                tracing::warn!(code = %code, "Disabled rule does not exist");
            }
        }
        rules.retain(|r| !options.disabled_rules.iter().any(|c| c == r.code()));

        tracing::debug!(
            rules = rules.len(),
            custom = options.rules.len(),
            disabled = options.disabled_rules.len(),
            "Rule set built"
        );

        Ok(Self { rules })
    }

    /// Iterate over the active rules.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every applicable rule over one resource.
    fn check(&self, resource: &ResourceDeclaration) -> Vec<Finding> {
        let claimed = self
            .rules
            .iter()
            .any(|r| !r.is_fallback() && r.claims(&resource.kind));

        self.rules
            .iter()
            .filter(|r| if r.is_fallback() { !claimed } else { r.claims(&resource.kind) })
            .filter_map(|r| r.check(resource))
            .inspect(|f| {
                tracing::debug!(code = %f.code, resource = %f.resource, "Rule fired");
            })
            .collect()
    }
}

/// Analyzer producing findings for extracted resources.
///
/// Holds only immutable rule data, so one instance can be shared across
/// threads.
#[derive(Debug, Default)]
pub struct Analyzer {
    rules: RuleSet,
}

impl Analyzer {
    /// Create an analyzer with the built-in rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an analyzer from the `analysis` section of a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a custom rule is invalid.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            rules: RuleSet::from_options(&config.analysis)?,
        })
    }

    /// The active rules.
    #[must_use]
    pub const fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Analyze resources, returning findings in resource order.
    #[must_use]
    pub fn analyze(&self, resources: &[ResourceDeclaration]) -> Vec<Finding> {
        tracing::debug!(resources = resources.len(), "Starting analysis");
        let findings: Vec<Finding> = resources.iter().flat_map(|r| self.rules.check(r)).collect();
        tracing::debug!(findings = findings.len(), "Analysis complete");
        findings
    }

    /// Attach findings to a document, replacing any previous ones.
    #[must_use]
    pub fn annotate(&self, mut document: ConfigurationDocument) -> ConfigurationDocument {
        document.findings = self.analyze(&document.resources);
        document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CustomRuleConfig;
    use crate::error::InfraExplainError;
    use crate::types::FindingCategory;
    use pretty_assertions::assert_eq;

    fn custom(code: &str, kinds: &[&str]) -> CustomRuleConfig {
        CustomRuleConfig {
            code: code.to_string(),
            kinds: kinds.iter().map(|k| (*k).to_string()).collect(),
            property: "acl".to_string(),
            contains: Some("public".to_string()),
            pattern: None,
            category: FindingCategory::Security,
            message: "Bucket '{name}' is public".to_string(),
            description: None,
        }
    }

    #[test]
    fn test_specific_kinds_skip_fallback() {
        let analyzer = Analyzer::new();
        let findings = analyzer.analyze(&[
            ResourceDeclaration::new("aws_security_group", "empty_sg"),
            ResourceDeclaration::new("aws_iam_role", "empty_role"),
        ]);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_findings_follow_resource_order() {
        let analyzer = Analyzer::new();
        let findings = analyzer.analyze(&[
            ResourceDeclaration::new("aws_s3_bucket", "logs"),
            ResourceDeclaration::new("aws_security_group", "web").with_property("cidr_blocks", "[0.0.0.0/0]"),
            ResourceDeclaration::new("aws_instance", "vm").with_property("ami", "ami-1"),
        ]);
        let codes: Vec<&str> = findings.iter().map(|f| f.code.as_str()).collect();
        assert_eq!(codes, vec!["IE003", "IE001"]);
    }

    #[test]
    fn test_analyze_is_idempotent() {
        let analyzer = Analyzer::new();
        let resources = vec![
            ResourceDeclaration::new("aws_s3_bucket", "logs"),
            ResourceDeclaration::new("aws_iam_role", "admin").with_property("assume_role_policy", "*"),
        ];
        assert_eq!(analyzer.analyze(&resources), analyzer.analyze(&resources));

        let doc = ConfigurationDocument { resources, ..Default::default() };
        let once = analyzer.annotate(doc);
        let twice = analyzer.annotate(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_custom_rule_claims_kind() {
        let options = AnalysisOptions {
            rules: vec![custom("ORG001", &["aws_s3_bucket"])],
            ..Default::default()
        };
        let rules = RuleSet::from_options(&options).unwrap();
        assert_eq!(rules.len(), 4);

        let analyzer = Analyzer { rules };
        // The empty bucket is now claimed, so the fallback no longer applies.
        assert!(analyzer.analyze(&[ResourceDeclaration::new("aws_s3_bucket", "a")]).is_empty());

        let public = ResourceDeclaration::new("aws_s3_bucket", "site").with_property("acl", "public-read");
        let findings = analyzer.analyze(&[public]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].message, "Bucket 'site' is public");
    }

    #[test]
    fn test_disabled_rule_stops_claiming() {
        let options = AnalysisOptions {
            disabled_rules: vec!["IE001".to_string()],
            ..Default::default()
        };
        let analyzer = Analyzer {
            rules: RuleSet::from_options(&options).unwrap(),
        };
        let findings = analyzer.analyze(&[
            ResourceDeclaration::new("aws_security_group", "web").with_property("cidr_blocks", "[0.0.0.0/0]"),
            ResourceDeclaration::new("aws_security_group", "empty"),
        ]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, "IE003");
        assert_eq!(findings[0].resource, "aws_security_group.empty");
    }

    #[test]
    fn test_duplicate_codes_rejected() {
        let options = AnalysisOptions {
            rules: vec![custom("IE001", &["aws_s3_bucket"])],
            ..Default::default()
        };
        let err = RuleSet::from_options(&options).unwrap_err();
        assert!(matches!(err, InfraExplainError::ConfigValue { .. }));

        let options = AnalysisOptions {
            rules: vec![custom("ORG1", &["a"]), custom("ORG1", &["b"])],
            ..Default::default()
        };
        assert!(RuleSet::from_options(&options).is_err());
    }

    #[test]
    fn test_from_config() {
        let config = Config::default();
        let analyzer = Analyzer::from_config(&config).unwrap();
        let codes: Vec<&str> = analyzer.rules().iter().map(|r| r.code()).collect();
        assert_eq!(codes, vec!["IE001", "IE002", "IE003"]);
    }
}
