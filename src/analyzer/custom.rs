//! Rules supplied through configuration.
//!
//! A custom rule matches resource kinds with glob patterns and tests one
//! rendered property with either a substring or a regex. Rules are compiled
//! once, when the rule set is built, so analysis itself never fails.

use crate::analyzer::Rule;
use crate::config::CustomRuleConfig;
use crate::error::Result;
use crate::types::{Finding, FindingCategory, ResourceDeclaration};
use regex::Regex;

/// Condition a property value must satisfy for the rule to fire.
#[derive(Debug)]
enum Condition {
    Contains(String),
    Pattern(Regex),
}

impl Condition {
    fn matches(&self, value: &str) -> bool {
        match self {
            Self::Contains(needle) => value.contains(needle.as_str()),
            Self::Pattern(re) => re.is_match(value),
        }
    }
}

/// A compiled [`CustomRuleConfig`].
#[derive(Debug)]
pub struct CustomRule {
    code: String,
    description: String,
    kinds: Vec<glob::Pattern>,
    property: String,
    condition: Condition,
    category: FindingCategory,
    message: String,
}

impl CustomRule {
    /// Compile a rule from its configuration.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigValue` error for an empty code, no kinds, an invalid
    /// glob, an invalid regex, or when not exactly one of `contains` and
    /// `pattern` is given.
    pub fn compile(rule_config: &CustomRuleConfig) -> Result<Self> {
        let key = format!("analysis.rules[{}]", rule_config.code);

        if rule_config.code.trim().is_empty() {
            return Err(crate::err!(ConfigValue {
                key: "analysis.rules".to_string(),
                message: "rule code must not be empty".to_string(),
            }));
        }
        if rule_config.kinds.is_empty() {
            return Err(crate::err!(ConfigValue {
                key,
                message: "at least one resource kind pattern is required".to_string(),
            }));
        }

        let kinds = rule_config
            .kinds
            .iter()
            .map(|k| {
                glob::Pattern::new(k).map_err(|e| {
                    crate::err!(ConfigValue {
                        key: key.clone(),
                        message: format!("invalid kind pattern '{k}': {e}"),
                    })
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let condition = match (&rule_config.contains, &rule_config.pattern) {
            (Some(needle), None) => Condition::Contains(needle.clone()),
            (None, Some(pattern)) => Condition::Pattern(Regex::new(pattern).map_err(|e| {
                crate::err!(ConfigValue {
                    key: key.clone(),
                    message: format!("invalid pattern: {e}"),
                })
            })?),
            (Some(_), Some(_)) => {
                return Err(crate::err!(ConfigValue {
                    key,
                    message: "'contains' and 'pattern' are mutually exclusive".to_string(),
                }));
            }
            (None, None) => {
                return Err(crate::err!(ConfigValue {
                    key,
                    message: "one of 'contains' or 'pattern' is required".to_string(),
                }));
            }
        };

        Ok(Self {
            code: rule_config.code.clone(),
            description: rule_config
                .description
                .clone()
                .unwrap_or_else(|| format!("Custom check of '{}'", rule_config.property)),
            kinds,
            property: rule_config.property.clone(),
            condition,
            category: rule_config.category,
            message: rule_config.message.clone(),
        })
    }

    fn render_message(&self, resource: &ResourceDeclaration, value: &str) -> String {
        self.message
            .replace("{kind}", &resource.kind)
            .replace("{name}", &resource.name)
            .replace("{property}", &self.property)
            .replace("{value}", value)
    }
}

impl Rule for CustomRule {
    fn code(&self) -> &str {
        &self.code
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn claims(&self, kind: &str) -> bool {
        self.kinds.iter().any(|p| p.matches(kind))
    }

    fn check(&self, resource: &ResourceDeclaration) -> Option<Finding> {
        let value = resource.property(&self.property)?;
        if !self.condition.matches(value) {
            return None;
        }
        Some(Finding::new(
            self.code.as_str(),
            self.category,
            self.render_message(resource, value),
            resource,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InfraExplainError;
    use pretty_assertions::assert_eq;

    fn rule_config(contains: Option<&str>, pattern: Option<&str>) -> CustomRuleConfig {
        CustomRuleConfig {
            code: "ORG001".to_string(),
            kinds: vec!["aws_s3_*".to_string()],
            property: "acl".to_string(),
            contains: contains.map(String::from),
            pattern: pattern.map(String::from),
            category: FindingCategory::Security,
            message: "{kind} '{name}' has {property} = {value}".to_string(),
            description: None,
        }
    }

    #[test]
    fn test_contains_rule() {
        let rule = CustomRule::compile(&rule_config(Some("public"), None)).unwrap();
        assert!(rule.claims("aws_s3_bucket"));
        assert!(rule.claims("aws_s3_bucket_acl"));
        assert!(!rule.claims("aws_instance"));

        let bucket = ResourceDeclaration::new("aws_s3_bucket", "site").with_property("acl", "public-read");
        let finding = rule.check(&bucket).unwrap();
        assert_eq!(finding.code, "ORG001");
        assert_eq!(finding.message, "aws_s3_bucket 'site' has acl = public-read");
        assert_eq!(finding.resource, "aws_s3_bucket.site");
    }

    #[test]
    fn test_pattern_rule() {
        let rule = CustomRule::compile(&rule_config(None, Some("^public-"))).unwrap();
        let public = ResourceDeclaration::new("aws_s3_bucket", "a").with_property("acl", "public-read");
        let private = ResourceDeclaration::new("aws_s3_bucket", "b").with_property("acl", "private");
        assert!(rule.check(&public).is_some());
        assert!(rule.check(&private).is_none());
    }

    #[test]
    fn test_missing_property_does_not_fire() {
        let rule = CustomRule::compile(&rule_config(Some("public"), None)).unwrap();
        let bucket = ResourceDeclaration::new("aws_s3_bucket", "a");
        assert!(rule.check(&bucket).is_none());
    }

    #[test]
    fn test_invalid_rules_are_rejected() {
        for bad in [
            rule_config(None, None),
            rule_config(Some("x"), Some("y")),
            rule_config(None, Some("(unclosed")),
            CustomRuleConfig { kinds: vec!["[".to_string()], ..rule_config(Some("x"), None) },
            CustomRuleConfig { kinds: Vec::new(), ..rule_config(Some("x"), None) },
            CustomRuleConfig { code: " ".to_string(), ..rule_config(Some("x"), None) },
        ] {
            let err = CustomRule::compile(&bad).unwrap_err();
            assert!(matches!(err, InfraExplainError::ConfigValue { .. }), "{err}");
        }
    }
}
