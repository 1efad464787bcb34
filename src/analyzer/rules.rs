//! Built-in rules.

use crate::analyzer::Rule;
use crate::types::{Finding, FindingCategory, ResourceDeclaration};

/// Security group open to the whole internet.
pub const OPEN_SECURITY_GROUP: &str = "IE001";
/// IAM role whose trust policy contains a wildcard.
pub const WILDCARD_IAM_ROLE: &str = "IE002";
/// Resource declared without any attributes.
pub const EMPTY_RESOURCE: &str = "IE003";

/// Flags `aws_security_group` resources whose `cidr_blocks` include `0.0.0.0/0`.
#[derive(Debug, Default)]
pub struct OpenSecurityGroup;

impl Rule for OpenSecurityGroup {
    fn code(&self) -> &str {
        OPEN_SECURITY_GROUP
    }

    fn description(&self) -> &str {
        "Security group allows ingress from 0.0.0.0/0"
    }

    fn claims(&self, kind: &str) -> bool {
        kind == "aws_security_group"
    }

    fn check(&self, resource: &ResourceDeclaration) -> Option<Finding> {
        resource
            .property("cidr_blocks")
            .filter(|v| v.contains("0.0.0.0/0"))
            .map(|_| {
                Finding::new(
                    self.code(),
                    FindingCategory::Security,
                    format!("Security group '{}' allows 0.0.0.0/0 ingress", resource.name),
                    resource,
                )
            })
    }
}

/// Flags `aws_iam_role` resources whose `assume_role_policy` mentions `*`.
#[derive(Debug, Default)]
pub struct WildcardIamRole;

impl Rule for WildcardIamRole {
    fn code(&self) -> &str {
        WILDCARD_IAM_ROLE
    }

    fn description(&self) -> &str {
        "IAM role policy grants '*'"
    }

    fn claims(&self, kind: &str) -> bool {
        kind == "aws_iam_role"
    }

    fn check(&self, resource: &ResourceDeclaration) -> Option<Finding> {
        resource
            .property("assume_role_policy")
            .filter(|v| v.contains('*'))
            .map(|_| {
                Finding::new(
                    self.code(),
                    FindingCategory::Security,
                    format!("IAM role '{}' grants '*' permissions", resource.name),
                    resource,
                )
            })
    }
}

/// Flags resources with no properties at all.
///
/// Only evaluated for kinds no other rule claims.
#[derive(Debug, Default)]
pub struct EmptyResource;

impl Rule for EmptyResource {
    fn code(&self) -> &str {
        EMPTY_RESOURCE
    }

    fn description(&self) -> &str {
        "Resource has no properties defined"
    }

    fn claims(&self, _kind: &str) -> bool {
        false
    }

    fn is_fallback(&self) -> bool {
        true
    }

    fn check(&self, resource: &ResourceDeclaration) -> Option<Finding> {
        resource.properties.is_empty().then(|| {
            Finding::new(
                self.code(),
                FindingCategory::Improvement,
                format!("Resource '{}' has no properties defined", resource.name),
                resource,
            )
        })
    }
}

/// The built-in rule table, in evaluation order.
#[must_use]
pub fn builtin_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(OpenSecurityGroup),
        Box::new(WildcardIamRole),
        Box::new(EmptyResource),
    ]
}
