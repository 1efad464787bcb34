//! Integration tests for InfraExplain.
//!
//! These tests verify the end-to-end functionality of the extractor,
//! analyzer, explainer, reporter and the command-line binary.

use infraexplain::{parse_and_analyze, Config, ConfigurationDocument};
use std::path::PathBuf;

/// Get the path to the test fixtures directory.
fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture(name: &str) -> String {
    std::fs::read_to_string(fixtures_path().join(name)).unwrap()
}

mod parser_tests {
    use super::*;
    use infraexplain::parser::{HclParser, Parser};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_simple_terraform() {
        let doc = HclParser::new().parse_content(&fixture("simple.tf")).unwrap();

        assert_eq!(doc.resources.len(), 2);
        assert_eq!(doc.variables, vec!["region", "instance_count"]);
        assert_eq!(doc.outputs, vec!["instance_id"]);
        assert!(doc.findings.is_empty());

        let web = &doc.resources[0];
        assert_eq!(web.address(), "aws_instance.web");
        assert_eq!(web.property("ami"), Some("ami-0c55b159cbfafe1f0"));
        assert_eq!(web.property("instance_type"), Some("t2.micro"));
        assert_eq!(web.property("monitoring"), Some("true"));
        assert_eq!(web.property("count"), Some("2"));
        assert_eq!(web.property("subnet_id"), Some("<unknown>"));
        assert_eq!(web.property("tags"), Some("<unknown>"));
        assert_eq!(web.property("lifecycle"), None);
        assert_eq!(web.property("create_before_destroy"), None);

        assert_eq!(doc.resources[1].address(), "aws_vpc.main");
    }

    #[test]
    fn test_nested_blocks_and_tricky_strings() {
        let doc = HclParser::new().parse_content(&fixture("nested.tf")).unwrap();

        let names: Vec<_> = doc.resources.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["db", "reader"]);

        let db = &doc.resources[0];
        let keys: Vec<_> = db.properties.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["description", "name", "vpc_id"]);
        assert_eq!(
            db.property("description"),
            Some(r#"braces { inside } strings and "quotes" stay put"#)
        );

        let reader = &doc.resources[1];
        assert!(reader.property("policy").unwrap().contains("s3:GetObject"));
        assert_eq!(reader.property("role"), Some("reader"));
    }

    #[test]
    fn test_broken_input_reports_line() {
        let err = HclParser::new().parse_content(&fixture("broken.tf")).unwrap_err();
        assert!(err.is_parse_error());
        assert!(err.to_string().contains("unterminated string literal"));
        assert!(err.to_string().contains("line 2"));
    }
}

mod analyzer_tests {
    use super::*;
    use infraexplain::analyzer::Analyzer;
    use infraexplain::config::CustomRuleConfig;
    use infraexplain::{FindingCategory, Inspector, ResourceDeclaration};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_resource_without_rules() {
        let doc = parse_and_analyze("resource \"K\" \"N\" {\n  p = \"v\"\n}\n").unwrap();

        assert_eq!(
            doc.resources,
            vec![ResourceDeclaration::new("K", "N").with_property("p", "v")]
        );
        assert!(doc.findings.is_empty());
    }

    #[test]
    fn test_open_security_group() {
        let doc = parse_and_analyze(
            "resource \"aws_security_group\" \"web\" {\n  cidr_blocks = \"0.0.0.0/0\"\n}\n",
        )
        .unwrap();

        assert_eq!(doc.findings.len(), 1);
        let finding = &doc.findings[0];
        assert_eq!(finding.category, FindingCategory::Security);
        assert!(finding.message.contains("web"));
        assert!(finding.message.contains("0.0.0.0/0"));
    }

    #[test]
    fn test_wildcard_iam_role() {
        let doc = parse_and_analyze(
            "resource \"aws_iam_role\" \"admin\" {\n  assume_role_policy = \"*\"\n}\n",
        )
        .unwrap();

        assert!(doc
            .findings
            .iter()
            .any(|f| f.is_security() && f.message.contains("admin")));
    }

    #[test]
    fn test_empty_bucket() {
        let doc = parse_and_analyze("resource \"aws_s3_bucket\" \"logs\" { }\n").unwrap();

        assert_eq!(doc.findings.len(), 1);
        assert_eq!(doc.findings[0].category, FindingCategory::Improvement);
        assert!(doc.findings[0].message.contains("logs"));
    }

    #[test]
    fn test_security_fixture_findings_in_resource_order() {
        let doc = parse_and_analyze(&fixture("security.tf")).unwrap();

        let codes: Vec<_> = doc.findings.iter().map(|f| f.code.as_str()).collect();
        assert_eq!(codes, vec!["IE001", "IE002", "IE003"]);

        let resources: Vec<_> = doc.findings.iter().map(|f| f.resource.as_str()).collect();
        assert_eq!(
            resources,
            vec!["aws_security_group.web", "aws_iam_role.admin", "aws_s3_bucket.logs"]
        );
    }

    #[test]
    fn test_analyze_is_idempotent() {
        let doc = parse_and_analyze(&fixture("security.tf")).unwrap();
        let analyzer = Analyzer::new();

        let first = analyzer.analyze(&doc.resources);
        let second = analyzer.analyze(&doc.resources);
        assert_eq!(first, second);
        assert_eq!(first, doc.findings);
    }

    #[test]
    fn test_declaration_free_input() {
        for text in ["", "   \n\n", "# only a comment\n", "locals {\n  a = 1\n}\n"] {
            assert_eq!(parse_and_analyze(text).unwrap(), ConfigurationDocument::default());
        }
    }

    #[test]
    fn test_single_label_resource_omitted() {
        let doc = parse_and_analyze("resource \"aws_s3_bucket\" {\n  bucket = \"x\"\n}\n").unwrap();
        assert!(doc.resources.is_empty());
        assert!(doc.findings.is_empty());
    }

    #[test]
    fn test_unclosed_block_runs_to_end() {
        let doc = parse_and_analyze("resource \"aws_vpc\" \"main\" {\n  cidr_block = \"10.0.0.0/16\"\n").unwrap();
        assert_eq!(doc.resources.len(), 1);
        assert_eq!(doc.resources[0].property("cidr_block"), Some("10.0.0.0/16"));
    }

    #[test]
    fn test_custom_rule_from_config() {
        let mut config = Config::default();
        config.analysis.rules.push(CustomRuleConfig {
            code: "ORG001".to_string(),
            kinds: vec!["aws_s3_*".to_string()],
            property: "acl".to_string(),
            contains: Some("public".to_string()),
            pattern: None,
            category: FindingCategory::Security,
            message: "Bucket '{name}' has acl {value}".to_string(),
            description: None,
        });

        let doc = Inspector::new(&config)
            .unwrap()
            .inspect(&fixture("security.tf"))
            .unwrap();

        let custom: Vec<_> = doc.findings.iter().filter(|f| f.code == "ORG001").collect();
        assert_eq!(custom.len(), 1);
        assert_eq!(custom[0].message, "Bucket 'public' has acl public-read");
    }
}

mod serialization_tests {
    use super::*;
    use infraexplain::reporter::{JsonReport, Reporter};
    use infraexplain::ReportFormat;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_json_round_trip() {
        let doc = parse_and_analyze(&fixture("security.tf")).unwrap();

        let json = serde_json::to_string(&doc).unwrap();
        let back: ConfigurationDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_original_wire_names_accepted() {
        let json = r#"{
            "resources": [{"type": "aws_s3_bucket", "name": "logs", "properties": {}}],
            "variables": [],
            "outputs": [],
            "issues": [{"code": "IE003", "type": "improvement", "message": "m", "resource": "aws_s3_bucket.logs"}]
        }"#;
        let doc: ConfigurationDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.resources[0].kind, "aws_s3_bucket");
        assert_eq!(doc.findings.len(), 1);
    }

    #[test]
    fn test_json_report_embeds_document() {
        let doc = parse_and_analyze(&fixture("simple.tf")).unwrap();
        let json = Reporter::new(&Config::default())
            .generate(&doc, ReportFormat::Json)
            .unwrap();

        let report: JsonReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report.document, doc);
        assert_eq!(report.summary.resources, 2);
        assert_eq!(report.metadata.version, env!("CARGO_PKG_VERSION"));
    }
}

mod explainer_tests {
    use super::*;
    use infraexplain::explainer::{build_prompt, Explainer};

    #[tokio::test]
    async fn test_offline_explanation_of_fixture() {
        let doc = parse_and_analyze(&fixture("security.tf")).unwrap();
        let text = Explainer::offline().explain(&doc).await;

        assert!(text.contains("A aws_security_group resource named 'web' with configured properties."));
        assert!(text.contains("A aws_s3_bucket resource named 'logs'."));
        assert!(text.contains("**Security concerns:**"));
        assert!(text.contains("**Suggestions:**"));
    }

    #[test]
    fn test_prompt_lists_declarations() {
        let doc = parse_and_analyze(&fixture("simple.tf")).unwrap();
        let prompt = build_prompt(&doc);

        assert!(prompt.contains("- aws_vpc.main with properties: cidr_block"));
        assert!(prompt.contains("region"));
        assert!(prompt.contains("instance_id"));
    }
}

mod cli_tests {
    use super::*;
    use assert_cmd::Command;
    use predicates::prelude::*;

    fn infraexplain() -> Command {
        let mut cmd = Command::cargo_bin("infraexplain").unwrap();
        cmd.env_remove("INFRAEXPLAIN_CONFIG")
            .env_remove("OPENAI_API_KEY")
            .env_remove("RUST_LOG");
        cmd
    }

    #[test]
    fn test_parse_json_output() {
        let output = infraexplain()
            .args(["parse", "--format", "json"])
            .arg(fixtures_path().join("simple.tf"))
            .output()
            .unwrap();

        assert!(output.status.success());
        let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(report["summary"]["resources"], 2);
        assert_eq!(report["document"]["outputs"][0], "instance_id");
    }

    #[test]
    fn test_parse_text_from_stdin() {
        infraexplain()
            .args(["parse", "--no-color"])
            .write_stdin(fixture("security.tf"))
            .assert()
            .success()
            .stdout(predicate::str::contains("InfraExplain Report"))
            .stdout(predicate::str::contains("[SECURITY]"))
            .stdout(predicate::str::contains("FAILED - Security risks found"));
    }

    #[test]
    fn test_strict_mode_exit_code() {
        infraexplain()
            .args(["parse", "--strict", "--format", "yaml"])
            .arg(fixtures_path().join("security.tf"))
            .assert()
            .code(1);

        infraexplain()
            .args(["parse", "--strict", "--format", "yaml"])
            .arg(fixtures_path().join("simple.tf"))
            .assert()
            .success();
    }

    #[test]
    fn test_disabled_rules_flag() {
        infraexplain()
            .args(["parse", "--strict", "--disable-rule", "IE001", "--disable-rule", "IE002"])
            .arg(fixtures_path().join("security.tf"))
            .assert()
            .success();
    }

    #[test]
    fn test_lexical_failure_exit_code() {
        infraexplain()
            .arg("parse")
            .arg(fixtures_path().join("broken.tf"))
            .assert()
            .code(3)
            .stderr(predicate::str::contains("unterminated string literal"));
    }

    #[test]
    fn test_missing_file_exit_code() {
        infraexplain()
            .args(["parse", "does-not-exist.tf"])
            .assert()
            .code(14);
    }

    #[test]
    fn test_explain_offline() {
        infraexplain()
            .args(["explain", "--offline"])
            .arg(fixtures_path().join("security.tf"))
            .assert()
            .success()
            .stdout(predicate::str::starts_with("This Terraform configuration defines the following:"));
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();

        infraexplain().arg("init").current_dir(dir.path()).assert().success();
        let written = std::fs::read_to_string(dir.path().join("infraexplain.yaml")).unwrap();
        assert_eq!(Config::from_yaml(&written).unwrap(), Config::default());

        infraexplain()
            .arg("init")
            .current_dir(dir.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("already exists"));
    }

    #[test]
    fn test_validate_config() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.yaml");
        std::fs::write(
            &good,
            "analysis:\n  rules:\n    - code: ORG001\n      kinds: [\"aws_s3_*\"]\n      property: acl\n      contains: public\n      message: \"Bucket '{name}' is public\"\n      description: Public buckets\n",
        )
        .unwrap();
        let bad = dir.path().join("bad.yaml");
        std::fs::write(
            &bad,
            "analysis:\n  rules:\n    - code: ORG002\n      kinds: [\"*\"]\n      property: acl\n      pattern: \"([\"\n      message: broken\n",
        )
        .unwrap();

        infraexplain()
            .arg("validate")
            .arg(&good)
            .current_dir(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration is valid"))
            .stdout(predicate::str::contains("ORG001"))
            .stdout(predicate::str::contains("Public buckets"));

        infraexplain()
            .arg("validate")
            .arg(&bad)
            .current_dir(dir.path())
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Configuration error"));
    }

    #[test]
    fn test_validate_ignores_default_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("infraexplain.yaml"), "analysis: [unclosed\n").unwrap();
        let other = dir.path().join("other.yaml");
        std::fs::write(&other, "output:\n  colored: false\n").unwrap();

        infraexplain()
            .arg("validate")
            .arg(&other)
            .current_dir(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("IE001"));

        // Commands that analyze still pick up the broken default file.
        infraexplain()
            .args(["parse", "--format", "json"])
            .arg(fixtures_path().join("simple.tf"))
            .current_dir(dir.path())
            .assert()
            .code(18);
    }
}
