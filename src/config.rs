//! Configuration module for InfraExplain.
//!
//! This module handles loading and validating configuration from:
//! - YAML configuration files (`infraexplain.yaml`)
//! - Environment variables
//! - CLI arguments
//!
//! # Configuration File Format
//!
//! ```yaml
//! # infraexplain.yaml
//!
//! # Analysis options
//! analysis:
//!   disabled_rules: [IE003]
//!   rules:
//!     - code: ORG001
//!       kinds: ["aws_s3_bucket"]
//!       property: acl
//!       contains: public-read
//!       category: security
//!       message: "Bucket '{name}' is publicly readable"
//!
//! # Output options
//! output:
//!   colored: true
//!   verbose: false
//!   pretty: true
//!
//! # Explanation options
//! explain:
//!   api_key: ${OPENAI_API_KEY}  # Environment variable expansion
//!   model: gpt-3.5-turbo
//!
//! # HTTP service options
//! server:
//!   bind: 0.0.0.0:8080
//! ```

use crate::error::{Result, ResultExt};
use crate::types::FindingCategory;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

/// File names searched in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILES: &[&str] = &["infraexplain.yaml", "infraexplain.yml", ".infraexplain.yaml"];

/// Environment variable holding the completion API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

static BRACED_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("Invalid regex"));

static BARE_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)").expect("Invalid regex"));

/// A rule supplied through configuration.
///
/// The rule fires for resources whose kind matches one of `kinds` (glob
/// patterns) and whose `property` either contains the `contains` substring or
/// matches the `pattern` regex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomRuleConfig {
    /// Stable rule identifier, unique across all rules
    pub code: String,

    /// Resource kinds the rule applies to (glob patterns)
    pub kinds: Vec<String>,

    /// Property to inspect
    pub property: String,

    /// Substring condition
    #[serde(default)]
    pub contains: Option<String>,

    /// Regex condition
    #[serde(default)]
    pub pattern: Option<String>,

    /// Category of the produced finding.
    #[serde(default = "default_category")]
    pub category: FindingCategory,

    /// Message template; `{kind}`, `{name}`, `{property}` and `{value}` are substituted.
    pub message: String,

    /// Short description shown by `validate`
    #[serde(default)]
    pub description: Option<String>,
}

/// Analysis options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Rule codes to switch off.
    pub disabled_rules: Vec<String>,

    /// Additional rules.
    pub rules: Vec<CustomRuleConfig>,
}

/// Output options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputOptions {
    /// Use colored output.
    pub colored: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            colored: true,
            verbose: false,
            pretty: true,
        }
    }
}

/// Options of the explanation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplainOptions {
    /// Completion API key; without one the offline explanation is used.
    pub api_key: Option<String>,

    /// Chat-completion endpoint.
    pub endpoint: String,

    /// Model name.
    pub model: String,

    /// Maximum tokens of the completion.
    pub max_tokens: u32,

    /// Sampling temperature.
    pub temperature: f32,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ExplainOptions {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 500,
            temperature: 0.7,
            timeout_secs: 30,
        }
    }
}

/// HTTP service options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerOptions {
    /// Listen address.
    pub bind: String,

    /// Maximum accepted request body size.
    pub max_body_bytes: usize,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Main configuration structure with nested sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Analysis options
    pub analysis: AnalysisOptions,

    /// Output options
    pub output: OutputOptions,

    /// Explanation options
    pub explain: ExplainOptions,

    /// HTTP service options
    pub server: ServerOptions,
}

fn default_category() -> FindingCategory {
    FindingCategory::Security
}

impl Config {
    /// Load configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn from_yaml(content: &str) -> Result<Self> {
        tracing::debug!("Parsing configuration from YAML");
        let expanded = expand_env_vars(content);

        let config: Self = serde_yaml::from_str(&expanded)
            .to_config_parse_error("invalid configuration YAML".to_string())?;

        tracing::debug!(
            custom_rules = config.analysis.rules.len(),
            disabled_rules = config.analysis.disabled_rules.len(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Load configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is invalid.
    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading configuration file");
        let content = std::fs::read_to_string(path).with_path(path)?;
        Self::from_yaml(&content)
    }

    /// Check the configuration for values that would fail later.
    ///
    /// Custom rules are compiled here so that a bad glob or regex is
    /// reported up front; the resulting rule set is returned.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigValue` error describing the first problem found.
    pub fn validate(&self) -> Result<crate::analyzer::RuleSet> {
        let rules = crate::analyzer::RuleSet::from_options(&self.analysis)?;

        if self.explain.endpoint.trim().is_empty() {
            return Err(crate::err!(ConfigValue {
                key: "explain.endpoint".to_string(),
                message: "endpoint must not be empty".to_string(),
            }));
        }
        if self.explain.max_tokens == 0 {
            return Err(crate::err!(ConfigValue {
                key: "explain.max_tokens".to_string(),
                message: "must be greater than zero".to_string(),
            }));
        }
        if !(0.0..=2.0).contains(&self.explain.temperature) {
            return Err(crate::err!(ConfigValue {
                key: "explain.temperature".to_string(),
                message: format!("{} is outside 0.0..=2.0", self.explain.temperature),
            }));
        }
        if self.explain.timeout_secs == 0 {
            return Err(crate::err!(ConfigValue {
                key: "explain.timeout_secs".to_string(),
                message: "must be greater than zero".to_string(),
            }));
        }
        if self.server.bind.trim().is_empty() {
            return Err(crate::err!(ConfigValue {
                key: "server.bind".to_string(),
                message: "bind address must not be empty".to_string(),
            }));
        }
        if self.server.max_body_bytes == 0 {
            return Err(crate::err!(ConfigValue {
                key: "server.max_body_bytes".to_string(),
                message: "must be greater than zero".to_string(),
            }));
        }

        Ok(rules)
    }

    /// Generate an example YAML configuration.
    #[must_use]
    pub fn example_yaml() -> String {
        r#"# InfraExplain Configuration File

# Analysis options
analysis:
  # Built-in or custom rule codes to switch off
  #   IE001  security group open to 0.0.0.0/0
  #   IE002  IAM role granting '*'
  #   IE003  resource without properties
  disabled_rules: []

  # Additional rules matched against rendered resource properties
  rules: []
  # rules:
  #   - code: ORG001
  #     kinds: ["aws_s3_bucket", "aws_s3_bucket_acl"]
  #     property: acl
  #     contains: public-read
  #     category: security
  #     message: "Bucket '{name}' is publicly readable"
  #
  #   - code: ORG002
  #     kinds: ["aws_db_instance"]
  #     property: storage_encrypted
  #     pattern: "^false$"
  #     category: improvement
  #     message: "Database '{name}' does not encrypt storage"

# Output options
output:
  # Use colored output in terminal
  colored: true

  # Enable verbose output
  verbose: false

  # Pretty-print JSON output
  pretty: true

# Explanation options
explain:
  # API key for the completion endpoint (falls back to OPENAI_API_KEY).
  # Without a key the offline explanation is used.
  # api_key: ${OPENAI_API_KEY}

  endpoint: https://api.openai.com/v1/chat/completions
  model: gpt-3.5-turbo
  max_tokens: 500
  temperature: 0.7
  timeout_secs: 30

# HTTP service options
server:
  bind: 0.0.0.0:8080
  max_body_bytes: 1048576
"#
        .to_string()
    }

    /// Merge CLI arguments into the configuration.
    pub fn merge_cli_args(&mut self, args: &crate::cli::AnalysisArgs) {
        for code in &args.disable_rules {
            if !self.analysis.disabled_rules.contains(code) {
                self.analysis.disabled_rules.push(code.clone());
            }
        }
        if args.no_color {
            self.output.colored = false;
        }
        if args.compact {
            self.output.pretty = false;
        }
    }

    /// Load the API key from the environment when the file sets none.
    pub fn load_api_key_from_env(&mut self) {
        if self.explain.api_key.as_deref().is_some_and(|k| !k.is_empty()) {
            return;
        }
        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.is_empty() => {
                tracing::debug!(env_var = API_KEY_ENV, "Loaded API key from environment");
                self.explain.api_key = Some(key);
            }
            _ => {
                tracing::debug!("No API key configured, explanations will be generated offline");
                self.explain.api_key = None;
            }
        }
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax. Unknown variables are left as written.
fn expand_env_vars(content: &str) -> String {
    let braced = BRACED_VAR.replace_all(content, |cap: &regex::Captures<'_>| {
        std::env::var(&cap[1]).unwrap_or_else(|_| cap[0].to_string())
    });
    BARE_VAR
        .replace_all(&braced, |cap: &regex::Captures<'_>| {
            std::env::var(&cap[1]).unwrap_or_else(|_| cap[0].to_string())
        })
        .into_owned()
}
