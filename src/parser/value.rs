//! Evaluation and string rendering of attribute values.
//!
//! Raw value text is handed to the `hcl-rs` evaluator with an empty context.
//! Literals, lists of literals and constant expressions evaluate; anything
//! that needs a variable, resource reference or function does not, and
//! renders as [`UNKNOWN_VALUE`].

use hcl::eval::{Context, Evaluate};

/// Rendering of a value that cannot be evaluated without context.
pub const UNKNOWN_VALUE: &str = "<unknown>";

/// A statically evaluated attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Bool(bool),
    Number(hcl::Number),
    List(Vec<Value>),
    /// References, function calls, interpolated templates, objects, null
    /// and syntax errors all end up here.
    Unresolved,
}

impl Value {
    /// Evaluate the raw text of an attribute value.
    #[must_use]
    pub fn evaluate(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Self::Unresolved;
        }

        let body = match hcl::parse(&format!("value = {raw}\n")) {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(value = raw, error = %e, "Value is not a valid expression");
                return Self::Unresolved;
            }
        };

        let Some(attr) = body.attributes().find(|a| a.key.as_str() == "value") else {
            return Self::Unresolved;
        };

        match attr.expr.evaluate(&Context::new()) {
            Ok(value) => Self::from(value),
            Err(e) => {
                tracing::debug!(value = raw, error = %e, "Value needs evaluation context");
                Self::Unresolved
            }
        }
    }

    /// Render the value the way it is stored in resource properties.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => render_number(n),
            Self::List(items) => {
                let items: Vec<String> = items.iter().map(Self::render).collect();
                format!("[{}]", items.join(", "))
            }
            Self::Unresolved => UNKNOWN_VALUE.to_string(),
        }
    }
}

impl From<hcl::Value> for Value {
    fn from(value: hcl::Value) -> Self {
        match value {
            hcl::Value::String(s) => Self::String(s),
            hcl::Value::Bool(b) => Self::Bool(b),
            hcl::Value::Number(n) => Self::Number(n),
            hcl::Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            hcl::Value::Null | hcl::Value::Object(_) => Self::Unresolved,
        }
    }
}

fn render_number(n: &hcl::Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        n.as_f64().map_or_else(|| UNKNOWN_VALUE.to_string(), |f| f.to_string())
    }
}
