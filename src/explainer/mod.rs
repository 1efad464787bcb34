//! Plain-language explanation of configuration documents.
//!
//! The explainer consumes an analyzed [`ConfigurationDocument`] and never
//! re-parses text. When a completion client is configured the document is
//! described to it with [`build_prompt`]; when there is no client, or the
//! client fails, the offline [`simple_explanation`] is returned instead, so
//! explaining never fails.
//!
//! # Example
//!
//! ```rust
//! use infraexplain::explainer::Explainer;
//! use infraexplain::types::ConfigurationDocument;
//!
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! let summary = rt.block_on(Explainer::offline().explain(&ConfigurationDocument::default()));
//! assert!(summary.starts_with("This Terraform configuration"));
//! ```

mod client;
mod prompt;

pub use client::{CompletionClient, OpenAiClient};
pub use prompt::{build_prompt, simple_explanation, SYSTEM_PROMPT};

use crate::config::ExplainOptions;
use crate::error::Result;
use crate::types::ConfigurationDocument;
use std::sync::Arc;

/// Produces explanations, online when possible.
#[derive(Clone, Default)]
pub struct Explainer {
    client: Option<Arc<dyn CompletionClient>>,
}

impl std::fmt::Debug for Explainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Explainer")
            .field("online", &self.client.is_some())
            .finish()
    }
}

impl Explainer {
    /// An explainer that only produces the offline explanation.
    #[must_use]
    pub fn offline() -> Self {
        Self { client: None }
    }

    /// An explainer backed by the given client.
    #[must_use]
    pub fn with_client(client: Arc<dyn CompletionClient>) -> Self {
        Self { client: Some(client) }
    }

    /// Build an explainer from options: online when an API key is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_options(options: &ExplainOptions) -> Result<Self> {
        match options.api_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => {
                tracing::debug!(model = %options.model, "Using completion API for explanations");
                Ok(Self::with_client(Arc::new(OpenAiClient::new(options, key)?)))
            }
            None => Ok(Self::offline()),
        }
    }

    /// Whether a completion client is configured.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.client.is_some()
    }

    /// Explain a document.
    pub async fn explain(&self, doc: &ConfigurationDocument) -> String {
        let Some(client) = &self.client else {
            return simple_explanation(doc);
        };

        let prompt = build_prompt(doc);
        match client.complete(SYSTEM_PROMPT, &prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Completion failed, using offline explanation");
                simple_explanation(doc)
            }
        }
    }
}
