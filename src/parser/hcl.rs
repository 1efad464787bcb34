//! Declaration extractor.
//!
//! Walks the token stream at top level and recognizes `resource`, `variable`
//! and `output` blocks. Everything else (providers, modules, data sources,
//! locals, top-level attributes) is skipped whole. Inside resources only the
//! attributes at body depth 0 are captured; nested blocks are skipped.

use crate::error::Result;
use crate::parser::lexer::{tokenize, Token, TokenKind};
use crate::parser::value::Value;
use crate::parser::Parser;
use crate::types::{ConfigurationDocument, ResourceDeclaration};

/// Extractor for Terraform configuration text.
#[derive(Debug, Clone, Copy, Default)]
pub struct HclParser;

impl HclParser {
    /// Create a new parser.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Parser for HclParser {
    fn parse_content(&self, content: &str) -> Result<ConfigurationDocument> {
        let tokens = tokenize(content)?;
        let mut doc = ConfigurationDocument::default();

        let mut i = 0;
        while i < tokens.len() {
            let token = &tokens[i];
            if token.kind == TokenKind::Newline {
                i += 1;
                continue;
            }
            if token.kind != TokenKind::Ident {
                i = skip_statement(&tokens, i);
                continue;
            }

            let header = BlockHeader::read(&tokens, i);
            let Some(open) = header.open_brace else {
                // Top-level attribute or stray tokens.
                i = skip_statement(&tokens, i);
                continue;
            };
            let close = matching_brace(&tokens, open);
            let body = &tokens[open + 1..close];

            match token.text {
                "resource" => {
                    if let Some(resource) = extract_resource(content, token, &header.labels, body) {
                        doc.resources.push(resource);
                    }
                }
                "variable" | "output" => {
                    let list = if token.text == "variable" { &mut doc.variables } else { &mut doc.outputs };
                    match header.labels.first() {
                        Some(name) if !name.is_empty() => list.push(name.clone()),
                        _ => tracing::warn!(
                            keyword = token.text,
                            line = token.line,
                            "Skipping declaration without a name label"
                        ),
                    }
                }
                other => {
                    tracing::trace!(keyword = other, line = token.line, "Skipping block");
                }
            }

            i = close + 1;
        }

        tracing::debug!(
            resources = doc.resources.len(),
            variables = doc.variables.len(),
            outputs = doc.outputs.len(),
            "Extraction complete"
        );

        Ok(doc)
    }
}

/// Keyword, labels and the position of the opening brace of a block.
struct BlockHeader {
    labels: Vec<String>,
    open_brace: Option<usize>,
}

impl BlockHeader {
    /// Read the header that starts with the identifier at `start`.
    fn read(tokens: &[Token<'_>], start: usize) -> Self {
        let mut labels = Vec::new();
        let mut j = start + 1;
        while let Some(token) = tokens.get(j).filter(|t| t.is_label()) {
            labels.push(label_text(token));
            j += 1;
        }
        let open_brace = tokens
            .get(j)
            .filter(|t| t.kind == TokenKind::OpenBrace)
            .map(|_| j);
        Self { labels, open_brace }
    }
}

fn extract_resource(
    source: &str,
    keyword: &Token<'_>,
    labels: &[String],
    body: &[Token<'_>],
) -> Option<ResourceDeclaration> {
    let [kind, name] = labels else {
        tracing::warn!(
            line = keyword.line,
            labels = labels.len(),
            "Skipping resource block without exactly two labels"
        );
        return None;
    };
    if name.is_empty() {
        tracing::warn!(line = keyword.line, kind = %kind, "Skipping resource block with an empty name");
        return None;
    }

    let mut resource = ResourceDeclaration::new(kind.as_str(), name.as_str());

    let mut k = 0;
    while k < body.len() {
        let token = &body[k];
        match token.kind {
            TokenKind::Newline => k += 1,
            TokenKind::Ident if body.get(k + 1).is_some_and(|t| t.kind == TokenKind::Equals) => {
                let end = skip_statement(body, k + 2);
                let value_tokens = trim_newlines(&body[k + 2..end]);
                let raw = match (value_tokens.first(), value_tokens.last()) {
                    (Some(first), Some(last)) => &source[first.span.start..last.span.end],
                    _ => "",
                };
                let value = Value::evaluate(raw);
                if value == Value::Unresolved {
                    tracing::debug!(
                        resource = %resource.address(),
                        property = token.text,
                        "Property value is not statically known"
                    );
                }
                resource.properties.insert(token.text.to_string(), value.render());
                k = end;
            }
            TokenKind::Ident => {
                let header = BlockHeader::read(body, k);
                if let Some(open) = header.open_brace {
                    tracing::trace!(block = token.text, "Skipping nested block");
                    k = matching_brace(body, open) + 1;
                } else {
                    k = skip_statement(body, k);
                }
            }
            _ => k = skip_statement(body, k),
        }
    }

    tracing::debug!(
        resource = %resource.address(),
        properties = resource.properties.len(),
        "Extracted resource"
    );
    Some(resource)
}

/// Index of the brace closing the one at `open`, or `tokens.len()` when the
/// block is never closed.
fn matching_brace(tokens: &[Token<'_>], open: usize) -> usize {
    let mut depth = 0usize;
    for (idx, token) in tokens.iter().enumerate().skip(open) {
        match token.kind {
            TokenKind::OpenBrace => depth += 1,
            TokenKind::CloseBrace => {
                depth -= 1;
                if depth == 0 {
                    return idx;
                }
            }
            _ => {}
        }
    }
    tracing::debug!(line = tokens[open].line, "Block is not closed, running to end of input");
    tokens.len()
}

/// Index just past the statement starting at `start`: the next newline at
/// bracket depth 0, or the end of the slice.
fn skip_statement(tokens: &[Token<'_>], start: usize) -> usize {
    let mut depth = 0usize;
    let mut idx = start;
    while let Some(token) = tokens.get(idx) {
        match token.kind {
            TokenKind::OpenBrace | TokenKind::OpenBracket | TokenKind::OpenParen => depth += 1,
            TokenKind::CloseBrace | TokenKind::CloseBracket | TokenKind::CloseParen => {
                depth = depth.saturating_sub(1);
            }
            TokenKind::Newline if depth == 0 => return idx,
            _ => {}
        }
        idx += 1;
    }
    idx
}

fn trim_newlines<'t, 'a>(tokens: &'t [Token<'a>]) -> &'t [Token<'a>] {
    let start = tokens
        .iter()
        .position(|t| t.kind != TokenKind::Newline)
        .unwrap_or(tokens.len());
    let end = tokens
        .iter()
        .rposition(|t| t.kind != TokenKind::Newline)
        .map_or(start, |p| p + 1);
    &tokens[start..end]
}

/// Text of a block label: identifiers as written, quoted strings unquoted.
fn label_text(token: &Token<'_>) -> String {
    if token.kind != TokenKind::Str {
        return token.text.to_string();
    }
    match Value::evaluate(token.text) {
        Value::String(s) => s,
        _ => token
            .text
            .trim_start_matches('"')
            .trim_end_matches('"')
            .to_string(),
    }
}
