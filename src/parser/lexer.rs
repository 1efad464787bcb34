//! Tokenizer for Terraform configuration text.
//!
//! The lexer knows just enough of the HCL grammar to make block structure
//! reliable: quoted strings (including `${...}` and `%{...}` template
//! sequences, which may nest further strings and braces) and heredocs are
//! single tokens, so braces and quotes inside them never count towards block
//! depth. Comments are discarded, newlines are kept because they terminate
//! attribute statements.
//!
//! Tokenizing is all-or-nothing: an unterminated string, template sequence,
//! heredoc or block comment anywhere fails the whole text, so a single
//! malformed value such as `x = "${"` loses every other block with it.

use crate::error::Result;
use std::ops::Range;

/// Multi-character operators, longest first where prefixes overlap.
const OPERATORS: &[&str] = &["...", "==", "!=", "<=", ">=", "&&", "||", "=>"];

/// Kind of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword (`resource`, `aws_instance`, `true`)
    Ident,
    /// Quoted string, quotes included
    Str,
    /// Heredoc from `<<` through the closing marker
    Heredoc,
    /// Numeric literal
    Number,
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    OpenParen,
    CloseParen,
    /// A lone `=`
    Equals,
    Comma,
    Newline,
    /// Multi-character operator such as `==` or `=>`
    Operator,
    /// Any other single character
    Symbol,
}

/// A token with its byte span and 1-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub span: Range<usize>,
    pub line: usize,
    pub column: usize,
}

impl Token<'_> {
    /// True for tokens that can serve as a block label.
    #[must_use]
    pub fn is_label(&self) -> bool {
        matches!(self.kind, TokenKind::Ident | TokenKind::Str)
    }
}

/// Split configuration text into tokens.
///
/// # Errors
///
/// Returns a `Lexical` error for a quoted string not closed before the end of
/// its line, an unterminated block comment, or an unterminated or malformed
/// heredoc.
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>> {
    Lexer::new(source).run()
}

#[derive(Debug, Clone, Copy)]
struct Mark {
    pos: usize,
    line: usize,
    column: usize,
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token<'a>>> {
        while let Some(c) = self.peek() {
            let start = self.mark();

            if let Some(op) = OPERATORS.iter().find(|op| self.starts_with(op)) {
                self.advance(op.len());
                self.push(TokenKind::Operator, start);
                continue;
            }

            match c {
                '\n' => {
                    self.bump();
                    self.push(TokenKind::Newline, start);
                }
                c if c.is_whitespace() => {
                    self.bump();
                }
                '#' => self.skip_line_comment(),
                '/' if self.starts_with("//") => self.skip_line_comment(),
                '/' if self.starts_with("/*") => self.skip_block_comment(start)?,
                '"' => {
                    self.bump();
                    self.scan_quoted(start)?;
                    self.push(TokenKind::Str, start);
                }
                '<' if self.starts_with("<<") => {
                    self.scan_heredoc(start)?;
                    self.push(TokenKind::Heredoc, start);
                }
                c if c.is_ascii_digit() => {
                    self.scan_number();
                    self.push(TokenKind::Number, start);
                }
                c if is_ident_start(c) => {
                    while self.peek().is_some_and(is_ident_char) {
                        self.bump();
                    }
                    self.push(TokenKind::Ident, start);
                }
                _ => {
                    self.bump();
                    let kind = match c {
                        '{' => TokenKind::OpenBrace,
                        '}' => TokenKind::CloseBrace,
                        '[' => TokenKind::OpenBracket,
                        ']' => TokenKind::CloseBracket,
                        '(' => TokenKind::OpenParen,
                        ')' => TokenKind::CloseParen,
                        '=' => TokenKind::Equals,
                        ',' => TokenKind::Comma,
                        _ => TokenKind::Symbol,
                    };
                    self.push(kind, start);
                }
            }
        }

        tracing::trace!(tokens = self.tokens.len(), "Tokenized configuration");
        Ok(self.tokens)
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.src[self.pos..].chars().nth(1)
    }

    fn starts_with(&self, s: &str) -> bool {
        self.src[self.pos..].starts_with(s)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Advance over `n` characters.
    fn advance(&mut self, n: usize) {
        for _ in 0..n {
            self.bump();
        }
    }

    fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    fn push(&mut self, kind: TokenKind, start: Mark) {
        self.tokens.push(Token {
            kind,
            text: &self.src[start.pos..self.pos],
            span: start.pos..self.pos,
            line: start.line,
            column: start.column,
        });
    }

    fn skip_line_comment(&mut self) {
        while self.peek().is_some_and(|c| c != '\n') {
            self.bump();
        }
    }

    fn skip_block_comment(&mut self, start: Mark) -> Result<()> {
        let Some(offset) = self.src[self.pos + 2..].find("*/") else {
            return Err(lexical("unterminated block comment", start));
        };
        let end = self.pos + 2 + offset + 2;
        while self.pos < end {
            self.bump();
        }
        Ok(())
    }

    /// Scan the rest of a quoted string; the opening quote is already consumed.
    fn scan_quoted(&mut self, open: Mark) -> Result<()> {
        loop {
            match self.peek() {
                None | Some('\n') => {
                    return Err(lexical("unterminated string literal", open));
                }
                Some('\\') => {
                    self.bump();
                    match self.peek() {
                        None | Some('\n') => {
                            return Err(lexical("unterminated string literal", open));
                        }
                        Some(_) => {
                            self.bump();
                        }
                    }
                }
                Some('"') => {
                    self.bump();
                    return Ok(());
                }
                // `$${` and `%%{` are literal, not template introducers
                Some('$' | '%') if self.starts_with("$${") || self.starts_with("%%{") => {
                    self.advance(3);
                }
                Some('$' | '%') if self.peek_second() == Some('{') => {
                    self.advance(2);
                    self.scan_template(open)?;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    /// Scan a template sequence up to its closing brace; `${` is already consumed.
    fn scan_template(&mut self, open: Mark) -> Result<()> {
        let mut depth = 1usize;
        loop {
            match self.peek() {
                None => {
                    return Err(lexical("unterminated template sequence in string literal", open));
                }
                Some('"') => {
                    let nested = self.mark();
                    self.bump();
                    self.scan_quoted(nested)?;
                }
                Some('{') => {
                    depth += 1;
                    self.bump();
                }
                Some('}') => {
                    self.bump();
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    fn scan_heredoc(&mut self, start: Mark) -> Result<()> {
        self.advance(2);
        if self.peek() == Some('-') {
            self.bump();
        }

        let marker_start = self.pos;
        if !self.peek().is_some_and(is_ident_start) {
            return Err(lexical("malformed heredoc introducer", start));
        }
        while self.peek().is_some_and(is_ident_char) {
            self.bump();
        }
        let marker = &self.src[marker_start..self.pos];

        // The introducer must be the last thing on its line.
        loop {
            match self.peek() {
                Some('\n') => {
                    self.bump();
                    break;
                }
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                None => return Err(lexical("unterminated heredoc", start)),
                Some(_) => return Err(lexical("malformed heredoc introducer", start)),
            }
        }

        loop {
            if self.peek().is_none() {
                return Err(lexical(&format!("unterminated heredoc, missing closing '{marker}'"), start));
            }
            let line_start = self.pos;
            let line_end = self.src[line_start..]
                .find('\n')
                .map_or(self.src.len(), |i| line_start + i);
            let line = &self.src[line_start..line_end];

            if line.trim() == marker {
                let indent = line.len() - line.trim_start().len();
                let marker_end = line_start + indent + marker.len();
                while self.pos < marker_end {
                    self.bump();
                }
                return Ok(());
            }

            while self.pos < line_end {
                self.bump();
            }
            if self.peek() == Some('\n') {
                self.bump();
            }
        }
    }

    fn scan_number(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        if self.peek() == Some('.') && self.peek_second().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let rest = &self.src[self.pos + 1..];
            let digits = rest.strip_prefix(['+', '-']).unwrap_or(rest);
            if digits.starts_with(|c: char| c.is_ascii_digit()) {
                self.advance(1 + rest.len() - digits.len());
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.bump();
                }
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

fn lexical(message: &str, at: Mark) -> crate::error::InfraExplainError {
    crate::err!(Lexical {
        message: message.to_string(),
        line: at.line,
        column: at.column,
    })
}
