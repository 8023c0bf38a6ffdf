//! DDL tokenization.
//!
//! Produces a flat token list that always ends with an [`TokenKind::Eof`]
//! token. Every token keeps its byte span so the parser can slice raw
//! expression text back out of the source.

use spanspy_core::SourceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Bare identifier or keyword.
    Ident,
    /// Back-quoted identifier; `text` holds the unquoted name.
    QuotedIdent,
    Int,
    Float,
    /// String or bytes literal; `text` holds the content between quotes.
    Str,
    /// `@name`; `text` holds the name without `@`.
    Param,
    Symbol,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Token {
    /// Case-insensitive keyword test; never matches quoted identifiers.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Ident && self.text.eq_ignore_ascii_case(keyword)
    }

    pub fn is_symbol(&self, symbol: &str) -> bool {
        self.kind == TokenKind::Symbol && self.text == symbol
    }

    /// How the token is quoted in diagnostics.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::QuotedIdent => format!("`{}`", self.text),
            TokenKind::Str => "string literal".to_string(),
            TokenKind::Param => format!("'@{}'", self.text),
            _ => format!("'{}'", self.text),
        }
    }
}

const TWO_CHAR_SYMBOLS: [&str; 6] = ["=>", "<=", ">=", "<>", "!=", "||"];
const ONE_CHAR_SYMBOLS: &str = "(),.;<>=+-*/%&|^~[]{}:?!";

pub struct Lexer<'a> {
    source_name: &'a str,
    src: &'a str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source_name: &'a str, src: &'a str) -> Self {
        Self {
            source_name,
            src,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, SourceError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia()?;
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(n)
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

    fn error(&self, line: usize, column: usize, message: impl Into<String>) -> SourceError {
        SourceError::new(self.source_name, line, column, message)
    }

    fn skip_trivia(&mut self) -> Result<(), SourceError> {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else if c == '#' || (c == '-' && self.peek_nth(1) == Some('-')) {
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
            } else if c == '/' && self.peek_nth(1) == Some('*') {
                let (line, column) = (self.line, self.column);
                self.bump();
                self.bump();
                loop {
                    match self.bump() {
                        Some('*') if self.peek() == Some('/') => {
                            self.bump();
                            break;
                        }
                        Some(_) => {}
                        None => return Err(self.error(line, column, "unterminated block comment")),
                    }
                }
            } else {
                break;
            }
        }
        Ok(())
    }

    fn next_token(&mut self) -> Result<Token, SourceError> {
        let (start, line, column) = (self.pos, self.line, self.column);
        let Some(c) = self.peek() else {
            return Ok(self.token(TokenKind::Eof, String::new(), start, line, column));
        };

        if c == '`' {
            let name = self.quoted_identifier(line, column)?;
            return Ok(self.token(TokenKind::QuotedIdent, name, start, line, column));
        }
        if c == '\'' || c == '"' {
            let content = self.string_literal(false, line, column)?;
            return Ok(self.token(TokenKind::Str, content, start, line, column));
        }
        if c == '@' {
            self.bump();
            let name = self.take_while(is_ident_char);
            if name.is_empty() {
                return Err(self.error(line, column, "expected parameter name after '@'"));
            }
            return Ok(self.token(TokenKind::Param, name, start, line, column));
        }
        if c.is_ascii_digit() {
            return self.number(start, line, column);
        }
        if c.is_alphabetic() || c == '_' {
            let word = self.take_while(is_ident_char);
            if is_string_prefix(&word) && matches!(self.peek(), Some('\'') | Some('"')) {
                let raw = word.to_ascii_lowercase().contains('r');
                let content = self.string_literal(raw, line, column)?;
                return Ok(self.token(TokenKind::Str, content, start, line, column));
            }
            return Ok(self.token(TokenKind::Ident, word, start, line, column));
        }

        let rest = &self.src[self.pos..];
        if let Some(symbol) = TWO_CHAR_SYMBOLS.iter().find(|s| rest.starts_with(**s)) {
            self.bump();
            self.bump();
            return Ok(self.token(TokenKind::Symbol, symbol.to_string(), start, line, column));
        }
        if ONE_CHAR_SYMBOLS.contains(c) {
            self.bump();
            return Ok(self.token(TokenKind::Symbol, c.to_string(), start, line, column));
        }

        Err(self.error(line, column, format!("unexpected character {c:?}")))
    }

    fn token(&self, kind: TokenKind, text: String, start: usize, line: usize, column: usize) -> Token {
        Token {
            kind,
            text,
            start,
            end: self.pos,
            line,
            column,
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        self.src[start..self.pos].to_string()
    }

    fn number(&mut self, start: usize, line: usize, column: usize) -> Result<Token, SourceError> {
        if self.peek() == Some('0') && matches!(self.peek_nth(1), Some('x') | Some('X')) {
            self.bump();
            self.bump();
            let digits = self.take_while(|c| c.is_ascii_hexdigit());
            if digits.is_empty() {
                return Err(self.error(line, column, "malformed hexadecimal literal"));
            }
            let text = self.src[start..self.pos].to_string();
            return Ok(self.token(TokenKind::Int, text, start, line, column));
        }

        self.take_while(|c| c.is_ascii_digit());
        let mut kind = TokenKind::Int;
        if self.peek() == Some('.') && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            kind = TokenKind::Float;
            self.bump();
            self.take_while(|c| c.is_ascii_digit());
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            let signed = matches!(self.peek_nth(1), Some('+') | Some('-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_nth(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                kind = TokenKind::Float;
                for _ in 0..digit_at {
                    self.bump();
                }
                self.take_while(|c| c.is_ascii_digit());
            }
        }
        if self.peek().is_some_and(is_ident_char) {
            return Err(self.error(line, column, "malformed number literal"));
        }
        let text = self.src[start..self.pos].to_string();
        Ok(self.token(kind, text, start, line, column))
    }

    fn quoted_identifier(&mut self, line: usize, column: usize) -> Result<String, SourceError> {
        self.bump();
        let mut name = String::new();
        loop {
            match self.bump() {
                Some('`') => break,
                Some('\\') => match self.bump() {
                    Some('\n') | None => return Err(self.error(line, column, "unterminated quoted identifier")),
                    Some(c) => name.push(c),
                },
                Some('\n') | None => return Err(self.error(line, column, "unterminated quoted identifier")),
                Some(c) => name.push(c),
            }
        }
        if name.is_empty() {
            return Err(self.error(line, column, "empty quoted identifier"));
        }
        Ok(name)
    }

    /// Consume a single, double or triple quoted literal and return its raw content.
    fn string_literal(&mut self, raw: bool, line: usize, column: usize) -> Result<String, SourceError> {
        let Some(quote) = self.bump() else {
            return Err(self.error(line, column, "expected string literal"));
        };
        let triple = self.peek() == Some(quote) && self.peek_nth(1) == Some(quote);
        if triple {
            self.bump();
            self.bump();
        }

        let content_start = self.pos;
        loop {
            let content_end = self.pos;
            match self.bump() {
                None => return Err(self.error(line, column, "unterminated string literal")),
                Some('\\') if !raw => {
                    self.bump();
                }
                Some('\n') if !triple => {
                    return Err(self.error(line, column, "unterminated string literal"));
                }
                Some(c) if c == quote => {
                    if !triple {
                        return Ok(self.src[content_start..content_end].to_string());
                    }
                    if self.peek() == Some(quote) && self.peek_nth(1) == Some(quote) {
                        self.bump();
                        self.bump();
                        return Ok(self.src[content_start..content_end].to_string());
                    }
                }
                Some(_) => {}
            }
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_string_prefix(word: &str) -> bool {
    matches!(word.to_ascii_lowercase().as_str(), "r" | "b" | "rb" | "br")
}

/// Tokenize `src`, naming `source_name` in any error.
pub fn tokenize(source_name: &str, src: &str) -> Result<Vec<Token>, SourceError> {
    Lexer::new(source_name, src).tokenize()
}
