//! Tokenizer consuming preprocessed source text (§4.2's token stream).
//!
//! By the time source reaches the lexer, heredocs have been expanded,
//! comments stripped, compound assignments expanded, and bare commands
//! canonicalized by the preprocessor (§4.1). The lexer's only remaining
//! job is turning that canonical text into a flat `Token` stream, tracking
//! line numbers via the line map handed down from the preprocessor.

use crate::intern::Interner;
use crate::span::{LineMap, Span};
use crate::token::{keyword, StringPart, Token, TokenType};

pub struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line_map: &'a LineMap,
    interner: &'a mut Interner,
}

#[derive(Debug)]
pub struct LexError {
    pub message: String,
    pub line: u32,
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for LexError {}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, line_map: &'a LineMap, interner: &'a mut Interner) -> Self {
        Lexer {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            line_map,
            interner,
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_inline_whitespace();
            if self.pos >= self.bytes.len() {
                let line = self.current_line();
                tokens.push(Token::new(TokenType::Eof, Span::new(self.pos, self.pos), line));
                break;
            }
            let start = self.pos;
            let line = self.current_line();
            let c = self.bytes[self.pos];

            let kind = match c {
                b'\n' => {
                    self.pos += 1;
                    TokenType::Newline
                }
                b'#' => {
                    // Defensive: comments should already be stripped, but a
                    // `#` surviving to here (e.g. inside a raw block we did
                    // not fully canonicalize) is treated as end-of-line.
                    while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
                        self.pos += 1;
                    }
                    continue;
                }
                b'"' => self.lex_string()?,
                b'\'' => self.lex_raw_string(b'\'')?,
                b'`' => self.lex_raw_string(b'`')?,
                b'(' => { self.pos += 1; TokenType::LParen }
                b')' => { self.pos += 1; TokenType::RParen }
                b'[' => { self.pos += 1; TokenType::LBracket }
                b']' => { self.pos += 1; TokenType::RBracket }
                b'{' => { self.pos += 1; TokenType::LBrace }
                b'}' => { self.pos += 1; TokenType::RBrace }
                b',' => { self.pos += 1; TokenType::Comma }
                b'.' => { self.pos += 1; TokenType::Dot }
                b':' => { self.pos += 1; TokenType::Colon }
                b'|' => { self.pos += 1; TokenType::Pipe }
                b'+' => { self.pos += 1; TokenType::Plus }
                b'-' => {
                    self.pos += 1;
                    if self.peek() == Some(b'>') {
                        self.pos += 1;
                        TokenType::Arrow
                    } else {
                        TokenType::Minus
                    }
                }
                b'*' => { self.pos += 1; TokenType::Star }
                b'/' => { self.pos += 1; TokenType::Slash }
                b'%' => { self.pos += 1; TokenType::Percent }
                b'!' => {
                    self.pos += 1;
                    if self.peek() == Some(b'=') {
                        self.pos += 1;
                        TokenType::NotEq
                    } else {
                        TokenType::Bang
                    }
                }
                b'=' => {
                    self.pos += 1;
                    if self.peek() == Some(b'=') {
                        self.pos += 1;
                        TokenType::EqEq
                    } else {
                        TokenType::Eq
                    }
                }
                b'<' => {
                    self.pos += 1;
                    if self.peek() == Some(b'=') {
                        self.pos += 1;
                        TokenType::LtEq
                    } else {
                        TokenType::Lt
                    }
                }
                b'>' => {
                    self.pos += 1;
                    if self.peek() == Some(b'=') {
                        self.pos += 1;
                        TokenType::GtEq
                    } else {
                        TokenType::Gt
                    }
                }
                b'&' if self.peek_at(1) == Some(b'&') => {
                    self.pos += 2;
                    TokenType::AndAnd
                }
                b'|' if self.peek_at(1) == Some(b'|') => {
                    self.pos += 2;
                    TokenType::OrOr
                }
                b'0'..=b'9' => self.lex_number(),
                c if is_ident_start(c) => self.lex_identifier(),
                other => {
                    return Err(LexError {
                        message: format!("unexpected character '{}'", other as char),
                        line,
                    })
                }
            };

            let end = self.pos;
            tokens.push(Token::new(kind, Span::new(start, end), line));
        }
        Ok(tokens)
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn skip_inline_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c == b' ' || c == b'\t' || c == b'\r' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn current_line(&self) -> u32 {
        let logical_line = self.source[..self.pos.min(self.source.len())]
            .bytes()
            .filter(|&b| b == b'\n')
            .count()
            + 1;
        self.line_map.original_line(logical_line)
    }

    fn lex_number(&mut self) -> TokenType {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        let mut is_float = false;
        if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(b'0'..=b'9')) {
            is_float = true;
            self.pos += 1;
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.pos += 1;
            }
        }
        let text = &self.source[start..self.pos];
        if is_float {
            TokenType::Float(text.parse().unwrap_or(0.0))
        } else {
            TokenType::Int(text.parse().unwrap_or(0))
        }
    }

    fn lex_identifier(&mut self) -> TokenType {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if is_ident_continue(c)) {
            self.pos += 1;
        }
        // Allow a trailing `?` or `!`, Ruby-style (`empty?`, `save!`).
        if matches!(self.peek(), Some(b'?') | Some(b'!')) {
            self.pos += 1;
        }
        let text = &self.source[start..self.pos];
        if let Some(kw) = keyword(text) {
            return kw;
        }
        TokenType::Identifier(self.interner.intern(text))
    }

    /// Double-quoted strings support `#{ ... }` interpolation.
    fn lex_string(&mut self) -> Result<TokenType, LexError> {
        let line = self.current_line();
        self.pos += 1; // opening quote
        let mut parts = Vec::new();
        let mut literal = String::new();
        loop {
            match self.peek() {
                None => {
                    return Err(LexError {
                        message: "unterminated string literal".to_string(),
                        line,
                    })
                }
                Some(b'"') => {
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => {
                    self.pos += 1;
                    match self.peek() {
                        Some(b'n') => literal.push('\n'),
                        Some(b't') => literal.push('\t'),
                        Some(b'"') => literal.push('"'),
                        Some(b'\\') => literal.push('\\'),
                        Some(other) => literal.push(other as char),
                        None => {
                            return Err(LexError {
                                message: "unterminated escape sequence".to_string(),
                                line,
                            })
                        }
                    }
                    self.pos += 1;
                }
                Some(b'#') if self.peek_at(1) == Some(b'{') => {
                    if !literal.is_empty() {
                        parts.push(StringPart::Literal(std::mem::take(&mut literal)));
                    }
                    self.pos += 2;
                    let start = self.pos;
                    let mut depth = 1;
                    while depth > 0 {
                        match self.peek() {
                            None => {
                                return Err(LexError {
                                    message: "unterminated interpolation".to_string(),
                                    line,
                                })
                            }
                            Some(b'{') => {
                                depth += 1;
                                self.pos += 1;
                            }
                            Some(b'}') => {
                                depth -= 1;
                                self.pos += 1;
                            }
                            Some(_) => self.pos += 1,
                        }
                    }
                    let expr_src = &self.source[start..self.pos - 1];
                    parts.push(StringPart::Interpolation(expr_src.to_string()));
                }
                Some(c) => {
                    // Advance by full UTF-8 char, not just one byte.
                    let ch_len = utf8_len(c);
                    literal.push_str(&self.source[self.pos..self.pos + ch_len]);
                    self.pos += ch_len;
                }
            }
        }
        if !literal.is_empty() || parts.is_empty() {
            parts.push(StringPart::Literal(literal));
        }
        Ok(TokenType::Str(parts))
    }

    /// Single-quoted and backtick strings never interpolate at the lexer
    /// level: backtick interpolation is expanded earlier by the
    /// preprocessor's backtick-capture pass (§4.1), which re-renders the
    /// substituted text before handing it to the lexer as a capture-call.
    fn lex_raw_string(&mut self, quote: u8) -> Result<TokenType, LexError> {
        let line = self.current_line();
        self.pos += 1;
        let start = self.pos;
        while self.peek() != Some(quote) {
            if self.peek().is_none() {
                return Err(LexError {
                    message: "unterminated string literal".to_string(),
                    line,
                });
            }
            self.pos += 1;
        }
        let text = self.source[start..self.pos].to_string();
        self.pos += 1;
        Ok(TokenType::RawStr(text))
    }
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_ident_continue(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

fn utf8_len(first_byte: u8) -> usize {
    if first_byte & 0x80 == 0 {
        1
    } else if first_byte & 0xE0 == 0xC0 {
        2
    } else if first_byte & 0xF0 == 0xE0 {
        3
    } else {
        4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> Vec<TokenType> {
        let map = LineMap::identity(src.lines().count().max(1));
        let mut interner = Interner::new();
        let mut lexer = Lexer::new(src, &map, &mut interner);
        lexer
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_simple_call() {
        let kinds = lex("puts \"hi\"");
        assert!(matches!(kinds[0], TokenType::Identifier(_)));
        assert!(matches!(kinds[1], TokenType::Str(_)));
    }

    #[test]
    fn lexes_interpolated_string() {
        let kinds = lex("\"#{x} squared is #{x*x}\"");
        match &kinds[0] {
            TokenType::Str(parts) => {
                assert_eq!(parts.len(), 3);
                assert!(matches!(&parts[0], StringPart::Interpolation(e) if e == "x"));
                assert!(matches!(&parts[1], StringPart::Literal(l) if l == " squared is "));
                assert!(matches!(&parts[2], StringPart::Interpolation(e) if e == "x*x"));
            }
            other => panic!("expected Str, got {:?}", other),
        }
    }

    #[test]
    fn lexes_integers_and_floats() {
        let kinds = lex("42 3.14");
        assert_eq!(kinds[0], TokenType::Int(42));
        assert_eq!(kinds[1], TokenType::Float(3.14));
    }

    #[test]
    fn lexes_operators() {
        let kinds = lex("a == b && c != d");
        assert!(kinds.contains(&TokenType::EqEq));
        assert!(kinds.contains(&TokenType::AndAnd));
        assert!(kinds.contains(&TokenType::NotEq));
    }

    #[test]
    fn trailing_question_mark_is_part_of_identifier() {
        let map = LineMap::identity(1);
        let mut interner = Interner::new();
        let mut lexer = Lexer::new("empty?", &map, &mut interner);
        let tokens = lexer.tokenize().unwrap();
        assert_eq!(tokens[0].span, Span::new(0, 6));
    }

    #[test]
    fn reports_unterminated_string() {
        let map = LineMap::identity(1);
        let mut interner = Interner::new();
        let mut lexer = Lexer::new("\"unterminated", &map, &mut interner);
        assert!(lexer.tokenize().is_err());
    }
}
