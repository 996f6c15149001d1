//! Recursive-descent parser (§4.2), hand-maintained against the EBNF
//! grammar documented in this module's doc comment rather than generated
//! by a build-time tool — Rugo's grammar is small enough not to warrant
//! one (see `../../SPEC_FULL.md` §4.2).
//!
//! ```text
//! program     := stmt* ;
//! block       := stmt* ;
//! stmt        := if_stmt | while_stmt | for_stmt | def_stmt | use_stmt
//!              | return_stmt | "break" | "next" | "raise" expr
//!              | "sandbox" | test_stmt | bench_stmt | assign_stmt
//!              | expr_stmt ;
//! if_stmt     := "if" expr block ("elsif" expr block)* ("else" block)? "end" ;
//! while_stmt  := "while" expr block "end" ;
//! for_stmt    := "for" (ident ",")? (ident ",")? ident "in" expr block "end" ;
//! def_stmt    := "def" ident "(" params? ")" block "end" ;
//! use_stmt    := ("use"|"import"|"require") expr ("as" ident)? ("with" "[" ident* "]")? ;
//! assign_stmt := lvalue ("=" | "+=" | ...) expr ;
//! expr        := or_expr ;
//! or_expr     := and_expr (("or"|"||") and_expr)* ;
//! and_expr    := eq_expr (("and"|"&&") eq_expr)* ;
//! eq_expr     := rel_expr (("=="|"!=") rel_expr)* ;
//! rel_expr    := add_expr (("<"|">"|"<="|">=") add_expr)* ;
//! add_expr    := mul_expr (("+"|"-") mul_expr)* ;
//! mul_expr    := unary_expr (("*"|"/"|"%") unary_expr)* ;
//! unary_expr  := ("-"|"not"|"!") unary_expr | postfix_expr ;
//! postfix_expr:= primary (call_suffix | index_suffix | member_suffix)* ;
//! primary     := literal | ident | "(" expr ")" | array | hash | lambda ;
//! ```

use crate::intern::Interner;
use crate::parser::tree::{ModuleKeyword, Node, NodeKind, StrPartNode};
use crate::token::{StringPart, Token, TokenType};

#[derive(Debug)]
pub struct ParseError {
    pub message: String,
    pub line: u32,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ParseError {}

pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    interner: &'a mut Interner,
}

pub fn parse_program(tokens: Vec<Token>, interner: &mut Interner) -> Result<Vec<Node>, ParseError> {
    log::debug!("parsing {} tokens", tokens.len());
    let mut parser = Parser {
        tokens,
        pos: 0,
        interner,
    };
    let stmts = parser.block_until(|t| matches!(t, TokenType::Eof))?;
    parser.expect(&TokenType::Eof)?;
    log::debug!("parse complete: {} top-level nodes", stmts.len());
    Ok(stmts)
}

impl<'a> Parser<'a> {
    fn peek(&self) -> &TokenType {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].kind
    }

    fn peek_line(&self) -> u32 {
        self.tokens[self.pos.min(self.tokens.len() - 1)].line
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn skip_newlines(&mut self) {
        while matches!(self.peek(), TokenType::Newline) {
            self.advance();
        }
    }

    fn check(&self, kind: &TokenType) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(kind)
    }

    fn at_keyword(&self, kind: &TokenType) -> bool {
        self.check(kind)
    }

    fn expect(&mut self, kind: &TokenType) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError {
                message: format!("expected {:?}, found {:?}", kind, self.peek()),
                line: self.peek_line(),
            })
        }
    }

    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        match self.peek().clone() {
            TokenType::Identifier(sym) => {
                self.advance();
                Ok(self.interner.resolve(sym).to_string())
            }
            other => Err(ParseError {
                message: format!("expected identifier, found {:?}", other),
                line: self.peek_line(),
            }),
        }
    }

    fn block_until(&mut self, done: impl Fn(&TokenType) -> bool) -> Result<Vec<Node>, ParseError> {
        let mut stmts = Vec::new();
        self.skip_newlines();
        while !done(self.peek()) {
            stmts.push(self.statement()?);
            self.skip_newlines();
        }
        Ok(stmts)
    }

    fn is_block_end(t: &TokenType) -> bool {
        matches!(
            t,
            TokenType::End | TokenType::Elsif | TokenType::Else | TokenType::Eof
        )
    }

    fn statement(&mut self) -> Result<Node, ParseError> {
        let line = self.peek_line();
        match self.peek().clone() {
            TokenType::If => self.if_stmt(),
            TokenType::While => self.while_stmt(),
            TokenType::For => self.for_stmt(),
            TokenType::Def => self.def_stmt(),
            TokenType::Use | TokenType::Import | TokenType::Require => self.use_stmt(),
            TokenType::Return => {
                self.advance();
                let value = if matches!(self.peek(), TokenType::Newline | TokenType::Eof) {
                    None
                } else {
                    Some(Box::new(self.expression()?))
                };
                Ok(Node::new(NodeKind::Return(value), line))
            }
            TokenType::Break => {
                self.advance();
                Ok(Node::new(NodeKind::Break, line))
            }
            TokenType::Next => {
                self.advance();
                Ok(Node::new(NodeKind::Next, line))
            }
            TokenType::Raise => {
                self.advance();
                let value = self.expression()?;
                Ok(Node::new(NodeKind::Raise(Box::new(value)), line))
            }
            TokenType::Sandbox => {
                self.advance();
                Ok(Node::new(NodeKind::Sandbox, line))
            }
            TokenType::Test => self.test_stmt(),
            TokenType::Benchmark => self.bench_stmt(),
            _ => self.assign_or_expr_stmt(),
        }
    }

    fn if_stmt(&mut self) -> Result<Node, ParseError> {
        let line = self.peek_line();
        self.advance(); // if
        let mut branches = Vec::new();
        let cond = self.expression()?;
        let body = self.block_until(Self::is_block_end)?;
        branches.push((cond, body));
        while matches!(self.peek(), TokenType::Elsif) {
            self.advance();
            let cond = self.expression()?;
            let body = self.block_until(Self::is_block_end)?;
            branches.push((cond, body));
        }
        let else_branch = if matches!(self.peek(), TokenType::Else) {
            self.advance();
            Some(self.block_until(Self::is_block_end)?)
        } else {
            None
        };
        self.expect(&TokenType::End)?;
        Ok(Node::new(
            NodeKind::If {
                branches,
                else_branch,
            },
            line,
        ))
    }

    fn while_stmt(&mut self) -> Result<Node, ParseError> {
        let line = self.peek_line();
        self.advance();
        let cond = self.expression()?;
        let body = self.block_until(Self::is_block_end)?;
        self.expect(&TokenType::End)?;
        Ok(Node::new(
            NodeKind::While {
                cond: Box::new(cond),
                body,
            },
            line,
        ))
    }

    fn for_stmt(&mut self) -> Result<Node, ParseError> {
        let line = self.peek_line();
        self.advance();
        let mut names = vec![self.expect_identifier()?];
        while matches!(self.peek(), TokenType::Comma) {
            self.advance();
            names.push(self.expect_identifier()?);
        }
        self.expect(&TokenType::In)?;
        let iterable = self.expression()?;
        let body = self.block_until(Self::is_block_end)?;
        self.expect(&TokenType::End)?;
        // `for i, v in arr` -> index + binding; `for k, v in hash` -> key +
        // binding; `for v in arr` -> binding only. Three names is an error
        // the walker can surface more precisely, but grammar accepts it
        // structurally and treats the first two as index/key.
        let (index, key, binding) = match names.len() {
            1 => (None, None, names[0].clone()),
            2 => (Some(names[0].clone()), None, names[1].clone()),
            _ => (Some(names[0].clone()), Some(names[1].clone()), names[2].clone()),
        };
        Ok(Node::new(
            NodeKind::ForIn {
                index,
                key,
                binding,
                iterable: Box::new(iterable),
                body,
            },
            line,
        ))
    }

    fn def_stmt(&mut self) -> Result<Node, ParseError> {
        let line = self.peek_line();
        self.advance();
        let name = self.expect_identifier()?;
        self.expect(&TokenType::LParen)?;
        let mut params = Vec::new();
        let mut variadic = false;
        if !matches!(self.peek(), TokenType::RParen) {
            loop {
                let splat = matches!(self.peek(), TokenType::Star);
                if splat {
                    self.advance();
                }
                params.push(self.expect_identifier()?);
                if splat {
                    variadic = true;
                }
                if matches!(self.peek(), TokenType::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(&TokenType::RParen)?;
        let body = self.block_until(Self::is_block_end)?;
        self.expect(&TokenType::End)?;
        Ok(Node::new(
            NodeKind::FunctionDef {
                name,
                params,
                variadic,
                body,
            },
            line,
        ))
    }

    fn use_stmt(&mut self) -> Result<Node, ParseError> {
        let line = self.peek_line();
        let keyword = match self.advance().kind {
            TokenType::Use => ModuleKeyword::Use,
            TokenType::Import => ModuleKeyword::Import,
            TokenType::Require => ModuleKeyword::Require,
            other => {
                return Err(ParseError {
                    message: format!("expected use/import/require, found {:?}", other),
                    line,
                })
            }
        };
        let reference = match self.peek().clone() {
            TokenType::Str(parts) => {
                self.advance();
                parts
                    .iter()
                    .map(|p| match p {
                        StringPart::Literal(s) => s.clone(),
                        StringPart::Interpolation(e) => format!("#{{{}}}", e),
                    })
                    .collect::<String>()
            }
            TokenType::Identifier(sym) => {
                self.advance();
                self.interner.resolve(sym).to_string()
            }
            other => {
                return Err(ParseError {
                    message: format!("expected module reference, found {:?}", other),
                    line,
                })
            }
        };
        let alias = if matches!(self.peek(), TokenType::As) {
            self.advance();
            Some(self.expect_identifier()?)
        } else {
            None
        };
        let with_list = if matches!(self.peek(), TokenType::With) {
            self.advance();
            self.expect(&TokenType::LBracket)?;
            let mut names = Vec::new();
            if !matches!(self.peek(), TokenType::RBracket) {
                loop {
                    names.push(self.expect_identifier()?);
                    if matches!(self.peek(), TokenType::Comma) {
                        self.advance();
                    } else {
                        break;
                    }
                }
            }
            self.expect(&TokenType::RBracket)?;
            names
        } else {
            Vec::new()
        };
        Ok(Node::new(
            NodeKind::Use {
                keyword,
                reference,
                alias,
                with_list,
            },
            line,
        ))
    }

    fn test_stmt(&mut self) -> Result<Node, ParseError> {
        let line = self.peek_line();
        self.advance();
        let name = self.string_literal_text()?;
        let body = self.block_until(Self::is_block_end)?;
        self.expect(&TokenType::End)?;
        Ok(Node::new(NodeKind::Test { name, body }, line))
    }

    fn bench_stmt(&mut self) -> Result<Node, ParseError> {
        let line = self.peek_line();
        self.advance();
        let name = self.string_literal_text()?;
        let body = self.block_until(Self::is_block_end)?;
        self.expect(&TokenType::End)?;
        Ok(Node::new(NodeKind::Benchmark { name, body }, line))
    }

    fn string_literal_text(&mut self) -> Result<String, ParseError> {
        match self.peek().clone() {
            TokenType::Str(parts) => {
                self.advance();
                Ok(parts
                    .iter()
                    .map(|p| match p {
                        StringPart::Literal(s) => s.clone(),
                        StringPart::Interpolation(e) => e.clone(),
                    })
                    .collect())
            }
            other => Err(ParseError {
                message: format!("expected string literal, found {:?}", other),
                line: self.peek_line(),
            }),
        }
    }

    fn assign_or_expr_stmt(&mut self) -> Result<Node, ParseError> {
        let line = self.peek_line();
        let target = self.expression()?;
        if matches!(self.peek(), TokenType::Eq) {
            self.advance();
            let value = self.expression()?;
            return Ok(match target.kind {
                NodeKind::Identifier(name) => Node::new(
                    NodeKind::Assign {
                        target: name,
                        value: Box::new(value),
                    },
                    line,
                ),
                NodeKind::Index(t, idx) => Node::new(
                    NodeKind::IndexAssign {
                        target: t,
                        index: idx,
                        value: Box::new(value),
                    },
                    line,
                ),
                NodeKind::Member(t, member) => Node::new(
                    NodeKind::MemberAssign {
                        target: t,
                        member,
                        value: Box::new(value),
                    },
                    line,
                ),
                _ => {
                    return Err(ParseError {
                        message: "invalid assignment target".to_string(),
                        line,
                    })
                }
            });
        }
        Ok(Node::new(NodeKind::ExprStmt(Box::new(target)), line))
    }

    fn expression(&mut self) -> Result<Node, ParseError> {
        self.or_expr()
    }

    fn or_expr(&mut self) -> Result<Node, ParseError> {
        let mut lhs = self.and_expr()?;
        while matches!(self.peek(), TokenType::Or | TokenType::OrOr) {
            let line = self.peek_line();
            self.advance();
            let rhs = self.and_expr()?;
            lhs = Node::new(
                NodeKind::Binary {
                    op: "||".to_string(),
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                line,
            );
        }
        Ok(lhs)
    }

    fn and_expr(&mut self) -> Result<Node, ParseError> {
        let mut lhs = self.eq_expr()?;
        while matches!(self.peek(), TokenType::And | TokenType::AndAnd) {
            let line = self.peek_line();
            self.advance();
            let rhs = self.eq_expr()?;
            lhs = Node::new(
                NodeKind::Binary {
                    op: "&&".to_string(),
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                line,
            );
        }
        Ok(lhs)
    }

    fn eq_expr(&mut self) -> Result<Node, ParseError> {
        let mut lhs = self.rel_expr()?;
        loop {
            let op = match self.peek() {
                TokenType::EqEq => "==",
                TokenType::NotEq => "!=",
                _ => break,
            };
            let line = self.peek_line();
            self.advance();
            let rhs = self.rel_expr()?;
            lhs = Node::new(
                NodeKind::Binary {
                    op: op.to_string(),
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                line,
            );
        }
        Ok(lhs)
    }

    fn rel_expr(&mut self) -> Result<Node, ParseError> {
        let mut lhs = self.add_expr()?;
        loop {
            let op = match self.peek() {
                TokenType::Lt => "<",
                TokenType::Gt => ">",
                TokenType::LtEq => "<=",
                TokenType::GtEq => ">=",
                _ => break,
            };
            let line = self.peek_line();
            self.advance();
            let rhs = self.add_expr()?;
            lhs = Node::new(
                NodeKind::Binary {
                    op: op.to_string(),
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                line,
            );
        }
        Ok(lhs)
    }

    fn add_expr(&mut self) -> Result<Node, ParseError> {
        let mut lhs = self.mul_expr()?;
        loop {
            let op = match self.peek() {
                TokenType::Plus => "+",
                TokenType::Minus => "-",
                _ => break,
            };
            let line = self.peek_line();
            self.advance();
            let rhs = self.mul_expr()?;
            lhs = Node::new(
                NodeKind::Binary {
                    op: op.to_string(),
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                line,
            );
        }
        Ok(lhs)
    }

    fn mul_expr(&mut self) -> Result<Node, ParseError> {
        let mut lhs = self.unary_expr()?;
        loop {
            let op = match self.peek() {
                TokenType::Star => "*",
                TokenType::Slash => "/",
                TokenType::Percent => "%",
                _ => break,
            };
            let line = self.peek_line();
            self.advance();
            let rhs = self.unary_expr()?;
            lhs = Node::new(
                NodeKind::Binary {
                    op: op.to_string(),
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                line,
            );
        }
        Ok(lhs)
    }

    fn unary_expr(&mut self) -> Result<Node, ParseError> {
        let line = self.peek_line();
        match self.peek() {
            TokenType::Minus => {
                self.advance();
                let expr = self.unary_expr()?;
                Ok(Node::new(
                    NodeKind::Unary {
                        op: "-".to_string(),
                        expr: Box::new(expr),
                    },
                    line,
                ))
            }
            TokenType::Not | TokenType::Bang => {
                self.advance();
                let expr = self.unary_expr()?;
                Ok(Node::new(
                    NodeKind::Unary {
                        op: "!".to_string(),
                        expr: Box::new(expr),
                    },
                    line,
                ))
            }
            TokenType::Spawn => {
                self.advance();
                let expr = self.unary_expr()?;
                Ok(Node::new(
                    NodeKind::Call {
                        callee: Box::new(Node::new(
                            NodeKind::Identifier("__rugo_spawn__".to_string()),
                            line,
                        )),
                        args: vec![expr],
                    },
                    line,
                ))
            }
            _ => self.postfix_expr(),
        }
    }

    fn postfix_expr(&mut self) -> Result<Node, ParseError> {
        let mut expr = self.primary_expr()?;
        loop {
            let line = self.peek_line();
            match self.peek() {
                TokenType::LParen => {
                    self.advance();
                    let args = self.call_args()?;
                    self.expect(&TokenType::RParen)?;
                    expr = Node::new(
                        NodeKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        line,
                    );
                }
                TokenType::LBracket => {
                    self.advance();
                    let start = self.expression()?;
                    if matches!(self.peek(), TokenType::Comma) {
                        self.advance();
                        let len = self.expression()?;
                        self.expect(&TokenType::RBracket)?;
                        expr = Node::new(
                            NodeKind::Slice {
                                target: Box::new(expr),
                                start: Box::new(start),
                                len: Some(Box::new(len)),
                            },
                            line,
                        );
                    } else {
                        self.expect(&TokenType::RBracket)?;
                        expr = Node::new(NodeKind::Index(Box::new(expr), Box::new(start)), line);
                    }
                }
                TokenType::Dot => {
                    self.advance();
                    let member = self.expect_identifier()?;
                    if matches!(self.peek(), TokenType::LParen) {
                        self.advance();
                        let args = self.call_args()?;
                        self.expect(&TokenType::RParen)?;
                        expr = Node::new(
                            NodeKind::Call {
                                callee: Box::new(Node::new(
                                    NodeKind::Member(Box::new(expr), member),
                                    line,
                                )),
                                args,
                            },
                            line,
                        );
                    } else {
                        expr = Node::new(NodeKind::Member(Box::new(expr), member), line);
                    }
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn call_args(&mut self) -> Result<Vec<Node>, ParseError> {
        let mut args = Vec::new();
        if !matches!(self.peek(), TokenType::RParen) {
            loop {
                args.push(self.expression()?);
                if matches!(self.peek(), TokenType::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        Ok(args)
    }

    fn primary_expr(&mut self) -> Result<Node, ParseError> {
        let line = self.peek_line();
        match self.peek().clone() {
            TokenType::Int(v) => {
                self.advance();
                Ok(Node::new(NodeKind::Int(v), line))
            }
            TokenType::Float(v) => {
                self.advance();
                Ok(Node::new(NodeKind::Float(v), line))
            }
            TokenType::Str(parts) => {
                self.advance();
                let parts = self.resolve_string_parts(parts)?;
                Ok(Node::new(NodeKind::Str(parts), line))
            }
            TokenType::RawStr(s) => {
                self.advance();
                Ok(Node::new(NodeKind::RawStr(s), line))
            }
            TokenType::True => {
                self.advance();
                Ok(Node::new(NodeKind::Bool(true), line))
            }
            TokenType::False => {
                self.advance();
                Ok(Node::new(NodeKind::Bool(false), line))
            }
            TokenType::Nil => {
                self.advance();
                Ok(Node::new(NodeKind::Nil, line))
            }
            TokenType::Identifier(sym) => {
                self.advance();
                Ok(Node::new(
                    NodeKind::Identifier(self.interner.resolve(sym).to_string()),
                    line,
                ))
            }
            TokenType::Shell => {
                self.advance();
                self.expect(&TokenType::LParen)?;
                let arg = self.expression()?;
                self.expect(&TokenType::RParen)?;
                Ok(Node::new(
                    NodeKind::Call {
                        callee: Box::new(Node::new(
                            NodeKind::Identifier("__rugo_shell__".to_string()),
                            line,
                        )),
                        args: vec![arg],
                    },
                    line,
                ))
            }
            TokenType::Capture => {
                self.advance();
                self.expect(&TokenType::LParen)?;
                let arg = self.expression()?;
                self.expect(&TokenType::RParen)?;
                Ok(Node::new(
                    NodeKind::Call {
                        callee: Box::new(Node::new(
                            NodeKind::Identifier("__rugo_capture__".to_string()),
                            line,
                        )),
                        args: vec![arg],
                    },
                    line,
                ))
            }
            TokenType::LParen => {
                self.advance();
                let expr = self.expression()?;
                self.expect(&TokenType::RParen)?;
                Ok(expr)
            }
            TokenType::LBracket => {
                self.advance();
                let mut items = Vec::new();
                self.skip_newlines();
                if !matches!(self.peek(), TokenType::RBracket) {
                    loop {
                        self.skip_newlines();
                        items.push(self.expression()?);
                        self.skip_newlines();
                        if matches!(self.peek(), TokenType::Comma) {
                            self.advance();
                            self.skip_newlines();
                        } else {
                            break;
                        }
                    }
                }
                self.skip_newlines();
                self.expect(&TokenType::RBracket)?;
                Ok(Node::new(NodeKind::Array(items), line))
            }
            TokenType::LBrace => {
                self.advance();
                let mut pairs = Vec::new();
                self.skip_newlines();
                if !matches!(self.peek(), TokenType::RBrace) {
                    loop {
                        self.skip_newlines();
                        let key = self.expression()?;
                        self.expect(&TokenType::Colon)?;
                        let value = self.expression()?;
                        pairs.push((key, value));
                        self.skip_newlines();
                        if matches!(self.peek(), TokenType::Comma) {
                            self.advance();
                            self.skip_newlines();
                        } else {
                            break;
                        }
                    }
                }
                self.skip_newlines();
                self.expect(&TokenType::RBrace)?;
                Ok(Node::new(NodeKind::Hash(pairs), line))
            }
            TokenType::Lambda => {
                self.advance();
                self.expect(&TokenType::Do)?;
                let mut params = Vec::new();
                if matches!(self.peek(), TokenType::Pipe) {
                    self.advance();
                    if !matches!(self.peek(), TokenType::Pipe) {
                        loop {
                            params.push(self.expect_identifier()?);
                            if matches!(self.peek(), TokenType::Comma) {
                                self.advance();
                            } else {
                                break;
                            }
                        }
                    }
                    self.expect(&TokenType::Pipe)?;
                }
                let body = self.block_until(Self::is_block_end)?;
                self.expect(&TokenType::End)?;
                Ok(Node::new(NodeKind::Lambda { params, body }, line))
            }
            other => Err(ParseError {
                message: format!("unexpected token {:?}", other),
                line,
            }),
        }
    }

    /// The lexer hands us each `#{...}` interpolation as raw source text;
    /// re-lex and re-parse it as a nested expression here.
    fn resolve_string_parts(
        &mut self,
        parts: Vec<StringPart>,
    ) -> Result<Vec<StrPartNode>, ParseError> {
        let mut out = Vec::with_capacity(parts.len());
        for part in parts {
            match part {
                StringPart::Literal(s) => out.push(StrPartNode::Literal(s)),
                StringPart::Interpolation(src) => {
                    let map = crate::span::LineMap::identity(1);
                    let mut lexer = crate::lexer::Lexer::new(&src, &map, self.interner);
                    let tokens = lexer.tokenize().map_err(|e| ParseError {
                        message: format!("invalid interpolation: {}", e.message),
                        line: self.peek_line(),
                    })?;
                    let mut sub = Parser {
                        tokens,
                        pos: 0,
                        interner: self.interner,
                    };
                    let expr = sub.expression()?;
                    out.push(StrPartNode::Interpolation(Box::new(expr)));
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::LineMap;

    fn parse(src: &str) -> Vec<Node> {
        let map = LineMap::identity(src.lines().count().max(1));
        let mut interner = Interner::new();
        let mut lexer = crate::lexer::Lexer::new(src, &map, &mut interner);
        let tokens = lexer.tokenize().unwrap();
        parse_program(tokens, &mut interner).unwrap()
    }

    #[test]
    fn parses_assignment() {
        let stmts = parse("x = 1");
        assert!(matches!(stmts[0].kind, NodeKind::Assign { .. }));
    }

    #[test]
    fn parses_call_expression_statement() {
        let stmts = parse("puts(\"hi\")");
        assert!(matches!(stmts[0].kind, NodeKind::ExprStmt(_)));
    }

    #[test]
    fn parses_if_elsif_else() {
        let stmts = parse("if x\n  1\nelsif y\n  2\nelse\n  3\nend");
        match &stmts[0].kind {
            NodeKind::If {
                branches,
                else_branch,
            } => {
                assert_eq!(branches.len(), 2);
                assert!(else_branch.is_some());
            }
            other => panic!("expected If, got {:?}", other),
        }
    }

    #[test]
    fn parses_binary_precedence() {
        let stmts = parse("x = 1 + 2 * 3");
        match &stmts[0].kind {
            NodeKind::Assign { value, .. } => match &value.kind {
                NodeKind::Binary { op, rhs, .. } => {
                    assert_eq!(op, "+");
                    assert!(matches!(rhs.kind, NodeKind::Binary { .. }));
                }
                other => panic!("expected Binary, got {:?}", other),
            },
            other => panic!("expected Assign, got {:?}", other),
        }
    }

    #[test]
    fn parses_for_in_with_index() {
        let stmts = parse("for i, v in arr\n  puts(v)\nend");
        match &stmts[0].kind {
            NodeKind::ForIn { index, binding, .. } => {
                assert_eq!(index.as_deref(), Some("i"));
                assert_eq!(binding, "v");
            }
            other => panic!("expected ForIn, got {:?}", other),
        }
    }

    #[test]
    fn parses_function_definition_with_variadic() {
        let stmts = parse("def greet(name, *rest)\n  puts(name)\nend");
        match &stmts[0].kind {
            NodeKind::FunctionDef {
                params, variadic, ..
            } => {
                assert_eq!(params, &vec!["name".to_string(), "rest".to_string()]);
                assert!(variadic);
            }
            other => panic!("expected FunctionDef, got {:?}", other),
        }
    }

    #[test]
    fn parses_use_with_alias_and_with_list() {
        let stmts = parse("require \"./lib/foo\" as foo with [a, b]");
        match &stmts[0].kind {
            NodeKind::Use {
                reference,
                alias,
                with_list,
                ..
            } => {
                assert_eq!(reference, "./lib/foo");
                assert_eq!(alias.as_deref(), Some("foo"));
                assert_eq!(with_list, &vec!["a".to_string(), "b".to_string()]);
            }
            other => panic!("expected Use, got {:?}", other),
        }
    }

    #[test]
    fn parses_nested_string_interpolation_expression() {
        let stmts = parse("x = \"#{1 + 2}\"");
        match &stmts[0].kind {
            NodeKind::Assign { value, .. } => match &value.kind {
                NodeKind::Str(parts) => {
                    assert_eq!(parts.len(), 1);
                    assert!(matches!(parts[0], StrPartNode::Interpolation(_)));
                }
                other => panic!("expected Str, got {:?}", other),
            },
            other => panic!("expected Assign, got {:?}", other),
        }
    }

    #[test]
    fn reports_syntax_error_with_line() {
        let map = LineMap::identity(1);
        let mut interner = Interner::new();
        let mut lexer = crate::lexer::Lexer::new("if x", &map, &mut interner);
        let tokens = lexer.tokenize().unwrap();
        let err = parse_program(tokens, &mut interner).unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn parses_array_and_hash_literals() {
        let stmts = parse("x = [1, 2, 3]\ny = {\"a\": 1}");
        assert!(matches!(
            &stmts[0].kind,
            NodeKind::Assign { value, .. } if matches!(value.kind, NodeKind::Array(_))
        ));
        assert!(matches!(
            &stmts[1].kind,
            NodeKind::Assign { value, .. } if matches!(value.kind, NodeKind::Hash(_))
        ));
    }

    #[test]
    fn parses_slice_with_two_args() {
        let stmts = parse("y = a[1, 2]");
        match &stmts[0].kind {
            NodeKind::Assign { value, .. } => {
                assert!(matches!(value.kind, NodeKind::Slice { .. }));
            }
            other => panic!("expected Assign, got {:?}", other),
        }
    }
}
