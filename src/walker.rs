//! The walker (§4.3): converts the concrete parse tree (`parser::tree`)
//! into the typed AST (`ast`), performing every piece of semantic
//! resolution that doesn't require type information:
//!
//! - constant enforcement (an uppercase-leading name may only be assigned
//!   once per function scope);
//! - struct reattachment (recovers `StructDef`s from the constructor
//!   functions `preprocessor::structs` rewrote struct bodies into);
//! - recognition of the preprocessor's magic call names
//!   (`__rugo_try__`, `__rugo_try_or__`, `__rugo_parallel__`,
//!   `__rugo_capture__`, `__rugo_shell__`, `__rugo_spawn__`) into their
//!   dedicated `ExprKind` variants;
//! - recognition of the reserved task-handle accessors `.value`/`.done`/
//!   `.wait(n)` into `TaskValue`/`TaskDone`/`TaskWait` — syntactic, not
//!   type-driven (see DESIGN.md); queue operations (`.push`, `.pop`,
//!   `.close`, `.size`, `.closed`) are left as plain member/call nodes
//!   for codegen to dispatch on directly.

use std::collections::HashMap;

use crate::ast::{
    BinOp, Expr, ExprKind, FunctionDef, ModuleKeyword, Program, Stmt, StmtKind, StrPart,
    StructDef, UnOp, UseDecl,
};
use crate::intern::{is_constant_name, Interner, Symbol};
use crate::parser::tree::{self, Node, NodeKind, StrPartNode};

#[derive(Debug)]
pub struct WalkError {
    pub message: String,
    pub line: u32,
}

impl std::fmt::Display for WalkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for WalkError {}

pub fn walk_program(stmts: Vec<Node>, interner: &mut Interner) -> Result<Program, WalkError> {
    log::debug!("walking {} top-level parse nodes", stmts.len());
    let mut walker = Walker {
        interner,
        scopes: vec![HashMap::new()],
        structs: Vec::new(),
    };
    let stmts = walker.block(stmts)?;
    log::debug!(
        "walk complete: {} statements, {} struct definitions",
        stmts.len(),
        walker.structs.len()
    );
    Ok(Program {
        stmts,
        structs: walker.structs,
    })
}

struct Walker<'a> {
    interner: &'a mut Interner,
    /// Stack of per-function-scope maps of constants already assigned to
    /// the line they were first bound on; `if`/`while`/`for` bodies share
    /// their enclosing function's scope.
    scopes: Vec<HashMap<Symbol, u32>>,
    structs: Vec<StructDef>,
}

impl<'a> Walker<'a> {
    fn intern(&mut self, s: &str) -> Symbol {
        self.interner.intern(s)
    }

    fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare_const(&mut self, sym: Symbol, line: u32) -> Result<(), WalkError> {
        let name = self.interner.resolve(sym).to_string();
        let scope = self.scopes.last_mut().expect("at least one scope");
        if let Some(&first_line) = scope.get(&sym) {
            return Err(WalkError {
                message: format!(
                    "cannot reassign constant {} (first assigned on line {}, reassigned on line {})",
                    name, first_line, line
                ),
                line,
            });
        }
        scope.insert(sym, line);
        Ok(())
    }

    fn block(&mut self, nodes: Vec<Node>) -> Result<Vec<Stmt>, WalkError> {
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            if let Some(struct_def) = self.try_struct_reattach(&node)? {
                self.structs.push(struct_def);
                continue;
            }
            out.push(self.stmt(node)?);
        }
        Ok(out)
    }

    /// Recognizes a constant-named, zero-variadic function whose sole
    /// statement is `return {"field": field, ...}` — the shape
    /// `preprocessor::structs` rewrites struct bodies into — and recovers
    /// the original field order from it. Returns `Ok(None)` for anything
    /// that isn't that exact shape, leaving it to be walked as an
    /// ordinary function definition.
    fn try_struct_reattach(&mut self, node: &Node) -> Result<Option<StructDef>, WalkError> {
        let (name, params, variadic, body) = match &node.kind {
            NodeKind::FunctionDef {
                name,
                params,
                variadic,
                body,
            } => (name, params, variadic, body),
            _ => return Ok(None),
        };
        if *variadic || !is_constant_name(name) {
            return Ok(None);
        }
        if body.len() != 1 {
            return Ok(None);
        }
        let pairs = match &body[0].kind {
            NodeKind::Return(Some(inner)) => match &inner.kind {
                NodeKind::Hash(pairs) => pairs,
                _ => return Ok(None),
            },
            _ => return Ok(None),
        };
        if pairs.len() != params.len() {
            return Ok(None);
        }
        let mut fields = Vec::with_capacity(pairs.len());
        for (i, (key, _)) in pairs.iter().enumerate() {
            let key_text = match &key.kind {
                NodeKind::Str(parts) if parts.len() == 1 => match &parts[0] {
                    StrPartNode::Literal(s) => s.clone(),
                    StrPartNode::Interpolation(_) => return Ok(None),
                },
                _ => return Ok(None),
            };
            if key_text != params[i] {
                return Ok(None);
            }
            fields.push(self.intern(&key_text));
        }
        Ok(Some(StructDef {
            name: self.intern(name),
            fields,
            line: node.line,
        }))
    }

    fn stmt(&mut self, node: Node) -> Result<Stmt, WalkError> {
        let line = node.line;
        let kind = match node.kind {
            NodeKind::Assign { target, value } => {
                let sym = self.intern(&target);
                let is_const = is_constant_name(&target);
                if is_const {
                    self.declare_const(sym, line)?;
                }
                StmtKind::Assign {
                    target: sym,
                    value: self.expr(*value)?,
                    is_const,
                }
            }
            NodeKind::IndexAssign {
                target,
                index,
                value,
            } => StmtKind::IndexAssign {
                target: Box::new(self.expr(*target)?),
                index: Box::new(self.expr(*index)?),
                value: Box::new(self.expr(*value)?),
            },
            NodeKind::MemberAssign {
                target,
                member,
                value,
            } => StmtKind::MemberAssign {
                target: Box::new(self.expr(*target)?),
                member: self.intern(&member),
                value: Box::new(self.expr(*value)?),
            },
            NodeKind::If {
                branches,
                else_branch,
            } => {
                let mut out_branches = Vec::with_capacity(branches.len());
                for (cond, body) in branches {
                    out_branches.push((self.expr(cond)?, self.block(body)?));
                }
                let else_branch = else_branch.map(|b| self.block(b)).transpose()?;
                StmtKind::If {
                    branches: out_branches,
                    else_branch,
                }
            }
            NodeKind::While { cond, body } => StmtKind::While {
                cond: self.expr(*cond)?,
                body: self.block(body)?,
            },
            NodeKind::ForIn {
                index,
                key,
                binding,
                iterable,
                body,
            } => StmtKind::ForIn {
                index: index.map(|s| self.intern(&s)),
                key: key.map(|s| self.intern(&s)),
                binding: self.intern(&binding),
                iterable: self.expr(*iterable)?,
                body: self.block(body)?,
            },
            NodeKind::Return(value) => {
                StmtKind::Return(value.map(|v| self.expr(*v)).transpose()?)
            }
            NodeKind::Break => StmtKind::Break,
            NodeKind::Next => StmtKind::Next,
            NodeKind::FunctionDef {
                name,
                params,
                variadic,
                body,
            } => StmtKind::FunctionDef(self.function_def(name, params, variadic, body)?),
            NodeKind::Use {
                keyword,
                reference,
                alias,
                with_list,
            } => StmtKind::Use(UseDecl {
                keyword: match keyword {
                    tree::ModuleKeyword::Use => ModuleKeyword::Use,
                    tree::ModuleKeyword::Import => ModuleKeyword::Import,
                    tree::ModuleKeyword::Require => ModuleKeyword::Require,
                },
                reference,
                alias: alias.map(|s| self.intern(&s)),
                with_list: with_list.iter().map(|s| self.intern(s)).collect(),
            }),
            NodeKind::ExprStmt(e) => StmtKind::ExprStmt(self.expr(*e)?),
            NodeKind::Raise(e) => StmtKind::Raise(self.expr(*e)?),
            NodeKind::Sandbox => StmtKind::Sandbox,
            NodeKind::Test { name, body } => StmtKind::Test {
                name,
                body: self.block(body)?,
            },
            NodeKind::Benchmark { name, body } => StmtKind::Benchmark {
                name,
                body: self.block(body)?,
            },
            other => {
                return Err(WalkError {
                    message: format!("not a statement: {:?}", other),
                    line,
                })
            }
        };
        Ok(Stmt { kind, line })
    }

    fn function_def(
        &mut self,
        name: String,
        params: Vec<String>,
        variadic: bool,
        body: Vec<Node>,
    ) -> Result<FunctionDef, WalkError> {
        self.push_scope();
        let interned_params = params.iter().map(|p| self.intern(p)).collect();
        let body = self.block(body);
        self.pop_scope();
        Ok(FunctionDef {
            name: self.intern(&name),
            params: interned_params,
            variadic,
            body: body?,
        })
    }

    fn expr(&mut self, node: Node) -> Result<Expr, WalkError> {
        let line = node.line;
        if let NodeKind::Call { callee, args } = &node.kind {
            if let NodeKind::Identifier(name) = &callee.kind {
                if let Some(expr) = self.try_magic_call(name, args, line)? {
                    return Ok(expr);
                }
            }
        }
        if let NodeKind::Call { callee, args } = &node.kind {
            if let NodeKind::Member(target, member) = &callee.kind {
                if member == "wait" && args.len() == 1 {
                    let target = self.expr((**target).clone())?;
                    let arg = self.expr(args[0].clone())?;
                    return Ok(Expr::new(
                        ExprKind::TaskWait(Box::new(target), Box::new(arg)),
                        line,
                    ));
                }
            }
        }
        if let NodeKind::Member(target, member) = &node.kind {
            match member.as_str() {
                "value" => {
                    let target = self.expr((**target).clone())?;
                    return Ok(Expr::new(ExprKind::TaskValue(Box::new(target)), line));
                }
                "done" => {
                    let target = self.expr((**target).clone())?;
                    return Ok(Expr::new(ExprKind::TaskDone(Box::new(target)), line));
                }
                _ => {}
            }
        }

        let kind = match node.kind {
            NodeKind::Int(v) => ExprKind::Int(v),
            NodeKind::Float(v) => ExprKind::Float(v),
            NodeKind::Str(parts) => ExprKind::Str(self.str_parts(parts)?),
            NodeKind::RawStr(s) => ExprKind::RawStr(s),
            NodeKind::Bool(b) => ExprKind::Bool(b),
            NodeKind::Nil => ExprKind::Nil,
            NodeKind::Identifier(name) => ExprKind::Identifier(self.intern(&name)),
            NodeKind::Index(target, index) => ExprKind::Index(
                Box::new(self.expr(*target)?),
                Box::new(self.expr(*index)?),
            ),
            NodeKind::Slice { target, start, len } => ExprKind::Slice {
                target: Box::new(self.expr(*target)?),
                start: Box::new(self.expr(*start)?),
                len: len.map(|l| self.expr(*l)).transpose()?.map(Box::new),
            },
            NodeKind::Member(target, member) => {
                ExprKind::Member(Box::new(self.expr(*target)?), self.intern(&member))
            }
            NodeKind::Call { callee, args } => ExprKind::Call {
                callee: Box::new(self.expr(*callee)?),
                args: self.expr_list(args)?,
            },
            NodeKind::Binary { op, lhs, rhs } => ExprKind::Binary {
                op: binop(&op, line)?,
                lhs: Box::new(self.expr(*lhs)?),
                rhs: Box::new(self.expr(*rhs)?),
            },
            NodeKind::Unary { op, expr } => ExprKind::Unary {
                op: unop(&op, line)?,
                expr: Box::new(self.expr(*expr)?),
            },
            NodeKind::Array(items) => ExprKind::Array(self.expr_list(items)?),
            NodeKind::Hash(pairs) => {
                let mut out = Vec::with_capacity(pairs.len());
                for (k, v) in pairs {
                    out.push((self.expr(k)?, self.expr(v)?));
                }
                ExprKind::Hash(out)
            }
            NodeKind::Lambda { params, body } => {
                self.push_scope();
                let interned_params = params.iter().map(|p| self.intern(p)).collect();
                let body = self.block(body);
                self.pop_scope();
                ExprKind::Lambda {
                    params: interned_params,
                    body: body?,
                }
            }
            other => {
                return Err(WalkError {
                    message: format!("not an expression: {:?}", other),
                    line,
                })
            }
        };
        Ok(Expr::new(kind, line))
    }

    fn expr_list(&mut self, nodes: Vec<Node>) -> Result<Vec<Expr>, WalkError> {
        nodes.into_iter().map(|n| self.expr(n)).collect()
    }

    fn str_parts(&mut self, parts: Vec<StrPartNode>) -> Result<Vec<StrPart>, WalkError> {
        parts
            .into_iter()
            .map(|p| {
                Ok(match p {
                    StrPartNode::Literal(s) => StrPart::Literal(s),
                    StrPartNode::Interpolation(e) => {
                        StrPart::Interpolation(Box::new(self.expr(*e)?))
                    }
                })
            })
            .collect()
    }

    /// Recognizes `__rugo_try__`, `__rugo_try_or__`, `__rugo_parallel__`,
    /// `__rugo_capture__`, `__rugo_shell__`, and `__rugo_spawn__` calls and
    /// converts them into their dedicated `ExprKind` variants. Everything
    /// else returns `Ok(None)` so the caller falls through to the generic
    /// `Call` conversion.
    fn try_magic_call(
        &mut self,
        name: &str,
        args: &[Node],
        line: u32,
    ) -> Result<Option<Expr>, WalkError> {
        match name {
            "__rugo_try__" if args.len() == 1 => {
                let body = self.lambda_return_expr(&args[0])?;
                Ok(Some(Expr::new(ExprKind::Try(Box::new(body)), line)))
            }
            "__rugo_try__" if args.len() == 2 => {
                let body = self.lambda_return_expr(&args[0])?;
                let default = self.lambda_return_expr(&args[1])?;
                Ok(Some(Expr::new(
                    ExprKind::TryOr {
                        body: Box::new(body),
                        default: Box::new(default),
                    },
                    line,
                )))
            }
            "__rugo_try_or__" if args.len() == 2 => {
                let body = self.lambda_return_expr(&args[0])?;
                let default = self.lambda_return_expr(&args[1])?;
                Ok(Some(Expr::new(
                    ExprKind::TryOr {
                        body: Box::new(body),
                        default: Box::new(default),
                    },
                    line,
                )))
            }
            "__rugo_try_handler__" if args.len() == 3 => {
                let body = self.lambda_return_expr(&args[0])?;
                let err_name = match &args[1].kind {
                    NodeKind::Str(parts) if parts.len() == 1 => match &parts[0] {
                        StrPartNode::Literal(s) => s.clone(),
                        StrPartNode::Interpolation(_) => {
                            return Err(WalkError {
                                message: "try/err handler name must be a literal".to_string(),
                                line,
                            })
                        }
                    },
                    other => {
                        return Err(WalkError {
                            message: format!("expected a literal error name, found {:?}", other),
                            line,
                        })
                    }
                };
                let handler_body = match &args[2].kind {
                    NodeKind::Lambda { body, .. } => body.clone(),
                    other => {
                        return Err(WalkError {
                            message: format!("expected a lambda handler, found {:?}", other),
                            line,
                        })
                    }
                };
                let handler = self.block(handler_body)?;
                Ok(Some(Expr::new(
                    ExprKind::TryHandler {
                        body: Box::new(body),
                        err_name: self.intern(&err_name),
                        handler,
                    },
                    line,
                )))
            }
            "__rugo_parallel__" => {
                let mut thunks = Vec::with_capacity(args.len());
                for arg in args {
                    thunks.push(self.lambda_return_expr(arg)?);
                }
                Ok(Some(Expr::new(ExprKind::Parallel(thunks), line)))
            }
            "__rugo_capture__" if args.len() == 1 => {
                let inner = self.expr(args[0].clone())?;
                Ok(Some(Expr::new(ExprKind::Capture(Box::new(inner)), line)))
            }
            "__rugo_shell__" if args.len() == 1 => {
                let inner = self.expr(args[0].clone())?;
                Ok(Some(Expr::new(ExprKind::Shell(Box::new(inner)), line)))
            }
            "__rugo_spawn__" if args.len() == 1 => {
                let inner = self.expr(args[0].clone())?;
                Ok(Some(Expr::new(ExprKind::Spawn(Box::new(inner)), line)))
            }
            _ => Ok(None),
        }
    }

    /// Extracts the boxed expression out of the `lambda do return EXPR end`
    /// shape the preprocessor always wraps try/parallel thunks in. Falls
    /// back to the lambda's last expression statement if it wasn't written
    /// as an explicit `return`, which keeps this tolerant of hand-written
    /// calls to the same magic names.
    fn lambda_return_expr(&mut self, node: &Node) -> Result<Expr, WalkError> {
        let body = match &node.kind {
            NodeKind::Lambda { body, .. } => body,
            other => {
                return Err(WalkError {
                    message: format!("expected a lambda thunk, found {:?}", other),
                    line: node.line,
                })
            }
        };
        match body.last() {
            Some(Node {
                kind: NodeKind::Return(Some(e)),
                ..
            }) => self.expr((**e).clone()),
            Some(Node {
                kind: NodeKind::ExprStmt(e),
                ..
            }) => self.expr((**e).clone()),
            _ => Err(WalkError {
                message: "expected a thunk body ending in a return or expression".to_string(),
                line: node.line,
            }),
        }
    }
}

fn binop(op: &str, line: u32) -> Result<BinOp, WalkError> {
    Ok(match op {
        "+" => BinOp::Add,
        "-" => BinOp::Sub,
        "*" => BinOp::Mul,
        "/" => BinOp::Div,
        "%" => BinOp::Mod,
        "==" => BinOp::Eq,
        "!=" => BinOp::NotEq,
        "<" => BinOp::Lt,
        ">" => BinOp::Gt,
        "<=" => BinOp::LtEq,
        ">=" => BinOp::GtEq,
        "&&" => BinOp::And,
        "||" => BinOp::Or,
        other => {
            return Err(WalkError {
                message: format!("unknown binary operator '{}'", other),
                line,
            })
        }
    })
}

fn unop(op: &str, line: u32) -> Result<UnOp, WalkError> {
    Ok(match op {
        "-" => UnOp::Neg,
        "!" => UnOp::Not,
        other => {
            return Err(WalkError {
                message: format!("unknown unary operator '{}'", other),
                line,
            })
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::LineMap;

    fn walk(src: &str) -> Program {
        let map = LineMap::identity(src.lines().count().max(1));
        let mut interner = Interner::new();
        let mut lexer = crate::lexer::Lexer::new(src, &map, &mut interner);
        let tokens = lexer.tokenize().unwrap();
        let tree = crate::parser::parse_program(tokens, &mut interner).unwrap();
        walk_program(tree, &mut interner).unwrap()
    }

    #[test]
    fn assigns_non_constant_freely() {
        let program = walk("x = 1\nx = 2");
        assert_eq!(program.stmts.len(), 2);
    }

    #[test]
    fn rejects_reassigning_a_constant() {
        let map = LineMap::identity(2);
        let mut interner = Interner::new();
        let mut lexer = crate::lexer::Lexer::new("PI = 1\nPI = 2", &map, &mut interner);
        let tokens = lexer.tokenize().unwrap();
        let tree = crate::parser::parse_program(tokens, &mut interner).unwrap();
        let err = walk_program(tree, &mut interner).unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("cannot reassign constant PI"));
        assert!(err.message.contains("first assigned on line 1"));
        assert!(err.message.contains("reassigned on line 2"));
    }

    #[test]
    fn allows_same_named_constant_in_different_function_scopes() {
        let src = "def a()\n  X = 1\nend\ndef b()\n  X = 2\nend";
        let program = walk(src);
        assert_eq!(program.stmts.len(), 2);
    }

    #[test]
    fn reattaches_struct_definition() {
        let src = "struct Point\n  x\n  y\nend\np = Point(1, 2)";
        let program = walk(src);
        assert_eq!(program.structs.len(), 1);
        assert_eq!(program.structs[0].fields.len(), 2);
        // The constructor def itself is not re-emitted as a function stmt.
        assert!(program.stmts.iter().all(|s| !matches!(
            s.kind,
            StmtKind::FunctionDef(ref f) if f.name == program.structs[0].name
        )));
    }

    #[test]
    fn converts_try_call_to_try_expr() {
        let program = walk("x = try risky()");
        match &program.stmts[0].kind {
            StmtKind::Assign { value, .. } => {
                assert!(matches!(value.kind, ExprKind::Try(_)));
            }
            other => panic!("expected Assign, got {:?}", other),
        }
    }

    #[test]
    fn converts_try_or_call_to_try_or_expr() {
        let program = walk("x = try risky() or 0");
        match &program.stmts[0].kind {
            StmtKind::Assign { value, .. } => {
                assert!(matches!(value.kind, ExprKind::TryOr { .. }));
            }
            other => panic!("expected Assign, got {:?}", other),
        }
    }

    #[test]
    fn converts_try_or_err_handler_to_try_handler_expr() {
        let src = "x = try risky() or err e\n  puts(e)\n  -1\nend";
        let program = walk(src);
        match &program.stmts[0].kind {
            StmtKind::Assign { value, .. } => match &value.kind {
                ExprKind::TryHandler { handler, .. } => assert_eq!(handler.len(), 2),
                other => panic!("expected TryHandler, got {:?}", other),
            },
            other => panic!("expected Assign, got {:?}", other),
        }
    }

    #[test]
    fn converts_parallel_call_to_parallel_expr() {
        let src = "results = parallel\n  fetch_a()\n  fetch_b()\nend";
        let program = walk(src);
        match &program.stmts[0].kind {
            StmtKind::Assign { value, .. } => match &value.kind {
                ExprKind::Parallel(thunks) => assert_eq!(thunks.len(), 2),
                other => panic!("expected Parallel, got {:?}", other),
            },
            other => panic!("expected Assign, got {:?}", other),
        }
    }

    #[test]
    fn converts_spawn_expression() {
        let program = walk("t = spawn slow_task()");
        match &program.stmts[0].kind {
            StmtKind::Assign { value, .. } => {
                assert!(matches!(value.kind, ExprKind::Spawn(_)));
            }
            other => panic!("expected Assign, got {:?}", other),
        }
    }

    #[test]
    fn recognizes_task_value_and_done_accessors() {
        let program = walk("t = spawn slow_task()\nv = t.value\nd = t.done");
        match &program.stmts[1].kind {
            StmtKind::Assign { value, .. } => {
                assert!(matches!(value.kind, ExprKind::TaskValue(_)));
            }
            other => panic!("expected Assign, got {:?}", other),
        }
        match &program.stmts[2].kind {
            StmtKind::Assign { value, .. } => {
                assert!(matches!(value.kind, ExprKind::TaskDone(_)));
            }
            other => panic!("expected Assign, got {:?}", other),
        }
    }

    #[test]
    fn recognizes_task_wait_call() {
        let program = walk("t = spawn slow_task()\nv = t.wait(5)");
        match &program.stmts[1].kind {
            StmtKind::Assign { value, .. } => {
                assert!(matches!(value.kind, ExprKind::TaskWait(_, _)));
            }
            other => panic!("expected Assign, got {:?}", other),
        }
    }

    #[test]
    fn leaves_queue_operations_as_generic_calls() {
        let program = walk("q.push(1)");
        match &program.stmts[0].kind {
            StmtKind::ExprStmt(e) => assert!(matches!(e.kind, ExprKind::Call { .. })),
            other => panic!("expected ExprStmt, got {:?}", other),
        }
    }

    #[test]
    fn converts_backtick_capture_to_capture_expr() {
        let program = walk("out = `ls -la`");
        match &program.stmts[0].kind {
            StmtKind::Assign { value, .. } => {
                assert!(matches!(value.kind, ExprKind::Capture(_)));
            }
            other => panic!("expected Assign, got {:?}", other),
        }
    }

    #[test]
    fn converts_bare_shell_fallback_to_shell_expr() {
        let program = walk("ls -la");
        match &program.stmts[0].kind {
            StmtKind::ExprStmt(e) => assert!(matches!(e.kind, ExprKind::Shell(_))),
            other => panic!("expected ExprStmt, got {:?}", other),
        }
    }
}
