//! Type inference (§4.4): a single forward pass over the AST attaching a
//! type tag to every expression from the closed set of `TypeTag`
//! variants. Codegen (§4.5) uses the tag exclusively to choose between a
//! typed fast path and a dynamic runtime-helper path; inference never
//! rejects a program, it only narrows or widens to `Unknown`.
//!
//! Deliberately conservative (§9 open question, kept conservative rather
//! than widened — see DESIGN.md): literal types propagate through
//! arithmetic on matching operand types, any disagreement or unresolved
//! identifier drops to `Unknown`, and a function call's result is
//! `Unknown` unless the callee is a built-in with a statically known
//! return type.

use std::collections::HashMap;

use crate::ast::{BinOp, Expr, ExprKind, FunctionDef, Program, Stmt, StmtKind};
use crate::intern::{Interner, Symbol};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    String,
    Integer,
    Float,
    Boolean,
    Nil,
    Array,
    Hash,
    Lambda,
    Unknown,
}

/// Built-ins whose return type inference can state without looking at
/// arguments. Anything else returns `Unknown`.
fn builtin_return_type(name: &str) -> Option<TypeTag> {
    match name {
        "len" => Some(TypeTag::Integer),
        "type_of" => Some(TypeTag::String),
        "range" => Some(TypeTag::Array),
        "sleep" => Some(TypeTag::Nil),
        _ => None,
    }
}

pub struct Inference<'a> {
    interner: &'a Interner,
    scopes: Vec<HashMap<Symbol, TypeTag>>,
}

impl<'a> Inference<'a> {
    pub fn new(interner: &'a Interner) -> Self {
        Inference {
            interner,
            scopes: vec![HashMap::new()],
        }
    }

    pub fn run(program: &mut Program, interner: &Interner) {
        log::debug!("inferring types over {} statements", program.stmts.len());
        let mut pass = Inference::new(interner);
        pass.block(&mut program.stmts);
    }

    fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn bind(&mut self, sym: Symbol, ty: TypeTag) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(sym, ty);
        }
    }

    fn lookup(&self, sym: Symbol) -> TypeTag {
        for scope in self.scopes.iter().rev() {
            if let Some(ty) = scope.get(&sym) {
                return *ty;
            }
        }
        TypeTag::Unknown
    }

    fn block(&mut self, stmts: &mut [Stmt]) {
        for stmt in stmts {
            self.stmt(stmt);
        }
    }

    fn stmt(&mut self, stmt: &mut Stmt) {
        match &mut stmt.kind {
            StmtKind::Assign { target, value, .. } => {
                let ty = self.expr(value);
                self.bind(*target, ty);
            }
            StmtKind::IndexAssign {
                target,
                index,
                value,
            } => {
                self.expr(target);
                self.expr(index);
                self.expr(value);
            }
            StmtKind::MemberAssign { target, value, .. } => {
                self.expr(target);
                self.expr(value);
            }
            StmtKind::If {
                branches,
                else_branch,
            } => {
                for (cond, body) in branches {
                    self.expr(cond);
                    self.push_scope();
                    self.block(body);
                    self.pop_scope();
                }
                if let Some(body) = else_branch {
                    self.push_scope();
                    self.block(body);
                    self.pop_scope();
                }
            }
            StmtKind::While { cond, body } => {
                self.expr(cond);
                self.push_scope();
                self.block(body);
                self.pop_scope();
            }
            StmtKind::ForIn {
                index,
                key,
                binding,
                iterable,
                body,
            } => {
                self.expr(iterable);
                self.push_scope();
                self.bind(*binding, TypeTag::Unknown);
                if let Some(idx) = index {
                    self.bind(*idx, TypeTag::Integer);
                }
                if let Some(k) = key {
                    self.bind(*k, TypeTag::Unknown);
                }
                self.block(body);
                self.pop_scope();
            }
            StmtKind::Return(Some(value)) => {
                self.expr(value);
            }
            StmtKind::Return(None) | StmtKind::Break | StmtKind::Next | StmtKind::Sandbox => {}
            StmtKind::FunctionDef(def) => self.function(def),
            StmtKind::Use(_) => {}
            StmtKind::ExprStmt(expr) => {
                self.expr(expr);
            }
            StmtKind::Raise(expr) => {
                self.expr(expr);
            }
            StmtKind::Test { body, .. } | StmtKind::Benchmark { body, .. } => {
                self.push_scope();
                self.block(body);
                self.pop_scope();
            }
        }
    }

    fn function(&mut self, def: &mut FunctionDef) {
        self.push_scope();
        for param in &def.params {
            self.bind(*param, TypeTag::Unknown);
        }
        self.block(&mut def.body);
        self.pop_scope();
    }

    fn expr(&mut self, expr: &mut Expr) -> TypeTag {
        let ty = match &mut expr.kind {
            ExprKind::Int(_) => TypeTag::Integer,
            ExprKind::Float(_) => TypeTag::Float,
            ExprKind::Str(parts) => {
                for part in parts {
                    if let crate::ast::StrPart::Interpolation(inner) = part {
                        self.expr(inner);
                    }
                }
                TypeTag::String
            }
            ExprKind::RawStr(_) => TypeTag::String,
            ExprKind::Bool(_) => TypeTag::Boolean,
            ExprKind::Nil => TypeTag::Nil,
            ExprKind::Identifier(sym) => self.lookup(*sym),
            ExprKind::Index(target, index) => {
                self.expr(target);
                self.expr(index);
                TypeTag::Unknown
            }
            ExprKind::Slice { target, start, len } => {
                self.expr(target);
                self.expr(start);
                if let Some(len) = len {
                    self.expr(len);
                }
                TypeTag::Array
            }
            ExprKind::Member(target, _) => {
                self.expr(target);
                TypeTag::Unknown
            }
            ExprKind::Call { callee, args } => {
                for arg in args.iter_mut() {
                    self.expr(arg);
                }
                if let ExprKind::Identifier(sym) = &callee.kind {
                    let name = self.interner.resolve(*sym);
                    if let Some(ty) = builtin_return_type(name) {
                        ty
                    } else {
                        self.expr(callee);
                        TypeTag::Unknown
                    }
                } else {
                    self.expr(callee);
                    TypeTag::Unknown
                }
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let lt = self.expr(lhs);
                let rt = self.expr(rhs);
                self.binary_type(*op, lt, rt)
            }
            ExprKind::Unary { op, expr: inner } => {
                let t = self.expr(inner);
                match op {
                    crate::ast::UnOp::Not => TypeTag::Boolean,
                    crate::ast::UnOp::Neg => {
                        if matches!(t, TypeTag::Integer | TypeTag::Float) {
                            t
                        } else {
                            TypeTag::Unknown
                        }
                    }
                }
            }
            ExprKind::Array(items) => {
                for item in items {
                    self.expr(item);
                }
                TypeTag::Array
            }
            ExprKind::Hash(pairs) => {
                for (k, v) in pairs {
                    self.expr(k);
                    self.expr(v);
                }
                TypeTag::Hash
            }
            ExprKind::Lambda { params, body } => {
                self.push_scope();
                for p in params {
                    self.bind(*p, TypeTag::Unknown);
                }
                self.block(body);
                self.pop_scope();
                TypeTag::Lambda
            }
            ExprKind::Try(inner) => {
                self.expr(inner);
                TypeTag::Unknown
            }
            ExprKind::TryOr { body, default } => {
                self.expr(body);
                self.expr(default)
            }
            ExprKind::TryHandler {
                body,
                err_name,
                handler,
            } => {
                self.expr(body);
                self.push_scope();
                self.bind(*err_name, TypeTag::String);
                self.block(handler);
                self.pop_scope();
                TypeTag::Unknown
            }
            ExprKind::Spawn(inner) => {
                self.expr(inner);
                TypeTag::Unknown
            }
            ExprKind::Parallel(items) => {
                for item in items {
                    self.expr(item);
                }
                TypeTag::Array
            }
            ExprKind::TaskValue(inner) => {
                self.expr(inner);
                TypeTag::Unknown
            }
            ExprKind::TaskDone(inner) => {
                self.expr(inner);
                TypeTag::Boolean
            }
            ExprKind::TaskWait(inner, timeout) => {
                self.expr(inner);
                self.expr(timeout);
                TypeTag::Unknown
            }
            ExprKind::Capture(inner) => {
                self.expr(inner);
                TypeTag::String
            }
            ExprKind::Shell(inner) => {
                self.expr(inner);
                TypeTag::Nil
            }
        };
        expr.ty = Some(ty);
        ty
    }

    fn binary_type(&self, op: BinOp, lhs: TypeTag, rhs: TypeTag) -> TypeTag {
        use BinOp::*;
        match op {
            Eq | NotEq | Lt | Gt | LtEq | GtEq | And | Or => TypeTag::Boolean,
            Add | Sub | Mul | Div | Mod => {
                if lhs == rhs && matches!(lhs, TypeTag::Integer | TypeTag::Float) {
                    lhs
                } else if op == Add && lhs == TypeTag::String && rhs == TypeTag::String {
                    TypeTag::String
                } else {
                    TypeTag::Unknown
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ExprKind, Program, Stmt, StmtKind};

    fn lit_int(v: i64) -> Expr {
        Expr::new(ExprKind::Int(v), 1)
    }

    #[test]
    fn literal_arithmetic_propagates_integer_type() {
        let interner = Interner::new();
        let mut program = Program {
            stmts: vec![Stmt {
                line: 1,
                kind: StmtKind::ExprStmt(Expr::new(
                    ExprKind::Binary {
                        op: BinOp::Add,
                        lhs: Box::new(lit_int(1)),
                        rhs: Box::new(lit_int(2)),
                    },
                    1,
                )),
            }],
            structs: vec![],
        };
        Inference::run(&mut program, &interner);
        match &program.stmts[0].kind {
            StmtKind::ExprStmt(e) => assert_eq!(e.ty, Some(TypeTag::Integer)),
            _ => unreachable!(),
        }
    }

    #[test]
    fn mismatched_operand_types_widen_to_unknown() {
        let interner = Interner::new();
        let mut program = Program {
            stmts: vec![Stmt {
                line: 1,
                kind: StmtKind::ExprStmt(Expr::new(
                    ExprKind::Binary {
                        op: BinOp::Add,
                        lhs: Box::new(lit_int(1)),
                        rhs: Box::new(Expr::new(ExprKind::Bool(true), 1)),
                    },
                    1,
                )),
            }],
            structs: vec![],
        };
        Inference::run(&mut program, &interner);
        match &program.stmts[0].kind {
            StmtKind::ExprStmt(e) => assert_eq!(e.ty, Some(TypeTag::Unknown)),
            _ => unreachable!(),
        }
    }

    #[test]
    fn builtin_len_has_known_integer_return_type() {
        let mut interner = Interner::new();
        let len_sym = interner.intern("len");
        let mut program = Program {
            stmts: vec![Stmt {
                line: 1,
                kind: StmtKind::ExprStmt(Expr::new(
                    ExprKind::Call {
                        callee: Box::new(Expr::new(ExprKind::Identifier(len_sym), 1)),
                        args: vec![Expr::new(ExprKind::Array(vec![]), 1)],
                    },
                    1,
                )),
            }],
            structs: vec![],
        };
        Inference::run(&mut program, &interner);
        match &program.stmts[0].kind {
            StmtKind::ExprStmt(e) => assert_eq!(e.ty, Some(TypeTag::Integer)),
            _ => unreachable!(),
        }
    }

    #[test]
    fn unresolved_call_is_unknown() {
        let mut interner = Interner::new();
        let f = interner.intern("mystery");
        let mut program = Program {
            stmts: vec![Stmt {
                line: 1,
                kind: StmtKind::ExprStmt(Expr::new(
                    ExprKind::Call {
                        callee: Box::new(Expr::new(ExprKind::Identifier(f), 1)),
                        args: vec![],
                    },
                    1,
                )),
            }],
            structs: vec![],
        };
        Inference::run(&mut program, &interner);
        match &program.stmts[0].kind {
            StmtKind::ExprStmt(e) => assert_eq!(e.ty, Some(TypeTag::Unknown)),
            _ => unreachable!(),
        }
    }
}
