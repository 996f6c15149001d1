//! The typed AST (§3 "AST entities") produced by the walker (§4.3) and
//! consumed by inference (§4.4) and codegen (§4.5).
//!
//! A program is a flat ordered list of top-level statements plus a
//! separate list of struct definitions (struct bodies are already lowered
//! to constructor functions by the preprocessor's struct-expansion stage;
//! this list only records field order for codegen's struct-literal
//! printing and the walker's struct-reattachment pass, §4.3).

use crate::inference::TypeTag;
use crate::intern::Symbol;

#[derive(Debug, Clone)]
pub struct Program {
    pub stmts: Vec<Stmt>,
    pub structs: Vec<StructDef>,
}

#[derive(Debug, Clone)]
pub struct StructDef {
    pub name: Symbol,
    pub fields: Vec<Symbol>,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Assign {
        target: Symbol,
        value: Expr,
        is_const: bool,
    },
    IndexAssign {
        target: Box<Expr>,
        index: Box<Expr>,
        value: Box<Expr>,
    },
    MemberAssign {
        target: Box<Expr>,
        member: Symbol,
        value: Box<Expr>,
    },
    If {
        branches: Vec<(Expr, Vec<Stmt>)>,
        else_branch: Option<Vec<Stmt>>,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
    },
    ForIn {
        index: Option<Symbol>,
        key: Option<Symbol>,
        binding: Symbol,
        iterable: Expr,
        body: Vec<Stmt>,
    },
    Return(Option<Expr>),
    Break,
    Next,
    FunctionDef(FunctionDef),
    /// `use`/`import`/`require`, carrying the raw reference text exactly as
    /// written; module-kind classification happens in codegen (§4.5),
    /// which is the first stage that needs the registries to disambiguate
    /// it (§3 "Module reference").
    Use(UseDecl),
    ExprStmt(Expr),
    Raise(Expr),
    Sandbox,
    Test {
        name: String,
        body: Vec<Stmt>,
    },
    Benchmark {
        name: String,
        body: Vec<Stmt>,
    },
}

#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub name: Symbol,
    pub params: Vec<Symbol>,
    pub variadic: bool,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleKeyword {
    Use,
    Import,
    Require,
}

#[derive(Debug, Clone)]
pub struct UseDecl {
    pub keyword: ModuleKeyword,
    pub reference: String,
    pub alias: Option<Symbol>,
    pub with_list: Vec<Symbol>,
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub line: u32,
    /// Filled in by the inference pass (§4.4); `None` before inference
    /// runs, `Some(TypeTag::Unknown)` at worst afterward.
    pub ty: Option<TypeTag>,
}

impl Expr {
    pub fn new(kind: ExprKind, line: u32) -> Self {
        Expr {
            kind,
            line,
            ty: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Int(i64),
    Float(f64),
    Str(Vec<StrPart>),
    RawStr(String),
    Bool(bool),
    Nil,
    Identifier(Symbol),
    Index(Box<Expr>, Box<Expr>),
    /// `a[start, len]` — silently clamped at runtime (§8 boundary
    /// behavior), never a compile-time bounds error.
    Slice {
        target: Box<Expr>,
        start: Box<Expr>,
        len: Option<Box<Expr>>,
    },
    Member(Box<Expr>, Symbol),
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnOp,
        expr: Box<Expr>,
    },
    Array(Vec<Expr>),
    Hash(Vec<(Expr, Expr)>),
    Lambda {
        params: Vec<Symbol>,
        body: Vec<Stmt>,
    },
    /// `try EXPR` — returns nil on failure.
    Try(Box<Expr>),
    /// `try EXPR or DEFAULT` — DEFAULT evaluated only on failure.
    TryOr {
        body: Box<Expr>,
        default: Box<Expr>,
    },
    /// `try EXPR or err ... end` — binds the error message to `err_name`
    /// and evaluates `handler` for its last expression.
    TryHandler {
        body: Box<Expr>,
        err_name: Symbol,
        handler: Vec<Stmt>,
    },
    /// `spawn EXPR`.
    Spawn(Box<Expr>),
    /// `parallel ... end` with each line lowered to its own thunk.
    Parallel(Vec<Expr>),
    /// Reserved task-handle accessors: `.value`, `.done`. Syntactically
    /// recognized rather than type-tracked (§9 open question: inference
    /// stays conservative, so codegen treats these as reserved operation
    /// names on any receiver — see DESIGN.md).
    TaskValue(Box<Expr>),
    TaskDone(Box<Expr>),
    TaskWait(Box<Expr>, Box<Expr>),
    /// Backtick capture, `` `cmd` `` after the preprocessor's backtick
    /// pass — carries the already-interpolated command text.
    Capture(Box<Expr>),
    /// Bare shell-command fallback (§4.1 edge policy).
    Shell(Box<Expr>),
}

#[derive(Debug, Clone)]
pub enum StrPart {
    Literal(String),
    Interpolation(Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}
