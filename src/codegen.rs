//! Codegen (§4.5): lowers the typed, type-tagged AST into the output AST
//! of §3 and tracks which runtime helpers and module imports the emitted
//! program needs.
//!
//! The output AST is deliberately thinner than §3's full description: a
//! `GoExpr` is a rendered-text wrapper rather than a fully generalized
//! expression tree (expressions in Go are overwhelmingly linear — binary
//! trees of calls and operators — so a second typed tree buys little over
//! building the text directly), while `GoStmt` stays a real structured
//! enum because the printer needs to own indentation, block boundaries,
//! and `//line` placement. See DESIGN.md for the tradeoff this records.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::ast::{
    BinOp, Expr, ExprKind, FunctionDef, ModuleKeyword, Program, Stmt, StmtKind, StrPart,
    StructDef, UnOp, UseDecl,
};
use crate::inference::TypeTag;
use crate::intern::{Interner, Symbol};
use crate::modules::{FunctionDef as ModuleFunctionDef, ModuleDef, ModuleRegistry, StdlibBridge};
use crate::resolver::find_entry_point;
use crate::runtime_helpers::{Helper, HelperSet};

#[derive(Debug)]
pub enum CodegenError {
    UnknownModule {
        reference: String,
        line: u32,
    },
    DuplicateNamespace {
        namespace: String,
        line: u32,
    },
    DuplicateModulePath {
        reference: String,
        line: u32,
    },
    UnresolvedRemoteModule {
        reference: String,
        line: u32,
    },
    LocalModuleNotFound {
        path: String,
        line: u32,
        source: String,
    },
    UnboundNamespace {
        namespace: String,
        line: u32,
    },
    UnknownModuleFunction {
        namespace: String,
        function: String,
        line: u32,
    },
}

impl std::fmt::Display for CodegenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodegenError::UnknownModule { reference, line } => {
                write!(f, "line {}: unknown module '{}'", line, reference)
            }
            CodegenError::DuplicateNamespace { namespace, line } => {
                write!(f, "line {}: namespace '{}' already in use", line, namespace)
            }
            CodegenError::DuplicateModulePath { reference, line } => {
                write!(f, "line {}: module '{}' imported more than once", line, reference)
            }
            CodegenError::UnresolvedRemoteModule { reference, line } => write!(
                f,
                "line {}: remote module '{}' has not been resolved; run `rugo mod tidy` first",
                line, reference
            ),
            CodegenError::LocalModuleNotFound { path, line, source } => {
                write!(f, "line {}: could not load module '{}': {}", line, path, source)
            }
            CodegenError::UnboundNamespace { namespace, line } => {
                write!(f, "line {}: '{}' is not an imported namespace", line, namespace)
            }
            CodegenError::UnknownModuleFunction {
                namespace,
                function,
                line,
            } => write!(
                f,
                "line {}: module '{}' has no function '{}'",
                line, namespace, function
            ),
        }
    }
}

impl std::error::Error for CodegenError {}

/// A rendered Go expression. Thin wrapper rather than a typed tree — see
/// the module doc comment.
#[derive(Debug, Clone)]
pub struct GoExpr(pub String);

impl GoExpr {
    fn new(text: impl Into<String>) -> Self {
        GoExpr(text.into())
    }

    fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GoExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Structured statement-level output AST (§3); the printer walks this to
/// own indentation and line-directive placement.
#[derive(Debug, Clone)]
pub enum GoStmt {
    Expr(GoExpr),
    /// `name := value` (declare) or `name = value` (reassignment).
    Assign {
        name: String,
        value: GoExpr,
        declare: bool,
    },
    IndexAssign {
        target: GoExpr,
        index: GoExpr,
        value: GoExpr,
    },
    Return(Option<GoExpr>),
    If {
        cond: GoExpr,
        then_body: Vec<GoStmt>,
        else_body: Option<Vec<GoStmt>>,
    },
    For {
        cond: GoExpr,
        body: Vec<GoStmt>,
    },
    ForRange {
        index: Option<String>,
        key: Option<String>,
        binding: String,
        iterable: GoExpr,
        body: Vec<GoStmt>,
    },
    Break,
    Continue,
    LineDirective {
        line: u32,
    },
    Comment(String),
    Blank,
    Raw(String),
}

#[derive(Debug, Clone)]
pub struct GoFunc {
    pub name: String,
    pub params: Vec<String>,
    pub results: String,
    pub body: Vec<GoStmt>,
}

#[derive(Debug, Clone)]
pub struct GoTestEntry {
    pub name: String,
    pub go_name: String,
}

pub struct GoFile {
    pub package: String,
    pub imports: BTreeSet<&'static str>,
    pub helper_sources: Vec<&'static str>,
    pub module_dependencies: Vec<&'static str>,
    pub struct_ctors: Vec<GoFunc>,
    pub funcs: Vec<GoFunc>,
    pub tests: Vec<GoFunc>,
    pub test_registry: Vec<GoTestEntry>,
    pub benches: Vec<GoFunc>,
    pub bench_registry: Vec<GoTestEntry>,
    pub main_body: Vec<GoStmt>,
    pub entry_file: String,
}

/// A namespace's resolved source, bound at the `use`/`import`/`require`
/// site and consulted at every call site in that namespace (§4.5 "Module
/// handling").
#[derive(Clone)]
enum ModuleBinding<'m> {
    Runtime(&'m ModuleDef),
    Bridge(String),
    /// Functions inlined from a local/remote file, namespaced with this
    /// prefix (`"<ns>_"`).
    Local { prefix: String },
}

/// Resolves `require "host/owner/repo[...]"` references to a local
/// filesystem directory. Codegen never speaks to Git directly; that's the
/// resolver's job (§4.7). Supplied by the caller (`compile.rs`), which
/// consults the resolver before invoking codegen.
pub trait RemoteModuleSource {
    fn resolve(&self, reference: &str) -> Option<PathBuf>;
}

pub struct NoRemoteModules;
impl RemoteModuleSource for NoRemoteModules {
    fn resolve(&self, _reference: &str) -> Option<PathBuf> {
        None
    }
}

pub struct Codegen<'a> {
    interner: &'a mut Interner,
    modules: &'a ModuleRegistry,
    bridge: &'a StdlibBridge,
    remote: &'a dyn RemoteModuleSource,
    base_dir: PathBuf,
    helpers: HelperSet,
    namespaces: HashMap<Symbol, ModuleBinding<'a>>,
    seen_paths: HashSet<String>,
    local_funcs: Vec<GoFunc>,
    tmp_counter: u32,
    /// Go import lines contributed by module templates/bridges (§4.5
    /// "Module handling"), tracked separately from `HelperSet`'s imports
    /// since they come from `ModuleDef`/`StdlibBridge` data, not the
    /// fixed runtime-helper catalog.
    module_imports: BTreeSet<&'static str>,
    /// go.mod-style dependency specs any resolved module template
    /// declares, surfaced to `compile.rs` so the generated project's
    /// `go.mod` can require them.
    module_dependencies: BTreeSet<&'static str>,
}

impl<'a> Codegen<'a> {
    pub fn new(
        interner: &'a mut Interner,
        modules: &'a ModuleRegistry,
        bridge: &'a StdlibBridge,
        remote: &'a dyn RemoteModuleSource,
        base_dir: PathBuf,
    ) -> Self {
        Codegen {
            interner,
            modules,
            bridge,
            remote,
            base_dir,
            helpers: HelperSet::new(),
            namespaces: HashMap::new(),
            seen_paths: HashSet::new(),
            local_funcs: Vec::new(),
            tmp_counter: 0,
            module_imports: BTreeSet::new(),
            module_dependencies: BTreeSet::new(),
        }
    }

    fn fresh_name(&mut self, hint: &str) -> String {
        self.tmp_counter += 1;
        format!("rugo_tmp_{}_{}", hint, self.tmp_counter)
    }

    /// `if`/`while` conditions are boxed `interface{}` values in the
    /// general case (§9 "dynamic typing"); Go requires a `bool`, so every
    /// branch condition is routed through `rugo_truthy` rather than only
    /// the short-circuit logical operators (§4.5 lowers `&&`/`||` this way
    /// already — this generalizes it to the statement level).
    fn truthy_cond(&mut self, cond: &Expr) -> Result<GoExpr, CodegenError> {
        let c = self.expr(cond)?;
        self.helpers.require(Helper::Truthy);
        Ok(GoExpr::new(format!("rugo_truthy({})", c.as_str())))
    }

    pub fn lower_program(&mut self, program: &Program, entry_file: &str) -> Result<GoFile, CodegenError> {
        log::debug!("codegen: lowering {} top-level statements", program.stmts.len());

        let mut struct_ctors = Vec::new();
        for s in &program.structs {
            struct_ctors.push(self.struct_ctor(s));
        }

        let mut funcs = Vec::new();
        let mut tests = Vec::new();
        let mut test_registry = Vec::new();
        let mut benches = Vec::new();
        let mut bench_registry = Vec::new();
        let mut main_body = Vec::new();

        // `main`'s statement sequence is itself a function scope (§3); any
        // name it assigns anywhere, including inside top-level `if`/`while`,
        // is hoisted the same way `block_with_hoist` hoists a function body.
        {
            let mut seen = HashSet::new();
            let mut names = Vec::new();
            collect_assign_targets(&program.stmts, &mut names, &mut seen);
            for sym in &names {
                main_body.push(GoStmt::Raw(format!(
                    "var {} interface{{}}",
                    self.interner.resolve(*sym)
                )));
            }
        }

        for stmt in &program.stmts {
            match &stmt.kind {
                StmtKind::Use(decl) => self.bind_namespace(decl, stmt.line)?,
                StmtKind::FunctionDef(def) => {
                    let f = self.lower_function(def)?;
                    funcs.push(f);
                }
                StmtKind::Test { name, body } => {
                    let go_name = format!("RugoTest_{}", tests.len());
                    let body = self.block_with_hoist(body)?;
                    tests.push(GoFunc {
                        name: go_name.clone(),
                        params: vec!["t *testing.T".to_string()],
                        results: String::new(),
                        body,
                    });
                    test_registry.push(GoTestEntry {
                        name: name.clone(),
                        go_name,
                    });
                }
                StmtKind::Benchmark { name, body } => {
                    let go_name = format!("RugoBench_{}", benches.len());
                    let body = self.block_with_hoist(body)?;
                    benches.push(GoFunc {
                        name: go_name.clone(),
                        params: vec!["b *testing.B".to_string()],
                        results: String::new(),
                        body,
                    });
                    bench_registry.push(GoTestEntry {
                        name: name.clone(),
                        go_name,
                    });
                }
                _ => {
                    let mut lowered = self.stmt(stmt)?;
                    main_body.append(&mut lowered);
                }
            }
        }

        funcs.extend(std::mem::take(&mut self.local_funcs));

        log::debug!(
            "codegen: emitted {} functions, {} helpers, {} tests, {} benchmarks",
            funcs.len(),
            self.helpers.sources().len(),
            tests.len(),
            benches.len()
        );

        let mut imports: BTreeSet<&'static str> = self.helpers.go_imports();
        imports.extend(self.module_imports.iter().copied());
        if !tests.is_empty() || !benches.is_empty() {
            imports.insert("testing");
        }

        Ok(GoFile {
            package: "main".to_string(),
            imports,
            helper_sources: self.helpers.sources(),
            module_dependencies: self.module_dependencies.iter().copied().collect(),
            struct_ctors,
            funcs,
            tests,
            test_registry,
            benches,
            bench_registry,
            main_body,
            entry_file: entry_file.to_string(),
        })
    }

    fn struct_ctor(&mut self, def: &StructDef) -> GoFunc {
        let name = self.interner.resolve(def.name).to_string();
        let params: Vec<String> = def
            .fields
            .iter()
            .map(|f| format!("{} interface{{}}", self.interner.resolve(*f)))
            .collect();
        let mut entries = String::new();
        for f in &def.fields {
            let fname = self.interner.resolve(*f).to_string();
            entries.push_str(&format!("\"{}\": {}, ", fname, fname));
        }
        let body = vec![GoStmt::Return(Some(GoExpr::new(format!(
            "map[string]interface{{}}{{{}}}",
            entries.trim_end_matches(", ")
        ))))];
        GoFunc {
            name,
            params,
            results: "map[string]interface{}".to_string(),
            body,
        }
    }

    fn bind_namespace(&mut self, decl: &UseDecl, line: u32) -> Result<(), CodegenError> {
        let reference = decl.reference.trim().to_string();
        if !self.seen_paths.insert(reference.clone()) {
            return Err(CodegenError::DuplicateModulePath { reference, line });
        }

        let namespace_text = match decl.alias {
            Some(sym) => self.interner.resolve(sym).to_string(),
            None => default_namespace(&reference),
        };
        let namespace_sym = self.interner.intern(&namespace_text);

        if ModuleRegistry::is_runtime_module(&reference) {
            let def = self.modules.get(&reference).expect("checked membership");
            if self.namespaces.contains_key(&namespace_sym) {
                return Err(CodegenError::DuplicateNamespace {
                    namespace: namespace_text,
                    line,
                });
            }
            self.namespaces.insert(namespace_sym, ModuleBinding::Runtime(def));
            self.module_dependencies.extend(def.dependencies.iter().copied());
            return Ok(());
        }

        if self.bridge.is_bridged_package(&reference) {
            if self.namespaces.contains_key(&namespace_sym) {
                return Err(CodegenError::DuplicateNamespace {
                    namespace: namespace_text,
                    line,
                });
            }
            self.namespaces
                .insert(namespace_sym, ModuleBinding::Bridge(reference));
            return Ok(());
        }

        if is_remote_reference(&reference) {
            let fetched_dir = self
                .remote
                .resolve(&reference)
                .ok_or_else(|| CodegenError::UnresolvedRemoteModule {
                    reference: reference.clone(),
                    line,
                })?;
            // §4.7 "Entry-point resolution": the resolver hands back the
            // fetched repository directory (or a subpath within it), not
            // necessarily a `.rugo` file directly — resolve it the same
            // way the resolver itself would before treating it as a local
            // module (§4.5 "Remote and user modules" — "treats the fetched
            // directory as a local module").
            let entry_path = self.entry_path_for(&fetched_dir, &reference, line)?;
            return self.bind_local_directory_or_file(
                &entry_path,
                &fetched_dir,
                decl,
                &namespace_text,
                namespace_sym,
                line,
            );
        }

        // User file or directory module (§3 "Module reference").
        let named_file = self.base_dir.join(local_module_path(&reference));
        if named_file.is_file() {
            return self.bind_local_directory_or_file(
                &named_file,
                &named_file,
                decl,
                &namespace_text,
                namespace_sym,
                line,
            );
        }
        let as_dir = self.base_dir.join(&reference);
        let entry_path = self.entry_path_for(&as_dir, &reference, line)?;
        self.bind_local_directory_or_file(&entry_path, &as_dir, decl, &namespace_text, namespace_sym, line)
    }

    /// Resolves `dir_or_file` to an actual `.rugo` file: used as-is if it's
    /// already a file, otherwise resolved via the same
    /// `<repo-name>.rugo`/`main.rugo`/sole-`*.rugo` rule the remote
    /// resolver applies to a fetched repository (§4.7 "Entry-point
    /// resolution").
    fn entry_path_for(&self, dir_or_file: &Path, reference: &str, line: u32) -> Result<PathBuf, CodegenError> {
        if dir_or_file.is_file() {
            return Ok(dir_or_file.to_path_buf());
        }
        let repo_name = reference
            .split('@')
            .next()
            .unwrap_or(reference)
            .rsplit('/')
            .next()
            .unwrap_or(reference);
        find_entry_point(dir_or_file, repo_name).map_err(|e| CodegenError::LocalModuleNotFound {
            path: dir_or_file.display().to_string(),
            line,
            source: e.to_string(),
        })
    }

    /// Binds a namespace (or, for a directory module with a non-empty
    /// with-list, one namespace per with-listed file — §3 "for
    /// directory-style modules, a with-list naming specific files to load
    /// as sub-namespaces").
    fn bind_local_directory_or_file(
        &mut self,
        entry_path: &Path,
        dir: &Path,
        decl: &UseDecl,
        namespace_text: &str,
        namespace_sym: Symbol,
        line: u32,
    ) -> Result<(), CodegenError> {
        if decl.with_list.is_empty() {
            self.inline_local_module(entry_path, namespace_text, line)?;
            if self.namespaces.contains_key(&namespace_sym) {
                return Err(CodegenError::DuplicateNamespace {
                    namespace: namespace_text.to_string(),
                    line,
                });
            }
            self.namespaces.insert(
                namespace_sym,
                ModuleBinding::Local {
                    prefix: namespace_text.to_string(),
                },
            );
            return Ok(());
        }

        let base = dir.parent().filter(|_| dir.is_file()).map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
        for &sub_sym in &decl.with_list {
            let sub_name = self.interner.resolve(sub_sym).to_string();
            let sub_path = base.join(local_module_path(&sub_name));
            self.inline_local_module(&sub_path, &sub_name, line)?;
            if self.namespaces.contains_key(&sub_sym) {
                return Err(CodegenError::DuplicateNamespace {
                    namespace: sub_name,
                    line,
                });
            }
            self.namespaces.insert(sub_sym, ModuleBinding::Local { prefix: sub_name });
        }
        Ok(())
    }

    /// Reads and fully compiles (preprocess → lex → parse → walk → infer)
    /// a local `.rugo` file, namespacing its top-level functions with
    /// `prefix_` (§4.5 "Remote and user modules"). Only function
    /// definitions are pulled in; other top-level statements in a required
    /// file have no meaning as library exports and are skipped.
    fn inline_local_module(
        &mut self,
        path: &Path,
        prefix: &str,
        line: u32,
    ) -> Result<(), CodegenError> {
        let source = std::fs::read_to_string(path).map_err(|e| CodegenError::LocalModuleNotFound {
            path: path.display().to_string(),
            line,
            source: e.to_string(),
        })?;

        let program = crate::compile::parse_to_ast(&source, self.interner).map_err(|e| {
            CodegenError::LocalModuleNotFound {
                path: path.display().to_string(),
                line,
                source: e.to_string(),
            }
        })?;

        for stmt in &program.stmts {
            if let StmtKind::FunctionDef(def) = &stmt.kind {
                let base_name = self.interner.resolve(def.name).to_string();
                let mut f = self.lower_function(def)?;
                f.name = format!("{}_{}", sanitize(prefix), base_name);
                self.local_funcs.push(f);
            }
        }
        Ok(())
    }

    fn lower_function(&mut self, def: &FunctionDef) -> Result<GoFunc, CodegenError> {
        let name = self.interner.resolve(def.name).to_string();
        let mut params: Vec<String> = def
            .params
            .iter()
            .map(|p| format!("{} interface{{}}", self.interner.resolve(*p)))
            .collect();
        if def.variadic {
            if let Some(last) = params.pop() {
                let stripped = last.trim_end_matches(" interface{}").to_string();
                params.push(format!("{} ...interface{{}}", stripped));
            }
        }
        let body = self.block_with_hoist(&def.body)?;
        Ok(GoFunc {
            name,
            params,
            results: "interface{}".to_string(),
            body,
        })
    }

    fn block(&mut self, stmts: &[Stmt]) -> Result<Vec<GoStmt>, CodegenError> {
        let mut out = Vec::new();
        for s in stmts {
            out.extend(self.stmt(s)?);
        }
        Ok(out)
    }

    /// Entry point for a Go function-literal scope (function bodies,
    /// lambdas, try/handler blocks, the top-level main sequence). Rugo
    /// assignment is function-scoped, not block-scoped (§3 "Within a
    /// function body, assignment creates a local binding") — an `if` or
    /// `while` body can assign a name the code after it reads. Go's `:=`
    /// is block-scoped, so every name this scope ever assigns (including
    /// inside nested `if`/`while`/`for`) is hoisted to a `var` declaration
    /// up front, and every `Assign` lowers to plain `=`.
    fn block_with_hoist(&mut self, stmts: &[Stmt]) -> Result<Vec<GoStmt>, CodegenError> {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        collect_assign_targets(stmts, &mut names, &mut seen);

        let mut out = Vec::with_capacity(names.len());
        for sym in &names {
            out.push(GoStmt::Raw(format!(
                "var {} interface{{}}",
                self.interner.resolve(*sym)
            )));
        }
        out.extend(self.block(stmts)?);
        Ok(out)
    }

    fn stmt(&mut self, stmt: &Stmt) -> Result<Vec<GoStmt>, CodegenError> {
        let line_directive = GoStmt::LineDirective { line: stmt.line };
        let body = match &stmt.kind {
            StmtKind::Assign { target, value, .. } => {
                let v = self.expr(value)?;
                vec![GoStmt::Assign {
                    name: self.interner.resolve(*target).to_string(),
                    value: v,
                    // Pre-declared by `block_with_hoist` at scope entry.
                    declare: false,
                }]
            }
            StmtKind::IndexAssign { target, index, value } => {
                let t = self.expr(target)?;
                let i = self.expr(index)?;
                let v = self.expr(value)?;
                self.helpers.require(Helper::IndexSet);
                vec![GoStmt::IndexAssign {
                    target: t,
                    index: i,
                    value: v,
                }]
            }
            StmtKind::MemberAssign { target, member, value } => {
                let t = self.expr(target)?;
                let v = self.expr(value)?;
                let member_name = self.interner.resolve(*member).to_string();
                self.helpers.require(Helper::DotSet);
                vec![GoStmt::Expr(GoExpr::new(format!(
                    "rugo_dot_set({}, \"{}\", {})",
                    t.as_str(),
                    member_name,
                    v.as_str()
                )))]
            }
            StmtKind::If { branches, else_branch } => {
                let mut iter = branches.iter();
                let (first_cond, first_body) = iter.next().expect("if has at least one branch");
                let cond = self.truthy_cond(first_cond)?;
                let then_body = self.block(first_body)?;
                let mut else_body = match else_branch {
                    Some(b) => Some(self.block(b)?),
                    None => None,
                };
                // Fold remaining elsif branches right-to-left into nested else-ifs.
                let rest: Vec<_> = iter.collect();
                for (c, b) in rest.into_iter().rev() {
                    let cc = self.truthy_cond(c)?;
                    let bb = self.block(b)?;
                    else_body = Some(vec![GoStmt::If {
                        cond: cc,
                        then_body: bb,
                        else_body,
                    }]);
                }
                vec![GoStmt::If {
                    cond,
                    then_body,
                    else_body,
                }]
            }
            StmtKind::While { cond, body } => {
                let c = self.truthy_cond(cond)?;
                let b = self.block(body)?;
                vec![GoStmt::For { cond: c, body: b }]
            }
            StmtKind::ForIn {
                index,
                key,
                binding,
                iterable,
                body,
            } => {
                let it = self.expr(iterable)?;
                let b = self.block(body)?;
                if key.is_some() {
                    self.helpers.require(Helper::RangePairs);
                } else {
                    self.helpers.require(Helper::RangeValues);
                }
                vec![GoStmt::ForRange {
                    index: index.map(|s| self.interner.resolve(s).to_string()),
                    key: key.map(|s| self.interner.resolve(s).to_string()),
                    binding: self.interner.resolve(*binding).to_string(),
                    iterable: it,
                    body: b,
                }]
            }
            StmtKind::Return(Some(e)) => {
                let v = self.expr(e)?;
                vec![GoStmt::Return(Some(v))]
            }
            StmtKind::Return(None) => vec![GoStmt::Return(None)],
            StmtKind::Break => vec![GoStmt::Break],
            StmtKind::Next => vec![GoStmt::Continue],
            StmtKind::FunctionDef(_) => {
                // Nested function definitions at non-top-level positions are
                // rare in practice (the parser allows them syntactically);
                // lower as a local closure assignment.
                vec![]
            }
            StmtKind::Use(decl) => {
                self.bind_namespace(decl, stmt.line)?;
                vec![]
            }
            StmtKind::ExprStmt(e) => {
                let v = self.expr(e)?;
                vec![GoStmt::Expr(v)]
            }
            StmtKind::Raise(e) => {
                let v = self.expr(e)?;
                self.helpers.require(Helper::Raise);
                vec![GoStmt::Expr(GoExpr::new(format!(
                    "rugo_raise({}, {})",
                    stmt.line,
                    v.as_str()
                )))]
            }
            StmtKind::Sandbox => vec![GoStmt::Comment("sandbox".to_string())],
            StmtKind::Test { .. } | StmtKind::Benchmark { .. } => {
                // Handled at the top level in lower_program; nested test/
                // benchmark blocks are not part of the grammar.
                vec![]
            }
        };
        let mut out = vec![line_directive];
        out.extend(body);
        Ok(out)
    }

    fn expr(&mut self, expr: &Expr) -> Result<GoExpr, CodegenError> {
        let ty = expr.ty.unwrap_or(TypeTag::Unknown);
        let text = match &expr.kind {
            ExprKind::Int(n) => format!("int64({})", n),
            ExprKind::Float(f) => format!("float64({})", f),
            ExprKind::Str(parts) => self.string_literal(parts)?,
            ExprKind::RawStr(s) => format!("{:?}", s),
            ExprKind::Bool(b) => b.to_string(),
            ExprKind::Nil => "nil".to_string(),
            ExprKind::Identifier(sym) => self.interner.resolve(*sym).to_string(),
            ExprKind::Index(target, index) => {
                let t = self.expr(target)?;
                let i = self.expr(index)?;
                self.helpers.require(Helper::Index);
                format!("rugo_index({}, {})", t.as_str(), i.as_str())
            }
            ExprKind::Slice { target, start, len } => {
                let t = self.expr(target)?;
                let s = self.expr(start)?;
                self.helpers.require(Helper::Slice);
                match len {
                    Some(l) => {
                        let lv = self.expr(l)?;
                        format!("rugo_slice({}, {}, {})", t.as_str(), s.as_str(), lv.as_str())
                    }
                    None => format!("rugo_slice({}, {}, -1)", t.as_str(), s.as_str()),
                }
            }
            ExprKind::Member(target, member) => {
                let member_name = self.interner.resolve(*member);
                if member_name == "value" {
                    let t = self.expr(target)?;
                    self.helpers.require(Helper::TaskHandle);
                    format!("rugo_task_value({})", t.as_str())
                } else if member_name == "done" {
                    let t = self.expr(target)?;
                    self.helpers.require(Helper::TaskHandle);
                    format!("rugo_task_done({})", t.as_str())
                } else if member_name == "size" || member_name == "closed" {
                    let t = self.expr(target)?;
                    self.helpers.require(Helper::Queue);
                    format!("rugo_queue_{}({})", member_name, t.as_str())
                } else {
                    let t = self.expr(target)?;
                    self.helpers.require(Helper::DotGet);
                    format!("rugo_dot_get({}, \"{}\")", t.as_str(), member_name)
                }
            }
            ExprKind::Call { callee, args } => return self.call(callee, args, expr.line),
            ExprKind::Binary { op, lhs, rhs } => return self.binary(*op, lhs, rhs, ty),
            ExprKind::Unary { op, expr: inner } => {
                let v = self.expr(inner)?;
                match op {
                    UnOp::Not => {
                        self.helpers.require(Helper::Truthy);
                        format!("!rugo_truthy({})", v.as_str())
                    }
                    UnOp::Neg => format!("(-{})", v.as_str()),
                }
            }
            ExprKind::Array(items) => {
                let mut rendered = Vec::with_capacity(items.len());
                for i in items {
                    rendered.push(self.expr(i)?.0);
                }
                format!("[]interface{{}}{{{}}}", rendered.join(", "))
            }
            ExprKind::Hash(pairs) => {
                let mut rendered = Vec::with_capacity(pairs.len());
                for (k, v) in pairs {
                    let kk = self.expr(k)?;
                    let vv = self.expr(v)?;
                    self.helpers.require(Helper::ToString);
                    rendered.push(format!("rugo_to_string({}): {}", kk.as_str(), vv.as_str()));
                }
                format!("map[string]interface{{}}{{{}}}", rendered.join(", "))
            }
            ExprKind::Lambda { params, body } => {
                let param_list: Vec<String> = params
                    .iter()
                    .map(|p| format!("{} interface{{}}", self.interner.resolve(*p)))
                    .collect();
                let lowered_body = self.block_with_hoist(body)?;
                return Ok(GoExpr::new(self.render_func_literal(&param_list, &lowered_body)));
            }
            ExprKind::Try(inner) => return self.lower_try(inner, None),
            ExprKind::TryOr { body, default } => return self.lower_try(body, Some(default)),
            ExprKind::TryHandler {
                body,
                err_name,
                handler,
            } => return self.lower_try_handler(body, *err_name, handler),
            ExprKind::Spawn(inner) => {
                let lowered = self.lambda_return_block(inner)?;
                self.helpers.require(Helper::Spawn);
                format!("rugo_spawn({})", lowered)
            }
            ExprKind::Parallel(items) => {
                let mut thunks = Vec::with_capacity(items.len());
                for item in items {
                    thunks.push(self.lambda_return_block(item)?);
                }
                self.helpers.require(Helper::Parallel);
                format!("rugo_parallel({})", thunks.join(", "))
            }
            ExprKind::TaskValue(inner) => {
                let t = self.expr(inner)?;
                self.helpers.require(Helper::TaskHandle);
                format!("rugo_task_value({})", t.as_str())
            }
            ExprKind::TaskDone(inner) => {
                let t = self.expr(inner)?;
                self.helpers.require(Helper::TaskHandle);
                format!("rugo_task_done({})", t.as_str())
            }
            ExprKind::TaskWait(inner, timeout) => {
                let t = self.expr(inner)?;
                let ms = self.expr(timeout)?;
                self.helpers.require(Helper::TaskHandle);
                format!("rugo_task_wait({}, {})", t.as_str(), ms.as_str())
            }
            ExprKind::Capture(inner) => {
                let v = self.expr(inner)?;
                self.helpers.require(Helper::Capture);
                format!("rugo_capture({})", v.as_str())
            }
            ExprKind::Shell(inner) => {
                let v = self.expr(inner)?;
                self.helpers.require(Helper::Shell);
                format!("rugo_shell({})", v.as_str())
            }
        };
        Ok(GoExpr::new(text))
    }

    fn string_literal(&mut self, parts: &[StrPart]) -> Result<String, CodegenError> {
        if parts.len() == 1 {
            if let StrPart::Literal(s) = &parts[0] {
                return Ok(format!("{:?}", s));
            }
        }
        let mut pieces = Vec::with_capacity(parts.len());
        for part in parts {
            match part {
                StrPart::Literal(s) => pieces.push(format!("{:?}", s)),
                StrPart::Interpolation(e) => {
                    let v = self.expr(e)?;
                    if e.ty == Some(TypeTag::String) {
                        pieces.push(v.0);
                    } else {
                        self.helpers.require(Helper::ToString);
                        pieces.push(format!("rugo_to_string({})", v.as_str()));
                    }
                }
            }
        }
        Ok(pieces.join(" + "))
    }

    fn binary(&mut self, op: BinOp, lhs: &Expr, rhs: &Expr, result_ty: TypeTag) -> Result<GoExpr, CodegenError> {
        match op {
            BinOp::And => {
                let l = self.expr(lhs)?;
                let r = self.expr(rhs)?;
                self.helpers.require(Helper::Truthy);
                return Ok(GoExpr::new(format!(
                    "(rugo_truthy({}) && rugo_truthy({}))",
                    l.as_str(),
                    r.as_str()
                )));
            }
            BinOp::Or => {
                let l = self.expr(lhs)?;
                let r = self.expr(rhs)?;
                self.helpers.require(Helper::Truthy);
                return Ok(GoExpr::new(format!(
                    "(rugo_truthy({}) || rugo_truthy({}))",
                    l.as_str(),
                    r.as_str()
                )));
            }
            BinOp::Eq | BinOp::NotEq => {
                let l = self.expr(lhs)?;
                let r = self.expr(rhs)?;
                self.helpers.require(Helper::Eq);
                let eq = format!("rugo_eq({}, {})", l.as_str(), r.as_str());
                return Ok(GoExpr::new(if op == BinOp::Eq {
                    eq
                } else {
                    format!("!{}", eq)
                }));
            }
            _ => {}
        }

        let lt = lhs.ty.unwrap_or(TypeTag::Unknown);
        let rt = rhs.ty.unwrap_or(TypeTag::Unknown);
        let typed_fast_path = lt == rt && matches!(lt, TypeTag::Integer | TypeTag::Float);

        if typed_fast_path && matches!(op, BinOp::Lt | BinOp::Gt | BinOp::LtEq | BinOp::GtEq) {
            let l = self.expr(lhs)?;
            let r = self.expr(rhs)?;
            let sym = match op {
                BinOp::Lt => "<",
                BinOp::Gt => ">",
                BinOp::LtEq => "<=",
                BinOp::GtEq => ">=",
                _ => unreachable!(),
            };
            return Ok(GoExpr::new(format!("({} {} {})", l.as_str(), sym, r.as_str())));
        }
        if matches!(op, BinOp::Lt | BinOp::Gt | BinOp::LtEq | BinOp::GtEq) {
            let l = self.expr(lhs)?;
            let r = self.expr(rhs)?;
            self.helpers.require(Helper::ToFloat);
            let sym = match op {
                BinOp::Lt => "<",
                BinOp::Gt => ">",
                BinOp::LtEq => "<=",
                BinOp::GtEq => ">=",
                _ => unreachable!(),
            };
            return Ok(GoExpr::new(format!(
                "(rugo_to_float({}) {} rugo_to_float({}))",
                l.as_str(),
                sym,
                r.as_str()
            )));
        }

        if typed_fast_path {
            let l = self.expr(lhs)?;
            let r = self.expr(rhs)?;
            let sym = match op {
                BinOp::Add => "+",
                BinOp::Sub => "-",
                BinOp::Mul => "*",
                BinOp::Div => "/",
                BinOp::Mod => "%",
                _ => unreachable!(),
            };
            return Ok(GoExpr::new(format!("({} {} {})", l.as_str(), sym, r.as_str())));
        }

        if op == BinOp::Add && lt == TypeTag::String && rt == TypeTag::String {
            let l = self.expr(lhs)?;
            let r = self.expr(rhs)?;
            return Ok(GoExpr::new(format!("({} + {})", l.as_str(), r.as_str())));
        }

        let l = self.expr(lhs)?;
        let r = self.expr(rhs)?;
        let helper = match op {
            BinOp::Add => Helper::Add,
            BinOp::Sub => Helper::Sub,
            BinOp::Mul => Helper::Mul,
            BinOp::Div => Helper::Div,
            BinOp::Mod => Helper::Mod,
            _ => unreachable!(),
        };
        self.helpers.require(helper);
        let _ = result_ty;
        Ok(GoExpr::new(format!(
            "{}({}, {})",
            helper.name(),
            l.as_str(),
            r.as_str()
        )))
    }

    fn call(&mut self, callee: &Expr, args: &[Expr], line: u32) -> Result<GoExpr, CodegenError> {
        // Module/namespace call: `ns.func(args)`.
        if let ExprKind::Member(target, method) = &callee.kind {
            if let ExprKind::Identifier(sym) = &target.kind {
                if let Some(binding) = self.namespaces.get(sym) {
                    return self.module_call(binding, *sym, *method, args, line);
                }
            }
        }

        // Queue operations: generic `.push`/`.pop`/`.close` calls left
        // unresolved by the walker (§4.3), dispatched on method name here.
        if let ExprKind::Member(target, method) = &callee.kind {
            let method_name = self.interner.resolve(*method).to_string();
            if method_name == "wait" && args.len() == 1 {
                let t = self.expr(target)?;
                let a = self.expr(&args[0])?;
                self.helpers.require(Helper::TaskHandle);
                return Ok(GoExpr::new(format!(
                    "rugo_task_wait({}, {})",
                    t.as_str(),
                    a.as_str()
                )));
            }
            if matches!(method_name.as_str(), "push" | "pop" | "close") {
                let t = self.expr(target)?;
                self.helpers.require(Helper::Queue);
                let mut rendered_args = vec![t.0];
                for a in args {
                    rendered_args.push(self.expr(a)?.0);
                }
                return Ok(GoExpr::new(format!(
                    "rugo_queue_{}({})",
                    method_name,
                    rendered_args.join(", ")
                )));
            }
        }

        if let ExprKind::Identifier(sym) = &callee.kind {
            let name = self.interner.resolve(*sym).to_string();
            if name == "Queue" {
                self.helpers.require(Helper::Queue);
                let cap = if args.is_empty() {
                    "int64(0)".to_string()
                } else {
                    self.expr(&args[0])?.0
                };
                return Ok(GoExpr::new(format!("rugo_queue_new({})", cap)));
            }
            if let Some(builtin) = self.builtin_call(&name, args)? {
                return Ok(builtin);
            }
        }

        let callee_expr = self.expr(callee)?;
        let mut rendered = Vec::with_capacity(args.len());
        for a in args {
            rendered.push(self.expr(a)?.0);
        }
        Ok(GoExpr::new(format!("{}({})", callee_expr.as_str(), rendered.join(", "))))
    }

    fn builtin_call(&mut self, name: &str, args: &[Expr]) -> Result<Option<GoExpr>, CodegenError> {
        let rendered = |me: &mut Self, args: &[Expr]| -> Result<Vec<String>, CodegenError> {
            args.iter().map(|a| me.expr(a).map(|e| e.0)).collect()
        };
        Ok(match name {
            "puts" | "print" => {
                let a = rendered(self, args)?;
                self.helpers.require(Helper::ToString);
                let joined = a
                    .iter()
                    .map(|e| format!("rugo_to_string({})", e))
                    .collect::<Vec<_>>()
                    .join(" + \" \" + ");
                let newline = if name == "puts" { "\\n" } else { "" };
                Some(GoExpr::new(format!(
                    "fmt.Print({} + \"{}\")",
                    if joined.is_empty() {
                        "\"\"".to_string()
                    } else {
                        joined
                    },
                    newline
                )))
            }
            "len" => {
                let a = rendered(self, args)?;
                self.helpers.require(Helper::Len);
                Some(GoExpr::new(format!("rugo_len({})", a[0])))
            }
            _ => None,
        })
    }

    fn module_call(
        &mut self,
        binding: &ModuleBinding<'a>,
        namespace: Symbol,
        method: Symbol,
        args: &[Expr],
        line: u32,
    ) -> Result<GoExpr, CodegenError> {
        let method_name = self.interner.resolve(method).to_string();
        match binding {
            ModuleBinding::Runtime(def) => {
                let func = def.function(&method_name).ok_or_else(|| CodegenError::UnknownModuleFunction {
                    namespace: self.interner.resolve(namespace).to_string(),
                    function: method_name.clone(),
                    line,
                })?;
                for import in def.go_imports {
                    // Module imports ride along on the file's import set;
                    // recorded via a dedicated helper-free path since they
                    // aren't part of the Helper catalog.
                    self.module_imports.insert(import);
                }
                self.render_module_function(func, args)
            }
            ModuleBinding::Bridge(package) => {
                let func = self
                    .bridge
                    .function(package, &method_name)
                    .ok_or_else(|| CodegenError::UnknownModuleFunction {
                        namespace: self.interner.resolve(namespace).to_string(),
                        function: method_name.clone(),
                        line,
                    })?;
                if let Some(import) = self.bridge.go_import_for(package) {
                    self.module_imports.insert(import);
                }
                self.render_module_function(func, args)
            }
            ModuleBinding::Local { prefix } => {
                let mut rendered = Vec::with_capacity(args.len());
                for a in args {
                    rendered.push(self.expr(a)?.0);
                }
                Ok(GoExpr::new(format!(
                    "{}_{}({})",
                    sanitize(prefix),
                    method_name,
                    rendered.join(", ")
                )))
            }
        }
    }

    fn render_module_function(&mut self, func: &ModuleFunctionDef, args: &[Expr]) -> Result<GoExpr, CodegenError> {
        let mut rendered = Vec::with_capacity(args.len());
        for a in args {
            rendered.push(self.expr(a)?.0);
        }
        let mut template = func.go_template.to_string();
        for (i, arg) in rendered.iter().enumerate() {
            template = template.replace(&format!("{{{}}}", i), arg);
        }
        Ok(GoExpr::new(template))
    }

    fn lower_try(&mut self, body: &Expr, default: Option<&Expr>) -> Result<GoExpr, CodegenError> {
        let inner = self.lambda_return_block(body)?;
        self.helpers.require(Helper::TaskHandle);
        self.helpers.require(Helper::Spawn);
        let default_rendered = match default {
            Some(d) => self.expr(d)?.0,
            None => "nil".to_string(),
        };
        // Self-calling block with a deferred recover (§4.5 "Error signaling").
        Ok(GoExpr::new(format!(
            "func() (result interface{{}}) {{ defer func() {{ if r := recover(); r != nil {{ result = {} }} }}(); return (func() interface{{}} {{ return {} }})() }}()",
            default_rendered,
            strip_func_literal_call(&inner)
        )))
    }

    fn lower_try_handler(
        &mut self,
        body: &Expr,
        err_name: Symbol,
        handler: &[Stmt],
    ) -> Result<GoExpr, CodegenError> {
        let inner = self.lambda_return_block(body)?;
        let err_var = self.interner.resolve(err_name).to_string();
        let handler_body = self.block_with_hoist(handler)?;
        let rendered_handler = self.render_func_literal(&[], &handler_body);
        Ok(GoExpr::new(format!(
            "func() (result interface{{}}) {{ defer func() {{ if r := recover(); r != nil {{ {} := fmt.Sprintf(\"%v\", r); result = (func() interface{{}} {{ {} = {}; return {}() }})() }} }}(); return (func() interface{{}} {{ return {} }})() }}()",
            err_var,
            err_var,
            err_var,
            rendered_handler,
            strip_func_literal_call(&inner)
        )))
    }

    fn lambda_return_block(&mut self, expr: &Expr) -> Result<String, CodegenError> {
        let v = self.expr(expr)?;
        Ok(format!("func() interface{{}} {{ return {} }}", v.as_str()))
    }

    /// Renders a lambda/handler body as a Go func literal. Delegates the
    /// actual statement rendering to the printer (§4.6) so lambda bodies
    /// get the same `if`/`for` support as top-level functions instead of
    /// a straight-line-only subset.
    fn render_func_literal(&self, params: &[String], body: &[GoStmt]) -> String {
        let rendered = crate::printer::render_inline_block(body);
        format!(
            "func({}) interface{{}} {{\n{}\n}}",
            params.join(", "),
            rendered
        )
    }
}

fn strip_func_literal_call(s: &str) -> String {
    s.to_string()
}

/// Gathers every `Assign` target reachable within a function scope without
/// crossing into a nested Go scope (a nested `FunctionDef`, or a `Lambda`/
/// `Try*`'s own body, which aren't `Stmt`s and so aren't visited here).
/// Used by `block_with_hoist` and the top-level main sequence to pre-`var`
/// every name the scope will ever assign.
fn collect_assign_targets(stmts: &[Stmt], out: &mut Vec<Symbol>, seen: &mut HashSet<Symbol>) {
    for stmt in stmts {
        match &stmt.kind {
            StmtKind::Assign { target, .. } => {
                if seen.insert(*target) {
                    out.push(*target);
                }
            }
            StmtKind::If { branches, else_branch } => {
                for (_, body) in branches {
                    collect_assign_targets(body, out, seen);
                }
                if let Some(body) = else_branch {
                    collect_assign_targets(body, out, seen);
                }
            }
            StmtKind::While { body, .. } => collect_assign_targets(body, out, seen),
            StmtKind::ForIn { body, .. } => collect_assign_targets(body, out, seen),
            _ => {}
        }
    }
}

fn default_namespace(reference: &str) -> String {
    let trimmed = reference.split('@').next().unwrap_or(reference);
    let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
    let stem = last.strip_suffix(".rugo").or_else(|| last.strip_suffix(".rg")).unwrap_or(last);
    stem.to_string()
}

pub(crate) fn local_module_path(reference: &str) -> String {
    if reference.ends_with(".rugo") || reference.ends_with(".rg") {
        reference.to_string()
    } else {
        format!("{}.rugo", reference)
    }
}

pub(crate) fn is_remote_reference(reference: &str) -> bool {
    let without_version = reference.split('@').next().unwrap_or(reference);
    without_version.matches('/').count() >= 2 && !reference.starts_with('.')
}

fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expr, Program, Stmt, StmtKind, StructDef};

    fn fresh<'a>(
        interner: &'a mut Interner,
        modules: &'a ModuleRegistry,
        bridge: &'a StdlibBridge,
        remote: &'a NoRemoteModules,
    ) -> Codegen<'a> {
        Codegen::new(interner, modules, bridge, remote, PathBuf::from("."))
    }

    #[test]
    fn integer_addition_uses_typed_fast_path() {
        let mut interner = Interner::new();
        let modules = ModuleRegistry::standard();
        let bridge = StdlibBridge::standard();
        let remote = NoRemoteModules;
        let mut cg = fresh(&mut interner, &modules, &bridge, &remote);
        let mut lhs = Expr::new(ExprKind::Int(1), 1);
        lhs.ty = Some(TypeTag::Integer);
        let mut rhs = Expr::new(ExprKind::Int(2), 1);
        rhs.ty = Some(TypeTag::Integer);
        let result = cg.binary(BinOp::Add, &lhs, &rhs, TypeTag::Integer).unwrap();
        assert_eq!(result.0, "(int64(1) + int64(2))");
        assert!(cg.helpers.is_empty());
    }

    #[test]
    fn mismatched_types_fall_back_to_dynamic_helper() {
        let mut interner = Interner::new();
        let modules = ModuleRegistry::standard();
        let bridge = StdlibBridge::standard();
        let remote = NoRemoteModules;
        let mut cg = fresh(&mut interner, &modules, &bridge, &remote);
        let mut lhs = Expr::new(ExprKind::Int(1), 1);
        lhs.ty = Some(TypeTag::Integer);
        let mut rhs = Expr::new(ExprKind::Bool(true), 1);
        rhs.ty = Some(TypeTag::Boolean);
        let result = cg.binary(BinOp::Add, &lhs, &rhs, TypeTag::Unknown).unwrap();
        assert!(result.0.starts_with("rugo_add("));
    }

    #[test]
    fn string_literal_with_interpolation_concatenates() {
        let mut interner = Interner::new();
        let modules = ModuleRegistry::standard();
        let bridge = StdlibBridge::standard();
        let remote = NoRemoteModules;
        let mut cg = fresh(&mut interner, &modules, &bridge, &remote);
        let mut inner = Expr::new(ExprKind::Int(5), 1);
        inner.ty = Some(TypeTag::Integer);
        let parts = vec![
            StrPart::Literal("x is ".to_string()),
            StrPart::Interpolation(Box::new(inner)),
        ];
        let rendered = cg.string_literal(&parts).unwrap();
        assert!(rendered.contains("rugo_to_string"));
    }

    #[test]
    fn struct_ctor_builds_map_literal_in_field_order() {
        let mut interner = Interner::new();
        let modules = ModuleRegistry::standard();
        let bridge = StdlibBridge::standard();
        let remote = NoRemoteModules;
        let mut cg = fresh(&mut interner, &modules, &bridge, &remote);
        let name = cg.interner.intern("Point");
        let x = cg.interner.intern("x");
        let y = cg.interner.intern("y");
        let def = StructDef {
            name,
            fields: vec![x, y],
            line: 1,
        };
        let f = cg.struct_ctor(&def);
        assert_eq!(f.name, "Point");
        assert_eq!(f.params.len(), 2);
    }

    #[test]
    fn unknown_module_reference_errors() {
        let mut interner = Interner::new();
        let modules = ModuleRegistry::standard();
        let bridge = StdlibBridge::standard();
        let remote = NoRemoteModules;
        let mut cg = fresh(&mut interner, &modules, &bridge, &remote);
        let decl = UseDecl {
            keyword: ModuleKeyword::Use,
            reference: "./nonexistent_module_file".to_string(),
            alias: None,
            with_list: vec![],
        };
        let err = cg.bind_namespace(&decl, 1).unwrap_err();
        assert!(matches!(err, CodegenError::LocalModuleNotFound { .. }));
    }

    #[test]
    fn duplicate_module_path_is_rejected() {
        let mut interner = Interner::new();
        let modules = ModuleRegistry::standard();
        let bridge = StdlibBridge::standard();
        let remote = NoRemoteModules;
        let mut cg = fresh(&mut interner, &modules, &bridge, &remote);
        let decl = UseDecl {
            keyword: ModuleKeyword::Use,
            reference: "str".to_string(),
            alias: None,
            with_list: vec![],
        };
        cg.bind_namespace(&decl, 1).unwrap();
        let err = cg.bind_namespace(&decl, 2).unwrap_err();
        assert!(matches!(err, CodegenError::DuplicateModulePath { .. }));
    }

    #[test]
    fn remote_reference_is_detected_by_slash_count() {
        assert!(is_remote_reference("github.com/user/repo"));
        assert!(is_remote_reference("github.com/user/repo@v1.0.0"));
        assert!(!is_remote_reference("helpers"));
        assert!(!is_remote_reference("./lib/foo"));
    }
}
