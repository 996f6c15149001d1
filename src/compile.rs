//! End-to-end compilation pipeline (§2, §4): Rugo source → preprocess →
//! lex → parse → walk → infer → codegen → print → `go build`/`go run`.
//!
//! Generalizes the teacher's `compile_to_rust` → `compile_to_dir` →
//! `compile_and_run` chain to a Go backend: instead of embedding a runtime
//! crate via `include_str!` and shelling `cargo`, the printer emits plain
//! Go source carrying its own runtime helpers inline (§4.6), and this
//! module shells `go build`/`go run` against it.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::ast::Program;
use crate::codegen::{Codegen, CodegenError, GoFile, RemoteModuleSource};
use crate::config::ToolchainConfig;
use crate::inference::Inference;
use crate::intern::Interner;
use crate::lexer::{LexError, Lexer};
use crate::modules::{ModuleRegistry, StdlibBridge};
use crate::parser::grammar::{parse_program, ParseError};
use crate::preprocessor::{preprocess, PreprocessError};
use crate::printer::print_file;
use crate::resolver::{parse_ref, LockFile, Resolver};
use crate::walker::{walk_program, WalkError};

/// Runs preprocess → lex → parse → walk → infer, producing a typed AST.
/// Referenced by `codegen.rs::inline_local_module` to recursively compile
/// required files with the same front end as the entry point.
pub fn parse_to_ast(source: &str, interner: &mut Interner) -> Result<Program, FrontendError> {
    let preprocessed = preprocess(source).map_err(FrontendError::Preprocess)?;
    let mut lexer = Lexer::new(&preprocessed.text, &preprocessed.line_map, interner);
    let tokens = lexer.tokenize().map_err(FrontendError::Lex)?;
    let nodes = parse_program(tokens, interner).map_err(FrontendError::Parse)?;
    let mut program = walk_program(nodes, interner).map_err(FrontendError::Walk)?;
    Inference::run(&mut program, interner);
    Ok(program)
}

#[derive(Debug)]
pub enum FrontendError {
    Preprocess(PreprocessError),
    Lex(LexError),
    Parse(ParseError),
    Walk(WalkError),
}

impl std::fmt::Display for FrontendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Preprocess(e) => write!(f, "{}", e),
            Self::Lex(e) => write!(f, "{}", e),
            Self::Parse(e) => write!(f, "{}", e),
            Self::Walk(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for FrontendError {}

/// Bridges the resolver (§4.7) into codegen's narrow `RemoteModuleSource`
/// seam. Codegen calls `resolve` expecting a plain `Option<PathBuf>`; any
/// resolver failure is stashed here so `compile_to_go` can surface the real
/// message instead of codegen's generic "not resolved" line.
struct ResolverBridge<'a> {
    resolver: std::cell::RefCell<Resolver<'a>>,
    last_error: std::cell::RefCell<Option<String>>,
}

impl<'a> ResolverBridge<'a> {
    fn new(config: &'a ToolchainConfig, lock: &'a mut LockFile) -> Self {
        ResolverBridge {
            resolver: std::cell::RefCell::new(Resolver::new(config, lock)),
            last_error: std::cell::RefCell::new(None),
        }
    }

    fn take_error(&self) -> Option<String> {
        self.last_error.borrow_mut().take()
    }
}

impl<'a> RemoteModuleSource for ResolverBridge<'a> {
    fn resolve(&self, reference: &str) -> Option<PathBuf> {
        let module_ref = match parse_ref(reference) {
            Ok(r) => r,
            Err(e) => {
                *self.last_error.borrow_mut() = Some(e.to_string());
                return None;
            }
        };
        match self.resolver.borrow_mut().resolve(&module_ref) {
            Ok(dir) => Some(dir),
            Err(e) => {
                *self.last_error.borrow_mut() = Some(e.to_string());
                None
            }
        }
    }
}

#[derive(Debug)]
pub enum CompileError {
    Frontend(FrontendError),
    Codegen(CodegenError),
    Remote(String),
    Io(String),
    Toolchain(String),
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Frontend(e) => write!(f, "{}", e),
            Self::Codegen(e) => write!(f, "{}", e),
            Self::Remote(e) => write!(f, "{}", e),
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::Toolchain(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<FrontendError> for CompileError {
    fn from(e: FrontendError) -> Self {
        CompileError::Frontend(e)
    }
}

impl From<CodegenError> for CompileError {
    fn from(e: CodegenError) -> Self {
        CompileError::Codegen(e)
    }
}

/// Compiles a Rugo entry file down to the output AST (§4.5), resolving any
/// remote `require`s against `config`'s module cache and lock file. This is
/// the shared step behind `compile_to_go`, `compile_to_dir`, and the `rats`
/// harness, which additionally needs the raw `test_registry`/`bench_registry`
/// metadata that printing to text would discard.
pub fn compile_to_go_file(
    entry_path: &Path,
    config: &ToolchainConfig,
    lock: &mut LockFile,
) -> Result<GoFile, CompileError> {
    log::debug!("compiling {}", entry_path.display());
    let source = fs::read_to_string(entry_path).map_err(|e| CompileError::Io(e.to_string()))?;
    let mut interner = Interner::new();
    let program = parse_to_ast(&source, &mut interner)?;

    let modules = ModuleRegistry::standard();
    let bridge = StdlibBridge::standard();
    let remote = ResolverBridge::new(config, lock);
    let base_dir = entry_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut codegen = Codegen::new(&mut interner, &modules, &bridge, &remote, base_dir);
    let entry_file = entry_path.display().to_string();
    codegen.lower_program(&program, &entry_file).map_err(|e| {
        if let Some(remote_err) = remote.take_error() {
            CompileError::Remote(remote_err)
        } else {
            CompileError::Codegen(e)
        }
    })
}

/// Compiles a Rugo entry file to Go source text (§4.6).
pub fn compile_to_go(
    entry_path: &Path,
    config: &ToolchainConfig,
    lock: &mut LockFile,
) -> Result<String, CompileError> {
    let go_file = compile_to_go_file(entry_path, config, lock)?;
    Ok(print_file(&go_file))
}

/// Renders a `rugo_test.go` harness driving every registered test/benchmark
/// through a single real `go test` entry point (§5 "Parallel test file
/// execution" runs each compiled harness as its own child process; `go
/// test` supplies the actual `*testing.T`/`*testing.B` machinery our
/// generated `RugoTest_N`/`RugoBench_N` functions only borrow).
fn render_test_harness(go_file: &GoFile) -> Option<String> {
    if go_file.test_registry.is_empty() && go_file.bench_registry.is_empty() {
        return None;
    }
    let mut out = String::from("package main\n\nimport \"testing\"\n\n");
    if !go_file.test_registry.is_empty() {
        out.push_str("func TestRugo(t *testing.T) {\n");
        for entry in &go_file.test_registry {
            out.push_str(&format!(
                "\tt.Run({:?}, func(t *testing.T) {{ {}(t) }})\n",
                entry.name, entry.go_name
            ));
        }
        out.push_str("}\n\n");
    }
    if !go_file.bench_registry.is_empty() {
        out.push_str("func BenchmarkRugo(b *testing.B) {\n");
        for entry in &go_file.bench_registry {
            out.push_str(&format!(
                "\tb.Run({:?}, func(b *testing.B) {{ {}(b) }})\n",
                entry.name, entry.go_name
            ));
        }
        out.push_str("}\n\n");
    }
    Some(out)
}

/// Writes a generated Go source file plus a `go.mod`, pulling in any
/// module dependencies via `go mod tidy` rather than hand-pinning versions
/// (§4.7 keeps the resolver's own dependency footprint at zero; the Go
/// toolchain is the only thing that needs network access to actually
/// resolve third-party Go module versions).
pub fn compile_to_dir(
    entry_path: &Path,
    output_dir: &Path,
    config: &ToolchainConfig,
    lock: &mut LockFile,
) -> Result<bool, CompileError> {
    let go_file = compile_to_go_file(entry_path, config, lock)?;
    let go_source = print_file(&go_file);
    let harness = render_test_harness(&go_file);

    fs::create_dir_all(output_dir).map_err(|e| CompileError::Io(e.to_string()))?;
    fs::write(output_dir.join("main.go"), go_source).map_err(|e| CompileError::Io(e.to_string()))?;
    let has_harness = harness.is_some();
    if let Some(harness) = harness {
        fs::write(output_dir.join("rugo_test.go"), harness).map_err(|e| CompileError::Io(e.to_string()))?;
    }

    let go_mod = "module rugo_output\n\ngo 1.21\n";
    fs::write(output_dir.join("go.mod"), go_mod).map_err(|e| CompileError::Io(e.to_string()))?;

    let tidy = Command::new("go")
        .arg("mod")
        .arg("tidy")
        .current_dir(output_dir)
        .output()
        .map_err(|e| CompileError::Toolchain(e.to_string()))?;
    if !tidy.status.success() {
        let stderr = String::from_utf8_lossy(&tidy.stderr);
        return Err(CompileError::Toolchain(format!("go mod tidy failed: {}", stderr)));
    }

    Ok(has_harness)
}

/// Compiles to a temporary directory and runs `go build -o OUT`.
pub fn build(entry_path: &Path, out_path: &Path, config: &ToolchainConfig, lock: &mut LockFile) -> Result<(), CompileError> {
    let build_dir = tempfile::tempdir().map_err(|e| CompileError::Io(e.to_string()))?;
    compile_to_dir(entry_path, build_dir.path(), config, lock)?;

    let abs_out = std::env::current_dir()
        .map(|cwd| cwd.join(out_path))
        .unwrap_or_else(|_| out_path.to_path_buf());

    let output = Command::new("go")
        .args(["build", "-o"])
        .arg(&abs_out)
        .arg(".")
        .current_dir(build_dir.path())
        .output()
        .map_err(|e| CompileError::Toolchain(e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CompileError::Toolchain(stderr.to_string()));
    }

    Ok(())
}

/// Compiles and runs a Rugo program, passing `args` through and returning
/// the child's exit code (§6 "Exit codes").
pub fn run(
    entry_path: &Path,
    args: &[String],
    config: &ToolchainConfig,
    lock: &mut LockFile,
) -> Result<i32, CompileError> {
    let build_dir = tempfile::tempdir().map_err(|e| CompileError::Io(e.to_string()))?;
    compile_to_dir(entry_path, build_dir.path(), config, lock)?;

    let status = Command::new("go")
        .arg("run")
        .arg(".")
        .args(args)
        .current_dir(build_dir.path())
        .status()
        .map_err(|e| CompileError::Toolchain(e.to_string()))?;

    Ok(status.code().unwrap_or(1))
}

/// Emits the generated Go source to stdout without invoking the Go
/// toolchain at all (`rugo emit`, §6).
pub fn emit(entry_path: &Path, config: &ToolchainConfig, lock: &mut LockFile) -> Result<String, CompileError> {
    compile_to_go(entry_path, config, lock)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ToolchainConfig {
        ToolchainConfig {
            module_dir: PathBuf::from("/tmp/rugo-test-modules"),
            tools_dir: PathBuf::from("/tmp/rugo-test-tools"),
            frozen: false,
        }
    }

    #[test]
    fn compiles_simple_program_to_go() {
        let dir = tempfile::tempdir().unwrap();
        let entry = dir.path().join("main.rugo");
        fs::write(&entry, "puts \"hello\"\n").unwrap();

        let config = test_config();
        let mut lock = LockFile::new();
        let go_source = compile_to_go(&entry, &config, &mut lock).expect("should compile");
        assert!(go_source.contains("package main"));
        assert!(go_source.contains("func main()"));
    }

    #[test]
    fn rejects_unresolvable_local_module() {
        let dir = tempfile::tempdir().unwrap();
        let entry = dir.path().join("main.rugo");
        fs::write(&entry, "require \"does_not_exist\"\n").unwrap();

        let config = test_config();
        let mut lock = LockFile::new();
        let result = compile_to_go(&entry, &config, &mut lock);
        assert!(result.is_err());
    }
}
