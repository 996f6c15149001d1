//! The printer (§4.6): walks the output AST (`codegen::GoFile`) and writes
//! Go source text, owning indentation, brace placement, and `//line`
//! directive emission so `go build`'s diagnostics point back at the
//! originating Rugo source line (§1 non-goal: no source-level debugger,
//! line directives are the substitute).
//!
//! `GoExpr` already carries fully-rendered text (codegen flattens
//! expressions to strings rather than a second structured tree — see
//! `codegen.rs`'s module doc), so the printer's only structural job is
//! statements, functions, and the file skeleton.

use crate::codegen::{GoExpr, GoFile, GoFunc, GoStmt};

const INDENT: &str = "\t";

pub fn print_file(file: &GoFile) -> String {
    log::debug!(
        "printing Go file: {} funcs, {} helpers, {} tests, {} benches",
        file.funcs.len(),
        file.helper_sources.len(),
        file.tests.len(),
        file.benches.len()
    );
    let mut out = String::new();

    out.push_str(&format!("package {}\n\n", file.package));

    if !file.imports.is_empty() {
        out.push_str("import (\n");
        for import in &file.imports {
            out.push_str(INDENT);
            out.push_str(&format!("{:?}\n", import));
        }
        out.push_str(")\n\n");
    }

    for source in &file.helper_sources {
        out.push_str(source);
        out.push_str("\n\n");
    }

    for ctor in &file.struct_ctors {
        print_func(&mut out, ctor);
    }

    for func in &file.funcs {
        print_func(&mut out, func);
    }

    for test in &file.tests {
        print_func(&mut out, test);
    }

    for bench in &file.benches {
        print_func(&mut out, bench);
    }

    out.push_str("func main() {\n");
    print_block(&mut out, &file.main_body, 1, &file.entry_file);
    out.push_str("}\n");

    out
}

fn print_func(out: &mut String, func: &GoFunc) {
    out.push_str(&format!(
        "func {}({}) {} {{\n",
        func.name,
        func.params.join(", "),
        func.results
    ));
    print_block(out, &func.body, 1, "");
    out.push_str("}\n\n");
}

fn print_block(out: &mut String, stmts: &[GoStmt], depth: usize, entry_file: &str) {
    for stmt in stmts {
        print_stmt(out, stmt, depth, entry_file);
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn print_stmt(out: &mut String, stmt: &GoStmt, depth: usize, entry_file: &str) {
    match stmt {
        GoStmt::LineDirective { line } => {
            if !entry_file.is_empty() {
                indent(out, depth);
                out.push_str(&format!("//line {}:{}\n", entry_file, line));
            }
        }
        GoStmt::Comment(text) => {
            indent(out, depth);
            out.push_str(&format!("// {}\n", text));
        }
        GoStmt::Blank => {
            out.push('\n');
        }
        GoStmt::Raw(text) => {
            indent(out, depth);
            out.push_str(text);
            out.push('\n');
        }
        GoStmt::Expr(e) => {
            indent(out, depth);
            out.push_str(&format_expr(e));
            out.push('\n');
        }
        GoStmt::Assign { name, value, declare } => {
            indent(out, depth);
            let op = if *declare { ":=" } else { "=" };
            out.push_str(&format!("{} {} {}\n", name, op, format_expr(value)));
        }
        GoStmt::IndexAssign { target, index, value } => {
            indent(out, depth);
            out.push_str(&format!(
                "rugo_index_set({}, {}, {})\n",
                format_expr(target),
                format_expr(index),
                format_expr(value)
            ));
        }
        GoStmt::Return(Some(e)) => {
            indent(out, depth);
            out.push_str(&format!("return {}\n", format_expr(e)));
        }
        GoStmt::Return(None) => {
            indent(out, depth);
            out.push_str("return\n");
        }
        GoStmt::If { cond, then_body, else_body } => {
            indent(out, depth);
            out.push_str(&format!("if {} {{\n", format_expr(cond)));
            print_block(out, then_body, depth + 1, entry_file);
            indent(out, depth);
            match else_body {
                Some(body) => {
                    out.push_str("} else {\n");
                    print_block(out, body, depth + 1, entry_file);
                    indent(out, depth);
                    out.push_str("}\n");
                }
                None => out.push_str("}\n"),
            }
        }
        GoStmt::For { cond, body } => {
            indent(out, depth);
            out.push_str(&format!("for {} {{\n", format_expr(cond)));
            print_block(out, body, depth + 1, entry_file);
            indent(out, depth);
            out.push_str("}\n");
        }
        GoStmt::ForRange {
            index,
            key,
            binding,
            iterable,
            body,
        } => {
            indent(out, depth);
            let idx = index.clone().unwrap_or_else(|| "_".to_string());
            match key {
                Some(k) => {
                    out.push_str(&format!(
                        "for {}, rugoPairVal := range rugo_range_pairs({}) {{\n",
                        idx,
                        format_expr(iterable)
                    ));
                    indent(out, depth + 1);
                    out.push_str(&format!("{} := rugoPairVal.Key\n", k));
                    indent(out, depth + 1);
                    out.push_str(&format!("{} := rugoPairVal.Value\n", binding));
                }
                None => out.push_str(&format!(
                    "for {}, {} := range rugo_range({}) {{\n",
                    idx,
                    binding,
                    format_expr(iterable)
                )),
            }
            print_block(out, body, depth + 1, entry_file);
            indent(out, depth);
            out.push_str("}\n");
        }
        GoStmt::Break => {
            indent(out, depth);
            out.push_str("break\n");
        }
        GoStmt::Continue => {
            indent(out, depth);
            out.push_str("continue\n");
        }
    }
}

fn format_expr(e: &GoExpr) -> String {
    e.to_string()
}

/// Renders a statement list as a standalone Go block body, newlines and
/// all, for embedding inside an expression-position func literal (lambda
/// bodies, try/spawn/parallel thunks — §4.5 "Concurrency lowering" wraps
/// these in self-calling blocks). No line directives: these bodies don't
/// carry their own entry file distinct from the enclosing statement's.
pub fn render_inline_block(stmts: &[GoStmt]) -> String {
    let mut out = String::new();
    print_block(&mut out, stmts, 0, "");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{GoFunc, GoTestEntry};
    use std::collections::BTreeSet;

    fn empty_file() -> GoFile {
        GoFile {
            package: "main".to_string(),
            imports: BTreeSet::new(),
            helper_sources: vec![],
            module_dependencies: vec![],
            struct_ctors: vec![],
            funcs: vec![],
            tests: vec![],
            test_registry: vec![],
            benches: vec![],
            bench_registry: vec![],
            main_body: vec![],
            entry_file: "main.rugo".to_string(),
        }
    }

    #[test]
    fn prints_package_header_and_empty_main() {
        let file = empty_file();
        let printed = print_file(&file);
        assert!(printed.starts_with("package main\n"));
        assert!(printed.contains("func main() {\n}\n"));
    }

    #[test]
    fn prints_imports_in_stable_order() {
        let mut file = empty_file();
        file.imports.insert("fmt");
        file.imports.insert("os");
        let printed = print_file(&file);
        let fmt_pos = printed.find("\"fmt\"").unwrap();
        let os_pos = printed.find("\"os\"").unwrap();
        assert!(fmt_pos < os_pos);
    }

    #[test]
    fn line_directive_uses_entry_file() {
        let mut file = empty_file();
        file.main_body.push(GoStmt::LineDirective { line: 42 });
        file.main_body.push(GoStmt::Expr(GoExpr("fmt.Println(1)".to_string())));
        let printed = print_file(&file);
        assert!(printed.contains("//line main.rugo:42"));
    }

    #[test]
    fn prints_user_functions_before_main() {
        let mut file = empty_file();
        file.funcs.push(GoFunc {
            name: "greet".to_string(),
            params: vec!["name interface{}".to_string()],
            results: "interface{}".to_string(),
            body: vec![GoStmt::Return(Some(GoExpr("name".to_string())))],
        });
        let printed = print_file(&file);
        let func_pos = printed.find("func greet(").unwrap();
        let main_pos = printed.find("func main() {").unwrap();
        assert!(func_pos < main_pos);
    }

    #[test]
    fn test_registry_metadata_survives_independent_of_printed_text() {
        let mut file = empty_file();
        file.test_registry.push(GoTestEntry {
            name: "adds numbers".to_string(),
            go_name: "RugoTest_0".to_string(),
        });
        assert_eq!(file.test_registry[0].name, "adds numbers");
    }
}
