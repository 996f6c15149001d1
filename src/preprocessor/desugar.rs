//! The main preprocess pass (§4.1, stage 5) — the last and largest textual
//! transformation before lexing. Runs after heredoc expansion, comment
//! stripping, struct expansion, and function-definition scanning.
//!
//! `try`/`parallel` blocks lower to calls against two magic dispatch names,
//! `__rugo_try__`/`__rugo_try_or__`/`__rugo_parallel__`, each carrying its
//! body as a `lambda do ... end` block. This keeps the parser free of
//! dedicated `Try`/`Parallel` grammar: codegen's module dispatch mechanism
//! (§4.6/§4.7) recognizes these names and lowers them to the real
//! try/recover and spawn/collect Go code. The same trick handles backtick
//! capture (`__rugo_capture__`) and bare shell fallback (`__rugo_shell__`).
//!
//! Scope note: paren-free call conversion and the shell-command fallback
//! apply at *statement position* only (matching the wording of the rule
//! this stage implements) — they do not rewrite sub-expressions nested
//! inside a larger expression. Variable-binding tracking is flat across the
//! whole file rather than properly scope-nested; this is a deliberate
//! simplification for a pass that cannot be exercised against a real
//! grammar here.

use std::collections::HashSet;

use crate::preprocessor::functions::UserFunction;
use crate::preprocessor::scanner::{lines_inside_string, StringAwareScanner};
use crate::span::LineMap;
use std::collections::HashMap;

const MODULE_NAMESPACES: &[&str] = &["str", "http", "json", "web", "sqlite", "cli"];
const KNOWN_BUILTINS: &[&str] = &[
    "puts", "print", "len", "range", "type_of", "sleep", "raise",
];
const BLOCK_KEYWORDS: &[&str] = &[
    "if", "elsif", "else", "while", "for", "def", "do", "sandbox", "test", "benchmark",
];
const STATEMENT_KEYWORDS: &[&str] = &[
    "if", "elsif", "else", "end", "while", "for", "def", "return", "break", "next", "use",
    "import", "require", "as", "with", "raise", "or", "and", "not", "do", "lambda", "sandbox",
    "test", "benchmark",
];

pub fn preprocess_main(
    source: &str,
    user_fns: &HashMap<String, UserFunction>,
) -> (String, LineMap) {
    let (blocks_expanded, block_map) = desugar_blocks(source);
    let (statements_expanded, stmt_map) = desugar_statements(&blocks_expanded, user_fns);
    (statements_expanded, block_map.compose(&stmt_map))
}

// ---------------------------------------------------------------------
// Stage 5a: try / parallel block lowering.
// ---------------------------------------------------------------------

fn desugar_blocks(source: &str) -> (String, LineMap) {
    let lines: Vec<&str> = source.lines().collect();
    let protected = lines_inside_string(source);
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut map: Vec<u32> = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        if protected.get(i).copied().unwrap_or(false) {
            out.push(lines[i].to_string());
            map.push((i + 1) as u32);
            i += 1;
            continue;
        }
        let trimmed = lines[i].trim();
        let indent = leading_whitespace(lines[i]);

        if trimmed == "try" {
            let (body_end, or_at) = scan_try_block(&lines, i + 1);
            let body = &lines[i + 1..or_at.unwrap_or(body_end)];
            emit_lambda_call_open(&mut out, &mut map, indent, "__rugo_try__(", (i + 1) as u32);
            emit_block_body(&mut out, &mut map, body, i + 2);
            if let Some(or_line) = or_at {
                out.push(format!("{}end, lambda do", indent));
                map.push((or_line + 1) as u32);
                let fallback = &lines[or_line + 1..body_end];
                emit_block_body(&mut out, &mut map, fallback, or_line + 2);
                out.push(format!("{}end)", indent));
            } else {
                out.push(format!("{}end)", indent));
            }
            map.push((body_end + 1) as u32);
            i = body_end + 1;
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("try ") {
            if let Some((expr, err_name)) = split_try_or_err(rest) {
                let body_end = scan_block_end(&lines, i + 1);
                out.push(format!(
                    "{}__rugo_try_handler__(lambda do return {} end, \"{}\", lambda do",
                    indent, expr, err_name
                ));
                map.push((i + 1) as u32);
                emit_block_body(&mut out, &mut map, &lines[i + 1..body_end], i + 2);
                out.push(format!("{}end)", indent));
                map.push((body_end + 1) as u32);
                i = body_end + 1;
                continue;
            }
            if let Some((expr, default)) = split_try_or(rest) {
                out.push(format!(
                    "{}__rugo_try_or__(lambda do return {} end, lambda do return {} end)",
                    indent, expr, default
                ));
            } else {
                out.push(format!("{}__rugo_try__(lambda do return {} end)", indent, rest));
            }
            map.push((i + 1) as u32);
            i += 1;
            continue;
        }

        if trimmed == "parallel" {
            let assign_prefix: Option<&str> = None;
            let body_end = scan_block_end(&lines, i + 1);
            emit_parallel(&mut out, &mut map, indent, assign_prefix, &lines[i + 1..body_end], i + 2);
            i = body_end + 1;
            continue;
        }

        if let Some(eq_pos) = trimmed.find('=') {
            let (lhs, rhs) = trimmed.split_at(eq_pos);
            let rhs = rhs[1..].trim();
            if rhs == "parallel" && !lhs.trim().is_empty() && is_plain_assign(trimmed, eq_pos) {
                let body_end = scan_block_end(&lines, i + 1);
                emit_parallel(
                    &mut out,
                    &mut map,
                    indent,
                    Some(lhs.trim()),
                    &lines[i + 1..body_end],
                    i + 2,
                );
                i = body_end + 1;
                continue;
            }
        }

        out.push(lines[i].to_string());
        map.push((i + 1) as u32);
        i += 1;
    }

    (out.join("\n"), LineMap::from_entries(map))
}

fn is_plain_assign(trimmed: &str, eq_pos: usize) -> bool {
    eq_pos > 0
        && !matches!(
            trimmed.as_bytes().get(eq_pos - 1),
            Some(b'=') | Some(b'!') | Some(b'<') | Some(b'>') | Some(b'+') | Some(b'-')
                | Some(b'*') | Some(b'/') | Some(b'%')
        )
        && trimmed.as_bytes().get(eq_pos + 1) != Some(&b'=')
}

/// `try EXPR or err NAME` — the named error-handler form, which continues
/// onto following lines up to a matching `end` (unlike `try EXPR or
/// DEFAULT`, which is a single complete line). Returns `None` unless the
/// text after `or` is exactly `err` followed by one identifier.
fn split_try_or_err(rest: &str) -> Option<(String, String)> {
    let idx = find_top_level_word(rest, "or")?;
    let expr = rest[..idx].trim().to_string();
    let after_or = rest[idx + 2..].trim();
    let err_name = after_or.strip_prefix("err ")?.trim();
    if err_name.is_empty() || !is_identifier(err_name) {
        return None;
    }
    Some((expr, err_name.to_string()))
}

fn split_try_or(rest: &str) -> Option<(String, String)> {
    let idx = find_top_level_word(rest, "or")?;
    let expr = rest[..idx].trim().to_string();
    let default = rest[idx + 2..].trim().to_string();
    Some((expr, default))
}

fn find_top_level_word(text: &str, word: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut scanner = StringAwareScanner::new();
    let mut depth: i32 = 0;
    let mut idx = 0;
    while idx < bytes.len() {
        let was_in_string = scanner.in_string();
        scanner.advance(bytes[idx]);
        if !was_in_string {
            match bytes[idx] {
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => depth -= 1,
                _ => {}
            }
            if depth == 0
                && text[idx..].starts_with(word)
                && (idx == 0 || !text.as_bytes()[idx - 1].is_ascii_alphanumeric())
            {
                let end = idx + word.len();
                if end >= bytes.len() || !bytes[end].is_ascii_alphanumeric() {
                    return Some(idx);
                }
            }
        }
        idx += 1;
    }
    None
}

fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

fn opens_block(trimmed: &str) -> bool {
    let first_word = trimmed.split_whitespace().next().unwrap_or("");
    BLOCK_KEYWORDS.contains(&first_word) || trimmed.ends_with(" do") || trimmed == "try"
        || trimmed == "parallel"
}

/// Scans forward from `start` (0-indexed) for the `end` that closes the
/// block opened one level up, tracking nested openers so an inner block's
/// `end` doesn't terminate the outer one early. Returns the 0-indexed line
/// of that `end`.
fn scan_block_end(lines: &[&str], start: usize) -> usize {
    let mut depth = 0;
    let mut j = start;
    while j < lines.len() {
        let t = lines[j].trim();
        if t == "end" {
            if depth == 0 {
                return j;
            }
            depth -= 1;
        } else if opens_block(t) {
            depth += 1;
        }
        j += 1;
    }
    lines.len()
}

/// Like `scan_block_end` but also reports a top-level `or` separator, for
/// `try` blocks.
fn scan_try_block(lines: &[&str], start: usize) -> (usize, Option<usize>) {
    let mut depth = 0;
    let mut or_line = None;
    let mut j = start;
    while j < lines.len() {
        let t = lines[j].trim();
        if t == "end" {
            if depth == 0 {
                return (j, or_line);
            }
            depth -= 1;
        } else if t == "or" && depth == 0 {
            or_line = Some(j);
        } else if opens_block(t) {
            depth += 1;
        }
        j += 1;
    }
    (lines.len(), or_line)
}

fn emit_lambda_call_open(out: &mut Vec<String>, map: &mut Vec<u32>, indent: &str, prefix: &str, orig: u32) {
    out.push(format!("{}{}lambda do", indent, prefix));
    map.push(orig);
}

fn emit_block_body(out: &mut Vec<String>, map: &mut Vec<u32>, body: &[&str], first_orig: usize) {
    for (k, line) in body.iter().enumerate() {
        out.push(line.to_string());
        map.push((first_orig + k) as u32);
    }
}

fn emit_parallel(
    out: &mut Vec<String>,
    map: &mut Vec<u32>,
    indent: &str,
    assign: Option<&str>,
    body: &[&str],
    first_orig: usize,
) {
    let stmts: Vec<&str> = body.iter().map(|l| l.trim()).filter(|l| !l.is_empty()).collect();
    match assign {
        Some(name) => out.push(format!("{}{} = __rugo_parallel__(", indent, name)),
        None => out.push(format!("{}__rugo_parallel__(", indent)),
    }
    map.push(first_orig as u32);
    for (idx, stmt) in stmts.iter().enumerate() {
        let sep = if idx + 1 < stmts.len() { "," } else { "" };
        out.push(format!("{}  lambda do return {} end{}", indent, stmt, sep));
        map.push((first_orig + idx) as u32);
    }
    out.push(format!("{})", indent));
    map.push((first_orig + stmts.len()) as u32);
}

// ---------------------------------------------------------------------
// Stage 5b: per-statement desugaring (compound/destructuring assignment,
// backtick capture, paren-free calls, bare shell fallback).
// ---------------------------------------------------------------------

fn desugar_statements(source: &str, user_fns: &HashMap<String, UserFunction>) -> (String, LineMap) {
    let mut assigned: HashSet<String> = HashSet::new();
    let lines: Vec<&str> = source.lines().collect();
    let protected = lines_inside_string(source);
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut map: Vec<u32> = Vec::with_capacity(lines.len());
    let mut temp_counter = 0usize;

    for (i, raw_line) in lines.iter().enumerate() {
        let orig = (i + 1) as u32;

        // Body content of a still-open heredoc-expanded string literal is
        // never a statement — leave it untouched.
        if protected.get(i).copied().unwrap_or(false) {
            out.push(raw_line.to_string());
            map.push(orig);
            continue;
        }

        let indent = leading_whitespace(raw_line);
        let line = expand_backticks(raw_line);
        let trimmed = line.trim();

        if trimmed.is_empty() {
            out.push(line);
            map.push(orig);
            continue;
        }

        let first_word = trimmed.split_whitespace().next().unwrap_or("");
        if STATEMENT_KEYWORDS.contains(&first_word) || trimmed == "end" {
            if first_word == "for" {
                if let Some(binding) = parse_for_binding(trimmed) {
                    assigned.insert(binding);
                }
            }
            out.push(line);
            map.push(orig);
            continue;
        }

        if let Some((eq_pos, kind)) = find_top_level_assign(trimmed) {
            let lhs = trimmed[..eq_pos].trim();
            let rhs_start = eq_pos + kind.len();
            let rhs = trimmed[rhs_start..].trim();

            if let Some(targets) = destructure_targets(lhs) {
                let tmp = format!("__rugo_destructure{}", temp_counter);
                temp_counter += 1;
                out.push(format!("{}{} = {}", indent, tmp, canonicalize_rhs(rhs, user_fns)));
                map.push(orig);
                for (idx, target) in targets.iter().enumerate() {
                    assigned.insert(target.clone());
                    out.push(format!("{}{} = {}[{}]", indent, target, tmp, idx));
                    map.push(orig);
                }
                continue;
            }

            if kind != "=" {
                let op = &kind[..kind.len() - 1];
                assigned.insert(lhs.to_string());
                out.push(format!(
                    "{}{} = {} {} ({})",
                    indent,
                    lhs,
                    lhs,
                    op,
                    canonicalize_rhs(rhs, user_fns)
                ));
                map.push(orig);
                continue;
            }

            assigned.insert(lhs.to_string());
            out.push(format!("{}{} = {}", indent, lhs, canonicalize_rhs(rhs, user_fns)));
            map.push(orig);
            continue;
        }

        // No top-level assignment: a bare statement.
        out.push(format!("{}{}", indent, classify_statement(trimmed, user_fns, &assigned)));
        map.push(orig);
    }

    (out.join("\n"), LineMap::from_entries(map))
}

fn parse_for_binding(trimmed: &str) -> Option<String> {
    let rest = trimmed.strip_prefix("for ")?;
    let idx = find_top_level_word(rest, "in")?;
    Some(rest[..idx].trim().to_string())
}

/// Returns `(position_of_operator, operator_text)` for the first top-level
/// `=`, `+=`, `-=`, `*=`, `/=`, or `%=`, ignoring `==`, `!=`, `<=`, `>=`.
fn find_top_level_assign(line: &str) -> Option<(usize, &'static str)> {
    let bytes = line.as_bytes();
    let mut scanner = StringAwareScanner::new();
    let mut depth: i32 = 0;
    let mut idx = 0;
    while idx < bytes.len() {
        let was_in_string = scanner.in_string();
        scanner.advance(bytes[idx]);
        if was_in_string {
            idx += 1;
            continue;
        }
        match bytes[idx] {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b'=' if depth == 0 => {
                let prev = if idx > 0 { Some(bytes[idx - 1]) } else { None };
                let next = bytes.get(idx + 1).copied();
                if next == Some(b'=') {
                    idx += 2;
                    continue;
                }
                match prev {
                    Some(b'!') | Some(b'<') | Some(b'>') => {}
                    Some(b'+') => return Some((idx - 1, "+=")),
                    Some(b'-') => return Some((idx - 1, "-=")),
                    Some(b'*') => return Some((idx - 1, "*=")),
                    Some(b'/') => return Some((idx - 1, "/=")),
                    Some(b'%') => return Some((idx - 1, "%=")),
                    _ => return Some((idx, "=")),
                }
            }
            _ => {}
        }
        idx += 1;
    }
    None
}

fn destructure_targets(lhs: &str) -> Option<Vec<String>> {
    if !lhs.contains(',') {
        return None;
    }
    let targets: Vec<String> = lhs.split(',').map(|s| s.trim().to_string()).collect();
    if targets.iter().all(|t| is_identifier(t)) && targets.len() > 1 {
        Some(targets)
    } else {
        None
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '?' || c == '!')
}

fn canonicalize_rhs(rhs: &str, user_fns: &HashMap<String, UserFunction>) -> String {
    classify_call(rhs, user_fns).unwrap_or_else(|| rhs.to_string())
}

/// Attempts to read `rhs` as `name arg1, arg2` (no immediate opening paren)
/// where `name` is a known module-namespaced call, a user function, or a
/// known builtin, and rewrites it to canonical call syntax. Returns `None`
/// if `rhs` does not look like a paren-free call at all.
fn classify_call(text: &str, user_fns: &HashMap<String, UserFunction>) -> Option<String> {
    let mut parts = text.splitn(2, char::is_whitespace);
    let name = parts.next()?;
    let rest = parts.next().map(str::trim).unwrap_or("");

    if name.ends_with(')') || name.contains('(') {
        return None; // already canonical call syntax, or not a call at all
    }
    if rest.is_empty() {
        return None;
    }
    let namespaced = name.contains('.') && MODULE_NAMESPACES.contains(&name.split('.').next()?);
    let known = namespaced || user_fns.contains_key(name) || KNOWN_BUILTINS.contains(&name);
    if !known {
        return None;
    }
    Some(format!("{}({})", name, rest))
}

fn classify_statement(
    trimmed: &str,
    user_fns: &HashMap<String, UserFunction>,
    assigned: &HashSet<String>,
) -> String {
    if let Some(call) = classify_call(trimmed, user_fns) {
        return call;
    }
    // Already written in canonical call syntax (no space before the
    // opening paren) — leave it alone rather than shell-escaping it.
    if trimmed.ends_with(')') && trimmed.contains('(') {
        return trimmed.to_string();
    }
    let first_word = trimmed.split_whitespace().next().unwrap_or("");
    if trimmed == first_word {
        if user_fns.contains_key(first_word) {
            return format!("{}()", first_word);
        }
        if assigned.contains(first_word) {
            return trimmed.to_string();
        }
    }
    format!("__rugo_shell__(\"{}\")", escape_shell_text(trimmed))
}

fn escape_shell_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            other => out.push(other),
        }
    }
    out
}

/// Replaces every `` `cmd` `` span outside of double/single-quoted text
/// with a canonical `__rugo_capture__("cmd")` call.
fn expand_backticks(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_double = false;
    let mut in_single = false;
    let mut escaped = false;
    let bytes = line.as_bytes();
    let mut idx = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        if escaped {
            escaped = false;
            out.push(b as char);
            idx += 1;
            continue;
        }
        match b {
            b'\\' if in_double => {
                escaped = true;
                out.push(b as char);
            }
            b'"' if !in_single => {
                in_double = !in_double;
                out.push(b as char);
            }
            b'\'' if !in_double => {
                in_single = !in_single;
                out.push(b as char);
            }
            b'`' if !in_double && !in_single => {
                if let Some(close) = find_backtick_close(&line[idx + 1..]) {
                    let inner = &line[idx + 1..idx + 1 + close];
                    out.push_str("__rugo_capture__(\"");
                    out.push_str(&escape_shell_text(inner));
                    out.push_str("\")");
                    idx = idx + 1 + close + 1;
                    continue;
                }
                out.push(b as char);
            }
            _ => out.push(b as char),
        }
        idx += 1;
    }
    out
}

fn find_backtick_close(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' => escaped = true,
            b'`' => return Some(i),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fns() -> HashMap<String, UserFunction> {
        HashMap::new()
    }

    #[test]
    fn desugars_compound_assignment() {
        let (out, _) = preprocess_main("x += 1", &fns());
        assert_eq!(out, "x = x + (1)");
    }

    #[test]
    fn desugars_destructuring_assignment() {
        let (out, _) = preprocess_main("a, b = pair()", &fns());
        assert!(out.contains("__rugo_destructure0 = pair()"));
        assert!(out.contains("a = __rugo_destructure0[0]"));
        assert!(out.contains("b = __rugo_destructure0[1]"));
    }

    #[test]
    fn desugars_single_line_try() {
        let (out, _) = preprocess_main("try risky()", &fns());
        assert_eq!(out, "__rugo_try__(lambda do return risky() end)");
    }

    #[test]
    fn desugars_try_or() {
        let (out, _) = preprocess_main("try risky() or 0", &fns());
        assert_eq!(
            out,
            "__rugo_try_or__(lambda do return risky() end, lambda do return 0 end)"
        );
    }

    #[test]
    fn desugars_try_or_err_handler() {
        let src = "try risky() or err e\n  puts(e)\n  -1\nend";
        let (out, _) = preprocess_main(src, &fns());
        assert!(out.contains("__rugo_try_handler__(lambda do return risky() end, \"e\", lambda do"));
        assert!(out.contains("puts(e)"));
        assert!(out.contains("-1"));
    }

    #[test]
    fn desugars_try_block_with_or() {
        let src = "try\n  risky()\nor\n  0\nend";
        let (out, _) = preprocess_main(src, &fns());
        assert!(out.contains("__rugo_try__(lambda do"));
        assert!(out.contains("risky()"));
        assert!(out.contains("end, lambda do"));
        assert!(out.contains("0"));
    }

    #[test]
    fn desugars_parallel_block_with_assignment() {
        let src = "results = parallel\n  fetch_a()\n  fetch_b()\nend";
        let (out, _) = preprocess_main(src, &fns());
        assert!(out.contains("results = __rugo_parallel__("));
        assert!(out.contains("lambda do return fetch_a() end"));
        assert!(out.contains("lambda do return fetch_b() end"));
    }

    #[test]
    fn converts_known_builtin_paren_free_call_to_canonical_form() {
        let (out, _) = preprocess_main("puts \"hi\"", &fns());
        assert_eq!(out, "puts(\"hi\")");
    }

    #[test]
    fn converts_namespaced_paren_free_call() {
        let (out, _) = preprocess_main("str.upcase name", &fns());
        assert_eq!(out, "str.upcase(name)");
    }

    #[test]
    fn already_canonical_call_with_no_space_before_paren_is_left_alone() {
        let (out, _) = preprocess_main("puts(name)", &fns());
        assert_eq!(out, "puts(name)");
    }

    #[test]
    fn unknown_bare_identifier_becomes_shell_command() {
        let (out, _) = preprocess_main("ls -la", &fns());
        assert_eq!(out, "__rugo_shell__(\"ls -la\")");
    }

    #[test]
    fn previously_assigned_variable_is_left_as_bare_read() {
        let src = "x = 1\nx";
        let (out, _) = preprocess_main(src, &fns());
        assert!(out.ends_with("x"));
        assert!(!out.contains("__rugo_shell__(\"x\")"));
    }

    #[test]
    fn expands_backtick_capture() {
        let (out, _) = preprocess_main("out = `ls -la`", &fns());
        assert_eq!(out, "out = __rugo_capture__(\"ls -la\")");
    }

    #[test]
    fn equality_operator_is_not_mistaken_for_assignment() {
        let (out, _) = preprocess_main("if x == 1", &fns());
        assert_eq!(out, "if x == 1");
    }
}
