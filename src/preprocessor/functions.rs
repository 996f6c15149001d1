//! Function definition scanning (§4.1, stage 4).
//!
//! Walks the (heredoc/comment/struct-expanded) source to build the
//! *user-function set*: name -> arity, plus whether the trailing parameter
//! is a splat (`*rest`). The main preprocess pass (stage 5) consults this
//! set to tell a paren-free user function call apart from a bare shell
//! command. This mirrors the teacher's `DiscoveryPass` shape: a cheap
//! pre-scan that produces a lookup table for the pass that follows it,
//! rather than a full parse.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserFunction {
    pub arity: usize,
    pub variadic: bool,
}

pub fn scan_user_functions(source: &str) -> HashMap<String, UserFunction> {
    let mut functions = HashMap::new();

    for line in source.lines() {
        let trimmed = line.trim_start();
        let Some(rest) = trimmed.strip_prefix("def ") else {
            continue;
        };
        let Some(paren_start) = rest.find('(') else {
            continue;
        };
        let name = rest[..paren_start].trim();
        if name.is_empty() || !is_identifier(name) {
            continue;
        }
        let Some(paren_end) = rest[paren_start..].find(')') else {
            continue;
        };
        let params_src = &rest[paren_start + 1..paren_start + paren_end];
        let params: Vec<&str> = params_src
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        let variadic = params.last().is_some_and(|p| p.starts_with('*'));
        functions.insert(
            name.to_string(),
            UserFunction {
                arity: params.len(),
                variadic,
            },
        );
    }

    functions
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '?' || c == '!')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_zero_arg_function() {
        let fns = scan_user_functions("def greet()\n  puts \"hi\"\nend");
        assert_eq!(
            fns.get("greet"),
            Some(&UserFunction {
                arity: 0,
                variadic: false
            })
        );
    }

    #[test]
    fn records_arity_of_multi_arg_function() {
        let fns = scan_user_functions("def add(a, b)\n  return a + b\nend");
        assert_eq!(
            fns.get("add"),
            Some(&UserFunction {
                arity: 2,
                variadic: false
            })
        );
    }

    #[test]
    fn detects_variadic_trailing_param() {
        let fns = scan_user_functions("def log_all(prefix, *rest)\nend");
        assert_eq!(
            fns.get("log_all"),
            Some(&UserFunction {
                arity: 2,
                variadic: true
            })
        );
    }

    #[test]
    fn ignores_indented_nested_def_lines_the_same_way() {
        let fns = scan_user_functions("  def helper(x)\n  end");
        assert!(fns.contains_key("helper"));
    }

    #[test]
    fn scans_multiple_functions() {
        let fns = scan_user_functions("def a()\nend\ndef b(x, y, z)\nend");
        assert_eq!(fns.len(), 2);
        assert_eq!(fns["b"].arity, 3);
    }
}
