//! Comment stripping (§4.1, stage 2): remove `#`-to-end-of-line content,
//! but only outside string literals. Runs after heredoc expansion, whose
//! output is a string literal that can itself span several physical lines
//! — so the scanner here must carry its quote state *across* line
//! boundaries rather than reset at each newline, or a `#` inside a
//! multi-line heredoc body would be mistaken for a real comment.
//!
//! Never changes the line count, so the composed line map is identity.

use crate::preprocessor::scanner::StringAwareScanner;
use crate::span::LineMap;

pub fn strip_comments(source: &str) -> (String, LineMap) {
    let mut scanner = StringAwareScanner::new();
    let mut out_lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut stripping = false;

    for byte in source.bytes() {
        if byte == b'\n' {
            out_lines.push(if stripping {
                current.trim_end().to_string()
            } else {
                std::mem::take(&mut current)
            });
            current.clear();
            stripping = false;
            continue;
        }
        if stripping {
            continue;
        }
        let was_in_string = scanner.in_string();
        scanner.advance(byte);
        if byte == b'#' && !was_in_string {
            stripping = true;
            continue;
        }
        current.push(byte as char);
    }
    out_lines.push(if stripping {
        current.trim_end().to_string()
    } else {
        current
    });

    let text = out_lines.join("\n");
    (text, LineMap::identity(out_lines.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_comment() {
        let (out, _) = strip_comments("x = 1 # set x");
        assert_eq!(out, "x = 1");
    }

    #[test]
    fn strips_whole_line_comment() {
        let (out, _) = strip_comments("# just a comment\nx = 1");
        assert_eq!(out, "\nx = 1");
    }

    #[test]
    fn does_not_strip_hash_inside_string() {
        let (out, _) = strip_comments(r#"puts "a # b""#);
        assert_eq!(out, r#"puts "a # b""#);
    }

    #[test]
    fn preserves_line_count() {
        let (out, map) = strip_comments("a # one\nb # two\nc");
        assert_eq!(out.lines().count(), 3);
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn handles_multiple_quote_kinds_on_one_line() {
        let (out, _) = strip_comments(r#"x = "a" + 'b' # trailing"#);
        assert_eq!(out, r#"x = "a" + 'b'"#);
    }

    #[test]
    fn hash_inside_a_string_spanning_multiple_lines_is_not_a_comment() {
        // A heredoc-expanded multi-line string literal: the opening quote
        // is on line 1, the closing quote on line 3.
        let src = "message = \"\nhi # not a comment\n\"\nputs message";
        let (out, _) = strip_comments(src);
        assert!(out.contains("hi # not a comment"));
    }
}
