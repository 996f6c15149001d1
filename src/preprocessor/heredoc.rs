//! Heredoc expansion (§4.1.1), the first preprocessor stage.
//!
//! Recognizes `<<DELIM`, `<<~DELIM`, `<<'DELIM'`, `<<~'DELIM'`. The body is
//! rewritten in place as a double-quoted string literal spanning the same
//! physical lines the heredoc occupied, which means this stage never
//! changes the line count — the composed line map for this stage is simply
//! the identity map.

use crate::preprocessor::scanner::StringAwareScanner;
use crate::span::LineMap;

#[derive(Debug)]
pub struct HeredocError {
    pub message: String,
    pub line: usize,
}

pub fn expand_heredocs(source: &str) -> Result<(String, LineMap), HeredocError> {
    let lines: Vec<&str> = source.lines().collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        match find_marker(line) {
            Some(marker) => {
                let (prefix, rest) = line.split_at(marker.start);
                let after_marker = &rest[marker.len..];
                if !after_marker.trim().is_empty() {
                    return Err(HeredocError {
                        message: format!(
                            "trailing content after heredoc marker on line {} is not supported",
                            i + 1
                        ),
                        line: i + 1,
                    });
                }

                // Collect the body until a line equal to the delimiter.
                let body_start = i + 1;
                let mut j = body_start;
                loop {
                    if j >= lines.len() {
                        return Err(HeredocError {
                            message: format!("unterminated heredoc <<{}", marker.delim),
                            line: i + 1,
                        });
                    }
                    let candidate = if marker.squiggly {
                        lines[j].trim_start()
                    } else {
                        lines[j]
                    };
                    if candidate == marker.delim {
                        break;
                    }
                    j += 1;
                }
                let body = &lines[body_start..j];

                let indent = if marker.squiggly {
                    common_indent(body)
                } else {
                    0
                };

                out.push(format!("{}\"", prefix));
                for body_line in body {
                    let stripped = strip_indent(body_line, indent);
                    out.push(escape_heredoc_line(stripped, marker.quoted));
                }
                out.push("\"".to_string());

                i = j + 1;
            }
            None => {
                out.push(line.to_string());
                i += 1;
            }
        }
    }

    let text = out.join("\n");
    Ok((text, LineMap::identity(out.len())))
}

struct Marker {
    start: usize,
    len: usize,
    delim: String,
    squiggly: bool,
    quoted: bool,
}

/// Finds a heredoc marker on `line`, ignoring any `<<` that appears inside
/// a string literal.
fn find_marker(line: &str) -> Option<Marker> {
    let bytes = line.as_bytes();
    let mut scanner = StringAwareScanner::new();
    let mut idx = 0;
    while idx + 1 < bytes.len() {
        let was_in_string = scanner.in_string();
        scanner.advance(bytes[idx]);
        if !was_in_string && bytes[idx] == b'<' && bytes[idx + 1] == b'<' {
            if let Some(marker) = parse_marker_at(line, idx) {
                return Some(marker);
            }
        }
        idx += 1;
    }
    None
}

fn parse_marker_at(line: &str, start: usize) -> Option<Marker> {
    let rest = &line[start + 2..];
    let mut chars = rest.char_indices().peekable();
    let mut squiggly = false;
    let mut cursor = 0;

    if rest.starts_with('~') {
        squiggly = true;
        cursor = 1;
        chars.next();
    }

    let quoted = rest[cursor..].starts_with('\'');
    if quoted {
        cursor += 1;
        chars.next();
        let quote_start = cursor;
        let close = rest[cursor..].find('\'')?;
        let delim = rest[quote_start..quote_start + close].to_string();
        if delim.is_empty() {
            return None;
        }
        cursor += close + 1;
        return Some(Marker {
            start,
            len: 2 + cursor,
            delim,
            squiggly,
            quoted,
        });
    }

    let ident_start = cursor;
    while let Some(c) = rest[cursor..].chars().next() {
        if c.is_ascii_alphanumeric() || c == '_' {
            cursor += c.len_utf8();
        } else {
            break;
        }
    }
    if cursor == ident_start {
        return None;
    }
    let delim = rest[ident_start..cursor].to_string();
    Some(Marker {
        start,
        len: 2 + cursor,
        delim,
        squiggly,
        quoted,
    })
}

fn common_indent(body: &[&str]) -> usize {
    body.iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0)
}

fn strip_indent(line: &str, indent: usize) -> &str {
    if line.trim().is_empty() {
        return line.trim_start();
    }
    let byte_indent = line
        .char_indices()
        .take(indent)
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    &line[byte_indent.min(line.len())..]
}

fn escape_heredoc_line(line: &str, quoted_delim: bool) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '#' if quoted_delim && chars.peek() == Some(&'{') => out.push_str("\\#"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_plain_heredoc() {
        let src = "message = <<MSG\nHello\nWorld\nMSG\nputs message";
        let (out, map) = expand_heredocs(src).unwrap();
        assert_eq!(
            out,
            "message = \"\nHello\nWorld\n\"\nputs message"
        );
        assert_eq!(map.len(), 5);
    }

    #[test]
    fn strips_common_indent_for_squiggly_form() {
        let src = "x = <<~MSG\n  Hello\n    World\n  MSG\nputs x";
        let (out, _) = expand_heredocs(src).unwrap();
        assert!(out.contains("Hello"));
        assert!(out.contains("  World")); // 2 extra spaces beyond common indent
        assert!(!out.contains("    World"));
    }

    #[test]
    fn quoted_delimiter_disables_interpolation() {
        let src = "x = <<~'MSG'\n  #{not_interpolated}\n  MSG\nputs x";
        let (out, _) = expand_heredocs(src).unwrap();
        assert!(out.contains("\\#{not_interpolated}"));
    }

    #[test]
    fn interpolation_preserved_unless_quoted() {
        let src = "x = <<~MSG\n  #{name}\n  MSG";
        let (out, _) = expand_heredocs(src).unwrap();
        assert!(out.contains("#{name}"));
    }

    #[test]
    fn heredoc_marker_inside_string_is_ignored() {
        let src = "puts \"value is <<NOT_A_HEREDOC\"";
        let (out, _) = expand_heredocs(src).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn unterminated_heredoc_is_an_error() {
        let src = "x = <<MSG\nhello";
        assert!(expand_heredocs(src).is_err());
    }

    #[test]
    fn line_count_is_preserved() {
        let src = "a = <<~MSG\n  one\n  two\n  MSG\nb = 2";
        let (out, map) = expand_heredocs(src).unwrap();
        assert_eq!(out.lines().count(), 5);
        assert_eq!(map.len(), 5);
        for i in 1..=5 {
            assert_eq!(map.original_line(i), i as u32);
        }
    }
}
