//! Struct definition expansion (§4.1, stage 3).
//!
//! Rewrites:
//! ```text
//! struct Point
//!   x
//!   y
//! end
//! ```
//! into a constructor function returning a hash literal keyed by field
//! name. The constructor's name keeps the struct's (constant-convention,
//! uppercase-leading) name, which is how the walker's struct-reattachment
//! pass (§4.3) later recognizes it and recovers the field order — no side
//! channel is needed out of this purely textual stage.

use crate::preprocessor::scanner::lines_inside_string;
use crate::span::LineMap;

pub fn expand_structs(source: &str) -> Result<(String, LineMap), StructError> {
    let lines: Vec<&str> = source.lines().collect();
    let protected = lines_inside_string(source);
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut map_entries: Vec<u32> = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        // A line carried over from a still-open heredoc-expanded string
        // literal is body content, never a struct header.
        if protected.get(i).copied().unwrap_or(false) {
            out.push(lines[i].to_string());
            map_entries.push((i + 1) as u32);
            i += 1;
            continue;
        }
        let trimmed = lines[i].trim_start();
        if let Some(name) = trimmed.strip_prefix("struct ") {
            let name = name.trim();
            if name.is_empty() || !name.chars().next().unwrap().is_uppercase() {
                return Err(StructError {
                    message: format!(
                        "struct name '{}' must start with an uppercase letter",
                        name
                    ),
                    line: i + 1,
                });
            }
            let indent = &lines[i][..lines[i].len() - trimmed.len()];

            let mut fields = Vec::new();
            let mut j = i + 1;
            loop {
                if j >= lines.len() {
                    return Err(StructError {
                        message: format!("unterminated struct definition '{}'", name),
                        line: i + 1,
                    });
                }
                let field_line = lines[j].trim();
                if field_line == "end" {
                    break;
                }
                if !field_line.is_empty() {
                    if !is_identifier(field_line) {
                        return Err(StructError {
                            message: format!(
                                "expected a field name in struct '{}', found '{}'",
                                name, field_line
                            ),
                            line: j + 1,
                        });
                    }
                    fields.push(field_line.to_string());
                }
                j += 1;
            }

            let params = fields.join(", ");
            let pairs = fields
                .iter()
                .map(|f| format!("\"{}\": {}", f, f))
                .collect::<Vec<_>>()
                .join(", ");

            out.push(format!("{}def {}({})", indent, name, params));
            map_entries.push((i + 1) as u32);
            out.push(format!("{}  return {{{}}}", indent, pairs));
            map_entries.push((i + 1) as u32);
            // Keep the line count stable: every interior field line becomes
            // a blank line tracing back to itself, so the original field
            // declaration is still the line a diagnostic points at.
            for field_line in (i + 2)..j {
                out.push(String::new());
                map_entries.push(field_line as u32);
            }
            out.push(format!("{}end", indent));
            map_entries.push((j + 1) as u32);
            i = j + 1;
        } else {
            out.push(lines[i].to_string());
            map_entries.push((i + 1) as u32);
            i += 1;
        }
    }

    let text = out.join("\n");
    Ok((text, LineMap::from_entries(map_entries)))
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

#[derive(Debug)]
pub struct StructError {
    pub message: String,
    pub line: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_struct_into_constructor() {
        let src = "struct Point\n  x\n  y\nend\np = Point(1, 2)";
        let (out, _) = expand_structs(src).unwrap();
        assert!(out.contains("def Point(x, y)"));
        assert!(out.contains("\"x\": x"));
        assert!(out.contains("\"y\": y"));
        assert!(out.contains("p = Point(1, 2)"));
    }

    #[test]
    fn empty_struct_has_no_fields() {
        let src = "struct Empty\nend";
        let (out, _) = expand_structs(src).unwrap();
        assert!(out.contains("def Empty()"));
    }

    #[test]
    fn rejects_lowercase_struct_name() {
        let src = "struct point\n  x\nend";
        assert!(expand_structs(src).is_err());
    }

    #[test]
    fn rejects_unterminated_struct() {
        let src = "struct Point\n  x";
        assert!(expand_structs(src).is_err());
    }

    #[test]
    fn preserves_indentation() {
        let src = "  struct Point\n    x\n  end";
        let (out, _) = expand_structs(src).unwrap();
        assert!(out.lines().next().unwrap().starts_with("  def Point"));
    }
}
