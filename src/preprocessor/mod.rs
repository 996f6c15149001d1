//! The preprocessor (§4.1): a sequence of purely textual transformations,
//! each returning rewritten text plus a line map from its output lines back
//! to its input lines. The composed line map threads all the way through
//! to the printer, so a diagnostic on generated Go can point back at the
//! original Rugo source line.

pub mod comments;
pub mod desugar;
pub mod functions;
pub mod heredoc;
pub mod scanner;
pub mod structs;

use crate::span::LineMap;

#[derive(Debug)]
pub enum PreprocessError {
    Heredoc(heredoc::HeredocError),
    Struct(structs::StructError),
}

impl std::fmt::Display for PreprocessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PreprocessError::Heredoc(e) => write!(f, "line {}: {}", e.line, e.message),
            PreprocessError::Struct(e) => write!(f, "line {}: {}", e.line, e.message),
        }
    }
}

impl std::error::Error for PreprocessError {}

impl From<heredoc::HeredocError> for PreprocessError {
    fn from(e: heredoc::HeredocError) -> Self {
        PreprocessError::Heredoc(e)
    }
}

impl From<structs::StructError> for PreprocessError {
    fn from(e: structs::StructError) -> Self {
        PreprocessError::Struct(e)
    }
}

/// Output of the whole preprocessor: the final text ready for the lexer,
/// and a single line map composed across every stage.
pub struct Preprocessed {
    pub text: String,
    pub line_map: LineMap,
}

pub fn preprocess(source: &str) -> Result<Preprocessed, PreprocessError> {
    log::debug!("preprocessing {} bytes of source", source.len());

    let (text, map1) = heredoc::expand_heredocs(source)?;
    let (text, map2) = comments::strip_comments(&text);
    let (text, map3) = structs::expand_structs(&text)?;
    let user_fns = functions::scan_user_functions(&text);
    let (text, map5) = desugar::preprocess_main(&text, &user_fns);

    let line_map = map1.compose(&map2).compose(&map3).compose(&map5);

    log::debug!(
        "preprocessing complete: {} lines in, {} lines out",
        source.lines().count(),
        text.lines().count()
    );

    Ok(Preprocessed { text, line_map })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_pipeline_on_hello_world() {
        let result = preprocess("puts \"hello\"").unwrap();
        assert_eq!(result.text, "puts(\"hello\")");
    }

    #[test]
    fn full_pipeline_handles_heredoc_then_comment_then_call() {
        let src = "message = <<~MSG\n  hi # not a comment\nMSG\nputs message # prints it";
        let result = preprocess(src).unwrap();
        assert!(result.text.contains("hi # not a comment"));
        assert!(result.text.ends_with("puts message"));
    }

    #[test]
    fn full_pipeline_handles_struct_then_constructor_call() {
        let src = "struct Point\n  x\n  y\nend\np = Point(1, 2)";
        let result = preprocess(src).unwrap();
        assert!(result.text.contains("def Point(x, y)"));
        assert!(result.text.contains("p = Point(1, 2)"));
    }

    #[test]
    fn line_map_survives_composition() {
        let src = "a = 1\nb = 2\nputs a";
        let result = preprocess(src).unwrap();
        assert_eq!(result.line_map.original_line(1), 1);
        assert_eq!(result.line_map.original_line(3), 3);
    }

    #[test]
    fn propagates_heredoc_errors() {
        let err = preprocess("x = <<MSG\nunterminated").unwrap_err();
        assert!(err.to_string().contains("unterminated"));
    }
}
