//! The string-aware scanner underlying every preprocessor transformation
//! (§4.1.2): tracks three open/close flags (double, single, backtick
//! quoting) plus an escape flag, one byte at a time, so dispatchers never
//! mistake string content for syntax (a `#` inside a string is never a
//! comment; an `=` inside a string never starts an assignment).

#[derive(Debug, Clone, Copy, Default)]
pub struct StringAwareScanner {
    in_double: bool,
    in_single: bool,
    in_backtick: bool,
    escaped: bool,
}

impl StringAwareScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next byte, updating internal quote/escape state. Returns
    /// whether `byte` itself was consumed while already inside a string
    /// (i.e. whether a dispatcher should skip it as ordinary string
    /// content rather than interpreting it as syntax).
    pub fn advance(&mut self, byte: u8) -> bool {
        let was_in_string = self.in_string();

        if self.escaped {
            self.escaped = false;
            return true;
        }

        if was_in_string {
            match byte {
                b'\\' if self.in_double || self.in_backtick => {
                    self.escaped = true;
                    return true;
                }
                b'"' if self.in_double => self.in_double = false,
                b'\'' if self.in_single => self.in_single = false,
                b'`' if self.in_backtick => self.in_backtick = false,
                _ => {}
            }
            return true;
        }

        match byte {
            b'"' => self.in_double = true,
            b'\'' => self.in_single = true,
            b'`' => self.in_backtick = true,
            _ => {}
        }
        false
    }

    pub fn in_string(&self) -> bool {
        self.in_double || self.in_single || self.in_backtick
    }

    pub fn in_double_quote(&self) -> bool {
        self.in_double
    }
}

/// For each line of `source` (0-indexed, matching `source.lines()`),
/// reports whether that line's *first* byte is already inside a string
/// carried over from an earlier line — the case for every line of a
/// heredoc body after the first, since heredoc expansion (§4.1 stage 1)
/// represents the whole body as one string literal spanning several
/// physical lines. Line-oriented stages that run after heredoc expansion
/// must leave such lines untouched rather than re-interpreting them as
/// statements.
pub fn lines_inside_string(source: &str) -> Vec<bool> {
    if source.is_empty() {
        return Vec::new();
    }
    let mut scanner = StringAwareScanner::new();
    let mut flags = Vec::new();
    let mut at_line_start = true;

    for byte in source.bytes() {
        if at_line_start {
            flags.push(scanner.in_string());
            at_line_start = false;
        }
        if byte == b'\n' {
            at_line_start = true;
        }
        scanner.advance(byte);
    }
    // `str::lines()` does not emit a trailing empty line for a final `\n`.
    if at_line_start && !source.ends_with('\n') {
        flags.push(scanner.in_string());
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(src: &str) -> Vec<bool> {
        let mut scanner = StringAwareScanner::new();
        src.bytes().map(|b| scanner.advance(b)).collect()
    }

    #[test]
    fn tracks_double_quoted_region() {
        let consumed = scan(r#"a "b" c"#);
        // index 0 'a' -> false, 1 ' ' -> false, 2 '"' (opens, but opening
        // quote byte itself is reported as "not previously in string").
        assert!(!consumed[0]);
        assert!(!consumed[2]);
        assert!(consumed[3]); // 'b' is inside the string
        assert!(consumed[4]); // closing quote consumed as string content
        assert!(!consumed[5]); // space after string is back to bare text
    }

    #[test]
    fn escape_protects_closing_quote() {
        let mut scanner = StringAwareScanner::new();
        for b in br#""a\"b""# {
            scanner.advance(*b);
        }
        // After consuming `"a\"b"` fully, we should be back outside a string.
        assert!(!scanner.in_string());
    }

    #[test]
    fn hash_inside_string_is_not_a_comment_boundary() {
        let mut scanner = StringAwareScanner::new();
        let mut saw_hash_in_string = false;
        for b in br#""a # b""# {
            let was_in_string = scanner.in_string();
            scanner.advance(b);
            if b == b'#' && was_in_string {
                saw_hash_in_string = true;
            }
        }
        assert!(saw_hash_in_string);
    }

    #[test]
    fn distinct_quote_kinds_do_not_close_each_other() {
        let mut scanner = StringAwareScanner::new();
        scanner.advance(b'"');
        assert!(scanner.in_double_quote());
        scanner.advance(b'\'');
        assert!(scanner.in_double_quote(), "single quote inside double string should not close it");
    }

    #[test]
    fn lines_inside_string_flags_continuation_lines_of_a_multiline_literal() {
        let src = "message = \"\nbody line\n\"\nnext stmt";
        let flags = lines_inside_string(src);
        assert_eq!(flags, vec![false, true, true, false]);
    }

    #[test]
    fn lines_inside_string_is_all_false_without_multiline_strings() {
        let flags = lines_inside_string("a = 1\nb = 2\nc = 3");
        assert_eq!(flags, vec![false, false, false]);
    }

    #[test]
    fn lines_inside_string_matches_str_lines_count() {
        let src = "a\nb\nc\n";
        assert_eq!(lines_inside_string(src).len(), src.lines().count());
        let src2 = "a\nb\nc";
        assert_eq!(lines_inside_string(src2).len(), src2.lines().count());
    }
}
