//! Minimal color policy.
//!
//! Full colorization is an explicit Non-goal (§1): this module only answers
//! "should ANSI codes be emitted at all", honoring `NO_COLOR` and
//! `RUGO_FORCE_COLOR` (§6), and is used by the CLI's error reporter.

use std::env;
use std::io::IsTerminal;

pub fn color_enabled() -> bool {
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if env::var_os("RUGO_FORCE_COLOR").is_some() {
        return true;
    }
    std::io::stderr().is_terminal()
}

pub fn bold_red(text: &str) -> String {
    paint(text, "1;31")
}

pub fn red(text: &str) -> String {
    paint(text, "31")
}

fn paint(text: &str, code: &str) -> String {
    if color_enabled() {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_color_disables_escapes() {
        std::env::set_var("NO_COLOR", "1");
        std::env::remove_var("RUGO_FORCE_COLOR");
        assert!(!color_enabled());
        assert_eq!(bold_red("error"), "error");
        std::env::remove_var("NO_COLOR");
    }

    #[test]
    fn force_color_overrides_no_color() {
        std::env::set_var("NO_COLOR", "1");
        std::env::set_var("RUGO_FORCE_COLOR", "1");
        assert!(color_enabled());
        std::env::remove_var("NO_COLOR");
        std::env::remove_var("RUGO_FORCE_COLOR");
    }
}
