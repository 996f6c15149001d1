//! Explicit configuration, constructed once and threaded through the
//! compiler context and the resolver — never read from ambient globals
//! mid-pipeline (§9 "Module registration as global state" generalizes to
//! configuration as a whole).

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ToolchainConfig {
    /// Root of the content-addressable module cache. §6 `RUGO_MODULE_DIR`.
    pub module_dir: PathBuf,
    /// Per-user directory for `rugo tool install`. §6 `RUGO_TOOLS_DIR`.
    pub tools_dir: PathBuf,
    /// `--frozen`: forbid resolving anything not already in the lock file.
    pub frozen: bool,
}

impl ToolchainConfig {
    pub fn from_env(frozen: bool) -> Self {
        ToolchainConfig {
            module_dir: module_dir_from_env(),
            tools_dir: tools_dir_from_env(),
            frozen,
        }
    }
}

fn module_dir_from_env() -> PathBuf {
    if let Ok(dir) = std::env::var("RUGO_MODULE_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".rugo")
        .join("modules")
}

fn tools_dir_from_env() -> PathBuf {
    if let Ok(dir) = std::env::var("RUGO_TOOLS_DIR") {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rugo")
        .join("tools")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_dir_env_override_wins() {
        std::env::set_var("RUGO_MODULE_DIR", "/tmp/rugo-modules-test");
        let cfg = ToolchainConfig::from_env(false);
        assert_eq!(cfg.module_dir, PathBuf::from("/tmp/rugo-modules-test"));
        std::env::remove_var("RUGO_MODULE_DIR");
    }

    #[test]
    fn frozen_flag_is_threaded_through() {
        let cfg = ToolchainConfig::from_env(true);
        assert!(cfg.frozen);
    }
}
