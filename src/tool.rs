//! `rugo tool install|list|remove` (§6): installs user-provided subcommand
//! binaries into a per-user directory. Intentionally thin — no manifest
//! format, no version tracking, no JSON (§10): a tool is just an
//! executable file sitting in `ToolchainConfig::tools_dir`, the way the
//! teacher's `project::credentials` keeps a small file-backed store, minus
//! any serialization format since there's nothing structured to store.

use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum ToolError {
    NotFound(String),
    AlreadyInstalled(String),
    Io(String),
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(name) => write!(f, "no tool named '{}' is installed", name),
            Self::AlreadyInstalled(name) => write!(
                f,
                "'{}' is already installed; remove it first or choose a different name",
                name
            ),
            Self::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ToolError {}

/// Copies `binary_path` into `tools_dir` under `name` (or the binary's own
/// file name), marking it executable on Unix.
pub fn install(tools_dir: &Path, binary_path: &Path, name: Option<&str>) -> Result<PathBuf, ToolError> {
    fs::create_dir_all(tools_dir).map_err(|e| ToolError::Io(e.to_string()))?;

    let tool_name = match name {
        Some(n) => n.to_string(),
        None => binary_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ToolError::Io(format!("cannot derive a tool name from {}", binary_path.display())))?
            .to_string(),
    };

    let dest = tools_dir.join(&tool_name);
    if dest.exists() {
        return Err(ToolError::AlreadyInstalled(tool_name));
    }

    fs::copy(binary_path, &dest).map_err(|e| ToolError::Io(e.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = fs::Permissions::from_mode(0o755);
        fs::set_permissions(&dest, perms).map_err(|e| ToolError::Io(e.to_string()))?;
    }

    Ok(dest)
}

/// Lists installed tool names, sorted.
pub fn list(tools_dir: &Path) -> Result<Vec<String>, ToolError> {
    if !tools_dir.exists() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in fs::read_dir(tools_dir).map_err(|e| ToolError::Io(e.to_string()))? {
        let entry = entry.map_err(|e| ToolError::Io(e.to_string()))?;
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

pub fn remove(tools_dir: &Path, name: &str) -> Result<(), ToolError> {
    let path = tools_dir.join(name);
    if !path.exists() {
        return Err(ToolError::NotFound(name.to_string()));
    }
    fs::remove_file(&path).map_err(|e| ToolError::Io(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installs_and_lists_a_tool() {
        let tools_dir = tempfile::tempdir().unwrap();
        let src_dir = tempfile::tempdir().unwrap();
        let binary = src_dir.path().join("mytool");
        fs::write(&binary, b"#!/bin/sh\necho hi\n").unwrap();

        install(tools_dir.path(), &binary, None).unwrap();
        assert_eq!(list(tools_dir.path()).unwrap(), vec!["mytool".to_string()]);
    }

    #[test]
    fn rejects_duplicate_install() {
        let tools_dir = tempfile::tempdir().unwrap();
        let src_dir = tempfile::tempdir().unwrap();
        let binary = src_dir.path().join("mytool");
        fs::write(&binary, b"x").unwrap();

        install(tools_dir.path(), &binary, None).unwrap();
        let result = install(tools_dir.path(), &binary, None);
        assert!(matches!(result, Err(ToolError::AlreadyInstalled(_))));
    }

    #[test]
    fn removes_an_installed_tool() {
        let tools_dir = tempfile::tempdir().unwrap();
        let src_dir = tempfile::tempdir().unwrap();
        let binary = src_dir.path().join("mytool");
        fs::write(&binary, b"x").unwrap();

        install(tools_dir.path(), &binary, Some("renamed")).unwrap();
        remove(tools_dir.path(), "renamed").unwrap();
        assert!(list(tools_dir.path()).unwrap().is_empty());
    }

    #[test]
    fn removing_missing_tool_errors() {
        let tools_dir = tempfile::tempdir().unwrap();
        assert!(matches!(remove(tools_dir.path(), "ghost"), Err(ToolError::NotFound(_))));
    }
}
