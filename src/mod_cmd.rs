//! `rugo mod tidy`/`rugo mod update` (§6, §10): Rugo has no project
//! manifest, so the import graph rooted at the entry file *is* the
//! dependency set — an explicit departure from the teacher's
//! `Largo.toml`-driven model, recorded in `DESIGN.md`. Both subcommands
//! walk that graph and refresh `rugo.lock` by running every `require`
//! through the resolver.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::ast::StmtKind;
use crate::codegen::{is_remote_reference, local_module_path};
use crate::compile::{parse_to_ast, FrontendError};
use crate::config::ToolchainConfig;
use crate::intern::Interner;
use crate::resolver::{parse_ref, LockFile, ModuleRef, ResolveError, Resolver};

#[derive(Debug)]
pub enum ModCmdError {
    Frontend(FrontendError),
    Io(String),
    Resolve(ResolveError),
}

impl std::fmt::Display for ModCmdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Frontend(e) => write!(f, "{}", e),
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::Resolve(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ModCmdError {}

/// Walks the transitive `require` graph rooted at `entry`, collecting
/// every remote reference. Local file/directory requires are followed
/// recursively so remote modules nested several `require`s deep are still
/// discovered; cycles are broken via a visited-path set.
pub fn collect_remote_refs(entry: &Path) -> Result<Vec<ModuleRef>, ModCmdError> {
    let mut refs = Vec::new();
    let mut seen_remote = HashSet::new();
    let mut visited_files = HashSet::new();
    walk_file(entry, &mut refs, &mut seen_remote, &mut visited_files)?;
    Ok(refs)
}

fn walk_file(
    path: &Path,
    refs: &mut Vec<ModuleRef>,
    seen_remote: &mut HashSet<String>,
    visited_files: &mut HashSet<PathBuf>,
) -> Result<(), ModCmdError> {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    if !visited_files.insert(canonical) {
        return Ok(());
    }

    let source = std::fs::read_to_string(path).map_err(|e| ModCmdError::Io(e.to_string()))?;
    let mut interner = Interner::new();
    let program = parse_to_ast(&source, &mut interner).map_err(ModCmdError::Frontend)?;

    let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));

    for stmt in &program.stmts {
        if let StmtKind::Use(decl) = &stmt.kind {
            let reference = decl.reference.trim();
            if is_remote_reference(reference) {
                if seen_remote.insert(reference.to_string()) {
                    if let Ok(module_ref) = parse_ref(reference) {
                        refs.push(module_ref);
                    }
                }
                continue;
            }
            if crate::modules::ModuleRegistry::is_runtime_module(reference) {
                continue;
            }
            let local_path = base_dir.join(local_module_path(reference));
            if local_path.is_file() {
                walk_file(&local_path, refs, seen_remote, visited_files)?;
            }
        }
    }

    Ok(())
}

/// `rugo mod tidy`: resolves every remote reference reachable from `entry`
/// and rewrites the lock file with whatever changed.
pub fn tidy(entry: &Path, lock_path: &Path, config: &ToolchainConfig) -> Result<(), ModCmdError> {
    let refs = collect_remote_refs(entry)?;
    log::debug!("mod tidy: {} remote references reachable from {}", refs.len(), entry.display());
    let mut lock = LockFile::load(lock_path).map_err(ModCmdError::Resolve)?;
    {
        let mut resolver = Resolver::new(config, &mut lock);
        for module_ref in &refs {
            resolver.resolve(module_ref).map_err(ModCmdError::Resolve)?;
        }
    }
    lock.save(lock_path).map_err(ModCmdError::Resolve)
}

/// `rugo mod update [MODULE]`: re-resolves mutable versions, ignoring any
/// already-locked SHA for matching modules, so the lock file picks up new
/// commits (§4.7's mutable-version re-clone path runs instead of the
/// cache-hit path).
pub fn update(entry: &Path, lock_path: &Path, config: &ToolchainConfig, module_filter: Option<&str>) -> Result<(), ModCmdError> {
    let refs = collect_remote_refs(entry)?;
    log::debug!(
        "mod update: {} remote references, filter={:?}",
        refs.len(),
        module_filter
    );
    let mut lock = LockFile::load(lock_path).map_err(ModCmdError::Resolve)?;

    // Drop existing lock entries for the modules being updated so the
    // resolver can't short-circuit on a stale SHA.
    let keys_to_clear: Vec<(String, String)> = lock
        .entries()
        .filter(|e| module_filter.map(|f| e.module_key == f).unwrap_or(true))
        .map(|e| (e.module_key, e.version_label))
        .collect();
    let mut rebuilt = LockFile::new();
    for entry_kept in lock.entries() {
        if keys_to_clear.contains(&(entry_kept.module_key.clone(), entry_kept.version_label.clone())) {
            continue;
        }
        rebuilt.record(&entry_kept.module_key, &entry_kept.version_label, &entry_kept.sha);
    }
    lock = rebuilt;

    {
        let mut resolver = Resolver::new(config, &mut lock);
        for module_ref in &refs {
            if let Some(filter) = module_filter {
                if module_ref.module_key() != filter {
                    continue;
                }
            }
            resolver.resolve(module_ref).map_err(ModCmdError::Resolve)?;
        }
    }
    lock.save(lock_path).map_err(ModCmdError::Resolve)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn collects_remote_refs_from_entry_file() {
        let dir = tempfile::tempdir().unwrap();
        let entry = dir.path().join("main.rugo");
        fs::write(&entry, "require \"github.com/acme/widgets@v1.0.0\"\n").unwrap();

        let refs = collect_remote_refs(&entry).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].module_key(), "github.com/acme/widgets");
    }

    #[test]
    fn follows_local_requires_transitively() {
        let dir = tempfile::tempdir().unwrap();
        let entry = dir.path().join("main.rugo");
        let lib = dir.path().join("lib.rugo");
        fs::write(&entry, "require \"./lib\"\n").unwrap();
        fs::write(&lib, "require \"github.com/acme/widgets\"\n").unwrap();

        let refs = collect_remote_refs(&entry).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].module_key(), "github.com/acme/widgets");
    }

    #[test]
    fn ignores_runtime_and_bridge_modules() {
        let dir = tempfile::tempdir().unwrap();
        let entry = dir.path().join("main.rugo");
        fs::write(&entry, "require \"str\"\n").unwrap();

        let refs = collect_remote_refs(&entry).unwrap();
        assert!(refs.is_empty());
    }
}
