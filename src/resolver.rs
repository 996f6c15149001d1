//! Remote module resolver (§4.7): resolves `host/owner/repo[/subpath][@version]`
//! references against a content-addressable cache, shelling out to the
//! system `git` binary the same way the teacher's `project::registry::
//! is_git_dirty` shells out for status checks — no Git implementation is
//! linked in.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::ToolchainConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRef {
    pub host: String,
    pub owner: String,
    pub repo: String,
    pub subpath: Option<String>,
    pub version: Option<String>,
}

impl ModuleRef {
    pub fn module_key(&self) -> String {
        format!("{}/{}/{}", self.host, self.owner, self.repo)
    }

    pub fn version_label(&self) -> String {
        self.version.clone().unwrap_or_else(|| "_default".to_string())
    }

    pub fn clone_url(&self) -> String {
        format!("https://{}/{}/{}.git", self.host, self.owner, self.repo)
    }

    /// A version is immutable when it names a fixed point: a semver-shaped
    /// tag or a commit SHA of at least 7 hex characters. Anything else
    /// (branch name, empty, `latest`) is mutable and must be re-resolved.
    pub fn is_immutable(&self) -> bool {
        match &self.version {
            None => false,
            Some(v) => is_semver_tag(v) || is_hex_sha(v),
        }
    }

    pub fn is_latest(&self) -> bool {
        matches!(self.version.as_deref(), Some("latest"))
    }
}

fn is_semver_tag(v: &str) -> bool {
    let core = v.strip_prefix('v').unwrap_or(v);
    let main = core.split(['-', '+']).next().unwrap_or(core);
    let parts: Vec<_> = main.split('.').collect();
    parts.len() == 3 && parts.iter().all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}

fn is_hex_sha(v: &str) -> bool {
    v.len() >= 7 && v.chars().all(|c| c.is_ascii_hexdigit())
}

#[derive(Debug)]
pub enum ParseRefError {
    Malformed(String),
}

impl std::fmt::Display for ParseRefError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(s) => write!(
                f,
                "'{}' is not a valid remote module reference (expected host/owner/repo[/subpath][@version])",
                s
            ),
        }
    }
}

impl std::error::Error for ParseRefError {}

/// Parses `host/owner/repo[/subpath][@version]`. The reference must carry
/// at least three `/`-separated segments before any `@version` suffix;
/// everything past the third segment is the subpath.
pub fn parse_ref(text: &str) -> Result<ModuleRef, ParseRefError> {
    let (path_part, version) = match text.rsplit_once('@') {
        Some((p, v)) => (p, Some(v.to_string())),
        None => (text, None),
    };

    let mut segments = path_part.splitn(4, '/');
    let host = segments.next().filter(|s| !s.is_empty());
    let owner = segments.next().filter(|s| !s.is_empty());
    let repo = segments.next().filter(|s| !s.is_empty());
    let subpath = segments.next().map(|s| s.to_string());

    match (host, owner, repo) {
        (Some(host), Some(owner), Some(repo)) => Ok(ModuleRef {
            host: host.to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
            subpath,
            version,
        }),
        _ => Err(ParseRefError::Malformed(text.to_string())),
    }
}

#[derive(Debug)]
pub enum ResolveError {
    Frozen(String),
    Git(String),
    NoTagsFound(String),
    EntryPointAmbiguous(PathBuf),
    EntryPointMissing(PathBuf),
    Io(String),
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Frozen(key) => write!(
                f,
                "'{}' is not present in rugo.lock and --frozen forbids resolving it",
                key
            ),
            Self::Git(msg) => write!(f, "git error: {}", msg),
            Self::NoTagsFound(key) => write!(f, "no tags found for '{}' while resolving 'latest'", key),
            Self::EntryPointAmbiguous(dir) => {
                write!(f, "ambiguous entry point in {}: multiple *.rugo files at root", dir.display())
            }
            Self::EntryPointMissing(dir) => {
                write!(f, "no entry point found in {}", dir.display())
            }
            Self::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for ResolveError {}

/// `(module-key, version-label, commit-sha)`, §3 "Lock entry".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockEntry {
    pub module_key: String,
    pub version_label: String,
    pub sha: String,
}

#[derive(Debug, Default, Clone)]
pub struct LockFile {
    entries: BTreeMap<(String, String), String>,
    dirty: bool,
}

impl LockFile {
    pub fn new() -> Self {
        LockFile::default()
    }

    pub fn load(path: &Path) -> Result<Self, ResolveError> {
        if !path.exists() {
            return Ok(LockFile::default());
        }
        let text = fs::read_to_string(path).map_err(|e| ResolveError::Io(e.to_string()))?;
        let mut entries = BTreeMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.split_whitespace();
            let (key, label, sha) = match (parts.next(), parts.next(), parts.next()) {
                (Some(k), Some(l), Some(s)) => (k, l, s),
                _ => continue,
            };
            entries.insert((key.to_string(), label.to_string()), sha.to_string());
        }
        Ok(LockFile { entries, dirty: false })
    }

    pub fn get(&self, module_key: &str, version_label: &str) -> Option<&str> {
        self.entries
            .get(&(module_key.to_string(), version_label.to_string()))
            .map(|s| s.as_str())
    }

    pub fn record(&mut self, module_key: &str, version_label: &str, sha: &str) {
        let key = (module_key.to_string(), version_label.to_string());
        if self.entries.get(&key).map(|s| s.as_str()) != Some(sha) {
            self.entries.insert(key, sha.to_string());
            self.dirty = true;
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = LockEntry> + '_ {
        self.entries.iter().map(|((key, label), sha)| LockEntry {
            module_key: key.clone(),
            version_label: label.clone(),
            sha: sha.clone(),
        })
    }

    /// Rewrites the lock file if dirty; removes it from disk if it became
    /// empty. §4.7 "rewritten only when dirty ... an empty lock file is
    /// removed from disk."
    pub fn save(&mut self, path: &Path) -> Result<(), ResolveError> {
        if !self.dirty {
            return Ok(());
        }
        if self.entries.is_empty() {
            if path.exists() {
                fs::remove_file(path).map_err(|e| ResolveError::Io(e.to_string()))?;
            }
            self.dirty = false;
            return Ok(());
        }
        let mut text = String::from("# rugo.lock — auto-generated, do not edit\n");
        for ((key, label), sha) in &self.entries {
            text.push_str(&format!("{} {} {}\n", key, label, sha));
        }
        fs::write(path, text).map_err(|e| ResolveError::Io(e.to_string()))?;
        self.dirty = false;
        Ok(())
    }
}

/// Resolves remote module references to a local filesystem directory,
/// de-duplicating within a single compiler invocation the way the teacher's
/// `project::loader::Loader` caches per-path results (§5 "Shared-resource
/// policy").
pub struct Resolver<'a> {
    config: &'a ToolchainConfig,
    lock: &'a mut LockFile,
    resolved: BTreeMap<String, PathBuf>,
}

impl<'a> Resolver<'a> {
    pub fn new(config: &'a ToolchainConfig, lock: &'a mut LockFile) -> Self {
        Resolver {
            config,
            lock,
            resolved: BTreeMap::new(),
        }
    }

    pub fn resolve(&mut self, reference: &ModuleRef) -> Result<PathBuf, ResolveError> {
        let cache_key = format!("{}@{}", reference.module_key(), reference.version_label());
        if let Some(dir) = self.resolved.get(&cache_key) {
            return Ok(dir.clone());
        }
        let dir = self.resolve_uncached(reference)?;
        self.resolved.insert(cache_key, dir.clone());
        Ok(dir)
    }

    fn resolve_uncached(&mut self, reference: &ModuleRef) -> Result<PathBuf, ResolveError> {
        let module_key = reference.module_key();
        let version_label = reference.version_label();
        log::debug!("resolving remote module {} @ {}", module_key, version_label);

        if let Some(sha) = self.lock.get(&module_key, &version_label) {
            let sha = sha.to_string();
            let dir = self.sha_cache_dir(&reference.host, &reference.owner, &reference.repo, &sha);
            if dir.exists() {
                return Ok(self.with_subpath(dir, reference));
            }
            if self.config.frozen {
                return Err(ResolveError::Frozen(module_key));
            }
            self.clone_at(reference, &sha, &dir)?;
            return Ok(self.with_subpath(dir, reference));
        }

        if self.config.frozen {
            return Err(ResolveError::Frozen(module_key));
        }

        if reference.is_latest() {
            let tag = self.resolve_latest_tag(reference)?;
            let mut resolved_ref = reference.clone();
            resolved_ref.version = Some(tag);
            return self.resolve_uncached(&resolved_ref);
        }

        if reference.is_immutable() {
            let version = reference.version.clone().unwrap();
            let tag_dir = self.tag_cache_dir(&reference.host, &reference.owner, &reference.repo, &version);
            if tag_dir.exists() {
                let sha = self.rev_parse(&tag_dir, "HEAD")?;
                self.lock.record(&module_key, &version_label, &sha);
                return Ok(self.with_subpath(tag_dir, reference));
            }
            self.clone_at(reference, &version, &tag_dir)?;
            let sha = self.rev_parse(&tag_dir, "HEAD")?;
            self.lock.record(&module_key, &version_label, &sha);
            return Ok(self.with_subpath(tag_dir, reference));
        }

        // Mutable branch/empty version: clone into a scratch dir, resolve
        // HEAD, then atomically install under the SHA-keyed path.
        log::warn!(
            "{} @ {} has no lock entry and resolves to a mutable version; re-fetching",
            module_key,
            version_label
        );
        let scratch = self.config.module_dir.join(format!(".tmp-{}-{}", std::process::id(), rand_suffix()));
        self.clone_branch(reference, &scratch)?;
        let sha = self.rev_parse(&scratch, "HEAD")?;
        let final_dir = self.sha_cache_dir(&reference.host, &reference.owner, &reference.repo, &sha);
        atomic_install(&scratch, &final_dir)?;
        self.lock.record(&module_key, &version_label, &sha);
        Ok(self.with_subpath(final_dir, reference))
    }

    fn with_subpath(&self, dir: PathBuf, reference: &ModuleRef) -> PathBuf {
        match &reference.subpath {
            Some(sub) => dir.join(sub),
            None => dir,
        }
    }

    fn sha_cache_dir(&self, host: &str, owner: &str, repo: &str, sha: &str) -> PathBuf {
        self.config
            .module_dir
            .join(host)
            .join(owner)
            .join(repo)
            .join(format!("_sha_{}", sha))
    }

    fn tag_cache_dir(&self, host: &str, owner: &str, repo: &str, version: &str) -> PathBuf {
        self.config.module_dir.join(host).join(owner).join(repo).join(version)
    }

    fn clone_at(&self, reference: &ModuleRef, rev: &str, dest: &Path) -> Result<(), ResolveError> {
        let scratch = dest.with_extension("partial");
        self.clone_branch_rev(reference, rev, &scratch)?;
        atomic_install(&scratch, dest)
    }

    fn clone_branch(&self, reference: &ModuleRef, dest: &Path) -> Result<(), ResolveError> {
        run_git(&["clone", "--depth", "1", &reference.clone_url(), &path_str(dest)])
    }

    fn clone_branch_rev(&self, reference: &ModuleRef, rev: &str, dest: &Path) -> Result<(), ResolveError> {
        run_git(&["clone", "--depth", "1", "--branch", rev, &reference.clone_url(), &path_str(dest)])
            .or_else(|_| {
                // Not every immutable rev is a valid shallow-clone branch
                // target (bare SHAs aren't); fall back to a full clone then
                // checkout, the teacher's approach to anything git needs a
                // history walk for.
                run_git(&["clone", &reference.clone_url(), &path_str(dest)])?;
                run_git_in(dest, &["checkout", rev])
            })
    }

    fn resolve_latest_tag(&self, reference: &ModuleRef) -> Result<String, ResolveError> {
        let output = Command::new("git")
            .args(["ls-remote", "--tags", "--refs", &reference.clone_url()])
            .output()
            .map_err(|e| ResolveError::Git(e.to_string()))?;
        if !output.status.success() {
            return Err(ResolveError::Git(String::from_utf8_lossy(&output.stderr).into_owned()));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut tags: Vec<String> = stdout
            .lines()
            .filter_map(|line| line.rsplit_once("refs/tags/"))
            .map(|(_, tag)| tag.to_string())
            .filter(|tag| is_semver_tag(tag))
            .collect();
        tags.sort_by(|a, b| compare_semver(a, b));
        tags.into_iter()
            .last()
            .ok_or_else(|| ResolveError::NoTagsFound(reference.module_key()))
    }

    fn rev_parse(&self, dir: &Path, rev: &str) -> Result<String, ResolveError> {
        let output = Command::new("git")
            .args(["rev-parse", rev])
            .current_dir(dir)
            .output()
            .map_err(|e| ResolveError::Git(e.to_string()))?;
        if !output.status.success() {
            return Err(ResolveError::Git(String::from_utf8_lossy(&output.stderr).into_owned()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

fn path_str(p: &Path) -> String {
    p.to_string_lossy().into_owned()
}

fn run_git(args: &[&str]) -> Result<(), ResolveError> {
    let output = Command::new("git")
        .args(args)
        .output()
        .map_err(|e| ResolveError::Git(e.to_string()))?;
    if !output.status.success() {
        return Err(ResolveError::Git(String::from_utf8_lossy(&output.stderr).into_owned()));
    }
    Ok(())
}

fn run_git_in(dir: &Path, args: &[&str]) -> Result<(), ResolveError> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| ResolveError::Git(e.to_string()))?;
    if !output.status.success() {
        return Err(ResolveError::Git(String::from_utf8_lossy(&output.stderr).into_owned()));
    }
    Ok(())
}

/// Renames `src` onto `dest`; if another process already installed `dest`
/// first, discards `src` instead of erroring (§4.7 "Atomic install").
fn atomic_install(src: &Path, dest: &Path) -> Result<(), ResolveError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| ResolveError::Io(e.to_string()))?;
    }
    match fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(_) if dest.exists() => {
            let _ = fs::remove_dir_all(src);
            Ok(())
        }
        Err(e) => Err(ResolveError::Io(e.to_string())),
    }
}

fn rand_suffix() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() as u64)
        .unwrap_or(0)
}

fn compare_semver(a: &str, b: &str) -> std::cmp::Ordering {
    fn parts(v: &str) -> (Vec<u64>, Option<String>) {
        let core = v.strip_prefix('v').unwrap_or(v);
        let (main, pre) = match core.split_once('-') {
            Some((m, p)) => (m, Some(p.to_string())),
            None => (core, None),
        };
        let nums = main.split('.').map(|p| p.parse().unwrap_or(0)).collect();
        (nums, pre)
    }
    let (an, apre) = parts(a);
    let (bn, bpre) = parts(b);
    an.cmp(&bn).then_with(|| match (&apre, &bpre) {
        (None, None) => std::cmp::Ordering::Equal,
        // A stable tag beats a pre-release tag of the same numeric version.
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (Some(_), None) => std::cmp::Ordering::Less,
        (Some(x), Some(y)) => x.cmp(y),
    })
}

/// Entry-point resolution for a fetched module directory (§4.7): prefer
/// `<repo-name>.rugo`, then `main.rugo`, then a sole `*.rugo` at the root.
pub fn find_entry_point(dir: &Path, repo_name: &str) -> Result<PathBuf, ResolveError> {
    let named = dir.join(format!("{}.rugo", repo_name));
    if named.is_file() {
        return Ok(named);
    }
    let main = dir.join("main.rugo");
    if main.is_file() {
        return Ok(main);
    }
    let entries = fs::read_dir(dir).map_err(|e| ResolveError::Io(e.to_string()))?;
    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ResolveError::Io(e.to_string()))?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("rugo") {
            candidates.push(path);
        }
    }
    match candidates.len() {
        1 => Ok(candidates.remove(0)),
        0 => Err(ResolveError::EntryPointMissing(dir.to_path_buf())),
        _ => Err(ResolveError::EntryPointAmbiguous(dir.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_reference() {
        let r = parse_ref("github.com/acme/widgets/lib@v1.2.3").unwrap();
        assert_eq!(r.host, "github.com");
        assert_eq!(r.owner, "acme");
        assert_eq!(r.repo, "widgets");
        assert_eq!(r.subpath.as_deref(), Some("lib"));
        assert_eq!(r.version.as_deref(), Some("v1.2.3"));
    }

    #[test]
    fn parses_reference_without_subpath_or_version() {
        let r = parse_ref("github.com/acme/widgets").unwrap();
        assert_eq!(r.subpath, None);
        assert_eq!(r.version, None);
        assert_eq!(r.module_key(), "github.com/acme/widgets");
    }

    #[test]
    fn rejects_malformed_reference() {
        assert!(parse_ref("acme/widgets").is_err());
        assert!(parse_ref("").is_err());
    }

    #[test]
    fn version_label_defaults_to_sentinel() {
        let r = parse_ref("github.com/acme/widgets").unwrap();
        assert_eq!(r.version_label(), "_default");
    }

    #[test]
    fn semver_tags_are_immutable() {
        let r = parse_ref("github.com/acme/widgets@v2.0.1").unwrap();
        assert!(r.is_immutable());
    }

    #[test]
    fn short_hex_sha_is_not_immutable() {
        let r = parse_ref("github.com/acme/widgets@abc12").unwrap();
        assert!(!r.is_immutable());
    }

    #[test]
    fn seven_char_hex_sha_is_immutable() {
        let r = parse_ref("github.com/acme/widgets@abc1234").unwrap();
        assert!(r.is_immutable());
    }

    #[test]
    fn branch_name_is_mutable() {
        let r = parse_ref("github.com/acme/widgets@main").unwrap();
        assert!(!r.is_immutable());
        assert!(!r.is_latest());
    }

    #[test]
    fn latest_is_recognized() {
        let r = parse_ref("github.com/acme/widgets@latest").unwrap();
        assert!(r.is_latest());
        assert!(!r.is_immutable());
    }

    #[test]
    fn stable_beats_prerelease_at_same_version() {
        assert_eq!(compare_semver("v1.0.0", "v1.0.0-rc.1"), std::cmp::Ordering::Greater);
    }

    #[test]
    fn higher_semver_wins() {
        assert_eq!(compare_semver("v1.2.0", "v1.10.0"), std::cmp::Ordering::Less);
    }

    #[test]
    fn lockfile_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rugo.lock");
        let mut lock = LockFile::new();
        lock.record("github.com/acme/widgets", "_default", "a".repeat(40).as_str());
        lock.save(&path).unwrap();

        let reloaded = LockFile::load(&path).unwrap();
        assert_eq!(
            reloaded.get("github.com/acme/widgets", "_default"),
            Some("a".repeat(40).as_str())
        );
    }

    #[test]
    fn empty_lockfile_is_removed_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rugo.lock");
        let mut lock = LockFile::new();
        lock.record("github.com/acme/widgets", "_default", "a".repeat(40).as_str());
        lock.save(&path).unwrap();
        assert!(path.exists());

        let mut reloaded = LockFile::load(&path).unwrap();
        // simulate the entry being dropped (e.g. `mod tidy` no longer
        // needs it) by rebuilding an empty lock and marking it dirty via
        // a no-op record of the same key removed externally
        reloaded.entries.clear();
        reloaded.dirty = true;
        reloaded.save(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn comments_and_blank_lines_are_ignored_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rugo.lock");
        fs::write(
            &path,
            "# rugo.lock — auto-generated, do not edit\n\ngithub.com/acme/widgets _default abc1234abc1234abc1234abc1234abc1234abcd\n",
        )
        .unwrap();
        let lock = LockFile::load(&path).unwrap();
        assert_eq!(
            lock.get("github.com/acme/widgets", "_default"),
            Some("abc1234abc1234abc1234abc1234abc1234abcd")
        );
    }

    #[test]
    fn finds_named_entry_point() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("widgets.rugo"), "").unwrap();
        let found = find_entry_point(dir.path(), "widgets").unwrap();
        assert_eq!(found, dir.path().join("widgets.rugo"));
    }

    #[test]
    fn falls_back_to_main_rugo() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main.rugo"), "").unwrap();
        let found = find_entry_point(dir.path(), "widgets").unwrap();
        assert_eq!(found, dir.path().join("main.rugo"));
    }

    #[test]
    fn falls_back_to_sole_rugo_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("lib.rugo"), "").unwrap();
        let found = find_entry_point(dir.path(), "widgets").unwrap();
        assert_eq!(found, dir.path().join("lib.rugo"));
    }

    #[test]
    fn ambiguous_entry_point_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.rugo"), "").unwrap();
        fs::write(dir.path().join("b.rugo"), "").unwrap();
        assert!(matches!(
            find_entry_point(dir.path(), "widgets"),
            Err(ResolveError::EntryPointAmbiguous(_))
        ));
    }

    #[test]
    fn missing_entry_point_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            find_entry_point(dir.path(), "widgets"),
            Err(ResolveError::EntryPointMissing(_))
        ));
    }

    #[test]
    fn frozen_mode_rejects_missing_lock_entry() {
        let dir = tempfile::tempdir().unwrap();
        let config = ToolchainConfig {
            module_dir: dir.path().join("modules"),
            tools_dir: dir.path().join("tools"),
            frozen: true,
        };
        let mut lock = LockFile::new();
        let mut resolver = Resolver::new(&config, &mut lock);
        let reference = parse_ref("github.com/u/r@v1.0.0").unwrap();
        assert!(matches!(resolver.resolve(&reference), Err(ResolveError::Frozen(_))));
    }

    #[test]
    fn frozen_mode_with_cached_sha_succeeds_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let config = ToolchainConfig {
            module_dir: dir.path().join("modules"),
            tools_dir: dir.path().join("tools"),
            frozen: true,
        };
        let sha = "a".repeat(40);
        let cache_dir = config.module_dir.join("github.com/u/r").join(format!("_sha_{}", sha));
        fs::create_dir_all(&cache_dir).unwrap();

        let mut lock = LockFile::new();
        lock.record("github.com/u/r", "v1.0.0", &sha);

        let mut resolver = Resolver::new(&config, &mut lock);
        let reference = parse_ref("github.com/u/r@v1.0.0").unwrap();
        let resolved = resolver.resolve(&reference).unwrap();
        assert_eq!(resolved, cache_dir);
    }
}
