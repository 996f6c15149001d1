//! `rats` — the inline test-block driver (§5 "Parallel test file
//! execution", §6). Compilation stays sequential (§5 "Compiler itself");
//! only the already-compiled per-file harnesses run concurrently, each as
//! its own `std::process::Command` child, the same primitive the teacher's
//! `project::build::run` uses for a single child.
//!
//! Each Rugo file's registered `test`/`benchmark` blocks are driven through
//! a single real `go test` invocation against a generated `TestRugo`
//! wrapper (see `compile.rs::render_test_harness`) rather than a hand-rolled
//! `testing.T`, since constructing `testing.T` outside its own package
//! leaves its internal synchronization state zero-valued and unsafe to use.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::compile::{compile_to_dir, CompileError};
use crate::config::ToolchainConfig;
use crate::resolver::LockFile;

pub struct RatsOptions {
    pub filter: Option<String>,
    pub jobs: usize,
    pub timing: bool,
}

impl Default for RatsOptions {
    fn default() -> Self {
        RatsOptions {
            filter: None,
            jobs: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            timing: false,
        }
    }
}

pub struct FileOutcome {
    pub path: PathBuf,
    pub success: bool,
    pub output: String,
    pub duration: Duration,
    pub skipped_no_tests: bool,
}

/// Walks `root` for `*.rugo` files. A single file is returned as-is.
pub fn discover_files(root: &Path) -> std::io::Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().and_then(|e| e.to_str()) == Some("rugo") {
                out.push(path);
            }
        }
    }
    out.sort();
    Ok(out)
}

/// Compiles and runs every file's test harness, bounded by `options.jobs`
/// workers, streaming each file's result to `on_result` in submission
/// order as soon as that file's run completes (§5: "a file's output is
/// emitted only when its run completes").
pub fn run(
    files: &[PathBuf],
    config: &ToolchainConfig,
    lock_path: Option<&Path>,
    options: &RatsOptions,
    mut on_result: impl FnMut(&FileOutcome),
) -> Result<Vec<FileOutcome>, CompileError> {
    log::debug!("rats: {} files, {} workers requested", files.len(), options.jobs);
    // Compilation is sequential (§5); each file gets its own temp build dir
    // and, if locking is requested, shares one lock file across the batch.
    let mut lock = match lock_path {
        Some(p) => LockFile::load(p).map_err(|e| CompileError::Io(e.to_string()))?,
        None => LockFile::new(),
    };

    struct Job {
        index: usize,
        path: PathBuf,
        dir: tempfile::TempDir,
        has_harness: bool,
    }

    let mut jobs = Vec::with_capacity(files.len());
    for (index, path) in files.iter().enumerate() {
        let dir = tempfile::tempdir().map_err(|e| CompileError::Io(e.to_string()))?;
        let has_harness = compile_to_dir(path, dir.path(), config, &mut lock)?;
        jobs.push(Job { index, path: path.clone(), dir, has_harness });
    }

    if let Some(p) = lock_path {
        lock.save(p).map_err(|e| CompileError::Io(e.to_string()))?;
    }

    let jobs = Arc::new(Mutex::new(VecDeque::from(jobs)));
    let (tx, rx) = mpsc::channel();
    let worker_count = options.jobs.max(1).min(files.len().max(1));
    let filter = options.filter.clone();

    std::thread::scope(|scope| {
        for _ in 0..worker_count {
            let jobs = Arc::clone(&jobs);
            let tx = tx.clone();
            let filter = filter.clone();
            scope.spawn(move || loop {
                let job = {
                    let mut guard = jobs.lock().unwrap();
                    guard.pop_front()
                };
                let Some(job) = job else { break };
                let started = Instant::now();
                let outcome = if !job.has_harness {
                    FileOutcome {
                        path: job.path,
                        success: true,
                        output: String::new(),
                        duration: started.elapsed(),
                        skipped_no_tests: true,
                    }
                } else {
                    let mut cmd = Command::new("go");
                    cmd.arg("test").arg("-v").current_dir(job.dir.path());
                    match &filter {
                        Some(pattern) => {
                            cmd.arg("-run").arg(format!("TestRugo/{}", pattern));
                        }
                        None => {
                            cmd.arg("-run").arg("TestRugo");
                        }
                    }
                    let output = cmd.output();
                    let duration = started.elapsed();
                    match output {
                        Ok(out) => {
                            let mut combined = String::from_utf8_lossy(&out.stdout).into_owned();
                            combined.push_str(&String::from_utf8_lossy(&out.stderr));
                            FileOutcome {
                                path: job.path,
                                success: out.status.success(),
                                output: combined,
                                duration,
                                skipped_no_tests: false,
                            }
                        }
                        Err(e) => FileOutcome {
                            path: job.path,
                            success: false,
                            output: format!("failed to launch `go test`: {}", e),
                            duration,
                            skipped_no_tests: false,
                        },
                    }
                };
                // keep the TempDir alive until the child has exited
                drop(job.dir);
                let _ = tx.send((job.index, outcome));
            });
        }
        drop(tx);

        // Buffer out-of-order completions and flush in submission order.
        let mut pending: std::collections::BTreeMap<usize, FileOutcome> = std::collections::BTreeMap::new();
        let mut next_to_emit = 0;
        let mut ordered = Vec::with_capacity(files.len());
        for (index, outcome) in rx {
            pending.insert(index, outcome);
            while let Some(outcome) = pending.remove(&next_to_emit) {
                on_result(&outcome);
                ordered.push(outcome);
                next_to_emit += 1;
            }
        }
        Ok(ordered)
    })
}

pub fn format_summary(results: &[FileOutcome]) -> String {
    let total = results.len();
    let failed = results.iter().filter(|r| !r.success).count();
    let passed = total - failed;
    format!("{} passed, {} failed, {} total", passed, failed, total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn discovers_rugo_files_recursively() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.rugo"), "").unwrap();
        fs::write(dir.path().join("sub/b.rugo"), "").unwrap();
        fs::write(dir.path().join("ignore.txt"), "").unwrap();

        let files = discover_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn single_file_path_returns_itself() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("only.rugo");
        fs::write(&file, "").unwrap();
        let files = discover_files(&file).unwrap();
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn summary_counts_pass_and_fail() {
        let results = vec![
            FileOutcome { path: PathBuf::from("a.rugo"), success: true, output: String::new(), duration: Duration::ZERO, skipped_no_tests: false },
            FileOutcome { path: PathBuf::from("b.rugo"), success: false, output: String::new(), duration: Duration::ZERO, skipped_no_tests: false },
        ];
        assert_eq!(format_summary(&results), "1 passed, 1 failed, 2 total");
    }
}
