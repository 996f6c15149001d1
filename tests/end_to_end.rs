//! End-to-end scenarios: a Rugo source file goes in, a running program (or
//! a compile error) comes out. These exercise the full
//! preprocess/lex/parse/walk/infer/codegen/print chain plus, where noted,
//! the real `go build`/`go run` toolchain.

use std::fs;
use std::process::Command;

use rugo::compile::{compile_to_go, run};
use rugo::config::ToolchainConfig;
use rugo::resolver::LockFile;

fn test_config(temp: &tempfile::TempDir) -> ToolchainConfig {
    ToolchainConfig {
        module_dir: temp.path().join("modules"),
        tools_dir: temp.path().join("tools"),
        frozen: false,
    }
}

fn go_available() -> bool {
    Command::new("go").arg("version").output().map(|o| o.status.success()).unwrap_or(false)
}

#[test]
fn hello_world_exits_zero_and_prints_greeting() {
    if !go_available() {
        return;
    }
    let temp = tempfile::tempdir().unwrap();
    let entry = temp.path().join("main.rugo");
    fs::write(&entry, "puts \"Hello, World!\"\n").unwrap();

    let config = test_config(&temp);
    let mut lock = LockFile::new();
    let code = run(&entry, &[], &config, &mut lock).expect("should run");
    assert_eq!(code, 0);
}

#[test]
fn interpolation_and_arithmetic_compiles() {
    let temp = tempfile::tempdir().unwrap();
    let entry = temp.path().join("main.rugo");
    fs::write(&entry, "x = 10\nputs \"#{x} squared is #{x*x}\"\n").unwrap();

    let config = test_config(&temp);
    let mut lock = LockFile::new();
    let go_source = compile_to_go(&entry, &config, &mut lock).expect("should compile");
    assert!(go_source.contains("func main()"));
}

#[test]
fn constant_reassignment_fails_to_compile() {
    let temp = tempfile::tempdir().unwrap();
    let entry = temp.path().join("main.rugo");
    fs::write(&entry, "PI = 3.14\nPI = 2\n").unwrap();

    let config = test_config(&temp);
    let mut lock = LockFile::new();
    let result = compile_to_go(&entry, &config, &mut lock);
    let err = result.expect_err("reassigning a constant must fail to compile");
    assert!(
        err.to_string().contains("cannot reassign constant PI"),
        "unexpected message: {}",
        err
    );
}

#[test]
fn try_with_default_falls_back_on_failure() {
    let temp = tempfile::tempdir().unwrap();
    let entry = temp.path().join("main.rugo");
    fs::write(
        &entry,
        "port = try conv.to_i(\"abc\") or 8080\nputs port\n",
    )
    .unwrap();

    let config = test_config(&temp);
    let mut lock = LockFile::new();
    let go_source = compile_to_go(&entry, &config, &mut lock).expect("should compile");
    assert!(go_source.contains("8080"));
}

#[test]
fn parallel_fan_out_preserves_submission_order() {
    let temp = tempfile::tempdir().unwrap();
    let entry = temp.path().join("main.rugo");
    fs::write(
        &entry,
        "results = parallel\n  1*10\n  2*10\n  3*10\nend\nputs results\n",
    )
    .unwrap();

    let config = test_config(&temp);
    let mut lock = LockFile::new();
    let go_source = compile_to_go(&entry, &config, &mut lock).expect("should compile");
    assert!(go_source.contains("rugo_parallel"));
}

#[test]
fn unresolvable_local_require_is_a_compile_error() {
    let temp = tempfile::tempdir().unwrap();
    let entry = temp.path().join("main.rugo");
    fs::write(&entry, "require \"./nowhere\"\n").unwrap();

    let config = test_config(&temp);
    let mut lock = LockFile::new();
    assert!(compile_to_go(&entry, &config, &mut lock).is_err());
}

#[test]
fn frozen_build_without_lock_entry_fails_for_remote_require() {
    let temp = tempfile::tempdir().unwrap();
    let entry = temp.path().join("main.rugo");
    fs::write(&entry, "require \"github.com/u/r@v1.0.0\"\n").unwrap();

    let mut config = test_config(&temp);
    config.frozen = true;
    let mut lock = LockFile::new();
    let err = compile_to_go(&entry, &config, &mut lock).expect_err("frozen build with no lock entry must fail");
    assert!(
        err.to_string().contains("rugo.lock") || err.to_string().contains("frozen"),
        "unexpected message: {}",
        err
    );
}

#[test]
fn frozen_build_succeeds_once_cache_and_lock_are_populated() {
    let temp = tempfile::tempdir().unwrap();
    let entry = temp.path().join("main.rugo");
    fs::write(&entry, "require \"github.com/u/r@v1.0.0\"\n").unwrap();

    let mut config = test_config(&temp);
    let sha = "a".repeat(40);
    let cache_dir = config.module_dir.join("github.com/u/r").join(format!("_sha_{}", sha));
    fs::create_dir_all(&cache_dir).unwrap();
    fs::write(cache_dir.join("r.rugo"), "def helper\n  1\nend\n").unwrap();

    let mut lock = LockFile::new();
    lock.record("github.com/u/r", "v1.0.0", &sha);

    config.frozen = true;
    let go_source = compile_to_go(&entry, &config, &mut lock).expect("should compile with a populated cache and lock");
    assert!(go_source.contains("func main()"));
}
