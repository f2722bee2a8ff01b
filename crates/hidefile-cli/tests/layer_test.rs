//! Runs real programs under `hidefile run` with the built inception layer preloaded.

#![cfg(all(
    target_os = "linux",
    any(target_arch = "x86_64", target_arch = "aarch64", target_arch = "riscv64")
))]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::OnceLock;

use tempfile::TempDir;

/// Builds the cdylib once per test binary into its own target directory, so the
/// nested cargo does not wait on the lock held by the outer one.
fn layer_library() -> &'static Path {
    static LIBRARY: OnceLock<PathBuf> = OnceLock::new();
    LIBRARY.get_or_init(|| {
        let target_dir = Path::new(env!("CARGO_TARGET_TMPDIR")).join("layer");
        let status = Command::new(env!("CARGO"))
            .args(["build", "--quiet", "--package", "hidefile-inception-layer"])
            .arg("--manifest-path")
            .arg(concat!(env!("CARGO_MANIFEST_DIR"), "/../../Cargo.toml"))
            .arg("--target-dir")
            .arg(&target_dir)
            .status()
            .expect("Failed to run cargo");
        assert!(status.success(), "building the inception layer failed");

        let library = target_dir
            .join("debug")
            .join("libhidefile_inception_layer.so");
        assert!(library.exists(), "missing {}", library.display());
        library
    })
}

fn run_under_layer(dir: &Path, policy: &[&str], command: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hidefile"))
        .current_dir(dir)
        .env("HOME", dir)
        .env_remove("HIDDEN")
        .env_remove("BLOCKED")
        .env_remove("HIDEFILE_LIBRARY")
        .env_remove("HIDEFILE_DEBUG")
        .env_remove("HIDEFILE_LOG_LEVEL")
        .env_remove("LD_PRELOAD")
        .arg("run")
        .arg("--library")
        .arg(layer_library())
        .args(policy)
        .arg("--")
        .args(command)
        .output()
        .expect("failed to run hidefile")
}

fn lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_ls_does_not_list_hidden_entries() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir(temp.path().join(".git")).unwrap();
    std::fs::write(temp.path().join(".gitignore"), b"target\n").unwrap();
    std::fs::write(temp.path().join("visible.txt"), b"").unwrap();
    let dir = temp.path().to_str().unwrap();

    let output = run_under_layer(temp.path(), &["--hide", ".git"], &["ls", "-a", dir]);
    assert!(output.status.success(), "{:?}", output);

    let listed = lines(&output.stdout);
    assert!(listed.contains(&"visible.txt".to_string()), "{:?}", listed);
    assert!(!listed.iter().any(|name| name.contains(".git")), "{:?}", listed);
}

#[test]
fn test_ls_lists_everything_without_patterns() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir(temp.path().join(".git")).unwrap();
    let dir = temp.path().to_str().unwrap();

    let output = run_under_layer(temp.path(), &[], &["ls", "-a", dir]);
    assert!(output.status.success(), "{:?}", output);
    assert!(lines(&output.stdout).contains(&".git".to_string()));
}

#[test]
fn test_cat_of_blocked_file_is_denied() {
    let temp = TempDir::new().unwrap();
    let key = temp.path().join("x.key");
    std::fs::write(&key, b"secret\n").unwrap();

    let output = run_under_layer(
        temp.path(),
        &["--block", ".key"],
        &["cat", key.to_str().unwrap()],
    );
    assert!(!output.status.success());
    assert!(output.stdout.is_empty(), "{:?}", output);
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("Permission denied"),
        "{:?}",
        output
    );
}

#[test]
fn test_cat_of_other_file_is_allowed() {
    let temp = TempDir::new().unwrap();
    let public = temp.path().join("x.pub");
    std::fs::write(&public, b"public\n").unwrap();

    let output = run_under_layer(
        temp.path(),
        &["--block", ".key"],
        &["cat", public.to_str().unwrap()],
    );
    assert!(output.status.success(), "{:?}", output);
    assert_eq!(output.stdout, b"public\n");
}
