//! Drives the built `hidefile` binary in an isolated home and working directory.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn hidefile(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_hidefile"));
    cmd.current_dir(home)
        .env("HOME", home)
        .env_remove("HIDDEN")
        .env_remove("BLOCKED")
        .env_remove("HIDEFILE_LIBRARY")
        .env_remove("RUST_LOG");
    cmd
}

fn run(home: &Path, args: &[&str]) -> Output {
    hidefile(home).args(args).output().expect("failed to run hidefile")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_check_classifies_names_and_paths() {
    let home = TempDir::new().unwrap();
    let output = run(
        home.path(),
        &[
            "check", "--hide", ".git", "--block", ".key", "--name", ".git", "--name", "src",
            "--path", "id.key", "--path", "id.pub",
        ],
    );
    assert!(output.status.success(), "{:?}", output);
    assert_eq!(
        stdout(&output),
        "hidden\t.git\nvisible\tsrc\nblocked\tid.key\t(.key)\nallowed\tid.pub\n"
    );
}

#[test]
fn test_check_reads_project_config() {
    let home = TempDir::new().unwrap();
    std::fs::create_dir_all(home.path().join(".hidefile")).unwrap();
    std::fs::write(
        home.path().join(".hidefile/config.toml"),
        "[policy]\nhidden = [\"node_modules\"]\n",
    )
    .unwrap();

    let output = run(home.path(), &["check", "--name", "node_modules"]);
    assert!(output.status.success(), "{:?}", output);
    assert_eq!(stdout(&output), "hidden\tnode_modules\n");
}

#[test]
fn test_env_prints_exports() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["env", "--hide", ".git", "--hide", "target"]);
    assert!(output.status.success(), "{:?}", output);
    assert_eq!(stdout(&output), "export HIDDEN='.git:target'\nunset BLOCKED\n");
}

#[test]
fn test_environment_overrides_config() {
    let home = TempDir::new().unwrap();
    let output = hidefile(home.path())
        .args(["env"])
        .env("BLOCKED", ".pem::.key")
        .output()
        .unwrap();
    assert!(output.status.success(), "{:?}", output);
    assert_eq!(stdout(&output), "unset HIDDEN\nexport BLOCKED='.pem:.key'\n");
}

#[test]
fn test_pattern_with_delimiter_is_rejected() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["check", "--hide", "a:b", "--name", "a"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid policy"));
}

#[test]
fn test_config_init_then_show() {
    let home = TempDir::new().unwrap();

    let output = run(home.path(), &["config", "init"]);
    assert!(output.status.success(), "{:?}", output);
    assert!(home.path().join(".hidefile/config.toml").exists());

    // A second init refuses to overwrite.
    let output = run(home.path(), &["config", "init"]);
    assert!(!output.status.success());
    let output = run(home.path(), &["config", "init", "--force"]);
    assert!(output.status.success(), "{:?}", output);

    let output = run(home.path(), &["config", "show"]);
    assert!(output.status.success(), "{:?}", output);
    let shown = stdout(&output);
    assert!(shown.contains("[policy]"));
    assert!(shown.contains("[logging]"));
}

#[test]
fn test_config_path_lists_locations() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["config", "path"]);
    assert!(output.status.success(), "{:?}", output);
    let shown = stdout(&output);
    assert!(shown.contains(".hidefile/config.toml (missing)"));
    assert!(shown.starts_with("global:"));
}

#[test]
fn test_explicit_config_file() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("custom.toml");
    std::fs::write(&file, "[policy]\nblocked = [\".env\"]\n").unwrap();

    let output = run(
        home.path(),
        &["--config", file.to_str().unwrap(), "check", "--path", "prod.env"],
    );
    assert!(output.status.success(), "{:?}", output);
    assert_eq!(stdout(&output), "blocked\tprod.env\t(.env)\n");
}

#[cfg(all(
    target_os = "linux",
    any(target_arch = "x86_64", target_arch = "aarch64", target_arch = "riscv64")
))]
#[test]
fn test_run_with_missing_library_fails() {
    let home = TempDir::new().unwrap();
    let output = run(
        home.path(),
        &["run", "--library", "does-not-exist.so", "--", "true"],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Layer library not found"));
}

#[cfg(all(
    target_os = "linux",
    any(target_arch = "x86_64", target_arch = "aarch64", target_arch = "riscv64")
))]
#[test]
fn test_run_exports_policy_and_preload() {
    let home = TempDir::new().unwrap();
    // Not a real shared object: the dynamic loader reports it on stderr and
    // carries on, which is enough to observe the child's environment.
    let library = home.path().join("libfake.so");
    std::fs::write(&library, b"").unwrap();
    let library = library.canonicalize().unwrap();

    let output = hidefile(home.path())
        .env_remove("LD_PRELOAD")
        .env("BLOCKED", ".key")
        .args([
            "run",
            "--library",
            library.to_str().unwrap(),
            "--hide",
            ".git",
            "--",
            "sh",
            "-c",
            r#"echo "$HIDDEN|$BLOCKED|$LD_PRELOAD""#,
        ])
        .output()
        .unwrap();

    assert!(output.status.success(), "{:?}", output);
    assert_eq!(
        stdout(&output),
        format!(".git|.key|{}\n", library.display())
    );
}
