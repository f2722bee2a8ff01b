//! `hidefile run`: locate the layer, export the policy, exec the command.

use std::env;
use std::ffi::{OsStr, OsString};
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use hidefile_config::{log_cli_debug, Config};

pub const PRELOAD_VAR: &str = "LD_PRELOAD";

/// Platform file name of the built layer, e.g. `libhidefile_inception_layer.so`.
pub fn library_file_name() -> String {
    format!(
        "{}hidefile_inception_layer{}",
        env::consts::DLL_PREFIX,
        env::consts::DLL_SUFFIX
    )
}

/// Fails where the layer is built without its `readdir`/`open` exports, since
/// preloading it there would run the command unfiltered.
#[cfg(all(
    target_os = "linux",
    any(target_arch = "x86_64", target_arch = "aarch64", target_arch = "riscv64")
))]
pub fn ensure_supported_platform() -> Result<()> {
    Ok(())
}

#[cfg(not(all(
    target_os = "linux",
    any(target_arch = "x86_64", target_arch = "aarch64", target_arch = "riscv64")
)))]
pub fn ensure_supported_platform() -> Result<()> {
    anyhow::bail!(
        "The inception layer does not interpose on {}-{}; supported targets are Linux on x86_64, aarch64 and riscv64",
        env::consts::OS,
        env::consts::ARCH
    )
}

pub fn cmd_run(config: &Config, library: Option<&Path>, command: &[String]) -> Result<()> {
    let Some((program, args)) = command.split_first() else {
        anyhow::bail!("No command specified");
    };
    ensure_supported_platform()?;
    let library = find_layer_library(library, config)?;

    let mut cmd = Command::new(program);
    cmd.args(args);
    for (key, value) in config.to_env() {
        match value {
            Some(value) => cmd.env(key, value),
            None => cmd.env_remove(key),
        };
    }
    cmd.env(
        PRELOAD_VAR,
        preload_value(&library, env::var_os(PRELOAD_VAR).as_deref()),
    );

    let library_str = library.to_string_lossy();
    log_cli_debug!(
        "Launching under inception layer",
        program = program.as_str(),
        library = &*library_str,
        hidden = config.policy.hidden.len(),
        blocked = config.policy.blocked.len(),
    );

    // exec only returns on failure.
    let err = cmd.exec();
    Err(err).with_context(|| format!("Failed to execute: {}", program))
}

/// Puts `library` in front of an existing preload list.
pub fn preload_value(library: &Path, existing: Option<&OsStr>) -> OsString {
    let mut value = OsString::from(library.as_os_str());
    if let Some(existing) = existing.filter(|v| !v.is_empty()) {
        value.push(":");
        value.push(existing);
    }
    value
}

/// Search order: `--library` / `HIDEFILE_LIBRARY`, `[layer] library`, next to the
/// executable, `../lib` relative to it, then cargo's `target/{debug,release}`.
pub fn find_layer_library(explicit: Option<&Path>, config: &Config) -> Result<PathBuf> {
    if let Some(path) = explicit.or(config.layer.library.as_deref()) {
        return path
            .canonicalize()
            .with_context(|| format!("Layer library not found: {}", path.display()));
    }

    let file_name = library_file_name();

    if let Ok(exe_path) = env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            // Same directory as the hidefile binary
            let sibling = exe_dir.join(&file_name);
            if sibling.exists() {
                return Ok(sibling);
            }

            // ../lib/ relative to bin/
            if let Some(lib_path) = exe_dir.parent().map(|p| p.join("lib").join(&file_name)) {
                if lib_path.exists() {
                    return Ok(lib_path);
                }
            }
        }
    }

    // Development mode
    for profile in ["debug", "release"] {
        let candidate = Path::new("target").join(profile).join(&file_name);
        if candidate.exists() {
            return candidate
                .canonicalize()
                .context("Failed to resolve target path");
        }
    }

    anyhow::bail!(
        "Could not find {}. Run 'cargo build -p hidefile-inception-layer' or pass --library.",
        file_name
    )
}
