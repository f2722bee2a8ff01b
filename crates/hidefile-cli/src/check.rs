//! Dry-run classification with the same matching code the layer runs.

use anyhow::Result;
use hidefile_config::Config;
use hidefile_policy::{blocking_suffix, is_hidden};

pub fn cmd_check(config: &Config, names: &[String], paths: &[String]) -> Result<()> {
    if names.is_empty() && paths.is_empty() {
        anyhow::bail!("Nothing to check: pass --name and/or --path");
    }
    for line in classify(config, names, paths) {
        println!("{}", line);
    }
    Ok(())
}

/// One line per input: `hidden`/`visible` for names, `blocked`/`allowed` for paths.
pub fn classify(config: &Config, names: &[String], paths: &[String]) -> Vec<String> {
    let hidden = config.hidden_list();
    let blocked = config.blocked_list();
    let mut lines = Vec::with_capacity(names.len() + paths.len());

    for name in names {
        let verdict = if is_hidden(&hidden, name.as_bytes()) {
            "hidden"
        } else {
            "visible"
        };
        lines.push(format!("{}\t{}", verdict, name));
    }
    for path in paths {
        match blocking_suffix(&blocked, path.as_bytes()) {
            Some(suffix) => lines.push(format!(
                "blocked\t{}\t({})",
                path,
                String::from_utf8_lossy(suffix)
            )),
            None => lines.push(format!("allowed\t{}", path)),
        }
    }
    lines
}

/// `export`/`unset` lines for `eval "$(hidefile env)"`.
pub fn env_lines(config: &Config) -> Vec<String> {
    config
        .to_env()
        .into_iter()
        .map(|(key, value)| match value {
            Some(value) => format!("export {}={}", key, shell_quote(&value)),
            None => format!("unset {}", key),
        })
        .collect()
}

fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
