//! # hidefile CLI
//!
//! Launches programs under the hidefile inception layer and previews what the layer
//! would hide or block.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use hidefile_config::logging::{init_logging, LogLevel};
use hidefile_config::{Config, PROJECT_CONFIG};

mod check;
mod launch;

/// hidefile - hide directory entries and block opens for any program
#[derive(Parser)]
#[command(name = "hidefile")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file to use instead of ~/.hidefile and .hidefile lookup
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Policy overrides shared by every command that renders a policy.
#[derive(Args, Debug, Default, Clone)]
pub struct PolicyArgs {
    /// Hide directory entries whose name contains PATTERN (repeatable)
    #[arg(long = "hide", value_name = "PATTERN")]
    pub hide: Vec<String>,

    /// Deny opens of paths ending with SUFFIX (repeatable)
    #[arg(long = "block", value_name = "SUFFIX")]
    pub block: Vec<String>,
}

impl PolicyArgs {
    /// Flags replace the configured list they name.
    fn apply(&self, config: &mut Config) {
        if !self.hide.is_empty() {
            config.policy.hidden = self.hide.clone();
        }
        if !self.block.is_empty() {
            config.policy.blocked = self.block.clone();
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a command with the inception layer preloaded
    Run {
        #[command(flatten)]
        policy: PolicyArgs,

        /// Path to libhidefile_inception_layer
        #[arg(long, env = "HIDEFILE_LIBRARY", value_name = "PATH")]
        library: Option<PathBuf>,

        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        command: Vec<String>,
    },

    /// Show how names and paths would be treated, without running anything
    Check {
        #[command(flatten)]
        policy: PolicyArgs,

        /// Directory entry name to classify (repeatable)
        #[arg(long = "name", value_name = "NAME")]
        names: Vec<String>,

        /// Path to classify for open (repeatable)
        #[arg(long = "path", value_name = "PATH")]
        paths: Vec<String>,
    },

    /// Print shell exports for the effective policy
    Env {
        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the merged configuration as TOML
    Show,
    /// Print the configuration file locations
    Path,
    /// Write a default project configuration
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }

    let cli = Cli::parse();
    let loaded = load_config(cli.config.as_deref());

    let level = loaded
        .as_ref()
        .ok()
        .and_then(|config| config.logging.level.parse().ok())
        .unwrap_or(LogLevel::Info);
    init_logging(level);

    match cli.command {
        Commands::Run {
            policy,
            library,
            command,
        } => {
            let config = effective_config(loaded, &policy)?;
            launch::cmd_run(&config, library.as_deref(), &command)
        }
        Commands::Check {
            policy,
            names,
            paths,
        } => {
            let config = effective_config(loaded, &policy)?;
            check::cmd_check(&config, &names, &paths)
        }
        Commands::Env { policy } => {
            let config = effective_config(loaded, &policy)?;
            for line in check::env_lines(&config) {
                println!("{}", line);
            }
            Ok(())
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                let config = loaded?;
                print!("{}", toml::to_string_pretty(&config)?);
                Ok(())
            }
            ConfigCommands::Path => {
                cmd_config_path(cli.config.as_deref());
                Ok(())
            }
            ConfigCommands::Init { force } => cmd_config_init(force),
        },
    }
}

fn load_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => Config::load_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => Config::load().context("Failed to load config"),
    }
}

fn effective_config(loaded: Result<Config>, policy: &PolicyArgs) -> Result<Config> {
    let mut config = loaded?;
    policy.apply(&mut config);
    config.validate().context("Invalid policy")?;
    Ok(config)
}

fn cmd_config_path(explicit: Option<&Path>) {
    let describe = |path: &Path| {
        let state = if path.exists() { "found" } else { "missing" };
        format!("{} ({})", path.display(), state)
    };

    if let Some(path) = explicit {
        println!("explicit: {}", describe(path));
        return;
    }
    match Config::global_config_path() {
        Some(path) => println!("global:  {}", describe(&path)),
        None => println!("global:  (no home directory)"),
    }
    println!("project: {}", describe(Path::new(PROJECT_CONFIG)));
}

fn cmd_config_init(force: bool) -> Result<()> {
    let path = Path::new(PROJECT_CONFIG);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, Config::default_toml()?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Created {}", path.display());
    Ok(())
}
