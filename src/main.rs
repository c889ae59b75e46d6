//! NewsHub Environment Bootstrapper CLI
//!
//! Copies the example env file, validates the required variables and prints a
//! short status summary for a NewsHub development checkout.

use anyhow::{Context, Result};
use clap::Parser;
use newshub_env::{Bootstrapper, CONFIG_FILE_NAME, CheckOutcome, Config, CopyOutcome};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "newshub-env")]
#[command(about = "NewsHub development environment bootstrap utility")]
#[command(version = "0.1.0")]
#[command(long_about = "
Prepares a NewsHub development checkout. Flags can be combined; without any
action flag the summary is printed.

Examples:
  newshub-env                              # Print the environment summary
  newshub-env --bootstrap-env              # Create .env.local from the example
  newshub-env --bootstrap-env --force      # Overwrite an existing .env.local
  newshub-env --check-env                  # Validate required variables
  newshub-env --bootstrap-env --check-env --summary
")]
struct Cli {
    /// Create .env.local from .env.local.example if needed
    #[arg(long)]
    bootstrap_env: bool,

    /// Overwrite an existing .env.local with the example (careful)
    #[arg(long)]
    force: bool,

    /// Validate that the required environment variables are filled in
    #[arg(long)]
    check_env: bool,

    /// Print the environment summary (default when no other action is given)
    #[arg(long)]
    summary: bool,

    /// Print the effective configuration as TOML
    #[arg(long)]
    show_config: bool,

    /// Project root (default: two levels above the executable)
    #[arg(long, value_name = "DIRECTORY", env = "NEWSHUB_ROOT")]
    root: Option<PathBuf>,

    /// Configuration file path (default: <root>/newshub-env.toml if present)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn ran_action(&self) -> bool {
        self.bootstrap_env || self.check_env || self.show_config
    }

    fn wants_summary(&self) -> bool {
        self.summary || !self.ran_action()
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli, root: &std::path::Path) -> Result<Config> {
    if let Some(config_path) = &cli.config {
        return Bootstrapper::load_config(config_path).context("Failed to load configuration file");
    }

    let default_config = root.join(CONFIG_FILE_NAME);
    if default_config.exists() {
        debug!(path = %default_config.display(), "loading default config");
        Bootstrapper::load_config(default_config)
    } else {
        Ok(Config::default())
    }
}

fn bootstrap_env(bootstrapper: &Bootstrapper, force: bool) -> bool {
    match bootstrapper.copy_example(force) {
        Ok(CopyOutcome::Copied) => {
            println!("Created {}", bootstrapper.env_file_name());
            true
        }
        Ok(CopyOutcome::Skipped) => true,
        Ok(CopyOutcome::MissingExample) => {
            eprintln!("error: {} not found", bootstrapper.env_example_name());
            false
        }
        Err(e) => {
            eprintln!("error: {:#}", e);
            false
        }
    }
}

fn check_env(bootstrapper: &Bootstrapper) -> bool {
    match bootstrapper.check_env() {
        Ok(CheckOutcome::Complete) => {
            println!("All required environment variables are set.");
            true
        }
        Ok(CheckOutcome::MissingEnvFile) => {
            println!(
                "error: {} does not exist. Create it with --bootstrap-env.",
                bootstrapper.env_file_name()
            );
            false
        }
        Ok(CheckOutcome::MissingKeys(missing)) => {
            println!("error: the following environment variables are empty:");
            for key in missing {
                println!("   - {}", key);
            }
            false
        }
        Err(e) => {
            eprintln!("error: {:#}", e);
            false
        }
    }
}

fn show_config(config: &Config) -> Result<()> {
    let toml_content =
        toml::to_string_pretty(config).context("Failed to serialize configuration")?;
    println!("{}", toml_content);
    Ok(())
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let root = match &cli.root {
        Some(root) => root.clone(),
        None => newshub_env::default_root()?,
    };

    let config = load_config(&cli, &root)?;
    let bootstrapper = Bootstrapper::with_config(&root, config.clone());

    let mut success = true;

    if cli.bootstrap_env {
        success &= bootstrap_env(&bootstrapper, cli.force);
    } else if cli.force {
        warn!("--force has no effect without --bootstrap-env");
    }

    if cli.check_env {
        success &= check_env(&bootstrapper);
    }

    if cli.show_config {
        show_config(&config)?;
    }

    if cli.wants_summary() {
        println!("{}", bootstrapper.summarize());
    }

    debug!(success, "finished");
    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert()
    }

    #[test]
    fn test_default_runs_summary_only() {
        let cli = Cli::try_parse_from(["newshub-env"]).unwrap();

        assert!(!cli.bootstrap_env);
        assert!(!cli.check_env);
        assert!(!cli.ran_action());
        assert!(cli.wants_summary());
    }

    #[test]
    fn test_combined_flags_parsing() {
        let cli = Cli::try_parse_from([
            "newshub-env",
            "--bootstrap-env",
            "--force",
            "--check-env",
            "--root",
            "./newshub",
            "--verbose",
        ])
        .unwrap();

        assert!(cli.bootstrap_env);
        assert!(cli.force);
        assert!(cli.check_env);
        assert!(cli.verbose);
        assert_eq!(cli.root, Some(PathBuf::from("./newshub")));
        assert!(!cli.wants_summary());
    }

    #[test]
    fn test_explicit_summary_with_action() {
        let cli = Cli::try_parse_from(["newshub-env", "--check-env", "--summary"]).unwrap();
        assert!(cli.wants_summary());

        let cli = Cli::try_parse_from(["newshub-env", "--show-config"]).unwrap();
        assert!(!cli.wants_summary());
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(Cli::try_parse_from(["newshub-env", "--bootstrap"]).is_err());
    }
}
