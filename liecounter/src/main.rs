//! Daily "days since last lie" counter.
//!
//! Run once a day from a scheduler: `liecounter run` checks the fact-check
//! service, updates the counter file, and regenerates the static page.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use liecounter::error::{FactSourceError, RenderError, RunError, StateLoadError};
use liecounter::exit_codes;
use liecounter::io::config::{DEFAULT_CONFIG_FILE, config_base_dir, load_config};
use liecounter::io::fact_source::{GoogleFactCheck, api_key_from_env};
use liecounter::io::init::{InitOptions, init_counter};
use liecounter::logging;
use liecounter::render::render_page;
use liecounter::run::{RunRequest, run_once};
use liecounter::validate::{describe, validate_state};

#[derive(Parser)]
#[command(
    name = "liecounter",
    version,
    about = "Daily counter of days since the last fact-checked false claim"
)]
struct Cli {
    /// Path to the TOML config. Relative paths inside it resolve against its directory.
    #[arg(
        short,
        long,
        global = true,
        env = "LIECOUNTER_CONFIG",
        default_value = DEFAULT_CONFIG_FILE
    )]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default config (if missing), the seed state, and the initial page.
    Init {
        /// Replace an existing state file with the seed.
        #[arg(short, long)]
        force: bool,
    },
    /// Check the fact source once and update the counter and page.
    Run,
    /// Regenerate the page from the saved state without checking the fact source.
    Render,
    /// Check the state file against its schema and invariants.
    Validate,
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(exit_code(&err));
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Init { force } => cmd_init(&cli.config, force),
        Command::Run => cmd_run(&cli.config),
        Command::Render => cmd_render(&cli.config),
        Command::Validate => cmd_validate(&cli.config),
    }
}

fn cmd_init(config_path: &Path, force: bool) -> Result<()> {
    let outcome = init_counter(config_path, &InitOptions { force }, Utc::now().date_naive())?;
    if outcome.config_written {
        println!("wrote {}", outcome.config_path.display());
    }
    println!("wrote {}", outcome.state_path.display());
    println!("wrote {}", outcome.page_path.display());
    Ok(())
}

fn cmd_run(config_path: &Path) -> Result<()> {
    let cfg = load_config(config_path)?;
    let paths = cfg.resolve_paths(&config_base_dir(config_path));
    let source = GoogleFactCheck::new().map_err(RunError::from)?;
    let request = RunRequest {
        config: &cfg,
        paths: &paths,
        api_key: api_key_from_env(&cfg.fact_source.api_key_env),
        now: Utc::now(),
    };
    run_once(&request, &source)?;
    Ok(())
}

fn cmd_render(config_path: &Path) -> Result<()> {
    let cfg = load_config(config_path)?;
    let paths = cfg.resolve_paths(&config_base_dir(config_path));
    render_page(&paths, Utc::now().date_naive())?;
    Ok(())
}

fn cmd_validate(config_path: &Path) -> Result<()> {
    let cfg = load_config(config_path)?;
    let paths = cfg.resolve_paths(&config_base_dir(config_path));
    let state = validate_state(&paths)?;
    println!("{}", describe(&state));
    Ok(())
}

/// Map a command failure to its process exit code.
///
/// Typed failures from the run pipeline keep their own code; config and usage
/// problems fall back to `INVALID`.
fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(err) = err.downcast_ref::<RunError>() {
        err.exit_code()
    } else if err.downcast_ref::<StateLoadError>().is_some() {
        exit_codes::STATE_LOAD
    } else if err.downcast_ref::<FactSourceError>().is_some() {
        exit_codes::FACT_SOURCE
    } else if err.downcast_ref::<RenderError>().is_some() {
        exit_codes::RENDER
    } else {
        exit_codes::INVALID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_init() {
        let cli = Cli::parse_from(["liecounter", "init"]);
        assert!(matches!(cli.command, Command::Init { force: false }));
        assert_eq!(cli.config, PathBuf::from("liecounter.toml"));
    }

    #[test]
    fn parse_init_force() {
        let cli = Cli::parse_from(["liecounter", "init", "--force"]);
        assert!(matches!(cli.command, Command::Init { force: true }));
    }

    #[test]
    fn parse_config_after_subcommand() {
        let cli = Cli::parse_from(["liecounter", "run", "--config", "site/counter.toml"]);
        assert!(matches!(cli.command, Command::Run));
        assert_eq!(cli.config, PathBuf::from("site/counter.toml"));
    }

    #[test]
    fn typed_errors_keep_their_exit_codes() {
        let load: anyhow::Error = RunError::from(StateLoadError::Missing {
            path: PathBuf::from("data.json"),
        })
        .into();
        assert_eq!(exit_code(&load), exit_codes::STATE_LOAD);

        let bare: anyhow::Error = StateLoadError::Missing {
            path: PathBuf::from("data.json"),
        }
        .into();
        assert_eq!(exit_code(&bare), exit_codes::STATE_LOAD);

        let source: anyhow::Error = RunError::from(FactSourceError::MissingCredential {
            env: "KEY".to_string(),
        })
        .into();
        assert_eq!(exit_code(&source), exit_codes::FACT_SOURCE);

        assert_eq!(exit_code(&anyhow::anyhow!("bad config")), exit_codes::INVALID);
    }
}
