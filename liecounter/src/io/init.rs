//! Seeding of the config, state file and page.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use tracing::info;

use super::config::{CounterConfig, config_base_dir, load_config, write_config};
use super::page::write_page;
use super::state_store::write_state;
use crate::core::types::CounterState;

/// Options for `init_counter`.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// If true, replace an existing state file with the seed.
    pub force: bool,
}

/// Files touched by `init_counter`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitOutcome {
    pub config_path: PathBuf,
    pub config_written: bool,
    pub state_path: PathBuf,
    pub page_path: PathBuf,
}

/// Seed the counter next to `config_path`.
///
/// Writes a default config if none exists (an existing config is never
/// touched), writes the seed state, and renders the initial page. Fails if the
/// state file already exists unless `options.force` is set.
pub fn init_counter(
    config_path: &Path,
    options: &InitOptions,
    today: NaiveDate,
) -> Result<InitOutcome> {
    let config_written = !config_path.exists();
    let cfg = if config_written {
        let cfg = CounterConfig::default();
        write_config(config_path, &cfg)?;
        cfg
    } else {
        load_config(config_path)?
    };

    let paths = cfg.resolve_paths(&config_base_dir(config_path));
    if paths.state_path.exists() && !options.force {
        return Err(anyhow!(
            "{} already exists (use --force to reseed)",
            paths.state_path.display()
        ));
    }

    let seed = CounterState::seed();
    write_state(&paths.state_path, &seed).context("write seed state")?;
    write_page(&paths.page_path, &seed, today).context("render initial page")?;
    info!(
        state = %paths.state_path.display(),
        term_1 = seed.term_1,
        "counter seeded"
    );

    Ok(InitOutcome {
        config_path: config_path.to_path_buf(),
        config_written,
        state_path: paths.state_path,
        page_path: paths.page_path,
    })
}
