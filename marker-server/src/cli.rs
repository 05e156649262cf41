//! Command line surface: normal startup plus a `--init` first-boot wizard
//! that writes a `.env` before the service ever reaches `Running`
//! (`spec.md` §5's `FirstBoot` state, handled entirely here so
//! `marker-core::Service` never has to know about it).

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input};

#[derive(Parser, Debug)]
#[command(name = "marker-server")]
#[command(about = "Marker-management daemon: CRUD, shift, and purge reconciliation over HTTP")]
pub struct Args {
    /// Run the first-boot setup wizard and exit.
    #[arg(long)]
    pub init: bool,

    /// Path to the `.env` file the wizard writes and the server loads.
    #[arg(long, default_value = ".env")]
    pub env_file: PathBuf,
}

/// `FirstBoot`: prompts for the settings `Config::from_env` otherwise reads
/// from the environment, then writes them to `env_file`.
pub fn run_init_wizard(env_file: &PathBuf) -> Result<()> {
    let theme = ColorfulTheme::default();

    let database_path: String = Input::with_theme(&theme)
        .with_prompt("Library database connection string (postgres://...)")
        .interact_text()
        .context("reading database connection string")?;

    let metadata_path: String = Input::with_theme(&theme)
        .with_prompt("Action log database file")
        .default("./marker-metadata.sqlite".into())
        .interact_text()
        .context("reading metadata path")?;

    let host: String = Input::with_theme(&theme)
        .with_prompt("Bind host")
        .default("127.0.0.1".into())
        .interact_text()
        .context("reading host")?;

    let port: String = Input::with_theme(&theme)
        .with_prompt("Bind port")
        .default("8677".into())
        .interact_text()
        .context("reading port")?;

    let backup_actions = Confirm::with_theme(&theme)
        .with_prompt("Enable the action log / purge reconciler?")
        .default(true)
        .interact()
        .context("reading backup_actions")?;

    let extended_marker_stats = Confirm::with_theme(&theme)
        .with_prompt("Enable the marker cache (extended stats)?")
        .default(true)
        .interact()
        .context("reading extended_marker_stats")?;

    let contents = format!(
        "MARKER_DATABASE_PATH={database_path}\n\
         MARKER_METADATA_PATH={metadata_path}\n\
         MARKER_HOST={host}\n\
         MARKER_PORT={port}\n\
         MARKER_BACKUP_ACTIONS={backup_actions}\n\
         MARKER_EXTENDED_STATS={extended_marker_stats}\n"
    );

    fs::write(env_file, contents).with_context(|| format!("writing {}", env_file.display()))?;
    println!("Wrote configuration to {}", env_file.display());
    Ok(())
}
