use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use snotes::cli::{Cli, Commands};
use snotes::{commands, Notes};
use snotes_core::config::NotesConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;
    let mut notes = Notes::open(config).await?;

    let result = match cli.command {
        Commands::NewFile(args) => commands::handle_new_file(args, &mut notes).await,
        Commands::NewFolder(args) => commands::handle_new_folder(args, &mut notes).await,
        Commands::Rename(args) => commands::handle_rename(args, &mut notes).await,
        Commands::Move(args) => commands::handle_move(args, &mut notes).await,
        Commands::Delete(args) => commands::handle_delete(args, &mut notes).await,
        Commands::Edit(args) => commands::handle_edit(args, &mut notes).await,
        Commands::Save => commands::handle_save(&mut notes).await,
        Commands::List => commands::handle_list(&notes),
        Commands::Show(args) => commands::handle_show(args, &notes),
        Commands::ExportNote(args) => commands::handle_export_note(args, &notes).await,
        Commands::ExportAll(args) => commands::handle_export_all(args, &notes).await,
        Commands::ImportFolder(args) => commands::handle_import_folder(args, &mut notes).await,
        Commands::ExportDb(args) => commands::handle_export_db(args, &notes).await,
        Commands::ImportDb(args) => commands::handle_import_db(args, &mut notes).await,
        Commands::Disk => commands::handle_disk(&notes).await,
    };

    // Pending edits are flushed even if the command itself failed.
    let closed = notes.close().await;
    result?;
    closed
}

/// `-q` shows only errors; each `-v` raises the level from WARN. `RUST_LOG` overrides both.
fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config(cli: &Cli) -> Result<NotesConfig> {
    let mut config = match &cli.data_dir {
        Some(dir) => NotesConfig::in_dir(dir),
        None => NotesConfig::platform_default()
            .context("No platform data directory found; pass --data-dir")?,
    };
    if let Some(cache_file) = &cli.cache_file {
        config = config.with_cache_file(cache_file);
    }
    if let Some(ms) = cli.debounce_ms {
        config = config.with_quiescence(Duration::from_millis(ms));
    }
    Ok(config)
}
