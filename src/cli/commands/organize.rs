//! The organize run.

use anyhow::Context;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::runtime::Runtime;

use super::Cli;
use crate::batch::{BatchRunner, render_summary};
use crate::catalog::build_catalog;
use crate::config;
use crate::identify::{
    DisambiguationResolver, Prompter, ScriptedPrompter, TerminalPrompter,
    TrackResolutionPipeline,
};

/// Identify, relocate and retag every audio file under the source directory.
pub fn cmd_organize(rt: &Runtime, cli: &Cli) -> anyhow::Result<()> {
    let mut config = config::load();
    let options = cli.organize_options(&config);
    options.validate()?;

    let credentials = cli.spotify_credentials(&config);
    if cli.remember_credentials {
        match &credentials {
            Some(creds) => {
                config.credentials.spotify_client_id = Some(creds.client_id.clone());
                config.credentials.spotify_client_secret = Some(creds.client_secret.clone());
                config::save(&config).context("Failed to save credentials")?;
            }
            None => tracing::warn!("No Spotify credentials given; nothing to remember"),
        }
    }

    let catalog = build_catalog(options.backend, credentials)
        .with_context(|| format!("Failed to set up the {} catalog", options.backend))?;

    let prompter: Arc<dyn Prompter> = if cli.non_interactive {
        Arc::new(ScriptedPrompter::unattended())
    } else {
        Arc::new(TerminalPrompter::new())
    };

    println!("Source: {}", options.source_dir.display());
    println!("Destination: {}", options.destination_dir.display());
    println!("Catalog: {}", catalog.name());
    if options.dry_run {
        println!("\n[DRY RUN MODE - No files will be changed]");
    }

    let dry_run = options.dry_run;
    let pipeline = TrackResolutionPipeline::new(catalog, DisambiguationResolver::new(prompter));
    let runner = BatchRunner::new(pipeline, options);

    let cancel = runner.cancel_flag();
    rt.spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        eprintln!("\nStopping after the current file; press Ctrl-C again to quit now");
        cancel.store(true, Ordering::SeqCst);

        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted");
            std::process::exit(130);
        }
    });

    let summary = rt.block_on(runner.run())?;
    print!("{}", render_summary(&summary, dry_run));
    Ok(())
}
