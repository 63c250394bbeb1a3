//! lastgrid main binary

use std::time::Duration;

use anyhow::Context as _;
use clap::Parser as _;
use indicatif::{ProgressBar, ProgressStyle};
use lastgrid::{CollageStatus, cl, generate};

#[tokio::main]
async fn main() -> anyhow::Result<CollageStatus> {
    // Parse CL args
    let cl_args = cl::LastgridArgs::parse();

    // Init logger
    simple_logger::init_with_level(cl_args.verbosity).context("Failed to setup logger")?;

    // Resolve credentials once, before any network work
    let creds = cl::ApiCredentials::resolve(cl_args.api_key)?;

    // Progress bar fed by per cell completion events
    let cell_count = cl_args.grid.spec().cell_count();
    let progress_bar = ProgressBar::new(cell_count.try_into().unwrap_or(u64::MAX));
    progress_bar
        .set_style(ProgressStyle::default_bar().template("{spinner} [{bar}] {pos}/{len} cells")?);
    progress_bar.enable_steady_tick(Duration::from_millis(300));
    let (progress_tx, progress_rx) = async_channel::bounded::<()>(cell_count);
    let progress_task = tokio::spawn({
        let progress_bar = progress_bar.clone();
        async move {
            while progress_rx.recv().await.is_ok() {
                progress_bar.inc(1);
            }
        }
    });

    // Run
    let status = generate(
        &cl_args.output_filepath,
        &cl_args.username,
        cl_args.period,
        cl_args.grid,
        &creds,
        Some(progress_tx),
    )
    .await;

    // generate() dropped its sender, so the channel is closed by now
    let _ = progress_task.await;
    progress_bar.finish_and_clear();

    status
}
