//! Internal API exposed for the `lastgrid` binary

use std::{
    path::Path,
    process::{ExitCode, Termination},
};

use anyhow::Context as _;

use crate::{
    cl::{ApiCredentials, GridSize, Period},
    collage::CollageCell,
    http::ApiHttpClient,
};

pub mod album;
pub mod cl;
pub mod collage;
pub mod http;
pub mod lastfm;

/// Status of a successful generation run
pub enum CollageStatus {
    /// A collage was composed and saved
    Created,
    /// The upstream history was empty, nothing to lay out
    NoData,
}

impl Termination for CollageStatus {
    fn report(self) -> ExitCode {
        match self {
            CollageStatus::Created => ExitCode::SUCCESS,
            CollageStatus::NoData => ExitCode::FAILURE,
        }
    }
}

/// Fetch the user's top albums, compose the album artwork collage, print the
/// numbered album summary, and save the result as a PNG file
pub async fn generate(
    output: &Path,
    username: &str,
    period: Period,
    grid: GridSize,
    creds: &ApiCredentials,
    progress: Option<async_channel::Sender<()>>,
) -> anyhow::Result<CollageStatus> {
    let http = ApiHttpClient::new()?;

    // Fetch
    let records = lastfm::fetch_top_albums(&http, creds, username, period)
        .await
        .context("Failed to fetch top albums")?;
    if records.is_empty() {
        log::warn!("No albums found for user {username:?} over period {period}, nothing to compose");
        return Ok(CollageStatus::NoData);
    }

    // Only the first grid's worth of albums makes it into the collage and the summary
    let spec = grid.spec();
    let records: Vec<_> = records
        .into_iter()
        .take(spec.cell_count())
        .collect();

    // Format metadata
    let albums = album::format_albums(&records);

    // Compose
    let cells = records
        .into_iter()
        .map(|record| CollageCell {
            label: record.album_name.unwrap_or_else(|| "Unknown".to_owned()),
            artwork_url: record.image_url,
        })
        .collect();
    let collage = collage::compose(&http, cells, spec, progress).await;

    for line in album::summary_lines(&albums) {
        println!("{line}");
    }

    // Save
    collage::save(&collage, output).await?;
    log::info!("Collage saved to {output:?}");

    Ok(CollageStatus::Created)
}
