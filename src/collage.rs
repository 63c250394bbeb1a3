//! Collage compositing engine

use std::{num::NonZeroU32, path::Path, sync::Arc};

use anyhow::Context as _;
use image::{Rgb, RgbImage, imageops};
use reqwest::Url;
use tokio::sync::Semaphore;

use crate::http::ApiHttpClient;

/// Width and height of a single grid cell in pixels
pub const CELL_SIZE: u32 = 150;

/// Artwork downloads are IO bound and all hit the same remote host,
/// so no need for more than that
const MAX_CONCURRENT_ACQUISITIONS: usize = 8;

/// Collage grid dimensions
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct GridSpec {
    /// Grid columns
    columns: NonZeroU32,
    /// Grid rows
    rows: NonZeroU32,
}

impl GridSpec {
    /// Create a square grid
    #[must_use]
    pub fn square(side: NonZeroU32) -> Self {
        Self {
            columns: side,
            rows: side,
        }
    }

    /// Get column count
    #[must_use]
    pub fn columns(&self) -> u32 {
        self.columns.get()
    }

    /// Get row count
    #[must_use]
    pub fn rows(&self) -> u32 {
        self.rows.get()
    }

    /// Get total cell count
    #[must_use]
    pub fn cell_count(&self) -> usize {
        (self.columns() * self.rows()) as usize
    }

    /// Get canvas width in pixels
    #[must_use]
    pub fn width_px(&self) -> u32 {
        self.columns() * CELL_SIZE
    }

    /// Get canvas height in pixels
    #[must_use]
    pub fn height_px(&self) -> u32 {
        self.rows() * CELL_SIZE
    }
}

/// One grid cell: album label and optional artwork locator
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CollageCell {
    /// Album name, only used in diagnostics
    pub label: String,
    /// Artwork URL, if the album has one
    pub artwork_url: Option<String>,
}

impl CollageCell {
    /// Padding cell for grids with fewer albums than cells
    fn empty() -> Self {
        Self {
            label: "Empty".to_owned(),
            artwork_url: None,
        }
    }
}

/// Pad or truncate the cell list to exactly the grid cell count
fn normalize_cells(mut cells: Vec<CollageCell>, spec: &GridSpec) -> Vec<CollageCell> {
    cells.resize_with(spec.cell_count(), CollageCell::empty);
    cells
}

/// Opaque white placeholder for cells with absent or failed artwork
fn placeholder() -> RgbImage {
    RgbImage::from_pixel(CELL_SIZE, CELL_SIZE, Rgb([255, 255, 255]))
}

/// Download and decode a cell artwork, stretched to the cell size
async fn fetch_artwork(http: &ApiHttpClient, url: &str) -> anyhow::Result<RgbImage> {
    let url: Url = url
        .parse()
        .with_context(|| format!("Unable to parse URL {url:?}"))?;
    let buf = http.download_artwork(url).await?;
    let img = tokio::task::spawn_blocking(move || -> anyhow::Result<RgbImage> {
        let img = image::load_from_memory(&buf).context("Failed to decode image")?;
        Ok(img
            .resize_exact(CELL_SIZE, CELL_SIZE, imageops::FilterType::Lanczos3)
            .to_rgb8())
    })
    .await??;
    Ok(img)
}

/// Produce the image for a single cell.
/// Total: download, decode or resize failures degrade to the white placeholder
/// with a diagnostic, they never propagate.
async fn acquire(http: &ApiHttpClient, cell: &CollageCell) -> RgbImage {
    let Some(url) = &cell.artwork_url else {
        return placeholder();
    };
    match fetch_artwork(http, url).await {
        Ok(img) => img,
        Err(err) => {
            log::warn!("Failed to load image for {}: {err:#}", cell.label);
            placeholder()
        }
    }
}

/// Paste cell images onto a blank white canvas in row major order
fn assemble(images: &[RgbImage], spec: &GridSpec) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(spec.width_px(), spec.height_px(), Rgb([255, 255, 255]));
    for (i, img) in (0u32..).zip(images.iter()) {
        let x = (i % spec.columns()) * CELL_SIZE;
        let y = (i / spec.columns()) * CELL_SIZE;
        imageops::replace(&mut canvas, img, i64::from(x), i64::from(y));
    }
    canvas
}

/// Compose the collage: normalize the cell list to the grid size, acquire all
/// artwork concurrently, and paste the results in row major order.
/// Each completed cell sends one unit on the progress channel.
pub async fn compose(
    http: &ApiHttpClient,
    cells: Vec<CollageCell>,
    spec: GridSpec,
    progress: Option<async_channel::Sender<()>>,
) -> RgbImage {
    let cells = normalize_cells(cells, &spec);

    let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_ACQUISITIONS));
    let acquisitions: Vec<_> = cells
        .into_iter()
        .map(|cell| {
            let http = http.clone();
            let semaphore = Arc::clone(&semaphore);
            let progress = progress.clone();
            tokio::spawn(async move {
                // the semaphore is never closed, so this cannot fail
                let _permit = semaphore.acquire().await;
                let img = acquire(&http, &cell).await;
                if let Some(progress) = progress {
                    let _ = progress.send(()).await;
                }
                img
            })
        })
        .collect();

    // join_all preserves input order, so placement follows the cell index,
    // not completion order
    let images: Vec<_> = futures::future::join_all(acquisitions)
        .await
        .into_iter()
        .map(|res| {
            res.unwrap_or_else(|err| {
                log::error!("Artwork acquisition task failed: {err}");
                placeholder()
            })
        })
        .collect();

    assemble(&images, &spec)
}

/// Write the collage to a PNG file (RGB, no embedded metadata) and crunch it
pub async fn save(collage: &RgbImage, output: &Path) -> anyhow::Result<()> {
    collage
        .save_with_format(output, image::ImageFormat::Png)
        .with_context(|| format!("Failed to write PNG file {output:?}"))?;

    log::info!("Crunching PNG file {output:?}...");
    let output = output.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let options = oxipng::Options::from_preset(2);
        match oxipng::optimize(
            &oxipng::InFile::Path(output.clone()),
            &oxipng::OutFile::from_path(output.clone()),
            &options,
        ) {
            #[expect(clippy::cast_precision_loss)]
            Ok((size_before, size_after)) => {
                let size_delta = size_before.checked_sub(size_after).unwrap_or_default();
                log::debug!(
                    "PNG crunching saved {} bytes ({:.02}%)",
                    size_delta,
                    100.0 * size_delta as f64 / size_before as f64
                );
            }
            Err(err) => {
                log::warn!("Failed to crunch PNG file {output:?}: {err}");
            }
        }
    })
    .await?;

    Ok(())
}
