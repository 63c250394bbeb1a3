//! Album metadata model and formatting

/// A loosely structured album entry as returned by the history provider.
/// Every field is optional, validation happens in [`format_albums`].
#[derive(Debug, Clone, PartialEq)]
pub struct RawAlbum {
    /// Album title
    pub album_name: Option<String>,
    /// Artist name
    pub artist_name: Option<String>,
    /// Play count, kept opaque until formatting
    pub playcount: Option<serde_json::Value>,
    /// Album artwork URL
    pub image_url: Option<String>,
}

/// Validated album metadata ready for display
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AlbumInfo {
    /// Album title
    pub album_name: String,
    /// Artist name
    pub artist_name: String,
    /// Play count over the selected period
    pub playcount: u64,
}

/// Validate and reshape raw entries into display-ready metadata.
/// An entry missing its album name, artist name or play count is dropped with
/// a diagnostic and processing continues, accepted entries keep their input
/// order.
#[must_use]
pub fn format_albums(records: &[RawAlbum]) -> Vec<AlbumInfo> {
    let mut albums = Vec::with_capacity(records.len());
    for record in records {
        let (Some(album_name), Some(artist_name), Some(playcount)) =
            (&record.album_name, &record.artist_name, &record.playcount)
        else {
            log::warn!("Invalid album data: {record:?}");
            continue;
        };
        albums.push(AlbumInfo {
            album_name: album_name.clone(),
            artist_name: artist_name.clone(),
            playcount: coerce_playcount(playcount),
        });
    }
    albums
}

/// Coerce the play count to an integer.
/// The API serializes it as a decimal string, accept both that and plain JSON
/// numbers, anything else counts as 0 with a diagnostic.
fn coerce_playcount(value: &serde_json::Value) -> u64 {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.unwrap_or_else(|| {
        log::warn!("Unparseable play count {value:?}, counting as 0");
        0
    })
}

/// Render the numbered album summary displayed alongside the collage
#[must_use]
pub fn summary_lines(albums: &[AlbumInfo]) -> Vec<String> {
    albums
        .iter()
        .enumerate()
        .map(|(i, album)| {
            format!(
                "{}. {} - {} - {} plays",
                i + 1,
                album.album_name,
                album.artist_name,
                album.playcount
            )
        })
        .collect()
}
