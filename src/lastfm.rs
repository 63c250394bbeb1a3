//! Last.fm listening history provider

// See https://www.last.fm/api/show/user.getTopAlbums

use reqwest::Url;

use crate::{
    album::RawAlbum,
    cl::{ApiCredentials, Period},
    http::ApiHttpClient,
};

/// Last.fm API endpoint
const API_URL: &str = "https://ws.audioscrobbler.com/2.0/";

/// Preferred artwork slot, the medium sized one the grid cells are built from
const ARTWORK_SIZE: &str = "large";

/// Error while fetching the listening history.
/// An empty history is not an error, `fetch_top_albums` returns `Ok` with an
/// empty list for it, so callers can tell "no data" from an actual failure.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    /// The API returned an error payload
    #[error("Last.fm API error {code}: {message}")]
    Api {
        /// API error code
        code: u32,
        /// Human readable message from the API
        message: String,
    },
    /// The HTTP request itself failed
    #[error("HTTP request failed")]
    Http(#[source] anyhow::Error),
    /// The response could not be decoded
    #[error("Malformed API response")]
    Decode(#[source] serde_json::Error),
}

#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum Response {
    /// API level error payload
    Error {
        error: u32,
        message: String,
    },
    TopAlbums {
        topalbums: ResponseTopAlbums,
    },
}

#[derive(Debug, serde::Deserialize)]
struct ResponseTopAlbums {
    #[serde(default)]
    album: Vec<ResponseAlbum>,
}

#[derive(Debug, serde::Deserialize)]
struct ResponseAlbum {
    name: Option<String>,
    playcount: Option<serde_json::Value>,
    artist: Option<ResponseArtist>,
    #[serde(default)]
    image: Vec<ResponseImage>,
}

#[derive(Debug, serde::Deserialize)]
struct ResponseArtist {
    name: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct ResponseImage {
    #[serde(rename = "#text", default)]
    url: String,
    #[serde(default)]
    size: String,
}

impl From<ResponseAlbum> for RawAlbum {
    fn from(album: ResponseAlbum) -> Self {
        let image_url = select_artwork(&album.image);
        Self {
            album_name: album.name,
            artist_name: album.artist.and_then(|artist| artist.name),
            playcount: album.playcount,
            image_url,
        }
    }
}

/// Pick the artwork slot to use for a grid cell.
/// Prefer the "large" slot, fall back to the biggest remaining one, skip
/// empty URLs entirely.
fn select_artwork(images: &[ResponseImage]) -> Option<String> {
    images
        .iter()
        .find(|image| (image.size == ARTWORK_SIZE) && !image.url.trim().is_empty())
        .or_else(|| images.iter().rev().find(|image| !image.url.trim().is_empty()))
        .map(|image| image.url.clone())
}

/// Fetch the user's top albums over the given period.
/// Returns the albums in playcount rank order, or an empty list when the user
/// has no listening history for the period.
pub async fn fetch_top_albums(
    http: &ApiHttpClient,
    creds: &ApiCredentials,
    username: &str,
    period: Period,
) -> Result<Vec<RawAlbum>, FetchError> {
    let period_token = period.to_string();
    let url_params = [
        ("method", "user.gettopalbums"),
        ("user", username),
        ("api_key", &creds.api_key),
        ("period", &period_token),
        ("format", "json"),
    ];
    #[expect(clippy::unwrap_used)] // base URL is absolute
    let url = Url::parse_with_params(API_URL, url_params).unwrap();

    let data = http.get(url).await.map_err(FetchError::Http)?;
    let resp: Response = serde_json::from_slice(&data).map_err(FetchError::Decode)?;
    let albums = match resp {
        Response::Error { error, message } => {
            return Err(FetchError::Api {
                code: error,
                message,
            });
        }
        Response::TopAlbums { topalbums } => topalbums.album,
    };

    if albums.is_empty() {
        log::warn!("No albums found for user {username:?} over period {period_token}");
    }
    Ok(albums.into_iter().map(RawAlbum::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_top_albums_payload() {
        let payload = r##"{
            "topalbums": {
                "album": [
                    {
                        "name": "Stop Making Sense (Deluxe Edition) [Live]",
                        "playcount": "236",
                        "artist": {"name": "Talking Heads", "url": "https://www.last.fm/music/Talking+Heads"},
                        "image": [
                            {"size": "small", "#text": "https://lastfm.freetls.fastly.net/i/u/34s/585d.jpg"},
                            {"size": "medium", "#text": "https://lastfm.freetls.fastly.net/i/u/64s/585d.jpg"},
                            {"size": "large", "#text": "https://lastfm.freetls.fastly.net/i/u/174s/585d.jpg"},
                            {"size": "extralarge", "#text": "https://lastfm.freetls.fastly.net/i/u/300x300/585d.jpg"}
                        ]
                    },
                    {
                        "name": "Artless",
                        "playcount": "12",
                        "artist": {"name": "Nobody"},
                        "image": [
                            {"size": "small", "#text": ""},
                            {"size": "large", "#text": ""}
                        ]
                    }
                ],
                "@attr": {"user": "ghostgif", "totalPages": "1"}
            }
        }"##;
        let resp: Response = serde_json::from_slice(payload.as_bytes()).unwrap();
        let Response::TopAlbums { topalbums } = resp else {
            panic!("decoded as error payload");
        };
        let albums: Vec<RawAlbum> = topalbums.album.into_iter().map(RawAlbum::from).collect();
        assert_eq!(albums.len(), 2);
        assert_eq!(
            albums[0].album_name.as_deref(),
            Some("Stop Making Sense (Deluxe Edition) [Live]")
        );
        assert_eq!(albums[0].artist_name.as_deref(), Some("Talking Heads"));
        assert_eq!(albums[0].playcount, Some("236".into()));
        assert_eq!(
            albums[0].image_url.as_deref(),
            Some("https://lastfm.freetls.fastly.net/i/u/174s/585d.jpg")
        );
        // all artwork slots empty
        assert_eq!(albums[1].image_url, None);
    }

    #[test]
    fn decode_error_payload() {
        let payload = r#"{"error": 6, "message": "User not found"}"#;
        let resp: Response = serde_json::from_slice(payload.as_bytes()).unwrap();
        let Response::Error { error, message } = resp else {
            panic!("decoded as album payload");
        };
        assert_eq!(error, 6);
        assert_eq!(message, "User not found");
    }

    #[test]
    fn decode_empty_history() {
        let payload = r#"{"topalbums": {"album": [], "@attr": {"user": "ghostgif"}}}"#;
        let resp: Response = serde_json::from_slice(payload.as_bytes()).unwrap();
        let Response::TopAlbums { topalbums } = resp else {
            panic!("decoded as error payload");
        };
        assert!(topalbums.album.is_empty());
    }

    fn img(size: &str, url: &str) -> ResponseImage {
        ResponseImage {
            url: url.to_owned(),
            size: size.to_owned(),
        }
    }

    #[test]
    fn artwork_slot_selection() {
        // prefer the "large" slot
        assert_eq!(
            select_artwork(&[
                img("small", "http://img/s.png"),
                img("large", "http://img/l.png"),
                img("extralarge", "http://img/xl.png"),
            ]),
            Some("http://img/l.png".to_owned())
        );
        // fall back to the biggest non empty slot
        assert_eq!(
            select_artwork(&[
                img("small", "http://img/s.png"),
                img("large", ""),
                img("extralarge", "http://img/xl.png"),
            ]),
            Some("http://img/xl.png".to_owned())
        );
        assert_eq!(select_artwork(&[img("small", ""), img("large", "  ")]), None);
        assert_eq!(select_artwork(&[]), None);
    }
}
