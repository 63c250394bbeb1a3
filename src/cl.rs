//! Command line interface

use std::{env, num::NonZeroU32, path::PathBuf};

use anyhow::Context as _;
use clap::Parser;

use crate::collage::GridSpec;

/// Environment variable read when `--api-key` is not given
pub const API_KEY_ENV_VAR: &str = "LASTFM_API_KEY";

/// Command line arguments for `lastgrid` binary
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct LastgridArgs {
    /// Last.fm username to fetch top albums for
    pub username: String,
    /// Output collage image file path (PNG)
    pub output_filepath: PathBuf,
    /// Listening history period to rank albums over
    /// (7day/1week, 1month, 3month, 6month, 12month)
    #[clap(short, long, default_value_t = Period::OneMonth)]
    pub period: Period,
    /// Collage grid size (3x3, 4x4, 5x5)
    #[clap(short, long, default_value_t = GridSize::Three)]
    pub grid: GridSize,
    /// Last.fm API key, read from the LASTFM_API_KEY environment variable if not set
    #[clap(short, long)]
    pub api_key: Option<String>,
    /// Level of logging output
    #[clap(short, long, default_value_t = log::Level::Info)]
    pub verbosity: log::Level,
}

/// Listening history period, as accepted by the Last.fm API
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, strum::EnumString, strum::Display)]
pub enum Period {
    /// Last week ("1week" is accepted as an alias for the API token)
    #[strum(to_string = "7day", serialize = "1week")]
    SevenDay,
    /// Last month
    #[strum(serialize = "1month")]
    OneMonth,
    /// Last three months
    #[strum(serialize = "3month")]
    ThreeMonth,
    /// Last six months
    #[strum(serialize = "6month")]
    SixMonth,
    /// Last twelve months
    #[strum(serialize = "12month")]
    TwelveMonth,
}

/// Collage grid size preset.
/// Anything else on the command line is a reported parse error, there is no
/// silent fallback to a default.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, strum::EnumString, strum::Display)]
pub enum GridSize {
    /// 3x3 grid
    #[strum(serialize = "3x3")]
    Three,
    /// 4x4 grid
    #[strum(serialize = "4x4")]
    Four,
    /// 5x5 grid
    #[strum(serialize = "5x5")]
    Five,
}

impl GridSize {
    /// Get grid dimensions for this preset
    #[must_use]
    pub fn spec(self) -> GridSpec {
        #[expect(clippy::unwrap_used)] // all presets are non-zero
        let side = NonZeroU32::new(match self {
            GridSize::Three => 3,
            GridSize::Four => 4,
            GridSize::Five => 5,
        })
        .unwrap();
        GridSpec::square(side)
    }
}

/// Last.fm API credentials, resolved once at startup and passed explicitly
/// to the fetch collaborator
#[derive(Debug)]
pub struct ApiCredentials {
    /// API key sent with every API request
    pub api_key: String,
}

impl ApiCredentials {
    /// Resolve credentials from the command line value or the environment
    pub fn resolve(cl_api_key: Option<String>) -> anyhow::Result<Self> {
        let api_key = match cl_api_key {
            Some(api_key) => api_key,
            None => env::var(API_KEY_ENV_VAR).with_context(|| {
                format!("No API key given on the command line, and {API_KEY_ENV_VAR} is not set")
            })?,
        };
        anyhow::ensure!(!api_key.trim().is_empty(), "API key is empty");
        Ok(Self { api_key })
    }
}
