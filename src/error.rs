//! Error type shared by the whole crate.

use std::io;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can abort a run.
///
/// Rows skipped by the delegation heuristics are not errors and never show up here.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid IP address '{0}'")]
    InvalidAddress(String),

    #[error("prefix /{prefix} is out of range for {family}")]
    InvalidPrefix { family: &'static str, prefix: u8 },

    #[error("{addr} is not aligned to /{prefix}")]
    Misaligned { addr: String, prefix: u8 },

    #[error("invalid address count '{0}'")]
    InvalidCount(String),

    #[error("range starting at {start} with {count} addresses overflows {family}")]
    RangeOverflow {
        start: String,
        count: String,
        family: &'static str,
    },

    #[error("malformed delegation row #{line}: {reason}")]
    MalformedRow { line: u64, reason: String },

    #[error("unknown resource type '{0}'")]
    UnknownResource(String),

    #[error("country policy: {0}")]
    Policy(String),

    #[error("configuration: {0}")]
    Config(String),

    #[error("geolocation database: {0}")]
    GeoDb(#[from] maxminddb::MaxMindDBError),

    #[error("delegation feed: {0}")]
    Csv(#[from] csv::Error),

    #[error("archive: {0}")]
    Archive(String),

    #[error("download failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Fetch(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
