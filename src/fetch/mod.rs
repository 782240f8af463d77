//! Getting the source data onto local disk.
//!
//! - [`download`] - HTTP downloads
//! - [`archive`] - GeoLite2 archive extraction
//!
//! All downloads run concurrently and are joined before the table is built.

mod archive;
mod download;

use crate::config::{geolite_url, Config, GEOLITE_ARCHIVE_NAME, LICENSE_ENV, RIR_URLS};
use crate::error::{Error, Result};
use futures::future::join_all;
use std::path::{Path, PathBuf};

pub use archive::extract_mmdb;
pub use download::{download, file_name, redact};

/// Local paths of the inputs of one run.
#[derive(Debug, Clone)]
pub struct Sources {
    pub mmdb: PathBuf,
    pub feeds: Vec<PathBuf>,
}

/// Download whatever the config does not point at locally.
pub async fn fetch_sources(config: &Config, work_dir: &Path) -> Result<Sources> {
    let client = reqwest::Client::new();
    let (mmdb, feeds) = tokio::try_join!(
        fetch_mmdb(&client, config, work_dir),
        fetch_feeds(&client, config, work_dir)
    )?;
    Ok(Sources { mmdb, feeds })
}

async fn fetch_mmdb(
    client: &reqwest::Client,
    config: &Config,
    work_dir: &Path,
) -> Result<PathBuf> {
    if let Some(path) = &config.mmdb {
        log::info!("Using local database {}", path.display());
        return Ok(path.clone());
    }
    let key = config.license_key.as_deref().ok_or_else(|| {
        Error::Config(format!(
            "a MaxMind license key is required (--maxmind-token or {LICENSE_ENV})"
        ))
    })?;
    let dest = work_dir.join(GEOLITE_ARCHIVE_NAME);
    let archive = download(client, &geolite_url(key), &dest).await?;
    let dir = work_dir.to_path_buf();
    tokio::task::spawn_blocking(move || extract_mmdb(&archive, &dir)).await?
}

/// Where each of the RIR feeds lands inside `work_dir`.
fn feed_paths(work_dir: &Path) -> Vec<PathBuf> {
    RIR_URLS
        .iter()
        .map(|url| work_dir.join(file_name(url)))
        .collect()
}

/// Download all RIR feeds; every failure is reported, not just the first.
async fn fetch_feeds(
    client: &reqwest::Client,
    config: &Config,
    work_dir: &Path,
) -> Result<Vec<PathBuf>> {
    if !config.delegations.is_empty() {
        log::info!("Using {} local delegation feeds", config.delegations.len());
        return Ok(config.delegations.clone());
    }
    let dests = feed_paths(work_dir);
    let results = join_all(
        RIR_URLS
            .iter()
            .zip(&dests)
            .map(|(url, dest)| download(client, url, dest)),
    )
    .await;

    let mut files = Vec::with_capacity(results.len());
    let mut errors = Vec::new();
    for (url, result) in RIR_URLS.iter().zip(results) {
        match result {
            Ok(path) => files.push(path),
            Err(e) => errors.push(format!("{url}: {e}")),
        }
    }
    if !errors.is_empty() {
        return Err(Error::Fetch(errors.join("\n")));
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_sources_skip_download() {
        let config = Config {
            mmdb: Some(PathBuf::from("db.mmdb")),
            delegations: vec![PathBuf::from("a"), PathBuf::from("b")],
            ..Default::default()
        };
        let sources = fetch_sources(&config, Path::new(".")).await.unwrap();
        assert_eq!(sources.mmdb, PathBuf::from("db.mmdb"));
        assert_eq!(sources.feeds.len(), 2);
    }

    #[test]
    fn test_feed_paths() {
        let paths = feed_paths(Path::new("/tmp/i2c"));
        assert_eq!(paths.len(), RIR_URLS.len());
        assert_eq!(paths[1], PathBuf::from("/tmp/i2c/delegated-apnic-latest"));
        assert!(paths.iter().all(|p| p.starts_with("/tmp/i2c")));
    }

    #[tokio::test]
    async fn test_missing_license_key() {
        let config = Config {
            delegations: vec![PathBuf::from("a")],
            ..Default::default()
        };
        let err = fetch_sources(&config, Path::new(".")).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
