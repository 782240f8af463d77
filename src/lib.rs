//! Build an IP-to-country table for nginx's `geo` module.
//!
//! GeoLite2 Country data is authoritative; RIR delegation feeds fill the
//! address ranges the database does not know about.

pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod geodb;
pub mod logging;
pub mod models;
pub mod output;
pub mod processing;

use colored::Colorize;
use config::{Config, WORK_DIR_PREFIX};
use fetch::Sources;
use geodb::MmdbDatabase;
use processing::{build_table, BuildOptions, Feed};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub use error::{Error, Result};

/// Open a local delegation feed, named after its file.
pub fn open_feed(path: &Path) -> Result<Feed<BufReader<File>>> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(Feed::new(name, BufReader::new(File::open(path)?)))
}

/// Build the table from local sources and write it to `outfile`.
pub fn generate(
    sources: &Sources,
    options: &BuildOptions,
    outfile: &Path,
    work_dir: &Path,
) -> Result<usize> {
    let db = MmdbDatabase::open(&sources.mmdb)?;
    let feeds = sources
        .feeds
        .iter()
        .map(|p| open_feed(p))
        .collect::<Result<Vec<_>>>()?;
    let table = build_table(&db, feeds, options)?;
    output::write_table(&table, outfile, work_dir)
}

/// One complete run: validate, fetch, build, write. Returns the number of lines written.
pub async fn run(config: Config) -> Result<usize> {
    // country lists are rejected before anything is downloaded
    let options = config.build_options()?;

    let work_dir = tempfile::Builder::new()
        .prefix(WORK_DIR_PREFIX)
        .tempdir()?;
    log::info!("Created temporary directory {}", work_dir.path().display());

    let sources = fetch::fetch_sources(&config, work_dir.path()).await?;

    let outfile = config.outfile.clone();
    let work = work_dir.path().to_path_buf();
    let lines =
        tokio::task::spawn_blocking(move || generate(&sources, &options, &outfile, &work)).await??;

    log::info!(
        "{} {lines} entries to {}",
        "Wrote".green(),
        config.outfile.display()
    );
    Ok(lines)
}
