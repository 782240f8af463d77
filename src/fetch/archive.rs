//! Pulling the `.mmdb` file out of the GeoLite2 `.tar.gz` archive.

use crate::error::{Error, Result};
use flate2::bufread::GzDecoder;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

/// Extract the first regular `.mmdb` entry of `archive` into `dir`.
pub fn extract_mmdb(archive: &Path, dir: &Path) -> Result<PathBuf> {
    let f = File::open(archive)?;
    let mut tar = tar::Archive::new(GzDecoder::new(BufReader::new(f)));
    for entry in tar.entries()? {
        let mut entry = entry?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let path = entry.path()?.into_owned();
        let Some(name) = path.file_name() else {
            continue;
        };
        if Path::new(name).extension().and_then(|e| e.to_str()) != Some("mmdb") {
            continue;
        }
        log::info!("Found {}", path.display());

        let out_path = dir.join(name);
        let size = entry.header().size()?;
        let mut out = File::create(&out_path)?;
        let written = io::copy(&mut entry, &mut out)?;
        if written != size {
            return Err(Error::Archive(format!(
                "{} is {size} bytes but wrote {written}",
                path.display()
            )));
        }
        log::info!("Extracted {}", out_path.display());
        return Ok(out_path);
    }
    Err(Error::Archive(format!(
        "could not find .mmdb file in {}",
        archive.display()
    )))
}
