//! Moving a finished file into place.

use crate::error::Result;
use std::fs::{self, File};
use std::io;
use std::path::Path;

/// Move `src` onto `dest`.
///
/// Tries a plain rename first. When that fails (e.g. `src` lives on another
/// filesystem) the data is copied next to `dest` and renamed over it, so
/// `dest` is never seen half written.
pub fn place_file(src: &Path, dest: &Path) -> Result<()> {
    match fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(e) => {
            log::warn!(
                "rename {} -> {} failed ({e}), falling back to copy",
                src.display(),
                dest.display()
            );
            copy_then_replace(src, dest)
        }
    }
}

fn copy_then_replace(src: &Path, dest: &Path) -> Result<()> {
    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    let mut input = File::open(src)?;
    io::copy(&mut input, tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|e| e.error)?;
    fs::remove_file(src)?;
    Ok(())
}
