//! nginx `geo` style output: `<cidr> <country>;` per line.

use super::place::place_file;
use crate::error::Result;
use crate::processing::ReconciliationTable;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Name of the temporary file inside the work directory.
const TMP_FILE_NAME: &str = "i2c.conf";

/// Write all entries in numeric order. Returns the number of lines.
pub fn write_lines<W: Write>(table: &ReconciliationTable, out: &mut W) -> Result<usize> {
    let entries = table.snapshot();
    for (block, entry) in &entries {
        writeln!(out, "{block} {country};", country = entry.country)?;
    }
    Ok(entries.len())
}

/// Render the table to a string.
pub fn render(table: &ReconciliationTable) -> Result<String> {
    let mut buf = Vec::new();
    write_lines(table, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write the table to `work_dir` first, then move it onto `dest`.
///
/// Readers of `dest` see either the previous file or the complete new one.
pub fn write_table(table: &ReconciliationTable, dest: &Path, work_dir: &Path) -> Result<usize> {
    let tmp_path = work_dir.join(TMP_FILE_NAME);
    let file = File::create(&tmp_path)?;
    let mut out = BufWriter::new(file);
    let lines = write_lines(table, &mut out)?;
    let file = out.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    drop(file);

    log::debug!("wrote {lines} lines to {}", tmp_path.display());
    place_file(&tmp_path, dest)?;
    Ok(lines)
}
