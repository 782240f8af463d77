//! RIR delegation feeds.
//!
//! Parses pipe separated delegation rows
//! (`registry|cc|type|start|value|date|status[|extensions...]`) and fills the
//! gaps the geolocation database leaves in the table.

use super::decompose::decompose;
use super::table::{BuildContext, Source};
use crate::error::{Error, Result};
use crate::geodb::GeoDatabase;
use crate::models::{
    Address, CidrBlock, CountryPolicy, DelegationRecord, FamilyFilter, ResourceKind,
};
use csv::StringRecord;
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use std::io;
use std::str::FromStr;

/// Minimum columns of an address row: registry, cc, type, start, value.
const MIN_FIELDS: usize = 5;

/// A csv reader set up for delegation feeds: `|` separated, `#` comments, ragged rows.
pub fn feed_reader<R: io::Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(b'|')
        .comment(Some(b'#'))
        .flexible(true)
        .has_headers(false)
        .quoting(false)
        .from_reader(reader)
}

/// Iterator of the delegation records of one feed that pass the row filters.
pub struct DelegationParser<'p, R: io::Read> {
    reader: csv::Reader<R>,
    row: StringRecord,
    policy: &'p CountryPolicy,
    families: FamilyFilter,
}

impl<'p, R: io::Read> DelegationParser<'p, R> {
    pub fn new(reader: R, policy: &'p CountryPolicy, families: FamilyFilter) -> Self {
        DelegationParser {
            reader: feed_reader(reader),
            row: StringRecord::new(),
            policy,
            families,
        }
    }
}

impl<'p, R: io::Read> Iterator for DelegationParser<'p, R> {
    type Item = Result<DelegationRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.reader.read_record(&mut self.row) {
                Ok(false) => return None,
                Ok(true) => {}
                Err(e) => return Some(Err(e.into())),
            }
            match parse_row(&self.row, self.policy, self.families) {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Why a row was left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Empty,
    Header,
    Summary,
    Asn,
    Family,
    Country,
}

/// Check the skip heuristics in order; `None` means the row is data.
pub fn skip_reason(
    row: &StringRecord,
    policy: &CountryPolicy,
    families: FamilyFilter,
) -> Result<Option<SkipReason>> {
    let Some(first) = row.get(0) else {
        return Ok(Some(SkipReason::Empty));
    };
    // version lines start with a number, e.g. "2.3|apnic|20240101|..."
    if f64::from_str(first.trim()).is_ok() {
        return Ok(Some(SkipReason::Header));
    }
    if row.iter().last() == Some("summary") {
        return Ok(Some(SkipReason::Summary));
    }
    if row.len() < MIN_FIELDS {
        let reason = format!("expected at least {MIN_FIELDS} fields, got {}", row.len());
        return Err(malformed(row, reason));
    }
    let kind = &row[2];
    if kind == "asn" {
        return Ok(Some(SkipReason::Asn));
    }
    if families.ipv4_only() && kind != "ipv4" {
        return Ok(Some(SkipReason::Family));
    }
    if !policy.allows(&row[1]) {
        return Ok(Some(SkipReason::Country));
    }
    Ok(None)
}

/// Parse one row into a record, or `None` if a skip heuristic matches.
///
/// Start address and count must parse; a failure means the feed format changed.
pub fn parse_row(
    row: &StringRecord,
    policy: &CountryPolicy,
    families: FamilyFilter,
) -> Result<Option<DelegationRecord>> {
    if let Some(reason) = skip_reason(row, policy, families)? {
        log::trace!("skip {reason:?}: {row:?}");
        return Ok(None);
    }
    let kind: ResourceKind = row[2].parse()?;
    let start: Address = row[3].parse()?;
    if kind.family() != Some(start.family()) {
        return Err(malformed(row, format!("{} start address {start}", kind)));
    }
    let value =
        BigUint::from_str(row[4].trim()).map_err(|_| Error::InvalidCount(row[4].to_string()))?;

    Ok(Some(DelegationRecord {
        registry: row[0].to_string(),
        country: row[1].to_string(),
        kind,
        start,
        value,
        date: row.get(5).unwrap_or_default().to_string(),
        status: row.get(6).unwrap_or_default().to_string(),
        extensions: row.iter().skip(7).map(|s| s.to_string()).collect(),
    }))
}

fn malformed(row: &StringRecord, reason: String) -> Error {
    Error::MalformedRow {
        line: row.position().map(|p| p.line()).unwrap_or(0),
        reason,
    }
}

/// Blocks a delegation stands for.
///
/// IPv4 values are host counts and get decomposed. IPv6 values are already a
/// prefix length, so the row is exactly one block.
pub fn candidate_blocks(record: &DelegationRecord) -> Result<Vec<CidrBlock>> {
    match record.kind {
        ResourceKind::Ipv4 => decompose(&record.start, &record.value),
        ResourceKind::Ipv6 => {
            let prefix = record
                .value
                .to_u8()
                .ok_or_else(|| Error::InvalidCount(record.value.to_string()))?;
            Ok(vec![CidrBlock::new(record.start.clone(), prefix)?])
        }
        ResourceKind::Asn => Ok(Vec::new()),
    }
}

/// Counters of one feed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DelegationStats {
    pub records: usize,
    pub blocks: usize,
    pub inserted: usize,
    pub covered: usize,
    pub duplicate: usize,
}

/// Gap-fill the table from one feed.
///
/// Every candidate block is checked against the geolocation database at its
/// own base address; covered blocks are dropped, the rest of the row still counts.
pub fn append_delegations<D: GeoDatabase + ?Sized, R: io::Read>(
    ctx: &mut BuildContext<'_, D>,
    name: &str,
    reader: R,
) -> Result<DelegationStats> {
    let mut stats = DelegationStats::default();
    let options = ctx.options;
    let parser = DelegationParser::new(reader, &options.policy, options.families);
    for record in parser {
        let record = record?;
        stats.records += 1;
        for block in candidate_blocks(&record)? {
            stats.blocks += 1;
            if ctx.has_authoritative_entry(block.base())? {
                log::trace!("{name}: {block} covered by geolocation data");
                stats.covered += 1;
                continue;
            }
            if ctx.insert(block, &record.country, Source::Delegation) {
                stats.inserted += 1;
            } else {
                stats.duplicate += 1;
            }
        }
    }
    log::info!(
        "{name}: {} records, {} blocks, {} inserted, {} covered, {} duplicate",
        stats.records,
        stats.blocks,
        stats.inserted,
        stats.covered,
        stats.duplicate
    );
    Ok(stats)
}
