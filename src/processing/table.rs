//! The subnet to country table and the context a build runs in.

use crate::error::Result;
use crate::geodb::GeoDatabase;
use crate::models::{Address, CidrBlock, CountryCase, CountryPolicy, FamilyFilter};
use itertools::Itertools;
use std::collections::HashMap;

/// Which source put an entry into the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    GeoDatabase,
    Delegation,
}

/// Country code of one table entry plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub country: String,
    pub source: Source,
}

/// Mapping from CIDR block to country code.
///
/// Keys are never overwritten and never removed: the first insertion for a
/// block wins. Geolocation entries go in first, so delegations only fill gaps.
/// A delegation block may still sit inside a coarser geolocation block; such
/// overlaps are kept as they are.
#[derive(Debug, Default)]
pub struct ReconciliationTable {
    entries: HashMap<CidrBlock, Entry>,
}

impl ReconciliationTable {
    pub fn new() -> ReconciliationTable {
        ReconciliationTable::default()
    }

    /// Add `block` unless already present. Returns whether it was added.
    pub fn insert(&mut self, block: CidrBlock, country: String, source: Source) -> bool {
        match self.entries.entry(block) {
            std::collections::hash_map::Entry::Occupied(o) => {
                log::trace!("keep {} {} over {country}", o.key(), o.get().country);
                false
            }
            std::collections::hash_map::Entry::Vacant(v) => {
                v.insert(Entry { country, source });
                true
            }
        }
    }

    pub fn get(&self, block: &CidrBlock) -> Option<&Entry> {
        self.entries.get(block)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries that came from `source`.
    pub fn count_from(&self, source: Source) -> usize {
        self.entries.values().filter(|e| e.source == source).count()
    }

    /// All entries ordered by family, numeric base address, then prefix length.
    pub fn snapshot(&self) -> Vec<(&CidrBlock, &Entry)> {
        self.entries
            .iter()
            .sorted_by(|(a, _), (b, _)| a.cmp(b))
            .collect()
    }
}

/// Options of one build.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub policy: CountryPolicy,
    pub families: FamilyFilter,
    pub case: CountryCase,
}

/// Everything a build stage needs, passed explicitly from stage to stage.
pub struct BuildContext<'a, D: GeoDatabase + ?Sized> {
    pub db: &'a D,
    pub options: &'a BuildOptions,
    pub table: ReconciliationTable,
}

impl<'a, D: GeoDatabase + ?Sized> BuildContext<'a, D> {
    pub fn new(db: &'a D, options: &'a BuildOptions) -> Self {
        BuildContext {
            db,
            options,
            table: ReconciliationTable::new(),
        }
    }

    /// True if the geolocation database has an entry covering `addr`.
    pub fn has_authoritative_entry(&self, addr: &Address) -> Result<bool> {
        Ok(self.db.lookup(addr)?.is_some())
    }

    /// Case-fold `country` and insert.
    pub fn insert(&mut self, block: CidrBlock, country: &str, source: Source) -> bool {
        let country = self.options.case.apply(country);
        self.table.insert(block, country, source)
    }

    pub fn into_table(self) -> ReconciliationTable {
        self.table
    }
}
