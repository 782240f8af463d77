//! Geolocation database access.
//!
//! - [`GeoDatabase`] - what the table builder needs from a database handle
//! - [`MmdbDatabase`] - MaxMind DB file (GeoLite2 Country)
//! - [`MemoryDatabase`] - leaves held in memory, for fixtures and dry runs

mod memory;
mod mmdb;

use crate::error::Result;
use crate::models::{Address, GeoRecord};
use std::net::IpAddr;

pub use memory::MemoryDatabase;
pub use mmdb::MmdbDatabase;

/// A leaf network of the geolocation tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoLeaf {
    pub addr: IpAddr,
    pub prefix: u8,
    pub record: GeoRecord,
}

/// Iterator over every leaf of a database; an `Err` item ends the walk.
pub type Leaves<'a> = Box<dyn Iterator<Item = Result<GeoLeaf>> + 'a>;

/// A CIDR-partitioned geolocation database.
pub trait GeoDatabase {
    /// Walk every leaf exactly once.
    fn leaves(&self) -> Result<Leaves<'_>>;

    /// Record of the most specific entry covering `addr`, if any.
    fn lookup(&self, addr: &Address) -> Result<Option<GeoRecord>>;
}
