use super::{GeoDatabase, GeoLeaf, Leaves};
use crate::error::Result;
use crate::models::{Address, CidrBlock, GeoRecord};

/// Geolocation leaves kept in a vector.
///
/// Lookups pick the longest prefix covering the address, like a real tree would.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    leaves: Vec<(CidrBlock, GeoRecord)>,
}

impl MemoryDatabase {
    pub fn new() -> MemoryDatabase {
        MemoryDatabase::default()
    }

    /// Add a leaf from CIDR text, e.g. `"192.0.2.0/24"`.
    pub fn insert(&mut self, cidr: &str, record: GeoRecord) -> Result<()> {
        let block: CidrBlock = cidr.parse()?;
        self.leaves.push((block, record));
        Ok(())
    }

    /// Add a leaf that only carries a located country.
    pub fn insert_country(&mut self, cidr: &str, country: &str) -> Result<()> {
        self.insert(
            cidr,
            GeoRecord {
                country: country.to_string(),
                ..Default::default()
            },
        )
    }
}

impl GeoDatabase for MemoryDatabase {
    fn leaves(&self) -> Result<Leaves<'_>> {
        Ok(Box::new(self.leaves.iter().map(|(block, record)| {
            Ok(GeoLeaf {
                addr: block.base().to_ip_addr(),
                prefix: block.prefix(),
                record: record.clone(),
            })
        })))
    }

    fn lookup(&self, addr: &Address) -> Result<Option<GeoRecord>> {
        Ok(self
            .leaves
            .iter()
            .filter(|(block, _)| block.contains(addr))
            .max_by_key(|(block, _)| block.prefix())
            .map(|(_, record)| record.clone()))
    }
}
