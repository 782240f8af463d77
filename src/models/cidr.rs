//! Aligned CIDR blocks.

use super::address::{Address, Family};
use crate::error::{Error, Result};
use num_bigint::BigUint;
use num_traits::One;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// A base address plus prefix length. The base is always aligned to the prefix.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CidrBlock {
    base: Address,
    prefix: u8,
}

impl CidrBlock {
    /// Create a block, rejecting prefixes wider than the family and unaligned bases.
    pub fn new(base: Address, prefix: u8) -> Result<CidrBlock> {
        let family = base.family();
        if prefix > family.width() {
            return Err(Error::InvalidPrefix {
                family: family.name(),
                prefix,
            });
        }
        if !base.is_aligned(prefix) {
            return Err(Error::Misaligned {
                addr: base.to_string(),
                prefix,
            });
        }
        Ok(CidrBlock { base, prefix })
    }

    /// Block from a std address and prefix, as found in a geolocation tree leaf.
    pub fn from_ip(addr: IpAddr, prefix: u8) -> Result<CidrBlock> {
        CidrBlock::new(Address::from(addr), prefix)
    }

    pub fn base(&self) -> &Address {
        &self.base
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    pub fn family(&self) -> Family {
        self.base.family()
    }

    /// Number of addresses covered.
    pub fn size(&self) -> BigUint {
        BigUint::one() << (self.family().width() - self.prefix)
    }

    /// Highest address in the block.
    pub fn last(&self) -> Address {
        // aligned base + size - 1 never leaves the family
        let last = self.base.value() + self.size() - 1u32;
        Address::new(self.family(), last).unwrap_or_else(|_| self.base.clone())
    }

    /// True if `addr` falls inside the block.
    pub fn contains(&self, addr: &Address) -> bool {
        addr.family() == self.family()
            && addr.value() >= self.base.value()
            && addr.value() <= self.last().value()
    }
}

impl FromStr for CidrBlock {
    type Err = Error;

    fn from_str(s: &str) -> Result<CidrBlock> {
        let s = s.trim();
        let (addr, prefix) = s
            .split_once('/')
            .ok_or_else(|| Error::InvalidAddress(s.to_string()))?;
        let base: Address = addr.parse()?;
        let prefix: u8 = prefix
            .parse()
            .map_err(|_| Error::InvalidAddress(s.to_string()))?;
        CidrBlock::new(base, prefix)
    }
}

impl fmt::Display for CidrBlock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.prefix)
    }
}
