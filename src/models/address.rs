//! Arbitrary precision IPv4/IPv6 addresses.
//!
//! Provides [`Address`], an unsigned integer tagged with its [`Family`], so range
//! arithmetic near the top of either address space can never wrap silently.

use crate::error::{Error, Result};
use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// IP address family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Family {
    V4,
    V6,
}

impl Family {
    /// Address width in bits (32 or 128).
    pub fn width(self) -> u8 {
        match self {
            Family::V4 => 32,
            Family::V6 => 128,
        }
    }

    /// Largest address value of the family.
    pub fn max_value(self) -> BigUint {
        (BigUint::one() << self.width()) - 1u32
    }

    pub fn name(self) -> &'static str {
        match self {
            Family::V4 => "IPv4",
            Family::V6 => "IPv6",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Number of low zero bits in `value`, capped at the family width.
///
/// Zero is aligned to every block size, so it reports the full width.
pub fn alignment_bits(value: &BigUint, family: Family) -> u8 {
    let width = family.width();
    match value.trailing_zeros() {
        Some(tz) => tz.min(width as u64) as u8,
        None => width,
    }
}

/// An IP address held as an unsigned integer of its family's width.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address {
    // field order matters for Ord: all IPv4 sort before IPv6
    family: Family,
    value: BigUint,
}

impl Address {
    /// Create an address, rejecting values above the family maximum.
    pub fn new(family: Family, value: BigUint) -> Result<Address> {
        if value > family.max_value() {
            return Err(Error::RangeOverflow {
                start: value.to_string(),
                count: "0".to_string(),
                family: family.name(),
            });
        }
        Ok(Address { family, value })
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn value(&self) -> &BigUint {
        &self.value
    }

    /// Address `count` steps further; overflowing the family is an error.
    pub fn checked_add(&self, count: &BigUint) -> Result<Address> {
        let value = &self.value + count;
        if value > self.family.max_value() {
            return Err(Error::RangeOverflow {
                start: self.to_string(),
                count: count.to_string(),
                family: self.family.name(),
            });
        }
        Ok(Address {
            family: self.family,
            value,
        })
    }

    /// The following address.
    pub fn checked_next(&self) -> Result<Address> {
        self.checked_add(&BigUint::one())
    }

    /// True if the low `width - prefix` bits are all zero.
    pub fn is_aligned(&self, prefix: u8) -> bool {
        let width = self.family.width();
        if prefix > width {
            return false;
        }
        alignment_bits(&self.value, self.family) >= width - prefix
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Convert back to a std address.
    pub fn to_ip_addr(&self) -> IpAddr {
        // the constructor bounds the value, so the narrowing conversions cannot fail
        match self.family {
            Family::V4 => IpAddr::V4(Ipv4Addr::from(self.value.to_u32().unwrap_or(u32::MAX))),
            Family::V6 => IpAddr::V6(Ipv6Addr::from(self.value.to_u128().unwrap_or(u128::MAX))),
        }
    }
}

impl From<IpAddr> for Address {
    fn from(ip: IpAddr) -> Address {
        match ip {
            IpAddr::V4(v4) => Address {
                family: Family::V4,
                value: BigUint::from(u32::from(v4)),
            },
            IpAddr::V6(v6) => Address {
                family: Family::V6,
                value: BigUint::from(u128::from(v6)),
            },
        }
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Address> {
        let ip = IpAddr::from_str(s.trim()).map_err(|_| Error::InvalidAddress(s.to_string()))?;
        Ok(Address::from(ip))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_ip_addr())
    }
}
