//! Records produced by the two data sources.

use super::address::{Address, Family};
use crate::error::Error;
use num_bigint::BigUint;
use std::fmt;
use std::str::FromStr;

/// Country data attached to a geolocation tree leaf.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoRecord {
    /// ISO code of the located country (may be empty).
    pub country: String,
    /// ISO code of the country the block is registered to (may be empty).
    pub registered_country: String,
    pub is_anonymous_proxy: bool,
    pub is_satellite_provider: bool,
}

impl GeoRecord {
    /// Located country, falling back to the registered country.
    pub fn effective_country(&self) -> &str {
        if self.country.is_empty() {
            &self.registered_country
        } else {
            &self.country
        }
    }

    /// Anonymous proxies and satellite providers have no meaningful location.
    pub fn is_unlocatable(&self) -> bool {
        self.is_anonymous_proxy || self.is_satellite_provider
    }
}

/// Resource type column of a delegation row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Ipv4,
    Ipv6,
    Asn,
}

impl ResourceKind {
    /// Address family of the resource, `None` for AS numbers.
    pub fn family(self) -> Option<Family> {
        match self {
            ResourceKind::Ipv4 => Some(Family::V4),
            ResourceKind::Ipv6 => Some(Family::V6),
            ResourceKind::Asn => None,
        }
    }
}

impl FromStr for ResourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ipv4" => Ok(ResourceKind::Ipv4),
            "ipv6" => Ok(ResourceKind::Ipv6),
            "asn" => Ok(ResourceKind::Asn),
            other => Err(Error::UnknownResource(other.to_string())),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            ResourceKind::Ipv4 => "ipv4",
            ResourceKind::Ipv6 => "ipv6",
            ResourceKind::Asn => "asn",
        };
        f.write_str(s)
    }
}

/// One address delegation from an RIR feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegationRecord {
    pub registry: String,
    pub country: String,
    pub kind: ResourceKind,
    pub start: Address,
    /// Host count for IPv4, prefix length for IPv6.
    pub value: BigUint,
    pub date: String,
    pub status: String,
    /// Opaque id and any later columns of extended feeds.
    pub extensions: Vec<String>,
}
