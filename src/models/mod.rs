//! Domain models for the IP-to-country table.
//!
//! This module contains the core data structures used throughout the application:
//! - [`Address`] - arbitrary precision IPv4/IPv6 address
//! - [`CidrBlock`] - aligned base address + prefix length
//! - [`GeoRecord`] and [`DelegationRecord`] - records from the two data sources
//! - [`CountryPolicy`] - which countries end up in the table

mod address;
mod cidr;
mod country;
mod record;

// Re-export public types
pub use address::{alignment_bits, Address, Family};
pub use cidr::CidrBlock;
pub use country::{CountryCase, CountryPolicy, FamilyFilter};
pub use record::{DelegationRecord, GeoRecord, ResourceKind};
