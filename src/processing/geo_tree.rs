//! Geolocation tree extraction.
//!
//! Walks every leaf of the geolocation database and puts the usable ones into
//! the table before any delegation data is considered.

use super::table::{BuildContext, Source};
use crate::error::Result;
use crate::geodb::{GeoDatabase, GeoLeaf};
use crate::models::CidrBlock;
use std::net::IpAddr;

/// Counters of one extraction pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GeoTreeStats {
    pub leaves: usize,
    pub inserted: usize,
    pub unlocatable: usize,
    pub filtered_country: usize,
    pub filtered_family: usize,
}

/// True only for native IPv4 leaves. IPv4-mapped IPv6 leaves count as IPv6.
pub fn is_ipv4_leaf(addr: &IpAddr) -> bool {
    matches!(addr, IpAddr::V4(_))
}

/// Insert every accepted leaf into the table.
///
/// A database error aborts the walk; leaves inserted so far stay in the table.
pub fn extract_geo_tree<D: GeoDatabase + ?Sized>(
    ctx: &mut BuildContext<'_, D>,
) -> Result<GeoTreeStats> {
    let mut stats = GeoTreeStats::default();
    let db = ctx.db;
    for leaf in db.leaves()? {
        let leaf = leaf?;
        stats.leaves += 1;
        if let Some(country) = accept_leaf(ctx, &leaf, &mut stats) {
            let block = CidrBlock::from_ip(leaf.addr, leaf.prefix)?;
            if ctx.insert(block, &country, Source::GeoDatabase) {
                stats.inserted += 1;
            }
        }
    }
    log::info!(
        "geo tree: {} leaves, {} inserted, {} proxy/satellite, {} by country, {} by family",
        stats.leaves,
        stats.inserted,
        stats.unlocatable,
        stats.filtered_country,
        stats.filtered_family
    );
    Ok(stats)
}

/// Effective country of `leaf` if it belongs in the table.
fn accept_leaf<D: GeoDatabase + ?Sized>(
    ctx: &BuildContext<'_, D>,
    leaf: &GeoLeaf,
    stats: &mut GeoTreeStats,
) -> Option<String> {
    if leaf.record.is_unlocatable() {
        stats.unlocatable += 1;
        return None;
    }
    let country = leaf.record.effective_country();
    if !ctx.options.policy.allows(country) {
        stats.filtered_country += 1;
        return None;
    }
    if ctx.options.families.ipv4_only() && !is_ipv4_leaf(&leaf.addr) {
        stats.filtered_family += 1;
        return None;
    }
    Some(country.to_string())
}
