//! Table building logic.
//!
//! This module contains the reconciliation engine:
//! - [`decompose`] - range to CIDR decomposition
//! - [`geo_tree`] - leaves of the geolocation database
//! - [`delegation`] - RIR delegation feeds, used to fill the gaps
//! - [`table`] - the resulting table and the build context

mod decompose;
mod delegation;
mod geo_tree;
mod table;

use crate::error::Result;
use crate::geodb::GeoDatabase;
use std::io;

// Re-export public functions
pub use decompose::{decompose, decompose_str};
pub use delegation::{
    append_delegations, candidate_blocks, feed_reader, parse_row, skip_reason, DelegationParser,
    DelegationStats, SkipReason,
};
pub use geo_tree::{extract_geo_tree, is_ipv4_leaf, GeoTreeStats};
pub use table::{BuildContext, BuildOptions, Entry, ReconciliationTable, Source};

/// A named delegation feed waiting to be read.
pub struct Feed<R> {
    pub name: String,
    pub reader: R,
}

impl<R: io::Read> Feed<R> {
    pub fn new(name: impl Into<String>, reader: R) -> Self {
        Feed {
            name: name.into(),
            reader,
        }
    }
}

/// Build the table: geolocation leaves first, then each feed in order.
///
/// Any error aborts the build and no table is returned.
pub fn build_table<D, R, I>(db: &D, feeds: I, options: &BuildOptions) -> Result<ReconciliationTable>
where
    D: GeoDatabase + ?Sized,
    R: io::Read,
    I: IntoIterator<Item = Feed<R>>,
{
    let mut ctx = BuildContext::new(db, options);
    extract_geo_tree(&mut ctx)?;
    for feed in feeds {
        append_delegations(&mut ctx, &feed.name, feed.reader)?;
    }
    let table = ctx.into_table();
    log::info!(
        "table: {} entries ({} geolocation, {} delegation)",
        table.len(),
        table.count_from(Source::GeoDatabase),
        table.count_from(Source::Delegation)
    );
    Ok(table)
}
