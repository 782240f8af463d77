//! MaxMind DB backed geolocation database.

use super::{GeoDatabase, GeoLeaf, Leaves};
use crate::error::{Error, Result};
use crate::models::{Address, GeoRecord};
use ipnetwork::IpNetwork;
use maxminddb::{MaxMindDBError, Reader, WithinItem};
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize, Debug, Default)]
struct IsoCode {
    iso_code: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct Traits {
    is_anonymous_proxy: Option<bool>,
    is_satellite_provider: Option<bool>,
}

/// The subset of a GeoIP2/GeoLite2 Country record we care about.
///
/// Older databases carry the proxy/satellite flags at top level, newer ones under `traits`.
#[derive(Deserialize, Debug, Default)]
struct CountryRecord {
    country: Option<IsoCode>,
    registered_country: Option<IsoCode>,
    is_anonymous_proxy: Option<bool>,
    is_satellite_provider: Option<bool>,
    traits: Option<Traits>,
}

impl From<CountryRecord> for GeoRecord {
    fn from(r: CountryRecord) -> GeoRecord {
        let traits = r.traits.unwrap_or_default();
        GeoRecord {
            country: r.country.and_then(|c| c.iso_code).unwrap_or_default(),
            registered_country: r
                .registered_country
                .and_then(|c| c.iso_code)
                .unwrap_or_default(),
            is_anonymous_proxy: r.is_anonymous_proxy.unwrap_or(false)
                || traits.is_anonymous_proxy.unwrap_or(false),
            is_satellite_provider: r.is_satellite_provider.unwrap_or(false)
                || traits.is_satellite_provider.unwrap_or(false),
        }
    }
}

/// A `.mmdb` file loaded into memory.
pub struct MmdbDatabase {
    reader: Reader<Vec<u8>>,
}

impl MmdbDatabase {
    pub fn open(path: &Path) -> Result<MmdbDatabase> {
        let reader = Reader::open_readfile(path)?;
        log::info!(
            "Opened {} type={} ip_version={} nodes={}",
            path.display(),
            reader.metadata.database_type,
            reader.metadata.ip_version,
            reader.metadata.node_count
        );
        Ok(MmdbDatabase { reader })
    }

    fn is_ipv6(&self) -> bool {
        self.reader.metadata.ip_version == 6
    }
}

impl GeoDatabase for MmdbDatabase {
    fn leaves(&self) -> Result<Leaves<'_>> {
        let root = if self.is_ipv6() { "::/0" } else { "0.0.0.0/0" };
        let root: IpNetwork = root
            .parse()
            .map_err(|e| Error::InvalidAddress(format!("{root}: {e}")))?;
        let within = self.reader.within::<CountryRecord>(root)?;
        Ok(Box::new(within.map(|item| match item {
            Ok(WithinItem { ip_net, info }) => Ok(leaf_from_network(ip_net, info)),
            Err(e) => Err(e.into()),
        })))
    }

    fn lookup(&self, addr: &Address) -> Result<Option<GeoRecord>> {
        let ip = addr.to_ip_addr();
        if ip.is_ipv6() && !self.is_ipv6() {
            return Ok(None);
        }
        match self.reader.lookup::<CountryRecord>(ip) {
            Ok(record) => Ok(Some(record.into())),
            Err(MaxMindDBError::AddressNotFoundError(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Turn a network yielded by the reader into a leaf.
///
/// The reader already reports the `::/96` subtree of an IPv6 database as IPv4
/// networks and skips the subtrees aliased onto it (`::ffff:0:0/96`, Teredo,
/// 6to4), so each leaf is seen once.
fn leaf_from_network(net: IpNetwork, info: CountryRecord) -> GeoLeaf {
    GeoLeaf {
        addr: net.network(),
        prefix: net.prefix(),
        record: info.into(),
    }
}
