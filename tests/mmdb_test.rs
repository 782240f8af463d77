//! MaxMind DB tests
//!
//! The databases are written by the small MMDB encoder below, so the real
//! reader walks a real search tree: IPv4 subtree, aliases and all.

use ip2country::geodb::{GeoDatabase, GeoLeaf, MmdbDatabase};
use ip2country::models::Address;
use ip2country::output::render;
use ip2country::processing::{build_table, BuildOptions, Feed, Source};
use ip2country::Error;
use ipnetwork::IpNetwork;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A value of the MMDB data section.
enum Value {
    Str(&'static str),
    U16(u16),
    U32(u32),
    U64(u64),
    Bool(bool),
    Map(Vec<(&'static str, Value)>),
    Array(Vec<Value>),
}

impl Value {
    fn encode(&self, out: &mut Vec<u8>) {
        match self {
            Value::Str(s) => {
                control(out, 2, s.len());
                out.extend_from_slice(s.as_bytes());
            }
            Value::U16(v) => uint(out, 5, u64::from(*v)),
            Value::U32(v) => uint(out, 6, u64::from(*v)),
            Value::U64(v) => uint(out, 9, *v),
            Value::Bool(b) => control(out, 14, usize::from(*b)),
            Value::Map(entries) => {
                control(out, 7, entries.len());
                for (key, value) in entries {
                    Value::Str(*key).encode(out);
                    value.encode(out);
                }
            }
            Value::Array(items) => {
                control(out, 11, items.len());
                for item in items {
                    item.encode(out);
                }
            }
        }
    }
}

/// Control byte of a field; types above 7 use the extended form.
fn control(out: &mut Vec<u8>, kind: u8, size: usize) {
    assert!(size < 29, "long fields are not needed here");
    if kind < 8 {
        out.push(kind << 5 | size as u8);
    } else {
        out.push(size as u8);
        out.push(kind - 7);
    }
}

fn uint(out: &mut Vec<u8>, kind: u8, value: u64) {
    let bytes = value.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    control(out, kind, bytes.len() - skip);
    out.extend_from_slice(&bytes[skip..]);
}

#[derive(Clone, Copy)]
enum Child {
    Empty,
    Node(usize),
    Data(usize),
}

/// Search tree with 24 bit records plus its data section.
struct MmdbBuilder {
    ip_version: u16,
    nodes: Vec<[Child; 2]>,
    data: Vec<u8>,
}

impl MmdbBuilder {
    fn new(ip_version: u16) -> MmdbBuilder {
        MmdbBuilder {
            ip_version,
            nodes: vec![[Child::Empty; 2]],
            data: Vec::new(),
        }
    }

    fn width(&self) -> u32 {
        if self.ip_version == 6 {
            128
        } else {
            32
        }
    }

    /// Bits and prefix of `net` seen from the root; IPv4 lives under `::/96` in an IPv6 tree.
    fn path(&self, net: &str) -> (u128, u32) {
        let net: IpNetwork = net.parse().unwrap();
        match net {
            IpNetwork::V4(n) => {
                let offset = if self.ip_version == 6 { 96 } else { 0 };
                (
                    u128::from(u32::from(n.network())),
                    u32::from(n.prefix()) + offset,
                )
            }
            IpNetwork::V6(n) => (u128::from(n.network()), u32::from(n.prefix())),
        }
    }

    fn bit(&self, bits: u128, depth: u32) -> usize {
        ((bits >> (self.width() - 1 - depth)) & 1) as usize
    }

    /// Follow the first `prefix - 1` bits, adding nodes on the way.
    fn walk(&mut self, bits: u128, prefix: u32) -> usize {
        let mut node = 0;
        for depth in 0..prefix - 1 {
            let bit = self.bit(bits, depth);
            node = match self.nodes[node][bit] {
                Child::Node(next) => next,
                Child::Empty => {
                    self.nodes.push([Child::Empty; 2]);
                    let next = self.nodes.len() - 1;
                    self.nodes[node][bit] = Child::Node(next);
                    next
                }
                Child::Data(_) => panic!("{bits:x}/{prefix} is inside another network"),
            };
        }
        node
    }

    fn insert(&mut self, net: &str, record: Value) -> &mut MmdbBuilder {
        let (bits, prefix) = self.path(net);
        let offset = self.data.len();
        record.encode(&mut self.data);
        let node = self.walk(bits, prefix);
        let bit = self.bit(bits, prefix - 1);
        self.nodes[node][bit] = Child::Data(offset);
        self
    }

    /// Point an IPv6 network at the IPv4 subtree, the way GeoLite2 maps `::ffff:0:0/96`.
    fn alias_ipv4(&mut self, net: &str) -> &mut MmdbBuilder {
        let ipv4_start = self.walk(0, 97);
        let (bits, prefix) = self.path(net);
        let node = self.walk(bits, prefix);
        let bit = self.bit(bits, prefix - 1);
        self.nodes[node][bit] = Child::Node(ipv4_start);
        self
    }

    fn metadata(&self, node_count: usize) -> Value {
        Value::Map(vec![
            ("binary_format_major_version", Value::U16(2)),
            ("binary_format_minor_version", Value::U16(0)),
            ("build_epoch", Value::U64(1_700_000_000)),
            ("database_type", Value::Str("GeoLite2-Country")),
            (
                "description",
                Value::Map(vec![("en", Value::Str("ip2country test data"))]),
            ),
            ("ip_version", Value::U16(self.ip_version)),
            ("languages", Value::Array(vec![Value::Str("en")])),
            ("node_count", Value::U32(node_count as u32)),
            ("record_size", Value::U16(24)),
        ])
    }

    fn write(&self, path: &Path) {
        let node_count = self.nodes.len();
        let record = |child: Child| match child {
            Child::Empty => node_count,
            Child::Node(n) => n,
            Child::Data(offset) => node_count + 16 + offset,
        };
        let mut buf = Vec::new();
        for node in &self.nodes {
            for child in node {
                buf.extend_from_slice(&(record(*child) as u32).to_be_bytes()[1..]);
            }
        }
        buf.extend_from_slice(&[0u8; 16]);
        buf.extend_from_slice(&self.data);
        buf.extend_from_slice(b"\xab\xcd\xefMaxMind.com");
        self.metadata(node_count).encode(&mut buf);
        std::fs::write(path, buf).unwrap();
    }
}

fn country(code: &'static str) -> Value {
    Value::Map(vec![(
        "country",
        Value::Map(vec![("iso_code", Value::Str(code))]),
    )])
}

/// Dual stack database: three IPv4 leaves, one IPv6 leaf, two aliases of the IPv4 subtree.
fn dual_stack(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("GeoLite2-Country.mmdb");
    MmdbBuilder::new(6)
        .insert("1.0.0.0/24", country("AU"))
        .insert(
            "1.0.1.0/24",
            Value::Map(vec![(
                "registered_country",
                Value::Map(vec![("iso_code", Value::Str("CN"))]),
            )]),
        )
        .insert(
            "1.0.2.0/24",
            Value::Map(vec![
                ("country", Value::Map(vec![("iso_code", Value::Str("US"))])),
                (
                    "traits",
                    Value::Map(vec![("is_anonymous_proxy", Value::Bool(true))]),
                ),
            ]),
        )
        .insert("2001:db8:1::/48", country("KR"))
        .alias_ipv4("::ffff:0:0/96")
        .alias_ipv4("2002::/16")
        .write(&path);
    path
}

fn addr(s: &str) -> Address {
    s.parse().unwrap()
}

#[test]
fn test_walks_every_leaf_once() {
    let dir = tempfile::tempdir().unwrap();
    let db = MmdbDatabase::open(&dual_stack(&dir)).unwrap();
    let leaves: Vec<GeoLeaf> = db.leaves().unwrap().collect::<Result<_, _>>().unwrap();

    let nets: Vec<String> = leaves
        .iter()
        .map(|l| format!("{}/{}", l.addr, l.prefix))
        .collect();
    assert_eq!(
        nets,
        vec!["1.0.0.0/24", "1.0.1.0/24", "1.0.2.0/24", "2001:db8:1::/48"]
    );
    assert!(leaves[..3].iter().all(|l| matches!(l.addr, IpAddr::V4(_))));
    assert_eq!(leaves[1].record.effective_country(), "CN");
    assert!(leaves[2].record.is_anonymous_proxy);
}

#[test]
fn test_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let db = MmdbDatabase::open(&dual_stack(&dir)).unwrap();

    let hit = db.lookup(&addr("1.0.1.7")).unwrap().unwrap();
    assert_eq!(hit.registered_country, "CN");
    let hit = db.lookup(&addr("2001:db8:1:2::1")).unwrap().unwrap();
    assert_eq!(hit.country, "KR");
    // the mapped form reaches the IPv4 subtree through the alias
    let hit = db.lookup(&addr("::ffff:1.0.0.1")).unwrap().unwrap();
    assert_eq!(hit.country, "AU");

    assert!(db.lookup(&addr("192.0.2.1")).unwrap().is_none());
    assert!(db.lookup(&addr("2001:db8::1")).unwrap().is_none());
}

#[test]
fn test_ipv4_only_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("v4.mmdb");
    MmdbBuilder::new(4)
        .insert("198.51.100.0/24", country("NL"))
        .write(&path);
    let db = MmdbDatabase::open(&path).unwrap();

    let leaves: Vec<GeoLeaf> = db.leaves().unwrap().collect::<Result<_, _>>().unwrap();
    assert_eq!(leaves.len(), 1);
    assert_eq!(leaves[0].addr.to_string(), "198.51.100.0");
    assert_eq!(leaves[0].prefix, 24);

    assert!(db.lookup(&addr("198.51.100.9")).unwrap().is_some());
    assert!(db.lookup(&addr("10.0.0.1")).unwrap().is_none());
    assert!(db.lookup(&addr("2001:db8::1")).unwrap().is_none());
}

#[test]
fn test_build_table_from_mmdb() {
    let dir = tempfile::tempdir().unwrap();
    let db = MmdbDatabase::open(&dual_stack(&dir)).unwrap();
    let feed = "\
2|apnic|20240101|4|19830613|20231231|+1000
apnic|*|ipv4|*|2|summary
apnic|JP|ipv4|1.0.0.0|1024|20110811|assigned
apnic|JP|ipv4|192.0.2.0|256|20110412|allocated
apnic|JP|ipv6|2001:db8::|32|20110412|allocated
apnic|GB|ipv4|1.0.2.0|256|20000101|allocated
";
    let feeds = vec![Feed::new("apnic", feed.as_bytes())];
    let table = build_table(&db, feeds, &BuildOptions::default()).unwrap();

    let expected = "\
1.0.0.0/24 AU;
1.0.1.0/24 CN;
192.0.2.0/24 JP;
2001:db8::/32 JP;
2001:db8:1::/48 KR;
";
    assert_eq!(render(&table).unwrap(), expected);
    let entry = table.get(&"1.0.0.0/24".parse().unwrap()).unwrap();
    assert_eq!(entry.source, Source::GeoDatabase);
}

#[test]
fn test_not_a_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.mmdb");
    std::fs::write(&path, b"definitely not a MaxMind DB").unwrap();
    assert!(matches!(MmdbDatabase::open(&path), Err(Error::GeoDb(_))));
}

#[test]
fn test_undecodable_record_aborts_build() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad-record.mmdb");
    MmdbBuilder::new(6)
        .insert("1.0.0.0/24", country("AU"))
        // country must be a map
        .insert("1.0.1.0/24", Value::Map(vec![("country", Value::Str("CN"))]))
        .write(&path);
    let db = MmdbDatabase::open(&path).unwrap();

    let feeds: Vec<Feed<&[u8]>> = Vec::new();
    let result = build_table(&db, feeds, &BuildOptions::default());
    assert!(matches!(result, Err(Error::GeoDb(_))));
    assert!(matches!(db.lookup(&addr("1.0.1.1")), Err(Error::GeoDb(_))));
}
