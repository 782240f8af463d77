//! Command line arguments.

use crate::config::{Config, DEFAULT_LOG_CONFIG, DEFAULT_OUTFILE, LICENSE_ENV};
use clap::Parser;
use std::path::PathBuf;

/// ip2country generates an IP-to-country mapping file for ngx_http_geo_module
#[derive(Parser, Debug)]
#[command(name = "ip2country", author, version, about, long_about = None)]
pub struct Args {
    /// Output country codes in lowercase
    #[arg(short, long)]
    pub lower: bool,

    /// Only include IPv4 ranges
    #[arg(short = '4', long = "ipv4-only")]
    pub ipv4_only: bool,

    /// Output file path
    #[arg(short, long, default_value = DEFAULT_OUTFILE)]
    pub outfile: PathBuf,

    /// Countries whose subnets to include, cannot be used with --exclude
    #[arg(short, long, value_delimiter = ',', conflicts_with = "exclude")]
    pub include: Vec<String>,

    /// Countries whose subnets to exclude, cannot be used with --include
    #[arg(short, long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// MaxMind license key (falls back to the MAXMIND_LICENSE_KEY environment variable)
    #[arg(short = 't', long = "maxmind-token")]
    pub maxmind_token: Option<String>,

    /// Use a local .mmdb file instead of downloading GeoLite2 Country
    #[arg(long, value_name = "PATH")]
    pub mmdb: Option<PathBuf>,

    /// Use a local delegation feed instead of downloading them (repeatable)
    #[arg(long = "delegation", value_name = "PATH")]
    pub delegations: Vec<PathBuf>,

    /// log4rs configuration file
    #[arg(long, default_value = DEFAULT_LOG_CONFIG)]
    pub log_config: PathBuf,
}

impl Args {
    /// Resolve into a run configuration, reading the license key from the environment if needed.
    pub fn into_config(self) -> Config {
        let license_key = self
            .maxmind_token
            .or_else(|| std::env::var(LICENSE_ENV).ok())
            .filter(|k| !k.is_empty());
        Config {
            outfile: self.outfile,
            lowercase: self.lower,
            ipv4_only: self.ipv4_only,
            include: self.include,
            exclude: self.exclude,
            license_key,
            mmdb: self.mmdb,
            delegations: self.delegations,
        }
    }
}
