//! Constants and the resolved run configuration.

use crate::error::Result;
use crate::models::{CountryCase, CountryPolicy, FamilyFilter};
use crate::processing::BuildOptions;
use std::path::PathBuf;

pub const DEFAULT_OUTFILE: &str = "./ip2country.conf";
pub const DEFAULT_LOG_CONFIG: &str = "log4rs.yml";
/// Environment variable holding the MaxMind license key.
pub const LICENSE_ENV: &str = "MAXMIND_LICENSE_KEY";
/// Prefix of the temporary work directory.
pub const WORK_DIR_PREFIX: &str = "i2c";

pub const GEOLITE_DOWNLOAD_URL: &str =
    "https://download.maxmind.com/app/geoip_download?edition_id=GeoLite2-Country&suffix=tar.gz";
pub const GEOLITE_ARCHIVE_NAME: &str = "GeoLite2-Country.tar.gz";

/// AFRINIC, APNIC, ARIN, LACNIC, RIPE NCC
pub const RIR_URLS: [&str; 5] = [
    "https://ftp.afrinic.net/pub/stats/afrinic/delegated-afrinic-extended-latest",
    "https://ftp.apnic.net/apnic/stats/apnic/delegated-apnic-latest",
    "https://ftp.arin.net/pub/stats/arin/delegated-arin-extended-latest",
    "https://ftp.lacnic.net/pub/stats/lacnic/delegated-lacnic-extended-latest",
    "https://ftp.ripe.net/pub/stats/ripencc/delegated-ripencc-extended-latest",
];

/// GeoLite2 Country archive URL for a license key.
pub fn geolite_url(license_key: &str) -> String {
    format!("{GEOLITE_DOWNLOAD_URL}&license_key={license_key}")
}

/// Everything one run needs to know.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub outfile: PathBuf,
    pub lowercase: bool,
    pub ipv4_only: bool,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub license_key: Option<String>,
    /// Local database instead of downloading the archive.
    pub mmdb: Option<PathBuf>,
    /// Local delegation feeds instead of downloading them.
    pub delegations: Vec<PathBuf>,
}

impl Config {
    /// Validate the country lists and turn the flags into build options.
    pub fn build_options(&self) -> Result<BuildOptions> {
        Ok(BuildOptions {
            policy: CountryPolicy::new(&self.include, &self.exclude)?,
            families: if self.ipv4_only {
                FamilyFilter::Ipv4Only
            } else {
                FamilyFilter::Any
            },
            case: if self.lowercase {
                CountryCase::Lower
            } else {
                CountryCase::Upper
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_options() {
        let config = Config {
            lowercase: true,
            ipv4_only: true,
            include: vec!["jp".to_string()],
            ..Default::default()
        };
        let options = config.build_options().unwrap();
        assert_eq!(options.case, CountryCase::Lower);
        assert_eq!(options.families, FamilyFilter::Ipv4Only);
        assert!(options.policy.allows("JP"));
        assert!(!options.policy.allows("US"));
    }

    #[test]
    fn test_build_options_conflict() {
        let config = Config {
            include: vec!["JP".to_string()],
            exclude: vec!["US".to_string()],
            ..Default::default()
        };
        assert!(config.build_options().is_err());
    }

    #[test]
    fn test_geolite_url() {
        assert!(geolite_url("abc").ends_with("&license_key=abc"));
    }
}
