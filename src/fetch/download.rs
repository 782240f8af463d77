//! HTTP downloads.

use crate::error::Result;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static LICENSE_KEY_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_license_key_regex() -> &'static Regex {
    LICENSE_KEY_REGEX.get_or_init(|| Regex::new(r"license_key=[^&]*").expect("Invalid Regex"))
}

/// Hide the license key before a URL goes to the log.
pub fn redact(url: &str) -> String {
    get_license_key_regex()
        .replace_all(url, "license_key=***")
        .into_owned()
}

/// Last path segment of a URL, without the query string.
pub fn file_name(url: &str) -> &str {
    let path = url.split(&['?', '#'][..]).next().unwrap_or(url);
    path.rsplit('/').next().unwrap_or(path)
}

/// GET `url` and store the body at `dest`.
pub async fn download(client: &reqwest::Client, url: &str, dest: &Path) -> Result<PathBuf> {
    log::debug!("GET {}", redact(url));
    // reqwest errors carry the URL, and with it the license key
    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| e.without_url())?;
    let body = response.bytes().await.map_err(|e| e.without_url())?;
    tokio::fs::write(dest, &body).await?;
    log::info!("Downloaded {} ({} bytes)", dest.display(), body.len());
    Ok(dest.to_path_buf())
}
