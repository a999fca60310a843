// [libs/domain/region/src/gl.rs]
//! GL has no package to download: the catalog URL comes straight back
//! from a version-check POST, grounded in the original's `regions/gl.py`.

use crate::common::first_semver;
use crate::errors::RegionError;
use caravan_domain_catalog::Catalog;
use caravan_domain_manifest::gl as gl_decoder;
use caravan_infra_fetcher::{FetchRequest, Fetcher};
use serde_json::json;
use tracing::{info, instrument};

const LISTING_URL: &str = "https://blue-archive-global.en.uptodown.com/android";
const VERSION_CHECK_URL: &str = "https://api-pub.nexon.com/patch/v1.1/version-check";
const MARKET_GAME_ID: &str = "com.nexon.bluearchive";
const MARKET_CODE: &str = "playstore";

pub struct GlDriver<'a> {
    fetcher: &'a Fetcher,
    version_override: Option<String>,
}

impl<'a> GlDriver<'a> {
    pub fn new(fetcher: &'a Fetcher, version_override: Option<String>) -> Self {
        Self { fetcher, version_override }
    }

    #[instrument(skip(self))]
    pub fn run(&self) -> Result<Catalog, RegionError> {
        let version = match &self.version_override {
            Some(v) => v.clone(),
            None => self.latest_version()?,
        };
        info!(version, "resolved GL version");

        let server_url = self.server_url(&version)?;
        let catalog = self.fetch_manifest(&server_url)?;
        if catalog.is_empty() {
            return Err(RegionError::EmptyCatalog);
        }
        Ok(catalog)
    }

    fn latest_version(&self) -> Result<String, RegionError> {
        let bytes = self.fetcher.get_bytes(&FetchRequest::get(LISTING_URL))?;
        let text = String::from_utf8_lossy(&bytes);
        first_semver(&text)
    }

    fn server_url(&self, version: &str) -> Result<String, RegionError> {
        let build_number = version.rsplit('.').next().unwrap_or(version);
        let body = json!({
            "market_game_id": MARKET_GAME_ID,
            "market_code": MARKET_CODE,
            "curr_build_version": version,
            "curr_build_number": build_number,
        });
        let bytes = self.fetcher.get_bytes(&FetchRequest::post(VERSION_CHECK_URL, body))?;
        let response: serde_json::Value = serde_json::from_slice(&bytes)?;
        response
            .get("patch")
            .and_then(|patch| patch.get("resource_path"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or(RegionError::MissingField("patch.resource_path"))
    }

    fn fetch_manifest(&self, server_url: &str) -> Result<Catalog, RegionError> {
        let bytes = self.fetcher.get_bytes(&FetchRequest::get(server_url))?;
        let base = server_url.rsplit_once('/').map(|(base, _)| base).unwrap_or(server_url);
        Ok(gl_decoder::decode_resources(&bytes, base)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_url_build_number_falls_back_to_version_when_no_dot() {
        // rsplit('.').next() on "10" returns "10" itself, matching the
        // original's version.split(".")[-1] behavior for short strings.
        let version = "10";
        let build_number = version.rsplit('.').next().unwrap_or(version);
        assert_eq!(build_number, "10");
    }
}
