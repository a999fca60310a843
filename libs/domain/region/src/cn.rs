// [libs/domain/region/src/cn.rs]
//! CN resolves its own version server-side and refuses a user override
//! (enforced by the CLI's config validation, not here); it pulls table,
//! media and bundle feeds from a version-scoped manifest root. Grounded in
//! the original's `regions/cn.py`.

use crate::common::{first_semver, join_url};
use crate::errors::RegionError;
use caravan_domain_catalog::Catalog;
use caravan_domain_manifest::cn as cn_decoder;
use caravan_infra_fetcher::{FetchRequest, Fetcher};
use regex::Regex;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

const HOME_URL: &str = "https://bluearchive-cn.com/";
const VERSION_URL: &str = "https://bluearchive-cn.com/api/meta/setup";
const SERVER_INFO_URL: &str = "https://gs-api.bluearchive-cn.com/api/state";
const BILI_URL: &str = "https://line1-h5-pc-api.biligame.com/game/detail/gameinfo?game_base_id=109864";
const PACKAGE_WORKERS: u64 = 5;

pub struct CnDriver<'a> {
    fetcher: &'a Fetcher,
    temp_dir: PathBuf,
}

struct ServerInfo {
    base_url: String,
    table_version: String,
    media_version: String,
    resource_version: String,
}

impl<'a> CnDriver<'a> {
    pub fn new(fetcher: &'a Fetcher, temp_dir: PathBuf) -> Self {
        Self { fetcher, temp_dir }
    }

    #[instrument(skip(self))]
    pub fn run(&self) -> Result<Catalog, RegionError> {
        let version = self.latest_version()?;
        info!(version, "resolved CN version");

        let apk_url = self.apk_url().or_else(|_| self.apk_url_via_bili())?;
        self.download_package(&apk_url)?;

        let server_info = self.server_info(&version)?;
        let catalog = self.fetch_manifest(&server_info)?;
        if catalog.is_empty() {
            return Err(RegionError::EmptyCatalog);
        }
        Ok(catalog)
    }

    fn latest_version(&self) -> Result<String, RegionError> {
        let bytes = self.fetcher.get_bytes(&FetchRequest::get(VERSION_URL).browser_class())?;
        first_semver(&String::from_utf8_lossy(&bytes))
    }

    fn apk_url(&self) -> Result<String, RegionError> {
        let home = self.fetcher.get_bytes(&FetchRequest::get(HOME_URL).browser_class())?;
        let home_text = String::from_utf8_lossy(&home);
        let script_re = Regex::new(r#"<script[^>]+type="module"[^>]+crossorigin[^>]+src="([^"]+)"[^>]*>"#).unwrap();
        let script_url = script_re
            .captures(&home_text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or(RegionError::MissingField("entrypoint script tag"))?;

        let script = self.fetcher.get_bytes(&FetchRequest::get(&script_url).browser_class())?;
        let script_text = String::from_utf8_lossy(&script);
        let apk_re = Regex::new(r#"http[s]?://[^\s"<>]+?\.apk"#).unwrap();
        apk_re
            .find(&script_text)
            .map(|m| m.as_str().to_string())
            .ok_or(RegionError::MissingField("apk url in entrypoint script"))
    }

    fn apk_url_via_bili(&self) -> Result<String, RegionError> {
        warn!("falling back to bilibili endpoint for the apk url");
        let bytes = self.fetcher.get_bytes(&FetchRequest::get(BILI_URL))?;
        let response: serde_json::Value = serde_json::from_slice(&bytes)?;
        response
            .get("android_download_link")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or(RegionError::MissingField("android_download_link"))
    }

    /// Splits the package into `PACKAGE_WORKERS` ranged chunks, downloads
    /// each independently, then concatenates. The original justifies the
    /// split as a defense against the official server rate-limiting a
    /// single long-lived connection.
    fn download_package(&self, apk_url: &str) -> Result<(), RegionError> {
        std::fs::create_dir_all(&self.temp_dir)?;
        let file_name = apk_url.rsplit('/').next().unwrap_or("package.apk");
        let apk_path = self.temp_dir.join(file_name);

        let head = self.fetcher.get_response(&FetchRequest::head(apk_url).browser_class())?;
        let expected_size: u64 = head
            .headers()
            .get(reqwest::header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);

        if apk_path.exists() && apk_path.metadata()?.len() == expected_size && expected_size > 0 {
            info!("package already present locally with matching size, skipping download");
            return Ok(());
        }

        let chunk_size = expected_size / PACKAGE_WORKERS;
        let mut chunk_paths = Vec::new();
        for i in 0..PACKAGE_WORKERS {
            let start = chunk_size * i;
            let end = if i == PACKAGE_WORKERS - 1 { expected_size.saturating_sub(1) } else { start + chunk_size - 1 };
            let chunk_path = self.temp_dir.join(format!("chunk_{i}.dat"));
            let request = FetchRequest::get(apk_url).browser_class().with_range(start, Some(end));
            self.fetcher.save_file(&request, &chunk_path, &caravan_infra_fetcher::NullProgressSink)?;
            chunk_paths.push(chunk_path);
        }

        self.concatenate_chunks(&chunk_paths, &apk_path)?;

        let actual_size = apk_path.metadata()?.len();
        if expected_size > 0 && actual_size != expected_size {
            std::fs::remove_file(&apk_path)?;
            return Err(RegionError::PackageSizeMismatch { expected: expected_size, actual: actual_size });
        }
        Ok(())
    }

    fn concatenate_chunks(&self, chunk_paths: &[PathBuf], destination: &Path) -> Result<(), RegionError> {
        let mut out = File::create(destination)?;
        for chunk_path in chunk_paths {
            let mut chunk = File::open(chunk_path)?;
            let mut buf = Vec::new();
            chunk.read_to_end(&mut buf)?;
            out.write_all(&buf)?;
            std::fs::remove_file(chunk_path)?;
        }
        Ok(())
    }

    fn server_info(&self, version: &str) -> Result<ServerInfo, RegionError> {
        let request = FetchRequest::get(SERVER_INFO_URL)
            .with_header("APP-VER", version)
            .with_header("PLATFORM-ID", "1")
            .with_header("CHANNEL-ID", "2");
        let bytes = self.fetcher.get_bytes(&request)?;
        let response: serde_json::Value = serde_json::from_slice(&bytes)?;

        let base_url = response
            .get("AddressablesCatalogUrlRoots")
            .and_then(|v| v.get(0))
            .and_then(|v| v.as_str())
            .ok_or(RegionError::MissingField("AddressablesCatalogUrlRoots[0]"))?
            .to_string();
        let table_version = response
            .get("TableVersion")
            .and_then(|v| v.as_str())
            .ok_or(RegionError::MissingField("TableVersion"))?
            .to_string();
        let media_version = response
            .get("MediaVersion")
            .and_then(|v| v.as_str())
            .ok_or(RegionError::MissingField("MediaVersion"))?
            .to_string();
        let resource_version = response
            .get("ResourceVersion")
            .and_then(|v| v.as_str())
            .ok_or(RegionError::MissingField("ResourceVersion"))?
            .to_string();

        Ok(ServerInfo { base_url, table_version, media_version, resource_version })
    }

    fn fetch_manifest(&self, server_info: &ServerInfo) -> Result<Catalog, RegionError> {
        let table_url = join_url(&server_info.base_url, &format!("Manifest/TableBundles/{}/TableManifest", server_info.table_version));
        let media_url = join_url(&server_info.base_url, &format!("Manifest/MediaResources/{}/MediaManifest", server_info.media_version));
        let bundle_url = join_url(
            &server_info.base_url,
            &format!("AssetBundles/Catalog/{}/Android/bundleDownloadInfo.json", server_info.resource_version),
        );

        let bundle_base = join_url(&server_info.base_url, "AssetBundles/Android");
        let media_root = join_url(&server_info.base_url, "pool/MediaResources");
        let table_root = join_url(&server_info.base_url, "pool/TableBundles");

        let mut merged = Catalog::new();

        match self.fetcher.get_bytes(&FetchRequest::get(&table_url)) {
            Ok(bytes) => merged.extend(cn_decoder::decode_table_feed(&bytes, &table_root)?),
            Err(error) => warn!(error = %error, "failed to fetch table catalog, continuing without it"),
        }

        match self.fetcher.get_bytes(&FetchRequest::get(&media_url)) {
            Ok(bytes) => merged.extend(cn_decoder::decode_media_feed(&String::from_utf8_lossy(&bytes), &media_root)),
            Err(error) => warn!(error = %error, "failed to fetch media catalog, continuing without it"),
        }

        match self.fetcher.get_bytes(&FetchRequest::get(&bundle_url)) {
            Ok(bytes) => merged.extend(cn_decoder::decode_bundle_feed(&bytes, &bundle_base)?),
            Err(error) => warn!(error = %error, "failed to fetch bundle catalog, continuing without it"),
        }

        Ok(merged)
    }
}
