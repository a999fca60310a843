// [libs/domain/region/src/jp.rs]
//! JP streams a single xapk-style package, unpacks the inner apk's
//! `assets/bin/Data`, and recovers the live catalog URL from a
//! `GameMainConfig` TextAsset buried in the unpacked bundles. Reading
//! Unity-serialized asset bundles is delegated to an injected capability,
//! the same boundary the pipeline draws around bundle extraction; this
//! crate only owns the byte-level XOR/JSON recovery once the raw
//! TextAsset payload is in hand.

use crate::common::join_url;
use crate::errors::RegionError;
use caravan_core_obfuscation::{convert_string, keystream, xor_stream};
use caravan_domain_catalog::Catalog;
use caravan_domain_manifest::jp as jp_decoder;
use caravan_infra_fetcher::{FetchRequest, Fetcher, NullProgressSink};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

const NOTICE_INDEX_URL: &str = "https://prod-noticeindex.bluearchiveyostar.com/prod/index.json";
const UPTODOWN_INFO_URL: &str = "https://blue-archive.jp.uptodown.com/android";
const APKPURE_URL: &str = "https://d.apkpure.com/b/XAPK/com.YostarJP.BlueArchive?nc=arm64-v8a&sv=24";
const SERVER_INFO_DATA_KEY: &str = "X04YXBFqd3ZpTg9cKmpvdmpOElwnamB2eE4cXDZqc3ZgTg==";

/// Reads Unity-serialized asset bundles on disk. Implementations live
/// outside this crate; the region driver only needs the one TextAsset
/// payload it cares about.
pub trait UnityAssetReader {
    fn find_text_asset(&self, unpacked_dir: &Path, asset_name: &str) -> Result<Option<Vec<u8>>, RegionError>;
}

pub struct JpDriver<'a> {
    fetcher: &'a Fetcher,
    temp_dir: PathBuf,
    asset_reader: &'a dyn UnityAssetReader,
    version_override: Option<String>,
}

impl<'a> JpDriver<'a> {
    pub fn new(
        fetcher: &'a Fetcher,
        temp_dir: PathBuf,
        asset_reader: &'a dyn UnityAssetReader,
        version_override: Option<String>,
    ) -> Self {
        Self { fetcher, temp_dir, asset_reader, version_override }
    }

    #[instrument(skip(self))]
    pub fn run(&self) -> Result<Catalog, RegionError> {
        let version = match &self.version_override {
            Some(v) => v.clone(),
            None => self.latest_version()?,
        };
        info!(version, "resolved JP version");

        let apk_url = format!("{APKPURE_URL}&versionCode={}", version.rsplit('.').next().unwrap_or(&version));
        let unpacked_dir = self.download_and_unpack(&apk_url)?;

        let catalog_url = self.server_url(&unpacked_dir)?;
        let catalog = self.fetch_manifest(&catalog_url)?;
        if catalog.is_empty() {
            return Err(RegionError::EmptyCatalog);
        }
        Ok(catalog)
    }

    /// Two independent sources, official notice and a listing page;
    /// disagreement resolves to whichever build number is higher.
    fn latest_version(&self) -> Result<String, RegionError> {
        let official: Option<String> = self
            .fetcher
            .get_bytes(&FetchRequest::get(NOTICE_INDEX_URL))
            .ok()
            .and_then(|bytes| serde_json::from_slice::<serde_json::Value>(&bytes).ok())
            .and_then(|v| v.get("LatestClientVersion").and_then(|v| v.as_str()).map(str::to_string));

        let uptodown: Option<String> = self
            .fetcher
            .get_bytes(&FetchRequest::get(UPTODOWN_INFO_URL))
            .ok()
            .and_then(|bytes| crate::common::first_semver(&String::from_utf8_lossy(&bytes)).ok());

        match (official, uptodown) {
            (Some(official), Some(uptodown)) => {
                let official_build: u64 = official.rsplit('.').next().and_then(|s| s.parse().ok()).unwrap_or(0);
                let uptodown_build: u64 = uptodown.rsplit('.').next().and_then(|s| s.parse().ok()).unwrap_or(0);
                if uptodown_build > official_build {
                    Ok(uptodown)
                } else {
                    Ok(official)
                }
            }
            (Some(v), None) | (None, Some(v)) => Ok(v),
            (None, None) => Err(RegionError::VersionNotFound),
        }
    }

    fn download_and_unpack(&self, apk_url: &str) -> Result<PathBuf, RegionError> {
        std::fs::create_dir_all(&self.temp_dir)?;
        let package_path = self.temp_dir.join("package.xapk");
        let request = FetchRequest::get(apk_url).browser_class();
        self.fetcher.save_file(&request, &package_path, &NullProgressSink)?;

        let inner_apk_dir = self.temp_dir.join("xapk");
        let inner_apk_path = extract_zip_matching(&package_path, &inner_apk_dir, "apk")?;

        let unpacked_dir = self.temp_dir.join("data");
        extract_zip_tree_matching(&inner_apk_path, &unpacked_dir, "assets/bin/Data")?;
        Ok(unpacked_dir)
    }

    fn server_url(&self, unpacked_dir: &Path) -> Result<String, RegionError> {
        let raw_asset = self
            .asset_reader
            .find_text_asset(unpacked_dir, "GameMainConfig")?
            .ok_or(RegionError::MissingField("GameMainConfig TextAsset"))?;

        let key = keystream("GameMainConfig", raw_asset.len());
        let decoded = convert_string(&String::from_utf8_lossy(&raw_asset), &key);
        let config: serde_json::Value = serde_json::from_str(&decoded)?;

        let encrypted_url = config
            .get(SERVER_INFO_DATA_KEY)
            .and_then(|v| v.as_str())
            .ok_or(RegionError::MissingField("ServerInfoDataUrl key"))?;

        let url_key = keystream("ServerInfoDataUrl", encrypted_url.len());
        let url = convert_string(encrypted_url, &url_key);
        if url.is_empty() {
            return Err(RegionError::MissingField("decoded server url was empty"));
        }
        info!(url, "recovered server url from GameMainConfig");
        Ok(url)
    }

    fn fetch_manifest(&self, catalog_url: &str) -> Result<Catalog, RegionError> {
        let bytes = self.fetcher.get_bytes(&FetchRequest::get(catalog_url))?;
        let api: serde_json::Value = serde_json::from_slice(&bytes)?;
        let base_url = api
            .get("ConnectionGroups")
            .and_then(|v| v.get(0))
            .and_then(|v| v.get("OverrideConnectionGroups"))
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.last())
            .and_then(|v| v.get("AddressablesCatalogUrlRoot"))
            .and_then(|v| v.as_str())
            .ok_or(RegionError::MissingField("AddressablesCatalogUrlRoot"))?;

        let table_root = join_url(base_url, "TableBundles");
        let media_root = join_url(base_url, "MediaResources");
        let bundle_base = join_url(base_url, "Android");

        let mut merged = Catalog::new();

        match self.fetcher.get_bytes(&FetchRequest::get(join_url(&table_root, "TableCatalog.bytes"))) {
            Ok(bytes) => merged.extend(jp_decoder::decode_table_catalog(&bytes, &table_root)?),
            Err(error) => warn!(error = %error, "failed to fetch table catalog, continuing without it"),
        }

        match self.fetcher.get_bytes(&FetchRequest::get(join_url(&media_root, "MediaCatalog.bytes"))) {
            Ok(bytes) => merged.extend(jp_decoder::decode_media_catalog(&bytes, &media_root)?),
            Err(error) => warn!(error = %error, "failed to fetch media catalog, continuing without it"),
        }

        match self.fetcher.get_bytes(&FetchRequest::get(join_url(&bundle_base, "bundleDownloadInfo.json"))) {
            Ok(bytes) => merged.extend(jp_decoder::decode_bundle_feed(&bytes, &bundle_base)?),
            Err(error) => warn!(error = %error, "failed to fetch bundle catalog, continuing without it"),
        }

        Ok(merged)
    }
}

fn extract_zip_matching(zip_path: &Path, out_dir: &Path, name_contains: &str) -> Result<PathBuf, RegionError> {
    std::fs::create_dir_all(out_dir)?;
    let file = std::fs::File::open(zip_path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    let mut extracted = None;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let entry_name = entry.name().to_string();
        if entry_name.contains(name_contains) {
            let dest = out_dir.join(entry_name.rsplit('/').next().unwrap_or(&entry_name));
            let mut out_file = std::fs::File::create(&dest)?;
            std::io::copy(&mut entry, &mut out_file)?;
            extracted = Some(dest);
        }
    }
    extracted.ok_or_else(|| zip::result::ZipError::FileNotFound.into())
}

fn extract_zip_tree_matching(zip_path: &Path, out_dir: &Path, prefix: &str) -> Result<(), RegionError> {
    std::fs::create_dir_all(out_dir)?;
    let file = std::fs::File::open(zip_path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let entry_name = entry.name().to_string();
        if !entry_name.starts_with(prefix) || entry.is_dir() {
            continue;
        }
        let dest = out_dir.join(&entry_name);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out_file = std::fs::File::create(&dest)?;
        std::io::copy(&mut entry, &mut out_file)?;
    }
    Ok(())
}
