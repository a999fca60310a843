// [apps/cli/src/unity_adapter.rs]
//! Concrete adapters for the two Unity-asset-reading capabilities the
//! domain crates only declare as traits. Parsing serialized Unity asset
//! bundles (Texture2D/Sprite/AudioClip/TextAsset/MonoBehaviour payloads)
//! needs a binary-format library none of the crates already in this
//! workspace provide; wiring one in is future work tracked outside this
//! binary, so both adapters here are honest no-ops that log instead of
//! silently pretending to succeed.

use caravan_domain_pipeline::{BundleExtractor, PipelineError};
use caravan_domain_region::UnityAssetReader;
use std::path::Path;
use tracing::warn;

pub struct UnimplementedUnityAssetReader;

impl UnityAssetReader for UnimplementedUnityAssetReader {
    fn find_text_asset(
        &self,
        unpacked_dir: &Path,
        asset_name: &str,
    ) -> Result<Option<Vec<u8>>, caravan_domain_region::RegionError> {
        warn!(
            dir = %unpacked_dir.display(),
            asset = asset_name,
            "Unity asset bundle parsing is not wired into this binary, skipping TextAsset lookup"
        );
        Ok(None)
    }
}

pub struct UnimplementedBundleExtractor;

impl BundleExtractor for UnimplementedBundleExtractor {
    fn extract_bundle(&self, path: &Path) -> Result<(), PipelineError> {
        warn!(path = %path.display(), "Unity asset bundle parsing is not wired into this binary, skipping bundle extraction");
        Ok(())
    }
}
