// [libs/domain/pipeline/src/config.rs]
use caravan_domain_catalog::ResourceType;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub raw_dir: PathBuf,
    pub extract_dir: PathBuf,
    pub temp_dir: PathBuf,
    pub downloading_extract: bool,
    pub resource_types: Vec<ResourceType>,
    pub verify_workers: usize,
    pub download_workers: usize,
    pub max_workers: usize,
    pub extract_workers: usize,
    pub max_retries: u32,
    pub proxy: Option<String>,
}

impl PipelineConfig {
    pub fn accepts(&self, resource_type: ResourceType) -> bool {
        self.resource_types.contains(&resource_type)
    }
}
