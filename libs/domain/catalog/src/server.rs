// [libs/domain/catalog/src/server.rs]
//! Region-dependent record holding the catalog base URL(s) and per-family
//! version stamps. Created once by a region driver, consumed once by that
//! driver's manifest fetch step.

#[derive(Debug, Clone, Default)]
pub struct ServerInfo {
    pub catalog_base_urls: Vec<String>,
    pub game_version: String,
    pub table_version: Option<String>,
    pub media_version: Option<String>,
    pub resource_version: Option<String>,
}

impl ServerInfo {
    pub fn new(game_version: impl Into<String>) -> Self {
        Self {
            catalog_base_urls: Vec::new(),
            game_version: game_version.into(),
            table_version: None,
            media_version: None,
            resource_version: None,
        }
    }

    pub fn primary_base_url(&self) -> Option<&str> {
        self.catalog_base_urls.first().map(String::as_str)
    }
}
