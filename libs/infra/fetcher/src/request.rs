// [libs/infra/fetcher/src/request.rs]

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Head,
}

/// Parameterizes one HTTP request: the fetcher is stateless, the request is
/// the unit of retry.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: Method,
    pub url: String,
    pub json_body: Option<serde_json::Value>,
    pub headers: Vec<(String, String)>,
    pub range: Option<(u64, Option<u64>)>,
    pub bypass_scraper_ua: bool,
    pub max_retries: u32,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            json_body: None,
            headers: Vec::new(),
            range: None,
            bypass_scraper_ua: false,
            max_retries: 3,
        }
    }

    pub fn post(url: impl Into<String>, json_body: serde_json::Value) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            json_body: Some(json_body),
            headers: Vec::new(),
            range: None,
            bypass_scraper_ua: false,
            max_retries: 3,
        }
    }

    pub fn head(url: impl Into<String>) -> Self {
        Self {
            method: Method::Head,
            url: url.into(),
            json_body: None,
            headers: Vec::new(),
            range: None,
            bypass_scraper_ua: false,
            max_retries: 3,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_range(mut self, start: u64, end: Option<u64>) -> Self {
        self.range = Some((start, end));
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn browser_class(mut self) -> Self {
        self.bypass_scraper_ua = true;
        self
    }
}
