// [libs/infra/fetcher/src/fetcher.rs]
//! Single-request HTTP fetcher built on the blocking `reqwest` client,
//! because the pipeline has no cooperative suspension primitive: a worker
//! thread blocks here the same way it blocks on a queue-get.

use crate::errors::FetchError;
use crate::progress::ProgressSink;
use crate::request::{FetchRequest, Method};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
const DEFAULT_USER_AGENT: &str = "caravan-asset-sync/0.1";
const STREAM_CHUNK_BYTES: usize = 64 * 1024;
const SLOW_STREAM_GRACE: Duration = Duration::from_secs(2);
const SLOW_STREAM_BYTES_PER_SEC: u64 = 4096;

pub struct Fetcher {
    client: reqwest::blocking::Client,
    cancelled: Arc<AtomicBool>,
}

impl Fetcher {
    pub fn new(proxy: Option<&str>) -> Result<Self, FetchError> {
        Self::with_cancellation_flag(proxy, Arc::new(AtomicBool::new(false)))
    }

    pub fn with_cancellation_flag(proxy: Option<&str>, cancelled: Arc<AtomicBool>) -> Result<Self, FetchError> {
        let mut builder = reqwest::blocking::Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .timeout(Duration::from_secs(60));
        if let Some(proxy_url) = proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }
        Ok(Self { client: builder.build()?, cancelled })
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    fn check_cancelled(&self) -> Result<(), FetchError> {
        if self.cancelled.load(Ordering::SeqCst) {
            return Err(FetchError::Cancelled);
        }
        Ok(())
    }

    fn build_request(&self, req: &FetchRequest) -> reqwest::blocking::RequestBuilder {
        let mut builder = match req.method {
            Method::Get => self.client.get(&req.url),
            Method::Post => self.client.post(&req.url),
            Method::Head => self.client.head(&req.url),
        };
        if req.bypass_scraper_ua {
            builder = builder.header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT);
        }
        for (name, value) in &req.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &req.json_body {
            builder = builder.json(body);
        }
        if let Some((start, end)) = req.range {
            let value = match end {
                Some(end) => format!("bytes={start}-{end}"),
                None => format!("bytes={start}-"),
            };
            builder = builder.header(reqwest::header::RANGE, value);
        }
        builder
    }

    fn send_with_retry(&self, req: &FetchRequest) -> Result<reqwest::blocking::Response, FetchError> {
        let mut last_error = None;
        for attempt in 0..=req.max_retries {
            self.check_cancelled()?;
            match self.build_request(req).send() {
                Ok(response) if response.status().is_success() || response.status().is_redirection() => {
                    return Ok(response)
                }
                Ok(response) => {
                    let status = response.status().as_u16();
                    warn!(url = %req.url, status, attempt, "fetch attempt returned non-success status");
                    last_error = Some(FetchError::UnexpectedStatus { status, url: req.url.clone() });
                }
                Err(transport_error) => {
                    warn!(url = %req.url, attempt, error = %transport_error, "fetch attempt failed");
                    last_error = Some(FetchError::Transport(transport_error));
                }
            }
        }
        Err(last_error.unwrap_or(FetchError::RetriesExhausted(req.max_retries)))
    }

    #[instrument(skip(self, req))]
    pub fn get_response(&self, req: &FetchRequest) -> Result<reqwest::blocking::Response, FetchError> {
        self.send_with_retry(req)
    }

    #[instrument(skip(self, req))]
    pub fn get_bytes(&self, req: &FetchRequest) -> Result<Vec<u8>, FetchError> {
        let response = self.send_with_retry(req)?;
        Ok(response.bytes()?.to_vec())
    }

    /// Streams the response body to `path`, aborting and retrying the whole
    /// request if throughput drops below the slow-stream threshold.
    /// Crediting/reversal happens through `progress` so a failed write never
    /// leaves the UI counter ahead of bytes actually on disk.
    #[instrument(skip(self, req, progress))]
    pub fn save_file(
        &self,
        req: &FetchRequest,
        path: &Path,
        progress: &dyn ProgressSink,
    ) -> Result<(), FetchError> {
        let mut last_error = None;
        for attempt in 0..=req.max_retries {
            self.check_cancelled()?;
            match self.stream_once(req, path, progress) {
                Ok(()) => return Ok(()),
                Err(error) if error.is_cancellation() => return Err(error),
                Err(error) => {
                    debug!(url = %req.url, attempt, error = %error, "streamed save attempt failed, retrying");
                    last_error = Some(error);
                }
            }
        }
        Err(last_error.unwrap_or(FetchError::RetriesExhausted(req.max_retries)))
    }

    fn stream_once(&self, req: &FetchRequest, path: &Path, progress: &dyn ProgressSink) -> Result<(), FetchError> {
        let response = self.build_request(req).send()?;
        if !response.status().is_success() {
            return Err(FetchError::UnexpectedStatus { status: response.status().as_u16(), url: req.url.clone() });
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path)?;

        let mut reader = response;
        let mut buf = [0u8; STREAM_CHUNK_BYTES];
        let started_at = Instant::now();
        let mut credited_bytes: u64 = 0;

        loop {
            self.check_cancelled()?;

            let read = reader.read(&mut buf).map_err(FetchError::Io)?;
            if read == 0 {
                break;
            }
            file.write_all(&buf[..read])?;
            credited_bytes += read as u64;
            progress.credit(read as u64);

            let elapsed = started_at.elapsed();
            if elapsed > SLOW_STREAM_GRACE {
                let threshold = SLOW_STREAM_BYTES_PER_SEC * elapsed.as_secs().max(1);
                if credited_bytes < threshold {
                    progress.reverse(credited_bytes);
                    drop(file);
                    let _ = std::fs::remove_file(path);
                    return Err(FetchError::SlowStream { url: req.url.clone() });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullProgressSink;

    #[test]
    fn cancellation_short_circuits_before_any_request_is_sent() {
        let flag = Arc::new(AtomicBool::new(true));
        let fetcher = Fetcher::with_cancellation_flag(None, flag).unwrap();
        let req = FetchRequest::get("https://example.invalid/asset");
        let result = fetcher.get_bytes(&req);
        assert!(matches!(result, Err(FetchError::Cancelled)));
    }

    #[test]
    fn save_file_to_unwritable_parent_surfaces_io_error() {
        let fetcher = Fetcher::new(None).unwrap();
        let req = FetchRequest::get("https://example.invalid/asset").with_max_retries(0);
        // No real network call happens because DNS for .invalid never resolves
        // within a retry budget of zero; this exercises the retry-exhaustion path.
        let result = fetcher.save_file(&req, Path::new("/nonexistent-root/x"), &NullProgressSink);
        assert!(result.is_err());
    }
}
