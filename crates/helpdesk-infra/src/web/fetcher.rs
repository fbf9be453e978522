//! HttpPageFetcher -- reqwest-backed [`PageFetcher`].
//!
//! Redirects are followed only while every hop stays on the domain
//! allowlist; a hop to any other host aborts the fetch.

use std::time::Duration;

use reqwest::redirect;
use url::Url;

use helpdesk_core::tools::ToolError;
use helpdesk_core::tools::fetch::PageFetcher;
use helpdesk_core::tools::search::DomainAllowlist;

const MAX_REDIRECTS: usize = 10;

/// Bytes of a page body read before the rest is discarded.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;
const USER_AGENT: &str = concat!("helpdesk-agent/", env!("CARGO_PKG_VERSION"));

pub struct HttpPageFetcher {
    client: reqwest::Client,
}

/// Append `chunk` to `body` without letting it grow past `cap` bytes.
/// Returns false once the cap is reached.
fn append_capped(body: &mut Vec<u8>, chunk: &[u8], cap: usize) -> bool {
    let room = cap.saturating_sub(body.len());
    body.extend_from_slice(&chunk[..chunk.len().min(room)]);
    body.len() < cap
}

/// Whether a redirect to `next` may be followed after `hops` prior hops.
fn redirect_allowed(allowlist: &DomainAllowlist, next: &Url, hops: usize) -> Result<(), String> {
    if hops >= MAX_REDIRECTS {
        return Err(format!("too many redirects (limit {MAX_REDIRECTS})"));
    }
    allowlist.check(next).map_err(|e| e.to_string())
}

impl HttpPageFetcher {
    pub fn new(allowlist: DomainAllowlist, timeout: Duration) -> Result<Self, ToolError> {
        let policy = redirect::Policy::custom(move |attempt| {
            match redirect_allowed(&allowlist, attempt.url(), attempt.previous().len()) {
                Ok(()) => attempt.follow(),
                Err(reason) => attempt.error(reason),
            }
        });

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(policy)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ToolError::Fetch(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, ToolError> {
        tracing::debug!(%url, "fetching page");

        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ToolError::Fetch(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::Fetch(format!("HTTP {status} from {url}")));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ToolError::Fetch(format!("failed to read body of {url}: {e}")))?
        {
            if !append_capped(&mut body, &chunk, MAX_BODY_BYTES) {
                tracing::debug!(%url, cap = MAX_BODY_BYTES, "page body truncated");
                break;
            }
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}
