//! `searchSite`: fetch an allowlisted page and return its visible text.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use helpdesk_types::tool::ToolOutcome;

use super::fetch::BoxPageFetcher;
use super::{ToolError, arguments_object, required_string};

static HIDDEN_BLOCKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<!--.*?-->|<script\b.*?</script\s*>|<style\b.*?</style\s*>|<noscript\b.*?</noscript\s*>",
    )
    .expect("static regex pattern must compile")
});

static TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("static regex pattern must compile"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex pattern must compile"));

/// Domains `searchSite` may reach.
///
/// A host is permitted when it equals an entry or is a subdomain of one
/// (`en.wikipedia.org` matches `wikipedia.org`; `notwikipedia.org` does not).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainAllowlist {
    domains: Vec<String>,
}

impl DomainAllowlist {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let domains = domains
            .into_iter()
            .map(|d| {
                d.as_ref()
                    .trim()
                    .trim_start_matches('.')
                    .trim_end_matches('.')
                    .to_ascii_lowercase()
            })
            .filter(|d| !d.is_empty())
            .collect();
        Self { domains }
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    pub fn permits_host(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        self.domains.iter().any(|domain| {
            host.strip_suffix(domain.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.ends_with('.'))
        })
    }

    /// Reject anything that is not an http(s) URL on a permitted host.
    pub fn check(&self, url: &Url) -> Result<(), ToolError> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ToolError::InvalidArguments(format!(
                "unsupported URL scheme '{}': only http and https are allowed",
                url.scheme()
            )));
        }
        let host = url
            .host_str()
            .ok_or_else(|| ToolError::InvalidArguments(format!("URL has no host: {url}")))?;
        if self.permits_host(host) {
            Ok(())
        } else {
            Err(ToolError::DomainNotAllowed(format!(
                "domain '{host}' is not allowed; permitted domains: {}",
                self.domains.join(", ")
            )))
        }
    }
}

/// Reduce an HTML document to collapsed plain text of at most `max_chars`
/// characters.
pub fn extract_text(html: &str, max_chars: usize) -> String {
    let without_hidden = HIDDEN_BLOCKS.replace_all(html, " ");
    let without_tags = TAGS.replace_all(&without_hidden, " ");
    let decoded = decode_entities(&without_tags);
    let collapsed = WHITESPACE.replace_all(&decoded, " ");
    collapsed.trim().chars().take(max_chars).collect()
}

fn decode_entities(text: &str) -> String {
    // &amp; goes last so "&amp;lt;" decodes to "&lt;", not "<".
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// The `searchSite` tool.
pub struct SearchSiteTool {
    allowlist: DomainAllowlist,
    fetcher: BoxPageFetcher,
    max_chars: usize,
}

impl SearchSiteTool {
    pub fn new(allowlist: DomainAllowlist, fetcher: BoxPageFetcher, max_chars: usize) -> Self {
        Self {
            allowlist,
            fetcher,
            max_chars,
        }
    }

    pub fn parameters() -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "Absolute http(s) URL of the page to read"
                }
            },
            "required": ["url"]
        })
    }

    pub async fn invoke(&self, arguments: &Value) -> ToolOutcome {
        match self.run(arguments).await {
            Ok(outcome) => outcome,
            Err(err) => {
                debug!(error = %err, "searchSite failed");
                err.into()
            }
        }
    }

    async fn run(&self, arguments: &Value) -> Result<ToolOutcome, ToolError> {
        let args = arguments_object(arguments)?;
        let raw = required_string(&args, "url")?;
        let url = Url::parse(raw.trim())
            .map_err(|e| ToolError::InvalidArguments(format!("invalid URL '{raw}': {e}")))?;

        self.allowlist.check(&url)?;

        let body = self.fetcher.fetch(&url).await?;
        let content = extract_text(&body, self.max_chars);
        Ok(ToolOutcome::ok(json!({
            "url": url.as_str(),
            "content": content,
        })))
    }
}
