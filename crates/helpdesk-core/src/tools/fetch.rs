//! PageFetcher trait and its type-erased wrapper.

use std::future::Future;
use std::pin::Pin;

use url::Url;

use super::ToolError;

/// Fetches the body of a web page.
///
/// Callers check the URL against the domain allowlist before calling
/// `fetch`; implementations that follow redirects must re-check every hop.
/// Implementations live in helpdesk-infra (e.g., `HttpPageFetcher`).
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<String, ToolError>> + Send;
}

/// Object-safe version of [`PageFetcher`] with boxed futures.
pub trait PageFetcherDyn: Send + Sync {
    fn fetch_boxed<'a>(
        &'a self,
        url: &'a Url,
    ) -> Pin<Box<dyn Future<Output = Result<String, ToolError>> + Send + 'a>>;
}

impl<T: PageFetcher> PageFetcherDyn for T {
    fn fetch_boxed<'a>(
        &'a self,
        url: &'a Url,
    ) -> Pin<Box<dyn Future<Output = Result<String, ToolError>> + Send + 'a>> {
        Box::pin(self.fetch(url))
    }
}

/// Type-erased page fetcher.
pub struct BoxPageFetcher {
    inner: Box<dyn PageFetcherDyn + Send + Sync>,
}

impl BoxPageFetcher {
    pub fn new<T: PageFetcher + 'static>(fetcher: T) -> Self {
        Self {
            inner: Box::new(fetcher),
        }
    }

    pub async fn fetch(&self, url: &Url) -> Result<String, ToolError> {
        self.inner.fetch_boxed(url).await
    }
}
