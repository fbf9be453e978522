//! Outbound page fetching for the `searchSite` tool.

pub mod fetcher;
