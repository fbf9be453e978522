//! HTTP glue in front of the session controller.
//!
//! JSON and SSE endpoints under `/api/`, keyed by the `sid` cookie.

pub mod error;
pub mod handlers;
pub mod router;
pub mod session_cookie;
