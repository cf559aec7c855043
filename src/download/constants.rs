//! Constants for the download module (timeouts, redirects, body limits).

/// Default HTTP connect timeout (10 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default total request timeout, body transfer included (60 seconds).
pub const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Maximum redirect hops followed by fetches and downloads.
pub const MAX_REDIRECTS: usize = 10;

/// Largest body a `fetch` will buffer looking for JSON (4 MiB).
pub const MAX_DOCUMENT_BYTES: u64 = 4 * 1024 * 1024;
