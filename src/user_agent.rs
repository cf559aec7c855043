//! User-Agent string shared by fetch and download requests.

/// Project URL for User-Agent identification (good citizenship; RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/fierce/media-fetch";

/// Default User-Agent for all requests (identifies the tool).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("media-fetch/{version} (+{PROJECT_UA_URL})")
}
