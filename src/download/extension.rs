//! File extension inference for downloaded media.
//!
//! Upstream media APIs rarely agree on how they describe what they serve, so
//! the extension is derived from a priority chain of signals. The first
//! heuristic that yields a usable extension wins:
//!
//! 1. `Content-Disposition` filename
//! 2. `fileName` query parameter on the URL
//! 3. response `Content-Type`
//! 4. URL path suffix
//! 5. keyword fallback (`video`/`mp4` in the URL → `.mp4`, otherwise `.jpg`)

use url::Url;

/// Extension used when nothing better is known and the URL looks like video.
pub const VIDEO_FALLBACK_EXTENSION: &str = ".mp4";

/// Extension used when nothing better is known.
pub const IMAGE_FALLBACK_EXTENSION: &str = ".jpg";

/// Query parameter some media hosts use to carry the original filename.
const FILE_NAME_QUERY_PARAM: &str = "fileName";

/// Longest accepted extension, dot included.
const MAX_EXTENSION_LEN: usize = 12;

/// Signals gathered from one HTTP response, evaluated lazily in priority order.
///
/// Computed fresh per download and never stored.
#[derive(Debug, Clone, Copy)]
pub struct ExtensionHint<'a> {
    /// Raw `Content-Disposition` header value.
    pub content_disposition: Option<&'a str>,
    /// Raw `Content-Type` header value.
    pub content_type: Option<&'a str>,
    /// URL after redirects.
    pub final_url: Option<&'a Url>,
    /// URL the download was requested with.
    pub requested_url: &'a str,
}

impl ExtensionHint<'_> {
    /// Resolves the extension, dot included and lowercased.
    #[must_use]
    pub fn resolve(&self) -> String {
        let requested = Url::parse(self.requested_url).ok();
        let urls: Vec<&Url> = self.final_url.into_iter().chain(requested.as_ref()).collect();

        self.content_disposition
            .and_then(extension_from_content_disposition)
            .or_else(|| urls.iter().find_map(|url| extension_from_file_name_param(url)))
            .or_else(|| {
                self.content_type
                    .and_then(extension_from_content_type)
                    .map(str::to_string)
            })
            .or_else(|| urls.iter().find_map(|url| extension_from_url_path(url)))
            .unwrap_or_else(|| keyword_fallback(self.requested_url, self.final_url).to_string())
    }
}

/// Extension of the filename carried by a `Content-Disposition` header.
pub(crate) fn extension_from_content_disposition(header: &str) -> Option<String> {
    parse_content_disposition(header).and_then(|name| extension_of(&name))
}

/// Extension of the `fileName` query parameter, if present.
pub(crate) fn extension_from_file_name_param(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == FILE_NAME_QUERY_PARAM)
        .and_then(|(_, value)| extension_of(&value))
}

/// Maps a `Content-Type` header to an extension.
///
/// Unmapped types yield `None` so the URL path and keyword heuristics decide.
pub(crate) fn extension_from_content_type(content_type: &str) -> Option<&'static str> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    let ext = match mime.as_str() {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => ".jpg",
        "image/png" => ".png",
        "image/gif" => ".gif",
        "image/webp" => ".webp",
        "image/bmp" => ".bmp",
        "image/svg+xml" => ".svg",
        "image/avif" => ".avif",
        "image/heic" => ".heic",
        "video/mp4" => ".mp4",
        "video/webm" => ".webm",
        "video/quicktime" => ".mov",
        "video/x-matroska" => ".mkv",
        "video/x-flv" => ".flv",
        "video/mpeg" => ".mpeg",
        _ => return None,
    };
    Some(ext)
}

/// Extension of the last URL path segment.
pub(crate) fn extension_from_url_path(url: &Url) -> Option<String> {
    let last_segment = url.path_segments()?.next_back()?;
    let decoded = urlencoding::decode(last_segment).ok()?;
    extension_of(&decoded)
}

/// Last-resort guess from URL keywords.
pub(crate) fn keyword_fallback(requested_url: &str, final_url: Option<&Url>) -> &'static str {
    let looks_like_video = std::iter::once(requested_url)
        .chain(final_url.map(Url::as_str))
        .map(str::to_ascii_lowercase)
        .any(|text| text.contains("video") || text.contains("mp4"));
    if looks_like_video {
        VIDEO_FALLBACK_EXTENSION
    } else {
        IMAGE_FALLBACK_EXTENSION
    }
}

/// Extracts a normalized extension from a filename.
///
/// Only the final path component is considered. The suffix must be ASCII
/// alphanumeric and at most [`MAX_EXTENSION_LEN`] bytes with the dot.
pub(crate) fn extension_of(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let dot_index = base.rfind('.')?;
    let ext = &base[dot_index..];
    if ext.len() <= 1 || ext.len() > MAX_EXTENSION_LEN {
        return None;
    }
    if !ext[1..].chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Parses a `Content-Disposition` header to extract the filename.
///
/// Handles:
/// - `attachment; filename="clip.mp4"`
/// - `attachment; filename=clip.mp4`
/// - `attachment; filename*=UTF-8''clip%20one.mp4` (RFC 5987, preferred)
pub(crate) fn parse_content_disposition(header: &str) -> Option<String> {
    if let Some(pos) = header.find("filename*=") {
        let value = header[pos + "filename*=".len()..].trim();
        // charset'language'encoded_value
        if let Some(quote_pos) = value.find("''") {
            let encoded = &value[quote_pos + 2..];
            let end = encoded.find(';').unwrap_or(encoded.len());
            let encoded_name = encoded[..end].trim().trim_matches('"');
            if let Ok(decoded) = urlencoding::decode(encoded_name) {
                return Some(decoded.into_owned());
            }
        }
    }

    let pos = header.find("filename=")?;
    let value = header[pos + "filename=".len()..].trim();

    if let Some(stripped) = value.strip_prefix('"') {
        return stripped.find('"').map(|end| stripped[..end].to_string());
    }

    let end = value.find(';').unwrap_or(value.len());
    let filename = value[..end].trim();
    (!filename.is_empty()).then(|| filename.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    #[test]
    fn test_parse_content_disposition_quoted() {
        let header = r#"attachment; filename="clip.mp4""#;
        assert_eq!(parse_content_disposition(header), Some("clip.mp4".to_string()));
    }

    #[test]
    fn test_parse_content_disposition_unquoted_with_trailing_params() {
        let header = "attachment; filename=photo.png; size=1234";
        assert_eq!(parse_content_disposition(header), Some("photo.png".to_string()));
    }

    #[test]
    fn test_parse_content_disposition_rfc5987_preferred() {
        let header = "attachment; filename=\"fallback.bin\"; filename*=UTF-8''my%20clip.webm";
        assert_eq!(
            parse_content_disposition(header),
            Some("my clip.webm".to_string())
        );
    }

    #[test]
    fn test_parse_content_disposition_missing() {
        assert_eq!(parse_content_disposition("inline"), None);
    }

    #[test]
    fn test_extension_of_rejects_odd_suffixes() {
        assert_eq!(extension_of("a.PNG"), Some(".png".to_string()));
        assert_eq!(extension_of("archive.tar.gz"), Some(".gz".to_string()));
        assert_eq!(extension_of("noext"), None);
        assert_eq!(extension_of("trailing."), None);
        assert_eq!(extension_of("x.thisiswaytoolong"), None);
        assert_eq!(extension_of("x.we ird"), None);
        assert_eq!(extension_of("../../etc/passwd"), None);
        assert_eq!(extension_of("dir.d/file"), None);
    }

    #[test]
    fn test_extension_from_content_type_known_and_generic() {
        assert_eq!(extension_from_content_type("image/jpeg"), Some(".jpg"));
        assert_eq!(
            extension_from_content_type("video/mp4; codecs=avc1"),
            Some(".mp4")
        );
        assert_eq!(extension_from_content_type("IMAGE/PNG"), Some(".png"));
        assert_eq!(extension_from_content_type("image/x-icon"), None);
        assert_eq!(extension_from_content_type("video/x-unknown"), None);
        assert_eq!(extension_from_content_type("application/octet-stream"), None);
        assert_eq!(extension_from_content_type("text/html"), None);
    }

    #[test]
    fn test_extension_from_file_name_param() {
        let u = url("https://cdn.example.com/get?id=7&fileName=sunset.webp");
        assert_eq!(extension_from_file_name_param(&u), Some(".webp".to_string()));

        let u = url("https://cdn.example.com/get?filename=sunset.webp");
        assert_eq!(extension_from_file_name_param(&u), None);
    }

    #[test]
    fn test_extension_from_url_path() {
        assert_eq!(
            extension_from_url_path(&url("https://x.test/media/y.MP4")),
            Some(".mp4".to_string())
        );
        assert_eq!(extension_from_url_path(&url("https://x.test/media/")), None);
        assert_eq!(extension_from_url_path(&url("https://x.test/random")), None);
    }

    #[test]
    fn test_keyword_fallback() {
        assert_eq!(keyword_fallback("https://api.test/video/random", None), ".mp4");
        assert_eq!(keyword_fallback("https://api.test/rand?type=MP4", None), ".mp4");
        assert_eq!(keyword_fallback("https://api.test/random", None), ".jpg");
        let redirected = url("https://cdn.test/videos/abc");
        assert_eq!(
            keyword_fallback("https://api.test/random", Some(&redirected)),
            ".mp4"
        );
    }

    #[test]
    fn test_hint_content_disposition_beats_content_type() {
        let final_url = url("https://cdn.test/file.gif?fileName=a.webp");
        let hint = ExtensionHint {
            content_disposition: Some(r#"attachment; filename="a.png""#),
            content_type: Some("video/mp4"),
            final_url: Some(&final_url),
            requested_url: "https://cdn.test/video",
        };
        assert_eq!(hint.resolve(), ".png");
    }

    #[test]
    fn test_hint_file_name_param_beats_content_type() {
        let final_url = url("https://cdn.test/download?fileName=a.webm");
        let hint = ExtensionHint {
            content_disposition: None,
            content_type: Some("image/jpeg"),
            final_url: Some(&final_url),
            requested_url: "https://cdn.test/download?fileName=a.webm",
        };
        assert_eq!(hint.resolve(), ".webm");
    }

    #[test]
    fn test_hint_content_type_beats_url_path() {
        let final_url = url("https://cdn.test/file.gif");
        let hint = ExtensionHint {
            content_disposition: None,
            content_type: Some("image/png"),
            final_url: Some(&final_url),
            requested_url: "https://cdn.test/file.gif",
        };
        assert_eq!(hint.resolve(), ".png");
    }

    #[test]
    fn test_hint_url_path_when_content_type_is_opaque() {
        let final_url = url("https://cdn.test/file.gif");
        let hint = ExtensionHint {
            content_disposition: None,
            content_type: Some("application/octet-stream"),
            final_url: Some(&final_url),
            requested_url: "https://api.test/random",
        };
        assert_eq!(hint.resolve(), ".gif");
    }

    #[test]
    fn test_hint_content_disposition_without_extension_falls_through() {
        let hint = ExtensionHint {
            content_disposition: Some(r#"attachment; filename="download""#),
            content_type: Some("video/webm"),
            final_url: None,
            requested_url: "https://api.test/random",
        };
        assert_eq!(hint.resolve(), ".webm");
    }

    fn bare_hint(requested_url: &str) -> ExtensionHint<'_> {
        ExtensionHint {
            content_disposition: None,
            content_type: None,
            final_url: None,
            requested_url,
        }
    }

    #[test]
    fn test_hint_keyword_fallback() {
        assert_eq!(bare_hint("https://api.test/xjj/video").resolve(), ".mp4");
        assert_eq!(bare_hint("https://api.test/xjj/pic").resolve(), ".jpg");
    }

    #[test]
    fn test_hint_unmapped_image_type_defers_to_url_path() {
        let final_url = url("https://cdn.test/a.ico");
        let hint = ExtensionHint {
            content_disposition: None,
            content_type: Some("image/x-icon"),
            final_url: Some(&final_url),
            requested_url: "https://cdn.test/a.ico",
        };
        assert_eq!(hint.resolve(), ".ico");
    }

    #[test]
    fn test_hint_unmapped_video_type_defers_to_keyword() {
        let hint = ExtensionHint {
            content_type: Some("video/x-unknown"),
            ..bare_hint("https://api.test/video/random")
        };
        assert_eq!(hint.resolve(), ".mp4");
    }
}
