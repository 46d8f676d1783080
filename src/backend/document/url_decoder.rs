//! Share token extraction from editor callback URLs.
//!
//! The editing server hands us back the URL it would download the source
//! document from. That URL already carries the share token in its `doc`
//! query parameter, so the token is read straight out of it instead of
//! making another request to fetch the file.

use percent_encoding::percent_decode_str;

/// Query parameter holding the share token
pub const TOKEN_PARAM: &str = "doc";

/// Extract the share token from a raw (still path-encoded) callback URL.
///
/// The URL is percent-decoded once as a path segment, then its query string
/// is parsed as `application/x-www-form-urlencoded`. Returns `None` when the
/// URL is not valid UTF-8 after decoding, has no query, or has no non-empty
/// `doc` parameter.
pub fn extract_share_token(raw_url: &str) -> Option<String> {
    let decoded = percent_decode_str(raw_url).decode_utf8().ok()?;

    let without_fragment = decoded.split('#').next().unwrap_or_default();
    let (_, query) = without_fragment.split_once('?')?;

    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == TOKEN_PARAM)
        .map(|(_, value)| value.trim().to_string())
        .filter(|token| !token.is_empty())
}
