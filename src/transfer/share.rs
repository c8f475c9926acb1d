//! Sharing URL formatting and parsing.
//!
//! A pack is shared as `https://signal.art/addstickers/#pack_id=..&pack_key=..`
//! with a matching `sgnl://` deep link for the app. Parsing accepts only
//! that fixed host/path/fragment shape; anything else is rejected rather
//! than guessed at.

use crate::error::{Result, StickerError};

use super::transport::PackRef;

const SHARE_HOST: &str = "signal.art";
const SHARE_PATH: &str = "/addstickers";

/// Minimum accepted length for a pack key passed on the command line.
pub const MIN_KEY_LENGTH: usize = 16;

/// Web sharing URL for a pack.
pub fn web_url(pack: &PackRef) -> String {
    format!(
        "https://{}{}/#pack_id={}&pack_key={}",
        SHARE_HOST, SHARE_PATH, pack.id, pack.key
    )
}

/// App deep link for a pack.
pub fn deep_link(pack: &PackRef) -> String {
    format!(
        "sgnl://addstickers/?pack_id={}&pack_key={}",
        pack.id, pack.key
    )
}

/// Resolve a pack reference from a sharing URL or a bare id plus key.
pub fn resolve(arg: &str, key: Option<&str>) -> Result<PackRef> {
    if arg.contains("://") {
        return parse_share_url(arg);
    }

    let key = key.ok_or_else(|| StickerError::Input {
        message: "a bare pack id needs a pack key".to_string(),
        help: Some("Pass the key as a second argument, or a full sharing URL".to_string()),
    })?;

    if key.len() < MIN_KEY_LENGTH {
        return Err(StickerError::Input {
            message: format!(
                "pack key too short: {} characters, expected at least {}",
                key.len(),
                MIN_KEY_LENGTH
            ),
            help: None,
        });
    }

    Ok(PackRef {
        id: arg.to_string(),
        key: key.to_string(),
    })
}

/// Parse a web sharing URL into a pack reference.
pub fn parse_share_url(url: &str) -> Result<PackRef> {
    let rest = url
        .strip_prefix("https://")
        .ok_or_else(|| malformed(url, "expected an https:// URL"))?;

    let (host, rest) = rest.split_once('/').unwrap_or((rest, ""));
    if host != SHARE_HOST {
        return Err(malformed(url, "host is not signal.art"));
    }

    let (path, fragment) = match rest.split_once('#') {
        Some((path, fragment)) => (path, fragment),
        None => return Err(malformed(url, "missing #pack_id=..&pack_key=.. fragment")),
    };

    let path = format!("/{}", path.trim_end_matches('/'));
    if path != SHARE_PATH {
        return Err(malformed(url, "path is not /addstickers/"));
    }

    let mut id = None;
    let mut key = None;
    for pair in fragment.split('&') {
        match pair.split_once('=') {
            Some(("pack_id", value)) if !value.is_empty() => id = Some(value),
            Some(("pack_key", value)) if !value.is_empty() => key = Some(value),
            _ => {}
        }
    }

    match (id, key) {
        (Some(id), Some(key)) => Ok(PackRef {
            id: id.to_string(),
            key: key.to_string(),
        }),
        _ => Err(malformed(url, "fragment must carry pack_id and pack_key")),
    }
}

fn malformed(url: &str, reason: &str) -> StickerError {
    StickerError::Input {
        message: format!("unrecognized sharing URL {}: {}", url, reason),
        help: Some(
            "Expected https://signal.art/addstickers/#pack_id=<id>&pack_key=<key>".to_string(),
        ),
    }
}
