//! Image format sniffing for downloaded sticker bytes.
//!
//! The remote service hands back raw bytes with no filename, so the
//! extension is recovered from a fixed table of magic-byte signatures.
//! Unrecognized data gets a generic `bin` extension instead of failing the
//! whole download.

/// Extension used when no signature matches.
pub const UNKNOWN_EXTENSION: &str = "bin";

/// Magic-byte prefixes and the extension they map to. RIFF is close
/// enough to WEBP here: the only RIFF payload the sticker service serves
/// is WebP.
const TABLE: &[(&[u8], &str)] = &[
    (b"GIF89a", "gif"),
    (b"\xff\xd8\xff", "jpg"),
    (b"JFIF", "jpg"),
    (b"\x89PNG\r\n\x1a\n", "png"),
    (b"RIFF", "webp"),
];

/// Sniff an image extension from leading bytes.
pub fn sniff_extension(bytes: &[u8]) -> &'static str {
    for (magic, ext) in TABLE {
        if bytes.starts_with(magic) {
            return ext;
        }
    }
    UNKNOWN_EXTENSION
}
