//! File system scanner for discovering sticker images.
//!
//! Lists a pack directory, keeps recognized image files, and splits off the
//! cover image. The result order is sorted by filename: emoji assignments
//! read from an input source are matched to files positionally, so the
//! ordering here is load-bearing.

use std::io::BufRead;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::{Result, StickerError};

/// File extensions (lowercased) recognized as sticker images.
pub const IMAGE_EXTENSIONS: &[&str] = &["gif", "jpeg", "jpg", "png", "webp"];

/// Filename stem that marks a file as the pack cover.
pub const COVER_STEM: &str = "cover";

/// One scanned image file with its optional emoji assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    /// Filename relative to the pack directory.
    pub file: String,
    /// Emoji read from the input source, if any.
    pub emoji: Option<String>,
}

/// Result of scanning a pack directory.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Sticker files in filename order, cover excluded.
    pub stickers: Vec<ScanEntry>,
    /// Cover filename, if a file matched the cover stem.
    pub cover: Option<String>,
}

impl ScanResult {
    pub fn is_empty(&self) -> bool {
        self.stickers.is_empty()
    }
}

/// Check whether a filename has a recognized image extension
/// (case-insensitive).
pub fn is_image_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Scan a pack directory for sticker images.
///
/// Non-recursive: only direct children of `dir` are considered. Files whose
/// stem equals `cover_stem` are set aside as the cover (first match wins)
/// and excluded from the sticker list.
///
/// When `emoji_source` is given, one emoji is read per non-blank line and
/// assigned to the sticker files in order; a line count that differs from
/// the file count is an error, reported before anything is written anywhere.
pub fn scan_directory(
    dir: &Path,
    cover_stem: &str,
    emoji_source: Option<&mut dyn BufRead>,
) -> Result<ScanResult> {
    let mut files: Vec<String> = Vec::new();

    for entry in WalkDir::new(dir)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if entry.path().is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if is_image_file(name) {
                files.push(name.to_string());
            }
        }
    }

    // Split off the cover; later files with the same stem stay stickers.
    let mut cover: Option<String> = None;
    let mut sticker_files: Vec<String> = Vec::new();
    for name in files {
        let stem = Path::new(&name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        if stem == cover_stem && cover.is_none() {
            cover = Some(name);
        } else {
            sticker_files.push(name);
        }
    }

    let emojis = match emoji_source {
        Some(source) => Some(read_emoji_lines(source, sticker_files.len())?),
        None => None,
    };

    let stickers = sticker_files
        .into_iter()
        .enumerate()
        .map(|(i, file)| ScanEntry {
            file,
            emoji: emojis.as_ref().map(|e| e[i].clone()),
        })
        .collect();

    Ok(ScanResult { stickers, cover })
}

/// Read one emoji per non-blank line, requiring exactly `expected` of them.
fn read_emoji_lines(source: &mut dyn BufRead, expected: usize) -> Result<Vec<String>> {
    let mut emojis = Vec::new();
    for line in source.lines() {
        let line = line?;
        let token = line.trim();
        if !token.is_empty() {
            emojis.push(token.to_string());
        }
    }

    if emojis.len() != expected {
        return Err(StickerError::Input {
            message: format!(
                "emoji count mismatch: read {} emojis for {} image files",
                emojis.len(),
                expected
            ),
            help: Some("Provide exactly one emoji per sticker image, one per line".to_string()),
        });
    }

    Ok(emojis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::tempdir;

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file("a.png"));
        assert!(is_image_file("a.webp"));
        assert!(is_image_file("a.GIF"));
        assert!(is_image_file("a.JpG"));
        assert!(!is_image_file("a.txt"));
        assert!(!is_image_file("stickers.yaml"));
        assert!(!is_image_file("noext"));
    }

    #[test]
    fn test_scan_sorted_no_emojis() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.png"), "x").unwrap();
        fs::write(dir.path().join("a.png"), "x").unwrap();
        fs::write(dir.path().join("c.webp"), "x").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let result = scan_directory(dir.path(), COVER_STEM, None).unwrap();

        let files: Vec<&str> = result.stickers.iter().map(|s| s.file.as_str()).collect();
        assert_eq!(files, vec!["a.png", "b.png", "c.webp"]);
        assert!(result.stickers.iter().all(|s| s.emoji.is_none()));
        assert!(result.cover.is_none());
    }

    #[test]
    fn test_scan_extracts_cover() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.png"), "x").unwrap();
        fs::write(dir.path().join("b.png"), "x").unwrap();
        fs::write(dir.path().join("cover.png"), "x").unwrap();

        let result = scan_directory(dir.path(), COVER_STEM, None).unwrap();

        assert_eq!(result.cover.as_deref(), Some("cover.png"));
        let files: Vec<&str> = result.stickers.iter().map(|s| s.file.as_str()).collect();
        assert_eq!(files, vec!["a.png", "b.png"]);
    }

    #[test]
    fn test_scan_duplicate_cover_first_wins() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("cover.png"), "x").unwrap();
        fs::write(dir.path().join("cover.webp"), "x").unwrap();

        let result = scan_directory(dir.path(), COVER_STEM, None).unwrap();

        // Sorted order puts cover.png first; cover.webp stays a sticker.
        assert_eq!(result.cover.as_deref(), Some("cover.png"));
        assert_eq!(result.stickers.len(), 1);
        assert_eq!(result.stickers[0].file, "cover.webp");
    }

    #[test]
    fn test_scan_reads_emojis_positionally() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.png"), "x").unwrap();
        fs::write(dir.path().join("b.png"), "x").unwrap();

        let mut input = Cursor::new("😀\n\n😎\n");
        let result = scan_directory(dir.path(), COVER_STEM, Some(&mut input)).unwrap();

        assert_eq!(result.stickers[0].emoji.as_deref(), Some("😀"));
        assert_eq!(result.stickers[1].emoji.as_deref(), Some("😎"));
    }

    #[test]
    fn test_scan_emoji_count_mismatch() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.png"), "x").unwrap();
        fs::write(dir.path().join("b.png"), "x").unwrap();

        let mut input = Cursor::new("😀\n");
        let err = scan_directory(dir.path(), COVER_STEM, Some(&mut input)).unwrap_err();

        assert!(err.to_string().contains("count mismatch"));
    }

    #[test]
    fn test_scan_empty_directory() {
        let dir = tempdir().unwrap();
        let result = scan_directory(dir.path(), COVER_STEM, None).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_scan_ignores_subdirectories() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/deep.png"), "x").unwrap();
        fs::write(dir.path().join("top.png"), "x").unwrap();

        let result = scan_directory(dir.path(), COVER_STEM, None).unwrap();

        assert_eq!(result.stickers.len(), 1);
        assert_eq!(result.stickers[0].file, "top.png");
    }
}
