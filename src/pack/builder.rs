//! Manifest builder: merges directory scan results with any existing
//! manifest.
//!
//! The existing document is loaded as a raw YAML mapping and mutated in
//! place, so top-level keys this tool does not know about survive a
//! rebuild, and rerunning with `update` and an unchanged directory writes
//! byte-identical output.

use std::fs::OpenOptions;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use crate::error::{Result, StickerError};

use super::manifest::{manifest_path, MANIFEST_FILENAME};
use super::scanner::{scan_directory, COVER_STEM};

/// Placeholder used when no title is given and none was recorded.
pub const TITLE_PLACEHOLDER: &str = "fill-title-here";
/// Placeholder used when no author is given and none was recorded.
pub const AUTHOR_PLACEHOLDER: &str = "fill-author-name-here";

/// What the builder produced.
#[derive(Debug)]
pub struct BuildOutcome {
    /// Path of the written manifest.
    pub path: PathBuf,
    /// Number of sticker entries written.
    pub stickers: usize,
    /// Cover recorded in the manifest, if any.
    pub cover: Option<String>,
    /// False when an existing manifest was updated.
    pub created: bool,
}

/// Build or update the manifest for a pack directory.
///
/// Scanning (including the emoji count check) happens before any write, so
/// a failed run leaves the directory untouched. Field resolution order:
/// explicit argument, then the existing manifest's value, then a
/// placeholder (title/author) or empty string (emoji).
pub fn build_manifest(
    dir: &Path,
    title: Option<&str>,
    author: Option<&str>,
    emoji_source: Option<&mut dyn BufRead>,
    update: bool,
) -> Result<BuildOutcome> {
    let path = manifest_path(dir);
    let exists = path.exists();

    if exists && !update {
        return Err(StickerError::Conflict {
            path: path.clone(),
            message: "manifest already exists".to_string(),
            help: Some("Pass -u/--update to rewrite it".to_string()),
        });
    }

    let mut doc = if exists {
        load_document(&path)?
    } else {
        Mapping::new()
    };

    let scan = scan_directory(dir, COVER_STEM, emoji_source)?;
    if scan.stickers.is_empty() {
        return Err(StickerError::Input {
            message: format!("no image files found in {}", dir.display()),
            help: Some("Add png/webp/gif/jpg images to the directory first".to_string()),
        });
    }

    let prev = PreviousValues::from_document(&doc);

    let title = title
        .map(str::to_string)
        .or(prev.title.clone())
        .unwrap_or_else(|| TITLE_PLACEHOLDER.to_string());
    let author = author
        .map(str::to_string)
        .or(prev.author.clone())
        .unwrap_or_else(|| AUTHOR_PLACEHOLDER.to_string());
    let cover = scan.cover.clone().or(prev.cover.clone());

    // meta: update keys in place so an existing mapping keeps its order
    // and its unrecognized keys.
    let meta_key = Value::from("meta");
    if !matches!(doc.get(&meta_key), Some(Value::Mapping(_))) {
        doc.insert(meta_key.clone(), Value::Mapping(Mapping::new()));
    }
    if let Some(Value::Mapping(meta)) = doc.get_mut(&meta_key) {
        meta.insert(Value::from("title"), Value::from(title));
        meta.insert(Value::from("author"), Value::from(author));
        match &cover {
            Some(cover) => {
                meta.insert(Value::from("cover"), Value::from(cover.as_str()));
            }
            None => {
                meta.remove(&Value::from("cover"));
            }
        }
    }

    let mut stickers = Vec::with_capacity(scan.stickers.len());
    for entry in &scan.stickers {
        let chr = entry
            .emoji
            .clone()
            .or_else(|| prev.emojis_by_file(&entry.file))
            .unwrap_or_default();

        let mut sticker = Mapping::new();
        sticker.insert(Value::from("chr"), Value::from(chr));
        sticker.insert(Value::from("file"), Value::from(entry.file.as_str()));
        stickers.push(Value::Mapping(sticker));
    }
    doc.insert(Value::from("stickers"), Value::Sequence(stickers));

    let content = serde_yaml::to_string(&doc).map_err(|e| StickerError::Manifest {
        message: format!("failed to serialize manifest: {}", e),
        help: None,
    })?;

    write_manifest(&path, &content, exists)?;

    Ok(BuildOutcome {
        path,
        stickers: scan.stickers.len(),
        cover,
        created: !exists,
    })
}

/// Values carried over from a pre-existing manifest document.
#[derive(Debug, Default)]
struct PreviousValues {
    title: Option<String>,
    author: Option<String>,
    cover: Option<String>,
    emojis: Vec<(String, String)>,
}

impl PreviousValues {
    fn from_document(doc: &Mapping) -> Self {
        let mut prev = Self::default();

        if let Some(Value::Mapping(meta)) = doc.get(&Value::from("meta")) {
            prev.title = non_empty_str(meta.get(&Value::from("title")));
            prev.author = non_empty_str(meta.get(&Value::from("author")));
            prev.cover = non_empty_str(meta.get(&Value::from("cover")));
        }

        if let Some(Value::Sequence(entries)) = doc.get(&Value::from("stickers")) {
            for entry in entries {
                if let Value::Mapping(entry) = entry {
                    let file = non_empty_str(entry.get(&Value::from("file")));
                    let chr = entry
                        .get(&Value::from("chr"))
                        .and_then(Value::as_str)
                        .map(str::to_string);
                    if let (Some(file), Some(chr)) = (file, chr) {
                        prev.emojis.push((file, chr));
                    }
                }
            }
        }

        prev
    }

    fn emojis_by_file(&self, file: &str) -> Option<String> {
        self.emojis
            .iter()
            .find(|(f, _)| f == file)
            .map(|(_, chr)| chr.clone())
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn load_document(path: &Path) -> Result<Mapping> {
    let content = std::fs::read_to_string(path).map_err(|e| StickerError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to read manifest: {}", e),
    })?;

    match serde_yaml::from_str::<Value>(&content) {
        Ok(Value::Mapping(doc)) => Ok(doc),
        Ok(Value::Null) => Ok(Mapping::new()),
        Ok(_) => Err(StickerError::Manifest {
            message: format!("{} is not a YAML mapping", MANIFEST_FILENAME),
            help: Some("Delete the file or fix it by hand, then rerun".to_string()),
        }),
        Err(e) => Err(StickerError::Manifest {
            message: format!("cannot update invalid manifest: {}", e),
            help: Some("Fix the YAML by hand, then rerun".to_string()),
        }),
    }
}

/// Write the manifest, with exclusive creation on the fresh-create path.
fn write_manifest(path: &Path, content: &str, overwrite: bool) -> Result<()> {
    if overwrite {
        std::fs::write(path, content).map_err(|e| StickerError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to write manifest: {}", e),
        })?;
        return Ok(());
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                StickerError::Conflict {
                    path: path.to_path_buf(),
                    message: "manifest already exists".to_string(),
                    help: Some("Pass -u/--update to rewrite it".to_string()),
                }
            } else {
                StickerError::Io {
                    path: path.to_path_buf(),
                    message: format!("Failed to write manifest: {}", e),
                }
            }
        })?;

    file.write_all(content.as_bytes())
        .map_err(StickerError::from)
}
