//! Pack manifest (stickers.yaml) parsing and validation.
//!
//! The manifest is user-edited YAML, so every field is optional at the
//! document level. Loading goes through a raw optional-field representation
//! and a dedicated validation step that produces the fully-resolved
//! [`Manifest`] or a descriptive error. Validation never touches the file;
//! the only additions are the in-memory absolute paths.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, StickerError};

/// Manifest filename inside a pack directory.
pub const MANIFEST_FILENAME: &str = "stickers.yaml";

/// Pack metadata.
#[derive(Debug, Clone)]
pub struct Meta {
    pub title: String,
    pub author: String,
    /// Cover filename relative to the pack directory, if configured.
    pub cover: Option<String>,
    /// Absolute path of the cover file. Resolution artifact, not serialized.
    pub cover_path: Option<PathBuf>,
}

/// One sticker entry.
#[derive(Debug, Clone)]
pub struct Sticker {
    /// Emoji associated with the sticker, possibly empty.
    pub chr: String,
    /// Filename relative to the pack directory.
    pub file: String,
    /// Absolute path of the image file. Resolution artifact, not serialized.
    pub path: PathBuf,
}

/// A validated, path-resolved pack manifest.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub meta: Meta,
    pub stickers: Vec<Sticker>,
}

/// Raw document shapes: everything optional, unknown keys ignored.
#[derive(Debug, Default, Deserialize)]
struct RawManifest {
    meta: Option<RawMeta>,
    stickers: Option<Vec<RawSticker>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMeta {
    title: Option<String>,
    author: Option<String>,
    cover: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSticker {
    chr: Option<String>,
    file: Option<String>,
}

/// Path of the manifest file inside a pack directory.
pub fn manifest_path(dir: &Path) -> PathBuf {
    dir.join(MANIFEST_FILENAME)
}

impl Manifest {
    /// Load and validate the manifest from a pack directory.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = manifest_path(dir);
        if !path.exists() {
            return Err(StickerError::Manifest {
                message: format!("no {} in {}", MANIFEST_FILENAME, dir.display()),
                help: Some("Run `sticker-tool init` to create one".to_string()),
            });
        }

        let content = std::fs::read_to_string(&path).map_err(|e| StickerError::Io {
            path: path.clone(),
            message: format!("Failed to read manifest: {}", e),
        })?;

        Self::parse(&content, dir)
    }

    /// Parse and validate manifest content against a pack directory.
    ///
    /// Relative `file` and `meta.cover` entries are resolved against `dir`
    /// and must exist on disk.
    pub fn parse(content: &str, dir: &Path) -> Result<Self> {
        let raw: RawManifest = serde_yaml::from_str(content).map_err(|e| StickerError::Manifest {
            message: format!("invalid manifest document: {}", e),
            help: Some(format!("Check {} syntax", MANIFEST_FILENAME)),
        })?;

        let base = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());

        let meta = raw.meta.ok_or_else(|| StickerError::Manifest {
            message: "'meta' section is missing".to_string(),
            help: meta_help(),
        })?;

        let title = required_field(meta.title, "meta.title")?;
        let author = required_field(meta.author, "meta.author")?;

        let (cover, cover_path) = match meta.cover {
            Some(cover) if !cover.trim().is_empty() => {
                let path = resolve_file(&base, &cover)?;
                (Some(cover), Some(path))
            }
            _ => (None, None),
        };

        let raw_stickers = raw.stickers.ok_or_else(|| StickerError::Manifest {
            message: "'stickers' section is missing".to_string(),
            help: meta_help(),
        })?;
        if raw_stickers.is_empty() {
            return Err(StickerError::Manifest {
                message: "'stickers' must be a non-empty list".to_string(),
                help: Some("Add at least one sticker entry with a 'file' key".to_string()),
            });
        }

        let mut stickers = Vec::with_capacity(raw_stickers.len());
        for (index, raw) in raw_stickers.into_iter().enumerate() {
            let file = match raw.file {
                Some(file) if !file.trim().is_empty() => file,
                _ => {
                    return Err(StickerError::Manifest {
                        message: format!("sticker entry {} is missing 'file'", index),
                        help: Some("Every sticker entry needs a 'file' key".to_string()),
                    })
                }
            };
            let path = resolve_file(&base, &file)?;
            stickers.push(Sticker {
                chr: raw.chr.unwrap_or_default(),
                file,
                path,
            });
        }

        Ok(Self {
            meta: Meta {
                title,
                author,
                cover,
                cover_path,
            },
            stickers,
        })
    }
}

/// Validate a required string field: present and non-empty after trim.
fn required_field(value: Option<String>, name: &str) -> Result<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(StickerError::Manifest {
            message: format!("'{}' is missing or empty", name),
            help: meta_help(),
        }),
    }
}

fn meta_help() -> Option<String> {
    Some("The manifest needs meta.title, meta.author and a stickers list".to_string())
}

/// Resolve a manifest-relative filename and require it to exist.
fn resolve_file(base: &Path, file: &str) -> Result<PathBuf> {
    let path = if Path::new(file).is_absolute() {
        PathBuf::from(file)
    } else {
        base.join(file)
    };

    if !path.exists() {
        return Err(StickerError::Manifest {
            message: format!("sticker file not found: {}", path.display()),
            help: Some(format!(
                "'{}' is referenced by {} but does not exist",
                file, MANIFEST_FILENAME
            )),
        });
    }

    Ok(path)
}
