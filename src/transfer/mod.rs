//! Pack transfer orchestration.
//!
//! Everything around the network call: the result-file sentinel that stops
//! duplicate publication, packing local files into the transport shape,
//! and unpacking a downloaded pack into a fresh project directory.

pub mod share;
pub mod sniff;
pub mod transport;

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use crate::credentials::{self, Credentials};
use crate::error::{Result, StickerError};
use crate::pack::{manifest_path, Manifest};
use crate::preview;

pub use share::{deep_link, parse_share_url, resolve, web_url, MIN_KEY_LENGTH};
pub use sniff::{sniff_extension, UNKNOWN_EXTENSION};
pub use transport::{HttpTransport, Pack, PackRef, PackSticker, PackTransport};

/// Result filename inside a pack directory. Its presence marks the pack as
/// already uploaded.
pub const RESULT_FILENAME: &str = "uploaded.yaml";

/// Filename stem used for a downloaded cover image.
const COVER_DOWNLOAD_STEM: &str = "cover";

/// Path of the result file inside a pack directory.
pub fn result_path(dir: &Path) -> PathBuf {
    dir.join(RESULT_FILENAME)
}

/// Load the result file, if present.
pub fn load_result(dir: &Path) -> Result<Option<PackRef>> {
    let path = result_path(dir);
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(StickerError::Io {
                path,
                message: format!("Failed to read result file: {}", e),
            });
        }
    };

    let pack: PackRef = serde_yaml::from_str(&content).map_err(|e| StickerError::Manifest {
        message: format!("invalid result file {}: {}", path.display(), e),
        help: Some("Delete it to allow a fresh upload".to_string()),
    })?;
    Ok(Some(pack))
}

/// Write the result file. Exclusive creation: the file is written once and
/// never updated automatically.
pub fn store_result(dir: &Path, pack: &PackRef) -> Result<()> {
    let path = result_path(dir);
    let content = serde_yaml::to_string(pack).map_err(|e| StickerError::Manifest {
        message: format!("failed to serialize result file: {}", e),
        help: None,
    })?;

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                StickerError::Conflict {
                    path: path.clone(),
                    message: "result file already exists".to_string(),
                    help: None,
                }
            } else {
                StickerError::Io {
                    path: path.clone(),
                    message: format!("Failed to write result file: {}", e),
                }
            }
        })?;
    file.write_all(content.as_bytes())
        .map_err(StickerError::from)
}

/// What an upload run produced.
#[derive(Debug)]
pub struct UploadOutcome {
    pub pack: PackRef,
    /// True when a previous result file short-circuited the upload.
    pub already_uploaded: bool,
}

/// Upload the pack in `dir`.
///
/// An existing result file means the pack was already published: its
/// id/key are returned without any network call. Otherwise the manifest is
/// validated, credentials are loaded, and the transport does the rest.
pub fn upload(
    dir: &Path,
    credentials_path: &Path,
    transport: &dyn PackTransport,
) -> Result<UploadOutcome> {
    if let Some(pack) = load_result(dir)? {
        return Ok(UploadOutcome {
            pack,
            already_uploaded: true,
        });
    }

    let manifest = Manifest::load(dir)?;
    let creds = load_required_credentials(credentials_path)?;
    let pack = build_pack(&manifest)?;

    let uploaded = transport.upload(&pack, &creds)?;
    store_result(dir, &uploaded)?;

    Ok(UploadOutcome {
        pack: uploaded,
        already_uploaded: false,
    })
}

fn load_required_credentials(path: &Path) -> Result<Credentials> {
    credentials::load(path)?.ok_or_else(|| StickerError::Auth {
        message: "credentials file is incomplete".to_string(),
        help: Some("Run `sticker-tool login` again".to_string()),
    })
}

/// Shape a validated manifest into the transport pack: sequential sticker
/// ids from 0, raw bytes from each resolved path, and the cover (if any)
/// as one more sticker with the next id.
pub fn build_pack(manifest: &Manifest) -> Result<Pack> {
    let mut stickers = Vec::with_capacity(manifest.stickers.len());
    for (index, sticker) in manifest.stickers.iter().enumerate() {
        stickers.push(PackSticker {
            id: index as u32,
            emoji: sticker.chr.clone(),
            bytes: read_bytes(&sticker.path)?,
        });
    }

    let cover = match &manifest.meta.cover_path {
        Some(path) => Some(PackSticker {
            id: stickers.len() as u32,
            emoji: String::new(),
            bytes: read_bytes(path)?,
        }),
        None => None,
    };

    Ok(Pack {
        title: manifest.meta.title.clone(),
        author: manifest.meta.author.clone(),
        stickers,
        cover,
    })
}

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| StickerError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to read image: {}", e),
    })
}

/// What a download run produced.
#[derive(Debug)]
pub struct DownloadOutcome {
    pub pack: PackRef,
    pub stickers: usize,
    pub manifest_path: PathBuf,
    pub preview_path: PathBuf,
}

/// Download a pack into `dir`.
///
/// Refuses to touch a directory that already has a manifest. Writes every
/// image with exclusive creation and owner-only permissions, records the
/// pack's id/key in the manifest (`source`) for provenance, renders the
/// preview, and writes the result file so a fresh download cannot be
/// accidentally re-uploaded.
pub fn download(
    dir: &Path,
    pack: &PackRef,
    transport: &dyn PackTransport,
) -> Result<DownloadOutcome> {
    let manifest_file = manifest_path(dir);
    if manifest_file.exists() {
        return Err(StickerError::Conflict {
            path: manifest_file,
            message: "manifest already exists".to_string(),
            help: Some("Download into an empty directory".to_string()),
        });
    }

    std::fs::create_dir_all(dir).map_err(|e| StickerError::Io {
        path: dir.to_path_buf(),
        message: format!("Failed to create pack directory: {}", e),
    })?;

    let remote = transport.download(pack)?;
    if remote.stickers.is_empty() {
        return Err(StickerError::Transfer {
            message: format!("pack {} has no stickers", pack.id),
        });
    }

    // Pad filenames to the width of the largest sticker index.
    let width = (remote.stickers.len() - 1).to_string().len();

    let mut entries = Vec::with_capacity(remote.stickers.len());
    for (index, sticker) in remote.stickers.iter().enumerate() {
        let name = format!(
            "{:0width$}.{}",
            index,
            sniff_extension(&sticker.bytes),
            width = width
        );
        write_image(&dir.join(&name), &sticker.bytes)?;
        entries.push((name, sticker.emoji.clone()));
    }

    let cover_name = match &remote.cover {
        Some(cover) => {
            let name = format!("{}.{}", COVER_DOWNLOAD_STEM, sniff_extension(&cover.bytes));
            write_image(&dir.join(&name), &cover.bytes)?;
            Some(name)
        }
        None => None,
    };

    write_downloaded_manifest(
        &manifest_file,
        &remote.title,
        &remote.author,
        cover_name.as_deref(),
        &entries,
        pack,
    )?;

    let manifest = Manifest::load(dir)?;
    let preview_path = preview::write_preview(&manifest, dir)?;

    store_result(dir, pack)?;

    Ok(DownloadOutcome {
        pack: pack.clone(),
        stickers: entries.len(),
        manifest_path: manifest_file,
        preview_path,
    })
}

/// Write image bytes with exclusive creation and owner-only permissions.
/// An existing file of the same name is a hard error, never clobbered.
fn write_image(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::AlreadyExists {
            StickerError::Conflict {
                path: path.to_path_buf(),
                message: "refusing to overwrite existing file".to_string(),
                help: Some("Download into an empty directory".to_string()),
            }
        } else {
            StickerError::Io {
                path: path.to_path_buf(),
                message: format!("Failed to write image: {}", e),
            }
        }
    })?;
    file.write_all(bytes).map_err(StickerError::from)
}

fn write_downloaded_manifest(
    path: &Path,
    title: &str,
    author: &str,
    cover: Option<&str>,
    entries: &[(String, String)],
    pack: &PackRef,
) -> Result<()> {
    let mut meta = Mapping::new();
    meta.insert(Value::from("title"), Value::from(title));
    meta.insert(Value::from("author"), Value::from(author));
    if let Some(cover) = cover {
        meta.insert(Value::from("cover"), Value::from(cover));
    }

    let stickers: Vec<Value> = entries
        .iter()
        .map(|(file, chr)| {
            let mut entry = Mapping::new();
            entry.insert(Value::from("chr"), Value::from(chr.as_str()));
            entry.insert(Value::from("file"), Value::from(file.as_str()));
            Value::Mapping(entry)
        })
        .collect();

    // Provenance: where this pack came from. Preserved by later re-inits.
    let mut source = Mapping::new();
    source.insert(Value::from("id"), Value::from(pack.id.as_str()));
    source.insert(Value::from("key"), Value::from(pack.key.as_str()));

    let mut doc = Mapping::new();
    doc.insert(Value::from("meta"), Value::Mapping(meta));
    doc.insert(Value::from("stickers"), Value::Sequence(stickers));
    doc.insert(Value::from("source"), Value::Mapping(source));

    let content = serde_yaml::to_string(&doc).map_err(|e| StickerError::Manifest {
        message: format!("failed to serialize manifest: {}", e),
        help: None,
    })?;

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| StickerError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to write manifest: {}", e),
        })?;
    file.write_all(content.as_bytes())
        .map_err(StickerError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack::MANIFEST_FILENAME;
    use crate::preview::PREVIEW_FILENAME;
    use std::cell::{Cell, RefCell};
    use std::fs;
    use tempfile::tempdir;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\nxxxx";
    const WEBP: &[u8] = b"RIFF\x10\x00\x00\x00WEBP";

    /// In-memory transport standing in for the external client.
    struct MockTransport {
        serves: Option<Pack>,
        uploads: RefCell<Vec<Pack>>,
        calls: Cell<usize>,
    }

    impl MockTransport {
        fn new(serves: Option<Pack>) -> Self {
            Self {
                serves,
                uploads: RefCell::new(Vec::new()),
                calls: Cell::new(0),
            }
        }
    }

    impl PackTransport for MockTransport {
        fn upload(&self, pack: &Pack, _credentials: &Credentials) -> Result<PackRef> {
            self.calls.set(self.calls.get() + 1);
            self.uploads.borrow_mut().push(pack.clone());
            Ok(PackRef {
                id: "uploaded-id".to_string(),
                key: "uploaded-key".to_string(),
            })
        }

        fn download(&self, _pack: &PackRef) -> Result<Pack> {
            self.calls.set(self.calls.get() + 1);
            self.serves.clone().ok_or(StickerError::Transfer {
                message: "pack not found".to_string(),
            })
        }
    }

    fn sample_remote_pack() -> Pack {
        Pack {
            title: "Remote".to_string(),
            author: "Author".to_string(),
            stickers: vec![
                PackSticker {
                    id: 0,
                    emoji: "😀".to_string(),
                    bytes: WEBP.to_vec(),
                },
                PackSticker {
                    id: 1,
                    emoji: String::new(),
                    bytes: PNG.to_vec(),
                },
            ],
            cover: Some(PackSticker {
                id: 2,
                emoji: String::new(),
                bytes: PNG.to_vec(),
            }),
        }
    }

    fn prepare_upload_dir() -> (tempfile::TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let pack_dir = dir.path().join("pack");
        fs::create_dir(&pack_dir).unwrap();
        fs::write(pack_dir.join("a.png"), PNG).unwrap();
        fs::write(pack_dir.join("b.webp"), WEBP).unwrap();
        fs::write(pack_dir.join("cover.png"), PNG).unwrap();
        fs::write(
            pack_dir.join(MANIFEST_FILENAME),
            "meta:\n  title: T\n  author: A\n  cover: cover.png\nstickers:\n- chr: \"😀\"\n  file: a.png\n- chr: ''\n  file: b.webp\n",
        )
        .unwrap();

        let creds_path = dir.path().join("credentials.yaml");
        credentials::save(&creds_path, "alice", "hunter2").unwrap();

        (dir, pack_dir)
    }

    #[test]
    fn test_upload_builds_sequential_pack() {
        let (dir, pack_dir) = prepare_upload_dir();
        let creds_path = dir.path().join("credentials.yaml");
        let transport = MockTransport::new(None);

        let outcome = upload(&pack_dir, &creds_path, &transport).unwrap();

        assert!(!outcome.already_uploaded);
        assert_eq!(outcome.pack.id, "uploaded-id");

        let uploads = transport.uploads.borrow();
        let sent = &uploads[0];
        assert_eq!(sent.title, "T");
        assert_eq!(sent.stickers.len(), 2);
        assert_eq!(sent.stickers[0].id, 0);
        assert_eq!(sent.stickers[0].emoji, "😀");
        assert_eq!(sent.stickers[1].id, 1);
        assert_eq!(sent.cover.as_ref().unwrap().id, 2);

        // Result file written with the returned pair
        let result = load_result(&pack_dir).unwrap().unwrap();
        assert_eq!(result.id, "uploaded-id");
        assert_eq!(result.key, "uploaded-key");
    }

    #[test]
    fn test_upload_short_circuits_on_result_file() {
        let (dir, pack_dir) = prepare_upload_dir();
        let creds_path = dir.path().join("credentials.yaml");
        store_result(
            &pack_dir,
            &PackRef {
                id: "old-id".to_string(),
                key: "old-key".to_string(),
            },
        )
        .unwrap();

        let transport = MockTransport::new(None);
        let outcome = upload(&pack_dir, &creds_path, &transport).unwrap();

        assert!(outcome.already_uploaded);
        assert_eq!(outcome.pack.id, "old-id");
        // No network call happened
        assert_eq!(transport.calls.get(), 0);
    }

    #[test]
    fn test_upload_requires_credentials() {
        let (dir, pack_dir) = prepare_upload_dir();
        let missing = dir.path().join("nope.yaml");

        let transport = MockTransport::new(None);
        let err = upload(&pack_dir, &missing, &transport).unwrap_err();

        assert!(err.to_string().contains("not logged in"));
        assert_eq!(transport.calls.get(), 0);
    }

    #[test]
    fn test_download_writes_pack_directory() {
        let dir = tempdir().unwrap();
        let pack_dir = dir.path().join("downloaded");
        let pack = PackRef {
            id: "abc".to_string(),
            key: "0123456789abcdef".to_string(),
        };

        let transport = MockTransport::new(Some(sample_remote_pack()));
        let outcome = download(&pack_dir, &pack, &transport).unwrap();

        assert_eq!(outcome.stickers, 2);
        assert!(pack_dir.join("0.webp").exists());
        assert!(pack_dir.join("1.png").exists());
        assert!(pack_dir.join("cover.png").exists());
        assert!(pack_dir.join(PREVIEW_FILENAME).exists());

        let manifest = Manifest::load(&pack_dir).unwrap();
        assert_eq!(manifest.meta.title, "Remote");
        assert_eq!(manifest.meta.cover.as_deref(), Some("cover.png"));
        assert_eq!(manifest.stickers[0].chr, "😀");

        // Provenance and re-upload sentinel
        let raw = fs::read_to_string(pack_dir.join(MANIFEST_FILENAME)).unwrap();
        assert!(raw.contains("source:"));
        assert!(raw.contains("id: abc"));
        let result = load_result(&pack_dir).unwrap().unwrap();
        assert_eq!(result, pack);
    }

    #[test]
    fn test_download_pads_filenames() {
        let dir = tempdir().unwrap();
        let pack_dir = dir.path().join("big");

        let stickers = (0..11)
            .map(|i| PackSticker {
                id: i,
                emoji: String::new(),
                bytes: PNG.to_vec(),
            })
            .collect();
        let remote = Pack {
            title: "Big".to_string(),
            author: "A".to_string(),
            stickers,
            cover: None,
        };

        let transport = MockTransport::new(Some(remote));
        let pack = PackRef {
            id: "abc".to_string(),
            key: "0123456789abcdef".to_string(),
        };
        download(&pack_dir, &pack, &transport).unwrap();

        assert!(pack_dir.join("00.png").exists());
        assert!(pack_dir.join("10.png").exists());
        assert!(!pack_dir.join("0.png").exists());
    }

    #[test]
    fn test_download_refuses_existing_manifest() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(MANIFEST_FILENAME), "meta: {}\n").unwrap();

        let transport = MockTransport::new(Some(sample_remote_pack()));
        let pack = PackRef {
            id: "abc".to_string(),
            key: "0123456789abcdef".to_string(),
        };
        let err = download(dir.path(), &pack, &transport).unwrap_err();

        assert!(err.to_string().contains("already exists"));
        // Destination untouched: no network call, nothing written
        assert_eq!(transport.calls.get(), 0);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_download_refuses_overwriting_image() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("0.webp"), "precious").unwrap();

        let transport = MockTransport::new(Some(sample_remote_pack()));
        let pack = PackRef {
            id: "abc".to_string(),
            key: "0123456789abcdef".to_string(),
        };
        let err = download(dir.path(), &pack, &transport).unwrap_err();

        assert!(err.to_string().contains("refusing to overwrite"));
        assert_eq!(fs::read_to_string(dir.path().join("0.webp")).unwrap(), "precious");
    }

    #[test]
    fn test_result_file_roundtrip() {
        let dir = tempdir().unwrap();
        assert!(load_result(dir.path()).unwrap().is_none());

        let pack = PackRef {
            id: "abc".to_string(),
            key: "def".to_string(),
        };
        store_result(dir.path(), &pack).unwrap();
        assert_eq!(load_result(dir.path()).unwrap().unwrap(), pack);

        // Written once, never overwritten
        let err = store_result(dir.path(), &pack).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }
}
