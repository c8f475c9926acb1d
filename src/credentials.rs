//! Credential file handling.
//!
//! Credentials live in a YAML file at a configurable path, default
//! `<config dir>/sticker-tool/credentials.yaml`. The file and its parent
//! directory are owner-only (0600 / 0700). Writes are delete-then-create
//! with exclusive creation, which is enough for a single interactive user;
//! concurrent writers are not supported.

use std::fs::{DirBuilder, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StickerError};

/// Filename used under the per-user config directory.
pub const CREDENTIALS_FILENAME: &str = "credentials.yaml";

/// A username/password pair for the sticker service.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

// The password must never end up in logs or error output.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Raw document shape: fields optional so a hand-edited file degrades to
/// "no credentials" instead of a parse panic.
#[derive(Debug, Default, Deserialize)]
struct RawCredentials {
    username: Option<String>,
    password: Option<String>,
}

/// Default credentials path under the per-user config directory.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sticker-tool")
        .join(CREDENTIALS_FILENAME)
}

/// Save credentials, replacing any previous file.
pub fn save(path: &Path, username: &str, password: &str) -> Result<()> {
    delete(path)?;

    if let Some(parent) = path.parent() {
        let mut builder = DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o700);
        }
        builder.create(parent).map_err(|e| StickerError::Io {
            path: parent.to_path_buf(),
            message: format!("Failed to create credentials directory: {}", e),
        })?;
    }

    let credentials = Credentials {
        username: username.to_string(),
        password: password.to_string(),
    };
    let content = serde_yaml::to_string(&credentials).map_err(|e| StickerError::Auth {
        message: format!("failed to serialize credentials: {}", e),
        help: None,
    })?;

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(|e| StickerError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to create credentials file: {}", e),
    })?;
    file.write_all(content.as_bytes())
        .map_err(StickerError::from)?;

    Ok(())
}

/// Load credentials.
///
/// An absent file is a hard "not logged in" error; a present file missing
/// either field returns `Ok(None)`.
pub fn load(path: &Path) -> Result<Option<Credentials>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StickerError::Auth {
                message: "not logged in".to_string(),
                help: Some("Run `sticker-tool login` first".to_string()),
            });
        }
        Err(e) => {
            return Err(StickerError::Io {
                path: path.to_path_buf(),
                message: format!("Failed to read credentials: {}", e),
            });
        }
    };

    let raw: RawCredentials =
        serde_yaml::from_str(&content).map_err(|e| StickerError::Auth {
            message: format!("invalid credentials file: {}", e),
            help: Some("Run `sticker-tool login` to rewrite it".to_string()),
        })?;

    match (raw.username, raw.password) {
        (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
            Ok(Some(Credentials { username, password }))
        }
        _ => Ok(None),
    }
}

/// Delete the credentials file. Absence is not an error.
///
/// Returns whether a file was actually removed.
pub fn delete(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(StickerError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to remove credentials: {}", e),
        }),
    }
}
