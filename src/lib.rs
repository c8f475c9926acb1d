//! sticker-tool - Sticker pack project manager
//!
//! A library for managing local sticker-pack directories (YAML manifest +
//! image files), rendering static HTML previews, and moving packs to and
//! from the remote sticker service through a transport client.

pub mod cli;
pub mod credentials;
pub mod error;
pub mod output;
pub mod pack;
pub mod preview;
pub mod transfer;

pub use credentials::Credentials;
pub use error::{Result, StickerError};
pub use pack::{build_manifest, scan_directory, BuildOutcome, Manifest, ScanResult, MANIFEST_FILENAME};
pub use preview::{write_preview, PREVIEW_FILENAME};
pub use transfer::{HttpTransport, Pack, PackRef, PackSticker, PackTransport, RESULT_FILENAME};
