//! Download command implementation.
//!
//! Fetches a pack into the pack directory: images, manifest, preview, and
//! the result file that blocks an accidental re-upload.

use std::path::Path;

use clap::Args;

use crate::error::Result;
use crate::output::{display_path, plural, Printer};
use crate::transfer::{self, share, HttpTransport};

/// Download a pack into the pack directory
#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Sharing URL or bare pack id
    pub pack: String,

    /// Pack key (required with a bare pack id)
    pub key: Option<String>,
}

pub fn run(args: DownloadArgs, dir: &Path, printer: &Printer) -> Result<()> {
    let pack = share::resolve(&args.pack, args.key.as_deref())?;

    let transport = HttpTransport::from_env()?;
    printer.status("Downloading", &pack.id);
    let outcome = transfer::download(dir, &pack, &transport)?;

    printer.success(
        "Downloaded",
        &format!(
            "{} into {}",
            plural(outcome.stickers, "sticker", "stickers"),
            display_path(dir)
        ),
    );
    printer.info("Preview", &display_path(&outcome.preview_path));
    Ok(())
}
