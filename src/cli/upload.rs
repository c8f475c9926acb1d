//! Upload command implementation.
//!
//! Publishes the pack through the transport client and prints the sharing
//! URLs. A result file left by an earlier upload (or download) makes this
//! a no-network reprint of the recorded id/key.

use std::path::Path;

use crate::error::Result;
use crate::output::{display_path, Printer};
use crate::transfer::{self, deep_link, web_url, HttpTransport};

pub fn run(dir: &Path, credentials_path: &Path, printer: &Printer) -> Result<()> {
    let transport = HttpTransport::from_env()?;
    let outcome = transfer::upload(dir, credentials_path, &transport)?;

    if outcome.already_uploaded {
        printer.info(
            "Skipped",
            &format!(
                "{} was already uploaded as {}",
                display_path(dir),
                outcome.pack.id
            ),
        );
    } else {
        printer.success(
            "Uploaded",
            &format!("{} as {}", display_path(dir), outcome.pack.id),
        );
    }

    println!("{}", web_url(&outcome.pack));
    println!("{}", deep_link(&outcome.pack));
    Ok(())
}
