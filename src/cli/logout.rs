//! Logout command implementation.

use std::path::Path;

use crate::credentials;
use crate::error::Result;
use crate::output::{display_path, Printer};

pub fn run(credentials_path: &Path, printer: &Printer) -> Result<()> {
    if credentials::delete(credentials_path)? {
        printer.success("Removed", &display_path(credentials_path));
    } else {
        printer.info("Skipped", "no credentials file to remove");
    }
    Ok(())
}
