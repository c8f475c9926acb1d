//! Url command implementation.
//!
//! Prints only the sharing URL from a prior result file, for piping.

use std::path::Path;

use crate::error::{Result, StickerError};
use crate::transfer::{load_result, web_url, RESULT_FILENAME};

pub fn run(dir: &Path) -> Result<()> {
    let pack = load_result(dir)?.ok_or_else(|| StickerError::Input {
        message: format!("no {} in {}", RESULT_FILENAME, dir.display()),
        help: Some("Upload the pack first".to_string()),
    })?;

    println!("{}", web_url(&pack));
    Ok(())
}
