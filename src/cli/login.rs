//! Login command implementation.
//!
//! Prompts for a username (visible) and password (echo suppressed) and
//! writes the credentials file. The password is never printed anywhere.

use std::path::Path;

use dialoguer::{Input, Password};

use crate::credentials;
use crate::error::{Result, StickerError};
use crate::output::{display_path, Printer};

pub fn run(credentials_path: &Path, printer: &Printer) -> Result<()> {
    let username: String = Input::new()
        .with_prompt("Username")
        .interact_text()
        .map_err(prompt_error)?;
    let username = username.trim().to_string();
    if username.is_empty() {
        return Err(StickerError::Input {
            message: "username must not be empty".to_string(),
            help: None,
        });
    }

    let password = Password::new()
        .with_prompt("Password")
        .interact()
        .map_err(prompt_error)?;
    if password.is_empty() {
        return Err(StickerError::Input {
            message: "password must not be empty".to_string(),
            help: None,
        });
    }

    credentials::save(credentials_path, &username, &password)?;

    printer.success(
        "Saved",
        &format!(
            "credentials for {} to {}",
            username,
            display_path(credentials_path)
        ),
    );
    Ok(())
}

fn prompt_error(e: dialoguer::Error) -> StickerError {
    StickerError::Input {
        message: format!("prompt failed: {}", e),
        help: None,
    }
}
