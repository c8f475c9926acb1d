use miette::Diagnostic;
use thiserror::Error;

/// Main error type for sticker-tool operations
#[derive(Error, Diagnostic, Debug)]
pub enum StickerError {
    #[error("IO error: {0}")]
    #[diagnostic(code(sticker::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(sticker::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Manifest error: {message}")]
    #[diagnostic(code(sticker::manifest))]
    Manifest {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Invalid input: {message}")]
    #[diagnostic(code(sticker::input))]
    Input {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("{message}: {path}")]
    #[diagnostic(code(sticker::conflict))]
    Conflict {
        path: std::path::PathBuf,
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Authentication error: {message}")]
    #[diagnostic(code(sticker::auth))]
    Auth {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Transfer failed: {message}")]
    #[diagnostic(code(sticker::transfer))]
    Transfer { message: String },
}

pub type Result<T> = std::result::Result<T, StickerError>;
