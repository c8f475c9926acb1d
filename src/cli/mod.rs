pub mod completions;
pub mod download;
pub mod init;
pub mod login;
pub mod logout;
pub mod preview;
pub mod upload;
pub mod url;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// sticker-tool - Manage, preview and publish sticker packs
#[derive(Parser, Debug)]
#[command(name = "sticker-tool")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Pack directory to operate on
    #[arg(short = 'd', long = "dir", global = true, default_value = ".")]
    pub dir: PathBuf,

    /// Credentials file path
    #[arg(
        long,
        global = true,
        default_value_os_t = crate::credentials::default_path()
    )]
    pub credentials: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in to the sticker service and store credentials
    Login,

    /// Delete stored credentials
    Logout,

    /// Build or update the pack manifest from directory contents
    Init(init::InitArgs),

    /// Download a pack into the pack directory
    Download(download::DownloadArgs),

    /// Upload the pack and print its sharing URLs
    Upload,

    /// Regenerate the HTML preview from the manifest
    Preview,

    /// Print the sharing URL recorded by a previous upload
    Url,

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}
