//! Init command implementation.
//!
//! Builds or updates `stickers.yaml` from the pack directory's contents.

use std::io::{self, BufRead};
use std::path::Path;

use clap::Args;

use crate::error::Result;
use crate::output::{display_path, plural, Printer};
use crate::pack::build_manifest;

/// Build or update the pack manifest from directory contents
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Pack title
    #[arg(short = 'T', long = "title")]
    pub title: Option<String>,

    /// Pack author
    #[arg(short = 'A', long = "author")]
    pub author: Option<String>,

    /// Read emoji assignments from stdin, one per non-blank line
    #[arg(short = 'E', long = "emojis")]
    pub emojis: bool,

    /// Allow updating an existing manifest
    #[arg(short = 'u', long = "update")]
    pub update: bool,
}

pub fn run(args: InitArgs, dir: &Path, printer: &Printer) -> Result<()> {
    printer.status("Scanning", &display_path(dir));

    let outcome = if args.emojis {
        let stdin = io::stdin();
        let mut source = stdin.lock();
        build_with_source(&args, dir, Some(&mut source))?
    } else {
        build_with_source(&args, dir, None)?
    };

    if let Some(cover) = &outcome.cover {
        printer.info("Cover", cover);
    }
    let verb = if outcome.created { "Created" } else { "Updated" };
    printer.success(
        verb,
        &format!(
            "{} ({})",
            display_path(&outcome.path),
            plural(outcome.stickers, "sticker", "stickers")
        ),
    );
    Ok(())
}

fn build_with_source(
    args: &InitArgs,
    dir: &Path,
    source: Option<&mut dyn BufRead>,
) -> Result<crate::pack::BuildOutcome> {
    build_manifest(
        dir,
        args.title.as_deref(),
        args.author.as_deref(),
        source,
        args.update,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack::{Manifest, MANIFEST_FILENAME};
    use std::fs;
    use tempfile::tempdir;

    fn args(update: bool) -> InitArgs {
        InitArgs {
            title: Some("T".to_string()),
            author: Some("A".to_string()),
            emojis: false,
            update,
        }
    }

    #[test]
    fn test_init_creates_manifest() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.png"), "x").unwrap();

        run(args(false), dir.path(), &Printer::new()).unwrap();

        assert!(dir.path().join(MANIFEST_FILENAME).exists());
        let manifest = Manifest::load(dir.path()).unwrap();
        assert_eq!(manifest.meta.title, "T");
    }

    #[test]
    fn test_init_errors_if_manifest_exists() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.png"), "x").unwrap();
        fs::write(dir.path().join(MANIFEST_FILENAME), "meta: {}\n").unwrap();

        let result = run(args(false), dir.path(), &Printer::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_init_update_rewrites() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.png"), "x").unwrap();

        run(args(false), dir.path(), &Printer::new()).unwrap();
        run(args(true), dir.path(), &Printer::new()).unwrap();

        let manifest = Manifest::load(dir.path()).unwrap();
        assert_eq!(manifest.stickers.len(), 1);
    }
}
