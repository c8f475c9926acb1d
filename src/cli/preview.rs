//! Preview command implementation.

use std::path::Path;

use crate::error::Result;
use crate::output::{display_path, Printer};
use crate::pack::Manifest;
use crate::preview::write_preview;

pub fn run(dir: &Path, printer: &Printer) -> Result<()> {
    let manifest = Manifest::load(dir)?;
    let path = write_preview(&manifest, dir)?;
    printer.success("Rendered", &display_path(&path));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack::MANIFEST_FILENAME;
    use crate::preview::PREVIEW_FILENAME;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_preview_renders_from_manifest() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.png"), "x").unwrap();
        fs::write(
            dir.path().join(MANIFEST_FILENAME),
            "meta:\n  title: T\n  author: A\nstickers:\n  - file: a.png\n",
        )
        .unwrap();

        run(dir.path(), &Printer::new()).unwrap();

        let html = fs::read_to_string(dir.path().join(PREVIEW_FILENAME)).unwrap();
        assert!(html.contains("a.png"));
    }

    #[test]
    fn test_preview_requires_manifest() {
        let dir = tempdir().unwrap();
        assert!(run(dir.path(), &Printer::new()).is_err());
    }
}
