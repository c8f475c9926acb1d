//! Static HTML preview generation.
//!
//! Renders one self-contained document: a header with the pack title and
//! author, one figure per sticker in manifest order, and a client-side
//! light/dark theme switcher (CSS variables plus a few lines of inline JS,
//! no server dependency). Every manifest-sourced string goes through
//! [`html_escape`] before insertion.

use std::path::{Path, PathBuf};

use crate::error::{Result, StickerError};
use crate::pack::Manifest;

/// Preview filename inside a pack directory.
pub const PREVIEW_FILENAME: &str = "preview.html";

const STYLE: &str = "\
:root { --bg: #fafafa; --fg: #1a1a1a; --card: #ffffff; --muted: #6a6a6a; }
:root[data-theme=\"dark\"] { --bg: #17181c; --fg: #ececec; --card: #23252b; --muted: #9a9a9a; }
body { margin: 0; font-family: system-ui, sans-serif; background: var(--bg); color: var(--fg); }
header { display: flex; align-items: center; gap: 1rem; padding: 1.5rem 2rem; }
header img { width: 64px; height: 64px; object-fit: contain; }
header .meta { flex: 1; }
header h1 { margin: 0; font-size: 1.4rem; }
header p { margin: 0.2rem 0 0; color: var(--muted); }
main { display: grid; grid-template-columns: repeat(auto-fill, minmax(128px, 1fr)); gap: 1rem; padding: 0 2rem 2rem; }
figure { margin: 0; padding: 0.8rem; background: var(--card); border-radius: 8px; text-align: center; }
figure img { width: 100%; aspect-ratio: 1; object-fit: contain; }
figcaption { margin-top: 0.4rem; font-size: 1.2rem; min-height: 1.4rem; }
button { padding: 0.4rem 0.8rem; border: 1px solid var(--muted); border-radius: 6px; background: var(--card); color: var(--fg); cursor: pointer; }
";

const SCRIPT: &str = "\
var root = document.documentElement;
var stored = localStorage.getItem('sticker-preview-theme');
if (stored) { root.setAttribute('data-theme', stored); }
document.getElementById('theme-toggle').addEventListener('click', function () {
  var next = root.getAttribute('data-theme') === 'dark' ? 'light' : 'dark';
  root.setAttribute('data-theme', next);
  localStorage.setItem('sticker-preview-theme', next);
});
";

/// Escape a string for embedding in HTML text or attribute context.
pub fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Render the preview document for a validated manifest.
///
/// When no cover is configured the first sticker stands in; the default is
/// local to the render and never written back to the manifest.
pub fn render(manifest: &Manifest) -> String {
    let cover = manifest
        .meta
        .cover
        .as_deref()
        .unwrap_or(&manifest.stickers[0].file);

    let title = html_escape(&manifest.meta.title);
    let author = html_escape(&manifest.meta.author);

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!("<title>{}</title>\n", title));
    html.push_str(&format!("<style>\n{}</style>\n", STYLE));
    html.push_str("</head>\n<body>\n");

    html.push_str("<header>\n");
    html.push_str(&format!(
        "<img src=\"{}\" alt=\"cover\">\n",
        html_escape(cover)
    ));
    html.push_str("<div class=\"meta\">\n");
    html.push_str(&format!("<h1>{}</h1>\n", title));
    html.push_str(&format!("<p>by {}</p>\n", author));
    html.push_str("</div>\n");
    html.push_str("<button id=\"theme-toggle\" type=\"button\">Theme</button>\n");
    html.push_str("</header>\n");

    html.push_str("<main>\n");
    for sticker in &manifest.stickers {
        let file = html_escape(&sticker.file);
        html.push_str("<figure>\n");
        html.push_str(&format!("<img src=\"{}\" alt=\"{}\">\n", file, file));
        html.push_str(&format!(
            "<figcaption>{}</figcaption>\n",
            html_escape(&sticker.chr)
        ));
        html.push_str("</figure>\n");
    }
    html.push_str("</main>\n");

    html.push_str(&format!("<script>\n{}</script>\n", SCRIPT));
    html.push_str("</body>\n</html>\n");

    html
}

/// Render the preview and write it into `dir`, overwriting any previous
/// preview unconditionally.
pub fn write_preview(manifest: &Manifest, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(PREVIEW_FILENAME);
    let html = render(manifest);

    std::fs::write(&path, html).map_err(|e| StickerError::Io {
        path: path.clone(),
        message: format!("Failed to write preview: {}", e),
    })?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack::{Meta, Sticker};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn sample_manifest(cover: Option<&str>) -> Manifest {
        Manifest {
            meta: Meta {
                title: "Cats".to_string(),
                author: "Alice".to_string(),
                cover: cover.map(str::to_string),
                cover_path: cover.map(PathBuf::from),
            },
            stickers: vec![
                Sticker {
                    chr: "😀".to_string(),
                    file: "a.png".to_string(),
                    path: PathBuf::from("/p/a.png"),
                },
                Sticker {
                    chr: String::new(),
                    file: "b.png".to_string(),
                    path: PathBuf::from("/p/b.png"),
                },
            ],
        }
    }

    #[test]
    fn test_render_lists_stickers_in_order() {
        let html = render(&sample_manifest(None));

        let a = html.find("src=\"a.png\"").unwrap();
        let b = html.find("src=\"b.png\"").unwrap();
        assert!(a < b);
        assert!(html.contains("<figcaption>😀</figcaption>"));
        assert!(html.contains("Cats"));
        assert!(html.contains("by Alice"));
    }

    #[test]
    fn test_render_defaults_cover_to_first_sticker() {
        let html = render(&sample_manifest(None));
        assert!(html.contains("<img src=\"a.png\" alt=\"cover\">"));
    }

    #[test]
    fn test_render_uses_configured_cover() {
        let html = render(&sample_manifest(Some("cover.png")));
        assert!(html.contains("<img src=\"cover.png\" alt=\"cover\">"));
    }

    #[test]
    fn test_render_escapes_user_text() {
        let mut manifest = sample_manifest(None);
        manifest.meta.title = "<script>alert(1)</script>".to_string();
        manifest.meta.author = "a & b".to_string();

        let html = render(&manifest);

        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("a &amp; b"));
    }

    #[test]
    fn test_render_has_theme_switcher() {
        let html = render(&sample_manifest(None));
        assert!(html.contains("id=\"theme-toggle\""));
        assert!(html.contains("localStorage"));
    }

    #[test]
    fn test_write_preview_overwrites() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(PREVIEW_FILENAME), "stale").unwrap();

        let path = write_preview(&sample_manifest(None), dir.path()).unwrap();

        assert_eq!(path, dir.path().join(PREVIEW_FILENAME));
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(html_escape("a<b>&\"'"), "a&lt;b&gt;&amp;&quot;&#39;");
        assert_eq!(html_escape("plain"), "plain");
    }
}
