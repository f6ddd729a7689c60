use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = "_config.yml";
pub const POSTS_DIR: &str = "source/_posts";
pub const THEMES_DIR: &str = "themes";

/// Extensions the post index treats as Markdown, compared case-insensitively.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn posts_dir(root: &Path) -> PathBuf {
    root.join(POSTS_DIR)
}

pub fn themes_dir(root: &Path) -> PathBuf {
    root.join(THEMES_DIR)
}

pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            MARKDOWN_EXTENSIONS
                .iter()
                .any(|m| m.eq_ignore_ascii_case(ext))
        })
}

// ---------------------------------------------------------------------------
// Slugs
// ---------------------------------------------------------------------------

static SLUG_SEP_RE: OnceLock<Regex> = OnceLock::new();

fn slug_sep_re() -> &'static Regex {
    SLUG_SEP_RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").unwrap())
}

/// Turn a post title into a file stem: lowercase ASCII alphanumerics with
/// every other run of characters collapsed to a single `-`.
/// Returns an empty string when nothing usable remains.
pub fn slugify(title: &str) -> String {
    let lower = title.to_lowercase();
    slug_sep_re()
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/blog");
        assert_eq!(config_path(root), PathBuf::from("/tmp/blog/_config.yml"));
        assert_eq!(posts_dir(root), PathBuf::from("/tmp/blog/source/_posts"));
        assert_eq!(themes_dir(root), PathBuf::from("/tmp/blog/themes"));
    }

    #[test]
    fn markdown_extensions() {
        assert!(is_markdown(Path::new("a.md")));
        assert!(is_markdown(Path::new("a.MD")));
        assert!(is_markdown(Path::new("a.markdown")));
        assert!(!is_markdown(Path::new("a.txt")));
        assert!(!is_markdown(Path::new("md")));
    }

    #[test]
    fn slugs() {
        assert_eq!(slugify("Hello World!"), "hello-world");
        assert_eq!(slugify("  Rust -- 2024 edition "), "rust-2024-edition");
        assert_eq!(slugify("already-a-slug"), "already-a-slug");
        assert_eq!(slugify("你好"), "");
    }
}
