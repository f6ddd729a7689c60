//! Post index over `source/_posts`.
//!
//! Every listing re-reads the directory; nothing is cached. Each post's date
//! is resolved through a fixed fallback chain:
//!
//! 1. front-matter `date`, when it parses as a date
//! 2. a `YYYY-MM-DD` prefix on the file name
//! 3. the file's modification time
//! 4. otherwise the epoch, displayed as `Unknown`
//!
//! Posts are returned newest first. Files are visited in file-name order and
//! the sort is stable, so equal dates keep file-name order.

use crate::config::{parse_document, ConfigDocument, ConfigValue};
use crate::error::{BuddyError, Result};
use crate::io::write_new;
use crate::paths;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

pub const UNKNOWN_DATE: &str = "Unknown";

const DISPLAY_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which fallback tier produced a post's date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateSource {
    FrontMatter,
    FileName,
    Modified,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub title: String,
    /// `YYYY-MM-DD` (UTC) or `Unknown`.
    pub date: String,
    pub file_path: PathBuf,
    pub is_draft: bool,
    pub date_source: DateSource,
    /// Milliseconds since the epoch of the resolved date; 0 when unknown.
    #[serde(skip)]
    sort_key: i64,
}

/// A file the index could not read. It is left out of the listing.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedPost {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PostScan {
    pub posts: Vec<Post>,
    pub skipped: Vec<SkippedPost>,
}

// ---------------------------------------------------------------------------
// Front-matter parsing
// ---------------------------------------------------------------------------

/// Extract the YAML content between the first pair of `---` delimiters.
fn extract_frontmatter(content: &str) -> Option<&str> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let rest = content.strip_prefix("---")?;
    let rest = if let Some(r) = rest.strip_prefix('\n') {
        r
    } else if let Some(r) = rest.strip_prefix("\r\n") {
        r
    } else {
        return None;
    };
    if rest.starts_with("---") {
        return Some("");
    }
    let end = rest.find("\n---")?;
    Some(&rest[..end])
}

/// Front-matter as a document. Missing or malformed front-matter is empty.
pub fn parse_front_matter(content: &str) -> ConfigDocument {
    let Some(fm) = extract_frontmatter(content) else {
        return ConfigDocument::new();
    };
    parse_document(fm).unwrap_or_else(|e| {
        debug!(error = %e, "ignoring malformed front-matter");
        ConfigDocument::new()
    })
}

// ---------------------------------------------------------------------------
// Date resolution
// ---------------------------------------------------------------------------

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Timestamps carrying a numeric offset, e.g. `2024-03-01 10:20:30 +0800`.
const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M %z",
    "%Y/%m/%d %H:%M:%S %z",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parse a front-matter `date`. Timestamps without an offset are taken as UTC;
/// integers are epoch milliseconds.
pub fn parse_front_matter_date(value: &ConfigValue) -> Option<DateTime<Utc>> {
    match value {
        ConfigValue::String(s) => parse_date_text(s.trim()),
        ConfigValue::Int(ms) => Utc.timestamp_millis_opt(*ms).single(),
        _ => None,
    }
}

fn parse_date_text(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date_at_midnight(date);
        }
    }
    None
}

fn date_at_midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
}

static FILENAME_DATE_RE: OnceLock<Regex> = OnceLock::new();

fn filename_date_re() -> &'static Regex {
    FILENAME_DATE_RE.get_or_init(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})").unwrap())
}

/// The date at the start of a `YYYY-MM-DD-title.md` style file name.
pub fn date_from_file_name(file_name: &str) -> Option<DateTime<Utc>> {
    let caps = filename_date_re().captures(file_name)?;
    let date = NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok()?;
    date_at_midnight(date)
}

fn modified_time(path: &Path) -> Option<DateTime<Utc>> {
    let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok()?;
    Some(DateTime::<Utc>::from(modified))
}

fn resolve_date(
    front_matter: &ConfigDocument,
    file_name: &str,
    path: &Path,
) -> (Option<DateTime<Utc>>, DateSource) {
    if let Some(dt) = front_matter.get("date").and_then(parse_front_matter_date) {
        return (Some(dt), DateSource::FrontMatter);
    }
    if let Some(dt) = date_from_file_name(file_name) {
        return (Some(dt), DateSource::FileName);
    }
    if let Some(dt) = modified_time(path) {
        return (Some(dt), DateSource::Modified);
    }
    (None, DateSource::Unknown)
}

/// Build a post record from a file's path and already-read content.
pub fn build_post(path: &Path, content: &str) -> Post {
    let front_matter = parse_front_matter(content);
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let title = front_matter
        .get("title")
        .and_then(ConfigValue::scalar_text)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        });

    let is_draft = front_matter
        .get("draft")
        .is_some_and(ConfigValue::is_truthy);

    let (resolved, date_source) = resolve_date(&front_matter, &file_name, path);
    let (date, sort_key) = match resolved {
        Some(dt) => (dt.format(DISPLAY_FORMAT).to_string(), dt.timestamp_millis()),
        None => (UNKNOWN_DATE.to_string(), 0),
    };

    Post {
        title,
        date,
        file_path: path.to_path_buf(),
        is_draft,
        date_source,
        sort_key,
    }
}

// ---------------------------------------------------------------------------
// PostIndex
// ---------------------------------------------------------------------------

/// Post text with invalid UTF-8 replaced by U+FFFD. Only I/O errors fail.
fn read_post_text(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[derive(Serialize)]
struct NewPostFrontMatter<'a> {
    title: &'a str,
    date: String,
}

#[derive(Debug, Clone)]
pub struct PostIndex {
    root: PathBuf,
}

impl PostIndex {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn dir(&self) -> PathBuf {
        paths::posts_dir(&self.root)
    }

    /// Read every Markdown file under the posts directory. A missing directory
    /// yields an empty scan; a file that cannot be read is reported in
    /// `skipped` instead of failing the scan.
    pub fn scan(&self) -> Result<PostScan> {
        let dir = self.dir();
        let read_dir = match std::fs::read_dir(&dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(dir = %dir.display(), "no posts directory");
                return Ok(PostScan::default());
            }
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        for entry in read_dir {
            let path = entry?.path();
            if path.is_file() && paths::is_markdown(&path) {
                files.push(path);
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        let mut scan = PostScan::default();
        for path in files {
            match read_post_text(&path) {
                Ok(content) => scan.posts.push(build_post(&path, &content)),
                Err(e) => scan.skipped.push(SkippedPost {
                    path,
                    reason: e.to_string(),
                }),
            }
        }
        scan.posts.sort_by(|a, b| b.sort_key.cmp(&a.sort_key));
        Ok(scan)
    }

    /// Posts newest first. Unreadable files are logged and left out.
    pub fn list(&self) -> Result<Vec<Post>> {
        let scan = self.scan()?;
        for s in &scan.skipped {
            warn!(path = %s.path.display(), reason = %s.reason, "skipping unreadable post");
        }
        Ok(scan.posts)
    }

    /// Resolve a single post. Relative paths are taken relative to the posts
    /// directory.
    pub fn load(&self, path: &Path) -> Result<Post> {
        let path = self.resolve(path)?;
        let content = read_post_text(&path)?;
        Ok(build_post(&path, &content))
    }

    /// Scaffold a new post file from `title` without the external tool.
    pub fn create(&self, title: &str) -> Result<Post> {
        let title = title.trim();
        if title.is_empty() {
            return Err(BuddyError::InvalidTitle);
        }
        let now = Utc::now();
        let mut stem = paths::slugify(title);
        if stem.is_empty() {
            stem = format!("post-{}", now.format("%Y%m%d%H%M%S"));
        }
        let path = self.dir().join(format!("{stem}.md"));

        let front_matter = serde_yaml::to_string(&NewPostFrontMatter {
            title,
            date: now.format("%Y-%m-%d %H:%M:%S").to_string(),
        })?;
        let content = format!("---\n{front_matter}---\n\n");

        if !write_new(&path, content.as_bytes())? {
            return Err(BuddyError::PostExists(path));
        }
        info!(path = %path.display(), "created post");
        Ok(build_post(&path, &content))
    }

    pub fn delete(&self, path: &Path) -> Result<()> {
        let path = self.resolve(path)?;
        std::fs::remove_file(&path)?;
        info!(path = %path.display(), "deleted post");
        Ok(())
    }

    /// Validate that `path` names an existing Markdown file directly inside
    /// the posts directory.
    fn resolve(&self, path: &Path) -> Result<PathBuf> {
        let dir = self.dir();
        let candidate = if path.is_absolute() {
            path.to_path_buf()
        } else {
            dir.join(path)
        };
        if !paths::is_markdown(&candidate) {
            return Err(BuddyError::InvalidPostPath(candidate));
        }
        let file = match candidate.canonicalize() {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BuddyError::PostNotFound(candidate))
            }
            Err(e) => return Err(e.into()),
        };
        let dir = match dir.canonicalize() {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BuddyError::InvalidPostPath(candidate))
            }
            Err(e) => return Err(e.into()),
        };
        if file.parent() != Some(dir.as_path()) || !file.is_file() {
            return Err(BuddyError::InvalidPostPath(candidate));
        }
        Ok(candidate)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
