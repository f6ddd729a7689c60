use crate::error::Result;
use crate::io::atomic_write;
use crate::language::{Language, PLUGIN_LANGUAGE_KEY};
use crate::paths;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// ConfigValue / ConfigDocument
// ---------------------------------------------------------------------------

/// A site config document. Key order follows the file so a merge does not
/// reshuffle what the user wrote.
pub type ConfigDocument = IndexMap<String, ConfigValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Seq(Vec<ConfigValue>),
    Map(ConfigDocument),
}

impl ConfigValue {
    /// Parse user-supplied text as YAML (`true`, `3`, `[a, b]`), falling back
    /// to a plain string when it is not valid YAML.
    pub fn parse(text: &str) -> ConfigValue {
        if text.trim().is_empty() {
            return ConfigValue::String(text.to_string());
        }
        serde_yaml::from_str(text).unwrap_or_else(|_| ConfigValue::String(text.to_string()))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Text of a scalar value. `None` for null, sequences and maps.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            ConfigValue::String(s) => Some(s.clone()),
            ConfigValue::Int(n) => Some(n.to_string()),
            ConfigValue::Float(f) => Some(f.to_string()),
            ConfigValue::Bool(b) => Some(b.to_string()),
            ConfigValue::Null | ConfigValue::Seq(_) | ConfigValue::Map(_) => None,
        }
    }

    /// `false`, `null`, zero, NaN and the empty string are falsy; everything
    /// else, including empty sequences and maps, is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            ConfigValue::Null => false,
            ConfigValue::Bool(b) => *b,
            ConfigValue::Int(n) => *n != 0,
            ConfigValue::Float(f) => *f != 0.0 && !f.is_nan(),
            ConfigValue::String(s) => !s.is_empty(),
            ConfigValue::Seq(_) | ConfigValue::Map(_) => true,
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::String(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::String(s)
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

impl From<i64> for ConfigValue {
    fn from(n: i64) -> Self {
        ConfigValue::Int(n)
    }
}

/// Parse a YAML mapping. Blank input and a bare `null` read as an empty document.
pub fn parse_document(content: &str) -> Result<ConfigDocument> {
    if content.trim().is_empty() {
        return Ok(ConfigDocument::new());
    }
    let doc: Option<ConfigDocument> = serde_yaml::from_str(content)?;
    Ok(doc.unwrap_or_default())
}

/// Shallow merge: every key in `partial` overwrites `base`, nothing is removed.
pub fn merge(base: &mut ConfigDocument, partial: ConfigDocument) {
    for (key, value) in partial {
        base.insert(key, value);
    }
}

// ---------------------------------------------------------------------------
// SiteSettings
// ---------------------------------------------------------------------------

/// The handful of site keys the dashboard edits directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl SiteSettings {
    pub fn from_document(doc: &ConfigDocument) -> Self {
        let text = |key: &str| doc.get(key).and_then(ConfigValue::scalar_text);
        Self {
            title: text("title"),
            author: text("author"),
            url: text("url"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.url.is_none()
    }

    /// Only the provided fields, ready for `ConfigStore::write`.
    pub fn into_partial(self) -> ConfigDocument {
        let mut doc = ConfigDocument::new();
        for (key, value) in [("title", self.title), ("author", self.author), ("url", self.url)] {
            if let Some(v) = value {
                doc.insert(key.to_string(), ConfigValue::String(v));
            }
        }
        doc
    }
}

// ---------------------------------------------------------------------------
// ConfigStore
// ---------------------------------------------------------------------------

/// Reads and merge-writes `<root>/_config.yml`.
///
/// There is no locking: a concurrent writer outside this process can race a
/// read-modify-write cycle and the last writer wins. Comments in the file are
/// not preserved across a write.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    root: PathBuf,
}

impl ConfigStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> PathBuf {
        paths::config_path(&self.root)
    }

    /// `Ok(None)` when the file does not exist. Read and parse failures are errors.
    pub fn read(&self) -> Result<Option<ConfigDocument>> {
        let path = self.path();
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no site config");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        parse_document(&content).map(Some)
    }

    pub fn get(&self, key: &str) -> Result<Option<ConfigValue>> {
        Ok(self.read()?.and_then(|mut doc| doc.shift_remove(key)))
    }

    /// Merge `partial` over the current document (or an empty one) and
    /// persist it. Returns the merged document.
    pub fn write(&self, partial: ConfigDocument) -> Result<ConfigDocument> {
        let mut doc = self.read()?.unwrap_or_default();
        let keys: Vec<&str> = partial.keys().map(String::as_str).collect();
        info!(path = %self.path().display(), keys = ?keys, "saving site config");
        merge(&mut doc, partial);
        let yaml = serde_yaml::to_string(&doc)?;
        atomic_write(&self.path(), yaml.as_bytes())?;
        Ok(doc)
    }

    pub fn set(&self, key: &str, value: ConfigValue) -> Result<ConfigDocument> {
        let mut partial = ConfigDocument::new();
        partial.insert(key.to_string(), value);
        self.write(partial)
    }

    pub fn site_settings(&self) -> Result<SiteSettings> {
        Ok(self
            .read()?
            .map(|doc| SiteSettings::from_document(&doc))
            .unwrap_or_default())
    }

    /// The dashboard language. Absent or unrecognized values read as the default.
    pub fn language(&self) -> Result<Language> {
        let lang = self
            .get(PLUGIN_LANGUAGE_KEY)?
            .and_then(|v| v.as_str().and_then(|s| s.parse().ok()))
            .unwrap_or_default();
        Ok(lang)
    }

    pub fn set_language(&self, lang: Language) -> Result<ConfigDocument> {
        self.set(PLUGIN_LANGUAGE_KEY, ConfigValue::from(lang.as_str()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn doc(pairs: &[(&str, ConfigValue)]) -> ConfigDocument {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn read_missing_is_none() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path());
        assert!(store.read().unwrap().is_none());
    }

    #[test]
    fn read_empty_file_is_empty_document() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("_config.yml"), "\n").unwrap();
        let store = ConfigStore::new(dir.path());
        assert_eq!(store.read().unwrap(), Some(ConfigDocument::new()));
    }

    #[test]
    fn read_malformed_is_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("_config.yml"), "title: [unclosed\n").unwrap();
        let store = ConfigStore::new(dir.path());
        assert!(store.read().is_err());
    }

    #[test]
    fn parses_value_kinds() {
        let yaml = r#"
title: My Blog
port: 4000
ratio: 0.5
relative_link: false
subtitle: ~
skip_render:
  - README.md
deploy:
  type: git
  branch: main
"#;
        let d = parse_document(yaml).unwrap();
        assert_eq!(d["title"], ConfigValue::from("My Blog"));
        assert_eq!(d["port"], ConfigValue::Int(4000));
        assert_eq!(d["ratio"], ConfigValue::Float(0.5));
        assert_eq!(d["relative_link"], ConfigValue::Bool(false));
        assert_eq!(d["subtitle"], ConfigValue::Null);
        assert!(matches!(&d["skip_render"], ConfigValue::Seq(v) if v.len() == 1));
        match &d["deploy"] {
            ConfigValue::Map(m) => assert_eq!(m["branch"], ConfigValue::from("main")),
            other => panic!("expected map, got {other:?}"),
        }
    }

    #[test]
    fn write_merges_distinct_keys() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path());
        store.write(doc(&[("a", ConfigValue::Int(1))])).unwrap();
        store.write(doc(&[("b", ConfigValue::Int(2))])).unwrap();
        let d = store.read().unwrap().unwrap();
        assert_eq!(d["a"], ConfigValue::Int(1));
        assert_eq!(d["b"], ConfigValue::Int(2));
    }

    #[test]
    fn write_overwrites_same_key() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path());
        store.write(doc(&[("a", ConfigValue::Int(1))])).unwrap();
        store.write(doc(&[("a", ConfigValue::Int(2))])).unwrap();
        let d = store.read().unwrap().unwrap();
        assert_eq!(d["a"], ConfigValue::Int(2));
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn write_keeps_unknown_keys_and_order() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("_config.yml"),
            "title: Old\nlanguage: en\ndeploy:\n  type: git\n",
        )
        .unwrap();
        let store = ConfigStore::new(dir.path());
        store.set("title", ConfigValue::from("New")).unwrap();
        let d = store.read().unwrap().unwrap();
        let keys: Vec<&str> = d.keys().map(String::as_str).collect();
        assert_eq!(keys, ["title", "language", "deploy"]);
        assert_eq!(d["title"], ConfigValue::from("New"));
        assert!(matches!(&d["deploy"], ConfigValue::Map(_)));
    }

    #[test]
    fn merge_is_shallow() {
        let mut base = parse_document("deploy:\n  type: git\n  branch: main\n").unwrap();
        let partial = parse_document("deploy:\n  type: rsync\n").unwrap();
        merge(&mut base, partial);
        match &base["deploy"] {
            ConfigValue::Map(m) => {
                assert_eq!(m["type"], ConfigValue::from("rsync"));
                assert!(!m.contains_key("branch"));
            }
            other => panic!("expected map, got {other:?}"),
        }
    }

    #[test]
    fn site_settings_partial_only_has_given_fields() {
        let s = SiteSettings {
            title: Some("Blog".into()),
            author: None,
            url: Some("https://example.com".into()),
        };
        let partial = s.into_partial();
        assert_eq!(partial.len(), 2);
        assert!(!partial.contains_key("author"));
    }

    #[test]
    fn site_settings_round_trip_through_store() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path());
        store.set("author", ConfigValue::from("ann")).unwrap();
        store
            .write(
                SiteSettings {
                    title: Some("Blog".into()),
                    ..Default::default()
                }
                .into_partial(),
            )
            .unwrap();
        let s = store.site_settings().unwrap();
        assert_eq!(s.title.as_deref(), Some("Blog"));
        assert_eq!(s.author.as_deref(), Some("ann"));
        assert_eq!(s.url, None);
    }

    #[test]
    fn language_defaults_and_persists() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path());
        assert_eq!(store.language().unwrap(), Language::ZhCn);
        store.set_language(Language::EnUs).unwrap();
        assert_eq!(store.language().unwrap(), Language::EnUs);
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("pluginLanguage: en-US"));
    }

    #[test]
    fn unrecognized_language_reads_as_default() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("_config.yml"), "pluginLanguage: klingon\n").unwrap();
        let store = ConfigStore::new(dir.path());
        assert_eq!(store.language().unwrap(), Language::ZhCn);
    }

    #[test]
    fn parse_cli_values() {
        assert_eq!(ConfigValue::parse("true"), ConfigValue::Bool(true));
        assert_eq!(ConfigValue::parse("42"), ConfigValue::Int(42));
        assert_eq!(ConfigValue::parse("hello"), ConfigValue::from("hello"));
        assert_eq!(ConfigValue::parse("[oops"), ConfigValue::from("[oops"));
        assert_eq!(ConfigValue::parse(""), ConfigValue::from(""));
    }

    #[test]
    fn truthiness() {
        assert!(!ConfigValue::Null.is_truthy());
        assert!(!ConfigValue::Bool(false).is_truthy());
        assert!(!ConfigValue::Int(0).is_truthy());
        assert!(!ConfigValue::from("").is_truthy());
        assert!(ConfigValue::from("false").is_truthy());
        assert!(ConfigValue::Int(1).is_truthy());
        assert!(ConfigValue::Seq(vec![]).is_truthy());
    }
}
