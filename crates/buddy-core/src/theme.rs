use crate::config::{ConfigDocument, ConfigStore, ConfigValue};
use crate::error::{BuddyError, Result};
use crate::paths;
use std::path::PathBuf;
use tracing::{debug, info};

/// Hexo's bundled theme, used when the config names none.
pub const DEFAULT_THEME: &str = "landscape";
/// Reported when there is no `_config.yml` at all.
pub const UNKNOWN_THEME: &str = "unknown";

/// Current theme (from `_config.yml`) and installed themes (`themes/*/`).
/// Installed directories are not checked for being valid theme packages.
#[derive(Debug, Clone)]
pub struct ThemeRegistry {
    root: PathBuf,
    config: ConfigStore,
}

impl ThemeRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let config = ConfigStore::new(root.clone());
        Self { root, config }
    }

    pub fn current_theme(&self) -> Result<String> {
        let Some(doc) = self.config.read()? else {
            return Ok(UNKNOWN_THEME.to_string());
        };
        Ok(theme_from_document(&doc))
    }

    /// Every subdirectory of `themes/`, sorted by name.
    pub fn installed_themes(&self) -> Result<Vec<String>> {
        let dir = paths::themes_dir(&self.root);
        let read_dir = match std::fs::read_dir(&dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(dir = %dir.display(), "no themes directory");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        let mut themes = Vec::new();
        for entry in read_dir {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            themes.push(entry.file_name().to_string_lossy().into_owned());
        }
        themes.sort();
        Ok(themes)
    }

    /// Point `theme` in `_config.yml` at an installed theme.
    pub fn switch_theme(&self, name: &str) -> Result<ConfigDocument> {
        if !self.installed_themes()?.iter().any(|t| t == name) {
            return Err(BuddyError::ThemeNotInstalled(name.to_string()));
        }
        info!(theme = name, "switching theme");
        self.config.set("theme", ConfigValue::from(name))
    }
}

fn theme_from_document(doc: &ConfigDocument) -> String {
    doc.get("theme")
        .and_then(ConfigValue::scalar_text)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_THEME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn install(dir: &TempDir, name: &str) {
        std::fs::create_dir_all(dir.path().join("themes").join(name)).unwrap();
    }

    #[test]
    fn unknown_without_config() {
        let dir = TempDir::new().unwrap();
        let themes = ThemeRegistry::new(dir.path());
        assert_eq!(themes.current_theme().unwrap(), "unknown");
    }

    #[test]
    fn landscape_when_key_absent_or_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("_config.yml"), "title: Blog\n").unwrap();
        let themes = ThemeRegistry::new(dir.path());
        assert_eq!(themes.current_theme().unwrap(), "landscape");

        std::fs::write(dir.path().join("_config.yml"), "theme: ''\n").unwrap();
        assert_eq!(themes.current_theme().unwrap(), "landscape");
    }

    #[test]
    fn write_then_read_theme() {
        let dir = TempDir::new().unwrap();
        let themes = ThemeRegistry::new(dir.path());
        assert_eq!(themes.current_theme().unwrap(), "unknown");
        ConfigStore::new(dir.path())
            .set("theme", ConfigValue::from("mytheme"))
            .unwrap();
        assert_eq!(themes.current_theme().unwrap(), "mytheme");
    }

    #[test]
    fn installed_lists_directories_only() {
        let dir = TempDir::new().unwrap();
        install(&dir, "next");
        install(&dir, "butterfly");
        install(&dir, ".cache");
        std::fs::write(dir.path().join("themes/README.md"), "x").unwrap();
        let themes = ThemeRegistry::new(dir.path());
        assert_eq!(
            themes.installed_themes().unwrap(),
            [".cache", "butterfly", "next"]
        );
    }

    #[test]
    fn installed_empty_without_directory() {
        let dir = TempDir::new().unwrap();
        let themes = ThemeRegistry::new(dir.path());
        assert!(themes.installed_themes().unwrap().is_empty());
    }

    #[test]
    fn switch_requires_installed_theme() {
        let dir = TempDir::new().unwrap();
        install(&dir, "next");
        let themes = ThemeRegistry::new(dir.path());
        assert!(matches!(
            themes.switch_theme("missing"),
            Err(BuddyError::ThemeNotInstalled(name)) if name == "missing"
        ));
        themes.switch_theme("next").unwrap();
        assert_eq!(themes.current_theme().unwrap(), "next");
    }
}
