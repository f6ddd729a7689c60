use crate::config::ConfigStore;
use crate::error::{BuddyError, Result};
use crate::language::Language;
use crate::post::PostIndex;
use crate::theme::ThemeRegistry;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// The dashboard's overview numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteSummary {
    pub post_count: usize,
    pub draft_count: usize,
    pub current_theme: String,
    pub installed_theme_count: usize,
    pub language: Language,
}

/// A Hexo project root and the services that read and write it.
#[derive(Debug, Clone)]
pub struct Site {
    root: PathBuf,
}

impl Site {
    /// Fails with `WorkspaceNotFound` unless `root` is an existing directory.
    /// A relative root is made absolute against the working directory, so
    /// every path handed out is absolute.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(BuddyError::WorkspaceNotFound(root));
        }
        let root = std::path::absolute(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> ConfigStore {
        ConfigStore::new(self.root.clone())
    }

    pub fn posts(&self) -> PostIndex {
        PostIndex::new(self.root.clone())
    }

    pub fn themes(&self) -> ThemeRegistry {
        ThemeRegistry::new(self.root.clone())
    }

    pub fn summary(&self) -> Result<SiteSummary> {
        let posts = self.posts().list()?;
        let themes = self.themes();
        Ok(SiteSummary {
            post_count: posts.len(),
            draft_count: posts.iter().filter(|p| p.is_draft).count(),
            current_theme: themes.current_theme()?,
            installed_theme_count: themes.installed_themes()?.len(),
            language: self.config().language()?,
        })
    }
}
