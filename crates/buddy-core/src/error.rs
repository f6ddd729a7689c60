use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuddyError {
    #[error("workspace not found: {}", .0.display())]
    WorkspaceNotFound(PathBuf),

    #[error("post not found: {}", .0.display())]
    PostNotFound(PathBuf),

    #[error("post already exists: {}", .0.display())]
    PostExists(PathBuf),

    #[error("not a post under source/_posts: {}", .0.display())]
    InvalidPostPath(PathBuf),

    #[error("invalid post title: must not be blank")]
    InvalidTitle,

    #[error("theme not installed: {0}")]
    ThemeNotInstalled(String),

    #[error("invalid language '{0}': expected zh-CN or en-US")]
    InvalidLanguage(String),

    #[error("{0}")]
    CommandSpawnFailed(String),

    /// The external tool ran and exited non-zero. `detail` is what the user sees.
    #[error("{detail}")]
    CommandFailed { command: String, detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, BuddyError>;
