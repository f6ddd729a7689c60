//! Invocation of the external site build tool (`hexo generate`, `hexo deploy`,
//! `hexo new`).
//!
//! Each call runs to completion with the project root as working directory and
//! returns the captured output. There is no timeout, cancellation or
//! streaming: output is only available once the process exits.

use crate::error::{BuddyError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// The three site-tool operations the dashboard drives.
#[async_trait]
pub trait SiteCommands: Send + Sync {
    /// Render the static site.
    async fn generate(&self) -> Result<CommandOutput>;
    /// Publish the rendered site.
    async fn deploy(&self) -> Result<CommandOutput>;
    /// Scaffold a new post through the tool's own template.
    async fn new_post(&self, title: &str) -> Result<CommandOutput>;
}

/// Runs the Hexo CLI, by default as `npx hexo <subcommand>`.
#[derive(Debug, Clone)]
pub struct HexoCli {
    root: PathBuf,
    program: String,
    base_args: Vec<String>,
}

impl HexoCli {
    pub const DEFAULT_INVOCATION: &'static str = "npx hexo";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_invocation(root, Self::DEFAULT_INVOCATION)
    }

    /// `invocation` is split on whitespace into program and leading arguments,
    /// e.g. `"npx hexo"` or `"./node_modules/.bin/hexo"`. Blank means the default.
    pub fn with_invocation(root: impl Into<PathBuf>, invocation: &str) -> Self {
        let mut parts = invocation.split_whitespace().map(str::to_string);
        match parts.next() {
            Some(program) => Self::with_program(root, program, parts.collect()),
            None => Self::new(root),
        }
    }

    pub fn with_program(
        root: impl Into<PathBuf>,
        program: impl Into<String>,
        base_args: Vec<String>,
    ) -> Self {
        Self {
            root: root.into(),
            program: program.into(),
            base_args,
        }
    }

    /// Human-readable command line, used in logs and error messages.
    pub fn describe(&self, args: &[&str]) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.base_args.iter().map(String::as_str))
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// A bare name is looked up on `PATH`. A relative path such as
    /// `./node_modules/.bin/hexo` is taken relative to the project root, not
    /// the process working directory.
    fn locate_program(&self) -> Result<PathBuf> {
        let program = Path::new(&self.program);
        let candidate = if program.is_relative() && program.components().count() > 1 {
            self.root.join(program)
        } else {
            program.to_path_buf()
        };
        which::which(&candidate).map_err(|e| {
            BuddyError::CommandSpawnFailed(format!("'{}' not found: {e}", self.program))
        })
    }

    async fn run(&self, args: &[&str]) -> Result<CommandOutput> {
        if !self.root.is_dir() {
            return Err(BuddyError::WorkspaceNotFound(self.root.clone()));
        }
        let command = self.describe(args);
        let program = self.locate_program()?;

        info!(command = %command, root = %self.root.display(), "running site command");
        let output = Command::new(&program)
            .args(&self.base_args)
            .args(args)
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| BuddyError::CommandSpawnFailed(format!("failed to spawn '{command}': {e}")))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            let detail = if stderr.trim().is_empty() {
                format!("`{command}` exited with {}", output.status)
            } else {
                stderr.trim().to_string()
            };
            warn!(command = %command, status = %output.status, "site command failed");
            return Err(BuddyError::CommandFailed { command, detail });
        }

        debug!(command = %command, stdout_len = stdout.len(), "site command finished");
        Ok(CommandOutput { stdout, stderr })
    }
}

#[async_trait]
impl SiteCommands for HexoCli {
    async fn generate(&self) -> Result<CommandOutput> {
        self.run(&["generate"]).await
    }

    async fn deploy(&self) -> Result<CommandOutput> {
        self.run(&["deploy"]).await
    }

    async fn new_post(&self, title: &str) -> Result<CommandOutput> {
        let title = title.trim();
        if title.is_empty() {
            return Err(BuddyError::InvalidTitle);
        }
        self.run(&["new", title]).await
    }
}
