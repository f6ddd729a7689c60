//! Generate-then-publish deployment with progress reporting.
//!
//! A run moves `Idle -> Generating -> Publishing -> Succeeded | Failed`.
//! Every progress message is appended to the run log and broadcast to
//! subscribers together with the log history at that point. A failed step
//! ends the run: it is reported as a `Failed` event and a `Failed` outcome,
//! never as an error, and later steps are not attempted.
//!
//! Nothing stops two runs from overlapping; both would drive the external
//! tool against the same output directory.

use crate::command::SiteCommands;
use crate::error::BuddyError;
use crate::log::{LogEntry, LogSink};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info};

pub const MSG_GENERATING: &str = "Generating static files...";
pub const MSG_PUBLISHING: &str = "Pushing to remote repository...";
pub const MSG_SUCCEEDED: &str = "Deployment succeeded";
pub const MSG_GENERATED: &str = "Static files generated";
pub const MSG_FAILED_PREFIX: &str = "Deployment failed: ";

const PROGRESS_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeployStage {
    Idle,
    Generating,
    Publishing,
    Succeeded,
    Failed,
}

impl DeployStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DeployStage::Succeeded | DeployStage::Failed)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    pub stage: DeployStage,
    pub message: String,
    /// The log entry written for this message.
    pub entry: LogEntry,
    /// Full log history right after `entry` was appended.
    pub history: Vec<LogEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeployOutcome {
    Succeeded,
    Failed { reason: String },
}

impl DeployOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DeployOutcome::Succeeded)
    }
}

pub struct DeployPipeline<C> {
    commands: C,
    log: Arc<dyn LogSink>,
    tx: broadcast::Sender<ProgressEvent>,
}

impl<C: SiteCommands> DeployPipeline<C> {
    pub fn new(commands: C, log: Arc<dyn LogSink>) -> Self {
        let (tx, _) = broadcast::channel(PROGRESS_CAPACITY);
        Self { commands, log, tx }
    }

    /// Receive progress for runs started after this call. A receiver that
    /// falls more than the channel capacity behind sees `Lagged`; the
    /// pipeline itself never waits on subscribers.
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.tx.subscribe()
    }

    pub fn log(&self) -> &Arc<dyn LogSink> {
        &self.log
    }

    pub fn commands(&self) -> &C {
        &self.commands
    }

    /// Generate, then publish.
    pub async fn run(&self) -> DeployOutcome {
        info!("deployment started");
        self.emit(DeployStage::Generating, MSG_GENERATING);
        if let Err(e) = self.commands.generate().await {
            return self.fail(e);
        }
        self.emit(DeployStage::Publishing, MSG_PUBLISHING);
        if let Err(e) = self.commands.deploy().await {
            return self.fail(e);
        }
        self.emit(DeployStage::Succeeded, MSG_SUCCEEDED);
        info!("deployment succeeded");
        DeployOutcome::Succeeded
    }

    /// Generate only, with the same reporting as `run`.
    pub async fn generate_only(&self) -> DeployOutcome {
        self.emit(DeployStage::Generating, MSG_GENERATING);
        if let Err(e) = self.commands.generate().await {
            return self.fail(e);
        }
        self.emit(DeployStage::Succeeded, MSG_GENERATED);
        DeployOutcome::Succeeded
    }

    fn emit(&self, stage: DeployStage, message: impl Into<String>) {
        let message = message.into();
        let entry = self.log.append(&message);
        let event = ProgressEvent {
            stage,
            message,
            entry,
            history: self.log.entries(),
        };
        // Err only means nobody is subscribed.
        let _ = self.tx.send(event);
    }

    fn fail(&self, err: BuddyError) -> DeployOutcome {
        let reason = err.to_string();
        error!(reason = %reason, "deployment failed");
        self.log.append(&format!("[ERROR] {reason}"));
        self.emit(DeployStage::Failed, format!("{MSG_FAILED_PREFIX}{reason}"));
        DeployOutcome::Failed { reason }
    }
}
