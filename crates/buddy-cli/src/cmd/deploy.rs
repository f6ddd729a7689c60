use crate::output::print_json;
use anyhow::bail;
use buddy_core::command::HexoCli;
use buddy_core::deploy::{DeployOutcome, DeployPipeline, DeployStage, ProgressEvent};
use buddy_core::log::{LogEntry, MemoryLog};
use buddy_core::site::Site;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `hexo generate` only.
    Generate,
    /// `hexo generate` then `hexo deploy`.
    Deploy,
}

#[derive(Serialize)]
struct RunReport<'a> {
    #[serde(flatten)]
    outcome: &'a DeployOutcome,
    events: Vec<EventRow>,
    log: Vec<LogEntry>,
}

#[derive(Serialize)]
struct EventRow {
    stage: DeployStage,
    message: String,
}

pub fn run(root: &Path, hexo: &str, mode: Mode, json: bool) -> anyhow::Result<()> {
    let site = Site::open(root)?;
    let log = MemoryLog::shared();
    let pipeline = DeployPipeline::new(
        HexoCli::with_invocation(site.root(), hexo),
        Arc::clone(&log),
    );

    let rt = tokio::runtime::Runtime::new()?;
    let (outcome, events) = rt.block_on(async {
        let mut rx = pipeline.subscribe();
        let printer = async move {
            let mut seen = Vec::new();
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        if !json {
                            println!("{}", event.message);
                        }
                        let done = event.stage.is_terminal();
                        seen.push(event);
                        if done {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        tracing::warn!(missed = n, "progress receiver lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            seen
        };
        let work = async {
            match mode {
                Mode::Generate => pipeline.generate_only().await,
                Mode::Deploy => pipeline.run().await,
            }
        };
        tokio::join!(work, printer)
    });

    if json {
        print_json(&RunReport {
            outcome: &outcome,
            events: events.into_iter().map(EventRow::from).collect(),
            log: log.entries(),
        })?;
    } else {
        println!();
        println!("Log:");
        for entry in log.entries() {
            println!("  {entry}");
        }
    }

    match outcome {
        DeployOutcome::Succeeded => Ok(()),
        DeployOutcome::Failed { reason } => match mode {
            Mode::Generate => bail!("generate failed: {reason}"),
            Mode::Deploy => bail!("deployment failed: {reason}"),
        },
    }
}

impl From<ProgressEvent> for EventRow {
    fn from(event: ProgressEvent) -> Self {
        Self {
            stage: event.stage,
            message: event.message,
        }
    }
}
