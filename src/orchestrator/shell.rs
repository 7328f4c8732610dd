//! Application shell.
//!
//! Builds one controller per operation kind and routes submit events to them. Every
//! submission runs as its own task, so submissions of either kind may overlap.

use super::controller::{Analysis, OperationController, Summarization, Submission};
use crate::backend::Transport;
use crate::model::{AnalyzeForm, OperationKind, OperationState, SummarizeForm};
use crate::page::SharedPage;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// A form submission coming from a presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitEvent {
    Analysis(AnalyzeForm),
    Summarization(SummarizeForm),
}

impl SubmitEvent {
    pub fn kind(&self) -> OperationKind {
        match self {
            SubmitEvent::Analysis(_) => OperationKind::Analysis,
            SubmitEvent::Summarization(_) => OperationKind::Summarization,
        }
    }
}

/// Commands emitted by presentation layers.
#[derive(Debug, Clone)]
pub enum ShellCommand {
    Submit(SubmitEvent),
    Quit,
}

#[derive(Clone)]
pub struct App {
    analysis: Arc<OperationController<Analysis>>,
    summarization: Arc<OperationController<Summarization>>,
    page: SharedPage,
}

impl App {
    pub fn new(transport: Arc<dyn Transport>, page: SharedPage) -> Self {
        Self {
            analysis: Arc::new(OperationController::new(transport.clone(), page.clone())),
            summarization: Arc::new(OperationController::new(transport, page.clone())),
            page,
        }
    }

    pub fn page(&self) -> &SharedPage {
        &self.page
    }

    pub fn state(&self, kind: OperationKind) -> OperationState {
        match kind {
            OperationKind::Analysis => self.analysis.state(),
            OperationKind::Summarization => self.summarization.state(),
        }
    }

    /// Start a submission on the controller for its kind.
    pub fn dispatch(&self, event: SubmitEvent, tasks: &mut JoinSet<(OperationKind, Submission)>) {
        debug!(kind = %event.kind(), "dispatching submit");
        match event {
            SubmitEvent::Analysis(form) => {
                let ctrl = self.analysis.clone();
                tasks.spawn(async move { (OperationKind::Analysis, ctrl.submit(form).await) });
            }
            SubmitEvent::Summarization(form) => {
                let ctrl = self.summarization.clone();
                tasks.spawn(async move { (OperationKind::Summarization, ctrl.submit(form).await) });
            }
        }
    }

    /// Route commands until `Quit` or until the channel closes.
    ///
    /// A closed channel lets in-flight submissions finish; `Quit` drops them.
    pub async fn run(&self, mut cmd_rx: UnboundedReceiver<ShellCommand>) -> Result<()> {
        let mut tasks = JoinSet::new();
        let mut closed = false;

        loop {
            if closed && tasks.is_empty() {
                break;
            }
            tokio::select! {
                cmd = cmd_rx.recv(), if !closed => {
                    match cmd {
                        Some(ShellCommand::Submit(event)) => self.dispatch(event, &mut tasks),
                        Some(ShellCommand::Quit) => {
                            info!(in_flight = tasks.len(), "quit requested");
                            tasks.abort_all();
                            break;
                        }
                        None => closed = true,
                    }
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    match joined {
                        Ok((kind, Submission::Applied(state))) => {
                            debug!(%kind, ?state, "submission finished");
                        }
                        Ok((kind, Submission::Superseded)) => {
                            debug!(%kind, "submission superseded");
                        }
                        Err(e) if e.is_cancelled() => {}
                        Err(e) => warn!("submission task failed: {e}"),
                    }
                }
            }
        }

        // Aborted tasks drop their futures here, which resets loading indicators.
        while tasks.join_next().await.is_some() {}
        Ok(())
    }
}
