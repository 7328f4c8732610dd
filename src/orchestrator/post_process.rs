//! Post-run processing utilities.
//!
//! Handles the snapshot and exports after all submissions of a run have settled.

use crate::cli::Cli;
use crate::model::{OperationKind, OperationState};
use crate::page::{self, document, Page};
use serde::Serialize;
use std::collections::BTreeMap;

use super::App;

pub(crate) const DOCUMENT_TITLE: &str = "News Nexus";

/// Page state plus operation states, as printed in JSON mode.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct PageSnapshot {
    pub states: BTreeMap<String, OperationState>,
    pub error: Option<String>,
    pub page: Page,
}

/// Result of post-run processing, ready for presentation layers.
pub(crate) struct ProcessedRun {
    pub snapshot: PageSnapshot,
    pub export_messages: Vec<String>,
    pub export_failed: bool,
}

pub(crate) fn snapshot(app: &App) -> PageSnapshot {
    let page = page::lock(app.page()).clone();
    let states = [OperationKind::Analysis, OperationKind::Summarization]
        .into_iter()
        .map(|kind| (kind.to_string(), app.state(kind)))
        .collect();
    PageSnapshot {
        states,
        error: page.error_message(),
        page,
    }
}

/// Take a snapshot of the settled page and write any requested export.
pub(crate) fn process_run_completion(args: &Cli, app: &App) -> ProcessedRun {
    let snapshot = snapshot(app);
    let mut export_messages = Vec::new();
    let mut export_failed = false;

    if let Some(export_path) = args.export_html.as_deref() {
        match document::write_document(export_path, &snapshot.page, DOCUMENT_TITLE) {
            Ok(()) => export_messages.push(format!("Exported HTML: {}", export_path.display())),
            Err(e) => {
                export_failed = true;
                export_messages.push(format!("Export HTML failed: {e:#}"));
            }
        }
    }

    ProcessedRun {
        snapshot,
        export_messages,
        export_failed,
    }
}
