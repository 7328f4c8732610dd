//! Application-level orchestration.
//!
//! This module owns the per-operation controllers, the shell that routes submit events
//! to them, and post-run processing such as HTML export. UI/CLI layers call into this
//! module to keep responsibilities separated.

pub mod controller;
mod post_process;
pub mod shell;

pub(crate) use post_process::{process_run_completion, DOCUMENT_TITLE};
pub(crate) use shell::{App, ShellCommand, SubmitEvent};
