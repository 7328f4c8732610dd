use crate::backend::HttpTransport;
use crate::logging::{self, LogTarget};
use crate::model::{AnalyzeForm, ClientConfig, SummarizeForm};
use crate::orchestrator::{self, App, ShellCommand, SubmitEvent};
use crate::page::Page;
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

/// A line of run output and the stream it belongs on.
#[derive(Debug)]
enum Printed {
    /// Results: the text summary or the JSON snapshot.
    Result(String),
    /// Notes about side effects such as the HTML export.
    Note(String),
}

/// Write queued lines until every sender is gone.
fn drain_printed(
    mut rx: mpsc::UnboundedReceiver<Printed>,
    mut results: impl Write,
    mut notes: impl Write,
) {
    while let Some(printed) = rx.blocking_recv() {
        let _ = match printed {
            Printed::Result(line) => writeln!(results, "{line}"),
            Printed::Note(line) => writeln!(notes, "{line}"),
        };
    }
    let _ = results.flush();
    let _ = notes.flush();
}

/// Stdio is locked on a blocking thread so the runtime never waits on the terminal.
fn spawn_printer() -> (mpsc::UnboundedSender<Printed>, tokio::task::JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel::<Printed>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        drain_printed(
            rx,
            std::io::LineWriter::new(stdout.lock()),
            std::io::LineWriter::new(stderr.lock()),
        );
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "news-nexus",
    version,
    about = "News analysis and summarization client with optional TUI"
)]
pub struct Cli {
    /// Base URL of the News Nexus analysis service
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    pub base_url: String,

    /// Search query to analyze
    #[arg(long)]
    pub query: Option<String>,

    /// Article URL to analyze
    #[arg(long)]
    pub url: Option<String>,

    /// Text to summarize
    #[arg(long, conflicts_with = "summarize_file")]
    pub summarize: Option<String>,

    /// Read the text to summarize from a file
    #[arg(long)]
    pub summarize_file: Option<PathBuf>,

    /// Print a text summary of the results and exit (no TUI)
    #[arg(long, conflicts_with = "json")]
    pub text: bool,

    /// Print the page snapshot as JSON and exit (no TUI)
    #[arg(long)]
    pub json: bool,

    /// Write the rendered page as a standalone HTML document
    #[arg(long)]
    pub export_html: Option<PathBuf>,

    /// Network timeout for each request (e.g. 30s). No timeout by default
    #[arg(long)]
    pub request_timeout: Option<humantime::Duration>,

    /// Submit the forms given on the command line as soon as the TUI starts
    #[arg(long)]
    pub submit_on_launch: bool,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(long, short)]
    pub verbose: bool,
}

impl Cli {
    fn is_tui(&self) -> bool {
        cfg!(feature = "tui") && !self.json && !self.text
    }
}

pub async fn run(args: Cli) -> Result<()> {
    if args.is_tui() {
        #[cfg(feature = "tui")]
        {
            let log_path = logging::init(LogTarget::File, args.verbose)?;
            return crate::tui::run(args, log_path).await;
        }
    }

    logging::init(LogTarget::Stderr, args.verbose)?;
    run_once(args).await
}

/// Build a `ClientConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> ClientConfig {
    ClientConfig {
        base_url: args.base_url.clone(),
        user_agent: format!("news-nexus/{}", env!("CARGO_PKG_VERSION")),
        request_timeout: args.request_timeout.map(Into::into),
    }
}

/// Forms filled in from the command line, in submission order.
pub fn initial_forms(args: &Cli) -> Result<(AnalyzeForm, SummarizeForm)> {
    let analyze = AnalyzeForm {
        query: args.query.clone().unwrap_or_default(),
        url: args.url.clone().unwrap_or_default(),
    };
    let text = match (&args.summarize, &args.summarize_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("read {}", path.display()))?,
        (None, None) => String::new(),
    };
    Ok((analyze, SummarizeForm { text }))
}

/// Submit events for every form the user asked for on the command line.
pub fn submit_events(args: &Cli) -> Result<Vec<SubmitEvent>> {
    let (analyze, summarize) = initial_forms(args)?;
    let mut events = Vec::new();
    if args.query.is_some() || args.url.is_some() {
        events.push(SubmitEvent::Analysis(analyze));
    }
    if args.summarize.is_some() || args.summarize_file.is_some() {
        events.push(SubmitEvent::Summarization(summarize));
    }
    Ok(events)
}

/// Text and JSON modes: submit, wait for every submission to settle, print, exit.
async fn run_once(args: Cli) -> Result<()> {
    let events = submit_events(&args)?;
    if events.is_empty() {
        anyhow::bail!("nothing to submit: pass --query, --url, --summarize or --summarize-file");
    }

    let cfg = build_config(&args);
    let transport = HttpTransport::new(&cfg).context("build HTTP client")?;
    let app = App::new(Arc::new(transport), Page::shared());

    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<ShellCommand>();
    for event in events {
        let _ = cmd_tx.send(ShellCommand::Submit(event));
    }
    // Closing the channel lets the shell finish in-flight submissions and return.
    drop(cmd_tx);
    app.run(cmd_rx).await?;

    let processed = orchestrator::process_run_completion(&args, &app);
    let (print_tx, printer) = spawn_printer();

    if args.json {
        let out = serde_json::to_string_pretty(&processed.snapshot)?;
        let _ = print_tx.send(Printed::Result(out));
    } else {
        let summary = crate::text_summary::build_text_summary(&processed.snapshot.page);
        for line in summary.lines {
            let _ = print_tx.send(Printed::Result(line));
        }
    }
    for msg in &processed.export_messages {
        let _ = print_tx.send(Printed::Note(msg.clone()));
    }
    drop(print_tx);
    let _ = printer.await;

    if let Some(message) = processed.snapshot.error {
        anyhow::bail!("{message}");
    }
    if processed.export_failed {
        anyhow::bail!("HTML export failed");
    }
    Ok(())
}
