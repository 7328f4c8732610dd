use crate::orchestrator::DOCUMENT_TITLE;
use crate::page::{document, Page};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::mpsc as std_mpsc;
use std::sync::OnceLock;
use std::time::Duration;

/// Text queued for the clipboard worker thread.
static CLIPBOARD_QUEUE: OnceLock<std_mpsc::Sender<String>> = OnceLock::new();

/// How long a written selection stays owned. X11 and Wayland drop it with its owner.
const CLIPBOARD_HOLD: Duration = Duration::from_secs(2);

fn export_file_name() -> String {
    let now = time::OffsetDateTime::now_utc();
    format!(
        "news-nexus-{:04}{:02}{:02}-{:02}{:02}{:02}.html",
        now.year(),
        u8::from(now.month()),
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
}

/// Export the page as HTML into the current directory.
/// Returns the absolute path of the exported file.
pub fn export_page_html(page: &Page) -> Result<PathBuf> {
    let current_dir = std::env::current_dir().context("get current directory")?;
    let path = current_dir.join(export_file_name());
    document::write_document(&path, page, DOCUMENT_TITLE)?;
    Ok(path)
}

fn clipboard_queue() -> &'static std_mpsc::Sender<String> {
    CLIPBOARD_QUEUE.get_or_init(|| {
        let (tx, rx) = std_mpsc::channel::<String>();
        let spawned = std::thread::Builder::new()
            .name("news-nexus-clipboard".into())
            .spawn(move || {
                for text in rx {
                    match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text)) {
                        Ok(()) => std::thread::sleep(CLIPBOARD_HOLD),
                        Err(e) => tracing::debug!(error = %e, "clipboard write failed"),
                    }
                }
            });
        if let Err(e) = spawned {
            tracing::warn!(error = %e, "clipboard thread did not start");
        }
        tx
    })
}

/// Hand the exported path to the clipboard thread; returns immediately.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    clipboard_queue()
        .send(text.to_string())
        .map_err(|_| anyhow::anyhow!("clipboard unavailable: worker thread has stopped"))
}
