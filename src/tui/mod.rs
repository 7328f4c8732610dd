mod charts;
mod export;
mod help;
mod state;

use crate::backend::HttpTransport;
use crate::cli::{self, Cli};
use crate::model::{OperationKind, OperationState};
use crate::orchestrator::{App, ShellCommand};
use crate::page::{self, anchors, OutlineLine, Page};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Terminal,
};
use state::{AnalyzeField, UiState, TAB_ANALYZE, TAB_HELP, TAB_SUMMARIZE};
use std::path::PathBuf;
use std::sync::Arc;
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc::{self, UnboundedSender};

pub async fn run(args: Cli, log_path: Option<PathBuf>) -> Result<()> {
    let cfg = cli::build_config(&args);
    let transport = HttpTransport::new(&cfg).context("build HTTP client")?;
    let app = App::new(Arc::new(transport), Page::shared());

    // Unbounded channel: the UI thread never waits on the shell.
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<ShellCommand>();

    let (analyze, summarize) = cli::initial_forms(&args)?;
    let mut state = UiState::new(analyze, summarize);
    state.log_path = log_path;
    if args.submit_on_launch {
        for event in cli::submit_events(&args)? {
            let _ = cmd_tx.send(ShellCommand::Submit(event));
        }
    }

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    let ui_app = app.clone();
    let base_url = cfg.base_url.clone();
    let ui_handle = std::thread::spawn(move || run_threaded(ui_app, base_url, state, cmd_tx));

    let res = app.run(cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Run the TUI loop on a dedicated thread.
fn run_threaded(
    app: App,
    base_url: String,
    mut state: UiState,
    cmd_tx: UnboundedSender<ShellCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now()
        .checked_sub(tick_rate)
        .unwrap_or_else(Instant::now);

    let res = loop {
        if last_tick.elapsed() >= tick_rate {
            terminal
                .draw(|f| draw(f.area(), f, &app, &base_url, &state))
                .ok();
            last_tick = Instant::now();
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if !event::poll(Duration::from_millis(10)).unwrap_or(false) {
            continue;
        }
        let Ok(Event::Key(k)) = event::read() else {
            continue;
        };
        if k.kind != KeyEventKind::Press {
            continue;
        }
        match (k.modifiers, k.code) {
            (_, KeyCode::Esc) | (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
                let _ = cmd_tx.send(ShellCommand::Quit);
                break Ok(());
            }
            (KeyModifiers::CONTROL, KeyCode::Char('e')) => {
                let exported = export::export_page_html(&page::lock(app.page()));
                match exported {
                    Ok(path) => {
                        let path = path.display().to_string();
                        state.info = format!("Exported HTML: {path} (Ctrl-Y to copy path)");
                        state.last_exported_path = Some(path);
                    }
                    Err(e) => state.info = format!("HTML export failed: {e:#}"),
                }
            }
            (KeyModifiers::CONTROL, KeyCode::Char('y')) => {
                if let Some(ref path) = state.last_exported_path {
                    match export::copy_to_clipboard(path) {
                        Ok(_) => {
                            let display_path = if path.chars().count() > 60 {
                                format!("{}...", path.chars().take(57).collect::<String>())
                            } else {
                                path.clone()
                            };
                            state.info = format!("✓ Copied to clipboard: {}", display_path);
                        }
                        Err(e) => {
                            state.info = format!("Clipboard copy failed: {e:#}");
                        }
                    }
                } else {
                    state.info = "No exported file path to copy. Export first (Ctrl-E)".into();
                }
            }
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => state.clear_field(),
            (_, KeyCode::Tab) => state.next_tab(),
            (_, KeyCode::F(1)) => state.tab = TAB_HELP,
            (_, KeyCode::Enter) => {
                if let Some(event) = state.submit_event() {
                    let kind = event.kind();
                    state.info = if cmd_tx.send(ShellCommand::Submit(event)).is_ok() {
                        state.scroll = 0;
                        format!("Submitted {kind}")
                    } else {
                        "Shell stopped; cannot submit".into()
                    };
                }
            }
            (_, KeyCode::Up) | (_, KeyCode::Down) => {
                if state.tab == TAB_ANALYZE {
                    state.toggle_field();
                }
            }
            (_, KeyCode::PageUp) => state.scroll_by(-5),
            (_, KeyCode::PageDown) => state.scroll_by(5),
            (_, KeyCode::Backspace) => state.backspace(),
            (m, KeyCode::Char(c)) if !m.contains(KeyModifiers::CONTROL) => state.insert_char(c),
            _ => {}
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

fn draw(area: Rect, f: &mut ratatui::Frame, app: &App, base_url: &str, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(area);

    let tabs = Tabs::new(vec![
        Line::from("Analyze"),
        Line::from("Summarize"),
        Line::from("Help"),
    ])
    .select(state.tab)
    .block(Block::default().borders(Borders::ALL).title("news-nexus"))
    .highlight_style(Style::default().fg(Color::Yellow));
    f.render_widget(tabs, chunks[0]);

    // One lock per frame; controllers only hold it for short synchronous updates.
    let view = page::lock(app.page());
    match state.tab {
        TAB_ANALYZE => draw_analyze(chunks[1], f, &view, state),
        TAB_SUMMARIZE => draw_summarize(chunks[1], f, &view, state),
        _ => help::draw_help(chunks[1], f, base_url, state.log_path.as_deref()),
    }
    drop(view);

    draw_status(chunks[2], f, app, state);
}

fn state_label(state: OperationState) -> Span<'static> {
    match state {
        OperationState::Idle => Span::styled("idle", Style::default().fg(Color::Gray)),
        OperationState::Loading => Span::styled("loading", Style::default().fg(Color::Yellow)),
        OperationState::Succeeded => Span::styled("done", Style::default().fg(Color::Green)),
        OperationState::Failed => Span::styled("failed", Style::default().fg(Color::Red)),
    }
}

fn draw_status(area: Rect, f: &mut ratatui::Frame, app: &App, state: &UiState) {
    let info = if state.info.is_empty() {
        "Enter: submit  Tab: switch tabs  F1: help  Esc: quit".to_string()
    } else {
        state.info.clone()
    };
    let line = Line::from(vec![
        Span::raw("analysis: "),
        state_label(app.state(OperationKind::Analysis)),
        Span::raw("  summarization: "),
        state_label(app.state(OperationKind::Summarization)),
        Span::raw("  │ "),
        Span::styled(info, Style::default().fg(Color::Gray)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn form_title(title: &str, page: &Page, loading_anchor: &str, busy: &str) -> String {
    if page.is_visible(loading_anchor) {
        format!("{title} ({busy}…)")
    } else {
        title.to_string()
    }
}

fn field_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let label_style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let mut spans = vec![
        Span::styled(label.to_string(), label_style),
        Span::raw(value.to_string()),
    ];
    if focused {
        spans.push(Span::styled("▏", Style::default().fg(Color::Yellow)));
    }
    Line::from(spans)
}

/// Height of the error banner: hidden unless the page shows it.
fn error_height(page: &Page) -> u16 {
    if page.error_message().is_some() {
        3
    } else {
        0
    }
}

fn draw_error(area: Rect, f: &mut ratatui::Frame, page: &Page) {
    let Some(message) = page.error_message() else {
        return;
    };
    let p = Paragraph::new(message)
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title("Error"),
        );
    f.render_widget(p, area);
}

fn draw_analyze(area: Rect, f: &mut ratatui::Frame, page: &Page, state: &UiState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(error_height(page)),
            Constraint::Min(0),
        ])
        .split(area);

    let form = Paragraph::new(vec![
        field_line("Query: ", &state.query, state.focus == AnalyzeField::Query),
        field_line("URL:   ", &state.url, state.focus == AnalyzeField::Url),
    ])
    .block(Block::default().borders(Borders::ALL).title(form_title(
        "News Analysis",
        page,
        anchors::ANALYSIS_LOADING,
        "analyzing",
    )));
    f.render_widget(form, rows[0]);
    draw_error(rows[1], f, page);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[2]);

    let articles = article_lines(page);
    let count = page
        .find_by_class(anchors::ARTICLES_CONTAINER, "article-card")
        .len();
    let p = Paragraph::new(articles)
        .wrap(Wrap { trim: false })
        .scroll((state.scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Articles ({count})")),
        );
    f.render_widget(p, body[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(12),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(body[1]);

    let overview = Paragraph::new(region_lines(page, anchors::ANALYSIS_RESULTS))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Overview"));
    f.render_widget(overview, right[0]);

    let chart_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(right[1]);
    let fallback_titles = ["Sentiment", "Entities", "Sources"];
    for ((id, title), slot) in anchors::CHART_REGIONS
        .iter()
        .zip(fallback_titles)
        .zip(chart_rows.iter())
    {
        charts::draw_plot(f, *slot, title, page.plot(id));
    }

    let wordcloud = match wordcloud_src(page) {
        Some(src) if src.starts_with("data:image/") => {
            format!("image embedded ({} bytes); export with Ctrl-E to view", src.len())
        }
        Some(src) if !src.is_empty() => src.to_string(),
        _ => "No word cloud yet".to_string(),
    };
    f.render_widget(
        Paragraph::new(wordcloud)
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL).title("Word Cloud")),
        right[2],
    );
}

fn draw_summarize(area: Rect, f: &mut ratatui::Frame, page: &Page, state: &UiState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8),
            Constraint::Length(error_height(page)),
            Constraint::Min(0),
        ])
        .split(area);

    let mut text = state.text.clone();
    text.push('▏');
    let form = Paragraph::new(text).wrap(Wrap { trim: false }).block(
        Block::default().borders(Borders::ALL).title(form_title(
            "Text Summarization",
            page,
            anchors::SUMMARIZATION_LOADING,
            "summarizing",
        )),
    );
    f.render_widget(form, rows[0]);
    draw_error(rows[1], f, page);

    let summary = Paragraph::new(region_lines(page, anchors::SUMMARY_RESULT))
        .wrap(Wrap { trim: false })
        .scroll((state.scroll, 0))
        .block(Block::default().borders(Borders::ALL).title("Summary"));
    f.render_widget(summary, rows[2]);
}

fn wordcloud_src(page: &Page) -> Option<&str> {
    page.children(anchors::WORDCLOUD_CONTAINER)
        .iter()
        .filter_map(|n| n.as_element())
        .find_map(|el| el.get_attr("src"))
}

/// Colour for a segment, chosen from the CSS class the renderer put on it.
fn class_style(class: Option<&str>) -> Style {
    let Some(class) = class else {
        return Style::default();
    };
    if class.contains("sentiment-positive") {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else if class.contains("sentiment-negative") {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else if class.contains("sentiment-") {
        Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD)
    } else if class.contains("article-title") {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else if class.contains("article-source") {
        Style::default().fg(Color::DarkGray)
    } else if class.contains("link-target") {
        Style::default().fg(Color::Cyan)
    } else if class.contains("topic-tag") {
        Style::default().fg(Color::Magenta)
    } else {
        Style::default()
    }
}

fn styled_line(line: &OutlineLine) -> Line<'static> {
    Line::from(
        line.segments
            .iter()
            .map(|s| Span::styled(s.text.clone(), class_style(s.class.as_deref())))
            .collect::<Vec<_>>(),
    )
}

fn region_lines(page: &Page, id: &str) -> Vec<Line<'static>> {
    page.outline(id).iter().map(styled_line).collect()
}

/// Article cards separated by blank lines.
fn article_lines(page: &Page) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (i, card) in page.children(anchors::ARTICLES_CONTAINER).iter().enumerate() {
        if i > 0 {
            lines.push(Line::from(""));
        }
        lines.extend(page::outline(std::slice::from_ref(card)).iter().map(styled_line));
    }
    lines
}
