use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::path::Path;

fn keybind(key: &'static str, pad: usize, what: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key, Style::default().fg(Color::Magenta)),
        Span::raw(format!("{}{what}", " ".repeat(pad))),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame, base_url: &str, log_path: Option<&Path>) {
    let mut lines = vec![
        Line::from("Keybinds:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("Esc", Style::default().fg(Color::Magenta)),
            Span::raw(" / "),
            Span::styled("Ctrl-C", Style::default().fg(Color::Magenta)),
            Span::raw("  Quit"),
        ]),
        keybind("tab", 9, "Switch tabs"),
        keybind("F1", 10, "Show this help"),
        keybind("Enter", 7, "Submit the form of the current tab"),
        keybind("↑/↓", 9, "Switch between query and URL (Analyze)"),
        keybind("Ctrl-U", 6, "Clear the focused field"),
        keybind("PgUp/PgDn", 3, "Scroll results"),
        keybind("Ctrl-E", 6, "Export the page as HTML"),
        keybind("Ctrl-Y", 6, "Copy exported path to clipboard"),
        Line::from(""),
        Line::from("Analyze tab:"),
        Line::from("  A non-empty URL is analyzed in place of the query."),
        Line::from("  Both fields are sent exactly as typed."),
        Line::from(""),
        Line::from("Service:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(base_url.to_string(), Style::default().fg(Color::Cyan)),
        ]),
    ];
    if let Some(path) = log_path {
        lines.push(Line::from(""));
        lines.push(Line::from("Log file:"));
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(path.display().to_string(), Style::default().fg(Color::Cyan)),
        ]));
    }

    let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, area);
}
