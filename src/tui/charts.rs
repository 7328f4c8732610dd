use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
    Frame,
};
use serde_json::Value;

use crate::chart::PlotCall;

/// Category/value pairs of the first `bar` or `pie` trace of a plot.
///
/// Pie traces use `labels`/`values`. Bar traces use `x`/`y`, swapped when
/// `orientation` is `"h"`.
pub fn bar_series(plot: &PlotCall) -> Vec<(String, f64)> {
    for trace in plot.traces() {
        let kind = trace.get("type").and_then(Value::as_str).unwrap_or("bar");
        let (labels, values) = match kind {
            "pie" => (trace.get("labels"), trace.get("values")),
            "bar" if trace.get("orientation").and_then(Value::as_str) == Some("h") => {
                (trace.get("y"), trace.get("x"))
            }
            "bar" => (trace.get("x"), trace.get("y")),
            _ => continue,
        };
        let (Some(Value::Array(labels)), Some(Value::Array(values))) = (labels, values) else {
            continue;
        };
        return labels
            .iter()
            .zip(values)
            .filter_map(|(label, value)| Some((label_text(label), value.as_f64()?)))
            .collect();
    }
    Vec::new()
}

fn label_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn format_value(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

/// Draw a recorded plot as a bar chart, or a placeholder when nothing was drawn.
pub fn draw_plot(f: &mut Frame, area: Rect, fallback_title: &str, plot: Option<&PlotCall>) {
    let title = plot.and_then(PlotCall::title).unwrap_or(fallback_title);
    let block = Block::default().borders(Borders::ALL).title(title.to_string());

    let series = plot.map(bar_series).unwrap_or_default();
    if series.is_empty() {
        let msg = if plot.is_some() {
            "No bar or pie data"
        } else {
            "No data yet"
        };
        f.render_widget(
            Paragraph::new(msg)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Gray))
                .block(block),
            area,
        );
        return;
    }

    // Bar heights are integers; scale so the largest value fills the chart.
    let max = series.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let inner_width = area.width.saturating_sub(2) as usize;
    let bar_width = (inner_width / series.len()).saturating_sub(1).clamp(1, 12) as u16;

    let bars: Vec<Bar> = series
        .iter()
        .map(|(label, value)| {
            let height = if max > 0.0 {
                (value.max(0.0) / max * 100.0).round() as u64
            } else {
                0
            };
            let short: String = label.chars().take(bar_width as usize).collect();
            Bar::default()
                .value(height)
                .label(Line::from(short))
                .text_value(format_value(*value))
                .style(Style::default().fg(Color::Cyan))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1)
        .max(100);
    f.render_widget(chart, area);
}
