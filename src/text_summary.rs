//! Text summary builder for CLI output.
//!
//! Flattens the settled page into human-readable lines for text mode.

use crate::chart::PlotCall;
use crate::page::{anchors, Page};

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

fn chart_line(id: &str, plot: &PlotCall) -> String {
    let title = plot.title().unwrap_or(id);
    let kinds: Vec<&str> = plot
        .traces()
        .iter()
        .filter_map(|t| t.get("type").and_then(|v| v.as_str()))
        .collect();
    if kinds.is_empty() {
        format!("Chart: {title} ({} traces)", plot.traces().len())
    } else {
        format!(
            "Chart: {title} ({} traces: {})",
            plot.traces().len(),
            kinds.join(", ")
        )
    }
}

fn section(lines: &mut Vec<String>, heading: &str, page: &Page, id: &str) {
    let outline = page.outline(id);
    if outline.is_empty() {
        return;
    }
    lines.push(format!("== {heading} =="));
    lines.extend(outline.iter().map(|l| l.plain()));
}

/// Build a text summary from the regions of a settled page.
pub(crate) fn build_text_summary(page: &Page) -> TextSummary {
    let mut lines = Vec::new();

    if let Some(message) = page.error_message() {
        lines.push(format!("Error: {message}"));
    }

    let articles = page.find_by_class(anchors::ARTICLES_CONTAINER, "article-card");
    if !articles.is_empty() {
        lines.push(format!("== Articles ({}) ==", articles.len()));
        lines.extend(page.outline(anchors::ARTICLES_CONTAINER).iter().map(|l| l.plain()));
    }

    section(&mut lines, "Overview", page, anchors::ANALYSIS_RESULTS);

    let charts: Vec<String> = anchors::CHART_REGIONS
        .iter()
        .filter_map(|id| page.plot(id).map(|plot| chart_line(id, plot)))
        .collect();
    if !charts.is_empty() {
        lines.push("== Charts ==".into());
        lines.extend(charts);
    }

    if let Some(src) = page
        .children(anchors::WORDCLOUD_CONTAINER)
        .iter()
        .filter_map(|n| n.as_element())
        .find_map(|el| el.get_attr("src"))
    {
        if !src.is_empty() {
            lines.push(format!("Word cloud: image ({} bytes)", src.len()));
        }
    }

    section(&mut lines, "Summary", page, anchors::SUMMARY_RESULT);

    TextSummary { lines }
}
