//! Standalone HTML export of a page.
//!
//! Regions are written under their anchor ids and every recorded plot becomes a
//! `Plotly.newPlot` call, so the file renders the same charts in a browser.

use super::{anchors, escape_text, Page};
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::Path;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.27.0.min.js";

const STYLE: &str = r#"
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif; margin: 2rem; color: #1f2933; }
.article-card { border: 1px solid #d9e2ec; border-radius: 8px; padding: 1rem; margin-bottom: 1rem; }
.article-header { display: flex; justify-content: space-between; gap: 1rem; }
.article-source { color: #627d98; font-size: 0.9rem; }
.article-sentiment { padding: 0.2rem 0.6rem; border-radius: 999px; font-size: 0.8rem; align-self: flex-start; }
.sentiment-positive { background: #e3f9e5; color: #207227; }
.sentiment-negative { background: #ffe3e3; color: #a61b1b; }
.sentiment-neutral { background: #f0f4f8; color: #486581; }
.topic-tag { display: inline-block; background: #e0e8f9; border-radius: 4px; padding: 0.2rem 0.5rem; margin: 0.2rem; }
.error { background: #ffe3e3; color: #a61b1b; padding: 1rem; border-radius: 8px; }
.loading { color: #627d98; }
.chart { min-height: 360px; }
"#;

/// Serialize the page as a complete HTML document.
pub fn render_document(page: &Page, title: &str) -> Result<String> {
    let mut out = String::new();
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>{}</title>\n<script src=\"{PLOTLY_CDN}\"></script>\n<style>{STYLE}</style>\n\
         </head>\n<body>\n<h1>{}</h1>\n",
        escape_text(title),
        escape_text(title)
    );

    region(&mut out, page, anchors::ERROR_MESSAGE, "error");
    out.push_str("<section>\n<h2>News Analysis</h2>\n");
    let _ = writeln!(
        out,
        "<form id=\"{}\"><input id=\"{}\" name=\"query\" placeholder=\"Search query\"> \
         <input id=\"{}\" name=\"url\" placeholder=\"Article URL\"> \
         <button type=\"submit\" disabled>Analyze</button></form>",
        anchors::ANALYZE_FORM,
        anchors::QUERY_INPUT,
        anchors::URL_INPUT
    );
    region(&mut out, page, anchors::ANALYSIS_LOADING, "loading");
    region(&mut out, page, anchors::ANALYSIS_RESULTS, "analysis");
    for id in anchors::CHART_REGIONS {
        region(&mut out, page, id, "chart");
    }
    region(&mut out, page, anchors::WORDCLOUD_CONTAINER, "wordcloud");
    region(&mut out, page, anchors::ARTICLES_CONTAINER, "articles");
    out.push_str("</section>\n<section>\n<h2>Text Summarization</h2>\n");
    let _ = writeln!(
        out,
        "<form id=\"{}\"><textarea id=\"{}\" name=\"text\" rows=\"6\"></textarea> \
         <button type=\"submit\" disabled>Summarize</button></form>",
        anchors::SUMMARIZE_FORM,
        anchors::TEXT_INPUT
    );
    region(&mut out, page, anchors::SUMMARIZATION_LOADING, "loading");
    region(&mut out, page, anchors::SUMMARY_RESULT, "summary");
    out.push_str("</section>\n");

    for id in anchors::CHART_REGIONS {
        if let Some(plot) = page.plot(id) {
            let _ = writeln!(
                out,
                "<script>Plotly.newPlot({}, {}, {}, {});</script>",
                script_json(&id)?,
                script_json(&plot.data)?,
                script_json(&plot.layout)?,
                script_json(&plot.config)?
            );
        }
    }

    out.push_str("</body>\n</html>\n");
    Ok(out)
}

pub fn write_document(path: &Path, page: &Page, title: &str) -> Result<()> {
    let html = render_document(page, title)?;
    std::fs::write(path, html).with_context(|| format!("write {}", path.display()))
}

fn region(out: &mut String, page: &Page, id: &str, class: &str) {
    let hidden = if page.is_visible(id) {
        ""
    } else {
        " style=\"display:none\""
    };
    let _ = write!(out, "<div id=\"{id}\" class=\"{class}\"{hidden}>");
    if id == anchors::ANALYSIS_LOADING || id == anchors::SUMMARIZATION_LOADING {
        out.push_str("Loading…");
    } else {
        out.push_str(&page.inner_html(id));
    }
    out.push_str("</div>\n");
}

/// JSON that is safe inside a `<script>` element: `<` can never open a closing tag.
fn script_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value).context("serialize plot payload")?;
    Ok(json.replace('<', "\\u003c"))
}
