//! Result renderer: turns parsed payloads into page content.
//!
//! Nothing here touches the network or controller state. Every backend string enters
//! the page as a text node or an escaped attribute value.

pub mod format;

use crate::model::{AnalysisResult, AnalysisSummary, Article, SentimentCounts, SummarizationResult};
use crate::page::{anchors, safe_href, safe_image_src, Element, Node, Page};

/// Topics shown in the overview, taken from the front of the backend's ordering.
pub const MAX_TOPICS: usize = 5;

/// Render articles, word cloud and overview for one analysis result.
///
/// Charts are drawn separately by [`crate::chart::ChartSet`].
pub fn render_analysis(page: &mut Page, result: &AnalysisResult) {
    render_articles(page, &result.articles);
    render_wordcloud(page, &result.visualizations.wordcloud);
    render_overview(page, &result.analysis, &result.sentiment_stats);
}

pub fn render_articles(page: &mut Page, articles: &[Article]) {
    page.clear(anchors::ARTICLES_CONTAINER);
    for article in articles {
        page.append(anchors::ARTICLES_CONTAINER, article_card(article));
    }
}

pub fn article_card(article: &Article) -> Element {
    let category = article.sentiment.category();
    let byline = format!(
        "{} \u{2022} {}",
        article.source,
        format::publish_date(article.publish_date.as_deref())
    );

    Element::new("div")
        .class("article-card")
        .child(
            Element::new("div")
                .class("article-header")
                .child(
                    Element::new("div")
                        .child(Element::new("h3").class("article-title").text(&article.title))
                        .child(Element::new("p").class("article-source").text(byline)),
                )
                .child(
                    Element::new("span")
                        .class(format!("article-sentiment sentiment-{category}"))
                        .attr("data-sentiment", category)
                        .text(&article.sentiment.label),
                ),
        )
        .child(Element::new("p").class("article-summary").text(&article.summary))
        .child(
            Element::new("a")
                .attr("href", safe_href(&article.url))
                .attr("target", "_blank")
                .attr("rel", "noopener noreferrer")
                .class("article-link")
                .text("Read full article"),
        )
}

pub fn render_wordcloud(page: &mut Page, src: &str) {
    let img = Element::new("img")
        .attr("src", safe_image_src(src))
        .attr("alt", "Word Cloud");
    page.replace(anchors::WORDCLOUD_CONTAINER, vec![img.into()]);
}

pub fn render_overview(page: &mut Page, analysis: &AnalysisSummary, stats: &SentimentCounts) {
    let overview = Element::new("div")
        .class("analysis-section")
        .child(Element::new("h3").text("Analysis Overview"))
        .child(para(format!("Total Articles: {}", analysis.total_articles)))
        .child(para(format!(
            "Total Words Processed: {}",
            format::group_thousands(analysis.total_words)
        )))
        .child(para(format!("Positive Sentiment: {}", stats.positive_count)))
        .child(para(format!("Negative Sentiment: {}", stats.negative_count)))
        .child(para(format!("Neutral Sentiment: {}", stats.neutral_count)));

    let topics = analysis
        .topics
        .iter()
        .take(MAX_TOPICS)
        .fold(Element::new("div").class("topics-list"), |list, (topic, count)| {
            list.child(
                Element::new("span")
                    .class("topic-tag")
                    .text(format!("{topic} ({count})")),
            )
        });
    let key_topics = Element::new("div")
        .class("analysis-section")
        .child(Element::new("h4").text("Key Topics"))
        .child(topics);

    page.replace(anchors::ANALYSIS_RESULTS, vec![overview.into(), key_topics.into()]);
}

pub fn render_summary(page: &mut Page, result: &SummarizationResult) {
    let stats = Element::new("div")
        .class("summary-stats")
        .child(para(format!(
            "Original length: {} words",
            format::word_count(&result.original_text)
        )))
        .child(para(format!(
            "Summary length: {} words",
            format::word_count(&result.summary)
        )));
    page.replace(
        anchors::SUMMARY_RESULT,
        vec![
            Element::new("h3").text("Summary").into(),
            Element::new("p").text(&result.summary).into(),
            stats.into(),
        ],
    );
}

fn para(text: String) -> Node {
    Element::new("p").text(text).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Sentiment, Topics, VisualizationSet};

    fn article(title: &str, label: &str) -> Article {
        Article {
            title: title.into(),
            source: "Wire".into(),
            publish_date: Some("2024-03-05T14:30:00".into()),
            sentiment: Sentiment {
                label: label.into(),
                score: 0.8,
            },
            summary: format!("{title} summary"),
            url: "https://news.example/a".into(),
        }
    }

    fn result(articles: Vec<Article>, topics: Topics) -> AnalysisResult {
        AnalysisResult {
            articles,
            visualizations: VisualizationSet {
                sentiment_chart: "{}".into(),
                entity_chart: "{}".into(),
                source_chart: "{}".into(),
                wordcloud: "data:image/png;base64,AAAA".into(),
            },
            analysis: AnalysisSummary {
                total_articles: 2,
                total_words: 12345,
                topics,
            },
            sentiment_stats: SentimentCounts {
                positive_count: 3,
                negative_count: 1,
                neutral_count: 2,
            },
        }
    }

    fn titles(page: &Page) -> Vec<String> {
        page.find_by_class(anchors::ARTICLES_CONTAINER, "article-title")
            .into_iter()
            .map(|el| Node::from(el.clone()).text_content())
            .collect()
    }

    #[test]
    fn one_card_per_article_in_order_without_accumulating() {
        let mut page = Page::new();
        let r = result(
            vec![article("B", "POSITIVE"), article("A", "NEGATIVE"), article("C", "NEUTRAL")],
            Topics::default(),
        );
        render_analysis(&mut page, &r);
        render_analysis(&mut page, &r);
        assert_eq!(page.children(anchors::ARTICLES_CONTAINER).len(), 3);
        assert_eq!(titles(&page), vec!["B", "A", "C"]);
    }

    #[test]
    fn empty_article_list_clears_container() {
        let mut page = Page::new();
        render_analysis(&mut page, &result(vec![article("A", "POSITIVE")], Topics::default()));
        render_analysis(&mut page, &result(Vec::new(), Topics::default()));
        assert!(page.children(anchors::ARTICLES_CONTAINER).is_empty());
    }

    #[test]
    fn sentiment_category_is_lowercased_label() {
        let mut page = Page::new();
        let labels = ["POSITIVE", "Negative", "neutral", "Mixed Feelings"];
        let articles = labels.iter().map(|l| article("t", l)).collect();
        render_analysis(&mut page, &result(articles, Topics::default()));
        let tags = page.find_by_class(anchors::ARTICLES_CONTAINER, "article-sentiment");
        assert_eq!(tags.len(), labels.len());
        for (tag, label) in tags.iter().zip(labels) {
            assert_eq!(tag.get_attr("data-sentiment"), Some(label.to_lowercase().as_str()));
            assert!(tag
                .get_attr("class")
                .unwrap()
                .ends_with(&format!("sentiment-{}", label.to_lowercase())));
            assert_eq!(Node::from((*tag).clone()).text_content(), label);
        }
    }

    #[test]
    fn markup_in_title_renders_as_literal_text() {
        let mut page = Page::new();
        let mut a = article("<img src=x onerror=alert(1)>", "POSITIVE");
        a.url = "javascript:alert(1)".into();
        render_analysis(&mut page, &result(vec![a], Topics::default()));
        let html = page.inner_html(anchors::ARTICLES_CONTAINER);
        assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"));
        assert!(!html.contains("<img src=x"));
        assert!(html.contains("href=\"#\""));
        assert_eq!(titles(&page), vec!["<img src=x onerror=alert(1)>"]);
    }

    #[test]
    fn overview_shows_counts_and_grouped_words() {
        let mut page = Page::new();
        render_analysis(&mut page, &result(Vec::new(), Topics::default()));
        let lines: Vec<String> = page
            .outline(anchors::ANALYSIS_RESULTS)
            .iter()
            .map(|l| l.plain())
            .collect();
        assert!(lines.contains(&"Total Articles: 2".to_string()));
        assert!(lines.contains(&"Total Words Processed: 12,345".to_string()));
        assert!(lines.contains(&"Positive Sentiment: 3".to_string()));
        assert!(lines.contains(&"Negative Sentiment: 1".to_string()));
        assert!(lines.contains(&"Neutral Sentiment: 2".to_string()));
    }

    #[test]
    fn topics_are_first_five_in_backend_order() {
        let mut page = Page::new();
        let topics: Topics = [("low", 1), ("high", 9), ("mid", 5), ("d", 2), ("e", 7), ("f", 8)]
            .into_iter()
            .map(|(n, c)| (n.to_string(), c))
            .collect();
        render_analysis(&mut page, &result(Vec::new(), topics));
        let tags: Vec<String> = page
            .find_by_class(anchors::ANALYSIS_RESULTS, "topic-tag")
            .into_iter()
            .map(|el| Node::from(el.clone()).text_content())
            .collect();
        assert_eq!(tags, vec!["low (1)", "high (9)", "mid (5)", "d (2)", "e (7)"]);
    }

    #[test]
    fn wordcloud_is_an_image() {
        let mut page = Page::new();
        render_analysis(&mut page, &result(Vec::new(), Topics::default()));
        assert_eq!(
            page.inner_html(anchors::WORDCLOUD_CONTAINER),
            "<img src=\"data:image/png;base64,AAAA\" alt=\"Word Cloud\">"
        );
    }

    #[test]
    fn summary_word_counts() {
        let mut page = Page::new();
        render_summary(
            &mut page,
            &SummarizationResult {
                original_text: "The quick brown fox".into(),
                summary: "Quick fox".into(),
            },
        );
        let lines: Vec<String> = page
            .outline(anchors::SUMMARY_RESULT)
            .iter()
            .map(|l| l.plain())
            .collect();
        assert_eq!(
            lines,
            vec![
                "Summary",
                "Quick fox",
                "Original length: 4 words",
                "Summary length: 2 words"
            ]
        );
    }

    #[test]
    fn empty_original_text_counts_one_word() {
        let mut page = Page::new();
        render_summary(
            &mut page,
            &SummarizationResult {
                original_text: String::new(),
                summary: "x".into(),
            },
        );
        assert!(page
            .text_content(anchors::SUMMARY_RESULT)
            .contains("Original length: 1 words"));
    }
}
