use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_agent: String,
    #[serde(default, with = "humantime_serde")]
    pub request_timeout: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    Analysis,
    Summarization,
}

impl OperationKind {
    /// Backend path the operation posts to.
    pub fn endpoint(self) -> &'static str {
        match self {
            OperationKind::Analysis => "/analyze",
            OperationKind::Summarization => "/summarize",
        }
    }

    pub fn loading_anchor(self) -> &'static str {
        match self {
            OperationKind::Analysis => crate::page::anchors::ANALYSIS_LOADING,
            OperationKind::Summarization => crate::page::anchors::SUMMARIZATION_LOADING,
        }
    }

    /// Message shown when the backend does not supply one.
    pub fn fallback_message(self) -> &'static str {
        match self {
            OperationKind::Analysis => "Analysis failed",
            OperationKind::Summarization => "Summarization failed",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Analysis => f.write_str("analysis"),
            OperationKind::Summarization => f.write_str("summarization"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationState {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// Body of `POST /analyze`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeForm {
    pub query: String,
    pub url: String,
}

/// Body of `POST /summarize`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizeForm {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub articles: Vec<Article>,
    pub visualizations: VisualizationSet,
    pub analysis: AnalysisSummary,
    pub sentiment_stats: SentimentCounts,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub source: String,
    // The backend sends null when the article has no date.
    #[serde(default)]
    pub publish_date: Option<String>,
    pub sentiment: Sentiment,
    pub summary: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: String,
    pub score: f64,
}

impl Sentiment {
    /// CSS-style category tag: the label, lowercased, with no validation.
    pub fn category(&self) -> String {
        self.label.to_lowercase()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualizationSet {
    pub sentiment_chart: String,
    pub entity_chart: String,
    pub source_chart: String,
    pub wordcloud: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_articles: u64,
    pub total_words: u64,
    pub topics: Topics,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentCounts {
    pub positive_count: u64,
    pub negative_count: u64,
    pub neutral_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizationResult {
    pub original_text: String,
    pub summary: String,
}

/// Topic name to occurrence count, in the order the backend sent them.
///
/// A JSON object is read entry by entry so the backend ordering survives. A repeated
/// key keeps its first position and takes the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topics(Vec<(String, u64)>);

impl Topics {
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(name, count)| (name.as_str(), *count))
    }

    fn insert(&mut self, name: String, count: u64) {
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = count,
            None => self.0.push((name, count)),
        }
    }
}

impl FromIterator<(String, u64)> for Topics {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        let mut topics = Topics::default();
        for (name, count) in iter {
            topics.insert(name, count);
        }
        topics
    }
}

impl Serialize for Topics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, count) in &self.0 {
            map.serialize_entry(name, count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Topics {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TopicsVisitor;

        impl<'de> Visitor<'de> for TopicsVisitor {
            type Value = Topics;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of topic names to counts")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Topics, A::Error> {
                let mut topics = Topics::default();
                while let Some((name, count)) = map.next_entry::<String, u64>()? {
                    topics.insert(name, count);
                }
                Ok(topics)
            }
        }

        deserializer.deserialize_map(TopicsVisitor)
    }
}
