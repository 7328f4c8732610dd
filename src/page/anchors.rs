//! Element ids shared with the page markup.

pub const ANALYZE_FORM: &str = "analyzeForm";
pub const SUMMARIZE_FORM: &str = "summarizeForm";
pub const QUERY_INPUT: &str = "query";
pub const URL_INPUT: &str = "url";
pub const TEXT_INPUT: &str = "textToSummarize";

pub const ANALYSIS_LOADING: &str = "analysisLoading";
pub const SUMMARIZATION_LOADING: &str = "summarizationLoading";
pub const ERROR_MESSAGE: &str = "errorMessage";

pub const ARTICLES_CONTAINER: &str = "articlesContainer";
pub const SENTIMENT_CHART: &str = "sentimentChart";
pub const ENTITY_CHART: &str = "entityChart";
pub const SOURCE_CHART: &str = "sourceChart";
pub const WORDCLOUD_CONTAINER: &str = "wordcloudContainer";
pub const ANALYSIS_RESULTS: &str = "analysisResults";
pub const SUMMARY_RESULT: &str = "summaryResult";

/// Regions the client writes to.
pub const REGIONS: &[&str] = &[
    ANALYSIS_LOADING,
    SUMMARIZATION_LOADING,
    ERROR_MESSAGE,
    ARTICLES_CONTAINER,
    SENTIMENT_CHART,
    ENTITY_CHART,
    SOURCE_CHART,
    WORDCLOUD_CONTAINER,
    ANALYSIS_RESULTS,
    SUMMARY_RESULT,
];

pub const HIDDEN_ON_LOAD: &[&str] = &[ANALYSIS_LOADING, SUMMARIZATION_LOADING, ERROR_MESSAGE];

pub const CHART_REGIONS: &[&str] = &[SENTIMENT_CHART, ENTITY_CHART, SOURCE_CHART];
