//! Operation controllers.
//!
//! One controller per operation kind owns the request/response lifecycle: loading
//! indicator, request, and either rendering or the shared error banner.

use crate::backend::{Transport, TransportError};
use crate::chart::{ChartParseError, ChartSet};
use crate::model::{
    AnalysisResult, AnalyzeForm, OperationKind, OperationState, SummarizationResult,
    SummarizeForm,
};
use crate::page::{self, anchors, Page, SharedPage};
use crate::render;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, info, warn};

/// A kind of request the page can submit.
pub trait Operation: Send + Sync + 'static {
    const KIND: OperationKind;
    type Form: Serialize + Send + Sync;
    type Response: DeserializeOwned + Send;

    /// Draw a parsed response. Must leave the page untouched when it returns an error.
    fn render(page: &mut Page, response: Self::Response) -> Result<(), ShapeError>;
}

pub struct Analysis;

impl Operation for Analysis {
    const KIND: OperationKind = OperationKind::Analysis;
    type Form = AnalyzeForm;
    type Response = AnalysisResult;

    fn render(page: &mut Page, response: AnalysisResult) -> Result<(), ShapeError> {
        let charts = ChartSet::from_visualizations(&response.visualizations)?;
        render::render_analysis(page, &response);
        charts.render(page);
        Ok(())
    }
}

pub struct Summarization;

impl Operation for Summarization {
    const KIND: OperationKind = OperationKind::Summarization;
    type Form = SummarizeForm;
    type Response = SummarizationResult;

    fn render(page: &mut Page, response: SummarizationResult) -> Result<(), ShapeError> {
        render::render_summary(page, &response);
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("response body does not match the expected shape: {0}")]
    Body(#[from] serde_json::Error),

    #[error(transparent)]
    Chart(#[from] ChartParseError),
}

#[derive(Debug, Error)]
pub enum OperationError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("server responded with HTTP {status}")]
    Status {
        status: u16,
        message: Option<String>,
    },

    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error("could not encode request body: {0}")]
    Encode(serde_json::Error),
}

impl OperationError {
    /// Message for the error banner: the server's `error` field when it sent one,
    /// otherwise the fixed fallback for the operation.
    pub fn user_message(&self, kind: OperationKind) -> String {
        match self {
            OperationError::Status {
                message: Some(m), ..
            } => m.clone(),
            _ => kind.fallback_message().to_string(),
        }
    }
}

/// Non-empty string `error` member of a failure body, if any.
fn server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .as_str()
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// How a submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// The submission was the latest of its kind and its outcome is on the page.
    Applied(OperationState),
    /// A newer submission of the same kind started first; the outcome was discarded.
    Superseded,
}

pub struct OperationController<O: Operation> {
    transport: Arc<dyn Transport>,
    page: SharedPage,
    issued: AtomicU64,
    state: Mutex<OperationState>,
    _op: PhantomData<fn() -> O>,
}

impl<O: Operation> OperationController<O> {
    pub fn new(transport: Arc<dyn Transport>, page: SharedPage) -> Self {
        Self {
            transport,
            page,
            issued: AtomicU64::new(0),
            state: Mutex::new(OperationState::Idle),
            _op: PhantomData,
        }
    }

    pub fn state(&self) -> OperationState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, state: OperationState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
    }

    // Callers hold the page lock, which also orders sequence numbers.
    fn is_latest(&self, seq: u64) -> bool {
        self.issued.load(Ordering::SeqCst) == seq
    }

    /// Submit one form and wait for its single response.
    ///
    /// Only the most recently started submission of this kind may change the page.
    pub async fn submit(&self, form: O::Form) -> Submission {
        let kind = O::KIND;
        let seq = {
            let mut page = page::lock(&self.page);
            let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
            page.hide(anchors::ERROR_MESSAGE);
            page.show(kind.loading_anchor());
            self.set_state(OperationState::Loading);
            seq
        };
        info!(%kind, seq, "submitting");

        let mut guard = LoadingGuard {
            controller: self,
            seq,
            armed: true,
        };
        let outcome = self.execute(&form).await;
        guard.armed = false;

        let mut page = page::lock(&self.page);
        if !self.is_latest(seq) {
            debug!(%kind, seq, "discarding superseded response");
            return Submission::Superseded;
        }
        page.hide(kind.loading_anchor());
        let state = match outcome.and_then(|response| {
            O::render(&mut page, response).map_err(OperationError::from)
        }) {
            Ok(()) => {
                info!(%kind, seq, "rendered");
                OperationState::Succeeded
            }
            Err(err) => {
                warn!(%kind, seq, error = %err, "operation failed");
                page.set_text(anchors::ERROR_MESSAGE, &err.user_message(kind));
                page.show(anchors::ERROR_MESSAGE);
                OperationState::Failed
            }
        };
        self.set_state(state);
        Submission::Applied(state)
    }

    async fn execute(&self, form: &O::Form) -> Result<O::Response, OperationError> {
        let body = serde_json::to_value(form).map_err(OperationError::Encode)?;
        let reply = self.transport.post_json(O::KIND.endpoint(), body).await?;
        if !reply.is_success() {
            return Err(OperationError::Status {
                status: reply.status,
                message: server_message(&reply.body),
            });
        }
        let response = serde_json::from_str(&reply.body).map_err(ShapeError::from)?;
        Ok(response)
    }
}

/// Hides the loading indicator when a submission future is dropped before it resolves.
struct LoadingGuard<'a, O: Operation> {
    controller: &'a OperationController<O>,
    seq: u64,
    armed: bool,
}

impl<O: Operation> Drop for LoadingGuard<'_, O> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut page = page::lock(&self.controller.page);
        if self.controller.is_latest(self.seq) {
            page.hide(O::KIND.loading_anchor());
            self.controller.set_state(OperationState::Idle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{analysis_body, ok, summary_body, ScriptedTransport};
    use futures::FutureExt;
    use serde_json::json;

    fn analysis(transport: &Arc<ScriptedTransport>, page: &SharedPage) -> OperationController<Analysis> {
        OperationController::new(transport.clone(), page.clone())
    }

    fn summarization(
        transport: &Arc<ScriptedTransport>,
        page: &SharedPage,
    ) -> OperationController<Summarization> {
        OperationController::new(transport.clone(), page.clone())
    }

    fn form(query: &str) -> AnalyzeForm {
        AnalyzeForm {
            query: query.into(),
            url: String::new(),
        }
    }

    #[tokio::test]
    async fn forwards_form_values_as_json() {
        let transport = ScriptedTransport::new();
        let page = Page::shared();
        transport.reply(200, analysis_body(&[]));
        transport.reply(200, summary_body("", ""));

        analysis(&transport, &page)
            .submit(AnalyzeForm {
                query: "  ".into(),
                url: "https://news.example/a".into(),
            })
            .await;
        summarization(&transport, &page)
            .submit(SummarizeForm { text: String::new() })
            .await;

        assert_eq!(
            transport.requests(),
            vec![
                (
                    "/analyze".to_string(),
                    json!({"query": "  ", "url": "https://news.example/a"})
                ),
                ("/summarize".to_string(), json!({"text": ""})),
            ]
        );
    }

    #[tokio::test]
    async fn loading_visible_only_while_in_flight() {
        let transport = ScriptedTransport::new();
        let page = Page::shared();
        let ctrl = analysis(&transport, &page);
        let reply = transport.deferred();

        assert!(!page::lock(&page).is_visible(anchors::ANALYSIS_LOADING));
        let mut fut = Box::pin(ctrl.submit(form("climate")));
        assert!(futures::poll!(&mut fut).is_pending());
        assert!(page::lock(&page).is_visible(anchors::ANALYSIS_LOADING));
        assert_eq!(ctrl.state(), OperationState::Loading);

        reply.send(ok(analysis_body(&["One"]))).unwrap();
        assert_eq!(fut.await, Submission::Applied(OperationState::Succeeded));
        assert!(!page::lock(&page).is_visible(anchors::ANALYSIS_LOADING));
        assert_eq!(ctrl.state(), OperationState::Succeeded);
    }

    #[tokio::test]
    async fn loading_hidden_after_failure() {
        let transport = ScriptedTransport::new();
        let page = Page::shared();
        let ctrl = summarization(&transport, &page);
        transport.connection_refused();

        let outcome = ctrl.submit(SummarizeForm { text: "x".into() }).await;

        assert_eq!(outcome, Submission::Applied(OperationState::Failed));
        let page = page::lock(&page);
        assert!(!page.is_visible(anchors::SUMMARIZATION_LOADING));
        assert_eq!(page.error_message().as_deref(), Some("Summarization failed"));
    }

    #[tokio::test]
    async fn server_error_message_is_shown() {
        let transport = ScriptedTransport::new();
        let page = Page::shared();
        transport.reply(400, r#"{"error": "Invalid URL"}"#);

        analysis(&transport, &page).submit(form("")).await;

        assert_eq!(page::lock(&page).error_message().as_deref(), Some("Invalid URL"));
    }

    #[tokio::test]
    async fn missing_error_field_uses_fallback() {
        let transport = ScriptedTransport::new();
        let page = Page::shared();
        transport.reply(500, r#"{"detail": "boom"}"#);
        transport.reply(502, "<html>Bad Gateway</html>");
        transport.reply(400, r#"{"error": ""}"#);
        let ctrl = analysis(&transport, &page);

        for _ in 0..3 {
            assert_eq!(
                ctrl.submit(form("q")).await,
                Submission::Applied(OperationState::Failed)
            );
            assert_eq!(
                page::lock(&page).error_message().as_deref(),
                Some("Analysis failed")
            );
        }
    }

    #[tokio::test]
    async fn malformed_success_body_renders_nothing() {
        let transport = ScriptedTransport::new();
        let page = Page::shared();
        let ctrl = analysis(&transport, &page);
        transport.reply(200, analysis_body(&["Kept"]));
        ctrl.submit(form("first")).await;

        // Valid JSON with one chart that is not a figure: all-or-nothing.
        let mut broken: Value = serde_json::from_str(&analysis_body(&["New"])).unwrap();
        broken["visualizations"]["source_chart"] = json!("{not a figure");
        transport.reply(200, broken.to_string());
        assert_eq!(
            ctrl.submit(form("second")).await,
            Submission::Applied(OperationState::Failed)
        );

        // Missing fields entirely.
        transport.reply(200, r#"{"articles": []}"#);
        ctrl.submit(form("third")).await;

        let page = page::lock(&page);
        assert_eq!(page.error_message().as_deref(), Some("Analysis failed"));
        let titles = page.find_by_class(anchors::ARTICLES_CONTAINER, "article-title");
        assert_eq!(titles.len(), 1);
        assert!(page
            .text_content(anchors::ARTICLES_CONTAINER)
            .contains("Kept"));
    }

    #[tokio::test]
    async fn success_renders_overview_and_charts() {
        let transport = ScriptedTransport::new();
        let page = Page::shared();
        transport.reply(200, analysis_body(&["A", "B"]));

        analysis(&transport, &page).submit(form("q")).await;

        let page = page::lock(&page);
        let overview = page.text_content(anchors::ANALYSIS_RESULTS);
        assert!(overview.contains("Total Articles: 2"));
        assert!(overview.contains("Positive Sentiment: 3"));
        assert!(overview.contains("Negative Sentiment: 1"));
        assert!(overview.contains("Neutral Sentiment: 2"));
        for region in anchors::CHART_REGIONS {
            assert!(page.plot(region).is_some(), "{region} not plotted");
        }
        assert_eq!(
            page.plot(anchors::SENTIMENT_CHART).and_then(|p| p.title()),
            Some("Sentiment Distribution")
        );
        assert!(!page.children(anchors::WORDCLOUD_CONTAINER).is_empty());
    }

    #[tokio::test]
    async fn new_submission_hides_previous_error() {
        let transport = ScriptedTransport::new();
        let page = Page::shared();
        transport.reply(400, r#"{"error": "No text provided"}"#);
        let summarize = summarization(&transport, &page);
        summarize.submit(SummarizeForm::default()).await;
        assert!(page::lock(&page).error_message().is_some());

        let reply = transport.deferred();
        let ctrl = analysis(&transport, &page);
        let mut fut = Box::pin(ctrl.submit(form("q")));
        assert!(futures::poll!(&mut fut).is_pending());
        assert_eq!(page::lock(&page).error_message(), None);

        reply.send(ok(analysis_body(&[]))).unwrap();
        fut.await;
        assert_eq!(page::lock(&page).error_message(), None);
        // The other kind keeps its own state.
        assert_eq!(summarize.state(), OperationState::Failed);
    }

    #[tokio::test]
    async fn kinds_do_not_share_loading_state() {
        let transport = ScriptedTransport::new();
        let page = Page::shared();
        let analyze = analysis(&transport, &page);
        let summarize = summarization(&transport, &page);
        let analysis_reply = transport.deferred();
        transport.reply(200, summary_body("The quick brown fox", "Quick fox"));

        let mut pending = Box::pin(analyze.submit(form("q")));
        assert!(futures::poll!(&mut pending).is_pending());

        let done = summarize
            .submit(SummarizeForm {
                text: "The quick brown fox".into(),
            })
            .await;
        assert_eq!(done, Submission::Applied(OperationState::Succeeded));
        {
            let page = page::lock(&page);
            assert!(page.is_visible(anchors::ANALYSIS_LOADING));
            assert!(!page.is_visible(anchors::SUMMARIZATION_LOADING));
            assert!(page.children(anchors::ARTICLES_CONTAINER).is_empty());
            assert!(page
                .text_content(anchors::SUMMARY_RESULT)
                .contains("Original length: 4 words"));
        }
        assert_eq!(analyze.state(), OperationState::Loading);

        analysis_reply.send(ok(analysis_body(&["A"]))).unwrap();
        pending.await;
        assert_eq!(analyze.state(), OperationState::Succeeded);
        assert!(page::lock(&page)
            .text_content(anchors::SUMMARY_RESULT)
            .contains("Summary length: 2 words"));
    }

    #[tokio::test]
    async fn stale_response_is_discarded() {
        let transport = ScriptedTransport::new();
        let page = Page::shared();
        let ctrl = analysis(&transport, &page);
        let first_reply = transport.deferred();
        let second_reply = transport.deferred();

        let mut first = Box::pin(ctrl.submit(form("old")));
        assert!(futures::poll!(&mut first).is_pending());
        let mut second = Box::pin(ctrl.submit(form("new")));
        assert!(futures::poll!(&mut second).is_pending());

        second_reply.send(ok(analysis_body(&["Newest"]))).unwrap();
        assert_eq!(second.await, Submission::Applied(OperationState::Succeeded));

        first_reply.send(ok(analysis_body(&["Stale", "Stale"]))).unwrap();
        assert_eq!(first.await, Submission::Superseded);

        let page = page::lock(&page);
        assert_eq!(page.find_by_class(anchors::ARTICLES_CONTAINER, "article-card").len(), 1);
        assert!(page.text_content(anchors::ARTICLES_CONTAINER).contains("Newest"));
        assert!(!page.is_visible(anchors::ANALYSIS_LOADING));
    }

    #[tokio::test]
    async fn stale_failure_does_not_hide_newer_loading() {
        let transport = ScriptedTransport::new();
        let page = Page::shared();
        let ctrl = analysis(&transport, &page);
        let first_reply = transport.deferred();
        let second_reply = transport.deferred();

        let mut first = Box::pin(ctrl.submit(form("old")));
        assert!(futures::poll!(&mut first).is_pending());
        let mut second = Box::pin(ctrl.submit(form("new")));
        assert!(futures::poll!(&mut second).is_pending());

        first_reply
            .send(ok(r#"{"unexpected": true}"#.to_string()))
            .unwrap();
        assert_eq!(first.await, Submission::Superseded);
        {
            let page = page::lock(&page);
            assert!(page.is_visible(anchors::ANALYSIS_LOADING));
            assert_eq!(page.error_message(), None);
        }

        second_reply.send(ok(analysis_body(&[]))).unwrap();
        second.await;
        assert!(!page::lock(&page).is_visible(anchors::ANALYSIS_LOADING));
    }

    #[tokio::test]
    async fn dropped_submission_clears_loading() {
        let transport = ScriptedTransport::new();
        let page = Page::shared();
        let ctrl = analysis(&transport, &page);
        let _reply = transport.deferred();

        let mut fut = ctrl.submit(form("q")).boxed();
        assert!(futures::poll!(&mut fut).is_pending());
        drop(fut);

        assert!(!page::lock(&page).is_visible(anchors::ANALYSIS_LOADING));
        assert_eq!(ctrl.state(), OperationState::Idle);
    }

    #[test]
    fn server_message_requires_non_empty_string() {
        assert_eq!(server_message(r#"{"error":"Invalid URL"}"#).as_deref(), Some("Invalid URL"));
        assert_eq!(server_message(r#"{"error":""}"#), None);
        assert_eq!(server_message(r#"{"error":{"code":1}}"#), None);
        assert_eq!(server_message("not json"), None);
    }
}
