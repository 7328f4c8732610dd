//! In-memory transport and payload fixtures for controller and shell tests.

use crate::backend::{HttpReply, Transport, TransportError};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

type PendingReply = oneshot::Receiver<Result<HttpReply, TransportError>>;
pub type ReplySender = oneshot::Sender<Result<HttpReply, TransportError>>;

/// Answers requests in arrival order from a queue of scripted replies.
#[derive(Default)]
pub struct ScriptedTransport {
    pending: Mutex<VecDeque<PendingReply>>,
    requests: Mutex<Vec<(String, Value)>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a reply that is available immediately.
    pub fn reply(&self, status: u16, body: impl Into<String>) {
        let tx = self.deferred();
        let _ = tx.send(Ok(HttpReply {
            status,
            body: body.into(),
        }));
    }

    pub fn connection_refused(&self) {
        let tx = self.deferred();
        let _ = tx.send(Err(TransportError::Connect {
            url: "http://127.0.0.1:5000".into(),
            message: "connection refused".into(),
        }));
    }

    /// Queue a reply that stays in flight until the returned sender fires.
    pub fn deferred(&self) -> ReplySender {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().push_back(rx);
        tx
    }

    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post_json(&self, path: &str, body: Value) -> Result<HttpReply, TransportError> {
        self.requests.lock().unwrap().push((path.to_string(), body));
        let rx = self
            .pending
            .lock()
            .unwrap()
            .pop_front()
            .expect("request without a scripted reply");
        rx.await.expect("scripted reply dropped")
    }
}

pub fn ok(body: impl Into<String>) -> Result<HttpReply, TransportError> {
    Ok(HttpReply {
        status: 200,
        body: body.into(),
    })
}

fn chart(kind: &str, title: &str) -> String {
    json!({
        "data": [{"type": kind, "x": ["a", "b"], "y": [2, 1], "labels": ["a", "b"], "values": [2, 1]}],
        "layout": {"title": {"text": title}}
    })
    .to_string()
}

/// A well-formed `/analyze` success body with one article per title.
pub fn analysis_body(titles: &[&str]) -> String {
    let articles: Vec<Value> = titles
        .iter()
        .map(|t| {
            json!({
                "title": t,
                "url": "https://news.example/story",
                "source": "Example Wire",
                "summary": format!("{t} in brief"),
                "sentiment": {"label": "POSITIVE", "score": 0.91, "method": "transformer"},
                "publish_date": "2024-03-05T14:30:00",
                "image": null
            })
        })
        .collect();
    json!({
        "articles": articles,
        "analysis": {
            "total_articles": titles.len(),
            "total_words": 4821,
            "topics": {"climate policy": 3, "energy": 2},
            "entities": [],
            "processed_text": "ignored"
        },
        "visualizations": {
            "sentiment_chart": chart("pie", "Sentiment Distribution"),
            "entity_chart": chart("bar", "Top Entities"),
            "source_chart": chart("bar", "News Source Comparison"),
            "wordcloud": "data:image/png;base64,iVBORw0KGgo="
        },
        "sentiment_stats": {"positive_count": 3, "negative_count": 1, "neutral_count": 2, "total": 6}
    })
    .to_string()
}

pub fn summary_body(original: &str, summary: &str) -> String {
    json!({"original_text": original, "summary": summary}).to_string()
}
