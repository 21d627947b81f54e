use crate::config::Config;
use crate::dashboard::pager::PAGE_SIZE;
use crate::dashboard::stats::{self, STATS_WINDOW_LIMIT};
use crate::event::AppEvent;
use crate::model::{ChatRequest, ChatTurn, MessageCount, MessageRecord};
use chrono::Utc;
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use thiserror::Error;
use tokio::runtime::Handle;

/// Last observed result of the `/health` probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendStatus {
    Checking,
    Healthy,
    Unreachable,
}

#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("unexpected response shape: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Tracks the newest accepted fetch for one logical slot (messages page or
/// statistics). A response completing after a newer one was already accepted
/// is reported as stale and dropped by the caller.
#[derive(Debug, Default)]
pub struct FetchSlot {
    last_accepted: u64,
}

impl FetchSlot {
    pub fn accept(&mut self, seq: u64) -> bool {
        if seq > self.last_accepted {
            self.last_accepted = seq;
            true
        } else {
            false
        }
    }
}

/// HTTP client for the chatbot backend. Every fetch runs as a spawned task
/// on the shared runtime and reports back through the app event channel,
/// requesting a repaint so results are picked up while the UI is idle.
#[derive(Clone)]
pub struct BackendClient {
    base_url: String,
    http: reqwest::Client,
    tx: mpsc::Sender<AppEvent>,
    repaint: egui::Context,
    runtime_handle: Handle,
    messages_seq: Arc<AtomicU64>,
    stats_seq: Arc<AtomicU64>,
}

impl BackendClient {
    pub fn new(
        config: &Config,
        runtime_handle: Handle,
        tx: mpsc::Sender<AppEvent>,
        repaint: egui::Context,
    ) -> Self {
        Self {
            base_url: config.api_base_url.clone(),
            http: reqwest::Client::new(),
            tx,
            repaint,
            runtime_handle,
            messages_seq: Arc::new(AtomicU64::new(0)),
            stats_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    fn deliver(tx: &mpsc::Sender<AppEvent>, repaint: &egui::Context, event: AppEvent) {
        let _ = tx.send(event);
        repaint.request_repaint();
    }

    fn next_seq(counter: &AtomicU64) -> u64 {
        counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Fetch one page of logged messages, optionally restricted to a
    /// conversation. The response replaces the current page wholesale.
    pub fn fetch_messages(&self, page: u32, conversation_id: Option<String>) {
        let seq = Self::next_seq(&self.messages_seq);
        let url = format!("{}/messages", self.base_url);
        let offset = (page.max(1) - 1) * PAGE_SIZE;
        let http = self.http.clone();
        let tx = self.tx.clone();
        let repaint = self.repaint.clone();

        self.runtime_handle.spawn(async move {
            let mut query = vec![
                ("limit", PAGE_SIZE.to_string()),
                ("offset", offset.to_string()),
            ];
            if let Some(id) = conversation_id {
                query.push(("conversation_id", id));
            }

            let event = match get_json::<Vec<MessageRecord>>(&http, &url, &query).await {
                Ok(records) => AppEvent::MessagesPage { seq, page, records },
                Err(error) => AppEvent::MessagesError { seq, error },
            };
            Self::deliver(&tx, &repaint, event);
        });
    }

    /// Fetch the statistics inputs: the authoritative total plus a bounded
    /// window of recent records summarized client-side.
    pub fn fetch_stats(&self) {
        let seq = Self::next_seq(&self.stats_seq);
        let count_url = format!("{}/messages/count", self.base_url);
        let window_url = format!("{}/messages", self.base_url);
        let http = self.http.clone();
        let tx = self.tx.clone();
        let repaint = self.repaint.clone();

        self.runtime_handle.spawn(async move {
            let window_query = [
                ("limit", STATS_WINDOW_LIMIT.to_string()),
                ("offset", "0".to_string()),
            ];

            let result = async {
                let count: MessageCount = get_json(&http, &count_url, &[]).await?;
                let window: Vec<MessageRecord> =
                    get_json(&http, &window_url, &window_query).await?;
                Ok::<_, ApiError>(stats::summarize(&window, count.count, Utc::now()))
            }
            .await;

            let event = match result {
                Ok(snapshot) => AppEvent::Stats { seq, snapshot },
                Err(error) => AppEvent::StatsError { seq, error },
            };
            Self::deliver(&tx, &repaint, event);
        });
    }

    pub fn check_health(&self) {
        let url = format!("{}/health", self.base_url);
        let http = self.http.clone();
        let tx = self.tx.clone();
        let repaint = self.repaint.clone();

        self.runtime_handle.spawn(async move {
            let healthy = match http.get(&url).send().await {
                Ok(response) => response.status().is_success(),
                Err(_) => false,
            };
            let status = if healthy {
                BackendStatus::Healthy
            } else {
                BackendStatus::Unreachable
            };
            Self::deliver(&tx, &repaint, AppEvent::BackendStatus(status));
        });
    }

    /// Post one chat exchange. `history` is the transcript before the query
    /// being sent, oldest first.
    pub fn send_chat(&self, user_query: String, history: Vec<ChatTurn>) {
        let url = format!("{}/chat", self.base_url);
        let http = self.http.clone();
        let tx = self.tx.clone();
        let repaint = self.repaint.clone();

        self.runtime_handle.spawn(async move {
            let body = ChatRequest {
                user_query,
                conversation_history: history,
            };

            let result = async {
                let response = http.post(&url).json(&body).send().await?;
                let response = response.error_for_status()?;
                Ok::<_, ApiError>(response.json().await?)
            }
            .await;

            let event = match result {
                Ok(answer) => AppEvent::ChatAnswer(answer),
                Err(error) => AppEvent::ChatError(error),
            };
            Self::deliver(&tx, &repaint, event);
        });
    }
}

async fn get_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    url: &str,
    query: &[(&str, String)],
) -> Result<T, ApiError> {
    let response = http.get(url).query(query).send().await?;
    let response = response.error_for_status()?;
    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::{ApiError, FetchSlot};

    #[test]
    fn fetch_slot_accepts_monotonically_newer_sequences() {
        let mut slot = FetchSlot::default();
        assert!(slot.accept(1));
        assert!(slot.accept(3));
        assert!(!slot.accept(2), "older in-flight response must be dropped");
        assert!(!slot.accept(3), "duplicate delivery must be dropped");
        assert!(slot.accept(4));
    }

    #[test]
    fn error_variants_render_distinct_prefixes() {
        let network = ApiError::Network("connection refused".to_string());
        let malformed = ApiError::MalformedResponse("expected array".to_string());
        assert_eq!(network.to_string(), "request failed: connection refused");
        assert_eq!(
            malformed.to_string(),
            "unexpected response shape: expected array"
        );
    }
}
