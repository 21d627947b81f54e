use crate::api::{ApiError, BackendStatus};
use crate::dashboard::stats::StatsSnapshot;
use crate::model::{ChatResponse, MessageRecord};

/// Events delivered from background tasks to the UI thread. Results for the
/// two refreshable slots carry the sequence number assigned when the request
/// was issued, so stale responses can be discarded on arrival.
#[derive(Debug, Clone)]
pub enum AppEvent {
    BackendStatus(BackendStatus),
    MessagesPage {
        seq: u64,
        page: u32,
        records: Vec<MessageRecord>,
    },
    MessagesError {
        seq: u64,
        error: ApiError,
    },
    Stats {
        seq: u64,
        snapshot: StatsSnapshot,
    },
    StatsError {
        seq: u64,
        error: ApiError,
    },
    ChatAnswer(ChatResponse),
    ChatError(ApiError),
    RefreshTick,
}
