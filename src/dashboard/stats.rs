use crate::model::MessageRecord;
use chrono::{DateTime, Local, Utc};
use std::collections::HashSet;

/// How many recent records the statistics window fetches.
pub const STATS_WINDOW_LIMIT: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub total_messages: u64,
    pub today_messages: usize,
    pub active_conversations: usize,
}

/// Builds the dashboard statistics. `total_messages` is authoritative
/// (server count); `today_messages` and `active_conversations` are
/// approximations computed over the bounded window of recent records only.
/// "Today" is the calendar date of `now` in the client's local timezone.
pub fn summarize(
    window: &[MessageRecord],
    total_messages: u64,
    now: DateTime<Utc>,
) -> StatsSnapshot {
    let today = now.with_timezone(&Local).date_naive();
    let today_messages = window
        .iter()
        .filter(|record| record.timestamp.with_timezone(&Local).date_naive() == today)
        .count();

    let active: HashSet<&str> = window
        .iter()
        .filter_map(|record| record.conversation_id.as_deref())
        .filter(|id| !id.is_empty())
        .collect();

    StatsSnapshot {
        total_messages,
        today_messages,
        active_conversations: active.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::{summarize, StatsSnapshot};
    use crate::model::MessageRecord;
    use chrono::{DateTime, Duration, Utc};

    fn record(id: i64, timestamp: DateTime<Utc>, conversation: Option<&str>) -> MessageRecord {
        MessageRecord {
            id,
            user_query: "q".to_string(),
            refined_query: "r".to_string(),
            answer: "a".to_string(),
            conversation_id: conversation.map(str::to_string),
            timestamp,
        }
    }

    #[test]
    fn counts_today_in_local_time_and_distinct_conversations() {
        let now = Utc::now();
        let window = vec![
            record(1, now, Some("conv-a")),
            record(2, now, Some("conv-a")),
            record(3, now - Duration::days(3), Some("conv-b")),
            record(4, now, None),
            record(5, now, Some("")),
        ];

        let snapshot = summarize(&window, 321, now);
        assert_eq!(
            snapshot,
            StatsSnapshot {
                total_messages: 321,
                today_messages: 4,
                active_conversations: 2,
            }
        );
    }

    #[test]
    fn empty_window_still_reports_server_total() {
        let snapshot = summarize(&[], 9000, Utc::now());
        assert_eq!(snapshot.total_messages, 9000);
        assert_eq!(snapshot.today_messages, 0);
        assert_eq!(snapshot.active_conversations, 0);
    }
}
