use crate::model::MessageRecord;
use chrono::NaiveDate;
use std::cmp::Ordering;

/// Client-only predicates layered on top of the fetched page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    pub search_term: String,
    pub date: Option<NaiveDate>,
    pub conversation_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Timestamp,
    UserQuery,
    RefinedQuery,
    Answer,
    Conversation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            column: SortColumn::Timestamp,
            direction: SortDirection::Descending,
        }
    }
}

/// Pure derivation of the visible sequence: filters (ANDed) then sort.
/// Never suspends and has no side effects; the output is a function of its
/// inputs only.
pub fn derive(raw: &[MessageRecord], filters: &Filters, sort: Sort) -> Vec<MessageRecord> {
    let mut rows: Vec<MessageRecord> = raw
        .iter()
        .filter(|record| passes(record, filters))
        .cloned()
        .collect();
    rows.sort_by(|a, b| compare(a, b, sort));
    rows
}

fn passes(record: &MessageRecord, filters: &Filters) -> bool {
    matches_search(record, &filters.search_term)
        && matches_date(record, filters.date)
        && matches_conversation(record, filters.conversation_id.as_deref())
}

fn matches_search(record: &MessageRecord, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }

    [&record.user_query, &record.refined_query, &record.answer]
        .iter()
        .any(|field| field.to_lowercase().contains(&term))
        || record
            .conversation_id
            .as_deref()
            .is_some_and(|id| id.to_lowercase().contains(&term))
}

/// Compares the ISO calendar date of the instant as transmitted (UTC), not
/// the viewer's local date.
fn matches_date(record: &MessageRecord, date: Option<NaiveDate>) -> bool {
    date.is_none_or(|date| record.timestamp.date_naive() == date)
}

fn matches_conversation(record: &MessageRecord, filter: Option<&str>) -> bool {
    filter.is_none_or(|id| record.conversation_id.as_deref() == Some(id))
}

/// Equal primary keys fall back to `id` ascending, so equal-key order is
/// deterministic in both directions.
fn compare(a: &MessageRecord, b: &MessageRecord, sort: Sort) -> Ordering {
    let primary = match sort.column {
        SortColumn::Timestamp => a.timestamp.cmp(&b.timestamp),
        SortColumn::UserQuery => text_key(&a.user_query).cmp(&text_key(&b.user_query)),
        SortColumn::RefinedQuery => text_key(&a.refined_query).cmp(&text_key(&b.refined_query)),
        SortColumn::Answer => text_key(&a.answer).cmp(&text_key(&b.answer)),
        SortColumn::Conversation => text_key(a.conversation_id.as_deref().unwrap_or(""))
            .cmp(&text_key(b.conversation_id.as_deref().unwrap_or(""))),
    };

    let primary = match sort.direction {
        SortDirection::Ascending => primary,
        SortDirection::Descending => primary.reverse(),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

fn text_key(value: &str) -> String {
    value.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::{derive, Filters, Sort, SortColumn, SortDirection};
    use crate::model::MessageRecord;
    use chrono::{DateTime, NaiveDate, Utc};

    fn record(id: i64, timestamp: &str, user_query: &str, conversation: Option<&str>) -> MessageRecord {
        MessageRecord {
            id,
            user_query: user_query.to_string(),
            refined_query: format!("refined {user_query}"),
            answer: format!("answer for {user_query}"),
            conversation_id: conversation.map(str::to_string),
            timestamp: timestamp
                .parse::<DateTime<Utc>>()
                .expect("test timestamp should parse"),
        }
    }

    fn sample_page() -> Vec<MessageRecord> {
        vec![
            record(1, "2024-01-01T10:00:00Z", "password reset", Some("conv-a")),
            record(2, "2024-01-02T09:00:00Z", "opening hours", Some("conv-b")),
        ]
    }

    #[test]
    fn search_term_matches_one_record_case_insensitively() {
        let raw = sample_page();
        let filters = Filters {
            search_term: "PASS".to_string(),
            ..Filters::default()
        };
        let rows = derive(&raw, &filters, Sort::default());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_query, "password reset");
    }

    #[test]
    fn search_matches_conversation_id_but_not_absent_ones() {
        let raw = vec![
            record(1, "2024-01-01T10:00:00Z", "first", Some("conv-a")),
            record(2, "2024-01-01T11:00:00Z", "second", None),
        ];
        let filters = Filters {
            search_term: "conv".to_string(),
            ..Filters::default()
        };
        let rows = derive(&raw, &filters, Sort::default());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 1);
    }

    #[test]
    fn date_filter_keeps_matching_calendar_date_only() {
        let raw = sample_page();
        let filters = Filters {
            date: NaiveDate::from_ymd_opt(2024, 1, 2),
            ..Filters::default()
        };
        let rows = derive(&raw, &filters, Sort::default());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_query, "opening hours");
    }

    #[test]
    fn conversation_filter_is_exact() {
        let raw = sample_page();
        let filters = Filters {
            conversation_id: Some("conv-a".to_string()),
            ..Filters::default()
        };
        let rows = derive(&raw, &filters, Sort::default());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].conversation_id.as_deref(), Some("conv-a"));
    }

    #[test]
    fn filters_never_invent_records() {
        let raw = sample_page();
        let filters = Filters {
            search_term: "answer".to_string(),
            ..Filters::default()
        };
        let rows = derive(&raw, &filters, Sort::default());
        assert!(rows.iter().all(|row| raw.contains(row)));
    }

    #[test]
    fn derive_is_idempotent_for_identical_inputs() {
        let raw = sample_page();
        let filters = Filters {
            search_term: "o".to_string(),
            ..Filters::default()
        };
        let sort = Sort {
            column: SortColumn::UserQuery,
            direction: SortDirection::Ascending,
        };
        assert_eq!(derive(&raw, &filters, sort), derive(&raw, &filters, sort));
    }

    #[test]
    fn timestamp_sort_reverses_between_directions() {
        let raw = sample_page();
        let descending = derive(
            &raw,
            &Filters::default(),
            Sort {
                column: SortColumn::Timestamp,
                direction: SortDirection::Descending,
            },
        );
        let ascending = derive(
            &raw,
            &Filters::default(),
            Sort {
                column: SortColumn::Timestamp,
                direction: SortDirection::Ascending,
            },
        );
        let mut reversed = descending.clone();
        reversed.reverse();
        assert_eq!(reversed, ascending);
    }

    #[test]
    fn equal_sort_keys_fall_back_to_id_ascending() {
        let raw = vec![
            record(5, "2024-01-01T10:00:00Z", "same", None),
            record(2, "2024-01-01T10:00:00Z", "same", None),
            record(9, "2024-01-01T10:00:00Z", "same", None),
        ];
        for direction in [SortDirection::Ascending, SortDirection::Descending] {
            let rows = derive(
                &raw,
                &Filters::default(),
                Sort {
                    column: SortColumn::Timestamp,
                    direction,
                },
            );
            let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
            assert_eq!(ids, vec![2, 5, 9]);
        }
    }

    #[test]
    fn text_columns_sort_case_insensitively() {
        let raw = vec![
            record(1, "2024-01-01T10:00:00Z", "Zebra", None),
            record(2, "2024-01-01T11:00:00Z", "apple", None),
        ];
        let rows = derive(
            &raw,
            &Filters::default(),
            Sort {
                column: SortColumn::UserQuery,
                direction: SortDirection::Ascending,
            },
        );
        assert_eq!(rows[0].user_query, "apple");
    }
}
