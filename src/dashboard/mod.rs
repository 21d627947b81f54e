pub mod derive;
pub mod pager;
pub mod stats;

use crate::dashboard::derive::{Filters, Sort, SortColumn, SortDirection};
use crate::dashboard::pager::Pager;
use crate::dashboard::stats::StatsSnapshot;
use crate::model::MessageRecord;
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Conversation filter selector: the distinct conversation ids of the latest
/// fetched page, sorted lexicographically, plus the implicit "all" option
/// (`selected == None`).
#[derive(Debug, Clone, Default)]
pub struct ConversationSelector {
    options: Vec<String>,
    selected: Option<String>,
}

impl ConversationSelector {
    pub fn update_from_page(&mut self, records: &[MessageRecord]) {
        let ids: BTreeSet<&str> = records
            .iter()
            .filter_map(|record| record.conversation_id.as_deref())
            .filter(|id| !id.is_empty())
            .collect();
        self.options = ids.into_iter().map(str::to_string).collect();

        if let Some(selected) = &self.selected {
            if !self.options.iter().any(|option| option == selected) {
                self.selected = None;
            }
        }
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn select(&mut self, value: Option<String>) {
        self.selected = value;
    }
}

/// All state behind the message table. Mutated only on the UI thread; the
/// derived view is recomputed synchronously on every change, so `derived()`
/// is always a pure function of the raw page, filters, and sort.
#[derive(Debug, Default)]
pub struct DashboardState {
    pub pager: Pager,
    raw_messages: Vec<MessageRecord>,
    filters: Filters,
    sort: Sort,
    filtered: Vec<MessageRecord>,
    pub selector: ConversationSelector,
    pub stats: Option<StatsSnapshot>,
}

impl DashboardState {
    pub fn derived(&self) -> &[MessageRecord] {
        &self.filtered
    }

    pub fn sort(&self) -> Sort {
        self.sort
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    /// Replace the current page wholesale with a fetched one.
    pub fn accept_page(&mut self, page: u32, records: Vec<MessageRecord>) {
        self.pager.record_page(page, records.len());
        self.selector.update_from_page(&records);
        self.raw_messages = records;
        self.refresh_derived();
    }

    pub fn accept_stats(&mut self, snapshot: StatsSnapshot) {
        self.stats = Some(snapshot);
    }

    /// Client-local: updates the view without resetting the page or fetching.
    pub fn set_search_term(&mut self, term: String) {
        if self.filters.search_term != term {
            self.filters.search_term = term;
            self.refresh_derived();
        }
    }

    /// Client-local: same column toggles direction, a new column starts
    /// ascending.
    pub fn toggle_sort(&mut self, column: SortColumn) {
        if self.sort.column == column {
            self.sort.direction = self.sort.direction.toggled();
        } else {
            self.sort = Sort {
                column,
                direction: SortDirection::Ascending,
            };
        }
        self.refresh_derived();
    }

    /// The filter-apply action: installs the date filter and the selector's
    /// conversation choice, and resets to page 1. The caller must re-fetch;
    /// the previous page stays visible until the response lands.
    pub fn apply_filters(&mut self, date: Option<NaiveDate>) {
        self.filters.date = date;
        self.filters.conversation_id = self.selector.selected().map(str::to_string);
        self.pager.reset();
        self.refresh_derived();
    }

    pub fn reset_filters(&mut self) {
        self.filters = Filters::default();
        self.selector.select(None);
        self.pager.reset();
        self.refresh_derived();
    }

    fn refresh_derived(&mut self) {
        self.filtered = derive::derive(&self.raw_messages, &self.filters, self.sort);
    }
}
