use crate::api::{BackendClient, BackendStatus, FetchSlot};
use crate::chat::{self, store, ConversationSummary};
use crate::dashboard::derive::{Sort, SortColumn, SortDirection};
use crate::dashboard::DashboardState;
use crate::event::AppEvent;
use crate::model::{ChatResponse, ChatTurn};
use crate::scheduler::{plan_tick, RefreshScheduler};
use crate::theme::Theme;
use chrono::{Local, NaiveDate, Utc};
use eframe::egui::{self, Color32, RichText, ScrollArea};
use std::sync::mpsc::{Receiver, TryRecvError};
use uuid::Uuid;

const CELL_MAX_CHARS: usize = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Dashboard,
    Chat,
}

pub struct FaqboardApp {
    rx: Receiver<AppEvent>,
    client: BackendClient,
    scheduler: RefreshScheduler,
    theme: Theme,
    view: View,
    backend_status: BackendStatus,

    dashboard: DashboardState,
    messages_slot: FetchSlot,
    stats_slot: FetchSlot,
    search_input: String,
    date_input: String,
    banner: Option<String>,
    diagnostics_log: Vec<String>,

    transcript: Vec<ChatTurn>,
    conversations: Vec<ConversationSummary>,
    current_conversation_id: Option<String>,
    chat_input: String,
    awaiting_answer: bool,
    scroll_to_bottom: bool,
}

impl FaqboardApp {
    pub fn new(rx: Receiver<AppEvent>, client: BackendClient, scheduler: RefreshScheduler) -> Self {
        let (conversations, warning) = store::load();
        let mut app = Self {
            rx,
            client,
            scheduler,
            theme: Theme::default(),
            view: View::Dashboard,
            backend_status: BackendStatus::Checking,
            dashboard: DashboardState::default(),
            messages_slot: FetchSlot::default(),
            stats_slot: FetchSlot::default(),
            search_input: String::new(),
            date_input: String::new(),
            banner: None,
            diagnostics_log: Vec::new(),
            transcript: Vec::new(),
            conversations,
            current_conversation_id: None,
            chat_input: String::new(),
            awaiting_answer: false,
            scroll_to_bottom: false,
        };

        if let Some(warning) = warning {
            app.log_diagnostic(format!("history load warning: {warning}"));
        }

        app.client.check_health();
        app.client.fetch_stats();
        app.client.fetch_messages(1, None);
        app
    }

    fn log_diagnostic(&mut self, message: impl Into<String>) {
        let stamp = Local::now().format("%H:%M:%S");
        self.diagnostics_log.push(format!("[{stamp}] {}", message.into()));
    }

    fn status_label(&self) -> (&'static str, Color32) {
        match self.backend_status {
            BackendStatus::Healthy => ("Backend Online", self.theme.success),
            BackendStatus::Checking => ("Checking...", self.theme.warning),
            BackendStatus::Unreachable => ("Backend Unreachable", self.theme.danger),
        }
    }

    fn fetch_current_page(&self) {
        self.client.fetch_messages(
            self.dashboard.pager.current_page(),
            self.dashboard.filters().conversation_id.clone(),
        );
    }

    fn drain_events(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => self.apply_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.log_diagnostic("event channel disconnected");
                    break;
                }
            }
        }
    }

    fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::BackendStatus(status) => {
                if status != self.backend_status {
                    log::info!("backend status changed: {status:?}");
                }
                self.backend_status = status;
            }
            AppEvent::MessagesPage { seq, page, records } => {
                if self.messages_slot.accept(seq) {
                    self.dashboard.accept_page(page, records);
                } else {
                    log::debug!("discarding stale messages response (seq {seq})");
                }
            }
            AppEvent::MessagesError { seq, error } => {
                if self.messages_slot.accept(seq) {
                    log::warn!("messages fetch failed: {error}");
                    self.banner = Some(format!("Could not load messages: {error}"));
                    self.log_diagnostic(format!("messages fetch failed: {error}"));
                }
            }
            AppEvent::Stats { seq, snapshot } => {
                if self.stats_slot.accept(seq) {
                    self.dashboard.accept_stats(snapshot);
                } else {
                    log::debug!("discarding stale statistics response (seq {seq})");
                }
            }
            AppEvent::StatsError { seq, error } => {
                if self.stats_slot.accept(seq) {
                    log::warn!("statistics fetch failed: {error}");
                    self.banner = Some(format!("Could not load statistics: {error}"));
                    self.log_diagnostic(format!("statistics fetch failed: {error}"));
                }
            }
            AppEvent::ChatAnswer(response) => self.accept_chat_answer(response),
            AppEvent::ChatError(error) => {
                self.awaiting_answer = false;
                log::warn!("chat request failed: {error}");
                self.banner = Some(format!("Could not get an answer: {error}"));
                self.log_diagnostic(format!("chat request failed: {error}"));
            }
            AppEvent::RefreshTick => {
                let plan = plan_tick(self.dashboard.pager.current_page());
                self.client.check_health();
                if plan.stats {
                    self.client.fetch_stats();
                }
                if plan.messages {
                    self.client.fetch_messages(1, self.dashboard.filters().conversation_id.clone());
                }
            }
        }
    }

    fn accept_chat_answer(&mut self, response: ChatResponse) {
        self.awaiting_answer = false;
        self.transcript.push(ChatTurn {
            role: "assistant".to_string(),
            content: response.answer,
            timestamp: Utc::now(),
        });
        self.scroll_to_bottom = true;

        let id = self
            .current_conversation_id
            .get_or_insert_with(|| {
                response
                    .conversation_id
                    .unwrap_or_else(|| Uuid::new_v4().to_string())
            })
            .clone();

        let summary = ConversationSummary {
            id,
            messages: self.transcript.clone(),
            timestamp: Utc::now(),
            preview: chat::preview_of(&self.transcript),
        };
        store::upsert(&mut self.conversations, summary);
        if let Err(err) = store::persist(&self.conversations) {
            self.log_diagnostic(format!("failed to persist chat history: {err}"));
        }
    }

    fn apply_filter_inputs(&mut self) {
        let raw = self.date_input.trim();
        let date = if raw.is_empty() {
            None
        } else {
            match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    self.banner = Some(format!("Invalid date filter \"{raw}\" (expected YYYY-MM-DD)"));
                    return;
                }
            }
        };

        self.dashboard.apply_filters(date);
        self.fetch_current_page();
    }

    fn reset_filter_inputs(&mut self) {
        self.search_input.clear();
        self.date_input.clear();
        self.dashboard.reset_filters();
        self.fetch_current_page();
    }

    fn reload(&mut self) {
        self.client.check_health();
        self.client.fetch_stats();
        self.fetch_current_page();
    }

    fn open_conversation(&mut self, id: &str) {
        if let Some(conversation) = self.conversations.iter().find(|c| c.id == id) {
            self.transcript = conversation.messages.clone();
            self.current_conversation_id = Some(conversation.id.clone());
            self.chat_input.clear();
            self.awaiting_answer = false;
            self.scroll_to_bottom = true;
        }
    }

    fn new_conversation(&mut self) {
        self.transcript.clear();
        self.current_conversation_id = None;
        self.chat_input.clear();
        self.awaiting_answer = false;
    }

    fn submit_chat(&mut self) {
        let prompt = self.chat_input.trim().to_string();
        if prompt.is_empty() || self.awaiting_answer {
            return;
        }

        let history = self.transcript.clone();
        self.transcript.push(ChatTurn {
            role: "user".to_string(),
            content: prompt.clone(),
            timestamp: Utc::now(),
        });
        self.client.send_chat(prompt, history);
        self.chat_input.clear();
        self.awaiting_answer = true;
        self.scroll_to_bottom = true;
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        let (status_text, status_color) = self.status_label();
        let mut reload_clicked = false;
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("FAQ Chatbot Console");
                ui.separator();
                if ui
                    .selectable_label(self.view == View::Dashboard, "Dashboard")
                    .clicked()
                {
                    self.view = View::Dashboard;
                }
                if ui.selectable_label(self.view == View::Chat, "Chat").clicked() {
                    self.view = View::Chat;
                }
                ui.separator();
                ui.label(RichText::new(status_text).color(status_color));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    reload_clicked = ui.button("Reload").clicked();
                });
            });
        });

        if reload_clicked {
            self.reload();
        }
    }

    fn render_banner(&mut self, ctx: &egui::Context) {
        let Some(text) = self.banner.clone() else {
            return;
        };

        let mut dismissed = false;
        let frame = self.theme.banner_frame();
        egui::TopBottomPanel::top("error_banner")
            .frame(frame)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(text).color(self.theme.danger));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        dismissed = ui.button("Dismiss").clicked();
                    });
                });
            });

        if dismissed {
            self.banner = None;
        }
    }

    fn stat_card(&self, ui: &mut egui::Ui, label: &str, value: String, note: Option<&str>) {
        self.theme.card_frame().show(ui, |ui| {
            ui.vertical(|ui| {
                ui.label(RichText::new(label).color(self.theme.text_muted).small());
                ui.heading(value);
                if let Some(note) = note {
                    ui.label(RichText::new(note).color(self.theme.text_muted).small());
                }
            });
        });
    }

    fn render_stats_row(&self, ui: &mut egui::Ui) {
        let stats = self.dashboard.stats;
        let value = |present: Option<String>| present.unwrap_or_else(|| "—".to_string());
        ui.horizontal(|ui| {
            self.stat_card(
                ui,
                "Total Messages",
                value(stats.map(|s| s.total_messages.to_string())),
                None,
            );
            self.stat_card(
                ui,
                "Today",
                value(stats.map(|s| s.today_messages.to_string())),
                Some("recent window"),
            );
            self.stat_card(
                ui,
                "Active Conversations",
                value(stats.map(|s| s.active_conversations.to_string())),
                Some("recent window"),
            );
        });
    }

    fn sort_header(ui: &mut egui::Ui, label: &str, column: SortColumn, sort: Sort) -> bool {
        let marker = if sort.column == column {
            match sort.direction {
                SortDirection::Ascending => " ^",
                SortDirection::Descending => " v",
            }
        } else {
            ""
        };
        ui.button(format!("{label}{marker}")).clicked()
    }

    fn render_dashboard(&mut self, ctx: &egui::Context) {
        let mut apply_clicked = false;
        let mut reset_clicked = false;
        let mut clicked_sort: Option<SortColumn> = None;
        let mut previous_clicked = false;
        let mut next_clicked = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_stats_row(ui);
            ui.separator();

            ui.horizontal(|ui| {
                ui.label("Search:");
                ui.add(
                    egui::TextEdit::singleline(&mut self.search_input)
                        .hint_text("query, answer, conversation...")
                        .desired_width(200.0),
                );
                ui.label("Date:");
                ui.add(
                    egui::TextEdit::singleline(&mut self.date_input)
                        .hint_text("YYYY-MM-DD")
                        .desired_width(100.0),
                );

                let selected_text = self
                    .dashboard
                    .selector
                    .selected()
                    .unwrap_or("All conversations")
                    .to_string();
                let options = self.dashboard.selector.options().to_vec();
                let mut choice_changed: Option<Option<String>> = None;
                egui::ComboBox::from_id_salt("conversation_filter")
                    .selected_text(selected_text)
                    .show_ui(ui, |ui| {
                        let selected = self.dashboard.selector.selected().map(str::to_string);
                        if ui
                            .selectable_label(selected.is_none(), "All conversations")
                            .clicked()
                        {
                            choice_changed = Some(None);
                        }
                        for option in &options {
                            if ui
                                .selectable_label(
                                    selected.as_deref() == Some(option.as_str()),
                                    option.as_str(),
                                )
                                .clicked()
                            {
                                choice_changed = Some(Some(option.clone()));
                            }
                        }
                    });
                if let Some(choice) = choice_changed {
                    self.dashboard.selector.select(choice);
                }

                apply_clicked = ui.button("Apply").clicked();
                reset_clicked = ui.button("Reset").clicked();
            });

            // Search is client-local: re-derive immediately, no re-fetch.
            self.dashboard.set_search_term(self.search_input.clone());

            ui.separator();

            let table_height = (ui.available_height() - 70.0).max(120.0);
            ScrollArea::vertical()
                .id_salt("message_table")
                .max_height(table_height)
                .show(ui, |ui| {
                    egui::Grid::new("messages_grid")
                        .striped(true)
                        .num_columns(5)
                        .min_col_width(90.0)
                        .show(ui, |ui| {
                            let sort = self.dashboard.sort();
                            if Self::sort_header(ui, "Time", SortColumn::Timestamp, sort) {
                                clicked_sort = Some(SortColumn::Timestamp);
                            }
                            if Self::sort_header(ui, "User Query", SortColumn::UserQuery, sort) {
                                clicked_sort = Some(SortColumn::UserQuery);
                            }
                            if Self::sort_header(ui, "Refined Query", SortColumn::RefinedQuery, sort)
                            {
                                clicked_sort = Some(SortColumn::RefinedQuery);
                            }
                            if Self::sort_header(ui, "Answer", SortColumn::Answer, sort) {
                                clicked_sort = Some(SortColumn::Answer);
                            }
                            if Self::sort_header(ui, "Conversation", SortColumn::Conversation, sort)
                            {
                                clicked_sort = Some(SortColumn::Conversation);
                            }
                            ui.end_row();

                            for record in self.dashboard.derived() {
                                ui.label(record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string());
                                ui.label(truncate_cell(&record.user_query));
                                ui.label(truncate_cell(&record.refined_query));
                                ui.label(truncate_cell(&record.answer));
                                ui.label(record.conversation_id.as_deref().unwrap_or("—"));
                                ui.end_row();
                            }
                        });

                    if self.dashboard.derived().is_empty() {
                        ui.label(RichText::new("No messages").color(self.theme.text_muted));
                    }
                });

            ui.separator();
            ui.horizontal(|ui| {
                previous_clicked = ui
                    .add_enabled(
                        self.dashboard.pager.can_go_previous(),
                        egui::Button::new("Previous"),
                    )
                    .clicked();
                ui.label(format!("Page {}", self.dashboard.pager.current_page()));
                next_clicked = ui
                    .add_enabled(self.dashboard.pager.can_go_next(), egui::Button::new("Next"))
                    .clicked();
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        RichText::new(format!("{} shown", self.dashboard.derived().len()))
                            .color(self.theme.text_muted),
                    );
                });
            });

            self.render_diagnostics(ui);
        });

        if apply_clicked {
            self.apply_filter_inputs();
        }
        if reset_clicked {
            self.reset_filter_inputs();
        }
        if let Some(column) = clicked_sort {
            self.dashboard.toggle_sort(column);
        }
        if previous_clicked && self.dashboard.pager.previous_page().is_some() {
            self.fetch_current_page();
        }
        if next_clicked {
            self.dashboard.pager.next_page();
            self.fetch_current_page();
        }
    }

    fn render_chat(&mut self, ctx: &egui::Context) {
        let mut clicked_conversation: Option<String> = None;
        let mut new_clicked = false;

        egui::SidePanel::left("conversations_panel")
            .resizable(true)
            .show(ctx, |ui| {
                ui.heading("Conversations");
                new_clicked = ui.button("New Conversation").clicked();
                ui.separator();

                ScrollArea::vertical().id_salt("conversation_list").show(ui, |ui| {
                    for conversation in &self.conversations {
                        let label = if conversation.preview.is_empty() {
                            conversation.id.clone()
                        } else {
                            conversation.preview.clone()
                        };
                        let selected = self.current_conversation_id.as_deref()
                            == Some(conversation.id.as_str());
                        if ui.selectable_label(selected, label).clicked() {
                            clicked_conversation = Some(conversation.id.clone());
                        }
                    }
                });
            });

        if new_clicked {
            self.new_conversation();
        }
        if let Some(id) = clicked_conversation {
            self.open_conversation(&id);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Chat");
            ui.separator();

            let transcript_height = (ui.available_height() - 150.0).max(120.0);
            ScrollArea::vertical()
                .id_salt("chat_transcript")
                .max_height(transcript_height)
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for turn in &self.transcript {
                        let label = if turn.role == "user" {
                            format!("[You] {}", turn.content)
                        } else {
                            format!("[Assistant] {}", turn.content)
                        };
                        ui.label(label);
                    }

                    if self.awaiting_answer {
                        ui.label(
                            RichText::new("[Assistant] ...").color(self.theme.text_muted),
                        );
                    }

                    if self.scroll_to_bottom {
                        ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                    }
                });
            self.scroll_to_bottom = false;

            ui.separator();
            let online = self.backend_status == BackendStatus::Healthy;
            let input_enabled = online && !self.awaiting_answer;
            let hint = if !online {
                "Backend unreachable"
            } else if self.awaiting_answer {
                "Waiting for answer..."
            } else {
                "Ask a question..."
            };

            let mut send_now = false;
            ui.horizontal(|ui| {
                let response = ui.add_enabled(
                    input_enabled,
                    egui::TextEdit::singleline(&mut self.chat_input)
                        .desired_width(f32::INFINITY)
                        .hint_text(hint),
                );
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    send_now = true;
                }

                let clicked = ui
                    .add_enabled(
                        input_enabled && !self.chat_input.trim().is_empty(),
                        egui::Button::new("Send"),
                    )
                    .clicked();
                send_now |= clicked;
            });

            if send_now && input_enabled {
                self.submit_chat();
            }

            self.render_diagnostics(ui);
        });
    }

    fn render_diagnostics(&self, ui: &mut egui::Ui) {
        egui::CollapsingHeader::new("Diagnostics")
            .default_open(false)
            .show(ui, |ui| {
                ScrollArea::vertical()
                    .id_salt("diagnostics_log")
                    .max_height(90.0)
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for entry in &self.diagnostics_log {
                            ui.label(entry);
                        }
                    });
            });
    }
}

impl eframe::App for FaqboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();
        self.render_top_bar(ctx);
        self.render_banner(ctx);
        match self.view {
            View::Dashboard => self.render_dashboard(ctx),
            View::Chat => self.render_chat(ctx),
        }
    }
}

impl Drop for FaqboardApp {
    fn drop(&mut self) {
        self.scheduler.stop();
    }
}

fn truncate_cell(value: &str) -> String {
    let first_line = value.lines().next().unwrap_or(value);
    if first_line.chars().count() <= CELL_MAX_CHARS {
        return first_line.to_string();
    }
    first_line.chars().take(CELL_MAX_CHARS).collect::<String>() + "…"
}

#[cfg(test)]
mod tests {
    use super::truncate_cell;

    #[test]
    fn truncate_cell_keeps_short_values_and_first_lines() {
        assert_eq!(truncate_cell("short"), "short");
        assert_eq!(truncate_cell("first\nsecond"), "first");
    }

    #[test]
    fn truncate_cell_caps_long_values() {
        let long = "a".repeat(100);
        let cell = truncate_cell(&long);
        assert_eq!(cell.chars().count(), 49);
        assert!(cell.ends_with('…'));
    }
}
