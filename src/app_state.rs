use std::path::PathBuf;
use std::time::{Duration, Instant};

use arboard::Clipboard;
use ratatui::widgets::TableState;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api_client::{ApiCommand, ApiEvent};
use crate::articles::{load_articles, ArticleTable};
use crate::config::{AppConfig, ClipboardFailure};
use crate::error::ClientError;
use crate::export::export_articles;
use crate::models::{ArticleRow, InputMode, NotificationKind, Stats, ToolbarButton};

/// Timing and profile switches the controller runs with.
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub notification_ttl: Duration,
    pub click_effect: Duration,
    pub auto_refresh: Option<Duration>,
    pub reload_delay: Option<Duration>,
    pub numbered_shortcuts: bool,
    pub clipboard_failure: ClipboardFailure,
    pub export_dir: PathBuf,
    pub articles_path: Option<PathBuf>,
}

impl ControllerSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            notification_ttl: config.ui.notification_ttl(),
            click_effect: config.ui.click_effect(),
            auto_refresh: config.profile.auto_refresh_interval(),
            reload_delay: config.profile.reload_delay(),
            numbered_shortcuts: config.profile.numbered_shortcuts,
            clipboard_failure: config.ui.clipboard_failure,
            export_dir: config.ui.export_dir.clone(),
            articles_path: config.articles.path.clone(),
        }
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SlotContent {
    Loading,
    Message {
        text: String,
        kind: NotificationKind,
    },
}

/// The single status region under the toolbar.
#[derive(Debug, Default)]
pub struct NotificationSlot {
    content: Option<SlotContent>,
    visible: bool,
    hide_at: Option<Instant>,
}

impl NotificationSlot {
    pub fn current(&self) -> Option<&SlotContent> {
        self.content.as_ref().filter(|_| self.visible)
    }

    fn show(&mut self, content: SlotContent, hide_at: Option<Instant>) {
        self.content = Some(content);
        self.visible = true;
        self.hide_at = hide_at;
    }

    fn hide(&mut self) {
        self.visible = false;
        self.hide_at = None;
    }

    fn expire(&mut self, now: Instant) {
        if self.hide_at.is_some_and(|t| now >= t) {
            self.hide();
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatCard {
    pub value: u64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterSummary {
    pub visible: bool,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct ButtonState {
    pub button: ToolbarButton,
    pressed_until: Option<Instant>,
}

/// Icon shown next to a source's card.
pub fn source_icon(source: &str) -> &'static str {
    match source.to_lowercase().as_str() {
        "arxiv" => "📄",
        "techcrunch" => "📰",
        "theverge" => "📱",
        "youtube" => "🎥",
        _ => "📊",
    }
}

pub struct App {
    pub settings: ControllerSettings,
    pub is_loading: bool,
    pub slot: NotificationSlot,
    pub stats_cards: Option<Vec<StatCard>>,
    pub table: ArticleTable,
    pub table_state: TableState,
    pub filter_query: String,
    pub filter_summary: Option<FilterSummary>,
    pub input_mode: InputMode,
    pub buttons: Vec<ButtonState>,
    pub show_help: bool,
    pub clipboard: Option<Clipboard>,
    pub api_tx: mpsc::Sender<ApiCommand>,
    pub api_rx: mpsc::Receiver<ApiEvent>,
    pub next_auto_refresh: Option<Instant>,
    pub reload_at: Option<Instant>,
    pub spinner: usize,
}

impl App {
    pub fn new(
        settings: ControllerSettings,
        rows: Vec<ArticleRow>,
        api_tx: mpsc::Sender<ApiCommand>,
        api_rx: mpsc::Receiver<ApiEvent>,
    ) -> Self {
        Self {
            settings,
            is_loading: false,
            slot: NotificationSlot::default(),
            stats_cards: None,
            table: ArticleTable::new(rows),
            table_state: TableState::default(),
            filter_query: String::new(),
            filter_summary: None,
            input_mode: InputMode::Normal,
            buttons: Vec::new(),
            show_help: false,
            clipboard: Clipboard::new().ok(),
            api_tx,
            api_rx,
            next_auto_refresh: None,
            reload_at: None,
            spinner: 0,
        }
    }

    /// Wires the dashboard up: buttons, row selection, auto-refresh, first stats fetch.
    pub fn init(&mut self, now: Instant) {
        self.buttons = ToolbarButton::ALL
            .into_iter()
            .map(|button| ButtonState {
                button,
                pressed_until: None,
            })
            .collect();
        self.select_first_visible();
        self.next_auto_refresh = self.settings.auto_refresh.map(|every| now + every);
        self.refresh_stats();
    }

    // ========== Buttons ==========

    pub fn add_click_effect(&mut self, button: ToolbarButton) {
        let until = Instant::now() + self.settings.click_effect;
        if let Some(state) = self.buttons.iter_mut().find(|b| b.button == button) {
            state.pressed_until = Some(until);
        }
    }

    pub fn is_pressed(&self, button: ToolbarButton, now: Instant) -> bool {
        self.buttons
            .iter()
            .find(|b| b.button == button)
            .and_then(|b| b.pressed_until)
            .is_some_and(|until| now < until)
    }

    pub fn press_button(&mut self, button: ToolbarButton) {
        self.add_click_effect(button);
        match button {
            ToolbarButton::RefreshStats => self.refresh_stats(),
            ToolbarButton::Export => {
                self.export_data();
            }
            _ => {
                if let Some(source) = button.source() {
                    self.update_source(source);
                }
            }
        }
    }

    // ========== Backend calls ==========

    /// Asks the backend to refresh `source`. Dropped while another update is
    /// in flight. Returns whether a request was issued.
    pub fn update_source(&mut self, source: &str) -> bool {
        if self.is_loading {
            debug!(source, "update already in flight, ignoring");
            return false;
        }
        self.is_loading = true;
        self.show_loading_state(true);

        match self.api_tx.try_send(ApiCommand::Update(source.to_string())) {
            Ok(()) => {
                info!(source, "update requested");
                true
            }
            Err(e) => {
                let reason = match e {
                    mpsc::error::TrySendError::Full(_) => "request queue is full",
                    mpsc::error::TrySendError::Closed(_) => "backend worker stopped",
                };
                self.apply_update_result(source, Err(ClientError::Transport(reason.into())));
                false
            }
        }
    }

    pub fn refresh_stats(&mut self) {
        if let Err(e) = self.api_tx.try_send(ApiCommand::RefreshStats) {
            warn!(error = %e, "could not request stats");
        }
    }

    pub fn poll_api_events(&mut self) {
        while let Ok(event) = self.api_rx.try_recv() {
            self.apply_event(event);
        }
    }

    pub fn apply_event(&mut self, event: ApiEvent) {
        match event {
            ApiEvent::Updated { source, result } => self.apply_update_result(&source, result),
            ApiEvent::Stats(result) => self.apply_stats_result(result),
        }
    }

    pub fn apply_update_result(&mut self, source: &str, result: Result<String, ClientError>) {
        match result {
            Ok(message) => {
                self.show_notification(format!("✅ {}", message), NotificationKind::Success);
                self.refresh_stats();
                if let Some(delay) = self.settings.reload_delay {
                    self.reload_at = Some(Instant::now() + delay);
                }
            }
            Err(ClientError::RequestFailed { status, detail }) => {
                warn!(source, status, %detail, "update rejected");
                self.show_notification(format!("❌ Error: {}", detail), NotificationKind::Error);
            }
            Err(e) => {
                self.show_notification(
                    format!("❌ Connection error: {}", e),
                    NotificationKind::Error,
                );
            }
        }
        self.is_loading = false;
        self.show_loading_state(false);
    }

    /// Stats failures only reach the log; the panel keeps what it had.
    pub fn apply_stats_result(&mut self, result: Result<Stats, ClientError>) {
        match result {
            Ok(stats) => self.display_stats(&stats),
            Err(e) => warn!(error = %e, "failed to load stats"),
        }
    }

    pub fn display_stats(&mut self, stats: &Stats) {
        let mut cards = Vec::with_capacity(stats.by_source.len() + 1);
        cards.push(StatCard {
            value: stats.total_articles,
            label: "Total Articles".into(),
        });
        cards.extend(stats.by_source.iter().map(|(source, count)| StatCard {
            value: *count,
            label: format!("{} {}", source_icon(source), source),
        }));
        self.stats_cards = Some(cards);
    }

    // ========== Notification slot ==========

    pub fn show_notification(&mut self, message: impl Into<String>, kind: NotificationKind) {
        let hide_at = Instant::now() + self.settings.notification_ttl;
        self.slot.show(
            SlotContent::Message {
                text: message.into(),
                kind,
            },
            Some(hide_at),
        );
    }

    pub fn show_loading_state(&mut self, loading: bool) {
        if loading {
            self.slot.show(SlotContent::Loading, None);
        } else if self.slot.current() == Some(&SlotContent::Loading) {
            self.slot.hide();
        }
    }

    pub fn notification(&self) -> Option<&SlotContent> {
        self.slot.current()
    }

    // ========== Filtering ==========

    pub fn filter_articles(&mut self, term: &str) {
        let visible = self.table.apply_filter(term);
        self.show_filter_results(visible, self.table.len());
        self.select_first_visible();
    }

    pub fn show_filter_results(&mut self, visible: usize, total: usize) {
        let summary = self.filter_summary.get_or_insert_with(|| FilterSummary {
            visible: false,
            text: String::new(),
        });
        if visible == total {
            summary.visible = false;
        } else {
            summary.visible = true;
            summary.text = format!("Showing {} of {} articles", visible, total);
        }
    }

    pub fn filter_summary_text(&self) -> Option<&str> {
        self.filter_summary
            .as_ref()
            .filter(|s| s.visible)
            .map(|s| s.text.as_str())
    }

    pub fn start_filter(&mut self) {
        self.input_mode = InputMode::Filter;
    }

    pub fn exit_filter(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn push_filter_char(&mut self, c: char) {
        self.filter_query.push(c);
        let term = self.filter_query.clone();
        self.filter_articles(&term);
    }

    pub fn pop_filter_char(&mut self) {
        self.filter_query.pop();
        let term = self.filter_query.clone();
        self.filter_articles(&term);
    }

    pub fn clear_filter(&mut self) {
        self.filter_query.clear();
        self.filter_articles("");
    }

    // ========== Export ==========

    pub fn export_data(&mut self) -> Option<PathBuf> {
        match export_articles(self.table.rows(), &self.settings.export_dir) {
            Ok(path) => {
                info!(path = %path.display(), rows = self.table.len(), "articles exported");
                self.show_notification(
                    format!("💾 Exported {} articles to {}", self.table.len(), path.display()),
                    NotificationKind::Success,
                );
                Some(path)
            }
            Err(e) => {
                warn!(error = %e, "export failed");
                self.show_notification(format!("❌ Export failed: {}", e), NotificationKind::Error);
                None
            }
        }
    }

    // ========== Row navigation ==========

    fn select_first_visible(&mut self) {
        let any = self.table.visible_count() > 0;
        self.table_state.select(if any { Some(0) } else { None });
    }

    pub fn next(&mut self) {
        let len = self.table.visible_count();
        if len == 0 {
            return;
        }
        let i = self
            .table_state
            .selected()
            .map(|i| (i + 1).min(len - 1))
            .unwrap_or(0);
        self.table_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.table.visible_count() == 0 {
            return;
        }
        let i = self
            .table_state
            .selected()
            .map(|i| i.saturating_sub(1))
            .unwrap_or(0);
        self.table_state.select(Some(i));
    }

    pub fn selected_row(&self) -> Option<&ArticleRow> {
        let pos = self.table_state.selected()?;
        let index = *self.table.visible_indices().get(pos)?;
        self.table.rows().get(index)
    }

    /// The link Enter should open for the selected row.
    pub fn activate_selected(&self) -> Option<String> {
        self.selected_row().and_then(|row| row.link.clone())
    }

    pub fn copy_selected(&mut self) {
        let text = self
            .selected_row()
            .map(|row| match &row.link {
                Some(link) => format!("{}\n{}", row.title.trim(), link),
                None => row.title.trim().to_string(),
            });
        if let Some(text) = text {
            crate::utils::copy_to_clipboard(self, &text);
        }
    }

    // ========== Timers ==========

    pub fn tick(&mut self, now: Instant) {
        self.spinner = (self.spinner + 1) % 10;
        self.slot.expire(now);
        for state in &mut self.buttons {
            if state.pressed_until.is_some_and(|until| now >= until) {
                state.pressed_until = None;
            }
        }

        if let (Some(due), Some(every)) = (self.next_auto_refresh, self.settings.auto_refresh) {
            if now >= due {
                if !self.is_loading {
                    self.show_notification(
                        "🔄 Refreshing data automatically...",
                        NotificationKind::Info,
                    );
                    self.refresh_stats();
                }
                self.next_auto_refresh = Some(now + every);
            }
        }

        if self.reload_at.is_some_and(|at| now >= at) {
            self.reload_at = None;
            self.reload();
        }
    }

    /// Re-reads the article source and refetches stats, like a fresh page.
    pub fn reload(&mut self) {
        if let Some(path) = self.settings.articles_path.clone() {
            match load_articles(&path) {
                Ok(rows) => {
                    info!(rows = rows.len(), "articles reloaded");
                    self.table = ArticleTable::new(rows);
                }
                Err(e) => {
                    warn!(error = %e, "article reload failed");
                    self.show_notification(format!("❌ Error: {:#}", e), NotificationKind::Error);
                }
            }
        }
        self.exit_filter();
        self.filter_query.clear();
        self.filter_summary = None;
        self.table.apply_filter("");
        self.select_first_visible();
        self.refresh_stats();
    }
}
