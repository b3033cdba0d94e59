//! Application state management for campboard.
//!
//! This module contains the `App` struct that owns the board for the active
//! event, the API client and cache, UI state, and the channel that background
//! refreshes and mutations report back on.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use campboard_core::api::ApiClient;
use campboard_core::board::{
    Board, DragHandle, MutationOutcome, MutationPipeline, Notice, Operation, Rect, ZoneId,
};
use campboard_core::cache::CacheManager;
use campboard_core::config::Config;
use campboard_core::models::BoardSnapshot;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Manhattan distance in cells a press has to travel before it becomes a drag.
/// Shorter presses are clicks.
pub const DRAG_THRESHOLD: u16 = 2;

/// Rows scrolled per wheel notch or page key.
pub const SCROLL_STEP: u16 = 3;

// ============================================================================
// UI State Types
// ============================================================================

/// Companion dialogs reachable from the board. They only open and close here;
/// editing records happens elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialog {
    /// Cabin and bunk definitions
    BunkManager,
    /// Which bunks are active for this event
    EventBunks,
}

impl Dialog {
    pub fn title(&self) -> &'static str {
        match self {
            Dialog::BunkManager => "Cabins & Bunks",
            Dialog::EventBunks => "Bunks in this Event",
        }
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    ShowingDialog(Dialog),
    ConfirmingQuit,
    Quitting,
}

/// Side lists that scroll independently of the bunk area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolList {
    Campers,
    Counselors,
}

/// A pool list's box on screen and how far its window can scroll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolViewport {
    pub area: Rect,
    pub max_scroll: u16,
}

/// Where everything landed on screen in the last frame. Hit-testing for the
/// next input event runs against this.
#[derive(Debug, Clone, Default)]
pub struct BoardLayout {
    /// Drop targets in render order
    pub zones: Vec<(ZoneId, Rect)>,
    /// Draggable cards
    pub cards: Vec<(DragHandle, Rect)>,
    /// "[x]" remove-counselor controls by bunk id
    pub remove_controls: Vec<(String, Rect)>,
    /// Title-bar buttons that open a dialog
    pub dialog_controls: Vec<(Dialog, Rect)>,
    /// Height of the scrollable bunk area's content and viewport, in rows
    pub content_height: u16,
    pub viewport_height: u16,
    pub camper_pool: PoolViewport,
    pub counselor_pool: PoolViewport,
}

/// A press on a card that has not yet moved far enough to be a drag
#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingPress {
    handle: DragHandle,
    origin: (u16, u16),
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Messages from spawned tasks back to the UI loop.
enum RefreshResult {
    /// A full snapshot for the active event
    Snapshot(BoardSnapshot),
    /// A mutation finished (either way)
    Mutation(MutationOutcome),
    /// A refresh failed
    Error(String),
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    pub config: Config,
    api: ApiClient,
    cache: CacheManager,
    pipeline: MutationPipeline<ApiClient>,

    pub board: Board,
    pub state: AppState,

    /// Index into `bunk_ids()`
    pub selected_bunk: usize,
    /// Rows the bunk area is scrolled down by
    pub scroll: u16,
    /// First visible row of each pool list
    camper_pool_scroll: u16,
    counselor_pool_scroll: u16,

    layout: BoardLayout,
    pending_press: Option<PendingPress>,

    // Status bar
    pub notice: Option<Notice>,
    pub status_message: Option<String>,
    pub cache_age: String,
    pub in_flight: usize,

    refreshing: bool,
    /// A mutation finished while a refresh was already running; fetch again
    /// once it lands so the board reflects the write.
    refresh_queued: bool,

    refresh_rx: mpsc::Receiver<RefreshResult>,
    refresh_tx: mpsc::Sender<RefreshResult>,
}

impl App {
    /// Create the application for the event given on the command line, the
    /// configured event, or the one used last, in that order.
    pub fn new(cli_event: Option<&str>) -> Result<Self> {
        let mut config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let event_id = config.resolve_event_id(cli_event).ok_or_else(|| {
            anyhow!("No event selected. Pass --event <id> or set CAMPBOARD_EVENT_ID.")
        })?;
        debug!(event_id = %event_id, api = config.api_base_url(), "Config loaded");

        let cache_dir = config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));
        let cache = CacheManager::new(cache_dir)?;

        let mut api = ApiClient::new(config.api_base_url())?;
        if let Some(ref token) = config.api_token {
            api.set_token(token.clone());
        }

        if config.last_event_id.as_deref() != Some(event_id.as_str()) {
            config.last_event_id = Some(event_id.clone());
            if let Err(e) = config.save() {
                warn!(error = %e, "Failed to save config");
            }
        }

        Ok(Self::with_parts(config, api, cache, event_id))
    }

    pub fn with_parts(config: Config, api: ApiClient, cache: CacheManager, event_id: String) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let pipeline = MutationPipeline::new(api.clone(), event_id.clone());

        Self {
            config,
            api,
            cache,
            pipeline,

            board: Board::new(event_id),
            state: AppState::Normal,

            selected_bunk: 0,
            scroll: 0,
            camper_pool_scroll: 0,
            counselor_pool_scroll: 0,

            layout: BoardLayout::default(),
            pending_press: None,

            notice: None,
            status_message: None,
            cache_age: "never".to_string(),
            in_flight: 0,

            refreshing: false,
            refresh_queued: false,

            refresh_rx: rx,
            refresh_tx: tx,
        }
    }

    pub fn event_id(&self) -> &str {
        self.board.event_id()
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Show the cached snapshot for the active event, if there is one
    pub fn load_from_cache(&mut self) {
        match self.cache.load_snapshot(self.board.event_id()) {
            Ok(Some(cached)) => {
                self.cache_age = cached.age_display();
                self.board.replace_snapshot(cached.data);
                self.clamp_selection();
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Failed to load cached snapshot"),
        }
    }

    pub fn is_cache_stale(&self) -> bool {
        self.cache.is_snapshot_stale(self.board.event_id())
    }

    // =========================================================================
    // Background Work
    // =========================================================================

    /// Helper to send results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<RefreshResult>, result: RefreshResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send background result - channel closed");
        }
    }

    /// Spawn a background fetch of the whole snapshot
    pub fn refresh_background(&mut self) {
        if self.refreshing {
            self.refresh_queued = true;
            return;
        }
        self.refreshing = true;
        self.status_message = Some("Refreshing board...".to_string());

        let api = self.api.clone();
        let event_id = self.board.event_id().to_string();
        let tx = self.refresh_tx.clone();
        info!(event_id = %event_id, "Starting background refresh");

        tokio::spawn(async move {
            let result = match api.fetch_snapshot(&event_id).await {
                Ok(snapshot) => RefreshResult::Snapshot(snapshot),
                Err(e) => {
                    error!(error = %e, "Snapshot refresh failed");
                    RefreshResult::Error(e.to_string())
                }
            };
            Self::send_result(&tx, result).await;
        });
    }

    /// Spawn the write for a resolved operation. `NoOp` does nothing.
    pub fn run_operation(&mut self, operation: Operation) {
        if operation.is_noop() {
            return;
        }
        info!(op = operation.kind(), detail = %operation, "Running operation");
        self.in_flight += 1;

        let pipeline = self.pipeline.clone();
        let tx = self.refresh_tx.clone();
        tokio::spawn(async move {
            if let Some(outcome) = pipeline.execute(operation).await {
                Self::send_result(&tx, RefreshResult::Mutation(outcome)).await;
            }
        });
    }

    /// Drain everything the background tasks have reported
    pub fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.refresh_rx.try_recv() {
            results.push(result);
        }
        for result in results {
            self.process_refresh_result(result);
        }
    }

    fn process_refresh_result(&mut self, result: RefreshResult) {
        match result {
            RefreshResult::Snapshot(snapshot) => {
                if let Err(e) = self.cache.save_snapshot(&snapshot) {
                    warn!(error = %e, "Failed to cache snapshot");
                }
                self.board.replace_snapshot(snapshot);
                self.cache_age = "just now".to_string();
                self.status_message = None;
                self.refreshing = false;
                self.clamp_selection();
                self.run_queued_refresh();
            }
            RefreshResult::Mutation(outcome) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                debug!(op = outcome.operation.kind(), error = outcome.notice.is_error(), "Mutation reported");
                self.notice = Some(outcome.notice);
                if outcome.refresh {
                    self.refresh_background();
                }
            }
            RefreshResult::Error(message) => {
                self.refreshing = false;
                self.status_message = Some(format!("Refresh failed: {}", message));
                self.run_queued_refresh();
            }
        }
    }

    fn run_queued_refresh(&mut self) {
        if self.refresh_queued {
            self.refresh_queued = false;
            self.refresh_background();
        }
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Adopt the layout produced by the last frame
    pub fn apply_layout(&mut self, layout: BoardLayout) {
        self.board.set_zones(layout.zones.iter().cloned());
        self.layout = layout;
        self.clamp_scroll();
    }

    // =========================================================================
    // Pointer Gestures
    // =========================================================================

    /// Left button pressed. Controls act immediately; a card press is armed
    /// and becomes a drag once the pointer moves past the threshold.
    pub fn mouse_down(&mut self, x: u16, y: u16) -> Operation {
        self.pending_press = None;

        if let Some(bunk_id) = hit(&self.layout.remove_controls, x, y).cloned() {
            return self.board.remove_counselor(&bunk_id);
        }

        if let Some(dialog) = hit(&self.layout.dialog_controls, x, y).copied() {
            self.open_dialog(dialog);
            return Operation::NoOp;
        }

        if let Some(handle) = hit(&self.layout.cards, x, y).cloned() {
            debug!(?handle, x, y, "Card pressed");
            self.pending_press = Some(PendingPress {
                handle,
                origin: (x, y),
            });
        }

        if let Some(ZoneId::Bunk(bunk_id)) = self.board.zones().hit_test(x, y).cloned() {
            self.select_bunk(&bunk_id);
        }
        Operation::NoOp
    }

    /// Pointer moved with the left button held
    pub fn mouse_drag(&mut self, x: u16, y: u16) {
        if self.board.is_dragging() {
            self.board.pointer_move(x, y);
            return;
        }

        let Some(press) = self.pending_press.as_ref() else {
            return;
        };
        if manhattan(press.origin, (x, y)) < DRAG_THRESHOLD {
            return;
        }

        if let Some(press) = self.pending_press.take() {
            let (ox, oy) = press.origin;
            if self.board.pointer_down(&press.handle, ox, oy) {
                self.board.pointer_move(x, y);
            } else {
                debug!(handle = ?press.handle, "Card no longer resolves, ignoring drag");
            }
        }
    }

    /// Left button released. Returns the operation the drop implies.
    pub fn mouse_up(&mut self, x: u16, y: u16) -> Operation {
        self.pending_press = None;
        self.board.pointer_up(x, y)
    }

    /// Escape during a gesture
    pub fn cancel_drag(&mut self) -> bool {
        let was_active = self.board.is_dragging() || self.pending_press.is_some();
        self.pending_press = None;
        self.board.cancel();
        was_active
    }

    // =========================================================================
    // Selection & Scrolling
    // =========================================================================

    /// Bunk ids in display order (cabin groups, then "no cabin")
    pub fn bunk_ids(&self) -> Vec<String> {
        self.board
            .groups()
            .iter()
            .flat_map(|g| g.bunks.iter().map(|s| s.bunk.id.clone()))
            .collect()
    }

    pub fn selected_bunk_id(&self) -> Option<String> {
        self.bunk_ids().get(self.selected_bunk).cloned()
    }

    pub fn select_next(&mut self) {
        let count = self.bunk_ids().len();
        if count > 0 {
            self.selected_bunk = (self.selected_bunk + 1) % count;
        }
    }

    pub fn select_prev(&mut self) {
        let count = self.bunk_ids().len();
        if count > 0 {
            self.selected_bunk = (self.selected_bunk + count - 1) % count;
        }
    }

    fn select_bunk(&mut self, bunk_id: &str) {
        if let Some(index) = self.bunk_ids().iter().position(|id| id == bunk_id) {
            self.selected_bunk = index;
        }
    }

    fn clamp_selection(&mut self) {
        let count = self.bunk_ids().len();
        if self.selected_bunk >= count {
            self.selected_bunk = count.saturating_sub(1);
        }
    }

    /// Operation for the keyboard "remove counselor" shortcut
    pub fn remove_selected_counselor(&self) -> Operation {
        match self.selected_bunk_id() {
            Some(bunk_id) => self.board.remove_counselor(&bunk_id),
            None => Operation::NoOp,
        }
    }

    fn max_scroll(&self) -> u16 {
        self.layout
            .content_height
            .saturating_sub(self.layout.viewport_height)
    }

    fn clamp_scroll(&mut self) {
        self.scroll = self.scroll.min(self.max_scroll());
        self.camper_pool_scroll = self.camper_pool_scroll.min(self.layout.camper_pool.max_scroll);
        self.counselor_pool_scroll = self
            .counselor_pool_scroll
            .min(self.layout.counselor_pool.max_scroll);
    }

    pub fn scroll_down(&mut self, rows: u16) {
        self.scroll = self.scroll.saturating_add(rows).min(self.max_scroll());
    }

    pub fn scroll_up(&mut self, rows: u16) {
        self.scroll = self.scroll.saturating_sub(rows);
    }

    pub fn pool_scroll(&self, pool: PoolList) -> u16 {
        match pool {
            PoolList::Campers => self.camper_pool_scroll,
            PoolList::Counselors => self.counselor_pool_scroll,
        }
    }

    pub fn scroll_pool_down(&mut self, pool: PoolList, rows: u16) {
        let (offset, viewport) = self.pool_offset_mut(pool);
        *offset = offset.saturating_add(rows).min(viewport.max_scroll);
    }

    pub fn scroll_pool_up(&mut self, pool: PoolList, rows: u16) {
        let (offset, _) = self.pool_offset_mut(pool);
        *offset = offset.saturating_sub(rows);
    }

    fn pool_offset_mut(&mut self, pool: PoolList) -> (&mut u16, PoolViewport) {
        match pool {
            PoolList::Campers => (&mut self.camper_pool_scroll, self.layout.camper_pool),
            PoolList::Counselors => (&mut self.counselor_pool_scroll, self.layout.counselor_pool),
        }
    }

    /// Mouse wheel: scroll whichever list is under the pointer
    pub fn scroll_wheel(&mut self, x: u16, y: u16, down: bool) {
        let pool = if self.layout.camper_pool.area.contains(x, y) {
            Some(PoolList::Campers)
        } else if self.layout.counselor_pool.area.contains(x, y) {
            Some(PoolList::Counselors)
        } else {
            None
        };
        match (pool, down) {
            (Some(pool), true) => self.scroll_pool_down(pool, SCROLL_STEP),
            (Some(pool), false) => self.scroll_pool_up(pool, SCROLL_STEP),
            (None, true) => self.scroll_down(SCROLL_STEP),
            (None, false) => self.scroll_up(SCROLL_STEP),
        }
    }

    // =========================================================================
    // Overlays
    // =========================================================================

    pub fn open_dialog(&mut self, dialog: Dialog) {
        self.cancel_drag();
        info!(dialog = dialog.title(), "Dialog opened");
        self.state = AppState::ShowingDialog(dialog);
    }

    pub fn close_overlay(&mut self) {
        self.state = AppState::Normal;
    }

    pub fn toggle_help(&mut self) {
        self.cancel_drag();
        self.state = match self.state {
            AppState::ShowingHelp => AppState::Normal,
            _ => AppState::ShowingHelp,
        };
    }
}

/// First registered element whose rect contains the point
fn hit<T>(items: &[(T, Rect)], x: u16, y: u16) -> Option<&T> {
    items
        .iter()
        .find(|(_, rect)| rect.contains(x, y))
        .map(|(item, _)| item)
}

fn manhattan(a: (u16, u16), b: (u16, u16)) -> u16 {
    a.0.abs_diff(b.0).saturating_add(a.1.abs_diff(b.1))
}

// ============================================================================
// Tests
// ============================================================================
