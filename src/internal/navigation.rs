//! Navigation state machine.
//!
//! [`update`] is a pure reducer: it takes the current [`NavigationState`] and one
//! [`Event`], and returns the next state plus at most one [`Command`] for the runtime
//! to execute. Command results come back as events (`TopMenuLoaded`, `PageLoaded`,
//! `TopicLoaded`, `FetchFailed`).

use std::ops::Range;

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::internal::models::{Item, MenuEntry, TopMenu, page_window};

/// Rows taken by the header, the footer and one spare line.
pub const CHROME_ROWS: u16 = 3;

/// Page size used until the terminal size is known.
pub const DEFAULT_PAGE_SIZE: usize = 15;

/// User intents produced by key bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Action {
    Quit,
    CursorUp,
    CursorDown,
    PageNext,
    PagePrev,
    Select,
    Back,
    Refresh,
    OpenBrowser,
    ScrollUp,
    ScrollDown,
    ScrollPageUp,
    ScrollPageDown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Resized { width: u16, height: u16 },
    Input(Action),
    TopMenuLoaded(TopMenu),
    PageLoaded(TopMenu),
    TopicLoaded(Item),
    FetchFailed(String),
    /// Geometry of the body as last drawn.
    BodyLaidOut(BodyLayout),
}

/// Side effects requested by the reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Fetch the ranked id list and enrich `page`.
    LoadTopMenu { page: usize, page_size: usize },
    /// Enrich `page` of `menu` and hand the updated snapshot back.
    EnrichPage {
        menu: TopMenu,
        page: usize,
        page_size: usize,
    },
    FetchTopic { id: u32 },
    OpenUrl(String),
}

/// Wrapped row geometry of the body, measured by the view at its current width.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BodyLayout {
    /// Rows taken by each choice, in display order.
    pub choices: Vec<Range<usize>>,
    pub rows: usize,
    /// Body rows visible at once.
    pub viewport: usize,
}

impl BodyLayout {
    /// Largest offset that still fills the viewport.
    pub fn max_offset(&self) -> usize {
        self.rows.saturating_sub(self.viewport)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Phase {
    #[default]
    Running,
    Quit,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavigationState {
    /// 1-indexed page into the top menu.
    pub current_page: usize,
    pub page_size: usize,
    /// Position within the displayed choices: stories of the page, or replies of the topic.
    pub cursor: usize,
    /// First body row shown.
    pub scroll: usize,
    pub body: BodyLayout,
    /// Drill-down path. Empty means the top-level listing is shown.
    pub history: Vec<Item>,
    pub top_menu: TopMenu,
    /// Set once the terminal size is known; nothing is fetched before that.
    pub ready: bool,
    pub width: u16,
    pub height: u16,
    /// A fetch command is outstanding.
    pub loading: bool,
    pub phase: Phase,
    fixed_page_size: Option<usize>,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::new(None)
    }
}

impl NavigationState {
    /// Initial state: top level, page 1, not ready. `fixed_page_size` overrides the
    /// height-derived page size.
    pub fn new(fixed_page_size: Option<usize>) -> Self {
        let fixed_page_size = fixed_page_size.filter(|size| *size > 0);
        Self {
            current_page: 1,
            page_size: fixed_page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            cursor: 0,
            scroll: 0,
            body: BodyLayout::default(),
            history: Vec::new(),
            top_menu: TopMenu::default(),
            ready: false,
            width: 0,
            height: 0,
            loading: false,
            phase: Phase::Running,
            fixed_page_size,
        }
    }

    pub fn current_topic(&self) -> Option<&Item> {
        self.history.last()
    }

    pub fn is_top_level(&self) -> bool {
        self.history.is_empty()
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Top-menu entries of the current page.
    pub fn page_entries(&self) -> &[MenuEntry] {
        self.top_menu.window(self.current_page, self.page_size)
    }

    /// Number of selectable rows in the current view.
    pub fn choice_count(&self) -> usize {
        match self.current_topic() {
            Some(topic) => topic.children.len(),
            None => self.page_entries().len(),
        }
    }

    fn page_start(&self) -> usize {
        page_window(self.current_page, self.page_size, self.top_menu.len()).start
    }

    fn selected_entry(&self) -> Option<&MenuEntry> {
        self.top_menu
            .get(self.page_start() + self.cursor)
            .filter(|_| self.cursor < self.page_entries().len())
    }

    fn has_next_page(&self) -> bool {
        self.current_page.saturating_mul(self.page_size) < self.top_menu.len()
    }

    fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.choice_count().saturating_sub(1));
    }

    /// Back to the top of a body that has not been laid out yet.
    fn reset_scroll(&mut self) {
        self.scroll = 0;
        self.body = BodyLayout::default();
    }

    fn scroll_by(&mut self, delta: isize) {
        self.scroll = self
            .scroll
            .saturating_add_signed(delta)
            .min(self.body.max_offset());
    }

    /// Move the offset the least needed to show the cursor choice, preferring its
    /// first row when it is taller than the viewport. The first choice always scrolls
    /// back to the top so the topic block is visible.
    fn reveal_cursor(&mut self) {
        if self.cursor == 0 {
            self.scroll = 0;
            return;
        }
        let Some(rows) = self.body.choices.get(self.cursor) else {
            return;
        };
        if rows.end > self.scroll + self.body.viewport {
            self.scroll = rows.end.saturating_sub(self.body.viewport);
        }
        if rows.start < self.scroll {
            self.scroll = rows.start;
        }
    }
}

/// Stories that fit below the header and above the footer.
pub fn page_size_for_height(height: u16) -> usize {
    usize::from(height.saturating_sub(CHROME_ROWS)).max(1)
}

/// Apply one event. Events other than resizes are ignored once the session has ended.
pub fn update(mut state: NavigationState, event: Event) -> (NavigationState, Option<Command>) {
    if !state.is_running() {
        return (state, None);
    }

    let command = match event {
        Event::Resized { width, height } => on_resize(&mut state, width, height),
        Event::Input(action) => on_action(&mut state, action),
        Event::TopMenuLoaded(menu) | Event::PageLoaded(menu) => {
            state.loading = false;
            state.top_menu = menu;
            if state.is_top_level() {
                state.clamp_cursor();
            }
            None
        }
        Event::TopicLoaded(topic) => {
            state.loading = false;
            if state.current_topic().map(|t| t.id) != Some(topic.id) {
                state.history.push(topic);
            }
            state.cursor = 0;
            state.reset_scroll();
            None
        }
        Event::BodyLaidOut(layout) => {
            state.scroll = state.scroll.min(layout.max_offset());
            state.body = layout;
            None
        }
        Event::FetchFailed(message) => {
            tracing::error!(%message, "fetch failed, ending session");
            state.loading = false;
            state.phase = Phase::Failed(message);
            None
        }
    };

    if command.as_ref().is_some_and(is_fetch) {
        state.loading = true;
    }
    (state, command)
}

fn is_fetch(command: &Command) -> bool {
    !matches!(command, Command::OpenUrl(_))
}

fn on_resize(state: &mut NavigationState, width: u16, height: u16) -> Option<Command> {
    state.width = width;
    state.height = height;
    if state.ready {
        return None;
    }

    state.ready = true;
    state.page_size = state
        .fixed_page_size
        .unwrap_or_else(|| page_size_for_height(height));
    tracing::debug!(width, height, page_size = state.page_size, "viewport ready");
    Some(Command::LoadTopMenu {
        page: state.current_page,
        page_size: state.page_size,
    })
}

fn on_action(state: &mut NavigationState, action: Action) -> Option<Command> {
    match action {
        Action::Quit => {
            state.phase = Phase::Quit;
            None
        }
        Action::CursorUp => {
            state.cursor = state.cursor.saturating_sub(1);
            state.reveal_cursor();
            None
        }
        Action::CursorDown => {
            if state.cursor + 1 < state.choice_count() {
                state.cursor += 1;
            }
            state.reveal_cursor();
            None
        }
        Action::ScrollUp => {
            state.scroll_by(-1);
            None
        }
        Action::ScrollDown => {
            state.scroll_by(1);
            None
        }
        Action::ScrollPageUp => {
            state.scroll_by(-page_step(state));
            None
        }
        Action::ScrollPageDown => {
            state.scroll_by(page_step(state));
            None
        }
        Action::PageNext => {
            if !state.is_top_level() || !state.has_next_page() {
                return None;
            }
            state.current_page += 1;
            state.cursor = 0;
            state.reset_scroll();
            ensure_page_loaded(state)
        }
        Action::PagePrev => {
            if !state.is_top_level() || state.current_page <= 1 {
                return None;
            }
            state.current_page -= 1;
            state.cursor = 0;
            state.reset_scroll();
            ensure_page_loaded(state)
        }
        Action::Select => {
            let target = match state.current_topic() {
                Some(topic) => topic.children.get(state.cursor).map(|c| c.id),
                None => state.selected_entry().map(MenuEntry::id),
            };
            target.map(|id| Command::FetchTopic { id })
        }
        Action::Back => {
            state.cursor = 0;
            state.reset_scroll();
            if state.history.pop().is_some() {
                return match state.is_top_level() {
                    true => ensure_page_loaded(state),
                    false => None,
                };
            }
            if state.current_page > 1 {
                state.current_page -= 1;
                return ensure_page_loaded(state);
            }
            None
        }
        Action::Refresh => {
            if !state.ready {
                return None;
            }
            state.top_menu = TopMenu::default();
            state.current_page = 1;
            if state.is_top_level() {
                state.cursor = 0;
                state.reset_scroll();
            }
            Some(Command::LoadTopMenu {
                page: 1,
                page_size: state.page_size,
            })
        }
        Action::OpenBrowser => {
            let url = match state.current_topic() {
                Some(topic) => topic.link(),
                None => state
                    .selected_entry()
                    .and_then(MenuEntry::item)
                    .and_then(Item::link),
            };
            url.map(|u| Command::OpenUrl(u.to_string()))
        }
    }
}

fn page_step(state: &NavigationState) -> isize {
    isize::try_from(state.body.viewport.max(1)).unwrap_or(isize::MAX)
}

/// Re-derive the current page from cached data, asking for enrichment only when the
/// window still holds stubs.
fn ensure_page_loaded(state: &NavigationState) -> Option<Command> {
    if state.top_menu.is_window_loaded(state.current_page, state.page_size) {
        return None;
    }
    Some(Command::EnrichPage {
        menu: state.top_menu.clone(),
        page: state.current_page,
        page_size: state.page_size,
    })
}
