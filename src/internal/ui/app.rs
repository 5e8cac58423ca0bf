use std::io;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event as TermEvent, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::Backend};

use crate::api::{ApiService, ContentApi};
use crate::config::AppConfig;
use crate::internal::fetch::Orchestrator;
use crate::internal::navigation::{Command, Event, NavigationState, Phase, update};
use crate::internal::ui::keybindings::{KeyBindingContext, KeyBindingMap};
use crate::internal::ui::keybindings_default::create_default_keybindings;
use crate::internal::ui::view;
use crate::utils::datetime::now_unix;
use crate::utils::theme::Theme;

const INPUT_POLL: Duration = Duration::from_millis(250);

type UrlOpener = fn(&str) -> io::Result<()>;

/// Owns the navigation state and runs the event loop.
///
/// Every command coming out of the reducer is awaited before the next terminal event
/// is read, so at most one request is in flight and input typed meanwhile waits.
pub struct App<C = ApiService> {
    config: AppConfig,
    theme: Theme,
    keybindings: KeyBindingMap,
    orchestrator: Orchestrator<C>,
    state: NavigationState,
    open_url: UrlOpener,
}

impl App<ApiService> {
    pub fn new(config: AppConfig) -> Result<Self> {
        let api = ApiService::from_config(&config)?;
        tracing::info!(base_url = api.base_url(), "using content API");
        Ok(Self::with_api(config, api))
    }
}

impl<C: ContentApi> App<C> {
    pub fn with_api(config: AppConfig, api: C) -> Self {
        let mut keybindings = create_default_keybindings();
        if let Some(custom) = &config.keybindings {
            keybindings.merge_config(custom);
        }

        Self {
            theme: Theme::from_config(&config.theme),
            state: NavigationState::new(config.page_size),
            orchestrator: Orchestrator::new(api),
            keybindings,
            config,
            open_url: |url| open::that(url),
        }
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let size = terminal.size().context("failed to read terminal size")?;
        self.dispatch(
            terminal,
            Event::Resized {
                width: size.width,
                height: size.height,
            },
        )
        .await?;

        while self.state.is_running() {
            self.render(terminal)?;

            if !event::poll(INPUT_POLL)? {
                continue;
            }
            match event::read()? {
                TermEvent::Resize(width, height) => {
                    self.dispatch(terminal, Event::Resized { width, height })
                        .await?;
                }
                TermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                    self.handle_key_event(terminal, key).await?;
                }
                _ => {}
            }
        }

        match &self.state.phase {
            Phase::Failed(message) => Err(anyhow!("{message}")),
            _ => {
                tracing::info!("session ended");
                Ok(())
            }
        }
    }

    async fn handle_key_event<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        key: KeyEvent,
    ) -> Result<()> {
        let context = match self.state.is_top_level() {
            true => KeyBindingContext::TopLevel,
            false => KeyBindingContext::Topic,
        };
        match self.keybindings.get_action(&key, context) {
            Some(action) => {
                tracing::debug!(%action, ?context, "key action");
                self.dispatch(terminal, Event::Input(action)).await
            }
            None => Ok(()),
        }
    }

    /// Feed `event` through the reducer, then run whatever it asks for and feed the
    /// result back until no command is left. A frame is drawn before each request so
    /// the loading marker is visible while it runs.
    pub async fn dispatch<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        event: Event,
    ) -> Result<()> {
        let mut next = Some(event);
        while let Some(event) = next.take() {
            let (state, command) = update(std::mem::take(&mut self.state), event);
            self.state = state;

            if let Some(command) = command {
                if self.state.loading {
                    self.render(terminal)?;
                }
                next = self.execute(command).await;
            }
        }
        Ok(())
    }

    async fn execute(&self, command: Command) -> Option<Event> {
        tracing::debug!(?command, "executing command");
        let result = match command {
            Command::LoadTopMenu { page, page_size } => self
                .orchestrator
                .load_top_menu(page, page_size)
                .await
                .map(Event::TopMenuLoaded),
            Command::EnrichPage {
                mut menu,
                page,
                page_size,
            } => self
                .orchestrator
                .enrich_page(&mut menu, page, page_size)
                .await
                .map(|()| Event::PageLoaded(menu)),
            Command::FetchTopic { id } => self
                .orchestrator
                .fetch_topic_with_comments(id, self.config.max_comments)
                .await
                .map(Event::TopicLoaded),
            Command::OpenUrl(url) => {
                if let Err(e) = (self.open_url)(&url) {
                    tracing::warn!(%url, "Failed to open browser: {}", e);
                }
                return None;
            }
        };

        Some(result.unwrap_or_else(|err| {
            let err = anyhow::Error::from(err);
            tracing::error!("{err:?}");
            Event::FetchFailed(format!("{err:#}"))
        }))
    }

    /// Draw a frame, then hand the measured body layout back to the reducer.
    fn render<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let screen = view::compose(&self.state, &self.theme, now_unix());
        terminal.draw(|f| view::draw(f, &screen))?;
        let (state, _) = update(
            std::mem::take(&mut self.state),
            Event::BodyLaidOut(screen.layout),
        );
        self.state = state;
        Ok(())
    }
}
