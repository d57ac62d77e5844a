// App state and main event loop.
// Routes keys to the active screen and applies async completions on the UI thread.

use std::collections::HashSet;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use parking_lot::Mutex;
use ratatui::prelude::*;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

use crate::cache::{Image, ResourceCache};
use crate::config::Config;
use crate::error::Result;
use crate::github::{Commit, Gist, GistCommits, GitHubClient, PublicGists};
use crate::state::{GistDetailState, GistListState, PageFetcher, PageRequest, PagedViewModel};
use crate::ui;

/// Image cache for owner avatars, backed by the GitHub client.
pub type AvatarCache = ResourceCache<Arc<GitHubClient>>;

/// Completions delivered back to the event loop.
#[derive(Debug)]
pub enum AppEvent {
    GistsLoaded {
        request: PageRequest,
        result: Result<Vec<Gist>>,
    },
    CommitsLoaded {
        gist_id: String,
        request: PageRequest,
        result: Result<Vec<Commit>>,
    },
    AvatarResolved {
        url: String,
        ok: bool,
    },
}

/// Active screen.
pub enum Screen {
    List,
    Detail(Box<GistDetailState>),
}

/// What an avatar slot should show.
#[derive(Debug, Clone)]
pub enum AvatarStatus {
    Loaded(Image),
    Loading,
    Missing,
}

/// Main application state.
pub struct App {
    client: Arc<GitHubClient>,
    avatars: AvatarCache,
    config: Config,
    /// Gist list, kept while the detail screen is open.
    pub gists: GistListState,
    pub screen: Screen,
    /// Avatar URLs whose last fetch failed; not retried until the next refresh.
    /// Fetch tasks record failures here before reporting back.
    failed_avatars: Arc<Mutex<HashSet<String>>>,
    /// One-line message for the status bar.
    pub status_message: Option<String>,
    pub show_help: bool,
    pub should_quit: bool,
    tx: UnboundedSender<AppEvent>,
    rx: UnboundedReceiver<AppEvent>,
}

impl App {
    pub fn new(config: Config, client: Arc<GitHubClient>, avatars: AvatarCache) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let gists = GistListState::new(PublicGists::new(Arc::clone(&client), config.per_page));
        Self {
            client,
            avatars,
            config,
            gists,
            screen: Screen::List,
            failed_avatars: Arc::new(Mutex::new(HashSet::new())),
            status_message: None,
            show_help: false,
            should_quit: false,
            tx,
            rx,
        }
    }

    /// Main event loop.
    pub fn run(&mut self, terminal: &mut Terminal<impl Backend>) -> io::Result<()> {
        self.refresh_gists();
        while !self.should_quit {
            while let Ok(event) = self.rx.try_recv() {
                self.process_event(event);
            }
            self.request_avatars();
            terminal.draw(|frame| ui::draw(frame, self))?;
            self.handle_events()?;
        }
        Ok(())
    }

    /// Handle keyboard and other events.
    #[allow(clippy::collapsible_if)]
    fn handle_events(&mut self) -> io::Result<()> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key.code);
                }
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        if self.show_help {
            self.show_help = false;
            return;
        }
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('r') => match self.screen {
                Screen::List => self.refresh_gists(),
                Screen::Detail(_) => self.refresh_commits(),
            },
            KeyCode::Char('n') => self.load_more(),
            KeyCode::Down | KeyCode::Char('j') => {
                match &mut self.screen {
                    Screen::List => self.gists.gists.select_next(),
                    Screen::Detail(detail) => detail.select_next(),
                }
                if self.wants_more() {
                    self.load_more();
                }
            }
            KeyCode::Up | KeyCode::Char('k') => match &mut self.screen {
                Screen::List => self.gists.gists.select_prev(),
                Screen::Detail(detail) => detail.select_prev(),
            },
            KeyCode::Tab => {
                if let Screen::Detail(detail) = &mut self.screen {
                    detail.toggle_focus();
                }
            }
            KeyCode::Enter => self.open_selected(),
            KeyCode::Esc | KeyCode::Backspace => match self.screen {
                Screen::List => self.should_quit = code == KeyCode::Esc,
                Screen::Detail(_) => {
                    self.screen = Screen::List;
                    self.status_message = None;
                }
            },
            _ => {}
        }
    }

    fn wants_more(&self) -> bool {
        match &self.screen {
            Screen::List => self.gists.wants_more(),
            Screen::Detail(detail) => detail.wants_more(),
        }
    }

    /// Reset the gist list and fetch page 1.
    pub fn refresh_gists(&mut self) {
        if let Some(request) = self.gists.refresh() {
            info!("refreshing public gists");
            self.failed_avatars.lock().clear();
            spawn_page(&self.gists, request, self.tx.clone(), |request, result| {
                AppEvent::GistsLoaded { request, result }
            });
        }
    }

    fn refresh_commits(&mut self) {
        if let Screen::Detail(detail) = &mut self.screen {
            if let Some(request) = detail.refresh() {
                let gist_id = detail.gist_id().to_string();
                spawn_page(&**detail, request, self.tx.clone(), move |request, result| {
                    AppEvent::CommitsLoaded {
                        gist_id,
                        request,
                        result,
                    }
                });
            }
        }
    }

    fn load_more(&mut self) {
        match &mut self.screen {
            Screen::List => {
                if let Some(request) = self.gists.load_more() {
                    spawn_page(&self.gists, request, self.tx.clone(), |request, result| {
                        AppEvent::GistsLoaded { request, result }
                    });
                }
            }
            Screen::Detail(detail) => {
                if let Some(request) = detail.load_more() {
                    let gist_id = detail.gist_id().to_string();
                    spawn_page(&**detail, request, self.tx.clone(), move |request, result| {
                        AppEvent::CommitsLoaded {
                            gist_id,
                            request,
                            result,
                        }
                    });
                }
            }
        }
    }

    fn open_selected(&mut self) {
        if let Screen::Detail(detail) = &self.screen {
            if let Some(file) = detail.selected_file() {
                self.status_message = Some(file.raw_url.clone());
            }
            return;
        }

        let Some(gist) = self.gists.selected_gist().cloned() else {
            return;
        };
        debug!(gist_id = %gist.id, "opening gist");
        let fetcher =
            GistCommits::new(Arc::clone(&self.client), gist.id.clone(), self.config.per_page);
        self.screen = Screen::Detail(Box::new(GistDetailState::new(
            gist,
            self.config.max_files,
            fetcher,
        )));
        self.status_message = None;
        self.refresh_commits();
    }

    /// Apply one completion. Results for a screen that is no longer shown are dropped.
    pub fn process_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::GistsLoaded { request, result } => {
                self.gists.complete(request, result);
            }
            AppEvent::CommitsLoaded {
                gist_id,
                request,
                result,
            } => match &mut self.screen {
                Screen::Detail(detail) if detail.gist_id() == gist_id => {
                    detail.complete(request, result);
                }
                _ => debug!(%gist_id, "dropping commits for a closed gist"),
            },
            AppEvent::AvatarResolved { url, ok } => {
                debug!(%url, ok, "avatar resolved");
            }
        }
    }

    /// Start fetches for avatars that are visible but not cached yet.
    fn request_avatars(&mut self) {
        let mut urls: Vec<String> = self
            .gists
            .avatar_urls()
            .into_iter()
            .map(str::to_string)
            .collect();
        if let Screen::Detail(detail) = &self.screen {
            if let Some(url) = detail.gist.avatar_url() {
                urls.push(url.to_string());
            }
        }

        for url in urls {
            if self.avatars.contains(&url)
                || self.avatars.is_pending(&url)
                || self.failed_avatars.lock().contains(&url)
            {
                continue;
            }
            let avatars = self.avatars.clone();
            let failed = Arc::clone(&self.failed_avatars);
            let tx = self.tx.clone();
            tokio::spawn(async move {
                let ok = avatars.resolve(&url).await.is_ok();
                if !ok {
                    failed.lock().insert(url.clone());
                }
                let _ = tx.send(AppEvent::AvatarResolved { url, ok });
            });
        }
    }

    /// Avatar state for rendering. Never blocks.
    pub fn avatar(&self, url: Option<&str>) -> AvatarStatus {
        let Some(url) = url else {
            return AvatarStatus::Missing;
        };
        match self.avatars.get(url) {
            Some(image) => AvatarStatus::Loaded(image),
            None if self.failed_avatars.lock().contains(url) => AvatarStatus::Missing,
            None => AvatarStatus::Loading,
        }
    }

    /// Cached avatar count and fetches still pending, or `None` before the first one.
    pub fn avatar_stats(&self) -> Option<(usize, usize)> {
        let pending = self.avatars.in_flight();
        if self.avatars.is_empty() && pending == 0 {
            return None;
        }
        Some((self.avatars.len(), pending))
    }

    pub fn rate_limit_remaining(&self) -> Option<u64> {
        let rate_limit = self.client.rate_limit();
        (rate_limit.limit > 0).then_some(rate_limit.remaining)
    }
}

/// Run `request` for `vm` on the runtime and send the outcome back to the loop.
fn spawn_page<V, W>(vm: &V, request: PageRequest, tx: UnboundedSender<AppEvent>, wrap: W)
where
    V: PagedViewModel,
    V::Item: Send + 'static,
    V::Fetcher: 'static,
    W: FnOnce(PageRequest, Result<Vec<V::Item>>) -> AppEvent + Send + 'static,
{
    let fetcher = vm.list().loader().fetcher();
    debug!(page = request.page, mode = ?request.mode, "fetching page");
    tokio::spawn(async move {
        let result = fetcher.fetch_page(request.page).await;
        // The receiver is gone only when the app is shutting down.
        let _ = tx.send(wrap(request, result));
    });
}
