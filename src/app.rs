use crate::config::Config;
use crate::credential::{CredentialResolver, NASA_API_KEY};
use crate::dataset::Dataset;
use crate::feeds::apod::resolve_apod_view;
use crate::feeds::{ApodFetcher, ApodState, FeedData, PictureState, PixelGrid};
use crate::ui;
use crate::ui::widgets::apod::ApodTab;
use crate::ui::widgets::depth::DepthTab;
use crate::ui::widgets::overview::OverviewTab;
use crate::ui::widgets::trends::TrendsTab;
use crate::ui::widgets::DashboardTab;
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{backend::Backend, Frame, Terminal};
use std::sync::Arc;
use std::time::Duration;

const APOD_TAB: usize = 3;
const PAGE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    None,
    Quit,
    Refresh,
}

pub struct App {
    running: bool,
    config: Config,
    dataset: Dataset,
    tabs: Vec<Box<dyn DashboardTab>>,
    selected_tab: usize,
    fetcher: Arc<dyn ApodFetcher>,
    credentials: CredentialResolver,
    status: Option<String>,
}

impl App {
    /// Builds every view up front. A dataset missing one of the expected
    /// columns fails here.
    pub fn new(
        config: Config,
        dataset: Dataset,
        fetcher: Arc<dyn ApodFetcher>,
        credentials: CredentialResolver,
    ) -> Result<Self> {
        let tabs: Vec<Box<dyn DashboardTab>> = vec![
            Box::new(OverviewTab::new(&dataset)),
            Box::new(TrendsTab::new(&dataset).context("Failed to build 2D visualizations")?),
            Box::new(DepthTab::new(&dataset).context("Failed to build 3D visualization")?),
            Box::new(ApodTab::new()),
        ];

        Ok(Self {
            running: true,
            config,
            dataset,
            tabs,
            selected_tab: 0,
            fetcher,
            credentials,
            status: None,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn tab_titles(&self) -> Vec<&str> {
        self.tabs.iter().map(|t| t.title()).collect()
    }

    pub fn selected_tab(&self) -> usize {
        self.selected_tab
    }

    pub fn select_tab(&mut self, index: usize) {
        if index < self.tabs.len() {
            self.selected_tab = index;
        }
    }

    pub fn active_tab(&self) -> &dyn DashboardTab {
        self.tabs[self.selected_tab].as_ref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn draw(&self, frame: &mut Frame) {
        ui::draw(frame, self);
    }

    pub async fn run<B: Backend>(mut self, terminal: &mut Terminal<B>) -> Result<()> {
        self.display_cycle(terminal).await?;

        while self.running {
            terminal.draw(|frame| self.draw(frame))?;

            if event::poll(Duration::from_millis(250))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match self.handle_key_event(key) {
                        AppAction::Quit => self.quit(),
                        AppAction::Refresh => self.display_cycle(terminal).await?,
                        AppAction::None => {}
                    }
                }
            }
        }
        Ok(())
    }

    /// One APOD display cycle, redrawing between steps because each network
    /// call suspends the UI until it completes.
    async fn display_cycle<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        self.tabs[APOD_TAB].update_data(FeedData::Loading);
        terminal.draw(|frame| self.draw(frame))?;

        if let Some(url) = self.load_apod().await {
            terminal.draw(|frame| self.draw(frame))?;
            self.load_picture(&url).await;
        }
        Ok(())
    }

    /// Runs a display cycle without a terminal.
    pub async fn refresh_apod(&mut self) {
        self.tabs[APOD_TAB].update_data(FeedData::Loading);
        if let Some(url) = self.load_apod().await {
            self.load_picture(&url).await;
        }
    }

    /// Resolves the credential, fetches and stores the resulting state.
    /// Returns the image URL to download, if any.
    async fn load_apod(&mut self) -> Option<String> {
        tracing::info!("starting APOD display cycle");
        let credential = self.credentials.resolve(NASA_API_KEY);
        let state = resolve_apod_view(
            self.fetcher.as_ref(),
            &self.config.apod.base_url,
            credential.as_deref(),
        )
        .await;

        let image_url = match &state {
            ApodState::NoCredential => {
                tracing::warn!("no NASA API key configured, skipping fetch");
                None
            }
            ApodState::ApiError(message) => {
                tracing::warn!(%message, "APOD API returned an error");
                None
            }
            ApodState::RequestFailed(message) => {
                tracing::error!(%message, "APOD request failed");
                None
            }
            ApodState::Displayed(entry) => {
                tracing::info!(title = %entry.title, date = %entry.date, "APOD entry loaded");
                entry.image_url.clone()
            }
            ApodState::Loading => None,
        };

        self.tabs[APOD_TAB].update_data(FeedData::Apod(state));
        image_url
    }

    async fn load_picture(&mut self, url: &str) {
        let picture = match self.fetcher.fetch_image(url).await.and_then(|bytes| {
            PixelGrid::decode(&bytes, self.config.apod.image_width)
        }) {
            Ok(grid) => PictureState::Ready(grid),
            Err(e) => {
                tracing::warn!(url, error = %e, "could not load APOD image");
                PictureState::Failed(format!("{:#}", e))
            }
        };
        self.tabs[APOD_TAB].update_data(FeedData::Picture(picture));
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char('c' | 'C') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return AppAction::Quit
            }
            KeyCode::Char('q') | KeyCode::Esc => return AppAction::Quit,
            KeyCode::Tab => {
                self.selected_tab = (self.selected_tab + 1) % self.tabs.len();
                return AppAction::None;
            }
            KeyCode::BackTab => {
                self.selected_tab = (self.selected_tab + self.tabs.len() - 1) % self.tabs.len();
                return AppAction::None;
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                if index < self.tabs.len() {
                    self.selected_tab = index;
                    return AppAction::None;
                }
            }
            KeyCode::Char('r') => return AppAction::Refresh,
            KeyCode::Char('o') => {
                self.open_selected_link();
                return AppAction::None;
            }
            _ => {}
        }

        let tab = &mut self.tabs[self.selected_tab];
        if tab.handle_key(key.code) {
            return AppAction::None;
        }

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => tab.scroll_up(),
            KeyCode::Down | KeyCode::Char('j') => tab.scroll_down(),
            KeyCode::PageUp => (0..PAGE).for_each(|_| tab.scroll_up()),
            KeyCode::PageDown => (0..PAGE).for_each(|_| tab.scroll_down()),
            _ => {}
        }
        AppAction::None
    }

    fn open_selected_link(&mut self) {
        let Some(url) = self.tabs[self.selected_tab].selected_link() else {
            return;
        };
        match open::that(&url) {
            Ok(()) => self.status = Some(format!("Opened {}", url)),
            Err(e) => {
                tracing::warn!(%url, error = %e, "failed to open link");
                self.status = Some(format!("Could not open {}: {}", url, e));
            }
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::SecretStore;
    use crate::dataset::fixtures;
    use crate::feeds::apod::testing::StubFetcher;
    use crate::feeds::picture::tests::png_bytes;
    use crate::ui::tests::render_to_string;
    use crate::ui::widgets::apod::MISSING_KEY_WARNING;
    use serde_json::json;

    struct NoSecrets;

    impl SecretStore for NoSecrets {
        fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
            Err(anyhow::anyhow!("secrets unavailable"))
        }
    }

    fn app_with(fetcher: Arc<StubFetcher>, key: Option<&'static str>) -> App {
        let credentials =
            CredentialResolver::with_env(Box::new(NoSecrets), move |_| key.map(str::to_string));
        App::new(Config::default(), fixtures::sample(), fetcher, credentials).unwrap()
    }

    fn render_app(app: &App) -> String {
        render_to_string(140, 50, |frame, _| app.draw(frame))
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn test_missing_key_skips_fetch_and_warns() {
        let fetcher = Arc::new(StubFetcher::returning(json!({"title": "x"})));
        let mut app = app_with(fetcher.clone(), Some(""));
        app.refresh_apod().await;
        assert_eq!(fetcher.call_count(), 0);

        app.select_tab(APOD_TAB);
        let text = render_app(&app);
        assert!(text.contains("NASA API key not found"));
        assert!(MISSING_KEY_WARNING.starts_with("NASA API key not found"));
    }

    #[tokio::test]
    async fn test_transport_failure_keeps_other_tabs_rendering() {
        let fetcher = Arc::new(StubFetcher::failing("connection refused"));
        let mut app = app_with(fetcher.clone(), Some("DEMO_KEY"));
        app.refresh_apod().await;
        assert_eq!(fetcher.call_count(), 1);

        app.select_tab(APOD_TAB);
        assert!(render_app(&app).contains("API request failed: connection refused"));

        app.select_tab(0);
        assert!(render_app(&app).contains("Dataset Preview (4 rows)"));
        app.select_tab(1);
        assert!(render_app(&app).contains("Temperature (c) Over Time"));
        app.select_tab(2);
        assert!(render_app(&app).contains("3D Water Quality View"));
    }

    #[tokio::test]
    async fn test_displayed_entry_loads_picture() {
        let fetcher = Arc::new(
            StubFetcher::returning(json!({
                "title": "Galaxy",
                "date": "2024-01-01",
                "hdurl": "http://x/hd.jpg",
                "url": "http://x/sd.jpg",
                "explanation": "..."
            }))
            .with_image(Ok(png_bytes(20, 10))),
        );
        let mut app = app_with(fetcher, Some("DEMO_KEY"));
        app.refresh_apod().await;
        app.select_tab(APOD_TAB);

        assert_eq!(
            app.active_tab().selected_link().as_deref(),
            Some("http://x/hd.jpg")
        );
        let text = render_app(&app);
        assert!(text.contains("Galaxy"));
        assert!(text.contains('▀'));
    }

    #[tokio::test]
    async fn test_image_failure_is_not_fatal() {
        let fetcher = Arc::new(
            StubFetcher::returning(json!({"title": "Galaxy", "url": "http://x/sd.jpg"}))
                .with_image(Err("HTTP 404".to_string())),
        );
        let mut app = app_with(fetcher, Some("DEMO_KEY"));
        app.refresh_apod().await;
        app.select_tab(APOD_TAB);

        let text = render_app(&app);
        assert!(text.contains("Galaxy"));
        assert!(text.contains("Image unavailable: HTTP 404"));
    }

    #[tokio::test]
    async fn test_api_error_message() {
        let fetcher = Arc::new(StubFetcher::returning(
            json!({"error": {"message": "rate limit"}}),
        ));
        let mut app = app_with(fetcher, Some("DEMO_KEY"));
        app.refresh_apod().await;
        app.select_tab(APOD_TAB);
        assert!(render_app(&app).contains("rate limit"));
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let dataset = Dataset::from_reader("Time,pH\n10:00,7.9\n".as_bytes(), ',').unwrap();
        let result = App::new(
            Config::default(),
            dataset,
            Arc::new(StubFetcher::returning(json!({}))),
            CredentialResolver::with_env(Box::new(NoSecrets), |_| None),
        );
        let err = result.err().expect("missing columns must fail");
        assert!(format!("{:#}", err).contains("Temperature (c)"));
    }

    #[test]
    fn test_tab_navigation() {
        let mut app = app_with(Arc::new(StubFetcher::returning(json!({}))), None);
        assert_eq!(app.tab_titles().len(), 4);
        assert_eq!(app.handle_key_event(press(KeyCode::Tab)), AppAction::None);
        assert_eq!(app.selected_tab(), 1);
        app.handle_key_event(press(KeyCode::BackTab));
        app.handle_key_event(press(KeyCode::BackTab));
        assert_eq!(app.selected_tab(), 3);
        app.handle_key_event(press(KeyCode::Char('3')));
        assert_eq!(app.selected_tab(), 2);
        app.handle_key_event(press(KeyCode::Char('9')));
        assert_eq!(app.selected_tab(), 2);
    }

    #[test]
    fn test_quit_and_refresh_keys() {
        let mut app = app_with(Arc::new(StubFetcher::returning(json!({}))), None);
        assert_eq!(app.handle_key_event(press(KeyCode::Char('r'))), AppAction::Refresh);
        assert_eq!(app.handle_key_event(press(KeyCode::Char('q'))), AppAction::Quit);
        assert_eq!(
            app.handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            AppAction::Quit
        );
        app.quit();
        assert!(!app.is_running());
    }

    #[test]
    fn test_metric_key_reaches_trends_tab() {
        let mut app = app_with(Arc::new(StubFetcher::returning(json!({}))), None);
        app.select_tab(1);
        app.handle_key_event(press(KeyCode::Char('m')));
        assert!(render_app(&app).contains("pH Over Time"));
    }

    #[test]
    fn test_header_shows_dashboard_titles() {
        let app = app_with(Arc::new(StubFetcher::returning(json!({}))), None);
        let text = render_app(&app);
        assert!(text.contains("Water Quality Dashboard"));
        assert!(text.contains("Internship-Ready Software Development"));
        assert!(text.contains("1 Overview & Data"));
        assert!(text.contains("4 NASA APOD"));
    }
}
