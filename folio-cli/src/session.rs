//! Wires folio-core to the network for one CLI invocation

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use folio_core::{
    AuthorizedClient, HttpCookieJar, HttpReaderApi, MemoryTokenStorage, PageContext, PageEvent,
    SessionConfig, SessionContext, SessionController, SseTransport, TokenStorage,
};
use tokio::sync::mpsc;
use tracing::debug;

use crate::config::{ConfigLoader, FolioConfig};
use crate::storage::FileTokenStorage;
use crate::terminal::{TerminalNavigator, TerminalView};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Flags shared by every command that talks to the server
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub base_url: Option<String>,
    pub token: Option<String>,
}

pub struct CliSession {
    pub controller: SessionController,
    pub http: Arc<AuthorizedClient>,
    pub view: Arc<TerminalView>,
    pub navigator: Arc<TerminalNavigator>,
    events: mpsc::UnboundedReceiver<PageEvent>,
    sender: mpsc::UnboundedSender<PageEvent>,
}

impl CliSession {
    /// Load config and build a session positioned on `path`
    pub fn open(opts: &SessionOptions, path: &str) -> Result<Self> {
        let config = ConfigLoader::load()?;
        Self::with_config(&config, opts, path)
    }

    pub fn with_config(config: &FolioConfig, opts: &SessionOptions, path: &str) -> Result<Self> {
        let mut session_config = config.session_config();
        if let Some(base_url) = &opts.base_url {
            session_config.base_url = base_url.clone();
        }
        session_config
            .validate()
            .with_context(|| format!("Invalid server URL {}", session_config.base_url))?;

        let jar = Arc::new(HttpCookieJar::new(session_config.base()?));
        let client = reqwest::Client::builder()
            .cookie_provider(jar.store())
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        let storage = token_storage(&session_config, opts.token.as_deref());
        let page = Arc::new(PageContext::from_config(path, &session_config));
        let transport = Arc::new(SseTransport::from_config(client.clone(), &session_config)?);
        let api = Arc::new(HttpReaderApi::new(client.clone(), session_config.clone())?);
        let ctx = Arc::new(SessionContext::new(
            session_config.clone(),
            storage,
            jar,
            transport,
            page,
        ));

        let (sender, events) = mpsc::unbounded_channel();
        let http = Arc::new(AuthorizedClient::new(
            client,
            session_config,
            ctx.store().clone(),
            sender.clone(),
        )?);

        let view = Arc::new(TerminalView::default());
        let navigator = Arc::new(TerminalNavigator::default());
        let controller = SessionController::new(ctx, api, view.clone(), navigator.clone());

        Ok(Self {
            controller,
            http,
            view,
            navigator,
            events,
            sender,
        })
    }

    pub fn context(&self) -> &Arc<SessionContext> {
        self.controller.context()
    }

    /// Sender for page events; `watch` feeds Ready and Unload through it
    pub fn sender(&self) -> mpsc::UnboundedSender<PageEvent> {
        self.sender.clone()
    }

    /// Hand queued page events (unauthorized responses) to the controller
    pub async fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            if !self.controller.handle_event(event).await {
                break;
            }
        }
    }

    /// Run the controller on the page event stream until unload
    pub async fn run(self) {
        let Self {
            controller,
            events,
            sender,
            ..
        } = self;
        drop(sender);
        controller.run(events).await;
    }

    pub async fn close(&self) {
        self.context().teardown().await;
    }
}

fn token_storage(config: &SessionConfig, token: Option<&str>) -> Arc<dyn TokenStorage> {
    match token {
        Some(token) => {
            debug!("Using token from command line");
            Arc::new(MemoryTokenStorage::with_item(config.token_key.clone(), token))
        }
        None => {
            let storage = FileTokenStorage::new(FileTokenStorage::default_path());
            debug!(path = %storage.path().display(), "Using session file");
            Arc::new(storage)
        }
    }
}
