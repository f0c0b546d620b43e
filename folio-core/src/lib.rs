//! folio-core: reader session and realtime sync client
//!
//! This crate keeps one reader session consistent across the ways it reaches
//! the server:
//!
//! - **Token store** - [`TokenStore`] holds the tab-local session token, the
//!   only authoritative copy
//! - **Cookie mirror** - [`CookieSync`] keeps a derived `auth_token` cookie for
//!   server-rendered navigation, with one delayed verification retry
//! - **Realtime channel** - [`RealtimeChannel`] keeps a single Server-Sent
//!   Events connection alive and feeds [`EventDispatcher`]
//! - **Session controller** - [`SessionController`] runs page-ready setup,
//!   logout, login and forced logout on 401
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use folio_core::{
//!     HttpCookieJar, HttpReaderApi, MemoryTokenStorage, PageContext, RecordingNavigator,
//!     RecordingView, SessionConfig, SessionContext, SessionController, SseTransport,
//! };
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SessionConfig::new("http://localhost:8080");
//!     let jar = Arc::new(HttpCookieJar::new(config.base()?));
//!     let client = reqwest::Client::builder().cookie_provider(jar.store()).build()?;
//!
//!     let page = Arc::new(PageContext::from_config("/reader/books", &config));
//!     let transport = Arc::new(SseTransport::from_config(client.clone(), &config)?);
//!     let api = Arc::new(HttpReaderApi::new(client, config.clone())?);
//!     let ctx = Arc::new(SessionContext::new(
//!         config,
//!         Arc::new(MemoryTokenStorage::new()),
//!         jar,
//!         transport,
//!         page,
//!     ));
//!
//!     ctx.dispatcher().on_help_requests(|| println!("help requests changed"));
//!     let controller = SessionController::new(
//!         ctx,
//!         api,
//!         Arc::new(RecordingView::new()),
//!         Arc::new(RecordingNavigator::new()),
//!     );
//!     controller.login("alice@example.com", "secret").await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod cookie;
pub mod dictionary;
pub mod error;
pub mod realtime;
pub mod session;
pub mod timer;
pub mod token;

// Re-export key types for convenience
pub use api::{
    ApiError, AuthorizedClient, Definition, HttpReaderApi, LoginResponse, MockReaderApi,
    ReaderApi, UserRecord,
};
pub use config::SessionConfig;
pub use cookie::{CookieJar, CookieMirror, CookieSync, HttpCookieJar, MemoryCookieJar, SyncOutcome};
pub use dictionary::{DictionaryClient, PopupLayer};
pub use error::{ConfigError, FolioError, StorageError};
pub use realtime::{
    ChannelState, ConnectOutcome, EventDispatcher, EventTransport, MockTransport, RealtimeChannel,
    RealtimeEvent, SseTransport, TransportError,
};
pub use session::{
    ClickTarget, NavigationMode, Navigator, PageContext, PageEvent, RecordingNavigator,
    RecordingView, SessionContext, SessionController, SessionView,
};
pub use timer::Timer;
pub use token::{MemoryTokenStorage, SessionToken, TokenStorage, TokenStore};
