//! Page-level session orchestration

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use super::context::SessionContext;
use super::ui::{
    ClickTarget, DashboardDelegate, LogoutAffordance, NavigationMode, Navigator, PageEvent,
    SessionView,
};
use crate::api::{ApiError, LoginResponse, ReaderApi};
use crate::cookie::SyncOutcome;
use crate::error::FolioError;
use crate::realtime::ConnectOutcome;
use crate::token::SessionToken;

/// What `on_ready` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyReport {
    /// `None` if the cookie was already reconciled for this page
    pub cookie_sync: Option<SyncOutcome>,
    /// The alternate dashboard owns the session on this page
    pub stood_down: bool,
    pub display_name: Option<String>,
    pub channel: Option<ConnectOutcome>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    /// Local session cleared and the login view shown
    Completed { server_acknowledged: bool },
    /// Handed to the alternate dashboard
    Deferred,
}

/// Wires the session context to the page: ready, clicks, responses, unload
pub struct SessionController {
    ctx: Arc<SessionContext>,
    api: Arc<dyn ReaderApi>,
    view: Arc<dyn SessionView>,
    navigator: Arc<dyn Navigator>,
    delegate: Option<Arc<dyn DashboardDelegate>>,
    affordance: LogoutAffordance,
}

impl SessionController {
    pub fn new(
        ctx: Arc<SessionContext>,
        api: Arc<dyn ReaderApi>,
        view: Arc<dyn SessionView>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            ctx,
            api,
            view,
            navigator,
            delegate: None,
            affordance: LogoutAffordance::default(),
        }
    }

    pub fn with_dashboard_delegate(mut self, delegate: Arc<dyn DashboardDelegate>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    pub fn with_logout_affordance(mut self, affordance: LogoutAffordance) -> Self {
        self.affordance = affordance;
        self
    }

    pub fn context(&self) -> &Arc<SessionContext> {
        &self.ctx
    }

    /// Document-ready initialization
    pub async fn on_ready(&self) -> ReadyReport {
        let cookie_sync = self.ctx.init();
        let page = self.ctx.page();

        if page.is_alternate_dashboard() {
            info!(path = %page.path(), "Alternate dashboard page, session controller standing down");
            return ReadyReport {
                cookie_sync,
                stood_down: true,
                display_name: None,
                channel: None,
            };
        }

        let channel = if self.ctx.store().is_authenticated() {
            Some(self.ctx.channel().connect().await)
        } else {
            None
        };

        let path = page.path();
        let display_name = if self.ctx.config().is_landing_path(&path) {
            debug!(%path, "Landing page, identity hidden");
            self.view.hide_identity();
            None
        } else {
            self.load_user_info().await
        };

        ReadyReport {
            cookie_sync,
            stood_down: false,
            display_name,
            channel,
        }
    }

    /// Delegated click; returns true if it was a logout
    pub async fn handle_click(&self, target: &ClickTarget) -> bool {
        if !self.affordance.matches(target) {
            return false;
        }
        debug!("Logout link clicked");
        self.logout().await;
        true
    }

    /// Sign out
    ///
    /// The server call is best effort; its failure never stops the local
    /// logout.
    pub async fn logout(&self) -> LogoutOutcome {
        if self.ctx.page().is_alternate_dashboard() {
            match &self.delegate {
                Some(delegate) => delegate.logout(),
                None => debug!("Alternate dashboard has no logout delegate"),
            }
            return LogoutOutcome::Deferred;
        }

        self.view.hide_identity();

        let mut server_acknowledged = false;
        if let Some(token) = self.ctx.store().get() {
            match self.api.logout(&token).await {
                Ok(()) => server_acknowledged = true,
                Err(e) => warn!(error = %e, "Sign-out call failed, logging out locally"),
            }
        }

        self.ctx.store().clear();
        self.ctx.channel().disconnect().await;
        self.navigator
            .navigate(&self.ctx.config().login_path, NavigationMode::Replace);
        info!(server_acknowledged, "Logged out");

        LogoutOutcome::Completed {
            server_acknowledged,
        }
    }

    /// Sign in, store the token, then start the channel and identity panel
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, FolioError> {
        let response = self.api.login(email, password).await?;
        let token = SessionToken::new(response.access_token.as_str());
        if token.is_empty() {
            return Err(ApiError::Decode("empty access token".to_string()).into());
        }

        self.ctx.store().set(&token);
        info!(user_id = %response.user.id, "Logged in");

        self.ctx.channel().connect().await;
        self.load_user_info().await;
        Ok(response)
    }

    /// Fetch the signed-in user and show their name
    ///
    /// Returns the name shown, if any. A 401 forces a logout; a response
    /// that arrives after the token changed is discarded.
    pub async fn load_user_info(&self) -> Option<String> {
        self.view.hide_identity();

        let Some(token) = self.ctx.store().get() else {
            debug!("No session token, identity hidden");
            return None;
        };

        let result = self.api.current_user(&token).await;
        if self.ctx.store().get().as_ref() != Some(&token) {
            debug!("Session changed while loading user info, discarding");
            return None;
        }

        match result {
            Ok(user) => {
                let name = user.display_name();
                self.view.show_identity(&name);
                Some(name)
            }
            Err(ApiError::Unauthorized) => {
                self.on_response_status(401).await;
                None
            }
            Err(e) => {
                warn!(error = %e, "Failed to load user info");
                None
            }
        }
    }

    /// Authorization-failure interceptor; returns true if it forced a logout
    pub async fn on_response_status(&self, status: u16) -> bool {
        if status != 401 {
            return false;
        }
        if self.ctx.page().is_alternate_dashboard() {
            debug!("Unauthorized response on alternate dashboard, ignoring");
            return false;
        }

        warn!("Request unauthorized, ending session");
        self.ctx.store().clear();
        self.ctx.channel().disconnect().await;
        self.navigator
            .navigate(&self.ctx.config().login_path, NavigationMode::Assign);
        true
    }

    pub async fn on_unload(&self) {
        self.ctx.teardown().await;
    }

    /// Handle one page event; returns false once the page has unloaded
    pub async fn handle_event(&self, event: PageEvent) -> bool {
        match event {
            PageEvent::Ready => {
                self.on_ready().await;
            }
            PageEvent::Click(target) => {
                self.handle_click(&target).await;
            }
            PageEvent::Response { status, url } => {
                trace!(status, %url, "Response observed");
                self.on_response_status(status).await;
            }
            PageEvent::Navigated { path } => {
                debug!(%path, "In-page navigation");
                self.ctx.page().set_path(path);
            }
            PageEvent::Unload => {
                self.on_unload().await;
                return false;
            }
        }
        true
    }

    /// Consume page events until unload or until every sender is gone
    pub async fn run(&self, mut events: mpsc::UnboundedReceiver<PageEvent>) {
        while let Some(event) = events.recv().await {
            if !self.handle_event(event).await {
                return;
            }
        }
        debug!("Page event channel closed");
        self.on_unload().await;
    }
}
