//! Terminal implementations of the page seams

use std::sync::Mutex;

use folio_core::{NavigationMode, Navigator, SessionView};
use tracing::{debug, info};

/// Identity panel kept in memory; commands print from it
#[derive(Debug, Default)]
pub struct TerminalView {
    shown: Mutex<Option<String>>,
}

impl TerminalView {
    pub fn shown(&self) -> Option<String> {
        self.shown.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

impl SessionView for TerminalView {
    fn hide_identity(&self) {
        *self.shown.lock().unwrap_or_else(|p| p.into_inner()) = None;
    }

    fn show_identity(&self, display_name: &str) {
        debug!(display_name, "Identity shown");
        *self.shown.lock().unwrap_or_else(|p| p.into_inner()) = Some(display_name.to_string());
    }
}

/// There is no page to leave; remembers where the session was sent
#[derive(Debug, Default)]
pub struct TerminalNavigator {
    last: Mutex<Option<(String, NavigationMode)>>,
}

impl TerminalNavigator {
    pub fn last(&self) -> Option<(String, NavigationMode)> {
        self.last.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, path: &str, mode: NavigationMode) {
        info!(path, ?mode, "Session navigated");
        *self.last.lock().unwrap_or_else(|p| p.into_inner()) = Some((path.to_string(), mode));
    }
}
