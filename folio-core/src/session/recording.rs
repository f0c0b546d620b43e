//! Headless view and navigator that record what they were asked to do

use std::sync::Mutex;

use super::ui::{NavigationMode, Navigator, SessionView};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewChange {
    Hidden,
    Shown(String),
}

/// [`SessionView`] that keeps the panel state in memory
#[derive(Debug, Default)]
pub struct RecordingView {
    changes: Mutex<Vec<ViewChange>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn changes(&self) -> Vec<ViewChange> {
        self.lock().clone()
    }

    /// Name currently shown, if the panel is visible
    pub fn shown(&self) -> Option<String> {
        match self.lock().last() {
            Some(ViewChange::Shown(name)) => Some(name.clone()),
            _ => None,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ViewChange>> {
        self.changes.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl SessionView for RecordingView {
    fn hide_identity(&self) {
        self.lock().push(ViewChange::Hidden);
    }

    fn show_identity(&self, display_name: &str) {
        self.lock().push(ViewChange::Shown(display_name.to_string()));
    }
}

/// [`Navigator`] that records navigations instead of performing them
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<(String, NavigationMode)>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visits(&self) -> Vec<(String, NavigationMode)> {
        self.lock().clone()
    }

    pub fn last(&self) -> Option<(String, NavigationMode)> {
        self.lock().last().cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(String, NavigationMode)>> {
        self.visits.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str, mode: NavigationMode) {
        self.lock().push((path.to_string(), mode));
    }
}
