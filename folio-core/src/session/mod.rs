//! Session context and page orchestration

mod context;
mod controller;
mod page;
pub mod recording;
mod ui;

pub use context::SessionContext;
pub use controller::{LogoutOutcome, ReadyReport, SessionController};
pub use page::PageContext;
pub use recording::{RecordingNavigator, RecordingView, ViewChange};
pub use ui::{
    ClickTarget, DashboardDelegate, LogoutAffordance, NavigationMode, Navigator, PageEvent,
    SessionView,
};
