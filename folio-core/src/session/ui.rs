//! Host seams: identity panel, navigation and delegated page events

/// Identity panel in the page chrome
pub trait SessionView: Send + Sync {
    fn hide_identity(&self);
    fn show_identity(&self, display_name: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationMode {
    /// Push a history entry
    Assign,
    /// Replace the current entry so Back cannot return to it
    Replace,
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str, mode: NavigationMode);
}

/// Logout handler of the alternate dashboard
pub trait DashboardDelegate: Send + Sync {
    fn logout(&self);
}

/// The element a click landed on, with its ancestor chain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickTarget {
    pub id: Option<String>,
    pub attributes: Vec<(String, String)>,
    pub parent: Option<Box<ClickTarget>>,
}

impl ClickTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Nest this element inside `parent`
    pub fn within(mut self, parent: ClickTarget) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// This element, then each ancestor outwards
    pub fn ancestors(&self) -> impl Iterator<Item = &ClickTarget> {
        std::iter::successors(Some(self), |t| t.parent.as_deref())
    }
}

/// How logout links are recognised among delegated clicks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutAffordance {
    pub link_id: String,
    pub attribute: String,
    pub marker: String,
}

impl Default for LogoutAffordance {
    fn default() -> Self {
        Self {
            link_id: "logout-link-reader".to_string(),
            attribute: "onclick".to_string(),
            marker: "logout".to_string(),
        }
    }
}

impl LogoutAffordance {
    /// Whether the click landed on a logout link or inside one
    pub fn matches(&self, target: &ClickTarget) -> bool {
        target.ancestors().any(|element| {
            element.id.as_deref() == Some(self.link_id.as_str())
                || element
                    .attribute(&self.attribute)
                    .is_some_and(|value| value.contains(&self.marker))
        })
    }
}

/// Delegated page events consumed by `SessionController::run`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// Document ready
    Ready,
    Click(ClickTarget),
    /// An ordinary request finished
    Response { status: u16, url: String },
    /// In-page navigation to a new path
    Navigated { path: String },
    Unload,
}
