//! The single definition popup

use std::time::{Duration, Instant};

use maud::{Markup, html};

use crate::api::Definition;

/// Outside clicks are ignored until the popup has been up this long, so the
/// click that opened it does not also close it
pub const ARM_DELAY: Duration = Duration::from_millis(100);

pub const POPUP_ID: &str = "dictionary-popup";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    pub word: String,
    pub definition: String,
    pub example: Option<String>,
    pub x: i32,
    pub y: i32,
    shown_at: Instant,
}

impl Popup {
    /// Markup with word and definition escaped
    pub fn render(&self) -> Markup {
        html! {
            div id=(POPUP_ID)
                class="dictionary-popup"
                style=(format!("left: {}px; top: {}px;", self.x, self.y)) {
                strong { (self.word) }
                p { (self.definition) }
                @if let Some(example) = &self.example {
                    p class="dictionary-example" { em { (example) } }
                }
                button type="button" class="btn btn-sm btn-secondary" data-action="close" { "Close" }
            }
        }
    }
}

/// Holds at most one popup
#[derive(Debug)]
pub struct PopupLayer {
    current: Option<Popup>,
    arm_delay: Duration,
}

impl Default for PopupLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl PopupLayer {
    pub fn new() -> Self {
        Self::with_arm_delay(ARM_DELAY)
    }

    pub fn with_arm_delay(arm_delay: Duration) -> Self {
        Self {
            current: None,
            arm_delay,
        }
    }

    /// Show a popup, replacing any open one
    pub fn show(&mut self, word: &str, definition: &str, x: i32, y: i32) -> &Popup {
        self.show_at(word, definition, x, y, Instant::now())
    }

    /// Show a looked-up definition, with its example if any
    pub fn show_definition(&mut self, definition: &Definition, x: i32, y: i32) -> &Popup {
        self.current.insert(Popup {
            word: definition.term.clone(),
            definition: definition.definition.clone(),
            example: definition.example.clone(),
            x,
            y,
            shown_at: Instant::now(),
        })
    }

    pub fn show_at(&mut self, word: &str, definition: &str, x: i32, y: i32, now: Instant) -> &Popup {
        self.current.insert(Popup {
            word: word.to_string(),
            definition: definition.to_string(),
            example: None,
            x,
            y,
            shown_at: now,
        })
    }

    pub fn current(&self) -> Option<&Popup> {
        self.current.as_ref()
    }

    /// The close button; returns whether a popup was open
    pub fn close(&mut self) -> bool {
        self.current.take().is_some()
    }

    /// A page click; returns whether it dismissed the popup
    pub fn click(&mut self, inside_popup: bool) -> bool {
        self.click_at(inside_popup, Instant::now())
    }

    pub fn click_at(&mut self, inside_popup: bool, now: Instant) -> bool {
        let Some(popup) = &self.current else {
            return false;
        };
        if inside_popup || now.duration_since(popup.shown_at) < self.arm_delay {
            return false;
        }
        self.current = None;
        true
    }

    pub fn render(&self) -> Option<String> {
        self.current.as_ref().map(|p| p.render().into_string())
    }
}
