//! Dictionary lookup and popup

mod lookup;
mod popup;

pub use lookup::{DEFINITION_PATH, DictionaryClient};
pub use popup::{ARM_DELAY, POPUP_ID, Popup, PopupLayer};
