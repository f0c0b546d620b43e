//! Session token lifecycle

mod storage;
mod store;
mod types;

pub use storage::{MemoryTokenStorage, TokenStorage};
pub use store::TokenStore;
pub use types::SessionToken;
