//! HTTP collaborators: auth endpoints and the authorized request hook

mod authorized;
mod client;
mod error;
pub mod mock;
mod types;

pub use authorized::AuthorizedClient;
pub use client::{HttpReaderApi, LOGOUT_PATH, ReaderApi, TOKEN_PATH, USER_PATH};
pub(crate) use client::{check_status, decode};
pub use error::ApiError;
pub use mock::{ApiCall, MockReaderApi};
pub use types::{
    DEFAULT_BOOK_ID, Definition, DefinitionRequest, FALLBACK_DISPLAY_NAME, LoginRequest,
    LoginResponse, UserMetadata, UserRecord,
};
