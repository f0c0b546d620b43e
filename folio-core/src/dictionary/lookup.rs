//! Definition lookups in the reader's glossary

use std::sync::Arc;

use tracing::debug;

use crate::api::{ApiError, AuthorizedClient, Definition, DefinitionRequest, check_status, decode};

pub const DEFINITION_PATH: &str = "/rest/v1/rpc/get_definition_with_context";

/// Looks words up through the authorized request hook
///
/// A 401 is reported to the session controller by the hook and returned to
/// the caller as [`ApiError::Unauthorized`].
pub struct DictionaryClient {
    http: Arc<AuthorizedClient>,
}

impl DictionaryClient {
    pub fn new(http: Arc<AuthorizedClient>) -> Self {
        Self { http }
    }

    pub async fn lookup(
        &self,
        term: &str,
        book_id: Option<&str>,
        section_id: Option<&str>,
    ) -> Result<Definition, ApiError> {
        let request = DefinitionRequest::new(term, book_id, section_id)?;
        debug!(term = %request.term, book_id = %request.book_id, "Looking up definition");
        let response = self.http.post_json(DEFINITION_PATH, &request).await?;
        decode(check_status(response).await?).await
    }
}
