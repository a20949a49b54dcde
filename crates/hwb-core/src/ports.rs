use async_trait::async_trait;

use crate::{domain::Cursor, Result};

/// Hexagonal port for the homework review API.
///
/// One call is one outbound request. Implementations map transport failures
/// and non-200 answers into `Error::Request` and return the decoded JSON body
/// untouched; shape checks belong to `review::validate_response`.
#[async_trait]
pub trait ReviewApi: Send + Sync {
    async fn fetch(&self, from_date: Cursor) -> Result<serde_json::Value>;
}
