use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::{
    ApiError, ApiRequest, Profile, Requester, column, database, extraction, insert,
    parse_response, query, saved,
};

/// An async client for the SlicingDice API.
///
/// Every operation is validated locally and authorized against the
/// configured keys before anything is sent. The raw response body is
/// returned; use [`crate::parse_response`] (or [`Client::send_checked`]) to
/// surface errors embedded in it.
///
/// Clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    profile: Arc<Profile>,
    requester: Requester,
}

impl Client {
    /// Create a client from a resolved profile.
    pub fn new(profile: Profile) -> Result<Self, ApiError> {
        let requester = Requester::new(profile.verify_tls, profile.timeout)?;
        Ok(Self {
            profile: Arc::new(profile),
            requester,
        })
    }

    /// The profile the client was created with.
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Validate, authorize and send a request, returning the raw response
    /// body.
    pub async fn send<T: ApiRequest>(&self, req: T) -> Result<String, ApiError> {
        let req = req.into_request(&self.profile)?;
        let (status, body) = self.requester.execute(req).await?;
        debug!(%status, "request complete");
        Ok(body)
    }

    /// Like [`Client::send`], but parses the body and returns an error if it
    /// carries one.
    pub async fn send_checked<T: ApiRequest>(&self, req: T) -> Result<Value, ApiError> {
        let body = self.send(req).await?;
        parse_response(&body)
    }

    /// Fetch the database associated with the configured keys.
    pub async fn get_database(&self) -> Result<String, ApiError> {
        self.send(database::GetDatabase).await
    }

    /// Create a column, or a list of columns.
    pub async fn create_column(&self, columns: &Value) -> Result<String, ApiError> {
        self.send(column::CreateColumn { columns }).await
    }

    /// List the columns of the database.
    pub async fn get_columns(&self) -> Result<String, ApiError> {
        self.send(column::GetColumns).await
    }

    /// Insert entities.
    pub async fn insert(&self, data: &Value) -> Result<String, ApiError> {
        self.send(insert::Insert { data }).await
    }

    /// Count the entities matching each query.
    pub async fn count_entity(&self, query: &Value) -> Result<String, ApiError> {
        self.send(query::CountEntity { query }).await
    }

    /// Count every entity, optionally restricted to some dimensions.
    pub async fn count_entity_total(
        &self,
        dimensions: Option<&[&str]>,
    ) -> Result<String, ApiError> {
        self.send(query::CountEntityTotal { dimensions }).await
    }

    /// Count the events matching each query.
    pub async fn count_event(&self, query: &Value) -> Result<String, ApiError> {
        self.send(query::CountEvent { query }).await
    }

    /// Run an aggregation.
    pub async fn aggregation(&self, query: &Value) -> Result<String, ApiError> {
        self.send(query::Aggregation { query }).await
    }

    /// Fetch the most frequent values of some columns.
    pub async fn top_values(&self, query: &Value) -> Result<String, ApiError> {
        self.send(query::TopValues { query }).await
    }

    /// Check whether up to 100 entities exist.
    pub async fn exists_entity(
        &self,
        ids: &[&str],
        dimension: Option<&str>,
    ) -> Result<String, ApiError> {
        self.send(query::ExistsEntity { ids, dimension }).await
    }

    /// Fetch and run a saved query.
    pub async fn get_saved_query(&self, name: &str) -> Result<String, ApiError> {
        self.send(saved::GetSavedQuery { name }).await
    }

    /// List every saved query.
    pub async fn get_saved_queries(&self) -> Result<String, ApiError> {
        self.send(saved::GetSavedQueries).await
    }

    /// Create a saved query.
    pub async fn create_saved_query(&self, query: &Value) -> Result<String, ApiError> {
        self.send(saved::CreateSavedQuery { query }).await
    }

    /// Update a saved query.
    pub async fn update_saved_query(&self, name: &str, query: &Value) -> Result<String, ApiError> {
        self.send(saved::UpdateSavedQuery { name, query }).await
    }

    /// Delete a saved query.
    pub async fn delete_saved_query(&self, name: &str) -> Result<String, ApiError> {
        self.send(saved::DeleteSavedQuery { name }).await
    }

    /// Fetch column values of the entities matching a query.
    pub async fn result(&self, query: &Value) -> Result<String, ApiError> {
        self.send(extraction::DataExtractionResult { query }).await
    }

    /// Fetch scores of the entities matching a query.
    pub async fn score(&self, query: &Value) -> Result<String, ApiError> {
        self.send(extraction::DataExtractionScore { query }).await
    }

    /// Run an SQL query.
    pub async fn sql(&self, query: &str) -> Result<String, ApiError> {
        self.send(query::Sql { query }).await
    }
}
