//! API operations concerning saved queries.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    ApiError, ApiErrorKind, KeyLevel,
    api::{
        ApiRequest,
        validate::{Validator, check_structure},
    },
};

wire_enum! {
    /// The kind of query a saved query runs.
    SavedQueryType {
        "count/entity" => CountEntity,
        "count/event" => CountEvent,
        "count/entity/total" => CountEntityTotal,
        "aggregation" => Aggregation,
        "top_values" => TopValues,
    }
}

/// Characters escaped in a saved query name.
const NAME_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Names that would address a different endpoint once placed in the path.
fn check_name(name: &str) -> Result<(), ApiError> {
    match name {
        "" | "." | ".." => Err(ApiError::new(
            ApiErrorKind::InvalidQuery,
            format!("invalid saved query name: {name:?}"),
        )),
        _ => Ok(()),
    }
}

fn saved_path(name: &str) -> String {
    format!(
        "/query/saved/{}",
        utf8_percent_encode(name, NAME_ENCODE_SET)
    )
}

/// Validates a saved query definition.
#[derive(Debug)]
pub struct SavedQueryValidator<'a> {
    query: &'a Map<String, Value>,
}

impl<'a> SavedQueryValidator<'a> {
    /// Run the structural check on the definition.
    pub fn new(payload: &'a Value) -> Result<Self, ApiError> {
        Ok(Self {
            query: check_structure(payload)?,
        })
    }

    /// The declared query type, if it is a valid one.
    pub fn query_type(&self) -> Option<SavedQueryType> {
        self.query.get("type")?.as_str()?.parse().ok()
    }
}

impl Validator for SavedQueryValidator<'_> {
    fn validate(&self) -> Result<(), ApiError> {
        match self.query_type() {
            Some(_) => Ok(()),
            None => Err(ApiError::new(
                ApiErrorKind::InvalidQueryType,
                "the saved query doesn't have a valid query type",
            )),
        }
    }
}

/// Fetch a saved query, and run it.
#[derive(Debug, Clone)]
pub struct GetSavedQuery<'a> {
    /// The name of the saved query.
    pub name: &'a str,
}

impl ApiRequest for GetSavedQuery<'_> {
    fn path(&self) -> String {
        saved_path(self.name)
    }

    fn key_level(&self) -> KeyLevel {
        KeyLevel::Read
    }

    fn validate(&self) -> Result<(), ApiError> {
        check_name(self.name)
    }
}

/// List every saved query.
#[derive(Debug, Clone, Copy)]
pub struct GetSavedQueries;

impl ApiRequest for GetSavedQueries {
    fn path(&self) -> String {
        saved_path("")
    }

    fn key_level(&self) -> KeyLevel {
        KeyLevel::Full
    }
}

/// Create a saved query.
#[derive(Debug, Clone)]
pub struct CreateSavedQuery<'a> {
    /// The definition, including `name`, `type` and `query`.
    pub query: &'a Value,
}

impl ApiRequest for CreateSavedQuery<'_> {
    fn method(&self) -> http::Method {
        http::Method::POST
    }

    fn path(&self) -> String {
        saved_path("")
    }

    fn key_level(&self) -> KeyLevel {
        KeyLevel::Full
    }

    fn validate(&self) -> Result<(), ApiError> {
        SavedQueryValidator::new(self.query)?.validate()
    }

    fn body(&self) -> Option<impl Serialize> {
        Some(self.query)
    }
}

/// Update a saved query. The update may be partial, so only the name is
/// checked.
#[derive(Debug, Clone)]
pub struct UpdateSavedQuery<'a> {
    /// The name of the saved query.
    pub name: &'a str,
    /// The fields to change.
    pub query: &'a Value,
}

impl ApiRequest for UpdateSavedQuery<'_> {
    fn method(&self) -> http::Method {
        http::Method::PUT
    }

    fn path(&self) -> String {
        saved_path(self.name)
    }

    fn key_level(&self) -> KeyLevel {
        KeyLevel::Full
    }

    fn validate(&self) -> Result<(), ApiError> {
        check_name(self.name)
    }

    fn body(&self) -> Option<impl Serialize> {
        Some(self.query)
    }
}

/// Delete a saved query.
#[derive(Debug, Clone)]
pub struct DeleteSavedQuery<'a> {
    /// The name of the saved query.
    pub name: &'a str,
}

impl ApiRequest for DeleteSavedQuery<'_> {
    fn method(&self) -> http::Method {
        http::Method::DELETE
    }

    fn path(&self) -> String {
        saved_path(self.name)
    }

    fn key_level(&self) -> KeyLevel {
        KeyLevel::Full
    }

    fn validate(&self) -> Result<(), ApiError> {
        check_name(self.name)
    }
}
