//! Data extraction: fetching the column values or scores of matching
//! entities.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    ApiError, ApiErrorKind, KeyLevel,
    api::{
        ApiRequest,
        validate::{Validator, check_structure},
    },
};

/// The maximum number of columns a data extraction may return.
pub const MAX_EXTRACTION_COLUMNS: usize = 10;

/// Validates a data extraction query.
#[derive(Debug)]
pub struct DataExtractionValidator<'a> {
    query: &'a Map<String, Value>,
}

impl<'a> DataExtractionValidator<'a> {
    /// Run the structural check on the query.
    pub fn new(payload: &'a Value) -> Result<Self, ApiError> {
        Ok(Self {
            query: check_structure(payload)?,
        })
    }
}

impl Validator for DataExtractionValidator<'_> {
    fn validate(&self) -> Result<(), ApiError> {
        match self.query.get("columns") {
            None => (),
            Some(Value::String(s)) if s == "all" => (),
            Some(Value::Array(columns)) if columns.len() <= MAX_EXTRACTION_COLUMNS => (),
            Some(Value::Array(_)) => {
                return Err(ApiError::new(
                    ApiErrorKind::InvalidQuery,
                    format!("'columns' must have up to {MAX_EXTRACTION_COLUMNS} columns"),
                ));
            }
            Some(_) => {
                return Err(ApiError::new(
                    ApiErrorKind::InvalidQuery,
                    "'columns' should be \"all\" or a list of columns",
                ));
            }
        }

        let is_integer = |limit: &Value| limit.is_i64() || limit.is_u64();
        if self.query.get("limit").is_some_and(|l| !is_integer(l)) {
            return Err(ApiError::new(
                ApiErrorKind::InvalidQuery,
                "'limit' should be an integer",
            ));
        }

        Ok(())
    }
}

/// Fetch column values of the entities matching a query.
#[derive(Debug, Clone)]
pub struct DataExtractionResult<'a> {
    /// The extraction query.
    pub query: &'a Value,
}

/// Fetch the scores of the entities matching a query.
#[derive(Debug, Clone)]
pub struct DataExtractionScore<'a> {
    /// The extraction query.
    pub query: &'a Value,
}

macro_rules! data_extraction_request {
    ($name:ident, $path:literal) => {
        impl ApiRequest for $name<'_> {
            fn method(&self) -> http::Method {
                http::Method::POST
            }

            fn path(&self) -> String {
                $path.to_string()
            }

            fn key_level(&self) -> KeyLevel {
                KeyLevel::Read
            }

            fn validate(&self) -> Result<(), ApiError> {
                DataExtractionValidator::new(self.query)?.validate()
            }

            fn body(&self) -> Option<impl Serialize> {
                Some(self.query)
            }
        }
    };
}

data_extraction_request!(DataExtractionResult, "/data_extraction/result/");
data_extraction_request!(DataExtractionScore, "/data_extraction/score/");
