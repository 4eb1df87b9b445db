//! Data insertion.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    ApiError, ApiErrorKind, KeyLevel,
    api::{
        ApiRequest,
        validate::{Validator, check_structure, len_without},
    },
};

/// The maximum number of entities in a single insertion.
pub const MAX_INSERTION_BATCH_SIZE: usize = 1000;

const AUTO_CREATE: &str = "auto-create";

/// Validates an insertion payload: a map from entity ids to their column
/// values, plus optional parameters such as `auto-create`.
#[derive(Debug)]
pub struct InsertValidator<'a> {
    data: &'a Map<String, Value>,
}

impl<'a> InsertValidator<'a> {
    /// Run the structural check on the payload.
    pub fn new(payload: &'a Value) -> Result<Self, ApiError> {
        Ok(Self {
            data: check_structure(payload)?,
        })
    }
}

impl Validator for InsertValidator<'_> {
    fn validate(&self) -> Result<(), ApiError> {
        // Entities map to objects ("id": {"year": 2016}), parameters to
        // lists ("auto-create": ["dimension", "column"]).
        if !self
            .data
            .values()
            .all(|v| v.is_object() || v.is_array())
        {
            return Err(ApiError::new(
                ApiErrorKind::WrongType,
                "the value for an id should be an object",
            ));
        }

        let batch_size = len_without(self.data, AUTO_CREATE);
        if batch_size > MAX_INSERTION_BATCH_SIZE {
            return Err(ApiError::new(
                ApiErrorKind::InvalidInsert,
                format!(
                    "an insertion can't have more than {MAX_INSERTION_BATCH_SIZE} entities, got {batch_size}"
                ),
            ));
        }

        Ok(())
    }
}

/// Insert data.
#[derive(Debug, Clone)]
pub struct Insert<'a> {
    /// The entities to insert, keyed by id.
    pub data: &'a Value,
}

impl ApiRequest for Insert<'_> {
    fn method(&self) -> http::Method {
        http::Method::POST
    }

    fn path(&self) -> String {
        "/insert/".to_string()
    }

    fn key_level(&self) -> KeyLevel {
        KeyLevel::Write
    }

    fn validate(&self) -> Result<(), ApiError> {
        InsertValidator::new(self.data)?.validate()
    }

    fn body(&self) -> Option<impl Serialize> {
        Some(self.data)
    }
}
