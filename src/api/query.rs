//! Query operations.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    ApiError, ApiErrorKind, KeyLevel,
    api::{
        ApiRequest,
        validate::{Validator, check_structure, len_without},
    },
};

/// The maximum number of queries in a count request.
pub const MAX_COUNT_QUERIES: usize = 10;
/// The maximum number of queries in a top values request.
pub const MAX_TOP_VALUES_QUERIES: usize = 5;
/// The maximum number of parameters in a single top values query.
pub const MAX_TOP_VALUES_PARAMETERS: usize = 6;
/// The maximum number of values in a top values `contains` list.
pub const MAX_CONTAINS_VALUES: usize = 5;
/// The maximum number of columns in an aggregation.
pub const MAX_AGGREGATION_COLUMNS: usize = 5;
/// The maximum number of ids checked by one exists query.
pub const MAX_EXISTS_IDS: usize = 100;

const BYPASS_CACHE: &str = "bypass-cache";

fn max_limit(message: String) -> ApiError {
    ApiError::new(ApiErrorKind::MaxLimit, message)
}

/// Validates a count query (entity or event).
#[derive(Debug)]
pub struct CountQueryValidator<'a> {
    queries: &'a Map<String, Value>,
}

impl<'a> CountQueryValidator<'a> {
    /// Run the structural check on the query.
    pub fn new(payload: &'a Value) -> Result<Self, ApiError> {
        Ok(Self {
            queries: check_structure(payload)?,
        })
    }
}

impl Validator for CountQueryValidator<'_> {
    fn validate(&self) -> Result<(), ApiError> {
        let size = len_without(self.queries, BYPASS_CACHE);
        if size > MAX_COUNT_QUERIES {
            return Err(max_limit(format!(
                "a count query has a limit of {MAX_COUNT_QUERIES} queries per request, got {size}"
            )));
        }

        Ok(())
    }
}

/// Validates a top values query.
#[derive(Debug)]
pub struct TopValuesValidator<'a> {
    queries: &'a Map<String, Value>,
}

impl<'a> TopValuesValidator<'a> {
    /// Run the structural check on the query.
    pub fn new(payload: &'a Value) -> Result<Self, ApiError> {
        Ok(Self {
            queries: check_structure(payload)?,
        })
    }
}

impl Validator for TopValuesValidator<'_> {
    fn validate(&self) -> Result<(), ApiError> {
        if self.queries.len() > MAX_TOP_VALUES_QUERIES {
            return Err(max_limit(format!(
                "a top values request has a limit of {MAX_TOP_VALUES_QUERIES} queries"
            )));
        }

        for (name, query) in self.queries {
            let Value::Object(query) = query else {
                return Err(ApiError::new(
                    ApiErrorKind::InvalidQuery,
                    format!("the query '{name}' should be an object"),
                ));
            };

            if query.len() > MAX_TOP_VALUES_PARAMETERS {
                return Err(max_limit(format!(
                    "the query '{name}' exceeds the limit of columns per query"
                )));
            }

            if !query.contains_key("contains") && !query.contains_key("equal") {
                return Err(ApiError::new(
                    ApiErrorKind::InvalidQuery,
                    format!("the query '{name}' should have either 'contains' or 'equal'"),
                ));
            }

            let contains = match query.get("contains") {
                None => 0,
                Some(Value::Array(values)) => values.len(),
                Some(_) => {
                    return Err(ApiError::new(
                        ApiErrorKind::InvalidQuery,
                        format!("'contains' in the query '{name}' should be a list"),
                    ));
                }
            };

            if contains > MAX_CONTAINS_VALUES {
                return Err(max_limit(format!(
                    "the query '{name}' exceeds the limit of {MAX_CONTAINS_VALUES} 'contains' values"
                )));
            }
        }

        Ok(())
    }
}

fn count_path(path: &str) -> String {
    format!("/query/count/{path}/")
}

/// Count the entities matching each query.
#[derive(Debug, Clone)]
pub struct CountEntity<'a> {
    /// Named queries, plus an optional `bypass-cache` flag.
    pub query: &'a Value,
}

impl ApiRequest for CountEntity<'_> {
    fn method(&self) -> http::Method {
        http::Method::POST
    }

    fn path(&self) -> String {
        count_path("entity")
    }

    fn key_level(&self) -> KeyLevel {
        KeyLevel::Read
    }

    fn validate(&self) -> Result<(), ApiError> {
        CountQueryValidator::new(self.query)?.validate()
    }

    fn body(&self) -> Option<impl Serialize> {
        Some(self.query)
    }
}

/// Count the events matching each query.
#[derive(Debug, Clone)]
pub struct CountEvent<'a> {
    /// Named queries, plus an optional `bypass-cache` flag.
    pub query: &'a Value,
}

impl ApiRequest for CountEvent<'_> {
    fn method(&self) -> http::Method {
        http::Method::POST
    }

    fn path(&self) -> String {
        count_path("event")
    }

    fn key_level(&self) -> KeyLevel {
        KeyLevel::Read
    }

    fn validate(&self) -> Result<(), ApiError> {
        CountQueryValidator::new(self.query)?.validate()
    }

    fn body(&self) -> Option<impl Serialize> {
        Some(self.query)
    }
}

/// Count every entity in the database, optionally restricted to some
/// dimensions.
#[derive(Debug, Clone, Default)]
pub struct CountEntityTotal<'a> {
    /// The dimensions to count in.
    pub dimensions: Option<&'a [&'a str]>,
}

#[derive(Serialize)]
struct CountEntityTotalBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<&'a [&'a str]>,
}

impl ApiRequest for CountEntityTotal<'_> {
    fn method(&self) -> http::Method {
        http::Method::POST
    }

    fn path(&self) -> String {
        count_path("entity/total")
    }

    fn key_level(&self) -> KeyLevel {
        KeyLevel::Read
    }

    fn body(&self) -> Option<impl Serialize> {
        Some(CountEntityTotalBody {
            dimensions: self.dimensions,
        })
    }
}

/// Aggregate values of up to five columns.
#[derive(Debug, Clone)]
pub struct Aggregation<'a> {
    /// The aggregation, which must have a `query` key.
    pub query: &'a Value,
}

impl ApiRequest for Aggregation<'_> {
    fn method(&self) -> http::Method {
        http::Method::POST
    }

    fn path(&self) -> String {
        "/query/aggregation/".to_string()
    }

    fn key_level(&self) -> KeyLevel {
        KeyLevel::Read
    }

    fn validate(&self) -> Result<(), ApiError> {
        let Some(columns) = self.query.get("query") else {
            return Err(ApiError::new(
                ApiErrorKind::InvalidQuery,
                "the aggregation query must have the key 'query'",
            ));
        };

        let len = match columns {
            Value::Array(list) => list.len(),
            Value::Object(map) => map.len(),
            _ => {
                return Err(ApiError::new(
                    ApiErrorKind::InvalidQuery,
                    "the aggregation 'query' should be a list of columns",
                ));
            }
        };

        if len > MAX_AGGREGATION_COLUMNS {
            return Err(max_limit(format!(
                "an aggregation query can have up to {MAX_AGGREGATION_COLUMNS} columns per request"
            )));
        }

        Ok(())
    }

    fn body(&self) -> Option<impl Serialize> {
        Some(self.query)
    }
}

/// Fetch the most frequent values of some columns.
#[derive(Debug, Clone)]
pub struct TopValues<'a> {
    /// Named queries, each with `contains` or `equal`.
    pub query: &'a Value,
}

impl ApiRequest for TopValues<'_> {
    fn method(&self) -> http::Method {
        http::Method::POST
    }

    fn path(&self) -> String {
        "/query/top_values/".to_string()
    }

    fn key_level(&self) -> KeyLevel {
        KeyLevel::Read
    }

    fn validate(&self) -> Result<(), ApiError> {
        TopValuesValidator::new(self.query)?.validate()
    }

    fn body(&self) -> Option<impl Serialize> {
        Some(self.query)
    }
}

/// Check whether entities exist.
#[derive(Debug, Clone)]
pub struct ExistsEntity<'a> {
    /// The ids to look for.
    pub ids: &'a [&'a str],
    /// Restrict the search to a dimension.
    pub dimension: Option<&'a str>,
}

#[derive(Serialize)]
struct ExistsEntityBody<'a> {
    ids: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimension: Option<&'a str>,
}

impl ApiRequest for ExistsEntity<'_> {
    fn method(&self) -> http::Method {
        http::Method::POST
    }

    fn path(&self) -> String {
        "/query/exists/entity/".to_string()
    }

    fn key_level(&self) -> KeyLevel {
        KeyLevel::Read
    }

    fn validate(&self) -> Result<(), ApiError> {
        if self.ids.len() > MAX_EXISTS_IDS {
            return Err(max_limit(format!(
                "an exists query can have up to {MAX_EXISTS_IDS} ids, got {}",
                self.ids.len()
            )));
        }

        Ok(())
    }

    fn body(&self) -> Option<impl Serialize> {
        Some(ExistsEntityBody {
            ids: self.ids,
            dimension: self.dimension.filter(|d| !d.is_empty()),
        })
    }
}

/// Run an SQL query.
#[derive(Debug, Clone)]
pub struct Sql<'a> {
    /// The query text.
    pub query: &'a str,
}

impl ApiRequest for Sql<'_> {
    fn method(&self) -> http::Method {
        http::Method::POST
    }

    fn path(&self) -> String {
        "/sql/".to_string()
    }

    fn key_level(&self) -> KeyLevel {
        KeyLevel::Read
    }

    fn sql_body(&self) -> Option<&str> {
        Some(self.query)
    }
}
