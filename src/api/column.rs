//! API operations concerning columns.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    ApiError, ApiErrorKind, KeyLevel,
    api::{
        ApiRequest,
        validate::{Validator, check_structure, is_blank},
    },
};

const MAX_NAME_LEN: usize = 80;
const MAX_DESCRIPTION_LEN: usize = 300;

wire_enum! {
    /// The type of a column.
    ColumnType {
        "unique-id" => UniqueId,
        "boolean" => Boolean,
        "string" => String,
        "integer" => Integer,
        "decimal" => Decimal,
        "enumerated" => Enumerated,
        "date" => Date,
        "integer-time-series" => IntegerTimeSeries,
        "decimal-time-series" => DecimalTimeSeries,
        "string-time-series" => StringTimeSeries,
        "datetime" => Datetime,
    }
}

wire_enum! {
    /// The expected cardinality of a string column.
    Cardinality {
        "high" => High,
        "low" => Low,
    }
}

impl ColumnType {
    /// Whether the type accepts a `decimal-place` parameter.
    pub fn is_decimal(&self) -> bool {
        matches!(self, ColumnType::Decimal | ColumnType::DecimalTimeSeries)
    }
}

/// Validates one column definition, or a list of them.
#[derive(Debug)]
pub struct ColumnValidator<'a> {
    definitions: Vec<&'a Map<String, Value>>,
}

impl<'a> ColumnValidator<'a> {
    /// Run the structural check on every definition.
    pub fn new(payload: &'a Value) -> Result<Self, ApiError> {
        let definitions = match payload {
            Value::Array(list) if list.is_empty() => {
                return Err(ApiError::new(
                    ApiErrorKind::InvalidQuery,
                    "the column list is empty",
                ));
            }
            Value::Array(list) => list.iter().map(check_structure).collect::<Result<_, _>>()?,
            single => vec![check_structure(single)?],
        };

        Ok(Self { definitions })
    }
}

impl Validator for ColumnValidator<'_> {
    fn validate(&self) -> Result<(), ApiError> {
        self.definitions
            .iter()
            .try_for_each(|def| validate_definition(def))
    }
}

fn column_error(message: &str) -> ApiError {
    ApiError::new(ApiErrorKind::InvalidColumn, message)
}

fn validate_definition(def: &Map<String, Value>) -> Result<(), ApiError> {
    validate_name(def.get("name"))?;
    let column_type = validate_type(def.get("type"))?;

    match column_type {
        ColumnType::String => validate_cardinality(def.get("cardinality"))?,
        ColumnType::Enumerated if !def.contains_key("range") => {
            return Err(column_error(
                "an enumerated column needs the 'range' parameter",
            ));
        }
        _ => (),
    }

    if let Some(description) = def.get("description") {
        validate_description(description)?;
    }

    if def.contains_key("decimal-place") && !column_type.is_decimal() {
        return Err(column_error(
            "'decimal-place' is only accepted on 'decimal' or 'decimal-time-series' columns",
        ));
    }

    Ok(())
}

fn validate_name(name: Option<&Value>) -> Result<(), ApiError> {
    let error = |message| ApiError::new(ApiErrorKind::InvalidColumnName, message);
    match name {
        None => Err(error("the column should have a name")),
        Some(Value::String(s)) if is_blank(s) => Err(error("the column's name can't be empty")),
        Some(Value::String(s)) if s.chars().count() > MAX_NAME_LEN => Err(error(
            "the column's name is too long (max 80 characters)",
        )),
        Some(Value::String(_)) => Ok(()),
        Some(_) => Err(error("the column's name should be a string")),
    }
}

fn validate_type(column_type: Option<&Value>) -> Result<ColumnType, ApiError> {
    let Some(column_type) = column_type else {
        return Err(ApiError::new(
            ApiErrorKind::InvalidColumnType,
            "the column should have a type",
        ));
    };

    column_type
        .as_str()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| {
            ApiError::new(
                ApiErrorKind::InvalidColumnType,
                format!("invalid column type: {column_type}"),
            )
        })
}

fn validate_cardinality(cardinality: Option<&Value>) -> Result<(), ApiError> {
    let Some(cardinality) = cardinality else {
        return Err(column_error(
            "a string column should have the 'cardinality' parameter",
        ));
    };

    match cardinality.as_str().map(str::parse::<Cardinality>) {
        Some(Ok(_)) => Ok(()),
        _ => Err(column_error("the column's 'cardinality' has an invalid value")),
    }
}

fn validate_description(description: &Value) -> Result<(), ApiError> {
    let error = |message| ApiError::new(ApiErrorKind::InvalidColumnDescription, message);
    match description {
        Value::String(s) if is_blank(s) => Err(error("the column's description can't be empty")),
        Value::String(s) if s.chars().count() > MAX_DESCRIPTION_LEN => Err(error(
            "the column's description is too long (max 300 characters)",
        )),
        Value::String(_) => Ok(()),
        _ => Err(error("the column's description should be a string")),
    }
}

/// Create one or more columns.
#[derive(Debug, Clone)]
pub struct CreateColumn<'a> {
    /// A column definition, or a list of them.
    pub columns: &'a Value,
}

impl ApiRequest for CreateColumn<'_> {
    fn method(&self) -> http::Method {
        http::Method::POST
    }

    fn path(&self) -> String {
        "/column/".to_string()
    }

    fn key_level(&self) -> KeyLevel {
        KeyLevel::Write
    }

    fn validate(&self) -> Result<(), ApiError> {
        ColumnValidator::new(self.columns)?.validate()
    }

    fn body(&self) -> Option<impl Serialize> {
        Some(self.columns)
    }
}

/// List the columns of the database.
#[derive(Debug, Clone, Copy)]
pub struct GetColumns;

impl ApiRequest for GetColumns {
    fn path(&self) -> String {
        "/column/".to_string()
    }

    fn key_level(&self) -> KeyLevel {
        KeyLevel::Full
    }
}
