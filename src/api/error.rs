use serde::Deserialize;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An error produced by the client, either locally (validation, key
/// selection, transport) or by the service itself.
#[derive(Debug, thiserror::Error)]
pub struct ApiError {
    kind: ApiErrorKind,
    code: Option<i64>,
    message: Option<String>,
    more_info: Option<String>,
    #[source]
    source: Option<BoxError>,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(code) = self.code {
            write!(f, " [{code}]")?;
        }

        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        } else if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(more_info) = &self.more_info {
            write!(f, " (see {more_info})")?;
        }

        Ok(())
    }
}

/// The category of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ApiErrorKind {
    /// No usable key, or the key lacks the privilege for the operation.
    InvalidKeys,
    /// The payload is malformed.
    InvalidQuery,
    /// The saved query does not declare a known query type.
    InvalidQueryType,
    /// The payload exceeds a service-side limit.
    MaxLimit,
    /// A value in the payload has the wrong type.
    WrongType,
    /// The insertion payload is not acceptable.
    InvalidInsert,
    /// The column definition is incomplete or inconsistent.
    InvalidColumn,
    /// The column name is missing, blank or too long.
    InvalidColumnName,
    /// The column description is blank or too long.
    InvalidColumnDescription,
    /// The column type is missing or unknown.
    InvalidColumnType,
    /// The connection failed or timed out.
    Http,
    /// The request could not be built or failed in transit.
    Request,
    /// The response body was not valid JSON.
    InvalidResponse,
    /// The demo database is unavailable.
    DemoUnavailable,
    /// Too many requests were made in a short time.
    RequestRateLimit,
    /// The request body is larger than the service accepts.
    RequestBodySizeExceeded,
    /// Too many entities were inserted in one request.
    IndexEntitiesLimit,
    /// Too many columns were inserted in one request.
    IndexColumnsLimit,
    /// The service reported an error without a dedicated kind.
    Service,
}

impl std::fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ApiErrorKind::InvalidKeys => "Invalid keys",
            ApiErrorKind::InvalidQuery => "Invalid query",
            ApiErrorKind::InvalidQueryType => "Invalid query type",
            ApiErrorKind::MaxLimit => "Limit exceeded",
            ApiErrorKind::WrongType => "Wrong type",
            ApiErrorKind::InvalidInsert => "Invalid insert",
            ApiErrorKind::InvalidColumn => "Invalid column",
            ApiErrorKind::InvalidColumnName => "Invalid column name",
            ApiErrorKind::InvalidColumnDescription => "Invalid column description",
            ApiErrorKind::InvalidColumnType => "Invalid column type",
            ApiErrorKind::Http => "HTTP error",
            ApiErrorKind::Request => "Request failed",
            ApiErrorKind::InvalidResponse => "Invalid response",
            ApiErrorKind::DemoUnavailable => "Demo unavailable",
            ApiErrorKind::RequestRateLimit => "Request rate limit exceeded",
            ApiErrorKind::RequestBodySizeExceeded => "Request body size exceeded",
            ApiErrorKind::IndexEntitiesLimit => "Entities limit exceeded",
            ApiErrorKind::IndexColumnsLimit => "Columns limit exceeded",
            ApiErrorKind::Service => "Service error",
        })
    }
}

macro_rules! service_error_codes {
    ($($code:literal => $variant:ident),* $(,)?) => {
        impl ApiErrorKind {
            /// Returns the kind the service reports with `code`, if it has a
            /// dedicated one.
            pub fn from_code(code: i64) -> Option<Self> {
                Some(match code {
                    $($code => ApiErrorKind::$variant,)*
                    _ => return None,
                })
            }

            /// Returns the service code for this kind, if it is a service
            /// error kind.
            pub fn code(&self) -> Option<i64> {
                match self {
                    $(ApiErrorKind::$variant => Some($code),)*
                    _ => None,
                }
            }
        }
    };
}

service_error_codes! {
    2 => DemoUnavailable,
    1502 => RequestRateLimit,
    1507 => RequestBodySizeExceeded,
    2012 => IndexEntitiesLimit,
    2013 => IndexColumnsLimit,
}

/// The error object embedded in a response body.
#[derive(Debug, Deserialize)]
pub(crate) struct RawApiError {
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "more-info")]
    more_info: Option<String>,
}

impl ApiError {
    /// Creates an error of the given kind with a message.
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: None,
            message: Some(message.into()),
            more_info: None,
            source: None,
        }
    }

    pub(crate) fn with_source(kind: ApiErrorKind, source: impl Into<BoxError>) -> Self {
        Self {
            kind,
            code: None,
            message: None,
            more_info: None,
            source: Some(source.into()),
        }
    }

    pub(crate) fn from_raw(raw: RawApiError) -> Self {
        let code = raw.code.as_ref().and_then(|c| match c {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        });

        let kind = code
            .and_then(ApiErrorKind::from_code)
            .unwrap_or(ApiErrorKind::Service);

        Self {
            kind,
            code,
            message: raw.message,
            more_info: raw.more_info,
            source: None,
        }
    }

    /// The category of the error.
    pub fn kind(&self) -> ApiErrorKind {
        self.kind
    }

    /// The numeric code reported by the service, if any.
    pub fn code(&self) -> Option<i64> {
        self.code
    }

    /// A description of the error.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// A link to further documentation, as reported by the service.
    pub fn more_info(&self) -> Option<&str> {
        self.more_info.as_deref()
    }
}
