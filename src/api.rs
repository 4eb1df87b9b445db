use serde::Serialize;

use crate::Profile;

/// Declares a closed set of string values used on the wire, with
/// conversions to and from their wire representation.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($value:literal => $variant:ident),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                #[doc = $value]
                $variant,
            )*
        }

        impl $name {
            /// Every accepted value.
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            /// The value as sent to the service.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value,)*
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::api::InvalidValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(match s {
                    $($value => $name::$variant,)*
                    _ => {
                        return Err($crate::api::InvalidValue {
                            kind: stringify!($name),
                            value: s.to_owned(),
                        })
                    }
                })
            }
        }
    };
}

pub mod column;
pub mod database;
mod error;
pub mod extraction;
pub mod insert;
mod keys;
pub mod query;
mod response;
pub mod saved;
pub mod validate;

pub use error::*;
pub use keys::*;
pub use response::*;

/// Indicates that a string is not one of the values the service accepts.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid {kind}: {value:?}")]
pub struct InvalidValue {
    kind: &'static str,
    value: String,
}

const JSON_CONTENT_TYPE: &str = "application/json";
const SQL_CONTENT_TYPE: &str = "application/sql";

/// Implemented by types that can be sent as requests to the SlicingDice API.
pub trait ApiRequest: Sized {
    /// The path that the request should take, relative to the API endpoint.
    fn path(&self) -> String;

    /// The method to use.
    fn method(&self) -> http::Method {
        http::Method::GET
    }

    /// The privilege the operation requires.
    fn key_level(&self) -> KeyLevel;

    /// Check the request locally, before it is sent.
    fn validate(&self) -> Result<(), ApiError> {
        Ok(())
    }

    /// The serializable JSON request body.
    fn body(&self) -> Option<impl Serialize> {
        None::<&()>
    }

    /// A raw SQL request body. Takes precedence over [`ApiRequest::body`].
    fn sql_body(&self) -> Option<&str> {
        None
    }

    /// Validate the request, select a key, and return an [http::Request]
    /// suitable for passing to your favorite HTTP client.
    ///
    /// Nothing is sent over the network; every local failure (validation or
    /// key selection) is reported here.
    fn into_request(self, profile: &Profile) -> Result<http::Request<String>, ApiError> {
        self.validate()?;
        let key = profile.keys.select_key(self.key_level())?;

        let uri: http::Uri = format!("{}{}", profile.endpoint(), self.path())
            .parse()
            .map_err(|e: http::uri::InvalidUri| ApiError::with_source(ApiErrorKind::Request, e))?;

        let req = http::Request::builder()
            .method(self.method())
            .uri(uri)
            .header(http::header::AUTHORIZATION, key)
            .header(http::header::USER_AGENT, &profile.user_agent);

        let (content_type, body) = if let Some(sql) = self.sql_body() {
            (SQL_CONTENT_TYPE, sql.to_owned())
        } else if let Some(body) = self.body() {
            let body_str = serde_json::to_string(&body)
                .map_err(|e| ApiError::with_source(ApiErrorKind::InvalidQuery, e))?;
            (JSON_CONTENT_TYPE, body_str)
        } else {
            (JSON_CONTENT_TYPE, String::new())
        };

        let req = req.header(http::header::CONTENT_TYPE, content_type);
        let req = if body.is_empty() {
            req.body(body)
        } else {
            req.header(http::header::CONTENT_LENGTH, body.len())
                .body(body)
        };

        req.map_err(|e| ApiError::with_source(ApiErrorKind::Request, e))
    }
}
