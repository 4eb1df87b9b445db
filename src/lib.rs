//! A client for [SlicingDice](https://www.slicingdice.com).
//!
//! This crate provides a Rust SDK for the SlicingDice analytics database.
//! Payloads are checked against the service's limits, and the configured
//! keys are checked against the privilege each operation requires, before
//! anything is sent over the network.
//!
//! # Example
//!
//! ```no_run
//! use serde_json::json;
//! use slicingdice::{Client, KeySet, Profile, parse_response};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let profile = Profile::new(KeySet::master("my-master-key")?);
//! let client = Client::new(profile)?;
//!
//! let column = json!({
//!     "name": "Country",
//!     "api-name": "country",
//!     "type": "string",
//!     "cardinality": "low",
//! });
//! client.create_column(&column).await?;
//!
//! let data = json!({
//!     "user1@example.com": {"country": "BR"},
//!     "user2@example.com": {"country": "US"},
//!     "auto-create": ["dimension", "column"],
//! });
//! client.insert(&data).await?;
//!
//! let query = json!({
//!     "brazilians": {"query": [{"country": {"equal": "BR"}}]},
//!     "bypass-cache": true,
//! });
//! let body = client.count_entity(&query).await?;
//!
//! // The raw body is returned as-is; errors reported by the service are
//! // surfaced by parsing it.
//! let result = parse_response(&body)?;
//! println!("{}", result["result"]["brazilians"]);
//! # Ok(())
//! # }
//! ```
//!
//! # HTTP Requests
//!
//! Each operation is also available as a type implementing [`ApiRequest`],
//! which can be turned into an [`http::Request`] for use with any HTTP
//! client.
//!
//! ```no_run
//! use serde_json::json;
//! use slicingdice::{ApiRequest, Profile, parse_response, query::TopValues};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let profile = Profile::from_default_env()?;
//!
//! let query = json!({"user-country": {"user-country": 3, "contains": ["us", "br"]}});
//! let req = TopValues { query: &query }.into_request(&profile)?;
//! let reqwest_req: reqwest::Request = req.try_into()?;
//!
//! let resp = reqwest::Client::new().execute(reqwest_req).await?;
//! let result = parse_response(&resp.text().await?)?;
//! println!("{result}");
//! # Ok(())
//! # }
//! ```

#![warn(
    anonymous_parameters,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    rust_2018_idioms,
    single_use_lifetimes,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unused_extern_crates,
    unused_qualifications,
    variant_size_differences
)]

mod api;
mod client;
mod config;
mod requester;

#[cfg(test)]
pub(crate) mod testutil;

pub use api::*;
pub use client::Client;
pub use config::{Error as ConfigError, Profile};
pub use requester::Requester;
