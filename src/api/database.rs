//! Information about the database the keys belong to.

use crate::{KeyLevel, api::ApiRequest};

/// Fetch the database associated with the configured keys.
#[derive(Debug, Clone, Copy)]
pub struct GetDatabase;

impl ApiRequest for GetDatabase {
    fn path(&self) -> String {
        "/database/".to_string()
    }

    fn key_level(&self) -> KeyLevel {
        KeyLevel::Full
    }
}
