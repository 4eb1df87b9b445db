//! API keys and the privilege each one grants.

use crate::{ApiError, ApiErrorKind};

/// The privilege an operation requires, or a key grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum KeyLevel {
    /// Queries and data extraction.
    Read = 0,
    /// Column creation and insertion.
    Write = 1,
    /// Everything, including database and saved query management.
    Full = 2,
}

impl std::fmt::Display for KeyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            KeyLevel::Read => "read",
            KeyLevel::Write => "write",
            KeyLevel::Full => "full",
        })
    }
}

/// The set of keys a client was configured with. At least one key is always
/// present.
#[derive(Clone, PartialEq, Eq)]
pub struct KeySet {
    master_key: Option<String>,
    custom_key: Option<String>,
    write_key: Option<String>,
    read_key: Option<String>,
}

impl std::fmt::Debug for KeySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |k: &Option<String>| k.as_ref().map(|_| "********");
        f.debug_struct("KeySet")
            .field("master_key", &mask(&self.master_key))
            .field("custom_key", &mask(&self.custom_key))
            .field("write_key", &mask(&self.write_key))
            .field("read_key", &mask(&self.read_key))
            .finish()
    }
}

impl KeySet {
    /// Build a key set. Fails if every key is `None`, or if any key is not
    /// ASCII.
    pub fn new(
        master_key: Option<String>,
        custom_key: Option<String>,
        write_key: Option<String>,
        read_key: Option<String>,
    ) -> Result<Self, ApiError> {
        let keys = Self {
            master_key,
            custom_key,
            write_key,
            read_key,
        };

        let all = [
            &keys.master_key,
            &keys.custom_key,
            &keys.write_key,
            &keys.read_key,
        ];

        if all.iter().all(|k| k.is_none()) {
            return Err(ApiError::new(
                ApiErrorKind::InvalidKeys,
                "at least one key must be provided",
            ));
        }

        if all.iter().flat_map(|k| k.as_deref()).any(|k| !k.is_ascii()) {
            return Err(ApiError::new(
                ApiErrorKind::InvalidKeys,
                "keys may only contain ASCII characters",
            ));
        }

        Ok(keys)
    }

    /// A key set holding only a master key.
    pub fn master(key: impl Into<String>) -> Result<Self, ApiError> {
        Self::new(Some(key.into()), None, None, None)
    }

    /// A key set holding only a write key.
    pub fn write(key: impl Into<String>) -> Result<Self, ApiError> {
        Self::new(None, None, Some(key.into()), None)
    }

    /// A key set holding only a read key.
    pub fn read(key: impl Into<String>) -> Result<Self, ApiError> {
        Self::new(None, None, None, Some(key.into()))
    }

    /// The key that will be used for requests, and the level it grants.
    /// Master beats custom beats write beats read.
    pub fn effective(&self) -> Result<(&str, KeyLevel), ApiError> {
        let candidates = [
            (&self.master_key, KeyLevel::Full),
            (&self.custom_key, KeyLevel::Full),
            (&self.write_key, KeyLevel::Write),
            (&self.read_key, KeyLevel::Read),
        ];

        candidates
            .into_iter()
            .find_map(|(key, level)| key.as_deref().map(|k| (k, level)))
            .ok_or_else(|| ApiError::new(ApiErrorKind::InvalidKeys, "no key configured"))
    }

    /// Select the key for an operation requiring `required`. A full-access
    /// key may be used for anything; other keys only for operations at
    /// exactly their own level.
    pub fn select_key(&self, required: KeyLevel) -> Result<&str, ApiError> {
        let (key, level) = self.effective()?;
        if level == KeyLevel::Full || level == required {
            Ok(key)
        } else {
            Err(ApiError::new(
                ApiErrorKind::InvalidKeys,
                format!("a {level} key is not allowed to perform a {required} operation"),
            ))
        }
    }
}

#[cfg(test)]
mod test {
    use assert_matches::assert_matches;

    use super::*;

    fn some(s: &str) -> Option<String> {
        Some(s.to_owned())
    }

    #[test]
    fn no_keys() {
        let err = KeySet::new(None, None, None, None).unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::InvalidKeys);
    }

    #[test]
    fn non_ascii_key() {
        let err = KeySet::write("clé").unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::InvalidKeys);
    }

    #[test]
    fn priority() -> anyhow::Result<()> {
        let keys = KeySet::new(some("m"), some("c"), some("w"), some("r"))?;
        assert_eq!(keys.effective()?, ("m", KeyLevel::Full));

        let keys = KeySet::new(None, some("c"), some("w"), some("r"))?;
        assert_eq!(keys.effective()?, ("c", KeyLevel::Full));

        let keys = KeySet::new(None, None, some("w"), some("r"))?;
        assert_eq!(keys.effective()?, ("w", KeyLevel::Write));

        let keys = KeySet::read("r")?;
        assert_eq!(keys.effective()?, ("r", KeyLevel::Read));
        Ok(())
    }

    #[test]
    fn full_keys_authorize_everything() -> anyhow::Result<()> {
        for keys in [
            KeySet::master("m")?,
            KeySet::new(None, some("c"), None, some("r"))?,
        ] {
            for level in [KeyLevel::Read, KeyLevel::Write, KeyLevel::Full] {
                assert!(keys.select_key(level).is_ok());
            }
        }

        Ok(())
    }

    #[test]
    fn write_key_requires_exact_level() -> anyhow::Result<()> {
        let keys = KeySet::write("w")?;
        assert_eq!(keys.select_key(KeyLevel::Write)?, "w");
        assert_matches!(
            keys.select_key(KeyLevel::Read),
            Err(e) if e.kind() == ApiErrorKind::InvalidKeys
        );
        assert_matches!(
            keys.select_key(KeyLevel::Full),
            Err(e) if e.kind() == ApiErrorKind::InvalidKeys
        );
        Ok(())
    }

    #[test]
    fn read_key_cannot_write() -> anyhow::Result<()> {
        let keys = KeySet::read("r")?;
        assert_eq!(keys.select_key(KeyLevel::Read)?, "r");
        assert!(keys.select_key(KeyLevel::Write).is_err());
        Ok(())
    }

    #[test]
    fn debug_masks_keys() -> anyhow::Result<()> {
        let keys = KeySet::master("secret")?;
        let s = format!("{keys:?}");
        assert!(!s.contains("secret"));
        Ok(())
    }
}
