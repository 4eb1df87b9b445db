use std::{
    collections::BTreeMap,
    env,
    fs::File,
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use tracing::debug;

use crate::{ApiError, KeySet};

const DEFAULT_API_ENDPOINT: &str = "https://api.slicingdice.com/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// An error encountered while loading or resolving a configuration profile.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to load config file")]
    Io(#[from] io::Error),
    #[error("Invalid configuration")]
    Invalid(#[from] serde_yaml::Error),
    #[error("Profile '{0}' not found")]
    ProfileNotFound(String),
    #[error("Invalid keys")]
    Keys(#[from] ApiError),
    #[error("Invalid URI")]
    InvalidUri(#[from] http::uri::InvalidUri),
    #[error("Invalid timeout")]
    InvalidTimeout(#[from] humantime::DurationError),
}

/// A fully resolved configuration profile for talking to SlicingDice.
#[derive(Debug, Clone)]
pub struct Profile {
    /// The name of the profile.
    pub name: String,
    /// The API endpoint, including the version prefix.
    pub api_endpoint: http::Uri,
    /// The keys requests are authorized with.
    pub keys: KeySet,
    /// Whether TLS certificates are verified.
    pub verify_tls: bool,
    /// The overall timeout for a single request.
    pub timeout: Duration,
    /// The user-agent used on requests.
    pub user_agent: String,
    /// The config file this profile was loaded from, if any.
    pub config_path: Option<PathBuf>,
}

/// A profile stored in the config file.
#[derive(Debug, Default, Clone, Deserialize)]
struct ConfigProfile {
    master_key: Option<String>,
    custom_key: Option<String>,
    write_key: Option<String>,
    read_key: Option<String>,
    api_endpoint: Option<String>,
    verify_tls: Option<bool>,
    timeout: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
struct Config {
    profiles: BTreeMap<String, ConfigProfile>,
}

impl Profile {
    /// A profile using the given keys and the default endpoint, with TLS
    /// verification on and a 60 second timeout. Does not read the
    /// environment or any config file.
    pub fn new(keys: KeySet) -> Self {
        Self {
            name: "default".to_owned(),
            // The default is a valid URI.
            api_endpoint: http::Uri::from_static(DEFAULT_API_ENDPOINT),
            keys,
            verify_tls: true,
            timeout: DEFAULT_TIMEOUT,
            user_agent: make_ua(None),
            config_path: None,
        }
    }

    /// Use a different API endpoint.
    pub fn with_endpoint(self, endpoint: &str) -> Result<Self, Error> {
        Ok(Self {
            api_endpoint: endpoint.parse()?,
            ..self
        })
    }

    /// Enable or disable TLS certificate verification.
    pub fn with_verify_tls(self, verify_tls: bool) -> Self {
        Self { verify_tls, ..self }
    }

    /// Set the overall timeout for each request.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    /// Modifies the user-agent to have a different prefix.
    pub fn with_ua_product(self, ua_product: &str) -> Self {
        Self {
            user_agent: make_ua(Some(ua_product)),
            ..self
        }
    }

    /// The endpoint as a string without a trailing slash, ready to have a
    /// request path appended.
    pub fn endpoint(&self) -> String {
        self.api_endpoint
            .to_string()
            .trim_end_matches('/')
            .to_owned()
    }

    /// Load a profile from the SlicingDice configuration file (usually
    /// ~/.config/slicingdice.yaml). If no configuration file is present,
    /// the configuration will be loaded solely from the environment.
    ///
    /// If `SLICINGDICE_PROFILE` is set, that will be used to select the
    /// profile. Otherwise the profile `default` will be used.
    ///
    /// See [Profile::from_env] for the environment variables consulted.
    pub fn from_default_env() -> Result<Self, Error> {
        if let Ok(s) = env::var("SLICINGDICE_PROFILE") {
            Self::from_env(&s)
        } else {
            Self::from_env("default")
        }
    }

    /// Load the given profile from the SlicingDice configuration file
    /// (usually ~/.config/slicingdice.yaml). If no configuration file is
    /// present, the configuration will be loaded solely from the environment.
    ///
    /// The following environment variables override the corresponding
    /// values in the config file:
    ///
    /// | Environment Variable | Config Value   |
    /// |----------------------|----------------|
    /// | `SD_MASTER_KEY`      | `master_key`   |
    /// | `SD_CUSTOM_KEY`      | `custom_key`   |
    /// | `SD_WRITE_KEY`       | `write_key`    |
    /// | `SD_READ_KEY`        | `read_key`     |
    /// | `SD_API_ADDRESS`     | `api_endpoint` |
    pub fn from_env(name: &str) -> Result<Self, Error> {
        let config_path = find_config()?;
        let profile = match read_profile(&config_path, name) {
            Ok(p) => p,
            Err(Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no config file found");
                Default::default()
            }
            Err(e) => return Err(e),
        };

        let var = |key: &str| env::var(key).ok().filter(|v| !v.is_empty());
        let profile = ConfigProfile {
            master_key: var("SD_MASTER_KEY").or(profile.master_key),
            custom_key: var("SD_CUSTOM_KEY").or(profile.custom_key),
            write_key: var("SD_WRITE_KEY").or(profile.write_key),
            read_key: var("SD_READ_KEY").or(profile.read_key),
            api_endpoint: var("SD_API_ADDRESS").or(profile.api_endpoint),
            ..profile
        };

        let config_path = config_path.exists().then_some(config_path);
        Self::from_raw(profile, name.to_owned(), config_path)
    }

    /// Load the given profile (or 'default') from the given file, which must
    /// be a valid SlicingDice configuration file. Does not read any
    /// environment variables.
    pub fn read(path: impl AsRef<Path>, name: Option<&str>) -> Result<Self, Error> {
        let path = path.as_ref();
        let name = name.unwrap_or("default").to_owned();
        let profile = read_profile(path, &name)?;
        Self::from_raw(profile, name, Some(path.to_owned()))
    }

    /// Read all profiles from the given file, which must be a valid
    /// SlicingDice configuration file. Does not read any environment
    /// variables.
    pub fn read_all(path: impl AsRef<Path>) -> Result<impl Iterator<Item = Self>, Error> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let config: Config = serde_yaml::from_reader(file)?;

        let profiles: Result<Vec<_>, Error> = config
            .profiles
            .into_iter()
            .map(|(name, raw)| Profile::from_raw(raw, name, Some(path.to_owned())))
            .collect();

        Ok(profiles?.into_iter())
    }

    fn from_raw(raw: ConfigProfile, name: String, path: Option<PathBuf>) -> Result<Self, Error> {
        let ConfigProfile {
            master_key,
            custom_key,
            write_key,
            read_key,
            api_endpoint,
            verify_tls,
            timeout,
        } = raw;

        let keys = KeySet::new(master_key, custom_key, write_key, read_key)?;
        let api_endpoint = api_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_API_ENDPOINT)
            .parse()?;
        let timeout = match timeout {
            Some(t) => humantime::parse_duration(&t)?,
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            name,
            api_endpoint,
            keys,
            verify_tls: verify_tls.unwrap_or(true),
            timeout,
            user_agent: make_ua(None),
            config_path: path,
        })
    }
}

fn find_config() -> Result<PathBuf, Error> {
    let Some(home) = env::home_dir() else {
        return Err(Error::Io(io::Error::other(
            "No $HOME found for the current user",
        )));
    };

    let canonical = home.join(".config/slicingdice.yaml");
    if canonical.exists() {
        return Ok(canonical);
    }

    // Try some fallback paths, and if that doesn't work, return the error from
    // the canonical location.
    for fallback in [".config/slicingdice.yml", ".slicingdice/config.yaml"] {
        let path = home.join(fallback);
        if path.exists() {
            return Ok(path);
        }
    }

    Ok(canonical)
}

fn read_profile(p: &Path, name: &str) -> Result<ConfigProfile, Error> {
    let file = File::open(p)?;
    let mut config: Config = serde_yaml::from_reader(file).map_err(Error::Invalid)?;
    let Some(config_profile) = config.profiles.remove(name) else {
        return Err(Error::ProfileNotFound(name.to_string()));
    };

    debug!(path = %p.display(), "loaded config file");

    Ok(config_profile)
}

fn make_ua(product: Option<&str>) -> String {
    format!(
        "{}/{}",
        product.unwrap_or("slicingdice-rust"),
        env!("CARGO_PKG_VERSION")
    )
}
