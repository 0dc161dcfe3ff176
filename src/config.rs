use std::path::Path;

use crate::domain::{DEFAULT_ID_END, DEFAULT_ID_START, IdRange};
use crate::error::HarvestError;
use crate::store::{DEFAULT_COLLECTION, DEFAULT_DATABASE};
use crate::webhallen::DEFAULT_API_BASE;

pub const ENV_MONGO_URI: &str = "MONGO_URI";
pub const ENV_ID_START: &str = "PRODUCT_ID_START";
pub const ENV_ID_END: &str = "PRODUCT_ID_END";
pub const ENV_DATABASE: &str = "MONGO_DATABASE";
pub const ENV_COLLECTION: &str = "MONGO_COLLECTION";
pub const ENV_API_BASE: &str = "WEBHALLEN_API_BASE";

/// Everything the harvest needs, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub mongo_uri: String,
    pub database: String,
    pub collection: String,
    pub api_base: String,
    pub range: IdRange,
}

impl Config {
    /// Connection string with any password replaced by `***`.
    pub fn redacted_mongo_uri(&self) -> String {
        redact_uri(&self.mongo_uri)
    }
}

/// Values given on the command line; they win over the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub mongo_uri: Option<String>,
    pub database: Option<String>,
    pub collection: Option<String>,
    pub api_base: Option<String>,
    pub start: Option<u32>,
    pub end: Option<u32>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads `.env` from the working directory (if any) and resolves from the
    /// process environment.
    pub fn resolve(overrides: ConfigOverrides) -> Result<Config, HarvestError> {
        match dotenv::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
            Err(err) if err.not_found() => {}
            Err(err) => tracing::warn!("ignoring unreadable .env: {err}"),
        }
        Self::resolve_with(|key| std::env::var(key).ok(), overrides)
    }

    /// Like [`ConfigLoader::resolve`] but reads the given env file instead of
    /// searching the working directory.
    pub fn resolve_from_file(
        path: &Path,
        overrides: ConfigOverrides,
    ) -> Result<Config, HarvestError> {
        let entries = dotenv::from_path_iter(path)
            .map_err(|err| HarvestError::EnvFile(format!("{}: {err}", path.display())))?
            .collect::<Result<Vec<(String, String)>, _>>()
            .map_err(|err| HarvestError::EnvFile(format!("{}: {err}", path.display())))?;

        Self::resolve_with(
            |key| {
                std::env::var(key).ok().or_else(|| {
                    entries
                        .iter()
                        .find(|(name, _)| name == key)
                        .map(|(_, value)| value.clone())
                })
            },
            overrides,
        )
    }

    pub fn resolve_with<F>(lookup: F, overrides: ConfigOverrides) -> Result<Config, HarvestError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mongo_uri = overrides
            .mongo_uri
            .or_else(|| lookup(ENV_MONGO_URI))
            .ok_or(HarvestError::MissingMongoUri)?;

        let start = match overrides.start {
            Some(start) => start,
            None => parse_bound(ENV_ID_START, lookup(ENV_ID_START), DEFAULT_ID_START)?,
        };
        let end = match overrides.end {
            Some(end) => end,
            None => parse_bound(ENV_ID_END, lookup(ENV_ID_END), DEFAULT_ID_END)?,
        };
        let range = IdRange::new(start, end)?;

        Ok(Config {
            mongo_uri,
            database: overrides
                .database
                .or_else(|| lookup(ENV_DATABASE))
                .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            collection: overrides
                .collection
                .or_else(|| lookup(ENV_COLLECTION))
                .unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
            api_base: overrides
                .api_base
                .or_else(|| lookup(ENV_API_BASE))
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            range,
        })
    }
}

fn parse_bound(key: &str, value: Option<String>, default: u32) -> Result<u32, HarvestError> {
    match value {
        Some(value) => value
            .trim()
            .parse::<u32>()
            .map_err(|_| HarvestError::InvalidNumber {
                key: key.to_string(),
                value,
            }),
        None => Ok(default),
    }
}

fn redact_uri(uri: &str) -> String {
    let Some((scheme, rest)) = uri.split_once("://") else {
        return uri.to_string();
    };
    let Some((userinfo, host)) = rest.rsplit_once('@') else {
        return uri.to_string();
    };
    match userinfo.split_once(':') {
        Some((user, _)) => format!("{scheme}://{user}:***@{host}"),
        None => uri.to_string(),
    }
}
