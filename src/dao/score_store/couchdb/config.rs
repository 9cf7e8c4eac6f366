use std::env;

use super::error::{CouchDaoError, CouchResult};

const BASE_URL_VAR: &str = "COUCH_BASE_URL";
const DATABASE_VAR: &str = "COUCH_DB";
const USERNAME_VAR: &str = "COUCH_USERNAME";
const PASSWORD_VAR: &str = "COUCH_PASSWORD";

/// Where the CouchDB score store lives and how to authenticate.
#[derive(Debug, Clone)]
pub struct CouchConfig {
    /// Server root without trailing slash, e.g. `http://localhost:5984`.
    pub base_url: String,
    pub database: String,
    /// Basic-auth `(username, password)`; only set when both variables are present.
    pub credentials: Option<(String, String)>,
}

impl CouchConfig {
    /// Read `COUCH_BASE_URL`, `COUCH_DB` and the optional `COUCH_USERNAME`/`COUCH_PASSWORD`.
    pub fn from_env() -> CouchResult<Self> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> CouchResult<Self> {
        let required = |var: &'static str| {
            lookup(var)
                .filter(|value| !value.trim().is_empty())
                .ok_or(CouchDaoError::MissingEnvVar { var })
        };

        let base_url = required(BASE_URL_VAR)?.trim_end_matches('/').to_owned();
        let database = required(DATABASE_VAR)?;
        let credentials = lookup(USERNAME_VAR).zip(lookup(PASSWORD_VAR));

        Ok(Self {
            base_url,
            database,
            credentials,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn base_url_and_database_are_required() {
        let err = CouchConfig::from_lookup(lookup(&[("COUCH_DB", "scores")])).unwrap_err();
        assert!(matches!(err, CouchDaoError::MissingEnvVar { var: "COUCH_BASE_URL" }));

        let err = CouchConfig::from_lookup(lookup(&[("COUCH_BASE_URL", "http://couch:5984")]))
            .unwrap_err();
        assert!(matches!(err, CouchDaoError::MissingEnvVar { var: "COUCH_DB" }));
    }

    #[test]
    fn credentials_need_both_halves() {
        let config = CouchConfig::from_lookup(lookup(&[
            ("COUCH_BASE_URL", "http://couch:5984/"),
            ("COUCH_DB", "scores"),
            ("COUCH_USERNAME", "admin"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://couch:5984");
        assert_eq!(config.credentials, None);

        let config = CouchConfig::from_lookup(lookup(&[
            ("COUCH_BASE_URL", "http://couch:5984"),
            ("COUCH_DB", "scores"),
            ("COUCH_USERNAME", "admin"),
            ("COUCH_PASSWORD", "secret"),
        ]))
        .unwrap();
        assert_eq!(
            config.credentials,
            Some(("admin".to_owned(), "secret".to_owned()))
        );
    }
}
