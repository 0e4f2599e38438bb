use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Environment fallback for the Faire app credentials header.
pub const FAIRE_APP_CREDENTIALS_ENV: &str = "FAIRE_APP_CREDENTIALS";
/// Environment fallback for the Faire OAuth access token header.
pub const FAIRE_OAUTH_ACCESS_TOKEN_ENV: &str = "FAIRE_OAUTH_ACCESS_TOKEN";

/// A local store whose Faire catalog is mirrored.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: String,
    pub code: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub faire_app_credentials: Option<String>,
    #[serde(skip_serializing)]
    pub faire_oauth_access_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("id", &self.id)
            .field("code", &self.code)
            .field("name", &self.name)
            .field("has_credentials", &self.has_credentials())
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

impl Store {
    pub fn has_credentials(&self) -> bool {
        non_empty(self.faire_app_credentials.as_deref()).is_some()
            && non_empty(self.faire_oauth_access_token.as_deref()).is_some()
    }

    /// Resolves API credentials, preferring the store row and falling back to
    /// the process environment.
    pub fn resolve_credentials(&self) -> Result<FaireCredentials> {
        self.resolve_credentials_with(|key| std::env::var(key).ok())
    }

    /// Same as [`Store::resolve_credentials`] with an injectable env lookup.
    pub fn resolve_credentials_with<F>(&self, env: F) -> Result<FaireCredentials>
    where
        F: Fn(&str) -> Option<String>,
    {
        let app_credentials = non_empty(self.faire_app_credentials.as_deref())
            .map(str::to_string)
            .or_else(|| env(FAIRE_APP_CREDENTIALS_ENV).filter(|v| !v.trim().is_empty()));
        let access_token = non_empty(self.faire_oauth_access_token.as_deref())
            .map(str::to_string)
            .or_else(|| env(FAIRE_OAUTH_ACCESS_TOKEN_ENV).filter(|v| !v.trim().is_empty()));

        match (app_credentials, access_token) {
            (Some(app), Some(token)) => Ok(FaireCredentials::new(app, token)),
            (None, _) => Err(Error::config(format!(
                "Store '{}' has no Faire app credentials and {} is not set",
                self.code, FAIRE_APP_CREDENTIALS_ENV
            ))),
            (_, None) => Err(Error::config(format!(
                "Store '{}' has no Faire access token and {} is not set",
                self.code, FAIRE_OAUTH_ACCESS_TOKEN_ENV
            ))),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Input for creating or updating a store, keyed by `code`.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStore {
    pub code: String,
    pub name: String,
    pub faire_app_credentials: Option<String>,
    pub faire_oauth_access_token: Option<String>,
}

impl fmt::Debug for NewStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewStore")
            .field("code", &self.code)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl NewStore {
    pub fn validate(&self) -> Result<()> {
        let code = self.code.trim();
        if code.is_empty() {
            return Err(Error::validation("Store code cannot be empty"));
        }
        if !code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(Error::validation(format!(
                "Store code '{}' may only contain letters, digits, '-' and '_'",
                code
            )));
        }
        if self.name.trim().is_empty() {
            return Err(Error::validation("Store name cannot be empty"));
        }
        Ok(())
    }
}

/// Header values used to authenticate against the Faire API.
#[derive(Clone, PartialEq, Eq)]
pub struct FaireCredentials {
    pub app_credentials: String,
    pub access_token: String,
}

impl FaireCredentials {
    pub fn new(app_credentials: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            app_credentials: app_credentials.into(),
            access_token: access_token.into(),
        }
    }
}

impl fmt::Debug for FaireCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FaireCredentials")
            .field("app_credentials", &"[REDACTED]")
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}
