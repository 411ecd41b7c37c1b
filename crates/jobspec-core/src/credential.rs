//! Credentials for retrieving git submodules.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Credential applied when cloning a submodule whose url matches `url`.
///
/// Only http and https submodules can use credentials; the owning job checks
/// this when it retrieves source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SubmoduleCredential {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    /// Name of the job secret holding the password or access token.
    #[serde(default)]
    pub password_secret: Option<String>,
}

impl SubmoduleCredential {
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            user_name: None,
            password_secret: None,
        }
    }

    /// Whether the url, if any, uses a scheme credentials can be sent over.
    pub fn has_http_url(&self) -> bool {
        match &self.url {
            Some(url) => url.starts_with("http://") || url.starts_with("https://"),
            None => true,
        }
    }
}
