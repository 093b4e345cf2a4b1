//! Repository credentials.

use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Repository id and password used for Basic authentication.
///
/// The repository id doubles as the account id used by the preflight
/// check. `Debug` never prints the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub repo_id: String,
    pub password: String,
}

impl Credentials {
    pub fn new(repo_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            repo_id: repo_id.into(),
            password: password.into(),
        }
    }
}

impl FromStr for Credentials {
    type Err = ModelError;

    /// Parses `repo_id:password`, splitting on the first `:` only.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (repo_id, password) = value
            .split_once(':')
            .ok_or(ModelError::MalformedCredentials)?;
        Ok(Self::new(repo_id, password))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("repo_id", &self.repo_id)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
