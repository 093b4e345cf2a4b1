use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// State transition requested when writing a DOI record.
///
/// This is what the client asks for, not the state the registry has
/// confirmed. Confirmed state lives in [`crate::RecordAttributes::state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Event {
    #[default]
    Draft,
    Register,
    Publish,
}

impl Event {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Register => "register",
            Self::Publish => "publish",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Event {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "register" => Ok(Self::Register),
            "publish" => Ok(Self::Publish),
            _ => Err(ModelError::UnknownEvent(value.to_string())),
        }
    }
}
