// ABOUTME: Validated application name and its DNS hostname form.
// ABOUTME: Default and random routes derive their host label from the app name.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AppNameError {
    #[error("application name cannot be empty")]
    Empty,

    #[error("application name exceeds maximum length of 255 characters")]
    TooLong,

    #[error("application name cannot start or end with whitespace")]
    SurroundingWhitespace,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct AppName(String);

impl AppName {
    pub fn new(value: &str) -> Result<Self, AppNameError> {
        if value.is_empty() {
            return Err(AppNameError::Empty);
        }

        if value.len() > 255 {
            return Err(AppNameError::TooLong);
        }

        if value.trim() != value {
            return Err(AppNameError::SurroundingWhitespace);
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Host label for the application's default route.
    ///
    /// Lowercases the name, replaces anything outside `[a-z0-9-]` with a
    /// hyphen, collapses repeated hyphens and trims them from both ends.
    pub fn hostname(&self) -> String {
        let mut host = String::with_capacity(self.0.len());
        for c in self.0.chars() {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                host.push(c);
            } else if !host.ends_with('-') {
                host.push('-');
            }
        }
        host.trim_matches('-').to_string()
    }
}

impl fmt::Display for AppName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for AppName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AppName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        AppName::new(&s).map_err(serde::de::Error::custom)
    }
}
