// ABOUTME: Process health check type used by the web process.
// ABOUTME: Supports port, http (with endpoint) and process checks.

use serde::de::{self, Deserialize, Deserializer};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HealthCheckType {
    #[default]
    Port,
    Http,
    Process,
}

impl FromStr for HealthCheckType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "port" => Ok(HealthCheckType::Port),
            "http" => Ok(HealthCheckType::Http),
            // "none" is the legacy spelling of "process"
            "process" | "none" => Ok(HealthCheckType::Process),
            _ => Err(format!("unknown health check type: {}", s)),
        }
    }
}

impl fmt::Display for HealthCheckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthCheckType::Port => write!(f, "port"),
            HealthCheckType::Http => write!(f, "http"),
            HealthCheckType::Process => write!(f, "process"),
        }
    }
}

impl Serialize for HealthCheckType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HealthCheckType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
