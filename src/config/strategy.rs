// ABOUTME: Deployment strategy requested for a push.
// ABOUTME: Default stops and restarts; rolling and canary create a platform deployment.

use serde::de::{self, Deserialize, Deserializer};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// How the new droplet replaces the running one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeploymentStrategy {
    /// Stop the app (if asked), set the droplet, restart.
    #[default]
    Default,
    /// Zero-downtime replacement, instance by instance.
    Rolling,
    /// Zero-downtime replacement in weighted steps.
    Canary,
}

impl DeploymentStrategy {
    /// Whether this strategy is realized by a platform deployment.
    pub fn creates_deployment(self) -> bool {
        matches!(self, DeploymentStrategy::Rolling | DeploymentStrategy::Canary)
    }
}

impl FromStr for DeploymentStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "default" => Ok(DeploymentStrategy::Default),
            "rolling" => Ok(DeploymentStrategy::Rolling),
            "canary" => Ok(DeploymentStrategy::Canary),
            _ => Err(format!("unknown deployment strategy: {}", s)),
        }
    }
}

impl fmt::Display for DeploymentStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentStrategy::Default => write!(f, "default"),
            DeploymentStrategy::Rolling => write!(f, "rolling"),
            DeploymentStrategy::Canary => write!(f, "canary"),
        }
    }
}

impl Serialize for DeploymentStrategy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DeploymentStrategy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_is_default() {
        assert_eq!("".parse(), Ok(DeploymentStrategy::Default));
    }

    #[test]
    fn only_rolling_and_canary_create_deployments() {
        assert!(!DeploymentStrategy::Default.creates_deployment());
        assert!(DeploymentStrategy::Rolling.creates_deployment());
        assert!(DeploymentStrategy::Canary.creates_deployment());
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        let err = "blue-green".parse::<DeploymentStrategy>().unwrap_err();
        assert!(err.contains("blue-green"));
    }
}
