// ABOUTME: Memory and disk quantities expressed in megabytes.
// ABOUTME: Parses "256M", "1G", "512MB" and bare numbers from flags and manifests.

use serde::de::{self, Deserialize, Deserializer};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Megabytes(pub u64);

impl Megabytes {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl FromStr for Megabytes {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let upper = upper.strip_suffix('B').unwrap_or(&upper);

        let (num_str, multiplier) = if let Some(n) = upper.strip_suffix('T') {
            (n, 1024 * 1024)
        } else if let Some(n) = upper.strip_suffix('G') {
            (n, 1024)
        } else if let Some(n) = upper.strip_suffix('M') {
            (n, 1)
        } else {
            (upper, 1)
        };

        num_str
            .trim()
            .parse::<u64>()
            .ok()
            .and_then(|n| n.checked_mul(multiplier))
            .map(Megabytes)
            .ok_or_else(|| format!("invalid size: {}", s))
    }
}

impl fmt::Display for Megabytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}M", self.0)
    }
}

impl Serialize for Megabytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for Megabytes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Megabytes(n)),
            Raw::Text(s) => s.parse().map_err(de::Error::custom),
        }
    }
}
