use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Fixed-width encoding; lexicographic order matches chronological order.
pub const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

const STAMP_LEN: usize = 15;

/// Capture time of one census run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunStamp(NaiveDateTime);

#[derive(Debug, Error)]
#[error("invalid run stamp '{value}', expected YYYYMMDD_HHMMSS")]
pub struct StampError {
    pub value: String,
}

impl RunStamp {
    pub fn now() -> Self {
        let local = chrono::Local::now().naive_local();
        // Sub-second precision is not representable in the file name.
        Self(local.with_nanosecond(0).unwrap_or(local))
    }

    pub fn parse(value: &str) -> Result<Self, StampError> {
        let trimmed = value.trim();
        if trimmed.len() != STAMP_LEN {
            return Err(StampError {
                value: value.to_string(),
            });
        }
        NaiveDateTime::parse_from_str(trimmed, STAMP_FORMAT)
            .map(Self)
            .map_err(|_| StampError {
                value: value.to_string(),
            })
    }
}

impl From<NaiveDateTime> for RunStamp {
    fn from(value: NaiveDateTime) -> Self {
        Self(value)
    }
}

impl fmt::Display for RunStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(STAMP_FORMAT))
    }
}

impl FromStr for RunStamp {
    type Err = StampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for RunStamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RunStamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
