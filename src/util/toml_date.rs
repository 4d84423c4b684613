use std::str::FromStr;

use chrono::{NaiveDate, ParseError};
use serde::Deserialize;

/// A bare TOML date (`2024-04-22`), which `toml` hands out as a `Datetime`.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct TomlDate(pub NaiveDate);

impl<'de> Deserialize<'de> for TomlDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
    {
        use serde::de::Error;
        let value = toml::value::Datetime::deserialize(deserializer)?;
        if value.time.is_some() || value.offset.is_some() {
            return Err(Error::custom(format!("expected a date without time, got {}", value)));
        }
        TomlDate::from_str(&value.to_string()).map_err(Error::custom)
    }
}

impl FromStr for TomlDate {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let naive = NaiveDate::from_str(s)?;
        Ok(Self(naive))
    }
}

impl From<TomlDate> for NaiveDate {
    fn from(value: TomlDate) -> Self {
        value.0
    }
}
