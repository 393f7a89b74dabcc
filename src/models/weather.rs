//! Weather query and reading models

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Serialize, Serializer};

use super::Location;

/// Placeholder shown for any parameter the service did not return
pub const NOT_AVAILABLE: &str = "N/A";

static MISSING: ReadingValue = ReadingValue::NotAvailable;

/// A single point-in-time weather request
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherQuery {
    pub location: Location,
    /// Target time, truncated to whole seconds
    pub timestamp: DateTime<Utc>,
}

impl WeatherQuery {
    #[must_use]
    pub fn new(location: Location, timestamp: DateTime<Utc>) -> Self {
        Self {
            location,
            timestamp: timestamp.trunc_subsecs(0),
        }
    }

    /// Timestamp as sent on the wire, e.g. `2024-06-01T12:00:00Z`
    #[must_use]
    pub fn wire_timestamp(&self) -> String {
        self.timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

/// One flattened parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ReadingValue {
    Number(f64),
    Text(String),
    NotAvailable,
}

impl Serialize for ReadingValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Text(s) => serializer.serialize_str(s),
            Self::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

impl ReadingValue {
    /// Convert a raw JSON value; `null` and non-scalars become `NotAvailable`
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::NotAvailable, Self::Number),
            serde_json::Value::String(s) => Self::Text(s.clone()),
            _ => Self::NotAvailable,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ReadingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // whole numbers keep their decimal point: 30.0, not 30
            Self::Number(n) => write!(f, "{n:?}"),
            Self::Text(s) => f.write_str(s),
            Self::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

/// Parameter identifier (e.g. `t_2m:C`) to value, for one query
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeatherReading {
    pub timestamp: Option<DateTime<Utc>>,
    pub values: BTreeMap<String, ReadingValue>,
}

impl WeatherReading {
    /// Reading where every requested parameter starts out as `NotAvailable`
    #[must_use]
    pub fn with_parameters<I, S>(parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            timestamp: None,
            values: parameters
                .into_iter()
                .map(|p| (p.into(), ReadingValue::NotAvailable))
                .collect(),
        }
    }

    pub fn insert<S: Into<String>>(&mut self, parameter: S, value: ReadingValue) {
        self.values.insert(parameter.into(), value);
    }

    /// Value for a parameter; unknown parameters read as `NotAvailable`
    #[must_use]
    pub fn get(&self, parameter: &str) -> &ReadingValue {
        self.values.get(parameter).unwrap_or(&MISSING)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
