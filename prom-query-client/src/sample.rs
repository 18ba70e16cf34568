//! The `[timestamp, "value"]` pair prometheus uses for every sample

use chrono::{DateTime, Utc};
use serde::{
    Deserialize, Deserializer,
    de::{self, IgnoredAny, SeqAccess, Visitor},
};
use std::fmt;

/// A single sample: a unix timestamp in (possibly fractional) seconds, and the value
/// exactly as prometheus rendered it.
///
/// Values are kept as strings because prometheus sends them that way, and they may be
/// `NaN`, `+Inf`, `-Inf` or carry more precision than an f64.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    /// Unix timestamp in seconds
    pub timestamp: f64,
    /// The value as sent by the server
    pub value: String,
}

impl Sample {
    /// Parse the value as a float. Prometheus' special values (`NaN`, `+Inf`, `-Inf`) are accepted.
    pub fn value_f64(&self) -> Option<f64> {
        self.value.parse().ok()
    }

    /// The timestamp as a UTC datetime, or None if it is out of chrono's range
    pub fn time(&self) -> Option<DateTime<Utc>> {
        let secs = self.timestamp.floor();
        let nanos = ((self.timestamp - secs) * 1e9).round() as u32;
        DateTime::from_timestamp(secs as i64, nanos.min(999_999_999))
    }
}

impl<'de> Deserialize<'de> for Sample {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(SampleVisitor)
    }
}

struct SampleVisitor;

impl<'de> Visitor<'de> for SampleVisitor {
    type Value = Sample;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a [timestamp, \"value\"] pair")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Sample, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let timestamp: f64 = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let value: String = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(1, &self))?;
        if seq.next_element::<IgnoredAny>()?.is_some() {
            return Err(de::Error::invalid_length(3, &self));
        }
        Ok(Sample { timestamp, value })
    }
}
