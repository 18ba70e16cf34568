//! Metric label sets, as attached to each series in a vector or matrix result

use serde::{
    Deserialize, Deserializer,
    de::{MapAccess, Visitor},
};
use std::fmt::{self, Display, Write};

/// The label holding the metric name
pub const METRIC_NAME_LABEL: &str = "__name__";

/// The labels identifying a series.
///
/// Labels are kept in the order the server sent them; nothing is sorted or deduplicated.
/// The `Display` form is the canonical `name{label="value",...}` string.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metric(Vec<(String, String)>);

impl Metric {
    /// The value of the `__name__` label, if present
    pub fn name(&self) -> Option<&str> {
        self.get(METRIC_NAME_LABEL)
    }

    /// Look up a label value by name
    pub fn get(&self, label: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == label)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate the labels in wire order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of labels, including `__name__`
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the metric carries no labels at all
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Metric
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = (K, V)>,
    {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name();
        let mut labels: Vec<&(String, String)> = self
            .0
            .iter()
            .filter(|(k, _)| k != METRIC_NAME_LABEL)
            .collect();

        if let Some(name) = name {
            f.write_str(name)?;
            if labels.is_empty() {
                return Ok(());
            }
        }

        labels.sort_by(|a, b| a.0.cmp(&b.0));
        f.write_char('{')?;
        for (idx, (k, v)) in labels.into_iter().enumerate() {
            if idx > 0 {
                f.write_char(',')?;
            }
            write!(f, "{k}=\"")?;
            write_escaped(f, v)?;
            f.write_char('"')?;
        }
        f.write_char('}')
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    for c in value.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '"' => f.write_str("\\\"")?,
            '\n' => f.write_str("\\n")?,
            c => f.write_char(c)?,
        }
    }
    Ok(())
}

impl<'de> Deserialize<'de> for Metric {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MetricVisitor;

        impl<'de> Visitor<'de> for MetricVisitor {
            type Value = Metric;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of label names to label values")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Metric, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut labels = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, String>()? {
                    labels.push(entry);
                }
                Ok(Metric(labels))
            }
        }

        deserializer.deserialize_map(MetricVisitor)
    }
}
