//! Text and delimited renderings of query results
//!
//! These are convenience formats for humans and spreadsheets, not a stable wire format.

use crate::{Matrix, QueryResponse, Sample, Vector};
use std::fmt::Write;

/// Rendering shared by every result shape
pub trait Render {
    /// Human readable text
    fn to_text(&self) -> String;

    /// Delimited rows, quoted per RFC 4180, using `delimiter` between fields.
    /// The delimiter should be an ASCII character.
    fn to_csv(&self, delimiter: u8) -> String;
}

/// Write rows as CSV into a string
fn format_csv<R, F>(rows: R, delimiter: u8) -> String
where
    R: IntoIterator<Item = Vec<F>>,
    F: AsRef<[u8]>,
{
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary)
        .flexible(true)
        .from_writer(Vec::new());

    for row in rows {
        // Writes into a Vec cannot fail
        writer
            .write_record(row)
            .expect("writing csv to memory cannot fail");
    }
    let buf = writer
        .into_inner()
        .expect("flushing csv to memory cannot fail");
    String::from_utf8_lossy(&buf).into_owned()
}

/// `<value>@<timestamp>` with millisecond precision
fn sample_token(sample: &Sample) -> String {
    format!("{}@{:.3}", sample.value, sample.timestamp)
}

impl Render for Sample {
    fn to_text(&self) -> String {
        self.value.clone()
    }

    fn to_csv(&self, delimiter: u8) -> String {
        format_csv([vec![self.value.as_str()]], delimiter)
    }
}

impl Render for Vector {
    fn to_text(&self) -> String {
        let mut out = String::new();
        for mv in &self.series {
            let _ = writeln!(out, "{} {}", mv.metric, sample_token(&mv.value));
        }
        out
    }

    fn to_csv(&self, delimiter: u8) -> String {
        let rows = self.series.iter().map(|mv| {
            vec![
                mv.metric.to_string(),
                mv.value.value.clone(),
                // Display for f64 is the shortest round-trippable form, without exponent
                mv.value.timestamp.to_string(),
            ]
        });
        format_csv(rows, delimiter)
    }
}

impl Render for Matrix {
    /// Each sample token is followed by a space before the tokens are space-joined,
    /// so samples are separated by two spaces and the line ends in `" \n"`.
    fn to_text(&self) -> String {
        let mut out = String::new();
        for ts in &self.series {
            let values = ts
                .values
                .iter()
                .map(|s| format!("{} ", sample_token(s)))
                .collect::<Vec<_>>()
                .join(" ");
            let _ = writeln!(out, "{} {values}", ts.metric);
        }
        out
    }

    fn to_csv(&self, delimiter: u8) -> String {
        let rows = self.series.iter().map(|ts| {
            let values = ts
                .values
                .iter()
                .map(sample_token)
                .collect::<Vec<_>>()
                .join(" ");
            vec![ts.metric.to_string(), values]
        });
        format_csv(rows, delimiter)
    }
}

impl Render for QueryResponse {
    fn to_text(&self) -> String {
        match self {
            Self::Scalar(sample) | Self::String(sample) => sample.to_text(),
            Self::Vector(vector) => vector.to_text(),
            Self::Matrix(matrix) => matrix.to_text(),
        }
    }

    fn to_csv(&self, delimiter: u8) -> String {
        match self {
            Self::Scalar(sample) | Self::String(sample) => sample.to_csv(delimiter),
            Self::Vector(vector) => vector.to_csv(delimiter),
            Self::Matrix(matrix) => matrix.to_csv(delimiter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Metric, MetricTimeseries, MetricValue};

    fn sample(timestamp: f64, value: &str) -> Sample {
        Sample {
            timestamp,
            value: value.into(),
        }
    }

    fn metric(labels: &[(&str, &str)]) -> Metric {
        labels.iter().copied().collect()
    }

    fn parse_csv(text: &str, delimiter: u8) -> Vec<Vec<String>> {
        csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes())
            .records()
            .map(|r| r.unwrap().iter().map(str::to_owned).collect())
            .collect()
    }

    #[test]
    fn test_scalar() {
        let s = sample(1435781451.781, "1");
        assert_eq!(s.to_text(), "1");
        assert_eq!(s.to_csv(b','), "1\n");
        assert_eq!(QueryResponse::Scalar(s.clone()).to_csv(b','), "1\n");
        assert_eq!(QueryResponse::String(s).to_text(), "1");
    }

    #[test]
    fn test_vector() {
        let vector = Vector {
            series: vec![MetricValue {
                metric: metric(&[("__name__", "up"), ("job", "api")]),
                value: sample(1435781451.781, "1"),
            }],
        };
        assert_eq!(vector.to_text(), "up{job=\"api\"} 1@1435781451.781\n");
        assert_eq!(
            vector.to_csv(b','),
            "\"up{job=\"\"api\"\"}\",1,1435781451.781\n"
        );
    }

    #[test]
    fn test_vector_timestamps() {
        let vector = Vector {
            series: vec![
                MetricValue {
                    metric: metric(&[("__name__", "a")]),
                    value: sample(0.0, "NaN"),
                },
                MetricValue {
                    metric: metric(&[("__name__", "b")]),
                    value: sample(1435781451.5, "+Inf"),
                },
            ],
        };
        assert_eq!(vector.to_text(), "a NaN@0.000\nb +Inf@1435781451.500\n");
        assert_eq!(vector.to_csv(b','), "a,NaN,0\nb,+Inf,1435781451.5\n");
        assert_eq!(vector.to_csv(b'\t'), "a\tNaN\t0\nb\t+Inf\t1435781451.5\n");
    }

    #[test]
    fn test_matrix() {
        let matrix = Matrix {
            series: vec![MetricTimeseries {
                metric: metric(&[("__name__", "x")]),
                values: vec![sample(0.0, "1"), sample(1.0, "2")],
            }],
        };
        assert_eq!(matrix.to_text(), "x 1@0.000  2@1.000 \n");
        assert_eq!(matrix.to_csv(b','), "x,1@0.000 2@1.000\n");
    }

    #[test]
    fn test_empty_results() {
        assert_eq!(Vector::default().to_text(), "");
        assert_eq!(Vector::default().to_csv(b','), "");
        assert_eq!(Matrix::default().to_text(), "");
        assert_eq!(Matrix::default().to_csv(b';'), "");
    }

    const DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];
    const AWKWARD: [&str; 6] = [
        "a,b",
        "semi;colon",
        "tab\there",
        "pi|pe",
        "say \"hi\"",
        "two\nlines",
    ];

    #[test]
    fn test_csv_round_trips_awkward_values() {
        for delimiter in DELIMITERS {
            for value in AWKWARD {
                let vector = Vector {
                    series: vec![MetricValue {
                        metric: metric(&[("__name__", "m"), ("v", value)]),
                        value: sample(12.25, value),
                    }],
                };
                let rows = parse_csv(&vector.to_csv(delimiter), delimiter);
                assert_eq!(
                    rows,
                    vec![vec![
                        vector.series[0].metric.to_string(),
                        value.to_owned(),
                        "12.25".to_owned(),
                    ]],
                    "delimiter {delimiter} value {value:?}"
                );
            }
        }
    }

    #[test]
    fn test_matrix_csv_round_trips_awkward_values() {
        for delimiter in DELIMITERS {
            for value in AWKWARD {
                let matrix = Matrix {
                    series: vec![MetricTimeseries {
                        metric: metric(&[("__name__", "m"), ("v", value)]),
                        values: vec![sample(12.25, value), sample(13.0, "1")],
                    }],
                };
                let rows = parse_csv(&matrix.to_csv(delimiter), delimiter);
                assert_eq!(
                    rows,
                    vec![vec![
                        matrix.series[0].metric.to_string(),
                        format!("{value}@12.250 1@13.000"),
                    ]],
                    "delimiter {delimiter} value {value:?}"
                );
            }
        }
    }

    #[test]
    fn test_scalar_csv_round_trips_awkward_values() {
        for delimiter in DELIMITERS {
            for value in AWKWARD {
                let scalar = sample(12.25, value);
                let rows = parse_csv(&scalar.to_csv(delimiter), delimiter);
                assert_eq!(
                    rows,
                    vec![vec![value.to_owned()]],
                    "delimiter {delimiter} value {value:?}"
                );
                let csv = scalar.to_csv(delimiter);
                assert_eq!(QueryResponse::String(scalar).to_csv(delimiter), csv);
            }
        }
    }
}
