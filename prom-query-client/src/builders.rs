use super::QueryRangeRequest;
use crate::{Error, error::Operation};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Builder for [`QueryRangeRequest`]. A range is required; the step defaults to
/// `range / count`, rounded down to whole seconds and never below one.
pub struct QueryRangeRequestBuilder {
    query: String,
    end: Option<DateTime<Utc>>,
    range: Option<Duration>,
    step: Option<Duration>,
    count: u64,
}

impl QueryRangeRequestBuilder {
    /// Start building a range query for `query`
    pub fn new(query: String) -> Self {
        Self {
            query,
            end: None,
            range: None,
            step: None,
            count: 256,
        }
    }

    /// Evaluate the range ending at `end`. Defaults to the time `build` is called.
    pub fn end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    /// Evaluate the range ending now
    pub fn ending_now(self) -> Self {
        self.end(Utc::now())
    }

    /// Length of the evaluated range
    pub fn range(mut self, range: Duration) -> Self {
        self.range = Some(range);
        self
    }

    /// Resolution of the evaluated range
    pub fn step(mut self, step: Duration) -> Self {
        self.step = Some(step);
        self
    }

    /// Target number of points per series, used when no step is given
    pub fn count(mut self, count: u64) -> Self {
        self.count = count;
        self
    }

    /// Resolve defaults into a request
    pub fn build(self) -> Result<QueryRangeRequest, Error> {
        let range = self.range.ok_or_else(|| Error::InvalidRequest {
            op: Operation::QueryRange,
            reason: "range query built without a range".into(),
        })?;
        let end = self.end.unwrap_or_else(Utc::now);
        let range_secs = range.as_secs();

        let step = match self.step {
            Some(step) => step.as_secs(),
            None => range_secs / self.count.max(1),
        };

        Ok(QueryRangeRequest {
            query: self.query,
            end: end.timestamp_millis() as f64 / 1000.0,
            range: range_secs,
            step: step.max(1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_explicit_step() {
        let end = DateTime::from_timestamp(1435781451, 781_000_000).unwrap();
        let req = QueryRangeRequest::builder("up")
            .end(end)
            .range(Duration::from_secs(3600))
            .step(Duration::from_secs(15))
            .build()
            .unwrap();
        assert_eq!(req.query, "up");
        assert_eq!(req.end, 1435781451.781);
        assert_eq!(req.range, 3600);
        assert_eq!(req.step, 15);
    }

    #[test]
    fn test_derived_step() {
        let req = QueryRangeRequest::builder("up")
            .ending_now()
            .range(Duration::from_secs(3600))
            .count(60)
            .build()
            .unwrap();
        assert_eq!(req.step, 60);

        // Never below one second
        let req = QueryRangeRequest::builder("up")
            .range(Duration::from_secs(10))
            .build()
            .unwrap();
        assert_eq!(req.step, 1);
    }

    #[test]
    fn test_missing_range() {
        let err = QueryRangeRequest::builder("up").build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
