#![deny(missing_docs)]

//! Minimal blocking client for the Prometheus v1 query API
//!
//! The usual entry point is [`PrometheusClient`], constructed from an endpoint URL and a
//! timeout (or from a [`ClientConfig`]). It offers instant queries, range queries and
//! metric-name listing, each of which blocks until the whole response has been read
//! and decoded.
//!
//! Lower level, every endpoint is a request object implementing [`PromRequest`], e.g.
//! [`QueryRequest`] or [`QueryRangeRequest`]. A builder is provided for range queries.
//! Call `send_with_client` with a reqwest blocking client and the endpoint URL.
//!
//! Instant queries produce a [`QueryResponse`], whose variant follows the server's
//! `resultType`. Range queries only ever produce a [`Matrix`]. Results can be rendered
//! as text or CSV through the [`Render`] trait.
//!
//! Requests and responses are logged through `tracing` at debug and trace level.
//! Nothing is printed unless the application installs a subscriber.

mod builders;
pub use builders::QueryRangeRequestBuilder;

mod client;
pub use client::PrometheusClient;

mod config;
pub use config::ClientConfig;

mod endpoint;
use endpoint::fixed_point;

mod error;
pub use error::{Error, ErrorKind, Operation};

mod messages;
pub use messages::{Matrix, MetricTimeseries, MetricValue, QueryResponse, ResultType, Vector};

mod metric;
pub use metric::{METRIC_NAME_LABEL, Metric};

mod render;
pub use render::Render;

mod sample;
pub use sample::Sample;

mod traits;
pub use traits::PromRequest;

/// The reqwest client type requests are sent with
pub use reqwest::blocking::Client as ReqwestClient;

/// Query parameters for /api/v1/query prometheus request
#[derive(Clone, Debug)]
pub struct QueryRequest {
    /// The PromQL query string
    pub query: String,
    /// Optional evaluation timestamp in unix seconds (defaults to the server's current time)
    pub time: Option<f64>,
}

impl PromRequest for QueryRequest {
    const PATH: &str = "/api/v1/query";
    const OPERATION: Operation = Operation::Query;
    type Output = QueryResponse;

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("query", self.query.clone())];
        if let Some(time) = self.time {
            params.push(("time", fixed_point(time)));
        }
        params
    }

    fn decode(body: &[u8]) -> Result<QueryResponse, Error> {
        messages::decode_query(Self::OPERATION, body)
    }
}

/// Query parameters for /api/v1/query_range prometheus request
///
/// The evaluated interval is the `range` seconds ending at `end`, sampled every `step` seconds.
#[derive(Clone, Debug)]
pub struct QueryRangeRequest {
    /// The PromQL query string
    pub query: String,
    /// End of the range, in unix seconds
    pub end: f64,
    /// Length of the range in seconds
    pub range: u64,
    /// Resolution in seconds
    pub step: u64,
}

impl QueryRangeRequest {
    /// Get builder for query range request with given query
    pub fn builder(query: impl Into<String>) -> QueryRangeRequestBuilder {
        QueryRangeRequestBuilder::new(query.into())
    }
}

impl PromRequest for QueryRangeRequest {
    const PATH: &str = "/api/v1/query_range";
    const OPERATION: Operation = Operation::QueryRange;
    type Output = Matrix;

    fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("query", self.query.clone()),
            ("end", fixed_point(self.end)),
            ("range", self.range.to_string()),
            ("step", self.step.to_string()),
        ]
    }

    fn decode(body: &[u8]) -> Result<Matrix, Error> {
        messages::decode_matrix(Self::OPERATION, body)
    }
}

/// Request for /api/v1/metrics, listing every known metric name
#[derive(Clone, Debug, Default)]
pub struct MetricsRequest {}

impl PromRequest for MetricsRequest {
    const PATH: &str = "/api/v1/metrics";
    const OPERATION: Operation = Operation::Metrics;
    type Output = Vec<String>;

    fn params(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    fn decode(body: &[u8]) -> Result<Vec<String>, Error> {
        messages::decode_names(Self::OPERATION, body)
    }
}

/// Request for /api/v1/labels, listing label names.
///
/// Used by [`PrometheusClient::labels`] to discover which labels a selector can filter
/// on before writing a query. With no matchers the server reports every label name.
#[derive(Clone, Debug, Default)]
pub struct LabelsRequest {
    /// Series selectors restricting which series' labels are listed
    pub matches: MatchList,
}

impl PromRequest for LabelsRequest {
    const PATH: &str = "/api/v1/labels";
    const OPERATION: Operation = Operation::Labels;
    type Output = Vec<String>;

    fn params(&self) -> Vec<(&'static str, String)> {
        self.matches
            .selectors
            .iter()
            .map(|selector| ("match[]", selector.clone()))
            .collect()
    }

    fn decode(body: &[u8]) -> Result<Vec<String>, Error> {
        messages::decode_data(Self::OPERATION, body)
    }
}

/// Series selectors sent as repeated `match[]` parameters, in order
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MatchList {
    selectors: Vec<String>,
}

impl MatchList {
    /// The selectors, in the order they will be sent
    pub fn selectors(&self) -> &[String] {
        &self.selectors
    }
}

impl<S: Into<String>> FromIterator<S> for MatchList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            selectors: iter.into_iter().map(Into::into).collect(),
        }
    }
}
