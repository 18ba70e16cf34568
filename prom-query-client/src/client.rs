//! The blocking client handle

use crate::{
    ClientConfig, Error, LabelsRequest, Matrix, MetricsRequest, PromRequest, QueryRangeRequest,
    QueryRequest, QueryResponse, ReqwestClient, endpoint::parse_endpoint, error::Operation,
};
use std::time::Duration;
use tracing::info;
use url::Url;

/// Client for the Prometheus HTTP query API.
///
/// Holds only the endpoint and a pooled reqwest client, so it can be shared freely
/// between threads. Each call blocks until its response is fully read and decoded.
#[derive(Clone, Debug)]
pub struct PrometheusClient {
    endpoint: String,
    url: Url,
    reqwest_client: ReqwestClient,
}

impl PrometheusClient {
    /// Create a client for the API rooted at `endpoint`.
    ///
    /// `timeout` bounds connecting, and separately the whole request from connect until
    /// the body has been read.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, Error> {
        let endpoint = endpoint.into();
        let url = parse_endpoint(&endpoint)?;
        let reqwest_client = ReqwestClient::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|source| Error::Transport {
                op: Operation::Construct,
                source,
            })?;

        info!("Prometheus client for {endpoint}, timeout {timeout:?}");
        Ok(Self {
            endpoint,
            url,
            reqwest_client,
        })
    }

    /// Create a client from parsed configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self, Error> {
        Self::new(config.prometheus_host.clone(), config.prometheus_timeout)
    }

    /// The endpoint, exactly as it was given
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send any API request through this client
    pub fn send<R: PromRequest>(&self, request: &R) -> Result<R::Output, Error> {
        request.send_with_client(&self.reqwest_client, &self.url)
    }

    /// Evaluate an instant query at the server's current time
    pub fn query(&self, expr: &str) -> Result<QueryResponse, Error> {
        self.send(&QueryRequest {
            query: expr.to_owned(),
            time: None,
        })
    }

    /// Evaluate a range query over the `range_secs` seconds ending at `end` (unix seconds),
    /// at a resolution of `step` seconds.
    pub fn query_range(
        &self,
        expr: &str,
        end: f64,
        range_secs: u64,
        step: u64,
    ) -> Result<Matrix, Error> {
        self.send(&QueryRangeRequest {
            query: expr.to_owned(),
            end,
            range: range_secs,
            step,
        })
    }

    /// List all metric names known to the server, in server order
    pub fn metrics(&self) -> Result<Vec<String>, Error> {
        self.send(&MetricsRequest {})
    }

    /// List label names, optionally restricted to series matching the given selectors
    pub fn labels(
        &self,
        matches: impl IntoIterator<Item: AsRef<str>>,
    ) -> Result<Vec<String>, Error> {
        self.send(&LabelsRequest {
            matches: matches.into_iter().map(|s| s.as_ref().to_owned()).collect(),
        })
    }
}
