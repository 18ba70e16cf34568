//! Trait for Prometheus API requests

use crate::{
    Error,
    endpoint::api_url,
    error::Operation,
    messages::ErrorBody,
};
use reqwest::blocking::Client;
use std::fmt::Debug;
use tracing::{debug, trace};
use url::Url;

/// Trait for types that can be sent as Prometheus API requests
pub trait PromRequest {
    /// The API path for this request type (e.g., "/api/v1/query")
    const PATH: &str;
    /// The client operation this request performs, used in error messages
    const OPERATION: Operation;
    /// The output type returned by this request
    type Output: Clone + Debug;

    /// Query parameters to set on the request URL
    fn params(&self) -> Vec<(&'static str, String)>;

    /// Decode a successful (2xx) response body
    fn decode(body: &[u8]) -> Result<Self::Output, Error>;

    /// Send the request to the given endpoint using the provided reqwest client.
    ///
    /// Blocks until the whole body has been read, or the client's timeout elapses.
    fn send_with_client(&self, client: &Client, endpoint: &Url) -> Result<Self::Output, Error> {
        let op = Self::OPERATION;
        let url = api_url(endpoint, Self::PATH, &self.params());
        debug!("Prom request: {op} {url}");

        let resp = client
            .get(url)
            .send()
            .map_err(|source| Error::Transport { op, source })?;
        let status = resp.status();
        let body = resp
            .bytes()
            .map_err(|source| Error::Transport { op, source })?;
        debug!("Prom response: {op} {status}, {} bytes", body.len());
        trace!("Prom response body: {}", String::from_utf8_lossy(&body));

        if !status.is_success() {
            let ErrorBody { detail, api_error } = ErrorBody::parse(&body);
            return Err(Error::HttpStatus {
                op,
                status,
                detail,
                api_error,
            });
        }

        Self::decode(&body)
    }
}
