//! Building request URLs from a configured endpoint

use crate::{Error, error::Operation};
use url::Url;

/// Parse and validate an endpoint string. It must be an absolute URL that can carry a path.
pub(crate) fn parse_endpoint(endpoint: &str) -> Result<Url, Error> {
    let url = Url::parse(endpoint).map_err(|err| Error::InvalidEndpoint {
        op: Operation::Construct,
        endpoint: endpoint.to_owned(),
        reason: err.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(Error::InvalidEndpoint {
            op: Operation::Construct,
            endpoint: endpoint.to_owned(),
            reason: "URL cannot carry an API path".into(),
        });
    }
    Ok(url)
}

/// Join `path` onto the endpoint and set `params` in its query string.
///
/// Trailing slashes on the endpoint path are dropped before joining, so the result
/// never contains `//` at the join. Parameters already on the endpoint are kept in
/// order, except that any key present in `params` is replaced rather than repeated.
pub(crate) fn api_url(endpoint: &Url, path: &str, params: &[(&str, String)]) -> Url {
    let mut url = endpoint.clone();
    let joined = format!("{}{path}", url.path().trim_end_matches('/'));
    url.set_path(&joined);

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .into_owned()
        .filter(|(k, _)| !params.iter().any(|(p, _)| p == k))
        .collect();

    url.set_query(None);
    if !kept.is_empty() || !params.is_empty() {
        url.query_pairs_mut()
            .extend_pairs(kept)
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
    }
    url
}

/// Fixed-point rendering used for float-valued parameters (no exponent, six decimals)
pub(crate) fn fixed_point(value: f64) -> String {
    format!("{value:.6}")
}
