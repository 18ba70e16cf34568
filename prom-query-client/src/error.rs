//! Error types for prom-query-client

use displaydoc::Display;
use reqwest::StatusCode;

/// The client operation an error was raised from
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Operation {
    /// construct
    Construct,
    /// query
    Query,
    /// query_range
    QueryRange,
    /// metrics
    Metrics,
    /// labels
    Labels,
}

/// Coarse classification of an [`Error`]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ErrorKind {
    /// configuration error
    Config,
    /// transport error
    Transport,
    /// protocol error
    Protocol,
    /// decode error
    Decode,
    /// API error
    Api,
}

/// Errors that can occur when making Prometheus API requests
#[derive(Debug, Display)]
pub enum Error {
    /// {op}: invalid endpoint {endpoint}: {reason}
    InvalidEndpoint {
        /// Operation that was attempted
        op: Operation,
        /// The endpoint string as given
        endpoint: String,
        /// Why it was rejected
        reason: String,
    },
    /// {op}: invalid request: {reason}
    InvalidRequest {
        /// Operation that was attempted
        op: Operation,
        /// What is missing or inconsistent
        reason: String,
    },
    /// {op}: transport error: {source}
    Transport {
        /// Operation that was attempted
        op: Operation,
        /// Underlying reqwest failure (connect, read or timeout)
        source: reqwest::Error,
    },
    /// {op}: unexpected HTTP status {status}: {detail}
    HttpStatus {
        /// Operation that was attempted
        op: Operation,
        /// The non-2xx status returned by the server
        status: StatusCode,
        /// Server error envelope summary, or the start of the body
        detail: String,
        /// The envelope's `errorType` and `error`, when the body was an error envelope
        api_error: Option<(String, String)>,
    },
    /// {op}: response is not valid JSON: {source}
    InvalidJson {
        /// Operation that was attempted
        op: Operation,
        /// Parser failure
        source: serde_json::Error,
    },
    /// {op}: {reason}
    Decode {
        /// Operation that was attempted
        op: Operation,
        /// What was structurally wrong with the response
        reason: String,
    },
    /// {op}: API error {error_type}: {message}
    Api {
        /// Operation that was attempted
        op: Operation,
        /// The envelope's `errorType`
        error_type: String,
        /// The envelope's `error`
        message: String,
    },
}

impl Error {
    /// The kind of failure, independent of which variant carries it
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidEndpoint { .. } | Self::InvalidRequest { .. } => ErrorKind::Config,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::HttpStatus { .. } | Self::InvalidJson { .. } => ErrorKind::Protocol,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Api { .. } => ErrorKind::Api,
        }
    }

    /// The operation this error was raised from
    pub fn operation(&self) -> Operation {
        match self {
            Self::InvalidEndpoint { op, .. }
            | Self::InvalidRequest { op, .. }
            | Self::Transport { op, .. }
            | Self::HttpStatus { op, .. }
            | Self::InvalidJson { op, .. }
            | Self::Decode { op, .. }
            | Self::Api { op, .. } => *op,
        }
    }

    /// True if the request deadline elapsed before the response was read
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport { source, .. } if source.is_timeout())
    }

    /// The server's `errorType` and `error` message, verbatim.
    ///
    /// Present for [`Error::Api`], and for [`Error::HttpStatus`] when the non-2xx body was
    /// an error envelope, which is how prometheus reports most failed queries.
    pub fn api_error(&self) -> Option<(&str, &str)> {
        match self {
            Self::Api {
                error_type,
                message,
                ..
            }
            | Self::HttpStatus {
                api_error: Some((error_type, message)),
                ..
            } => Some((error_type.as_str(), message.as_str())),
            _ => None,
        }
    }

    pub(crate) fn decode(op: Operation, reason: impl Into<String>) -> Self {
        Self::Decode {
            op,
            reason: reason.into(),
        }
    }

    /// Classify a serde_json failure on `input`: a body that is not JSON at all is a
    /// protocol error, JSON of the wrong shape is a decode error.
    ///
    /// `field` names the subtree `input` was cut from. Positions serde_json reports are
    /// relative to `input`, so they are only kept for whole bodies.
    pub(crate) fn from_json(
        op: Operation,
        field: Option<&str>,
        input: &[u8],
        err: serde_json::Error,
    ) -> Self {
        use serde::de::IgnoredAny;
        use serde_json::error::Category;

        let well_formed = match err.classify() {
            Category::Data => true,
            // Numbers like 1e400 are valid JSON but overflow f64, which serde_json
            // reports as a syntax error. Skipping the value only scans it.
            Category::Syntax => serde_json::from_slice::<IgnoredAny>(input).is_ok(),
            Category::Eof | Category::Io => false,
        };
        if !well_formed {
            return Self::InvalidJson { op, source: err };
        }

        match field {
            None => Self::decode(op, err.to_string()),
            Some(field) => Self::decode(op, format!("{field}: {}", without_position(&err))),
        }
    }
}

fn without_position(err: &serde_json::Error) -> String {
    let full = err.to_string();
    let position = format!(" at line {} column {}", err.line(), err.column());
    match full.strip_suffix(&position) {
        Some(message) => message.to_owned(),
        None => full,
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport { source, .. } => Some(source),
            Self::InvalidJson { source, .. } => Some(source),
            _ => None,
        }
    }
}
