//! Message types for Prometheus API responses
//!
//! Every query endpoint wraps its payload in the same envelope:
//!
//! {
//!   status: "success"
//!   data: {
//!     resultType: "matrix",
//!     result: [
//!       {
//!         metric: { __name__: "tick_time", instance: "x.y.z.w", job: "ec2", .. },
//!         values: [
//!            [ 1762534433.802, "1.8974293514080933" ],
//!            [ 1762534447.802, "2.029724353457351" ],
//!            ..
//!         ]
//!       }
//!     ]
//!   }
//! }
//!
//! or, on failure, `{ status: "error", errorType: "bad_data", error: "..." }`.
//!
//! Decoding reads the envelope once, keeping `data` as raw JSON. Only after `status`
//! and `resultType` have been checked is the `result` subtree decoded into the
//! shape the tag selects.
//!
//! For more detail see:
//! https://prometheus.io/docs/prometheus/latest/querying/api/

use crate::{Error, Metric, Sample, error::Operation};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::value::RawValue;
use std::{
    fmt::{self, Display},
    str::FromStr,
};
use tracing::warn;

/// The `resultType` discriminator of a query response
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResultType {
    /// A single numeric sample
    Scalar,
    /// A single string sample
    String,
    /// One sample per series
    Vector,
    /// A run of samples per series
    Matrix,
}

impl ResultType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::String => "string",
            Self::Vector => "vector",
            Self::Matrix => "matrix",
        }
    }
}

impl Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResultType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scalar" => Ok(Self::Scalar),
            "string" => Ok(Self::String),
            "vector" => Ok(Self::Vector),
            "matrix" => Ok(Self::Matrix),
            other => Err(format!("invalid response type {other}")),
        }
    }
}

/// A single series from an instant query
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct MetricValue {
    /// The series labels, as received
    pub metric: Metric,
    /// The sample at evaluation time
    pub value: Sample,
}

/// A series from a range query
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct MetricTimeseries {
    /// The series labels, as received
    pub metric: Metric,
    /// Samples in chronological order
    pub values: Vec<Sample>,
}

/// An instant vector: one sample per series, in server order
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Vector {
    /// The series
    pub series: Vec<MetricValue>,
}

/// A range matrix: a run of samples per series, in server order
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Matrix {
    /// The series
    pub series: Vec<MetricTimeseries>,
}

/// The decoded result of an instant query
#[derive(Clone, Debug, PartialEq)]
pub enum QueryResponse {
    /// `resultType: scalar`
    Scalar(Sample),
    /// `resultType: string`, carried in the same `[t, "v"]` shape as a scalar
    String(Sample),
    /// `resultType: vector`
    Vector(Vector),
    /// `resultType: matrix`
    Matrix(Matrix),
}

impl QueryResponse {
    /// The result type this response was decoded from
    pub fn result_type(&self) -> ResultType {
        match self {
            Self::Scalar(_) => ResultType::Scalar,
            Self::String(_) => ResultType::String,
            Self::Vector(_) => ResultType::Vector,
            Self::Matrix(_) => ResultType::Matrix,
        }
    }

    /// Convert to a scalar or string sample, returning error for vectors and matrices
    pub fn into_sample(self) -> Result<Sample, Error> {
        match self {
            Self::Scalar(sample) | Self::String(sample) => Ok(sample),
            other => Err(other.unexpected("scalar")),
        }
    }

    /// Convert to vector result, returning error for any other result type
    pub fn into_vector(self) -> Result<Vector, Error> {
        match self {
            Self::Vector(vector) => Ok(vector),
            other => Err(other.unexpected("vector")),
        }
    }

    /// Convert to matrix result, returning error for any other result type
    pub fn into_matrix(self) -> Result<Matrix, Error> {
        match self {
            Self::Matrix(matrix) => Ok(matrix),
            other => Err(other.unexpected("matrix")),
        }
    }

    fn unexpected(&self, wanted: &str) -> Error {
        Error::decode(
            Operation::Query,
            format!("expected {wanted} result, got {}", self.result_type()),
        )
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) enum Status {
    Success,
    Error,
}

/// The outer envelope. `data` stays raw until the status has been checked.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PromResponse {
    pub status: Status,
    #[serde(default)]
    pub data: Option<Box<RawValue>>,
    #[serde(default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl PromResponse {
    pub fn parse(op: Operation, body: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(body).map_err(|err| Error::from_json(op, None, body, err))
    }

    /// Resolve the envelope into its raw `data`, or the API error it carries
    pub fn into_result(self, op: Operation) -> Result<Box<RawValue>, Error> {
        for warning in self.warnings {
            warn!("Prometheus API response: {warning}");
        }

        match self.status {
            Status::Success => self
                .data
                .ok_or_else(|| Error::decode(op, "missing data on success response")),
            Status::Error => Err(Error::Api {
                op,
                error_type: self.error_type.unwrap_or_default(),
                message: self.error.unwrap_or_default(),
            }),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultData<'a> {
    result_type: String,
    #[serde(borrow)]
    result: &'a RawValue,
}

impl<'a> ResultData<'a> {
    fn parse(op: Operation, data: &'a RawValue) -> Result<(ResultType, &'a RawValue), Error> {
        let input = data.get();
        let data: ResultData<'a> = serde_json::from_str(input)
            .map_err(|err| Error::from_json(op, Some("data"), input.as_bytes(), err))?;
        let result_type = data
            .result_type
            .parse::<ResultType>()
            .map_err(|reason| Error::decode(op, reason))?;
        Ok((result_type, data.result))
    }
}

/// Decode a subtree of the envelope. `field` names it in error messages.
fn decode_result<T: DeserializeOwned>(
    op: Operation,
    field: &str,
    result: &RawValue,
) -> Result<T, Error> {
    let input = result.get();
    serde_json::from_str(input)
        .map_err(|err| Error::from_json(op, Some(field), input.as_bytes(), err))
}

const RESULT: &str = "data.result";

/// Decode the body of an instant query
pub(crate) fn decode_query(op: Operation, body: &[u8]) -> Result<QueryResponse, Error> {
    let data = PromResponse::parse(op, body)?.into_result(op)?;
    let (result_type, result) = ResultData::parse(op, &data)?;

    Ok(match result_type {
        ResultType::Scalar => QueryResponse::Scalar(decode_result(op, RESULT, result)?),
        ResultType::String => QueryResponse::String(decode_result(op, RESULT, result)?),
        ResultType::Vector => QueryResponse::Vector(decode_result(op, RESULT, result)?),
        ResultType::Matrix => QueryResponse::Matrix(decode_result(op, RESULT, result)?),
    })
}

/// Decode the body of a range query. Anything but a matrix breaks the server contract.
pub(crate) fn decode_matrix(op: Operation, body: &[u8]) -> Result<Matrix, Error> {
    let data = PromResponse::parse(op, body)?.into_result(op)?;
    match ResultData::parse(op, &data)? {
        (ResultType::Matrix, result) => decode_result(op, RESULT, result),
        (other, _) => Err(Error::decode(op, format!("invalid response type {other}"))),
    }
}

/// Decode an enveloped payload that carries no `resultType`, e.g. /api/v1/labels
pub(crate) fn decode_data<T: DeserializeOwned>(op: Operation, body: &[u8]) -> Result<T, Error> {
    let data = PromResponse::parse(op, body)?.into_result(op)?;
    decode_result(op, "data", &data)
}

/// Decode the bare string array returned by /api/v1/metrics
pub(crate) fn decode_names(op: Operation, body: &[u8]) -> Result<Vec<String>, Error> {
    serde_json::from_slice(body).map_err(|err| Error::from_json(op, None, body, err))
}

/// What could be read out of a non-2xx body
#[derive(Debug, PartialEq)]
pub(crate) struct ErrorBody {
    /// Short summary for the error message
    pub detail: String,
    /// `errorType` and `error`, if the body was an error envelope
    pub api_error: Option<(String, String)>,
}

impl ErrorBody {
    const MAX_DETAIL: usize = 256;

    /// Take the error envelope if the body is one, else its leading text
    pub fn parse(body: &[u8]) -> Self {
        if let Ok(resp) = serde_json::from_slice::<PromResponse>(body)
            && resp.status == Status::Error
        {
            let error_type = resp.error_type.unwrap_or_default();
            let message = resp.error.unwrap_or_default();
            return Self {
                detail: format!("{error_type}: {message}"),
                api_error: Some((error_type, message)),
            };
        }

        let text = String::from_utf8_lossy(body);
        let text = text.trim();
        let detail = match text.char_indices().nth(Self::MAX_DETAIL) {
            Some((idx, _)) => format!("{}...", &text[..idx]),
            None => text.to_owned(),
        };
        Self {
            detail,
            api_error: None,
        }
    }
}
