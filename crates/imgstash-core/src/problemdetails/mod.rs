use std::collections::BTreeMap;

use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::{response::IntoResponse, Json};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

/// Representation of a Problem error to return to the client.
/// Follows RFC 7807 - Problem Details for HTTP APIs
#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(example = json!({
    "title": "Unsupported Media Type",
    "detail": "File uploads only support jpeg, jpg and png"
}))]
pub struct ProblemDetails {
    /// A short, human-readable summary of the problem type
    #[schema(example = "Unsupported Media Type")]
    pub title: String,
    /// A human-readable explanation specific to this occurrence of the problem
    #[schema(example = "File uploads only support jpeg, jpg and png")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Additional properties of the problem
    #[schema(additional_properties = true)]
    pub extensions: BTreeMap<String, Value>,
}

/// Problem error carrying a status code and an arbitrary JSON body.
#[derive(Debug, Clone)]
pub struct Problem {
    /// The status code of the problem.
    pub status_code: StatusCode,
    /// The actual body of the problem.
    pub body: BTreeMap<String, Value>,
}

/// Create a new `Problem` response to send to the client.
pub fn new<S>(status_code: S) -> Problem
where
    S: Into<StatusCode>,
{
    Problem {
        status_code: status_code.into(),
        body: BTreeMap::new(),
    }
}

impl Problem {
    /// Specify the "title" to use for the problem.
    pub fn with_title<S>(self, value: S) -> Self
    where
        S: Into<String>,
    {
        self.with_value("title", value.into())
    }

    /// Specify the "detail" to use for the problem.
    pub fn with_detail<S>(self, value: S) -> Self
    where
        S: Into<String>,
    {
        self.with_value("detail", value.into())
    }

    /// Specify an arbitrary value to include in the problem.
    pub fn with_value<V>(mut self, key: &str, value: V) -> Self
    where
        V: Into<Value>,
    {
        self.body.insert(key.to_owned(), value.into());

        self
    }
}

impl<S> From<S> for Problem
where
    S: Into<StatusCode>,
{
    fn from(status_code: S) -> Self {
        new(status_code.into())
    }
}

/// Result type where the error is always a `Problem`.
pub type Result<T> = std::result::Result<T, Problem>;

impl IntoResponse for Problem {
    fn into_response(self) -> axum::response::Response {
        if self.body.is_empty() {
            self.status_code.into_response()
        } else {
            let body = Json(self.body);
            let mut response = (self.status_code, body).into_response();

            response
                .headers_mut()
                .insert(CONTENT_TYPE, "application/problem+json".parse().unwrap());
            response
        }
    }
}
