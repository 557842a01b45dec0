use lambda_http::http::response::Builder;
use lambda_http::http::StatusCode;
use lambda_http::{Body, Error, Response};
use serde::Serialize;

pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred while executing the request";

pub const CORS_HEADERS: [(&str, &str); 4] = [
    ("Access-Control-Allow-Credentials", "true"),
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Headers", "Content-Type"),
    ("Access-Control-Allow-Methods", "OPTIONS,POST,GET"),
];

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
}

fn response_builder(status: &StatusCode) -> Builder {
    CORS_HEADERS.iter().fold(
        Response::builder()
            .status(status)
            .header("Content-Type", "application/json"),
        |builder, (name, value)| builder.header(*name, *value),
    )
}

pub fn json_response<T: Serialize>(status: &StatusCode, body: &T) -> Result<Response<Body>, Error> {
    let body = serde_json::to_string(body)?;
    let response = response_builder(status)
        .body(Body::from(body))
        .map_err(Box::new)?;

    Ok(response)
}

/// Builds a `{"message": ...}` response, falling back to a fixed message if the
/// description itself cannot be serialised.
pub fn error_response(status: &StatusCode, message: &str) -> Result<Response<Body>, Error> {
    let body = serde_json::to_string(&ErrorBody { message }).unwrap_or_else(|e| {
        tracing::error!("Can't serialise error message: {:?}", e);
        format!("{{\"message\":\"{}\"}}", GENERIC_ERROR_MESSAGE)
    });
    let response = response_builder(status)
        .body(Body::from(body))
        .map_err(Box::new)?;

    Ok(response)
}
