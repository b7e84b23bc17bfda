use std::{any::Any, sync::Arc};

use axum::{
    extract::OriginalUri,
    http::{HeaderMap, Method},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::web::{log, Error, ErrorCategory, REQUEST_ID_HEADER};

/// Turns an `Error` stashed in the response extensions into the JSON error body and logs the request.
pub async fn response_mapper(
    req_method: Method,
    OriginalUri(uri): OriginalUri,
    req_headers: HeaderMap,
    resp: Response,
) -> Response {
    let req_id = req_headers
        .get(REQUEST_ID_HEADER)
        .and_then(|id| id.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let web_error = resp.extensions().get::<Arc<Error>>().cloned();

    match web_error.as_deref() {
        Some(er) if er.category() == ErrorCategory::ClientInput => {
            tracing::warn!("{:<12} - {er}", "CLIENT ERROR")
        }
        Some(er) => tracing::error!("{:<12} - {er} ({})", "SERVER ERROR", er.category().as_ref()),
        None => {}
    }

    let err_resp = web_error
        .as_deref()
        .map(|er| (er.status_code(), Json(er.client_body())).into_response());

    let status = err_resp.as_ref().map_or(resp.status(), Response::status);
    log::log_request(&req_id, &req_method, &uri, status, web_error.as_deref());

    err_resp.unwrap_or(resp)
}

/// Used by `CatchPanicLayer`: answers a panicking handler with the generic internal error body.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!("{:<12} - handler panicked: {details}", "PANIC");

    let er = Error::Internal(details);
    (er.status_code(), Json(er.client_body())).into_response()
}
