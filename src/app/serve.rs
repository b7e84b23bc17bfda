use std::time::Duration;

use axum::{
    body::Body,
    http::{HeaderName, Request, Response},
};
use tower::ServiceBuilder;
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{MakeSpan, OnRequest, OnResponse, TraceLayer},
};
use tracing::Span;

use crate::{
    web::{routes::routes, REQUEST_ID_HEADER},
    App,
};

/// The core async function serving this application until the listener fails.
///
/// Sets a request id on every request, traces it, and propagates the id to the response.
pub async fn serve(app: App) -> crate::Result<()> {
    let App {
        app_state,
        listener,
    } = app;
    let req_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    let app = routes(app_state).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(req_id_header.clone(), MakeRequestUuid))
            .layer(build_trace_layer())
            // innermost, so the id is on the response before the trace layer sees it
            .layer(PropagateRequestIdLayer::new(req_id_header)),
    );

    axum::serve(listener, app).await?;

    Ok(())
}

/// Trace layer: one span per request carrying the request id, and a closing line whose level
/// follows the status class (5xx error, 4xx warn, everything else info).
fn build_trace_layer() -> TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    impl MakeSpan<Body> + Clone,
    impl OnRequest<Body> + Clone,
    impl OnResponse<Body> + Clone,
> {
    TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            let req_id = req
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|id| id.to_str().ok())
                .unwrap_or_default();

            tracing::info_span!(
                "request",
                req_id,
                method = %req.method(),
                path = req.uri().path()
            )
        })
        .on_request(|req: &Request<Body>, _span: &Span| {
            tracing::debug!("{:<12} - {} {}", "REQUEST", req.method(), req.uri())
        })
        .on_response(|res: &Response<Body>, latency: Duration, _span: &Span| {
            let status = res.status();
            if status.is_server_error() {
                tracing::error!("{:<12} - {status} in {latency:?}", "RESPONSE")
            } else if status.is_client_error() {
                tracing::warn!("{:<12} - {status} in {latency:?}", "RESPONSE")
            } else {
                tracing::info!("{:<12} - {status} in {latency:?}", "RESPONSE")
            }
        })
}
