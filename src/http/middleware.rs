use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse},
    http::{header, Method},
    middleware::DefaultHeaders,
    web, Error, HttpResponse,
};
use std::future::Future;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::ServerConfig;
use super::state::AppState;

/// Log each request inside its own span and count it by route pattern
pub fn observe<S, B>(
    req: ServiceRequest,
    srv: &S,
) -> impl Future<Output = Result<ServiceResponse<B>, Error>>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
{
    let method = req.method().to_string();
    let route = req.match_pattern().unwrap_or_else(|| "unmatched".to_string());
    let metrics = req.app_data::<web::Data<AppState>>().map(|state| state.metrics.clone());
    let span = tracing::info_span!(
        "http_request",
        request_id = %Uuid::new_v4(),
        method = %method,
        route = %route,
    );

    let started = Instant::now();
    let fut = srv.call(req);

    async move {
        let response = fut.await?;
        let status = response.status().as_u16();
        let elapsed = started.elapsed();

        if response.status().is_server_error() {
            tracing::error!(status = status, elapsed_ms = elapsed.as_millis() as u64, "Request failed");
        } else {
            tracing::info!(status = status, elapsed_ms = elapsed.as_millis() as u64, "Request completed");
        }

        if let Some(metrics) = metrics {
            metrics.record_http_request(&method, &route, status, elapsed.as_secs_f64());
        }

        Ok(response)
    }
    .instrument(span)
}

/// CORS response headers for the storefront origin
pub fn cors_headers(config: &ServerConfig) -> DefaultHeaders {
    DefaultHeaders::new()
        .add((header::ACCESS_CONTROL_ALLOW_ORIGIN, config.cors_origin.clone()))
        .add((header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, PUT, DELETE, OPTIONS"))
        .add((header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type, Authorization"))
        .add((header::ACCESS_CONTROL_MAX_AGE, "86400"))
}

/// Answers CORS preflight requests
pub async fn preflight(method: Method) -> HttpResponse {
    if method == Method::OPTIONS {
        HttpResponse::NoContent().finish()
    } else {
        HttpResponse::NotFound().json(serde_json::json!({ "message": "Not found" }))
    }
}
