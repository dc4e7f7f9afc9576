//! Middleware that gives every request its own tagged context.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use ctxlog::{log_tags, Context};
use tracing::Instrument;

use crate::server::AppState;

/// Derive the request's context from the base context and run the rest of
/// the stack inside it.
///
/// The identifier comes from the configured header when the caller sent a
/// non-empty one, otherwise it is generated. The effective identifier is
/// echoed back in the same header.
pub async fn tag_request(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let key = state.config.tags.key.as_str();

    let incoming = request
        .headers()
        .get(&state.id_header)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_owned);

    let ctx = match incoming {
        Some(id) => ctxlog::with_log_tag_with_value(&state.base_ctx, key, id),
        None => ctxlog::with_log_tag(&state.base_ctx, key),
    };
    let ctx = ctxlog::add_tags_to_context(
        &ctx,
        log_tags! {
            "method" => request.method().as_str(),
            "path" => request.uri().path(),
        },
    );

    let request_id = request_id(&ctx, key);
    let span = ctxlog_tracing::tagged_span!(&ctx, "request");

    let mut response = ctx
        .scope(
            async move {
                tracing::debug!("Request started");
                let response = next.run(request).await;
                tracing::info!(status = response.status().as_u16(), "Request finished");
                response
            }
            .instrument(span),
        )
        .await;

    match HeaderValue::from_str(&request_id) {
        Ok(value) => {
            response.headers_mut().insert(state.id_header.clone(), value);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Request identifier is not a valid header value");
        }
    }

    response
}

/// The identifier actually stored under `key`, which may predate this
/// request if a static tag claimed the key first.
fn request_id(ctx: &Context, key: &str) -> String {
    ctxlog::tags_from_context(ctx)
        .and_then(|tags| tags.get(key).map(display_value))
        .unwrap_or_default()
}

fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_id_reads_string_tag() {
        let ctx = ctxlog::with_log_tag_with_value(&Context::background(), "req_id", "abc");
        assert_eq!(request_id(&ctx, "req_id"), "abc");
    }

    #[test]
    fn request_id_missing_is_empty() {
        assert_eq!(request_id(&Context::background(), "req_id"), "");
    }

    #[test]
    fn request_id_renders_non_string_tag() {
        let ctx = ctxlog::add_tags_to_context(&Context::background(), log_tags! { "req_id" => 42 });
        assert_eq!(request_id(&ctx, "req_id"), "42");
    }
}
