//! Response formatting.
//!
//! Handler bodies are optionally wrapped in an envelope that names the
//! handler version that served the request. Errors use `{"error": ...}`.

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::dispatch::Resolved;
use crate::http::endpoints::HandlerResponse;

/// Header naming the handler version that answered.
pub const X_HANDLER_VERSION: &str = "x-handler-version";

/// Render a resolved handler.
pub fn render(resolved: Resolved<'_, HandlerResponse>, envelope: bool) -> Response {
    let handler = resolved.handler;
    let version = resolved.version.to_string();

    let body = if envelope {
        json!({
            "data": handler.body,
            "handler": handler.name,
            "handler_version": version,
            "tier": resolved.tier,
        })
    } else {
        handler.body.clone()
    };

    let mut response = (handler.status, Json(body)).into_response();
    if let Ok(value) = HeaderValue::from_str(&version) {
        response.headers_mut().insert(X_HANDLER_VERSION, value);
    }
    response
}

/// JSON error response.
pub fn error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Tier;
    use crate::version::Version;

    #[test]
    fn test_render_sets_status_and_header() {
        let handler = HandlerResponse {
            name: "v1".into(),
            status: StatusCode::ACCEPTED,
            body: json!({"ok": true}),
        };
        let version = Version::parse_parts(Some("1.0"), None, None, None).unwrap();
        let resolved = Resolved {
            handler: &handler,
            version: &version,
            tier: Tier::Range,
        };

        let response = render(resolved, true);
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(
            response.headers()[X_HANDLER_VERSION],
            "<AppVersion: (IOS:1.0)(Android:1.0)(WEB:1.0)>"
        );
    }

    #[test]
    fn test_error_status() {
        assert_eq!(error(StatusCode::NOT_FOUND, "gone").status(), StatusCode::NOT_FOUND);
    }
}
