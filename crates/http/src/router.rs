//! Router builder for the stacks HTTP server.

use axum::{
    extract::Request,
    http::{header, HeaderValue},
    routing::get,
    Router,
};
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestId, RequestId, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};

use stacks_kernel::ModuleRegistry;

/// Builder for constructing the main HTTP router
pub struct RouterBuilder {
    router: Router,
}

impl RouterBuilder {
    /// Create a new router builder
    pub fn new() -> Self {
        Self {
            router: Router::new(),
        }
    }

    /// Add a route to the router
    pub fn route(mut self, path: &str, route: axum::routing::MethodRouter) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    /// Mount a module's router under `/{module_name}`
    pub fn mount_module(mut self, module_name: &str, module_router: Router) -> Self {
        let mount_path = format!("/{}", module_name);
        self.router = self.router.nest(&mount_path, module_router);
        self
    }

    /// Add tracing middleware
    pub fn with_tracing(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        );
        self
    }

    /// Add CORS middleware
    pub fn with_cors(mut self) -> Self {
        self.router = self.router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
        self
    }

    /// Add request ID middleware
    pub fn with_request_id(mut self) -> Self {
        self.router = self
            .router
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));
        self
    }

    /// Add timeout middleware
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.router = self
            .router
            .layer(TimeoutLayer::new(Duration::from_millis(timeout_ms)));
        self
    }

    /// Stamp `Content-Type: application/json` on every response that does
    /// not already declare one. Handlers returning `Json` keep their own
    /// header; plain-text and empty responses pick this one up.
    pub fn with_json_content_type(mut self) -> Self {
        self.router = self.router.layer(SetResponseHeaderLayer::if_not_present(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        ));
        self
    }

    /// Serve the merged OpenAPI document at `/docs/openapi.json`,
    /// collecting path and schema fragments from all modules.
    pub fn with_openapi(mut self, registry: &ModuleRegistry) -> Self {
        let mut openapi_spec = serde_json::json!({
            "openapi": "3.0.0",
            "info": {
                "title": "stacks API",
                "version": "1.0.0",
                "description": "Books HTTP JSON API"
            },
            "paths": {},
            "components": {
                "schemas": {}
            }
        });

        // Shared error body schema used by every module.
        openapi_spec["components"]["schemas"]["ErrorResponse"] = serde_json::json!({
            "type": "object",
            "properties": {
                "message": { "type": "string" },
                "error": { "type": "string" }
            },
            "required": ["message", "error"]
        });

        openapi_spec["paths"]["/healthz"] = serde_json::json!({
            "get": {
                "summary": "Health check",
                "responses": {
                    "200": { "description": "OK" }
                }
            }
        });

        for module in registry.modules() {
            let Some(module_spec) = module.openapi() else {
                continue;
            };

            if let Some(paths) = module_spec.get("paths").and_then(|p| p.as_object()) {
                for (path, path_item) in paths {
                    // Module paths are relative to their mount point.
                    let suffix = if path == "/" { "" } else { path.as_str() };
                    let prefixed_path = format!("/{}{}", module.name(), suffix);
                    openapi_spec["paths"][prefixed_path] = path_item.clone();
                }
            }

            if let Some(schemas) = module_spec
                .get("components")
                .and_then(|c| c.get("schemas"))
                .and_then(|s| s.as_object())
            {
                for (schema_name, schema_def) in schemas {
                    openapi_spec["components"]["schemas"][schema_name] = schema_def.clone();
                }
            }
        }

        self.router = self.router.route(
            "/docs/openapi.json",
            get(move || async move { axum::Json(openapi_spec.clone()) }),
        );

        self
    }

    /// Build the final router
    pub fn build(self) -> Router {
        self.router
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Request ID generator producing sortable UUIDv7 ids
#[derive(Clone, Copy)]
struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let timestamp = uuid::Timestamp::now(uuid::NoContext);
        let request_id = uuid::Uuid::new_v7(timestamp)
            .to_string()
            .parse::<HeaderValue>()
            .ok()?;
        Some(RequestId::new(request_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode};
    use axum::routing::get;
    use tower::ServiceExt;

    #[tokio::test]
    async fn module_routes_are_mounted_under_module_name() {
        let module_router = Router::new().route("/", get(|| async { "module" }));

        let router = RouterBuilder::new()
            .mount_module("books", module_router)
            .build();

        let response = router
            .oneshot(
                HttpRequest::builder()
                    .uri("/books")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn json_content_type_is_injected_when_missing() {
        // A bare status response carries no Content-Type of its own.
        let router = RouterBuilder::new()
            .route("/empty", get(|| async { StatusCode::NO_CONTENT }))
            .with_json_content_type()
            .build();

        let response = router
            .oneshot(
                HttpRequest::builder()
                    .uri("/empty")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[tokio::test]
    async fn middleware_chain_builds() {
        let router = RouterBuilder::new()
            .route("/health", get(|| async { "ok" }))
            .with_json_content_type()
            .with_timeout(5000)
            .with_request_id()
            .with_cors()
            .with_tracing()
            .build();

        let response = router
            .oneshot(
                HttpRequest::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
