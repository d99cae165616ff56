//! HTTP server facade for stacks: Axum router assembly, uniform JSON
//! responses, and error mapping.

use anyhow::Context;
use axum::{routing::get, Router};

use stacks_kernel::ModuleRegistry;

pub mod error;
pub mod router;

use router::RouterBuilder;

/// Start the HTTP server with the given module registry
pub async fn start_server(
    registry: &ModuleRegistry,
    settings: &stacks_kernel::settings::Settings,
) -> anyhow::Result<()> {
    let app = build_router(registry, settings);

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", settings.server.host, settings.server.port))
            .await
            .context("failed to bind to address")?;

    tracing::info!(
        "HTTP server listening on http://{}:{}",
        settings.server.host,
        settings.server.port
    );

    axum::serve(listener, app)
        .await
        .context("HTTP server failed")?;

    Ok(())
}

/// Build the main HTTP router with all module routes mounted.
pub fn build_router(
    registry: &ModuleRegistry,
    settings: &stacks_kernel::settings::Settings,
) -> Router {
    let mut router_builder = RouterBuilder::new().route("/healthz", get(health_check));

    for module in registry.modules() {
        tracing::info!(
            module = module.name(),
            "mounting module routes under /{}",
            module.name()
        );
        router_builder = router_builder.mount_module(module.name(), module.routes());
    }

    // Layers wrap the routes registered above, so they come last.
    router_builder
        .with_openapi(registry)
        .with_json_content_type()
        .with_timeout(settings.server.request_timeout_ms)
        .with_request_id()
        .with_cors()
        .with_tracing()
        .build()
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "ok"
}
