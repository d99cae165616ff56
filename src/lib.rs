//! stacks application library: the books catalog modules and the bootstrap
//! routine wiring settings, store, registry, and HTTP server together.

pub mod modules;

use std::sync::Arc;

use stacks_kernel::settings::{Settings, StoreBackend};
use stacks_kernel::{InitCtx, ModuleRegistry};

use modules::books::handlers::SharedStore;
use modules::books::store::{DbStore, MemoryStore};

/// Run the application to completion.
///
/// Selects the store backend, registers modules, applies migrations, and
/// serves HTTP. Every failure is returned to the caller, which decides
/// whether to exit the process.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let mut registry = ModuleRegistry::new();

    let (store, conn) = match settings.database.backend {
        StoreBackend::Memory => {
            tracing::info!("using in-memory book store");
            (Arc::new(MemoryStore::new()) as SharedStore, None)
        }
        StoreBackend::Postgres => {
            let conn = stacks_store::connect(&settings.database).await?;
            (Arc::new(DbStore::new(conn.clone())) as SharedStore, Some(conn))
        }
    };

    modules::register_all(&mut registry, store);

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_modules(&ctx).await?;

    // Migrations only apply to the relational backend.
    if let Some(conn) = &conn {
        stacks_store::migrate(conn, &registry.collect_migrations()).await?;
    }

    registry.start_modules(&ctx).await?;

    stacks_http::start_server(&registry, &settings).await?;

    registry.stop_modules().await
}
