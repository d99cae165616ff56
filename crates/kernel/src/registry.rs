use anyhow::Context;
use std::sync::Arc;

use crate::module::{InitCtx, Module};

/// Registry owning all modules and driving their lifecycle in
/// registration order (shutdown runs in reverse).
pub struct ModuleRegistry {
    modules: Vec<Arc<dyn Module>>,
}

impl ModuleRegistry {
    /// Create a new, empty registry
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    /// Register a module with the registry
    pub fn register(&mut self, module: Arc<dyn Module>) {
        self.modules.push(module);
    }

    /// All registered modules in registration order
    pub fn modules(&self) -> &[Arc<dyn Module>] {
        &self.modules
    }

    /// Look up a module by name
    pub fn get_module(&self, name: &str) -> Option<&Arc<dyn Module>> {
        self.modules.iter().find(|module| module.name() == name)
    }

    /// Initialize all modules
    pub async fn init_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!("initializing {} modules", self.modules.len());

        for module in &self.modules {
            tracing::info!(module = module.name(), "initializing module");

            module
                .init(ctx)
                .await
                .with_context(|| format!("failed to initialize module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Start all modules
    pub async fn start_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        for module in &self.modules {
            tracing::info!(module = module.name(), "starting module");

            module
                .start(ctx)
                .await
                .with_context(|| format!("failed to start module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Stop all modules in reverse registration order
    pub async fn stop_modules(&self) -> anyhow::Result<()> {
        for module in self.modules.iter().rev() {
            tracing::info!(module = module.name(), "stopping module");

            module
                .stop()
                .await
                .with_context(|| format!("failed to stop module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Collect all migrations from all modules, tagged with the owning
    /// module name and sorted for deterministic application order.
    pub fn collect_migrations(&self) -> Vec<(String, crate::module::Migration)> {
        let mut migrations = Vec::new();

        for module in &self.modules {
            for migration in module.migrations() {
                migrations.push((module.name().to_string(), migration));
            }
        }

        migrations.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.id.cmp(b.1.id)));

        migrations
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::Migration;
    use crate::settings::Settings;

    struct TestModule {
        name: &'static str,
    }

    #[async_trait::async_trait]
    impl Module for TestModule {
        fn name(&self) -> &'static str {
            self.name
        }

        fn migrations(&self) -> Vec<Migration> {
            vec![Migration {
                id: "001_init",
                up: "CREATE TABLE test (id BIGINT);",
            }]
        }
    }

    #[test]
    fn empty_registry_has_no_modules_or_migrations() {
        let registry = ModuleRegistry::new();
        assert!(registry.modules().is_empty());
        assert!(registry.collect_migrations().is_empty());
    }

    #[test]
    fn migrations_are_tagged_with_module_name() {
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(TestModule { name: "beta" }));
        registry.register(Arc::new(TestModule { name: "alpha" }));

        let migrations = registry.collect_migrations();
        assert_eq!(migrations.len(), 2);
        // Sorted by module name, not registration order.
        assert_eq!(migrations[0].0, "alpha");
        assert_eq!(migrations[1].0, "beta");
    }

    #[tokio::test]
    async fn module_lifecycle_runs_clean() {
        let mut registry = ModuleRegistry::new();
        let settings = Settings::default();
        let ctx = InitCtx {
            settings: &settings,
        };

        registry.register(Arc::new(TestModule { name: "test" }));

        registry.init_modules(&ctx).await.unwrap();
        registry.start_modules(&ctx).await.unwrap();
        registry.stop_modules().await.unwrap();

        assert!(registry.get_module("test").is_some());
        assert!(registry.get_module("missing").is_none());
    }
}
