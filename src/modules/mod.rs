pub mod books;

use books::handlers::SharedStore;
use stacks_kernel::ModuleRegistry;

/// Register all application modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, store: SharedStore) {
    registry.register(books::create_module(store));
}
