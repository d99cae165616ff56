//! Core traits, settings, and module registry for stacks.

pub mod module;
pub mod registry;
pub mod settings;

pub use module::{InitCtx, Migration, Module};
pub use registry::ModuleRegistry;
