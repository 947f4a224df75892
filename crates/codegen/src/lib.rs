//! # Inject Codegen
//!
//! Turns a dependency graph into wiring modules.
//!
//! ## Pipeline
//!
//! ```text
//! Graph<Component>
//!     │
//!     ├──> Roots (vertices with no incoming edges)
//!     │
//!     ├──> Per vertex (depth first, once per path)
//!     │      ├─ Aliased, deduplicated imports of incoming dependencies
//!     │      ├─ Template rendering (tera)
//!     │      ├─ Formatting
//!     │      └─ gen/<package path>/<function>_module.go
//!     │
//!     └──> GenerationSummary (writes + per-root failures)
//! ```

mod alias;
mod config;
mod error;
mod format;
mod generator;
mod template;

pub use alias::alias_for;
pub use config::GenerateConfig;
pub use error::{CodegenError, Result};
pub use format::{CommandFormatter, PlainFormatter, SourceFormatter};
pub use generator::{GenerationSummary, Generator, RenderedModule, RootFailure};
pub use template::{ImportData, ModuleData, ModuleRef, ModuleTemplate, MODULE_TEMPLATE};
