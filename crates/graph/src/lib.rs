//! # Inject Graph
//!
//! Dependency graph construction for annotation-driven injection.
//!
//! ## Features
//!
//! - **Generic graph engine** - string-keyed directed graph with tolerant population
//! - **Annotation model** - `module`, `provide`, `inject`, `invoke`
//! - **Graph builder** - joins providers and consumers by symbol identity
//! - **Diagnostics** - text dump and Graphviz export
//!
//! ## Architecture
//!
//! ```text
//! Entry[]
//!     │
//!     ├──> Graph Builder
//!     │      ├─ Skip non-function entries
//!     │      ├─ Reject provide+inject declarations
//!     │      ├─ Register providers (first wins)
//!     │      ├─ Accumulate consumers
//!     │      └─ Link provider → consumer (fail on missing provider)
//!     │
//!     └──> Graph<Component>
//!            ├─ Vertices: providers (by xid), consumers (by gid)
//!            └─ Roots: vertices with no incoming edges
//! ```

mod annotation;
mod builder;
mod entry;
mod error;
mod export;
mod graph;
mod identity;
mod logger;

pub use annotation::{Annotation, AnnotationKind};
pub use builder::{
    BuildOptions, BuildOutput, BuildReport, BuildWarning, Component, GraphBuilder, Strictness,
};
pub use entry::{Entry, Func, Param, RawAnnotation};
pub use error::{GraphError, Result};
pub use graph::{Graph, GraphDiagnostic, Vertex};
pub use identity::{gid, xid};
pub use logger::Logger;
