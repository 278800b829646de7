#![forbid(unsafe_code)]

//! Render Mermaid blocks embedded in a readme and patch in image fallbacks.
//!
//! GitHub renders ```` ```mermaid ```` fences inline, but many viewers (package registries,
//! IDE previews, mirrors) do not. This crate finds those fences, renders each one to an image
//! through `@mermaid-js/mermaid-cli`, and inserts `![Diagram N](docs/diagrams/...)` directly
//! above the fence.
//!
//! Output names are content-addressed (`readme-diagram-01-<fnv1a>`), so repeated runs produce
//! the same files and patching is idempotent.

pub mod config;
pub mod error;
pub mod extract;
pub mod hash;
pub mod patch;
pub mod pipeline;
pub mod plan;
pub mod render;

pub use config::{ImageFormat, Settings};
pub use error::{Error, Result};
pub use extract::{BlockExtractor, DiagramBlock};
pub use hash::content_hash;
pub use patch::{PatchAction, Patched, patch};
pub use pipeline::{DiagramReport, Outcome, RenderStatus, Report, run};
pub use plan::{PlannedDiagram, plan_diagrams};
pub use render::{MermaidCli, RenderRequest, Renderer};
