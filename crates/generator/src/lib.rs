//! Document generation for azdoc
//!
//! This crate turns an analyzed resource inventory into the two output
//! kinds: one Markdown document rendered through Tera templates, and
//! draw.io diagrams (one per virtual network plus an overview).
//!
//! # Examples
//!
//! ```no_run
//! use azdoc_analyzer::SubscriptionAnalyzer;
//! use azdoc_common::ResourceStore;
//! use azdoc_generator::{DiagramRenderer, MarkdownRenderer};
//! use std::path::Path;
//!
//! let store = ResourceStore::load(Path::new("resources.json")).expect("Load failed");
//! let report = SubscriptionAnalyzer::default().analyze(&store);
//!
//! let markdown = MarkdownRenderer::new("Production").expect("Templates failed");
//! markdown
//!     .write(Path::new("docs/SUBSCRIPTION.md"), &store, &report, None)
//!     .expect("Write failed");
//!
//! let diagrams = DiagramRenderer::new("docs/diagrams").render(&store);
//! for failure in &diagrams.failures {
//!     eprintln!("{}", failure);
//! }
//! ```

pub mod diagram;
pub mod drawio;
pub mod layout;
pub mod markdown;
pub mod styles;
mod templates;

pub use diagram::{DiagramReport, DiagramRenderer, OVERVIEW_FILE};
pub use drawio::{Cell, CellKind, Diagram, Geometry};
pub use layout::{extract_subnets, overview_diagram, vnet_diagram, Augmentation};
pub use markdown::{MarkdownRenderer, Narrative, DISPLAY_CAP};
