//! Application layer: importing, exporting and error context
//!
//! This layer orchestrates domain logic and owns the file boundary.

pub mod error;
pub mod error_ext;
pub mod exporter;
pub mod importer;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use exporter::Exporter;
pub use importer::{scalar_text, DocumentTree, ImportedTree, Importer};
