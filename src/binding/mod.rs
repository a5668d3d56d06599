//! Renderer binding surface: view names resolved to view factories.

mod error;
mod registry;

pub use error::{BindError, BlockSlot};
pub use registry::{BoundCollection, BoundSection, TemplateRegistry};
