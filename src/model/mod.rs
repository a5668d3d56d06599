//! Sectioned collection data model.
//!
//! ```text
//! CollectionDataSource
//!   └── Section*            (display order)
//!         ├── header?       HeaderFooterBlock { view_name, row }
//!         ├── cells?        CellBlock { view_name, rows* }
//!         ├── footer?       HeaderFooterBlock { view_name, row }
//!         └── columns       ≥ 1, cells only
//! ```

mod block;
mod data_source;
mod error;
mod intent;
mod row;
mod section;

pub use block::{CellBlock, HeaderFooterBlock, ViewName};
pub use data_source::CollectionDataSource;
pub use error::CollectionError;
pub use intent::{CollectionIntent, CollectionReducer};
pub use row::Row;
pub use section::{Section, SectionIdentity};
