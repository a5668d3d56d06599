use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::model::block::{CellBlock, HeaderFooterBlock, ViewName};

fn default_columns() -> NonZeroU32 {
    NonZeroU32::MIN
}

/// An optional header, an optional cell block, an optional footer, and the
/// column count used to lay out the cells.
///
/// A section with no blocks at all is degenerate: it renders with zero
/// height and is never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    header: Option<HeaderFooterBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cells: Option<CellBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    footer: Option<HeaderFooterBlock>,
    /// Applies to the cell block only; header and footer are full-width.
    #[serde(default = "default_columns")]
    columns: NonZeroU32,
}

impl Default for Section {
    fn default() -> Self {
        Self {
            header: None,
            cells: None,
            footer: None,
            columns: default_columns(),
        }
    }
}

/// View names of a section's blocks.
///
/// Renderers may treat two sections at the same index as the same logical
/// section only when their identities are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SectionIdentity {
    pub header: Option<ViewName>,
    pub cells: Option<ViewName>,
    pub footer: Option<ViewName>,
}

impl Section {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(self, header: HeaderFooterBlock) -> Self {
        Self {
            header: Some(header),
            ..self
        }
    }

    pub fn with_cells(self, cells: CellBlock) -> Self {
        Self {
            cells: Some(cells),
            ..self
        }
    }

    pub fn with_footer(self, footer: HeaderFooterBlock) -> Self {
        Self {
            footer: Some(footer),
            ..self
        }
    }

    /// Set the column count. Zero is clamped to one.
    pub fn with_columns(self, columns: u32) -> Self {
        Self {
            columns: NonZeroU32::new(columns).unwrap_or(NonZeroU32::MIN),
            ..self
        }
    }

    pub fn header(&self) -> Option<&HeaderFooterBlock> {
        self.header.as_ref()
    }

    pub fn cells(&self) -> Option<&CellBlock> {
        self.cells.as_ref()
    }

    pub fn footer(&self) -> Option<&HeaderFooterBlock> {
        self.footer.as_ref()
    }

    pub fn columns(&self) -> u32 {
        self.columns.get()
    }

    pub fn row_count(&self) -> usize {
        self.cells.as_ref().map_or(0, CellBlock::len)
    }

    pub fn is_degenerate(&self) -> bool {
        self.header.is_none() && self.cells.is_none() && self.footer.is_none()
    }

    pub fn identity(&self) -> SectionIdentity {
        SectionIdentity {
            header: self.header.as_ref().map(|b| b.view_name().clone()),
            cells: self.cells.as_ref().map(|b| b.view_name().clone()),
            footer: self.footer.as_ref().map(|b| b.view_name().clone()),
        }
    }

    // Copy-with helpers used by the data source mutators.

    pub(crate) fn replacing_header(&self, header: Option<HeaderFooterBlock>) -> Self {
        Self {
            header,
            ..self.clone()
        }
    }

    pub(crate) fn replacing_cells(&self, cells: CellBlock) -> Self {
        Self {
            cells: Some(cells),
            ..self.clone()
        }
    }

    pub(crate) fn replacing_footer(&self, footer: Option<HeaderFooterBlock>) -> Self {
        Self {
            footer,
            ..self.clone()
        }
    }

    pub(crate) fn replacing_columns(&self, columns: NonZeroU32) -> Self {
        Self {
            columns,
            ..self.clone()
        }
    }
}
