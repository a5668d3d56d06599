use std::fmt;

use thiserror::Error;

/// Which block of a section a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockSlot {
    Header,
    Cells,
    Footer,
}

impl fmt::Display for BlockSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockSlot::Header => write!(f, "header"),
            BlockSlot::Cells => write!(f, "cells"),
            BlockSlot::Footer => write!(f, "footer"),
        }
    }
}

/// Render-time problems. Collected as diagnostics; none of them aborts a bind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// No template registered under this name. The block is skipped.
    #[error("Section {section} {slot}: no template registered for view '{view_name}'")]
    UnresolvedViewName {
        section: usize,
        slot: BlockSlot,
        view_name: String,
    },

    /// A row lacks a field the template declared. The row is still built.
    #[error("Section {section} {slot} row {row}: missing field '{field}'")]
    MissingField {
        section: usize,
        slot: BlockSlot,
        row: usize,
        field: String,
    },
}
