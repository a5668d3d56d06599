use thiserror::Error;

/// Errors returned by data source mutators.
///
/// All of these are synchronous and local to the call that produced them.
/// The receiver is never modified when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    #[error("Section index {index} out of range (section count: {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// `append_cells` needs an existing cell block to know the bound view name.
    #[error("Section {index} has no cell block; call set_cells first")]
    NoCellsBlock { index: usize },

    #[error("View name must not be empty")]
    EmptyViewName,

    #[error("Row must be a JSON object, found {found}")]
    InvalidRow { found: &'static str },
}
