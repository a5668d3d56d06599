//! Section and row identity for incremental rendering.
//!
//! A section at index `i` in two successive values is the same logical
//! section only when its header, cells and footer view names are unchanged.
//! Row identity comes from a caller-supplied id field; this crate never
//! synthesizes one. Without usable ids, rows are compared by position, which
//! is the documented fallback and not an error.

mod rows;

pub use rows::{diff_rows, KeyedRowDiff, PositionalRowDiff, RowDiff};

use crate::model::{CellBlock, CollectionDataSource, Section};

pub const DEFAULT_ID_KEY: &str = "id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOptions {
    /// Row field holding a stable identifier. `None` forces positional diffs.
    pub id_key: Option<String>,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            id_key: Some(DEFAULT_ID_KEY.to_string()),
        }
    }
}

impl DiffOptions {
    pub fn positional() -> Self {
        Self { id_key: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionDiff {
    /// The value was produced by a full replacement; redraw everything.
    Reload,
    /// One entry per index of the longer of the two section lists.
    Sections(Vec<SectionChange>),
}

impl CollectionDiff {
    pub fn is_unchanged(&self) -> bool {
        match self {
            Self::Reload => false,
            Self::Sections(changes) => changes.iter().all(|c| *c == SectionChange::Unchanged),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionChange {
    Unchanged,
    /// Same logical section, content changed.
    Updated(SectionUpdate),
    /// View names differ: a different section now lives at this index.
    Replaced,
    Inserted,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionUpdate {
    pub header_changed: bool,
    pub footer_changed: bool,
    pub columns_changed: bool,
    pub rows: RowDiff,
}

/// Compare two successive values of a data source.
pub fn diff(
    prev: &CollectionDataSource,
    next: &CollectionDataSource,
    options: &DiffOptions,
) -> CollectionDiff {
    if prev.epoch() != next.epoch() {
        return CollectionDiff::Reload;
    }

    let id_key = options.id_key.as_deref();
    let len = prev.len().max(next.len());
    let changes = (0..len)
        .map(|i| match (prev.section(i), next.section(i)) {
            (Some(old), Some(new)) => diff_section(old, new, id_key),
            (None, Some(_)) => SectionChange::Inserted,
            (Some(_), None) => SectionChange::Removed,
            (None, None) => SectionChange::Unchanged,
        })
        .collect();

    CollectionDiff::Sections(changes)
}

fn diff_section(old: &Section, new: &Section, id_key: Option<&str>) -> SectionChange {
    if old == new {
        return SectionChange::Unchanged;
    }
    if old.identity() != new.identity() {
        return SectionChange::Replaced;
    }

    let old_rows = old.cells().map(CellBlock::rows).unwrap_or_default();
    let new_rows = new.cells().map(CellBlock::rows).unwrap_or_default();

    SectionChange::Updated(SectionUpdate {
        header_changed: old.header() != new.header(),
        footer_changed: old.footer() != new.footer(),
        columns_changed: old.columns() != new.columns(),
        rows: diff_rows(old_rows, new_rows, id_key),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Row;

    fn source() -> CollectionDataSource {
        CollectionDataSource::new()
            .add_section(Section::new())
            .set_cells(0, "Cell", vec![Row::new().with("id", 1)])
            .unwrap()
    }

    #[test]
    fn test_identical_values_unchanged() {
        let ds = source();
        assert!(diff(&ds, &ds.clone(), &DiffOptions::default()).is_unchanged());
    }

    #[test]
    fn test_view_name_change_is_replacement() {
        let prev = source();
        let next = prev.set_cells(0, "OtherCell", vec![Row::new().with("id", 1)]).unwrap();
        assert_eq!(
            diff(&prev, &next, &DiffOptions::default()),
            CollectionDiff::Sections(vec![SectionChange::Replaced])
        );
    }

    #[test]
    fn test_header_data_change_is_update() {
        let prev = source().set_header(0, "Header", Row::new().with("title", "a")).unwrap();
        let next = prev.set_header(0, "Header", Row::new().with("title", "b")).unwrap();
        let CollectionDiff::Sections(changes) = diff(&prev, &next, &DiffOptions::default()) else {
            panic!("expected section diff");
        };
        let SectionChange::Updated(update) = &changes[0] else {
            panic!("expected update");
        };
        assert!(update.header_changed);
        assert!(!update.footer_changed);
        assert!(update.rows.is_empty());
    }

    #[test]
    fn test_added_and_removed_sections() {
        let prev = source();
        let next = prev.add_section(Section::new());
        assert_eq!(
            diff(&prev, &next, &DiffOptions::default()),
            CollectionDiff::Sections(vec![SectionChange::Unchanged, SectionChange::Inserted])
        );
        assert_eq!(
            diff(&next, &prev, &DiffOptions::default()),
            CollectionDiff::Sections(vec![SectionChange::Unchanged, SectionChange::Removed])
        );
    }

    #[test]
    fn test_replace_all_forces_reload() {
        let prev = source();
        let next = prev.replace_all_sections(prev.sections().to_vec());
        assert_eq!(diff(&prev, &next, &DiffOptions::default()), CollectionDiff::Reload);
    }
}
