use std::num::NonZeroU32;

use crate::model::data_source::CollectionDataSource;
use crate::model::error::CollectionError;
use crate::model::row::Row;
use crate::model::section::Section;
use crate::mvi::{Intent, Reducer, UiState};

impl UiState for CollectionDataSource {}

/// A requested change to a [`CollectionDataSource`].
#[derive(Debug, Clone)]
pub enum CollectionIntent {
    AddSection(Section),
    SetHeader {
        section: usize,
        view_name: String,
        row: Row,
    },
    SetFooter {
        section: usize,
        view_name: String,
        row: Row,
    },
    SetCells {
        section: usize,
        view_name: String,
        rows: Vec<Row>,
    },
    /// Pagination ("load more").
    AppendCells { section: usize, rows: Vec<Row> },
    SetColumns {
        section: usize,
        columns: NonZeroU32,
    },
    ClearHeader { section: usize },
    ClearFooter { section: usize },
    /// Refresh/reload: replaces everything and discards identity.
    ReplaceAll(Vec<Section>),
}

impl Intent for CollectionIntent {}

pub struct CollectionReducer;

impl Reducer for CollectionReducer {
    type State = CollectionDataSource;
    type Intent = CollectionIntent;
    type Error = CollectionError;

    fn reduce(state: &Self::State, intent: Self::Intent) -> Result<Self::State, Self::Error> {
        match intent {
            CollectionIntent::AddSection(section) => Ok(state.add_section(section)),
            CollectionIntent::SetHeader {
                section,
                view_name,
                row,
            } => state.set_header(section, view_name, row),
            CollectionIntent::SetFooter {
                section,
                view_name,
                row,
            } => state.set_footer(section, view_name, row),
            CollectionIntent::SetCells {
                section,
                view_name,
                rows,
            } => state.set_cells(section, view_name, rows),
            CollectionIntent::AppendCells { section, rows } => state.append_cells(section, rows),
            CollectionIntent::SetColumns { section, columns } => {
                state.set_columns(section, columns)
            }
            CollectionIntent::ClearHeader { section } => state.clear_header(section),
            CollectionIntent::ClearFooter { section } => state.clear_footer(section),
            CollectionIntent::ReplaceAll(sections) => Ok(state.replace_all_sections(sections)),
        }
    }
}
