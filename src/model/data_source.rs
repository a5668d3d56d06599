//! The ordered list of sections handed to a renderer.
//!
//! Every mutator here is pure: it borrows the receiver and returns a new
//! value. A value that was already published stays valid and unchanged while
//! newer versions are built, so a renderer can finish drawing it.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::model::block::{CellBlock, HeaderFooterBlock};
use crate::model::error::CollectionError;
use crate::model::row::Row;
use crate::model::section::Section;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionDataSource {
    #[serde(default)]
    sections: Vec<Section>,
    /// Identity lineage. Incremental mutators keep it; a full replacement
    /// advances it so renderers know positional identity no longer holds.
    #[serde(skip)]
    epoch: u64,
}

impl CollectionDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_sections(sections: Vec<Section>) -> Self {
        Self { sections, epoch: 0 }
    }

    /// Parse a JSON layout of the form `{"sections": [...]}`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Total number of cell rows across all sections.
    pub fn total_rows(&self) -> usize {
        self.sections.iter().map(Section::row_count).sum()
    }

    pub fn add_section(&self, section: Section) -> Self {
        let mut sections = self.sections.clone();
        sections.push(section);
        Self {
            sections,
            epoch: self.epoch,
        }
    }

    pub fn set_header(
        &self,
        index: usize,
        view_name: impl Into<String>,
        row: Row,
    ) -> Result<Self, CollectionError> {
        let header = HeaderFooterBlock::new(view_name, row)?;
        self.map_section(index, |section| Ok(section.replacing_header(Some(header))))
    }

    pub fn set_footer(
        &self,
        index: usize,
        view_name: impl Into<String>,
        row: Row,
    ) -> Result<Self, CollectionError> {
        let footer = HeaderFooterBlock::new(view_name, row)?;
        self.map_section(index, |section| Ok(section.replacing_footer(Some(footer))))
    }

    pub fn set_cells(
        &self,
        index: usize,
        view_name: impl Into<String>,
        rows: Vec<Row>,
    ) -> Result<Self, CollectionError> {
        let cells = CellBlock::new(view_name, rows)?;
        self.map_section(index, |section| Ok(section.replacing_cells(cells)))
    }

    /// Append rows to the existing cell block of section `index`.
    ///
    /// Used for pagination. Fails with [`CollectionError::NoCellsBlock`] when
    /// the section has no cell block yet, since the view name is unknown.
    pub fn append_cells(&self, index: usize, rows: Vec<Row>) -> Result<Self, CollectionError> {
        self.map_section(index, |section| {
            let cells = section
                .cells()
                .ok_or(CollectionError::NoCellsBlock { index })?;
            Ok(section.replacing_cells(cells.appended(rows)))
        })
    }

    pub fn set_columns(&self, index: usize, columns: NonZeroU32) -> Result<Self, CollectionError> {
        self.map_section(index, |section| Ok(section.replacing_columns(columns)))
    }

    pub fn clear_header(&self, index: usize) -> Result<Self, CollectionError> {
        self.map_section(index, |section| Ok(section.replacing_header(None)))
    }

    pub fn clear_footer(&self, index: usize) -> Result<Self, CollectionError> {
        self.map_section(index, |section| Ok(section.replacing_footer(None)))
    }

    /// Replace every section, as refresh/reload flows do.
    ///
    /// The result starts a new identity epoch.
    pub fn replace_all_sections(&self, sections: Vec<Section>) -> Self {
        Self {
            sections,
            epoch: self.epoch.wrapping_add(1),
        }
    }

    fn map_section<F>(&self, index: usize, f: F) -> Result<Self, CollectionError>
    where
        F: FnOnce(&Section) -> Result<Section, CollectionError>,
    {
        let current = self
            .sections
            .get(index)
            .ok_or(CollectionError::IndexOutOfRange {
                index,
                len: self.sections.len(),
            })?;
        let replacement = f(current)?;

        let sections = self
            .sections
            .iter()
            .enumerate()
            .map(|(i, section)| {
                if i == index {
                    replacement.clone()
                } else {
                    section.clone()
                }
            })
            .collect();

        Ok(Self {
            sections,
            epoch: self.epoch,
        })
    }
}
