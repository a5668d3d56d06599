//! Header, footer and cell blocks bound to named view templates.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::error::CollectionError;
use crate::model::row::Row;

/// Symbolic name of a renderer-registered view template.
///
/// Never empty. Whether a template with this name exists is only known at
/// render time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ViewName(String);

impl ViewName {
    pub fn new(name: impl Into<String>) -> Result<Self, CollectionError> {
        let name = name.into();
        if name.is_empty() {
            return Err(CollectionError::EmptyViewName);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ViewName {
    type Error = CollectionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ViewName> for String {
    fn from(name: ViewName) -> Self {
        name.0
    }
}

impl fmt::Display for ViewName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for ViewName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ViewName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A homogeneous run of rows rendered with one template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellBlock {
    view_name: ViewName,
    #[serde(rename = "data", default)]
    rows: Vec<Row>,
}

impl CellBlock {
    pub fn new(view_name: impl Into<String>, rows: Vec<Row>) -> Result<Self, CollectionError> {
        Ok(Self {
            view_name: ViewName::new(view_name)?,
            rows,
        })
    }

    pub fn view_name(&self) -> &ViewName {
        &self.view_name
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// New block with `more` after the existing rows, same view name.
    pub(crate) fn appended(&self, more: Vec<Row>) -> Self {
        let mut rows = Vec::with_capacity(self.rows.len() + more.len());
        rows.extend(self.rows.iter().cloned());
        rows.extend(more);
        Self {
            view_name: self.view_name.clone(),
            rows,
        }
    }
}

/// A single full-width row attached to a section boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderFooterBlock {
    view_name: ViewName,
    #[serde(rename = "data", default)]
    row: Row,
}

impl HeaderFooterBlock {
    pub fn new(view_name: impl Into<String>, row: Row) -> Result<Self, CollectionError> {
        Ok(Self {
            view_name: ViewName::new(view_name)?,
            row,
        })
    }

    pub fn view_name(&self) -> &ViewName {
        &self.view_name
    }

    pub fn row(&self) -> &Row {
        &self.row
    }
}
