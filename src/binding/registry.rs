use std::collections::HashMap;

use crate::binding::error::{BindError, BlockSlot};
use crate::model::{CollectionDataSource, Row, Section, ViewName};

type Factory<V> = Box<dyn Fn(&Row) -> V + Send + Sync>;

struct Template<V> {
    build: Factory<V>,
    required: Vec<String>,
}

/// Maps view names to view factories.
///
/// `V` is whatever the renderer builds per row: a widget, a draw command,
/// a string in tests.
pub struct TemplateRegistry<V> {
    templates: HashMap<String, Template<V>>,
    validate_schema: bool,
}

impl<V> Default for TemplateRegistry<V> {
    fn default() -> Self {
        Self {
            templates: HashMap::new(),
            validate_schema: true,
        }
    }
}

/// Result of binding one data source value.
#[derive(Debug)]
pub struct BoundCollection<V> {
    pub sections: Vec<BoundSection<V>>,
    pub diagnostics: Vec<BindError>,
}

impl<V> BoundCollection<V> {
    pub fn has_unresolved(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| matches!(d, BindError::UnresolvedViewName { .. }))
    }
}

#[derive(Debug)]
pub struct BoundSection<V> {
    pub index: usize,
    pub header: Option<V>,
    pub cells: Vec<V>,
    pub footer: Option<V>,
    pub columns: u32,
}

impl<V> BoundSection<V> {
    /// Cells laid out in rows of `columns` views. Header and footer are
    /// full-width and not part of the grid.
    pub fn grid(&self) -> std::slice::Chunks<'_, V> {
        self.cells.chunks(self.columns.max(1) as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_none() && self.cells.is_empty() && self.footer.is_none()
    }
}

impl<V> TemplateRegistry<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle reporting of [`BindError::MissingField`].
    pub fn with_schema_validation(mut self, enabled: bool) -> Self {
        self.validate_schema = enabled;
        self
    }

    pub fn register<F>(&mut self, view_name: impl Into<String>, build: F) -> &mut Self
    where
        F: Fn(&Row) -> V + Send + Sync + 'static,
    {
        self.register_with_schema(view_name, &[], build)
    }

    /// Register a template that expects `required` fields in each row.
    pub fn register_with_schema<F>(
        &mut self,
        view_name: impl Into<String>,
        required: &[&str],
        build: F,
    ) -> &mut Self
    where
        F: Fn(&Row) -> V + Send + Sync + 'static,
    {
        self.templates.insert(
            view_name.into(),
            Template {
                build: Box::new(build),
                required: required.iter().map(|s| s.to_string()).collect(),
            },
        );
        self
    }

    pub fn contains(&self, view_name: &str) -> bool {
        self.templates.contains_key(view_name)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Resolve every block of `source` to views.
    ///
    /// Unresolved view names skip their block and keep going; the rest of
    /// the collection is always bound.
    pub fn bind(&self, source: &CollectionDataSource) -> BoundCollection<V> {
        let mut diagnostics = Vec::new();
        let sections = source
            .sections()
            .iter()
            .enumerate()
            .map(|(index, section)| self.bind_section(index, section, &mut diagnostics))
            .collect();

        for diagnostic in &diagnostics {
            tracing::warn!(%diagnostic, "Bind diagnostic");
        }

        BoundCollection {
            sections,
            diagnostics,
        }
    }

    fn bind_section(
        &self,
        index: usize,
        section: &Section,
        diagnostics: &mut Vec<BindError>,
    ) -> BoundSection<V> {
        let header = section.header().and_then(|block| {
            self.build_one(index, BlockSlot::Header, block.view_name(), 0, block.row(), diagnostics)
        });
        let footer = section.footer().and_then(|block| {
            self.build_one(index, BlockSlot::Footer, block.view_name(), 0, block.row(), diagnostics)
        });

        let cells = match section.cells() {
            Some(block) => match self.resolve(index, BlockSlot::Cells, block.view_name(), diagnostics) {
                Some(template) => block
                    .rows()
                    .iter()
                    .enumerate()
                    .map(|(row_index, row)| {
                        self.check_schema(template, index, BlockSlot::Cells, row_index, row, diagnostics);
                        (template.build)(row)
                    })
                    .collect(),
                None => Vec::new(),
            },
            None => Vec::new(),
        };

        BoundSection {
            index,
            header,
            cells,
            footer,
            columns: section.columns(),
        }
    }

    fn build_one(
        &self,
        section: usize,
        slot: BlockSlot,
        view_name: &ViewName,
        row_index: usize,
        row: &Row,
        diagnostics: &mut Vec<BindError>,
    ) -> Option<V> {
        let template = self.resolve(section, slot, view_name, diagnostics)?;
        self.check_schema(template, section, slot, row_index, row, diagnostics);
        Some((template.build)(row))
    }

    fn resolve(
        &self,
        section: usize,
        slot: BlockSlot,
        view_name: &ViewName,
        diagnostics: &mut Vec<BindError>,
    ) -> Option<&Template<V>> {
        let template = self.templates.get(view_name.as_str());
        if template.is_none() {
            diagnostics.push(BindError::UnresolvedViewName {
                section,
                slot,
                view_name: view_name.to_string(),
            });
        }
        template
    }

    fn check_schema(
        &self,
        template: &Template<V>,
        section: usize,
        slot: BlockSlot,
        row_index: usize,
        row: &Row,
        diagnostics: &mut Vec<BindError>,
    ) {
        if !self.validate_schema {
            return;
        }
        for field in &template.required {
            if !row.contains_key(field) {
                diagnostics.push(BindError::MissingField {
                    section,
                    slot,
                    row: row_index,
                    field: field.clone(),
                });
            }
        }
    }
}
