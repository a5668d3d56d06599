//! Shared fixtures for integration tests.

#![allow(dead_code, unused_imports)]

use std::time::Duration;

use sectioned::model::{CellBlock, CollectionDataSource, HeaderFooterBlock, Row, Section};
use serde_json::{json, Value};

/// Build a row from a JSON object literal.
pub fn row(value: Value) -> Row {
    Row::try_from(value).expect("row fixture must be a JSON object")
}

pub fn rows(values: Vec<Value>) -> Vec<Row> {
    values.into_iter().map(row).collect()
}

/// The product list screen: featured header+cells, a two-column product
/// grid, and a "see more" section with a load-more footer.
pub fn product_list() -> CollectionDataSource {
    CollectionDataSource::new()
        .add_section(
            Section::new()
                .with_header(
                    HeaderFooterBlock::new("FeaturedHeader", row(json!({"title": "Featured"})))
                        .unwrap(),
                )
                .with_cells(
                    CellBlock::new(
                        "FeaturedCell",
                        rows(vec![json!({"name": "Featured 1"}), json!({"name": "Featured 2"})]),
                    )
                    .unwrap(),
                ),
        )
        .add_section(
            Section::new()
                .with_cells(
                    CellBlock::new(
                        "ProductCell",
                        rows(vec![
                            json!({"name": "Product 1", "price": 100}),
                            json!({"name": "Product 2", "price": 200}),
                            json!({"name": "Product 3", "price": 300}),
                        ]),
                    )
                    .unwrap(),
                )
                .with_columns(2),
        )
        .add_section(
            Section::new()
                .with_cells(CellBlock::new("MoreCell", rows(vec![json!({"text": "See more..."})])).unwrap())
                .with_footer(
                    HeaderFooterBlock::new("LoadMoreFooter", row(json!({"loading": false}))).unwrap(),
                ),
        )
}

/// Names of the cell rows of `section`, in order.
pub fn cell_names(source: &CollectionDataSource, section: usize) -> Vec<String> {
    source
        .section(section)
        .and_then(Section::cells)
        .map(|cells| {
            cells
                .rows()
                .iter()
                .filter_map(|r| r.get("name").and_then(Value::as_str).map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Upper bound for async delivery assertions.
pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);
