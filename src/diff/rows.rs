//! Row-level diffing inside one cell block.

use std::collections::{HashMap, HashSet};
use std::ops::Range;

use crate::model::Row;

/// How the rows of one cell block changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowDiff {
    /// Every row on both sides carried a unique identifier.
    Keyed(KeyedRowDiff),
    /// No usable identifier; rows are matched by position.
    Positional(PositionalRowDiff),
}

impl RowDiff {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Keyed(d) => {
                d.inserted.is_empty()
                    && d.removed.is_empty()
                    && d.updated.is_empty()
                    && d.moved.is_empty()
            }
            Self::Positional(d) => d.updated.is_empty() && d.inserted.is_empty() && d.removed.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyedRowDiff {
    /// Indices into the new rows.
    pub inserted: Vec<usize>,
    /// Indices into the old rows.
    pub removed: Vec<usize>,
    /// Indices into the new rows whose content changed under the same id.
    pub updated: Vec<usize>,
    /// `(old index, new index)` of retained rows whose relative order changed.
    pub moved: Vec<(usize, usize)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionalRowDiff {
    /// Indices present on both sides whose content differs.
    pub updated: Vec<usize>,
    /// Tail of the new rows past the old length.
    pub inserted: Range<usize>,
    /// Tail of the old rows past the new length.
    pub removed: Range<usize>,
}

/// Diff two row sequences, keyed by `id_key` when every row has a unique id.
pub fn diff_rows(old: &[Row], new: &[Row], id_key: Option<&str>) -> RowDiff {
    if let Some(key) = id_key {
        if let (Some(old_ids), Some(new_ids)) = (unique_ids(old, key), unique_ids(new, key)) {
            return RowDiff::Keyed(keyed(old, new, &old_ids, &new_ids));
        }
        tracing::trace!(id_key = key, "Rows lack unique ids, falling back to positional diff");
    }
    RowDiff::Positional(positional(old, new))
}

fn unique_ids(rows: &[Row], key: &str) -> Option<Vec<String>> {
    let mut seen = HashSet::with_capacity(rows.len());
    let mut ids = Vec::with_capacity(rows.len());
    for row in rows {
        let id = row.identity(key)?;
        if !seen.insert(id.clone()) {
            return None;
        }
        ids.push(id);
    }
    Some(ids)
}

fn positional(old: &[Row], new: &[Row]) -> PositionalRowDiff {
    let shared = old.len().min(new.len());
    let updated = (0..shared).filter(|&i| old[i] != new[i]).collect();
    PositionalRowDiff {
        updated,
        inserted: shared..new.len(),
        removed: shared..old.len(),
    }
}

fn keyed(old: &[Row], new: &[Row], old_ids: &[String], new_ids: &[String]) -> KeyedRowDiff {
    let old_index: HashMap<&str, usize> = old_ids
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();
    let new_set: HashSet<&str> = new_ids.iter().map(String::as_str).collect();

    let mut diff = KeyedRowDiff {
        removed: old_ids
            .iter()
            .enumerate()
            .filter(|(_, id)| !new_set.contains(id.as_str()))
            .map(|(i, _)| i)
            .collect(),
        ..KeyedRowDiff::default()
    };

    // (old index, new index) of rows present on both sides, in new order.
    let mut retained = Vec::new();
    for (new_i, id) in new_ids.iter().enumerate() {
        match old_index.get(id.as_str()) {
            Some(&old_i) => {
                if old[old_i] != new[new_i] {
                    diff.updated.push(new_i);
                }
                retained.push((old_i, new_i));
            }
            None => diff.inserted.push(new_i),
        }
    }

    let old_positions: Vec<usize> = retained.iter().map(|&(old_i, _)| old_i).collect();
    let stable = longest_increasing_subsequence(&old_positions);
    diff.moved = retained
        .iter()
        .enumerate()
        .filter(|(i, _)| !stable.contains(i))
        .map(|(_, &pair)| pair)
        .collect();

    diff
}

/// Indices (into `values`) of one longest strictly increasing subsequence.
fn longest_increasing_subsequence(values: &[usize]) -> HashSet<usize> {
    // tails[k]: index of the smallest tail of an increasing run of length k + 1
    let mut tails: Vec<usize> = Vec::new();
    let mut prev: Vec<Option<usize>> = vec![None; values.len()];

    for (i, &value) in values.iter().enumerate() {
        let pos = tails.partition_point(|&t| values[t] < value);
        if pos > 0 {
            prev[i] = Some(tails[pos - 1]);
        }
        if pos == tails.len() {
            tails.push(i);
        } else {
            tails[pos] = i;
        }
    }

    let mut result = HashSet::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(i) = cursor {
        result.insert(i);
        cursor = prev[i];
    }
    result
}
