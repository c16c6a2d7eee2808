//! Group-wise mean and median of a numeric column.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::Result;
use crate::table::{Table, Value};

/// Statistics for one distinct group-key tuple.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub key: Vec<Value>,
    /// Number of non-null values that went into the statistics.
    pub count: usize,
    /// NaN when every value in the group is null.
    pub mean: f64,
    pub median: f64,
}

/// Result of [`group_stats`]: groups in ascending key order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub group_by: Vec<String>,
    pub value: String,
    pub groups: Vec<Group>,
}

impl GroupStats {
    pub fn get(&self, key: &[Value]) -> Option<&Group> {
        self.groups.iter().find(|g| g.key == key)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Mean and median of `value_key` for each distinct tuple of `group_keys`.
///
/// Rows with a null in any group key are skipped. Null values are ignored
/// inside a group, but the group itself still appears (with NaN statistics)
/// when all of its values are null.
pub fn group_stats(table: &Table, group_keys: &[&str], value_key: &str) -> Result<GroupStats> {
    let key_idx: Vec<usize> = group_keys
        .iter()
        .map(|k| table.column_index(k))
        .collect::<Result<_>>()?;
    let values = table.numeric_column(value_key)?;

    let mut buckets: BTreeMap<Vec<Value>, Vec<f64>> = BTreeMap::new();
    for (row, value) in table.rows().iter().zip(values) {
        if key_idx.iter().any(|&i| row[i].is_null()) {
            continue;
        }
        let key: Vec<Value> = key_idx.iter().map(|&i| row[i].clone()).collect();
        let bucket = buckets.entry(key).or_default();
        if let Some(v) = value {
            bucket.push(v);
        }
    }

    let groups = buckets
        .into_iter()
        .map(|(key, vals)| Group {
            key,
            count: vals.len(),
            mean: variantlab_stats::mean(&vals),
            median: variantlab_stats::median(&vals),
        })
        .collect();

    Ok(GroupStats {
        group_by: group_keys.iter().map(|k| k.to_string()).collect(),
        value: value_key.to_string(),
        groups,
    })
}
