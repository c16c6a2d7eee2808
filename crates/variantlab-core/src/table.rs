//! Row-oriented in-memory tables.
//!
//! A [`Table`] is an ordered list of column names plus rows of [`Value`]s
//! aligned with those columns. Column types are inferred once on load (see
//! [`ColumnKind::infer`]) so every non-null cell in a column shares a variant.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use crate::error::{AnalysisError, Result};

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// A single cell.
///
/// Values have a total order: `Null < Int < Float < Text`, then natural order
/// within a variant (floats by `total_cmp`). This lets them act as join and
/// group keys.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// True for `Null` and for a float NaN, which is how missing numbers
    /// surface in CSV exports from other tools.
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(x) => x.is_nan(),
            _ => false,
        }
    }

    /// Numeric view of the cell. `None` for nulls and text.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(x) if !x.is_nan() => Some(*x),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Form used when matching keys across tables: an integral float becomes
    /// the equal `Int`, so `1` and `1.0` pick the same row.
    pub fn key_form(&self) -> Value {
        match self {
            Value::Float(x) if x.fract() == 0.0 && x.abs() < 9.0e15 => Value::Int(*x as i64),
            v => v.clone(),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Int(_) => 1,
            Value::Float(_) => 2,
            Value::Text(_) => 3,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Null => {}
            Value::Int(i) => i.hash(state),
            Value::Float(x) => x.to_bits().hash(state),
            Value::Text(s) => s.hash(state),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => f.write_str(&format_number(*x)),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Format a float in shortest round-trip form, keeping a trailing `.0` on
/// integral values and spelling non-finite values `nan`, `inf`, `-inf`.
pub fn format_number(x: f64) -> String {
    if x.is_nan() {
        "nan".to_string()
    } else if x == f64::INFINITY {
        "inf".to_string()
    } else if x == f64::NEG_INFINITY {
        "-inf".to_string()
    } else if x.fract() == 0.0 && x.abs() < 1e16 {
        format!("{x:.1}")
    } else {
        format!("{x}")
    }
}

// ---------------------------------------------------------------------------
// Column type inference
// ---------------------------------------------------------------------------

/// Inferred type of a loaded column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Int,
    Float,
    Text,
}

impl ColumnKind {
    /// Integer if every non-empty cell parses as `i64`, float if every one
    /// parses as `f64`, text otherwise. An all-empty column is float, so its
    /// cells read as missing numbers.
    pub fn infer<'a>(cells: impl Iterator<Item = &'a str>) -> Self {
        let non_empty: Vec<&str> = cells.map(str::trim).filter(|c| !c.is_empty()).collect();
        if non_empty.is_empty() {
            return ColumnKind::Float;
        }
        if non_empty.iter().all(|c| c.parse::<i64>().is_ok()) {
            ColumnKind::Int
        } else if non_empty.iter().all(|c| c.parse::<f64>().is_ok()) {
            ColumnKind::Float
        } else {
            ColumnKind::Text
        }
    }

    /// Parse one cell according to the column's kind. Empty cells are null.
    pub fn parse(self, cell: &str) -> Value {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }
        match self {
            ColumnKind::Int => trimmed.parse().map(Value::Int).unwrap_or(Value::Null),
            ColumnKind::Float => trimmed.parse().map(Value::Float).unwrap_or(Value::Null),
            ColumnKind::Text => Value::Text(cell.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Named, row-oriented table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from literal rows, checking every row's width.
    pub fn from_rows(
        name: impl Into<String>,
        columns: &[&str],
        rows: Vec<Vec<Value>>,
    ) -> Result<Self> {
        let mut table = Self::new(name, columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Same rows and columns under a different name.
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Position of `column`, or `MissingColumn`.
    pub fn column_index(&self, column: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| AnalysisError::missing_column(&self.name, column))
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(AnalysisError::RaggedRow {
                table: self.name.clone(),
                row: self.rows.len(),
                got: row.len(),
                expected: self.columns.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Keep only rows for which `keep` returns true, preserving order.
    pub fn retain_rows(&self, mut keep: impl FnMut(&[Value]) -> bool) -> Table {
        Table {
            name: self.name.clone(),
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }

    /// Every cell of `column` as an optional number. Text cells are an error.
    pub fn numeric_column(&self, column: &str) -> Result<Vec<Option<f64>>> {
        let idx = self.column_index(column)?;
        self.rows
            .iter()
            .map(|row| match &row[idx] {
                Value::Text(s) => Err(AnalysisError::NonNumeric {
                    table: self.name.clone(),
                    column: column.to_string(),
                    value: s.clone(),
                }),
                v => Ok(v.as_f64()),
            })
            .collect()
    }

    /// Non-null numbers of `column`, in row order.
    pub fn numeric_values(&self, column: &str) -> Result<Vec<f64>> {
        Ok(self.numeric_column(column)?.into_iter().flatten().collect())
    }

    /// Non-null numbers of `value_column` for rows whose `key_column` equals `key`.
    pub fn values_where(
        &self,
        key_column: &str,
        key: &Value,
        value_column: &str,
    ) -> Result<Vec<f64>> {
        let key_idx = self.column_index(key_column)?;
        let values = self.numeric_column(value_column)?;
        Ok(self
            .rows
            .iter()
            .zip(values)
            .filter(|(row, _)| !row[key_idx].is_null() && key_matches(&row[key_idx], key))
            .filter_map(|(_, v)| v)
            .collect())
    }

    /// Assemble a table whose rows are already known to match `columns`.
    pub(crate) fn from_parts(name: String, columns: Vec<String>, rows: Vec<Vec<Value>>) -> Table {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Table {
            name,
            columns,
            rows,
        }
    }
}

/// Key comparison that lets an integer selector match a float column holding
/// the same number (a left join turns an integer column into nullable floats
/// in some exports).
fn key_matches(cell: &Value, key: &Value) -> bool {
    cell.key_form() == key.key_form()
}
