//! Left-outer join on a single key column.

use std::collections::HashMap;

use crate::error::{AnalysisError, Result};
use crate::table::{Table, Value};

/// Return `base` with `columns` from `lookup` appended, matched on `key`.
///
/// Every base row appears exactly once in the output, in its original
/// position. Rows whose key is null or absent from `lookup` get nulls in the
/// appended columns. If `lookup` repeats a key, its first row wins. Numeric
/// keys match by value, so an integer key finds an integral float key.
pub fn left_join(base: &Table, lookup: &Table, key: &str, columns: &[&str]) -> Result<Table> {
    let base_key = base.column_index(key)?;
    let lookup_key = lookup.column_index(key)?;
    let picked: Vec<usize> = columns
        .iter()
        .map(|c| lookup.column_index(c))
        .collect::<Result<_>>()?;

    for column in columns {
        if base.has_column(column) {
            return Err(AnalysisError::DuplicateColumn {
                table: base.name().to_string(),
                column: column.to_string(),
            });
        }
    }

    let mut index: HashMap<Value, &[Value]> = HashMap::with_capacity(lookup.len());
    for row in lookup.rows() {
        let k = &row[lookup_key];
        if !k.is_null() {
            index.entry(k.key_form()).or_insert(row.as_slice());
        }
    }

    let mut unmatched = 0usize;
    let rows: Vec<Vec<Value>> = base
        .rows()
        .iter()
        .map(|row| {
            let mut out = Vec::with_capacity(row.len() + picked.len());
            out.extend_from_slice(row);
            let k = &row[base_key];
            match (!k.is_null()).then(|| index.get(&k.key_form())).flatten() {
                Some(found) => out.extend(picked.iter().map(|&i| found[i].clone())),
                None => {
                    unmatched += 1;
                    out.extend(std::iter::repeat_n(Value::Null, picked.len()));
                }
            }
            out
        })
        .collect();

    if unmatched > 0 {
        log::warn!(
            "{unmatched} of {} rows in '{}' have no match in '{}' on '{key}'",
            base.len(),
            base.name(),
            lookup.name()
        );
    }

    let mut out_columns = base.columns().to_vec();
    out_columns.extend(columns.iter().map(|c| c.to_string()));
    let name = format!("{}+{}", base.name(), lookup.name());
    Ok(Table::from_parts(name, out_columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity() -> Table {
        Table::from_rows(
            "t1",
            &["uid", "active_mins"],
            vec![
                vec![Value::Int(1), Value::Float(10.0)],
                vec![Value::Int(2), Value::Float(20.0)],
                vec![Value::Int(3), Value::Float(30.0)],
                vec![Value::Null, Value::Float(40.0)],
                vec![Value::Int(1), Value::Float(15.0)],
            ],
        )
        .unwrap()
    }

    fn variants() -> Table {
        Table::from_rows(
            "t2",
            &["uid", "variant_number", "dt"],
            vec![
                vec![Value::Int(1), Value::Int(0), Value::Text("2019-02-06".into())],
                vec![Value::Int(2), Value::Int(1), Value::Text("2019-02-06".into())],
                vec![Value::Int(2), Value::Int(0), Value::Text("2019-02-07".into())],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_left_join_keeps_every_base_row() {
        let joined = left_join(&activity(), &variants(), "uid", &["variant_number"]).unwrap();
        assert_eq!(joined.len(), activity().len());
        assert_eq!(joined.columns(), &["uid", "active_mins", "variant_number"]);

        let variant: Vec<Value> = joined.rows().iter().map(|r| r[2].clone()).collect();
        assert_eq!(
            variant,
            vec![Value::Int(0), Value::Int(1), Value::Null, Value::Null, Value::Int(0)]
        );
    }

    #[test]
    fn test_left_join_first_duplicate_wins() {
        let joined = left_join(&activity(), &variants(), "uid", &["variant_number"]).unwrap();
        assert_eq!(joined.rows()[1][2], Value::Int(1));
    }

    #[test]
    fn test_left_join_preserves_order() {
        let joined = left_join(&activity(), &variants(), "uid", &["variant_number"]).unwrap();
        let mins: Vec<f64> = joined.numeric_values("active_mins").unwrap();
        assert_eq!(mins, vec![10.0, 20.0, 30.0, 40.0, 15.0]);
    }

    #[test]
    fn test_left_join_multiple_columns() {
        let joined =
            left_join(&activity(), &variants(), "uid", &["dt", "variant_number"]).unwrap();
        assert_eq!(joined.columns(), &["uid", "active_mins", "dt", "variant_number"]);
        assert_eq!(joined.rows()[0][2], Value::Text("2019-02-06".into()));
    }

    #[test]
    fn test_left_join_empty_lookup() {
        let empty = Table::new("t2", vec!["uid".into(), "variant_number".into()]);
        let joined = left_join(&activity(), &empty, "uid", &["variant_number"]).unwrap();
        assert_eq!(joined.len(), 5);
        assert!(joined.rows().iter().all(|r| r[2].is_null()));
    }

    #[test]
    fn test_left_join_missing_column() {
        let err = left_join(&activity(), &variants(), "uid", &["gender"]).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingColumn { .. }));
        let err = left_join(&activity(), &variants(), "user", &["variant_number"]).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingColumn { .. }));
    }

    #[test]
    fn test_left_join_float_keys_match_int_keys() {
        let base = Table::from_rows(
            "t1",
            &["uid", "active_mins"],
            vec![
                vec![Value::Float(1.0), Value::Float(10.0)],
                vec![Value::Float(2.0), Value::Float(20.0)],
                vec![Value::Float(2.5), Value::Float(25.0)],
            ],
        )
        .unwrap();
        let joined = left_join(&base, &variants(), "uid", &["variant_number"]).unwrap();
        let variant: Vec<Value> = joined.rows().iter().map(|r| r[2].clone()).collect();
        assert_eq!(variant, vec![Value::Int(0), Value::Int(1), Value::Null]);
        // base keys keep their own type
        assert_eq!(joined.rows()[0][0], Value::Float(1.0));
    }

    #[test]
    fn test_left_join_duplicate_column() {
        let err = left_join(&variants(), &variants(), "uid", &["variant_number"]).unwrap_err();
        assert!(matches!(err, AnalysisError::DuplicateColumn { .. }));
    }
}
