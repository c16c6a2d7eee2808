//! Basic experiment comparison example.
//!
//! Builds a small merged activity table in memory, compares control against
//! treatment before and after IQR outlier removal, and prints the results.
//!
//! Run: `cargo run --example basic`

use variantlab_core::{Table, Value, compare_variants, remove_outliers};

fn main() -> variantlab_core::Result<()> {
    // uid, active_mins, variant_number; user 7 is a heavy outlier
    let rows = [
        (1, 10.5, 0),
        (2, 12.1, 0),
        (3, 9.8, 0),
        (4, 11.4, 0),
        (5, 10.9, 0),
        (6, 14.2, 1),
        (7, 640.0, 1),
        (8, 13.9, 1),
        (9, 16.4, 1),
        (10, 15.1, 1),
    ];
    let rows = rows
        .iter()
        .map(|&(uid, mins, variant)| vec![Value::Int(uid), Value::Float(mins), Value::Int(variant)])
        .collect();
    let table = Table::from_rows("activity", &["uid", "active_mins", "variant_number"], rows)?;

    let initial = compare_variants(&table, "initial")?;
    let (cleaned, bounds) = remove_outliers(&table, "active_mins")?;
    let cleaned = compare_variants(&cleaned, "cleaned")?;

    println!("Outlier bounds: [{:.2}, {:.2}]", bounds.lower, bounds.upper);
    for report in [&initial, &cleaned] {
        match &report.test {
            Ok(t) => println!(
                "{:<8} n={}/{} t={:.4} p={:.4e}",
                report.label, t.n_a, t.n_b, t.statistic, t.p_value
            ),
            Err(e) => println!("{:<8} undefined: {e}", report.label),
        }
    }
    Ok(())
}
