use std::path::Path;

use variantlab_core::pipeline::{ACTIVE_MINS, ACTIVITY_FILE, USER_ID, VARIANT, VARIANT_FILE};
use variantlab_core::{compare_variants, load_table, merge_variants, remove_outliers};

/// Dry run over t1/t2: nothing is written.
pub fn run(data_dir: &Path) {
    let loaded = load_table(&data_dir.join(ACTIVITY_FILE), "t1", &[USER_ID, ACTIVE_MINS])
        .and_then(|activity| {
            let variants = load_table(&data_dir.join(VARIANT_FILE), "t2", &[USER_ID, VARIANT])?;
            merge_variants(&activity, &variants)
        });
    let merged = match loaded {
        Ok(t) => t,
        Err(e) => super::fail(&e),
    };

    println!(
        "{}: {} rows, columns [{}]\n",
        data_dir.join(ACTIVITY_FILE).display(),
        merged.len(),
        merged.columns().join(", ")
    );

    let described = compare_variants(&merged, "initial").and_then(|initial| {
        let (cleaned, bounds) = remove_outliers(&merged, ACTIVE_MINS)?;
        let cleaned = compare_variants(&cleaned, "cleaned")?;
        Ok((initial, bounds, cleaned))
    });
    let (initial, bounds, cleaned) = match described {
        Ok(d) => d,
        Err(e) => super::fail(&e),
    };

    print!("{}", super::format_phase("Initial", &initial));
    println!();
    print!("{}", super::format_bounds(&bounds));
    println!("  would remove {} row(s)\n", initial.rows - cleaned.rows);
    print!("{}", super::format_phase("Cleaned", &cleaned));
}
