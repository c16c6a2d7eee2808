//! The end-to-end analysis run.
//!
//! Each stage takes the tables it needs as arguments and returns the tables it
//! produces; nothing is shared between stages except through those values.
//!
//! ```text
//! t1 ⋈ t2 ──► organized_user_activity.csv ──► Welch (initial)
//!    │
//!    └─► IQR filter ──► cleaned_user_activity.csv ──► Welch (cleaned)
//!                          │
//!                          └─► ⋈ t4 ──► user_type × gender stats
//! t3 ⋈ t2 ──► Welch (pre-experiment)
//! ```

use std::path::{Path, PathBuf};

use crate::aggregate::group_stats;
use crate::error::Result;
use crate::join::left_join;
use crate::loader::{load_table, write_table};
use crate::outliers::remove_outliers;
use crate::plot::variant_box_plot;
use crate::report::{AnalysisSummary, PhaseReport, write_results, write_summary};
use crate::table::{Table, Value};

pub const ACTIVITY_FILE: &str = "t1_user_active_min.csv";
pub const VARIANT_FILE: &str = "t2_user_variant.csv";
pub const PRE_ACTIVITY_FILE: &str = "t3_user_active_min_pre.csv";
pub const ATTRIBUTES_FILE: &str = "t4_user_attributes.csv";

pub const ORGANIZED_FILE: &str = "organized_user_activity.csv";
pub const CLEANED_FILE: &str = "cleaned_user_activity.csv";
pub const BOX_PLOT_FILE: &str = "box_plot.png";
pub const RESULTS_FILE: &str = "analysis_results.txt";

pub const USER_ID: &str = "uid";
pub const ACTIVE_MINS: &str = "active_mins";
pub const VARIANT: &str = "variant_number";
pub const USER_TYPE: &str = "user_type";
pub const GENDER: &str = "gender";

/// Variant number of the control group; treatment is 1.
pub const CONTROL: i64 = 0;
pub const TREATMENT: i64 = 1;

/// Where a run reads its inputs and writes its outputs.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub data_dir: PathBuf,
    pub out_dir: PathBuf,
    /// Also write the JSON summary here.
    pub summary_path: Option<PathBuf>,
    pub render_plot: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("Data"),
            out_dir: PathBuf::from("."),
            summary_path: None,
            render_plot: true,
        }
    }
}

impl AnalysisConfig {
    pub fn input(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    pub fn output(&self, file: &str) -> PathBuf {
        self.out_dir.join(file)
    }
}

/// The four raw input tables.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub activity: Table,
    pub variants: Table,
    pub pre_activity: Table,
    pub attributes: Table,
}

pub fn load_inputs(data_dir: &Path) -> Result<Inputs> {
    Ok(Inputs {
        activity: load_table(&data_dir.join(ACTIVITY_FILE), "t1", &[USER_ID, ACTIVE_MINS])?,
        variants: load_table(&data_dir.join(VARIANT_FILE), "t2", &[USER_ID, VARIANT])?,
        pre_activity: load_table(
            &data_dir.join(PRE_ACTIVITY_FILE),
            "t3",
            &[USER_ID, ACTIVE_MINS],
        )?,
        attributes: load_table(
            &data_dir.join(ATTRIBUTES_FILE),
            "t4",
            &[USER_ID, USER_TYPE, GENDER],
        )?,
    })
}

/// Attach each activity row's variant number.
pub fn merge_variants(activity: &Table, variants: &Table) -> Result<Table> {
    left_join(activity, variants, USER_ID, &[VARIANT])
}

/// Group statistics by variant plus the control-vs-treatment Welch test.
pub fn compare_variants(table: &Table, label: &str) -> Result<PhaseReport> {
    let stats = group_stats(table, &[VARIANT], ACTIVE_MINS)?;
    let control = table.values_where(VARIANT, &Value::Int(CONTROL), ACTIVE_MINS)?;
    let treatment = table.values_where(VARIANT, &Value::Int(TREATMENT), ACTIVE_MINS)?;
    let test = variantlab_stats::welch_t_test(&control, &treatment);
    match &test {
        Ok(t) => log::info!(
            "{label}: control n={} treatment n={} t={:.4} p={:.4e}",
            t.n_a,
            t.n_b,
            t.statistic,
            t.p_value
        ),
        Err(e) => log::warn!("{label}: t-test undefined: {e}"),
    }
    Ok(PhaseReport {
        label: label.to_string(),
        rows: table.len(),
        group_stats: stats,
        test,
    })
}

/// Run every stage and write all outputs. Outputs from earlier stages stay on
/// disk if a later stage fails.
pub fn run_analysis(config: &AnalysisConfig) -> Result<AnalysisSummary> {
    let inputs = load_inputs(&config.data_dir)?;

    let organized = merge_variants(&inputs.activity, &inputs.variants)?.renamed("organized");
    write_table(&config.output(ORGANIZED_FILE), &organized)?;
    let initial = compare_variants(&organized, "initial")?;

    let (cleaned, bounds) = remove_outliers(&organized, ACTIVE_MINS)?;
    let cleaned = cleaned.renamed("cleaned");
    write_table(&config.output(CLEANED_FILE), &cleaned)?;
    let cleaned_report = compare_variants(&cleaned, "cleaned")?;

    let pre = merge_variants(&inputs.pre_activity, &inputs.variants)?.renamed("pre_experiment");
    let pre_report = compare_variants(&pre, "pre_experiment")?;

    let with_attributes = left_join(&cleaned, &inputs.attributes, USER_ID, &[USER_TYPE, GENDER])?;
    let demographics = group_stats(&with_attributes, &[USER_TYPE, GENDER], ACTIVE_MINS)?;

    if config.render_plot {
        variant_box_plot(&organized, VARIANT, ACTIVE_MINS)?
            .write_png(&config.output(BOX_PLOT_FILE))?;
    }

    write_results(
        &config.output(RESULTS_FILE),
        &initial.test,
        &cleaned_report.test,
        &pre_report.test,
    )?;

    let summary = AnalysisSummary {
        variantlab_version: crate::VERSION.to_string(),
        rows_removed: organized.len() - cleaned.len(),
        initial,
        cleaned: cleaned_report,
        pre_experiment: pre_report,
        outlier_bounds: bounds,
        demographics,
    };
    if let Some(path) = &config.summary_path {
        write_summary(path, &summary)?;
    }
    Ok(summary)
}
