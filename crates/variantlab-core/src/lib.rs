//! # variantlab-core
//!
//! **A/B experiment analysis as a straight-line pipeline.**
//!
//! `variantlab-core` loads user activity, variant assignment and user
//! attribute tables, joins them on the user id, compares control against
//! treatment with a Welch t-test before and after IQR outlier removal, checks
//! the pre-experiment period for pre-existing differences, and breaks the
//! cleaned metric down by user type and gender.
//!
//! ## Quick Start
//!
//! ```no_run
//! use variantlab_core::{AnalysisConfig, run_analysis};
//!
//! // Reads Data/t1..t4 and writes the CSV, PNG and text outputs to ./
//! let summary = run_analysis(&AnalysisConfig::default()).unwrap();
//! match &summary.cleaned.test {
//!     Ok(t) => println!("cleaned: t={} p={}", t.statistic, t.p_value),
//!     Err(e) => println!("cleaned: undefined ({e})"),
//! }
//! ```
//!
//! ## Architecture
//!
//! Loader → Joiner → Aggregator → Outlier filter → Hypothesis test → Reporter
//!
//! Tables are plain values ([`Table`]) passed from one stage to the next.
//! Statistics live in the `variantlab-stats` crate; this crate handles the
//! tabular side and the output files.

pub mod aggregate;
pub mod error;
pub mod join;
pub mod loader;
pub mod outliers;
pub mod pipeline;
pub mod plot;
pub mod report;
pub mod table;

pub use aggregate::{Group, GroupStats, group_stats};
pub use error::{AnalysisError, Result};
pub use join::left_join;
pub use loader::{load_table, write_table};
pub use outliers::{DEFAULT_FENCE, IqrBounds, filter_range, iqr_bounds, remove_outliers};
pub use pipeline::{
    AnalysisConfig, Inputs, compare_variants, load_inputs, merge_variants, run_analysis,
};
pub use plot::{BoxGroup, BoxPlot, BoxStats, variant_box_plot};
pub use report::{AnalysisSummary, PhaseReport, TestOutcome, render_results};
pub use table::{ColumnKind, Table, Value};

pub use variantlab_stats::{Sample, TestError, WelchTest};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
