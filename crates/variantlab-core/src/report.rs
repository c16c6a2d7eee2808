//! Text and JSON reports.
//!
//! The text report has a fixed layout:
//!
//! ```text
//! Initial T-Test:
//! T-Statistic: <t>, P-Value: <p>
//!
//! Cleaned Data T-Test:
//! T-Statistic: <t>, P-Value: <p>
//!
//! Pre-Experiment T-Test:
//! T-Statistic: <t>, P-Value: <p>
//! ```
//!
//! A test that could not be computed is written as `nan` with a `Reason:`
//! line underneath, never as zero.

use std::path::Path;

use serde::Serialize;
use variantlab_stats::{TestError, WelchTest};

use crate::aggregate::GroupStats;
use crate::error::{AnalysisError, Result};
use crate::outliers::IqrBounds;
use crate::table::format_number;

/// Outcome of comparing control against treatment.
pub type TestOutcome = std::result::Result<WelchTest, TestError>;

/// One labelled comparison: group statistics plus the t-test.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseReport {
    pub label: String,
    pub rows: usize,
    pub group_stats: GroupStats,
    #[serde(serialize_with = "serialize_outcome")]
    pub test: TestOutcome,
}

/// Everything a run produced, in a serialisable shape.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    pub variantlab_version: String,
    pub initial: PhaseReport,
    pub cleaned: PhaseReport,
    pub pre_experiment: PhaseReport,
    pub outlier_bounds: IqrBounds,
    pub rows_removed: usize,
    pub demographics: GroupStats,
}

fn serialize_outcome<S: serde::Serializer>(
    outcome: &TestOutcome,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    #[derive(Serialize)]
    #[serde(tag = "status", rename_all = "snake_case")]
    enum Wire<'a> {
        Defined(&'a WelchTest),
        Undefined { reason: String, error: &'a TestError },
    }
    match outcome {
        Ok(t) => Wire::Defined(t).serialize(serializer),
        Err(e) => Wire::Undefined {
            reason: e.to_string(),
            error: e,
        }
        .serialize(serializer),
    }
}

/// `T-Statistic: <t>, P-Value: <p>` plus a reason line for undefined tests.
pub fn format_test_line(outcome: &TestOutcome) -> String {
    match outcome {
        Ok(t) => format!(
            "T-Statistic: {}, P-Value: {}\n",
            format_stat(t.statistic),
            format_stat(t.p_value)
        ),
        Err(e) => format!("T-Statistic: nan, P-Value: nan\nReason: {e}\n"),
    }
}

/// Shortest round-trip float in the usual `repr` layout: positional with a
/// `.0` on integral values while the decimal exponent is in `[-4, 16)`,
/// scientific with a signed two-digit exponent (`3.79e-11`, `1e+16`) outside.
pub fn format_stat(x: f64) -> String {
    if !x.is_finite() || x == 0.0 {
        return format_number(x);
    }
    let sci = format!("{x:e}");
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return format_number(x);
    };
    let exp: i32 = match exp.parse() {
        Ok(e) => e,
        Err(_) => return format_number(x),
    };
    if (-4..16).contains(&exp) {
        format_number(x)
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exp.abs())
    }
}

/// Render the three-block text report.
pub fn render_results(initial: &TestOutcome, cleaned: &TestOutcome, pre: &TestOutcome) -> String {
    let mut out = String::new();
    out.push_str("Initial T-Test:\n");
    out.push_str(&format_test_line(initial));
    out.push('\n');
    out.push_str("Cleaned Data T-Test:\n");
    out.push_str(&format_test_line(cleaned));
    out.push('\n');
    out.push_str("Pre-Experiment T-Test:\n");
    out.push_str(&format_test_line(pre));
    out
}

pub fn write_results(
    path: &Path,
    initial: &TestOutcome,
    cleaned: &TestOutcome,
    pre: &TestOutcome,
) -> Result<()> {
    std::fs::write(path, render_results(initial, cleaned, pre))
        .map_err(|e| AnalysisError::io(path, e))?;
    log::info!("wrote t-test results to {}", path.display());
    Ok(())
}

pub fn write_summary(path: &Path, summary: &AnalysisSummary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json).map_err(|e| AnalysisError::io(path, e))?;
    log::info!("wrote JSON summary to {}", path.display());
    Ok(())
}

/// Fixed-width console table of group statistics.
pub fn format_group_table(stats: &GroupStats) -> String {
    let header = stats.group_by.join(" × ");
    let mut out = format!(
        "{:<32} {:>8} {:>12} {:>12}\n",
        header, "n", "mean", "median"
    );
    out.push_str(&format!("{}\n", "-".repeat(68)));
    for g in &stats.groups {
        let key = g
            .key
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" / ");
        out.push_str(&format!(
            "{:<32} {:>8} {:>12.4} {:>12.4}\n",
            key, g.count, g.mean, g.median
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use variantlab_stats::{Sample, welch_t_test};

    #[test]
    fn test_format_defined_test() {
        let t = welch_t_test(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 4.0, 6.0, 8.0, 10.0]);
        let line = format_test_line(&t);
        assert!(line.starts_with("T-Statistic: -1.897366596101027"));
        assert!(line.contains(", P-Value: 0.1075"));
        assert!(line.ends_with('\n'));
        assert_eq!(line.lines().count(), 1);
    }

    #[test]
    fn test_format_stat_integral_keeps_fraction() {
        assert_eq!(format_stat(0.0), "0.0");
        assert_eq!(format_stat(1.0), "1.0");
        assert_eq!(format_stat(-3.0), "-3.0");
        assert_eq!(format_stat(1e15), "1000000000000000.0");
    }

    #[test]
    fn test_format_stat_scientific_outside_positional_range() {
        assert_eq!(format_stat(3.790511431611724e-11), "3.790511431611724e-11");
        assert_eq!(format_stat(1e-5), "1e-05");
        assert_eq!(format_stat(-2.5e-7), "-2.5e-07");
        assert_eq!(format_stat(1e16), "1e+16");
        assert_eq!(format_stat(1.5e300), "1.5e+300");
    }

    #[test]
    fn test_format_stat_positional_range() {
        assert_eq!(format_stat(0.0001), "0.0001");
        assert_eq!(format_stat(0.00012345), "0.00012345");
        assert_eq!(format_stat(-7.687061147858074), "-7.687061147858074");
        assert_eq!(format_stat(f64::NAN), "nan");
    }

    #[test]
    fn test_format_line_identical_samples() {
        let t = welch_t_test(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]);
        assert_eq!(format_test_line(&t), "T-Statistic: 0.0, P-Value: 1.0\n");
    }

    #[test]
    fn test_format_line_tiny_p_value() {
        let outcome: TestOutcome = Ok(WelchTest {
            statistic: -7.687061147858074,
            p_value: 3.790511431611724e-11,
            df: 180.2,
            n_a: 100,
            n_b: 100,
            mean_a: 10.0,
            mean_b: 14.0,
        });
        assert_eq!(
            format_test_line(&outcome),
            "T-Statistic: -7.687061147858074, P-Value: 3.790511431611724e-11\n"
        );
    }

    #[test]
    fn test_format_undefined_test() {
        let outcome: TestOutcome = Err(TestError::EmptySample { sample: Sample::B });
        assert_eq!(
            format_test_line(&outcome),
            "T-Statistic: nan, P-Value: nan\nReason: sample B is empty\n"
        );
    }

    #[test]
    fn test_render_layout() {
        let ok = welch_t_test(&[1.0, 2.0], &[3.0, 5.0]);
        let bad: TestOutcome = Err(TestError::ZeroVariance { sample: Sample::A });
        let text = render_results(&ok, &ok, &bad);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Initial T-Test:");
        assert!(lines[1].starts_with("T-Statistic: "));
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "Cleaned Data T-Test:");
        assert_eq!(lines[5], "");
        assert_eq!(lines[6], "Pre-Experiment T-Test:");
        assert_eq!(lines[7], "T-Statistic: nan, P-Value: nan");
        assert_eq!(lines[8], "Reason: sample A has zero variance");
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_outcome_serializes_status() {
        let bad: TestOutcome = Err(TestError::InsufficientSamples {
            sample: Sample::A,
            got: 1,
        });
        let mut ser = serde_json::Serializer::new(Vec::new());
        serialize_outcome(&bad, &mut ser).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&ser.into_inner()).unwrap();
        assert_eq!(json["status"], "undefined");
        assert_eq!(json["error"]["kind"], "insufficient_samples");
    }
}
