pub mod describe;
pub mod run;

use variantlab_core::report::{format_group_table, format_test_line};
use variantlab_core::{AnalysisError, IqrBounds, PhaseReport};

/// Significance level used for the console verdict. The report files carry
/// raw p-values only.
pub const ALPHA: f64 = 0.05;

/// Print the error and exit with status 1.
pub fn fail(err: &AnalysisError) -> ! {
    eprintln!("error: {err}");
    std::process::exit(1);
}

/// Heading, group table, test line and verdict for one comparison.
pub fn format_phase(title: &str, report: &PhaseReport) -> String {
    let mut out = format!("{title} ({} rows)\n", report.rows);
    out.push_str(&format_group_table(&report.group_stats));
    out.push_str(&format_test_line(&report.test));
    match &report.test {
        Ok(t) if t.is_significant(ALPHA) => out.push_str(&format!(
            "  → significant at α={ALPHA} (df={:.1}, mean {:.3} vs {:.3})\n",
            t.df, t.mean_a, t.mean_b
        )),
        Ok(t) => out.push_str(&format!(
            "  → not significant at α={ALPHA} (df={:.1})\n",
            t.df
        )),
        Err(_) => {}
    }
    out
}

pub fn format_bounds(bounds: &IqrBounds) -> String {
    format!(
        "IQR bounds: Q1={:.3} Q3={:.3} IQR={:.3} → keep [{:.3}, {:.3}]\n",
        bounds.q1, bounds.q3, bounds.iqr, bounds.lower, bounds.upper
    )
}
