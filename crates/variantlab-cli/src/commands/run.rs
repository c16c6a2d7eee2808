use std::path::PathBuf;

use variantlab_core::pipeline::{BOX_PLOT_FILE, CLEANED_FILE, ORGANIZED_FILE, RESULTS_FILE};
use variantlab_core::report::format_group_table;
use variantlab_core::{AnalysisConfig, run_analysis};

pub struct RunArgs {
    pub data_dir: PathBuf,
    pub out_dir: PathBuf,
    pub summary: Option<PathBuf>,
    pub no_plot: bool,
}

impl Default for RunArgs {
    fn default() -> Self {
        let config = AnalysisConfig::default();
        Self {
            data_dir: config.data_dir,
            out_dir: config.out_dir,
            summary: None,
            no_plot: false,
        }
    }
}

impl From<RunArgs> for AnalysisConfig {
    fn from(args: RunArgs) -> Self {
        AnalysisConfig {
            data_dir: args.data_dir,
            out_dir: args.out_dir,
            summary_path: args.summary,
            render_plot: !args.no_plot,
        }
    }
}

pub fn run(args: RunArgs) {
    let config = AnalysisConfig::from(args);
    log::debug!("analysis config: {config:?}");

    println!(
        "🧪 Analyzing experiment data in {}...\n",
        config.data_dir.display()
    );

    let summary = match run_analysis(&config) {
        Ok(s) => s,
        Err(e) => super::fail(&e),
    };

    print!("{}", super::format_phase("Initial", &summary.initial));
    println!();
    print!("{}", super::format_bounds(&summary.outlier_bounds));
    println!("  removed {} row(s)\n", summary.rows_removed);
    print!("{}", super::format_phase("Cleaned", &summary.cleaned));
    println!();
    print!("{}", super::format_phase("Pre-experiment", &summary.pre_experiment));
    println!();
    println!("Cleaned activity by user type and gender");
    print!("{}", format_group_table(&summary.demographics));
    println!();

    println!("Outputs:");
    let mut outputs = vec![ORGANIZED_FILE, CLEANED_FILE];
    if config.render_plot {
        outputs.push(BOX_PLOT_FILE);
    }
    outputs.push(RESULTS_FILE);
    for file in outputs {
        println!("  {}", config.output(file).display());
    }
    if let Some(path) = &config.summary_path {
        println!("  {}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args_match_fixed_paths() {
        let config = AnalysisConfig::from(RunArgs::default());
        let fixed = AnalysisConfig::default();
        assert_eq!(config.data_dir, fixed.data_dir);
        assert_eq!(config.out_dir, fixed.out_dir);
        assert!(config.render_plot);
        assert!(config.summary_path.is_none());
    }

    #[test]
    fn test_no_plot_disables_rendering() {
        let config = AnalysisConfig::from(RunArgs {
            data_dir: PathBuf::from("in"),
            out_dir: PathBuf::from("out"),
            summary: Some(PathBuf::from("out/summary.json")),
            no_plot: true,
        });
        assert!(!config.render_plot);
        assert_eq!(config.output(RESULTS_FILE), PathBuf::from("out/analysis_results.txt"));
        assert_eq!(config.summary_path, Some(PathBuf::from("out/summary.json")));
    }
}
