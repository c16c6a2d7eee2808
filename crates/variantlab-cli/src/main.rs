//! CLI for variantlab: compare control and treatment activity from CSV exports.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "variantlab")]
#[command(about = "variantlab: A/B experiment analysis over user activity exports")]
#[command(version = variantlab_core::VERSION)]
struct Cli {
    /// Defaults to `run` with the fixed Data/ and ./ paths.
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis: merge, clean, t-test, plot and write every output file
    Run {
        /// Directory holding the t1..t4 CSV inputs
        #[arg(long, default_value = "Data")]
        data_dir: PathBuf,

        /// Directory the CSV, PNG and text outputs are written to
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Also write a JSON summary of every statistic to this path
        #[arg(long)]
        summary: Option<PathBuf>,

        /// Skip rendering box_plot.png
        #[arg(long)]
        no_plot: bool,
    },

    /// Merge activity with variants and print group stats, IQR bounds and
    /// the Welch test without writing any file
    Describe {
        /// Directory holding the t1..t4 CSV inputs
        #[arg(long, default_value = "Data")]
        data_dir: PathBuf,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        None => commands::run::run(commands::run::RunArgs::default()),
        Some(Commands::Run {
            data_dir,
            out_dir,
            summary,
            no_plot,
        }) => commands::run::run(commands::run::RunArgs {
            data_dir,
            out_dir,
            summary,
            no_plot,
        }),
        Some(Commands::Describe { data_dir }) => commands::describe::run(&data_dir),
    }
}
