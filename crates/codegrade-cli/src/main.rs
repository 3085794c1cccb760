//! Codegrade CLI
//!
//! Grades one submission against an evaluation specification and writes a
//! YAML grade report.

#![forbid(unsafe_code)]
#![allow(clippy::doc_markdown)]

use clap::Parser;
use codegrade_cli::{exit_code, init_logging, load_specification, run_evaluation};
use codegrade_engine::EvaluationPipeline;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "codegrade")]
#[command(about = "Automated single-function grading", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the evaluation specification YAML
    #[arg(short, long, value_name = "SPEC")]
    spec: PathBuf,

    /// Path to the submission file
    #[arg(short = 'u', long, value_name = "SUBMISSION")]
    submission: PathBuf,

    /// Run test cases on up to N worker threads
    #[arg(long, default_value = "1", value_name = "N")]
    jobs: usize,

    /// Directory for the grade report (defaults to the submission's directory)
    #[arg(long, value_name = "DIR")]
    report_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let spec = match load_specification(&cli.spec) {
        Ok(spec) => spec,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let pipeline = match EvaluationPipeline::new(&spec) {
        Ok(pipeline) => pipeline.with_jobs(cli.jobs),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    match run_evaluation(&pipeline, &cli.submission, cli.report_dir.as_deref()) {
        Ok(evaluation) => {
            print!("{}", evaluation.report.render_console());
            std::process::exit(exit_code(&evaluation));
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
