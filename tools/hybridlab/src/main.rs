use std::time::Instant;

use clap::{Parser, Subcommand};

use hybridlab_exp::config::ExperimentConfig;
use hybridlab_exp::pipeline::{build_graph, Pipeline};
use hybridlab_flow::executor::{clean, Executor};

fn init_logger() {
    use env_logger::Builder;
    use std::io::Write;
    Builder::from_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();
}

/// Runs the hybrid cloud cost-study workflows
#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Runs a workflow, skipping tasks whose outputs are up to date
    Run {
        /// Path to YAML file with experiment configuration (built-in defaults if omitted)
        #[arg(short, long)]
        config: Option<String>,

        /// Workflow to run: scenarios, percentiles or all
        #[arg(short, long, default_value = "scenarios")]
        pipeline: String,

        /// Number of parallel jobs (default - use all available cores)
        #[arg(short, long, default_value_t = std::thread::available_parallelism().unwrap().get())]
        jobs: usize,
    },
    /// Removes generated artifacts, keeping the extracted input data
    Clean {
        /// Path to YAML file with experiment configuration (built-in defaults if omitted)
        #[arg(short, long)]
        config: Option<String>,

        /// Workflow whose artifacts are removed: scenarios, percentiles or all
        #[arg(short, long, default_value = "all")]
        pipeline: String,
    },
}

fn load_config(config: &Option<String>) -> ExperimentConfig {
    match config {
        Some(file_name) => ExperimentConfig::from_file(file_name),
        None => ExperimentConfig::default(),
    }
}

fn resolve_pipeline(name: &str) -> Pipeline {
    Pipeline::from_str(name).unwrap_or_else(|| panic!("Unknown pipeline {}", name))
}

fn main() {
    init_logger();
    let args = Args::parse();

    match args.command {
        Command::Run { config, pipeline, jobs } => {
            let config = load_config(&config);
            let mut graph = build_graph(&config, resolve_pipeline(&pipeline));
            let start = Instant::now();
            let stats = match Executor::new(jobs).run(&mut graph) {
                Ok(stats) => stats,
                Err(err) => {
                    eprintln!("error: {}", err);
                    std::process::exit(2);
                }
            };
            println!(
                "Processed {} tasks in {:.2?}: {} executed, {} up-to-date, {} failed, {} pruned",
                stats.total(),
                start.elapsed(),
                stats.executed,
                stats.up_to_date,
                stats.failed,
                stats.pruned
            );
            for result in stats.results.iter() {
                if let Some(error) = &result.error {
                    eprintln!("{}: {}", result.name, error);
                }
            }
            if !stats.success() {
                std::process::exit(1);
            }
        }
        Command::Clean { config, pipeline } => {
            let config = load_config(&config);
            let graph = build_graph(&config, resolve_pipeline(&pipeline));
            match clean(&graph) {
                Ok(removed) => println!("Removed {} files", removed),
                Err(err) => {
                    eprintln!("error: {}", err);
                    std::process::exit(2);
                }
            }
        }
    }
}
