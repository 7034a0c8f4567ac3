//! Build graph construction for the experiment workflows.

use itertools::Itertools;

use hybridlab_flow::actions::archive::{GunzipFile, UnpackArchive};
use hybridlab_flow::graph::FlowGraph;

use crate::config::ExperimentConfig;
use crate::layout;
use crate::scenario::percentile_scenario;
use crate::summary::{PivotCsv, StackCsv};
use crate::tools;

/// Workflow selector.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum Pipeline {
    /// Static scenario study: optimize, simulate, summarize.
    Scenarios,
    /// Percentile study: resample workloads, optimize, summarize.
    Percentiles,
    /// Union of both workflows.
    All,
}

impl Pipeline {
    pub fn from_str(name: &str) -> Option<Self> {
        match name {
            "scenarios" => Some(Pipeline::Scenarios),
            "percentiles" => Some(Pipeline::Percentiles),
            "all" => Some(Pipeline::All),
            _ => None,
        }
    }
}

/// Builds the task graph of the selected workflow. Both workflows share the
/// unpack stage and the artifact tree, so `clean` over any pipeline never
/// touches the extracted input data.
pub fn build_graph(config: &ExperimentConfig, pipeline: Pipeline) -> FlowGraph {
    let mut graph = FlowGraph::new();
    add_unpack_tasks(&mut graph, config);
    if pipeline == Pipeline::Scenarios || pipeline == Pipeline::All {
        add_scenario_tasks(&mut graph, config);
    }
    if pipeline == Pipeline::Percentiles || pipeline == Pipeline::All {
        add_percentile_tasks(&mut graph, config);
    }
    graph
}

/// Methods whose per-second traces must come out of the workload archive.
fn unpacked_methods(config: &ExperimentConfig) -> Vec<String> {
    let mut methods = config.methods.clone();
    if !methods.contains(&config.resample_method) {
        methods.push(config.resample_method.clone());
    }
    methods
}

fn add_unpack_tasks(graph: &mut FlowGraph, config: &ExperimentConfig) {
    let archive = config.root.join(&config.workload_archive);
    let task = graph.add_task(
        "unpack-workloads",
        Box::new(UnpackArchive::new(&archive, layout::workloads_dir(config))),
    );
    graph.add_task_input(task, &archive);
    for app in 0..config.apps {
        graph.add_task_output(task, layout::hour_file(config, app));
    }
    for method in unpacked_methods(config) {
        for app in 0..config.apps {
            graph.add_task_output(task, layout::second_file(config, &method, app));
        }
    }
    graph.keep_on_clean(task);

    let ec2_archive = config.root.join(&config.ec2_data_archive);
    let task = graph.add_task(
        "unpack-ec2-data",
        Box::new(GunzipFile::new(&ec2_archive, layout::ec2_data_file(config))),
    );
    graph.add_task_input(task, &ec2_archive);
    graph.add_task_output(task, layout::ec2_data_file(config));
    graph.keep_on_clean(task);

    let s3_archive = config.root.join(&config.s3_data_archive);
    let task = graph.add_task(
        "unpack-s3-data",
        Box::new(GunzipFile::new(&s3_archive, layout::s3_data_file(config))),
    );
    graph.add_task_input(task, &s3_archive);
    graph.add_task_output(task, layout::s3_data_file(config));
    graph.keep_on_clean(task);
}

fn add_scenario_tasks(graph: &mut FlowGraph, config: &ExperimentConfig) {
    for scenario in config.scenarios.iter() {
        let task = graph.add_task(
            &format!("optimize-{}", scenario.code),
            Box::new(tools::optimizer(config, scenario, None)),
        );
        for app in 0..config.apps {
            graph.add_task_input(task, layout::hour_file(config, app));
        }
        graph.add_task_input(task, layout::ec2_data_file(config));
        graph.add_task_input(task, layout::s3_data_file(config));
        graph.add_task_output(task, layout::solution_file(config, &scenario.code));
        graph.add_task_output(task, layout::opt_result_file(config, &scenario.code));
    }

    for (scenario, method) in config.scenarios.iter().cartesian_product(config.methods.iter()) {
        let task = graph.add_task(
            &format!("simulate-{}-{}", scenario.code, method),
            Box::new(tools::simulator(config, &scenario.code, method)),
        );
        graph.add_task_input(task, layout::solution_file(config, &scenario.code));
        for app in 0..config.apps {
            graph.add_task_input(task, layout::second_file(config, method, app));
        }
        graph.add_task_output(task, layout::sim_result_file(config, &scenario.code, method));
        graph.add_task_output(task, layout::sim_log_file(config, &scenario.code, method));
    }

    let task = graph.add_task("summarize-optimizations", Box::new(StackCsv::new("scenario")));
    for scenario in config.scenarios.iter() {
        graph.add_task_input(task, layout::opt_result_file(config, &scenario.code));
    }
    graph.add_task_output(task, layout::optimization_summary(config));

    let task = graph.add_task("summarize-simulations", Box::new(PivotCsv::new("parameter")));
    for (scenario, method) in config.scenarios.iter().cartesian_product(config.methods.iter()) {
        graph.add_task_input(task, layout::sim_result_file(config, &scenario.code, method));
    }
    graph.add_task_output(task, layout::simulation_summary(config));
}

fn add_percentile_tasks(graph: &mut FlowGraph, config: &ExperimentConfig) {
    for &percentile in config.percentiles.iter() {
        let scenario = percentile_scenario(percentile);
        for app in 0..config.apps {
            let task = graph.add_task(
                &format!("resample-{}-wl{}", scenario.code, app),
                Box::new(tools::resampler(config, percentile, &scenario.code, app)),
            );
            graph.add_task_input(task, layout::second_file(config, &config.resample_method, app));
            graph.add_task_output(task, layout::resampled_file(config, &scenario.code, app));
        }
        let task = graph.add_task(
            &format!("optimize-{}", scenario.code),
            Box::new(tools::optimizer(
                config,
                &scenario,
                Some(&layout::resampled_dir_rel(&scenario.code)),
            )),
        );
        for app in 0..config.apps {
            graph.add_task_input(task, layout::resampled_file(config, &scenario.code, app));
        }
        graph.add_task_input(task, layout::ec2_data_file(config));
        graph.add_task_input(task, layout::s3_data_file(config));
        graph.add_task_output(task, layout::solution_file(config, &scenario.code));
        graph.add_task_output(task, layout::opt_result_file(config, &scenario.code));
    }

    let task = graph.add_task("summarize-percentiles", Box::new(StackCsv::new("scenario")));
    for &percentile in config.percentiles.iter() {
        graph.add_task_input(task, layout::opt_result_file(config, &percentile_scenario(percentile).code));
    }
    graph.add_task_output(task, layout::percentile_summary(config));
}
