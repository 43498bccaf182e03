//! Single-server queue simulation application.
#![warn(
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::default_trait_access)]

use std::fs::File;
use std::io::{self, BufWriter};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use clap::Parser;
use eyre::WrapErr;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use qsim::{
    CsvTrace, LogTrace, Metrics, Replications, Simulation, SimulationConfig, Statistics, Summary,
    TextTrace,
};

/// Runs a single-server queue simulation and reports its performance metrics.
#[derive(Parser)]
#[clap(version, author)]
struct Opt {
    /// Average number of arrivals per second.
    average_arrival_rate: f64,

    /// Average service time in seconds.
    average_service_time: f64,

    /// Sequence ID of the departure after which the measurements stop.
    #[clap(long, default_value = "50")]
    max_departures: usize,

    /// Random seed. If not given, the generator is seeded from entropy.
    #[clap(long)]
    seed: Option<u64>,

    /// Number of independent replications. Replication `i` uses seed `seed + i`.
    #[clap(long, default_value = "1")]
    replications: NonZeroUsize,

    /// Do not print the event trace to the standard output.
    #[clap(short, long)]
    quiet: bool,

    /// Store the event trace in this file in CSV format.
    #[clap(long)]
    trace_output: Option<PathBuf>,

    /// Print the results in JSON format.
    #[clap(long)]
    json: bool,

    /// Verbosity.
    #[clap(short, long, parse(from_occurrences))]
    verbose: i32,

    /// Write the logs to this file, replacing its contents.
    #[clap(long)]
    log_output: Option<PathBuf>,

    /// Do not log to the stderr.
    #[clap(long)]
    no_stderr: bool,
}

impl From<&Opt> for SimulationConfig {
    fn from(opt: &Opt) -> Self {
        let config = SimulationConfig::new(opt.average_arrival_rate, opt.average_service_time)
            .with_max_departures(opt.max_departures);
        match opt.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }
}

/// Results of a single run, printed with `--json`.
#[derive(Serialize)]
struct Report<'a> {
    config: &'a SimulationConfig,
    statistics: Statistics,
    metrics: Metrics,
}

/// Results of multiple replications, printed with `--json`.
#[derive(Serialize)]
struct ReplicationReport<'a> {
    config: &'a SimulationConfig,
    summary: Summary,
    replications: Vec<Metrics>,
}

fn print_header(config: &SimulationConfig) {
    println!(
        "Performance Metrics with average arrival rate of {:.2} and average service time of {:.2}:",
        config.arrival_rate, config.mean_service_time
    );
}

fn run_single(opt: &Opt, config: SimulationConfig) -> eyre::Result<()> {
    let mut simulation = Simulation::from_config(config)?;
    simulation.initialize()?;

    let stdout = io::stdout();
    let mut text = if opt.quiet || opt.json {
        None
    } else {
        Some(TextTrace::new(stdout.lock()))
    };
    let mut log_trace = if text.is_none() { Some(LogTrace) } else { None };
    let mut csv = match &opt.trace_output {
        Some(path) => Some(CsvTrace::new(BufWriter::new(
            File::create(path)
                .wrap_err_with(|| format!("unable to create trace file: {}", path.display()))?,
        ))),
        None => None,
    };

    simulation.run(&mut (&mut log_trace, (&mut text, &mut csv)))?;
    drop(text);
    if let Some(csv) = csv.as_mut() {
        csv.flush().wrap_err("unable to write trace file")?;
    }

    let metrics = simulation.metrics()?;
    let config = simulation.config();
    if opt.json {
        let report = Report {
            config,
            statistics: simulation.statistics(),
            metrics,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_header(config);
        println!("{}", metrics);
    }
    Ok(())
}

fn run_replications(opt: &Opt, config: SimulationConfig) -> eyre::Result<()> {
    if opt.trace_output.is_some() {
        log::warn!("Event trace is not recorded when running multiple replications");
    }
    let pb = if opt.quiet || opt.json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(opt.replications.get() as u64)
            .with_style(ProgressStyle::default_bar().template("{msg} {wide_bar} {pos}/{len}"))
    };
    pb.set_message("Replications");
    let replications = pb
        .wrap_iter(Replications::new(config.clone(), opt.replications.get()))
        .collect::<Result<Vec<_>, _>>()?;
    pb.finish_and_clear();
    let summary =
        Summary::from_metrics(&replications).ok_or_else(|| eyre::eyre!("no replications"))?;
    if opt.json {
        let report = ReplicationReport {
            config: &config,
            summary,
            replications,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_header(&config);
        println!("{}", summary);
    }
    Ok(())
}

fn open_log_file(path: &Path) -> io::Result<File> {
    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

/// Set up a logger based on the given user options.
fn set_up_logger(opt: &Opt) -> Result<(), fern::InitError> {
    let log_level = match opt.verbose {
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        3 => log::LevelFilter::Trace,
        _ => log::LevelFilter::Warn,
    };
    let dispatch = fern::Dispatch::new()
        .format(|out, message, record| out.finish(format_args!("[{}] {}", record.level(), message)))
        .level(log_level);
    let dispatch = if let Some(path) = &opt.log_output {
        dispatch.chain(open_log_file(path)?)
    } else {
        dispatch
    };
    let dispatch = if opt.no_stderr {
        dispatch
    } else {
        dispatch.chain(std::io::stderr())
    };
    dispatch.apply()?;
    Ok(())
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let opt = Opt::parse();
    set_up_logger(&opt)?;
    let config = SimulationConfig::from(&opt);
    config.validate()?;
    if opt.replications.get() > 1 {
        run_replications(&opt, config)
    } else {
        run_single(&opt, config)
    }
}
