//! # et_merger_cli
//!
//! Part of the et_merger crate family.
//!
//! Command line application which merges PsychoPy experiment CSVs with their iohub HDF5
//! eyetracker recordings.
//!
//! ## Use
//!
//! Make a template configuration, edit it, then run the merger with it
//!
//! ```bash
//! et_merger_cli -p config.yml new
//! et_merger_cli -p config.yml
//! ```
//!
//! The input and output directories of the configuration can be overridden with `-i/--input`
//! and `-o/--output`. Everything logged to the terminal is also written to `et_merger.log`.
use clap::{Arg, Command};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use indicatif_log_bridge::LogWrapper;
use simplelog::{CombinedLogger, SharedLogger, TermLogger, WriteLogger};
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;

use libet_merger::config::Config;
use libet_merger::data_set::DataSet;
use libet_merger::process::{create_subsets, process_subset};
use libet_merger::worker_status::WorkerStatus;

const LOG_FILE: &str = "et_merger.log";

/// Log to the terminal and to the log file
fn create_logger() -> CombinedLogger {
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    loggers.push(TermLogger::new(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    ));
    match File::create(LOG_FILE) {
        Ok(file) => loggers.push(WriteLogger::new(
            simplelog::LevelFilter::Info,
            simplelog::Config::default(),
            file,
        )),
        Err(e) => eprintln!("Could not create log file {LOG_FILE}: {e}"),
    }
    *CombinedLogger::new(loggers)
}

fn main() -> ExitCode {
    // Create a cli
    let matches = Command::new("et_merger_cli")
        .about("Merge PsychoPy experiment CSV files with iohub eyetracker HDF5 files")
        .arg_required_else_help(true)
        .subcommand(Command::new("new").about("Make a template configuration yaml file"))
        .arg(
            Arg::new("path")
                .short('p')
                .long("path")
                .required(true)
                .help("Path to the configuration file"),
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .help("Raw experiment output directory, overrides the configuration"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Directory to save combined data to, overrides the configuration"),
        )
        .get_matches();

    // Initialize feedback
    let pb_manager = MultiProgress::new();
    LogWrapper::new(pb_manager.clone(), create_logger())
        .try_init()
        .expect("Could not create logging/progress!");
    log::set_max_level(log::LevelFilter::Info);

    // Parse the cli
    let config_path = PathBuf::from(matches.get_one::<String>("path").expect("We require args"));

    if let Some(("new", _)) = matches.subcommand() {
        log::info!(
            "Making a template config at {}...",
            config_path.to_string_lossy()
        );
        if let Err(e) = Config::default().write_config_file(&config_path) {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
        log::info!("Done.");
        return ExitCode::SUCCESS;
    }

    // Load our config
    log::info!("Loading config from {}...", config_path.to_string_lossy());
    let mut config = match Config::read_config_file(&config_path) {
        Ok(c) => c,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(input) = matches.get_one::<String>("input") {
        config.input_path = PathBuf::from(input);
    }
    if let Some(output) = matches.get_one::<String>("output") {
        config.output_path = PathBuf::from(output);
    }
    log::info!("Config successfully loaded.");
    log::info!("Using data from: {}", config.input_path.to_string_lossy());
    log::info!(
        "Exporting combined data to: {}",
        config.output_path.to_string_lossy()
    );
    log::info!("Trial start column: {}", config.trial_start_column);
    log::info!("Trial start message pattern: {}", config.trial_start_pattern);
    log::info!("Number of workers: {}", config.n_threads);

    if !config.are_paths_valid() {
        log::warn!(
            "You must specify valid directories before running. Set input_path and output_path in the config or use --input and --output."
        );
        return ExitCode::FAILURE;
    }
    if !config.is_n_threads_valid() {
        log::error!("n_threads must be at least 1, got {}", config.n_threads);
        return ExitCode::FAILURE;
    }

    let data_set = match DataSet::new(&config.input_path) {
        Ok(d) => d,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    log::info!("Found {} runs to merge.", data_set.pairs().len());

    // Setup the progress bars and spawn the workers
    let style = ProgressStyle::with_template("{prefix} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    let (tx, rx) = mpsc::channel::<WorkerStatus>();
    let mut bars: Vec<ProgressBar> = Vec::new();
    let mut workers = Vec::new();
    for subset in create_subsets(&config, data_set.into_pairs()) {
        // Dont make empty workers
        if subset.is_empty() {
            continue;
        }
        let worker_id = bars.len();
        let bar = pb_manager.add(ProgressBar::new(100));
        bar.set_style(style.clone());
        bar.set_prefix(format!("Worker {worker_id}"));
        bars.push(bar);

        let conf = config.clone();
        let tx = tx.clone();
        workers.push(std::thread::spawn(move || {
            process_subset(conf, tx, worker_id, subset)
        }));
    }
    // Only the workers hold senders now, so the loop below ends when they all finish
    drop(tx);

    while let Ok(status) = rx.recv() {
        if let Some(bar) = bars.get(status.worker_id) {
            bar.set_position((status.progress * 100.0) as u64);
            bar.set_message(format!("{} {}", status.stage.label(), status.run_name));
        }
    }

    let mut n_failed = 0;
    for handle in workers {
        match handle.join() {
            Ok(Ok(())) => (),
            Ok(Err(e)) => {
                n_failed += 1;
                log::error!("Merging failed with error: {e}");
            }
            Err(_) => {
                n_failed += 1;
                log::error!("Failed to join merging task!");
            }
        }
    }
    for bar in bars.iter() {
        bar.finish();
    }

    if n_failed > 0 {
        log::error!("There was an error! Check the log file {LOG_FILE} for more information.");
        ExitCode::FAILURE
    } else {
        log::info!("Reformatting done!");
        ExitCode::SUCCESS
    }
}
