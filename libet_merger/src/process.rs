use std::sync::mpsc::Sender;

use super::combined::CombinedTable;
use super::config::Config;
use super::csv_writer::CsvWriter;
use super::data_set::{DataSet, RunPair};
use super::error::ProcessorError;
use super::experiment_csv::ExperimentData;
use super::iohub_file::IohubFile;
use super::worker_status::{Stage, WorkerStatus};

/// Merge a single experiment run.
///
/// Reads both input files, aligns and merges them, and writes the combined CSV (and summary)
/// to the output directory. Progress is reported through the sender.
pub fn process_pair(
    config: &Config,
    pair: &RunPair,
    tx: &Sender<WorkerStatus>,
    worker_id: &usize,
) -> Result<(), ProcessorError> {
    let run_name = pair.name();
    let pattern = config.trial_start_regex()?;
    let output_path = config.get_output_file_name(&pair.csv_path)?;

    tx.send(WorkerStatus::new(0.0, &run_name, *worker_id, Stage::Reading))?;
    log::info!(
        "Reading {} and {} ({})",
        pair.csv_path.display(),
        pair.hdf5_path.display(),
        human_bytes::human_bytes(pair.size_bytes() as f64)
    );
    let (trace, messages) = {
        // Keep the HDF5 file open only as long as we need it
        let iohub = IohubFile::new(&pair.hdf5_path)?;
        (iohub.read_eye_trace()?, iohub.read_messages()?)
    };
    tx.send(WorkerStatus::new(0.3, &run_name, *worker_id, Stage::Reading))?;
    let experiment = ExperimentData::new(&pair.csv_path, config)?;

    tx.send(WorkerStatus::new(0.5, &run_name, *worker_id, Stage::Merging))?;
    let (table, summary) = CombinedTable::new(
        trace,
        &messages,
        experiment,
        &pattern,
        config.eye_columns.as_deref(),
    )?;
    log::info!(
        "Merged {} {:?} samples, {} messages and {} trials",
        summary.n_samples,
        summary.eye_sample_kind,
        summary.n_messages,
        summary.n_experiment_trials
    );
    if summary.n_replaced_messages > 0 {
        log::warn!(
            "{} messages shared an eye sample with a later message and were dropped",
            summary.n_replaced_messages
        );
    }

    tx.send(WorkerStatus::new(0.7, &run_name, *worker_id, Stage::Writing))?;
    let mut writer = CsvWriter::new(&output_path)?;
    writer.write_table(&table)?;
    if config.write_summary {
        writer.write_summary(pair, &summary)?;
    }
    writer.close()?;

    tx.send(WorkerStatus::new(1.0, &run_name, *worker_id, Stage::Done))?;
    Ok(())
}

/// The function to be called by a separate thread.
/// Finds every run in the input directory and merges them one after the other
pub fn process(
    config: Config,
    tx: Sender<WorkerStatus>,
    worker_id: usize,
) -> Result<(), ProcessorError> {
    let data_set = DataSet::new(&config.input_path)?;
    log::info!(
        "Found {} runs ({}) in {}",
        data_set.pairs().len(),
        human_bytes::human_bytes(data_set.get_total_data_size() as f64),
        config.input_path.display()
    );
    process_subset(config, tx, worker_id, data_set.into_pairs())
}

/// Process a subset of runs
pub fn process_subset(
    config: Config,
    tx: Sender<WorkerStatus>,
    worker_id: usize,
    subset: Vec<RunPair>,
) -> Result<(), ProcessorError> {
    for pair in subset.iter() {
        log::info!("Processing run {}...", pair.name());
        process_pair(&config, pair, &tx, &worker_id)?;
        log::info!("Finished processing run {}.", pair.name());
    }
    Ok(())
}

/// Divide the runs in to a set of subsets (per thread/worker)
pub fn create_subsets(config: &Config, pairs: Vec<RunPair>) -> Vec<Vec<RunPair>> {
    let n_subsets = config.n_threads.max(1) as usize;
    let mut subsets: Vec<Vec<RunPair>> = vec![Vec::new(); n_subsets];

    for (idx, pair) in pairs.into_iter().enumerate() {
        subsets[idx % n_subsets].push(pair)
    }

    subsets
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn pair(name: &str) -> RunPair {
        RunPair {
            csv_path: PathBuf::from(format!("{name}.csv")),
            hdf5_path: PathBuf::from(format!("{name}_hdf5.hdf5")),
        }
    }

    #[test]
    fn subsets_are_round_robin() {
        let config = Config {
            n_threads: 2,
            ..Default::default()
        };
        let subsets = create_subsets(&config, vec![pair("a"), pair("b"), pair("c")]);
        assert_eq!(subsets.len(), 2);
        assert_eq!(subsets[0], vec![pair("a"), pair("c")]);
        assert_eq!(subsets[1], vec![pair("b")]);
    }

    #[test]
    fn more_workers_than_runs_leaves_empty_subsets() {
        let config = Config {
            n_threads: 3,
            ..Default::default()
        };
        let subsets = create_subsets(&config, vec![pair("a")]);
        assert_eq!(subsets.iter().filter(|s| !s.is_empty()).count(), 1);
    }

    #[test]
    fn missing_input_directory_fails_early() {
        let (tx, _rx) = std::sync::mpsc::channel();
        let config = Config {
            input_path: PathBuf::from("/definitely/not/a/data/dir"),
            ..Default::default()
        };
        assert!(matches!(
            process(config, tx, 0),
            Err(ProcessorError::DataSetError(_))
        ));
    }
}
