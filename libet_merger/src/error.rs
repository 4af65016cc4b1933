use std::path::PathBuf;
use thiserror::Error;

use super::worker_status::WorkerStatus;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration as file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Config failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Config failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
    #[error("Config has an invalid trial start message pattern: {0}")]
    BadPattern(#[from] regex::Error),
}

#[derive(Debug, Error)]
pub enum DataSetError {
    #[error("DataSet failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("The data directory {0:?} doesn't contain both CSV and HDF5 files. Please check to make sure that you've selected the correct data directory.")]
    MissingFiles(PathBuf),
    #[error(
        "The selected data directory contains an unequal number of CSV files ({0}) and HDF5 files ({1}). \
        This means that for at least one experiment there is only core PsychoPy output, or only eyetracker output. \
        The most likely reason is that an experiment was aborted before it could finish, so no HDF5 file was saved. \
        Move incomplete data sets to a separate directory and run the merger again."
    )]
    UnequalFileCounts(usize, usize),
}

#[derive(Debug, Error)]
pub enum IohubFileError {
    #[error("HDF5 file {0:?} appears to be corrupt and cannot be processed (original error: {1})")]
    Corrupt(PathBuf, hdf5::Error),
    #[error("HDF5 file {0:?} appears to be corrupt and cannot be processed: no binocular or monocular eye sample events were found")]
    NoEyeSamples(PathBuf),
    #[error("HDF5 file {0:?} contains an eye sample dataset without any samples")]
    EmptyEyeData(PathBuf),
    #[error("HDF5 file {0:?} is missing the dataset {1}: {2}")]
    MissingDataset(PathBuf, String, hdf5::Error),
    #[error("IohubFile failed due to HDF5 error: {0}")]
    HDF5Error(#[from] hdf5::Error),
}

#[derive(Debug, Error)]
pub enum ExperimentCsvError {
    #[error("Could not open experiment CSV because file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("ExperimentCsv failed to parse CSV: {0}")]
    CsvError(#[from] csv::Error),
    #[error(
        "Missing column in CSV file {path:?}: could not find required column '{column}'. \
        Please double-check the data. If it's not possible to correct the CSV file, \
        move it and its corresponding HDF5 file to another directory and run the merger again."
    )]
    MissingColumn { path: PathBuf, column: String },
    #[error("CSV file {path:?} has a non-numeric value '{value}' in column '{column}' on data row {row}")]
    BadValue {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },
}

#[derive(Debug, Clone, Error)]
pub enum AlignmentError {
    #[error("No trial start messages matching the configured pattern were found in the eyetracker data")]
    NoEyetrackerTrialStarts,
    #[error("No trial start times were found in the experiment CSV")]
    NoExperimentTrialStarts,
}

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("Requested eye sample column '{0}' does not exist in the eyetracker data")]
    UnknownEyeColumn(String),
    #[error("The experiment CSV has {0} trials, but the eyetracker data only has {1} trial start messages")]
    TrialCountMismatch(usize, usize),
    #[error("Merge failed due to alignment error: {0}")]
    AlignmentError(#[from] AlignmentError),
}

#[derive(Debug, Error)]
pub enum CsvWriterError {
    #[error("CsvWriter failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("CsvWriter failed to write CSV: {0}")]
    CsvError(#[from] csv::Error),
    #[error("CsvWriter failed to convert to yaml: {0}")]
    ParsingError(#[from] serde_yaml::Error),
    #[error("CsvWriter failed to format the session time: {0}")]
    TimeFormatError(#[from] time::error::Format),
}

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("Processor failed due to Config error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("{0}")]
    DataSetError(#[from] DataSetError),
    #[error("{0}")]
    IohubError(#[from] IohubFileError),
    #[error("{0}")]
    ExperimentError(#[from] ExperimentCsvError),
    #[error("Processor failed due to Merge error: {0}")]
    MergeError(#[from] MergeError),
    #[error("Processor failed due to CsvWriter error: {0}")]
    WriterError(#[from] CsvWriterError),
    #[error("Processor failed due to Send error: {0}")]
    SendError(#[from] std::sync::mpsc::SendError<WorkerStatus>),
}
