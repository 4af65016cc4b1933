//! # et_merger
//!
//! et_merger combines the output of PsychoPy eyetracking experiments. Every experiment run
//! produces a CSV file (the "core" PsychoPy data: stimulus onsets, file names, positions) and
//! an HDF5 file written by iohub (the eyetracker samples and the messages the experiment sent
//! to iohub). et_merger aligns the two clocks and writes one combined CSV per run.
//!
//! ## Installation
//!
//! The only method of install is from source.
//!
//! ### HDF5
//!
//! Before building et_merger, HDF5 must be installed. Typically this will be installed
//! using a package manager (homebrew, apt, etc), and the Rust libraries will auto detect the
//! location of the HDF install. If a custom install is needed, write the following snippet
//! into `.cargo/config.toml` in the repository:
//!
//! ```toml
//! [env]
//! HDF5_DIR="/path/to/my/hdf5/install/"
//!
//! [build]
//! rustflags="-C link-args=-Wl,-rpath,/path/to/my/hdf5/install/lib"
//! ```
//!
//! ### Building & Install
//!
//! To build and install the CLI use `cargo install --path ./et_merger_cli` from the top level
//! of the repository.
//!
//! ## Input
//!
//! The input directory holds the raw PsychoPy `data` output. Runs are identified by pairing
//! the sorted CSV files with the sorted HDF5 files, e.g.
//!
//! ```text
//! data/
//! |---- foobar_myexp_2021_Aug_09_1904.csv
//! |---- foobar_myexp_2021_Aug_09_1904_hdf5.hdf5
//! ```
//!
//! The directory must contain the same number of CSV and HDF5 files. Runs that were aborted
//! before iohub saved its file must be moved elsewhere first.
//!
//! ## Configuration
//!
//! The YAML configuration shared by the library and the CLI:
//!
//! ```yml
//! input_path: /path/to/data
//! output_path: /path/to/output
//! core_columns:
//! - att_grab_start_time_intended
//! - ...
//! trial_start_column: trial_global_start_time
//! trial_start_pattern: exp1 trial \d+ start
//! eye_columns: null
//! write_summary: true
//! n_threads: 1
//! ```
//!
//! `core_columns` are copied from the experiment CSV. `trial_start_column` marks the CSV rows
//! that are trials, `trial_start_pattern` (a regex matched against the start of the message)
//! marks the iohub messages that are trial starts. `eye_columns: null` exports every eye
//! sample column.
//!
//! ## Output
//!
//! ```text
//! output/
//! |---- foobar_myexp_2021_Aug_09_1904_combined.csv - one row per eye sample
//! |---- foobar_myexp_2021_Aug_09_1904_combined.yml - files, sizes, offsets, counts
//! ```
//!
//! The combined CSV holds the eye sample columns (with `time` moved onto the experiment
//! clock), a `message` column and the core columns. Core data only appears on the rows where
//! a trial start message was recorded.
pub mod alignment;
pub mod combined;
pub mod config;
pub mod constants;
pub mod csv_writer;
pub mod data_set;
pub mod error;
pub mod experiment_csv;
pub mod eye_sample;
pub mod iohub_file;
pub mod process;
pub mod worker_status;
