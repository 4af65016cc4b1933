use std::path::{Path, PathBuf};

use time::macros::format_description;
use time::PrimitiveDateTime;

use super::constants::{CSV_EXTENSION, HDF5_EXTENSION};
use super::error::DataSetError;

/// One experiment run: the PsychoPy CSV and the iohub HDF5 recorded alongside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPair {
    pub csv_path: PathBuf,
    pub hdf5_path: PathBuf,
}

impl RunPair {
    /// Name of the run, taken from the CSV file stem
    pub fn name(&self) -> String {
        self.csv_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// PsychoPy appends the session start to the file name, e.g. `foobar_myexp_2021_Aug_09_1904`
    pub fn session_datetime(&self) -> Option<PrimitiveDateTime> {
        let name = self.name();
        let mut tokens: Vec<&str> = name.rsplitn(5, '_').take(4).collect();
        if tokens.len() < 4 {
            return None;
        }
        tokens.reverse();
        let format = format_description!("[year]_[month repr:short]_[day]_[hour][minute]");
        PrimitiveDateTime::parse(&tokens.join("_"), format).ok()
    }

    /// Combined size of both files in bytes
    pub fn size_bytes(&self) -> u64 {
        [&self.csv_path, &self.hdf5_path]
            .iter()
            .filter_map(|p| p.metadata().ok())
            .fold(0, |sum, meta| sum + meta.len())
    }
}

/// The collection of complete experiment runs found in a raw data directory.
///
/// Files are paired by sorted name, so every run must have exactly one CSV and one HDF5 file.
#[derive(Debug, Clone)]
pub struct DataSet {
    pairs: Vec<RunPair>,
    total_data_size_bytes: u64,
}

impl DataSet {
    /// Scan a directory and pair up its CSV and HDF5 files
    pub fn new(data_path: &Path) -> Result<Self, DataSetError> {
        let csv_files = Self::get_file_list(data_path, CSV_EXTENSION)?;
        let hdf5_files = Self::get_file_list(data_path, HDF5_EXTENSION)?;

        if csv_files.is_empty() || hdf5_files.is_empty() {
            return Err(DataSetError::MissingFiles(data_path.to_path_buf()));
        }
        if csv_files.len() != hdf5_files.len() {
            return Err(DataSetError::UnequalFileCounts(
                csv_files.len(),
                hdf5_files.len(),
            ));
        }

        let pairs: Vec<RunPair> = csv_files
            .into_iter()
            .zip(hdf5_files)
            .map(|(csv_path, hdf5_path)| RunPair {
                csv_path,
                hdf5_path,
            })
            .collect();

        for pair in pairs.iter() {
            let hdf5_name = pair
                .hdf5_path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            if !hdf5_name.starts_with(&pair.name()) {
                log::warn!(
                    "Paired {} with {}, but the names do not match. Check that both files come from the same run.",
                    pair.csv_path.display(),
                    pair.hdf5_path.display()
                );
            }
        }

        let total_data_size_bytes = pairs.iter().map(|p| p.size_bytes()).sum();

        Ok(Self {
            pairs,
            total_data_size_bytes,
        })
    }

    /// Every visible file in the directory whose name ends with the pattern, sorted by name
    fn get_file_list(parent_path: &Path, end_pattern: &str) -> Result<Vec<PathBuf>, DataSetError> {
        let mut file_list: Vec<PathBuf> = Vec::new();
        for item in parent_path.read_dir()? {
            let item_path = item?.path();
            if !item_path.is_file() {
                continue;
            }
            let Some(name) = item_path.file_name().map(|n| n.to_string_lossy().to_string())
            else {
                continue;
            };
            if !name.starts_with('.') && name.ends_with(end_pattern) {
                file_list.push(item_path);
            }
        }
        file_list.sort();
        Ok(file_list)
    }

    pub fn pairs(&self) -> &[RunPair] {
        &self.pairs
    }

    pub fn into_pairs(self) -> Vec<RunPair> {
        self.pairs
    }

    pub fn get_total_data_size(&self) -> u64 {
        self.total_data_size_bytes
    }
}
