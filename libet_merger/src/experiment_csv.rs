use fxhash::FxHashMap;
use std::path::{Path, PathBuf};

use super::config::Config;
use super::error::ExperimentCsvError;

/// Cell contents PsychoPy (and pandas) treat as a missing value
const MISSING_VALUES: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing(cell: &str) -> bool {
    MISSING_VALUES.contains(&cell.trim())
}

/// One experiment trial: a CSV row that recorded a trial start time
#[derive(Debug, Clone, PartialEq)]
pub struct Trial {
    pub start_time: f64,
    /// Values of the core columns, in `ExperimentData::columns` order. Missing values are empty
    pub cells: Vec<String>,
}

/// The parts of a PsychoPy experiment CSV we merge into the eyetracker data.
///
/// PsychoPy writes one row per loop iteration; only rows with a trial start time are trials.
#[derive(Debug, Clone)]
pub struct ExperimentData {
    pub path: PathBuf,
    pub columns: Vec<String>,
    pub trials: Vec<Trial>,
}

impl ExperimentData {
    /// Read an experiment CSV, checking that every column the config requires is present
    pub fn new(path: &Path, config: &Config) -> Result<Self, ExperimentCsvError> {
        if !path.exists() {
            return Err(ExperimentCsvError::BadFilePath(path.to_path_buf()));
        }
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(true)
            .from_path(path)?;

        let header_map: FxHashMap<String, usize> = reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.trim().to_string(), idx))
            .collect();

        for column in config.required_columns() {
            if !header_map.contains_key(&column) {
                return Err(ExperimentCsvError::MissingColumn {
                    path: path.to_path_buf(),
                    column,
                });
            }
        }
        let start_idx = header_map[&config.trial_start_column];
        let core_idx: Vec<usize> = config
            .core_columns
            .iter()
            .map(|c| header_map[c])
            .collect();

        let mut trials = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let start_cell = record.get(start_idx).unwrap_or("").trim();
            if is_missing(start_cell) {
                continue;
            }
            let start_time = match start_cell.parse::<f64>() {
                Ok(t) if !t.is_nan() => t,
                Ok(_) => continue,
                Err(_) => {
                    return Err(ExperimentCsvError::BadValue {
                        path: path.to_path_buf(),
                        row: row + 1,
                        column: config.trial_start_column.clone(),
                        value: start_cell.to_string(),
                    })
                }
            };
            let cells = core_idx
                .iter()
                .map(|idx| {
                    let cell = record.get(*idx).unwrap_or("");
                    if is_missing(cell) {
                        String::new()
                    } else {
                        cell.to_string()
                    }
                })
                .collect();
            trials.push(Trial { start_time, cells });
        }

        log::info!("Found {} trials in {}", trials.len(), path.display());

        Ok(Self {
            path: path.to_path_buf(),
            columns: config.core_columns.clone(),
            trials,
        })
    }

    pub fn trial_start_times(&self) -> Vec<f64> {
        self.trials.iter().map(|t| t.start_time).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> Config {
        Config {
            core_columns: vec![String::from("audio_filepath"), String::from("audio_volume")],
            ..Default::default()
        }
    }

    fn write_csv(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p01.csv");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn only_rows_with_start_time_are_trials() {
        let (_dir, path) = write_csv(
            "participant,trial_global_start_time,audio_filepath,audio_volume\n\
             p01,,,\n\
             p01,12.5,sounds/a.wav,0.8\n\
             p01,NaN,sounds/x.wav,0.1\n\
             p01,20.25,sounds/b.wav,\n",
        );
        let data = ExperimentData::new(&path, &small_config()).unwrap();
        assert_eq!(data.trial_start_times(), vec![12.5, 20.25]);
        assert_eq!(data.trials[0].cells, vec!["sounds/a.wav", "0.8"]);
        assert_eq!(data.trials[1].cells, vec!["sounds/b.wav", ""]);
    }

    #[test]
    fn pandas_missing_tokens_are_skipped() {
        let (_dir, path) = write_csv(
            "trial_global_start_time,audio_filepath,audio_volume\n\
             n/a,x.wav,1\n\
             <NA>,y.wav,1\n\
             -nan,z.wav,1\n\
             3.5,a.wav,n/a\n",
        );
        let data = ExperimentData::new(&path, &small_config()).unwrap();
        assert_eq!(data.trial_start_times(), vec![3.5]);
        assert_eq!(data.trials[0].cells, vec!["a.wav", ""]);
    }

    #[test]
    fn short_rows_are_tolerated() {
        let (_dir, path) = write_csv(
            "trial_global_start_time,audio_filepath,audio_volume\n\
             1.0,a.wav\n",
        );
        let data = ExperimentData::new(&path, &small_config()).unwrap();
        assert_eq!(data.trials[0].cells, vec!["a.wav", ""]);
    }

    #[test]
    fn missing_column_names_the_column() {
        let (_dir, path) = write_csv("trial_global_start_time,audio_filepath\n1.0,a.wav\n");
        match ExperimentData::new(&path, &small_config()) {
            Err(ExperimentCsvError::MissingColumn { column, .. }) => {
                assert_eq!(column, "audio_volume")
            }
            other => panic!("expected a missing column, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_start_time() {
        let (_dir, path) = write_csv(
            "trial_global_start_time,audio_filepath,audio_volume\n\
             1.0,a.wav,1\n\
             soon,b.wav,1\n",
        );
        match ExperimentData::new(&path, &small_config()) {
            Err(ExperimentCsvError::BadValue { row, value, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(value, "soon");
            }
            other => panic!("expected a bad value, got {other:?}"),
        }
    }

    #[test]
    fn missing_file() {
        let result = ExperimentData::new(Path::new("/not/here.csv"), &small_config());
        assert!(matches!(result, Err(ExperimentCsvError::BadFilePath(_))));
    }
}
