use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::constants::{
    COMBINED_SUFFIX, CSV_EXTENSION, DEFAULT_CORE_COLUMNS, DEFAULT_TRIAL_START_COLUMN,
    DEFAULT_TRIAL_START_PATTERN,
};
use super::error::ConfigError;

/// Structure representing the application configuration. Contains pathing and the column schema
/// Configs are seralizable and deserializable to YAML using serde and serde_yaml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub core_columns: Vec<String>,
    pub trial_start_column: String,
    pub trial_start_pattern: String,
    pub eye_columns: Option<Vec<String>>,
    pub write_summary: bool,
    pub n_threads: i32,
}

impl Default for Config {
    /// Generate a new Config object. Paths will be invalid, the schema is the standard one
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("None"),
            output_path: PathBuf::from("None"),
            core_columns: DEFAULT_CORE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            trial_start_column: String::from(DEFAULT_TRIAL_START_COLUMN),
            trial_start_pattern: String::from(DEFAULT_TRIAL_START_PATTERN),
            eye_columns: None,
            write_summary: true,
            n_threads: 1,
        }
    }
}

impl Config {
    /// Read the configuration in a YAML file
    /// Returns a Config if successful
    pub fn read_config_file(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Err(ConfigError::BadFilePath(config_path.to_path_buf()));
        }

        let yaml_str = std::fs::read_to_string(config_path)?;

        Ok(serde_yaml::from_str::<Self>(&yaml_str)?)
    }

    /// Write the configuration to a YAML file, overwriting anything already there
    pub fn write_config_file(&self, config_path: &Path) -> Result<(), ConfigError> {
        let yaml_str = serde_yaml::to_string(self)?;
        std::fs::write(config_path, yaml_str)?;
        Ok(())
    }

    /// Compile the trial start pattern. Messages only need to start with a match
    pub fn trial_start_regex(&self) -> Result<Regex, ConfigError> {
        Ok(Regex::new(&format!("^(?:{})", self.trial_start_pattern))?)
    }

    /// Every column that must be present in an experiment CSV
    pub fn required_columns(&self) -> Vec<String> {
        let mut columns = self.core_columns.clone();
        if !columns.contains(&self.trial_start_column) {
            columns.push(self.trial_start_column.clone());
        }
        columns
    }

    /// Get the path to the combined output file for an experiment CSV
    pub fn get_output_file_name(&self, csv_path: &Path) -> Result<PathBuf, ConfigError> {
        if !self.output_path.exists() {
            return Err(ConfigError::BadFilePath(self.output_path.clone()));
        }
        let stem = csv_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(self
            .output_path
            .join(format!("{stem}{COMBINED_SUFFIX}.{CSV_EXTENSION}")))
    }

    pub fn is_n_threads_valid(&self) -> bool {
        self.n_threads >= 1
    }

    /// Both directories must have been set and must exist
    pub fn are_paths_valid(&self) -> bool {
        self.input_path.is_dir() && self.output_path.is_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schema_requires_trial_start_column() {
        let config = Config::default();
        let required = config.required_columns();
        assert_eq!(required.len(), DEFAULT_CORE_COLUMNS.len() + 1);
        assert_eq!(required.last().unwrap(), DEFAULT_TRIAL_START_COLUMN);
    }

    #[test]
    fn trial_start_regex_matches_prefix_only() {
        let config = Config::default();
        let regex = config.trial_start_regex().unwrap();
        assert!(regex.is_match("exp1 trial 12 start"));
        assert!(regex.is_match("exp1 trial 3 start of block"));
        assert!(!regex.is_match("pre exp1 trial 3 start"));
        assert!(!regex.is_match("exp1 trial start"));
    }

    #[test]
    fn bad_pattern_is_reported() {
        let config = Config {
            trial_start_pattern: String::from("trial (\\d+"),
            ..Default::default()
        };
        assert!(matches!(
            config.trial_start_regex(),
            Err(ConfigError::BadPattern(_))
        ));
    }

    #[test]
    fn config_survives_a_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        let config = Config {
            input_path: PathBuf::from("/data/raw"),
            eye_columns: Some(vec![String::from("time"), String::from("left_gaze_x")]),
            n_threads: 3,
            ..Default::default()
        };
        config.write_config_file(&path).unwrap();
        assert_eq!(Config::read_config_file(&path).unwrap(), config);
    }

    #[test]
    fn partial_yaml_falls_back_to_defaults() {
        let config: Config = serde_yaml::from_str("input_path: /data/raw\nn_threads: 2\n").unwrap();
        assert_eq!(config.input_path, PathBuf::from("/data/raw"));
        assert_eq!(config.n_threads, 2);
        assert_eq!(config.trial_start_column, DEFAULT_TRIAL_START_COLUMN);
        assert!(config.write_summary);
    }

    #[test]
    fn missing_config_file() {
        let result = Config::read_config_file(Path::new("/definitely/not/here.yml"));
        assert!(matches!(result, Err(ConfigError::BadFilePath(_))));
    }

    #[test]
    fn output_name_replaces_extension() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            output_path: dir.path().to_path_buf(),
            ..Default::default()
        };
        let out = config
            .get_output_file_name(Path::new("/in/foobar_myexp_2021_Aug_09_1904.csv"))
            .unwrap();
        assert_eq!(
            out,
            dir.path().join("foobar_myexp_2021_Aug_09_1904_combined.csv")
        );
    }
}
