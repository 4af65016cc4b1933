use regex::Regex;
use serde::Serialize;

use super::alignment::{attach_messages, mean_offset, trial_start_rows};
use super::constants::MESSAGE_COLUMN;
use super::error::MergeError;
use super::experiment_csv::ExperimentData;
use super::eye_sample::{ColumnKind, EyeSampleKind, EyeTrace, Message};

/// Bookkeeping from a merge, written next to the combined data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeSummary {
    pub eye_sample_kind: EyeSampleKind,
    pub n_samples: usize,
    pub n_messages: usize,
    pub n_replaced_messages: usize,
    pub n_experiment_trials: usize,
    pub n_eyetracker_trials: usize,
    pub time_offset: f64,
}

/// Eye samples with the iohub messages and the per-trial experiment data attached.
///
/// One row per eye sample. Experiment data only appears on the rows of trial start messages.
#[derive(Debug, Clone)]
pub struct CombinedTable {
    trace: EyeTrace,
    eye_column_idx: Vec<usize>,
    messages: Vec<Option<String>>,
    experiment: ExperimentData,
    trial_at_row: Vec<Option<usize>>,
}

impl CombinedTable {
    /// Merge one run.
    ///
    /// Messages are placed on the closest eye sample using the raw iohub clock. The eye sample
    /// times are then shifted onto the experiment clock by the mean offset between the trial
    /// starts seen by both sides, and the n-th experiment trial is written into the row of the
    /// n-th trial start message.
    pub fn new(
        mut trace: EyeTrace,
        messages: &[Message],
        experiment: ExperimentData,
        trial_start_pattern: &Regex,
        eye_columns: Option<&[String]>,
    ) -> Result<(Self, MergeSummary), MergeError> {
        let eye_column_idx = match eye_columns {
            Some(names) => names
                .iter()
                .map(|name| {
                    trace
                        .column_index(name)
                        .ok_or_else(|| MergeError::UnknownEyeColumn(name.clone()))
                })
                .collect::<Result<Vec<usize>, MergeError>>()?,
            None => (0..trace.columns.len()).collect(),
        };

        let times = trace.times();
        let row_messages = attach_messages(&times, messages);
        let start_rows = trial_start_rows(&row_messages.messages, trial_start_pattern);
        let et_start_times: Vec<f64> = start_rows.iter().map(|row| times[*row]).collect();

        let offset = mean_offset(&et_start_times, &experiment.trial_start_times())?;
        trace.shift_times(offset);
        log::info!("Shifted eyetracker times by {offset:.6} s onto the experiment clock");

        let n_trials = experiment.trials.len();
        if n_trials > start_rows.len() {
            return Err(MergeError::TrialCountMismatch(n_trials, start_rows.len()));
        } else if n_trials < start_rows.len() {
            log::warn!(
                "The eyetracker data has {} trial start messages but the experiment CSV only has {} trials. The extra trial starts will have no experiment data.",
                start_rows.len(),
                n_trials
            );
        }

        let mut trial_at_row = vec![None; trace.len()];
        for (trial_idx, row) in start_rows.iter().take(n_trials).enumerate() {
            trial_at_row[*row] = Some(trial_idx);
        }

        let summary = MergeSummary {
            eye_sample_kind: trace.kind,
            n_samples: trace.len(),
            n_messages: messages.len(),
            n_replaced_messages: row_messages.n_replaced,
            n_experiment_trials: n_trials,
            n_eyetracker_trials: start_rows.len(),
            time_offset: offset,
        };

        Ok((
            Self {
                trace,
                eye_column_idx,
                messages: row_messages.messages,
                experiment,
                trial_at_row,
            },
            summary,
        ))
    }

    pub fn header(&self) -> Vec<&str> {
        let mut header: Vec<&str> = self
            .eye_column_idx
            .iter()
            .map(|idx| self.trace.columns[*idx].as_str())
            .collect();
        header.push(MESSAGE_COLUMN);
        header.extend(self.experiment.columns.iter().map(|c| c.as_str()));
        header
    }

    pub fn n_rows(&self) -> usize {
        self.trace.len()
    }

    /// Eye sample values for a row with their storage kinds, restricted to the selected columns
    pub fn eye_values(&self, row: usize) -> impl Iterator<Item = (ColumnKind, f64)> + '_ {
        self.eye_column_idx
            .iter()
            .map(move |col| (self.trace.kinds[*col], self.trace.values[[row, *col]]))
    }

    pub fn message(&self, row: usize) -> Option<&str> {
        self.messages[row].as_deref()
    }

    /// Experiment cells for a row, None unless the row starts a trial
    pub fn experiment_cells(&self, row: usize) -> Option<&[String]> {
        self.trial_at_row[row].map(|trial| self.experiment.trials[trial].cells.as_slice())
    }

    pub fn n_experiment_columns(&self) -> usize {
        self.experiment.columns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment_csv::Trial;
    use crate::eye_sample::MonocularEyeSample;
    use std::path::PathBuf;

    fn trace(times: &[f64]) -> EyeTrace {
        let records: Vec<MonocularEyeSample> = times
            .iter()
            .enumerate()
            .map(|(idx, t)| MonocularEyeSample {
                time: *t,
                gaze_x: idx as f32,
                ..Default::default()
            })
            .collect();
        EyeTrace::from_records(&records)
    }

    fn experiment(starts: &[f64]) -> ExperimentData {
        ExperimentData {
            path: PathBuf::from("p01.csv"),
            columns: vec![String::from("audio_filepath")],
            trials: starts
                .iter()
                .enumerate()
                .map(|(idx, start)| Trial {
                    start_time: *start,
                    cells: vec![format!("sound_{idx}.wav")],
                })
                .collect(),
        }
    }

    fn msg(time: f64, text: &str) -> Message {
        Message {
            time,
            text: text.to_string(),
        }
    }

    fn pattern() -> Regex {
        Regex::new(r"^(?:exp1 trial \d+ start)").unwrap()
    }

    #[test]
    fn merges_trials_onto_start_rows() {
        // iohub clock runs 100 s ahead of the experiment clock
        let et = trace(&[100.0, 100.5, 101.0, 101.5, 102.0, 102.5]);
        let messages = [
            msg(100.48, "exp1 trial 1 start"),
            msg(101.02, "exp1 trial 1 end"),
            msg(101.99, "exp1 trial 2 start"),
        ];
        let (table, summary) = CombinedTable::new(
            et,
            &messages,
            experiment(&[0.5, 2.0]),
            &pattern(),
            None,
        )
        .unwrap();

        assert_eq!(summary.time_offset, 100.0);
        assert_eq!(summary.n_eyetracker_trials, 2);
        assert_eq!(summary.n_experiment_trials, 2);
        assert_eq!(table.n_rows(), 6);

        assert_eq!(table.message(1), Some("exp1 trial 1 start"));
        assert_eq!(table.message(2), Some("exp1 trial 1 end"));
        assert_eq!(table.message(0), None);

        assert_eq!(
            table.experiment_cells(1),
            Some(&[String::from("sound_0.wav")][..])
        );
        assert_eq!(
            table.experiment_cells(4),
            Some(&[String::from("sound_1.wav")][..])
        );
        assert_eq!(table.experiment_cells(2), None);

        let time_col = table.header().iter().position(|c| *c == "time").unwrap();
        let shifted: Vec<f64> = table.eye_values(1).map(|(_, v)| v).collect();
        assert_eq!(shifted[time_col], 0.5);
    }

    #[test]
    fn header_order_is_eye_message_core() {
        let columns = vec![String::from("time"), String::from("gaze_x")];
        let (table, _) = CombinedTable::new(
            trace(&[0.0, 1.0]),
            &[msg(0.0, "exp1 trial 1 start")],
            experiment(&[0.0]),
            &pattern(),
            Some(columns.as_slice()),
        )
        .unwrap();
        assert_eq!(
            table.header(),
            vec!["time", "gaze_x", "message", "audio_filepath"]
        );
        assert_eq!(
            table.eye_values(1).collect::<Vec<(ColumnKind, f64)>>(),
            vec![(ColumnKind::Float64, 1.0), (ColumnKind::Float32, 1.0)]
        );
    }

    #[test]
    fn unknown_eye_column() {
        let columns = vec![String::from("left_gaze_x")];
        let result = CombinedTable::new(
            trace(&[0.0]),
            &[msg(0.0, "exp1 trial 1 start")],
            experiment(&[0.0]),
            &pattern(),
            Some(columns.as_slice()),
        );
        assert!(matches!(result, Err(MergeError::UnknownEyeColumn(_))));
    }

    #[test]
    fn more_experiment_trials_than_messages() {
        let result = CombinedTable::new(
            trace(&[0.0, 1.0, 2.0]),
            &[msg(0.0, "exp1 trial 1 start")],
            experiment(&[0.0, 1.0]),
            &pattern(),
            None,
        );
        assert!(matches!(result, Err(MergeError::TrialCountMismatch(2, 1))));
    }

    #[test]
    fn extra_trial_start_messages_stay_empty() {
        let (table, summary) = CombinedTable::new(
            trace(&[0.0, 1.0, 2.0]),
            &[
                msg(0.0, "exp1 trial 1 start"),
                msg(2.0, "exp1 trial 2 start"),
            ],
            experiment(&[0.0]),
            &pattern(),
            None,
        )
        .unwrap();
        assert_eq!(summary.n_eyetracker_trials, 2);
        assert!(table.experiment_cells(0).is_some());
        assert!(table.experiment_cells(2).is_none());
    }

    #[test]
    fn no_trial_start_messages() {
        let result = CombinedTable::new(
            trace(&[0.0, 1.0]),
            &[msg(0.0, "calibration")],
            experiment(&[0.0]),
            &pattern(),
            None,
        );
        assert!(matches!(result, Err(MergeError::AlignmentError(_))));
    }
}
