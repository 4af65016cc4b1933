use regex::Regex;

use super::error::AlignmentError;
use super::eye_sample::Message;

/// Find the index of the element of an ascending slice closest to `value`.
///
/// Values beyond either end clamp to the first/last index. When `value` sits exactly halfway
/// between two elements the lower index wins. Returns None for an empty slice.
pub fn find_closest_index(sorted: &[f64], value: f64) -> Option<usize> {
    if sorted.is_empty() {
        return None;
    }
    // bisect right: first index whose element is strictly greater than value
    let insert_index = sorted.partition_point(|x| *x <= value);
    if insert_index == sorted.len() {
        return Some(insert_index - 1);
    }
    if insert_index == 0 {
        return Some(0);
    }
    let before_dist = (sorted[insert_index - 1] - value).abs();
    let after_dist = (sorted[insert_index] - value).abs();
    if after_dist < before_dist {
        Some(insert_index)
    } else {
        Some(insert_index - 1)
    }
}

/// Messages placed on eye sample rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowMessages {
    pub messages: Vec<Option<String>>,
    /// Number of messages that replaced an earlier message on the same row
    pub n_replaced: usize,
}

/// Put each message on the eye sample row recorded closest in time to it.
///
/// Messages are applied in order, so when two land on the same row the later one is kept.
pub fn attach_messages(times: &[f64], messages: &[Message]) -> RowMessages {
    let mut rows = RowMessages {
        messages: vec![None; times.len()],
        n_replaced: 0,
    };
    for message in messages.iter() {
        if let Some(idx) = find_closest_index(times, message.time) {
            if let Some(previous) = rows.messages[idx].replace(message.text.clone()) {
                log::debug!(
                    "Message '{}' at row {} replaced by '{}'",
                    previous,
                    idx,
                    message.text
                );
                rows.n_replaced += 1;
            }
        }
    }
    rows
}

/// Ascending indices of the rows whose message marks a trial start
pub fn trial_start_rows(row_messages: &[Option<String>], pattern: &Regex) -> Vec<usize> {
    row_messages
        .iter()
        .enumerate()
        .filter_map(|(idx, msg)| match msg {
            Some(text) if pattern.is_match(text) => Some(idx),
            _ => None,
        })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Average offset between the eyetracker clock and the experiment clock.
///
/// The means are taken separately, so the two sides do not need the same number of trials.
pub fn mean_offset(et_start_times: &[f64], csv_start_times: &[f64]) -> Result<f64, AlignmentError> {
    if et_start_times.is_empty() {
        return Err(AlignmentError::NoEyetrackerTrialStarts);
    }
    if csv_start_times.is_empty() {
        return Err(AlignmentError::NoExperimentTrialStarts);
    }
    Ok(mean(et_start_times) - mean(csv_start_times))
}
