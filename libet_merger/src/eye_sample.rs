//! Eye sample records as stored by iohub.
//!
//! iohub writes every event type as a table of compound records. The structs below mirror
//! iohub's record layouts field for field, keeping iohub's storage types, so every stored
//! column reaches the output at the precision it was recorded with.
use hdf5::types::FixedAscii;
use hdf5::H5Type;
use ndarray::Array2;

use super::constants::{BINOCULAR_DATASET, MONOCULAR_DATASET};

/// Storage type of an eye sample column, which decides how it is written out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float32,
    Float64,
}

/// A row type of one of the iohub eye sample tables
pub trait EyeSampleRecord: H5Type + Clone {
    /// Name of the dataset in the eyetracker group
    const DATASET: &'static str;
    /// Column names and storage types, in the order returned by `values`
    const COLUMNS: &'static [(&'static str, ColumnKind)];
    const KIND: EyeSampleKind;

    fn values(&self) -> Vec<f64>;
}

/// Which eye sample table a recording used. Mouse-simulated gaze is recorded as monocular
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum EyeSampleKind {
    Binocular,
    Monocular,
}

/// `BinocularEyeSampleEvent`, written by real eyetrackers
#[derive(H5Type, Clone, Copy, Debug, Default, PartialEq)]
#[repr(C)]
pub struct BinocularEyeSample {
    pub experiment_id: u32,
    pub session_id: u32,
    pub device_id: u16,
    pub event_id: u32,
    #[hdf5(rename = "type")]
    pub event_type: u8,
    pub device_time: f64,
    pub logged_time: f64,
    pub time: f64,
    pub confidence_interval: f32,
    pub delay: f32,
    pub filter_id: i16,
    pub left_gaze_x: f32,
    pub left_gaze_y: f32,
    pub left_gaze_z: f32,
    pub left_eye_cam_x: f32,
    pub left_eye_cam_y: f32,
    pub left_eye_cam_z: f32,
    pub left_angle_x: f32,
    pub left_angle_y: f32,
    pub left_raw_x: f32,
    pub left_raw_y: f32,
    pub left_pupil_measure1: f32,
    pub left_pupil_measure1_type: u8,
    pub left_pupil_measure2: f32,
    pub left_pupil_measure2_type: u8,
    pub left_ppd_x: f32,
    pub left_ppd_y: f32,
    pub left_velocity_x: f32,
    pub left_velocity_y: f32,
    pub left_velocity_xy: f32,
    pub right_gaze_x: f32,
    pub right_gaze_y: f32,
    pub right_gaze_z: f32,
    pub right_eye_cam_x: f32,
    pub right_eye_cam_y: f32,
    pub right_eye_cam_z: f32,
    pub right_angle_x: f32,
    pub right_angle_y: f32,
    pub right_raw_x: f32,
    pub right_raw_y: f32,
    pub right_pupil_measure1: f32,
    pub right_pupil_measure1_type: u8,
    pub right_pupil_measure2: f32,
    pub right_pupil_measure2_type: u8,
    pub right_ppd_x: f32,
    pub right_ppd_y: f32,
    pub right_velocity_x: f32,
    pub right_velocity_y: f32,
    pub right_velocity_xy: f32,
    pub status: u8,
}

impl EyeSampleRecord for BinocularEyeSample {
    const DATASET: &'static str = BINOCULAR_DATASET;
    const COLUMNS: &'static [(&'static str, ColumnKind)] = &[
        ("experiment_id", ColumnKind::Integer),
        ("session_id", ColumnKind::Integer),
        ("device_id", ColumnKind::Integer),
        ("event_id", ColumnKind::Integer),
        ("type", ColumnKind::Integer),
        ("device_time", ColumnKind::Float64),
        ("logged_time", ColumnKind::Float64),
        ("time", ColumnKind::Float64),
        ("confidence_interval", ColumnKind::Float32),
        ("delay", ColumnKind::Float32),
        ("filter_id", ColumnKind::Integer),
        ("left_gaze_x", ColumnKind::Float32),
        ("left_gaze_y", ColumnKind::Float32),
        ("left_gaze_z", ColumnKind::Float32),
        ("left_eye_cam_x", ColumnKind::Float32),
        ("left_eye_cam_y", ColumnKind::Float32),
        ("left_eye_cam_z", ColumnKind::Float32),
        ("left_angle_x", ColumnKind::Float32),
        ("left_angle_y", ColumnKind::Float32),
        ("left_raw_x", ColumnKind::Float32),
        ("left_raw_y", ColumnKind::Float32),
        ("left_pupil_measure1", ColumnKind::Float32),
        ("left_pupil_measure1_type", ColumnKind::Integer),
        ("left_pupil_measure2", ColumnKind::Float32),
        ("left_pupil_measure2_type", ColumnKind::Integer),
        ("left_ppd_x", ColumnKind::Float32),
        ("left_ppd_y", ColumnKind::Float32),
        ("left_velocity_x", ColumnKind::Float32),
        ("left_velocity_y", ColumnKind::Float32),
        ("left_velocity_xy", ColumnKind::Float32),
        ("right_gaze_x", ColumnKind::Float32),
        ("right_gaze_y", ColumnKind::Float32),
        ("right_gaze_z", ColumnKind::Float32),
        ("right_eye_cam_x", ColumnKind::Float32),
        ("right_eye_cam_y", ColumnKind::Float32),
        ("right_eye_cam_z", ColumnKind::Float32),
        ("right_angle_x", ColumnKind::Float32),
        ("right_angle_y", ColumnKind::Float32),
        ("right_raw_x", ColumnKind::Float32),
        ("right_raw_y", ColumnKind::Float32),
        ("right_pupil_measure1", ColumnKind::Float32),
        ("right_pupil_measure1_type", ColumnKind::Integer),
        ("right_pupil_measure2", ColumnKind::Float32),
        ("right_pupil_measure2_type", ColumnKind::Integer),
        ("right_ppd_x", ColumnKind::Float32),
        ("right_ppd_y", ColumnKind::Float32),
        ("right_velocity_x", ColumnKind::Float32),
        ("right_velocity_y", ColumnKind::Float32),
        ("right_velocity_xy", ColumnKind::Float32),
        ("status", ColumnKind::Integer),
    ];
    const KIND: EyeSampleKind = EyeSampleKind::Binocular;

    fn values(&self) -> Vec<f64> {
        vec![
            self.experiment_id as f64,
            self.session_id as f64,
            self.device_id as f64,
            self.event_id as f64,
            self.event_type as f64,
            self.device_time,
            self.logged_time,
            self.time,
            self.confidence_interval as f64,
            self.delay as f64,
            self.filter_id as f64,
            self.left_gaze_x as f64,
            self.left_gaze_y as f64,
            self.left_gaze_z as f64,
            self.left_eye_cam_x as f64,
            self.left_eye_cam_y as f64,
            self.left_eye_cam_z as f64,
            self.left_angle_x as f64,
            self.left_angle_y as f64,
            self.left_raw_x as f64,
            self.left_raw_y as f64,
            self.left_pupil_measure1 as f64,
            self.left_pupil_measure1_type as f64,
            self.left_pupil_measure2 as f64,
            self.left_pupil_measure2_type as f64,
            self.left_ppd_x as f64,
            self.left_ppd_y as f64,
            self.left_velocity_x as f64,
            self.left_velocity_y as f64,
            self.left_velocity_xy as f64,
            self.right_gaze_x as f64,
            self.right_gaze_y as f64,
            self.right_gaze_z as f64,
            self.right_eye_cam_x as f64,
            self.right_eye_cam_y as f64,
            self.right_eye_cam_z as f64,
            self.right_angle_x as f64,
            self.right_angle_y as f64,
            self.right_raw_x as f64,
            self.right_raw_y as f64,
            self.right_pupil_measure1 as f64,
            self.right_pupil_measure1_type as f64,
            self.right_pupil_measure2 as f64,
            self.right_pupil_measure2_type as f64,
            self.right_ppd_x as f64,
            self.right_ppd_y as f64,
            self.right_velocity_x as f64,
            self.right_velocity_y as f64,
            self.right_velocity_xy as f64,
            self.status as f64,
        ]
    }
}

/// `MonocularEyeSampleEvent`, written when the mouse simulates gaze
#[derive(H5Type, Clone, Copy, Debug, Default, PartialEq)]
#[repr(C)]
pub struct MonocularEyeSample {
    pub experiment_id: u32,
    pub session_id: u32,
    pub device_id: u16,
    pub event_id: u32,
    #[hdf5(rename = "type")]
    pub event_type: u8,
    pub device_time: f64,
    pub logged_time: f64,
    pub time: f64,
    pub confidence_interval: f32,
    pub delay: f32,
    pub filter_id: i16,
    pub eye: u8,
    pub gaze_x: f32,
    pub gaze_y: f32,
    pub gaze_z: f32,
    pub eye_cam_x: f32,
    pub eye_cam_y: f32,
    pub eye_cam_z: f32,
    pub angle_x: f32,
    pub angle_y: f32,
    pub raw_x: f32,
    pub raw_y: f32,
    pub pupil_measure1: f32,
    pub pupil_measure1_type: u8,
    pub pupil_measure2: f32,
    pub pupil_measure2_type: u8,
    pub ppd_x: f32,
    pub ppd_y: f32,
    pub velocity_x: f32,
    pub velocity_y: f32,
    pub velocity_xy: f32,
    pub status: u8,
}

impl EyeSampleRecord for MonocularEyeSample {
    const DATASET: &'static str = MONOCULAR_DATASET;
    const COLUMNS: &'static [(&'static str, ColumnKind)] = &[
        ("experiment_id", ColumnKind::Integer),
        ("session_id", ColumnKind::Integer),
        ("device_id", ColumnKind::Integer),
        ("event_id", ColumnKind::Integer),
        ("type", ColumnKind::Integer),
        ("device_time", ColumnKind::Float64),
        ("logged_time", ColumnKind::Float64),
        ("time", ColumnKind::Float64),
        ("confidence_interval", ColumnKind::Float32),
        ("delay", ColumnKind::Float32),
        ("filter_id", ColumnKind::Integer),
        ("eye", ColumnKind::Integer),
        ("gaze_x", ColumnKind::Float32),
        ("gaze_y", ColumnKind::Float32),
        ("gaze_z", ColumnKind::Float32),
        ("eye_cam_x", ColumnKind::Float32),
        ("eye_cam_y", ColumnKind::Float32),
        ("eye_cam_z", ColumnKind::Float32),
        ("angle_x", ColumnKind::Float32),
        ("angle_y", ColumnKind::Float32),
        ("raw_x", ColumnKind::Float32),
        ("raw_y", ColumnKind::Float32),
        ("pupil_measure1", ColumnKind::Float32),
        ("pupil_measure1_type", ColumnKind::Integer),
        ("pupil_measure2", ColumnKind::Float32),
        ("pupil_measure2_type", ColumnKind::Integer),
        ("ppd_x", ColumnKind::Float32),
        ("ppd_y", ColumnKind::Float32),
        ("velocity_x", ColumnKind::Float32),
        ("velocity_y", ColumnKind::Float32),
        ("velocity_xy", ColumnKind::Float32),
        ("status", ColumnKind::Integer),
    ];
    const KIND: EyeSampleKind = EyeSampleKind::Monocular;

    fn values(&self) -> Vec<f64> {
        vec![
            self.experiment_id as f64,
            self.session_id as f64,
            self.device_id as f64,
            self.event_id as f64,
            self.event_type as f64,
            self.device_time,
            self.logged_time,
            self.time,
            self.confidence_interval as f64,
            self.delay as f64,
            self.filter_id as f64,
            self.eye as f64,
            self.gaze_x as f64,
            self.gaze_y as f64,
            self.gaze_z as f64,
            self.eye_cam_x as f64,
            self.eye_cam_y as f64,
            self.eye_cam_z as f64,
            self.angle_x as f64,
            self.angle_y as f64,
            self.raw_x as f64,
            self.raw_y as f64,
            self.pupil_measure1 as f64,
            self.pupil_measure1_type as f64,
            self.pupil_measure2 as f64,
            self.pupil_measure2_type as f64,
            self.ppd_x as f64,
            self.ppd_y as f64,
            self.velocity_x as f64,
            self.velocity_y as f64,
            self.velocity_xy as f64,
            self.status as f64,
        ]
    }
}

/// A message sent from the experiment to iohub (e.g. `exp1 trial 3 start`).
///
/// Only the fields the merge uses; the rest of iohub's `MessageEvent` record is dropped on read.
#[derive(H5Type, Clone, Debug)]
#[repr(C)]
pub struct MessageRecord {
    pub time: f64,
    pub text: FixedAscii<128>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub time: f64,
    pub text: String,
}

impl From<&MessageRecord> for Message {
    fn from(record: &MessageRecord) -> Self {
        let text = String::from_utf8_lossy(record.text.as_bytes());
        Self {
            time: record.time,
            text: text.trim_end_matches('\0').trim().to_string(),
        }
    }
}

/// The eye samples of one recording as a (sample x column) matrix.
///
/// Every iohub storage type widens to `f64` without loss; `kinds` remembers what it was.
#[derive(Debug, Clone)]
pub struct EyeTrace {
    pub kind: EyeSampleKind,
    pub columns: Vec<String>,
    pub kinds: Vec<ColumnKind>,
    pub values: Array2<f64>,
}

impl EyeTrace {
    pub fn from_records<T: EyeSampleRecord>(records: &[T]) -> Self {
        let mut values = Array2::<f64>::zeros([records.len(), T::COLUMNS.len()]);
        for (row, record) in records.iter().enumerate() {
            for (col, value) in record.values().into_iter().enumerate() {
                values[[row, col]] = value;
            }
        }
        Self {
            kind: T::KIND,
            columns: T::COLUMNS.iter().map(|(name, _)| name.to_string()).collect(),
            kinds: T::COLUMNS.iter().map(|(_, kind)| *kind).collect(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.values.nrows() == 0
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// The iohub `time` column. Every record type declares it
    pub fn times(&self) -> Vec<f64> {
        match self.column_index("time") {
            Some(idx) => self.values.column(idx).to_vec(),
            None => vec![f64::NAN; self.len()],
        }
    }

    /// Subtract an offset from the `time` column only
    pub fn shift_times(&mut self, offset: f64) {
        if let Some(idx) = self.column_index("time") {
            self.values.column_mut(idx).mapv_inplace(|t| t - offset);
        }
    }
}
