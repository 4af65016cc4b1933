use hdf5::File;
use std::path::{Path, PathBuf};

use super::constants::{EYETRACKER_GROUP, MESSAGE_DATASET};
use super::error::IohubFileError;
use super::eye_sample::{
    BinocularEyeSample, EyeSampleRecord, EyeTrace, Message, MessageRecord, MonocularEyeSample,
};

/// A read-only handle on the HDF5 file iohub writes for one experiment run.
///
/// Real eyetrackers register `BinocularEyeSampleEvent`s; when the mouse is used to simulate gaze
/// iohub registers `MonocularEyeSampleEvent`s instead. Binocular data wins if both exist.
#[derive(Debug)]
pub struct IohubFile {
    file_handle: File,
    path: PathBuf,
}

impl IohubFile {
    pub fn new(path: &Path) -> Result<Self, IohubFileError> {
        let file_handle =
            File::open(path).map_err(|e| IohubFileError::Corrupt(path.to_path_buf(), e))?;
        Ok(Self {
            file_handle,
            path: path.to_path_buf(),
        })
    }

    /// Read the eye samples into a matrix
    pub fn read_eye_trace(&self) -> Result<EyeTrace, IohubFileError> {
        let eye_group = self
            .file_handle
            .group(EYETRACKER_GROUP)
            .map_err(|_| IohubFileError::NoEyeSamples(self.path.clone()))?;

        let trace = if eye_group.link_exists(BinocularEyeSample::DATASET) {
            self.read_records::<BinocularEyeSample>(&eye_group)?
        } else if eye_group.link_exists(MonocularEyeSample::DATASET) {
            log::info!(
                "{} has monocular samples; assuming mouse-simulated gaze",
                self.path.display()
            );
            self.read_records::<MonocularEyeSample>(&eye_group)?
        } else {
            return Err(IohubFileError::NoEyeSamples(self.path.clone()));
        };

        if trace.is_empty() {
            return Err(IohubFileError::EmptyEyeData(self.path.clone()));
        }
        Ok(trace)
    }

    fn read_records<T: EyeSampleRecord>(
        &self,
        eye_group: &hdf5::Group,
    ) -> Result<EyeTrace, IohubFileError> {
        let dataset = eye_group.dataset(T::DATASET).map_err(|e| {
            IohubFileError::MissingDataset(self.path.clone(), T::DATASET.to_string(), e)
        })?;
        let records = dataset.read_raw::<T>()?;
        log::info!(
            "Read {} {:?} eye samples from {}",
            records.len(),
            T::KIND,
            self.path.display()
        );
        Ok(EyeTrace::from_records(&records))
    }

    /// Read every message sent from the experiment, in recorded order
    pub fn read_messages(&self) -> Result<Vec<Message>, IohubFileError> {
        let dataset = self.file_handle.dataset(MESSAGE_DATASET).map_err(|e| {
            IohubFileError::MissingDataset(self.path.clone(), MESSAGE_DATASET.to_string(), e)
        })?;
        let records = dataset.read_raw::<MessageRecord>()?;
        Ok(records.iter().map(Message::from).collect())
    }
}
