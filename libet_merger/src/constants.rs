// iohub HDF5 layout
pub const EYETRACKER_GROUP: &str = "data_collection/events/eyetracker";
pub const BINOCULAR_DATASET: &str = "BinocularEyeSampleEvent";
pub const MONOCULAR_DATASET: &str = "MonocularEyeSampleEvent";
pub const MESSAGE_DATASET: &str = "data_collection/events/experiment/MessageEvent";

// Input file recognition. PsychoPy names the pair <stem>.csv and <stem>_hdf5.hdf5
pub const CSV_EXTENSION: &str = "csv";
pub const HDF5_EXTENSION: &str = "hdf5";

// Output naming
pub const COMBINED_SUFFIX: &str = "_combined";
pub const MESSAGE_COLUMN: &str = "message";

pub const DEFAULT_TRIAL_START_COLUMN: &str = "trial_global_start_time";
pub const DEFAULT_TRIAL_START_PATTERN: &str = r"exp1 trial \d+ start";

/// The PsychoPy columns copied into the trial-start rows of the combined output
pub const DEFAULT_CORE_COLUMNS: [&str; 31] = [
    "att_grab_start_time_intended",
    "gaze_to_audio_delay_intended",
    "audio_to_visual_delay_intended",
    "visual_duration_intended",
    "end_blank_duration_intended",
    "att_grab_start_time_actual",
    "gaze_captured_time",
    "audio_onset_time",
    "visual_onset_time",
    "visual_offset_time",
    "trial_end_time",
    "attention_sounds_played",
    "visual_stimuli_duration_nframes",
    "visual_social_prop",
    "visual_geometric_prop",
    "visual_manmade_prop",
    "visual_natural_prop",
    "visual_social_filepath",
    "visual_social_pos_x",
    "visual_social_pos_y",
    "visual_geometric_filepath",
    "visual_geometric_pos_x",
    "visual_geometric_pos_y",
    "visual_manmade_filepath",
    "visual_manmade_pos_x",
    "visual_manmade_pos_y",
    "visual_natural_filepath",
    "visual_natural_pos_x",
    "visual_natural_pos_y",
    "audio_filepath",
    "audio_volume",
];

/// Version of the combined output layout, written to the summary file
pub const FORMAT_VERSION: &str = "1.0";
