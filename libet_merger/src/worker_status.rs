/// The step of the pipeline a worker is currently in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Stage {
    #[default]
    Reading,
    Merging,
    Writing,
    Done,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Reading => "Reading",
            Stage::Merging => "Merging",
            Stage::Writing => "Writing",
            Stage::Done => "Done",
        }
    }
}

/// Progress message sent from a worker to the frontend
#[derive(Debug, Clone, Default)]
pub struct WorkerStatus {
    pub progress: f32,
    pub run_name: String,
    pub worker_id: usize,
    pub stage: Stage,
}

impl WorkerStatus {
    pub fn new(progress: f32, run_name: &str, worker_id: usize, stage: Stage) -> Self {
        Self {
            progress,
            run_name: run_name.to_string(),
            worker_id,
            stage,
        }
    }
}
