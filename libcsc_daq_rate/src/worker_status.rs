/// Progress report sent from the processing thread to the UI.
#[derive(Debug, Clone, Default)]
pub struct WorkerStatus {
    /// Fraction of the event budget consumed, 0.0 to 1.0.
    pub progress: f32,
    pub events_processed: u64,
}

impl WorkerStatus {
    pub fn new(progress: f32, events_processed: u64) -> Self {
        Self {
            progress,
            events_processed,
        }
    }
}
