//! Progress reporting utilities

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter for the load and compare phases of a reconciliation run.
#[derive(Debug)]
pub struct ProgressReporter {
    load_pb: Option<ProgressBar>,
    compare_pb: Option<ProgressBar>,
    show_progress: bool,
}

impl ProgressReporter {
    /// Create a progress reporter for a comparison run.
    pub fn new() -> Self {
        Self {
            load_pb: Some(create_spinner("Loading datasets...")),
            compare_pb: None,
            show_progress: true,
        }
    }

    /// Create a silent reporter (machine-readable output modes).
    pub fn new_minimal() -> Self {
        Self {
            load_pb: None,
            compare_pb: None,
            show_progress: false,
        }
    }

    pub fn update_load(&self, message: &str) {
        if let Some(pb) = &self.load_pb {
            pb.set_message(message.to_string());
        }
    }

    /// Finish the load phase and start the compare spinner.
    pub fn finish_load(&mut self, message: &str) {
        if let Some(pb) = self.load_pb.take() {
            pb.finish_with_message(message.to_string());
        }
        if self.show_progress {
            self.compare_pb = Some(create_spinner("Reconciling..."));
        }
    }

    pub fn finish_compare(&mut self, message: &str) {
        if let Some(pb) = self.compare_pb.take() {
            pb.finish_with_message(message.to_string());
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(pb) = self.load_pb.take() {
            pb.finish_and_clear();
        }
        if let Some(pb) = self.compare_pb.take() {
            pb.finish_and_clear();
        }
    }
}

/// Create a spinner progress bar
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.green} {msg}")
            .expect("Invalid progress template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
