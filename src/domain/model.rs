use std::path::PathBuf;

use super::TransferError;

pub type TransferOutcome = Result<SavedFile, TransferError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub url: String,
    /// Overrides any name inferred from the response or the URL.
    pub filename: Option<String>,
}

impl TransferRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            filename: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub filename: String,
    pub path: PathBuf,
    pub size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferPhase {
    Starting,
    Transferring,
    Saving,
    Done,
    Aborted,
    Failed,
}

impl TransferPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TransferPhase::Done | TransferPhase::Aborted | TransferPhase::Failed
        )
    }

    fn rank(self) -> u8 {
        match self {
            TransferPhase::Starting => 0,
            TransferPhase::Transferring => 1,
            TransferPhase::Saving => 2,
            TransferPhase::Done | TransferPhase::Aborted | TransferPhase::Failed => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TransferPhase::Starting => "Starting",
            TransferPhase::Transferring => "Downloading",
            TransferPhase::Saving => "Saving",
            TransferPhase::Done => "Done",
            TransferPhase::Aborted => "Cancelled",
            TransferPhase::Failed => "Failed",
        }
    }
}

/// One progress report. `percent` is `None` while the total size is unknown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub loaded: u64,
    pub total: Option<u64>,
    pub percent: Option<f64>,
}

impl Progress {
    pub fn new(loaded: u64, total: Option<u64>) -> Self {
        Self {
            loaded,
            total,
            percent: percent_of(loaded, total),
        }
    }

    /// Single report for a body that arrived in one piece. An empty body is
    /// still complete.
    pub fn complete(size: u64) -> Self {
        Self {
            loaded: size,
            total: Some(size),
            percent: Some(100.0),
        }
    }
}

pub fn percent_of(loaded: u64, total: Option<u64>) -> Option<f64> {
    match total {
        Some(total) if total > 0 => Some((loaded as f64 / total as f64 * 100.0).min(100.0)),
        _ => None,
    }
}

/// Display-side view of a single transfer.
#[derive(Debug, Clone)]
pub struct TransferState {
    url: String,
    phase: TransferPhase,
    bytes_loaded: u64,
    bytes_total: Option<u64>,
    total_recorded: bool,
    error_message: Option<String>,
}

impl TransferState {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            phase: TransferPhase::Starting,
            bytes_loaded: 0,
            bytes_total: None,
            total_recorded: false,
            error_message: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn phase(&self) -> TransferPhase {
        self.phase
    }

    pub fn bytes_loaded(&self) -> u64 {
        self.bytes_loaded
    }

    pub fn bytes_total(&self) -> Option<u64> {
        self.bytes_total
    }

    pub fn percent(&self) -> Option<f64> {
        percent_of(self.bytes_loaded, self.bytes_total)
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Moves to `phase` if that is a forward transition. Returns whether the
    /// state changed.
    pub fn enter(&mut self, phase: TransferPhase) -> bool {
        if self.phase.is_terminal() || phase.rank() <= self.phase.rank() {
            return false;
        }
        self.phase = phase;
        true
    }

    /// Applies a progress report. Reports are only accepted while bytes are
    /// moving and never move `bytes_loaded` backwards.
    pub fn record(&mut self, progress: Progress) -> bool {
        if !matches!(
            self.phase,
            TransferPhase::Starting | TransferPhase::Transferring
        ) || progress.loaded < self.bytes_loaded
        {
            return false;
        }
        if !self.total_recorded {
            self.bytes_total = progress.total;
            self.total_recorded = true;
        }
        self.enter(TransferPhase::Transferring);
        self.bytes_loaded = progress.loaded;
        true
    }

    pub fn fail(&mut self, message: impl Into<String>) -> bool {
        if self.phase != TransferPhase::Failed && !self.enter(TransferPhase::Failed) {
            return false;
        }
        self.error_message = Some(message.into());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_requires_known_total() {
        assert_eq!(percent_of(10, None), None);
        assert_eq!(percent_of(10, Some(0)), None);
        assert_eq!(percent_of(51200, Some(204800)), Some(25.0));
        assert_eq!(percent_of(204800, Some(204800)), Some(100.0));
        assert_eq!(percent_of(300, Some(200)), Some(100.0));
    }

    #[test]
    fn test_phases_only_move_forward() {
        let mut state = TransferState::new("http://localhost/export-pdf/1");
        assert_eq!(state.phase(), TransferPhase::Starting);

        assert!(state.enter(TransferPhase::Transferring));
        assert!(state.enter(TransferPhase::Saving));
        assert!(!state.enter(TransferPhase::Transferring));
        assert!(state.enter(TransferPhase::Done));

        assert!(!state.enter(TransferPhase::Failed));
        assert!(!state.fail("late failure"));
        assert_eq!(state.phase(), TransferPhase::Done);
        assert_eq!(state.error_message(), None);
    }

    #[test]
    fn test_abort_from_any_live_phase() {
        let mut state = TransferState::new("http://localhost/a");
        state.enter(TransferPhase::Transferring);
        assert!(state.enter(TransferPhase::Aborted));
        assert!(!state.enter(TransferPhase::Done));
    }

    #[test]
    fn test_bytes_loaded_never_decreases() {
        let mut state = TransferState::new("http://localhost/a");
        assert!(state.record(Progress::new(100, Some(400))));
        assert!(!state.record(Progress::new(50, Some(400))));
        assert_eq!(state.bytes_loaded(), 100);
        assert_eq!(state.percent(), Some(25.0));
    }

    #[test]
    fn test_total_is_captured_once() {
        let mut state = TransferState::new("http://localhost/a");
        state.record(Progress::new(10, None));
        state.record(Progress::new(20, Some(40)));
        assert_eq!(state.bytes_total(), None);
        assert_eq!(state.percent(), None);
    }

    #[test]
    fn test_progress_rejected_after_saving() {
        let mut state = TransferState::new("http://localhost/a");
        state.record(Progress::new(10, Some(10)));
        state.enter(TransferPhase::Saving);
        assert!(!state.record(Progress::new(20, Some(10))));
    }

    #[test]
    fn test_error_message_only_when_failed() {
        let mut state = TransferState::new("http://localhost/a");
        state.enter(TransferPhase::Transferring);
        assert!(state.enter(TransferPhase::Failed));
        assert_eq!(state.error_message(), None);

        assert!(state.fail("Server responded with HTTP 500"));
        assert_eq!(state.phase(), TransferPhase::Failed);
        assert_eq!(state.error_message(), Some("Server responded with HTTP 500"));
    }
}
