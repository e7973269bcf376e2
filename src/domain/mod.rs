pub mod error;
pub mod model;

pub use error::TransferError;
pub use model::{Progress, SavedFile, TransferOutcome, TransferPhase, TransferRequest, TransferState};
