use crate::domain::submission::Submission;
use async_trait::async_trait;
use std::path::PathBuf;

pub mod files;

pub use files::FileSubmissionStore;

/// Where a persisted submission ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistReceipt {
    pub ledger_path: PathBuf,
    pub snapshot_path: PathBuf,
}

#[async_trait]
pub trait SubmissionStore: Send + Sync + std::fmt::Debug {
    /// Appends the submission to the ledger and writes its snapshot.
    ///
    /// # Errors
    /// Returns the underlying I/O error. A ledger row already appended is not rolled back
    /// when the snapshot write fails.
    async fn persist(&self, submission: &Submission) -> std::io::Result<PersistReceipt>;

    /// Confirms the backing store is reachable and writable.
    ///
    /// # Errors
    /// Returns an I/O error describing why the store is unusable.
    async fn check(&self) -> std::io::Result<()>;
}
