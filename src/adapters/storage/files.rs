use super::{PersistReceipt, SubmissionStore};
use crate::domain::submission::Submission;
use async_trait::async_trait;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

pub const LEDGER_FILE: &str = "contact_messages.csv";
pub const LEDGER_HEADER: &str = "Timestamp,Name,Email,Phone,Message\n";

const MAX_SNAPSHOT_SUFFIX: u32 = 1000;

/// Stores submissions as plain files in one directory: an append-only CSV ledger plus one
/// text snapshot per submission.
#[derive(Debug)]
pub struct FileSubmissionStore {
    dir: PathBuf,
    ledger_lock: Mutex<()>,
}

impl FileSubmissionStore {
    /// Opens the store, creating the directory if needed.
    ///
    /// # Errors
    /// Returns an I/O error if the directory cannot be created.
    pub async fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        tracing::info!(path = %dir.display(), "Messages will be saved to directory");
        Ok(Self { dir, ledger_lock: Mutex::new(()) })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn ledger_path(&self) -> PathBuf {
        self.dir.join(LEDGER_FILE)
    }

    async fn append_to_ledger(&self, submission: &Submission) -> io::Result<PathBuf> {
        let row = ledger_row(submission)?;
        let path = self.ledger_path();

        // Header check and append must not interleave with another request's append.
        let _guard = self.ledger_lock.lock().await;
        let mut file = OpenOptions::new().create(true).append(true).open(&path).await?;

        let mut buf = Vec::with_capacity(LEDGER_HEADER.len() + row.len());
        if file.metadata().await?.len() == 0 {
            buf.extend_from_slice(LEDGER_HEADER.as_bytes());
        }
        buf.extend_from_slice(&row);

        file.write_all(&buf).await?;
        file.flush().await?;
        Ok(path)
    }

    async fn write_snapshot(&self, submission: &Submission) -> io::Result<PathBuf> {
        let content = snapshot_text(submission);
        let millis = submission.unix_millis();

        for suffix in 0..MAX_SNAPSHOT_SUFFIX {
            let name = if suffix == 0 {
                format!("message_{millis}.txt")
            } else {
                format!("message_{millis}_{suffix}.txt")
            };
            let path = self.dir.join(name);

            match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(mut file) => {
                    file.write_all(content.as_bytes()).await?;
                    file.flush().await?;
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::debug!(path = %path.display(), "Snapshot name taken, trying next suffix");
                }
                Err(e) => return Err(e),
            }
        }

        Err(io::Error::new(ErrorKind::AlreadyExists, format!("no free snapshot name for timestamp {millis}")))
    }
}

#[async_trait]
impl SubmissionStore for FileSubmissionStore {
    #[tracing::instrument(err(level = "warn"), skip_all, fields(dir = %self.dir.display()))]
    async fn persist(&self, submission: &Submission) -> io::Result<PersistReceipt> {
        let ledger_path = self.append_to_ledger(submission).await?;
        let snapshot_path = self.write_snapshot(submission).await?;
        tracing::debug!(snapshot = %snapshot_path.display(), "Submission persisted");
        Ok(PersistReceipt { ledger_path, snapshot_path })
    }

    async fn check(&self) -> io::Result<()> {
        let metadata = fs::metadata(&self.dir).await?;
        if !metadata.is_dir() {
            return Err(io::Error::new(ErrorKind::NotADirectory, "messages path is not a directory"));
        }
        if metadata.permissions().readonly() {
            return Err(io::Error::new(ErrorKind::PermissionDenied, "messages directory is read-only"));
        }
        Ok(())
    }
}

/// Encodes one ledger row: every field quoted, embedded quotes doubled, line breaks kept.
fn ledger_row(submission: &Submission) -> io::Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record([
        submission.iso_timestamp().as_str(),
        submission.name(),
        submission.email(),
        submission.phone(),
        submission.message(),
    ])?;

    writer.into_inner().map_err(csv::IntoInnerError::into_error)
}

fn snapshot_text(submission: &Submission) -> String {
    format!(
        "Contact Form Message\n\
         ================\n\
         Date: {}\n\
         Name: {}\n\
         Email: {}\n\
         Phone: {}\n\
         Message: {}\n\
         ================\n",
        submission.display_timestamp(),
        submission.name(),
        submission.email(),
        submission.phone(),
        submission.message(),
    )
}
