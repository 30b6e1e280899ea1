/// File-backed event log
///
/// Appends timestamped lines to per-category log files under a configured
/// directory. The request-audit middleware writes to `req.log` and the
/// login rate limiter writes rejections to `error.log`; both treat the log
/// as fire-and-forget and never fail a request over it.
///
/// Each line is tab-separated:
///
/// ```text
/// 20250301	14:02:33	5f3a...-uuid	GET	/users	http://localhost:3000
/// ```

use chrono::Utc;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Destination file for request audit lines
pub const REQUEST_LOG: &str = "req.log";

/// Destination file for error and rejection lines
pub const ERROR_LOG: &str = "error.log";

/// Append-only event log rooted at a directory
#[derive(Debug, Clone)]
pub struct EventLog {
    dir: PathBuf,
}

impl EventLog {
    /// Creates an event log rooted at `dir`
    ///
    /// The directory is created lazily on first append.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Appends one line to the named log file
    ///
    /// The line is prefixed with a date, a time and a unique id, and
    /// terminated with a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file
    /// cannot be opened or written.
    pub async fn append(&self, line: &str, file_name: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir).await?;

        let stamped = format!(
            "{}\t{}\t{}\n",
            Utc::now().format("%Y%m%d\t%H:%M:%S"),
            Uuid::new_v4(),
            line
        );

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.dir.join(file_name))
            .await?;

        file.write_all(stamped.as_bytes()).await?;
        file.flush().await
    }

    /// Fire-and-forget append
    ///
    /// Spawns the write so the caller is never delayed; failures are logged
    /// through tracing and otherwise dropped.
    pub fn append_detached(self: &Arc<Self>, line: String, file_name: &'static str) {
        let log = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = log.append(&line, file_name).await {
                tracing::warn!(error = %e, file = file_name, "Failed to append event log line");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_creates_file_and_stamps_line() {
        let dir = tempfile::tempdir().unwrap();
        let log = EventLog::new(dir.path());

        log.append("GET\t/users\t-", REQUEST_LOG).await.unwrap();

        let contents = std::fs::read_to_string(dir.path().join(REQUEST_LOG)).unwrap();
        let line = contents.lines().next().unwrap();

        // date, time, uuid, then the message fields
        assert!(line.split('\t').count() >= 4);
        assert!(line.contains("GET\t/users"));
        assert!(line.ends_with("-"));
    }

    #[tokio::test]
    async fn test_append_accumulates_lines() {
        let dir = tempfile::tempdir().unwrap();
        let log = EventLog::new(dir.path());

        log.append("first", ERROR_LOG).await.unwrap();
        log.append("second", ERROR_LOG).await.unwrap();

        let contents = std::fs::read_to_string(dir.path().join(ERROR_LOG)).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.contains("first"));
        assert!(contents.contains("second"));
    }

    #[tokio::test]
    async fn test_separate_categories_use_separate_files() {
        let dir = tempfile::tempdir().unwrap();
        let log = EventLog::new(dir.path());

        log.append("request line", REQUEST_LOG).await.unwrap();
        log.append("error line", ERROR_LOG).await.unwrap();

        let requests = std::fs::read_to_string(dir.path().join(REQUEST_LOG)).unwrap();
        let errors = std::fs::read_to_string(dir.path().join(ERROR_LOG)).unwrap();

        assert!(requests.contains("request line"));
        assert!(!requests.contains("error line"));
        assert!(errors.contains("error line"));
    }
}
