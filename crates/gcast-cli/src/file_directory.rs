//! Recipient list backed by a plain text file, one numeric ID per line.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use gcast_core::RecipientId;
use gcast_dispatch::{DirectoryError, RecipientDirectory};

/// Re-reads the file on every fetch, so each run sees the current list.
pub struct FileDirectory {
    path: PathBuf,
}

impl FileDirectory {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl RecipientDirectory for FileDirectory {
    async fn fetch_recipients(&self) -> Result<Vec<RecipientId>, DirectoryError> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        parse_recipients(&raw)
    }
}

/// Parse one ID per line. Blank lines and `#` comments are skipped.
pub fn parse_recipients(raw: &str) -> Result<Vec<RecipientId>, DirectoryError> {
    raw.lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.split('#').next().unwrap_or("").trim()))
        .filter(|(_, value)| !value.is_empty())
        .map(|(line, value)| {
            value.parse::<RecipientId>().map_err(|_| DirectoryError::Malformed {
                line,
                value: value.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_blank_lines_and_comments() {
        let raw = "# users exported 2024-05-01\n100\n\n200  # vip\n  -1001234\n";
        let ids = parse_recipients(raw).unwrap();
        assert_eq!(
            ids,
            vec![RecipientId(100), RecipientId(200), RecipientId(-1001234)]
        );
    }

    #[test]
    fn keeps_duplicates_for_the_engine_to_remove() {
        let ids = parse_recipients("1\n1\n2\n").unwrap();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn malformed_line_reports_its_number() {
        let err = parse_recipients("100\n@alice\n").unwrap_err();
        match err {
            DirectoryError::Malformed { line, value } => {
                assert_eq!(line, 2);
                assert_eq!(value, "@alice");
            }
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let dir = FileDirectory::new("/nonexistent/gcast/recipients.txt");
        let err = dir.fetch_recipients().await.unwrap_err();
        assert!(matches!(err, DirectoryError::Io(_)));
    }
}
