use std::collections::HashSet;

use async_trait::async_trait;

use gcast_core::RecipientId;

use crate::error::DirectoryError;

/// Source of the recipients a broadcast is sent to.
///
/// The engine calls [`fetch_recipients`](RecipientDirectory::fetch_recipients)
/// exactly once per run and works from that snapshot. Implementations may
/// return duplicates; the engine removes them.
#[async_trait]
pub trait RecipientDirectory: Send + Sync {
    async fn fetch_recipients(&self) -> Result<Vec<RecipientId>, DirectoryError>;
}

/// Fixed in-memory recipient list.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    recipients: Vec<RecipientId>,
}

impl StaticDirectory {
    pub fn new(recipients: impl IntoIterator<Item = RecipientId>) -> Self {
        Self {
            recipients: recipients.into_iter().collect(),
        }
    }
}

#[async_trait]
impl RecipientDirectory for StaticDirectory {
    async fn fetch_recipients(&self) -> Result<Vec<RecipientId>, DirectoryError> {
        Ok(self.recipients.clone())
    }
}

/// Drop repeated IDs, keeping the first occurrence of each.
pub fn dedupe(recipients: Vec<RecipientId>) -> Vec<RecipientId> {
    let mut seen = HashSet::with_capacity(recipients.len());
    recipients.into_iter().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[i64]) -> Vec<RecipientId> {
        raw.iter().copied().map(RecipientId).collect()
    }

    #[test]
    fn dedupe_keeps_first_seen_order() {
        assert_eq!(dedupe(ids(&[1, 2, 2, 3])), ids(&[1, 2, 3]));
        assert_eq!(dedupe(ids(&[3, 1, 3, 3, 2, 1])), ids(&[3, 1, 2]));
    }

    #[test]
    fn dedupe_of_empty_is_empty() {
        assert!(dedupe(Vec::new()).is_empty());
    }

    #[tokio::test]
    async fn static_directory_returns_its_list_verbatim() {
        let dir = StaticDirectory::new(ids(&[5, 5, 6]));
        assert_eq!(dir.fetch_recipients().await.unwrap(), ids(&[5, 5, 6]));
    }
}
