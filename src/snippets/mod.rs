mod local;

pub use local::LocalSnippetStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ExecError;

/// Caller identity as supplied by the external session layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    Anonymous,
    Principal(String),
}

impl Identity {
    pub fn principal(&self) -> Option<&str> {
        match self {
            Self::Principal(id) => Some(id),
            Self::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Principal(_))
    }
}

/// Submission timestamp in nanoseconds since the Unix epoch.
/// Unique and strictly increasing per owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnippetId(pub u64);

impl std::fmt::Display for SnippetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SnippetId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(SnippetId)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    pub id: SnippetId,
    pub code: String,
    /// Output of the last run, when the backend recorded one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Submission time, nanoseconds since the Unix epoch.
    pub submitted_at: u64,
}

/// Per-owner code history.
///
/// Every call is scoped to `who`. Anonymous callers get empty results (or
/// `false` / `None`) from reads and deletes; only `submit` rejects them.
/// Owners never see each other's snippets.
#[async_trait]
pub trait SnippetStore: Send + Sync {
    async fn submit(&self, who: &Identity, code: &str) -> Result<SnippetId, ExecError>;

    /// Snippets in ascending submission order.
    async fn list(&self, who: &Identity) -> Result<Vec<Snippet>, ExecError>;

    async fn get(&self, who: &Identity, id: SnippetId) -> Result<Option<Snippet>, ExecError>;

    /// Returns false when the caller owns no snippet with this id.
    async fn delete(&self, who: &Identity, id: SnippetId) -> Result<bool, ExecError>;

    async fn clear(&self, who: &Identity) -> Result<(), ExecError>;

    /// Case-insensitive substring match over code. A blank term matches everything.
    async fn search(&self, who: &Identity, term: &str) -> Result<Vec<Snippet>, ExecError> {
        let snippets = self.list(who).await?;
        Ok(filter_by_term(snippets, term))
    }
}

pub fn filter_by_term(snippets: Vec<Snippet>, term: &str) -> Vec<Snippet> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return snippets;
    }
    snippets
        .into_iter()
        .filter(|s| s.code.to_lowercase().contains(&needle))
        .collect()
}
