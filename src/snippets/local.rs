use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::ExecError;
use crate::snippets::{Identity, Snippet, SnippetId, SnippetStore};

/// File-backed snippet history: one JSONL file per owner.
///
/// Reads and writes go through an internal Mutex so concurrent submissions
/// never interleave and a listing never sees a half-appended line. Rewrites (delete/clear) use temp+rename so readers never see a
/// partial file.
pub struct LocalSnippetStore {
    base_dir: PathBuf,
    write_lock: Mutex<()>,
    last_id: AtomicU64,
}

impl LocalSnippetStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            write_lock: Mutex::new(()),
            last_id: AtomicU64::new(0),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn owner_path(&self, owner: &str) -> PathBuf {
        self.base_dir.join(format!("{}.jsonl", owner_file_stem(owner)))
    }

    /// Nanosecond timestamp, bumped past any id already handed out.
    fn next_id(&self, floor: u64) -> SnippetId {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        let bump = |last: u64| now.max(last.max(floor) + 1);
        let previous = match self
            .last_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(bump(last)))
        {
            Ok(previous) | Err(previous) => previous,
        };
        SnippetId(bump(previous))
    }

    async fn read_owner(&self, path: &Path) -> Result<Vec<Snippet>, ExecError> {
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut snippets = Vec::new();
        for (line_no, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Snippet>(line) {
                Ok(snippet) => snippets.push(snippet),
                Err(e) => {
                    tracing::warn!(path = %path.display(), line = line_no + 1, "skipping corrupt snippet: {e}");
                }
            }
        }
        snippets.sort_by_key(|s| s.id);
        Ok(snippets)
    }

    async fn rewrite_owner(&self, path: &Path, snippets: &[Snippet]) -> Result<(), ExecError> {
        let mut body = String::new();
        for snippet in snippets {
            body.push_str(&encode_line(snippet)?);
        }
        let tmp = path.with_extension("jsonl.tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl SnippetStore for LocalSnippetStore {
    async fn submit(&self, who: &Identity, code: &str) -> Result<SnippetId, ExecError> {
        let owner = who.principal().ok_or(ExecError::Unauthenticated)?;
        let path = self.owner_path(owner);

        let _guard = self.write_lock.lock().await;
        tokio::fs::create_dir_all(&self.base_dir).await?;

        // Existing history may carry ids from an earlier process.
        let floor = self
            .read_owner(&path)
            .await?
            .last()
            .map(|s| s.id.0)
            .unwrap_or(0);
        let id = self.next_id(floor);

        let snippet = Snippet {
            id,
            code: code.to_string(),
            output: None,
            submitted_at: id.0,
        };
        let line = encode_line(&snippet)?;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        tracing::debug!(%id, "snippet saved");
        Ok(id)
    }

    async fn list(&self, who: &Identity) -> Result<Vec<Snippet>, ExecError> {
        let Some(owner) = who.principal() else {
            return Ok(Vec::new());
        };
        // Appends are not atomic; reading mid-append would drop the last line.
        let _guard = self.write_lock.lock().await;
        self.read_owner(&self.owner_path(owner)).await
    }

    async fn get(&self, who: &Identity, id: SnippetId) -> Result<Option<Snippet>, ExecError> {
        Ok(self.list(who).await?.into_iter().find(|s| s.id == id))
    }

    async fn delete(&self, who: &Identity, id: SnippetId) -> Result<bool, ExecError> {
        let Some(owner) = who.principal() else {
            return Ok(false);
        };
        let path = self.owner_path(owner);

        let _guard = self.write_lock.lock().await;
        let mut snippets = self.read_owner(&path).await?;
        let before = snippets.len();
        snippets.retain(|s| s.id != id);
        if snippets.len() == before {
            return Ok(false);
        }
        self.rewrite_owner(&path, &snippets).await?;
        Ok(true)
    }

    async fn clear(&self, who: &Identity) -> Result<(), ExecError> {
        let Some(owner) = who.principal() else {
            return Ok(());
        };
        let path = self.owner_path(owner);

        let _guard = self.write_lock.lock().await;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn encode_line(snippet: &Snippet) -> Result<String, ExecError> {
    let mut line = serde_json::to_string(snippet)
        .map_err(|e| ExecError::Store(format!("failed to encode snippet: {e}")))?;
    line.push('\n');
    Ok(line)
}

/// Reversible file-name encoding of an owner id: ASCII alphanumerics and `-`
/// pass through, every other byte becomes `_XX`.
pub(crate) fn owner_file_stem(owner: &str) -> String {
    let mut stem = String::with_capacity(owner.len());
    for b in owner.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' {
            stem.push(b as char);
        } else {
            stem.push_str(&format!("_{b:02x}"));
        }
    }
    stem
}
