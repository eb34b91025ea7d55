use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::ExecError;
use crate::orchestrator::{Orchestrator, RunReport};
use crate::snippets::{Identity, Snippet, SnippetId, SnippetStore};
use crate::stdin_hint;

/// Starter program shown in a fresh editor.
pub const DEFAULT_SOURCE: &str = r#"import java.util.Scanner;

public class Main {
    public static void main(String[] args) {
        Scanner sc = new Scanner(System.in);
        System.out.print("Enter your name: ");
        String name = sc.nextLine();
        System.out.println("Hello, " + name + "!");
    }
}"#;

#[derive(Debug)]
pub enum RunView {
    Completed(RunReport),
    /// Every provider failed at the transport level.
    Failed(ExecError),
    /// A run from this session is still in flight; nothing was sent.
    Busy,
}

/// One editor's run/history wiring.
///
/// `run` never overlaps with itself, and it records the submission in the
/// snippet store on a detached task whose result is discarded.
pub struct EditorSession {
    orchestrator: Arc<Orchestrator>,
    store: Arc<dyn SnippetStore>,
    identity: Identity,
    running: AtomicBool,
}

/// Clears the in-flight flag on every exit path, including panics and drops.
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl EditorSession {
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        store: Arc<dyn SnippetStore>,
        identity: Identity,
    ) -> Self {
        Self {
            orchestrator,
            store,
            identity,
            running: AtomicBool::new(false),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn stdin_hint(&self, code: &str) -> bool {
        stdin_hint::uses_stdin(code)
    }

    /// Must be called from within a tokio runtime.
    pub async fn run(&self, code: &str, stdin: &str) -> RunView {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return RunView::Busy;
        }
        let _guard = RunGuard(&self.running);

        if self.identity.is_authenticated() {
            self.record_submission(code);
        }

        match self.orchestrator.run(code, stdin).await {
            Ok(report) => RunView::Completed(report),
            Err(e) => RunView::Failed(e),
        }
    }

    /// Fire-and-forget: at most one attempt, failure only logged.
    fn record_submission(&self, code: &str) {
        let store = Arc::clone(&self.store);
        let identity = self.identity.clone();
        let code = code.to_string();
        tokio::spawn(async move {
            match store.submit(&identity, &code).await {
                Ok(id) => tracing::debug!(%id, "submission recorded"),
                Err(e) => tracing::debug!("submission not recorded: {e}"),
            }
        });
    }

    /// The caller's snippets, newest first.
    pub async fn history(&self) -> Result<Vec<Snippet>, ExecError> {
        let mut snippets = self.store.list(&self.identity).await?;
        snippets.reverse();
        Ok(snippets)
    }

    pub async fn search(&self, term: &str) -> Result<Vec<Snippet>, ExecError> {
        self.store.search(&self.identity, term).await
    }

    pub async fn snippet(&self, id: SnippetId) -> Result<Option<Snippet>, ExecError> {
        self.store.get(&self.identity, id).await
    }

    pub async fn delete(&self, id: SnippetId) -> Result<bool, ExecError> {
        self.store.delete(&self.identity, id).await
    }

    pub async fn clear(&self) -> Result<(), ExecError> {
        self.store.clear(&self.identity).await
    }
}
