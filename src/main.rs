use std::sync::Arc;

use anyhow::Context;

use javarun::config::Config;
use javarun::dispatch::registry::Registry;
use javarun::orchestrator::Orchestrator;
use javarun::response::RunResponse;
use javarun::session::EditorSession;
use javarun::snippets::{Identity, LocalSnippetStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    dotenvy::dotenv().ok();

    let mut args = std::env::args().skip(1);
    let source_path = args
        .next()
        .context("usage: javarun <Main.java> [stdin-file]")?;
    let source = tokio::fs::read_to_string(&source_path)
        .await
        .with_context(|| format!("reading {source_path}"))?;
    let stdin = match args.next() {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading {path}"))?,
        None => String::new(),
    };

    let config = Config::load();
    tracing::info!(
        providers = config.providers.len(),
        timeout_secs = config.request_timeout.as_secs(),
        "javarun starting"
    );

    let registry = Registry::from_config(&config)?;
    let orchestrator = Arc::new(Orchestrator::new(registry));
    let store = Arc::new(LocalSnippetStore::new(config.snippets_dir.clone()));
    let session = EditorSession::new(orchestrator, store, Identity::Anonymous);

    let stdin_detected = session.stdin_hint(&source);
    let view = session.run(&source, &stdin).await;
    println!("{}", RunResponse::from_view(view, stdin_detected).to_json());

    Ok(())
}
