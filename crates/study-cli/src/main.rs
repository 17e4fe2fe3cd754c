//! Study Agent REPL
//!
//! Developer harness for the orchestration core: reads lines from stdin,
//! runs the full orchestrator → specialized-agent pipeline, and prints
//! the outcome with its routing metadata. Sessions go through the
//! registry so the harness exercises the same path a server would.

use std::io::Write as _;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::{CompletionService, HistoryMessage, MemoryQuizStore, SessionContext};
use agent_runtime::OllamaCompletion;
use study_agents::SessionRegistry;

const SESSION_ID: &str = "local";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    // Initialize the completion backend
    let completion = Arc::new(OllamaCompletion::from_env());
    match completion.health_check().await {
        Ok(true) => tracing::info!("✓ Connected to Ollama (model: {})", completion.model()),
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ Ollama not available - completions will fail");
            tracing::warn!("  Make sure Ollama is running: ollama serve");
        }
    }

    let store = Arc::new(MemoryQuizStore::new());
    let registry = SessionRegistry::new(completion).with_store(store);

    {
        let system = registry.get_or_create(SESSION_ID);
        system.lock().await.set_state_listener(Arc::new(|agent, state, _| {
            tracing::debug!(%agent, %state, "transition");
        }));
    }

    let user = std::env::var("STUDY_USER").unwrap_or_else(|_| "local".into());
    let mut ctx = SessionContext::new().with_user(&user);

    println!("study-cli — type a request, or /status, /clear, /quit");
    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();

        match line {
            "" => continue,
            "/quit" | "/exit" => break,
            "/clear" => {
                let system = registry.get_or_create(SESSION_ID);
                system.lock().await.clear_all_contexts();
                ctx.history.clear();
                println!("contexts cleared");
                continue;
            }
            "/status" => {
                let system = registry.get_or_create(SESSION_ID);
                let status = system.lock().await.system_status();
                println!(
                    "current agent: {}",
                    status
                        .current_agent
                        .map_or_else(|| "none".into(), |a| a.to_string())
                );
                for (agent, state) in &status.agent_states {
                    println!("  {} -> {}", agent, state);
                }
                continue;
            }
            _ => {}
        }

        match registry.process_input(SESSION_ID, line, &ctx).await {
            Ok(processed) => {
                println!(
                    "[{} · {:.2}] {}",
                    processed.routing.target,
                    processed.routing.confidence,
                    processed.outcome.message()
                );
                ctx.history.push(HistoryMessage::new("user", line));
                ctx.history
                    .push(HistoryMessage::new("assistant", processed.outcome.message()));
            }
            Err(err) => {
                tracing::error!(%err, "pipeline failed");
                println!("{}", err.user_message());
            }
        }
    }

    Ok(())
}
