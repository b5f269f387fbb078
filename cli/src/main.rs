use anyhow::Result;
use axon_core::sandbox::{ExecuteCodeTool, ToolLibraryTool};
use axon_core::tools::{
    CalculatorTool, ClockTool, ListMemoryTool, MEMORY_KEY, RetrieveMemoryTool, SearchTool,
    StoreMemoryTool, WeatherTool,
};
use axon_core::{
    AgentSession, Config, ExecContext, PersistentKey, StateStore, ToolRegistry, config, providers,
};
use clap::{Parser, Subcommand};
use std::future::Future;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "axon")]
#[command(about = "axon - a tool-calling agent with a sandboxed code runner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    Chat {
        #[arg(short, long)]
        message: Option<String>,

        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Chat {
        message: None,
        verbose: false,
    });

    match command {
        Commands::Chat { message, verbose } => {
            let config = Config::load_or_init()?;
            if config.api_key.is_empty() {
                eprintln!("No API key configured. Set AXON_API_KEY or edit {}.",
                    config::get_config_path().display());
                anyhow::bail!("missing API key");
            }

            let mut provider = providers::OpenAIProvider::new(config.api_key.clone());
            provider = provider.with_model(config.model.clone());
            if let Some(base_url) = config.base_url.clone() {
                provider = provider.with_base_url(base_url);
            }

            let store = Arc::new(Mutex::new(StateStore::new()));
            let registry = Arc::new(ToolRegistry::new());
            registry.register(Arc::new(CalculatorTool));
            registry.register(Arc::new(ClockTool));
            registry.register(Arc::new(WeatherTool));
            registry.register(Arc::new(SearchTool));
            registry.register(Arc::new(StoreMemoryTool::new(store.clone())));
            registry.register(Arc::new(RetrieveMemoryTool::new(store.clone())));
            registry.register(Arc::new(ListMemoryTool::new(store.clone())));
            registry.register(Arc::new(
                ExecuteCodeTool::new(registry.clone())
                    .with_interpreter(config.sandbox_interpreter.clone())
                    .with_timeout(Duration::from_secs(config.sandbox_timeout_secs)),
            ));
            registry.register(Arc::new(ToolLibraryTool::new(registry.clone())));

            let persistent_keys: Vec<&dyn PersistentKey> = vec![&MEMORY_KEY];
            let mut session = AgentSession::open(
                Arc::new(provider),
                registry,
                config.agent_config(),
                store,
                &persistent_keys,
            )
            .with_context(ExecContext::new().with_verbose(verbose || config.verbose));

            // Ctrl-C must fall through to the close below, not kill the
            // process mid-session.
            let result = run_until_interrupted(run_chat(&mut session, message), async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await;

            // State is flushed whether or not the chat succeeded.
            if let Err(e) = session.close() {
                eprintln!("Warning: failed to save state: {e:#}");
            }
            result
        }
    }
}

/// Races the chat against an interrupt signal. An interrupt ends the chat
/// cleanly so the caller's session close still runs.
async fn run_until_interrupted<W, I>(work: W, interrupt: I) -> Result<()>
where
    W: Future<Output = Result<()>>,
    I: Future<Output = ()>,
{
    tokio::select! {
        result = work => result,
        _ = interrupt => {
            println!("\nInterrupted.");
            Ok(())
        }
    }
}

async fn run_chat(session: &mut AgentSession, message: Option<String>) -> Result<()> {
    if let Some(message) = message {
        let response = session.run(&message).await?;
        println!("{response}");
        return Ok(());
    }

    println!("axon");
    println!("Type your message (Ctrl+D to exit):\n");

    use std::io::{self, BufRead};
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut stdout_lock = stdout.lock();

    loop {
        print!("> ");
        let _ = stdout_lock.flush();

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) | Err(_) => {
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {
                let input = input.trim();
                if input.is_empty() {
                    continue;
                }
                match session.run(input).await {
                    Ok(response) => println!("{response}\n"),
                    Err(e) => eprintln!("Error: {e:#}\n"),
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::pending;

    #[tokio::test]
    async fn interrupt_ends_stuck_work_cleanly() {
        // Work never finishes; the interrupt must win and return Ok so the
        // caller still reaches its session close.
        let result = run_until_interrupted(pending::<Result<()>>(), async {}).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn finished_work_propagates_its_result() {
        let result = run_until_interrupted(async { anyhow::bail!("boom") }, pending::<()>()).await;
        assert_eq!(result.unwrap_err().to_string(), "boom");
    }
}
