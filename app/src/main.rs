//! Interactive task list.
//!
//! Reads one command per line from stdin and redraws the list on stdout
//! after every operation. Logs go to stderr.

use anyhow::Context;
use std::sync::Arc;
use tasklist::command::USAGE;
use tasklist::{
    AppConfig, Command, JsonRenderer, RenderMode, TaskListEnvironment, TaskListError,
    TaskListStore, TerminalRenderer, spawn_render_loop,
};
use tasklist_core::environment::SystemClock;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    tracing::info!(?config, "Starting task list");
    tasklist_runtime::metrics::describe_metrics();

    let env = TaskListEnvironment::new(Arc::new(SystemClock))
        .with_id_strategy(config.id_strategy)
        .with_feedback_ttl(config.feedback_ttl());
    let store = TaskListStore::new(env);

    let render_loop = match config.render {
        RenderMode::Text => {
            spawn_render_loop(store.subscribe(), TerminalRenderer::new(std::io::stdout()))
        },
        RenderMode::Json => {
            spawn_render_loop(store.subscribe(), JsonRenderer::new(std::io::stdout()))
        },
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(error) => {
                eprintln!("{error}\n{USAGE}");
                continue;
            },
        };

        match run(&store, command).await {
            Ok(true) => {},
            Ok(false) => break,
            // Shown through the feedback line of the next frame
            Err(error) if error.is_user_error() => {
                tracing::debug!(%error, "Operation rejected");
            },
            Err(error) => return Err(error).context("Store stopped"),
        }
    }

    store
        .shutdown(config.shutdown_timeout())
        .await
        .context("Shutdown did not complete")?;
    drop(store);

    render_loop
        .await
        .context("Render loop panicked")?
        .context("Failed to write output")?;

    tracing::info!("Goodbye");
    Ok(())
}

/// Runs one command; returns `false` when the user asked to quit
async fn run(store: &TaskListStore, command: Command) -> Result<bool, TaskListError> {
    match command {
        Command::Add(text) => {
            store.add_task(text).await?;
        },
        Command::Type(text) => store.set_pending_input(text).await?,
        Command::Submit => {
            store.submit_pending_input().await?;
        },
        Command::Toggle(id) => {
            store.toggle_task(id).await?;
        },
        Command::Delete(id) => store.delete_task(id).await?,
        Command::Help => eprintln!("{USAGE}"),
        Command::Quit => return Ok(false),
    }
    Ok(true)
}

/// Initialize tracing, writing to stderr so logs stay out of the rendered list
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tasklist=info,tasklist_runtime=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
