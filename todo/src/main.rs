//! Todo command-line front-end
//!
//! Every invocation opens the saved list, applies at most one change and
//! prints the result.
//!
//! ```text
//! todo add "Buy milk"
//! todo list --filter active
//! todo toggle 1
//! todo edit 3f2c "Buy oat milk"
//! todo rm 2
//! todo clear-completed
//! ```

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use thiserror::Error;
use todo::{
    Config, FileStorage, PersistenceBridge, Todo, TodoEnvironment, TodoFilter, TodoId, TodoStore,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "todo", version, about = "A persistent todo list")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show todos
    List {
        /// all, active or completed
        #[arg(long, short, default_value_t = TodoFilter::All)]
        filter: TodoFilter,
    },
    /// Add a todo
    Add {
        /// What needs doing
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Replace a todo's text
    Edit {
        /// Id, 1-based position or id prefix, tried in that order
        target: String,
        /// New text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Mark a todo done, or not done
    Toggle {
        /// Id, 1-based position or id prefix, tried in that order
        target: String,
    },
    /// Delete a todo
    Rm {
        /// Id, 1-based position or id prefix, tried in that order
        target: String,
    },
    /// Delete every completed todo
    ClearCompleted,
}

/// A command-line reference to a todo that matched nothing, or too much
#[derive(Debug, Error, PartialEq, Eq)]
enum TargetError {
    #[error("no todo matches {0:?}")]
    NotFound(String),
    #[error("{target:?} matches {matches} todos, use more of the id")]
    Ambiguous { target: String, matches: usize },
}

/// Resolve a full id, a 1-based position or a unique id prefix, in that order
///
/// An exact id wins over a position so legacy numeric ids stay addressable.
fn resolve_target(todos: &[Todo], target: &str) -> Result<TodoId, TargetError> {
    let target = target.trim();

    if let Some(todo) = todos.iter().find(|t| t.id.as_str() == target) {
        return Ok(todo.id.clone());
    }

    let by_position = target
        .parse::<usize>()
        .ok()
        .and_then(|position| position.checked_sub(1))
        .and_then(|index| todos.get(index));
    if let Some(todo) = by_position {
        return Ok(todo.id.clone());
    }

    let mut matches = todos
        .iter()
        .filter(|t| !target.is_empty() && t.id.as_str().starts_with(target));
    match (matches.next(), matches.count()) {
        (Some(todo), 0) => Ok(todo.id.clone()),
        (Some(_), rest) => Err(TargetError::Ambiguous {
            target: target.to_string(),
            matches: rest + 1,
        }),
        (None, _) => Err(TargetError::NotFound(target.to_string())),
    }
}

/// Join command-line words into todo text, trimmed; `None` when blank
fn todo_text(words: &[String]) -> Option<String> {
    let text = words.join(" ");
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn print_todos(all: &[Todo], filter: TodoFilter) {
    let visible: Vec<(usize, &Todo)> = all
        .iter()
        .enumerate()
        .filter(|(_, todo)| filter.matches(todo))
        .collect();

    if visible.is_empty() {
        println!("Nothing to do.");
        return;
    }

    for (index, todo) in visible {
        let mark = if todo.completed { 'x' } else { ' ' };
        let short_id: String = todo.id.as_str().chars().take(8).collect();
        println!("{:>3}. [{mark}] {}  ({short_id})", index + 1, todo.text);
    }
}

async fn target_id(store: &TodoStore, target: &str) -> anyhow::Result<TodoId> {
    let todos = store.snapshot().await;
    Ok(resolve_target(&todos, target)?)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();

    // Logs go to stderr so list output stays clean
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_new(&config.log_level)
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!(?config, "Loaded configuration");
    tasklist_runtime::metrics::register_metrics();

    let bridge = PersistenceBridge::with_key(
        FileStorage::new(&config.data_dir),
        config.storage_key.clone(),
    );
    let store = TodoStore::open(bridge, TodoEnvironment::production())
        .with_broadcast_capacity(config.broadcast_capacity);

    match cli.command.unwrap_or(Command::List {
        filter: TodoFilter::All,
    }) {
        Command::List { filter } => {
            print_todos(&store.snapshot().await, filter);
            let counts = store.counts().await;
            println!("{} active, {} completed", counts.active, counts.completed);
        },
        Command::Add { text } => {
            let Some(text) = todo_text(&text) else {
                bail!("todo text cannot be empty");
            };
            match store.add(&text).await.context("failed to save todo")? {
                Some(todo) => println!("Added: {}", todo.text),
                None => bail!("todo text cannot be empty"),
            }
        },
        Command::Edit { target, text } => {
            let Some(text) = todo_text(&text) else {
                bail!("todo text cannot be empty");
            };
            let id = target_id(&store, &target).await?;
            store
                .update(&id, &text)
                .await
                .context("failed to save edit")?;
            println!("Updated {id}");
        },
        Command::Toggle { target } => {
            let id = target_id(&store, &target).await?;
            store
                .toggle_complete(&id)
                .await
                .context("failed to save change")?;
            if let Some(todo) = store.get(&id).await {
                let state = if todo.completed { "done" } else { "not done" };
                println!("{}: {state}", todo.text);
            }
        },
        Command::Rm { target } => {
            let id = target_id(&store, &target).await?;
            store.delete(&id).await.context("failed to save removal")?;
            println!("Removed {id}");
        },
        Command::ClearCompleted => {
            let removed = store
                .clear_completed()
                .await
                .context("failed to save removal")?;
            println!("Removed {removed} completed todo(s)");
        },
    }

    Ok(())
}
