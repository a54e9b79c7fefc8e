use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::Result;
use std::path::PathBuf;
use todostore::{DEFAULT_TASKS_FILE, Task, TaskStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "todostore")]
#[command(about = "TodoStore CLI - Task list persistence backed by a single JSON file")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Path to the task file
    #[arg(short, long, global = true, default_value = DEFAULT_TASKS_FILE)]
    file: PathBuf,

    /// Print the resulting task list as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Report storage errors instead of falling back to an empty list
    #[arg(long, global = true)]
    strict: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show all tasks
    List,

    /// Append a new task
    Add {
        /// Task text; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Remove the task at INDEX
    Remove {
        #[arg(allow_negative_numbers = true)]
        index: i64,
    },

    /// Flip the completed flag of the task at INDEX
    Toggle {
        #[arg(allow_negative_numbers = true)]
        index: i64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    init_tracing(cli.verbose);

    let store = TaskStore::new(&cli.file);
    info!(file = ?store.path(), strict = cli.strict, "todostore started");

    let tasks = if cli.strict {
        match cli.command {
            Commands::List => store.try_fetch_all()?,
            Commands::Add { text } => store.try_add(&text.join(" "))?,
            Commands::Remove { index } => store.try_remove_at(index)?,
            Commands::Toggle { index } => store.try_toggle_at(index)?,
        }
    } else {
        match cli.command {
            Commands::List => store.fetch_all(),
            Commands::Add { text } => store.add(&text.join(" ")),
            Commands::Remove { index } => store.remove_at(index),
            Commands::Toggle { index } => store.toggle_at(index),
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
    } else {
        print!("{}", render(&tasks));
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn render(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "No tasks.\n".to_string();
    }

    let mut output = String::new();
    for (i, task) in tasks.iter().enumerate() {
        let line = if task.completed {
            format!("{}. [x] {}", i, task.text).dimmed().to_string()
        } else {
            format!("{}. [ ] {}", i, task.text)
        };
        output.push_str(&line);
        output.push('\n');
    }
    output
}
