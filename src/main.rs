use clap::{Parser, Subcommand};
use eyre::Result;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use todolist::{Command, OutputMode, Shell, TaskListController, TaskStore, TerminalView, shell, store};
use tracing::Level;

#[derive(Parser)]
#[command(name = "todolist")]
#[command(about = "A single-user to-do list backed by SQLite")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Path to the task database (default: <data dir>/todolist/to-do_list.db)
    #[arg(short, long)]
    db: Option<PathBuf>,

    /// Print the task list as JSON
    #[arg(long)]
    json: bool,

    /// Print debug diagnostics to stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Task(Command),

    /// Read commands interactively (default)
    Shell,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let db_path = cli.db.unwrap_or_else(store::default_db_path);
    let store = TaskStore::open(&db_path)?;

    let mode = if cli.json { OutputMode::Json } else { OutputMode::Pretty };
    let command = cli.command.unwrap_or(Commands::Shell);
    with_store(store, |store| run(command, mode, store))
}

/// Run `f` against the store, then close it
///
/// The store is closed even when `f` fails, and `f`'s error wins over a close
/// error.
fn with_store<F>(mut store: TaskStore, f: F) -> Result<()>
where
    F: FnOnce(&mut TaskStore) -> Result<()>,
{
    let result = f(&mut store);
    let closed = store.close();
    result.and(closed)
}

fn run(command: Commands, mode: OutputMode, store: &mut TaskStore) -> Result<()> {
    let stdout = io::stdout();
    let color = stdout.is_terminal();
    let view = TerminalView::new(stdout.lock(), mode).with_color(color);
    let mut controller = TaskListController::new(store, view);

    match command {
        Commands::Task(command) => shell::execute(&mut controller, command),
        Commands::Shell => {
            let interactive = io::stdin().is_terminal();
            if interactive {
                controller.presenter_mut().notice(shell::help().trim_end())?;
            }
            Shell::new(interactive).run(&mut controller, io::stdin().lock())
        }
    }
}
