use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use taskboard_domain::ColumnId;

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(about = "A kanban task board with optimistic drag-and-drop sync", long_about = None)]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_COMMIT_HASH"), ")"))]
pub struct Cli {
    /// Base URL of the task API (or set TASKBOARD_SERVER)
    #[arg(long, global = true, env = "TASKBOARD_SERVER")]
    pub server: Option<String>,

    /// Subject of the signed-in user (or set TASKBOARD_USER)
    #[arg(long, global = true, env = "TASKBOARD_USER")]
    pub user: Option<String>,

    /// Display name recorded for the user on first write
    #[arg(long, global = true, env = "TASKBOARD_NAME")]
    pub name: Option<String>,

    /// Email recorded for the user on first write
    #[arg(long, global = true, env = "TASKBOARD_EMAIL")]
    pub email: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the task API server
    Serve(ServeArgs),
    /// Open the terminal board
    Tui,
    /// Task operations against the API
    Task(TaskCommand),
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Args)]
pub struct ServeArgs {
    /// Listen address (or set TASKBOARD_BIND)
    #[arg(long, env = "TASKBOARD_BIND")]
    pub bind: Option<String>,

    /// SQLite database file; tasks are kept in memory when omitted
    #[arg(long, env = "TASKBOARD_DATABASE")]
    pub database: Option<PathBuf>,
}

#[derive(Args)]
pub struct TaskCommand {
    #[command(subcommand)]
    pub action: TaskAction,
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// List the visible board grouped by column
    List,
    /// List canceled tasks, newest first
    Canceled,
    /// Create a task in ToDo
    Create(TaskCreateArgs),
    /// Edit a task's title, description or due date
    Edit(TaskEditArgs),
    /// Move a task to another column
    Move {
        #[arg(long)]
        id: String,
        /// Target column: ToDo, Doing or Done
        #[arg(long)]
        to: ColumnId,
    },
    /// Reorder a task within its column (not persisted)
    Reorder {
        #[arg(long)]
        column: ColumnId,
        #[arg(long)]
        from: usize,
        #[arg(long)]
        to: usize,
    },
    /// Cancel a task
    Cancel {
        #[arg(long)]
        id: String,
    },
    /// Put a canceled task back into ToDo
    Resume {
        #[arg(long)]
        id: String,
    },
    /// Delete a task permanently
    Delete {
        #[arg(long)]
        id: String,
    },
    /// Toggle one checklist item of a task's description
    Check {
        #[arg(long)]
        id: String,
        /// Zero-based item index
        #[arg(long)]
        index: usize,
    },
}

#[derive(Args)]
pub struct TaskCreateArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: Option<String>,
    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due_date: Option<String>,
}

#[derive(Args)]
pub struct TaskEditArgs {
    #[arg(long)]
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Due date (YYYY-MM-DD)
    #[arg(long, conflicts_with = "clear_due_date")]
    pub due_date: Option<String>,
    #[arg(long)]
    pub clear_due_date: bool,
}
