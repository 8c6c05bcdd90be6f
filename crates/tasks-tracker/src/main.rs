//! CLI entry point for tasks-tracker.

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tasks_tracker_app::AppConfig;
use tasks_tracker_core::{Priority, Status};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

use commands::CommandContext;

mod commands;
mod tui;

/// Personal task tracker backed by a local SQLite database.
#[derive(Parser, Debug)]
#[command(
    name = "tasks-tracker",
    version,
    about = "tasks-tracker: a personal task table with filters and modal editing"
)]
struct Cli {
    /// Database file (overrides `database` in the config file).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Config file (defaults to <config_dir>/tasks-tracker/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record the signed-in identity.
    Login {
        /// Stable user id; owner of the tasks.
        user_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },

    /// Forget the signed-in identity.
    Logout,

    /// Print the signed-in identity.
    Whoami,

    /// Create a new task.
    New {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(short = 't', long = "tag")]
        tags: Vec<String>,
        #[arg(short = 'p', long)]
        priority: Option<Priority>,
    },

    /// Overwrite fields of an existing task.
    Edit {
        /// Task id.
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(short = 't', long = "tag")]
        tags: Vec<String>,
        /// Remove every tag before applying `--tag`.
        #[arg(long)]
        clear_tags: bool,
        #[arg(short = 's', long)]
        status: Option<Status>,
        #[arg(short = 'p', long)]
        priority: Option<Priority>,
    },

    /// Delete a task.
    Rm {
        /// Task id.
        id: String,
    },

    /// List the signed-in user's tasks.
    Ls {
        /// Case-insensitive title substring.
        #[arg(long)]
        title: Option<String>,
        #[arg(short = 's', long = "status")]
        statuses: Vec<Status>,
        #[arg(short = 'p', long = "priority")]
        priorities: Vec<Priority>,
        #[arg(long, value_enum, default_value_t = LsFormat::Table)]
        format: LsFormat,
    },

    /// Print up to 100 tasks matching an id as JSON.
    Lookup {
        /// Task id.
        id: String,
    },

    /// Launch interactive terminal UI.
    Tui {
        /// Page to open first (`/`, `/~` or `/sign-in?callbackUrl=...`).
        #[arg(long, default_value = "/")]
        route: String,
    },
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
enum LsFormat {
    #[default]
    Table,
    Json,
}

fn main() -> Result<()> {
    let Cli { db, config, cmd } = Cli::parse();

    if should_install_tracing(&cmd) {
        install_tracing();
    }

    let config = AppConfig::load(config.as_deref())?;
    let ctx = CommandContext::new(config, db)?;
    execute_command(&ctx, cmd)
}

fn execute_command(ctx: &CommandContext, command: Command) -> Result<()> {
    match command {
        Command::Tui { route } => tui::run(ctx, &route),
        other => commands::run(ctx, other, &mut io::stdout().lock()),
    }
}

const fn should_install_tracing(cmd: &Command) -> bool {
    !matches!(cmd, Command::Tui { .. })
}

fn install_tracing() {
    // RUST_LOG is honoured; INFO by default.
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_new_command() {
        let cli = Cli::parse_from([
            "tasks-tracker",
            "--db",
            "/tmp/tasks.db",
            "new",
            "--title",
            "Improve docs",
            "--tag",
            "Documentation",
            "--priority",
            "high",
        ]);

        assert_eq!(cli.db, Some(PathBuf::from("/tmp/tasks.db")));
        match cli.cmd {
            Command::New {
                title,
                tags,
                priority,
                description,
            } => {
                assert_eq!(title, "Improve docs");
                assert_eq!(tags, vec!["Documentation"]);
                assert_eq!(priority, Some(Priority::High));
                assert_eq!(description, None);
            }
            _ => panic!("expected new command"),
        }
    }

    #[test]
    fn parse_edit_command_with_status_label() {
        let cli = Cli::parse_from([
            "tasks-tracker",
            "edit",
            "0190f2a4-8b1e-7c3d-9a4f-2b6c8d0e1f23",
            "--status",
            "In Progress",
            "--clear-tags",
        ]);

        match cli.cmd {
            Command::Edit {
                id,
                status,
                clear_tags,
                tags,
                ..
            } => {
                assert_eq!(id, "0190f2a4-8b1e-7c3d-9a4f-2b6c8d0e1f23");
                assert_eq!(status, Some(Status::InProgress));
                assert!(clear_tags);
                assert!(tags.is_empty());
            }
            _ => panic!("expected edit command"),
        }
    }

    #[test]
    fn parse_ls_filters() {
        let cli = Cli::parse_from([
            "tasks-tracker",
            "ls",
            "--title",
            "write",
            "--status",
            "todo",
            "--status",
            "done",
            "--priority",
            "low",
            "--format",
            "json",
        ]);

        match cli.cmd {
            Command::Ls {
                title,
                statuses,
                priorities,
                format,
            } => {
                assert_eq!(title.as_deref(), Some("write"));
                assert_eq!(statuses, vec![Status::Todo, Status::Done]);
                assert_eq!(priorities, vec![Priority::Low]);
                assert_eq!(format, LsFormat::Json);
            }
            _ => panic!("expected ls command"),
        }
    }

    #[test]
    fn parse_login_command() {
        let cli = Cli::parse_from(["tasks-tracker", "login", "u1", "--name", "Ada"]);
        match cli.cmd {
            Command::Login { user_id, name, email } => {
                assert_eq!(user_id, "u1");
                assert_eq!(name.as_deref(), Some("Ada"));
                assert_eq!(email, None);
            }
            _ => panic!("expected login command"),
        }
    }

    #[test]
    fn parse_tui_command() {
        let cli = Cli::parse_from(["tasks-tracker", "tui"]);
        assert!(matches!(cli.cmd, Command::Tui { ref route } if route == "/"));
        assert!(!should_install_tracing(&cli.cmd));
    }

    #[test]
    fn unknown_priority_is_rejected() {
        assert!(Cli::try_parse_from(["tasks-tracker", "new", "--title", "x", "--priority", "urgent"]).is_err());
    }

    #[test]
    fn tracing_installed_for_plain_commands() {
        let cli = Cli::parse_from(["tasks-tracker", "ls"]);
        assert!(should_install_tracing(&cli.cmd));
    }
}
