use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::Serialize;
use tasks_tracker_app::{
    AppConfig, CreateTaskInput, DefaultSession, FileSessionStore, Identity, SessionGateway, TaskService,
    UpdateTaskInput, default_session,
};
use tasks_tracker_core::{EmptyReason, FilterState, Task, TaskId};
use tasks_tracker_store_sqlite::SqliteStore;
use time::format_description::well_known::Rfc3339;
use tracing::warn;

use crate::{Command, LsFormat};

/// Body printed by `lookup` when the query fails.
const LOOKUP_FAILURE: &str = "An unknown error occurred";

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
}

/// Resolved paths and session shared by every command.
pub struct CommandContext {
    config: AppConfig,
    db_path: PathBuf,
    session: DefaultSession,
}

impl CommandContext {
    /// Resolve the database and session locations for this run.
    pub fn new(config: AppConfig, db_override: Option<PathBuf>) -> Result<Self> {
        let db_path = config.database_path(db_override.as_deref())?;
        let session = default_session(FileSessionStore::default_location()?);
        Ok(Self {
            config,
            db_path,
            session,
        })
    }

    #[cfg(test)]
    pub fn with_session(config: AppConfig, db_path: PathBuf, session: DefaultSession) -> Self {
        Self {
            config,
            db_path,
            session,
        }
    }

    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub const fn session(&self) -> &DefaultSession {
        &self.session
    }

    pub fn session_file(&self) -> &FileSessionStore {
        self.session.fallback()
    }

    pub fn open_service(&self) -> Result<TaskService<SqliteStore>> {
        let store = SqliteStore::open(&self.db_path)
            .with_context(|| format!("failed to open database {}", self.db_path.display()))?;
        Ok(TaskService::new(store))
    }
}

pub fn run(ctx: &CommandContext, command: Command, out: &mut impl Write) -> Result<()> {
    match command {
        Command::Login { user_id, name, email } => {
            let mut identity = Identity::new(user_id.trim());
            identity.name = name.unwrap_or_else(|| identity.name.clone());
            identity.email = email;
            ctx.session_file().sign_in(&identity)?;
            writeln!(out, "Signed in as {}", identity.display())?;
        }
        Command::Logout => {
            if ctx.session_file().sign_out()? {
                writeln!(out, "Signed out")?;
            } else {
                writeln!(out, "Not signed in")?;
            }
        }
        Command::Whoami => match ctx.session().current()? {
            Some(identity) => writeln!(out, "{} ({})", identity.display(), identity.id)?,
            None => writeln!(out, "Not signed in")?,
        },
        Command::New {
            title,
            description,
            tags,
            priority,
        } => {
            let identity = ctx.session().require()?;
            let task = ctx.open_service()?.create(CreateTaskInput {
                owner: identity.id,
                title,
                description: description.unwrap_or_default(),
                tags,
                priority,
            })?;
            writeln!(out, "Created task {}", task.id)?;
        }
        Command::Edit {
            id,
            title,
            description,
            tags,
            clear_tags,
            status,
            priority,
        } => {
            let identity = ctx.session().require()?;
            let mut input = UpdateTaskInput::new(parse_task_id(&id)?, identity.id);
            input.title = title;
            input.description = description;
            input.tags = (clear_tags || !tags.is_empty()).then_some(tags);
            input.status = status;
            input.priority = priority;
            let task = ctx.open_service()?.update(input)?;
            writeln!(out, "Updated task {}", task.id)?;
        }
        Command::Rm { id } => {
            ctx.session().require()?;
            let id = parse_task_id(&id)?;
            ctx.open_service()?.delete(id)?;
            writeln!(out, "Deleted task {id}")?;
        }
        Command::Ls {
            title,
            statuses,
            priorities,
            format,
        } => {
            let filter = FilterState::new()
                .with_title_query(title.unwrap_or_default())
                .with_statuses(statuses)
                .with_priorities(priorities);
            list(ctx, &filter, format, out)?;
        }
        Command::Lookup { id } => {
            let body = match lookup_json(ctx, &id) {
                Ok(body) => body,
                Err(err) => {
                    warn!(error = %format!("{err:#}"), "Lookup failed");
                    serde_json::to_string(&ErrorBody {
                        message: LOOKUP_FAILURE,
                    })?
                }
            };
            writeln!(out, "{body}")?;
        }
        Command::Tui { .. } => unreachable!("the TUI is launched from main"),
    }

    Ok(())
}

fn list(ctx: &CommandContext, filter: &FilterState, format: LsFormat, out: &mut impl Write) -> Result<()> {
    let identity = ctx.session().require()?;
    let tasks = ctx.open_service()?.list(&identity.id)?;
    let view = filter.apply(&tasks);
    match format {
        LsFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&view.to_vec())?)?,
        LsFormat::Table => match view.empty_reason() {
            Some(EmptyReason::NoTasks) => writeln!(out, "No tasks yet")?,
            Some(EmptyReason::NoMatches) => writeln!(out, "No task matches the filter")?,
            None => render_task_table(out, view.iter())?,
        },
    }
    Ok(())
}

fn lookup_json(ctx: &CommandContext, raw: &str) -> Result<String> {
    let id = parse_task_id(raw)?;
    let tasks = ctx.open_service()?.lookup(id)?;
    Ok(serde_json::to_string(&tasks)?)
}

fn render_task_table<'a>(out: &mut impl Write, tasks: impl Iterator<Item = &'a Task>) -> Result<()> {
    writeln!(out, "ID | Status | Priority | Title | Tags | Updated")?;
    writeln!(out, "-- | ------ | -------- | ----- | ---- | -------")?;

    for task in tasks {
        let tags = if task.tags.is_empty() {
            "-".to_owned()
        } else {
            task.tags.join(", ")
        };
        let updated = task.updated_at.format(&Rfc3339).unwrap_or_else(|_| "-".to_owned());
        writeln!(
            out,
            "{} | {} | {} | {} | {} | {}",
            task.id, task.status, task.priority, task.title, tags, updated
        )?;
    }
    Ok(())
}

fn parse_task_id(raw: &str) -> Result<TaskId> {
    TaskId::from_str(raw).with_context(|| format!("Invalid task id: {raw}"))
}
