//! Resolution of the signed-in identity.
//!
//! The identity provider is out of scope: `login` records whatever identity
//! the user asserts in a session file, and the environment can override it.

use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tasks_tracker_core::OwnerId;
use time::OffsetDateTime;
use tracing::{debug, info};

/// Environment variable carrying the user id.
pub const ENV_USER_ID: &str = "TASKS_TRACKER_USER_ID";
/// Environment variable carrying the display name.
pub const ENV_USER_NAME: &str = "TASKS_TRACKER_USER_NAME";
/// Environment variable carrying the email address.
pub const ENV_USER_EMAIL: &str = "TASKS_TRACKER_USER_EMAIL";

const SESSION_FILE: &str = "session.toml";
const APP_DIR: &str = "tasks-tracker";

/// Authenticated user as seen by the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable user id; owner of the user's tasks.
    pub id: OwnerId,
    /// Display name.
    pub name: String,
    /// Email address, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Identity {
    /// Identity with a name derived from the id.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id: OwnerId::new(id),
            email: None,
        }
    }

    /// Replace the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Replace the email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// `name <email>` or just the name.
    #[must_use]
    pub fn display(&self) -> String {
        self.email
            .as_ref()
            .map_or_else(|| self.name.clone(), |email| format!("{} <{email}>", self.name))
    }
}

/// Source of the current identity.
pub trait SessionGateway {
    /// Identity of the signed-in user, `None` when signed out.
    ///
    /// # Errors
    /// Returns an error when the session source exists but cannot be read.
    fn current(&self) -> Result<Option<Identity>>;

    /// Identity of the signed-in user, failing when signed out.
    ///
    /// # Errors
    /// Returns an error when signed out or the session cannot be read.
    fn require(&self) -> Result<Identity> {
        self.current()?
            .ok_or_else(|| anyhow!("not signed in; run `tasks-tracker login <user-id>` first"))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionRecord {
    #[serde(with = "time::serde::rfc3339")]
    signed_in_at: OffsetDateTime,
    user: Identity,
}

/// Session persisted as TOML in the data directory.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Session stored at an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Session stored at `<data_dir>/tasks-tracker/session.toml`.
    ///
    /// # Errors
    /// Returns an error when the platform has no data directory.
    pub fn default_location() -> Result<Self> {
        let base = dirs::data_dir().context("could not determine the data directory")?;
        Ok(Self::new(base.join(APP_DIR).join(SESSION_FILE)))
    }

    /// Path of the session file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record `identity` as signed in.
    ///
    /// # Errors
    /// Returns an error when the file cannot be written.
    pub fn sign_in(&self, identity: &Identity) -> Result<()> {
        if identity.id.as_str().trim().is_empty() {
            return Err(anyhow!("user id must not be empty"));
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let record = SessionRecord {
            signed_in_at: OffsetDateTime::now_utc(),
            user: identity.clone(),
        };
        let contents = toml::to_string(&record).context("failed to encode session")?;
        fs::write(&self.path, contents).with_context(|| format!("failed to write {}", self.path.display()))?;
        info!(user = %identity.id, "Signed in");
        Ok(())
    }

    /// Forget the session. Returns whether a session existed.
    ///
    /// # Errors
    /// Returns an error when the file exists but cannot be removed.
    pub fn sign_out(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Signed out");
                Ok(true)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err).with_context(|| format!("failed to remove {}", self.path.display())),
        }
    }
}

impl SessionGateway for FileSessionStore {
    fn current(&self) -> Result<Option<Identity>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read {}", self.path.display()));
            }
        };
        let record: SessionRecord =
            toml::from_str(&contents).with_context(|| format!("failed to parse {}", self.path.display()))?;
        debug!(user = %record.user.id, signed_in_at = %record.signed_in_at, "Loaded session");
        Ok(Some(record.user))
    }
}

/// Identity asserted through `TASKS_TRACKER_USER_*` variables.
pub struct EnvSession<F> {
    fetch: F,
}

impl EnvSession<fn(&'static str) -> Option<String>> {
    /// Read from the process environment.
    #[must_use]
    pub fn from_process() -> Self {
        Self {
            fetch: |key| env::var(key).ok(),
        }
    }
}

impl<F> EnvSession<F>
where
    F: Fn(&'static str) -> Option<String>,
{
    /// Read through a custom lookup.
    pub const fn with_fetch(fetch: F) -> Self {
        Self { fetch }
    }

    fn value(&self, key: &'static str) -> Option<String> {
        (self.fetch)(key).and_then(|value| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        })
    }
}

impl<F> SessionGateway for EnvSession<F>
where
    F: Fn(&'static str) -> Option<String>,
{
    fn current(&self) -> Result<Option<Identity>> {
        let Some(id) = self.value(ENV_USER_ID) else {
            return Ok(None);
        };
        let mut identity = Identity::new(id);
        if let Some(name) = self.value(ENV_USER_NAME) {
            identity.name = name;
        }
        identity.email = self.value(ENV_USER_EMAIL);
        Ok(Some(identity))
    }
}

/// Consult `primary` first and fall back to `fallback`.
pub struct LayeredSession<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> LayeredSession<P, F> {
    /// Combine two gateways.
    pub const fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }

    /// Lower-priority gateway.
    pub const fn fallback(&self) -> &F {
        &self.fallback
    }
}

impl<P, F> SessionGateway for LayeredSession<P, F>
where
    P: SessionGateway,
    F: SessionGateway,
{
    fn current(&self) -> Result<Option<Identity>> {
        match self.primary.current()? {
            Some(identity) => Ok(Some(identity)),
            None => self.fallback.current(),
        }
    }
}

/// Environment override layered over the file session.
pub type DefaultSession = LayeredSession<EnvSession<fn(&'static str) -> Option<String>>, FileSessionStore>;

/// Build the default gateway around `file`.
#[must_use]
pub fn default_session(file: FileSessionStore) -> DefaultSession {
    LayeredSession::new(EnvSession::from_process(), file)
}
