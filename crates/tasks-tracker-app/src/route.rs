//! Page routes and the sign-in gate in front of them.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Path of the task page.
pub const TASKS_PATH: &str = "/~";
/// Path of the sign-in page.
pub const SIGN_IN_PATH: &str = "/sign-in";
/// Query parameter carrying the post-sign-in destination.
pub const CALLBACK_PARAM: &str = "callbackUrl";

/// Pages known to the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/`
    Root,
    /// `/~`
    Tasks,
    /// `/sign-in?callbackUrl=…`
    SignIn {
        /// Destination after signing in, kept verbatim.
        callback_url: Option<String>,
    },
}

/// Errors from [`Route::from_str`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The path is not one of the known pages.
    #[error("unknown route: {0}")]
    UnknownPath(String),
}

impl Route {
    /// Sign-in page that returns to the task page.
    #[must_use]
    pub fn sign_in_to_tasks() -> Self {
        Self::SignIn {
            callback_url: Some(TASKS_PATH.to_owned()),
        }
    }

    /// Destination after signing out.
    #[must_use]
    pub const fn after_sign_out() -> Self {
        Self::Root
    }

    /// Destination after a successful sign-in on this route.
    ///
    /// Callbacks that are not local paths fall back to the task page.
    #[must_use]
    pub fn after_sign_in(&self) -> Self {
        let target = match self {
            Self::SignIn {
                callback_url: Some(url),
            } if is_local_path(url) => url.as_str(),
            _ => TASKS_PATH,
        };
        target.parse().unwrap_or(Self::Tasks)
    }

    /// Whether the page needs a signed-in user.
    #[must_use]
    pub const fn requires_session(&self) -> bool {
        matches!(self, Self::Tasks)
    }
}

fn is_local_path(url: &str) -> bool {
    url.starts_with('/') && !url.starts_with("//")
}

impl FromStr for Route {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (path, query) = trimmed.split_once('?').unwrap_or((trimmed, ""));
        match path {
            "" | "/" => Ok(Self::Root),
            TASKS_PATH | "/~/" => Ok(Self::Tasks),
            SIGN_IN_PATH | "/sign-in/" => {
                let callback_url = query
                    .split('&')
                    .filter_map(|pair| pair.split_once('='))
                    .find(|(key, _)| *key == CALLBACK_PARAM)
                    .map(|(_, value)| value.to_owned());
                Ok(Self::SignIn { callback_url })
            }
            other => Err(RouteError::UnknownPath(other.to_owned())),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.write_str("/"),
            Self::Tasks => f.write_str(TASKS_PATH),
            Self::SignIn { callback_url: None } => f.write_str(SIGN_IN_PATH),
            Self::SignIn {
                callback_url: Some(url),
            } => write!(f, "{SIGN_IN_PATH}?{CALLBACK_PARAM}={url}"),
        }
    }
}

/// What the shell should do for a requested route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Show the page.
    Render(Route),
    /// Navigate elsewhere first.
    Redirect(Route),
}

impl Resolution {
    /// Page that ends up on screen.
    #[must_use]
    pub const fn target(&self) -> &Route {
        match self {
            Self::Render(route) | Self::Redirect(route) => route,
        }
    }
}

/// Apply the sign-in gate to `route`.
#[must_use]
pub fn resolve(route: &Route, signed_in: bool) -> Resolution {
    match (route, signed_in) {
        (Route::Root, true) => Resolution::Redirect(Route::Tasks),
        (Route::Root | Route::Tasks, false) => Resolution::Redirect(Route::sign_in_to_tasks()),
        (Route::SignIn { .. }, true) => Resolution::Redirect(route.after_sign_in()),
        (Route::Tasks, true) | (Route::SignIn { .. }, false) => Resolution::Render(route.clone()),
    }
}
