//! Application layer logic for tasks-tracker.
//!
//! This crate provides the task service, modal state machine, session gateway,
//! routing rules and configuration shared by the CLI and TUI.

pub mod async_store;
pub mod config;
pub mod modal;
pub mod route;
pub mod service;
pub mod session;
pub mod store;

// Re-exports for convenience
pub use async_store::{AsyncStoreError, AsyncTaskService};
pub use config::{AppConfig, FilterConfig, SubmitConfig, default_config_path};
pub use modal::{
    ActiveModal, DeleteOrigin, FormError, ModalController, ModalKind, Phase, SubmitOutcome, SubmitRejected,
    SubmitResolution, TaskForm, TaskMutation,
};
pub use route::{Resolution, Route, RouteError, resolve};
pub use service::{CreateTaskInput, LOOKUP_LIMIT, MutationApplied, TaskService, TaskWriteError, UpdateTaskInput};
pub use session::{DefaultSession, EnvSession, FileSessionStore, Identity, LayeredSession, SessionGateway, default_session};
pub use store::TaskStore;
