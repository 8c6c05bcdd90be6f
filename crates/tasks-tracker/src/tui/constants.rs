//! Shared constants for the TUI to keep layout and timing in sync.

/// Interval in milliseconds between UI ticks/redraws.
pub const TUI_TICK_RATE_MS: u64 = 200;
/// Time-to-live in seconds for transient status messages.
pub const UI_MESSAGE_TTL_SECS: u64 = 5;
/// Highlight symbol shown beside the selected table row.
pub const TASK_TABLE_HIGHLIGHT_SYMBOL: &str = "▶ ";
/// Prefix of the per-row task label (`TASK-<row>`).
pub const TASK_LABEL_PREFIX: &str = "TASK-";
/// Filter menus summarise the selection once more than this many items are chosen.
pub const FILTER_SUMMARY_LIMIT: usize = 2;
/// Width percentage for task modals before clamping.
pub const MODAL_WIDTH_PERCENT: u16 = 60;
/// Height percentage for task modals before clamping.
pub const MODAL_HEIGHT_PERCENT: u16 = 70;
/// Minimum width for task modals.
pub const MODAL_MIN_WIDTH: u16 = 44;
/// Minimum height for task modals.
pub const MODAL_MIN_HEIGHT: u16 = 16;
/// Minimum width for the delete confirmation.
pub const CONFIRM_MIN_WIDTH: u16 = 40;
/// Height of the delete confirmation.
pub const CONFIRM_HEIGHT: u16 = 7;
/// Characters the form accepts in the description field.
pub const DESCRIPTION_MAX_CHARS: usize = 500;
/// Width of drop-down menus (row actions, filters).
pub const MENU_WIDTH: u16 = 28;
/// Frames of the submitting spinner, advanced once per tick.
pub const LOADING_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];
