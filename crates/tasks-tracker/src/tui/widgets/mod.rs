pub(super) mod chrome;
pub(super) mod menus;
pub(super) mod modals;
pub(super) mod task_table;
pub(super) mod util;
