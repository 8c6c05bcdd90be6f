pub(super) mod filter;
pub(super) mod modal;
pub(super) mod navigation;
