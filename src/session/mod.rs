//! Headless session: one explicit state struct plus the controller that drives it.

pub(crate) mod controller;
pub(crate) mod state;
